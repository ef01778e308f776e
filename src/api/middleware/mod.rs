// Middleware Module

pub mod cors;
pub mod logging;
pub mod panic;

pub use cors::cors_layer;
pub use logging::logging_layer;
pub use panic::catch_panic_layer;

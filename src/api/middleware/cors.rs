// CORS Middleware

use axum::http::{Method, header};
use tower_http::cors::{Any, CorsLayer};

/// Cross-origin access for browser-based diagnostics tools
///
/// Any origin may read the inventory; only the methods the API serves are allowed.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

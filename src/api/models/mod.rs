// API Models Module

pub mod error;
pub mod request;
pub mod response;

pub use error::{ApiError, ErrorResponse};
pub use request::{ImportCertificateRequest, ValidateCertificateRequest};
pub use response::{HealthResponse, OperationResponse};

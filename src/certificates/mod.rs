// Certificates module - Certificate parsing, description, registry and validation

pub mod details;
pub mod parser;
pub mod registry;
pub mod revocation;
pub mod url_probe;
pub mod validator;

pub use details::{CertificateRecord, CertificateStatus};
pub use parser::{LoadedCertificate, normalize_thumbprint, parse_certificate};
pub use registry::CertificateRegistry;
pub use validator::{CertificateValidator, ExpirationStatus, ValidationOptions, ValidationResult};

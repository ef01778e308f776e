// Error types for certinventory
//
// Domain failures are explicit values at every fallible boundary. They are turned
// into error records, 400/404 payloads or validation messages at the service edge.

use crate::stores::StoreId;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while parsing or describing a single certificate
#[derive(Debug, Error)]
pub enum CertificateError {
    /// Bytes are not a DER/PEM certificate or a PKCS#12 bundle
    #[error("Unsupported certificate format: {details}")]
    UnsupportedFormat { details: String },

    /// PKCS#12 bundle could not be decrypted or parsed
    #[error("PKCS#12 error: {details}")]
    Pkcs12 { details: String },

    /// PKCS#12 bundle decrypted but carried no certificate
    #[error("PKCS#12 bundle contains no certificate")]
    MissingCertificate,

    /// Certificate fields could not be decoded
    #[error("Certificate parsing error: {details}")]
    Parse { details: String },

    /// Validity timestamp outside the representable range
    #[error("Invalid certificate time: {0}")]
    InvalidTime(String),

    /// OpenSSL failures (digests, key handling)
    #[error("OpenSSL error: {0}")]
    OpenSsl(#[from] openssl::error::ErrorStack),
}

/// Errors raised while opening a certificate store
#[derive(Debug, Error)]
pub enum StoreError {
    /// No store is configured for the identifier
    #[error("Certificate store {0} is not configured")]
    NotConfigured(StoreId),

    /// Store location could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Store location exists but is not a directory
    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),
}

/// Errors raised by the import operation
#[derive(Debug, Error)]
pub enum ImportError {
    /// Payload was empty
    #[error("Certificate data is required")]
    EmptyData,

    /// Payload was not valid base64
    #[error("Invalid base64 certificate data: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    /// Payload decoded but could not be parsed as a certificate
    #[error(transparent)]
    Certificate(#[from] CertificateError),
}

/// Internal failures of the validation routine
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Chain verifier could not be set up or run
    #[error("Chain build failed: {0}")]
    Chain(#[from] openssl::error::ErrorStack),

    /// Certificate details could not be read
    #[error(transparent)]
    Certificate(#[from] CertificateError),

    /// Blocking validation task failed
    #[error("Validation task failed: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for ValidationError {
    fn from(err: tokio::task::JoinError) -> Self {
        ValidationError::Task(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::{StoreLocation, StoreName};

    #[test]
    fn test_store_not_configured_message() {
        let err = StoreError::NotConfigured(StoreId::new(StoreLocation::LocalMachine, StoreName::Root));
        assert_eq!(
            err.to_string(),
            "Certificate store LocalMachine/Root is not configured"
        );
    }

    #[test]
    fn test_import_error_wraps_certificate_error() {
        let err: ImportError = CertificateError::MissingCertificate.into();
        assert_eq!(err.to_string(), "PKCS#12 bundle contains no certificate");
    }

    #[test]
    fn test_io_error_chain_preserved() {
        use std::error::Error;

        let err = StoreError::Io {
            path: PathBuf::from("/var/ssl/private"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };

        assert!(err.source().is_some());
        assert!(err.to_string().contains("/var/ssl/private"));
    }
}

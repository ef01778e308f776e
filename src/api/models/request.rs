// API Request Models

use crate::certificates::ValidationOptions;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Certificate import payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportCertificateRequest {
    /// Base64-encoded DER, PEM or PKCS#12 data
    pub certificate_data: String,

    /// PKCS#12 password
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Name to report instead of the certificate's own
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "Payments API client")]
    pub friendly_name: Option<String>,
}

/// Validation payload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidateCertificateRequest {
    /// SHA-1 thumbprint, hex; separators are ignored
    #[schema(example = "3B7E0A1F9C2D4E5F6A7B8C9D0E1F2A3B4C5D6E7F")]
    pub thumbprint: String,

    /// Build the chain to a trusted root
    pub validate_chain: bool,

    /// Consult the certificate's CRL distribution points
    pub check_revocation: bool,

    /// URL requested with the certificate as client identity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_url: Option<String>,
}

impl Default for ValidateCertificateRequest {
    fn default() -> Self {
        Self {
            thumbprint: String::new(),
            validate_chain: true,
            check_revocation: false,
            test_url: None,
        }
    }
}

impl ValidateCertificateRequest {
    pub fn options(&self) -> ValidationOptions {
        ValidationOptions {
            validate_chain: self.validate_chain,
            check_revocation: self.check_revocation,
            test_url: self.test_url.clone(),
        }
    }
}

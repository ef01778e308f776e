// Certificate Revocation Checker - Check certificate revocation status via CRL

use super::parser::LoadedCertificate;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use x509_parser::extensions::DistributionPointName;
use x509_parser::prelude::*;
use x509_parser::revocation_list::CertificateRevocationList;

/// Revocation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevocationStatus {
    Good,
    Revoked,
    Unknown,
}

/// Revocation check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevocationResult {
    pub status: RevocationStatus,
    pub details: String,
}

impl RevocationResult {
    fn unknown(details: impl Into<String>) -> Self {
        Self {
            status: RevocationStatus::Unknown,
            details: details.into(),
        }
    }

    /// `Some(true)` when not revoked, `Some(false)` when revoked, `None` when unknown
    pub fn as_validity(&self) -> Option<bool> {
        match self.status {
            RevocationStatus::Good => Some(true),
            RevocationStatus::Revoked => Some(false),
            RevocationStatus::Unknown => None,
        }
    }
}

#[derive(Debug, Error)]
enum RevocationError {
    #[error("certificate could not be decoded: {0}")]
    Certificate(String),

    #[error("CRL download from {url} failed: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("CRL download from {url} returned {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("CRL from {url} could not be parsed: {details}")]
    Crl { url: String, details: String },
}

/// CRL-based revocation checker
#[derive(Debug, Clone)]
pub struct RevocationChecker {
    client: reqwest::Client,
}

impl RevocationChecker {
    pub fn new(check_timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(check_timeout)
            .build()
            .unwrap_or_default();
        Self { client }
    }

    /// Check revocation status for a certificate
    ///
    /// Every distribution point is tried in order; the first CRL that can be
    /// downloaded and parsed decides.
    pub async fn check(&self, certificate: &LoadedCertificate) -> RevocationResult {
        let der = match certificate.to_der() {
            Ok(der) => der,
            Err(e) => return RevocationResult::unknown(format!("Revocation status unknown: {}", e)),
        };

        let urls = match crl_urls(&der) {
            Ok(urls) => urls,
            Err(e) => return RevocationResult::unknown(format!("Revocation status unknown: {}", e)),
        };

        if urls.is_empty() {
            return RevocationResult::unknown(
                "Revocation status unknown: certificate has no CRL distribution point",
            );
        }

        let mut failures = Vec::new();
        for url in &urls {
            match self.check_crl(&der, url).await {
                Ok(status) => {
                    let details = match status {
                        RevocationStatus::Revoked => "Certificate has been revoked".to_string(),
                        _ => format!("Certificate is not revoked (CRL {})", url),
                    };
                    return RevocationResult { status, details };
                }
                Err(e) => {
                    tracing::debug!("CRL check failed: {}", e);
                    failures.push(e.to_string());
                }
            }
        }

        RevocationResult::unknown(format!("Revocation status unknown: {}", failures.join("; ")))
    }

    async fn check_crl(&self, cert_der: &[u8], crl_url: &str) -> Result<RevocationStatus, RevocationError> {
        let response = self
            .client
            .get(crl_url)
            .send()
            .await
            .map_err(|source| RevocationError::Download {
                url: crl_url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(RevocationError::HttpStatus {
                url: crl_url.to_string(),
                status: response.status(),
            });
        }

        let crl_bytes = response
            .bytes()
            .await
            .map_err(|source| RevocationError::Download {
                url: crl_url.to_string(),
                source,
            })?;

        let revoked = is_listed(cert_der, &crl_bytes).map_err(|details| RevocationError::Crl {
            url: crl_url.to_string(),
            details,
        })?;

        Ok(if revoked {
            RevocationStatus::Revoked
        } else {
            RevocationStatus::Good
        })
    }
}

/// HTTP(S) URLs from the CRL Distribution Points extension
fn crl_urls(cert_der: &[u8]) -> Result<Vec<String>, RevocationError> {
    let (_, parsed_cert) = X509Certificate::from_der(cert_der)
        .map_err(|e| RevocationError::Certificate(e.to_string()))?;

    let mut urls = Vec::new();
    if let Ok(Some(ext)) =
        parsed_cert.get_extension_unique(&x509_parser::oid_registry::OID_X509_EXT_CRL_DISTRIBUTION_POINTS)
        && let ParsedExtension::CRLDistributionPoints(crl_dp) = ext.parsed_extension()
    {
        for point in &crl_dp.points {
            if let Some(DistributionPointName::FullName(names)) = &point.distribution_point {
                for name in names {
                    if let GeneralName::URI(uri) = name
                        && uri.starts_with("http")
                    {
                        urls.push(uri.to_string());
                    }
                }
            }
        }
    }

    Ok(urls)
}

/// Whether the certificate's serial appears in the CRL (DER or PEM)
fn is_listed(cert_der: &[u8], crl_bytes: &[u8]) -> Result<bool, String> {
    let (_, parsed_cert) = X509Certificate::from_der(cert_der).map_err(|e| e.to_string())?;

    let pem;
    let crl_der = if crl_bytes.starts_with(b"-----BEGIN") {
        let (_, block) = x509_parser::pem::parse_x509_pem(crl_bytes).map_err(|e| e.to_string())?;
        pem = block;
        pem.contents.as_slice()
    } else {
        crl_bytes
    };

    let (_, crl) = CertificateRevocationList::from_der(crl_der).map_err(|e| e.to_string())?;

    let serial = parsed_cert.raw_serial();
    Ok(crl
        .iter_revoked_certificates()
        .any(|revoked| revoked.raw_serial() == serial))
}

// Certificate Validator - Validate a certificate by thumbprint against the configured trust stores

use super::details::{
    CertificateStatus, DEFAULT_WARNING_DAYS, TIMESTAMP_FORMAT, classify_expiration, to_utc,
};
use super::parser::{LoadedCertificate, normalize_thumbprint};
use super::registry::CertificateRegistry;
use super::revocation::{RevocationChecker, RevocationStatus};
use super::url_probe::UrlProbe;
use crate::error::{CertificateError, ValidationError};
use crate::stores::{StoreCatalog, StoreId, StoreLocation, StoreName, StoreSnapshot};
use chrono::{DateTime, Utc};
use openssl::stack::Stack;
use openssl::x509::store::X509StoreBuilder;
use openssl::x509::{X509, X509StoreContext};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use utoipa::ToSchema;
use x509_parser::prelude::*;

/// Time-window classification reported by validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ExpirationStatus {
    Valid,
    Warning,
    Expired,
    NotYetValid,
    Unknown,
    Error,
}

/// Certificate validation result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub message: String,
    pub chain_valid: bool,
    /// Null when revocation was not checked or could not be determined
    pub revocation_valid: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_test_result: Option<String>,
    pub expiration_status: ExpirationStatus,
}

impl ValidationResult {
    pub fn not_found() -> Self {
        Self {
            is_valid: false,
            message: "Certificate not found".to_string(),
            chain_valid: false,
            revocation_valid: None,
            url_test_result: None,
            expiration_status: ExpirationStatus::Unknown,
        }
    }

    pub fn error(detail: impl std::fmt::Display) -> Self {
        Self {
            is_valid: false,
            message: format!("Validation error: {}", detail),
            chain_valid: false,
            revocation_valid: None,
            url_test_result: None,
            expiration_status: ExpirationStatus::Error,
        }
    }
}

/// Per-request switches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOptions {
    pub validate_chain: bool,
    pub check_revocation: bool,
    pub test_url: Option<String>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            validate_chain: true,
            check_revocation: false,
            test_url: None,
        }
    }
}

/// Validation settings (`[validation]` in the config file)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    /// Check revocation even when the request does not ask for it
    pub check_revocation: bool,
    /// Seed the trust store with OpenSSL's default certificate paths
    pub use_system_trust: bool,
    /// Stores whose certificates are trusted roots
    pub trust_anchor_stores: Vec<StoreId>,
    /// Stores offered as untrusted intermediates
    pub intermediate_stores: Vec<StoreId>,
    /// Days before expiry that count as the warning window
    pub warning_days: i64,
    /// Timeout for revocation downloads and URL tests
    pub network_timeout_seconds: u64,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            check_revocation: false,
            use_system_trust: true,
            trust_anchor_stores: vec![
                StoreId::new(StoreLocation::CurrentUser, StoreName::Root),
                StoreId::new(StoreLocation::LocalMachine, StoreName::Root),
            ],
            intermediate_stores: vec![
                StoreId::new(StoreLocation::CurrentUser, StoreName::CertificateAuthority),
                StoreId::new(StoreLocation::LocalMachine, StoreName::CertificateAuthority),
            ],
            warning_days: DEFAULT_WARNING_DAYS,
            network_timeout_seconds: 10,
        }
    }
}

impl ValidationSettings {
    pub fn network_timeout(&self) -> Duration {
        Duration::from_secs(self.network_timeout_seconds)
    }
}

/// Outcome of the time-window check
struct TimeCheck {
    status: ExpirationStatus,
    days_left: i64,
    failure: Option<String>,
}

/// Certificate validator
pub struct CertificateValidator {
    registry: Arc<CertificateRegistry>,
    catalog: Arc<StoreCatalog>,
    settings: ValidationSettings,
    revocation: RevocationChecker,
    url_probe: UrlProbe,
}

impl CertificateValidator {
    pub fn new(
        registry: Arc<CertificateRegistry>,
        catalog: Arc<StoreCatalog>,
        settings: ValidationSettings,
    ) -> Self {
        let timeout = settings.network_timeout();
        Self {
            registry,
            catalog,
            settings,
            revocation: RevocationChecker::new(timeout),
            url_probe: UrlProbe::new(timeout),
        }
    }

    pub fn settings(&self) -> &ValidationSettings {
        &self.settings
    }

    /// Validate the certificate with the given thumbprint
    ///
    /// Never fails: internal errors are reported through the result.
    pub async fn validate(&self, thumbprint: &str, options: &ValidationOptions) -> ValidationResult {
        info!("Validating certificate: {}", thumbprint);

        match self.try_validate(thumbprint, options).await {
            Ok(result) => result,
            Err(e) => {
                warn!("Error validating certificate {}: {}", thumbprint, e);
                ValidationResult::error(e)
            }
        }
    }

    async fn try_validate(
        &self,
        thumbprint: &str,
        options: &ValidationOptions,
    ) -> Result<ValidationResult, ValidationError> {
        let thumbprint = normalize_thumbprint(thumbprint);
        let registered = self.registry.get(&thumbprint).await;

        // Stores are read at most once per validation
        let snapshot = if registered.is_none() || options.validate_chain {
            self.read_stores(registered.is_none()).await?
        } else {
            Arc::new(StoreSnapshot::default())
        };

        let certificate = match registered {
            Some(certificate) => certificate,
            None => match snapshot.find_by_thumbprint(&thumbprint) {
                Some((store, certificate)) => {
                    debug!("Found certificate in store {}", store);
                    certificate
                }
                None => return Ok(ValidationResult::not_found()),
            },
        };

        let time = check_time(&certificate, Utc::now(), self.settings.warning_days)?;
        let mut is_valid = time.failure.is_none();

        let chain_failure = if options.validate_chain {
            self.build_chain(Arc::clone(&certificate), snapshot).await?
        } else {
            None
        };
        let chain_valid = options.validate_chain && chain_failure.is_none();

        let mut revocation_valid = None;
        let mut revocation_failure = None;
        let mut revocation_note = None;
        if options.check_revocation || self.settings.check_revocation {
            let outcome = self.revocation.check(&certificate).await;
            revocation_valid = outcome.as_validity();
            match outcome.status {
                RevocationStatus::Revoked => {
                    is_valid = false;
                    revocation_failure = Some(outcome.details);
                }
                RevocationStatus::Unknown => revocation_note = Some(outcome.details),
                RevocationStatus::Good => {}
            }
        }

        let url_test_result = match options.test_url.as_deref().filter(|u| !u.trim().is_empty()) {
            Some(url) => Some(self.url_probe.probe(url.trim(), &certificate).await),
            None => None,
        };

        let failures: Vec<String> = [time.failure, chain_failure, revocation_failure]
            .into_iter()
            .flatten()
            .collect();

        let mut message = if failures.is_empty() {
            let mut message = match time.status {
                ExpirationStatus::Warning => {
                    format!("Certificate is valid (expires in {} days)", time.days_left)
                }
                _ => "Certificate is valid".to_string(),
            };
            if !options.validate_chain {
                message.push_str(" (chain not checked)");
            }
            message
        } else {
            failures.join("; ")
        };

        if let Some(note) = revocation_note {
            message.push_str("; ");
            message.push_str(&note);
        }

        Ok(ValidationResult {
            is_valid,
            message,
            chain_valid,
            revocation_valid,
            url_test_result,
            expiration_status: time.status,
        })
    }

    /// Every configured store when the certificate must be looked up, otherwise
    /// only the trust anchor and intermediate stores
    async fn read_stores(&self, include_all: bool) -> Result<Arc<StoreSnapshot>, ValidationError> {
        let catalog = Arc::clone(&self.catalog);
        let chain_stores: Vec<StoreId> = self
            .settings
            .trust_anchor_stores
            .iter()
            .chain(&self.settings.intermediate_stores)
            .copied()
            .collect();

        let snapshot = tokio::task::spawn_blocking(move || {
            catalog.snapshot(|id| include_all || chain_stores.contains(&id))
        })
        .await?;

        Ok(Arc::new(snapshot))
    }

    /// Returns the verifier's failure text, or `None` when the chain builds
    async fn build_chain(
        &self,
        certificate: Arc<LoadedCertificate>,
        snapshot: Arc<StoreSnapshot>,
    ) -> Result<Option<String>, ValidationError> {
        let settings = self.settings.clone();

        tokio::task::spawn_blocking(move || {
            let anchors = snapshot.collect_certificates(&settings.trust_anchor_stores);
            let mut intermediates = snapshot.collect_certificates(&settings.intermediate_stores);
            intermediates.extend(certificate.bundled_ca().iter().cloned());

            verify_chain(
                certificate.certificate(),
                &anchors,
                intermediates,
                settings.use_system_trust,
            )
        })
        .await?
    }
}

fn check_time(
    certificate: &LoadedCertificate,
    now: DateTime<Utc>,
    warning_days: i64,
) -> Result<TimeCheck, ValidationError> {
    let der = certificate.to_der()?;
    let (_, parsed) = X509Certificate::from_der(&der).map_err(|e| CertificateError::Parse {
        details: e.to_string(),
    })?;
    let not_before = to_utc(&parsed.validity().not_before)?;
    let not_after = to_utc(&parsed.validity().not_after)?;

    if now < not_before {
        return Ok(TimeCheck {
            status: ExpirationStatus::NotYetValid,
            days_left: (not_after - now).num_days(),
            failure: Some(format!(
                "Certificate is not yet valid (valid from {})",
                not_before.format(TIMESTAMP_FORMAT)
            )),
        });
    }

    if now > not_after {
        return Ok(TimeCheck {
            status: ExpirationStatus::Expired,
            days_left: (not_after - now).num_days(),
            failure: Some(format!(
                "Certificate expired on {}",
                not_after.format(TIMESTAMP_FORMAT)
            )),
        });
    }

    let (status, days_left) = classify_expiration(not_after, now, warning_days);
    let status = match status {
        CertificateStatus::Warning => ExpirationStatus::Warning,
        _ => ExpirationStatus::Valid,
    };

    Ok(TimeCheck {
        status,
        days_left,
        failure: None,
    })
}

/// Build a chain from `leaf` to a trusted root
///
/// Revocation is not consulted here.
fn verify_chain(
    leaf: &X509,
    anchors: &[X509],
    intermediates: Vec<X509>,
    use_system_trust: bool,
) -> Result<Option<String>, ValidationError> {
    let mut store_builder = X509StoreBuilder::new()?;
    if use_system_trust && let Err(e) = store_builder.set_default_paths() {
        warn!("Failed to load default trust store: {}", e);
    }
    for anchor in anchors {
        // Duplicate roots are rejected by some OpenSSL versions
        if let Err(e) = store_builder.add_cert(anchor.clone()) {
            debug!("Skipping trust anchor: {}", e);
        }
    }
    let store = store_builder.build();

    let mut chain = Stack::new()?;
    for intermediate in intermediates {
        chain.push(intermediate)?;
    }

    let mut context = X509StoreContext::new()?;
    let failure = context.init(&store, leaf, &chain, |ctx| {
        if ctx.verify_cert()? {
            Ok(None)
        } else {
            Ok(Some(ctx.error().error_string().to_string()))
        }
    })?;

    Ok(failure)
}

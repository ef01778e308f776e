// Certificate Details - Describe loaded certificates as inventory records

use super::parser::LoadedCertificate;
use crate::error::CertificateError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use x509_parser::objects::{oid_registry, oid2sn};
use x509_parser::prelude::*;

/// Days before expiry at which a certificate is reported as `Warning`
pub const DEFAULT_WARNING_DAYS: i64 = 30;

/// Timestamp format used for validity windows
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Store provenance for certificates imported through the API
pub const MEMORY_STORE_NAME: &str = "Memory";
pub const MEMORY_STORE_LOCATION: &str = "Application";

/// Inventory status of a certificate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum CertificateStatus {
    Valid,
    Warning,
    Expired,
    Error,
}

/// Description of one certificate, as returned by every listing endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRecord {
    /// Friendly name, or first subject component
    pub name: String,
    pub store_name: Option<String>,
    pub store_location: Option<String>,
    pub subject: Option<String>,
    pub issuer: Option<String>,
    pub serial_number: Option<String>,
    /// Start of validity, `yyyy-MM-dd HH:mm:ss UTC`
    pub valid_from: Option<String>,
    /// End of validity, `yyyy-MM-dd HH:mm:ss UTC`
    pub valid_until: Option<String>,
    pub status: CertificateStatus,
    /// Whole days until expiry, negative once expired
    pub days_left: Option<i64>,
    pub thumbprint: Option<String>,
    pub has_private_key: Option<bool>,
    /// Set only when the certificate could not be described
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CertificateRecord {
    /// Record standing in for something that could not be read at all
    pub fn failure(name: &str, error: String) -> Self {
        Self {
            name: name.to_string(),
            store_name: None,
            store_location: None,
            subject: None,
            issuer: None,
            serial_number: None,
            valid_from: None,
            valid_until: None,
            status: CertificateStatus::Error,
            days_left: None,
            thumbprint: None,
            has_private_key: None,
            error: Some(error),
        }
    }

    /// Attach provenance to the record
    pub fn in_store(mut self, store_name: &str, store_location: &str) -> Self {
        self.store_name = Some(store_name.to_string());
        self.store_location = Some(store_location.to_string());
        self
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Classify an expiry date against `now`
///
/// Returns the status and the whole days left, truncated toward zero.
pub fn classify_expiration(
    not_after: DateTime<Utc>,
    now: DateTime<Utc>,
    warning_days: i64,
) -> (CertificateStatus, i64) {
    let days_left = (not_after - now).num_days();

    let status = if now > not_after {
        CertificateStatus::Expired
    } else if days_left < warning_days {
        CertificateStatus::Warning
    } else {
        CertificateStatus::Valid
    };

    (status, days_left)
}

/// Display name for a certificate
///
/// Friendly name when set, otherwise the subject up to the first comma with a
/// leading `CN=` removed, otherwise `"Unknown"`.
pub fn display_name(friendly_name: Option<&str>, subject: &str) -> String {
    if let Some(name) = friendly_name.filter(|n| !n.trim().is_empty()) {
        return name.to_string();
    }

    let first = subject.split(',').next().unwrap_or_default().trim();
    let first = first.strip_prefix("CN=").unwrap_or(first).trim();

    if first.is_empty() {
        "Unknown".to_string()
    } else {
        first.to_string()
    }
}

/// Render a distinguished name most-specific component first
///
/// `C=US, O=Org, CN=host` in DER order becomes `CN=host, O=Org, C=US`.
pub fn format_name(name: &X509Name<'_>) -> String {
    let registry = oid_registry();
    let mut components = Vec::new();

    let rdns: Vec<_> = name.iter_rdn().collect();

    for rdn in rdns.into_iter().rev() {
        let parts: Vec<String> = rdn
            .iter()
            .map(|attr| {
                let key = oid2sn(attr.attr_type(), registry)
                    .map(str::to_string)
                    .unwrap_or_else(|_| attr.attr_type().to_id_string());
                let value = attr
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|_| format!("#{}", hex::encode_upper(attr.attr_value().as_bytes())));
                format!("{}={}", key, value)
            })
            .collect();
        components.push(parts.join(" + "));
    }

    components.join(", ")
}

/// Convert an ASN.1 time to UTC
pub fn to_utc(time: &ASN1Time) -> Result<DateTime<Utc>, CertificateError> {
    DateTime::from_timestamp(time.timestamp(), 0)
        .ok_or_else(|| CertificateError::InvalidTime(time.to_string()))
}

/// Describe a certificate, failing on undecodable fields
pub fn describe(
    certificate: &LoadedCertificate,
    store_name: &str,
    store_location: &str,
    now: DateTime<Utc>,
    warning_days: i64,
) -> Result<CertificateRecord, CertificateError> {
    let der = certificate.to_der()?;
    let (_, parsed) = X509Certificate::from_der(&der).map_err(|e| CertificateError::Parse {
        details: e.to_string(),
    })?;

    let subject = format_name(parsed.subject());
    let issuer = format_name(parsed.issuer());
    let not_before = to_utc(&parsed.validity().not_before)?;
    let not_after = to_utc(&parsed.validity().not_after)?;
    let (status, days_left) = classify_expiration(not_after, now, warning_days);

    Ok(CertificateRecord {
        name: display_name(certificate.friendly_name(), &subject),
        store_name: Some(store_name.to_string()),
        store_location: Some(store_location.to_string()),
        serial_number: Some(hex::encode_upper(parsed.raw_serial())),
        valid_from: Some(not_before.format(TIMESTAMP_FORMAT).to_string()),
        valid_until: Some(not_after.format(TIMESTAMP_FORMAT).to_string()),
        status,
        days_left: Some(days_left),
        thumbprint: Some(certificate.thumbprint().to_string()),
        has_private_key: Some(certificate.has_private_key()),
        subject: Some(subject),
        issuer: Some(issuer),
        error: None,
    })
}

/// Describe a certificate, never failing
///
/// Decoding problems produce an `Error` record carrying the failure text and
/// whatever could still be read.
pub fn extract(
    certificate: &LoadedCertificate,
    store_name: &str,
    store_location: &str,
    now: DateTime<Utc>,
    warning_days: i64,
) -> CertificateRecord {
    describe(certificate, store_name, store_location, now, warning_days).unwrap_or_else(|e| {
        let name = fallback_name(certificate);
        let mut record = CertificateRecord::failure(&name, format!("Error processing certificate: {}", e))
            .in_store(store_name, store_location);
        record.thumbprint = Some(certificate.thumbprint().to_string());
        record.has_private_key = Some(certificate.has_private_key());
        record
    })
}

/// Best-effort name read through OpenSSL when x509-parser rejects the certificate
fn fallback_name(certificate: &LoadedCertificate) -> String {
    if let Some(name) = certificate.friendly_name() {
        return name.to_string();
    }

    certificate
        .certificate()
        .subject_name()
        .entries_by_nid(openssl::nid::Nid::COMMONNAME)
        .next()
        .and_then(|entry| entry.data().as_utf8().ok())
        .map(|cn| cn.to_string())
        .unwrap_or_else(|| "Unknown Certificate".to_string())
}

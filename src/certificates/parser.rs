// Certificate Parser - Decode certificate blobs into loaded certificate handles

use crate::error::CertificateError;
use openssl::hash::MessageDigest;
use openssl::pkcs12::Pkcs12;
use openssl::pkey::{PKey, Private};
use openssl::x509::X509;
use std::fmt;

/// A parsed certificate together with the material that came with it
///
/// Handles are immutable once built. The private key, when present, lives only
/// in process memory and is released when the last handle is dropped.
pub struct LoadedCertificate {
    certificate: X509,
    private_key: Option<PKey<Private>>,
    friendly_name: Option<String>,
    thumbprint: String,
    bundled_ca: Vec<X509>,
}

impl LoadedCertificate {
    /// Build a handle, computing the thumbprint
    ///
    /// When no friendly name is given, the certificate's own alias (set from the
    /// PKCS#12 `friendlyName` attribute) is used.
    pub fn new(
        certificate: X509,
        private_key: Option<PKey<Private>>,
        friendly_name: Option<String>,
    ) -> Result<Self, CertificateError> {
        let thumbprint = compute_thumbprint(&certificate)?;
        let friendly_name = friendly_name
            .or_else(|| {
                certificate
                    .alias()
                    .map(|alias| String::from_utf8_lossy(alias).into_owned())
            })
            .filter(|name| !name.trim().is_empty());

        Ok(Self {
            certificate,
            private_key,
            friendly_name,
            thumbprint,
            bundled_ca: Vec::new(),
        })
    }

    /// Attach CA certificates that travelled with the certificate
    pub fn with_bundled_ca(mut self, bundled_ca: Vec<X509>) -> Self {
        self.bundled_ca = bundled_ca;
        self
    }

    pub fn certificate(&self) -> &X509 {
        &self.certificate
    }

    pub fn private_key(&self) -> Option<&PKey<Private>> {
        self.private_key.as_ref()
    }

    pub fn has_private_key(&self) -> bool {
        self.private_key.is_some()
    }

    pub fn friendly_name(&self) -> Option<&str> {
        self.friendly_name.as_deref()
    }

    /// Uppercase hex SHA-1 digest of the DER encoding
    pub fn thumbprint(&self) -> &str {
        &self.thumbprint
    }

    pub fn bundled_ca(&self) -> &[X509] {
        &self.bundled_ca
    }

    /// DER encoding of the certificate
    pub fn to_der(&self) -> Result<Vec<u8>, CertificateError> {
        Ok(self.certificate.to_der()?)
    }
}

impl fmt::Debug for LoadedCertificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedCertificate")
            .field("thumbprint", &self.thumbprint)
            .field("friendly_name", &self.friendly_name)
            .field("has_private_key", &self.has_private_key())
            .field("bundled_ca", &self.bundled_ca.len())
            .finish()
    }
}

/// Parse a certificate blob
///
/// With a non-empty password the blob is tried as a PKCS#12 bundle first; a
/// blob that is not PKCS#12 at all falls through to the DER and PEM decoders
/// and the password is ignored. Without one the blob is tried as DER, then PEM,
/// then as a PKCS#12 bundle with an empty password.
pub fn parse_certificate(
    bytes: &[u8],
    password: Option<&str>,
) -> Result<LoadedCertificate, CertificateError> {
    if let Some(password) = password.filter(|p| !p.is_empty())
        && Pkcs12::from_der(bytes).is_ok()
    {
        return parse_pkcs12(bytes, password);
    }

    if let Ok(certificate) = X509::from_der(bytes) {
        return LoadedCertificate::new(certificate, None, None);
    }

    if looks_like_pem(bytes) {
        return parse_pem(bytes)?
            .into_iter()
            .next()
            .ok_or_else(|| CertificateError::UnsupportedFormat {
                details: "PEM data contains no certificate".to_string(),
            });
    }

    parse_pkcs12(bytes, "").map_err(|e| CertificateError::UnsupportedFormat {
        details: format!("not a DER or PEM certificate, and not a PKCS#12 bundle ({})", e),
    })
}

/// Parse a PKCS#12 bundle
///
/// The first certificate becomes the handle; remaining CA certificates are kept
/// as bundled intermediates for chain building.
pub fn parse_pkcs12(bytes: &[u8], password: &str) -> Result<LoadedCertificate, CertificateError> {
    let bundle = Pkcs12::from_der(bytes).map_err(|e| CertificateError::Pkcs12 {
        details: e.to_string(),
    })?;
    let parsed = bundle.parse2(password).map_err(|e| CertificateError::Pkcs12 {
        details: format!("unable to decrypt bundle, the password may be wrong ({})", e),
    })?;

    let certificate = parsed.cert.ok_or(CertificateError::MissingCertificate)?;
    let bundled_ca = parsed
        .ca
        .map(|stack| stack.into_iter().collect())
        .unwrap_or_default();

    Ok(LoadedCertificate::new(certificate, parsed.pkey, None)?.with_bundled_ca(bundled_ca))
}

/// Parse every certificate in a PEM buffer
///
/// A private key in the same buffer is attached to the certificate whose public
/// key it matches.
pub fn parse_pem(bytes: &[u8]) -> Result<Vec<LoadedCertificate>, CertificateError> {
    let certificates = X509::stack_from_pem(bytes).map_err(|e| CertificateError::Parse {
        details: e.to_string(),
    })?;

    let mut private_key = if contains_private_key(bytes) {
        PKey::private_key_from_pem(bytes).ok()
    } else {
        None
    };

    certificates
        .into_iter()
        .map(|certificate| {
            let matches = match (&private_key, certificate.public_key()) {
                (Some(key), Ok(public)) => public.public_eq(key),
                _ => false,
            };
            let key = if matches { private_key.take() } else { None };
            LoadedCertificate::new(certificate, key, None)
        })
        .collect()
}

/// Uppercase hex SHA-1 digest of the certificate's DER encoding
pub fn compute_thumbprint(certificate: &X509) -> Result<String, CertificateError> {
    let digest = certificate.digest(MessageDigest::sha1())?;
    Ok(hex::encode_upper(digest))
}

/// Canonical form of a caller-supplied thumbprint
///
/// Drops separators and invisible characters copied from certificate viewers,
/// then uppercases.
pub fn normalize_thumbprint(input: &str) -> String {
    input
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

pub(crate) fn looks_like_pem(bytes: &[u8]) -> bool {
    bytes.windows(11).any(|w| w == b"-----BEGIN ")
}

fn contains_private_key(bytes: &[u8]) -> bool {
    bytes.windows(11).any(|w| w == b"PRIVATE KEY")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificates::fixtures;

    #[test]
    fn test_parse_der() {
        let cert = fixtures::self_signed("der.example", -1, 90);
        let der = cert.cert.to_der().unwrap();

        let loaded = parse_certificate(&der, None).unwrap();
        assert_eq!(loaded.thumbprint().len(), 40);
        assert!(!loaded.has_private_key());
        assert!(loaded.friendly_name().is_none());
    }

    #[test]
    fn test_parse_pem_with_key() {
        let cert = fixtures::self_signed("pem.example", -1, 90);
        let mut pem = cert.cert.to_pem().unwrap();
        pem.extend(cert.key.private_key_to_pem_pkcs8().unwrap());

        let loaded = parse_certificate(&pem, None).unwrap();
        assert!(loaded.has_private_key());
    }

    #[test]
    fn test_parse_pkcs12_with_password() {
        let cert = fixtures::self_signed("p12.example", -1, 90);
        let bundle = fixtures::pkcs12(&cert, "Web Frontend", "s3cret");

        let loaded = parse_certificate(&bundle, Some("s3cret")).unwrap();
        assert!(loaded.has_private_key());
        assert_eq!(loaded.friendly_name(), Some("Web Frontend"));
    }

    #[test]
    fn test_parse_pkcs12_wrong_password() {
        let cert = fixtures::self_signed("p12.example", -1, 90);
        let bundle = fixtures::pkcs12(&cert, "Web Frontend", "s3cret");

        let err = parse_certificate(&bundle, Some("wrong")).unwrap_err();
        assert!(matches!(err, CertificateError::Pkcs12 { .. }));
    }

    #[test]
    fn test_parse_der_ignores_password() {
        let cert = fixtures::self_signed("der.example", -1, 90);
        let der = cert.cert.to_der().unwrap();

        let loaded = parse_certificate(&der, Some("irrelevant")).unwrap();
        assert_eq!(loaded.thumbprint(), compute_thumbprint(&cert.cert).unwrap());
    }

    #[test]
    fn test_parse_pem_ignores_password() {
        let cert = fixtures::self_signed("pem.example", -1, 90);
        let pem = cert.cert.to_pem().unwrap();

        let loaded = parse_certificate(&pem, Some("irrelevant")).unwrap();
        assert_eq!(loaded.thumbprint(), compute_thumbprint(&cert.cert).unwrap());
    }

    #[test]
    fn test_parse_pkcs12_empty_password_without_password_argument() {
        let cert = fixtures::self_signed("open.example", -1, 90);
        let bundle = fixtures::pkcs12(&cert, "Open", "");

        let loaded = parse_certificate(&bundle, None).unwrap();
        assert!(loaded.has_private_key());
    }

    #[test]
    fn test_parse_garbage_is_unsupported() {
        let err = parse_certificate(b"definitely not a certificate", None).unwrap_err();
        assert!(matches!(err, CertificateError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_thumbprint_matches_digest() {
        let cert = fixtures::self_signed("digest.example", -1, 90);
        let expected = hex::encode_upper(cert.cert.digest(MessageDigest::sha1()).unwrap());

        assert_eq!(compute_thumbprint(&cert.cert).unwrap(), expected);
    }

    #[test]
    fn test_normalize_thumbprint() {
        assert_eq!(normalize_thumbprint(" ab:cd ef-01\u{200e}"), "ABCDEF01");
        assert_eq!(normalize_thumbprint(""), "");
    }
}

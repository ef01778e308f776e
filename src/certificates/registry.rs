// Certificate Registry - Process-local store of imported certificates

use super::parser::{LoadedCertificate, normalize_thumbprint};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Concurrent map from thumbprint to imported certificate
///
/// Entries live until they are removed or the process exits; nothing is
/// persisted and there is no eviction.
#[derive(Debug, Default)]
pub struct CertificateRegistry {
    certificates: RwLock<HashMap<String, Arc<LoadedCertificate>>>,
}

impl CertificateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a certificate under its thumbprint
    ///
    /// An entry with the same thumbprint is replaced.
    pub async fn add(&self, certificate: LoadedCertificate) -> String {
        let thumbprint = certificate.thumbprint().to_string();
        let mut certificates = self.certificates.write().await;
        certificates.insert(thumbprint.clone(), Arc::new(certificate));
        thumbprint
    }

    /// Look up a certificate by thumbprint
    pub async fn get(&self, thumbprint: &str) -> Option<Arc<LoadedCertificate>> {
        let certificates = self.certificates.read().await;
        certificates.get(&normalize_thumbprint(thumbprint)).cloned()
    }

    /// Snapshot of every registered certificate
    pub async fn list_all(&self) -> Vec<Arc<LoadedCertificate>> {
        let certificates = self.certificates.read().await;
        certificates.values().cloned().collect()
    }

    /// Remove a certificate, returning whether it was present
    pub async fn remove(&self, thumbprint: &str) -> bool {
        let mut certificates = self.certificates.write().await;
        certificates.remove(&normalize_thumbprint(thumbprint)).is_some()
    }

    pub async fn len(&self) -> usize {
        self.certificates.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.certificates.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificates::fixtures;

    fn loaded(cn: &str) -> LoadedCertificate {
        let cert = fixtures::self_signed(cn, -1, 90);
        LoadedCertificate::new(cert.cert, Some(cert.key), None).unwrap()
    }

    #[tokio::test]
    async fn test_add_and_get() {
        let registry = CertificateRegistry::new();
        let thumbprint = registry.add(loaded("one.example")).await;

        let found = registry.get(&thumbprint).await.unwrap();
        assert_eq!(found.thumbprint(), thumbprint);
        assert!(registry.get(&thumbprint.to_lowercase()).await.is_some());
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_add_overwrites() {
        let registry = CertificateRegistry::new();
        let cert = fixtures::self_signed("dup.example", -1, 90);

        let first = LoadedCertificate::new(cert.cert.clone(), None, Some("first".to_string())).unwrap();
        let second = LoadedCertificate::new(cert.cert.clone(), None, Some("second".to_string())).unwrap();

        let t1 = registry.add(first).await;
        let t2 = registry.add(second).await;

        assert_eq!(t1, t2);
        assert_eq!(registry.len().await, 1);
        assert_eq!(registry.get(&t1).await.unwrap().friendly_name(), Some("second"));
    }

    #[tokio::test]
    async fn test_remove() {
        let registry = CertificateRegistry::new();
        let thumbprint = registry.add(loaded("gone.example")).await;

        assert!(!registry.remove("0000").await);
        assert!(registry.remove(&thumbprint).await);
        assert!(!registry.remove(&thumbprint).await);
        assert!(registry.is_empty().await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_add_remove() {
        let registry = Arc::new(CertificateRegistry::new());
        let certificates: Vec<_> = (0..32).map(|i| loaded(&format!("host{}.example", i))).collect();

        let mut handles = Vec::new();
        for certificate in certificates {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move { registry.add(certificate).await }));
        }

        let mut thumbprints = Vec::new();
        for handle in handles {
            thumbprints.push(handle.await.unwrap());
        }
        assert_eq!(registry.len().await, 32);

        let mut handles = Vec::new();
        for thumbprint in thumbprints {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move { registry.remove(&thumbprint).await }));
        }
        for handle in handles {
            assert!(handle.await.unwrap());
        }

        assert!(registry.is_empty().await);
    }
}

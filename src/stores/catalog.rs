// Store Catalog - Configured certificate stores looked up by identifier

use super::{
    CertificateStore, DirectoryStore, StoreConfig, StoreContents, StoreId, StoreLocation,
    StoreName,
};
use crate::certificates::parser::{LoadedCertificate, normalize_thumbprint};
use crate::error::StoreError;
use openssl::x509::X509;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Every store the service knows about
#[derive(Clone, Default)]
pub struct StoreCatalog {
    stores: HashMap<StoreId, Arc<dyn CertificateStore>>,
}

impl fmt::Debug for StoreCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<String> = self.stores.keys().map(StoreId::to_string).collect();
        ids.sort();
        f.debug_struct("StoreCatalog").field("stores", &ids).finish()
    }
}

impl StoreCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build directory stores from configuration; later entries replace earlier ones
    pub fn from_config(configs: &[StoreConfig]) -> Self {
        let mut catalog = Self::new();
        for config in configs {
            let store = DirectoryStore::new(config.id(), &config.path)
                .with_password(config.password.clone());
            catalog.insert(Arc::new(store));
        }
        catalog
    }

    pub fn insert(&mut self, store: Arc<dyn CertificateStore>) {
        self.stores.insert(store.id(), store);
    }

    pub fn get(&self, id: StoreId) -> Option<Arc<dyn CertificateStore>> {
        self.stores.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    /// Open a store by identifier
    pub fn open(&self, id: StoreId) -> Result<StoreContents, StoreError> {
        self.get(id).ok_or(StoreError::NotConfigured(id))?.open()
    }

    /// Stores in lookup order: current user before local machine, personal
    /// before root before intermediate
    pub fn search_order(&self) -> Vec<Arc<dyn CertificateStore>> {
        StoreLocation::all()
            .into_iter()
            .flat_map(|location| {
                StoreName::all()
                    .into_iter()
                    .map(move |name| StoreId::new(location, name))
            })
            .filter_map(|id| self.get(id))
            .collect()
    }

    /// Read the selected stores once, in search order
    ///
    /// Stores that cannot be opened are skipped.
    pub fn snapshot(&self, include: impl Fn(StoreId) -> bool) -> StoreSnapshot {
        let mut stores = Vec::new();
        for store in self.search_order() {
            let id = store.id();
            if !include(id) {
                continue;
            }
            match store.open() {
                Ok(contents) => {
                    let certificates = contents.certificates.into_iter().map(Arc::new).collect();
                    stores.push((id, certificates));
                }
                Err(e) => warn!("Unable to read store {}: {}", id, e),
            }
        }
        StoreSnapshot { stores }
    }
}

/// Certificates read from a set of stores, shared by one validation
#[derive(Default)]
pub struct StoreSnapshot {
    stores: Vec<(StoreId, Vec<Arc<LoadedCertificate>>)>,
}

impl StoreSnapshot {
    /// First certificate with the thumbprint, in search order
    pub fn find_by_thumbprint(&self, thumbprint: &str) -> Option<(StoreId, Arc<LoadedCertificate>)> {
        let wanted = normalize_thumbprint(thumbprint);
        self.stores.iter().find_map(|(id, certificates)| {
            certificates
                .iter()
                .find(|certificate| certificate.thumbprint() == wanted)
                .map(|certificate| (*id, Arc::clone(certificate)))
        })
    }

    /// Every certificate in the given stores, for seeding trust and intermediates
    pub fn collect_certificates(&self, ids: &[StoreId]) -> Vec<X509> {
        let mut certificates = Vec::new();
        for id in ids {
            match self.stores.iter().find(|(stored, _)| stored == id) {
                Some((_, contents)) => {
                    certificates.extend(contents.iter().map(|c| c.certificate().clone()))
                }
                None => debug!("Store {} was not read, skipping", id),
            }
        }
        certificates
    }
}

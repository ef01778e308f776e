// Certificate Inventory - Store listings, imports and removals

use crate::certificates::details::{self, CertificateRecord, MEMORY_STORE_LOCATION, MEMORY_STORE_NAME};
use crate::certificates::parser::parse_certificate;
use crate::certificates::registry::CertificateRegistry;
use crate::environment::EnvironmentSource;
use crate::error::ImportError;
use crate::stores::{StoreCatalog, StoreContents, StoreId, StoreLocation, StoreName};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Which stores back each listing (`[listing]` in the config file)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingSettings {
    pub private: Vec<StoreId>,
    pub public: Vec<StoreId>,
    pub app_service: AppServiceListing,
}

impl Default for ListingSettings {
    fn default() -> Self {
        Self {
            private: vec![StoreId::new(StoreLocation::CurrentUser, StoreName::My)],
            public: Vec::new(),
            app_service: AppServiceListing::default(),
        }
    }
}

/// Listing of the certificates the hosting platform loaded for the app
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppServiceListing {
    pub stores: Vec<StoreId>,
    /// Listing is empty unless this variable is set
    pub required_variable: String,
    /// Replaces the store name in the produced records
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_label: Option<String>,
}

impl Default for AppServiceListing {
    fn default() -> Self {
        Self {
            stores: vec![StoreId::new(StoreLocation::CurrentUser, StoreName::My)],
            required_variable: "WEBSITE_LOAD_CERTIFICATES".to_string(),
            store_label: Some("AppService".to_string()),
        }
    }
}

/// Certificate inventory across stores and the in-memory registry
pub struct CertificateInventory {
    catalog: Arc<StoreCatalog>,
    registry: Arc<CertificateRegistry>,
    listing: ListingSettings,
    environment: Arc<dyn EnvironmentSource>,
    warning_days: i64,
}

impl CertificateInventory {
    pub fn new(
        catalog: Arc<StoreCatalog>,
        registry: Arc<CertificateRegistry>,
        listing: ListingSettings,
        environment: Arc<dyn EnvironmentSource>,
        warning_days: i64,
    ) -> Self {
        Self {
            catalog,
            registry,
            listing,
            environment,
            warning_days,
        }
    }

    /// Records for every entry of one store
    ///
    /// A store that cannot be opened yields a single `Error` record.
    pub async fn list_store(&self, id: StoreId) -> Vec<CertificateRecord> {
        self.list_store_as(id, None).await
    }

    async fn list_store_as(&self, id: StoreId, label: Option<&str>) -> Vec<CertificateRecord> {
        let catalog = Arc::clone(&self.catalog);
        let opened = tokio::task::spawn_blocking(move || catalog.open(id))
            .await
            .map_err(|e| e.to_string())
            .and_then(|result| result.map_err(|e| e.to_string()));

        match opened {
            Ok(contents) => self.describe_contents(id, label, contents),
            Err(reason) => {
                warn!("Failed to access certificate store {}: {}", id, reason);
                vec![CertificateRecord::failure(
                    "Error",
                    format!("Failed to access certificate store {}: {}", id, reason),
                )]
            }
        }
    }

    fn describe_contents(
        &self,
        id: StoreId,
        label: Option<&str>,
        contents: StoreContents,
    ) -> Vec<CertificateRecord> {
        let now = Utc::now();
        let store_name = label.unwrap_or(id.name.as_str());
        let store_location = id.location.as_str();

        let mut records: Vec<CertificateRecord> = contents
            .certificates
            .iter()
            .map(|certificate| {
                details::extract(certificate, store_name, store_location, now, self.warning_days)
            })
            .collect();

        records.extend(contents.rejected.into_iter().map(|rejected| {
            let name = rejected
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "Unknown Certificate".to_string());
            CertificateRecord::failure(
                &name,
                format!("Error processing certificate: {}", rejected.error),
            )
            .in_store(store_name, store_location)
        }));

        records
    }

    async fn list_stores(&self, ids: &[StoreId], label: Option<&str>) -> Vec<CertificateRecord> {
        let mut records = Vec::new();
        for id in ids {
            records.extend(self.list_store_as(*id, label).await);
        }
        records
    }

    /// Personal certificates of the configured private stores
    pub async fn private_certificates(&self) -> Vec<CertificateRecord> {
        self.list_stores(&self.listing.private, None).await
    }

    /// Certificates of the configured public stores
    pub async fn public_certificates(&self) -> Vec<CertificateRecord> {
        self.list_stores(&self.listing.public, None).await
    }

    /// Certificates the hosting platform loaded for this app
    pub async fn app_service_certificates(&self) -> Vec<CertificateRecord> {
        let app_service = &self.listing.app_service;

        if self.environment.var(&app_service.required_variable).is_none() {
            info!(
                "{} is not set, no platform certificates are loaded",
                app_service.required_variable
            );
            return Vec::new();
        }

        self.list_stores(&app_service.stores, app_service.store_label.as_deref())
            .await
    }

    /// Certificates imported into the registry
    pub async fn loaded_certificates(&self) -> Vec<CertificateRecord> {
        let now = Utc::now();
        self.registry
            .list_all()
            .await
            .iter()
            .map(|certificate| {
                details::extract(
                    certificate,
                    MEMORY_STORE_NAME,
                    MEMORY_STORE_LOCATION,
                    now,
                    self.warning_days,
                )
            })
            .collect()
    }

    /// Decode, parse and register a certificate
    ///
    /// The registry is left untouched on failure.
    pub async fn import(
        &self,
        certificate_data: &str,
        password: Option<&str>,
        friendly_name: Option<&str>,
    ) -> Result<CertificateRecord, ImportError> {
        let compact: String = certificate_data
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        if compact.is_empty() {
            return Err(ImportError::EmptyData);
        }

        let bytes = STANDARD.decode(compact.as_bytes())?;
        let certificate = parse_certificate(&bytes, password)?;

        let mut record = details::extract(
            &certificate,
            MEMORY_STORE_NAME,
            MEMORY_STORE_LOCATION,
            Utc::now(),
            self.warning_days,
        );
        if let Some(name) = friendly_name.filter(|n| !n.is_empty()) {
            record.name = name.to_string();
        }

        let thumbprint = self.registry.add(certificate).await;
        info!("Loaded certificate {} ({})", record.name, thumbprint);

        Ok(record)
    }

    /// Drop an imported certificate and its key material
    pub async fn remove(&self, thumbprint: &str) -> bool {
        let removed = self.registry.remove(thumbprint).await;
        if removed {
            info!("Removed certificate {}", thumbprint);
        } else {
            warn!("Certificate {} not found for removal", thumbprint);
        }
        removed
    }

    pub async fn loaded_count(&self) -> usize {
        self.registry.len().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificates::CertificateStatus;
    use crate::certificates::fixtures;
    use crate::environment::MapEnvironment;
    use crate::stores::StoreConfig;
    use std::fs;
    use tempfile::TempDir;

    const CU_MY: StoreId = StoreId::new(StoreLocation::CurrentUser, StoreName::My);

    fn inventory(catalog: StoreCatalog, env: MapEnvironment) -> CertificateInventory {
        CertificateInventory::new(
            Arc::new(catalog),
            Arc::new(CertificateRegistry::new()),
            ListingSettings::default(),
            Arc::new(env),
            details::DEFAULT_WARNING_DAYS,
        )
    }

    fn catalog_with_my(dir: &std::path::Path) -> StoreCatalog {
        StoreCatalog::from_config(&[StoreConfig::new(StoreLocation::CurrentUser, StoreName::My, dir)])
    }

    #[tokio::test]
    async fn test_list_store_mixes_good_and_bad_entries() {
        let dir = TempDir::new().unwrap();
        let cert = fixtures::self_signed("listed.example", -1, 90);
        fs::write(dir.path().join("listed.pem"), cert.cert.to_pem().unwrap()).unwrap();
        fs::write(dir.path().join("broken.cer"), b"\x30\x03\x02\x01").unwrap();

        let inventory = inventory(catalog_with_my(dir.path()), MapEnvironment::new());
        let records = inventory.private_certificates().await;

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "listed.example");
        assert_eq!(records[0].store_name.as_deref(), Some("My"));
        assert_eq!(records[0].store_location.as_deref(), Some("CurrentUser"));
        assert_eq!(records[1].status, CertificateStatus::Error);
        assert_eq!(records[1].name, "broken.cer");
    }

    #[tokio::test]
    async fn test_unconfigured_store_yields_error_record() {
        let inventory = inventory(StoreCatalog::new(), MapEnvironment::new());
        let records = inventory.list_store(CU_MY).await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Error");
        assert_eq!(records[0].status, CertificateStatus::Error);
        assert_eq!(
            records[0].error.as_deref(),
            Some(
                "Failed to access certificate store CurrentUser/My: \
                 Certificate store CurrentUser/My is not configured"
            )
        );
    }

    #[tokio::test]
    async fn test_public_listing_empty_by_default() {
        let dir = TempDir::new().unwrap();
        let inventory = inventory(catalog_with_my(dir.path()), MapEnvironment::new());
        assert!(inventory.public_certificates().await.is_empty());
    }

    #[tokio::test]
    async fn test_app_service_listing_requires_variable() {
        let dir = TempDir::new().unwrap();
        let cert = fixtures::self_signed("platform.example", -1, 90);
        fs::write(dir.path().join("platform.pem"), cert.cert.to_pem().unwrap()).unwrap();

        let without = inventory(catalog_with_my(dir.path()), MapEnvironment::new());
        assert!(without.app_service_certificates().await.is_empty());

        let env = MapEnvironment::new().with_var("WEBSITE_LOAD_CERTIFICATES", "*");
        let with = inventory(catalog_with_my(dir.path()), env);
        let records = with.app_service_certificates().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].store_name.as_deref(), Some("AppService"));
    }

    #[tokio::test]
    async fn test_import_and_remove() {
        let inventory = inventory(StoreCatalog::new(), MapEnvironment::new());
        let cert = fixtures::self_signed("imported.example", -1, 90);
        let encoded = STANDARD.encode(cert.cert.to_der().unwrap());
        let wrapped = format!("{}\n{}", &encoded[..20], &encoded[20..]);

        let record = inventory
            .import(&wrapped, None, Some("Imported"))
            .await
            .unwrap();
        assert_eq!(record.name, "Imported");
        assert_eq!(record.store_name.as_deref(), Some("Memory"));
        assert_eq!(record.store_location.as_deref(), Some("Application"));

        let loaded = inventory.loaded_certificates().await;
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].thumbprint, record.thumbprint);

        let thumbprint = record.thumbprint.unwrap();
        assert!(inventory.remove(&thumbprint).await);
        assert!(!inventory.remove(&thumbprint).await);
        assert_eq!(inventory.loaded_count().await, 0);
    }

    #[tokio::test]
    async fn test_import_failures_leave_registry_empty() {
        let inventory = inventory(StoreCatalog::new(), MapEnvironment::new());

        assert!(matches!(
            inventory.import("   ", None, None).await,
            Err(ImportError::EmptyData)
        ));
        assert!(matches!(
            inventory.import("%%%not-base64%%%", None, None).await,
            Err(ImportError::InvalidBase64(_))
        ));
        assert!(matches!(
            inventory.import(&STANDARD.encode(b"garbage"), None, None).await,
            Err(ImportError::Certificate(_))
        ));
        assert_eq!(inventory.loaded_count().await, 0);
    }

    #[tokio::test]
    async fn test_import_pkcs12_with_password() {
        let inventory = inventory(StoreCatalog::new(), MapEnvironment::new());
        let cert = fixtures::self_signed("bundle.example", -1, 90);
        let encoded = STANDARD.encode(fixtures::pkcs12(&cert, "Bundle Name", "pa55"));

        assert!(inventory.import(&encoded, Some("wrong"), None).await.is_err());

        let record = inventory.import(&encoded, Some("pa55"), None).await.unwrap();
        assert_eq!(record.name, "Bundle Name");
        assert_eq!(record.has_private_key, Some(true));
    }

    #[tokio::test]
    async fn test_import_der_with_unused_password() {
        let inventory = inventory(StoreCatalog::new(), MapEnvironment::new());
        let cert = fixtures::self_signed("plain.example", -1, 90);
        let encoded = STANDARD.encode(cert.cert.to_der().unwrap());

        let record = inventory
            .import(&encoded, Some("irrelevant"), None)
            .await
            .unwrap();
        assert_eq!(record.name, "plain.example");
        assert_eq!(inventory.loaded_count().await, 1);
    }

    #[tokio::test]
    async fn test_import_keeps_friendly_name_as_given() {
        let inventory = inventory(StoreCatalog::new(), MapEnvironment::new());
        let cert = fixtures::self_signed("named.example", -1, 90);
        let encoded = STANDARD.encode(cert.cert.to_der().unwrap());

        let record = inventory
            .import(&encoded, None, Some("  Padded Name "))
            .await
            .unwrap();
        assert_eq!(record.name, "  Padded Name ");

        let record = inventory.import(&encoded, None, Some("")).await.unwrap();
        assert_eq!(record.name, "named.example");
    }
}

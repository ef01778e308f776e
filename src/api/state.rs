// API State Management

use crate::api::{config::ApiConfig, routes::pages};
use crate::certificates::{CertificateRegistry, CertificateValidator};
use crate::environment::{EnvironmentSource, ProcessEnvironment, SystemInfo};
use crate::inventory::CertificateInventory;
use crate::stores::StoreCatalog;
use anyhow::Result;
use handlebars::Handlebars;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state
pub struct AppState {
    /// API configuration
    pub config: Arc<ApiConfig>,

    /// Certificates imported through the API
    pub registry: Arc<CertificateRegistry>,

    /// Configured certificate stores
    pub catalog: Arc<StoreCatalog>,

    /// Listings, imports and removals
    pub inventory: CertificateInventory,

    /// Thumbprint validation
    pub validator: CertificateValidator,

    /// Host environment
    pub environment: Arc<dyn EnvironmentSource>,

    /// Compiled page templates
    pub templates: Handlebars<'static>,

    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    /// Create state reading the process environment
    pub fn new(config: ApiConfig) -> Result<Self> {
        Self::with_environment(config, Arc::new(ProcessEnvironment))
    }

    /// Create state with an explicit environment source
    pub fn with_environment(config: ApiConfig, environment: Arc<dyn EnvironmentSource>) -> Result<Self> {
        let registry = Arc::new(CertificateRegistry::new());
        let catalog = Arc::new(StoreCatalog::from_config(&config.stores));

        let inventory = CertificateInventory::new(
            Arc::clone(&catalog),
            Arc::clone(&registry),
            config.listing.clone(),
            Arc::clone(&environment),
            config.validation.warning_days,
        );
        let validator = CertificateValidator::new(
            Arc::clone(&registry),
            Arc::clone(&catalog),
            config.validation.clone(),
        );

        Ok(Self {
            config: Arc::new(config),
            registry,
            catalog,
            inventory,
            validator,
            environment,
            templates: pages::templates()?,
            start_time: Instant::now(),
        })
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Hosting details from the environment
    pub fn system_info(&self) -> SystemInfo {
        SystemInfo::gather(self.environment.as_ref(), &self.config.environment)
    }
}

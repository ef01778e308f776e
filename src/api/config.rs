// API Configuration

use crate::certificates::validator::ValidationSettings;
use crate::environment::EnvironmentSettings;
use crate::inventory::ListingSettings;
use crate::stores::StoreConfig;
use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Enable CORS
    pub enable_cors: bool,

    /// Serve the OpenAPI document at /api/docs/openapi.json
    pub enable_openapi: bool,

    /// Maximum request body size in bytes
    pub max_body_size: usize,

    /// Route prefixes
    pub routes: RouteSettings,

    /// Certificate store locations
    pub stores: Vec<StoreConfig>,

    /// Stores behind each listing endpoint
    pub listing: ListingSettings,

    /// Chain building, revocation and network settings
    pub validation: ValidationSettings,

    /// Environment variable names
    pub environment: EnvironmentSettings,
}

/// Mount points of the route groups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteSettings {
    pub certificates: String,
    pub system: String,
    /// HTML inventory page
    pub page: String,
}

impl Default for RouteSettings {
    fn default() -> Self {
        Self {
            certificates: "/api/certinventory/certificates".to_string(),
            system: "/api/system".to_string(),
            page: "/certinventory".to_string(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
            enable_openapi: true,
            max_body_size: 10 * 1024 * 1024, // 10MB, PKCS#12 bundles arrive base64-encoded
            routes: RouteSettings::default(),
            stores: StoreConfig::default_layout(),
            listing: ListingSettings::default(),
            validation: ValidationSettings::default(),
            environment: EnvironmentSettings::default(),
        }
    }
}

impl ApiConfig {
    /// Create config from file
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path))?;
        let config: ApiConfig =
            toml::from_str(&content).with_context(|| format!("Invalid config file {}", path))?;
        Ok(config)
    }

    /// Create example config file
    pub fn create_example(path: &str) -> anyhow::Result<()> {
        let config = Self::default();
        let toml = toml::to_string_pretty(&config)?;
        std::fs::write(path, toml)?;
        Ok(())
    }

    /// Address the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

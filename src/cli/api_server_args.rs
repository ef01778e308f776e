// REST API server configuration arguments
// Licensed under GPL-3.0

use crate::api::ApiConfig;
use clap::Args;
use std::path::PathBuf;

/// REST API server configuration
///
/// Values given here override the configuration file.
#[derive(Args, Debug, Clone, Default)]
pub struct ApiServerArgs {
    /// API server host address
    #[arg(long = "host", value_name = "HOST", env = "CERTINVENTORY_HOST")]
    pub host: Option<String>,

    /// API server port
    #[arg(long = "port", value_name = "PORT", env = "PORT")]
    pub port: Option<u16>,

    /// API configuration file (TOML format)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Serve the OpenAPI document even if the configuration disables it
    #[arg(long = "openapi")]
    pub openapi: bool,

    /// Generate example API configuration file
    #[arg(long = "config-example", value_name = "FILE")]
    pub config_example: Option<PathBuf>,
}

impl ApiServerArgs {
    /// Apply command line overrides
    pub fn apply(&self, config: &mut ApiConfig) {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        config.enable_openapi = self.openapi || config.enable_openapi;
    }
}

// CLI module - Command line interface and argument parsing
// Licensed under GPL-3.0

use clap::Parser;
use tracing::Level;

mod api_server_args;

pub use api_server_args::ApiServerArgs;

/// certinventory - Certificate inventory and validation diagnostics API
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, long_about = None)]
#[command(name = "certinventory")]
#[command(about = "Diagnostics API for X.509 certificates in host stores and memory", long_about = None)]
pub struct Args {
    #[command(flatten)]
    pub server: ApiServerArgs,

    /// Log level (error, warn, info, debug, trace); overrides RUST_LOG
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<Level>,
}

impl Args {
    /// Log level from the command line, then RUST_LOG, then INFO
    pub fn effective_log_level(&self) -> Level {
        self.log_level
            .or_else(|| {
                std::env::var("RUST_LOG")
                    .ok()
                    .and_then(|s| s.parse::<Level>().ok())
            })
            .unwrap_or(Level::INFO)
    }
}

// certinventory - Certificate inventory and validation diagnostics API
// Licensed under GPL-3.0
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, version 3.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.

use anyhow::{Result, anyhow};
use certinventory::Args;
use certinventory::api::{ApiConfig, ApiServer};
use clap::Parser;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging - --log-level wins over RUST_LOG
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.effective_log_level())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Handle --config-example (generate config example and exit)
    if let Some(config_path) = &args.server.config_example {
        ApiConfig::create_example(
            config_path
                .to_str()
                .ok_or_else(|| anyhow!("Invalid file path"))?,
        )?;
        println!("✓ Example configuration saved to: {}", config_path.display());
        return Ok(());
    }

    // Load configuration from file or use defaults
    let mut config = if let Some(config_path) = &args.server.config {
        ApiConfig::from_file(
            config_path
                .to_str()
                .ok_or_else(|| anyhow!("Invalid config file path"))?,
        )?
    } else {
        ApiConfig::default()
    };

    // Override with CLI arguments
    args.server.apply(&mut config);

    info!("Starting certificate inventory v{}", env!("CARGO_PKG_VERSION"));
    for store in &config.stores {
        info!("Store {} -> {}", store.id(), store.path.display());
    }

    let server = ApiServer::new(config)?;
    server.run().await
}

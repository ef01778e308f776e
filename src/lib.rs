// certinventory - Certificate inventory and validation diagnostics API
// Licensed under GPL-3.0

//! certinventory exposes an HTTP API for enumerating, loading and validating
//! X.509 certificates held in host certificate stores or in application memory.
//! It is a read-only diagnostics tool: certificates can be inspected, imported
//! into a process-local registry, validated and removed again.

pub mod api;
pub mod certificates;
pub mod cli;
pub mod environment;
pub mod error;
pub mod inventory;
pub mod stores;

// Re-export commonly used types
pub use crate::certificates::details::{CertificateRecord, CertificateStatus};
pub use crate::certificates::registry::CertificateRegistry;
pub use crate::cli::Args;
pub use crate::error::{CertificateError, ImportError, StoreError, ValidationError};
pub use crate::inventory::CertificateInventory;

/// Result type for binary-edge operations
pub type Result<T> = anyhow::Result<T>;

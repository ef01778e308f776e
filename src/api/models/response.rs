// API Response Models

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Result of a state-changing operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OperationResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbprint: Option<String>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// API version
    pub version: String,

    /// Uptime in seconds
    pub uptime_seconds: u64,

    /// Certificates held in memory
    pub loaded_certificates: usize,
}

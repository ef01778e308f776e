// System Routes

use crate::api::state::AppState;
use crate::environment::SystemInfo;
use axum::{Json, extract::State};
use std::sync::Arc;

/// Hosting details
///
/// Hostname, certificate loading variable and service plan of the host
#[utoipa::path(
    get,
    path = "/api/system/info",
    tag = "system",
    responses(
        (status = 200, description = "System information", body = SystemInfo)
    )
)]
pub async fn system_info(State(state): State<Arc<AppState>>) -> Json<SystemInfo> {
    Json(state.system_info())
}

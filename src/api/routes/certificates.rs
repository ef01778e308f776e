// Certificate Routes

use crate::api::{
    models::{
        error::{ApiError, ErrorResponse},
        request::{ImportCertificateRequest, ValidateCertificateRequest},
        response::OperationResponse,
    },
    state::AppState,
};
use crate::certificates::{CertificateRecord, ValidationResult, normalize_thumbprint};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use std::sync::Arc;

/// List private certificates
///
/// Personal certificates from the configured private stores
#[utoipa::path(
    get,
    path = "/api/certinventory/certificates/private",
    tag = "certificates",
    responses(
        (status = 200, description = "Certificate list", body = [CertificateRecord])
    )
)]
pub async fn list_private(State(state): State<Arc<AppState>>) -> Json<Vec<CertificateRecord>> {
    Json(state.inventory.private_certificates().await)
}

/// List public certificates
#[utoipa::path(
    get,
    path = "/api/certinventory/certificates/public",
    tag = "certificates",
    responses(
        (status = 200, description = "Certificate list", body = [CertificateRecord])
    )
)]
pub async fn list_public(State(state): State<Arc<AppState>>) -> Json<Vec<CertificateRecord>> {
    Json(state.inventory.public_certificates().await)
}

/// List platform-loaded certificates
///
/// Empty unless the hosting platform was asked to load certificates
#[utoipa::path(
    get,
    path = "/api/certinventory/certificates/appservice",
    tag = "certificates",
    responses(
        (status = 200, description = "Certificate list", body = [CertificateRecord])
    )
)]
pub async fn list_app_service(State(state): State<Arc<AppState>>) -> Json<Vec<CertificateRecord>> {
    Json(state.inventory.app_service_certificates().await)
}

/// List imported certificates
#[utoipa::path(
    get,
    path = "/api/certinventory/certificates/loaded",
    tag = "certificates",
    responses(
        (status = 200, description = "Certificate list", body = [CertificateRecord])
    )
)]
pub async fn list_loaded(State(state): State<Arc<AppState>>) -> Json<Vec<CertificateRecord>> {
    Json(state.inventory.loaded_certificates().await)
}

/// Import a certificate into memory
#[utoipa::path(
    post,
    path = "/api/certinventory/certificates/load",
    tag = "certificates",
    request_body = ImportCertificateRequest,
    responses(
        (status = 200, description = "Certificate loaded", body = CertificateRecord),
        (status = 400, description = "Missing or unreadable certificate data", body = ErrorResponse)
    )
)]
pub async fn load_certificate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ImportCertificateRequest>, JsonRejection>,
) -> Result<Json<CertificateRecord>, ApiError> {
    let Json(request) = payload?;

    if request.certificate_data.trim().is_empty() {
        return Err(ApiError::bad_request("Certificate data is required"));
    }

    let record = state
        .inventory
        .import(
            &request.certificate_data,
            request.password.as_deref(),
            request.friendly_name.as_deref(),
        )
        .await?;

    Ok(Json(record))
}

/// Validate a certificate by thumbprint
///
/// Looks in memory first, then in the configured stores
#[utoipa::path(
    post,
    path = "/api/certinventory/certificates/validate",
    tag = "certificates",
    request_body = ValidateCertificateRequest,
    responses(
        (status = 200, description = "Validation result", body = ValidationResult),
        (status = 400, description = "Missing thumbprint", body = ErrorResponse)
    )
)]
pub async fn validate_certificate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ValidateCertificateRequest>, JsonRejection>,
) -> Result<Json<ValidationResult>, ApiError> {
    let Json(request) = payload?;

    if normalize_thumbprint(&request.thumbprint).is_empty() {
        return Err(ApiError::bad_request("Certificate thumbprint is required"));
    }

    let result = state
        .validator
        .validate(&request.thumbprint, &request.options())
        .await;

    Ok(Json(result))
}

/// Remove an imported certificate
#[utoipa::path(
    delete,
    path = "/api/certinventory/certificates/loaded/{thumbprint}",
    tag = "certificates",
    params(
        ("thumbprint" = String, Path, description = "Certificate SHA-1 thumbprint")
    ),
    responses(
        (status = 200, description = "Certificate removed", body = OperationResponse),
        (status = 404, description = "Certificate not loaded", body = ErrorResponse)
    )
)]
pub async fn remove_certificate(
    State(state): State<Arc<AppState>>,
    Path(thumbprint): Path<String>,
) -> Result<Json<OperationResponse>, ApiError> {
    if !state.inventory.remove(&thumbprint).await {
        return Err(ApiError::NotFound(
            "Certificate not found or could not be removed".to_string(),
        ));
    }

    Ok(Json(OperationResponse {
        success: true,
        message: "Certificate removed successfully".to_string(),
        thumbprint: Some(thumbprint),
    }))
}

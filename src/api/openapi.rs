// OpenAPI Documentation

use crate::api::{
    config::RouteSettings,
    models::{
        error::ErrorResponse,
        request::{ImportCertificateRequest, ValidateCertificateRequest},
        response::{HealthResponse, OperationResponse},
    },
    routes,
    state::AppState,
};
use crate::certificates::{CertificateRecord, CertificateStatus, ExpirationStatus, ValidationResult};
use crate::environment::SystemInfo;
use axum::{Json, extract::State};
use std::sync::Arc;
use utoipa::OpenApi;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        routes::certificates::list_private,
        routes::certificates::list_public,
        routes::certificates::list_app_service,
        routes::certificates::list_loaded,
        routes::certificates::load_certificate,
        routes::certificates::validate_certificate,
        routes::certificates::remove_certificate,
        routes::system::system_info,
        routes::health::health_check,
    ),
    components(
        schemas(
            // Request models
            ImportCertificateRequest,
            ValidateCertificateRequest,

            // Response models
            CertificateRecord,
            CertificateStatus,
            ValidationResult,
            ExpirationStatus,
            OperationResponse,
            SystemInfo,
            HealthResponse,

            // Error model
            ErrorResponse,
        )
    ),
    tags(
        (name = "certificates", description = "Certificate listing, import, removal and validation"),
        (name = "system", description = "Host information"),
        (name = "health", description = "Health check"),
    ),
    info(
        title = "Certificate Inventory API",
        version = "1.0.0",
        description = r#"
# Certificate Inventory API

Diagnostics for X.509 certificates on a web-application host.

## Features

- **Store listings**: Certificates in the personal, public and platform-loaded stores
- **In-memory imports**: Load DER, PEM or PKCS#12 data for inspection without touching the host stores
- **Validation**: Time window, chain to a trusted root, optional CRL check and client-certificate URL test

Imported certificates live in process memory only and disappear on restart.
"#,
        license(
            name = "GPL-3.0",
            url = "https://www.gnu.org/licenses/gpl-3.0.en.html"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    )
)]
pub struct ApiDoc;

/// OpenAPI document with paths moved under the configured prefixes
pub fn document(routes: &RouteSettings) -> utoipa::openapi::OpenApi {
    let defaults = RouteSettings::default();
    let mut openapi = ApiDoc::openapi();

    let paths = std::mem::take(&mut openapi.paths.paths);
    openapi.paths.paths = paths
        .into_iter()
        .map(|(path, item)| {
            let path = if let Some(rest) = path.strip_prefix(&defaults.certificates) {
                format!("{}{}", routes.certificates, rest)
            } else if let Some(rest) = path.strip_prefix(&defaults.system) {
                format!("{}{}", routes.system, rest)
            } else {
                path
            };
            (path, item)
        })
        .collect();

    openapi
}

/// Serve the OpenAPI document
pub async fn openapi_json(State(state): State<Arc<AppState>>) -> Json<utoipa::openapi::OpenApi> {
    Json(document(&state.config.routes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let openapi = document(&RouteSettings::default());
        for path in [
            "/api/certinventory/certificates/private",
            "/api/certinventory/certificates/loaded/{thumbprint}",
            "/api/system/info",
            "/health",
        ] {
            assert!(openapi.paths.paths.contains_key(path), "missing {}", path);
        }
    }

    #[test]
    fn test_document_follows_configured_prefixes() {
        let routes = RouteSettings {
            certificates: "/certs".to_string(),
            system: "/sys".to_string(),
            ..RouteSettings::default()
        };
        let openapi = document(&routes);

        assert!(openapi.paths.paths.contains_key("/certs/validate"));
        assert!(openapi.paths.paths.contains_key("/sys/info"));
        assert!(!openapi.paths.paths.contains_key("/api/system/info"));
    }
}

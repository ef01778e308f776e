// API Server Implementation

use crate::api::{
    config::{ApiConfig, RouteSettings},
    middleware, openapi, routes,
    state::AppState,
};
use anyhow::{Result, bail};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tracing::info;

/// API Server
pub struct ApiServer {
    config: ApiConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    /// Create new API server
    pub fn new(config: ApiConfig) -> Result<Self> {
        let state = Arc::new(AppState::new(config.clone())?);
        Self::with_state(state)
    }

    /// Create a server around prepared state
    pub fn with_state(state: Arc<AppState>) -> Result<Self> {
        let config = state.config.as_ref().clone();
        check_routes(&config.routes)?;
        Ok(Self { config, state })
    }

    /// Build the router
    pub fn build_router(&self) -> Router {
        let certificate_routes = Router::new()
            .route("/private", get(routes::certificates::list_private))
            .route("/public", get(routes::certificates::list_public))
            .route("/appservice", get(routes::certificates::list_app_service))
            .route("/loaded", get(routes::certificates::list_loaded))
            .route(
                "/loaded/:thumbprint",
                delete(routes::certificates::remove_certificate),
            )
            .route("/load", post(routes::certificates::load_certificate))
            .route("/validate", post(routes::certificates::validate_certificate));

        let system_routes = Router::new().route("/info", get(routes::system::system_info));

        let mut router = Router::new()
            .nest(&self.config.routes.certificates, certificate_routes)
            .nest(&self.config.routes.system, system_routes)
            .route("/health", get(routes::health::health_check))
            .route(&self.config.routes.page, get(routes::pages::inventory_page))
            .route("/", get(routes::pages::redirect_to_inventory));

        if self.config.enable_openapi {
            router = router.route("/api/docs/openapi.json", get(openapi::openapi_json));
        }

        router = router
            .layer(DefaultBodyLimit::max(self.config.max_body_size))
            .layer(middleware::catch_panic_layer())
            .layer(CompressionLayer::new());

        if self.config.enable_cors {
            router = router.layer(middleware::cors_layer());
        }

        router
            .layer(middleware::logging_layer())
            .with_state(self.state.clone())
    }

    /// Run the server
    pub async fn run(self) -> Result<()> {
        let app = self.build_router();

        let addr = self.config.bind_address();
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        info!("Certificate inventory API listening on {}", addr);
        info!("Inventory page: http://{}{}", addr, self.config.routes.page);
        if self.config.enable_openapi {
            info!("OpenAPI document: http://{}/api/docs/openapi.json", addr);
        }
        info!("Health check endpoint: http://{}/health", addr);

        axum::serve(listener, app).await?;

        Ok(())
    }

    /// Get the application state
    pub fn state(&self) -> Arc<AppState> {
        self.state.clone()
    }
}

/// Route prefixes must be absolute and cannot claim the site root
fn check_routes(routes: &RouteSettings) -> Result<()> {
    for (name, path) in [
        ("certificates", &routes.certificates),
        ("system", &routes.system),
        ("page", &routes.page),
    ] {
        if !path.starts_with('/') || path == "/" || path.ends_with('/') {
            bail!("Invalid {} route '{}': must start with '/' and not end with it", name, path);
        }
    }
    Ok(())
}

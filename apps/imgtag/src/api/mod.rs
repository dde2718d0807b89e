//! # imgtag HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /images` - First listing page (40 records)
//! - `GET /images/{page}` - Listing page
//! - `POST /images/tags-data` - Tag sample, first page (60 records)
//! - `POST /images/tags-data/{page}` - Tag sample page
//! - `GET /status` - Catalog counts
//! - `GET /health` - Health check
//!
//! Unsupported methods on a known path get 405 and unknown paths get 404,
//! both with a JSON error body. Preflight `OPTIONS` requests are answered by
//! the CORS layer.

mod handlers;
mod middleware;
mod types;

pub use handlers::{
    ApiError, LISTING_FAILURE, MATCHED_HEADER, METHOD_NOT_ALLOWED_MESSAGE, NOT_FOUND_MESSAGE,
    SEED_HEADER, TAG_DATA_FAILURE, health_handler, list_images_handler, list_images_page_handler,
    method_not_allowed_handler, not_found_handler, status_handler, tags_data_handler,
    tags_data_page_handler,
};
pub use middleware::{GlobalRateLimiter, create_rate_limiter};
pub use types::{ErrorResponse, HealthResponse, SampleRequest, StatusResponse};

use crate::config::{AppConfig, DEFAULT_RATE_LIMIT};
use crate::error::AppError;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use imgtag_core::{Catalog, Engine};
use std::sync::Arc;
use tower_http::cors::{CorsLayer, ExposeHeaders};
use tower_http::trace::TraceLayer;

/// Maximum accepted request body: 1 MiB.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

// =============================================================================
// SERVER STATE
// =============================================================================

/// HTTP-facing settings taken from [`AppConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    /// Allowed CORS origins, comma-separated, `*` for all.
    pub cors_origins: Option<String>,
    /// Requests per second, `0` disables.
    pub rate_limit: u32,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            cors_origins: None,
            rate_limit: DEFAULT_RATE_LIMIT,
        }
    }
}

impl From<&AppConfig> for ServerSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            cors_origins: config.cors_origins.clone(),
            rate_limit: config.rate_limit,
        }
    }
}

/// Shared server state.
///
/// The catalog is only read while serving, so no lock is needed; each
/// request takes its own scoped read handle.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub engine: Engine,
    pub settings: Arc<ServerSettings>,
}

impl AppState {
    /// State with the default engine and settings.
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        Self::with_settings(catalog, Engine::default(), ServerSettings::default())
    }

    #[must_use]
    pub fn with_settings(catalog: Catalog, engine: Engine, settings: ServerSettings) -> Self {
        Self {
            catalog: Arc::new(catalog),
            engine,
            settings: Arc::new(settings),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build the CORS layer from the configured origins.
///
/// - `*`: any origin
/// - unset: localhost only
/// - otherwise: the comma-separated list; invalid entries are skipped
fn build_cors_layer(origins: Option<&str>) -> CorsLayer {
    match origins.map(str::trim) {
        Some("*") => {
            tracing::warn!("CORS: Allowing ALL origins (IMGTAG_CORS_ORIGINS=*)");
            CorsLayer::permissive()
        }
        Some(list) => {
            let allowed: Vec<HeaderValue> = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .filter_map(|s| match s.parse::<HeaderValue>() {
                    Ok(hv) => {
                        tracing::info!("CORS: Allowing origin: {}", s);
                        Some(hv)
                    }
                    Err(e) => {
                        tracing::warn!("CORS: Invalid origin '{}': {}", s, e);
                        None
                    }
                })
                .collect();

            if allowed.is_empty() {
                tracing::warn!("CORS: No valid origins configured, defaulting to localhost only");
                build_localhost_cors()
            } else {
                with_common_rules(CorsLayer::new().allow_origin(allowed))
            }
        }
        None => {
            tracing::info!("CORS: No origins configured, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

/// Restrictive CORS layer for local development frontends.
fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .into_iter()
    .filter_map(|s| s.parse::<HeaderValue>().ok())
    .collect();

    with_common_rules(CorsLayer::new().allow_origin(origins))
}

fn with_common_rules(layer: CorsLayer) -> CorsLayer {
    layer
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .expose_headers(ExposeHeaders::list([MATCHED_HEADER, SEED_HEADER]))
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing
/// 2. CORS, answers preflight requests
/// 3. Body limit
/// 4. Rate limiting (if enabled)
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer(state.settings.cors_origins.as_deref());

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/status", get(handlers::status_handler))
        .route("/images", get(handlers::list_images_handler))
        .route("/images/tags-data", post(handlers::tags_data_handler))
        .route(
            "/images/tags-data/{page}",
            post(handlers::tags_data_page_handler),
        )
        .route("/images/{page}", get(handlers::list_images_page_handler))
        .method_not_allowed_fallback(handlers::method_not_allowed_handler)
        .fallback(handlers::not_found_handler);

    let rate_limit = state.settings.rate_limit;
    if rate_limit > 0 {
        tracing::info!("Rate limiting enabled: {} requests/second", rate_limit);
        router = router.layer(axum_middleware::from_fn_with_state(
            create_rate_limiter(rate_limit),
            middleware::rate_limit_middleware,
        ));
    } else {
        tracing::info!("Rate limiting disabled");
    }

    router
        .layer(axum::extract::DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Serve `state` on `addr` until Ctrl-C.
pub async fn run_server(addr: &str, state: AppState) -> Result<(), AppError> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Io(format!("Bind failed: {}", e)))?;

    tracing::info!("imgtag HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Io(format!("Server error: {}", e)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

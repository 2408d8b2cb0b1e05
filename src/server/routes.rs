//! Router configuration for camwatch.
//!
//! # Route Structure
//!
//! ```text
//! /                      - Liveness text (public)
//! /health                - Health check (public)
//! /auth/signup           - Create account (public)
//! /auth/login            - Exchange credentials for a token (public)
//! /camera                - Create / list cameras (bearer token)
//! /camera/{id}           - Read / replace / delete a camera (bearer token)
//! /alert                 - Alert feed (bearer token)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use camwatch::auth::{PasswordHasher, TokenService};
//! use camwatch::server::{create_router, AppState, RouterConfig};
//! use camwatch::store::MemoryStore;
//!
//! let state = AppState::new(
//!     Arc::new(MemoryStore::new()),
//!     TokenService::new("my-secret-key"),
//!     PasswordHasher::new(),
//! );
//! let router = create_router(state, RouterConfig::new());
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::auth::auth_gate;
use super::handlers::{
    alert_list_handler, camera_create_handler, camera_delete_handler, camera_get_handler,
    camera_list_handler, camera_update_handler, health_handler, login_handler, root_handler,
    signup_handler, AppState,
};
use crate::store::Store;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RouterConfig {
    /// By default CORS allows any origin and tracing is enabled.
    pub fn new() -> Self {
        Self {
            cors_origins: None,
            enable_tracing: true,
        }
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    pub fn with_cors_any_origin(mut self) -> Self {
        self.cors_origins = None;
        self
    }

    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// Camera and alert routes sit behind the auth gate, which verifies tokens
/// with the same [`TokenService`](crate::auth::TokenService) that login
/// issues them with.
pub fn create_router<S: Store>(state: AppState<S>, config: RouterConfig) -> Router {
    let tokens = state.tokens().clone();
    let cors = build_cors_layer(&config);

    // route_layer: only matched routes pass through the gate, so unknown
    // paths still 404 instead of 401
    let protected_routes = Router::new()
        .route(
            "/camera",
            post(camera_create_handler::<S>).get(camera_list_handler::<S>),
        )
        .route(
            "/camera/{id}",
            get(camera_get_handler::<S>)
                .put(camera_update_handler::<S>)
                .delete(camera_delete_handler::<S>),
        )
        .route("/alert", get(alert_list_handler::<S>))
        .route_layer(middleware::from_fn_with_state(tokens, auth_gate));

    let public_routes = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/auth/signup", post(signup_handler::<S>))
        .route("/auth/login", post(login_handler::<S>));

    let router = Router::new()
        .merge(protected_routes)
        .merge(public_routes)
        .with_state(state)
        .layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .max_age(Duration::from_secs(86400));

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

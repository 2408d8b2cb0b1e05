//! HTTP server layer for camwatch.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │   /auth/*  (public)        /camera, /alert  (bearer token)      │
//! │                                                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────────┐  │
//! │  │  handlers   │  │    auth     │  │        routes           │  │
//! │  │ (requests)  │  │ (auth gate) │  │  (router config)        │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//!                │
//!                ▼
//!   CredentialService / CameraRegistry / AlertFeed ──▶ Store
//! ```

pub mod auth;
pub mod handlers;
pub mod routes;

pub use auth::{auth_gate, bearer_token, AuthContext, GateRejection};
pub use handlers::{
    alert_list_handler, camera_create_handler, camera_delete_handler, camera_get_handler,
    camera_list_handler, camera_update_handler, health_handler, login_handler, root_handler,
    signup_handler, AlertQueryParams, AppState, CameraRequest, CredentialsRequest, ErrorResponse,
    HealthResponse, JsonBody, LoginResponse, QueryParams, SignupResponse,
};
pub use routes::{create_router, RouterConfig};

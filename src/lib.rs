//! # camwatch
//!
//! Backend for a camera-monitoring dashboard.
//!
//! Operators sign up and log in to obtain a bearer token, register the RTSP
//! cameras they watch, and browse the face-detection alerts a separate
//! detector process writes against those cameras.
//!
//! ## Features
//!
//! - **Accounts**: Signup/login with PBKDF2-hashed passwords
//! - **Bearer tokens**: HMAC-SHA256 signed tokens with a configurable lifetime
//! - **Camera registry**: Create, list, read, replace and delete cameras
//! - **Alert feed**: Newest-first alerts with camera filter and pagination
//! - **Storage**: In-memory store or SQLite via `rusqlite`
//!
//! ## Architecture
//!
//! - [`auth`] - Password hashing, token issuing/verification, signup/login
//! - [`camera`] - Camera registry and field validation
//! - [`alert`] - Alert feed, filter and pagination
//! - [`store`] - Store traits with memory and SQLite implementations
//! - [`server`] - Axum-based HTTP server, auth gate and routes
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use camwatch::{create_router, AppState, MemoryStore, PasswordHasher, RouterConfig, TokenService};
//!
//! #[tokio::main]
//! async fn main() {
//!     let state = AppState::new(
//!         Arc::new(MemoryStore::new()),
//!         TokenService::new("a-long-random-signing-secret-value"),
//!         PasswordHasher::new(),
//!     );
//!     let router = create_router(state, RouterConfig::new());
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub mod alert;
pub mod auth;
pub mod camera;
pub mod config;
pub mod error;
pub mod server;
pub mod store;

// Re-export commonly used types
pub use alert::{AlertFeed, AlertFilter, Pagination, DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT};
pub use auth::{CredentialService, PasswordHasher, TokenService};
pub use camera::{parse_camera_id, CameraRegistry};
pub use config::{CheckConfig, Cli, Command, ServeConfig, TokenConfig, TokenOutputFormat};
pub use error::{
    AlertError, AuthError, CameraError, StoreError, TokenError, ValidationError,
};
pub use server::{
    auth_gate, create_router, AppState, AuthContext, ErrorResponse, GateRejection, RouterConfig,
};
pub use store::{
    Alert, AlertQuery, AlertStore, AlertWithCamera, Camera, CameraFields, CameraStore,
    CredentialStore, MemoryStore, NewAlert, SqliteStore, Store, User,
};

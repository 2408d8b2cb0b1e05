//! Persistence contracts and the records they carry.
//!
//! The core services never talk to a database directly. They hold an
//! `Arc<S>` where `S` implements the store traits below, so the backing
//! engine can be swapped for tests or deployments.
//!
//! # Implementations
//!
//! - [`MemoryStore`] - process-local tables, used in tests and when no
//!   database path is configured
//! - [`SqliteStore`] - SQLite database through `rusqlite`

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::StoreError;

pub type UserId = i64;
pub type CameraId = i64;
pub type AlertId = i64;

// =============================================================================
// Records
// =============================================================================

/// A registered user. The password hash never leaves the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub password_hash: String,
}

/// A camera as stored and as serialized to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Camera {
    pub id: CameraId,
    pub name: String,
    pub rtsp_url: String,
    pub location: String,
}

/// The mutable fields of a camera, used for both inserts and full updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraFields {
    pub name: String,
    pub rtsp_url: String,
    pub location: String,
}

/// A face-detection event raised against a camera.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: AlertId,
    pub camera_id: CameraId,
    pub timestamp: DateTime<Utc>,
    /// Number of faces the detector reported
    pub faces: u32,
}

/// Alert data written by the detection process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAlert {
    pub camera_id: CameraId,
    pub timestamp: DateTime<Utc>,
    pub faces: u32,
}

/// An alert joined with the current state of its camera.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertWithCamera {
    #[serde(flatten)]
    pub alert: Alert,
    pub camera: Camera,
}

/// Filter and window for an alert listing.
///
/// Results are ordered by timestamp descending, ties by id descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertQuery {
    pub camera_id: Option<CameraId>,
    pub skip: u64,
    pub take: u64,
}

// =============================================================================
// Store Traits
// =============================================================================

/// User persistence.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert a user. Fails with [`StoreError::Conflict`] if the username exists.
    async fn create_user(&self, username: &str, password_hash: &str)
        -> Result<User, StoreError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
}

/// Camera persistence.
#[async_trait]
pub trait CameraStore: Send + Sync {
    async fn insert_camera(&self, fields: CameraFields) -> Result<Camera, StoreError>;

    /// All cameras, ascending id.
    async fn list_cameras(&self) -> Result<Vec<Camera>, StoreError>;

    async fn find_camera(&self, id: CameraId) -> Result<Option<Camera>, StoreError>;

    /// Replace all mutable fields. Returns `None` if the camera does not exist.
    async fn update_camera(
        &self,
        id: CameraId,
        fields: CameraFields,
    ) -> Result<Option<Camera>, StoreError>;

    /// Delete a camera and its alerts. Returns whether a camera was removed.
    async fn delete_camera(&self, id: CameraId) -> Result<bool, StoreError>;
}

/// Alert persistence.
///
/// The HTTP API only reads alerts. Detector processes write them into the
/// SQLite `alerts` table; `insert_alert` is that write path in-process.
#[async_trait]
pub trait AlertStore: Send + Sync {
    /// Record an alert. Fails with [`StoreError::MissingReference`] if the
    /// camera does not exist.
    async fn insert_alert(&self, alert: NewAlert) -> Result<Alert, StoreError>;

    async fn list_alerts(&self, query: AlertQuery) -> Result<Vec<AlertWithCamera>, StoreError>;
}

/// Everything the HTTP layer needs from a single backing store.
pub trait Store: CredentialStore + CameraStore + AlertStore + 'static {}

impl<T> Store for T where T: CredentialStore + CameraStore + AlertStore + 'static {}

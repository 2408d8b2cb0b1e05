//! Alert feed: read-only listing of detection events.
//!
//! Alerts are written by the external detection process straight into the
//! store. The feed only reads them, newest first, each joined with the
//! current state of its camera. Camera fields therefore reflect edits made
//! after the alert fired.

pub mod pagination;

pub use pagination::{Pagination, DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT};

use std::sync::Arc;

use tracing::debug;

use crate::error::{AlertError, ValidationError};
use crate::store::{AlertQuery, AlertStore, AlertWithCamera, CameraId};

/// Parsed filter for an alert listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlertFilter {
    pub camera_id: Option<CameraId>,
    pub pagination: Pagination,
}

impl AlertFilter {
    /// Build a filter from raw query-string values.
    ///
    /// A blank `cameraId` means no camera filter.
    pub fn from_query(
        camera_id: Option<&str>,
        page: Option<&str>,
        limit: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let camera_id = match camera_id.map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<CameraId>().map_err(|_| {
                ValidationError::new("cameraId", format!("'{}' is not a valid camera id", raw))
            })?),
        };

        Ok(Self {
            camera_id,
            pagination: Pagination::from_query(page, limit)?,
        })
    }
}

pub struct AlertFeed<S> {
    store: Arc<S>,
}

impl<S: AlertStore> AlertFeed<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// List alerts newest first, optionally restricted to one camera.
    pub async fn list(&self, filter: AlertFilter) -> Result<Vec<AlertWithCamera>, AlertError> {
        let query = AlertQuery {
            camera_id: filter.camera_id,
            skip: filter.pagination.skip(),
            take: filter.pagination.take(),
        };

        let alerts = self.store.list_alerts(query).await?;
        debug!(
            camera_id = ?filter.camera_id,
            page = filter.pagination.page(),
            limit = filter.pagination.limit(),
            count = alerts.len(),
            "Listed alerts"
        );
        Ok(alerts)
    }
}

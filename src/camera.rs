//! Camera registry: CRUD over camera records.
//!
//! Cameras are global. The caller's identity is available to the HTTP
//! handlers but is not recorded against the camera.

use std::sync::Arc;

use tracing::info;
use url::Url;

use crate::error::{CameraError, ValidationError};
use crate::store::{Camera, CameraFields, CameraId, CameraStore};

/// Maximum camera name length in characters.
pub const MAX_NAME_LEN: usize = 128;

/// Maximum location length in characters.
pub const MAX_LOCATION_LEN: usize = 256;

pub struct CameraRegistry<S> {
    store: Arc<S>,
}

impl<S: CameraStore> CameraRegistry<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn create(&self, fields: CameraFields) -> Result<Camera, CameraError> {
        let fields = validate(fields)?;
        let camera = self.store.insert_camera(fields).await?;
        info!(camera_id = camera.id, name = %camera.name, "Camera created");
        Ok(camera)
    }

    /// All cameras in ascending id order.
    pub async fn list(&self) -> Result<Vec<Camera>, CameraError> {
        Ok(self.store.list_cameras().await?)
    }

    pub async fn get(&self, id: CameraId) -> Result<Camera, CameraError> {
        self.store
            .find_camera(id)
            .await?
            .ok_or(CameraError::NotFound(id))
    }

    /// Replace name, stream URL and location.
    pub async fn update(&self, id: CameraId, fields: CameraFields) -> Result<Camera, CameraError> {
        let fields = validate(fields)?;
        let camera = self
            .store
            .update_camera(id, fields)
            .await?
            .ok_or(CameraError::NotFound(id))?;
        info!(camera_id = id, "Camera updated");
        Ok(camera)
    }

    pub async fn delete(&self, id: CameraId) -> Result<(), CameraError> {
        if !self.store.delete_camera(id).await? {
            return Err(CameraError::NotFound(id));
        }
        info!(camera_id = id, "Camera deleted");
        Ok(())
    }
}

/// Parse a camera identifier from a path segment.
pub fn parse_camera_id(raw: &str) -> Result<CameraId, ValidationError> {
    raw.trim()
        .parse::<CameraId>()
        .map_err(|_| ValidationError::new("id", format!("'{}' is not a valid camera id", raw)))
}

fn validate(fields: CameraFields) -> Result<CameraFields, ValidationError> {
    let name = fields.name.trim();
    if name.is_empty() {
        return Err(ValidationError::new("name", "must not be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::new(
            "name",
            format!("must be at most {} characters", MAX_NAME_LEN),
        ));
    }

    let rtsp_url = fields.rtsp_url.trim();
    if rtsp_url.is_empty() {
        return Err(ValidationError::new("rtspUrl", "must not be empty"));
    }
    if Url::parse(rtsp_url).is_err() {
        return Err(ValidationError::new("rtspUrl", "must be an absolute URL"));
    }

    if fields.location.chars().count() > MAX_LOCATION_LEN {
        return Err(ValidationError::new(
            "location",
            format!("must be at most {} characters", MAX_LOCATION_LEN),
        ));
    }

    Ok(CameraFields {
        name: name.to_string(),
        rtsp_url: rtsp_url.to_string(),
        location: fields.location.trim().to_string(),
    })
}

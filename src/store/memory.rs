//! In-process store.
//!
//! Tables live behind one `RwLock`, so every operation is atomic with respect
//! to the others. Identifiers are assigned from per-table counters starting
//! at 1 and are never reused. Alert timestamps keep millisecond precision,
//! matching the SQLite store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::SubsecRound;
use tokio::sync::RwLock;

use crate::error::StoreError;

use super::{
    Alert, AlertQuery, AlertStore, AlertWithCamera, Camera, CameraFields, CameraId, CameraStore,
    CredentialStore, NewAlert, User,
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    cameras: BTreeMap<CameraId, Camera>,
    alerts: Vec<Alert>,
    next_user_id: i64,
    next_camera_id: i64,
    next_alert_id: i64,
}

impl Tables {
    fn allocate(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }
}

/// Store that keeps everything in memory. Contents are lost on exit.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;

        if tables.users.iter().any(|u| u.username == username) {
            return Err(StoreError::Conflict(username.to_string()));
        }

        let user = User {
            id: Tables::allocate(&mut tables.next_user_id),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }
}

#[async_trait]
impl CameraStore for MemoryStore {
    async fn insert_camera(&self, fields: CameraFields) -> Result<Camera, StoreError> {
        let mut tables = self.tables.write().await;
        let camera = Camera {
            id: Tables::allocate(&mut tables.next_camera_id),
            name: fields.name,
            rtsp_url: fields.rtsp_url,
            location: fields.location,
        };
        tables.cameras.insert(camera.id, camera.clone());
        Ok(camera)
    }

    async fn list_cameras(&self) -> Result<Vec<Camera>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.cameras.values().cloned().collect())
    }

    async fn find_camera(&self, id: CameraId) -> Result<Option<Camera>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.cameras.get(&id).cloned())
    }

    async fn update_camera(
        &self,
        id: CameraId,
        fields: CameraFields,
    ) -> Result<Option<Camera>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(camera) = tables.cameras.get_mut(&id) else {
            return Ok(None);
        };

        camera.name = fields.name;
        camera.rtsp_url = fields.rtsp_url;
        camera.location = fields.location;
        Ok(Some(camera.clone()))
    }

    async fn delete_camera(&self, id: CameraId) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.cameras.remove(&id).is_none() {
            return Ok(false);
        }

        // Cascade
        tables.alerts.retain(|alert| alert.camera_id != id);
        Ok(true)
    }
}

#[async_trait]
impl AlertStore for MemoryStore {
    async fn insert_alert(&self, alert: NewAlert) -> Result<Alert, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.cameras.contains_key(&alert.camera_id) {
            return Err(StoreError::MissingReference(format!(
                "camera {}",
                alert.camera_id
            )));
        }

        let alert = Alert {
            id: Tables::allocate(&mut tables.next_alert_id),
            camera_id: alert.camera_id,
            timestamp: alert.timestamp.trunc_subsecs(3),
            faces: alert.faces,
        };
        tables.alerts.push(alert.clone());
        Ok(alert)
    }

    async fn list_alerts(&self, query: AlertQuery) -> Result<Vec<AlertWithCamera>, StoreError> {
        let tables = self.tables.read().await;

        let mut matching: Vec<&Alert> = tables
            .alerts
            .iter()
            .filter(|alert| query.camera_id.map_or(true, |id| alert.camera_id == id))
            .collect();
        matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));

        let skip = usize::try_from(query.skip).unwrap_or(usize::MAX);
        let take = usize::try_from(query.take).unwrap_or(usize::MAX);

        Ok(matching
            .into_iter()
            .filter_map(|alert| {
                tables.cameras.get(&alert.camera_id).map(|camera| AlertWithCamera {
                    alert: alert.clone(),
                    camera: camera.clone(),
                })
            })
            .skip(skip)
            .take(take)
            .collect())
    }
}

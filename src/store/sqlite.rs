//! SQLite-backed store.
//!
//! Tables:
//! - `users`: id, username (unique), password_hash
//! - `cameras`: id, name, rtsp_url, location
//! - `alerts`: id, camera_id (cascades on camera delete), timestamp_ms, faces
//!
//! The connection sits behind a mutex; each trait method holds it for a
//! single statement (or a statement plus its read-back).

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::StoreError;

use super::{
    Alert, AlertQuery, AlertStore, AlertWithCamera, Camera, CameraFields, CameraId, CameraStore,
    CredentialStore, NewAlert, User,
};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS cameras (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        rtsp_url TEXT NOT NULL,
        location TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS alerts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        camera_id INTEGER NOT NULL REFERENCES cameras(id) ON DELETE CASCADE,
        timestamp_ms INTEGER NOT NULL,
        faces INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_alerts_camera_time ON alerts(camera_id, timestamp_ms);
    CREATE INDEX IF NOT EXISTS idx_alerts_time ON alerts(timestamp_ms);
";

/// Store backed by a single SQLite connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        Self::init(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

fn camera_from_row(row: &Row<'_>) -> rusqlite::Result<Camera> {
    Ok(Camera {
        id: row.get(0)?,
        name: row.get(1)?,
        rtsp_url: row.get(2)?,
        location: row.get(3)?,
    })
}

fn timestamp_from_millis(column: usize, millis: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(column, millis))
}

fn find_camera_locked(conn: &Connection, id: CameraId) -> rusqlite::Result<Option<Camera>> {
    conn.query_row(
        "SELECT id, name, rtsp_url, location FROM cameras WHERE id = ?1",
        params![id],
        camera_from_row,
    )
    .optional()
}

#[async_trait]
impl CredentialStore for SqliteStore {
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        let conn = self.conn.lock();
        let result = conn.execute(
            "INSERT INTO users (username, password_hash) VALUES (?1, ?2)",
            params![username, password_hash],
        );

        match result {
            Ok(_) => Ok(User {
                id: conn.last_insert_rowid(),
                username: username.to_string(),
                password_hash: password_hash.to_string(),
            }),
            Err(err) if is_constraint_violation(&err) => {
                Err(StoreError::Conflict(username.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let conn = self.conn.lock();
        let user = conn
            .query_row(
                "SELECT id, username, password_hash FROM users WHERE username = ?1",
                params![username],
                |row| {
                    Ok(User {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        password_hash: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }
}

#[async_trait]
impl CameraStore for SqliteStore {
    async fn insert_camera(&self, fields: CameraFields) -> Result<Camera, StoreError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO cameras (name, rtsp_url, location) VALUES (?1, ?2, ?3)",
            params![fields.name, fields.rtsp_url, fields.location],
        )?;

        Ok(Camera {
            id: conn.last_insert_rowid(),
            name: fields.name,
            rtsp_url: fields.rtsp_url,
            location: fields.location,
        })
    }

    async fn list_cameras(&self) -> Result<Vec<Camera>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt =
            conn.prepare("SELECT id, name, rtsp_url, location FROM cameras ORDER BY id ASC")?;
        let cameras = stmt
            .query_map([], camera_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(cameras)
    }

    async fn find_camera(&self, id: CameraId) -> Result<Option<Camera>, StoreError> {
        let conn = self.conn.lock();
        Ok(find_camera_locked(&conn, id)?)
    }

    async fn update_camera(
        &self,
        id: CameraId,
        fields: CameraFields,
    ) -> Result<Option<Camera>, StoreError> {
        let conn = self.conn.lock();
        let changed = conn.execute(
            "UPDATE cameras SET name = ?1, rtsp_url = ?2, location = ?3 WHERE id = ?4",
            params![fields.name, fields.rtsp_url, fields.location, id],
        )?;

        if changed == 0 {
            return Ok(None);
        }
        Ok(find_camera_locked(&conn, id)?)
    }

    async fn delete_camera(&self, id: CameraId) -> Result<bool, StoreError> {
        let conn = self.conn.lock();
        let removed = conn.execute("DELETE FROM cameras WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }
}

#[async_trait]
impl AlertStore for SqliteStore {
    async fn insert_alert(&self, alert: NewAlert) -> Result<Alert, StoreError> {
        let conn = self.conn.lock();
        let result = conn.execute(
            "INSERT INTO alerts (camera_id, timestamp_ms, faces) VALUES (?1, ?2, ?3)",
            params![alert.camera_id, alert.timestamp.timestamp_millis(), alert.faces],
        );

        match result {
            Ok(_) => Ok(Alert {
                id: conn.last_insert_rowid(),
                camera_id: alert.camera_id,
                timestamp: alert.timestamp.trunc_subsecs(3),
                faces: alert.faces,
            }),
            Err(err) if is_constraint_violation(&err) => Err(StoreError::MissingReference(
                format!("camera {}", alert.camera_id),
            )),
            Err(err) => Err(err.into()),
        }
    }

    async fn list_alerts(&self, query: AlertQuery) -> Result<Vec<AlertWithCamera>, StoreError> {
        let limit = i64::try_from(query.take).unwrap_or(i64::MAX);
        let offset = i64::try_from(query.skip).unwrap_or(i64::MAX);

        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT a.id, a.camera_id, a.timestamp_ms, a.faces, c.name, c.rtsp_url, c.location
             FROM alerts a
             JOIN cameras c ON c.id = a.camera_id
             WHERE (?1 IS NULL OR a.camera_id = ?1)
             ORDER BY a.timestamp_ms DESC, a.id DESC
             LIMIT ?2 OFFSET ?3",
        )?;

        let alerts = stmt
            .query_map(params![query.camera_id, limit, offset], |row| {
                let camera_id: CameraId = row.get(1)?;
                let millis: i64 = row.get(2)?;
                Ok(AlertWithCamera {
                    alert: Alert {
                        id: row.get(0)?,
                        camera_id,
                        timestamp: timestamp_from_millis(2, millis)?,
                        faces: row.get(3)?,
                    },
                    camera: Camera {
                        id: camera_id,
                        name: row.get(4)?,
                        rtsp_url: row.get(5)?,
                        location: row.get(6)?,
                    },
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(alerts)
    }
}

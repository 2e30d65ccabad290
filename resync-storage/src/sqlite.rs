//! SQLite-backed persistence for resource values.
//!
//! Values are stored as JSON text in a single `resources` table.

use crate::backend::Backend;
use crate::error::{StoreError, StoreResult};
use resync_types::{Fields, ResourceId};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Persistent backend backed by SQLite.
pub struct SqliteBackend {
    conn: Mutex<Connection>,
}

impl SqliteBackend {
    /// Opens (or creates) a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        debug!("Opened sqlite backend at {}", path.display());
        Self::with_connection(conn)
    }

    /// Opens an in-memory database (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS resources (
                id TEXT PRIMARY KEY,
                data TEXT NOT NULL
            );
            ",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Internal("sqlite connection lock poisoned".into()))
    }
}

impl Backend for SqliteBackend {
    fn get(&self, id: &ResourceId) -> StoreResult<Option<Fields>> {
        let data: Option<String> = self
            .conn()?
            .query_row(
                "SELECT data FROM resources WHERE id = ?1",
                params![id.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        data.map(|json| serde_json::from_str(&json).map_err(StoreError::from))
            .transpose()
    }

    fn put(&self, id: &ResourceId, fields: &Fields) -> StoreResult<()> {
        let data = serde_json::to_string(fields)?;
        self.conn()?.execute(
            "INSERT INTO resources (id, data) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET data = excluded.data",
            params![id.as_str(), data],
        )?;
        Ok(())
    }

    fn remove(&self, id: &ResourceId) -> StoreResult<bool> {
        let removed = self
            .conn()?
            .execute("DELETE FROM resources WHERE id = ?1", params![id.as_str()])?;
        Ok(removed > 0)
    }

    fn list(&self) -> StoreResult<Vec<(ResourceId, Fields)>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, data FROM resources ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            let id: String = row.get(0)?;
            let data: String = row.get(1)?;
            Ok((id, data))
        })?;

        let mut resources = Vec::new();
        for row in rows {
            let (id, data) = row?;
            resources.push((ResourceId::new(id), serde_json::from_str(&data)?));
        }
        Ok(resources)
    }
}

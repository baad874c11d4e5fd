use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::info;

use crate::error::StorageError;

/// Local key-value storage on the user's device.
///
/// All operations are synchronous. Implementations must never panic on bad
/// data; every failure is reported as a [`StorageError`].
pub trait DeviceStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// SQLite-backed device store. One row per key.
/// rusqlite is blocking; callers in async contexts should keep writes short
/// or use `tokio::task::spawn_blocking`.
pub struct SqliteDeviceStore {
    conn: Connection,
}

impl SqliteDeviceStore {
    /// Open or create the store database at the given path.
    pub fn open(db_path: &Path) -> Result<Self, StorageError> {
        let open_err = |reason: String| StorageError::Open {
            path: db_path.display().to_string(),
            reason,
        };

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| open_err(format!("failed to create data dir: {}", e)))?;
        }

        let conn = Connection::open(db_path).map_err(|e| open_err(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS device_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )
        .map_err(|e| open_err(format!("failed to create table: {}", e)))?;

        info!("Opened device store at {:?}", db_path);
        Ok(Self { conn })
    }

    /// In-memory SQLite database, gone when dropped.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(|e| StorageError::Open {
            path: ":memory:".to_string(),
            reason: e.to_string(),
        })?;
        conn.execute(
            "CREATE TABLE device_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )
        .map_err(|e| StorageError::Open {
            path: ":memory:".to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { conn })
    }

    /// Timestamp of the last write to `key`, if any.
    pub fn updated_at(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.query_column("SELECT updated_at FROM device_store WHERE key = ?1", key)
    }

    fn query_column(&self, sql: &str, key: &str) -> Result<Option<String>, StorageError> {
        let read_err = |e: rusqlite::Error| StorageError::Read {
            key: key.to_string(),
            reason: e.to_string(),
        };

        let mut stmt = self.conn.prepare(sql).map_err(read_err)?;
        match stmt.query_row(params![key], |row| row.get::<_, String>(0)) {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(read_err(e)),
        }
    }
}

impl DeviceStore for SqliteDeviceStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.query_column("SELECT value FROM device_store WHERE key = ?1", key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO device_store (key, value, updated_at)
                 VALUES (?1, ?2, ?3)",
                params![key, value, Utc::now().to_rfc3339()],
            )
            .map_err(|e| StorageError::Write {
                key: key.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.conn
            .execute("DELETE FROM device_store WHERE key = ?1", params![key])
            .map_err(|e| StorageError::Remove {
                key: key.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }
}

/// Process-local store. Writes can be switched off to simulate a full or
/// read-only device.
#[derive(Default)]
pub struct MemoryDeviceStore {
    entries: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemoryDeviceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw value, bypassing serialization (e.g. a corrupt record).
    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::default();
        store.lock().insert(key.to_string(), value.to_string());
        store
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a valid map.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl DeviceStore for MemoryDeviceStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Write {
                key: key.to_string(),
                reason: "device storage is not writable".to_string(),
            });
        }
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Remove {
                key: key.to_string(),
                reason: "device storage is not writable".to_string(),
            });
        }
        self.lock().remove(key);
        Ok(())
    }
}

impl<T: DeviceStore + Sync> DeviceStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

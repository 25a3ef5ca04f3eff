// Key-value persistence for the folder snapshot
// The app_state table plays the role of browser localStorage: one key, one JSON value

use rusqlite::{params, OptionalExtension};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::database::{DatabaseManager, StorageError, StorageResult};

/// Durable home of serialized snapshots, addressed by key
pub trait SnapshotBackend: Send {
    fn read(&self, key: &str) -> StorageResult<Option<String>>;
    fn write(&self, key: &str, value: &str) -> StorageResult<()>;
}

impl DatabaseManager {
    /// Get a value from the app state store
    pub fn get_state(&self, key: &str) -> StorageResult<Option<String>> {
        self.with_connection(|conn| {
            conn.query_row(
                "SELECT value FROM app_state WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
        })
    }

    /// Set a value in the app state store
    pub fn set_state(&self, key: &str, value: &str) -> StorageResult<()> {
        self.with_connection(|conn| {
            conn.execute(
                r#"
                INSERT INTO app_state (key, value, updated_at)
                VALUES (?1, ?2, datetime('now'))
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = datetime('now')
                "#,
                params![key, value],
            )?;
            Ok(())
        })
    }

    /// Delete a value from the app state store
    pub fn delete_state(&self, key: &str) -> StorageResult<bool> {
        self.with_connection(|conn| {
            let rows_affected = conn.execute("DELETE FROM app_state WHERE key = ?1", params![key])?;
            Ok(rows_affected > 0)
        })
    }
}

impl SnapshotBackend for DatabaseManager {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        self.get_state(key)
    }

    fn write(&self, key: &str, value: &str) -> StorageResult<()> {
        self.set_state(key, value)
    }
}

/// Process-local backend; clones share the same entries
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-populated with one raw entry
    pub fn with_entry(key: &str, value: &str) -> Self {
        let backend = Self::default();
        if let Ok(mut entries) = backend.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
        backend
    }
}

impl SnapshotBackend for MemoryBackend {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

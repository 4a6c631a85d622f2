//! SQLite-backed durable storage.
//!
//! Keeps every value in a single `storage` table alongside the time it was last written,
//! so `chatkey status` can show when the key and preferences were saved.

use super::{DurableStorage, StorageEntry};
use anyhow::Result;
use chrono::{DateTime, Local};
use rusqlite::OptionalExtension;
use rusqlite::{params, Connection};
use std::path::Path;

/// Database file name inside the data directory.
const DATABASE_FILE: &str = "storage.db";

/// Durable key-value store on top of a local SQLite database.
pub struct SqliteStorage {
    /// Open connection to the database
    connection: Connection,
}

impl SqliteStorage {
    /// Opens (or creates) the storage database in the given data directory.
    ///
    /// # Arguments
    /// * `data_dir` - Directory where the database file will be stored
    ///
    /// # Errors
    /// - If the database file cannot be opened
    /// - If table creation fails
    pub fn open(data_dir: &Path) -> Result<Self> {
        let database_path = data_dir.join(DATABASE_FILE);
        let connection = Connection::open(&database_path)?;

        connection.execute(
            "CREATE TABLE IF NOT EXISTS storage (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        tracing::debug!("Storage database opened: {}", database_path.display());

        Ok(Self { connection })
    }
}

impl DurableStorage for SqliteStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .connection
            .query_row(
                "SELECT value FROM storage WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let timestamp = Local::now().to_rfc3339();

        self.connection.execute(
            "INSERT INTO storage (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, timestamp],
        )?;

        tracing::debug!("Stored value for '{key}'");
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.connection
            .execute("DELETE FROM storage WHERE key = ?1", params![key])?;

        tracing::debug!("Removed value for '{key}'");
        Ok(())
    }

    fn entries(&self) -> Result<Vec<StorageEntry>> {
        let mut statement = self
            .connection
            .prepare("SELECT key, updated_at FROM storage ORDER BY updated_at DESC")?;

        let entries = statement
            .query_map([], |row| {
                let key = row.get::<_, String>(0)?;
                let timestamp_str = row.get::<_, String>(1)?;

                let updated_at = DateTime::parse_from_rfc3339(&timestamp_str)
                    .map(|dt| dt.with_timezone(&Local))
                    .map_err(|_| {
                        rusqlite::Error::InvalidParameterName(
                            "Invalid timestamp format".to_string(),
                        )
                    })?;

                Ok(StorageEntry { key, updated_at })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();

        {
            let storage = SqliteStorage::open(dir.path()).unwrap();
            storage.set_item("gemini_api_key", "AIza-first").unwrap();
            storage.set_item("gemini_api_key", "AIza-second").unwrap();
        }

        let storage = SqliteStorage::open(dir.path()).unwrap();
        assert_eq!(
            storage.get_item("gemini_api_key").unwrap().as_deref(),
            Some("AIza-second")
        );
        assert!(dir.path().join(DATABASE_FILE).exists());
    }

    #[test]
    fn test_remove_deletes_row() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SqliteStorage::open(dir.path()).unwrap();

        storage.set_item("app_settings", "{}").unwrap();
        storage.remove_item("app_settings").unwrap();
        storage.remove_item("app_settings").unwrap();

        assert_eq!(storage.get_item("app_settings").unwrap(), None);
        assert!(storage.entries().unwrap().is_empty());
    }

    #[test]
    fn test_entries_list_written_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SqliteStorage::open(dir.path()).unwrap();

        storage.set_item("gemini_api_key", "").unwrap();
        storage.set_item("app_settings", "{}").unwrap();

        let mut keys: Vec<String> = storage.entries().unwrap().into_iter().map(|e| e.key).collect();
        keys.sort();
        assert_eq!(keys, vec!["app_settings", "gemini_api_key"]);
    }
}

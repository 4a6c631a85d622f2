//! Durable client-side storage for chatkey.
//!
//! A tiny string key-value boundary shared by the key store and the preferences record.
//! The backend is chosen once at startup: SQLite on disk for normal runs, or an
//! in-memory map for tests and `--ephemeral` sessions.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

use anyhow::anyhow;
use chrono::{DateTime, Local};
use std::path::PathBuf;

/// Storage key holding the active Gemini API key.
pub const API_KEY_STORAGE_KEY: &str = "gemini_api_key";

/// Storage key holding the JSON-encoded preferences record.
pub const SETTINGS_STORAGE_KEY: &str = "app_settings";

/// A stored entry, without its value.
#[derive(Debug, Clone)]
pub struct StorageEntry {
    /// Storage key (e.g. `gemini_api_key`)
    pub key: String,
    /// When this entry was last written
    pub updated_at: DateTime<Local>,
}

/// Namespaced string key-value store that survives restarts.
///
/// Implementations report failures through `Result`; callers in this crate treat
/// persistence as best-effort and log rather than surface those errors.
pub trait DurableStorage {
    /// Returns the stored value, or `None` when the key is absent.
    fn get_item(&self, key: &str) -> anyhow::Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> anyhow::Result<()>;

    /// Removes `key` entirely. Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> anyhow::Result<()>;

    /// Lists stored keys with their last write time, most recent first.
    ///
    /// Backends that do not track write times return an empty list.
    fn entries(&self) -> anyhow::Result<Vec<StorageEntry>> {
        Ok(Vec::new())
    }
}

impl<T: DurableStorage + ?Sized> DurableStorage for Box<T> {
    fn get_item(&self, key: &str) -> anyhow::Result<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> anyhow::Result<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> anyhow::Result<()> {
        (**self).remove_item(key)
    }

    fn entries(&self) -> anyhow::Result<Vec<StorageEntry>> {
        (**self).entries()
    }
}

/// Opens the storage backend for this run.
///
/// `ephemeral` selects the in-memory backend; otherwise the SQLite database in the
/// data directory is opened (and created on first use).
///
/// # Errors
/// - If the data directory cannot be determined or created
/// - If the database cannot be opened
pub fn open_storage(ephemeral: bool) -> anyhow::Result<Box<dyn DurableStorage>> {
    if ephemeral {
        tracing::info!("Using in-memory storage; nothing will be persisted");
        return Ok(Box::new(MemoryStorage::new()));
    }

    let data_dir = get_data_dir()?;
    let storage = SqliteStorage::open(&data_dir)?;
    Ok(Box::new(storage))
}

/// Determines the data directory, following XDG Base Directory Specification.
///
/// Prefers XDG_DATA_HOME if set, otherwise uses ~/.local/share/chatkey.
///
/// # Errors
/// - If home directory cannot be determined
/// - If the directory cannot be created
pub fn get_data_dir() -> anyhow::Result<PathBuf> {
    let data_dir = if let Ok(xdg_data) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg_data).join("chatkey")
    } else {
        let home =
            dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))?;
        home.join(".local/share/chatkey")
    };

    std::fs::create_dir_all(&data_dir)
        .map_err(|e| anyhow!("Failed to create data directory {}: {e}", data_dir.display()))?;

    Ok(data_dir)
}

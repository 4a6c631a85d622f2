//! The API key store.
//!
//! Holds the single active Gemini API key for the process, mirrors every change into
//! durable storage, and remembers the default key resolved at startup so it can be
//! restored later. Durable storage is treated as ground truth whenever it has a value.
//!
//! Persistence is best-effort: storage failures are logged and the in-memory value is
//! still updated, so a broken database never blocks the user from working.

use crate::storage::{DurableStorage, API_KEY_STORAGE_KEY};

/// Environment variable that overrides the default API key at startup.
pub const DEFAULT_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Default key compiled into the binary, taken from the build environment when present.
const BUILTIN_DEFAULT_KEY: &str = match option_env!("GOOGLE_API_KEY") {
    Some(key) => key,
    None => "",
};

/// Raw state of the persisted key record.
///
/// `set("")` and `clear()` both read back as "no key", but leave storage in different
/// states: an empty value versus no row at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoredKeyState {
    Absent,
    Empty,
    Present,
}

impl std::fmt::Display for StoredKeyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Absent => write!(f, "not stored"),
            Self::Empty => write!(f, "stored (empty)"),
            Self::Present => write!(f, "stored"),
        }
    }
}

/// Authoritative holder of the active API key.
pub struct KeyStore<S: DurableStorage> {
    /// In-memory key for this process; empty means "no key"
    current: String,
    /// Key restored by `reset_to_default`, fixed for the process lifetime
    default: String,
    storage: S,
}

impl<S: DurableStorage> KeyStore<S> {
    /// Creates a store whose in-memory key starts at `default`.
    pub fn new(storage: S, default: impl Into<String>) -> Self {
        let default = default.into();
        Self {
            current: default.clone(),
            default,
            storage,
        }
    }

    /// Returns the active key.
    ///
    /// A non-empty persisted value always wins over the in-memory one. If storage
    /// cannot be read, the in-memory value is returned.
    pub fn get(&self) -> String {
        match self.storage.get_item(API_KEY_STORAGE_KEY) {
            Ok(Some(stored)) if !stored.is_empty() => stored,
            Ok(_) => self.current.clone(),
            Err(e) => {
                tracing::warn!("Failed to read API key from storage: {e}");
                self.current.clone()
            }
        }
    }

    /// Replaces the active key and persists it. No validation happens here.
    pub fn set(&mut self, value: &str) {
        self.current = value.to_string();
        self.persist(value);
        tracing::info!("API key updated");
    }

    /// Forgets the active key and removes the persisted record entirely.
    pub fn clear(&mut self) {
        self.current.clear();
        if let Err(e) = self.storage.remove_item(API_KEY_STORAGE_KEY) {
            tracing::warn!("Failed to remove API key from storage: {e}");
        }
        tracing::info!("API key cleared");
    }

    /// Restores the default key and persists it.
    pub fn reset_to_default(&mut self) {
        self.current = self.default.clone();
        let default = self.default.clone();
        self.persist(&default);
        tracing::info!("API key reset to default");
    }

    /// Returns whether a non-blank key is available.
    pub fn has_key(&self) -> bool {
        !self.get().trim().is_empty()
    }

    /// The default key resolved at startup.
    pub fn default_key(&self) -> &str {
        &self.default
    }

    /// Inspects the raw persisted record.
    ///
    /// # Errors
    /// - If storage cannot be read
    pub fn stored_state(&self) -> anyhow::Result<StoredKeyState> {
        let state = match self.storage.get_item(API_KEY_STORAGE_KEY)? {
            None => StoredKeyState::Absent,
            Some(value) if value.is_empty() => StoredKeyState::Empty,
            Some(_) => StoredKeyState::Present,
        };
        Ok(state)
    }

    /// Storage shared with the preferences record.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn persist(&self, value: &str) {
        if let Err(e) = self.storage.set_item(API_KEY_STORAGE_KEY, value) {
            tracing::warn!("Failed to persist API key: {e}");
        }
    }
}

/// Resolves the default API key once at startup.
///
/// Order: the `GOOGLE_API_KEY` environment variable, then `default_api_key` from the
/// config file, then the key compiled into the binary (empty when none was).
pub fn resolve_default_key(configured: Option<&str>) -> String {
    resolve_default_key_from(std::env::var(DEFAULT_KEY_ENV).ok(), configured)
}

fn resolve_default_key_from(env_value: Option<String>, configured: Option<&str>) -> String {
    if let Some(key) = env_value.filter(|k| !k.trim().is_empty()) {
        tracing::debug!("Default API key taken from {DEFAULT_KEY_ENV}");
        return key;
    }
    if let Some(key) = configured.filter(|k| !k.trim().is_empty()) {
        tracing::debug!("Default API key taken from config file");
        return key.to_string();
    }
    BUILTIN_DEFAULT_KEY.to_string()
}

/// Masks a key for display, keeping the first and last four characters.
///
/// Keys of eight characters or fewer are masked completely.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "•".repeat(chars.len());
    }

    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}{}{tail}", "•".repeat(chars.len() - 8))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_support::FailingStorage;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_lifecycle_scenario() {
        let mut store = KeyStore::new(MemoryStorage::new(), "D1");
        assert_eq!(store.get(), "D1");

        store.set("XYZ");
        assert_eq!(store.get(), "XYZ");

        store.clear();
        assert!(!store.has_key());
        assert_eq!(store.get(), "");

        store.reset_to_default();
        assert_eq!(store.get(), "D1");
    }

    #[test]
    fn test_set_then_get_round_trips() {
        let mut store = KeyStore::new(MemoryStorage::new(), "D1");
        for value in ["AIzaSyExample", "  padded  ", "ключ", "a"] {
            store.set(value);
            assert_eq!(store.get(), value);
        }
    }

    #[test]
    fn test_durable_value_wins_over_memory() {
        let storage = MemoryStorage::new();
        storage.set_item(API_KEY_STORAGE_KEY, "from-disk").unwrap();

        let store = KeyStore::new(storage, "D1");
        assert_eq!(store.get(), "from-disk");
    }

    #[test]
    fn test_empty_stored_value_falls_back_to_memory() {
        let storage = MemoryStorage::new();
        storage.set_item(API_KEY_STORAGE_KEY, "").unwrap();

        let store = KeyStore::new(storage, "D1");
        assert_eq!(store.get(), "D1");
        assert!(store.has_key());
        assert_eq!(store.stored_state().unwrap(), StoredKeyState::Empty);
    }

    #[test]
    fn test_default_unaffected_by_mutations() {
        let mut store = KeyStore::new(MemoryStorage::new(), "D1");
        store.set("other");
        store.clear();
        assert_eq!(store.default_key(), "D1");

        store.reset_to_default();
        assert_eq!(store.get(), store.default_key());
    }

    #[test]
    fn test_clear_and_empty_set_differ_in_storage() {
        let mut store = KeyStore::new(MemoryStorage::new(), "");

        store.set("");
        assert_eq!(store.stored_state().unwrap(), StoredKeyState::Empty);
        assert!(!store.has_key());

        store.set("key");
        assert_eq!(store.stored_state().unwrap(), StoredKeyState::Present);

        store.clear();
        assert_eq!(store.stored_state().unwrap(), StoredKeyState::Absent);
        assert!(!store.storage().contains(API_KEY_STORAGE_KEY));
        assert!(!store.has_key());
    }

    #[test]
    fn test_whitespace_key_is_not_a_key() {
        let mut store = KeyStore::new(MemoryStorage::new(), "");
        store.set("   ");
        assert!(!store.has_key());
    }

    #[test]
    fn test_storage_failures_are_swallowed() {
        let mut store = KeyStore::new(FailingStorage, "D1");
        assert_eq!(store.get(), "D1");

        store.set("XYZ");
        assert_eq!(store.get(), "XYZ");

        store.clear();
        assert!(!store.has_key());

        store.reset_to_default();
        assert_eq!(store.get(), "D1");
        assert!(store.stored_state().is_err());
    }

    #[test]
    fn test_default_key_resolution_order() {
        assert_eq!(
            resolve_default_key_from(Some("env".to_string()), Some("cfg")),
            "env"
        );
        assert_eq!(resolve_default_key_from(Some("  ".to_string()), Some("cfg")), "cfg");
        assert_eq!(resolve_default_key_from(None, Some("cfg")), "cfg");
        assert_eq!(resolve_default_key_from(None, None), BUILTIN_DEFAULT_KEY);
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key(""), "");
        assert_eq!(mask_key("short"), "•••••");
        assert_eq!(mask_key("AIzaSyABCDEF1234"), "AIza••••••••1234");
    }
}

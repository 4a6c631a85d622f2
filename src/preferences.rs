//! User preferences persisted alongside the API key.
//!
//! The record is stored as one JSON object under `app_settings` and is always written
//! whole. Loading is forgiving: anything missing or unreadable falls back to defaults.

use crate::storage::{DurableStorage, SETTINGS_STORAGE_KEY};
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// Language used for voice input.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum VoiceLanguage {
    #[default]
    #[serde(rename = "en-US")]
    EnUs,
    #[serde(rename = "hi-IN")]
    HiIn,
}

impl VoiceLanguage {
    pub fn code(&self) -> &'static str {
        match self {
            Self::EnUs => "en-US",
            Self::HiIn => "hi-IN",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::EnUs => "English",
            Self::HiIn => "Hindi",
        }
    }

    pub fn all() -> &'static [Self] {
        &[Self::EnUs, Self::HiIn]
    }
}

impl std::fmt::Display for VoiceLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for VoiceLanguage {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .find(|lang| lang.code().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| anyhow!("Unsupported voice language '{s}' (expected en-US or hi-IN)"))
    }
}

/// The preferences record.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// Whether the chat sends automatic messages
    pub auto_message_enabled: bool,
    /// Whether the chat works without contacting the provider
    pub offline_mode: bool,
    pub voice_language: VoiceLanguage,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            auto_message_enabled: true,
            offline_mode: false,
            voice_language: VoiceLanguage::EnUs,
        }
    }
}

/// Stored shape of the record. Fields are checked one by one, so a field that is
/// missing or has the wrong type does not affect its siblings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredPreferences {
    auto_message_enabled: Option<Value>,
    offline_mode: Option<Value>,
    voice_language: Option<Value>,
}

impl Preferences {
    /// Loads the record from storage, filling absent fields with defaults.
    ///
    /// Read failures and malformed JSON are logged and give the defaults. A field with
    /// the wrong type or an unknown language code is logged and replaced with its
    /// default; the other fields are kept.
    pub fn load<S: DurableStorage + ?Sized>(storage: &S) -> Self {
        let raw = match storage.get_item(SETTINGS_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self::default(),
            Err(e) => {
                tracing::error!("Error loading settings from storage: {e}");
                return Self::default();
            }
        };

        match serde_json::from_str::<StoredPreferences>(&raw) {
            Ok(stored) => Self::from_stored(stored),
            Err(e) => {
                tracing::error!("Error parsing stored settings: {e}");
                Self::default()
            }
        }
    }

    fn from_stored(stored: StoredPreferences) -> Self {
        let defaults = Self::default();

        let voice_language = match stored.voice_language {
            None | Some(Value::Null) => defaults.voice_language,
            Some(Value::String(code)) if code.is_empty() => defaults.voice_language,
            Some(Value::String(code)) => code.parse().unwrap_or_else(|e| {
                tracing::warn!("{e}; using {}", defaults.voice_language);
                defaults.voice_language
            }),
            Some(other) => {
                tracing::warn!(
                    "Ignoring stored voiceLanguage {other}: expected a string; using {}",
                    defaults.voice_language
                );
                defaults.voice_language
            }
        };

        Self {
            auto_message_enabled: stored_bool(
                "autoMessageEnabled",
                stored.auto_message_enabled,
                defaults.auto_message_enabled,
            ),
            offline_mode: stored_bool("offlineMode", stored.offline_mode, defaults.offline_mode),
            voice_language,
        }
    }

    /// Writes all three fields to storage, replacing the previous record.
    ///
    /// Failures are logged and otherwise ignored.
    pub fn save<S: DurableStorage + ?Sized>(&self, storage: &S) {
        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Error encoding settings: {e}");
                return;
            }
        };

        match storage.set_item(SETTINGS_STORAGE_KEY, &json) {
            Ok(()) => tracing::info!("Preferences saved: {json}"),
            Err(e) => tracing::error!("Error saving settings to storage: {e}"),
        }
    }
}

/// Reads a boolean field, keeping `default` when it is absent or not a boolean.
fn stored_bool(name: &str, value: Option<Value>, default: bool) -> bool {
    match value {
        None | Some(Value::Null) => default,
        Some(Value::Bool(enabled)) => enabled,
        Some(other) => {
            tracing::warn!("Ignoring stored {name} {other}: expected a boolean; using {default}");
            default
        }
    }
}

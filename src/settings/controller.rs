//! Settings controller.
//!
//! State machine over the candidate key's validity:
//! - any edit resets the status to `Untested`
//! - test and save move it to `Valid` or `Invalid` according to the validator
//! - clear forces `Untested`; reset re-validates the default key
//!
//! Every action takes `&mut self`, so no other action can start while a validation or
//! save is running. Validation is the only await point; nothing here can be cancelled
//! once started.

use super::{KeyStatus, Notice};
use crate::clipboard::Clipboard;
use crate::keystore::{mask_key, KeyStore};
use crate::preferences::{Preferences, VoiceLanguage};
use crate::storage::DurableStorage;
use crate::validator::{run_validation, KeyValidator, ValidationOutcome};

pub struct SettingsController<'a, S: DurableStorage, V: KeyValidator> {
    store: &'a mut KeyStore<S>,
    validator: V,
    /// Key text as currently entered, not necessarily saved
    candidate: String,
    status: KeyStatus,
    validation: ValidationOutcome,
    show_key: bool,
    preferences: Preferences,
}

impl<'a, S: DurableStorage, V: KeyValidator> SettingsController<'a, S, V> {
    pub fn new(store: &'a mut KeyStore<S>, validator: V) -> Self {
        Self {
            store,
            validator,
            candidate: String::new(),
            status: KeyStatus::Untested,
            validation: ValidationOutcome::NotRequested,
            show_key: false,
            preferences: Preferences::default(),
        }
    }

    /// Reads the active key and the stored preferences.
    ///
    /// If a key is present it is validated straight away; otherwise the status stays
    /// `Untested`.
    pub async fn load(&mut self) {
        self.candidate = self.store.get();
        self.load_preferences();

        if !self.candidate.is_empty() {
            let key = self.candidate.clone();
            self.check_validity(&key).await;
        }
    }

    /// Reads the stored preferences without touching the key.
    pub fn load_preferences(&mut self) {
        self.preferences = Preferences::load(self.store.storage());
    }

    /// Replaces the candidate text. The status always returns to `Untested`.
    pub fn edit_key(&mut self, text: &str) {
        self.candidate = text.to_string();
        self.status = KeyStatus::Untested;
        self.validation = ValidationOutcome::NotRequested;
    }

    /// Validates the candidate without saving it.
    pub async fn test_key(&mut self) -> Notice {
        if self.candidate.trim().is_empty() {
            return Notice::error("API Key Required", "Please enter an API key to test.");
        }

        let key = self.candidate.clone();
        if self.check_validity(&key).await {
            Notice::success("API Key Valid", "The API key was successfully validated.")
        } else {
            invalid_key_notice()
        }
    }

    /// Validates the candidate and saves it only if the provider accepts it.
    pub async fn save_key(&mut self) -> Notice {
        if self.candidate.trim().is_empty() {
            return Notice::error("API Key Required", "Please enter a valid API key.");
        }

        let key = self.candidate.clone();
        if self.check_validity(&key).await {
            self.store.set(&key);
            Notice::success(
                "API Key Updated",
                "Your API key has been validated and saved successfully.",
            )
        } else {
            tracing::info!("API key not saved: validation failed");
            invalid_key_notice()
        }
    }

    /// Empties the candidate and removes the stored key.
    pub fn clear_key(&mut self) -> Notice {
        self.candidate.clear();
        self.store.clear();
        self.status = KeyStatus::Untested;
        self.validation = ValidationOutcome::NotRequested;
        Notice::success("API Key Cleared", "Your API key has been removed.")
    }

    /// Restores the default key and validates it again.
    pub async fn reset_to_default(&mut self) -> Notice {
        self.store.reset_to_default();
        let default = self.store.default_key().to_string();
        self.candidate = default.clone();
        self.check_validity(&default).await;
        Notice::success(
            "Default API Key Restored",
            "The application's default API key has been restored.",
        )
    }

    /// Copies the candidate to `clipboard`. Does nothing when the candidate is empty.
    pub fn copy_key<C: Clipboard>(&self, clipboard: &C) -> Option<Notice> {
        if self.candidate.is_empty() {
            return None;
        }

        if clipboard.copy(&self.candidate) {
            Some(Notice::success(
                "API Key Copied",
                "Your API key has been copied to clipboard.",
            ))
        } else {
            Some(Notice::error(
                "Copy Failed",
                "No clipboard tool is available (install wl-clipboard or xclip).",
            ))
        }
    }

    pub fn toggle_show_key(&mut self) {
        self.show_key = !self.show_key;
    }

    /// Candidate as it should be displayed: masked unless shown.
    pub fn displayed_key(&self) -> String {
        if self.show_key {
            self.candidate.clone()
        } else {
            mask_key(&self.candidate)
        }
    }

    pub fn set_auto_message(&mut self, enabled: bool) {
        self.preferences.auto_message_enabled = enabled;
    }

    pub fn set_offline_mode(&mut self, enabled: bool) {
        self.preferences.offline_mode = enabled;
    }

    pub fn set_voice_language(&mut self, language: VoiceLanguage) {
        self.preferences.voice_language = language;
    }

    /// Persists the whole preferences record.
    pub fn save_preferences(&mut self) -> Notice {
        self.preferences.save(self.store.storage());
        Notice::success(
            "Preferences Updated",
            "Your preferences have been updated successfully.",
        )
    }

    /// Persists the whole preferences record after a language change.
    pub fn save_language(&mut self) -> Notice {
        self.preferences.save(self.store.storage());
        Notice::success(
            "Language Updated",
            format!(
                "Voice input language set to {}.",
                self.preferences.voice_language.name()
            ),
        )
    }

    pub fn candidate(&self) -> &str {
        &self.candidate
    }

    pub fn status(&self) -> KeyStatus {
        self.status
    }

    pub fn validation(&self) -> &ValidationOutcome {
        &self.validation
    }

    pub fn preferences(&self) -> Preferences {
        self.preferences
    }

    pub fn store(&self) -> &KeyStore<S> {
        &*self.store
    }

    async fn check_validity(&mut self, key: &str) -> bool {
        self.validation = ValidationOutcome::Pending;

        let outcome = run_validation(&self.validator, key).await;
        let valid = outcome.is_valid();
        self.status = if valid {
            KeyStatus::Valid
        } else {
            KeyStatus::Invalid
        };
        self.validation = outcome;
        valid
    }
}

fn invalid_key_notice() -> Notice {
    Notice::error(
        "Invalid API Key",
        "The API key could not be validated. Please check and try again.",
    )
}

//! One-shot preference commands.

use super::{finish, AppKeyStore};
use crate::preferences::VoiceLanguage;
use crate::settings::SettingsController;
use crate::validator::KeyValidator;

/// Updates the auto-message and offline toggles. Omitted flags keep their saved value;
/// the whole record is written either way.
pub fn handle_prefs<V: KeyValidator>(
    store: &mut AppKeyStore,
    validator: V,
    auto_message: Option<bool>,
    offline: Option<bool>,
) -> anyhow::Result<()> {
    let mut controller = SettingsController::new(store, validator);
    controller.load_preferences();

    if let Some(enabled) = auto_message {
        controller.set_auto_message(enabled);
    }
    if let Some(enabled) = offline {
        controller.set_offline_mode(enabled);
    }

    finish(controller.save_preferences())
}

/// Sets the voice input language.
pub fn handle_language<V: KeyValidator>(
    store: &mut AppKeyStore,
    validator: V,
    language: VoiceLanguage,
) -> anyhow::Result<()> {
    let mut controller = SettingsController::new(store, validator);
    controller.load_preferences();
    controller.set_voice_language(language);
    finish(controller.save_language())
}

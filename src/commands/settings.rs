//! Interactive settings panel.
//!
//! Loads the active key and preferences, validates the key in the background of a
//! spinner, then loops over a menu of actions until the user closes the panel.

use super::{show_notice, AppKeyStore};
use crate::clipboard::SystemClipboard;
use crate::preferences::VoiceLanguage;
use crate::settings::{KeyStatus, SettingsController};
use crate::storage::DurableStorage;
use crate::validator::{KeyValidator, ValidationOutcome};
use cliclack::{confirm, intro, note, outro, password, select, spinner};
use console::style;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PanelAction {
    EnterKey,
    ToggleShowKey,
    TestKey,
    SaveKey,
    CopyKey,
    ClearKey,
    ResetKey,
    Preferences,
    Language,
    Close,
}

/// Runs the interactive settings panel.
///
/// # Errors
/// - If a prompt is cancelled or the terminal cannot be written
pub async fn handle_settings<V: KeyValidator>(
    store: &mut AppKeyStore,
    validator: V,
) -> anyhow::Result<()> {
    tracing::info!("=== chatkey settings ===");

    ctrlc::set_handler(move || {})
        .map_err(|e| anyhow::anyhow!("Failed to set Ctrl-C handler: {e}"))?;

    intro(style(" settings ").on_white().black())?;

    let mut controller = SettingsController::new(store, validator);

    let mut loading = spinner();
    loading.start("Loading settings...");
    controller.load().await;
    loading.stop(key_summary(&controller));

    loop {
        let action = select("What would you like to do?")
            .item(PanelAction::EnterKey, "Enter API key", "")
            .item(PanelAction::ToggleShowKey, "Show / hide key", "")
            .item(PanelAction::TestKey, "Test key", "checks the key without saving")
            .item(PanelAction::SaveKey, "Save key", "saved only if valid")
            .item(PanelAction::CopyKey, "Copy key", "")
            .item(PanelAction::ClearKey, "Clear key", "")
            .item(PanelAction::ResetKey, "Reset to default key", "")
            .item(PanelAction::Preferences, "Preferences", "")
            .item(PanelAction::Language, "Voice language", "")
            .item(PanelAction::Close, "Close", "")
            .interact()?;

        match action {
            PanelAction::EnterKey => {
                let text: String = password("Gemini API key:")
                    .mask('•')
                    .allow_empty()
                    .interact()?;
                controller.edit_key(&text);
                note("API key", key_summary(&controller))?;
            }
            PanelAction::ToggleShowKey => {
                controller.toggle_show_key();
                note("API key", key_summary(&controller))?;
            }
            PanelAction::TestKey => {
                let mut progress = spinner();
                progress.start("Testing API key...");
                let notice = controller.test_key().await;
                progress.stop(key_summary(&controller));
                show_notice(&notice)?;
            }
            PanelAction::SaveKey => {
                let mut progress = spinner();
                progress.start("Validating and saving API key...");
                let notice = controller.save_key().await;
                progress.stop(key_summary(&controller));
                show_notice(&notice)?;
            }
            PanelAction::CopyKey => {
                if let Some(notice) = controller.copy_key(&SystemClipboard) {
                    show_notice(&notice)?;
                }
            }
            PanelAction::ClearKey => {
                let confirmed = confirm("Remove the saved API key?")
                    .initial_value(false)
                    .interact()?;
                if confirmed {
                    show_notice(&controller.clear_key())?;
                }
            }
            PanelAction::ResetKey => {
                let mut progress = spinner();
                progress.start("Restoring default API key...");
                let notice = controller.reset_to_default().await;
                progress.stop(key_summary(&controller));
                show_notice(&notice)?;
            }
            PanelAction::Preferences => {
                let current = controller.preferences();
                let auto_message = confirm("Enable automatic messages?")
                    .initial_value(current.auto_message_enabled)
                    .interact()?;
                let offline = confirm("Enable offline mode?")
                    .initial_value(current.offline_mode)
                    .interact()?;
                controller.set_auto_message(auto_message);
                controller.set_offline_mode(offline);
                show_notice(&controller.save_preferences())?;
            }
            PanelAction::Language => {
                let current = controller.preferences().voice_language;
                let mut prompt = select("Voice input language:");
                for language in VoiceLanguage::all() {
                    prompt = prompt.item(*language, language.name(), language.code());
                }
                let language = prompt.initial_value(current).interact()?;
                controller.set_voice_language(language);
                show_notice(&controller.save_language())?;
            }
            PanelAction::Close => break,
        }
    }

    outro("Settings closed.")?;
    tracing::info!("Settings panel closed");
    Ok(())
}

/// Describes the candidate key, its validity, and why validation failed if it did.
fn key_summary<S: DurableStorage, V: KeyValidator>(controller: &SettingsController<S, V>) -> String {
    if controller.candidate().is_empty() {
        return format!("API key: {}", style("not set").dim());
    }

    let status = match controller.status() {
        KeyStatus::Valid => style("valid").green().to_string(),
        KeyStatus::Invalid => style("invalid").red().to_string(),
        KeyStatus::Untested => style("untested").yellow().to_string(),
    };

    let mut summary = format!("API key: {} ({status})", controller.displayed_key());
    if let ValidationOutcome::Failure(reason) = controller.validation() {
        summary.push_str(&format!("\n{}", style(reason).dim()));
    }
    summary
}

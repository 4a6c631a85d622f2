//! One-shot API key commands.
//!
//! Each handler drives the settings controller through a single action and prints the
//! resulting notice. Failed actions (missing input, rejected key) exit with an error.

use super::{finish, show_notice, AppKeyStore};
use crate::clipboard::SystemClipboard;
use crate::keystore::mask_key;
use crate::preferences::Preferences;
use crate::settings::SettingsController;
use crate::validator::KeyValidator;
use console::style;

/// Prints the active key (masked), its raw storage state, and the saved preferences.
pub fn handle_status(store: &AppKeyStore) -> anyhow::Result<()> {
    let key = store.get();
    let stored_state = match store.stored_state() {
        Ok(state) => state.to_string(),
        Err(e) => format!("unreadable ({e})"),
    };
    let default_state = if store.default_key().is_empty() {
        "none".to_string()
    } else {
        mask_key(store.default_key())
    };

    println!(
        "{} {}",
        style("API key:").bold(),
        if store.has_key() {
            mask_key(&key)
        } else {
            style("not set").dim().to_string()
        }
    );
    println!("{} {stored_state}", style("Storage:").bold());
    println!("{} {default_state}", style("Default key:").bold());

    let prefs = Preferences::load(store.storage());
    println!();
    println!(
        "{} {}",
        style("Auto messages:").bold(),
        on_off(prefs.auto_message_enabled)
    );
    println!("{} {}", style("Offline mode:").bold(), on_off(prefs.offline_mode));
    println!(
        "{} {} ({})",
        style("Voice language:").bold(),
        prefs.voice_language.name(),
        prefs.voice_language.code()
    );

    match store.storage().entries() {
        Ok(entries) if !entries.is_empty() => {
            println!();
            for entry in entries {
                println!(
                    "{} {}",
                    style(format!("{} saved", entry.key)).dim(),
                    entry.updated_at.format("%Y-%m-%d %H:%M:%S")
                );
            }
        }
        Ok(_) => {}
        Err(e) => tracing::warn!("Failed to list storage entries: {e}"),
    }

    Ok(())
}

/// Prints the active key, masked unless `reveal` is set.
pub fn handle_show(store: &AppKeyStore, reveal: bool) -> anyhow::Result<()> {
    if !store.has_key() {
        println!("No API key is set. Run 'chatkey save <KEY>' to add one.");
        return Ok(());
    }

    let key = store.get();
    println!("{}", if reveal { key } else { mask_key(&key) });
    Ok(())
}

/// Tests `key`, or the active key when none is given. Never changes the stored key.
pub async fn handle_test<V: KeyValidator>(
    store: &mut AppKeyStore,
    validator: V,
    key: Option<String>,
) -> anyhow::Result<()> {
    let candidate = key.unwrap_or_else(|| store.get());
    let mut controller = SettingsController::new(store, validator);
    controller.edit_key(&candidate);

    let mut spinner = cliclack::spinner();
    spinner.start("Testing API key...");
    let notice = controller.test_key().await;
    spinner.stop(format!("Status: {}", controller.status()));

    finish(notice)
}

/// Validates `key` and saves it if the provider accepts it.
pub async fn handle_save<V: KeyValidator>(
    store: &mut AppKeyStore,
    validator: V,
    key: String,
) -> anyhow::Result<()> {
    let mut controller = SettingsController::new(store, validator);
    controller.edit_key(&key);

    let mut spinner = cliclack::spinner();
    spinner.start("Validating API key...");
    let notice = controller.save_key().await;
    spinner.stop(format!("Status: {}", controller.status()));

    finish(notice)
}

/// Removes the stored key.
pub fn handle_clear<V: KeyValidator>(store: &mut AppKeyStore, validator: V) -> anyhow::Result<()> {
    let mut controller = SettingsController::new(store, validator);
    finish(controller.clear_key())
}

/// Restores the default key and validates it.
pub async fn handle_reset<V: KeyValidator>(
    store: &mut AppKeyStore,
    validator: V,
) -> anyhow::Result<()> {
    let mut controller = SettingsController::new(store, validator);

    let mut spinner = cliclack::spinner();
    spinner.start("Restoring default API key...");
    let notice = controller.reset_to_default().await;
    spinner.stop(format!("Status: {}", controller.status()));

    show_notice(&notice)?;
    Ok(())
}

/// Copies the active key to the clipboard.
pub fn handle_copy<V: KeyValidator>(
    store: &mut AppKeyStore,
    validator: V,
) -> anyhow::Result<()> {
    let candidate = store.get();
    let mut controller = SettingsController::new(store, validator);
    controller.edit_key(&candidate);

    match controller.copy_key(&SystemClipboard) {
        Some(notice) => finish(notice),
        None => {
            println!("No API key is set; nothing to copy.");
            Ok(())
        }
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

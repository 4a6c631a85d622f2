//! Application command handlers for chatkey.
//!
//! # Commands
//! - `settings`: Interactive settings panel (default)
//! - `status`: Show the key, its storage state, and the saved preferences
//! - `show`, `test`, `save`, `clear`, `reset`, `copy`: One-shot API key actions
//! - `prefs`, `language`: Update preferences
//! - `config`: Open configuration file in user's preferred editor
//! - `logs`: Display recent log entries

pub mod config;
pub mod key;
pub mod logs;
pub mod preferences;
pub mod settings;

pub use config::handle_config;
pub use key::{
    handle_clear, handle_copy, handle_reset, handle_save, handle_show, handle_status, handle_test,
};
pub use logs::handle_logs;
pub use preferences::{handle_language, handle_prefs};
pub use settings::handle_settings;

use crate::keystore::KeyStore;
use crate::settings::{Notice, NoticeLevel};
use crate::storage::DurableStorage;

/// Key store as used by the commands, over whichever storage backend was opened.
pub type AppKeyStore = KeyStore<Box<dyn DurableStorage>>;

/// Prints a notice in the cliclack log style.
pub(crate) fn show_notice(notice: &Notice) -> std::io::Result<()> {
    let text = format!("{}\n{}", notice.title, notice.description);
    match notice.level {
        NoticeLevel::Success => cliclack::log::success(text),
        NoticeLevel::Error => cliclack::log::error(text),
    }
}

/// Prints a notice and turns error notices into a failing result for one-shot commands.
pub(crate) fn finish(notice: Notice) -> anyhow::Result<()> {
    show_notice(&notice)?;
    if notice.is_error() {
        return Err(anyhow::anyhow!("{}", notice.title));
    }
    Ok(())
}

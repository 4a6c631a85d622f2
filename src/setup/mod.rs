//! First-run setup and config migration.
//!
//! Writes the default config file when none exists and stamps older configs with the
//! current version, leaving the user's settings in place.

pub mod version;

use std::path::Path;
use version::SetupState;

/// Embedded default configuration template.
const DEFAULT_CONFIG: &str = include_str!("../../environments/chatkey.toml");

/// Ensures the config file at `config_path` exists and carries the current version.
///
/// # Errors
/// Returns an error if any file operations fail.
pub fn ensure_config(config_path: &Path) -> anyhow::Result<()> {
    match version::check_setup_needed(config_path)? {
        SetupState::Missing => {
            write_default_config(config_path)?;
            tracing::info!("Default configuration written to {}", config_path.display());
        }
        SetupState::Outdated(old_version) => {
            version::update_config_version(config_path)?;
            tracing::info!(
                "Configuration migrated from version {} to {}",
                old_version,
                env!("CARGO_PKG_VERSION")
            );
        }
        SetupState::UpToDate => {
            tracing::debug!("Config version up to date ({})", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn write_default_config(config_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let full_config = format!("{}\n{}", version::version_line(), DEFAULT_CONFIG);
    std::fs::write(config_path, full_config)?;
    Ok(())
}

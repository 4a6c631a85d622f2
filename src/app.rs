//! Application orchestration and command routing.
//!
//! Parses command-line arguments, prepares logging, configuration, storage and the key
//! validator, and delegates to the appropriate command handler.

use crate::commands::{self, AppKeyStore};
use crate::config::{self, ChatkeyConfig};
use crate::keystore::{resolve_default_key, KeyStore};
use crate::logging;
use crate::preferences::VoiceLanguage;
use crate::setup;
use crate::storage::{self, DurableStorage, MemoryStorage};
use crate::validator::GeminiValidator;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::process;

/// Manage the Gemini API key and preferences of your chat assistant
#[derive(Parser)]
#[command(name = "chatkey")]
#[command(version)]
#[command(
    long_about = "Manage the Gemini API key and preferences of your chat assistant.\n\nDEFAULT COMMAND:\n    If no command is specified, the interactive settings panel opens.\n\nEXAMPLES:\n    # Validate and save a new key\n    $ chatkey save AIza...\n\n    # Check whether the saved key still works\n    $ chatkey test\n\n    # Switch voice input to Hindi\n    $ chatkey language hi-IN"
)]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/chatkey/chatkey.toml\n    Storage:            ~/.local/share/chatkey/storage.db\n    Logs:               ~/.local/state/chatkey/chatkey.log.*\n\nThe GOOGLE_API_KEY environment variable overrides the default key."
)]
struct Cli {
    /// Keep everything in memory for this run instead of the storage database
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive settings panel (default)
    #[command(visible_alias = "s")]
    Settings,

    /// Show the API key, its storage state, and the saved preferences
    Status,

    /// Print the active API key
    Show {
        /// Print the key in full instead of masked
        #[arg(long)]
        reveal: bool,
    },

    /// Check an API key with the provider without saving it
    ///
    /// Tests the active key when no key is given.
    #[command(visible_alias = "t")]
    Test {
        #[arg(value_name = "KEY")]
        key: Option<String>,
    },

    /// Validate an API key and save it if the provider accepts it
    Save {
        #[arg(value_name = "KEY")]
        key: String,
    },

    /// Remove the saved API key
    Clear,

    /// Restore the default API key and validate it
    Reset,

    /// Copy the active API key to the clipboard
    Copy,

    /// Update preferences; omitted flags keep their saved value
    Prefs {
        /// Enable or disable automatic messages
        #[arg(long, value_name = "BOOL")]
        auto_message: Option<bool>,

        /// Enable or disable offline mode
        #[arg(long, value_name = "BOOL")]
        offline: Option<bool>,
    },

    /// Set the voice input language (en-US or hi-IN)
    Language {
        #[arg(value_name = "CODE")]
        language: VoiceLanguage,
    },

    /// Open configuration file in your preferred editor
    #[command(visible_alias = "c")]
    Config,

    /// Show recent log entries from the application
    Logs,

    /// Generate shell completion script
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the main application based on command-line arguments.
///
/// # Errors
/// - If logging initialization fails
/// - If command execution fails (rejected key, missing input, terminal errors)
pub async fn run() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Commands that need neither logging nor storage
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "chatkey", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::Logs) => {
            return match commands::handle_logs() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        _ => {}
    }

    logging::init_logging()?;

    let config = load_config();
    if let Some(Commands::Config) = cli.command {
        return commands::handle_config();
    }

    let default_key = resolve_default_key(config.default_api_key.as_deref());
    let mut store = KeyStore::new(open_storage(cli.ephemeral), default_key);
    let validator = GeminiValidator::new(&config.validator)?;

    let result = dispatch(cli.command, &mut store, validator).await;

    if let Err(e) = &result {
        let err_msg = e.to_string();
        if err_msg.contains("cancelled") || err_msg.contains("interrupted") {
            // cliclack already showed "Operation cancelled"
            process::exit(0);
        }
        tracing::error!("Command failed: {err_msg}");
    }

    result
}

async fn dispatch(
    command: Option<Commands>,
    store: &mut AppKeyStore,
    validator: GeminiValidator,
) -> anyhow::Result<()> {
    match command {
        None | Some(Commands::Settings) => commands::handle_settings(store, validator).await,
        Some(Commands::Status) => commands::handle_status(store),
        Some(Commands::Show { reveal }) => commands::handle_show(store, reveal),
        Some(Commands::Test { key }) => commands::handle_test(store, validator, key).await,
        Some(Commands::Save { key }) => commands::handle_save(store, validator, key).await,
        Some(Commands::Clear) => commands::handle_clear(store, validator),
        Some(Commands::Reset) => commands::handle_reset(store, validator).await,
        Some(Commands::Copy) => commands::handle_copy(store, validator),
        Some(Commands::Prefs {
            auto_message,
            offline,
        }) => commands::handle_prefs(store, validator, auto_message, offline),
        Some(Commands::Language { language }) => {
            commands::handle_language(store, validator, language)
        }
        Some(Commands::Config) | Some(Commands::Logs) | Some(Commands::Completions { .. }) => {
            unreachable!("These commands are handled earlier")
        }
    }
}

/// Runs first-run setup if needed and loads the config file, falling back to defaults.
fn load_config() -> ChatkeyConfig {
    match config::get_config_path() {
        Ok(config_path) => {
            if let Err(e) = setup::ensure_config(&config_path) {
                tracing::error!("Setup failed: {e}");
            }
        }
        Err(e) => tracing::error!("Could not locate config file: {e}"),
    }

    ChatkeyConfig::load_or_default()
}

/// Opens durable storage, degrading to in-memory storage if the database is unusable.
fn open_storage(ephemeral: bool) -> Box<dyn DurableStorage> {
    storage::open_storage(ephemeral).unwrap_or_else(|e| {
        tracing::error!("Storage unavailable, settings will not persist: {e}");
        Box::new(MemoryStorage::new())
    })
}

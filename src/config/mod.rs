//! Configuration management for chatkey.
//!
//! Application settings live in a TOML file in the user's config directory. The API key
//! and user preferences are not part of it; they are kept in durable storage
//! (see [`crate::storage`]).

pub mod file;

pub use file::{get_config_path, ChatkeyConfig, ValidatorConfig};

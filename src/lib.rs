//! chatkey: settings for a Gemini-powered chat assistant.
//!
//! Stores the provider API key and a few user preferences in local durable storage,
//! validates keys against the provider before saving them, and exposes it all as an
//! interactive panel and a set of one-shot commands.

pub mod app;
pub mod clipboard;
pub mod commands;
pub mod config;
pub mod keystore;
pub mod logging;
pub mod preferences;
pub mod settings;
pub mod setup;
pub mod storage;
pub mod validator;

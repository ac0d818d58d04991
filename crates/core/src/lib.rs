//! Shared foundations for the moltbot workspace: configuration loading and the
//! failure taxonomy every layer maps into before a reply reaches a transport.

pub mod config;
pub mod errors;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use errors::{TurnError, APOLOGY_MESSAGE, EMPTY_REPLY_FALLBACK};

//! Configuration module for relschema.
//!
//! Handles connection configuration, environment variables, and settings.

mod connection;
mod settings;

pub use connection::{ConnectionConfig, ConnectionError, Driver};
pub use settings::{
    expand_env_vars, BuilderSettings, ConnectionSettings, LogLevel, OutputSettings, Settings,
    SettingsError,
};

//! TOML-based configuration for relschema.
//!
//! Supports a config file (relschema.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! log_level = "info"
//!
//! [connection]
//! driver = "pg"
//! host = "localhost"
//! port = 5432
//! user = "postgres"
//! password = "${PGPASSWORD}"
//! database = "app"
//! schema = "public"
//!
//! [output]
//! format = "ts"
//! outdir = "./gen"
//!
//! [builder]
//! transitive_relations = true
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::connection::{ConnectionConfig, ConnectionError, Driver};
use crate::inference::BuilderOptions;
use crate::output::Format;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error(transparent)]
    Connection(#[from] ConnectionError),
}

/// Verbosity of the CLI log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[default]
    Info,
    /// Also logs every catalog query.
    Debug,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub log_level: LogLevel,
    pub connection: ConnectionSettings,
    pub output: OutputSettings,
    pub builder: BuilderSettings,
}

/// Connection section. Every field is optional so that the file, the
/// environment and command-line flags can each supply part of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Database driver (mysql, pg).
    pub driver: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    /// Password (supports ${ENV_VAR} expansion).
    pub password: Option<String>,
    pub database: Option<String>,
    pub schema: Option<String>,
}

impl ConnectionSettings {
    /// Connection values from `RELSCHEMA_DB_*` environment variables.
    ///
    /// Reads `RELSCHEMA_DB_DRIVER`, `_HOST`, `_PORT`, `_USER`, `_PASSWORD`,
    /// `_NAME` (the database) and `_SCHEMA`. Unset variables leave the field
    /// empty.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("RELSCHEMA_DB_PORT") {
            Some(p) => Some(p.trim().parse().map_err(|_| {
                ConnectionError::InvalidConfig(format!("RELSCHEMA_DB_PORT is not a port: {}", p))
            })?),
            None => None,
        };

        Ok(ConnectionSettings {
            driver: lookup("RELSCHEMA_DB_DRIVER"),
            host: lookup("RELSCHEMA_DB_HOST"),
            port,
            user: lookup("RELSCHEMA_DB_USER"),
            password: lookup("RELSCHEMA_DB_PASSWORD"),
            database: lookup("RELSCHEMA_DB_NAME"),
            schema: lookup("RELSCHEMA_DB_SCHEMA"),
        })
    }

    /// Overlay `overrides` on top of `self`; fields set in `overrides` win.
    pub fn merged_with(&self, overrides: &ConnectionSettings) -> ConnectionSettings {
        fn pick<T: Clone>(over: &Option<T>, base: &Option<T>) -> Option<T> {
            over.clone().or_else(|| base.clone())
        }

        ConnectionSettings {
            driver: pick(&overrides.driver, &self.driver),
            host: pick(&overrides.host, &self.host),
            port: overrides.port.or(self.port),
            user: pick(&overrides.user, &self.user),
            password: pick(&overrides.password, &self.password),
            database: pick(&overrides.database, &self.database),
            schema: pick(&overrides.schema, &self.schema),
        }
    }

    /// Resolve into a [`ConnectionConfig`], expanding environment variables.
    ///
    /// Fails on an unknown or absent driver; other missing fields are left
    /// for [`ConnectionConfig::validate`] to report.
    pub fn to_connection_config(&self) -> Result<ConnectionConfig, SettingsError> {
        let driver = self
            .driver
            .as_deref()
            .ok_or(ConnectionError::MissingField("driver"))?;
        let driver = Driver::from_str(&expand_env_vars(driver)?)?;

        let expand = |value: &Option<String>| -> Result<Option<String>, SettingsError> {
            value.as_deref().map(expand_env_vars).transpose()
        };

        let mut config = ConnectionConfig::new(driver, expand(&self.database)?.unwrap_or_default());
        if let Some(host) = expand(&self.host)? {
            config.host = host;
        }
        config.port = self.port;
        config.user = expand(&self.user)?.unwrap_or_default();
        config.password = expand(&self.password)?;
        config.schema = expand(&self.schema)?;
        Ok(config)
    }
}

/// Output section.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputSettings {
    pub format: Format,
    pub outdir: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            format: Format::Json,
            outdir: PathBuf::from("./gen"),
        }
    }
}

/// Builder section.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BuilderSettings {
    /// Emit many-to-many relations through junction tables.
    pub transitive_relations: bool,
}

impl Default for BuilderSettings {
    fn default() -> Self {
        Self {
            transitive_relations: true,
        }
    }
}

impl BuilderSettings {
    pub fn options(&self) -> BuilderOptions {
        BuilderOptions {
            include_transitive_relations: self.transitive_relations,
        }
    }
}

impl Settings {
    /// Resolve the connection from `env`, then this file's `[connection]`
    /// section, then `overrides`; later layers win field by field.
    pub fn connection_config(
        &self,
        env: &ConnectionSettings,
        overrides: &ConnectionSettings,
    ) -> Result<ConnectionConfig, SettingsError> {
        env.merged_with(&self.connection)
            .merged_with(overrides)
            .to_connection_config()
    }

    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `RELSCHEMA_CONFIG`
    /// 2. `./relschema.toml`
    /// 3. `~/.config/relschema/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("RELSCHEMA_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("relschema.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("relschema").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let mut var_name = String::new();
        if chars.peek() == Some(&'{') {
            chars.next();
            for ch in chars.by_ref() {
                if ch == '}' {
                    break;
                }
                var_name.push(ch);
            }
        } else {
            while let Some(&ch) = chars.peek() {
                if !(ch.is_alphanumeric() || ch == '_') {
                    break;
                }
                var_name.push(ch);
                chars.next();
            }
            if var_name.is_empty() {
                // lone '$'
                result.push('$');
                continue;
            }
        }

        let value = env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}

//! Database connection configuration.
//!
//! A [`ConnectionConfig`] is the fully resolved result of layering the
//! environment, the settings file and command-line flags; see
//! [`ConnectionSettings`](super::ConnectionSettings).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::ConnectionSummary;

/// Error type for connection configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("Unsupported driver: {0}. Supported: mysql, pg")]
    UnsupportedDriver(String),

    #[error("Missing required connection field: {0}")]
    MissingField(&'static str),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Supported database drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Driver {
    MySql,
    Postgres,
}

impl Driver {
    /// Parse driver from string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, ConnectionError> {
        match s.to_lowercase().as_str() {
            "mysql" => Ok(Driver::MySql),
            "pg" | "postgres" | "postgresql" => Ok(Driver::Postgres),
            other => Err(ConnectionError::UnsupportedDriver(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Driver::MySql => "mysql",
            Driver::Postgres => "pg",
        }
    }

    /// Get the default port for this driver.
    pub fn default_port(&self) -> u16 {
        match self {
            Driver::MySql => 3306,
            Driver::Postgres => 5432,
        }
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Driver {
    type Error = ConnectionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Driver::from_str(&value)
    }
}

impl From<Driver> for String {
    fn from(driver: Driver) -> Self {
        driver.as_str().to_string()
    }
}

/// Database connection configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub driver: Driver,
    pub host: String,
    /// Port (optional, falls back to the driver default).
    pub port: Option<u16>,
    pub user: String,
    pub password: Option<String>,
    pub database: String,
    /// Schema to introspect. Postgres only; MySQL uses the database.
    pub schema: Option<String>,
}

// Keeps the password out of logs.
impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("driver", &self.driver)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("database", &self.database)
            .field("schema", &self.schema)
            .finish()
    }
}

impl ConnectionConfig {
    pub fn new(driver: Driver, database: impl Into<String>) -> Self {
        Self {
            driver,
            host: "localhost".to_string(),
            port: None,
            user: String::new(),
            password: None,
            database: database.into(),
            schema: None,
        }
    }

    /// Check that every field needed to connect is present.
    pub fn validate(&self) -> Result<(), ConnectionError> {
        if self.host.trim().is_empty() {
            return Err(ConnectionError::MissingField("host"));
        }
        if self.user.trim().is_empty() {
            return Err(ConnectionError::MissingField("user"));
        }
        if self.database.trim().is_empty() {
            return Err(ConnectionError::MissingField("database"));
        }
        if self.port == Some(0) {
            return Err(ConnectionError::InvalidConfig("port must be non-zero".to_string()));
        }
        Ok(())
    }

    /// Port to connect to, defaulting per driver.
    pub fn port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.driver.default_port())
    }

    /// The catalog schema whose tables are introspected.
    pub fn schema_name(&self) -> String {
        match self.driver {
            Driver::Postgres => self.schema.clone().unwrap_or_else(|| "public".to_string()),
            Driver::MySql => self.database.clone(),
        }
    }

    /// Connection details safe to embed in the output document.
    pub fn summary(&self) -> ConnectionSummary {
        ConnectionSummary {
            host: self.host.clone(),
            port: self.port(),
            user: self.user.clone(),
        }
    }
}

//! configuration types for the rampart server.

use serde::{Deserialize, Serialize};

/// main configuration for the rampart server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// address the http api listens on.
    pub listen_addr: String,
    /// database configuration.
    pub database: DatabaseConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            database: DatabaseConfig::default(),
        }
    }
}

/// database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// database type, "sqlite" or "postgres".
    pub db_type: String,
    /// connection string; a file path for sqlite, a url for postgres.
    pub connection_string: String,
    /// sqlite-specific settings, ignored for postgres.
    pub sqlite: SqliteConfig,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: "sqlite".to_string(),
            connection_string: "/var/lib/rampart/db.sqlite".to_string(),
            sqlite: SqliteConfig::default(),
        }
    }
}

/// sqlite-specific database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SqliteConfig {
    /// enable write-ahead logging on connect.
    pub write_ahead_log: bool,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self { write_ahead_log: true }
    }
}

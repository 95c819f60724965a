//! API server configuration.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`STOREHOUSE_*`)
//! 2. Config file (`STOREHOUSE_CONFIG`, else `./storehouse.toml` if present)
//! 3. Defaults (this file)
//!
//! ```toml
//! [server]
//! bind_addr = "0.0.0.0"
//! port = 5000
//!
//! [database]
//! path = "storehouse.db"
//! max_connections = 5
//! busy_timeout_secs = 5
//!
//! [logging]
//! filter = "info,storehouse=debug,sqlx=warn"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use storehouse_db::DbConfig;

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "storehouse.toml";

/// API server configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to listen on
    pub bind_addr: String,

    /// HTTP port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file, created if missing
    pub path: PathBuf,

    pub max_connections: u32,

    /// How long a writer waits for the lock before failing
    pub busy_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            path: PathBuf::from("storehouse.db"),
            max_connections: 5,
            busy_timeout_secs: 5,
        }
    }
}

impl DatabaseConfig {
    /// Builds the storage layer's connection settings.
    pub fn to_db_config(&self) -> DbConfig {
        DbConfig::new(&self.path)
            .max_connections(self.max_connections)
            .busy_timeout(Duration::from_secs(self.busy_timeout_secs))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: "info,storehouse=debug,sqlx=warn".to_string(),
        }
    }
}

impl ApiConfig {
    /// Load configuration from the config file and environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = env::var("STOREHOUSE_CONFIG").ok().map(PathBuf::from);

        let mut config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    ApiConfig::default()
                }
            }
        };

        config.apply_env(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a TOML file. Missing sections and keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Applies `STOREHOUSE_*` overrides from `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("STOREHOUSE_BIND_ADDR") {
            self.server.bind_addr = addr;
        }
        if let Some(port) = lookup("STOREHOUSE_PORT") {
            self.server.port = parse_var("STOREHOUSE_PORT", &port)?;
        }
        if let Some(path) = lookup("STOREHOUSE_DB_PATH") {
            self.database.path = PathBuf::from(path);
        }
        if let Some(max) = lookup("STOREHOUSE_DB_MAX_CONNECTIONS") {
            self.database.max_connections = parse_var("STOREHOUSE_DB_MAX_CONNECTIONS", &max)?;
        }
        if let Some(filter) = lookup("STOREHOUSE_LOG") {
            self.logging.filter = filter;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue("server.port".to_string()));
        }
        if self.server.bind_addr.trim().is_empty() {
            return Err(ConfigError::MissingRequired("server.bind_addr".to_string()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "database.max_connections".to_string(),
            ));
        }
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::MissingRequired("database.path".to_string()));
        }
        Ok(())
    }

    /// `bind_addr:port` for the listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.bind_addr, self.server.port)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(key.to_string()))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.listen_addr(), "0.0.0.0:5000");
        assert_eq!(config.database.path, PathBuf::from("storehouse.db"));
        assert_eq!(config.database.max_connections, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ApiConfig::from_toml(
            r#"
            [server]
            port = 8080

            [database]
            path = "/var/lib/storehouse/data.db"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.bind_addr, "0.0.0.0");
        assert_eq!(config.database.path, PathBuf::from("/var/lib/storehouse/data.db"));
        assert_eq!(config.database.busy_timeout_secs, 5);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = ApiConfig::from_toml("[server]\nport = 8080\n").unwrap();
        config
            .apply_env(lookup(&[
                ("STOREHOUSE_PORT", "9090"),
                ("STOREHOUSE_DB_PATH", "other.db"),
                ("STOREHOUSE_LOG", "debug"),
            ]))
            .unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.database.path, PathBuf::from("other.db"));
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn test_bad_env_value() {
        let mut config = ApiConfig::default();
        let err = config
            .apply_env(lookup(&[("STOREHOUSE_PORT", "not-a-port")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(key) if key == "STOREHOUSE_PORT"));
    }

    #[test]
    fn test_validation() {
        let mut config = ApiConfig::default();
        config.database.max_connections = 0;
        assert!(config.validate().is_err());

        let mut config = ApiConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storehouse.toml");
        std::fs::write(&path, "[logging]\nfilter = \"warn\"\n").unwrap();

        let config = ApiConfig::from_file(&path).unwrap();
        assert_eq!(config.logging.filter, "warn");

        let missing = ApiConfig::from_file(&dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            ApiConfig::from_toml("[server\nport = 1"),
            Err(ConfigError::Parse(_))
        ));
    }
}

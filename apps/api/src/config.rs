//! # Server Configuration
//!
//! Loaded once at startup from environment variables, with development
//! defaults for everything.
//!
//! | Variable                   | Default                         |
//! |----------------------------|---------------------------------|
//! | `SHELF_HOST`               | `0.0.0.0`                       |
//! | `SHELF_PORT`               | `8080`                          |
//! | `SHELF_DB_PATH`            | platform data dir / `shelf.db`  |
//! | `SHELF_DB_MAX_CONNECTIONS` | `5`                             |
//! | `SHELF_REQUEST_TIMEOUT_MS` | `10000`                         |

use directories::ProjectDirs;
use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Interface to bind
    pub host: IpAddr,

    /// TCP port
    pub port: u16,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub db_max_connections: u32,

    /// Per-request timeout
    pub request_timeout: Duration,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup (environment in production,
    /// a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("SHELF_HOST")
            .unwrap_or_else(|| "0.0.0.0".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("SHELF_HOST".to_string()))?;

        let port = lookup("SHELF_PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("SHELF_PORT".to_string()))?;

        let database_path = match lookup("SHELF_DB_PATH") {
            Some(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => default_database_path()?,
        };

        let db_max_connections: u32 = lookup("SHELF_DB_MAX_CONNECTIONS")
            .unwrap_or_else(|| "5".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("SHELF_DB_MAX_CONNECTIONS".to_string()))?;
        if db_max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "SHELF_DB_MAX_CONNECTIONS".to_string(),
            ));
        }

        let timeout_ms: u64 = lookup("SHELF_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|| "10000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("SHELF_REQUEST_TIMEOUT_MS".to_string()))?;

        Ok(ApiConfig {
            host,
            port,
            database_path,
            db_max_connections,
            request_timeout: Duration::from_millis(timeout_ms),
        })
    }

    /// Socket address to bind.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Platform data directory, e.g. `~/.local/share/shelf/shelf.db` on Linux.
fn default_database_path() -> Result<PathBuf, ConfigError> {
    let dirs = ProjectDirs::from("org", "shelf", "shelf").ok_or_else(|| {
        ConfigError::MissingRequired("SHELF_DB_PATH (no home directory found)".to_string())
    })?;

    let data_dir = dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {}", data_dir.display(), e)))?;

    Ok(data_dir.join("shelf.db"))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Cannot create data directory {0}")]
    DataDir(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_explicit_values() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("SHELF_HOST", "127.0.0.1"),
            ("SHELF_PORT", "9000"),
            ("SHELF_DB_PATH", "/tmp/shelf-test.db"),
            ("SHELF_DB_MAX_CONNECTIONS", "3"),
            ("SHELF_REQUEST_TIMEOUT_MS", "250"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr().to_string(), "127.0.0.1:9000");
        assert_eq!(config.database_path, PathBuf::from("/tmp/shelf-test.db"));
        assert_eq!(config.db_max_connections, 3);
        assert_eq!(config.request_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_defaults() {
        let config =
            ApiConfig::from_lookup(lookup(&[("SHELF_DB_PATH", "/tmp/shelf-test.db")])).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.host.to_string(), "0.0.0.0");
    }

    #[test]
    fn test_invalid_values() {
        let err = ApiConfig::from_lookup(lookup(&[
            ("SHELF_DB_PATH", "/tmp/x.db"),
            ("SHELF_PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref k) if k == "SHELF_PORT"));

        let err = ApiConfig::from_lookup(lookup(&[
            ("SHELF_DB_PATH", "/tmp/x.db"),
            ("SHELF_DB_MAX_CONNECTIONS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
    }
}

//! API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! | Variable                     | Default         |
//! |------------------------------|-----------------|
//! | `RXSTOCK_HOST`               | `0.0.0.0`       |
//! | `RXSTOCK_PORT`               | `8000`          |
//! | `RXSTOCK_DB_PATH`            | `./rxstock.db`  |
//! | `RXSTOCK_DB_MAX_CONNECTIONS` | `5`             |

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// REST API configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Interface to bind
    pub host: IpAddr,

    /// HTTP port
    pub port: u16,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub max_connections: u32,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parse = |key: &str, default: &str| -> String {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let config = ApiConfig {
            host: parse("RXSTOCK_HOST", "0.0.0.0")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("RXSTOCK_HOST".to_string()))?,

            port: parse("RXSTOCK_PORT", "8000")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("RXSTOCK_PORT".to_string()))?,

            database_path: PathBuf::from(parse("RXSTOCK_DB_PATH", "./rxstock.db")),

            max_connections: parse("RXSTOCK_DB_MAX_CONNECTIONS", "5")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("RXSTOCK_DB_MAX_CONNECTIONS".to_string()))?,
        };

        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "RXSTOCK_DB_MAX_CONNECTIONS".to_string(),
            ));
        }

        Ok(config)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
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
    fn test_defaults() {
        let config = ApiConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.database_path, PathBuf::from("./rxstock.db"));
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8000");
    }

    #[test]
    fn test_overrides_and_invalid_values() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("RXSTOCK_HOST", "127.0.0.1"),
            ("RXSTOCK_PORT", "9100"),
            ("RXSTOCK_DB_PATH", "/var/lib/rxstock/store.db"),
        ]))
        .unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:9100");
        assert_eq!(config.database_path, PathBuf::from("/var/lib/rxstock/store.db"));

        let err = ApiConfig::from_lookup(lookup(&[("RXSTOCK_PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref key) if key == "RXSTOCK_PORT"));

        assert!(ApiConfig::from_lookup(lookup(&[("RXSTOCK_DB_MAX_CONNECTIONS", "0")])).is_err());
    }
}

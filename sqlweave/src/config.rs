//! Connection settings

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlweave_core::{Error, Result};

const DEFAULT_MYSQL_PORT: u16 = 3306;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Supported database backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Mysql,
    Sqlite,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Mysql => write!(f, "mysql"),
            Backend::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// Where and how to connect
///
/// Every field has a default, so a JSON document only needs the values
/// that differ. A `url` overrides the individual connection fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub backend: Backend,
    pub host: String,
    pub port: Option<u16>,
    /// Schema name for MySQL, file path for SQLite
    pub database: String,
    pub username: String,
    pub password: String,
    pub url: Option<String>,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Mysql,
            host: "localhost".to_string(),
            port: None,
            database: String::new(),
            username: String::new(),
            password: String::new(),
            url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl DatabaseConfig {
    /// Parse a JSON configuration document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        if config.max_connections == 0 {
            return Err(Error::configuration("max_connections must be at least 1"));
        }
        Ok(config)
    }

    /// Read `DATABASE_URL` and the optional `DATABASE_MAX_CONNECTIONS`
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| Error::configuration("DATABASE_URL is not set"))?;

        let backend = if url.starts_with("sqlite:") {
            Backend::Sqlite
        } else if url.starts_with("mysql:") {
            Backend::Mysql
        } else {
            return Err(Error::configuration(format!(
                "unsupported DATABASE_URL scheme in '{}'",
                url.split(':').next().unwrap_or_default()
            )));
        };

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    Error::configuration(format!("invalid DATABASE_MAX_CONNECTIONS '{}'", raw))
                })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            backend,
            url: Some(url),
            max_connections,
            ..Self::default()
        })
    }

    /// The driver URL for this configuration
    pub fn connection_url(&self) -> Result<String> {
        if let Some(url) = &self.url {
            return Ok(url.clone());
        }

        match self.backend {
            Backend::Mysql => {
                if self.database.is_empty() {
                    return Err(Error::configuration("mysql configuration requires a database"));
                }
                let credentials = match (self.username.is_empty(), self.password.is_empty()) {
                    (true, _) => String::new(),
                    (false, true) => format!("{}@", self.username),
                    (false, false) => format!("{}:{}@", self.username, self.password),
                };
                Ok(format!(
                    "mysql://{}{}:{}/{}",
                    credentials,
                    self.host,
                    self.port.unwrap_or(DEFAULT_MYSQL_PORT),
                    self.database
                ))
            }
            Backend::Sqlite => {
                if self.database.is_empty() {
                    Ok("sqlite::memory:".to_string())
                } else {
                    Ok(format!("sqlite://{}", self.database))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_mysql_url_from_json() {
        let config = DatabaseConfig::from_json(
            r#"{"backend": "mysql", "host": "db", "database": "shop",
                "username": "app", "password": "secret"}"#,
        )
        .unwrap();
        assert_eq!(config.max_connections, 5);
        assert_eq!(
            config.connection_url().unwrap(),
            "mysql://app:secret@db:3306/shop"
        );
    }

    #[test]
    fn test_url_override_wins() {
        let config = DatabaseConfig::from_json(
            r#"{"database": "ignored", "url": "mysql://root@127.0.0.1:3307/other"}"#,
        )
        .unwrap();
        assert_eq!(
            config.connection_url().unwrap(),
            "mysql://root@127.0.0.1:3307/other"
        );
    }

    #[test]
    fn test_sqlite_urls() {
        let config = DatabaseConfig {
            backend: Backend::Sqlite,
            database: "data/app.db".to_string(),
            ..DatabaseConfig::default()
        };
        assert_eq!(config.connection_url().unwrap(), "sqlite://data/app.db");

        let memory = DatabaseConfig {
            backend: Backend::Sqlite,
            ..DatabaseConfig::default()
        };
        assert_eq!(memory.connection_url().unwrap(), "sqlite::memory:");
    }

    #[test]
    fn test_mysql_without_database_is_rejected() {
        let err = DatabaseConfig::default().connection_url().unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_invalid_json() {
        let err = DatabaseConfig::from_json(r#"{"backend": "oracle"}"#).unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));

        let err = DatabaseConfig::from_json(r#"{"max_connections": 0}"#).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_from_vars() {
        let config = DatabaseConfig::from_vars(vars(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("DATABASE_MAX_CONNECTIONS", "2"),
        ]))
        .unwrap();
        assert_eq!(config.backend, Backend::Sqlite);
        assert_eq!(config.max_connections, 2);
        assert_eq!(config.connection_url().unwrap(), "sqlite::memory:");
    }

    #[test]
    fn test_from_vars_errors() {
        assert!(DatabaseConfig::from_vars(vars(&[])).unwrap_err().is_configuration());
        assert!(
            DatabaseConfig::from_vars(vars(&[("DATABASE_URL", "postgres://x/y")]))
                .unwrap_err()
                .is_configuration()
        );
        assert!(DatabaseConfig::from_vars(vars(&[
            ("DATABASE_URL", "mysql://x/y"),
            ("DATABASE_MAX_CONNECTIONS", "many"),
        ]))
        .unwrap_err()
        .is_configuration());
    }
}

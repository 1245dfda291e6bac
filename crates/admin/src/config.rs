//! Configuration loaded from environment variables.

use std::env;

/// Admin CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// SQLite database URL.
    pub database_url: String,
    /// Connection pool size.
    pub pool_size: u32,
}

impl Config {
    const DEFAULT_DATABASE_URL: &'static str = "sqlite:healthbridge.db?mode=rwc";
    const DEFAULT_POOL_SIZE: u32 = 5;

    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `SQLITE_PATH` | SQLite database URL | `sqlite:healthbridge.db?mode=rwc` |
    /// | `DB_POOL_SIZE` | Connection pool size | `5` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url =
            lookup("SQLITE_PATH").unwrap_or_else(|| Self::DEFAULT_DATABASE_URL.to_string());

        let pool_size = match lookup("DB_POOL_SIZE") {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(size) if size > 0 => size,
                _ => return Err(ConfigError::InvalidPoolSize(raw)),
            },
            None => Self::DEFAULT_POOL_SIZE,
        };

        Ok(Self {
            database_url,
            pool_size,
        })
    }

    /// Prefer a database URL given on the command line.
    pub fn with_database_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url {
            self.database_url = url;
        }
        self
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("DB_POOL_SIZE must be a positive integer, got {0:?}")]
    InvalidPoolSize(String),
}

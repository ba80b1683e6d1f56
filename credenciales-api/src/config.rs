use anyhow::{anyhow, Context};

/// MySQL connection parameters, one per environment variable.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct Config {
    // HTTP listen port (`PORT`). Defaults to 3000.
    pub port: u16,
    pub db: DbConfig,
    // Maximum number of pooled MySQL connections (`DB_MAX_CONNECTIONS`).
    // Defaults to 5.
    pub db_max_connections: u32,
    // Seconds to wait for a pooled connection before the query fails
    // (`DB_ACQUIRE_TIMEOUT_SECS`). Defaults to 5.
    pub db_acquire_timeout_secs: u64,
    // Maximum request body size in bytes (`MAX_REQUEST_BODY_BYTES`).
    // Requests exceeding this will return 413 Payload Too Large.
    // Defaults to 1 MiB (1_048_576 bytes).
    pub max_request_body_bytes: usize,
}

impl Config {
    /// Read configuration from the process environment. `DB_HOST`,
    /// `DB_USER`, `DB_PASS` and `DB_NAME` are required; everything else
    /// has a default.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source. Tests pass a
    /// closure over a map instead of mutating the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        const DEFAULT_MAX_BODY_BYTES: usize = 1_048_576; // 1 MiB

        let required = |key: &str| {
            lookup(key).ok_or_else(|| anyhow!("missing required environment variable {key}"))
        };

        let db = DbConfig {
            host: required("DB_HOST")?,
            user: required("DB_USER")?,
            password: required("DB_PASS")?,
            database: required("DB_NAME")?,
            port: parse_or(lookup("DB_PORT"), "DB_PORT", 3306)?,
        };

        Ok(Config {
            port: parse_or(lookup("PORT"), "PORT", 3000)?,
            db,
            db_max_connections: parse_or(lookup("DB_MAX_CONNECTIONS"), "DB_MAX_CONNECTIONS", 5)?,
            db_acquire_timeout_secs: parse_or(
                lookup("DB_ACQUIRE_TIMEOUT_SECS"),
                "DB_ACQUIRE_TIMEOUT_SECS",
                5,
            )?,
            max_request_body_bytes: parse_or(
                lookup("MAX_REQUEST_BODY_BYTES"),
                "MAX_REQUEST_BODY_BYTES",
                DEFAULT_MAX_BODY_BYTES,
            )?,
        })
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(value) => value
            .parse()
            .with_context(|| format!("invalid value for {key}: '{value}'")),
        None => Ok(default),
    }
}

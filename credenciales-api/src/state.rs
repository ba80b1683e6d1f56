use crate::config::Config;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use std::time::Duration;
use tracing::debug;

pub struct AppState {
    pub pool: MySqlPool,
    pub max_request_body_bytes: usize,
}

impl AppState {
    pub fn from_config(cfg: &Config) -> Self {
        let options = MySqlConnectOptions::new()
            .host(&cfg.db.host)
            .port(cfg.db.port)
            .username(&cfg.db.user)
            .password(&cfg.db.password)
            .database(&cfg.db.database);

        // Lazy pool: connections open on first use, so an unreachable
        // database surfaces as a per-request query error rather than a
        // startup failure. Every statement checks a connection out and
        // returns it on drop, on every exit path.
        let pool = MySqlPoolOptions::new()
            .max_connections(cfg.db_max_connections)
            .acquire_timeout(Duration::from_secs(cfg.db_acquire_timeout_secs))
            .connect_lazy_with(options);
        debug!(
            max_connections = cfg.db_max_connections,
            acquire_timeout_secs = cfg.db_acquire_timeout_secs,
            "MySQL pool created"
        );

        AppState {
            pool,
            max_request_body_bytes: cfg.max_request_body_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn test_config() -> Config {
        Config::from_lookup(|key| match key {
            "DB_HOST" => Some("127.0.0.1".to_string()),
            "DB_USER" => Some("root".to_string()),
            "DB_PASS" => Some("secret".to_string()),
            "DB_NAME" => Some("credenciales_test".to_string()),
            _ => None,
        })
        .expect("config")
    }

    #[tokio::test]
    async fn from_config_builds_a_lazy_pool_without_connecting() {
        let cfg = test_config();
        let state = AppState::from_config(&cfg);
        assert_eq!(state.max_request_body_bytes, cfg.max_request_body_bytes);
        assert_eq!(state.pool.size(), 0, "lazy pool should hold no connections");
    }
}

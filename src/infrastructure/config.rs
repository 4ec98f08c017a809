use std::time::Duration;

use crate::domain::services::DEFAULT_HISTORY_WINDOW;

/// Runtime configuration, read from the environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub port: u16,
    /// Extra attempts for a registry write after a concurrent modification
    pub tx_retries: u32,
    /// Past games considered when scoring waitlist priority
    pub history_window: u32,
    pub request_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:./data/matchpoint.db".to_string(),
            db_max_connections: 5,
            jwt_secret: "matchpoint-secret-key-change-in-production".to_string(),
            port: 9999,
            tx_retries: 3,
            history_window: DEFAULT_HISTORY_WINDOW as u32,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let db_path = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("DB_PATH"))
            .unwrap_or(defaults.database_url);

        // Ensure path has sqlite: prefix
        let database_url = if db_path.starts_with("sqlite:") {
            db_path
        } else {
            format!("sqlite:{}", db_path)
        };

        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set, using the development secret");
            defaults.jwt_secret
        });

        Self {
            database_url,
            db_max_connections: env_parse("DB_MAX_CONNECTIONS").unwrap_or(defaults.db_max_connections),
            jwt_secret,
            port: env_parse("PORT").unwrap_or(defaults.port),
            tx_retries: env_parse("MATCHPOINT_TX_RETRIES").unwrap_or(defaults.tx_retries),
            history_window: env_parse("MATCHPOINT_HISTORY_WINDOW")
                .filter(|w| *w > 0)
                .unwrap_or(defaults.history_window),
            request_timeout: env_parse("REQUEST_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
        }
    }

    pub fn is_in_memory_db(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_detection() {
        let config = AppConfig {
            database_url: "sqlite::memory:".to_string(),
            ..AppConfig::default()
        };
        assert!(config.is_in_memory_db());
        assert!(!AppConfig::default().is_in_memory_db());
    }
}

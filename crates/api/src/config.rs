//! Application configuration

use std::env;

/// Deployment mode; controls whether upstream error text reaches clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        matches!(self, Environment::Production)
    }
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub bind_address: String,

    // Database
    pub database_url: String,

    // Stripe
    pub stripe_secret_key: String,
    pub stripe_webhook_secret: String,

    pub environment: Environment,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),

            database_url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::Missing("DATABASE_URL"))?,

            stripe_secret_key: env::var("STRIPE_SECRET_KEY")
                .map_err(|_| ConfigError::Missing("STRIPE_SECRET_KEY"))?,
            stripe_webhook_secret: env::var("STRIPE_WEBHOOK_SECRET")
                .map_err(|_| ConfigError::Missing("STRIPE_WEBHOOK_SECRET"))?,

            environment: match env::var("APP_ENV").as_deref() {
                Ok("production") => Environment::Production,
                Ok("development") | Err(_) => Environment::Development,
                Ok(other) => return Err(ConfigError::InvalidEnvironment(other.to_string())),
            },
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("APP_ENV must be 'development' or 'production', got '{0}'")]
    InvalidEnvironment(String),
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure config tests run serially (they modify shared env vars)
    static CONFIG_TEST_MUTEX: Mutex<()> = Mutex::new(());

    fn setup_minimal_config() {
        env::set_var("DATABASE_URL", "postgres://test");
        env::set_var("STRIPE_SECRET_KEY", "sk_test_123");
        env::set_var("STRIPE_WEBHOOK_SECRET", "whsec_123");
        env::remove_var("BIND_ADDRESS");
        env::remove_var("APP_ENV");
    }

    fn cleanup_config() {
        env::remove_var("DATABASE_URL");
        env::remove_var("STRIPE_SECRET_KEY");
        env::remove_var("STRIPE_WEBHOOK_SECRET");
        env::remove_var("APP_ENV");
    }

    #[test]
    fn test_config_from_env() {
        let _lock = CONFIG_TEST_MUTEX.lock().unwrap();

        // === Missing DATABASE_URL fails ===
        cleanup_config();
        env::set_var("STRIPE_SECRET_KEY", "sk_test_123");
        env::set_var("STRIPE_WEBHOOK_SECRET", "whsec_123");
        let result = Config::from_env();
        assert!(matches!(result, Err(ConfigError::Missing("DATABASE_URL"))));

        // === Missing STRIPE_WEBHOOK_SECRET fails (never hardcoded) ===
        setup_minimal_config();
        env::remove_var("STRIPE_WEBHOOK_SECRET");
        let result = Config::from_env();
        assert!(matches!(
            result,
            Err(ConfigError::Missing("STRIPE_WEBHOOK_SECRET"))
        ));

        // === Defaults: port 3000, development mode ===
        setup_minimal_config();
        let config = Config::from_env().unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:3000");
        assert_eq!(config.environment, Environment::Development);

        // === Production mode recognized ===
        env::set_var("APP_ENV", "production");
        let config = Config::from_env().unwrap();
        assert!(config.environment.is_production());

        // === Unknown mode rejected ===
        env::set_var("APP_ENV", "staging");
        let result = Config::from_env();
        assert!(matches!(result, Err(ConfigError::InvalidEnvironment(_))));

        cleanup_config();
    }
}

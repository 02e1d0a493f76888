//! Service configuration, read from the environment.

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a positive integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct Config {
    /// Address to bind the HTTP listener.
    pub bind_addr: String,
    pub database_url: String,
    /// HS256 signing secret for bearer tokens.
    pub jwt_secret: String,
    pub token_ttl: Duration,
    /// Requests allowed per client within one rate-limit window.
    pub rate_limit_max: u32,
    pub rate_limit_window: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".into(),
            database_url: "sqlite://users.db?mode=rwc".into(),
            jwt_secret: random_secret(),
            token_ttl: Duration::from_secs(24 * 60 * 60),
            rate_limit_max: 100,
            rate_limit_window: Duration::from_secs(60),
        }
    }
}

impl Config {
    /// Reads configuration from environment variables, falling back to defaults.
    ///
    /// | Variable                 | Default                      |
    /// |--------------------------|------------------------------|
    /// | `BIND_ADDR`              | `0.0.0.0:3000`               |
    /// | `DATABASE_URL`           | `sqlite://users.db?mode=rwc` |
    /// | `JWT_SECRET`             | random, per process          |
    /// | `TOKEN_TTL_SECS`         | `86400`                      |
    /// | `RATE_LIMIT_MAX`         | `100`                        |
    /// | `RATE_LIMIT_WINDOW_SECS` | `60`                         |
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let jwt_secret = match std::env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                tracing::warn!("JWT_SECRET not set; tokens will not survive a restart");
                defaults.jwt_secret
            }
        };

        Ok(Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            database_url: std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            jwt_secret,
            token_ttl: env_number("TOKEN_TTL_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.token_ttl),
            rate_limit_max: env_number("RATE_LIMIT_MAX")?.unwrap_or(defaults.rate_limit_max),
            rate_limit_window: env_number("RATE_LIMIT_WINDOW_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.rate_limit_window),
        })
    }
}

fn env_number<T: FromStr + PartialOrd + Default>(
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    let Ok(value) = std::env::var(name) else {
        return Ok(None);
    };
    match value.trim().parse::<T>() {
        Ok(n) if n > T::default() => Ok(Some(n)),
        _ => Err(ConfigError::InvalidNumber { name, value }),
    }
}

fn random_secret() -> String {
    format!(
        "{}{}",
        uuid::Uuid::new_v4().simple(),
        uuid::Uuid::new_v4().simple()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_secrets_differ_between_instances() {
        assert_ne!(Config::default().jwt_secret, Config::default().jwt_secret);
    }

    #[test]
    fn rejects_zero_and_garbage_numbers() {
        std::env::set_var("USER_API_TEST_ZERO", "0");
        std::env::set_var("USER_API_TEST_GARBAGE", "ten");
        std::env::set_var("USER_API_TEST_OK", " 42 ");

        assert!(env_number::<u32>("USER_API_TEST_ZERO").is_err());
        assert!(env_number::<u32>("USER_API_TEST_GARBAGE").is_err());
        assert_eq!(env_number::<u32>("USER_API_TEST_OK").unwrap(), Some(42));
        assert_eq!(env_number::<u32>("USER_API_TEST_UNSET").unwrap(), None);
    }
}

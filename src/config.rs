//! Startup configuration read from the environment.

use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::api::RateLimitConfig;
use crate::domain::ConfigError;
use crate::infra::{LogFormat, PostgresConfig};

/// Everything `main` needs to boot the server.
#[derive(Debug)]
pub struct AppConfig {
    pub database_url: SecretString,
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
    pub request_timeout: Duration,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub run_migrations: bool,
    /// `None` when `RATE_LIMIT_ENABLED` is off.
    pub rate_limit: Option<RateLimitConfig>,
}

impl AppConfig {
    /// Reads the process environment. Call after `dotenvy::dotenv()`.
    ///
    /// # Errors
    /// `MissingEnvVar` when `DATABASE_URL` is unset, `InvalidValue` when a
    /// variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?;

        let rate_limit_enabled: bool = parse_or(&lookup, "RATE_LIMIT_ENABLED", false)?;
        let rate_limit = if rate_limit_enabled {
            Some(RateLimitConfig {
                general_rps: positive(&lookup, "RATE_LIMIT_RPS", 10)?,
                general_burst: positive(&lookup, "RATE_LIMIT_BURST", 20)?,
                ..RateLimitConfig::default()
            })
        } else {
            None
        };

        let db_max_connections = positive(&lookup, "DB_MAX_CONNECTIONS", 10)?;
        let db_min_connections = parse_or(&lookup, "DB_MIN_CONNECTIONS", 2)?;
        if db_min_connections > db_max_connections {
            return Err(ConfigError::InvalidValue {
                key: "DB_MIN_CONNECTIONS".to_string(),
                message: format!("must not exceed DB_MAX_CONNECTIONS ({db_max_connections})"),
            });
        }

        Ok(Self {
            database_url: SecretString::from(database_url),
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 3000)?,
            log_format: parse_or(&lookup, "LOG_FORMAT", LogFormat::Pretty)?,
            request_timeout: Duration::from_secs(positive::<u64, _>(
                &lookup,
                "REQUEST_TIMEOUT_SECS",
                30,
            )?),
            db_max_connections,
            db_min_connections,
            run_migrations: parse_or(&lookup, "RUN_MIGRATIONS", true)?,
            rate_limit,
        })
    }

    /// `host:port` to bind.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    #[must_use]
    pub fn postgres(&self) -> PostgresConfig {
        PostgresConfig {
            max_connections: self.db_max_connections,
            min_connections: self.db_min_connections,
            ..PostgresConfig::default()
        }
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        }),
    }
}

fn positive<T, F>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + Default,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    let value = parse_or(lookup, key, default)?;
    if value <= T::default() {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[("DATABASE_URL", "postgres://localhost/bank")]).unwrap();

        assert_eq!(config.database_url.expose_secret(), "postgres://localhost/bank");
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.postgres().max_connections, 10);
        assert_eq!(config.postgres().min_connections, 2);
        assert!(config.run_migrations);
        assert!(config.rate_limit.is_none());
    }

    #[test]
    fn test_missing_database_url() {
        assert!(matches!(
            config(&[("PORT", "8080")]),
            Err(ConfigError::MissingEnvVar(key)) if key == "DATABASE_URL"
        ));
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("DATABASE_URL", "postgres://db/bank"),
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("LOG_FORMAT", "json"),
            ("RUN_MIGRATIONS", "false"),
            ("RATE_LIMIT_ENABLED", "true"),
            ("RATE_LIMIT_RPS", "5"),
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(!config.run_migrations);
        let rate_limit = config.rate_limit.unwrap();
        assert_eq!(rate_limit.general_rps, 5);
        assert_eq!(rate_limit.general_burst, 20);
    }

    #[test]
    fn test_invalid_values() {
        let err = config(&[("DATABASE_URL", "postgres://db"), ("PORT", "http")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "PORT"));

        let err = config(&[
            ("DATABASE_URL", "postgres://db"),
            ("REQUEST_TIMEOUT_SECS", "0"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "REQUEST_TIMEOUT_SECS"));

        let err = config(&[
            ("DATABASE_URL", "postgres://db"),
            ("DB_MIN_CONNECTIONS", "20"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "DB_MIN_CONNECTIONS"));
    }
}

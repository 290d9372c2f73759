//! Process-wide configuration, read once from the environment at startup.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `DATABASE_URL` | `postgres://localhost/expense_tracker` |
//! | `TEST_DATABASE_URL` | `postgres://localhost/expense_tracker_test` |
//! | `HOST` | `127.0.0.1` |
//! | `PORT` | `8080` |
//! | `JWT_SECRET` | required |
//! | `JWT_EXPIRY` | `7d` |
//! | `CLIENT_ORIGIN` | `http://localhost:3000` |

use chrono::Duration;
use std::env;
use thiserror::Error;

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/expense_tracker";
pub const DEFAULT_TEST_DATABASE_URL: &str = "postgres://localhost/expense_tracker_test";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_JWT_EXPIRY: &str = "7d";
pub const DEFAULT_CLIENT_ORIGIN: &str = "http://localhost:3000";

/// Errors that can occur when loading configuration.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub test_database_url: String,
    pub host: String,
    pub port: u16,
    /// HS256 signing secret; there is no default
    pub jwt_secret: String,
    pub jwt_expiry: Duration,
    /// The single origin allowed by the CORS policy
    pub client_origin: String,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let or_default =
            |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("JWT_SECRET".to_string()))?;

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), e.to_string()))?,
            None => DEFAULT_PORT,
        };

        let expiry = or_default("JWT_EXPIRY", DEFAULT_JWT_EXPIRY);
        let jwt_expiry = parse_duration(&expiry)
            .ok_or_else(|| ConfigError::InvalidValue("JWT_EXPIRY".to_string(), expiry))?;

        Ok(Self {
            database_url: or_default("DATABASE_URL", DEFAULT_DATABASE_URL),
            test_database_url: or_default("TEST_DATABASE_URL", DEFAULT_TEST_DATABASE_URL),
            host: or_default("HOST", DEFAULT_HOST),
            port,
            jwt_secret,
            jwt_expiry,
            client_origin: or_default("CLIENT_ORIGIN", DEFAULT_CLIENT_ORIGIN),
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parses `"<n>"` (seconds) or `"<n><unit>"` with unit `s`, `m`, `h`, `d` or `w`.
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    let (digits, unit) = raw.split_at(split);
    let value: i64 = digits.parse().ok()?;

    let duration = match unit.trim() {
        "" | "s" => Duration::try_seconds(value)?,
        "m" => Duration::try_minutes(value)?,
        "h" => Duration::try_hours(value)?,
        "d" => Duration::try_days(value)?,
        "w" => Duration::try_weeks(value)?,
        _ => return None,
    };

    (duration > Duration::zero()).then_some(duration)
}

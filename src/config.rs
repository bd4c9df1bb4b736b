use std::env;
use std::fmt;
use std::time::Duration;

use crate::error::AppError;

/// Shortest signing secret accepted for HS256.
pub const MIN_SECRET_LEN: usize = 32;

const DEFAULT_TOKEN_TTL_SECS: i64 = 4 * 60 * 60;
const DEFAULT_DATABASE_TIMEOUT_SECS: u64 = 5;

/// Settings consumed by the authentication core.
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
    pub bcrypt_cost: u32,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres URL. The in-memory store is used when unset.
    pub database_url: Option<String>,
    pub database_timeout: Duration,
    pub server_port: u16,
    pub server_host: String,
    pub auth: AuthConfig,
}

impl Config {
    /// Loads the configuration from the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Loads the configuration through an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .ok_or_else(|| AppError::Configuration("JWT_SECRET must be set".into()))?;
        if jwt_secret.len() < MIN_SECRET_LEN {
            return Err(AppError::Configuration(format!(
                "JWT_SECRET must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }

        let ttl_secs: i64 = parse_or(&lookup, "TOKEN_TTL_SECS", DEFAULT_TOKEN_TTL_SECS)?;
        if ttl_secs <= 0 {
            return Err(AppError::Configuration(
                "TOKEN_TTL_SECS must be positive".into(),
            ));
        }

        let bcrypt_cost: u32 = parse_or(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(AppError::Configuration(
                "BCRYPT_COST must be between 4 and 31".into(),
            ));
        }

        let timeout_secs: u64 = parse_or(
            &lookup,
            "DATABASE_TIMEOUT_SECS",
            DEFAULT_DATABASE_TIMEOUT_SECS,
        )?;

        Ok(Self {
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            database_timeout: Duration::from_secs(timeout_secs),
            server_port: parse_or(&lookup, "SERVER_PORT", 8080)?,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            auth: AuthConfig {
                jwt_secret,
                token_ttl: chrono::Duration::seconds(ttl_secs),
                bcrypt_cost,
            },
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Configuration(format!("{} must be a number", key))),
        None => Ok(default),
    }
}

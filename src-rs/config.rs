//! Service configuration, read once from the environment at startup.
//!
//! - `HOST` / `PORT` - bind address. Defaults to `0.0.0.0:5000`.
//! - `RELAY_MAX_ATTEMPTS` - distinct providers tried per request. Defaults to `5`.
//! - `RELAY_UNHEALTHY_THRESHOLD` - failure count above which a provider is skipped. Defaults to `4`.
//! - `RELAY_RECOVERY_SECS` - optional; lets unhealthy providers back in after this long.
//! - `RELAY_TIMEOUT_SECS` - upstream call timeout. Defaults to `30`.
//! - `RELAY_TEMPERATURE` - sampling temperature. Defaults to `0.7`.
//! - `ASSISTANT_NAME` / `ASSISTANT_CREATOR` - identity stated in the system turn.
//!
//! Provider credentials are read separately, see `helpers`.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Persona {
    pub name: String,
    pub creator: String,
}

impl Default for Persona {
    fn default() -> Self {
        Self {
            name: "Clinton Tech AI".to_string(),
            creator: "Clinton Tech".to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    pub max_attempts: usize,
    pub unhealthy_threshold: u32,
    pub recovery_after: Option<Duration>,
    pub request_timeout: Duration,
    pub temperature: f64,
    pub persona: Persona,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            max_attempts: 5,
            unhealthy_threshold: 4,
            recovery_after: None,
            request_timeout: Duration::from_secs(30),
            temperature: 0.7,
            persona: Persona::default(),
        }
    }
}

impl RelayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; `from_env` passes the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let max_attempts = parse_or(&get, "RELAY_MAX_ATTEMPTS", defaults.max_attempts)?;
        if max_attempts == 0 {
            return Err(ConfigError::InvalidValue(
                "RELAY_MAX_ATTEMPTS".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        let timeout_secs: u64 = parse_or(&get, "RELAY_TIMEOUT_SECS", defaults.request_timeout.as_secs())?;
        let recovery_after = match get("RELAY_RECOVERY_SECS") {
            Some(raw) => Some(Duration::from_secs(parse_value("RELAY_RECOVERY_SECS", &raw)?)),
            None => None,
        };

        Ok(Self {
            host: get("HOST").unwrap_or(defaults.host),
            port: parse_or(&get, "PORT", defaults.port)?,
            max_attempts,
            unhealthy_threshold: parse_or(&get, "RELAY_UNHEALTHY_THRESHOLD", defaults.unhealthy_threshold)?,
            recovery_after,
            request_timeout: Duration::from_secs(timeout_secs),
            temperature: parse_or(&get, "RELAY_TEMPERATURE", defaults.temperature)?,
            persona: Persona {
                name: get("ASSISTANT_NAME").unwrap_or(defaults.persona.name),
                creator: get("ASSISTANT_CREATOR").unwrap_or(defaults.persona.creator),
            },
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, fallback: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(fallback),
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.parse::<T>()
        .map_err(|_| ConfigError::InvalidValue(key.to_string(), raw.to_string()))
}

use chrono::NaiveDate;
use std::{env, path::PathBuf, time::Duration};
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_PATH: &str = "data/gym.json";
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_LOOKAHEAD_DAYS: u32 = 5;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Settings for the `gym_admin` service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub port: u16,
    pub data_path: PathBuf,
    pub today: Option<NaiveDate>,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = parse_or("PORT", lookup("PORT"), DEFAULT_PORT, "a port number")?;
        let data_path = lookup("GYM_DATA_PATH")
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));
        let today = match lookup("GYM_TODAY").filter(|value| !value.is_empty()) {
            Some(value) => Some(NaiveDate::parse_from_str(&value, "%Y-%m-%d").map_err(|_| {
                ConfigError::Invalid {
                    name: "GYM_TODAY",
                    value,
                    expected: "a YYYY-MM-DD date",
                }
            })?),
            None => None,
        };

        Ok(Self {
            port,
            data_path,
            today,
        })
    }
}

/// Settings for clients of the REST API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub lookahead_days: u32,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            lookahead_days: DEFAULT_LOOKAHEAD_DAYS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup("GYM_BASE_URL")
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let lookahead_days = parse_or(
            "GYM_LOOKAHEAD_DAYS",
            lookup("GYM_LOOKAHEAD_DAYS"),
            DEFAULT_LOOKAHEAD_DAYS,
            "a positive day count",
        )?;
        if lookahead_days == 0 {
            return Err(ConfigError::Invalid {
                name: "GYM_LOOKAHEAD_DAYS",
                value: "0".into(),
                expected: "a positive day count",
            });
        }
        let timeout_secs = parse_or(
            "GYM_HTTP_TIMEOUT_SECS",
            lookup("GYM_HTTP_TIMEOUT_SECS"),
            DEFAULT_TIMEOUT_SECS,
            "a number of seconds",
        )?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            lookahead_days,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match value.filter(|value| !value.is_empty()) {
        Some(value) => value
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid {
                name,
                value,
                expected,
            }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn service_defaults() {
        let config = ServiceConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.data_path, PathBuf::from(DEFAULT_DATA_PATH));
        assert_eq!(config.today, None);
    }

    #[test]
    fn service_reads_overrides() {
        let config = ServiceConfig::from_lookup(lookup(&[
            ("PORT", "9000"),
            ("GYM_DATA_PATH", "/tmp/gym.json"),
            ("GYM_TODAY", "2024-01-28"),
        ]))
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.data_path, PathBuf::from("/tmp/gym.json"));
        assert_eq!(config.today, NaiveDate::from_ymd_opt(2024, 1, 28));
    }

    #[test]
    fn bad_today_is_rejected() {
        let err = ServiceConfig::from_lookup(lookup(&[("GYM_TODAY", "28/01/2024")])).unwrap_err();
        assert!(err.to_string().contains("GYM_TODAY"));
    }

    #[test]
    fn client_trims_base_url_and_rejects_zero_lookahead() {
        let config =
            ClientConfig::from_lookup(lookup(&[("GYM_BASE_URL", "http://gym.local/")])).unwrap();
        assert_eq!(config.base_url, "http://gym.local");
        assert_eq!(config.lookahead_days, DEFAULT_LOOKAHEAD_DAYS);

        assert!(ClientConfig::from_lookup(lookup(&[("GYM_LOOKAHEAD_DAYS", "0")])).is_err());
        assert!(ClientConfig::from_lookup(lookup(&[("GYM_HTTP_TIMEOUT_SECS", "soon")])).is_err());
    }
}

//! Process configuration, loaded once at startup.
//!
//! Missing or malformed variables are startup-fatal: the process logs the
//! problem and exits before binding a listener. Nothing here is read
//! per-request.

use thiserror::Error;
use url::Url;

pub const DATASTORE_URL: &str = "DATASTORE_URL";
pub const DATASTORE_KEY: &str = "DATASTORE_KEY";
pub const ANALYSIS_PROVIDER_URL: &str = "ANALYSIS_PROVIDER_URL";
pub const ANALYSIS_PROVIDER_KEY: &str = "ANALYSIS_PROVIDER_KEY";
pub const BIND_ADDR: &str = "BIND_ADDR";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("environment variable {name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub datastore_url: Url,
    pub datastore_key: String,
    pub analysis_url: Url,
    pub analysis_key: String,
    pub bind_addr: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Lookup-injected form so tests never touch process env.
    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            datastore_url: required_url(&get, DATASTORE_URL)?,
            datastore_key: required(&get, DATASTORE_KEY)?,
            analysis_url: required_url(&get, ANALYSIS_PROVIDER_URL)?,
            analysis_key: required(&get, ANALYSIS_PROVIDER_KEY)?,
            bind_addr: get(BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        })
    }
}

fn required(
    get: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<String, ConfigError> {
    match get(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name)),
    }
}

fn required_url(
    get: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Url, ConfigError> {
    let raw = required(get, name)?;
    Url::parse(&raw).map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn full_env() -> Vec<(&'static str, &'static str)> {
        vec![
            (DATASTORE_URL, "https://datastore.example.com"),
            (DATASTORE_KEY, "store-key"),
            (ANALYSIS_PROVIDER_URL, "https://analysis.example.com/v1/generate"),
            (ANALYSIS_PROVIDER_KEY, "provider-key"),
        ]
    }

    #[test]
    fn loads_a_complete_environment() {
        let config = Config::from_lookup(env(&full_env())).unwrap();

        assert_eq!(config.datastore_key, "store-key");
        assert_eq!(config.analysis_key, "provider-key");
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
    }

    #[test]
    fn bind_addr_can_be_overridden() {
        let mut pairs = full_env();
        pairs.push((BIND_ADDR, "127.0.0.1:9000"));

        let config = Config::from_lookup(env(&pairs)).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:9000");
    }

    #[test]
    fn each_required_variable_is_fatal_when_absent() {
        for missing in [
            DATASTORE_URL,
            DATASTORE_KEY,
            ANALYSIS_PROVIDER_URL,
            ANALYSIS_PROVIDER_KEY,
        ] {
            let pairs: Vec<_> = full_env().into_iter().filter(|(k, _)| *k != missing).collect();
            let err = Config::from_lookup(env(&pairs)).unwrap_err();
            assert!(
                matches!(err, ConfigError::Missing(name) if name == missing),
                "expected Missing({missing}), got {err:?}"
            );
        }
    }

    #[test]
    fn blank_values_count_as_missing() {
        let mut pairs = full_env();
        pairs.retain(|(k, _)| *k != DATASTORE_KEY);
        pairs.push((DATASTORE_KEY, "   "));

        let err = Config::from_lookup(env(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(DATASTORE_KEY)));
    }

    #[test]
    fn malformed_urls_are_rejected() {
        let mut pairs = full_env();
        pairs.retain(|(k, _)| *k != DATASTORE_URL);
        pairs.push((DATASTORE_URL, "not a url"));

        let err = Config::from_lookup(env(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: DATASTORE_URL, .. }));
    }
}

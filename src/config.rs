//! Runtime configuration.
//!
//! Defaults, then `FBXSTATS_*` environment variables, then command line flags.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_DATABASE: &str = "fbxstats.sqlite3";
pub const DEFAULT_STATS_URL: &str = "http://mafreebox.freebox.fr/pub/fbx_info.txt";
/// One hour: the device can be very slow to answer while resynchronizing.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 60 * 60;
pub const DEFAULT_STREAM: &str = "adsl";

pub const ENV_DATABASE: &str = "FBXSTATS_DATABASE";
pub const ENV_STATS_URL: &str = "FBXSTATS_URL";
pub const ENV_FETCH_TIMEOUT_SECS: &str = "FBXSTATS_TIMEOUT_SECS";
pub const ENV_STREAM: &str = "FBXSTATS_STREAM";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database: PathBuf,
    pub stats_url: String,
    pub fetch_timeout: Duration,
    pub stream: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_DATABASE),
            stats_url: DEFAULT_STATS_URL.to_string(),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            stream: DEFAULT_STREAM.to_string(),
        }
    }
}

impl Config {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(database) = lookup(ENV_DATABASE) {
            config.database = PathBuf::from(database);
        }
        if let Some(url) = lookup(ENV_STATS_URL) {
            config.stats_url = url;
        }
        if let Some(raw) = lookup(ENV_FETCH_TIMEOUT_SECS) {
            config.fetch_timeout = parse_timeout(ENV_FETCH_TIMEOUT_SECS, &raw)?;
        }
        if let Some(stream) = lookup(ENV_STREAM) {
            config.stream = stream;
        }

        Ok(config)
    }
}

/// Parse a positive number of seconds.
pub fn parse_timeout(key: &str, raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.fetch_timeout, Duration::from_secs(3600));
        assert_eq!(config.stream, "adsl");
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::from_lookup(lookup(&[
            (ENV_DATABASE, "/var/lib/fbxstats/stats.db"),
            (ENV_STATS_URL, "http://192.168.0.254/pub/fbx_info.txt"),
            (ENV_FETCH_TIMEOUT_SECS, "30"),
        ]))
        .unwrap();
        assert_eq!(config.database, PathBuf::from("/var/lib/fbxstats/stats.db"));
        assert_eq!(config.stats_url, "http://192.168.0.254/pub/fbx_info.txt");
        assert_eq!(config.fetch_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_timeout() {
        for raw in ["0", "-5", "soon"] {
            assert_eq!(
                Config::from_lookup(lookup(&[(ENV_FETCH_TIMEOUT_SECS, raw)])),
                Err(ConfigError::InvalidValue {
                    key: ENV_FETCH_TIMEOUT_SECS.to_string(),
                    value: raw.to_string(),
                })
            );
        }
    }
}

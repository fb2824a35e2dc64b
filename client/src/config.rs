use std::path::PathBuf;
use std::time::Duration;

use salesbook::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub refresh_every: Duration,
    pub timeout: Duration,
    pub log_path: PathBuf,
}

fn secs(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: u64,
) -> Result<Duration, ConfigError> {
    match lookup(key) {
        None => Ok(Duration::from_secs(default)),
        Some(v) => match v.trim().parse::<u64>() {
            Ok(n) if n > 0 => Ok(Duration::from_secs(n)),
            _ => Err(ConfigError::Invalid { key, value: v }),
        },
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: lookup("SALESBOOK_URL").unwrap_or_else(|| "http://127.0.0.1:8080".to_string()),
            refresh_every: secs(&lookup, "SALESBOOK_REFRESH_SECS", 5)?,
            timeout: secs(&lookup, "SALESBOOK_TIMEOUT_SECS", 10)?,
            log_path: lookup("SALESBOOK_LOG")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("salesbook-client.log")),
        })
    }
}

//! Connection settings for the ledger store.
//!
//! The store is configured by one blob: `SALESBOOK_STORE_CONFIG` holding JSON
//! such as `{"database_url": "postgres://...", "max_connections": 10}`.
//! Without it, `DATABASE_URL` alone is enough.

use crate::error::ConfigError;
use serde::Deserialize;

pub const STORE_CONFIG_VAR: &str = "SALESBOOK_STORE_CONFIG";
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";

fn default_max_connections() -> u32 {
    10
}

fn default_collection() -> String {
    "sales".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    pub database_url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Name of the table holding sale documents.
    #[serde(default = "default_collection")]
    pub collection: String,
}

impl StoreConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let config = match lookup(STORE_CONFIG_VAR) {
            Some(blob) => Self::from_json(&blob)?,
            None => Self {
                database_url: lookup(DATABASE_URL_VAR).ok_or(ConfigError::Missing(DATABASE_URL_VAR))?,
                max_connections: default_max_connections(),
                collection: default_collection(),
            },
        };
        config.validate()
    }

    pub fn from_json(blob: &str) -> Result<Self, ConfigError> {
        serde_json::from_str::<Self>(blob).map_err(|e| ConfigError::Malformed(e.to_string()))
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.database_url.trim().is_empty() {
            return Err(ConfigError::Missing("database_url"));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::Invalid {
                key: "max_connections",
                value: self.max_connections.to_string(),
            });
        }
        // the collection name is spliced into SQL, so keep it a plain identifier
        let mut chars = self.collection.chars();
        let valid = chars
            .next()
            .is_some_and(|c| c.is_ascii_lowercase() || c == '_')
            && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        if !valid {
            return Err(ConfigError::Invalid {
                key: "collection",
                value: self.collection,
            });
        }
        Ok(self)
    }
}

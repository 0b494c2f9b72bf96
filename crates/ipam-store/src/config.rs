//! Store connection configuration

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Connection settings for the graph-data API. Built by the CLI from its
/// config file and environment; nothing in this crate reads the environment
/// itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub url: String,
    pub token: String,
}

impl StoreConfig {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            bail!("store URL cannot be empty");
        }
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            bail!("store URL must be http(s): {}", self.url);
        }
        if self.token.is_empty() {
            bail!("store API token cannot be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_rejects_empty_and_schemeless_urls() {
        assert!(StoreConfig::new("http://127.0.0.1:8000", "t").validate().is_ok());
        assert!(StoreConfig::new("", "t").validate().is_err());
        assert!(StoreConfig::new("127.0.0.1:8000", "t").validate().is_err());
        assert!(StoreConfig::new("http://127.0.0.1:8000", "").validate().is_err());
    }
}

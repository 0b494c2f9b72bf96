//! CLI configuration
//!
//! Layered defaults -> optional `ipamctl.toml` -> `IPAMCTL_*` environment.
//! The loaded value is turned into the explicit policy and store settings
//! the library crates take; nothing below the CLI reads the environment.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use ipam_core::HierarchyPolicy;
use ipam_store::StoreConfig;

#[derive(Debug, Error)]
pub enum CliConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Base URL of the graph-data API.
    pub store_url: String,

    /// API token for the store.
    pub api_token: String,

    /// Device inventory JSON file.
    pub inventory_path: String,

    /// /24 networks that are never subdivided, as CIDR strings.
    pub networks_without_subdivision: Vec<String>,
}

impl CliConfig {
    /// Load configuration. `path` overrides the default `ipamctl.toml`
    /// lookup; the file is optional either way unless explicitly given.
    pub fn load(path: Option<&Path>) -> Result<Self, CliConfigError> {
        let mut builder = config::Config::builder()
            .set_default("store_url", "http://127.0.0.1:8000")?
            .set_default("api_token", "")?
            .set_default("inventory_path", "inventory.json")?
            .set_default("networks_without_subdivision", Vec::<String>::new())?;

        builder = match path {
            Some(path) => builder.add_source(config::File::from(path)),
            None => builder.add_source(config::File::with_name("ipamctl").required(false)),
        };

        builder = builder.add_source(config::Environment::with_prefix("IPAMCTL"));

        Ok(builder.build()?.try_deserialize()?)
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(&self.store_url, &self.api_token)
    }

    /// Hierarchy policy from the configured allow-list. Entries that do not
    /// parse as CIDRs are logged and dropped.
    pub fn policy(&self) -> HierarchyPolicy {
        let networks = self
            .networks_without_subdivision
            .iter()
            .filter_map(|value| match ipam_core::parse_cidr(value) {
                Ok(net) => Some(net),
                Err(err) => {
                    log::warn!("ignoring allow-list entry: {}", err);
                    None
                }
            })
            .collect();

        HierarchyPolicy {
            networks_without_subdivision: networks,
            ..Default::default()
        }
    }
}

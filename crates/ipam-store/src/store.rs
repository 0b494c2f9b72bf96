//! Store trait and errors

use anyhow::Result;
use async_trait::async_trait;
use ipnet::Ipv4Net;
use std::net::Ipv4Addr;

use ipam_core::{IpRecord, PrefixRecord, SubnetRecord, SubnetRole};

/// Persistence seam for IPAM records.
///
/// The `ensure_*` operations are get-or-create: asked for something that
/// already exists, they return the existing id and change nothing, so every
/// reconcile pass is safe to rerun.
#[async_trait]
pub trait IpamStore: Send + Sync {
    async fn list_prefixes(&self) -> Result<Vec<PrefixRecord>>;

    /// Get or create a prefix, returning its id.
    async fn ensure_prefix(&self, prefix: Ipv4Net) -> Result<String>;

    async fn list_subnets(&self) -> Result<Vec<SubnetRecord>>;

    /// Get or create a subnet under a prefix, returning its id.
    async fn ensure_subnet(&self, subnet: Ipv4Net, prefix_id: &str) -> Result<String>;

    async fn set_subnet_role(&self, subnet_id: &str, role: SubnetRole) -> Result<()>;

    /// Replace a parent's child list. Children dropped from the list lose
    /// their parent link.
    async fn set_child_subnets(&self, parent_id: &str, child_ids: &[String]) -> Result<()>;

    async fn clear_parent(&self, subnet_id: &str) -> Result<()>;

    async fn list_ips(&self) -> Result<Vec<IpRecord>>;

    /// Create an IP attached to a subnet. Returns `false` without touching
    /// anything if the address already exists.
    async fn create_ip(&self, address: Ipv4Addr, description: &str, subnet_id: &str)
        -> Result<bool>;

    async fn set_ip_subnet(&self, ip_id: &str, subnet_id: &str) -> Result<()>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store API error: {message}")]
    Api { message: String },

    #[error("record {id} not found")]
    NotFound { id: String },

    #[error("network error: {source}")]
    Network {
        #[from]
        source: reqwest::Error,
    },

    #[error("serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
}

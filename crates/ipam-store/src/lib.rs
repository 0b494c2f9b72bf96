//! IPAM store boundary
//!
//! The `IpamStore` trait is the persistence seam: the hierarchy core plans,
//! this crate applies. The GraphQL driver talks to an Infrahub-style
//! graph-data API; the in-memory store backs tests.

pub mod config;
pub mod graphql;
pub mod memory;
pub mod reconcile;
pub mod store;

pub use config::StoreConfig;
pub use graphql::GraphQlStore;
pub use memory::MemoryStore;
pub use reconcile::{
    apply_ip_links, apply_links, apply_populate, apply_roles, clear_hierarchy, status,
    IpLinkSummary, LinkSummary, PopulateSummary, RoleSummary, StatusReport,
};
pub use store::{IpamStore, StoreError};

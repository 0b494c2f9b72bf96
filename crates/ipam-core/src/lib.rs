//! Shared record types and CIDR helpers for IPAM reconciliation

pub mod error;
pub mod net;
pub mod policy;
pub mod types;

pub use error::AddressError;
pub use net::{is_loopback, parent_network_24, parse_cidr, parse_ipv4, prefix_for, strict_subnet_of};
pub use policy::HierarchyPolicy;
pub use types::{
    HostEntry, HostSource, IpRecord, PrefixRecord, RouteTableData, SubnetRecord, SubnetRole,
};

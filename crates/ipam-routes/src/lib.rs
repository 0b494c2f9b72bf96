//! Routing-table text extraction
//!
//! Pulls CIDR networks out of "show route" style dumps. Vendor formats are
//! matched by line patterns; /32 routes are reclassified as standalone host
//! IPs rather than subnets.

pub mod parser;
pub mod vendor;

pub use parser::{extract_routes, load_routing_table, load_routing_tables};
pub use vendor::Vendor;

//! IPAM reconciliation CLI
//!
//! Command-line tooling for keeping the IPAM store in step with the network:
//! populating it from inventory, ping sweeps and routing-table dumps, and
//! maintaining the subnet parent/child hierarchy.

pub mod commands;
pub mod config;
pub mod discovery;
pub mod inventory;

//! Store-side record types

use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// Role of a subnet in the hierarchy, derived from its prefix length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubnetRole {
    Parent,
    Child,
}

impl std::fmt::Display for SubnetRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubnetRole::Parent => write!(f, "parent"),
            SubnetRole::Child => write!(f, "child"),
        }
    }
}

impl std::str::FromStr for SubnetRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "parent" => Ok(SubnetRole::Parent),
            "child" => Ok(SubnetRole::Child),
            other => Err(format!("unknown subnet role: {}", other)),
        }
    }
}

/// Top-level /8 or /16 grouping of subnets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixRecord {
    pub id: String,
    pub prefix: Ipv4Net,
}

/// Subnet row as held by the IPAM store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetRecord {
    pub id: String,
    pub subnet: Ipv4Net,
    pub role: SubnetRole,
    pub parent_id: Option<String>,
}

impl SubnetRecord {
    pub fn new(id: impl Into<String>, subnet: Ipv4Net, role: SubnetRole) -> Self {
        Self {
            id: id.into(),
            subnet,
            role,
            parent_id: None,
        }
    }
}

/// IP address row as held by the IPAM store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpRecord {
    pub id: String,
    pub address: Ipv4Addr,
    pub subnet_id: Option<String>,
}

/// Where an observed host came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostSource {
    Inventory,
    Scan,
    RoutingTable,
}

/// A host address observed in inventory, a ping sweep or a routing table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostEntry {
    pub address: Ipv4Addr,
    pub device_name: String,
    pub discovered: bool,
    pub source: HostSource,
}

impl HostEntry {
    pub fn new(
        address: Ipv4Addr,
        device_name: impl Into<String>,
        discovered: bool,
        source: HostSource,
    ) -> Self {
        Self {
            address,
            device_name: device_name.into(),
            discovered,
            source,
        }
    }
}

/// Networks and standalone host IPs extracted from routing-table dumps.
///
/// /32 routes are carried as host IPs, not subnets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTableData {
    pub subnets: std::collections::BTreeSet<Ipv4Net>,
    pub host_ips: std::collections::BTreeSet<Ipv4Addr>,
}

impl RouteTableData {
    pub fn merge(&mut self, other: RouteTableData) {
        self.subnets.extend(other.subnets);
        self.host_ips.extend(other.host_ips);
    }

    pub fn is_empty(&self) -> bool {
        self.subnets.is_empty() && self.host_ips.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_strings() {
        assert_eq!("parent".parse::<SubnetRole>().unwrap(), SubnetRole::Parent);
        assert_eq!("child".parse::<SubnetRole>().unwrap(), SubnetRole::Child);
        assert_eq!(SubnetRole::Child.to_string(), "child");
        assert!("uplink".parse::<SubnetRole>().is_err());
    }

    #[test]
    fn records_serialize_with_cidr_strings() {
        let record = SubnetRecord::new("s1", "10.0.0.0/24".parse().unwrap(), SubnetRole::Parent);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["subnet"], "10.0.0.0/24");
        assert_eq!(json["role"], "parent");
    }
}

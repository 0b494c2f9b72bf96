//! Network structure analysis
//!
//! Turns observed hosts and routing-table facts into the prefix/subnet/host
//! structure the store is reconciled against.

use ipnet::Ipv4Net;
use std::collections::{BTreeMap, BTreeSet};
use std::net::Ipv4Addr;

use ipam_core::{parent_network_24, prefix_for, HierarchyPolicy, HostEntry, RouteTableData};

use crate::detector::detect_child_subnets;

/// Derived structure: deduplicated prefixes, the subnet set, and the hosts
/// that produced them. Prefixes and subnets are lexicographically sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkStructure {
    pub prefixes: Vec<Ipv4Net>,
    pub subnets: Vec<Ipv4Net>,
    pub hosts: Vec<HostEntry>,
}

/// Group non-loopback host addresses by their /24 network.
pub fn group_hosts_by_network(hosts: &[HostEntry]) -> BTreeMap<Ipv4Net, Vec<Ipv4Addr>> {
    let mut groups: BTreeMap<Ipv4Net, Vec<Ipv4Addr>> = BTreeMap::new();
    for host in hosts {
        if host.address.is_loopback() {
            continue;
        }
        groups
            .entry(parent_network_24(host.address))
            .or_default()
            .push(host.address);
    }
    groups
}

/// Analyze hosts and routing-table data into a network structure.
///
/// Each /24 with observed hosts is kept as a parent; unless the policy marks
/// it unsplittable, detected /30 and /29 children are added next to it.
/// Routing-table subnets are merged in afterwards, skipping loopback
/// networks, forbidden prefix lengths and subdivisions of unsplittable
/// networks.
pub fn analyze(
    hosts: Vec<HostEntry>,
    routing: &RouteTableData,
    policy: &HierarchyPolicy,
) -> NetworkStructure {
    let mut subnets: BTreeSet<Ipv4Net> = BTreeSet::new();

    for (network, addrs) in group_hosts_by_network(&hosts) {
        subnets.insert(network);

        if policy.is_unsplittable(network) {
            continue;
        }

        for detected in detect_child_subnets(network, &addrs) {
            if detected != network {
                subnets.insert(detected);
            }
        }
    }

    for &subnet in &routing.subnets {
        if ipam_core::is_loopback(subnet) {
            continue;
        }
        if policy.is_forbidden_length(subnet.prefix_len()) {
            log::debug!("dropping routing-table subnet {} (forbidden length)", subnet);
            continue;
        }
        if policy.shadows_unsplittable(subnet) {
            log::debug!(
                "dropping routing-table subnet {} (inside an unsplittable network)",
                subnet
            );
            continue;
        }
        subnets.insert(subnet);
    }

    let prefixes: BTreeSet<Ipv4Net> = subnets.iter().map(|&s| prefix_for(s)).collect();

    let mut prefixes: Vec<Ipv4Net> = prefixes.into_iter().collect();
    prefixes.sort_by_key(|n| n.to_string());
    let mut subnets: Vec<Ipv4Net> = subnets.into_iter().collect();
    subnets.sort_by_key(|n| n.to_string());

    NetworkStructure {
        prefixes,
        subnets,
        hosts,
    }
}

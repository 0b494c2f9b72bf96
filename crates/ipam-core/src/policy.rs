//! Hierarchy policy
//!
//! Explicit configuration handed to the analyzer. The core never reads
//! process environment; the CLI builds one of these from its config file.

use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};

use crate::net::strict_subnet_of;

/// Policy knobs for subnet detection and routing-table ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchyPolicy {
    /// /24 networks that are never split into /29 or /30 children.
    pub networks_without_subdivision: Vec<Ipv4Net>,

    /// Prefix lengths rejected when ingesting routing-table subnets.
    pub forbidden_prefix_lengths: Vec<u8>,
}

impl Default for HierarchyPolicy {
    fn default() -> Self {
        Self {
            networks_without_subdivision: Vec::new(),
            forbidden_prefix_lengths: vec![25, 26, 27, 28],
        }
    }
}

impl HierarchyPolicy {
    /// Whether this exact network is on the no-subdivision list.
    pub fn is_unsplittable(&self, net: Ipv4Net) -> bool {
        self.networks_without_subdivision
            .iter()
            .any(|n| n.trunc() == net.trunc())
    }

    /// Whether this network is a strict subdivision of a no-subdivision
    /// network and must be dropped from ingestion.
    pub fn shadows_unsplittable(&self, net: Ipv4Net) -> bool {
        self.networks_without_subdivision
            .iter()
            .any(|parent| strict_subnet_of(net, *parent))
    }

    pub fn is_forbidden_length(&self, prefix_len: u8) -> bool {
        self.forbidden_prefix_lengths.contains(&prefix_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> HierarchyPolicy {
        HierarchyPolicy {
            networks_without_subdivision: vec!["192.168.0.0/24".parse().unwrap()],
            ..Default::default()
        }
    }

    #[test]
    fn unsplittable_matches_exact_network_only() {
        let p = policy();
        assert!(p.is_unsplittable("192.168.0.0/24".parse().unwrap()));
        assert!(!p.is_unsplittable("192.168.1.0/24".parse().unwrap()));
    }

    #[test]
    fn subdivisions_of_unsplittable_networks_are_shadowed() {
        let p = policy();
        assert!(p.shadows_unsplittable("192.168.0.8/30".parse().unwrap()));
        assert!(!p.shadows_unsplittable("192.168.0.0/24".parse().unwrap()));
        assert!(!p.shadows_unsplittable("10.0.0.4/30".parse().unwrap()));
    }

    #[test]
    fn default_forbidden_band() {
        let p = HierarchyPolicy::default();
        for len in 25..=28 {
            assert!(p.is_forbidden_length(len));
        }
        assert!(!p.is_forbidden_length(24));
        assert!(!p.is_forbidden_length(29));
        assert!(!p.is_forbidden_length(30));
    }
}

//! Longest-prefix resolution
//!
//! An address belongs to the most specific subnet containing it. Ties at
//! equal prefix length (possible only with duplicate or malformed store
//! rows) break by smallest CIDR string, then input order.

use ipam_core::SubnetRecord;
use ipnet::Ipv4Net;
use std::net::Ipv4Addr;

/// Most specific subnet record containing `addr`, or `None` if no record
/// contains it.
pub fn most_specific<'a>(addr: Ipv4Addr, subnets: &'a [SubnetRecord]) -> Option<&'a SubnetRecord> {
    let mut candidates: Vec<&SubnetRecord> = subnets
        .iter()
        .filter(|record| record.subnet.contains(&addr))
        .collect();

    candidates.sort_by(|a, b| {
        b.subnet
            .prefix_len()
            .cmp(&a.subnet.prefix_len())
            .then_with(|| a.subnet.to_string().cmp(&b.subnet.to_string()))
    });

    candidates.first().copied()
}

/// Longest-prefix match over plain networks.
pub fn most_specific_net(addr: Ipv4Addr, subnets: &[Ipv4Net]) -> Option<Ipv4Net> {
    let mut candidates: Vec<Ipv4Net> = subnets
        .iter()
        .copied()
        .filter(|net| net.contains(&addr))
        .collect();

    candidates.sort_by(|a, b| {
        b.prefix_len()
            .cmp(&a.prefix_len())
            .then_with(|| a.to_string().cmp(&b.to_string()))
    });

    candidates.first().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipam_core::SubnetRole;

    fn record(id: &str, net: &str) -> SubnetRecord {
        let subnet: Ipv4Net = net.parse().unwrap();
        let role = crate::classify::role_for(subnet);
        SubnetRecord::new(id, subnet, role)
    }

    #[test]
    fn longest_prefix_wins() {
        let subnets = vec![record("a", "10.0.0.0/24"), record("b", "10.0.0.0/30")];
        let hit = most_specific("10.0.0.1".parse().unwrap(), &subnets).unwrap();
        assert_eq!(hit.id, "b");
        assert_eq!(hit.role, SubnetRole::Child);
    }

    #[test]
    fn no_containing_subnet_is_none() {
        let subnets = vec![record("a", "10.0.0.0/24")];
        assert!(most_specific("192.168.1.1".parse().unwrap(), &subnets).is_none());
    }

    #[test]
    fn equal_length_tie_breaks_by_input_order_for_identical_cidrs() {
        // Duplicate store rows for the same network: the stable sort keeps
        // the first-listed record in front.
        let subnets = vec![record("first", "10.0.0.0/30"), record("second", "10.0.0.0/30")];
        let hit = most_specific("10.0.0.2".parse().unwrap(), &subnets).unwrap();
        assert_eq!(hit.id, "first");
    }

    #[test]
    fn plain_net_resolution_matches_record_resolution() {
        let nets: Vec<Ipv4Net> = vec![
            "10.0.0.0/24".parse().unwrap(),
            "10.0.0.0/30".parse().unwrap(),
        ];
        assert_eq!(
            most_specific_net("10.0.0.1".parse().unwrap(), &nets),
            Some("10.0.0.0/30".parse().unwrap())
        );
        assert_eq!(most_specific_net("10.1.0.1".parse().unwrap(), &nets), None);
    }
}

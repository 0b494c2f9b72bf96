//! Child-subnet detection
//!
//! Clusters addresses observed inside a parent network into /30 and /29
//! candidates. Two or more addresses landing in the same candidate are taken
//! as evidence of a real point-to-point or small LAN segment.

use ipnet::Ipv4Net;
use std::collections::{BTreeMap, BTreeSet};
use std::net::Ipv4Addr;

/// Candidate child prefix lengths, most specific first. Checking /30 before
/// /29 prefers the tightest fit for point-to-point pairs.
const CHILD_PREFIX_LENGTHS: [u8; 2] = [30, 29];

/// Detect /30 and /29 child subnets inside `parent` from observed addresses.
///
/// Fewer than two addresses tell us nothing about subdivision, so the parent
/// comes back unchanged. Addresses that never cluster with a neighbour are
/// dropped from the result; host-only /32 routes are handled by routing-table
/// ingestion, not here.
pub fn detect_child_subnets(parent: Ipv4Net, addrs: &[Ipv4Addr]) -> Vec<Ipv4Net> {
    if addrs.len() < 2 {
        return vec![parent];
    }

    let mut sorted: Vec<Ipv4Addr> = addrs.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut claimed: BTreeMap<Ipv4Addr, Ipv4Net> = BTreeMap::new();

    for prefix_len in CHILD_PREFIX_LENGTHS {
        let mut groups: BTreeMap<Ipv4Net, Vec<Ipv4Addr>> = BTreeMap::new();

        for &ip in &sorted {
            if claimed.contains_key(&ip) {
                continue;
            }
            let candidate = Ipv4Net::new(ip, prefix_len).unwrap().trunc();
            if parent.contains(&candidate) {
                groups.entry(candidate).or_default().push(ip);
            }
        }

        for (candidate, members) in groups {
            if members.len() >= 2 {
                for ip in members {
                    claimed.entry(ip).or_insert(candidate);
                }
            }
        }
    }

    let detected: BTreeSet<Ipv4Net> = claimed.values().copied().collect();
    if detected.is_empty() {
        vec![parent]
    } else {
        detected.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn net(s: &str) -> Ipv4Net {
        s.parse().unwrap()
    }

    fn addrs(list: &[&str]) -> Vec<Ipv4Addr> {
        list.iter().map(|s| s.parse().unwrap()).collect()
    }

    #[test]
    fn empty_and_single_address_return_the_parent() {
        let parent = net("10.0.0.0/24");
        assert_eq!(detect_child_subnets(parent, &[]), vec![parent]);
        assert_eq!(
            detect_child_subnets(parent, &addrs(&["10.0.0.1"])),
            vec![parent]
        );
    }

    #[test]
    fn point_to_point_pair_becomes_a_slash_30() {
        let parent = net("10.0.0.0/24");
        let detected = detect_child_subnets(parent, &addrs(&["10.0.0.1", "10.0.0.2"]));
        assert_eq!(detected, vec![net("10.0.0.0/30")]);
    }

    #[test]
    fn slash_30_wins_over_a_covering_slash_29() {
        // Both addresses share a /30; the /29 covering them must not appear.
        let parent = net("10.0.0.0/24");
        let detected = detect_child_subnets(parent, &addrs(&["10.0.0.5", "10.0.0.6"]));
        assert_eq!(detected, vec![net("10.0.0.4/30")]);
    }

    #[test]
    fn addresses_split_across_30s_fall_back_to_the_29() {
        // .1 sits in 10.0.0.0/30, .5 in 10.0.0.4/30: no /30 pair, but both
        // share 10.0.0.0/29.
        let parent = net("10.0.0.0/24");
        let detected = detect_child_subnets(parent, &addrs(&["10.0.0.1", "10.0.0.5"]));
        assert_eq!(detected, vec![net("10.0.0.0/29")]);
    }

    #[test]
    fn claimed_addresses_are_not_reconsidered_at_29() {
        let parent = net("10.0.0.0/24");
        let detected = detect_child_subnets(
            parent,
            &addrs(&["10.0.0.1", "10.0.0.2", "10.0.0.9", "10.0.0.13"]),
        );
        // .1/.2 pair up as a /30 and stay claimed; .9/.13 cluster in
        // 10.0.0.8/29.
        assert_eq!(detected, vec![net("10.0.0.0/30"), net("10.0.0.8/29")]);
    }

    #[test]
    fn isolated_addresses_are_dropped_not_promoted() {
        let parent = net("10.0.0.0/24");
        let detected = detect_child_subnets(
            parent,
            &addrs(&["10.0.0.1", "10.0.0.2", "10.0.0.200"]),
        );
        assert_eq!(detected, vec![net("10.0.0.0/30")]);
    }

    #[test]
    fn candidates_outside_the_parent_are_ignored() {
        let parent = net("10.0.0.0/24");
        let detected = detect_child_subnets(parent, &addrs(&["10.0.1.1", "10.0.1.2"]));
        assert_eq!(detected, vec![parent]);
    }

    #[test]
    fn duplicate_addresses_do_not_fake_a_cluster() {
        let parent = net("10.0.0.0/24");
        let detected = detect_child_subnets(parent, &addrs(&["10.0.0.1", "10.0.0.1"]));
        assert_eq!(detected, vec![parent]);
    }
}

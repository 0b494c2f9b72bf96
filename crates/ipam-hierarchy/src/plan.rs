//! Reconciliation planning
//!
//! Pure diffing between what the store holds and what the hierarchy rules
//! say it should hold. The planners emit only the changes that are actually
//! needed, so applying a plan twice is a no-op.

use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

use ipam_core::{IpRecord, SubnetRecord, SubnetRole};

use crate::analyze::NetworkStructure;
use crate::classify::role_for;
use crate::linker::link_children;
use crate::resolver::most_specific;

/// Instruction set for the populate flow: ensure these prefixes exist, then
/// ensure each subnet exists under its containing prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulatePlan {
    pub prefixes: Vec<Ipv4Net>,
    pub subnets: Vec<SubnetPlacement>,
    /// Subnets with no containing prefix; reported, never created.
    pub orphans: Vec<Ipv4Net>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetPlacement {
    pub subnet: Ipv4Net,
    pub prefix: Ipv4Net,
}

/// Place every subnet of a structure under its containing prefix.
pub fn plan_populate(structure: &NetworkStructure) -> PopulatePlan {
    let mut plan = PopulatePlan {
        prefixes: structure.prefixes.clone(),
        ..Default::default()
    };

    for &subnet in &structure.subnets {
        let containing = structure
            .prefixes
            .iter()
            .copied()
            .find(|&prefix| prefix.contains(&subnet));

        match containing {
            Some(prefix) => plan.subnets.push(SubnetPlacement { subnet, prefix }),
            None => {
                log::warn!("no prefix contains subnet {}", subnet);
                plan.orphans.push(subnet);
            }
        }
    }

    plan
}

/// A subnet whose stored role disagrees with its prefix length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleChange {
    pub subnet_id: String,
    pub subnet: Ipv4Net,
    pub role: SubnetRole,
}

/// Role corrections for stored subnets. Records already carrying the right
/// role are left alone.
pub fn plan_roles(records: &[SubnetRecord]) -> Vec<RoleChange> {
    let mut changes: Vec<RoleChange> = records
        .iter()
        .filter_map(|record| {
            let role = role_for(record.subnet);
            (record.role != role).then(|| RoleChange {
                subnet_id: record.id.clone(),
                subnet: record.subnet,
                role,
            })
        })
        .collect();
    changes.sort_by_key(|c| c.subnet.to_string());
    changes
}

/// Parent-side child list to apply to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkChildren {
    pub parent_id: String,
    pub parent: Ipv4Net,
    pub child_ids: Vec<String>,
}

/// Plan parent-child links over stored subnet records.
///
/// Edges come from [`link_children`]; an edge is emitted only when at least
/// one child's stored parent link disagrees, and it always carries the full
/// child list so application replaces stale links instead of appending.
pub fn plan_links(records: &[SubnetRecord]) -> Vec<LinkChildren> {
    // First record per distinct CIDR, in lexicographic (subnet, id) order,
    // so duplicate store rows cannot flip the outcome between runs.
    let mut ordered: Vec<&SubnetRecord> = records.iter().collect();
    ordered.sort_by(|a, b| {
        a.subnet
            .to_string()
            .cmp(&b.subnet.to_string())
            .then_with(|| a.id.cmp(&b.id))
    });
    let mut by_net: Vec<&SubnetRecord> = Vec::new();
    for record in ordered {
        if !by_net.iter().any(|r| r.subnet.trunc() == record.subnet.trunc()) {
            by_net.push(record);
        }
    }

    let nets: Vec<Ipv4Net> = by_net.iter().map(|r| r.subnet).collect();
    let edges = link_children(&nets);

    let find = |net: Ipv4Net| {
        by_net
            .iter()
            .copied()
            .find(|r| r.subnet.trunc() == net.trunc())
    };

    let mut plans = Vec::new();
    for edge in edges {
        let Some(parent) = find(edge.parent) else {
            continue;
        };

        let children: Vec<&SubnetRecord> =
            edge.children.iter().filter_map(|&c| find(c)).collect();

        let up_to_date = children
            .iter()
            .all(|child| child.parent_id.as_deref() == Some(parent.id.as_str()));
        if up_to_date {
            continue;
        }

        plans.push(LinkChildren {
            parent_id: parent.id.clone(),
            parent: parent.subnet,
            child_ids: children.iter().map(|c| c.id.clone()).collect(),
        });
    }

    plans
}

/// One IP to (re)attach to a subnet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpLink {
    pub ip_id: String,
    pub address: Ipv4Addr,
    pub subnet_id: String,
    pub subnet: Ipv4Net,
}

/// Outcome of planning IP attachment: the links to apply, plus the counts
/// the status report wants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpLinkPlan {
    pub links: Vec<IpLink>,
    pub already_correct: usize,
    pub unresolved: Vec<Ipv4Addr>,
}

/// Attach each stored IP to its most specific containing subnet.
///
/// IPs with no containing subnet are collected as unresolved skips, never
/// treated as a failure of the whole run.
pub fn plan_ip_links(subnets: &[SubnetRecord], ips: &[IpRecord]) -> IpLinkPlan {
    let mut plan = IpLinkPlan::default();

    for ip in ips {
        let Some(target) = most_specific(ip.address, subnets) else {
            log::warn!("no subnet found for IP {}", ip.address);
            plan.unresolved.push(ip.address);
            continue;
        };

        if ip.subnet_id.as_deref() == Some(target.id.as_str()) {
            plan.already_correct += 1;
            continue;
        }

        plan.links.push(IpLink {
            ip_id: ip.id.clone(),
            address: ip.address,
            subnet_id: target.id.clone(),
            subnet: target.subnet,
        });
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, net: &str) -> SubnetRecord {
        let subnet: Ipv4Net = net.parse().unwrap();
        SubnetRecord::new(id, subnet, role_for(subnet))
    }

    #[test]
    fn roles_are_corrected_only_when_wrong() {
        let mut wrong = record("a", "10.0.0.0/30");
        wrong.role = SubnetRole::Parent;
        let right = record("b", "10.0.0.0/24");

        let changes = plan_roles(&[wrong, right]);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].subnet_id, "a");
        assert_eq!(changes[0].role, SubnetRole::Child);
    }

    #[test]
    fn links_are_skipped_when_already_set() {
        let parent = record("p", "10.0.0.0/24");
        let mut child = record("c", "10.0.0.4/30");
        child.parent_id = Some("p".to_string());

        assert!(plan_links(&[parent.clone(), child.clone()]).is_empty());

        child.parent_id = Some("stale".to_string());
        let plans = plan_links(&[parent, child]);
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].parent_id, "p");
        assert_eq!(plans[0].child_ids, vec!["c".to_string()]);
    }

    #[test]
    fn ip_links_pick_the_most_specific_subnet() {
        let subnets = vec![record("p", "10.0.0.0/24"), record("c", "10.0.0.0/30")];
        let ips = vec![
            IpRecord {
                id: "i1".to_string(),
                address: "10.0.0.1".parse().unwrap(),
                subnet_id: Some("p".to_string()),
            },
            IpRecord {
                id: "i2".to_string(),
                address: "10.0.0.1".parse().unwrap(),
                subnet_id: Some("c".to_string()),
            },
            IpRecord {
                id: "i3".to_string(),
                address: "192.168.9.9".parse().unwrap(),
                subnet_id: None,
            },
        ];

        let plan = plan_ip_links(&subnets, &ips);
        assert_eq!(plan.links.len(), 1);
        assert_eq!(plan.links[0].ip_id, "i1");
        assert_eq!(plan.links[0].subnet_id, "c");
        assert_eq!(plan.already_correct, 1);
        assert_eq!(plan.unresolved, vec!["192.168.9.9".parse::<Ipv4Addr>().unwrap()]);
    }

    #[test]
    fn populate_places_subnets_under_their_prefix() {
        let structure = NetworkStructure {
            prefixes: vec!["10.0.0.0/8".parse().unwrap()],
            subnets: vec![
                "10.0.0.0/24".parse().unwrap(),
                "192.168.1.0/24".parse().unwrap(),
            ],
            hosts: Vec::new(),
        };

        let plan = plan_populate(&structure);
        assert_eq!(plan.subnets.len(), 1);
        assert_eq!(plan.subnets[0].prefix, "10.0.0.0/8".parse::<Ipv4Net>().unwrap());
        assert_eq!(plan.orphans, vec!["192.168.1.0/24".parse::<Ipv4Net>().unwrap()]);
    }
}

//! End-to-end tests over the hierarchy core

use ipnet::Ipv4Net;
use std::net::Ipv4Addr;

use ipam_core::{HierarchyPolicy, HostEntry, HostSource, RouteTableData, SubnetRecord, SubnetRole};

use crate::{analyze, link_children, most_specific, plan_links, plan_roles, role_for};

fn net(s: &str) -> Ipv4Net {
    s.parse().unwrap()
}

fn host(addr: &str) -> HostEntry {
    HostEntry::new(addr.parse().unwrap(), "dev", false, HostSource::Inventory)
}

#[test]
fn two_hosts_yield_a_child_30_linked_under_the_24() {
    // Addresses 10.0.0.1 and 10.0.0.2 inside 10.0.0.0/24 become the child
    // 10.0.0.0/30 with a parent link to the /24.
    let structure = analyze(
        vec![host("10.0.0.1"), host("10.0.0.2")],
        &RouteTableData::default(),
        &HierarchyPolicy::default(),
    );

    assert_eq!(
        structure.subnets,
        vec![net("10.0.0.0/24"), net("10.0.0.0/30")]
    );
    assert_eq!(role_for(net("10.0.0.0/30")), SubnetRole::Child);
    assert_eq!(role_for(net("10.0.0.0/24")), SubnetRole::Parent);

    let edges = link_children(&structure.subnets);
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].parent, net("10.0.0.0/24"));
    assert_eq!(edges[0].children, vec![net("10.0.0.0/30")]);
}

#[test]
fn resolved_subnet_is_maximal_in_prefix_length() {
    let records = vec![
        SubnetRecord::new("p", net("10.0.0.0/24"), SubnetRole::Parent),
        SubnetRecord::new("c", net("10.0.0.0/30"), SubnetRole::Child),
    ];
    let addr: Ipv4Addr = "10.0.0.1".parse().unwrap();
    assert_eq!(most_specific(addr, &records).unwrap().id, "c");
}

#[test]
fn planning_twice_changes_nothing_the_second_time() {
    let structure = analyze(
        vec![
            host("10.0.0.1"),
            host("10.0.0.2"),
            host("10.0.0.9"),
            host("10.0.0.13"),
            host("10.1.2.40"),
        ],
        &RouteTableData::default(),
        &HierarchyPolicy::default(),
    );

    // Pretend the store was populated from the structure with correct roles.
    let mut records: Vec<SubnetRecord> = structure
        .subnets
        .iter()
        .enumerate()
        .map(|(i, &subnet)| SubnetRecord::new(format!("s{}", i), subnet, role_for(subnet)))
        .collect();

    assert!(plan_roles(&records).is_empty());

    // First linking pass produces work; apply it.
    let link_plans = plan_links(&records);
    assert!(!link_plans.is_empty());
    for plan in &link_plans {
        for child_id in &plan.child_ids {
            let child = records.iter_mut().find(|r| &r.id == child_id).unwrap();
            child.parent_id = Some(plan.parent_id.clone());
        }
    }

    // Second pass is a no-op and the edges themselves are stable.
    assert!(plan_links(&records).is_empty());
    assert_eq!(
        link_children(&structure.subnets),
        link_children(&structure.subnets)
    );
}

#[test]
fn stale_parent_links_are_replaced_not_duplicated() {
    let parent = SubnetRecord::new("p24", net("10.0.0.0/24"), SubnetRole::Parent);
    let mut child = SubnetRecord::new("c", net("10.0.0.4/30"), SubnetRole::Child);
    child.parent_id = Some("gone".to_string());

    let plans = plan_links(&[parent, child]);
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].parent_id, "p24");
    assert_eq!(plans[0].child_ids, vec!["c".to_string()]);
}

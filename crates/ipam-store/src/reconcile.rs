//! Plan application
//!
//! Runs the hierarchy core's plans against an `IpamStore`. Failures are
//! isolated per item: one bad record is logged and counted, the run keeps
//! going.

use anyhow::Result;
use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};

use ipam_core::SubnetRole;
use ipam_hierarchy::{
    most_specific_net, plan_ip_links, plan_links, plan_populate, plan_roles, NetworkStructure,
};

use crate::store::IpamStore;

/// Outcome of a populate run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulateSummary {
    pub prefixes: usize,
    pub subnets: usize,
    pub ips_created: usize,
    pub ips_existing: usize,
    pub ips_skipped: usize,
}

/// Ensure the structure's prefixes, subnets and host IPs exist in the store.
///
/// Reruns with unchanged input change nothing: `ensure_*` returns existing
/// ids and `create_ip` no-ops on known addresses.
pub async fn apply_populate(
    store: &dyn IpamStore,
    structure: &NetworkStructure,
) -> Result<PopulateSummary> {
    let plan = plan_populate(structure);
    let mut summary = PopulateSummary::default();

    let mut prefix_ids: Vec<(Ipv4Net, String)> = Vec::new();
    for &prefix in &plan.prefixes {
        let id = store.ensure_prefix(prefix).await?;
        prefix_ids.push((prefix, id));
    }
    summary.prefixes = prefix_ids.len();

    let mut subnet_ids: Vec<(Ipv4Net, String)> = Vec::new();
    for placement in &plan.subnets {
        let prefix_id = prefix_ids
            .iter()
            .find(|(net, _)| *net == placement.prefix)
            .map(|(_, id)| id.clone());
        let Some(prefix_id) = prefix_id else {
            continue;
        };
        let id = store.ensure_subnet(placement.subnet, &prefix_id).await?;
        subnet_ids.push((placement.subnet, id));
    }
    summary.subnets = subnet_ids.len();

    let subnet_nets: Vec<Ipv4Net> = subnet_ids.iter().map(|(net, _)| *net).collect();
    for host in &structure.hosts {
        let Some(target) = most_specific_net(host.address, &subnet_nets) else {
            log::warn!("no subnet found for IP {}", host.address);
            summary.ips_skipped += 1;
            continue;
        };
        let subnet_id = subnet_ids
            .iter()
            .find(|(net, _)| *net == target)
            .map(|(_, id)| id.as_str())
            .unwrap_or_default();

        let description = format!("{} - Management IP", host.device_name);
        match store.create_ip(host.address, &description, subnet_id).await {
            Ok(true) => summary.ips_created += 1,
            Ok(false) => summary.ips_existing += 1,
            Err(err) => {
                log::warn!("failed to create IP {}: {}", host.address, err);
                summary.ips_skipped += 1;
            }
        }
    }

    Ok(summary)
}

/// Outcome of a role pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSummary {
    pub parents: usize,
    pub children: usize,
    pub updated: usize,
}

/// Correct stored subnet roles to match prefix-length classification.
pub async fn apply_roles(store: &dyn IpamStore) -> Result<RoleSummary> {
    let records = store.list_subnets().await?;

    let mut summary = RoleSummary::default();
    for record in &records {
        match ipam_hierarchy::role_for(record.subnet) {
            SubnetRole::Parent => summary.parents += 1,
            SubnetRole::Child => summary.children += 1,
        }
    }

    for change in plan_roles(&records) {
        store.set_subnet_role(&change.subnet_id, change.role).await?;
        log::info!("{} -> {}", change.subnet, change.role);
        summary.updated += 1;
    }

    Ok(summary)
}

/// Outcome of a linking pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSummary {
    pub parents_linked: usize,
    pub children_linked: usize,
}

/// Apply parent-side child lists.
pub async fn apply_links(store: &dyn IpamStore) -> Result<LinkSummary> {
    let records = store.list_subnets().await?;

    let mut summary = LinkSummary::default();
    for link in plan_links(&records) {
        store
            .set_child_subnets(&link.parent_id, &link.child_ids)
            .await?;
        log::info!("{} -> {} children", link.parent, link.child_ids.len());
        summary.parents_linked += 1;
        summary.children_linked += link.child_ids.len();
    }

    Ok(summary)
}

/// Outcome of an IP relink pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpLinkSummary {
    pub updated: usize,
    pub already_correct: usize,
    pub unresolved: usize,
}

/// Point every stored IP at its most specific subnet.
pub async fn apply_ip_links(store: &dyn IpamStore) -> Result<IpLinkSummary> {
    let subnets = store.list_subnets().await?;
    let ips = store.list_ips().await?;

    let plan = plan_ip_links(&subnets, &ips);
    let mut summary = IpLinkSummary {
        already_correct: plan.already_correct,
        unresolved: plan.unresolved.len(),
        ..Default::default()
    };

    for link in plan.links {
        match store.set_ip_subnet(&link.ip_id, &link.subnet_id).await {
            Ok(()) => {
                log::info!("{} -> {}", link.address, link.subnet);
                summary.updated += 1;
            }
            Err(err) => {
                log::warn!("failed to relink IP {}: {}", link.address, err);
                summary.unresolved += 1;
            }
        }
    }

    Ok(summary)
}

/// Clear every parent link in the store.
pub async fn clear_hierarchy(store: &dyn IpamStore) -> Result<usize> {
    let records = store.list_subnets().await?;
    let mut cleared = 0;
    for record in records {
        store.clear_parent(&record.id).await?;
        cleared += 1;
    }
    Ok(cleared)
}

/// Aggregate view of the store for the status command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub subnets_total: usize,
    pub parents: usize,
    pub children: usize,
    pub parents_with_children: usize,
    pub children_with_parent: usize,
    pub ips_total: usize,
    pub ips_linked: usize,
    pub ips_unlinked: usize,
}

pub async fn status(store: &dyn IpamStore) -> Result<StatusReport> {
    let subnets = store.list_subnets().await?;
    let ips = store.list_ips().await?;

    let mut report = StatusReport {
        subnets_total: subnets.len(),
        ips_total: ips.len(),
        ..Default::default()
    };

    let mut parent_ids: Vec<&str> = Vec::new();
    for subnet in &subnets {
        match subnet.role {
            SubnetRole::Parent => report.parents += 1,
            SubnetRole::Child => report.children += 1,
        }
        if let Some(parent_id) = subnet.parent_id.as_deref() {
            report.children_with_parent += 1;
            if !parent_ids.contains(&parent_id) {
                parent_ids.push(parent_id);
            }
        }
    }
    report.parents_with_children = parent_ids.len();

    report.ips_linked = ips.iter().filter(|ip| ip.subnet_id.is_some()).count();
    report.ips_unlinked = report.ips_total - report.ips_linked;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use ipam_core::{HierarchyPolicy, HostEntry, HostSource, RouteTableData};
    use ipam_hierarchy::analyze;

    fn host(addr: &str, name: &str) -> HostEntry {
        HostEntry::new(addr.parse().unwrap(), name, false, HostSource::Inventory)
    }

    fn structure() -> NetworkStructure {
        analyze(
            vec![
                host("10.0.0.1", "r1"),
                host("10.0.0.2", "r2"),
                host("10.0.0.50", "sw1"),
            ],
            &RouteTableData::default(),
            &HierarchyPolicy::default(),
        )
    }

    #[tokio::test]
    async fn populate_attaches_ips_to_the_most_specific_subnet() {
        let store = MemoryStore::new();
        let summary = apply_populate(&store, &structure()).await.unwrap();

        assert_eq!(summary.prefixes, 1);
        assert_eq!(summary.subnets, 2); // the /24 and the detected /30
        assert_eq!(summary.ips_created, 3);
        assert_eq!(summary.ips_skipped, 0);

        let subnets = store.list_subnets().await.unwrap();
        let slash30 = subnets
            .iter()
            .find(|s| s.subnet.prefix_len() == 30)
            .unwrap();

        let ips = store.list_ips().await.unwrap();
        let r1 = ips
            .iter()
            .find(|ip| ip.address == "10.0.0.1".parse::<std::net::Ipv4Addr>().unwrap())
            .unwrap();
        assert_eq!(r1.subnet_id.as_deref(), Some(slash30.id.as_str()));
    }

    #[tokio::test]
    async fn populate_twice_creates_no_duplicates() {
        let store = MemoryStore::new();
        let first = apply_populate(&store, &structure()).await.unwrap();
        let second = apply_populate(&store, &structure()).await.unwrap();

        assert_eq!(first.ips_created, 3);
        assert_eq!(second.ips_created, 0);
        assert_eq!(second.ips_existing, 3);
        assert_eq!(store.list_subnets().await.unwrap().len(), 2);
        assert_eq!(store.list_ips().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn hierarchy_setup_flow_converges() {
        let store = MemoryStore::new();
        apply_populate(&store, &structure()).await.unwrap();

        let roles = apply_roles(&store).await.unwrap();
        assert_eq!(roles.parents, 1);
        assert_eq!(roles.children, 1);
        // MemoryStore defaults everything to parent, so the /30 flips.
        assert_eq!(roles.updated, 1);

        let links = apply_links(&store).await.unwrap();
        assert_eq!(links.parents_linked, 1);
        assert_eq!(links.children_linked, 1);

        let ip_links = apply_ip_links(&store).await.unwrap();
        assert_eq!(ip_links.updated, 0);
        assert_eq!(ip_links.already_correct, 3);

        // A second full pass changes nothing.
        let roles = apply_roles(&store).await.unwrap();
        assert_eq!(roles.updated, 0);
        let links = apply_links(&store).await.unwrap();
        assert_eq!(links.parents_linked, 0);

        let report = status(&store).await.unwrap();
        assert_eq!(report.subnets_total, 2);
        assert_eq!(report.parents, 1);
        assert_eq!(report.children, 1);
        assert_eq!(report.parents_with_children, 1);
        assert_eq!(report.children_with_parent, 1);
        assert_eq!(report.ips_total, 3);
        assert_eq!(report.ips_linked, 3);
        assert_eq!(report.ips_unlinked, 0);
    }

    #[tokio::test]
    async fn reset_clears_all_parent_links() {
        let store = MemoryStore::new();
        apply_populate(&store, &structure()).await.unwrap();
        apply_roles(&store).await.unwrap();
        apply_links(&store).await.unwrap();

        let cleared = clear_hierarchy(&store).await.unwrap();
        assert_eq!(cleared, 2);
        assert!(store
            .list_subnets()
            .await
            .unwrap()
            .iter()
            .all(|s| s.parent_id.is_none()));
    }
}

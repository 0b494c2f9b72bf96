//! Populate command

use anyhow::Result;
use ipnet::Ipv4Net;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use ipam_core::{HostEntry, HostSource, RouteTableData};
use ipam_hierarchy::analyze;
use ipam_store::IpamStore;

use crate::config::CliConfig;
use crate::discovery;
use crate::inventory;

/// Populate command implementation
pub struct PopulateCommand {
    store: Arc<dyn IpamStore>,
    config: CliConfig,
}

impl PopulateCommand {
    pub fn new(store: Arc<dyn IpamStore>, config: CliConfig) -> Self {
        Self { store, config }
    }

    /// Execute populate command
    pub async fn execute(
        &self,
        scan: bool,
        workers: usize,
        routing_tables: &[PathBuf],
    ) -> Result<()> {
        let inventory = inventory::load_inventory(self.config.inventory_path.as_ref());
        let mut hosts = inventory::inventory_hosts(&inventory);
        println!("Inventory: {} hosts", hosts.len());

        let routing = if routing_tables.is_empty() {
            RouteTableData::default()
        } else {
            let data = ipam_routes::load_routing_tables(routing_tables);
            println!(
                "Routing tables: {} subnets, {} host routes",
                data.subnets.len(),
                data.host_ips.len()
            );
            data
        };

        if scan {
            let discovered = self.scan_networks(&hosts, &routing, workers).await;
            println!("Scan: {} new hosts", discovered.len());
            hosts.extend(discovered);
        }

        // Host routes become entries of their own when nothing from the
        // inventory or scan already covers the address.
        let known: BTreeSet<_> = hosts.iter().map(|h| h.address).collect();
        for &addr in &routing.host_ips {
            if known.contains(&addr) {
                continue;
            }
            let name = discovery::reverse_dns(addr)
                .await
                .unwrap_or_else(|| format!("host-{}", addr));
            hosts.push(HostEntry::new(addr, name, false, HostSource::RoutingTable));
        }

        let structure = analyze(hosts, &routing, &self.config.policy());
        println!(
            "Structure: {} prefixes, {} subnets, {} IPs",
            structure.prefixes.len(),
            structure.subnets.len(),
            structure.hosts.len()
        );
        for &subnet in &structure.subnets {
            log::debug!("subnet {}", subnet);
        }

        let summary = ipam_store::apply_populate(self.store.as_ref(), &structure).await?;
        println!("Populate complete");
        println!("  prefixes:     {}", summary.prefixes);
        println!("  subnets:      {}", summary.subnets);
        println!("  IPs created:  {}", summary.ips_created);
        println!("  IPs existing: {}", summary.ips_existing);
        if summary.ips_skipped > 0 {
            println!("  IPs skipped:  {}", summary.ips_skipped);
        }
        Ok(())
    }

    /// Ping-sweep every /24 implied by the known hosts and routing tables,
    /// returning only responders not already in `hosts`.
    async fn scan_networks(
        &self,
        hosts: &[HostEntry],
        routing: &RouteTableData,
        workers: usize,
    ) -> Vec<HostEntry> {
        let mut networks: BTreeSet<Ipv4Net> = hosts
            .iter()
            .filter(|h| !h.address.is_loopback())
            .map(|h| ipam_core::parent_network_24(h.address))
            .collect();
        for &subnet in &routing.subnets {
            networks.insert(ipam_core::parent_network_24(subnet.network()));
        }

        let known: BTreeSet<_> = hosts.iter().map(|h| h.address).collect();
        let mut discovered = Vec::new();
        for network in networks {
            log::info!("scanning {}", network);
            for host in discovery::scan_network(network, workers).await {
                if !known.contains(&host.address) {
                    discovered.push(host);
                }
            }
        }
        discovered
    }
}

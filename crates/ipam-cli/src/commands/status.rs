//! Status command

use anyhow::Result;
use std::sync::Arc;

use ipam_store::IpamStore;

/// Status command implementation
pub struct StatusCommand {
    store: Arc<dyn IpamStore>,
}

impl StatusCommand {
    pub fn new(store: Arc<dyn IpamStore>) -> Self {
        Self { store }
    }

    /// Execute status command
    pub async fn execute(&self, detailed: bool) -> Result<()> {
        if detailed {
            self.show_detailed().await
        } else {
            self.show_summary().await
        }
    }

    async fn show_summary(&self) -> Result<()> {
        let report = ipam_store::status(self.store.as_ref()).await?;

        println!("IPAM status");
        println!("{}", "-".repeat(50));
        println!("Subnets: {} total", report.subnets_total);
        println!("  parents:  {}", report.parents);
        println!("  children: {}", report.children);
        println!("Hierarchy:");
        println!("  parents with children: {}", report.parents_with_children);
        println!("  children with parent:  {}", report.children_with_parent);
        println!("IP addresses: {} total", report.ips_total);
        println!("  linked:   {}", report.ips_linked);
        if report.ips_unlinked > 0 {
            println!("  unlinked: {}", report.ips_unlinked);
        }
        Ok(())
    }

    async fn show_detailed(&self) -> Result<()> {
        let prefixes = self.store.list_prefixes().await?;
        let mut subnets = self.store.list_subnets().await?;
        let mut ips = self.store.list_ips().await?;

        println!("PREFIXES: {}", prefixes.len());
        println!("{}", "-".repeat(50));
        for prefix in &prefixes {
            println!("  {}", prefix.prefix);
        }

        subnets.sort_by_key(|s| s.subnet.to_string());
        println!("\nSUBNETS: {}", subnets.len());
        println!("{}", "-".repeat(50));
        for subnet in &subnets {
            let linked = if subnet.parent_id.is_some() {
                " (linked)"
            } else {
                ""
            };
            println!("  {:<20} {}{}", subnet.subnet.to_string(), subnet.role, linked);
        }

        ips.sort_by_key(|ip| ip.address);
        println!("\nIP ADDRESSES: {}", ips.len());
        println!("{}", "-".repeat(50));
        for ip in ips.iter().take(10) {
            println!("  {}", ip.address);
        }
        if ips.len() > 10 {
            println!("  ... and {} more", ips.len() - 10);
        }
        Ok(())
    }
}

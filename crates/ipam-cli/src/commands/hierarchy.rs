//! Hierarchy command

use anyhow::Result;
use std::sync::Arc;

use ipam_store::IpamStore;

/// Hierarchy command implementation
pub struct HierarchyCommand {
    store: Arc<dyn IpamStore>,
}

impl HierarchyCommand {
    pub fn new(store: Arc<dyn IpamStore>) -> Self {
        Self { store }
    }

    /// Full setup: roles, then parent/child links, then IP relinking.
    pub async fn setup(&self) -> Result<()> {
        self.types().await?;
        self.subnets().await?;
        self.ips().await?;
        println!("Hierarchy setup complete");
        Ok(())
    }

    /// Correct subnet roles from their prefix lengths.
    pub async fn types(&self) -> Result<()> {
        let summary = ipam_store::apply_roles(self.store.as_ref()).await?;
        println!(
            "Roles: {} parents, {} children, {} updated",
            summary.parents, summary.children, summary.updated
        );
        Ok(())
    }

    /// Attach child subnets to their enclosing parents.
    pub async fn subnets(&self) -> Result<()> {
        let summary = ipam_store::apply_links(self.store.as_ref()).await?;
        println!(
            "Links: {} parents relinked, {} children attached",
            summary.parents_linked, summary.children_linked
        );
        Ok(())
    }

    /// Point every IP at its most specific subnet.
    pub async fn ips(&self) -> Result<()> {
        let summary = ipam_store::apply_ip_links(self.store.as_ref()).await?;
        println!(
            "IPs: {} relinked, {} already correct, {} unresolved",
            summary.updated, summary.already_correct, summary.unresolved
        );
        Ok(())
    }

    /// Clear every parent link.
    pub async fn reset(&self) -> Result<()> {
        let cleared = ipam_store::clear_hierarchy(self.store.as_ref()).await?;
        println!("Cleared parent links on {} subnets", cleared);
        Ok(())
    }

    /// Hierarchy-focused status view.
    pub async fn status(&self) -> Result<()> {
        let report = ipam_store::status(self.store.as_ref()).await?;
        println!("Hierarchy status");
        println!("{}", "-".repeat(50));
        println!(
            "Parents:  {} total, {} with children",
            report.parents, report.parents_with_children
        );
        println!(
            "Children: {} total, {} linked to a parent",
            report.children, report.children_with_parent
        );
        println!(
            "IPs:      {} total, {} linked",
            report.ips_total, report.ips_linked
        );
        Ok(())
    }
}

//! In-memory store
//!
//! Backs the reconcile tests and doubles as a dry-run target. Same
//! get-or-create semantics as the GraphQL driver.

use anyhow::Result;
use async_trait::async_trait;
use ipnet::Ipv4Net;
use std::net::Ipv4Addr;
use std::sync::Mutex;

use ipam_core::{IpRecord, PrefixRecord, SubnetRecord, SubnetRole};

use crate::store::{IpamStore, StoreError};

#[derive(Default)]
struct Inner {
    prefixes: Vec<PrefixRecord>,
    subnets: Vec<SubnetRecord>,
    ips: Vec<IpRecord>,
    next_id: u64,
}

impl Inner {
    fn make_id(&mut self, kind: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", kind, self.next_id)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl IpamStore for MemoryStore {
    async fn list_prefixes(&self) -> Result<Vec<PrefixRecord>> {
        Ok(self.lock().prefixes.clone())
    }

    async fn ensure_prefix(&self, prefix: Ipv4Net) -> Result<String> {
        let mut inner = self.lock();
        if let Some(existing) = inner.prefixes.iter().find(|p| p.prefix == prefix) {
            return Ok(existing.id.clone());
        }
        let id = inner.make_id("prefix");
        inner.prefixes.push(PrefixRecord {
            id: id.clone(),
            prefix,
        });
        Ok(id)
    }

    async fn list_subnets(&self) -> Result<Vec<SubnetRecord>> {
        Ok(self.lock().subnets.clone())
    }

    async fn ensure_subnet(&self, subnet: Ipv4Net, _prefix_id: &str) -> Result<String> {
        let mut inner = self.lock();
        if let Some(existing) = inner.subnets.iter().find(|s| s.subnet == subnet) {
            return Ok(existing.id.clone());
        }
        let id = inner.make_id("subnet");
        inner
            .subnets
            .push(SubnetRecord::new(id.clone(), subnet, SubnetRole::Parent));
        Ok(id)
    }

    async fn set_subnet_role(&self, subnet_id: &str, role: SubnetRole) -> Result<()> {
        let mut inner = self.lock();
        let subnet = inner
            .subnets
            .iter_mut()
            .find(|s| s.id == subnet_id)
            .ok_or_else(|| StoreError::NotFound {
                id: subnet_id.to_string(),
            })?;
        subnet.role = role;
        Ok(())
    }

    async fn set_child_subnets(&self, parent_id: &str, child_ids: &[String]) -> Result<()> {
        let mut inner = self.lock();
        if !inner.subnets.iter().any(|s| s.id == parent_id) {
            return Err(StoreError::NotFound {
                id: parent_id.to_string(),
            }
            .into());
        }

        // Replace semantics: listed children point at the parent, children
        // dropped from the list lose their link.
        for subnet in inner.subnets.iter_mut() {
            if child_ids.contains(&subnet.id) {
                subnet.parent_id = Some(parent_id.to_string());
            } else if subnet.parent_id.as_deref() == Some(parent_id) {
                subnet.parent_id = None;
            }
        }
        Ok(())
    }

    async fn clear_parent(&self, subnet_id: &str) -> Result<()> {
        let mut inner = self.lock();
        let subnet = inner
            .subnets
            .iter_mut()
            .find(|s| s.id == subnet_id)
            .ok_or_else(|| StoreError::NotFound {
                id: subnet_id.to_string(),
            })?;
        subnet.parent_id = None;
        Ok(())
    }

    async fn list_ips(&self) -> Result<Vec<IpRecord>> {
        Ok(self.lock().ips.clone())
    }

    async fn create_ip(
        &self,
        address: Ipv4Addr,
        _description: &str,
        subnet_id: &str,
    ) -> Result<bool> {
        let mut inner = self.lock();
        if inner.ips.iter().any(|ip| ip.address == address) {
            return Ok(false);
        }
        let id = inner.make_id("ip");
        inner.ips.push(IpRecord {
            id,
            address,
            subnet_id: Some(subnet_id.to_string()),
        });
        Ok(true)
    }

    async fn set_ip_subnet(&self, ip_id: &str, subnet_id: &str) -> Result<()> {
        let mut inner = self.lock();
        let ip = inner
            .ips
            .iter_mut()
            .find(|ip| ip.id == ip_id)
            .ok_or_else(|| StoreError::NotFound {
                id: ip_id.to_string(),
            })?;
        ip.subnet_id = Some(subnet_id.to_string());
        Ok(())
    }
}

//! Host discovery
//!
//! Ping sweep over a network's host range with a bounded worker pool, plus
//! reverse DNS for responders. Each probe is independent; failures are
//! silently treated as "not alive".

use ipnet::Ipv4Net;
use std::net::Ipv4Addr;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tokio::sync::Semaphore;

use ipam_core::{HostEntry, HostSource};

/// One ICMP probe via the system ping binary.
pub async fn ping_host(addr: Ipv4Addr) -> bool {
    let status = Command::new("ping")
        .args(["-c", "1", "-W", "1"])
        .arg(addr.to_string())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    matches!(status, Ok(status) if status.success())
}

async fn reverse_dns_dig(addr: Ipv4Addr) -> Option<String> {
    let output = Command::new("dig")
        .arg("-x")
        .arg(addr.to_string())
        .arg("+short")
        .output()
        .await
        .ok()?;
    if !output.status.success() {
        return None;
    }

    let text = String::from_utf8_lossy(&output.stdout);
    let name = text.lines().next()?.trim().trim_end_matches('.').to_string();
    (!name.is_empty() && name != addr.to_string()).then_some(name)
}

async fn reverse_dns_nslookup(addr: Ipv4Addr) -> Option<String> {
    let output = Command::new("nslookup")
        .arg(addr.to_string())
        .output()
        .await
        .ok()?;
    if !output.status.success() {
        return None;
    }

    let text = String::from_utf8_lossy(&output.stdout);
    for line in text.lines() {
        if let Some(start) = line.find("name = ") {
            let name = line[start + 7..].trim().trim_end_matches('.');
            if !name.is_empty() {
                return Some(name.to_string());
            }
        }
    }
    None
}

/// Reverse DNS lookup, dig first with nslookup as fallback.
pub async fn reverse_dns(addr: Ipv4Addr) -> Option<String> {
    match reverse_dns_dig(addr).await {
        Some(name) => Some(name),
        None => reverse_dns_nslookup(addr).await,
    }
}

/// Sweep a network's host range, at most `workers` probes in flight.
///
/// Responders come back as discovered host entries named by reverse DNS,
/// falling back to `device-{ip}`.
pub async fn scan_network(network: Ipv4Net, workers: usize) -> Vec<HostEntry> {
    let semaphore = Arc::new(Semaphore::new(workers.max(1)));
    let mut tasks = Vec::new();

    for addr in network.hosts() {
        let semaphore = semaphore.clone();
        tasks.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok()?;
            if !ping_host(addr).await {
                return None;
            }
            let name = reverse_dns(addr)
                .await
                .unwrap_or_else(|| format!("device-{}", addr));
            Some(HostEntry::new(addr, name, true, HostSource::Scan))
        }));
    }

    let mut hosts: Vec<HostEntry> = futures::future::join_all(tasks)
        .await
        .into_iter()
        .filter_map(|task| task.ok().flatten())
        .collect();
    hosts.sort_by_key(|h| h.address);
    hosts
}

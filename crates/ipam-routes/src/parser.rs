//! Route line extraction

use regex::Regex;
use std::collections::BTreeSet;
use std::path::Path;
use thiserror::Error;

use ipam_core::{is_loopback, parse_cidr, RouteTableData};
use ipnet::Ipv4Net;

use crate::vendor::Vendor;

#[derive(Debug, Error)]
pub enum RouteFileError {
    #[error("failed to read routing table {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// IOS "show ip route" line shapes: subnetted-summary lines, coded route
/// lines, and indented "is ..." continuation lines.
fn cisco_networks(text: &str) -> BTreeSet<Ipv4Net> {
    let patterns = [
        Regex::new(r"(\d+\.\d+\.\d+\.\d+/\d+)\s+is\s+(?:variably\s+)?subnetted").unwrap(),
        Regex::new(r"^[A-Z*+%#@]\s+(\d+\.\d+\.\d+\.\d+/\d+)").unwrap(),
        Regex::new(r"^\s+(\d+\.\d+\.\d+\.\d+/\d+)\s+is\s+").unwrap(),
    ];

    let mut networks = BTreeSet::new();
    for line in text.lines() {
        for pattern in &patterns {
            if let Some(caps) = pattern.captures(line) {
                match parse_cidr(&caps[1]) {
                    Ok(net) => {
                        networks.insert(net);
                    }
                    Err(err) => log::debug!("skipping route entry: {}", err),
                }
            }
        }
    }
    networks
}

/// JunOS "show route" lines start with the destination CIDR.
fn junos_networks(text: &str) -> BTreeSet<Ipv4Net> {
    let pattern = Regex::new(r"^(\d+\.\d+\.\d+\.\d+/\d+)\s+").unwrap();

    let mut networks = BTreeSet::new();
    for line in text.lines() {
        if let Some(caps) = pattern.captures(line.trim()) {
            match parse_cidr(&caps[1]) {
                Ok(net) => {
                    networks.insert(net);
                }
                Err(err) => log::debug!("skipping route entry: {}", err),
            }
        }
    }
    networks
}

/// Extract networks from a routing-table dump.
///
/// Loopback networks are dropped; /32 routes come back as host IPs instead
/// of subnets.
pub fn extract_routes(text: &str, vendor: Vendor) -> RouteTableData {
    let networks = match vendor {
        Vendor::Cisco => cisco_networks(text),
        Vendor::Junos => junos_networks(text),
        Vendor::Generic => {
            let mut union = cisco_networks(text);
            union.extend(junos_networks(text));
            union
        }
    };

    let mut data = RouteTableData::default();
    for net in networks {
        if is_loopback(net) {
            continue;
        }
        if net.prefix_len() == 32 {
            data.host_ips.insert(net.network());
        } else {
            data.subnets.insert(net);
        }
    }
    data
}

/// Read one routing-table file, auto-detecting its vendor.
pub fn load_routing_table(path: &Path) -> Result<(Vendor, RouteTableData), RouteFileError> {
    let text = std::fs::read_to_string(path).map_err(|source| RouteFileError::Read {
        path: path.display().to_string(),
        source,
    })?;

    let vendor = Vendor::detect(&text);
    let data = extract_routes(&text, vendor);
    log::info!(
        "{} ({}): {} subnets, {} host IPs",
        path.display(),
        vendor,
        data.subnets.len(),
        data.host_ips.len()
    );
    Ok((vendor, data))
}

/// Read and merge several routing-table files. Unreadable files are logged
/// and skipped so one bad path never kills a populate run.
pub fn load_routing_tables<P: AsRef<Path>>(paths: &[P]) -> RouteTableData {
    let mut merged = RouteTableData::default();
    for path in paths {
        match load_routing_table(path.as_ref()) {
            Ok((_, data)) => merged.merge(data),
            Err(err) => log::warn!("{}", err),
        }
    }
    merged
}

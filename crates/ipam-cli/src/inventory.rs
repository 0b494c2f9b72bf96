//! Device inventory loading

use serde::Deserialize;
use std::path::Path;

use ipam_core::{HostEntry, HostSource};

#[derive(Debug, Default, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    pub devices: Vec<Device>,
}

#[derive(Debug, Deserialize)]
pub struct Device {
    pub hostname: Option<String>,
    pub name: Option<String>,
    pub ip_address: Option<String>,
}

impl Device {
    fn display_name(&self) -> &str {
        self.hostname
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("unknown")
    }
}

/// Load the inventory file. A missing or unreadable file is a warning, not
/// an error: populate still runs on scan and routing-table input alone.
pub fn load_inventory(path: &Path) -> Inventory {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            log::warn!("inventory {} not loaded: {}", path.display(), err);
            return Inventory::default();
        }
    };

    match serde_json::from_str(&text) {
        Ok(inventory) => inventory,
        Err(err) => {
            log::warn!("inventory {} not parsed: {}", path.display(), err);
            Inventory::default()
        }
    }
}

/// Host entries for every device with a valid IPv4 management address.
/// Devices without one, or with junk in the field, are skipped.
pub fn inventory_hosts(inventory: &Inventory) -> Vec<HostEntry> {
    let mut hosts = Vec::new();
    for device in &inventory.devices {
        let Some(value) = device.ip_address.as_deref() else {
            continue;
        };
        match ipam_core::parse_ipv4(value) {
            Ok(address) => hosts.push(HostEntry::new(
                address,
                device.display_name(),
                false,
                HostSource::Inventory,
            )),
            Err(err) => log::warn!("skipping device {}: {}", device.display_name(), err),
        }
    }
    hosts
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_an_empty_inventory() {
        let inventory = load_inventory(Path::new("/nonexistent/inventory.json"));
        assert!(inventory.devices.is_empty());
    }

    #[test]
    fn devices_with_bad_or_missing_addresses_are_skipped() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"devices": [
                {{"hostname": "r1", "ip_address": "10.0.0.1"}},
                {{"name": "r2", "ip_address": "not-an-ip"}},
                {{"hostname": "r3"}}
            ]}}"#
        )
        .unwrap();

        let inventory = load_inventory(file.path());
        let hosts = inventory_hosts(&inventory);
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].device_name, "r1");
        assert_eq!(hosts[0].address, "10.0.0.1".parse::<std::net::Ipv4Addr>().unwrap());
    }
}

//! CIDR helpers shared by the hierarchy core and the ingestion paths

use ipnet::Ipv4Net;
use std::net::Ipv4Addr;

use crate::error::AddressError;

/// Parse an IPv4 address string from external input.
pub fn parse_ipv4(value: &str) -> Result<Ipv4Addr, AddressError> {
    value.parse().map_err(|_| AddressError::InvalidAddress {
        value: value.to_string(),
    })
}

/// Parse a CIDR string from external input, tolerating host bits
/// ("10.0.0.1/24" becomes "10.0.0.0/24").
pub fn parse_cidr(value: &str) -> Result<Ipv4Net, AddressError> {
    let net: Ipv4Net = value.parse().map_err(|_| AddressError::InvalidCidr {
        value: value.to_string(),
    })?;
    Ok(net.trunc())
}

/// The /24 network an address falls into.
pub fn parent_network_24(addr: Ipv4Addr) -> Ipv4Net {
    Ipv4Net::new(addr, 24).unwrap().trunc()
}

/// Top-level prefix for a subnet: /8 for 10.x networks, /16 otherwise.
pub fn prefix_for(net: Ipv4Net) -> Ipv4Net {
    let len = if net.network().octets()[0] == 10 { 8 } else { 16 };
    Ipv4Net::new(net.network(), len).unwrap().trunc()
}

/// Whether a network lives inside 127.0.0.0/8.
pub fn is_loopback(net: Ipv4Net) -> bool {
    net.network().octets()[0] == 127
}

/// Strict CIDR containment: `child` is inside `parent` and not equal to it.
pub fn strict_subnet_of(child: Ipv4Net, parent: Ipv4Net) -> bool {
    parent.contains(&child) && child.trunc() != parent.trunc()
}

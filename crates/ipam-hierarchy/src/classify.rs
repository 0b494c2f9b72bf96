//! Subnet role classification

use ipam_core::SubnetRole;
use ipnet::Ipv4Net;

/// Role for a subnet, derived from its prefix length alone: /29 and /30 are
/// children carved out of a larger network, everything else is a parent.
pub fn role_for(net: Ipv4Net) -> SubnetRole {
    match net.prefix_len() {
        29 | 30 => SubnetRole::Child,
        _ => SubnetRole::Parent,
    }
}

//! Vendor detection for routing-table dumps

/// Routing-table dialect. `Generic` applies every known pattern set and
/// unions the results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vendor {
    Cisco,
    Junos,
    Generic,
}

impl Vendor {
    /// Detect the dialect from the dump itself: IOS sessions echo
    /// "show ip route", JunOS sessions echo "show route". Anything else
    /// falls back to trying both.
    pub fn detect(text: &str) -> Vendor {
        let lowered = text.to_lowercase();
        if lowered.contains("show ip route") {
            Vendor::Cisco
        } else if lowered.contains("show route") {
            Vendor::Junos
        } else {
            Vendor::Generic
        }
    }
}

impl std::fmt::Display for Vendor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Vendor::Cisco => write!(f, "cisco"),
            Vendor::Junos => write!(f, "junos"),
            Vendor::Generic => write!(f, "generic"),
        }
    }
}

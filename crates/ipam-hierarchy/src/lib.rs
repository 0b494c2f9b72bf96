//! Subnet hierarchy core
//!
//! Pure transforms from observed network facts to subnet hierarchy: child
//! subnet detection, role classification, parent/child linking, longest
//! prefix resolution and reconciliation planning. No I/O happens here; the
//! store crate applies the plans.

pub mod analyze;
pub mod classify;
pub mod detector;
pub mod linker;
pub mod plan;
pub mod resolver;

#[cfg(test)]
mod tests;

pub use analyze::{analyze, NetworkStructure};
pub use classify::role_for;
pub use detector::detect_child_subnets;
pub use linker::{link_children, ParentChildEdge};
pub use plan::{
    plan_ip_links, plan_links, plan_populate, plan_roles, IpLink, IpLinkPlan, LinkChildren,
    PopulatePlan, RoleChange, SubnetPlacement,
};
pub use resolver::{most_specific, most_specific_net};

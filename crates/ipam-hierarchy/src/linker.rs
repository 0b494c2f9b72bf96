//! Parent/child subnet linking
//!
//! Every child-role subnet (/29, /30) is attached to the first subnet that
//! strictly contains it. Candidate parents are walked in lexicographic order
//! of their CIDR string, so overlapping parents from different sources
//! resolve the same way on every run.

use ipam_core::{strict_subnet_of, SubnetRole};
use ipnet::Ipv4Net;

use crate::classify::role_for;

/// One parent subnet and the children carved out of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentChildEdge {
    pub parent: Ipv4Net,
    pub children: Vec<Ipv4Net>,
}

/// Build parent-child edges for a subnet set.
///
/// Output is grouped parent-side (the store links children from the parent
/// record) and fully ordered: parents lexicographically, children
/// lexicographically within each parent.
pub fn link_children(subnets: &[Ipv4Net]) -> Vec<ParentChildEdge> {
    let mut ordered: Vec<Ipv4Net> = subnets.iter().map(|n| n.trunc()).collect();
    ordered.sort_by_key(|n| n.to_string());
    ordered.dedup();

    let mut edges: Vec<ParentChildEdge> = Vec::new();

    for &child in &ordered {
        if role_for(child) != SubnetRole::Child {
            continue;
        }

        let parent = ordered
            .iter()
            .copied()
            .find(|&candidate| strict_subnet_of(child, candidate));

        let Some(parent) = parent else {
            log::debug!("no containing parent for child subnet {}", child);
            continue;
        };

        match edges.iter_mut().find(|e| e.parent == parent) {
            Some(edge) => edge.children.push(child),
            None => edges.push(ParentChildEdge {
                parent,
                children: vec![child],
            }),
        }
    }

    edges.sort_by_key(|e| e.parent.to_string());
    edges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nets(list: &[&str]) -> Vec<Ipv4Net> {
        list.iter().map(|s| s.parse().unwrap()).collect()
    }

    #[test]
    fn children_attach_to_their_containing_24() {
        let edges = link_children(&nets(&["10.0.0.0/24", "10.0.0.0/30", "10.0.0.8/29"]));
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].parent, "10.0.0.0/24".parse::<Ipv4Net>().unwrap());
        assert_eq!(
            edges[0].children,
            nets(&["10.0.0.0/30", "10.0.0.8/29"])
        );
    }

    #[test]
    fn parents_without_children_produce_no_edges() {
        assert!(link_children(&nets(&["10.0.0.0/24", "10.0.1.0/24"])).is_empty());
    }

    #[test]
    fn orphan_children_are_skipped() {
        assert!(link_children(&nets(&["10.0.0.0/30", "10.9.0.0/24"])).is_empty());
    }

    #[test]
    fn overlapping_parents_resolve_lexicographically() {
        // Both the /16 and the /24 contain the child; "10.0.0.0/16" sorts
        // before "10.0.0.0/24" so the /16 wins the tie.
        let edges = link_children(&nets(&["10.0.0.0/24", "10.0.0.0/16", "10.0.0.4/30"]));
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].parent, "10.0.0.0/16".parse::<Ipv4Net>().unwrap());
    }

    #[test]
    fn linking_is_idempotent() {
        let set = nets(&["10.0.0.0/24", "10.0.0.0/30", "10.0.0.8/29", "10.0.1.0/24"]);
        assert_eq!(link_children(&set), link_children(&set));
    }
}

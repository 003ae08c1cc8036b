//! Effective relations: parents and children seen through coordination
//! and apposition.
//!
//! In "John and Mary bought and sold it", the coordination nodes stand in
//! for their members. The effective children of a node skip coap roots and
//! yield their members instead; members also share the non-member children
//! of the coap roots above them. Annotation is often incomplete, so every
//! dead end logs a warning and falls back to the topological relation.
//!
//! Layers without [`EffectiveRelations`](crate::layer::EffectiveRelations)
//! have no coap roots and no members, so the queries reduce to plain
//! children and parents there.

use std::collections::VecDeque;

use tracing::warn;

use crate::document::{Document, NodeId};
use crate::node::NodeFilter;

impl Document {
    pub fn is_coap_root(&self, node: NodeId) -> bool {
        self.get(node).map_or(false, |entry| entry.kind.is_coap_root())
    }

    pub fn is_member(&self, node: NodeId) -> bool {
        self.get(node).map_or(false, |entry| entry.kind.is_member())
    }

    /// Members of the coordination headed by `node`, nested coordinations
    /// flattened. A node that is not a coap root is its own only member.
    pub fn get_coap_members(&self, node: NodeId) -> Vec<NodeId> {
        if !self.is_coap_root(node) {
            return vec![node];
        }
        let mut queue: VecDeque<NodeId> = self.member_children(node).collect();
        let mut members = Vec::new();
        while let Some(current) = queue.pop_front() {
            if self.is_coap_root(current) {
                queue.extend(self.member_children(current));
            } else {
                members.push(current);
            }
        }
        members
    }

    fn member_children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(node, NodeFilter::new())
            .into_iter()
            .filter(move |child| self.is_member(*child))
    }

    /// Effective children of `node`.
    ///
    /// On a coap root this falls back to topological children, with a
    /// warning unless `or_topological` says the caller expects that.
    pub fn get_echildren(&self, node: NodeId, or_topological: bool, filter: NodeFilter) -> Vec<NodeId> {
        if !self.can_apply_effective(node, or_topological, "get_echildren") {
            return self.children(node, filter);
        }
        let mut echildren = self.own_echildren(node);
        echildren.extend(self.shared_echildren(node));
        self.process_switches(node, echildren, filter)
    }

    /// Effective parents of `node`.
    ///
    /// A coap root gets its topological parent. A root has no parents.
    pub fn get_eparents(&self, node: NodeId, or_topological: bool, filter: NodeFilter) -> Vec<NodeId> {
        let Some(parent) = self.parent(node) else {
            warn!(node = %self.describe(node), "cannot find effective parents of a root");
            return Vec::new();
        };
        if !self.can_apply_effective(node, or_topological, "get_eparents") {
            return vec![parent];
        }
        let eparents = self.find_eparents(node, parent);
        self.process_switches(node, eparents, filter)
    }

    fn can_apply_effective(&self, node: NodeId, or_topological: bool, caller: &str) -> bool {
        if !self.is_coap_root(node) {
            return true;
        }
        if !or_topological {
            warn!(node = %self.describe(node), %caller, "called on coap root, falling back to topological");
        }
        false
    }

    /// Children of which this node is the only effective parent.
    fn own_echildren(&self, node: NodeId) -> Vec<NodeId> {
        self.children(node, NodeFilter::new())
            .into_iter()
            .flat_map(|child| self.get_coap_members(child))
            .collect()
    }

    /// Children this node shares with its co-members, up the chain of coap
    /// roots it is a member of.
    fn shared_echildren(&self, node: NodeId) -> Vec<NodeId> {
        let mut echildren = Vec::new();
        let mut coap_root = self.direct_coap_root(node);
        while let Some(current) = coap_root {
            for child in self.children(current, NodeFilter::new()) {
                if !self.is_member(child) {
                    echildren.extend(self.get_coap_members(child));
                }
            }
            coap_root = self.direct_coap_root(current);
        }
        echildren
    }

    fn direct_coap_root(&self, node: NodeId) -> Option<NodeId> {
        if self.is_member(node) {
            self.parent(node)
        } else {
            None
        }
    }

    /// Top of the chain of coap roots `node` is a (nested) member of.
    fn transitive_coap_root(&self, node: NodeId) -> Option<NodeId> {
        let mut root = self.direct_coap_root(node)?;
        while self.is_member(root) {
            root = self.direct_coap_root(root)?;
        }
        Some(root)
    }

    fn find_eparents(&self, node: NodeId, parent: NodeId) -> Vec<NodeId> {
        let start = self.transitive_coap_root(node).unwrap_or(node);
        let Some(above) = self.parent(start) else {
            return vec![self.fallback_parent(node, parent)];
        };
        if !self.is_coap_root(above) {
            return vec![above];
        }
        let members = self.get_coap_members(above);
        if members.is_empty() {
            return vec![self.fallback_parent(node, parent)];
        }
        members
    }

    fn fallback_parent(&self, node: NodeId, parent: NodeId) -> NodeId {
        warn!(node = %self.describe(node), "no effective parent, using topological");
        parent
    }
}

//! Clause roots.

use tracing::warn;

use crate::document::{Document, NodeId};
use crate::node::NodeFilter;

impl Document {
    pub fn clause_number(&self, node: NodeId) -> Option<i64> {
        self.get(node).and_then(|entry| entry.kind.clause_number())
    }

    /// Topmost node of the clause `node` belongs to.
    ///
    /// Climbs while the parent has the same `clause_number`. When the climb
    /// stops under a coordination and the reached node is not one of its
    /// members, the clause is shared by the coordination, so the first
    /// member with the same clause number is returned instead. Without a
    /// clause number the node is its own clause root.
    pub fn get_clause_root(&self, node: NodeId) -> NodeId {
        let Some(number) = self.clause_number(node) else {
            warn!(node = %self.describe(node), "clause number undefined");
            return node;
        };
        let mut highest = node;
        let mut parent = self.parent(node);
        while let Some(current) = parent {
            if self.clause_number(current) != Some(number) {
                break;
            }
            highest = current;
            parent = self.parent(current);
        }

        if let Some(parent) = parent {
            if self.is_coap_root(parent) && !self.is_member(highest) {
                let shared = self
                    .children(parent, NodeFilter::new())
                    .into_iter()
                    .find(|child| self.is_member(*child) && self.clause_number(*child) == Some(number));
                if let Some(member) = shared {
                    return member;
                }
            }
        }
        highest
    }
}

//! Linear order of ordered trees (`ord`), and moving nodes within it.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::document::{Document, NodeId};
use crate::error::{TreeError, TreeResult};
use crate::node::NodeFilter;

/// Whether a shift moves the node alone or together with its subtree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShiftMode {
    #[default]
    WithSubtree,
    NodeOnly,
}

impl Document {
    /// Order key of a node, if it is ordered and the key is set.
    pub fn ord(&self, node: NodeId) -> Option<i64> {
        self.get(node).and_then(|entry| entry.kind.ord())
    }

    /// Set the order key directly, without renumbering anything.
    pub fn set_ord(&mut self, node: NodeId, ord: i64) -> TreeResult<()> {
        let id = self.describe(node);
        let ordered = self
            .kind_mut(node)?
            .ordered_mut()
            .ok_or(TreeError::NotOrdered(id))?;
        ordered.set_ord(ord);
        Ok(())
    }

    /// Compare two nodes by `ord`. `None` unless both have one.
    pub fn cmp_order(&self, a: NodeId, b: NodeId) -> Option<Ordering> {
        Some(self.ord(a)?.cmp(&self.ord(b)?))
    }

    pub(crate) fn max_ord(&self, root: NodeId) -> Option<i64> {
        self.descendants(root, NodeFilter::new().add_self())
            .into_iter()
            .filter_map(|node| self.ord(node))
            .max()
    }

    pub fn shift_before_node(&mut self, node: NodeId, target: NodeId, mode: ShiftMode) -> TreeResult<()> {
        self.shift_to_node(node, target, false, mode)
    }

    pub fn shift_after_node(&mut self, node: NodeId, target: NodeId, mode: ShiftMode) -> TreeResult<()> {
        self.shift_to_node(node, target, true, mode)
    }

    /// Move `node` right before the first node of `target`'s subtree.
    pub fn shift_before_subtree(&mut self, node: NodeId, target: NodeId, mode: ShiftMode) -> TreeResult<()> {
        let span = self.subtree_span(node, target, mode);
        match span.first() {
            Some(first) => self.shift_to_node(node, *first, false, mode),
            None => Ok(()),
        }
    }

    /// Move `node` right after the last node of `target`'s subtree.
    pub fn shift_after_subtree(&mut self, node: NodeId, target: NodeId, mode: ShiftMode) -> TreeResult<()> {
        let span = self.subtree_span(node, target, mode);
        match span.last() {
            Some(last) => self.shift_to_node(node, *last, true, mode),
            None => Ok(()),
        }
    }

    /// Ordered subtree of `target`, without the part that is being moved.
    fn subtree_span(&self, node: NodeId, target: NodeId, mode: ShiftMode) -> Vec<NodeId> {
        match mode {
            ShiftMode::NodeOnly => self
                .descendants(target, NodeFilter::new().add_self().ordered())
                .into_iter()
                .filter(|other| *other != node)
                .collect(),
            ShiftMode::WithSubtree => self.descendants(
                target,
                NodeFilter::new().add_self().ordered().except_subtree(node),
            ),
        }
    }

    /// Renumber the whole tree so that the moved nodes sit right before or
    /// after `target`, every other node keeping its relative position.
    fn shift_to_node(&mut self, node: NodeId, target: NodeId, after: bool, mode: ShiftMode) -> TreeResult<()> {
        if node == target {
            return Ok(());
        }
        for checked in [node, target] {
            if self.ord(checked).is_none() {
                return Err(TreeError::NotOrdered(self.describe(checked)));
            }
        }
        let root = self.root(node);
        if self.root(target) != root {
            return Err(TreeError::DifferentTrees {
                node: self.describe(node),
                target: self.describe(target),
            });
        }
        if mode == ShiftMode::WithSubtree && self.is_descendant_of(target, node) {
            return Err(TreeError::ShiftIntoSubtree {
                node: self.describe(node),
                target: self.describe(target),
            });
        }

        let all_nodes = self.descendants(root, NodeFilter::new().add_self().ordered());
        let to_move = match mode {
            ShiftMode::NodeOnly => vec![node],
            ShiftMode::WithSubtree => self.descendants(node, NodeFilter::new().add_self().ordered()),
        };
        let moving: HashSet<NodeId> = to_move.iter().copied().collect();

        let mut cur_ord = 0;
        for current in all_nodes {
            if moving.contains(&current) {
                continue;
            }
            if after {
                self.set_ord(current, cur_ord)?;
                cur_ord += 1;
            }
            if current == target {
                for moved in &to_move {
                    self.set_ord(*moved, cur_ord)?;
                    cur_ord += 1;
                }
            }
            if !after {
                self.set_ord(current, cur_ord)?;
                cur_ord += 1;
            }
        }
        Ok(())
    }

    /// Following node in the tree order. The root is never returned.
    pub fn next_node(&self, node: NodeId) -> Option<NodeId> {
        let me = self.ord(node)?;
        self.descendants(self.root(node), NodeFilter::new())
            .into_iter()
            .filter_map(|other| self.ord(other).map(|ord| (ord, other)))
            .filter(|(ord, _)| *ord > me)
            .min_by_key(|(ord, _)| *ord)
            .map(|(_, other)| other)
    }

    /// Preceding node in the tree order. The root is never returned.
    pub fn prev_node(&self, node: NodeId) -> Option<NodeId> {
        let me = self.ord(node)?;
        self.descendants(self.root(node), NodeFilter::new())
            .into_iter()
            .filter_map(|other| self.ord(other).map(|ord| (ord, other)))
            .filter(|(ord, _)| *ord < me)
            .max_by_key(|(ord, _)| *ord)
            .map(|(_, other)| other)
    }

    pub fn is_first_node(&self, node: NodeId) -> bool {
        self.prev_node(node).is_none()
    }

    pub fn is_last_node(&self, node: NodeId) -> bool {
        self.next_node(node).is_none()
    }

    /// Whether the node follows its parent. `None` for roots and unordered nodes.
    pub fn is_right_child(&self, node: NodeId) -> Option<bool> {
        let parent = self.parent(node)?;
        Some(self.ord(parent)? < self.ord(node)?)
    }

    /// Renumber an ordered tree to `0..n-1`, keeping the current order.
    pub fn renumber(&mut self, root: NodeId) -> TreeResult<()> {
        let nodes = self.descendants(root, NodeFilter::new().add_self().ordered());
        for (new_ord, node) in nodes.into_iter().enumerate() {
            self.set_ord(node, new_ord as i64)?;
        }
        Ok(())
    }
}

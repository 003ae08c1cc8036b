//! The Node API: creating, relinking, querying and removing nodes, and
//! name-based attribute access with reference tracking.
//!
//! Everything here is a method on [`Document`], which owns the arena, the
//! id index and the backindex; node handles are plain [`NodeId`]s.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, warn};

use crate::attr::{insert_path, lookup_path, split_path, Alignment, AttrField, AttrMap, AttrValue};
use crate::backref::ALIGNMENT;
use crate::document::{Document, NodeEntry, NodeId};
use crate::error::{TreeError, TreeResult};
use crate::layer::{Layer, NodeKind};

/// Which side of the reference node to keep in a [`NodeFilter`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Position {
    #[default]
    Any,
    /// Only nodes ordered before the reference node.
    Preceding,
    /// Only nodes ordered after the reference node.
    Following,
}

/// Options for children/descendant queries.
///
/// ```ignore
/// let left = doc.children(verb, NodeFilter::new().preceding());
/// let words = doc.descendants(root, NodeFilter::new().ordered());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeFilter {
    pub add_self: bool,
    pub ordered: bool,
    pub position: Position,
    /// Skip this node and everything below it (descendant queries only).
    pub except_subtree: Option<NodeId>,
}

impl NodeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_self(mut self) -> Self {
        self.add_self = true;
        self
    }

    pub fn ordered(mut self) -> Self {
        self.ordered = true;
        self
    }

    /// Keep only nodes preceding the reference node; implies `ordered`.
    pub fn preceding(mut self) -> Self {
        self.position = Position::Preceding;
        self
    }

    /// Keep only nodes following the reference node; implies `ordered`.
    pub fn following(mut self) -> Self {
        self.position = Position::Following;
        self
    }

    pub fn except_subtree(mut self, node: NodeId) -> Self {
        self.except_subtree = Some(node);
        self
    }
}

impl Document {
    // ------------------------------------------------------------------
    // Creation and structure
    // ------------------------------------------------------------------

    /// Create an empty node as the last child of `parent`.
    ///
    /// The id is generated unless given. The node has the parent's layer.
    pub fn create_child(&mut self, parent: NodeId, id: Option<&str>) -> TreeResult<NodeId> {
        self.create_child_with(parent, id, &AttrMap::new())
    }

    /// Create a node from loader data as the last child of `parent`.
    ///
    /// Declared attributes are coerced to their types, undeclared keys are
    /// ignored. `alignment` and `wild` are taken as well, and `id` is used
    /// when no explicit id is given. An ordered node without `ord` is placed
    /// after every node of its tree.
    pub fn create_child_with(
        &mut self,
        parent: NodeId,
        id: Option<&str>,
        data: &AttrMap,
    ) -> TreeResult<NodeId> {
        let (layer, zone) = {
            let entry = self.entry(parent)?;
            (entry.layer(), entry.zone.clone())
        };
        let id = match id.or_else(|| data.get("id").and_then(AttrValue::as_str)) {
            Some(id) => id.to_string(),
            None => self.generate_id(layer, &zone),
        };
        if self.node_by_id(&id).is_some() {
            return Err(TreeError::DuplicateId(id));
        }

        let mut kind = NodeKind::from_data(layer, data)?;
        if kind.ordered().is_some() && kind.ord().is_none() {
            let next = self.max_ord(self.root(parent)).map_or(0, |ord| ord + 1);
            if let Some(ordered) = kind.ordered_mut() {
                ordered.set_ord(next);
            }
        }
        let entry = NodeEntry {
            id,
            parent: Some(parent),
            children: Vec::new(),
            zone,
            alignment: Vec::<Alignment>::from_attr(ALIGNMENT, data.get(ALIGNMENT).cloned())?,
            wild: AttrMap::from_attr("wild", data.get("wild").cloned())?,
            kind,
        };
        let node = self.insert_node(entry)?;
        self.entry_mut(parent)?.children.push(node);

        if layer == Layer::Amr {
            self.amr_attached(node)?;
        }
        Ok(node)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.get(node).and_then(NodeEntry::parent)
    }

    /// Hang `node` (with its subtree) under `parent`, as its last child.
    ///
    /// Fails if `parent` is `node` or one of its descendants, or belongs to
    /// another document. A tree root that gets a parent stops being the
    /// root of its zone's tree.
    pub fn set_parent(&mut self, node: NodeId, parent: NodeId) -> TreeResult<()> {
        if !self.owns(node) || !self.owns(parent) {
            return Err(TreeError::CrossDocument {
                node: self.describe(node),
            });
        }
        self.entry(node)?;
        let new_zone = self.entry(parent)?.zone.clone();
        if parent == node || self.is_descendant_of(parent, node) {
            return Err(TreeError::Cycle {
                node: self.describe(node),
                parent: self.describe(parent),
            });
        }

        let old_root = self.root(node);
        let new_root = self.root(parent);
        let crosses_roots = old_root != new_root;
        let is_amr = self[node].layer() == Layer::Amr;
        if is_amr && crosses_roots && old_root != node {
            self.amr_free_subtree(old_root, node)?;
        }

        // a subtree joining another ordered tree goes after its last node
        let next_ord = (crosses_roots && self[node].kind.ordered().is_some())
            .then(|| self.max_ord(new_root).map_or(0, |ord| ord + 1));

        let old_parent = self[node].parent;
        match old_parent {
            Some(old_parent) => {
                self.entry_mut(old_parent)?.children.retain(|child| *child != node);
            }
            None => {
                let (zone, layer) = (self[node].zone.clone(), self[node].layer());
                if self.zone(&zone).and_then(|z| z.tree(layer)) == Some(node) {
                    self.forget_tree(&zone, layer);
                }
            }
        }
        self.entry_mut(node)?.parent = Some(parent);
        self.entry_mut(parent)?.children.push(node);

        if crosses_roots {
            for moved in self.descendants(node, NodeFilter::new().add_self()) {
                self.entry_mut(moved)?.zone = new_zone.clone();
            }
            if let Some(next_ord) = next_ord {
                let moved = self.descendants(node, NodeFilter::new().add_self().ordered());
                for (ord, moved) in (next_ord..).zip(moved) {
                    self.set_ord(moved, ord)?;
                }
            }
            if is_amr {
                self.amr_reassign_subtree(node)?;
            }
        }
        Ok(())
    }

    /// Root of the tree containing `node`. A stale handle is its own root.
    pub fn root(&self, node: NodeId) -> NodeId {
        let mut current = node;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    pub fn is_root(&self, node: NodeId) -> bool {
        self.get(node).map_or(false, NodeEntry::is_root)
    }

    /// Distance to the root.
    pub fn depth(&self, node: NodeId) -> usize {
        let mut depth = 0;
        let mut current = node;
        while let Some(parent) = self.parent(current) {
            current = parent;
            depth += 1;
        }
        depth
    }

    pub fn is_descendant_of(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = self.parent(node);
        while let Some(candidate) = current {
            if candidate == ancestor {
                return true;
            }
            current = self.parent(candidate);
        }
        false
    }

    // ------------------------------------------------------------------
    // Children and descendants
    // ------------------------------------------------------------------

    pub fn children(&self, node: NodeId, filter: NodeFilter) -> Vec<NodeId> {
        let nodes = self
            .get(node)
            .map(|entry| entry.children.clone())
            .unwrap_or_default();
        self.process_switches(node, nodes, filter)
    }

    /// All nodes below `node`, in depth-first order unless `ordered`.
    pub fn descendants(&self, node: NodeId, filter: NodeFilter) -> Vec<NodeId> {
        if filter.except_subtree == Some(node) || !self.contains(node) {
            return Vec::new();
        }
        let mut nodes = Vec::new();
        let mut stack: Vec<NodeId> = self[node].children.iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            if filter.except_subtree == Some(current) {
                continue;
            }
            nodes.push(current);
            if let Some(entry) = self.get(current) {
                stack.extend(entry.children.iter().rev().copied());
            }
        }
        self.process_switches(node, nodes, filter)
    }

    /// Apply `add_self`, position and ordering switches to a node list.
    pub(crate) fn process_switches(
        &self,
        node: NodeId,
        mut nodes: Vec<NodeId>,
        filter: NodeFilter,
    ) -> Vec<NodeId> {
        if filter.add_self {
            nodes.push(node);
        }
        let me = self.get(node).and_then(|entry| entry.kind.ord());
        match filter.position {
            Position::Any => {}
            Position::Preceding => nodes.retain(|other| {
                matches!((self.ord(*other), me), (Some(a), Some(b)) if a < b)
            }),
            Position::Following => nodes.retain(|other| {
                matches!((self.ord(*other), me), (Some(a), Some(b)) if a > b)
            }),
        }
        if filter.ordered || filter.position != Position::Any {
            nodes.sort_by_key(|other| self.ord(*other));
        }
        nodes
    }

    // ------------------------------------------------------------------
    // Removal
    // ------------------------------------------------------------------

    /// Remove `node` and its whole subtree from the document.
    ///
    /// Children go first. Outgoing references of the removed nodes leave the
    /// backindex; references from surviving nodes to removed ones are left
    /// to the caller and reported with a warning. An ordered tree is
    /// renumbered to `0..n-1` afterwards (see
    /// [`DocumentConfig::renumber_on_remove`](crate::DocumentConfig)).
    pub fn remove(&mut self, node: NodeId) -> TreeResult<()> {
        let (layer, zone, parent) = {
            let entry = self.entry(node)?;
            (entry.layer(), entry.zone.clone(), entry.parent)
        };
        let tree_root = self.root(node);
        let mut subtree = self.descendants(node, NodeFilter::new());
        subtree.reverse();
        subtree.push(node);

        if layer == Layer::Amr && tree_root != node {
            self.amr_free_subtree(tree_root, node)?;
        }

        match parent {
            Some(parent) => self.entry_mut(parent)?.children.retain(|child| *child != node),
            None => {
                if self.zone(&zone).and_then(|z| z.tree(layer)) == Some(node) {
                    self.forget_tree(&zone, layer);
                }
            }
        }

        let mut removed_ids = HashSet::new();
        for removed in subtree {
            let entry = self.take_node(removed)?;
            removed_ids.insert(entry.id);
        }
        debug!(node = ?node, count = removed_ids.len(), "removed subtree");

        if self.config.warn_on_referenced_removal {
            let mut ids: Vec<&String> = removed_ids.iter().collect();
            ids.sort();
            for id in ids {
                for (attr, source) in self.backrefs.incoming(id) {
                    if !removed_ids.contains(&source) {
                        warn!(node = %id, %attr, referenced_by = %source, "removed node is still referenced");
                    }
                }
            }
        }

        if parent.is_some() && self.config.renumber_on_remove && self[tree_root].kind.ordered().is_some()
        {
            self.renumber(tree_root)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    /// Value of an attribute, with `/` descending into map attributes
    /// (`gram/negation`, `a/lex.rf`, `wild/comment`).
    ///
    /// Returns `None` for unknown attributes, for unset values, and for
    /// paths that run into a value that is not a map.
    pub fn get_attr(&self, node: NodeId, name: &str) -> Option<AttrValue> {
        let entry = self.get(node)?;
        let (head, path) = split_path(name);
        let value = match head {
            ALIGNMENT => entry.alignment.to_attr(),
            "wild" => Some(AttrValue::Map(entry.wild.clone())),
            "id" => Some(AttrValue::Str(entry.id.clone())),
            _ => entry.kind.get_attr(head),
        }?;
        if path.is_empty() {
            Some(value)
        } else {
            lookup_path(&value, &path).cloned()
        }
    }

    /// String value of an attribute, if it holds one.
    pub fn get_str(&self, node: NodeId, name: &str) -> Option<String> {
        match self.get_attr(node, name)? {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Set an attribute (or a `/` path into a map attribute).
    ///
    /// Writes to reference attributes update the backindex in the same call.
    pub fn set_attr(
        &mut self,
        node: NodeId,
        name: &str,
        value: impl Into<AttrValue>,
    ) -> TreeResult<()> {
        self.write_attr(node, name, Some(value.into()))
    }

    /// Unset an attribute: `None` for scalars, empty for lists and maps,
    /// key removal for paths.
    pub fn clear_attr(&mut self, node: NodeId, name: &str) -> TreeResult<()> {
        self.write_attr(node, name, None)
    }

    fn write_attr(&mut self, node: NodeId, name: &str, value: Option<AttrValue>) -> TreeResult<()> {
        let (head, path) = split_path(name);
        let entry = self.entry(node)?;
        let source = entry.id.clone();

        match head {
            ALIGNMENT => {
                if !path.is_empty() {
                    return Err(TreeError::UnknownAttr {
                        layer: entry.layer(),
                        attr: name.to_string(),
                    });
                }
                let links = Vec::<Alignment>::from_attr(ALIGNMENT, value)?;
                let old: Vec<String> = entry.alignment.iter().map(|l| l.counterpart.clone()).collect();
                let new: Vec<String> = links.iter().map(|l| l.counterpart.clone()).collect();
                self.backrefs.remove(ALIGNMENT, &source, &old);
                self.backrefs.index(ALIGNMENT, &source, &new);
                self.entry_mut(node)?.alignment = links;
            }
            "wild" => {
                let entry = self.entry_mut(node)?;
                if path.is_empty() {
                    entry.wild = AttrMap::from_attr("wild", value)?;
                } else {
                    insert_path(&mut entry.wild, &path, value);
                }
            }
            _ => {
                if !entry.kind.attr_names().iter().any(|(declared, _)| *declared == head) {
                    return Err(TreeError::UnknownAttr {
                        layer: entry.layer(),
                        attr: name.to_string(),
                    });
                }
                let affected: Vec<&'static str> = entry
                    .kind
                    .ref_attrs()
                    .iter()
                    .copied()
                    .filter(|attr| is_same_or_nested(attr, name))
                    .collect();
                let old: Vec<Vec<String>> =
                    affected.iter().map(|attr| entry.ref_attr_ids(attr)).collect();

                let kind = &mut self.entry_mut(node)?.kind;
                if path.is_empty() {
                    kind.set_attr(head, value)?;
                } else {
                    let mut map = match kind.get_attr(head) {
                        Some(AttrValue::Map(map)) => map,
                        _ => AttrMap::new(),
                    };
                    insert_path(&mut map, &path, value);
                    kind.set_attr(head, Some(AttrValue::Map(map)))?;
                }

                let entry = self.entry(node)?;
                let new: Vec<Vec<String>> =
                    affected.iter().map(|attr| entry.ref_attr_ids(attr)).collect();
                for ((attr, old_ids), new_ids) in affected.iter().zip(old).zip(new) {
                    self.backrefs.remove(attr, &source, &old_ids);
                    self.backrefs.index(attr, &source, &new_ids);
                }
                if head == "varname" && self[node].layer() == Layer::Amr {
                    self.amr_varname_written(node)?;
                }
            }
        }
        Ok(())
    }

    /// Edit the typed payload of a node in place.
    ///
    /// Reference attributes changed by `edit` are re-indexed afterwards.
    pub fn update_kind<R>(&mut self, node: NodeId, edit: impl FnOnce(&mut NodeKind) -> R) -> TreeResult<R> {
        let entry = self.entry(node)?;
        let source = entry.id.clone();
        let before = entry.referenced_ids();
        let result = edit(self.kind_mut(node)?);
        let after = self.entry(node)?.referenced_ids();
        for (attr, old_ids) in &before {
            self.backrefs.remove(attr, &source, old_ids);
        }
        for (attr, new_ids) in &after {
            self.backrefs.index(attr, &source, new_ids);
        }
        Ok(result)
    }

    // ------------------------------------------------------------------
    // References
    // ------------------------------------------------------------------

    /// Nodes whose ids are stored in a reference attribute.
    ///
    /// Works for single ids and id lists alike; ids that are not indexed
    /// (yet, or any more) are skipped with a warning.
    pub fn get_deref_attr(&self, node: NodeId, name: &str) -> Vec<NodeId> {
        if name == ALIGNMENT {
            return self.aligned_nodes(node);
        }
        let ids = self
            .get_attr(node, name)
            .map(|value| value.referenced_ids())
            .unwrap_or_default();
        self.resolve_ids(node, name, &ids)
    }

    /// Store the id of `target` in a single-valued reference attribute.
    pub fn set_deref_attr(&mut self, node: NodeId, name: &str, target: Option<NodeId>) -> TreeResult<()> {
        match target {
            Some(target) => {
                let id = self.entry(target)?.id.clone();
                self.set_attr(node, name, id)
            }
            None => self.clear_attr(node, name),
        }
    }

    /// Store the ids of `targets` in a list-valued reference attribute.
    pub fn set_deref_list(&mut self, node: NodeId, name: &str, targets: &[NodeId]) -> TreeResult<()> {
        let ids = targets
            .iter()
            .map(|target| self.entry(*target).map(|entry| entry.id.clone()))
            .collect::<TreeResult<Vec<String>>>()?;
        self.set_attr(node, name, ids)
    }

    /// All ids referenced by the node, keyed by reference attribute.
    pub fn get_referenced_ids(&self, node: NodeId) -> BTreeMap<String, Vec<String>> {
        self.get(node)
            .map(NodeEntry::referenced_ids)
            .unwrap_or_default()
    }

    /// Nodes pointing at `node` through `attr`.
    pub fn get_referencing_nodes(&self, node: NodeId, attr: &str) -> Vec<NodeId> {
        let Some(entry) = self.get(node) else {
            return Vec::new();
        };
        self.backrefs
            .get(attr, &entry.id)
            .iter()
            .filter_map(|id| self.node_by_id(id))
            .collect()
    }

    /// Drop the reference to `target_id` from attribute `attr` of `node`.
    pub fn remove_reference(&mut self, node: NodeId, attr: &str, target_id: &str) -> TreeResult<()> {
        if attr == ALIGNMENT {
            let links: Vec<Alignment> = self
                .entry(node)?
                .alignment
                .iter()
                .filter(|link| link.counterpart != target_id)
                .cloned()
                .collect();
            return self.write_attr(node, ALIGNMENT, links.to_attr());
        }
        match self.get_attr(node, attr) {
            Some(AttrValue::List(items)) => {
                let kept: Vec<AttrValue> = items
                    .into_iter()
                    .filter(|item| item.as_str() != Some(target_id))
                    .collect();
                self.write_attr(node, attr, Some(AttrValue::List(kept)))
            }
            Some(AttrValue::Str(id)) if id == target_id => self.clear_attr(node, attr),
            _ => Ok(()),
        }
    }

    /// Nodes this node is aligned to.
    pub fn aligned_nodes(&self, node: NodeId) -> Vec<NodeId> {
        let ids: Vec<String> = self
            .get(node)
            .map(|entry| entry.alignment.iter().map(|l| l.counterpart.clone()).collect())
            .unwrap_or_default();
        self.resolve_ids(node, ALIGNMENT, &ids)
    }

    /// Append an alignment link from `node` to `counterpart`.
    pub fn add_alignment(&mut self, node: NodeId, counterpart: NodeId, kind: Option<&str>) -> TreeResult<()> {
        let mut link = Alignment::new(self.entry(counterpart)?.id.clone());
        if let Some(kind) = kind {
            link = link.with_kind(kind);
        }
        let mut links = self.entry(node)?.alignment.clone();
        links.push(link);
        self.write_attr(node, ALIGNMENT, links.to_attr())
    }

    fn resolve_ids(&self, node: NodeId, attr: &str, ids: &[String]) -> Vec<NodeId> {
        ids.iter()
            .filter_map(|id| {
                let found = self.node_by_id(id);
                if found.is_none() {
                    warn!(node = %self.describe(node), %attr, target = %id, "reference to unknown node");
                }
                found
            })
            .collect()
    }
}

/// Whether writing `written` replaces the value of reference attribute `attr`:
/// either the same attribute, or a map containing it (`a` for `a/lex.rf`).
fn is_same_or_nested(attr: &str, written: &str) -> bool {
    attr == written
        || attr
            .strip_prefix(written)
            .map_or(false, |rest| rest.starts_with('/'))
}

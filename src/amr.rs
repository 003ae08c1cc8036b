//! Variable names of AMR graph nodes.
//!
//! Every AMR tree root keeps a table from variable letter to the highest
//! number handed out under that letter in its tree (`b`, `b2`, `b3`, ...).
//! Names are derived from the concept (`boy` gets a `b`), coreferring
//! nodes repeat the name of the node they point to, and the table follows
//! nodes as they are attached, moved between trees and removed.
//!
//! Deallocation is conservative: only the current maximum of a letter is
//! given back, so gaps left by removed nodes are never reused.

use std::collections::BTreeMap;

use deunicode::deunicode;
use tracing::{debug, warn};

use crate::document::{Document, NodeId};
use crate::error::{TreeError, TreeResult};
use crate::layer::{AmrNode, AmrNodeType};
use crate::node::NodeFilter;

/// Attribute holding the coreference targets of an AMR node.
pub const COREF: &str = "coref.rf";

/// Variable letter for a concept: its first ASCII letter after
/// transliteration, lowercased, or `default` if there is none.
pub fn letter_for_concept(concept: Option<&str>, default: char) -> char {
    concept
        .map(deunicode)
        .and_then(|ascii| ascii.chars().find(char::is_ascii_alphabetic))
        .map_or(default, |letter| letter.to_ascii_lowercase())
}

/// Split `b2` into `('b', 2)`; a bare letter has number 1.
///
/// Returns `None` for names that do not look like variables (`auto`).
pub fn split_varname(varname: &str) -> Option<(char, u32)> {
    let mut chars = varname.chars();
    let letter = chars.next()?;
    let rest = chars.as_str();
    if rest.is_empty() {
        return Some((letter, 1));
    }
    rest.parse().ok().map(|num| (letter, num))
}

impl Document {
    fn amr(&self, node: NodeId) -> TreeResult<&AmrNode> {
        let entry = self.entry(node)?;
        entry
            .kind
            .as_amr()
            .ok_or_else(|| TreeError::UnknownAttr {
                layer: entry.layer(),
                attr: "varname".to_string(),
            })
    }

    fn amr_mut(&mut self, node: NodeId) -> TreeResult<&mut AmrNode> {
        let id = self.describe(node);
        let kind = self.kind_mut(node)?;
        let layer = kind.layer();
        kind.as_amr_mut().ok_or(TreeError::UnknownAttr {
            layer,
            attr: format!("varname of {}", id),
        })
    }

    /// Allocation table of an AMR tree: letter to highest number in use.
    pub fn amr_vars(&self, root: NodeId) -> BTreeMap<char, u32> {
        self.get(root)
            .and_then(|entry| entry.kind.as_amr())
            .map(|amr| amr.vars.clone())
            .unwrap_or_default()
    }

    pub fn varname(&self, node: NodeId) -> Option<&str> {
        self.get(node)?.kind.as_amr()?.varname.as_deref()
    }

    pub fn coref_nodes(&self, node: NodeId) -> Vec<NodeId> {
        self.get_deref_attr(node, COREF)
    }

    pub fn set_coref_nodes(&mut self, node: NodeId, targets: &[NodeId]) -> TreeResult<()> {
        self.set_deref_list(node, COREF, targets)
    }

    /// The t-node this AMR node was built from.
    pub fn src_tnode(&self, node: NodeId) -> Option<NodeId> {
        self.get_deref_attr(node, "src_tnode.rf").into_iter().next()
    }

    pub fn set_src_tnode(&mut self, node: NodeId, tnode: Option<NodeId>) -> TreeResult<()> {
        self.set_deref_attr(node, "src_tnode.rf", tnode)
    }

    /// Give the node a fresh variable name in its tree.
    ///
    /// A coreferring node takes the name of its first target instead. Nodes
    /// that renamed this way pass the new name on to the nodes coreferring
    /// to them from the same tree. Constants without a name are left alone.
    pub fn set_auto_var(&mut self, node: NodeId) -> TreeResult<()> {
        let root = self.root(node);
        if root == node {
            return Ok(());
        }
        let amr = self.amr(node)?;

        if let Some(target_id) = amr.coref_rf.first().cloned() {
            let target_name = self
                .node_by_id(&target_id)
                .and_then(|target| self.varname(target))
                .map(str::to_string);
            match target_name {
                Some(name) => self.amr_mut(node)?.varname = Some(name),
                None => {
                    warn!(node = %self.describe(node), target = %target_id, "coreference target has no variable");
                }
            }
            return Ok(());
        }

        let unquoted_concept = amr.nodetype != Some(AmrNodeType::Const)
            && amr.concept.is_some()
            && !amr.has_quoted_concept();
        if !(amr.varname.is_some() || amr.nodetype == Some(AmrNodeType::Var) || unquoted_concept) {
            return Ok(());
        }

        let letter = letter_for_concept(amr.concept.as_deref(), self.config.default_var_letter);
        let num = self.allocate_var_for_letter(root, letter)?;
        let name = if num > 1 {
            format!("{}{}", letter, num)
        } else {
            letter.to_string()
        };
        debug!(node = %self.describe(node), varname = %name, "allocated variable");
        self.amr_mut(node)?.varname = Some(name.clone());

        for coreferrer in self.get_referencing_nodes(node, COREF) {
            if self.root(coreferrer) == root {
                self.amr_mut(coreferrer)?.varname = Some(name.clone());
            }
        }
        Ok(())
    }

    fn allocate_var_for_letter(&mut self, root: NodeId, letter: char) -> TreeResult<u32> {
        let vars = &mut self.amr_mut(root)?.vars;
        let num = vars.get(&letter).copied().unwrap_or(0) + 1;
        vars.insert(letter, num);
        Ok(num)
    }

    /// Record an existing name of `node` in the table of `root`.
    fn register_var(&mut self, root: NodeId, node: NodeId) -> TreeResult<()> {
        let Some((letter, num)) = self.varname(node).and_then(split_varname) else {
            return Ok(());
        };
        let vars = &mut self.amr_mut(root)?.vars;
        if vars.get(&letter).map_or(true, |high| num > *high) {
            vars.insert(letter, num);
        }
        Ok(())
    }

    /// Give the name of `node` back to the table of `root`.
    ///
    /// Only the current maximum of a letter is released. Coreferring nodes
    /// do not own their name and release nothing.
    fn free_var(&mut self, root: NodeId, node: NodeId) -> TreeResult<()> {
        let amr = self.amr(node)?;
        if !amr.coref_rf.is_empty() {
            return Ok(());
        }
        let Some((letter, num)) = amr.varname.as_deref().and_then(split_varname) else {
            return Ok(());
        };
        let vars = &mut self.amr_mut(root)?.vars;
        if vars.get(&letter) == Some(&num) {
            if num <= 1 {
                vars.remove(&letter);
            } else {
                vars.insert(letter, num - 1);
            }
        }
        debug!(?letter, num, "freed variable");
        Ok(())
    }

    /// A node was just created under an AMR parent.
    pub(crate) fn amr_attached(&mut self, node: NodeId) -> TreeResult<()> {
        let amr = self.amr(node)?;
        let wants_auto = match amr.varname.as_deref() {
            Some("auto") => true,
            None => amr.nodetype == Some(AmrNodeType::Var),
            Some(_) => false,
        };
        if wants_auto {
            self.set_auto_var(node)
        } else {
            let root = self.root(node);
            self.register_var(root, node)
        }
    }

    /// The subtree of `node` is leaving the tree of `root`.
    ///
    /// A name still repeated by a coreferring node that stays behind remains
    /// allocated in `root`.
    pub(crate) fn amr_free_subtree(&mut self, root: NodeId, node: NodeId) -> TreeResult<()> {
        let subtree = self.descendants(node, NodeFilter::new().add_self());
        for &leaving in &subtree {
            let held_behind = self
                .get_referencing_nodes(leaving, COREF)
                .into_iter()
                .any(|coreferrer| !subtree.contains(&coreferrer) && self.root(coreferrer) == root);
            if held_behind {
                debug!(node = %self.describe(leaving), "variable still used in the old tree");
                continue;
            }
            self.free_var(root, leaving)?;
        }
        Ok(())
    }

    /// A variable name was written by hand: record it in the tree's table.
    pub(crate) fn amr_varname_written(&mut self, node: NodeId) -> TreeResult<()> {
        let root = self.root(node);
        if root == node {
            return Ok(());
        }
        self.register_var(root, node)
    }

    /// The subtree of `node` has just joined a new tree: rename top-down.
    pub(crate) fn amr_reassign_subtree(&mut self, node: NodeId) -> TreeResult<()> {
        let mut joined = vec![node];
        joined.extend(self.descendants(node, NodeFilter::new()));
        for current in joined {
            self.set_auto_var(current)?;
        }
        Ok(())
    }
}

//! Cross-layer links of t-nodes and a-node morphology helpers.

use crate::document::{Document, NodeId};
use crate::error::TreeResult;
use crate::layer::MORPHCAT_MEMBERS;

const LEX: &str = "a/lex.rf";
const AUX: &str = "a/aux.rf";

impl Document {
    /// The a-node carrying the lexical meaning of a t-node.
    pub fn lex_anode(&self, tnode: NodeId) -> Option<NodeId> {
        self.get_deref_attr(tnode, LEX).into_iter().next()
    }

    pub fn set_lex_anode(&mut self, tnode: NodeId, anode: Option<NodeId>) -> TreeResult<()> {
        self.set_deref_attr(tnode, LEX, anode)
    }

    /// Auxiliary a-nodes of a t-node (prepositions, auxiliary verbs, ...).
    pub fn aux_anodes(&self, tnode: NodeId) -> Vec<NodeId> {
        self.get_deref_attr(tnode, AUX)
    }

    /// Replace the auxiliary a-nodes. An empty list unsets the link.
    pub fn set_aux_anodes(&mut self, tnode: NodeId, anodes: &[NodeId]) -> TreeResult<()> {
        if anodes.is_empty() {
            return self.clear_attr(tnode, AUX);
        }
        self.set_deref_list(tnode, AUX, anodes)
    }

    /// Append auxiliary a-nodes not linked yet.
    ///
    /// Works on the stored ids, so links to removed nodes are kept.
    pub fn add_aux_anodes(&mut self, tnode: NodeId, anodes: &[NodeId]) -> TreeResult<()> {
        let mut ids = self.stored_aux_ids(tnode);
        for anode in anodes {
            let id = self.entry(*anode)?.id.clone();
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        self.write_aux_ids(tnode, ids)
    }

    pub fn remove_aux_anodes(&mut self, tnode: NodeId, anodes: &[NodeId]) -> TreeResult<()> {
        let dropped: Vec<String> = anodes
            .iter()
            .filter_map(|anode| self.get(*anode).map(|entry| entry.id.clone()))
            .collect();
        let mut ids = self.stored_aux_ids(tnode);
        ids.retain(|id| !dropped.contains(id));
        self.write_aux_ids(tnode, ids)
    }

    fn stored_aux_ids(&self, tnode: NodeId) -> Vec<String> {
        self.get_attr(tnode, AUX)
            .map(|value| value.referenced_ids())
            .unwrap_or_default()
    }

    fn write_aux_ids(&mut self, tnode: NodeId, ids: Vec<String>) -> TreeResult<()> {
        if ids.is_empty() {
            return self.clear_attr(tnode, AUX);
        }
        self.set_attr(tnode, AUX, ids)
    }

    /// Lexical a-node first, then the auxiliaries.
    pub fn anodes(&self, tnode: NodeId) -> Vec<NodeId> {
        let mut all: Vec<NodeId> = self.lex_anode(tnode).into_iter().collect();
        all.extend(self.aux_anodes(tnode));
        all
    }

    pub fn coref_gram_nodes(&self, tnode: NodeId) -> Vec<NodeId> {
        self.get_deref_attr(tnode, "coref_gram.rf")
    }

    pub fn set_coref_gram_nodes(&mut self, tnode: NodeId, targets: &[NodeId]) -> TreeResult<()> {
        self.set_deref_list(tnode, "coref_gram.rf", targets)
    }

    pub fn coref_text_nodes(&self, tnode: NodeId) -> Vec<NodeId> {
        self.get_deref_attr(tnode, "coref_text.rf")
    }

    pub fn set_coref_text_nodes(&mut self, tnode: NodeId, targets: &[NodeId]) -> TreeResult<()> {
        self.set_deref_list(tnode, "coref_text.rf", targets)
    }

    pub fn compl_nodes(&self, tnode: NodeId) -> Vec<NodeId> {
        self.get_deref_attr(tnode, "compl.rf")
    }

    pub fn set_compl_nodes(&mut self, tnode: NodeId, targets: &[NodeId]) -> TreeResult<()> {
        self.set_deref_list(tnode, "compl.rf", targets)
    }

    /// A grammateme of a t-node (`number`, `tense`, `negation`, ...).
    pub fn gram(&self, tnode: NodeId, name: &str) -> Option<String> {
        self.get_str(tnode, &format!("gram/{}", name))
    }

    pub fn set_gram(&mut self, tnode: NodeId, name: &str, value: &str) -> TreeResult<()> {
        self.set_attr(tnode, &format!("gram/{}", name), value)
    }

    /// A morphological category of an a-node (`pos`, `case`, ...).
    pub fn morphcat(&self, anode: NodeId, name: &str) -> Option<String> {
        self.get_str(anode, &format!("morphcat/{}", name))
    }

    pub fn set_morphcat(&mut self, anode: NodeId, name: &str, value: &str) -> TreeResult<()> {
        self.set_attr(anode, &format!("morphcat/{}", name), value)
    }

    /// An Interset feature of an a-node (`pos`, `gender`, ...).
    pub fn iset(&self, anode: NodeId, name: &str) -> Option<String> {
        self.get_str(anode, &format!("iset/{}", name))
    }

    pub fn set_iset(&mut self, anode: NodeId, name: &str, value: &str) -> TreeResult<()> {
        self.set_attr(anode, &format!("iset/{}", name), value)
    }

    /// Set every morphological category of an a-node to `.`.
    pub fn reset_morphcat(&mut self, anode: NodeId) -> TreeResult<()> {
        for category in MORPHCAT_MEMBERS {
            self.set_morphcat(anode, category, ".")?;
        }
        Ok(())
    }
}

//! Node kinds, one per annotation layer, and the capabilities they opt into.
//!
//! The set of kinds is closed: [`NodeKind`] has one variant per [`Layer`],
//! each carrying its declared attributes as plain fields. Capabilities
//! ([`Ordered`], [`EffectiveRelations`], [`InClause`]) are traits that the
//! kind structs implement; `NodeKind` hands them out as trait objects so the
//! tree algorithms can stay layer-agnostic.

#[macro_use]
mod macros;

mod a;
mod amr;
mod n;
mod p;
mod t;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::attr::{AttrMap, AttrType, AttrValue};
use crate::error::{TreeError, TreeResult};

pub use a::{ANode, MORPHCAT_MEMBERS};
pub use amr::{AmrNode, AmrNodeType};
pub use n::NNode;
pub use p::PNode;
pub use t::{TNode, COAP_FUNCTORS};

/// The annotation layer a tree belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    /// Surface syntax / morphology.
    A,
    /// Deep syntax (tectogrammatical).
    T,
    /// Named entities.
    N,
    /// Phrase structure.
    P,
    /// AMR-like rooted graphs.
    Amr,
}

impl Layer {
    /// All layers, in the order passes visit them.
    pub const ALL: [Layer; 5] = [Layer::A, Layer::T, Layer::N, Layer::P, Layer::Amr];

    pub fn as_str(self) -> &'static str {
        match self {
            Layer::A => "a",
            Layer::T => "t",
            Layer::N => "n",
            Layer::P => "p",
            Layer::Amr => "amr",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layer {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "a" => Ok(Layer::A),
            "t" => Ok(Layer::T),
            "n" => Ok(Layer::N),
            "p" => Ok(Layer::P),
            "amr" => Ok(Layer::Amr),
            other => Err(TreeError::Load(format!("unknown layer {:?}", other))),
        }
    }
}

/// Static attribute schema of a node kind, generated by `node_kind!`.
pub trait AttrSchema: Default {
    /// Declared attributes with their types.
    const ATTRS: &'static [(&'static str, AttrType)];

    /// Attributes (or `map/key` paths) whose values are node ids.
    const REF_ATTRS: &'static [&'static str];

    /// Current value of a declared top-level attribute.
    fn get_attr(&self, name: &str) -> Option<AttrValue>;

    /// Coerce and store a value. Returns `Ok(false)` if the name is not declared.
    fn set_attr(&mut self, name: &str, value: Option<AttrValue>) -> TreeResult<bool>;

    /// Build a node from loader data, ignoring keys the kind does not declare.
    fn from_data(data: &AttrMap) -> TreeResult<Self> {
        let mut node = Self::default();
        for (name, _) in Self::ATTRS {
            if let Some(value) = data.get(*name) {
                node.set_attr(name, Some(value.clone()))?;
            }
        }
        Ok(node)
    }
}

/// Nodes with a linear order key.
pub trait Ordered {
    fn ord(&self) -> Option<i64>;
    fn set_ord(&mut self, ord: i64);
}

/// Nodes that take part in coordination/apposition structures.
pub trait EffectiveRelations {
    fn is_member(&self) -> bool;

    /// Whether this node heads a coordination or apposition.
    fn is_coap_root(&self) -> bool;
}

/// Nodes organised into numbered clauses.
pub trait InClause {
    fn clause_number(&self) -> Option<i64>;
    fn is_clause_head(&self) -> bool;
}

/// Layer-specific payload of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    A(ANode),
    T(TNode),
    N(NNode),
    P(PNode),
    Amr(AmrNode),
}

macro_rules! dispatch {
    ($kind:expr, $node:ident => $body:expr) => {
        match $kind {
            NodeKind::A($node) => $body,
            NodeKind::T($node) => $body,
            NodeKind::N($node) => $body,
            NodeKind::P($node) => $body,
            NodeKind::Amr($node) => $body,
        }
    };
}

impl NodeKind {
    /// Build an empty node of the given layer.
    pub fn new(layer: Layer) -> Self {
        match layer {
            Layer::A => NodeKind::A(ANode::default()),
            Layer::T => NodeKind::T(TNode::default()),
            Layer::N => NodeKind::N(NNode::default()),
            Layer::P => NodeKind::P(PNode::default()),
            Layer::Amr => NodeKind::Amr(AmrNode::default()),
        }
    }

    /// Build a node of the given layer from loader data.
    pub fn from_data(layer: Layer, data: &AttrMap) -> TreeResult<Self> {
        Ok(match layer {
            Layer::A => NodeKind::A(ANode::from_data(data)?),
            Layer::T => NodeKind::T(TNode::from_data(data)?),
            Layer::N => NodeKind::N(NNode::from_data(data)?),
            Layer::P => NodeKind::P(PNode::from_data(data)?),
            Layer::Amr => NodeKind::Amr(AmrNode::from_data(data)?),
        })
    }

    pub fn layer(&self) -> Layer {
        match self {
            NodeKind::A(_) => Layer::A,
            NodeKind::T(_) => Layer::T,
            NodeKind::N(_) => Layer::N,
            NodeKind::P(_) => Layer::P,
            NodeKind::Amr(_) => Layer::Amr,
        }
    }

    pub fn attr_names(&self) -> &'static [(&'static str, AttrType)] {
        match self {
            NodeKind::A(_) => ANode::ATTRS,
            NodeKind::T(_) => TNode::ATTRS,
            NodeKind::N(_) => NNode::ATTRS,
            NodeKind::P(_) => PNode::ATTRS,
            NodeKind::Amr(_) => AmrNode::ATTRS,
        }
    }

    pub fn ref_attrs(&self) -> &'static [&'static str] {
        match self {
            NodeKind::A(_) => ANode::REF_ATTRS,
            NodeKind::T(_) => TNode::REF_ATTRS,
            NodeKind::N(_) => NNode::REF_ATTRS,
            NodeKind::P(_) => PNode::REF_ATTRS,
            NodeKind::Amr(_) => AmrNode::REF_ATTRS,
        }
    }

    pub fn get_attr(&self, name: &str) -> Option<AttrValue> {
        dispatch!(self, node => node.get_attr(name))
    }

    pub fn set_attr(&mut self, name: &str, value: Option<AttrValue>) -> TreeResult<bool> {
        dispatch!(self, node => node.set_attr(name, value))
    }

    pub fn ordered(&self) -> Option<&dyn Ordered> {
        match self {
            NodeKind::A(node) => Some(node),
            NodeKind::T(node) => Some(node),
            NodeKind::Amr(node) => Some(node),
            NodeKind::N(_) | NodeKind::P(_) => None,
        }
    }

    pub fn ordered_mut(&mut self) -> Option<&mut dyn Ordered> {
        match self {
            NodeKind::A(node) => Some(node),
            NodeKind::T(node) => Some(node),
            NodeKind::Amr(node) => Some(node),
            NodeKind::N(_) | NodeKind::P(_) => None,
        }
    }

    pub fn effective(&self) -> Option<&dyn EffectiveRelations> {
        match self {
            NodeKind::A(node) => Some(node),
            NodeKind::T(node) => Some(node),
            _ => None,
        }
    }

    pub fn in_clause(&self) -> Option<&dyn InClause> {
        match self {
            NodeKind::A(node) => Some(node),
            NodeKind::T(node) => Some(node),
            _ => None,
        }
    }

    /// The order key, if this kind is ordered and the key is set.
    pub fn ord(&self) -> Option<i64> {
        self.ordered().and_then(|node| node.ord())
    }

    pub fn is_coap_root(&self) -> bool {
        self.effective().map_or(false, |node| node.is_coap_root())
    }

    pub fn is_member(&self) -> bool {
        self.effective().map_or(false, |node| node.is_member())
    }

    pub fn clause_number(&self) -> Option<i64> {
        self.in_clause().and_then(|node| node.clause_number())
    }

    /// Human-oriented label used by displays and log messages.
    pub fn label(&self) -> Option<&str> {
        match self {
            NodeKind::A(node) => node.form.as_deref(),
            NodeKind::T(node) => node.t_lemma.as_deref(),
            NodeKind::N(node) => node.normalized_name.as_deref(),
            NodeKind::P(node) => node.form.as_deref().or(node.phrase.as_deref()),
            NodeKind::Amr(node) => node.concept.as_deref().or(node.varname.as_deref()),
        }
    }

    pub fn as_a(&self) -> Option<&ANode> {
        match self {
            NodeKind::A(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_t(&self) -> Option<&TNode> {
        match self {
            NodeKind::T(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_n(&self) -> Option<&NNode> {
        match self {
            NodeKind::N(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_p(&self) -> Option<&PNode> {
        match self {
            NodeKind::P(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_amr(&self) -> Option<&AmrNode> {
        match self {
            NodeKind::Amr(node) => Some(node),
            _ => None,
        }
    }

    pub(crate) fn as_amr_mut(&mut self) -> Option<&mut AmrNode> {
        match self {
            NodeKind::Amr(node) => Some(node),
            _ => None,
        }
    }
}

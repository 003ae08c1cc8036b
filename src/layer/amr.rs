use std::collections::BTreeMap;
use std::fmt;

use super::Ordered;
use crate::attr::{AttrField, AttrType, AttrValue};
use crate::error::{TreeError, TreeResult};

/// What an AMR node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AmrNodeType {
    /// A concept carrying its own variable (`b2 / boy`).
    Var,
    /// A constant without a variable (`"Paris"`, `-`).
    Const,
    /// A bare variable repeating another node's name.
    Coref,
    /// The artificial tree root.
    Root,
}

impl AmrNodeType {
    pub fn as_str(self) -> &'static str {
        match self {
            AmrNodeType::Var => "var",
            AmrNodeType::Const => "const",
            AmrNodeType::Coref => "coref",
            AmrNodeType::Root => "root",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "var" => Some(AmrNodeType::Var),
            "const" => Some(AmrNodeType::Const),
            "coref" => Some(AmrNodeType::Coref),
            "root" => Some(AmrNodeType::Root),
            _ => None,
        }
    }
}

impl fmt::Display for AmrNodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AttrField for Option<AmrNodeType> {
    const TYPE: AttrType = AttrType::Str;

    fn to_attr(&self) -> Option<AttrValue> {
        self.map(|nodetype| AttrValue::Str(nodetype.as_str().to_string()))
    }

    fn from_attr(attr: &str, value: Option<AttrValue>) -> TreeResult<Self> {
        match value {
            None => Ok(None),
            Some(AttrValue::Str(s)) => match AmrNodeType::parse(&s) {
                Some(nodetype) => Ok(Some(nodetype)),
                None => Err(TreeError::AttrType {
                    attr: attr.to_string(),
                    expected: "var, const, coref or root",
                    found: s,
                }),
            },
            Some(other) => Err(TreeError::AttrType {
                attr: attr.to_string(),
                expected: AttrType::Str.name(),
                found: other.to_string(),
            }),
        }
    }
}

node_kind! {
    /// A node of an AMR-like rooted graph, written as a tree plus
    /// coreference links.
    pub struct AmrNode {
        "ord" => ord: Option<i64>,
        "varname" => varname: Option<String>,
        "nodetype" => nodetype: Option<AmrNodeType>,
        /// Edge label from the parent (`:ARG0`, `:mod`, ...).
        "modifier" => modifier: Option<String>,
        "concept" => concept: Option<String>,
        "src_tnode.rf" => src_tnode_rf: Option<String>,
        "coref.rf" => coref_rf: Vec<String>,
        "is_ne_head" => is_ne_head: bool,
        "is_ne_subnode" => is_ne_subnode: bool,
    }
    refs = ["src_tnode.rf", "coref.rf"];
    state {
        /// Highest number allocated per variable letter. Only meaningful on roots.
        vars: BTreeMap<char, u32>,
    }
}

impl AmrNode {
    /// Whether the concept is a quoted literal (`"Prague"`).
    pub fn has_quoted_concept(&self) -> bool {
        self.concept
            .as_deref()
            .map_or(false, |concept| concept.starts_with('"'))
    }
}

impl Ordered for AmrNode {
    fn ord(&self) -> Option<i64> {
        self.ord
    }

    fn set_ord(&mut self, ord: i64) {
        self.ord = Some(ord);
    }
}

use super::{EffectiveRelations, InClause, Ordered};
use crate::attr::AttrMap;

/// Members of the `morphcat` structure, in their conventional order.
pub const MORPHCAT_MEMBERS: [&str; 13] = [
    "pos",
    "subpos",
    "gender",
    "number",
    "case",
    "person",
    "tense",
    "negation",
    "voice",
    "grade",
    "mood",
    "possnumber",
    "possgender",
];

node_kind! {
    /// A surface-syntax (analytical) node.
    pub struct ANode {
        "ord" => ord: Option<i64>,
        "is_member" => is_member: bool,
        "clause_number" => clause_number: Option<i64>,
        "is_clause_head" => is_clause_head: bool,
        "form" => form: Option<String>,
        "lemma" => lemma: Option<String>,
        "tag" => tag: Option<String>,
        "afun" => afun: Option<String>,
        "no_space_after" => no_space_after: bool,
        "morphcat" => morphcat: AttrMap,
        /// Interset features, keyed by feature name.
        "iset" => iset: AttrMap,
        "is_parenthesis_root" => is_parenthesis_root: bool,
        "edge_to_collapse" => edge_to_collapse: bool,
        "is_auxiliary" => is_auxiliary: bool,
        /// Link to the phrase-structure terminal.
        "p_terminal.rf" => p_terminal_rf: Option<String>,
        "upos" => upos: Option<String>,
        "xpos" => xpos: Option<String>,
        "feats" => feats: Option<String>,
        "deprel" => deprel: Option<String>,
        "deps" => deps: Option<String>,
        "misc" => misc: Option<String>,
    }
    refs = ["p_terminal.rf"];
}

impl Ordered for ANode {
    fn ord(&self) -> Option<i64> {
        self.ord
    }

    fn set_ord(&mut self, ord: i64) {
        self.ord = Some(ord);
    }
}

impl EffectiveRelations for ANode {
    fn is_member(&self) -> bool {
        self.is_member
    }

    fn is_coap_root(&self) -> bool {
        matches!(self.afun.as_deref(), Some("Coord") | Some("Apos"))
    }
}

impl InClause for ANode {
    fn clause_number(&self) -> Option<i64> {
        self.clause_number
    }

    fn is_clause_head(&self) -> bool {
        self.is_clause_head
    }
}

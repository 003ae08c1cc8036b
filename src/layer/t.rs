use super::{EffectiveRelations, InClause, Ordered};
use crate::attr::AttrMap;

/// Functors that mark coordination and apposition roots.
pub const COAP_FUNCTORS: [&str; 10] = [
    "CONJ", "CONFR", "DISJ", "GRAD", "ADVS", "CSQ", "REAS", "CONTRA", "APPS", "OPER",
];

node_kind! {
    /// A deep-syntax (tectogrammatical) node.
    pub struct TNode {
        "ord" => ord: Option<i64>,
        "is_member" => is_member: bool,
        "clause_number" => clause_number: Option<i64>,
        "is_clause_head" => is_clause_head: bool,
        "functor" => functor: Option<String>,
        "formeme" => formeme: Option<String>,
        "t_lemma" => t_lemma: Option<String>,
        "nodetype" => nodetype: Option<String>,
        "subfunctor" => subfunctor: Option<String>,
        "tfa" => tfa: Option<String>,
        "is_dsp_root" => is_dsp_root: bool,
        /// Grammatemes (`gram/number`, `gram/tense`, ...).
        "gram" => gram: AttrMap,
        /// Anchors in the surface tree (`a/lex.rf`, `a/aux.rf`).
        "a" => a: AttrMap,
        "compl.rf" => compl_rf: Vec<String>,
        "coref_gram.rf" => coref_gram_rf: Vec<String>,
        "coref_text.rf" => coref_text_rf: Vec<String>,
        "sentmod" => sentmod: Option<String>,
        "is_parenthesis" => is_parenthesis: bool,
        "is_passive" => is_passive: bool,
        "is_generated" => is_generated: bool,
        "is_relclause_head" => is_relclause_head: bool,
        "is_name_of_person" => is_name_of_person: bool,
        "voice" => voice: Option<String>,
        "mlayer_pos" => mlayer_pos: Option<String>,
        "t_lemma_origin" => t_lemma_origin: Option<String>,
        "formeme_origin" => formeme_origin: Option<String>,
        "is_infin" => is_infin: bool,
        "is_reflexive" => is_reflexive: bool,
    }
    refs = ["a/lex.rf", "a/aux.rf", "compl.rf", "coref_gram.rf", "coref_text.rf"];
}

impl Ordered for TNode {
    fn ord(&self) -> Option<i64> {
        self.ord
    }

    fn set_ord(&mut self, ord: i64) {
        self.ord = Some(ord);
    }
}

impl EffectiveRelations for TNode {
    fn is_member(&self) -> bool {
        self.is_member
    }

    fn is_coap_root(&self) -> bool {
        self.functor
            .as_deref()
            .map_or(false, |functor| COAP_FUNCTORS.contains(&functor))
    }
}

impl InClause for TNode {
    fn clause_number(&self) -> Option<i64> {
        self.clause_number
    }

    fn is_clause_head(&self) -> bool {
        self.is_clause_head
    }
}

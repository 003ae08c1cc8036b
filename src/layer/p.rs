node_kind! {
    /// A phrase-structure node.
    pub struct PNode {
        "is_head" => is_head: bool,
        "index" => index: Option<String>,
        "coindex" => coindex: Option<String>,
        "edgelabel" => edgelabel: Option<String>,
        "form" => form: Option<String>,
        "lemma" => lemma: Option<String>,
        "tag" => tag: Option<String>,
        "phrase" => phrase: Option<String>,
        "functions" => functions: Vec<String>,
    }
    refs = [];
}

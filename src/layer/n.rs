node_kind! {
    /// A named-entity node.
    pub struct NNode {
        "ne_type" => ne_type: Option<String>,
        "normalized_name" => normalized_name: Option<String>,
        /// Surface nodes the entity spans.
        "a.rf" => a_rf: Vec<String>,
    }
    refs = ["a.rf"];
}

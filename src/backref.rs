//! Reverse index of node references.
//!
//! For every reference attribute (`coref.rf`, `a/lex.rf`, `alignment`, ...)
//! the index maps a referenced node id to the ids of the nodes pointing at
//! it through that attribute. The document updates it on every write to a
//! reference attribute, so it always mirrors the current attribute values.

use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Attribute name under which alignment links are indexed.
pub const ALIGNMENT: &str = "alignment";

#[derive(Debug, Clone, Default)]
pub struct BackrefIndex {
    by_attr: HashMap<String, BTreeMap<String, BTreeSet<String>>>,
}

impl BackrefIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `source` references each of `targets` through `attr`.
    pub fn index<S: AsRef<str>>(&mut self, attr: &str, source: &str, targets: &[S]) {
        if targets.is_empty() {
            return;
        }
        let by_target = self.by_attr.entry(attr.to_string()).or_default();
        for target in targets {
            by_target
                .entry(target.as_ref().to_string())
                .or_default()
                .insert(source.to_string());
        }
    }

    /// Forget that `source` references `targets` through `attr`.
    ///
    /// Entries that are not present are ignored.
    pub fn remove<S: AsRef<str>>(&mut self, attr: &str, source: &str, targets: &[S]) {
        let Some(by_target) = self.by_attr.get_mut(attr) else {
            return;
        };
        for target in targets {
            let target = target.as_ref();
            if let Some(sources) = by_target.get_mut(target) {
                sources.remove(source);
                if sources.is_empty() {
                    by_target.remove(target);
                }
            }
        }
    }

    /// Ids of the nodes referencing `target` through `attr`, sorted.
    pub fn get(&self, attr: &str, target: &str) -> Vec<String> {
        self.by_attr
            .get(attr)
            .and_then(|by_target| by_target.get(target))
            .map(|sources| sources.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Every `(attr, source)` pair currently pointing at `target`.
    pub fn incoming(&self, target: &str) -> Vec<(String, String)> {
        let mut found = Vec::new();
        for (attr, by_target) in &self.by_attr {
            if let Some(sources) = by_target.get(target) {
                found.extend(sources.iter().map(|source| (attr.clone(), source.clone())));
            }
        }
        found.sort();
        found
    }

    pub fn is_empty(&self) -> bool {
        self.by_attr.values().all(BTreeMap::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_and_remove() {
        let mut index = BackrefIndex::new();
        index.index("coref.rf", "n2", &["n1"]);
        index.index("coref.rf", "n3", &["n1"]);
        assert_eq!(index.get("coref.rf", "n1"), vec!["n2", "n3"]);

        index.remove("coref.rf", "n2", &["n1"]);
        assert_eq!(index.get("coref.rf", "n1"), vec!["n3"]);

        index.remove("coref.rf", "n3", &["n1"]);
        assert!(index.get("coref.rf", "n1").is_empty());
        assert!(index.is_empty());
    }

    #[test]
    fn removing_unknown_entries_is_a_no_op() {
        let mut index = BackrefIndex::new();
        index.remove("alignment", "n1", &["n2"]);
        index.index("alignment", "n1", &["n2"]);
        index.remove("alignment", "n9", &["n2"]);
        assert_eq!(index.get("alignment", "n2"), vec!["n1"]);
    }

    #[test]
    fn incoming_spans_attributes() {
        let mut index = BackrefIndex::new();
        index.index("a/lex.rf", "t1", &["a1"]);
        index.index(ALIGNMENT, "a9", &["a1"]);
        assert_eq!(
            index.incoming("a1"),
            vec![
                ("a/lex.rf".to_string(), "t1".to_string()),
                (ALIGNMENT.to_string(), "a9".to_string()),
            ]
        );
    }
}

//! Parent/child structure, ids and attribute access.

use crate::{AttrValue, Document, Layer, NodeFilter, NodeId, TreeError};

fn t_tree() -> (Document, NodeId) {
    let mut doc = Document::new();
    let bundle = doc.create_bundle();
    let zone = doc.create_zone(bundle, "cs", "").unwrap();
    let root = doc.create_tree(&zone, Layer::T).unwrap();
    (doc, root)
}

/// root -> a -> b -> c
fn chain(doc: &mut Document, root: NodeId) -> (NodeId, NodeId, NodeId) {
    let a = doc.create_child(root, None).unwrap();
    let b = doc.create_child(a, None).unwrap();
    let c = doc.create_child(b, None).unwrap();
    (a, b, c)
}

#[test]
fn parent_cannot_be_a_descendant() {
    let (mut doc, root) = t_tree();
    let (a, b, c) = chain(&mut doc, root);

    assert!(matches!(doc.set_parent(a, c), Err(TreeError::Cycle { .. })));
    assert!(matches!(doc.set_parent(a, a), Err(TreeError::Cycle { .. })));
    assert!(matches!(doc.set_parent(root, b), Err(TreeError::Cycle { .. })));

    // nothing moved
    assert_eq!(doc.parent(a), Some(root));
    assert_eq!(doc.children(root, NodeFilter::new()), vec![a]);
    assert_eq!(doc.root(c), root);
    assert_eq!(doc.depth(c), 3);
    assert!(doc.is_descendant_of(c, a));
    assert!(!doc.is_descendant_of(a, c));
}

#[test]
fn nodes_cannot_move_between_documents() {
    let (mut first, first_root) = t_tree();
    let (mut second, second_root) = t_tree();
    let node = first.create_child(first_root, None).unwrap();

    assert!(matches!(
        first.set_parent(node, second_root),
        Err(TreeError::CrossDocument { .. })
    ));
    assert!(matches!(
        second.set_parent(second_root, node),
        Err(TreeError::CrossDocument { .. })
    ));
    assert_eq!(first.parent(node), Some(first_root));
}

#[test]
fn reparenting_appends_to_the_new_parent() {
    let (mut doc, root) = t_tree();
    let a = doc.create_child(root, None).unwrap();
    let b = doc.create_child(root, None).unwrap();
    let c = doc.create_child(root, None).unwrap();

    doc.set_parent(a, b).unwrap();
    assert_eq!(doc.children(root, NodeFilter::new()), vec![b, c]);
    assert_eq!(doc.children(b, NodeFilter::new()), vec![a]);

    doc.set_parent(a, root).unwrap();
    assert_eq!(doc.children(root, NodeFilter::new()), vec![b, c, a]);
    assert!(doc.children(b, NodeFilter::new()).is_empty());
    assert!(doc.is_root(root));
    assert!(!doc.is_root(a));
}

#[test]
fn descendants_skip_excluded_subtree() {
    let (mut doc, root) = t_tree();
    let (a, b, c) = chain(&mut doc, root);
    let d = doc.create_child(a, None).unwrap();

    assert_eq!(doc.descendants(root, NodeFilter::new()), vec![a, b, c, d]);
    assert_eq!(
        doc.descendants(root, NodeFilter::new().except_subtree(b)),
        vec![a, d]
    );
    assert_eq!(
        doc.descendants(a, NodeFilter::new().add_self().ordered()),
        vec![a, b, c, d]
    );
}

#[test]
fn generated_ids_are_unique_and_indexed() {
    let (mut doc, root) = t_tree();
    let first = doc.create_child(root, None).unwrap();
    let second = doc.create_child(root, None).unwrap();
    assert_eq!(doc[first].id(), "t-node-cs-s1-n1");
    assert_eq!(doc[second].id(), "t-node-cs-s1-n2");
    assert_eq!(doc.node_by_id("t-node-cs-s1-n2"), Some(second));

    // a generated id never clashes with a supplied one
    doc.create_child(root, Some("t-node-cs-s1-n3")).unwrap();
    let fourth = doc.create_child(root, None).unwrap();
    assert_eq!(doc[fourth].id(), "t-node-cs-s1-n4");
}

#[test]
fn duplicate_ids_are_rejected() {
    let (mut doc, root) = t_tree();
    doc.create_child(root, Some("verb")).unwrap();
    assert_eq!(
        doc.create_child(root, Some("verb")),
        Err(TreeError::DuplicateId("verb".to_string()))
    );
    assert_eq!(doc.len(), 2);
}

#[test]
fn removed_handles_go_stale() {
    let (mut doc, root) = t_tree();
    let (a, b, _) = chain(&mut doc, root);
    let id = doc[b].id().to_string();

    doc.remove(b).unwrap();
    assert!(!doc.contains(b));
    assert_eq!(doc.node_by_id(&id), None);
    assert!(doc.children(b, NodeFilter::new()).is_empty());
    assert_eq!(doc.get_attr(b, "functor"), None);
    assert!(matches!(
        doc.set_attr(b, "functor", "ACT"),
        Err(TreeError::UnknownNode(_))
    ));
    assert!(doc.children(a, NodeFilter::new()).is_empty());
    assert_eq!(doc.len(), 2);
}

#[test]
fn attribute_paths_reach_into_maps() {
    let (mut doc, root) = t_tree();
    let node = doc.create_child(root, None).unwrap();

    doc.set_attr(node, "functor", "PRED").unwrap();
    doc.set_attr(node, "gram/negation", "neg1").unwrap();
    doc.set_attr(node, "gram/tense", "ant").unwrap();
    doc.set_attr(node, "is_generated", true).unwrap();

    assert_eq!(doc.get_str(node, "functor").as_deref(), Some("PRED"));
    assert_eq!(doc.get_str(node, "gram/negation").as_deref(), Some("neg1"));
    assert_eq!(doc.get_attr(node, "is_generated"), Some(AttrValue::Bool(true)));
    // a path through a string is not found
    assert_eq!(doc.get_attr(node, "functor/x"), None);
    assert_eq!(doc.get_attr(node, "gram/number"), None);

    doc.clear_attr(node, "gram/negation").unwrap();
    assert_eq!(doc.get_attr(node, "gram/negation"), None);
    assert_eq!(doc.gram(node, "tense").as_deref(), Some("ant"));
}

#[test]
fn undeclared_and_mistyped_attributes_fail() {
    let (mut doc, root) = t_tree();
    let node = doc.create_child(root, None).unwrap();

    assert!(matches!(
        doc.set_attr(node, "afun", "Sb"),
        Err(TreeError::UnknownAttr { layer: Layer::T, .. })
    ));
    assert!(matches!(
        doc.set_attr(node, "is_member", "yes"),
        Err(TreeError::AttrType { .. })
    ));
    // wild takes anything
    doc.set_attr(node, "wild/note", "checked").unwrap();
    assert_eq!(doc.get_str(node, "wild/note").as_deref(), Some("checked"));
}

#[test]
fn create_child_with_loader_data() {
    let (mut doc, root) = t_tree();
    let mut data = crate::AttrMap::new();
    data.insert("id".to_string(), AttrValue::from("given"));
    data.insert("functor".to_string(), AttrValue::from("ACT"));
    data.insert("ord".to_string(), AttrValue::from(7i64));
    data.insert("unknown".to_string(), AttrValue::from("ignored"));

    let node = doc.create_child_with(root, None, &data).unwrap();
    assert_eq!(doc[node].id(), "given");
    assert_eq!(doc.ord(node), Some(7));
    assert_eq!(doc.get_str(node, "functor").as_deref(), Some("ACT"));
    assert_eq!(doc.get_attr(node, "unknown"), None);
}

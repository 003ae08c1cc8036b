//! Word order: renumbering on removal and shifting nodes.

use crate::{Document, Layer, NodeFilter, NodeId, ShiftMode, TreeError};

/// An a-tree with the given forms, all hanging from the root in order.
fn flat_sentence(forms: &[&str]) -> (Document, NodeId, Vec<NodeId>) {
    let mut doc = Document::new();
    let bundle = doc.create_bundle();
    let zone = doc.create_zone(bundle, "en", "").unwrap();
    let root = doc.create_tree(&zone, Layer::A).unwrap();
    let nodes = forms
        .iter()
        .map(|form| {
            let node = doc.create_child(root, None).unwrap();
            doc.set_attr(node, "form", *form).unwrap();
            node
        })
        .collect();
    (doc, root, nodes)
}

fn forms(doc: &Document, root: NodeId) -> Vec<String> {
    doc.descendants(root, NodeFilter::new().ordered())
        .into_iter()
        .filter_map(|node| doc.get_str(node, "form"))
        .collect()
}

fn ords(doc: &Document, root: NodeId) -> Vec<i64> {
    doc.descendants(root, NodeFilter::new().add_self().ordered())
        .into_iter()
        .filter_map(|node| doc.ord(node))
        .collect()
}

#[test]
fn new_nodes_are_appended_to_the_order() {
    let (doc, root, nodes) = flat_sentence(&["John", "loves", "Mary"]);
    assert_eq!(doc.ord(root), Some(0));
    let got: Vec<Option<i64>> = nodes.iter().map(|node| doc.ord(*node)).collect();
    assert_eq!(got, vec![Some(1), Some(2), Some(3)]);
}

#[test]
fn remove_renumbers_survivors_contiguously() {
    let (mut doc, root, nodes) = flat_sentence(&["a", "b", "c", "d", "e"]);
    // gaps from manual numbering are closed as well
    doc.set_ord(nodes[4], 40).unwrap();
    doc.set_parent(nodes[3], nodes[1]).unwrap();

    doc.remove(nodes[1]).unwrap();
    assert_eq!(ords(&doc, root), vec![0, 1, 2, 3]);
    assert_eq!(forms(&doc, root), vec!["a", "c", "e"]);
    assert_eq!(doc.ord(nodes[0]), Some(1));
    assert_eq!(doc.ord(nodes[4]), Some(3));
}

#[test]
fn renumbering_on_remove_can_be_turned_off() {
    let config = crate::DocumentConfig {
        renumber_on_remove: false,
        ..Default::default()
    };
    let mut doc = Document::with_config(config);
    let bundle = doc.create_bundle();
    let zone = doc.create_zone(bundle, "en", "").unwrap();
    let root = doc.create_tree(&zone, Layer::A).unwrap();
    let first = doc.create_child(root, None).unwrap();
    let second = doc.create_child(root, None).unwrap();

    doc.remove(first).unwrap();
    assert_eq!(doc.ord(second), Some(2));
}

#[test]
fn shift_before_and_after_node() {
    let (mut doc, root, nodes) = flat_sentence(&["a", "b", "c", "d"]);

    doc.shift_before_node(nodes[3], nodes[1], ShiftMode::WithSubtree).unwrap();
    assert_eq!(forms(&doc, root), vec!["a", "d", "b", "c"]);
    assert_eq!(ords(&doc, root), vec![0, 1, 2, 3, 4]);

    doc.shift_after_node(nodes[0], nodes[2], ShiftMode::WithSubtree).unwrap();
    assert_eq!(forms(&doc, root), vec!["d", "b", "c", "a"]);
    assert_eq!(ords(&doc, root), vec![0, 1, 2, 3, 4]);
}

#[test]
fn shifting_brings_the_subtree_along() {
    let (mut doc, root, nodes) = flat_sentence(&["big", "dog", "barks", "loudly"]);
    // "big" depends on "dog"
    doc.set_parent(nodes[0], nodes[1]).unwrap();

    doc.shift_after_node(nodes[1], nodes[3], ShiftMode::WithSubtree).unwrap();
    assert_eq!(forms(&doc, root), vec!["barks", "loudly", "big", "dog"]);

    doc.shift_before_node(nodes[1], nodes[2], ShiftMode::NodeOnly).unwrap();
    assert_eq!(forms(&doc, root), vec!["dog", "barks", "loudly", "big"]);
}

#[test]
fn shifting_around_a_whole_subtree() {
    let (mut doc, root, nodes) = flat_sentence(&["x", "the", "old", "man", "y"]);
    doc.set_parent(nodes[1], nodes[3]).unwrap();
    doc.set_parent(nodes[2], nodes[3]).unwrap();

    // "man" spans "the old man"
    doc.shift_after_subtree(nodes[0], nodes[3], ShiftMode::WithSubtree).unwrap();
    assert_eq!(forms(&doc, root), vec!["the", "old", "man", "x", "y"]);

    doc.shift_before_subtree(nodes[4], nodes[3], ShiftMode::WithSubtree).unwrap();
    assert_eq!(forms(&doc, root), vec!["y", "the", "old", "man", "x"]);
}

#[test]
fn shifting_into_own_subtree_is_rejected() {
    let (mut doc, root, nodes) = flat_sentence(&["a", "b", "c"]);
    doc.set_parent(nodes[1], nodes[0]).unwrap();

    assert!(matches!(
        doc.shift_after_node(nodes[0], nodes[1], ShiftMode::WithSubtree),
        Err(TreeError::ShiftIntoSubtree { .. })
    ));
    assert_eq!(forms(&doc, root), vec!["a", "b", "c"]);

    // fine when the children stay where they are
    doc.shift_after_node(nodes[0], nodes[1], ShiftMode::NodeOnly).unwrap();
    assert_eq!(forms(&doc, root), vec!["b", "a", "c"]);
}

#[test]
fn moving_to_another_tree_appends_the_subtree() {
    let (mut doc, root, nodes) = flat_sentence(&["John", "loves", "Mary"]);
    let bundle = doc.create_bundle();
    let zone = doc.create_zone(bundle, "en", "").unwrap();
    let other_root = doc.create_tree(&zone, Layer::A).unwrap();
    let big = doc.create_child(other_root, None).unwrap();
    let dog = doc.create_child(other_root, None).unwrap();
    doc.set_attr(big, "form", "big").unwrap();
    doc.set_attr(dog, "form", "dog").unwrap();
    doc.set_parent(big, dog).unwrap();

    doc.set_parent(dog, nodes[2]).unwrap();
    assert_eq!(forms(&doc, root), vec!["John", "loves", "Mary", "big", "dog"]);
    assert_eq!(ords(&doc, root), vec![0, 1, 2, 3, 4, 5]);
    assert_eq!(ords(&doc, other_root), vec![0]);

    // moving within the tree leaves the order alone
    doc.set_parent(dog, root).unwrap();
    assert_eq!(ords(&doc, root), vec![0, 1, 2, 3, 4, 5]);
}

#[test]
fn shifting_needs_ordered_nodes_in_one_tree() {
    let (mut doc, _, nodes) = flat_sentence(&["a"]);
    let zone = doc.zone_ref(0, "en", "").unwrap();
    let other_root = doc.create_tree(&zone, Layer::T).unwrap();
    let tnode = doc.create_child(other_root, None).unwrap();
    let nroot = doc.create_tree(&zone, Layer::N).unwrap();
    let entity = doc.create_child(nroot, None).unwrap();

    assert!(matches!(
        doc.shift_before_node(nodes[0], tnode, ShiftMode::WithSubtree),
        Err(TreeError::DifferentTrees { .. })
    ));
    assert!(matches!(
        doc.shift_before_node(entity, nroot, ShiftMode::WithSubtree),
        Err(TreeError::NotOrdered(_))
    ));
}

#[test]
fn neighbours_in_the_order() {
    let (mut doc, root, nodes) = flat_sentence(&["a", "b", "c"]);
    doc.set_parent(nodes[0], nodes[1]).unwrap();
    doc.set_parent(nodes[2], nodes[1]).unwrap();

    assert_eq!(doc.next_node(nodes[0]), Some(nodes[1]));
    assert_eq!(doc.prev_node(nodes[2]), Some(nodes[1]));
    assert_eq!(doc.prev_node(nodes[0]), None);
    assert!(doc.is_first_node(nodes[0]));
    assert!(doc.is_last_node(nodes[2]));
    assert!(!doc.is_last_node(nodes[1]));

    assert_eq!(doc.is_right_child(nodes[2]), Some(true));
    assert_eq!(doc.is_right_child(nodes[0]), Some(false));
    assert_eq!(doc.is_right_child(root), None);

    assert_eq!(
        doc.children(nodes[1], NodeFilter::new().preceding()),
        vec![nodes[0]]
    );
    assert_eq!(
        doc.children(nodes[1], NodeFilter::new().following().add_self()),
        vec![nodes[2]]
    );
}

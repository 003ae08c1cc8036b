use crate::{Document, Layer, NodeId};

fn clause_node(doc: &mut Document, parent: NodeId, clause: Option<i64>, functor: &str, is_member: bool) -> NodeId {
    let node = doc.create_child(parent, None).unwrap();
    if let Some(clause) = clause {
        doc.set_attr(node, "clause_number", clause).unwrap();
    }
    doc.set_attr(node, "functor", functor).unwrap();
    doc.set_attr(node, "is_member", is_member).unwrap();
    node
}

fn t_tree() -> (Document, NodeId) {
    let mut doc = Document::new();
    let bundle = doc.create_bundle();
    let zone = doc.create_zone(bundle, "cs", "").unwrap();
    let root = doc.create_tree(&zone, Layer::T).unwrap();
    (doc, root)
}

#[test]
fn climbs_to_the_top_of_the_clause() {
    let (mut doc, root) = t_tree();
    let main = clause_node(&mut doc, root, Some(1), "PRED", false);
    let object = clause_node(&mut doc, main, Some(1), "PAT", false);
    let relative = clause_node(&mut doc, object, Some(2), "RSTR", false);
    let inner = clause_node(&mut doc, relative, Some(2), "ACT", false);

    assert_eq!(doc.get_clause_root(object), main);
    assert_eq!(doc.get_clause_root(main), main);
    assert_eq!(doc.get_clause_root(inner), relative);
    assert_eq!(doc.clause_number(inner), Some(2));
}

#[test]
fn shared_modifier_belongs_to_a_coordinated_clause() {
    // two coordinated predicates sharing an actor
    let (mut doc, root) = t_tree();
    let coord = clause_node(&mut doc, root, None, "CONJ", false);
    let first = clause_node(&mut doc, coord, Some(1), "PRED", true);
    clause_node(&mut doc, coord, Some(2), "PRED", true);
    let shared = clause_node(&mut doc, coord, Some(1), "ACT", false);

    assert_eq!(doc.get_clause_root(shared), first);
}

#[test]
fn undefined_clause_number_is_its_own_root() {
    let (mut doc, root) = t_tree();
    let node = clause_node(&mut doc, root, None, "PRED", false);
    assert_eq!(doc.get_clause_root(node), node);
}

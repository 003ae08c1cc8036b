//! Reference attributes and the backindex.

use crate::{Alignment, AttrValue, Document, Layer, NodeId, ZoneRef};

struct Sentence {
    doc: Document,
    zone: ZoneRef,
    aroot: NodeId,
    troot: NodeId,
}

fn sentence() -> Sentence {
    let mut doc = Document::new();
    let bundle = doc.create_bundle();
    let zone = doc.create_zone(bundle, "cs", "").unwrap();
    let aroot = doc.create_tree(&zone, Layer::A).unwrap();
    let troot = doc.create_tree(&zone, Layer::T).unwrap();
    Sentence {
        doc,
        zone,
        aroot,
        troot,
    }
}

#[test]
fn backrefs_follow_every_write() {
    let Sentence { mut doc, troot, .. } = sentence();
    let pronoun = doc.create_child(troot, None).unwrap();
    let first = doc.create_child(troot, None).unwrap();
    let second = doc.create_child(troot, None).unwrap();

    doc.set_coref_text_nodes(pronoun, &[first]).unwrap();
    assert_eq!(doc.get_referencing_nodes(first, "coref_text.rf"), vec![pronoun]);

    doc.set_coref_text_nodes(pronoun, &[second]).unwrap();
    assert!(doc.get_referencing_nodes(first, "coref_text.rf").is_empty());
    assert_eq!(doc.get_referencing_nodes(second, "coref_text.rf"), vec![pronoun]);

    // plain attribute writes are tracked the same way
    let id = doc[first].id().to_string();
    doc.set_attr(pronoun, "coref_text.rf", vec![id]).unwrap();
    assert_eq!(doc.get_referencing_nodes(first, "coref_text.rf"), vec![pronoun]);
    assert!(doc.get_referencing_nodes(second, "coref_text.rf").is_empty());

    doc.clear_attr(pronoun, "coref_text.rf").unwrap();
    assert!(doc.get_referencing_nodes(first, "coref_text.rf").is_empty());
    assert!(doc.backrefs().is_empty());
}

#[test]
fn nested_lexical_links_are_indexed() {
    let Sentence {
        mut doc,
        aroot,
        troot,
        ..
    } = sentence();
    let word = doc.create_child(aroot, None).unwrap();
    let prep = doc.create_child(aroot, None).unwrap();
    let tnode = doc.create_child(troot, None).unwrap();

    doc.set_lex_anode(tnode, Some(word)).unwrap();
    doc.add_aux_anodes(tnode, &[prep]).unwrap();
    assert_eq!(doc.lex_anode(tnode), Some(word));
    assert_eq!(doc.anodes(tnode), vec![word, prep]);
    assert_eq!(doc.get_referencing_nodes(word, "a/lex.rf"), vec![tnode]);
    assert_eq!(doc.get_referencing_nodes(prep, "a/aux.rf"), vec![tnode]);

    // overwriting the whole map replaces both links
    doc.set_attr(tnode, "a", crate::AttrMap::new()).unwrap();
    assert!(doc.get_referencing_nodes(word, "a/lex.rf").is_empty());
    assert!(doc.get_referencing_nodes(prep, "a/aux.rf").is_empty());
    assert!(doc.anodes(tnode).is_empty());
}

#[test]
fn aux_links_can_be_added_and_removed() {
    let Sentence {
        mut doc,
        aroot,
        troot,
        ..
    } = sentence();
    let tnode = doc.create_child(troot, None).unwrap();
    let aux: Vec<NodeId> = (0..3).map(|_| doc.create_child(aroot, None).unwrap()).collect();

    doc.add_aux_anodes(tnode, &aux[..2]).unwrap();
    doc.add_aux_anodes(tnode, &aux[1..]).unwrap();
    assert_eq!(doc.aux_anodes(tnode), aux);

    doc.remove_aux_anodes(tnode, &aux[..2]).unwrap();
    assert_eq!(doc.aux_anodes(tnode), vec![aux[2]]);
    assert!(doc.get_referencing_nodes(aux[0], "a/aux.rf").is_empty());

    doc.remove_aux_anodes(tnode, &aux[2..]).unwrap();
    assert_eq!(doc.get_attr(tnode, "a/aux.rf"), None);
}

#[test]
fn alignment_has_its_own_index() {
    let mut doc = Document::new();
    let bundle = doc.create_bundle();
    let cs = doc.create_zone(bundle, "cs", "").unwrap();
    let en = doc.create_zone(bundle, "en", "").unwrap();
    let cs_root = doc.create_tree(&cs, Layer::A).unwrap();
    let en_root = doc.create_tree(&en, Layer::A).unwrap();
    let pes = doc.create_child(cs_root, None).unwrap();
    let dog = doc.create_child(en_root, None).unwrap();

    doc.add_alignment(pes, dog, Some("int")).unwrap();
    assert_eq!(doc.aligned_nodes(pes), vec![dog]);
    assert_eq!(doc.get_referencing_nodes(dog, "alignment"), vec![pes]);
    assert_eq!(
        doc[pes].alignment(),
        &[Alignment::new(doc[dog].id()).with_kind("int")]
    );

    let dog_id = doc[dog].id().to_string();
    doc.remove_reference(pes, "alignment", &dog_id).unwrap();
    assert!(doc.aligned_nodes(pes).is_empty());
    assert!(doc.get_referencing_nodes(dog, "alignment").is_empty());
}

#[test]
fn referenced_ids_and_removal() {
    let Sentence {
        mut doc,
        aroot,
        troot,
        ..
    } = sentence();
    let word = doc.create_child(aroot, None).unwrap();
    let tnode = doc.create_child(troot, None).unwrap();
    let antecedent = doc.create_child(troot, None).unwrap();
    doc.set_lex_anode(tnode, Some(word)).unwrap();
    doc.set_coref_gram_nodes(tnode, &[antecedent]).unwrap();

    let refs = doc.get_referenced_ids(tnode);
    assert_eq!(refs["a/lex.rf"], vec![doc[word].id().to_string()]);
    assert_eq!(refs["coref_gram.rf"], vec![doc[antecedent].id().to_string()]);

    let antecedent_id = doc[antecedent].id().to_string();
    doc.remove_reference(tnode, "coref_gram.rf", &antecedent_id).unwrap();
    assert!(doc.coref_gram_nodes(tnode).is_empty());

    // removing the referencing node drops its outgoing entries
    doc.remove(tnode).unwrap();
    assert!(doc.get_referencing_nodes(word, "a/lex.rf").is_empty());
    assert!(doc.backrefs().is_empty());
}

#[test]
fn removing_a_referenced_node_leaves_the_reference() {
    super::init_tracing();
    let Sentence {
        mut doc,
        aroot,
        troot,
        ..
    } = sentence();
    let word = doc.create_child(aroot, None).unwrap();
    let tnode = doc.create_child(troot, None).unwrap();
    doc.set_lex_anode(tnode, Some(word)).unwrap();
    let word_id = doc[word].id().to_string();

    doc.remove(word).unwrap();
    // the caller is responsible for the dangling id
    assert_eq!(
        doc.get_attr(tnode, "a/lex.rf"),
        Some(AttrValue::Str(word_id.clone()))
    );
    assert_eq!(doc.lex_anode(tnode), None);
    assert_eq!(doc.get_backref("a/lex.rf", &word_id).len(), 1);
}

#[test]
fn manual_backref_registration() {
    let Sentence { mut doc, zone, .. } = sentence();
    assert!(doc.has_tree(&zone, Layer::T));

    doc.index_backref("src.rf", "n1", &["n2", "n3"]);
    assert_eq!(doc.get_backref("src.rf", "n2"), vec!["n1".to_string()]);
    doc.remove_backref("src.rf", "n1", &["n2"]);
    assert!(doc.get_backref("src.rf", "n2").is_empty());
    assert_eq!(doc.get_backref("src.rf", "n3"), vec!["n1".to_string()]);
}

#[test]
fn morphcat_reset() {
    let Sentence { mut doc, aroot, .. } = sentence();
    let word = doc.create_child(aroot, None).unwrap();
    doc.set_morphcat(word, "pos", "N").unwrap();
    doc.reset_morphcat(word).unwrap();
    assert_eq!(doc.morphcat(word, "pos").as_deref(), Some("."));
    assert_eq!(doc.morphcat(word, "possgender").as_deref(), Some("."));
}

#[test]
fn aux_edits_keep_links_to_removed_nodes() {
    let Sentence {
        mut doc,
        aroot,
        troot,
        ..
    } = sentence();
    let tnode = doc.create_child(troot, None).unwrap();
    let aux: Vec<NodeId> = (0..3).map(|_| doc.create_child(aroot, None).unwrap()).collect();
    let gone_id = doc[aux[0]].id().to_string();
    let kept_id = doc[aux[1]].id().to_string();
    let added_id = doc[aux[2]].id().to_string();

    doc.add_aux_anodes(tnode, &aux[..2]).unwrap();
    doc.remove(aux[0]).unwrap();

    doc.add_aux_anodes(tnode, &aux[2..]).unwrap();
    assert_eq!(
        doc.get_attr(tnode, "a/aux.rf"),
        Some(AttrValue::from(vec![gone_id.clone(), kept_id, added_id.clone()]))
    );

    doc.remove_aux_anodes(tnode, &aux[1..2]).unwrap();
    assert_eq!(
        doc.get_attr(tnode, "a/aux.rf"),
        Some(AttrValue::from(vec![gone_id, added_id]))
    );
    assert_eq!(doc.aux_anodes(tnode), vec![aux[2]]);
}

#[test]
fn interset_features() {
    let Sentence { mut doc, aroot, .. } = sentence();
    let word = doc.create_child(aroot, None).unwrap();
    doc.set_iset(word, "pos", "noun").unwrap();
    doc.set_attr(word, "iset/gender", "fem").unwrap();
    assert_eq!(doc.iset(word, "pos").as_deref(), Some("noun"));
    assert_eq!(doc.get_str(word, "iset/gender").as_deref(), Some("fem"));
    assert_eq!(doc.iset(word, "case"), None);
    assert!(doc.morphcat(word, "pos").is_none());
}

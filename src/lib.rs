#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]
//! Multi-layer linguistic trees.
//!
//! A [`Document`] holds, for every sentence, parallel trees on several
//! annotation layers: surface syntax ([`ANode`]), deep syntax ([`TNode`]),
//! named entities, phrase structure and AMR graphs. All nodes live in one
//! arena owned by the document and are addressed by [`NodeId`] handles.
//! Edits go through the document so that the id index, the reference
//! backindex, word order and AMR variable tables stay consistent.
//!
//! ```
//! use layered_treex::{Document, Layer, NodeFilter};
//!
//! let mut doc = Document::new();
//! let bundle = doc.create_bundle();
//! let zone = doc.create_zone(bundle, "cs", "").unwrap();
//! let root = doc.create_tree(&zone, Layer::T).unwrap();
//!
//! let verb = doc.create_child(root, None).unwrap();
//! doc.set_attr(verb, "functor", "PRED").unwrap();
//! let coord = doc.create_child(verb, None).unwrap();
//! doc.set_attr(coord, "functor", "CONJ").unwrap();
//! for _ in 0..2 {
//!     let member = doc.create_child(coord, None).unwrap();
//!     doc.set_attr(member, "functor", "ACT").unwrap();
//!     doc.set_attr(member, "is_member", true).unwrap();
//! }
//!
//! // the coordination is transparent for effective children
//! let echildren = doc.get_echildren(verb, false, NodeFilter::new());
//! assert_eq!(echildren.len(), 2);
//! assert!(!echildren.contains(&coord));
//! ```

mod amr;
mod attr;
mod backref;
mod block;
mod clause;
mod config;
mod data;
mod display;
mod document;
mod effective;
mod error;
mod layer;
mod links;
mod node;
mod ordering;

pub use amr::{letter_for_concept, split_varname, COREF};
pub use attr::{Alignment, AttrField, AttrMap, AttrType, AttrValue};
pub use backref::{BackrefIndex, ALIGNMENT};
pub use block::Block;
pub use config::DocumentConfig;
pub use data::{BundleData, DocumentData, NodeRecord, TreeData, ZoneData};
pub use display::TreeDisplay;
pub use document::{Bundle, Document, NodeEntry, NodeId, Zone, ZoneRef};
pub use error::{TreeError, TreeResult};
pub use layer::{
    ANode, AmrNode, AmrNodeType, AttrSchema, EffectiveRelations, InClause, Layer, NNode, NodeKind,
    Ordered, PNode, TNode, COAP_FUNCTORS, MORPHCAT_MEMBERS,
};
pub use node::{NodeFilter, Position};
pub use ordering::ShiftMode;

//! Error types for tree and document operations.
//!
//! Structural integrity violations (cycles, foreign nodes, contradictory
//! reordering) are reported here and always propagate to the caller.
//! Incomplete annotation is never an error: the effective-relations and
//! clause layers log a warning and fall back instead.

use thiserror::Error;

use crate::layer::Layer;

/// Errors that can occur while building or editing a document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Assigning the parent would make a node its own ancestor.
    #[error("attempt to create a cycle: {parent} is {node} or one of its descendants")]
    Cycle { node: String, parent: String },

    /// The node handle belongs to another document.
    #[error("cannot move nodes across documents: {node}")]
    CrossDocument { node: String },

    /// Reordering a node relative to its own descendant without excluding children.
    #[error("{target} is a descendant of {node}; reorder without its children instead")]
    ShiftIntoSubtree { node: String, target: String },

    /// Reordering relative to a node of another tree.
    #[error("{node} and {target} are not in the same tree")]
    DifferentTrees { node: String, target: String },

    /// A node with this id is already indexed in the document.
    #[error("duplicate node id: {0}")]
    DuplicateId(String),

    /// The id or handle does not resolve to a live node.
    #[error("unknown node: {0}")]
    UnknownNode(String),

    /// The attribute is not declared for this kind of node.
    #[error("{layer} nodes have no attribute {attr:?}")]
    UnknownAttr { layer: Layer, attr: String },

    /// The value could not be coerced to the declared attribute type.
    #[error("attribute {attr:?} expects {expected}, got {found}")]
    AttrType {
        attr: String,
        expected: &'static str,
        found: String,
    },

    /// An ordering operation was requested on a node without an order key.
    #[error("node {0} is not ordered")]
    NotOrdered(String),

    /// The zone already holds a tree on this layer.
    #[error("cannot create {layer} tree in zone {zone}: tree exists")]
    TreeExists { layer: Layer, zone: String },

    /// No zone with this language and selector in the bundle.
    #[error("bundle {bundle} has no zone {zone}")]
    MissingZone { bundle: usize, zone: String },

    /// The zone holds no tree on this layer.
    #[error("zone {zone} has no {layer} tree")]
    MissingTree { layer: Layer, zone: String },

    /// Serialized document data could not be read.
    #[error("failed to load document data: {0}")]
    Load(String),
}

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;

//! Processing passes over a document.
//!
//! A [`Block`] is one transformation pass. The default methods walk the
//! document from bundles down to single nodes, so an implementation only
//! overrides the level it works at:
//!
//! ```
//! use layered_treex::{Block, Document, Layer, NodeId, TreeResult};
//!
//! struct Lowercase;
//!
//! impl Block for Lowercase {
//!     fn language(&self) -> &str {
//!         "en"
//!     }
//!
//!     fn layers(&self) -> &[Layer] {
//!         &[Layer::A]
//!     }
//!
//!     fn process_node(&self, doc: &mut Document, node: NodeId) -> TreeResult<()> {
//!         if let Some(form) = doc.get_str(node, "form") {
//!             doc.set_attr(node, "form", form.to_lowercase())?;
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let mut doc = Document::new();
//! let bundle = doc.create_bundle();
//! let zone = doc.create_zone(bundle, "en", "").unwrap();
//! let root = doc.create_tree(&zone, Layer::A).unwrap();
//! let word = doc.create_child(root, None).unwrap();
//! doc.set_attr(word, "form", "Hello").unwrap();
//!
//! let doc = doc.run_block(&Lowercase).unwrap();
//! assert_eq!(doc.get_str(word, "form").as_deref(), Some("hello"));
//! ```

use tracing::debug;

use crate::document::{Document, NodeId, ZoneRef};
use crate::error::TreeResult;
use crate::layer::Layer;
use crate::node::NodeFilter;

pub trait Block {
    /// Language of the zone this block processes in every bundle.
    fn language(&self) -> &str;

    fn selector(&self) -> &str {
        ""
    }

    /// Layers visited by [`process_zone`](Block::process_zone).
    fn layers(&self) -> &[Layer] {
        &Layer::ALL
    }

    fn process_document(&self, doc: &mut Document) -> TreeResult<()> {
        for bundle in 0..doc.bundles().len() {
            self.process_bundle(doc, bundle)?;
        }
        Ok(())
    }

    /// Fails with `MissingZone` if the bundle has no zone for
    /// [`language`](Block::language) and [`selector`](Block::selector).
    fn process_bundle(&self, doc: &mut Document, bundle: usize) -> TreeResult<()> {
        let zone = doc.zone_ref(bundle, self.language(), self.selector())?;
        self.process_zone(doc, &zone)
    }

    fn process_zone(&self, doc: &mut Document, zone: &ZoneRef) -> TreeResult<()> {
        for layer in self.layers() {
            if doc.has_tree(zone, *layer) {
                let root = doc.tree(zone, *layer)?;
                self.process_tree(doc, root)?;
            }
        }
        Ok(())
    }

    /// Visits the nodes of the tree in order. The technical root is only
    /// visited on the p-layer, where it is a real constituent.
    fn process_tree(&self, doc: &mut Document, root: NodeId) -> TreeResult<()> {
        let mut filter = NodeFilter::new().ordered();
        if doc.get(root).map(|entry| entry.layer()) == Some(Layer::P) {
            filter = filter.add_self();
        }
        for node in doc.descendants(root, filter) {
            // earlier nodes may have removed this one
            if doc.contains(node) {
                self.process_node(doc, node)?;
            }
        }
        Ok(())
    }

    fn process_node(&self, _doc: &mut Document, _node: NodeId) -> TreeResult<()> {
        Ok(())
    }
}

impl Document {
    /// Run one processing pass over the whole document.
    pub fn run_block<B: Block>(mut self, block: &B) -> TreeResult<Self> {
        debug!(language = block.language(), selector = block.selector(), "running block");
        block.process_document(&mut self)?;
        Ok(self)
    }
}

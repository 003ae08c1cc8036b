//! Documents, bundles and zones, and the node arena they own.
//!
//! A [`Document`] is a sequence of [`Bundle`]s (one per sentence), each
//! holding [`Zone`]s keyed by language and selector, each holding at most
//! one tree root per [`Layer`]. All nodes of all trees live in a single
//! arena inside the document and are addressed by [`NodeId`] handles; the
//! document also owns the string-id index and the reference backindex, so
//! nothing can create, move or destroy a node without keeping both current.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::ops::Index;
use std::sync::atomic::{AtomicU32, Ordering as AtomicOrdering};

use tracing::debug;

use crate::attr::{AttrField, AttrMap, AttrValue, Alignment};
use crate::backref::{BackrefIndex, ALIGNMENT};
use crate::config::DocumentConfig;
use crate::error::{TreeError, TreeResult};
use crate::layer::{Layer, NodeKind};

static NEXT_DOCUMENT_TAG: AtomicU32 = AtomicU32::new(1);

/// Handle of a node in a [`Document`] arena.
///
/// Handles are cheap to copy and stay valid until the node is removed.
/// Slots are never reused, so a stale handle never aliases another node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    doc: u32,
    slot: u32,
}

/// Address of a zone: bundle index plus language and selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoneRef {
    /// 0-based position of the bundle in the document.
    pub bundle: usize,
    pub language: String,
    pub selector: String,
}

impl ZoneRef {
    pub fn new(bundle: usize, language: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            bundle,
            language: language.into(),
            selector: selector.into(),
        }
    }

    /// `language`, or `language_selector` if the selector is not empty.
    pub fn language_and_selector(&self) -> String {
        language_and_selector(&self.language, &self.selector)
    }
}

impl fmt::Display for ZoneRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.language_and_selector(), self.bundle + 1)
    }
}

fn language_and_selector(language: &str, selector: &str) -> String {
    if selector.is_empty() {
        language.to_string()
    } else {
        format!("{}_{}", language, selector)
    }
}

/// One sentence in one language/selector variant, with its trees.
#[derive(Debug, Clone)]
pub struct Zone {
    language: String,
    selector: String,
    pub sentence: Option<String>,
    trees: BTreeMap<Layer, NodeId>,
    pub wild: AttrMap,
}

impl Zone {
    fn new(language: &str, selector: &str) -> Self {
        Self {
            language: language.to_string(),
            selector: selector.to_string(),
            sentence: None,
            trees: BTreeMap::new(),
            wild: AttrMap::new(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn language_and_selector(&self) -> String {
        language_and_selector(&self.language, &self.selector)
    }

    pub fn tree(&self, layer: Layer) -> Option<NodeId> {
        self.trees.get(&layer).copied()
    }

    pub fn has_tree(&self, layer: Layer) -> bool {
        self.trees.contains_key(&layer)
    }

    /// Tree roots of this zone, in layer order.
    pub fn trees(&self) -> impl Iterator<Item = (Layer, NodeId)> + '_ {
        self.trees.iter().map(|(layer, root)| (*layer, *root))
    }
}

/// All zones pertaining to one sentence.
#[derive(Debug, Clone)]
pub struct Bundle {
    ord: usize,
    zones: BTreeMap<(String, String), Zone>,
    pub wild: AttrMap,
}

impl Bundle {
    /// 1-based position in the document.
    pub fn ord(&self) -> usize {
        self.ord
    }

    pub fn zone(&self, language: &str, selector: &str) -> Option<&Zone> {
        self.zones.get(&(language.to_string(), selector.to_string()))
    }

    pub fn has_zone(&self, language: &str, selector: &str) -> bool {
        self.zone(language, selector).is_some()
    }

    /// All zones, sorted by language and selector.
    pub fn zones(&self) -> impl Iterator<Item = &Zone> {
        self.zones.values()
    }
}

/// A node as stored in the arena.
///
/// Structure (`parent`, `children`) and identity are read-only here; use the
/// [`Document`] methods to change them so the indexes stay consistent.
#[derive(Debug, Clone)]
pub struct NodeEntry {
    pub(crate) id: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) zone: ZoneRef,
    pub(crate) alignment: Vec<Alignment>,
    pub(crate) wild: AttrMap,
    pub(crate) kind: NodeKind,
}

impl NodeEntry {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in the order they were attached.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn zone(&self) -> &ZoneRef {
        &self.zone
    }

    pub fn alignment(&self) -> &[Alignment] {
        &self.alignment
    }

    pub fn wild(&self) -> &AttrMap {
        &self.wild
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn layer(&self) -> Layer {
        self.kind.layer()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Ids this node references, per reference attribute.
    ///
    /// Alignment links are listed under `"alignment"`. Attributes without
    /// any referenced id are omitted.
    pub fn referenced_ids(&self) -> BTreeMap<String, Vec<String>> {
        let mut refs = BTreeMap::new();
        let aligned: Vec<String> = self
            .alignment
            .iter()
            .map(|link| link.counterpart.clone())
            .collect();
        if !aligned.is_empty() {
            refs.insert(ALIGNMENT.to_string(), aligned);
        }
        for attr in self.kind.ref_attrs() {
            let ids = self.ref_attr_ids(attr);
            if !ids.is_empty() {
                refs.insert(attr.to_string(), ids);
            }
        }
        refs
    }

    /// Ids held by one reference attribute or `map/key` path.
    pub(crate) fn ref_attr_ids(&self, attr: &str) -> Vec<String> {
        let (head, path) = crate::attr::split_path(attr);
        self.kind
            .get_attr(head)
            .as_ref()
            .and_then(|value| crate::attr::lookup_path(value, &path))
            .map(AttrValue::referenced_ids)
            .unwrap_or_default()
    }
}

/// A document: bundles of zones of trees, plus the node arena and indexes.
///
/// Node handles are tied to the document that issued them, so a document
/// cannot be cloned:
///
/// ```compile_fail
/// let doc = layered_treex::Document::new();
/// let copy = doc.clone();
/// ```
#[derive(Debug)]
pub struct Document {
    tag: u32,
    pub filename: Option<String>,
    pub(crate) bundles: Vec<Bundle>,
    pub(crate) nodes: Vec<Option<NodeEntry>>,
    index: HashMap<String, NodeId>,
    pub(crate) backrefs: BackrefIndex,
    last_node_number: u64,
    pub(crate) config: DocumentConfig,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self::with_config(DocumentConfig::default())
    }

    pub fn with_config(config: DocumentConfig) -> Self {
        Self {
            tag: NEXT_DOCUMENT_TAG.fetch_add(1, AtomicOrdering::Relaxed),
            filename: None,
            bundles: Vec::new(),
            nodes: Vec::new(),
            index: HashMap::new(),
            backrefs: BackrefIndex::new(),
            last_node_number: 0,
            config,
        }
    }

    pub fn config(&self) -> &DocumentConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Bundles and zones
    // ------------------------------------------------------------------

    pub fn bundles(&self) -> &[Bundle] {
        &self.bundles
    }

    pub fn bundle(&self, bundle: usize) -> Option<&Bundle> {
        self.bundles.get(bundle)
    }

    pub fn bundle_mut(&mut self, bundle: usize) -> Option<&mut Bundle> {
        self.bundles.get_mut(bundle)
    }

    /// Append an empty bundle and return its index.
    pub fn create_bundle(&mut self) -> usize {
        let ord = self.bundles.len() + 1;
        self.bundles.push(Bundle {
            ord,
            zones: BTreeMap::new(),
            wild: AttrMap::new(),
        });
        debug!(bundle = ord, "created bundle");
        ord - 1
    }

    /// Create an empty zone, replacing (and removing the trees of) any
    /// zone already stored under the same language and selector.
    pub fn create_zone(
        &mut self,
        bundle: usize,
        language: &str,
        selector: &str,
    ) -> TreeResult<ZoneRef> {
        let zone = ZoneRef::new(bundle, language, selector);
        let key = (language.to_string(), selector.to_string());
        let old_roots: Vec<NodeId> = match self.bundles.get(bundle) {
            Some(b) => b
                .zones
                .get(&key)
                .map(|old| old.trees.values().copied().collect())
                .unwrap_or_default(),
            None => {
                return Err(TreeError::MissingZone {
                    bundle,
                    zone: zone.language_and_selector(),
                })
            }
        };
        for root in old_roots {
            self.remove(root)?;
        }
        if let Some(b) = self.bundles.get_mut(bundle) {
            b.zones.insert(key, Zone::new(language, selector));
        }
        Ok(zone)
    }

    pub fn get_or_create_zone(
        &mut self,
        bundle: usize,
        language: &str,
        selector: &str,
    ) -> TreeResult<ZoneRef> {
        if self.has_zone(bundle, language, selector) {
            return Ok(ZoneRef::new(bundle, language, selector));
        }
        self.create_zone(bundle, language, selector)
    }

    pub fn has_zone(&self, bundle: usize, language: &str, selector: &str) -> bool {
        self.bundles
            .get(bundle)
            .map_or(false, |b| b.has_zone(language, selector))
    }

    /// Address of an existing zone.
    pub fn zone_ref(&self, bundle: usize, language: &str, selector: &str) -> TreeResult<ZoneRef> {
        if self.has_zone(bundle, language, selector) {
            Ok(ZoneRef::new(bundle, language, selector))
        } else {
            Err(TreeError::MissingZone {
                bundle,
                zone: language_and_selector(language, selector),
            })
        }
    }

    /// Addresses of all zones of a bundle.
    pub fn all_zones(&self, bundle: usize) -> Vec<ZoneRef> {
        self.bundles
            .get(bundle)
            .map(|b| {
                b.zones
                    .keys()
                    .map(|(language, selector)| ZoneRef::new(bundle, language, selector))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn zone(&self, zone: &ZoneRef) -> Option<&Zone> {
        self.bundles
            .get(zone.bundle)
            .and_then(|b| b.zone(&zone.language, &zone.selector))
    }

    pub fn zone_mut(&mut self, zone: &ZoneRef) -> Option<&mut Zone> {
        self.bundles
            .get_mut(zone.bundle)?
            .zones
            .get_mut(&(zone.language.clone(), zone.selector.clone()))
    }

    fn existing_zone(&self, zone: &ZoneRef) -> TreeResult<&Zone> {
        self.zone(zone).ok_or_else(|| TreeError::MissingZone {
            bundle: zone.bundle,
            zone: zone.language_and_selector(),
        })
    }

    // ------------------------------------------------------------------
    // Trees
    // ------------------------------------------------------------------

    /// Create an empty tree on `layer` in the zone and return its root.
    pub fn create_tree(&mut self, zone: &ZoneRef, layer: Layer) -> TreeResult<NodeId> {
        self.create_tree_with(zone, layer, &AttrMap::new())
    }

    /// Create a tree root from loader data (`id` and declared attributes).
    ///
    /// The root id defaults to `{layer}-node-{language_selector}-s{bundle}-root`
    /// and an ordered root without `ord` gets `0`.
    pub fn create_tree_with(
        &mut self,
        zone: &ZoneRef,
        layer: Layer,
        data: &AttrMap,
    ) -> TreeResult<NodeId> {
        if self.existing_zone(zone)?.has_tree(layer) {
            return Err(TreeError::TreeExists {
                layer,
                zone: zone.to_string(),
            });
        }
        let id = match data.get("id").and_then(AttrValue::as_str) {
            Some(id) => id.to_string(),
            None => format!(
                "{}-node-{}-s{}-root",
                layer,
                zone.language_and_selector(),
                zone.bundle + 1
            ),
        };

        let mut kind = NodeKind::from_data(layer, data)?;
        if let Some(ordered) = kind.ordered_mut() {
            if ordered.ord().is_none() {
                ordered.set_ord(0);
            }
        }
        let entry = NodeEntry {
            id,
            parent: None,
            children: Vec::new(),
            zone: zone.clone(),
            alignment: Vec::<Alignment>::from_attr(ALIGNMENT, data.get(ALIGNMENT).cloned())?,
            wild: AttrMap::from_attr("wild", data.get("wild").cloned())?,
            kind,
        };
        let root = self.insert_node(entry)?;
        if let Some(z) = self.zone_mut(zone) {
            z.trees.insert(layer, root);
        }
        debug!(%layer, zone = %zone, root = %self.describe(root), "created tree");
        Ok(root)
    }

    /// Root of the zone's tree on `layer`.
    pub fn tree(&self, zone: &ZoneRef, layer: Layer) -> TreeResult<NodeId> {
        self.existing_zone(zone)?
            .tree(layer)
            .ok_or_else(|| TreeError::MissingTree {
                layer,
                zone: zone.to_string(),
            })
    }

    pub fn has_tree(&self, zone: &ZoneRef, layer: Layer) -> bool {
        self.zone(zone).map_or(false, |z| z.has_tree(layer))
    }

    pub fn sentence(&self, zone: &ZoneRef) -> Option<&str> {
        self.zone(zone).and_then(|z| z.sentence.as_deref())
    }

    pub fn set_sentence(&mut self, zone: &ZoneRef, sentence: Option<String>) -> TreeResult<()> {
        let bundle = zone.bundle;
        let name = zone.language_and_selector();
        let z = self
            .zone_mut(zone)
            .ok_or(TreeError::MissingZone { bundle, zone: name })?;
        z.sentence = sentence;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Node lookup
    // ------------------------------------------------------------------

    /// Handle of the node with the given string id.
    pub fn node_by_id(&self, id: &str) -> Option<NodeId> {
        self.index.get(id).copied()
    }

    /// Like [`node_by_id`](Self::node_by_id), failing with `UnknownNode`.
    pub fn node(&self, id: &str) -> TreeResult<NodeId> {
        self.node_by_id(id)
            .ok_or_else(|| TreeError::UnknownNode(id.to_string()))
    }

    pub fn get(&self, node: NodeId) -> Option<&NodeEntry> {
        if node.doc != self.tag {
            return None;
        }
        self.nodes.get(node.slot as usize)?.as_ref()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.get(node).is_some()
    }

    /// String id of a live node.
    pub fn id(&self, node: NodeId) -> Option<&str> {
        self.get(node).map(NodeEntry::id)
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub(crate) fn entry(&self, node: NodeId) -> TreeResult<&NodeEntry> {
        self.get(node)
            .ok_or_else(|| TreeError::UnknownNode(self.describe(node)))
    }

    pub(crate) fn entry_mut(&mut self, node: NodeId) -> TreeResult<&mut NodeEntry> {
        if node.doc != self.tag {
            return Err(TreeError::UnknownNode(format!("{:?}", node)));
        }
        self.nodes
            .get_mut(node.slot as usize)
            .and_then(Option::as_mut)
            .ok_or_else(|| TreeError::UnknownNode(format!("{:?}", node)))
    }

    pub(crate) fn kind_mut(&mut self, node: NodeId) -> TreeResult<&mut NodeKind> {
        Ok(&mut self.entry_mut(node)?.kind)
    }

    /// Readable name of a handle for messages: its id, or the raw handle if stale.
    pub(crate) fn describe(&self, node: NodeId) -> String {
        match self.get(node) {
            Some(entry) => entry.id.clone(),
            None => format!("{:?}", node),
        }
    }

    pub(crate) fn owns(&self, node: NodeId) -> bool {
        node.doc == self.tag
    }

    // ------------------------------------------------------------------
    // Arena and id index
    // ------------------------------------------------------------------

    /// Next generated id: `{layer}-node-{language_selector}-s{bundle}-n{counter}`.
    pub(crate) fn generate_id(&mut self, layer: Layer, zone: &ZoneRef) -> String {
        loop {
            self.last_node_number += 1;
            let id = format!(
                "{}-node-{}-s{}-n{}",
                layer,
                zone.language_and_selector(),
                zone.bundle + 1,
                self.last_node_number
            );
            if !self.index.contains_key(&id) {
                return id;
            }
        }
    }

    /// Store a new node, index its id and its outgoing references.
    pub(crate) fn insert_node(&mut self, entry: NodeEntry) -> TreeResult<NodeId> {
        if self.index.contains_key(&entry.id) {
            return Err(TreeError::DuplicateId(entry.id));
        }
        let node = NodeId {
            doc: self.tag,
            slot: self.nodes.len() as u32,
        };
        for (attr, targets) in entry.referenced_ids() {
            self.backrefs.index(&attr, &entry.id, &targets);
        }
        self.index.insert(entry.id.clone(), node);
        self.nodes.push(Some(entry));
        Ok(node)
    }

    /// Drop a node from the arena and the id index, along with its
    /// outgoing backindex entries.
    pub(crate) fn take_node(&mut self, node: NodeId) -> TreeResult<NodeEntry> {
        let entry = self
            .nodes
            .get_mut(node.slot as usize)
            .and_then(Option::take)
            .ok_or_else(|| TreeError::UnknownNode(format!("{:?}", node)))?;
        for (attr, targets) in entry.referenced_ids() {
            self.backrefs.remove(&attr, &entry.id, &targets);
        }
        self.index.remove(&entry.id);
        Ok(entry)
    }

    pub(crate) fn forget_tree(&mut self, zone: &ZoneRef, layer: Layer) {
        if let Some(z) = self.zone_mut(zone) {
            z.trees.remove(&layer);
        }
    }

    // ------------------------------------------------------------------
    // Backreference index
    // ------------------------------------------------------------------

    /// Record that `source` references `targets` through `attr`.
    pub fn index_backref<S: AsRef<str>>(&mut self, attr: &str, source: &str, targets: &[S]) {
        self.backrefs.index(attr, source, targets);
    }

    pub fn remove_backref<S: AsRef<str>>(&mut self, attr: &str, source: &str, targets: &[S]) {
        self.backrefs.remove(attr, source, targets);
    }

    /// Ids of nodes referencing `target` through `attr`.
    pub fn get_backref(&self, attr: &str, target: &str) -> Vec<String> {
        self.backrefs.get(attr, target)
    }

    pub fn backrefs(&self) -> &BackrefIndex {
        &self.backrefs
    }
}

/// Direct access to a live node.
///
/// # Panics
///
/// Panics if the handle is stale or belongs to another document; use
/// [`Document::get`] when that can happen.
impl Index<NodeId> for Document {
    type Output = NodeEntry;

    fn index(&self, node: NodeId) -> &NodeEntry {
        match self.get(node) {
            Some(entry) => entry,
            None => panic!("stale or foreign node handle {:?}", node),
        }
    }
}

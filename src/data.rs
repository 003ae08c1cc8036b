//! Serializable document data, and building documents from it.
//!
//! The layout mirrors the Treex YAML files: a document is a list of
//! bundles, a bundle a list of zones, a zone holds one tree per layer and a
//! tree is its root plus a flat list of nodes, each naming its parent.
//!
//! AMR graphs are traditionally stored as t-trees under a selector
//! starting with `amr` ("TAMR"): the variable and concept share `t_lemma`
//! (`b2/boy`), coreferences go to `coref_text.rf` and the AMR-only flags
//! live in `wild`. [`Document::from_data`] converts such trees on load and
//! [`Document::to_data`] writes them back the same way.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::attr::{AttrField, AttrMap, AttrValue};
use crate::backref::ALIGNMENT;
use crate::config::DocumentConfig;
use crate::document::{Document, NodeId, Zone, ZoneRef};
use crate::error::{TreeError, TreeResult};
use crate::layer::Layer;
use crate::node::NodeFilter;

static TAMR_CONCEPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([a-zA-Z][0-9]*)/(.*)$").expect("Invalid TAMR concept regex"));
static TAMR_VARIABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([a-zA-Z][0-9]*)$").expect("Invalid TAMR variable regex"));

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentData {
    #[serde(default)]
    pub bundles: Vec<BundleData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BundleData {
    #[serde(default)]
    pub zones: Vec<ZoneData>,
    #[serde(default, skip_serializing_if = "AttrMap::is_empty")]
    pub wild: AttrMap,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneData {
    pub language: String,
    #[serde(default)]
    pub selector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atree: Option<TreeData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttree: Option<TreeData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ntree: Option<TreeData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ptree: Option<TreeData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amrtree: Option<TreeData>,
    #[serde(default, skip_serializing_if = "AttrMap::is_empty")]
    pub wild: AttrMap,
}

impl ZoneData {
    pub fn new(language: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            selector: selector.into(),
            ..Self::default()
        }
    }

    /// Stored trees with the layer of their slot.
    fn trees(&self) -> impl Iterator<Item = (Layer, &TreeData)> {
        [
            (Layer::A, &self.atree),
            (Layer::T, &self.ttree),
            (Layer::N, &self.ntree),
            (Layer::P, &self.ptree),
            (Layer::Amr, &self.amrtree),
        ]
        .into_iter()
        .filter_map(|(layer, tree)| tree.as_ref().map(|tree| (layer, tree)))
    }

    fn slot_mut(&mut self, layer: Layer) -> &mut Option<TreeData> {
        match layer {
            Layer::A => &mut self.atree,
            Layer::T => &mut self.ttree,
            Layer::N => &mut self.ntree,
            Layer::P => &mut self.ptree,
            Layer::Amr => &mut self.amrtree,
        }
    }

    fn is_tamr(&self) -> bool {
        self.selector.starts_with("amr")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeData {
    pub root: NodeRecord,
    /// Non-root nodes, each with its `parent_id`.
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "AttrMap::is_empty")]
    pub attrs: AttrMap,
}

impl NodeRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(name.to_string(), value.into());
        self
    }
}

impl DocumentData {
    /// Serialize to a RON string.
    pub fn to_ron_string(&self) -> Result<String, ron::Error> {
        let config = ron::ser::PrettyConfig::new()
            .depth_limit(10)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        ron::ser::to_string_pretty(self, config)
    }

    /// Deserialize from a RON string.
    pub fn from_ron_string(s: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(s)
    }
}

impl Document {
    /// Build a document from data, with the default configuration.
    pub fn from_data(data: &DocumentData) -> TreeResult<Self> {
        Self::from_data_with_config(data, DocumentConfig::default())
    }

    /// Build a document from data.
    ///
    /// Trees are built through the regular Node API: the root first, then
    /// every node under the root in data order, then each node is hung
    /// under its `parent_id`.
    pub fn from_data_with_config(data: &DocumentData, config: DocumentConfig) -> TreeResult<Self> {
        let mut doc = Document::with_config(config);
        for bundle_data in &data.bundles {
            let bundle = doc.create_bundle();
            if let Some(b) = doc.bundle_mut(bundle) {
                b.wild = bundle_data.wild.clone();
            }
            for zone_data in &bundle_data.zones {
                let zone = doc.create_zone(bundle, &zone_data.language, &zone_data.selector)?;
                if let Some(z) = doc.zone_mut(&zone) {
                    z.sentence = zone_data.sentence.clone();
                    z.wild = zone_data.wild.clone();
                }
                for (layer, tree) in zone_data.trees() {
                    if layer == Layer::T && zone_data.is_tamr() {
                        doc.load_tree(&zone, Layer::Amr, tree, true)?;
                    } else {
                        doc.load_tree(&zone, layer, tree, false)?;
                    }
                }
            }
        }
        Ok(doc)
    }

    fn load_tree(&mut self, zone: &ZoneRef, layer: Layer, tree: &TreeData, tamr: bool) -> TreeResult<NodeId> {
        let root_attrs = record_attrs(&tree.root, tamr);
        let root = self.create_tree_with(zone, layer, &root_attrs)?;

        let mut created = Vec::with_capacity(tree.nodes.len());
        for record in &tree.nodes {
            let attrs = record_attrs(record, tamr);
            let node = self.create_child_with(root, Some(&record.id), &attrs)?;
            created.push((node, record.parent_id.as_deref()));
        }
        for (node, parent_id) in created {
            if let Some(parent_id) = parent_id {
                let parent = self.node_by_id(parent_id).ok_or_else(|| {
                    TreeError::Load(format!("node {} has unknown parent {}", self.describe(node), parent_id))
                })?;
                self.set_parent(node, parent)?;
            }
        }
        Ok(root)
    }

    /// Dump the document to data. Does not modify anything.
    pub fn to_data(&self) -> DocumentData {
        let bundles = self
            .bundles
            .iter()
            .map(|bundle| BundleData {
                zones: bundle.zones().map(|zone| self.zone_data(zone)).collect(),
                wild: bundle.wild.clone(),
            })
            .collect();
        DocumentData { bundles }
    }

    fn zone_data(&self, zone: &Zone) -> ZoneData {
        let mut data = ZoneData::new(zone.language(), zone.selector());
        data.sentence = zone.sentence.clone();
        data.wild = zone.wild.clone();
        for (layer, root) in zone.trees() {
            let tamr = layer == Layer::Amr && data.is_tamr() && !zone.has_tree(Layer::T);
            let slot = if tamr { Layer::T } else { layer };
            *data.slot_mut(slot) = Some(self.tree_data(root, tamr));
        }
        data
    }

    fn tree_data(&self, root: NodeId, tamr: bool) -> TreeData {
        let nodes = self
            .descendants(root, NodeFilter::new().ordered())
            .into_iter()
            .map(|node| {
                let mut record = self.node_record(node);
                record.parent_id = self.parent(node).and_then(|p| self.id(p)).map(str::to_string);
                if tamr {
                    amr_to_tamr(&mut record.attrs);
                }
                record
            })
            .collect();
        TreeData {
            root: self.node_record(root),
            nodes,
        }
    }

    /// All set attributes of a node; unset values, `false` and empty
    /// containers are left out.
    fn node_record(&self, node: NodeId) -> NodeRecord {
        let entry = &self[node];
        let mut attrs = AttrMap::new();
        for (name, _) in entry.kind.attr_names() {
            if let Some(value) = entry.kind.get_attr(name) {
                if !value.is_blank() {
                    attrs.insert(name.to_string(), value);
                }
            }
        }
        if let Some(alignment) = entry.alignment.to_attr().filter(|value| !value.is_blank()) {
            attrs.insert(ALIGNMENT.to_string(), alignment);
        }
        if !entry.wild.is_empty() {
            attrs.insert("wild".to_string(), AttrValue::Map(entry.wild.clone()));
        }
        NodeRecord {
            id: entry.id.clone(),
            parent_id: None,
            attrs,
        }
    }
}

fn record_attrs(record: &NodeRecord, tamr: bool) -> AttrMap {
    let mut attrs = record.attrs.clone();
    attrs.insert("id".to_string(), AttrValue::Str(record.id.clone()));
    if tamr {
        tamr_to_amr(&mut attrs);
    }
    attrs
}

fn take_wild(attrs: &mut AttrMap, key: &str) -> Option<AttrValue> {
    match attrs.get_mut("wild") {
        Some(AttrValue::Map(wild)) => wild.remove(key),
        _ => None,
    }
}

fn wild_mut(attrs: &mut AttrMap) -> Option<&mut AttrMap> {
    let wild = attrs
        .entry("wild".to_string())
        .or_insert_with(|| AttrValue::Map(AttrMap::new()));
    match wild {
        AttrValue::Map(map) => Some(map),
        _ => None,
    }
}

/// Rewrite TAMR node attributes (t-layer shaped) into AMR attributes.
fn tamr_to_amr(attrs: &mut AttrMap) {
    if let Some(modifier) = take_wild(attrs, "modifier") {
        attrs.insert("modifier".to_string(), modifier);
    }
    if let Some(AttrValue::Str(t_lemma)) = attrs.remove("t_lemma") {
        if let Some(caps) = TAMR_CONCEPT.captures(&t_lemma) {
            attrs.insert("varname".to_string(), AttrValue::from(&caps[1]));
            attrs.insert("concept".to_string(), AttrValue::from(&caps[2]));
            attrs.insert("nodetype".to_string(), "var".into());
        } else if TAMR_VARIABLE.is_match(&t_lemma) {
            attrs.insert("varname".to_string(), t_lemma.into());
            attrs.insert("nodetype".to_string(), "coref".into());
        } else {
            attrs.insert("concept".to_string(), t_lemma.into());
            attrs.insert("nodetype".to_string(), "const".into());
        }
    }
    if let Some(coref) = attrs.remove("coref_text.rf") {
        attrs.insert("coref.rf".to_string(), coref);
    }
    for flag in ["is_ne_head", "is_ne_subnode"] {
        if let Some(value) = take_wild(attrs, flag) {
            attrs.insert(flag.to_string(), value);
        }
    }
    if matches!(attrs.get("wild"), Some(AttrValue::Map(wild)) if wild.is_empty()) {
        attrs.remove("wild");
    }
    let is_coref = attrs.get("nodetype").and_then(AttrValue::as_str) == Some("coref");
    if is_coref && !attrs.contains_key("coref.rf") {
        warn!(node = ?attrs.get("id"), "coref-type node has no coreference");
    }
}

/// Rewrite AMR node attributes into their TAMR (t-layer shaped) form.
fn amr_to_tamr(attrs: &mut AttrMap) {
    let varname = attrs.remove("varname");
    let concept = attrs.remove("concept");
    match (varname, concept) {
        (Some(varname), Some(concept)) => {
            attrs.insert("t_lemma".to_string(), format!("{}/{}", varname, concept).into());
        }
        (None, Some(concept)) => {
            attrs.insert("t_lemma".to_string(), concept);
        }
        (varname, None) => {
            if let Some(varname) = varname {
                attrs.insert("t_lemma".to_string(), varname);
            }
            if let Some(coref) = attrs.remove("coref.rf") {
                attrs.insert("coref_text.rf".to_string(), coref);
            }
        }
    }
    for key in ["modifier", "is_ne_head", "is_ne_subnode"] {
        if let Some(value) = attrs.remove(key) {
            if let Some(wild) = wild_mut(attrs) {
                wild.insert(key.to_string(), value);
            }
        }
    }
    if attrs.get("nodetype").and_then(AttrValue::as_str) != Some("root") {
        attrs.remove("nodetype");
    }
}

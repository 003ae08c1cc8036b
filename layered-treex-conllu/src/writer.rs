use std::fs;
use std::path::Path;

use layered_treex::{AttrValue, Document, Layer, NodeFilter, NodeId};
use tracing::debug;

use crate::error::{ConlluError, ConlluResult};

const BEFORE_HEAD: [&str; 5] = ["form", "lemma", "upos", "xpos", "feats"];
const AFTER_HEAD: [&str; 3] = ["deprel", "deps", "misc"];

/// Writes the a-trees of one zone per bundle as CoNLL-U.
#[derive(Debug, Clone)]
pub struct ConlluWriter {
    language: String,
    selector: String,
}

impl ConlluWriter {
    pub fn new(language: &str) -> Self {
        Self {
            language: language.to_string(),
            selector: String::new(),
        }
    }

    pub fn selector(mut self, selector: &str) -> Self {
        self.selector = selector.to_string();
        self
    }

    pub fn write_file(&self, doc: &Document, path: impl AsRef<Path>) -> ConlluResult<()> {
        let path = path.as_ref();
        let text = self.write_string(doc)?;
        fs::write(path, text).map_err(|source| ConlluError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    /// Every bundle must have the zone; sentences without nodes are skipped.
    pub fn write_string(&self, doc: &Document) -> ConlluResult<String> {
        let mut out = String::new();
        for bundle in 0..doc.bundles().len() {
            let zone = doc.zone_ref(bundle, &self.language, &self.selector)?;
            let root = doc.tree(&zone, Layer::A)?;
            let nodes = doc.descendants(root, NodeFilter::new().ordered());
            if nodes.is_empty() {
                debug!(bundle, "skipping empty sentence");
                continue;
            }

            let comment = doc
                .zone(&zone)
                .and_then(|z| z.wild.get("comment"))
                .and_then(AttrValue::as_str)
                .map(|comment| comment.trim_end())
                .unwrap_or_default();
            if !comment.is_empty() {
                out.push('#');
                out.push_str(&comment.replace('\n', "\n#"));
                out.push('\n');
            }

            for (i, &node) in nodes.iter().enumerate() {
                write_token(&mut out, doc, i + 1, node);
            }
            out.push('\n');
        }
        Ok(out)
    }
}

fn write_token(out: &mut String, doc: &Document, index: usize, node: NodeId) {
    let column = |name: &str| doc.get_str(node, name).unwrap_or_else(|| "_".to_string());
    let head = doc
        .parent(node)
        .and_then(|parent| doc.ord(parent))
        .map_or_else(|| "_".to_string(), |ord| ord.to_string());

    let mut columns = vec![index.to_string()];
    columns.extend(BEFORE_HEAD.iter().map(|&name| column(name)));
    columns.push(head);
    columns.extend(AFTER_HEAD.iter().map(|&name| column(name)));
    out.push_str(&columns.join("\t"));
    out.push('\n');
}

use std::fs;
use std::path::Path;

use layered_treex::{AttrMap, AttrValue, Document, Layer, NodeId};
use tracing::{debug, warn};

use crate::error::{ConlluError, ConlluResult};

/// Columns after ID, in file order. HEAD sits between `feats` and `deprel`.
const FIELDS: [&str; 8] = [
    "form", "lemma", "upos", "xpos", "feats", "deprel", "deps", "misc",
];
const COLUMNS: usize = 10;
const HEAD: usize = 6;

/// Reads CoNLL-U text into a document, one bundle per sentence.
///
/// Every sentence becomes an a-tree in the zone named by `language` and
/// `selector`. Comment lines are kept in the zone's `wild/comment`.
#[derive(Debug, Clone)]
pub struct ConlluReader {
    language: String,
    selector: String,
}

impl Default for ConlluReader {
    fn default() -> Self {
        Self::new("unk")
    }
}

/// One token line, waiting for its sentence to be complete.
struct Token {
    line: usize,
    head: usize,
    data: AttrMap,
}

#[derive(Default)]
struct Sentence {
    comment: String,
    tokens: Vec<Token>,
}

impl ConlluReader {
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

    pub fn read_file(&self, path: impl AsRef<Path>) -> ConlluResult<Document> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConlluError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut doc = self.read_str(&text)?;
        doc.filename = Some(path.display().to_string());
        Ok(doc)
    }

    pub fn read_str(&self, text: &str) -> ConlluResult<Document> {
        let mut doc = Document::new();
        let mut sentence = Sentence::default();

        for (i, line) in text.lines().enumerate() {
            let line_no = i + 1;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                // blank lines before a sentence are ignored
                if !sentence.tokens.is_empty() {
                    self.flush(&mut doc, std::mem::take(&mut sentence))?;
                }
                continue;
            }
            if let Some(comment) = line.strip_prefix('#') {
                sentence.comment.push_str(comment);
                sentence.comment.push('\n');
                continue;
            }
            if let Some(token) = parse_token(line, line_no)? {
                sentence.tokens.push(token);
            }
        }
        if !sentence.tokens.is_empty() {
            self.flush(&mut doc, sentence)?;
        }
        debug!(bundles = doc.bundles().len(), "read conllu");
        Ok(doc)
    }

    fn flush(&self, doc: &mut Document, sentence: Sentence) -> ConlluResult<()> {
        let bundle = doc.create_bundle();
        let zone = doc.create_zone(bundle, &self.language, &self.selector)?;
        if !sentence.comment.is_empty() {
            if let Some(z) = doc.zone_mut(&zone) {
                z.wild
                    .insert("comment".to_string(), AttrValue::from(sentence.comment.as_str()));
            }
        }

        let root = doc.create_tree(&zone, Layer::A)?;
        let mut nodes: Vec<NodeId> = vec![root];
        for token in &sentence.tokens {
            nodes.push(doc.create_child_with(root, None, &token.data)?);
        }
        for (token, &node) in sentence.tokens.iter().zip(&nodes[1..]) {
            let parent = *nodes.get(token.head).ok_or_else(|| ConlluError::Parse {
                line: token.line,
                message: format!(
                    "HEAD {} is out of range for a sentence of {} tokens",
                    token.head,
                    sentence.tokens.len()
                ),
            })?;
            if parent != root {
                doc.set_parent(node, parent)?;
            }
        }
        Ok(())
    }
}

/// Parses one token line. Multi-word token ranges and empty nodes give `None`.
fn parse_token(line: &str, line_no: usize) -> ConlluResult<Option<Token>> {
    let columns: Vec<&str> = line.split('\t').collect();
    if columns.len() != COLUMNS {
        return Err(ConlluError::Parse {
            line: line_no,
            message: format!("expected {} columns, found {}", COLUMNS, columns.len()),
        });
    }
    if columns[0].contains('-') || columns[0].contains('.') {
        debug!(line = line_no, id = columns[0], "skipping multi-word token");
        return Ok(None);
    }

    let head = match columns[HEAD].parse::<usize>() {
        Ok(head) => head,
        Err(_) => {
            warn!(line = line_no, head = columns[HEAD], "unparsable HEAD, hanging under root");
            0
        }
    };

    let values = columns[1..HEAD].iter().chain(&columns[HEAD + 1..]);
    let mut data = AttrMap::new();
    for (name, value) in FIELDS.iter().zip(values) {
        if *value != "_" {
            data.insert(name.to_string(), AttrValue::from(*value));
        }
    }
    Ok(Some(Token {
        line: line_no,
        head,
        data,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use layered_treex::{NodeFilter, ZoneRef};

    const SAMPLE: &str = "\
# sent_id = 1
# text = Nevím, co dělat.
1-2\tNevím\t_\t_\t_\t_\t_\t_\t_\t_
1\tNe\tne\tPART\t_\tPolarity=Neg\t2\tadvmod\t_\t_
2\tvím\tvědět\tVERB\t_\t_\t0\troot\t_\tSpaceAfter=No
3\t,\t,\tPUNCT\t_\t_\t5\tpunct\t_\t_
4\tco\tco\tPRON\t_\t_\t5\tobj\t_\t_
5\tdělat\tdělat\tVERB\t_\t_\t2\tccomp\t_\tSpaceAfter=No
6\t.\t.\tPUNCT\t_\t_\t2\tpunct\t_\t_


1\tAno\tano\tINTJ\t_\t_\tx\tdiscourse\t_\t_
";

    fn forms(doc: &Document, root: NodeId) -> Vec<String> {
        doc.descendants(root, NodeFilter::new().ordered())
            .into_iter()
            .filter_map(|node| doc.get_str(node, "form"))
            .collect()
    }

    #[test]
    fn sentences_become_bundles() {
        let doc = ConlluReader::new("cs").read_str(SAMPLE).unwrap();
        assert_eq!(doc.bundles().len(), 2);

        let zone = ZoneRef::new(0, "cs", "");
        let root = doc.tree(&zone, Layer::A).unwrap();
        assert_eq!(forms(&doc, root), vec!["Ne", "vím", ",", "co", "dělat", "."]);
        assert_eq!(
            doc.zone(&zone).unwrap().wild.get("comment").and_then(AttrValue::as_str),
            Some(" sent_id = 1\n text = Nevím, co dělat.\n")
        );
    }

    #[test]
    fn tokens_are_hung_under_their_heads() {
        let doc = ConlluReader::new("cs").read_str(SAMPLE).unwrap();
        let zone = ZoneRef::new(0, "cs", "");
        let root = doc.tree(&zone, Layer::A).unwrap();
        let nodes = doc.descendants(root, NodeFilter::new().ordered());
        let ords: Vec<Option<i64>> = nodes.iter().map(|&node| doc.ord(node)).collect();
        assert_eq!(ords, vec![Some(1), Some(2), Some(3), Some(4), Some(5), Some(6)]);

        assert_eq!(doc.children(root, NodeFilter::new()), vec![nodes[1]]);
        assert_eq!(doc.parent(nodes[0]), Some(nodes[1]));
        assert_eq!(doc.parent(nodes[2]), Some(nodes[4]));
        assert_eq!(doc.parent(nodes[4]), Some(nodes[1]));
        assert_eq!(doc.get_str(nodes[4], "deprel").as_deref(), Some("ccomp"));
        assert_eq!(doc.get_str(nodes[0], "feats").as_deref(), Some("Polarity=Neg"));
    }

    #[test]
    fn underscore_means_absent() {
        let doc = ConlluReader::new("cs").read_str(SAMPLE).unwrap();
        let vim = doc.node("a-node-cs-s1-n2").unwrap();
        assert_eq!(doc.get_str(vim, "lemma").as_deref(), Some("vědět"));
        assert_eq!(doc.get_attr(vim, "xpos"), None);
        assert_eq!(doc.get_attr(vim, "feats"), None);
        assert_eq!(doc.get_str(vim, "misc").as_deref(), Some("SpaceAfter=No"));
    }

    #[test]
    fn bad_head_hangs_under_root() {
        let doc = ConlluReader::new("cs").read_str(SAMPLE).unwrap();
        let zone = ZoneRef::new(1, "cs", "");
        let root = doc.tree(&zone, Layer::A).unwrap();
        let children = doc.children(root, NodeFilter::new());
        assert_eq!(children.len(), 1);
        assert_eq!(doc.get_str(children[0], "form").as_deref(), Some("Ano"));
        assert!(doc.zone(&zone).unwrap().wild.get("comment").is_none());
    }

    #[test]
    fn language_defaults_to_unknown() {
        let doc = ConlluReader::default()
            .selector("ud")
            .read_str("1\tHi\t_\t_\t_\t_\t0\troot\t_\t_\n")
            .unwrap();
        assert!(doc.has_zone(0, "unk", "ud"));
        assert!(doc.node("a-node-unk_ud-s1-n1").is_ok());
    }

    #[test]
    fn trailing_comments_without_tokens_are_dropped() {
        let doc = ConlluReader::new("en")
            .read_str("1\tHi\t_\t_\t_\t_\t0\troot\t_\t_\n\n# dangling\n\n")
            .unwrap();
        assert_eq!(doc.bundles().len(), 1);
    }

    #[test]
    fn malformed_lines_report_their_line() {
        let err = ConlluReader::new("en")
            .read_str("# c\n1\tHi\t_\n")
            .unwrap_err();
        assert!(matches!(err, ConlluError::Parse { line: 2, .. }));

        let err = ConlluReader::new("en")
            .read_str("1\tHi\t_\t_\t_\t_\t7\troot\t_\t_\n")
            .unwrap_err();
        insta::assert_snapshot!(
            err.to_string(),
            @"parse error at line 1: HEAD 7 is out of range for a sentence of 1 tokens"
        );
    }

    #[test]
    fn self_loops_are_rejected() {
        let err = ConlluReader::new("en")
            .read_str("1\tHi\t_\t_\t_\t_\t1\troot\t_\t_\n")
            .unwrap_err();
        assert!(matches!(
            err,
            ConlluError::Tree(layered_treex::TreeError::Cycle { .. })
        ));
    }
}

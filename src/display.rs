use std::fmt::{self, Write};

use unicode_width::UnicodeWidthStr;

use crate::document::{Document, NodeId};
use crate::node::NodeFilter;

/// Renders a tree as indented lines, for debugging and snapshot tests.
///
/// ```text
/// 0  t-node-cs-s1-root
/// 2  ╰─ koupit          functor=PRED
/// 1     ├─ Jan          functor=ACT
/// 3     ╰─ auto         functor=PAT
/// ```
///
/// The first column is `ord` (left out on unordered layers), then the tree
/// drawn with box characters and the node label (form, lemma or concept,
/// falling back to the id). Attributes added with
/// [`include`](TreeDisplay::include) are aligned in a column after the labels.
pub struct TreeDisplay<'a> {
    doc: &'a Document,
    root: NodeId,
    attrs: Vec<String>,
}

struct Line {
    ord: Option<i64>,
    tree: String,
    attrs: Vec<String>,
}

impl<'a> TreeDisplay<'a> {
    pub fn new(doc: &'a Document, root: NodeId) -> Self {
        Self {
            doc,
            root,
            attrs: Vec::new(),
        }
    }

    /// Show `name=value` for this attribute on every node that has it set.
    pub fn include(mut self, attr: &str) -> Self {
        self.attrs.push(attr.to_string());
        self
    }

    fn label(&self, node: NodeId) -> String {
        let entry = &self.doc[node];
        entry.kind().label().unwrap_or(entry.id()).to_string()
    }

    fn node_attrs(&self, node: NodeId) -> Vec<String> {
        self.attrs
            .iter()
            .filter_map(|name| {
                let value = self.doc.get_attr(node, name)?;
                if value.is_blank() {
                    None
                } else {
                    Some(format!("{}={}", name, value))
                }
            })
            .collect()
    }

    fn collect_lines(&self) -> Vec<Line> {
        let mut lines = vec![Line {
            ord: self.doc.ord(self.root),
            tree: self.label(self.root),
            attrs: self.node_attrs(self.root),
        }];
        // (node, indentation inherited from ancestors, is last sibling)
        let mut stack: Vec<(NodeId, String, bool)> = Vec::new();
        let children = self.doc.children(self.root, NodeFilter::new().ordered());
        push_children(&mut stack, children, "");

        while let Some((node, indent, is_last)) = stack.pop() {
            let connector = if is_last { "╰─ " } else { "├─ " };
            lines.push(Line {
                ord: self.doc.ord(node),
                tree: format!("{}{}{}", indent, connector, self.label(node)),
                attrs: self.node_attrs(node),
            });
            let child_indent = format!("{}{}", indent, if is_last { "   " } else { "│  " });
            let children = self.doc.children(node, NodeFilter::new().ordered());
            push_children(&mut stack, children, &child_indent);
        }
        lines
    }
}

fn push_children(stack: &mut Vec<(NodeId, String, bool)>, children: Vec<NodeId>, indent: &str) {
    let count = children.len();
    for (i, child) in children.into_iter().enumerate().rev() {
        stack.push((child, indent.to_string(), i + 1 == count));
    }
}

impl<'a> fmt::Display for TreeDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const SPACE_PADDING: usize = 2;
        if !self.doc.contains(self.root) {
            return f.write_str("<removed>");
        }
        let lines = self.collect_lines();
        let ord_width = lines
            .iter()
            .filter_map(|line| line.ord)
            .map(|ord| ord.to_string().len())
            .max();
        let tree_width = lines
            .iter()
            .map(|line| UnicodeWidthStr::width(line.tree.as_str()))
            .max()
            .unwrap_or(0);

        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                f.write_char('\n')?;
            }
            let mut out = String::new();
            if let Some(width) = ord_width {
                match line.ord {
                    Some(ord) => write!(out, "{:>width$}", ord, width = width)?,
                    None => out.extend(std::iter::repeat(' ').take(width)),
                }
                out.extend(std::iter::repeat(' ').take(SPACE_PADDING));
            }
            out.push_str(&line.tree);
            if !line.attrs.is_empty() {
                let pad = tree_width - UnicodeWidthStr::width(line.tree.as_str()) + SPACE_PADDING;
                out.extend(std::iter::repeat(' ').take(pad));
                out.push_str(&line.attrs.join(" "));
            }
            f.write_str(&out)?;
        }
        Ok(())
    }
}

//! Turning nodes back into text.
//!
//! Each construct is rebuilt from its parts at their recorded offsets. Gaps
//! between parts are whitespace in well-formed XML; they are re-filled from
//! the whitespace runs recorded for the node, and with spaces elsewhere.

use std::fmt::Write;

use crate::document::XmlDocument;
use crate::types::{Node, NodeErrors, NodeId, NodeKind};

struct Writer<'n> {
    out: String,
    pos: usize,
    node: &'n Node,
}

impl<'n> Writer<'n> {
    fn new(node: &'n Node) -> Self {
        Self {
            out: String::with_capacity(node.span.len()),
            pos: node.span.start,
            node,
        }
    }

    fn gap_to(&mut self, to: usize) {
        while self.pos < to {
            let fill = self.node.whitespace_at(self.pos).unwrap_or(' ');
            self.out.push(fill);
            self.pos += 1;
        }
    }

    fn put(&mut self, at: usize, s: &str) {
        self.gap_to(at);
        self.out.push_str(s);
        self.pos = self.pos.max(at + s.len());
    }

    fn put_char(&mut self, at: usize, c: char) {
        let mut buf = [0u8; 4];
        self.put(at, c.encode_utf8(&mut buf));
    }
}

impl XmlDocument {
    /// Reconstruct the source text of a single node.
    ///
    /// Nodes without text of their own (the closer of `<name/>`, or a node
    /// whose position could not be recovered) produce an empty string.
    pub fn to_xml_string(&self, id: NodeId) -> String {
        let node = self.node(id);
        if node.span.is_empty() {
            return String::new();
        }
        let span = node.span;
        let mut w = Writer::new(node);

        match &node.kind {
            NodeKind::Start(start) => {
                w.put(span.start, "<");
                w.put(start.name_span.start, &start.name);
                for attr in &start.attributes {
                    w.put(attr.name_span.start, &attr.name);
                    if let Some(assign) = attr.assign {
                        w.put(assign, "=");
                    }
                    if let (Some(value), Some(raw)) = (attr.value_span, &attr.raw_value) {
                        match attr.quote {
                            Some(q) => {
                                w.put_char(value.start - q.len_utf8(), q);
                                w.put(value.start, raw);
                                w.put_char(value.end, q);
                            }
                            None => w.put(value.start, raw),
                        }
                    }
                }
                if start.self_closing {
                    w.put(span.end - 2, "/>");
                } else {
                    w.put(span.end - 1, ">");
                }
            }
            NodeKind::End(end) => {
                w.put(span.start, "</");
                w.put(end.name_span.start, &end.name);
                w.put(span.end - 1, ">");
            }
            NodeKind::Text(text) => w.put(span.start, &text.raw),
            NodeKind::Comment(comment) => {
                w.put(span.start, "<!--");
                w.put(comment.body.start, &comment.raw);
                w.put(comment.body.end, "-->");
            }
            NodeKind::CData(cdata) => {
                w.put(span.start, "<![CDATA[");
                w.put(cdata.body.start, &cdata.data);
                w.put(cdata.body.end, "]]>");
            }
            NodeKind::Instruction(pi) => {
                w.put(span.start, "<?");
                w.put(pi.target_span.start, &pi.target);
                if !pi.data.is_empty() {
                    w.put(pi.data_span.start, &pi.data);
                }
                w.put(span.end - 2, "?>");
            }
            NodeKind::Declaration(decl) => {
                w.put(span.start, "<?");
                w.put(decl.name_span.start, &decl.name);
                for field in decl.fields() {
                    w.put(field.keyword_span.start, &field.keyword);
                    w.put(field.assign, "=");
                    w.put_char(field.value_span.start - 1, field.quote);
                    w.put(field.value_span.start, &field.value);
                    w.put_char(field.value_span.end, field.quote);
                }
                w.put(span.end - 2, "?>");
            }
        }
        w.out
    }

    /// All nodes serialized in document order and concatenated.
    pub fn flat_string(&self) -> String {
        self.order
            .iter()
            .map(|&id| self.to_xml_string(id))
            .collect()
    }

    /// An indented, human-readable outline of the tree.
    pub fn dump_tree(&self) -> String {
        let mut out = String::new();
        for (id, node) in self.iter() {
            if node.parent.is_none() {
                self.dump_node(id, 0, &mut out);
            }
        }
        out
    }

    fn dump_node(&self, id: NodeId, depth: usize, out: &mut String) {
        let node = self.node(id);
        let indent = "  ".repeat(depth);
        let span = node.span;
        let label = match &node.kind {
            NodeKind::Declaration(decl) => {
                let fields: Vec<String> = decl
                    .fields()
                    .map(|f| format!(" {}={:?}", f.keyword, f.value))
                    .collect();
                format!("Declaration{}", fields.concat())
            }
            NodeKind::Start(start) => {
                let attrs: Vec<String> = start
                    .attributes
                    .iter()
                    .map(|a| match &a.value {
                        Some(v) => format!(" {}={v:?}", a.name),
                        None => format!(" {}", a.name),
                    })
                    .collect();
                let slash = if start.self_closing { "/" } else { "" };
                format!("Start <{}{}{slash}>", start.name, attrs.concat())
            }
            NodeKind::End(end) => format!("End </{}>", end.name),
            NodeKind::Text(text) => format!("Text {:?}", text.text),
            NodeKind::Comment(comment) => format!("Comment {:?}", comment.comment),
            NodeKind::CData(cdata) => format!("CData {:?}", cdata.data),
            NodeKind::Instruction(pi) => format!("Instruction {} {:?}", pi.target, pi.data),
        };
        let _ = write!(out, "{indent}{label} {}..{}", span.start, span.end);
        if node.errors.contains(NodeErrors::MISMATCHED_NODES) {
            out.push_str(" !mismatched");
        }
        if node.errors.contains(NodeErrors::OFFSET_ANOMALY) {
            out.push_str(" !anomaly");
        }
        out.push('\n');
        for &child in &node.children {
            self.dump_node(child, depth + 1, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::XmlEventParser;

    fn parsed(text: &str) -> XmlEventParser {
        let mut parser = XmlEventParser::new();
        assert!(parser.parse(text), "{:?}", parser.diagnostics());
        parser
    }

    #[test]
    fn test_each_node_reproduces_its_span() {
        let text = "<?xml version='1.0'\n  encoding=\"utf-8\" ?><r a = \"1\"\n   b='x &amp; y'><!-- c --><![CDATA[<raw>]]><?pi d ?>t&lt;<e/><f ></f></r>";
        let parser = parsed(text);
        let doc = parser.document();
        for (id, node) in doc.iter() {
            assert_eq!(
                doc.to_xml_string(id),
                &text[node.span.start..node.span.end],
                "node {id:?}"
            );
        }
        assert_eq!(doc.flat_string(), text);
    }

    #[test]
    fn test_self_closing_closer_is_empty() {
        let parser = parsed("<r><b /></r>");
        let doc = parser.document();
        let b = doc.children(doc.root().unwrap())[0];
        assert_eq!(doc.to_xml_string(b), "<b />");
        assert_eq!(doc.to_xml_string(doc.closer(b).unwrap()), "");
    }

    #[test]
    fn test_dump_tree() {
        let parser = parsed(r#"<a x="1">hi<b/><!-- n --></a>"#);
        insta::assert_snapshot!(parser.document().dump_tree(), @r#"
        Start <a x="1"> 0..9
          Text "hi" 9..11
          Start <b/> 11..15
          End </b> 15..15
          Comment "n" 15..25
        End </a> 25..29
        "#);
    }

    #[test]
    fn test_dump_marks_mismatches() {
        let mut parser = XmlEventParser::new().with_halt_on_error(false);
        parser.parse("<a><b></c></b></a>");
        insta::assert_snapshot!(parser.document().dump_tree(), @r"
        Start <a> 0..3
          Start <b> 3..6
            End </c> 6..10 !mismatched
          End </b> 10..14
        End </a> 14..18
        ");
    }
}

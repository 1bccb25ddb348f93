//! XML declaration extraction.
//!
//! The event source does not report the `<?xml ... ?>` prologue as a
//! structured event, so it is matched directly against the head of the text.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

use crate::document::XmlDocument;
use crate::types::{DeclarationField, DeclarationNode, Node, NodeKind, Span};

static DECLARATION: Lazy<Regex> = Lazy::new(|| {
    // A `?` inside a quoted value does not end the declaration.
    Regex::new(r#"(?i)\A\x{FEFF}?<\?(xml)(\s(?:[^?"']|"[^"]*"|'[^']*')*)?\?>"#)
        .expect("declaration pattern is valid")
});

static VERSION: Lazy<Regex> = Lazy::new(|| field_pattern("version"));
static ENCODING: Lazy<Regex> = Lazy::new(|| field_pattern("encoding"));
static STANDALONE: Lazy<Regex> = Lazy::new(|| field_pattern("standalone"));

fn field_pattern(keyword: &str) -> Regex {
    Regex::new(&format!(
        r#"(?i)\b({keyword})\s*(=)\s*(?:"([^"]*)"|'([^']*)')"#
    ))
    .expect("declaration field pattern is valid")
}

/// Match the declaration at the head of `text`, if there is one.
pub fn extract_declaration(text: &str) -> Option<Node> {
    let caps = DECLARATION.captures(text)?;
    let whole = caps.get(0)?;
    let keyword = caps.get(1)?;
    // A leading byte order mark is not part of the node.
    let start = keyword.start() - 2;

    let body = caps.get(2);
    let field = |pattern: &Regex| {
        body.and_then(|b| to_field(&pattern.captures(b.as_str())?, b.start()))
    };

    let declaration = DeclarationNode {
        name: keyword.as_str().to_string(),
        name_span: Span::new(keyword.start(), keyword.end()),
        version: field(&VERSION),
        encoding: field(&ENCODING),
        standalone: field(&STANDALONE),
    };

    let mut node = Node::new(NodeKind::Declaration(declaration), Some(start));
    node.span = Span::new(start, whole.end());
    node.record_layout(text);
    Some(node)
}

fn to_field(caps: &Captures<'_>, base: usize) -> Option<DeclarationField> {
    let keyword = caps.get(1)?;
    let assign = caps.get(2)?;
    let (value, quote) = caps
        .get(3)
        .map(|v| (v, '"'))
        .or_else(|| caps.get(4).map(|v| (v, '\'')))?;
    Some(DeclarationField {
        keyword: keyword.as_str().to_string(),
        keyword_span: Span::new(base + keyword.start(), base + keyword.end()),
        assign: base + assign.start(),
        value: value.as_str().to_string(),
        value_span: Span::new(base + value.start(), base + value.end()),
        quote,
    })
}

/// Put the declaration at the front of the document, unless another node
/// already claims that text.
pub(crate) fn insert_declaration(text: &str, document: &mut XmlDocument) {
    let Some(node) = extract_declaration(text) else {
        return;
    };
    let overlaps = document
        .iter()
        .any(|(_, n)| !n.is_empty() && n.span.intersect(node.span).is_some());
    if overlaps {
        debug!("declaration overlaps a parsed node; skipping");
        return;
    }
    let id = document.push(node);
    document.order.insert(0, id);
    document.declaration = Some(id);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declaration(text: &str) -> DeclarationNode {
        let node = extract_declaration(text).expect("declaration present");
        node.as_declaration().unwrap().clone()
    }

    #[test]
    fn test_version_and_encoding() {
        let text = r#"<?xml version="1.0" encoding="UTF-8"?><r/>"#;
        let node = extract_declaration(text).unwrap();
        assert_eq!(node.span, Span::new(0, 38));
        assert!(node.parent.is_none());
        assert!(node.children.is_empty());

        let decl = node.as_declaration().unwrap();
        assert_eq!(decl.name, "xml");
        assert_eq!(decl.name_span, Span::new(2, 5));
        assert!(decl.has_version());
        assert_eq!(decl.version(), Some("1.0"));
        assert!(decl.has_encoding());
        assert_eq!(decl.encoding(), Some("UTF-8"));
        assert!(!decl.has_standalone());

        let version = decl.version.as_ref().unwrap();
        assert_eq!(version.keyword_span, Span::new(6, 13));
        assert_eq!(version.assign, 13);
        assert_eq!(version.value_span, Span::new(15, 18));
        assert_eq!(version.quote, '"');
    }

    #[test]
    fn test_single_quotes_spaces_and_standalone() {
        let decl = declaration("<?xml version = '1.1'  standalone='yes' ?>\n<r/>");
        assert_eq!(decl.version(), Some("1.1"));
        assert_eq!(decl.version.as_ref().unwrap().quote, '\'');
        assert_eq!(decl.standalone(), Some("yes"));
        assert!(!decl.has_encoding());
    }

    #[test]
    fn test_case_insensitive_and_bom() {
        let text = "\u{FEFF}<?XML Version=\"1.0\"?><r/>";
        let node = extract_declaration(text).unwrap();
        assert_eq!(node.span.start, 3);
        let decl = node.as_declaration().unwrap();
        assert_eq!(decl.name, "XML");
        assert_eq!(decl.version.as_ref().unwrap().keyword, "Version");
    }

    #[test]
    fn test_question_mark_inside_value() {
        let text = r#"<?xml version="1.0" encoding="x?y"?><r/>"#;
        let node = extract_declaration(text).unwrap();
        assert_eq!(node.span, Span::new(0, 36));
        let decl = node.as_declaration().unwrap();
        assert_eq!(decl.version(), Some("1.0"));
        assert_eq!(decl.encoding(), Some("x?y"));
    }

    #[test]
    fn test_absent_or_not_at_head() {
        assert!(extract_declaration("<r/>").is_none());
        assert!(extract_declaration(" <?xml version=\"1.0\"?><r/>").is_none());
        assert!(extract_declaration("<?xml-stylesheet href=\"a.xsl\"?><r/>").is_none());
    }

    #[test]
    fn test_bare_declaration() {
        let decl = declaration("<?xml?><r/>");
        assert!(!decl.has_version());
        assert_eq!(decl.fields().count(), 0);
    }

    #[test]
    fn test_newlines_inside_declaration() {
        let node = extract_declaration("<?xml version=\"1.0\"\n encoding=\"utf-8\"?>").unwrap();
        assert_eq!(node.newlines, vec![19]);
    }
}

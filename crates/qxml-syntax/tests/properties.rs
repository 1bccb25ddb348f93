//! Property-based tests over generated well-formed documents.
//!
//! For every generated document:
//! 1. Parsing succeeds and every start tag is closed by an end tag of the same name
//! 2. Spans are ordered and children lie inside their parent element
//! 3. Serializing the nodes in order reproduces the text exactly
//! 4. Every offset resolves to a node that contains it
//! 5. Parsing twice gives the same nodes

use proptest::prelude::*;
use qxml_syntax::{NodeErrors, NodeKind, XmlDocument, XmlEventParser};

use generators::document;

fn parse(text: &str) -> XmlEventParser {
    let mut parser = XmlEventParser::new();
    let ok = parser.parse(text);
    assert!(ok, "parse failed for {text:?}: {:#?}", parser.diagnostics());
    parser
}

fn shape(doc: &XmlDocument) -> Vec<(String, Option<String>, usize, usize, usize)> {
    doc.iter()
        .map(|(_, n)| {
            (
                format!("{:?}", n.node_type()),
                n.name().map(str::to_string),
                n.span.start,
                n.span.end,
                n.children.len(),
            )
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn test_start_tags_are_closed(text in document()) {
        let parser = parse(&text);
        let doc = parser.document();
        prop_assert!(doc.root().is_some());
        for (id, node) in doc.iter() {
            prop_assert!(node.errors.is_empty(), "{:?} flagged in {:?}", id, text);
            if let NodeKind::Start(start) = &node.kind {
                let closer = start.closer.expect("start tag has a closer");
                prop_assert_eq!(doc.node(closer).name(), Some(start.name.as_str()));
                prop_assert_eq!(doc.opener(closer), Some(id));
            }
        }
    }

    #[test]
    fn test_spans_nest(text in document()) {
        let parser = parse(&text);
        let doc = parser.document();
        let mut previous_end = 0;
        for (id, node) in doc.iter() {
            prop_assert!(node.span.start <= node.span.end);
            prop_assert!(node.span.end <= text.len());
            prop_assert!(node.span.start >= previous_end, "{:?} overlaps its predecessor", id);
            previous_end = node.span.end;

            if let Some(parent) = node.parent {
                let outer = doc.element_span(parent);
                prop_assert!(outer.encloses(node.span), "{:?} escapes {:?}", id, parent);
            }
        }
        prop_assert_eq!(doc.flagged(NodeErrors::OFFSET_ANOMALY).count(), 0);
    }

    #[test]
    fn test_round_trip(text in document()) {
        let parser = parse(&text);
        let doc = parser.document();
        for (id, node) in doc.iter() {
            prop_assert_eq!(doc.to_xml_string(id), &text[node.span.start..node.span.end]);
        }
        prop_assert_eq!(doc.flat_string(), text);
    }

    #[test]
    fn test_every_offset_has_a_node(text in document()) {
        let parser = parse(&text);
        let doc = parser.document();
        for offset in 0..text.len() {
            let id = doc.node_for_offset(offset);
            prop_assert!(id.is_some(), "nothing at {} in {:?}", offset, text);
            let node = doc.node(id.unwrap());
            prop_assert!(node.contains(offset));
        }
        prop_assert!(doc.node_for_offset(text.len()).is_none());
    }

    #[test]
    fn test_parse_is_idempotent(text in document()) {
        let first = parse(&text);
        let mut second = parse(&text);
        prop_assert_eq!(shape(first.document()), shape(second.document()));

        // Reusing a parser does not leak state between passes.
        second.parse("<other/>");
        second.parse(&text);
        prop_assert_eq!(shape(first.document()), shape(second.document()));
    }
}

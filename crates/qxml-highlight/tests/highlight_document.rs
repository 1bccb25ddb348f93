use qxml_highlight::{ColorScheme, highlight_lines, highlight_range, render_ansi};
use qxml_syntax::{LineIndex, XmlEventParser};

const TEXT: &str = "<?xml version=\"1.0\"?>\n<r k='v'>\n  <!-- c -->\n</r>";

fn outline(text: &str) -> String {
    let mut parser = XmlEventParser::new();
    assert!(parser.parse(text));
    let lines = LineIndex::new(text);

    let mut out = String::new();
    for (row, spans) in highlight_lines(parser.document(), &lines).iter().enumerate() {
        let range = lines.line_range(row).unwrap();
        let line = &text[range];
        let parts: Vec<String> = spans
            .iter()
            .map(|s| format!("{} {:?}", s.category, &line[s.range.clone()]))
            .collect();
        out.push_str(&format!("{row}: {}\n", parts.join(", ")));
    }
    out
}

#[test]
fn highlight_every_line() {
    insta::assert_snapshot!(outline(TEXT), @r#"
    0: tag_delimiter "<?", declaration "xml", tag_delimiter " ", attribute_name "version", tag_delimiter "=", attribute_value "\"1.0\"", tag_delimiter "?>"
    1: tag_delimiter "<", tag_name "r", tag_delimiter " ", attribute_name "k", tag_delimiter "=", attribute_value "'v'", tag_delimiter ">"
    2: text "  ", comment "<!-- c -->"
    3: tag_delimiter "</", tag_name "r", tag_delimiter ">"
    "#);
}

#[test]
fn whole_document_matches_line_by_line() {
    let mut parser = XmlEventParser::new();
    parser.parse(TEXT);
    let doc = parser.document();
    let lines = LineIndex::new(TEXT);

    let whole = highlight_range(doc, 0..TEXT.len());
    for (row, spans) in highlight_lines(doc, &lines).iter().enumerate() {
        let base = lines.line_range(row).unwrap().start;
        for span in spans {
            let absolute = span.range.start + base..span.range.end + base;
            assert!(
                whole
                    .iter()
                    .any(|w| w.category == span.category
                        && w.range.start <= absolute.start
                        && absolute.end <= w.range.end),
                "{span:?} on line {row} missing from whole-document runs"
            );
        }
    }

    let rendered = render_ansi(TEXT, &whole, &ColorScheme::default());
    assert!(rendered.contains("\x1b["));
    assert_eq!(rendered.matches('\n').count(), TEXT.matches('\n').count());
}

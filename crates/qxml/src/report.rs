//! Rendering diagnostics against the source text.

use ariadne::{Color, Label, Report, ReportKind, Source};
use qxml_syntax::{DiagnosticKind, DiagnosticMessage};

/// ariadne counts characters, the parser counts bytes.
fn char_offset(text: &str, byte: usize) -> usize {
    let mut byte = byte.min(text.len());
    while !text.is_char_boundary(byte) {
        byte -= 1;
    }
    text[..byte].chars().count()
}

/// Render one diagnostic, with a source snippet when it has a span.
pub fn render(name: &str, text: &str, diagnostic: &DiagnosticMessage) -> String {
    let Some(span) = diagnostic.span else {
        return diagnostic.to_text();
    };

    let (kind, color) = match diagnostic.kind {
        DiagnosticKind::Error => (ReportKind::Error, Color::Red),
        DiagnosticKind::Warning => (ReportKind::Warning, Color::Yellow),
    };
    let start = char_offset(text, span.start);
    // Zero-width spans still get a one character marker.
    let end = char_offset(text, span.end).max(start + 1);

    let title = match &diagnostic.code {
        Some(code) => format!("[{code}] {}", diagnostic.title),
        None => diagnostic.title.clone(),
    };
    let label = diagnostic.problem.as_deref().unwrap_or(&diagnostic.title);

    let mut report = Report::build(kind, name, start)
        .with_message(title)
        .with_label(
            Label::new((name, start..end))
                .with_message(label)
                .with_color(color),
        );
    if !diagnostic.details.is_empty() {
        report = report.with_note(diagnostic.details.join("\n"));
    }
    if let Some(hint) = diagnostic.hints.first() {
        report = report.with_help(hint);
    }

    let mut output = Vec::new();
    match report
        .finish()
        .write((name, Source::from(text)), &mut output)
    {
        Ok(()) => String::from_utf8_lossy(&output).into_owned(),
        Err(_) => diagnostic.to_text(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qxml_syntax::XmlEventParser;

    #[test]
    fn test_char_offset() {
        let text = "<é>x</é>";
        assert_eq!(char_offset(text, 0), 0);
        assert_eq!(char_offset(text, 3), 2);
        assert_eq!(char_offset(text, 2), 1);
        assert_eq!(char_offset(text, 99), text.chars().count());
    }

    #[test]
    fn test_render_mentions_code_and_problem() {
        let text = "<a>\n</b>";
        let mut parser = XmlEventParser::new();
        parser.parse(text);
        let diagnostic = &parser.diagnostics()[0];

        let rendered = render("doc.xml", text, diagnostic);
        assert!(rendered.contains("X-1-3"), "{rendered}");
        assert!(rendered.contains("doc.xml"), "{rendered}");
    }

    #[test]
    fn test_render_without_span_is_plain_text() {
        let diagnostic = DiagnosticMessage::error("Empty Document").with_code("X-1-5");
        assert_eq!(render("doc.xml", "", &diagnostic), diagnostic.to_text());
    }
}

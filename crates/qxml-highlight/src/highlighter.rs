//! Mapping document nodes onto highlighted runs of text.
//!
//! Each node paints its parts in turn, the whole construct first and the
//! more specific parts (names, attribute values, bodies) over it. Paint
//! applied later wins, so the result is a sequence of non-overlapping runs.

use std::ops::Range;

use qxml_syntax::{LineIndex, Node, NodeErrors, NodeKind, Span, XmlDocument};
use serde::Serialize;

use crate::category::Category;

/// A run of text with a single category.
///
/// The range is relative to the start of the highlighted range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyledSpan {
    pub range: Range<usize>,
    pub category: Category,
}

impl StyledSpan {
    pub fn new(range: Range<usize>, category: Category) -> Self {
        Self { range, category }
    }
}

/// Paint buffer covering one range of the document.
struct Canvas {
    window: Span,
    cells: Vec<Option<Category>>,
}

impl Canvas {
    fn new(range: Range<usize>) -> Self {
        let window = Span::new(range.start, range.end.max(range.start));
        Self {
            cells: vec![None; window.len()],
            window,
        }
    }

    fn paint(&mut self, span: Span, category: Category) {
        let Some(clipped) = span.intersect(self.window) else {
            return;
        };
        let from = clipped.start - self.window.start;
        let to = clipped.end - self.window.start;
        self.cells[from..to].fill(Some(category));
    }

    fn into_runs(self) -> Vec<StyledSpan> {
        let mut runs: Vec<StyledSpan> = Vec::new();
        for (i, cell) in self.cells.into_iter().enumerate() {
            let Some(category) = cell else { continue };
            match runs.last_mut() {
                Some(last) if last.category == category && last.range.end == i => {
                    last.range.end = i + 1;
                }
                _ => runs.push(StyledSpan::new(i..i + 1, category)),
            }
        }
        runs
    }
}

fn paint_node(canvas: &mut Canvas, node: &Node) {
    match &node.kind {
        NodeKind::Declaration(decl) => {
            canvas.paint(node.span, Category::TagDelimiter);
            canvas.paint(decl.name_span, Category::Declaration);
            for field in decl.fields() {
                canvas.paint(field.keyword_span, Category::AttributeName);
                let quoted = Span::new(field.value_span.start - 1, field.value_span.end + 1);
                canvas.paint(quoted, Category::AttributeValue);
            }
        }
        NodeKind::Start(start) => {
            canvas.paint(node.span, Category::TagDelimiter);
            canvas.paint(start.name_span, Category::TagName);
            for attr in &start.attributes {
                canvas.paint(attr.name_span, Category::AttributeName);
                if let Some(value) = attr.quoted_value_span() {
                    canvas.paint(value, Category::AttributeValue);
                }
            }
        }
        NodeKind::End(end) => {
            canvas.paint(node.span, Category::TagDelimiter);
            canvas.paint(end.name_span, Category::TagName);
        }
        NodeKind::Text(_) => canvas.paint(node.span, Category::Text),
        NodeKind::Comment(_) => canvas.paint(node.span, Category::Comment),
        NodeKind::CData(cdata) => {
            canvas.paint(node.span, Category::TagDelimiter);
            canvas.paint(cdata.body, Category::CData);
        }
        NodeKind::Instruction(pi) => {
            canvas.paint(node.span, Category::TagDelimiter);
            canvas.paint(pi.target_span, Category::PITarget);
            canvas.paint(pi.data_span, Category::PIData);
        }
    }
    if node.errors.contains(NodeErrors::MISMATCHED_NODES) {
        canvas.paint(node.span, Category::Error);
    }
}

/// Highlight the bytes `range` of the document's text.
///
/// Nodes overlapping the range are painted in document order and clipped to
/// it; the returned runs are relative to `range.start`, sorted and
/// non-overlapping. Bytes no node covers are left out.
pub fn highlight_range(doc: &XmlDocument, range: Range<usize>) -> Vec<StyledSpan> {
    let mut canvas = Canvas::new(range);
    for (_, node) in doc.iter() {
        if node.span.intersect(canvas.window).is_some() {
            paint_node(&mut canvas, node);
        }
    }
    canvas.into_runs()
}

/// Highlight one line (without its newline), or nothing past the last line.
pub fn highlight_line(doc: &XmlDocument, lines: &LineIndex, line: usize) -> Vec<StyledSpan> {
    lines
        .line_range(line)
        .map(|range| highlight_range(doc, range))
        .unwrap_or_default()
}

/// Highlight every line of the text the index was built from.
pub fn highlight_lines(doc: &XmlDocument, lines: &LineIndex) -> Vec<Vec<StyledSpan>> {
    (0..lines.line_count())
        .map(|line| highlight_line(doc, lines, line))
        .collect()
}

//! Position recovery.
//!
//! Events arrive without spans, so every node is located in the source text
//! afterwards by a forward-only scan. The scan visits nodes in creation
//! order, which is document order, and keeps a single cursor that never
//! moves backwards except to find a tag's opening `<` behind its name.
//!
//! When a node carries an anchor the cursor first jumps to it, so repeated
//! identical content is told apart by event order. A node that cannot be
//! found is flagged [`NodeErrors::OFFSET_ANOMALY`] and given a zero-width
//! span at the cursor rather than a wrong one.

use tracing::{debug, warn};

use crate::context::ParseContext;
use crate::document::XmlDocument;
use crate::error::Error;
use crate::types::{NodeErrors, NodeId, NodeKind, Span};

const COMMENT_OPEN: &str = "<!--";
const COMMENT_CLOSE: &str = "-->";
const CDATA_OPEN: &str = "<![CDATA[";
const CDATA_CLOSE: &str = "]]>";
const PI_CLOSE: &str = "?>";

/// Search failure; the string names what was being looked for.
struct Missing(String);

fn missing(what: impl Into<String>) -> Missing {
    Missing(what.into())
}

struct Scanner<'t> {
    text: &'t str,
    cursor: usize,
}

impl<'t> Scanner<'t> {
    fn find(&self, needle: &str, from: usize) -> Option<usize> {
        if from > self.text.len() || !self.text.is_char_boundary(from) {
            return None;
        }
        self.text[from..].find(needle).map(|i| from + i)
    }

    fn find_char(&self, needle: char, from: usize) -> Option<usize> {
        if from > self.text.len() || !self.text.is_char_boundary(from) {
            return None;
        }
        self.text[from..].find(needle).map(|i| from + i)
    }

    /// The nearest `<` strictly before `before`.
    fn open_bracket(&self, before: usize) -> Option<usize> {
        self.text[..before].rfind('<')
    }

    fn skip_whitespace(&self, from: usize) -> usize {
        let rest = &self.text[from..];
        from + (rest.len() - rest.trim_start().len())
    }

    fn starts_with_at(&self, at: usize, needle: &str) -> bool {
        self.text.is_char_boundary(at) && self.text[at..].starts_with(needle)
    }
}

/// Assign spans to every node of `document`, except the declaration.
pub(crate) fn recover_positions(text: &str, document: &mut XmlDocument, ctx: &mut ParseContext) {
    let mut scanner = Scanner { text, cursor: 0 };
    let mut anomalies = 0usize;

    for index in 0..document.arena.len() {
        let id = NodeId(index);
        if document.node(id).as_declaration().is_some() {
            continue;
        }

        let before = scanner.cursor;
        let mut anchor_behind = false;
        if let Some(anchor) = document.node(id).anchor {
            if anchor >= scanner.cursor {
                scanner.cursor = anchor;
            } else {
                anchor_behind = true;
            }
        }

        let result = locate(&mut scanner, document, id);
        let failure = match result {
            Ok(()) if anchor_behind => Some(format!(
                "{} node (read ahead of byte {before})",
                node_label(document, id)
            )),
            Ok(()) if document.node(id).span.start < before => Some(format!(
                "{} node after byte {before}",
                node_label(document, id)
            )),
            Ok(()) => None,
            Err(Missing(what)) => Some(what),
        };

        if let Some(what) = failure {
            anomalies += 1;
            let node = document.node_mut(id);
            node.errors.insert(NodeErrors::OFFSET_ANOMALY);
            if !node.span.is_empty() && node.span.start < before {
                node.span = Span::empty(scanner.cursor);
            }
            warn!(node = id.0, %what, "could not recover source position");
            // Not filed in the mismatch registry.
            ctx.add_diagnostic(Error::OffsetRecovery { what, node: id }.to_diagnostic());
        }

        document.node_mut(id).record_layout(text);
    }

    debug!(
        nodes = document.arena.len(),
        anomalies, "recovered node positions"
    );
}

fn node_label(document: &XmlDocument, id: NodeId) -> String {
    let node = document.node(id);
    match node.name() {
        Some(name) => format!("{:?} <{name}>", node.node_type()),
        None => format!("{:?}", node.node_type()),
    }
}

fn locate(scanner: &mut Scanner<'_>, document: &mut XmlDocument, id: NodeId) -> Result<(), Missing> {
    let at = scanner.cursor;
    // Until found, every span sits at the cursor.
    set_empty(document, id, at);

    // The opener's end is needed before the node is borrowed mutably.
    let opener_end = document
        .node(id)
        .as_end()
        .filter(|e| e.self_closing)
        .map(|e| e.opener.map(|o| document.node(o).span.end).unwrap_or(at));

    let node = document.node_mut(id);
    match &mut node.kind {
        NodeKind::Start(start) => {
            let name_at = scanner
                .find(&start.name, at)
                .ok_or_else(|| missing(format!("start tag <{}>", start.name)))?;
            let open = scanner
                .open_bracket(name_at)
                .ok_or_else(|| missing(format!("'<' of <{}>", start.name)))?;
            start.name_span = Span::new(name_at, name_at + start.name.len());
            let mut pos = start.name_span.end;

            for attr in &mut start.attributes {
                let name_at = scanner
                    .find(&attr.name, pos)
                    .ok_or_else(|| missing(format!("attribute '{}'", attr.name)))?;
                attr.name_span = Span::new(name_at, name_at + attr.name.len());
                pos = attr.name_span.end;

                let Some(raw) = attr.raw_value.as_deref() else {
                    continue;
                };
                let assign = scanner
                    .find_char('=', pos)
                    .ok_or_else(|| missing(format!("'=' of attribute '{}'", attr.name)))?;
                attr.assign = Some(assign);
                let quote_at = scanner.skip_whitespace(assign + 1);
                let quote = scanner.text[quote_at..]
                    .chars()
                    .next()
                    .filter(|c| *c == '"' || *c == '\'')
                    .ok_or_else(|| missing(format!("quote of attribute '{}'", attr.name)))?;
                attr.quote = Some(quote);

                let value_start = quote_at + 1;
                let value_end = if scanner.starts_with_at(value_start, raw)
                    && scanner.starts_with_at(value_start + raw.len(), &quote.to_string())
                {
                    value_start + raw.len()
                } else {
                    scanner
                        .find_char(quote, value_start)
                        .ok_or_else(|| missing(format!("value of attribute '{}'", attr.name)))?
                };
                attr.value_span = Some(Span::new(value_start, value_end));
                pos = value_end + 1;
            }

            let close = scanner
                .find_char('>', pos)
                .ok_or_else(|| missing(format!("'>' of <{}>", start.name)))?;
            node.span = Span::new(open, close + 1);
            scanner.cursor = node.span.end;
        }

        NodeKind::End(end) => {
            if let Some(opener_end) = opener_end {
                // `<name/>` closes itself: nothing of its own in the text.
                end.name_span = Span::empty(opener_end);
                node.span = Span::empty(opener_end);
                return Ok(());
            }
            let name_at = scanner
                .find(&end.name, at)
                .ok_or_else(|| missing(format!("end tag </{}>", end.name)))?;
            let open = scanner
                .open_bracket(name_at)
                .ok_or_else(|| missing(format!("'<' of </{}>", end.name)))?;
            end.name_span = Span::new(name_at, name_at + end.name.len());
            let close = scanner
                .find_char('>', end.name_span.end)
                .ok_or_else(|| missing(format!("'>' of </{}>", end.name)))?;
            node.span = Span::new(open, close + 1);
            scanner.cursor = node.span.end;
        }

        NodeKind::Text(text) => {
            let start = scanner
                .find(&text.raw, at)
                .ok_or_else(|| missing("text"))?;
            node.span = Span::new(start, start + text.raw.len());
            scanner.cursor = node.span.end;
        }

        NodeKind::Comment(comment) => {
            let (span, body) = delimited(scanner, at, COMMENT_OPEN, &comment.raw, COMMENT_CLOSE)
                .ok_or_else(|| missing("comment"))?;
            comment.body = body;
            node.span = span;
            scanner.cursor = span.end;
        }

        NodeKind::CData(cdata) => {
            let (span, body) = delimited(scanner, at, CDATA_OPEN, &cdata.data, CDATA_CLOSE)
                .ok_or_else(|| missing("CDATA section"))?;
            cdata.body = body;
            node.span = span;
            scanner.cursor = span.end;
        }

        NodeKind::Instruction(pi) => {
            let target_at = scanner
                .find(&pi.target, at)
                .ok_or_else(|| missing(format!("processing instruction '{}'", pi.target)))?;
            let open = scanner
                .open_bracket(target_at)
                .ok_or_else(|| missing(format!("'<?' of '{}'", pi.target)))?;
            pi.target_span = Span::new(target_at, target_at + pi.target.len());
            let mut pos = pi.target_span.end;
            pi.data_span = Span::empty(pos);
            if !pi.data.is_empty() {
                let data_at = scanner
                    .find(&pi.data, pos)
                    .ok_or_else(|| missing(format!("data of '{}'", pi.target)))?;
                pi.data_span = Span::new(data_at, data_at + pi.data.len());
                pos = pi.data_span.end;
            }
            let close = scanner
                .find(PI_CLOSE, pos)
                .ok_or_else(|| missing(format!("'?>' of '{}'", pi.target)))?;
            node.span = Span::new(open, close + PI_CLOSE.len());
            scanner.cursor = node.span.end;
        }

        NodeKind::Declaration(_) => {}
    }
    Ok(())
}

/// Locate `open` + `body` + `close` starting at `from`.
///
/// Returns the outer span and the body span. If the body text is not found
/// verbatim behind the opening delimiter, the body runs to the next `close`.
fn delimited(
    scanner: &Scanner<'_>,
    from: usize,
    open: &str,
    body: &str,
    close: &str,
) -> Option<(Span, Span)> {
    let start = scanner.find(open, from)?;
    let body_start = start + open.len();
    let body_end = if scanner.starts_with_at(body_start, body)
        && scanner.starts_with_at(body_start + body.len(), close)
    {
        body_start + body.len()
    } else {
        scanner.find(close, body_start)?
    };
    Some((
        Span::new(start, body_end + close.len()),
        Span::new(body_start, body_end),
    ))
}

fn set_empty(document: &mut XmlDocument, id: NodeId, at: usize) {
    let here = Span::empty(at);
    let node = document.node_mut(id);
    node.span = here;
    match &mut node.kind {
        NodeKind::Start(start) => {
            start.name_span = here;
            for attr in &mut start.attributes {
                attr.name_span = here;
                attr.assign = None;
                attr.value_span = None;
                attr.quote = None;
            }
        }
        NodeKind::End(end) => end.name_span = here,
        NodeKind::Comment(comment) => comment.body = here,
        NodeKind::CData(cdata) => cdata.body = here,
        NodeKind::Instruction(pi) => {
            pi.target_span = here;
            pi.data_span = here;
        }
        NodeKind::Text(_) | NodeKind::Declaration(_) => {}
    }
}

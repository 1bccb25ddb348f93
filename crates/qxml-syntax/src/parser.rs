//! The parser facade tying the pipeline together.

use std::path::Path;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::builder::TreeBuilder;
use crate::context::{DiagnosticListener, ParseContext};
use crate::declaration::insert_declaration;
use crate::diagnostic::DiagnosticMessage;
use crate::document::XmlDocument;
use crate::error::{Error, Result};
use crate::event::{EventSource, QuickXmlEventSource, SourceOutcome};
use crate::recovery::recover_positions;
use crate::types::{Node, NodeId};

/// Parses whole documents into position-annotated trees.
///
/// Every call to [`parse`](Self::parse) discards the previous document and
/// builds a new one: events are read from quick-xml into a tree, spans are
/// recovered from the text, and the `<?xml ...?>` declaration is prepended.
///
/// By default parsing halts at the first mismatched end tag. Use
/// [`set_halt_on_error(false)`](Self::set_halt_on_error) to record every
/// mismatch and keep going. Either way the partial document stays available.
///
/// # Example
///
/// ```rust
/// use qxml_syntax::{IsIn, XmlEventParser};
///
/// let mut parser = XmlEventParser::new();
/// assert!(parser.parse(r#"<a x="1">hi<b/></a>"#));
///
/// let doc = parser.document();
/// let a = doc.root().unwrap();
/// assert_eq!(doc.classify(a, 3), IsIn::IsInAttributeName(0));
/// ```
pub struct XmlEventParser {
    halt_on_error: bool,
    document: XmlDocument,
    ctx: ParseContext,
}

impl Default for XmlEventParser {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for XmlEventParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XmlEventParser")
            .field("halt_on_error", &self.halt_on_error)
            .field("nodes", &self.document.len())
            .field("ctx", &self.ctx)
            .finish()
    }
}

impl XmlEventParser {
    pub fn new() -> Self {
        Self {
            halt_on_error: true,
            document: XmlDocument::default(),
            ctx: ParseContext::new(),
        }
    }

    pub fn with_halt_on_error(mut self, halt_on_error: bool) -> Self {
        self.halt_on_error = halt_on_error;
        self
    }

    pub fn set_halt_on_error(&mut self, halt_on_error: bool) {
        self.halt_on_error = halt_on_error;
    }

    pub fn is_halt_on_error(&self) -> bool {
        self.halt_on_error
    }

    /// Receive each diagnostic when the parse pass that raised it finishes.
    pub fn set_listener(&mut self, listener: Option<DiagnosticListener>) {
        self.ctx.set_listener(listener);
    }

    /// Parse `text`, replacing the current document.
    ///
    /// Returns `true` if no errors were found. Warnings do not count.
    pub fn parse(&mut self, text: &str) -> bool {
        self.parse_with(text, QuickXmlEventSource::new(text))
    }

    /// Parse `text` using the events of `source`.
    pub fn parse_with<S: EventSource>(&mut self, text: &str, mut source: S) -> bool {
        debug!(
            bytes = text.len(),
            halt_on_error = self.halt_on_error,
            "parsing document"
        );
        self.ctx.clear();

        let mut builder = TreeBuilder::new(self.halt_on_error, &mut self.ctx);
        let outcome = source.run(&mut builder);
        let open = builder.open_elements();
        let mut document = builder.finish();

        recover_positions(text, &mut document, &mut self.ctx);

        match outcome {
            Ok(SourceOutcome::Completed) => {
                if let Some(&innermost) = open.first() {
                    let node = document.node(innermost);
                    let name = node.name().unwrap_or_default();
                    self.ctx.add_error(&Error::UnexpectedEof {
                        expected: format!("closing tag </{name}>"),
                        span: Some(node.span),
                    });
                } else if document.root().is_none() {
                    self.ctx.add_error(&Error::EmptyDocument);
                }
            }
            Ok(SourceOutcome::Halted) => {
                debug!(nodes = document.len(), "parse halted");
            }
            Err(err) => {
                warn!(error = %err, "xml parse failed");
                self.ctx.add_error(&err);
            }
        }

        insert_declaration(text, &mut document);

        self.document = document;
        self.ctx.publish(&self.document);

        let ok = !self.ctx.has_errors();
        debug!(
            nodes = self.document.len(),
            diagnostics = self.ctx.diagnostics().len(),
            ok,
            "parsed document"
        );
        ok
    }

    /// Read and parse a file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read; the current
    /// document is left untouched in that case.
    pub fn parse_file(&mut self, path: impl AsRef<Path>) -> Result<bool> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.parse(&text))
    }

    pub fn document(&self) -> &XmlDocument {
        &self.document
    }

    pub fn root_node(&self) -> Option<&Node> {
        self.document.root_node()
    }

    /// Every node in document order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.document.iter().map(|(_, node)| node)
    }

    pub fn node_for_offset(&self, position: usize) -> Option<NodeId> {
        self.document.node_for_offset(position)
    }

    /// Structural errors of the last parse, by message.
    pub fn errors(&self) -> &IndexMap<String, Vec<NodeId>> {
        self.ctx.errors()
    }

    /// All errors and warnings of the last parse.
    pub fn diagnostics(&self) -> &[DiagnosticMessage] {
        self.ctx.diagnostics()
    }
}

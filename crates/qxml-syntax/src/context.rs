//! Context for XML parsing with diagnostic collection.

use indexmap::IndexMap;

use crate::diagnostic::{DiagnosticKind, DiagnosticMessage};
use crate::document::XmlDocument;
use crate::error::Error;
use crate::types::NodeId;

/// Callback receiving every diagnostic as soon as a parse pass publishes it.
pub type DiagnosticListener = Box<dyn FnMut(&DiagnosticMessage)>;

/// Context for XML parsing that collects diagnostics.
///
/// Diagnostics are accumulated during parsing and can be retrieved
/// afterwards, which allows for warnings even on successful parses.
/// Structural errors are also filed in a multi-valued registry keyed by a
/// human readable message, pointing at the offending nodes.
///
/// Diagnostics that refer to a node get their span once the document's
/// positions are known; [`publish`](Self::publish) fills those in and hands
/// each new diagnostic to the listener.
#[derive(Default)]
pub struct ParseContext {
    diagnostics: Vec<DiagnosticMessage>,
    errors: IndexMap<String, Vec<NodeId>>,
    listener: Option<DiagnosticListener>,
    published: usize,
}

impl std::fmt::Debug for ParseContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParseContext")
            .field("diagnostics", &self.diagnostics)
            .field("errors", &self.errors)
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

impl ParseContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_listener(&mut self, listener: Option<DiagnosticListener>) {
        self.listener = listener;
    }

    /// Record an error, filing it in the registry when it names a node.
    pub fn add_error(&mut self, error: &Error) {
        if let Some(node) = error.node() {
            self.errors
                .entry(error.registry_message())
                .or_default()
                .push(node);
        }
        self.diagnostics.push(error.to_diagnostic());
    }

    pub fn add_diagnostic(&mut self, diagnostic: DiagnosticMessage) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn diagnostics(&self) -> &[DiagnosticMessage] {
        &self.diagnostics
    }

    /// Check if any errors (not warnings) have been collected.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::Error)
    }

    pub fn errors(&self) -> &IndexMap<String, Vec<NodeId>> {
        &self.errors
    }

    /// Forget everything from the previous pass. The listener is kept.
    pub fn clear(&mut self) {
        self.diagnostics.clear();
        self.errors.clear();
        self.published = 0;
    }

    /// Resolve node spans for unpublished diagnostics and notify the listener.
    pub fn publish(&mut self, document: &XmlDocument) {
        for diagnostic in &mut self.diagnostics[self.published..] {
            if diagnostic.span.is_none()
                && let Some(node) = diagnostic.node.and_then(|id| document.get(id))
            {
                diagnostic.span = Some(node.span);
            }
            if let Some(listener) = self.listener.as_mut() {
                listener(diagnostic);
            }
        }
        self.published = self.diagnostics.len();
    }
}

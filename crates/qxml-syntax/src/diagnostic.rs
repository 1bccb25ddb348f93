//! Diagnostic messages produced while parsing.
//!
//! A diagnostic carries a stable code (`X-1-*`), a short title, an optional
//! problem statement with details and hints, and an optional byte span into
//! the parsed text. Rendering with source snippets is left to the caller.

use serde::{Deserialize, Serialize};

use crate::types::{NodeId, Span};

/// The kind of diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub title: String,
    pub kind: DiagnosticKind,
    pub problem: Option<String>,
    pub details: Vec<String>,
    /// Suggestions for fixing the problem; by convention they end with `?`.
    pub hints: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<NodeId>,
}

impl DiagnosticMessage {
    pub fn new(kind: DiagnosticKind, title: impl Into<String>) -> Self {
        Self {
            code: None,
            title: title.into(),
            kind,
            problem: None,
            details: Vec::new(),
            hints: Vec::new(),
            span: None,
            node: None,
        }
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Error, title)
    }

    pub fn warning(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Warning, title)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn problem(mut self, problem: impl Into<String>) -> Self {
        self.problem = Some(problem.into());
        self
    }

    pub fn add_detail(mut self, detail: impl Into<String>) -> Self {
        self.details.push(detail.into());
        self
    }

    pub fn add_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_node(mut self, node: NodeId) -> Self {
        self.node = Some(node);
        self
    }

    pub fn is_error(&self) -> bool {
        self.kind == DiagnosticKind::Error
    }

    /// Render the message as plain text.
    ///
    /// ```text
    /// Error [X-1-3]: Mismatched XML End Tag
    /// End tag </b> does not match start tag <a>
    /// ✖ Expected: </a>
    /// ? Check that all opening tags have matching closing tags?
    /// ```
    pub fn to_text(&self) -> String {
        use std::fmt::Write;

        let mut result = String::new();
        let kind = match self.kind {
            DiagnosticKind::Error => "Error",
            DiagnosticKind::Warning => "Warning",
        };
        match &self.code {
            Some(code) => {
                let _ = write!(result, "{kind} [{code}]: {}", self.title);
            }
            None => {
                let _ = write!(result, "{kind}: {}", self.title);
            }
        }
        if let Some(problem) = &self.problem {
            let _ = write!(result, "\n{problem}");
        }
        for detail in &self.details {
            let _ = write!(result, "\n✖ {detail}");
        }
        for hint in &self.hints {
            let _ = write!(result, "\n? {hint}");
        }
        result
    }
}

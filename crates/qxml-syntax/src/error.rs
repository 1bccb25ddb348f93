//! Error types for XML parsing with source locations.

use std::path::PathBuf;

use thiserror::Error;

use crate::diagnostic::DiagnosticMessage;
use crate::types::{NodeId, Span};

/// Result type alias for qxml-syntax operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building a document.
#[derive(Debug, Error)]
pub enum Error {
    /// XML syntax error reported by the event source.
    #[error("XML syntax error: {message}{}", at_byte(.position))]
    XmlSyntax {
        message: String,
        /// Byte offset where the error occurred.
        position: Option<usize>,
    },

    /// The input ended while elements were still open.
    #[error("Unexpected end of input, expected {expected}")]
    UnexpectedEof {
        expected: String,
        /// Span of the innermost unclosed start tag.
        span: Option<Span>,
    },

    /// An end tag that does not close the innermost open element.
    #[error("Mismatched end tag: expected </{expected}>, found </{found}>")]
    MismatchedEndTag {
        expected: String,
        found: String,
        node: NodeId,
    },

    /// An end tag with no open element at all.
    #[error("Unexpected closing tag </{name}>")]
    UnmatchedEndTag { name: String, node: NodeId },

    /// No root element was found.
    #[error("Empty XML document: no root element found")]
    EmptyDocument,

    /// A node whose text could not be located in the source.
    #[error("Could not locate {what} in the source text")]
    OffsetRecovery { what: String, node: NodeId },

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn at_byte(position: &Option<usize>) -> String {
    position.map(|p| format!(" at byte {p}")).unwrap_or_default()
}

impl Error {
    /// Convert this error to a DiagnosticMessage with the appropriate X-1-* error code.
    ///
    /// Node-related diagnostics carry the node id; their span is filled in
    /// once positions have been recovered.
    pub fn to_diagnostic(&self) -> DiagnosticMessage {
        match self {
            Error::XmlSyntax { message, position } => {
                let mut msg = DiagnosticMessage::error("XML Syntax Error")
                    .with_code("X-1-1")
                    .problem(message.clone());
                if let Some(pos) = position {
                    msg = msg
                        .add_detail(format!("Error at byte offset {pos}"))
                        .with_span(Span::empty(*pos));
                }
                msg
            }

            Error::UnexpectedEof { expected, span } => {
                let mut msg = DiagnosticMessage::error("Unexpected End of XML Input")
                    .with_code("X-1-2")
                    .problem(format!(
                        "The XML document ended unexpectedly; expected {expected}"
                    ));
                if let Some(span) = span {
                    msg = msg.with_span(*span);
                }
                msg
            }

            Error::MismatchedEndTag {
                expected,
                found,
                node,
            } => DiagnosticMessage::error("Mismatched XML End Tag")
                .with_code("X-1-3")
                .problem(format!(
                    "End tag </{found}> does not match start tag <{expected}>"
                ))
                .add_detail(format!("Expected: </{expected}>"))
                .add_detail(format!("Found: </{found}>"))
                .add_hint("Check that all opening tags have matching closing tags?")
                .with_node(*node),

            Error::UnmatchedEndTag { name, node } => {
                DiagnosticMessage::error("Unmatched XML End Tag")
                    .with_code("X-1-4")
                    .problem(format!("End tag </{name}> has no matching start tag"))
                    .add_hint("Remove the end tag or add the missing start tag?")
                    .with_node(*node)
            }

            Error::EmptyDocument => DiagnosticMessage::error("Empty XML Document")
                .with_code("X-1-5")
                .problem("The XML document contains no root element")
                .add_hint("Add a root element to the document?"),

            Error::OffsetRecovery { what, node } => {
                DiagnosticMessage::warning("Source Position Not Found")
                    .with_code("X-1-6")
                    .problem(format!("Could not locate {what} in the source text"))
                    .add_detail("The reported position is a best guess")
                    .with_node(*node)
            }

            Error::Io { path, source } => DiagnosticMessage::error("Unable to Read File")
                .with_code("X-1-9")
                .problem(format!("Failed to read {}", path.display()))
                .add_detail(source.to_string()),
        }
    }

    /// The registry key this error is filed under.
    pub fn registry_message(&self) -> String {
        match self {
            Error::MismatchedEndTag { .. } => "End node does not match start node".to_string(),
            Error::UnmatchedEndTag { .. } => "End node has no matching start node".to_string(),
            other => other.to_string(),
        }
    }

    /// The node this error is attached to, if any.
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Error::MismatchedEndTag { node, .. }
            | Error::UnmatchedEndTag { node, .. }
            | Error::OffsetRecovery { node, .. } => Some(*node),
            _ => None,
        }
    }
}

/// A warning raised while reading a document; parsing continues.
pub(crate) fn warning_diagnostic(message: &str, position: Option<usize>) -> DiagnosticMessage {
    let mut msg = DiagnosticMessage::warning("XML Parser Warning")
        .with_code("X-1-7")
        .problem(message.to_string());
    if let Some(pos) = position {
        msg = msg.with_span(Span::empty(pos));
    }
    msg
}

/// A second top-level element; kept in the node list but not linked to the root.
pub(crate) fn multiple_roots_diagnostic(name: &str, node: NodeId) -> DiagnosticMessage {
    DiagnosticMessage::warning("Multiple XML Root Elements")
        .with_code("X-1-8")
        .problem(format!("Element <{name}> appears after the root element"))
        .add_detail("XML documents must have exactly one root element")
        .add_hint("Wrap multiple elements in a single container element?")
        .with_node(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = Error::XmlSyntax {
            message: "bad".into(),
            position: Some(7),
        };
        assert_eq!(err.to_string(), "XML syntax error: bad at byte 7");

        let err = Error::XmlSyntax {
            message: "bad".into(),
            position: None,
        };
        assert_eq!(err.to_string(), "XML syntax error: bad");

        let err = Error::MismatchedEndTag {
            expected: "a".into(),
            found: "b".into(),
            node: NodeId(2),
        };
        assert_eq!(
            err.to_string(),
            "Mismatched end tag: expected </a>, found </b>"
        );
    }

    #[test]
    fn test_mismatch_diagnostic_carries_node() {
        let err = Error::MismatchedEndTag {
            expected: "a".into(),
            found: "b".into(),
            node: NodeId(2),
        };
        let diag = err.to_diagnostic();
        assert_eq!(diag.code.as_deref(), Some("X-1-3"));
        assert_eq!(diag.span, None);
        assert_eq!(diag.node, Some(NodeId(2)));
        assert_eq!(err.node(), Some(NodeId(2)));
        assert_eq!(err.registry_message(), "End node does not match start node");
    }

    #[test]
    fn test_syntax_diagnostic_points_at_position() {
        let err = Error::XmlSyntax {
            message: "bad".into(),
            position: Some(4),
        };
        let diag = err.to_diagnostic();
        assert_eq!(diag.code.as_deref(), Some("X-1-1"));
        assert_eq!(diag.span, Some(Span::empty(4)));
    }

    #[test]
    fn test_empty_document_diagnostic() {
        let diag = Error::EmptyDocument.to_diagnostic();
        assert_eq!(diag.code.as_deref(), Some("X-1-5"));
        assert!(diag.is_error());
        assert!(diag.span.is_none());
    }
}

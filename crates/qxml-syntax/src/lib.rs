//! Position-annotated XML document trees for editors.
//!
//! This crate parses XML text into a tree of nodes where every construct
//! (tags, attribute names and values, text runs, comments, CDATA sections,
//! processing instructions and the `<?xml ...?>` declaration) knows exactly
//! which bytes of the source it came from. Editors use that to answer "what
//! is under the cursor" and to drive syntax highlighting.
//!
//! # Overview
//!
//! The main types are:
//! - [`XmlEventParser`]: parses text and keeps the last document and its diagnostics
//! - [`XmlDocument`]: the node arena, flat document order and tree links
//! - [`Node`] / [`NodeKind`]: a positioned node and its variant payload
//! - [`IsIn`] / [`CursorContext`]: the answer to an offset query
//!
//! # Example
//!
//! ```rust
//! use qxml_syntax::{IsIn, NodeType, XmlEventParser};
//!
//! let text = r#"<?xml version="1.0"?><note to="you"><!-- hi --></note>"#;
//! let mut parser = XmlEventParser::new();
//! assert!(parser.parse(text));
//!
//! let doc = parser.document();
//! let first = doc.node(doc.order()[0]);
//! assert_eq!(first.node_type(), NodeType::Declaration);
//! assert_eq!(first.as_declaration().unwrap().version(), Some("1.0"));
//!
//! let offset = text.find("you").unwrap();
//! let ctx = doc.context_at(offset).unwrap();
//! assert_eq!(ctx.is_in, IsIn::IsInAttributeValue(0));
//! assert_eq!(ctx.path, vec!["note"]);
//!
//! // Nodes serialize back to their source text.
//! assert_eq!(doc.flat_string(), text);
//! ```
//!
//! # Pipeline
//!
//! 1. An [`EventSource`] (normally [`QuickXmlEventSource`]) reports logical
//!    events in document order.
//! 2. The tree builder turns them into nodes, linking end tags to start tags
//!    and flagging mismatches.
//! 3. Position recovery scans the text forward to give every node its span.
//! 4. The declaration is matched at the head of the text and put first.

mod builder;
pub mod context;
pub mod declaration;
pub mod diagnostic;
pub mod document;
pub mod error;
pub mod event;
pub mod line_index;
pub mod parser;
pub mod query;
mod recovery;
mod serialize;
pub mod types;

pub use context::{DiagnosticListener, ParseContext};
pub use declaration::extract_declaration;
pub use diagnostic::{DiagnosticKind, DiagnosticMessage};
pub use document::{NodeSummary, XmlDocument};
pub use error::{Error, Result};
pub use event::{
    EventAttribute, EventHandler, EventSource, PositionedEvent, QuickXmlEventSource,
    SourceOutcome, XmlEvent,
};
pub use line_index::{LineIndex, Location};
pub use parser::XmlEventParser;
pub use query::{CursorContext, IsIn};
pub use types::{
    Attribute, CDataNode, CommentNode, DeclarationField, DeclarationNode, EndNode,
    InstructionNode, Node, NodeErrors, NodeId, NodeKind, NodeType, Span, StartNode, TextNode,
};

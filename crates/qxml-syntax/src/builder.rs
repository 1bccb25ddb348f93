//! Document tree builder.
//!
//! Consumes [`PositionedEvent`]s and grows the node arena: start nodes
//! descend, matching end nodes link to their start and ascend, everything
//! else is attached to the current parent. Nodes are appended to the flat
//! order as they are created. No positions are assigned here.

use std::ops::ControlFlow;

use tracing::{debug, warn};

use crate::context::ParseContext;
use crate::document::XmlDocument;
use crate::error::{Error, multiple_roots_diagnostic, warning_diagnostic};
use crate::event::{EventAttribute, EventHandler, PositionedEvent, XmlEvent};
use crate::types::{
    Attribute, CDataNode, CommentNode, EndNode, InstructionNode, Node, NodeErrors, NodeId,
    NodeKind, Span, StartNode, TextNode,
};

pub(crate) struct TreeBuilder<'c> {
    document: XmlDocument,
    current: Option<NodeId>,
    halt_on_error: bool,
    ctx: &'c mut ParseContext,
}

impl<'c> TreeBuilder<'c> {
    pub(crate) fn new(halt_on_error: bool, ctx: &'c mut ParseContext) -> Self {
        Self {
            document: XmlDocument::default(),
            current: None,
            halt_on_error,
            ctx,
        }
    }

    /// Start nodes still waiting for their end tag, innermost first.
    pub(crate) fn open_elements(&self) -> Vec<NodeId> {
        std::iter::successors(self.current, |&id| self.document.parent(id))
            .filter(|&id| self.document.node(id).as_start().is_some())
            .collect()
    }

    pub(crate) fn finish(self) -> XmlDocument {
        self.document
    }

    /// Add a node under the current parent and to the flat order.
    fn attach(&mut self, kind: NodeKind, anchor: Option<usize>) -> NodeId {
        let mut node = Node::new(kind, anchor);
        node.parent = self.current;
        let id = self.document.push(node);
        if let Some(parent) = self.current {
            self.document.node_mut(parent).children.push(id);
        }
        self.document.order.push(id);
        id
    }

    fn start_element(
        &mut self,
        name: String,
        attributes: Vec<EventAttribute>,
        self_closing: bool,
        anchor: Option<usize>,
    ) {
        let attributes = attributes
            .into_iter()
            .map(|a| Attribute::new(a.name, a.value, a.raw_value))
            .collect();
        let start = StartNode {
            name,
            name_span: Span::default(),
            attributes,
            closer: None,
            self_closing,
        };

        let top_level = self.current.is_none();
        let id = self.attach(NodeKind::Start(start), anchor);
        if self.document.root.is_none() {
            self.document.root = Some(id);
        } else if top_level {
            let name = self.document.node(id).name().unwrap_or_default().to_string();
            warn!(element = %name, "element after the root element");
            self.ctx.add_diagnostic(multiple_roots_diagnostic(&name, id));
        }
        self.current = Some(id);
    }

    fn end_element(
        &mut self,
        name: String,
        self_closing: bool,
        anchor: Option<usize>,
    ) -> ControlFlow<()> {
        let end = EndNode {
            name,
            name_span: Span::default(),
            opener: None,
            self_closing,
        };

        let open = self.current.and_then(|id| {
            let start = self.document.node(id).as_start()?;
            Some((id, start.name.clone()))
        });

        match open {
            Some((start_id, start_name)) if start_name == end.name => {
                let grandparent = self.document.parent(start_id);
                let end = EndNode {
                    opener: Some(start_id),
                    ..end
                };
                // The end tag sits beside its start tag, under the same parent.
                self.current = grandparent;
                let id = self.attach(NodeKind::End(end), anchor);
                if let NodeKind::Start(start) = &mut self.document.node_mut(start_id).kind {
                    start.closer = Some(id);
                }
                ControlFlow::Continue(())
            }
            Some((_, start_name)) => {
                let found = end.name.clone();
                let id = self.attach(NodeKind::End(end), anchor);
                self.document
                    .node_mut(id)
                    .errors
                    .insert(NodeErrors::MISMATCHED_NODES);
                debug!(expected = %start_name, found = %found, "mismatched end tag");
                self.ctx.add_error(&Error::MismatchedEndTag {
                    expected: start_name,
                    found,
                    node: id,
                });
                self.error_flow()
            }
            None => {
                let found = end.name.clone();
                let id = self.attach(NodeKind::End(end), anchor);
                self.document
                    .node_mut(id)
                    .errors
                    .insert(NodeErrors::MISMATCHED_NODES);
                debug!(found = %found, "end tag without start tag");
                self.ctx
                    .add_error(&Error::UnmatchedEndTag { name: found, node: id });
                self.error_flow()
            }
        }
    }

    fn error_flow(&self) -> ControlFlow<()> {
        if self.halt_on_error {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }
}

impl EventHandler for TreeBuilder<'_> {
    fn handle(&mut self, event: PositionedEvent) -> ControlFlow<()> {
        let PositionedEvent { event, anchor } = event;
        match event {
            XmlEvent::StartElement {
                name,
                attributes,
                self_closing,
            } => self.start_element(name, attributes, self_closing, anchor),
            XmlEvent::EndElement { name, self_closing } => {
                return self.end_element(name, self_closing, anchor);
            }
            XmlEvent::Text { raw, content } => {
                self.attach(NodeKind::Text(TextNode { text: content, raw }), anchor);
            }
            XmlEvent::Comment { raw } => {
                let comment = CommentNode {
                    comment: raw.trim().to_string(),
                    raw,
                    body: Span::default(),
                };
                self.attach(NodeKind::Comment(comment), anchor);
            }
            XmlEvent::CData { raw } => {
                let cdata = CDataNode {
                    data: raw,
                    body: Span::default(),
                };
                self.attach(NodeKind::CData(cdata), anchor);
            }
            XmlEvent::ProcessingInstruction { target, data } => {
                let pi = InstructionNode {
                    target,
                    data,
                    target_span: Span::default(),
                    data_span: Span::default(),
                };
                self.attach(NodeKind::Instruction(pi), anchor);
            }
            XmlEvent::Warning { message } => {
                warn!(%message, "xml parser warning");
                self.ctx.add_diagnostic(warning_diagnostic(&message, anchor));
            }
        }
        ControlFlow::Continue(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventSource, SourceOutcome};
    use crate::types::NodeType;

    fn start(name: &str) -> PositionedEvent {
        XmlEvent::StartElement {
            name: name.into(),
            attributes: vec![],
            self_closing: false,
        }
        .into()
    }

    fn end(name: &str) -> PositionedEvent {
        XmlEvent::EndElement {
            name: name.into(),
            self_closing: false,
        }
        .into()
    }

    fn build(
        events: Vec<PositionedEvent>,
        halt: bool,
    ) -> (XmlDocument, ParseContext, SourceOutcome, Vec<NodeId>) {
        let mut ctx = ParseContext::new();
        let mut events = events;
        let mut builder = TreeBuilder::new(halt, &mut ctx);
        let outcome = events.run(&mut builder).unwrap();
        let open = builder.open_elements();
        let doc = builder.finish();
        (doc, ctx, outcome, open)
    }

    #[test]
    fn test_matching_end_links_closer() {
        let (doc, ctx, outcome, open) =
            build(vec![start("a"), start("b"), end("b"), end("a")], true);
        assert_eq!(outcome, SourceOutcome::Completed);
        assert!(open.is_empty());
        assert!(!ctx.has_diagnostics());

        let a = doc.root().unwrap();
        let b = doc.children(a)[0];
        let end_b = doc.closer(b).unwrap();
        assert_eq!(doc.opener(end_b), Some(b));
        assert_eq!(doc.parent(end_b), Some(a));
        assert_eq!(doc.parent(doc.closer(a).unwrap()), None);
        assert_eq!(doc.len(), 4);
    }

    #[test]
    fn test_mismatch_halts_by_default() {
        let (doc, ctx, outcome, open) =
            build(vec![start("a"), start("b"), end("c"), end("a")], true);
        assert_eq!(outcome, SourceOutcome::Halted);
        assert_eq!(doc.len(), 3);
        assert_eq!(open.len(), 2);

        let c = doc.order()[2];
        assert!(doc.node(c).errors.contains(NodeErrors::MISMATCHED_NODES));
        assert_eq!(
            ctx.errors().get("End node does not match start node"),
            Some(&vec![c])
        );
    }

    #[test]
    fn test_mismatch_without_halt_does_not_ascend() {
        let (doc, _, outcome, open) =
            build(vec![start("a"), start("b"), end("c"), end("a")], false);
        assert_eq!(outcome, SourceOutcome::Completed);
        let a = doc.root().unwrap();
        let b = doc.children(a)[0];

        // </a> is compared against the still-open <b>
        let first_a = doc.order()[3];
        assert!(doc.node(first_a).errors.contains(NodeErrors::MISMATCHED_NODES));
        assert_eq!(doc.closer(b), None);
        assert_eq!(doc.children(b).len(), 2);
        assert_eq!(open, vec![b, a]);
    }

    #[test]
    fn test_unmatched_end_at_top_level() {
        let (doc, ctx, outcome, _) = build(vec![end("x")], false);
        assert_eq!(outcome, SourceOutcome::Completed);
        assert_eq!(doc.len(), 1);
        assert!(doc.root().is_none());
        assert!(ctx.errors().contains_key("End node has no matching start node"));
    }

    #[test]
    fn test_second_root_is_kept_with_warning() {
        let (doc, ctx, _, _) = build(vec![start("a"), end("a"), start("b"), end("b")], true);
        let b = doc.order()[2];
        assert_eq!(doc.root(), Some(doc.order()[0]));
        assert_eq!(doc.parent(b), None);
        assert_eq!(doc.closer(b), Some(doc.order()[3]));
        assert_eq!(ctx.diagnostics()[0].code.as_deref(), Some("X-1-8"));
        assert!(!ctx.has_errors());
    }

    #[test]
    fn test_top_level_comment_has_no_parent() {
        let comment = XmlEvent::Comment {
            raw: " note ".into(),
        };
        let (doc, _, _, _) = build(vec![comment.into(), start("r"), end("r")], true);
        let first = doc.node(doc.order()[0]);
        assert_eq!(first.node_type(), NodeType::Comment);
        assert_eq!(first.parent, None);
        assert_eq!(first.as_comment().unwrap().comment, "note");
        assert_eq!(doc.root(), Some(doc.order()[1]));
    }

    #[test]
    fn test_warning_becomes_diagnostic() {
        let warning = XmlEvent::Warning {
            message: "odd".into(),
        };
        let (_, ctx, _, _) = build(vec![start("r"), warning.into(), end("r")], true);
        assert_eq!(ctx.diagnostics().len(), 1);
        assert_eq!(ctx.diagnostics()[0].code.as_deref(), Some("X-1-7"));
    }
}

//! The parsed document: a node arena plus the flat document order.

use serde::Serialize;

use crate::types::{Node, NodeErrors, NodeId, NodeType, Span};

/// A fully built document tree.
///
/// Nodes are owned by the arena and addressed by [`NodeId`]; the tree is
/// expressed through `parent` and `children` links, and `order` lists every
/// node in document order. A re-parse produces a new document.
#[derive(Debug, Clone, Default)]
pub struct XmlDocument {
    pub(crate) arena: Vec<Node>,
    pub(crate) order: Vec<NodeId>,
    pub(crate) root: Option<NodeId>,
    pub(crate) declaration: Option<NodeId>,
}

/// Flat, serializable view of a node for listings.
#[derive(Debug, Clone, Serialize)]
pub struct NodeSummary {
    pub id: NodeId,
    pub node_type: NodeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub span: Span,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,
    pub children: usize,
    pub mismatched: bool,
    pub anomaly: bool,
}

impl XmlDocument {
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn root_node(&self) -> Option<&Node> {
        self.root.map(|id| &self.arena[id.0])
    }

    pub fn declaration(&self) -> Option<NodeId> {
        self.declaration
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id.0)
    }

    /// # Panics
    ///
    /// Panics if `id` does not belong to this document.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.arena[id.0]
    }

    /// All node ids in document order.
    pub fn order(&self) -> &[NodeId] {
        &self.order
    }

    /// All nodes in document order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.order.iter().map(|&id| (id, &self.arena[id.0]))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or_default()
    }

    /// Walk from `id` up to the top-level node, `id` excluded.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&p| self.parent(p))
    }

    /// The end node closing a start node.
    pub fn closer(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.as_start()).and_then(|s| s.closer)
    }

    /// The start node an end node closes.
    pub fn opener(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.as_end()).and_then(|e| e.opener)
    }

    /// Nodes carrying any error flag, in document order.
    pub fn flagged(&self, flag: NodeErrors) -> impl Iterator<Item = NodeId> + '_ {
        self.iter()
            .filter(move |(_, n)| n.errors.contains(flag))
            .map(|(id, _)| id)
    }

    /// Span of a whole element, from its start tag to its end tag.
    ///
    /// Without a closer the element extends to its furthest descendant. For
    /// any other node this is the node's own span.
    pub fn element_span(&self, id: NodeId) -> Span {
        let node = self.node(id);
        let Some(start) = node.as_start() else {
            return node.span;
        };
        let mut end = node.span.end;
        if let Some(closer) = start.closer {
            end = end.max(self.node(closer).span.end);
        }
        for &child in &node.children {
            end = end.max(self.element_span(child).end);
        }
        Span::new(node.span.start, end)
    }

    pub fn summary(&self, id: NodeId) -> NodeSummary {
        let node = self.node(id);
        NodeSummary {
            id,
            node_type: node.node_type(),
            name: node.name().map(str::to_string),
            span: node.span,
            parent: node.parent,
            children: node.children.len(),
            mismatched: node.errors.contains(NodeErrors::MISMATCHED_NODES),
            anomaly: node.errors.contains(NodeErrors::OFFSET_ANOMALY),
        }
    }

    pub fn summaries(&self) -> Vec<NodeSummary> {
        self.order.iter().map(|&id| self.summary(id)).collect()
    }

    pub(crate) fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.arena.len());
        self.arena.push(node);
        id
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.arena[id.0]
    }
}

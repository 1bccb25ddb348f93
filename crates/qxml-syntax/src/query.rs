//! Cursor and offset queries.

use serde::Serialize;

use crate::document::XmlDocument;
use crate::types::{NodeId, NodeKind, NodeType};

/// Which part of a node an offset falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IsIn {
    /// The offset is outside the node.
    NotInNode,
    /// Inside the node but not in any named part, e.g. on a delimiter.
    IsInNode,
    /// In the name of the attribute at this index.
    IsInAttributeName(usize),
    /// In the quoted value of the attribute at this index.
    IsInAttributeValue(usize),
    IsInName,
    IsInText,
    IsInComment,
    IsInCData,
    IsInPITarget,
    IsInPIData,
}

/// Everything an editor needs to describe the cursor position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CursorContext {
    pub node: NodeId,
    pub node_type: NodeType,
    pub is_in: IsIn,
    /// Names of the enclosing elements, outermost first, ending with the
    /// node's own name when it has one.
    pub path: Vec<String>,
    /// Name of the attribute under the cursor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl XmlDocument {
    /// The first node, in document order, whose span contains `position`.
    pub fn node_for_offset(&self, position: usize) -> Option<NodeId> {
        self.iter()
            .find(|(_, node)| node.contains(position))
            .map(|(id, _)| id)
    }

    /// Classify `position` relative to node `id`.
    pub fn classify(&self, id: NodeId, position: usize) -> IsIn {
        let Some(node) = self.get(id) else {
            return IsIn::NotInNode;
        };
        if !node.contains(position) {
            return IsIn::NotInNode;
        }

        match &node.kind {
            NodeKind::Start(start) => {
                if start.name_span.contains(position) {
                    return IsIn::IsInName;
                }
                for (index, attr) in start.attributes.iter().enumerate() {
                    if attr.name_span.contains(position) {
                        return IsIn::IsInAttributeName(index);
                    }
                    if attr
                        .quoted_value_span()
                        .is_some_and(|span| span.contains(position))
                    {
                        return IsIn::IsInAttributeValue(index);
                    }
                }
                IsIn::IsInNode
            }
            NodeKind::End(end) if end.name_span.contains(position) => IsIn::IsInName,
            NodeKind::Declaration(decl) if decl.name_span.contains(position) => IsIn::IsInName,
            NodeKind::Text(_) => IsIn::IsInText,
            NodeKind::Comment(comment) if comment.body.contains(position) => IsIn::IsInComment,
            NodeKind::CData(cdata) if cdata.body.contains(position) => IsIn::IsInCData,
            NodeKind::Instruction(pi) if pi.target_span.contains(position) => IsIn::IsInPITarget,
            NodeKind::Instruction(pi) if pi.data_span.contains(position) => IsIn::IsInPIData,
            _ => IsIn::IsInNode,
        }
    }

    /// Find and classify the node under `position`.
    pub fn context_at(&self, position: usize) -> Option<CursorContext> {
        let id = self.node_for_offset(position)?;
        let node = self.node(id);
        let is_in = self.classify(id, position);

        let mut path: Vec<String> = self
            .ancestors(id)
            .filter_map(|a| self.node(a).name().map(str::to_string))
            .collect();
        path.reverse();
        if let Some(name) = node.name() {
            path.push(name.to_string());
        }

        let attribute = match (is_in, node.as_start()) {
            (IsIn::IsInAttributeName(i) | IsIn::IsInAttributeValue(i), Some(start)) => {
                start.attributes.get(i).map(|a| a.name.clone())
            }
            _ => None,
        };

        Some(CursorContext {
            node: id,
            node_type: node.node_type(),
            is_in,
            path,
            attribute,
        })
    }

    /// The tag paired with `id`: a start tag's closer or an end tag's opener.
    pub fn matching_tag(&self, id: NodeId) -> Option<NodeId> {
        match &self.get(id)?.kind {
            NodeKind::Start(start) => start.closer,
            NodeKind::End(end) => end.opener,
            _ => None,
        }
    }
}

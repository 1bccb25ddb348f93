//! Core node types for position-annotated XML documents.
//!
//! Nodes live in the arena owned by [`XmlDocument`](crate::XmlDocument) and
//! refer to each other through [`NodeId`]s. Every offset is a byte offset
//! into the source text that was parsed.

use serde::Serialize;

/// A half-open `[start, end)` byte range in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start {start} is after end {end}");
        Self { start, end }
    }

    /// A zero-width span sitting at `at`.
    pub fn empty(at: usize) -> Self {
        Self { start: at, end: at }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check whether `position` lies inside the span (end is exclusive).
    pub fn contains(&self, position: usize) -> bool {
        position >= self.start && position < self.end
    }

    /// Check whether `other` lies entirely inside this span.
    pub fn encloses(&self, other: Span) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    /// The overlap of two spans, if they overlap at all.
    pub fn intersect(&self, other: Span) -> Option<Span> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then_some(Span { start, end })
    }
}

/// Index of a node inside its document's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub usize);

/// The node type, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeType {
    Declaration,
    Text,
    Start,
    End,
    CData,
    Instruction,
    Comment,
}

/// Error flags attached to a node during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct NodeErrors(u8);

impl NodeErrors {
    pub const NONE: NodeErrors = NodeErrors(0);
    /// The end tag does not close the innermost open start tag.
    pub const MISMATCHED_NODES: NodeErrors = NodeErrors(0x1);
    /// Offset recovery could not place this node; its span is a guess.
    pub const OFFSET_ANOMALY: NodeErrors = NodeErrors(0x2);

    pub fn contains(&self, flag: NodeErrors) -> bool {
        self.0 & flag.0 == flag.0 && flag.0 != 0
    }

    pub fn insert(&mut self, flag: NodeErrors) {
        self.0 |= flag.0;
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

/// A single node of the document tree.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    /// Span of the whole construct, delimiters included.
    pub span: Span,
    /// Non-owning link to the enclosing start node.
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub errors: NodeErrors,
    /// Offsets of every `\n` inside `span`, used to reproduce the layout.
    pub newlines: Vec<usize>,
    /// Runs of XML whitespace inside `span` as `(offset, run)`, in order.
    pub whitespace: Vec<(usize, String)>,
    /// Where the event source began reading this construct, when known.
    pub(crate) anchor: Option<usize>,
}

/// Variant-specific payload of a [`Node`].
#[derive(Debug, Clone)]
pub enum NodeKind {
    Declaration(DeclarationNode),
    Start(StartNode),
    End(EndNode),
    Text(TextNode),
    CData(CDataNode),
    Comment(CommentNode),
    Instruction(InstructionNode),
}

#[derive(Debug, Clone)]
pub struct StartNode {
    pub name: String,
    pub name_span: Span,
    /// Attributes in source order; duplicates are preserved.
    pub attributes: Vec<Attribute>,
    /// The end node closing this element, once seen.
    pub closer: Option<NodeId>,
    /// `true` for `<name/>`.
    pub self_closing: bool,
}

#[derive(Debug, Clone)]
pub struct EndNode {
    pub name: String,
    pub name_span: Span,
    /// The start node this end tag closes, if it matched one.
    pub opener: Option<NodeId>,
    /// `true` for the implicit end of `<name/>`, which has no text of its own.
    pub self_closing: bool,
}

/// An attribute of a start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    /// The value with entities decoded.
    pub value: Option<String>,
    /// The value exactly as written between the quotes.
    pub raw_value: Option<String>,
    pub name_span: Span,
    /// Offset of the `=` sign.
    pub assign: Option<usize>,
    /// Span of the raw value, quotes excluded.
    pub value_span: Option<Span>,
    pub quote: Option<char>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: Option<String>, raw_value: Option<String>) -> Self {
        Self {
            name: name.into(),
            value,
            raw_value,
            name_span: Span::default(),
            assign: None,
            value_span: None,
            quote: None,
        }
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    /// Span of the value including its quotes.
    pub fn quoted_value_span(&self) -> Option<Span> {
        let span = self.value_span?;
        match self.quote {
            Some(_) => Some(Span::new(span.start.saturating_sub(1), span.end + 1)),
            None => Some(span),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TextNode {
    /// The text with entities decoded.
    pub text: String,
    /// The text exactly as written.
    pub raw: String,
}

impl TextNode {
    /// `true` if the text only contains whitespace characters.
    pub fn is_whitespace(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct CommentNode {
    /// The comment body, trimmed.
    pub comment: String,
    /// Everything between `<!--` and `-->`.
    pub raw: String,
    pub body: Span,
}

impl CommentNode {
    pub fn is_whitespace(&self) -> bool {
        self.comment.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct CDataNode {
    pub data: String,
    pub body: Span,
}

#[derive(Debug, Clone)]
pub struct InstructionNode {
    pub target: String,
    pub data: String,
    pub target_span: Span,
    pub data_span: Span,
}

/// The `<?xml ... ?>` prologue.
#[derive(Debug, Clone)]
pub struct DeclarationNode {
    /// The `xml` keyword as written.
    pub name: String,
    pub name_span: Span,
    pub version: Option<DeclarationField>,
    pub encoding: Option<DeclarationField>,
    pub standalone: Option<DeclarationField>,
}

/// One pseudo-attribute of the declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationField {
    /// The keyword as written (`version`, `encoding` or `standalone`).
    pub keyword: String,
    pub keyword_span: Span,
    pub assign: usize,
    /// The value, quotes stripped.
    pub value: String,
    /// Span of the value, quotes excluded.
    pub value_span: Span,
    pub quote: char,
}

impl DeclarationNode {
    pub fn has_version(&self) -> bool {
        self.version.is_some()
    }

    pub fn has_encoding(&self) -> bool {
        self.encoding.is_some()
    }

    pub fn has_standalone(&self) -> bool {
        self.standalone.is_some()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_ref().map(|f| f.value.as_str())
    }

    pub fn encoding(&self) -> Option<&str> {
        self.encoding.as_ref().map(|f| f.value.as_str())
    }

    pub fn standalone(&self) -> Option<&str> {
        self.standalone.as_ref().map(|f| f.value.as_str())
    }

    /// The fields that are present, in document order.
    pub fn fields(&self) -> impl Iterator<Item = &DeclarationField> {
        let mut fields: Vec<&DeclarationField> = [&self.version, &self.encoding, &self.standalone]
            .into_iter()
            .flatten()
            .collect();
        fields.sort_by_key(|f| f.keyword_span.start);
        fields.into_iter()
    }
}

impl Node {
    pub(crate) fn new(kind: NodeKind, anchor: Option<usize>) -> Self {
        Self {
            kind,
            span: Span::default(),
            parent: None,
            children: Vec::new(),
            errors: NodeErrors::NONE,
            newlines: Vec::new(),
            whitespace: Vec::new(),
            anchor,
        }
    }

    /// Capture the newlines and whitespace runs of `text` inside `span`.
    pub(crate) fn record_layout(&mut self, text: &str) {
        let start = self.span.start;
        let Some(slice) = text.get(start..self.span.end) else {
            self.newlines.clear();
            self.whitespace.clear();
            return;
        };
        self.newlines = slice
            .match_indices('\n')
            .map(|(i, _)| start + i)
            .collect();
        self.whitespace.clear();
        let mut run: Option<usize> = None;
        for (i, b) in slice.bytes().enumerate() {
            let is_space = matches!(b, b' ' | b'\t' | b'\r' | b'\n');
            match (is_space, run) {
                (true, None) => run = Some(i),
                (false, Some(from)) => {
                    self.whitespace.push((start + from, slice[from..i].to_string()));
                    run = None;
                }
                _ => {}
            }
        }
        if let Some(from) = run {
            self.whitespace.push((start + from, slice[from..].to_string()));
        }
    }

    /// The recorded whitespace byte at `offset`, if `offset` lies in a run.
    pub fn whitespace_at(&self, offset: usize) -> Option<char> {
        let index = self.whitespace.partition_point(|(at, _)| *at <= offset);
        let (at, run) = self.whitespace.get(index.checked_sub(1)?)?;
        run.as_bytes().get(offset - at).map(|&b| char::from(b))
    }

    pub fn node_type(&self) -> NodeType {
        match &self.kind {
            NodeKind::Declaration(_) => NodeType::Declaration,
            NodeKind::Start(_) => NodeType::Start,
            NodeKind::End(_) => NodeType::End,
            NodeKind::Text(_) => NodeType::Text,
            NodeKind::CData(_) => NodeType::CData,
            NodeKind::Comment(_) => NodeType::Comment,
            NodeKind::Instruction(_) => NodeType::Instruction,
        }
    }

    pub fn start(&self) -> usize {
        self.span.start
    }

    pub fn end(&self) -> usize {
        self.span.end
    }

    pub fn len(&self) -> usize {
        self.span.len()
    }

    pub fn is_empty(&self) -> bool {
        self.span.is_empty()
    }

    pub fn contains(&self, position: usize) -> bool {
        self.span.contains(position)
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// The name of start, end and declaration nodes.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Start(s) => Some(&s.name),
            NodeKind::End(e) => Some(&e.name),
            NodeKind::Declaration(d) => Some(&d.name),
            _ => None,
        }
    }

    /// Span of the name of start, end and declaration nodes.
    pub fn name_span(&self) -> Option<Span> {
        match &self.kind {
            NodeKind::Start(s) => Some(s.name_span),
            NodeKind::End(e) => Some(e.name_span),
            NodeKind::Declaration(d) => Some(d.name_span),
            _ => None,
        }
    }

    pub fn as_start(&self) -> Option<&StartNode> {
        match &self.kind {
            NodeKind::Start(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_end(&self) -> Option<&EndNode> {
        match &self.kind {
            NodeKind::End(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextNode> {
        match &self.kind {
            NodeKind::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_comment(&self) -> Option<&CommentNode> {
        match &self.kind {
            NodeKind::Comment(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_cdata(&self) -> Option<&CDataNode> {
        match &self.kind {
            NodeKind::CData(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_instruction(&self) -> Option<&InstructionNode> {
        match &self.kind {
            NodeKind::Instruction(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_declaration(&self) -> Option<&DeclarationNode> {
        match &self.kind {
            NodeKind::Declaration(d) => Some(d),
            _ => None,
        }
    }
}

use serde::Deserialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Stable identifier assigned to every node when a [`Document`] is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Closed set of element kinds the renderer knows how to lay out.
///
/// Tags that are not listed here are kept as `Unknown` and rendered by the
/// generic block container.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    Text,
    Comment,
    // Structural containers
    Html,
    Body,
    Division,
    // Metadata that never produces output
    Head,
    Script,
    Style,
    ColumnGroup,
    // Block content
    Paragraph,
    Heading(u8),
    Blockquote,
    Preformatted,
    HorizontalRule,
    UnorderedList,
    OrderedList,
    ListItem,
    DefinitionList,
    DefinitionTerm,
    DefinitionDescription,
    // Tables
    Table,
    Caption,
    TableHead,
    TableBody,
    TableFoot,
    TableRow,
    TableHeaderCell,
    TableDataCell,
    // Inline content
    Span,
    Strong,
    Emphasis,
    Underline,
    Strikethrough,
    Code,
    Keyboard,
    Mark,
    Link,
    Image,
    LineBreak,
    Unknown(String),
}

impl NodeKind {
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim().to_ascii_lowercase();
        match tag.as_str() {
            "#document" | "document" | "root" => NodeKind::Document,
            "#text" | "text" => NodeKind::Text,
            "#comment" | "comment" => NodeKind::Comment,
            "html" => NodeKind::Html,
            "body" => NodeKind::Body,
            "div" | "section" | "article" | "main" | "header" | "footer" | "nav" | "aside"
            | "figure" | "figcaption" | "details" | "summary" | "address" => NodeKind::Division,
            "head" | "title" | "meta" | "link" => NodeKind::Head,
            "script" | "noscript" | "template" => NodeKind::Script,
            "style" => NodeKind::Style,
            "colgroup" | "col" => NodeKind::ColumnGroup,
            "p" => NodeKind::Paragraph,
            "h1" => NodeKind::Heading(1),
            "h2" => NodeKind::Heading(2),
            "h3" => NodeKind::Heading(3),
            "h4" => NodeKind::Heading(4),
            "h5" => NodeKind::Heading(5),
            "h6" => NodeKind::Heading(6),
            "blockquote" => NodeKind::Blockquote,
            "pre" | "xmp" | "listing" => NodeKind::Preformatted,
            "hr" => NodeKind::HorizontalRule,
            "ul" | "menu" | "dir" => NodeKind::UnorderedList,
            "ol" => NodeKind::OrderedList,
            "li" => NodeKind::ListItem,
            "dl" => NodeKind::DefinitionList,
            "dt" => NodeKind::DefinitionTerm,
            "dd" => NodeKind::DefinitionDescription,
            "table" => NodeKind::Table,
            "caption" => NodeKind::Caption,
            "thead" => NodeKind::TableHead,
            "tbody" => NodeKind::TableBody,
            "tfoot" => NodeKind::TableFoot,
            "tr" => NodeKind::TableRow,
            "th" => NodeKind::TableHeaderCell,
            "td" => NodeKind::TableDataCell,
            "span" | "small" | "sub" | "sup" | "abbr" | "cite" | "q" | "time" | "var"
            | "samp" | "label" | "font" => NodeKind::Span,
            "strong" | "b" => NodeKind::Strong,
            "em" | "i" | "dfn" => NodeKind::Emphasis,
            "u" | "ins" => NodeKind::Underline,
            "s" | "del" | "strike" => NodeKind::Strikethrough,
            "code" | "tt" => NodeKind::Code,
            "kbd" => NodeKind::Keyboard,
            "mark" => NodeKind::Mark,
            "a" => NodeKind::Link,
            "img" => NodeKind::Image,
            "br" => NodeKind::LineBreak,
            _ => NodeKind::Unknown(tag),
        }
    }

    /// Name used to look the element up in the theme.
    pub fn style_key(&self) -> &str {
        match self {
            NodeKind::Document => "#document",
            NodeKind::Text => "#text",
            NodeKind::Comment => "#comment",
            NodeKind::Html => "html",
            NodeKind::Body => "body",
            NodeKind::Division => "div",
            NodeKind::Head => "head",
            NodeKind::Script => "script",
            NodeKind::Style => "style",
            NodeKind::ColumnGroup => "colgroup",
            NodeKind::Paragraph => "p",
            NodeKind::Heading(1) => "h1",
            NodeKind::Heading(2) => "h2",
            NodeKind::Heading(3) => "h3",
            NodeKind::Heading(4) => "h4",
            NodeKind::Heading(5) => "h5",
            NodeKind::Heading(_) => "h6",
            NodeKind::Blockquote => "blockquote",
            NodeKind::Preformatted => "pre",
            NodeKind::HorizontalRule => "hr",
            NodeKind::UnorderedList => "ul",
            NodeKind::OrderedList => "ol",
            NodeKind::ListItem => "li",
            NodeKind::DefinitionList => "dl",
            NodeKind::DefinitionTerm => "dt",
            NodeKind::DefinitionDescription => "dd",
            NodeKind::Table => "table",
            NodeKind::Caption => "caption",
            NodeKind::TableHead => "thead",
            NodeKind::TableBody => "tbody",
            NodeKind::TableFoot => "tfoot",
            NodeKind::TableRow => "tr",
            NodeKind::TableHeaderCell => "th",
            NodeKind::TableDataCell => "td",
            NodeKind::Span => "span",
            NodeKind::Strong => "strong",
            NodeKind::Emphasis => "em",
            NodeKind::Underline => "u",
            NodeKind::Strikethrough => "del",
            NodeKind::Code => "code",
            NodeKind::Keyboard => "kbd",
            NodeKind::Mark => "mark",
            NodeKind::Link => "a",
            NodeKind::Image => "img",
            NodeKind::LineBreak => "br",
            NodeKind::Unknown(tag) => tag,
        }
    }

    pub fn is_table_cell(&self) -> bool {
        matches!(self, NodeKind::TableHeaderCell | NodeKind::TableDataCell)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.style_key())
    }
}

/// A node of the parsed document tree.
///
/// Nodes are built by an external parser (or by hand through the builder
/// methods below) and are only read by the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
    pub text: Option<String>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            id: NodeId::default(),
            kind,
            attributes: Vec::new(),
            children: Vec::new(),
            text: None,
        }
    }

    pub fn element(tag: &str) -> Self {
        Self::new(NodeKind::from_tag(tag))
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self {
            text: Some(value.into()),
            ..Self::new(NodeKind::Text)
        }
    }

    /// Adds an attribute. Attribute names are unique: a repeated name is ignored.
    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.push_attr(name, value.into());
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    pub(crate) fn push_attr(&mut self, name: &str, value: String) {
        let name = name.to_ascii_lowercase();
        if !self.attributes.iter().any(|(existing, _)| *existing == name) {
            self.attributes.push((name, value));
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Identity of a built [`Document`]. Clones share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(u64);

impl DocumentId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        DocumentId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// A complete document: a root node whose ids are unique and stable.
///
/// The tree is read-only once built, so rendered fragments can be reused for
/// as long as the document lives.
#[derive(Debug, Clone)]
pub struct Document {
    pub(crate) id: DocumentId,
    pub(crate) root: Node,
    pub(crate) node_count: usize,
}

impl Document {
    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }
}

// Serialized input format, as emitted by an external parser.

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawInput {
    Many(Vec<RawNode>),
    One(RawNode),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawNode {
    Text(String),
    Element(RawElement),
}

#[derive(Debug, Deserialize)]
pub struct RawElement {
    #[serde(alias = "tag", alias = "type")]
    pub kind: String,
    #[serde(default, alias = "attributes")]
    pub attrs: RawAttributes,
    #[serde(default)]
    pub children: Vec<RawNode>,
    #[serde(default, alias = "value")]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawAttributes {
    List(Vec<(String, String)>),
    Map(serde_json::Map<String, serde_json::Value>),
}

impl Default for RawAttributes {
    fn default() -> Self {
        RawAttributes::List(Vec::new())
    }
}

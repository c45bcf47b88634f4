use crate::parser::NodeKind;
use crate::renderer::list::ListState;
use crate::renderer::table::TableSection;
use crate::theme::Theme;

/// What a node kind produces when rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Inline,
    Block,
    Void,
}

impl NodeKind {
    pub fn capability(&self) -> Capability {
        match self {
            NodeKind::Comment
            | NodeKind::Head
            | NodeKind::Script
            | NodeKind::Style
            | NodeKind::ColumnGroup => Capability::Void,
            NodeKind::Text
            | NodeKind::Span
            | NodeKind::Strong
            | NodeKind::Emphasis
            | NodeKind::Underline
            | NodeKind::Strikethrough
            | NodeKind::Code
            | NodeKind::Keyboard
            | NodeKind::Mark
            | NodeKind::Link
            | NodeKind::Image
            | NodeKind::LineBreak => Capability::Inline,
            _ => Capability::Block,
        }
    }
}

/// Table position of the node being rendered, set by the table engine for
/// cell contents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TableHints {
    pub section: Option<TableSection>,
    pub row: Option<usize>,
}

/// Configuration context for rendering operations.
///
/// A context is never modified in place: every recursive step derives a new
/// one with the overrides it needs.
#[derive(Debug, Clone)]
pub struct RenderContext<'a> {
    pub theme: &'a Theme,
    pub width: usize,
    pub preformatted: bool,
    pub depth: usize,
    pub list: Option<ListState>,
    pub table: TableHints,
}

/// The parts of a [`RenderContext`] a rendered fragment depends on. The
/// theme is fixed for a renderer and is therefore left out.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContextSignature {
    pub width: usize,
    pub preformatted: bool,
    pub depth: usize,
    pub list: Option<ListState>,
    pub table: TableHints,
}

impl<'a> RenderContext<'a> {
    pub fn new(theme: &'a Theme, width: usize) -> Self {
        Self {
            theme,
            width: width.max(1),
            preformatted: false,
            depth: 0,
            list: None,
            table: TableHints::default(),
        }
    }

    pub fn with_depth(&self, depth: usize) -> Self {
        Self {
            depth,
            ..self.clone()
        }
    }

    pub fn descend(&self) -> Self {
        self.with_depth(self.depth + 1)
    }

    pub fn with_width(&self, width: usize) -> Self {
        Self {
            width: width.max(1),
            ..self.clone()
        }
    }

    /// Context with `columns` fewer columns available.
    pub fn narrowed(&self, columns: usize) -> Self {
        self.with_width(self.width.saturating_sub(columns))
    }

    pub fn preformatted(&self) -> Self {
        Self {
            preformatted: true,
            ..self.clone()
        }
    }

    pub fn with_list(&self, list: Option<ListState>) -> Self {
        Self {
            list,
            ..self.clone()
        }
    }

    pub fn with_table(&self, table: TableHints) -> Self {
        Self {
            table,
            ..self.clone()
        }
    }

    /// Default margin of an element that asks for `margin` blank lines:
    /// preformatted content has none.
    pub fn margin(&self, margin: usize) -> usize {
        if self.preformatted {
            0
        } else {
            margin
        }
    }

    pub fn signature(&self) -> ContextSignature {
        ContextSignature {
            width: self.width,
            preformatted: self.preformatted,
            depth: self.depth,
            list: self.list.clone(),
            table: self.table,
        }
    }
}

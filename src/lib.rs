//! # termdoc
//!
//! Renders a parsed HTML document tree as ANSI-styled terminal text: inline
//! and block layout with collapsing margins, ANSI-aware wrapping, list
//! numbering and bordered tables.
//!
//! ```no_run
//! use termdoc::{DocumentParser, DocumentRenderer, Theme};
//!
//! let document = DocumentParser::parse_json(r#"{"tag": "p", "children": ["Hello"]}"#)?;
//! let output = DocumentRenderer::new(Theme::default()).with_width(60).render(&document);
//! print!("{}", output);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod error;
pub mod parser;
pub mod renderer;
pub mod theme;

#[cfg(test)]
mod tests;

pub use error::{RenderError, StyleError};
pub use parser::{Document, DocumentId, DocumentParser, Node, NodeId, NodeKind};
pub use renderer::{DocumentRenderer, RenderContext, MAX_DEPTH};
pub use theme::{Style, Theme, ThemeConfig};

/// Parses a JSON node tree and renders it at `width` columns.
pub fn render_json(json: &str, theme: Theme, width: usize) -> anyhow::Result<String> {
    let document = DocumentParser::parse_json(json)?;
    Ok(DocumentRenderer::new(theme).with_width(width).render(&document))
}

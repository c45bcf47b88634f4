use std::cell::{Cell, RefCell};
use tracing::{debug, trace, warn};

use crate::parser::{Document, DocumentId, Node};
use crate::renderer::cache::RenderCache;
use crate::renderer::fragment::Fragment;
use crate::renderer::traits::RenderContext;
use crate::renderer::wrap::wrap;
use crate::theme::Theme;

/// Deepest nesting level that is rendered. Deeper subtrees are dropped.
pub const MAX_DEPTH: usize = 100;

pub const DEFAULT_WIDTH: usize = 80;

/// Renders documents to ANSI terminal text.
///
/// The renderer owns its memo cache, so it is `!Sync`; use one renderer per
/// thread. Cached fragments are kept while the same [`Document`] is rendered
/// again and dropped as soon as another one comes in.
pub struct DocumentRenderer {
    theme: Theme,
    width: usize,
    cache: RefCell<RenderCache>,
    cached_document: Cell<Option<DocumentId>>,
}

impl DocumentRenderer {
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            width: DEFAULT_WIDTH,
            cache: RefCell::new(RenderCache::default()),
            cached_document: Cell::new(None),
        }
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width.max(1);
        self
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn clear_cache(&self) {
        self.cache.borrow_mut().clear();
        self.cached_document.set(None);
    }

    /// Cache hits and misses of the last render.
    pub fn cache_stats(&self) -> (usize, usize) {
        self.cache.borrow().stats()
    }

    /// Renders a whole document. The output starts and ends with a blank
    /// line.
    pub fn render(&self, document: &Document) -> String {
        if self.cached_document.replace(Some(document.id())) == Some(document.id()) {
            self.cache.borrow_mut().reset_stats();
        } else {
            self.cache.borrow_mut().clear();
        }
        let ctx = RenderContext::new(&self.theme, self.width);

        let body = match self.render_node(document.root(), &ctx) {
            Some(Fragment::Block(block)) => block.value.unwrap_or_default(),
            Some(Fragment::Inline(inline)) => inline
                .value
                .map(|value| wrap(&value, ctx.width, false))
                .unwrap_or_default(),
            None => String::new(),
        };

        let (hits, misses) = self.cache_stats();
        debug!(nodes = document.node_count(), hits, misses, "rendered document");
        format!("\n{}\n\n", body)
    }

    /// Renders one node of the document being rendered. Subtrees deeper than
    /// [`MAX_DEPTH`] and subtrees whose handler fails yield `None`; the rest
    /// of the document is unaffected.
    pub(crate) fn render_node(&self, node: &Node, ctx: &RenderContext) -> Option<Fragment> {
        let ctx = ctx.descend();
        if ctx.depth > MAX_DEPTH {
            debug!(node = %node.id, kind = %node.kind, depth = ctx.depth, "maximum depth exceeded, dropping subtree");
            return None;
        }

        let signature = ctx.signature();
        if let Some(cached) = self.cache.borrow_mut().get(node.id, &signature) {
            trace!(node = %node.id, "cache hit");
            return cached;
        }

        let fragment = match self.dispatch(node, &ctx) {
            Ok(fragment) => fragment,
            Err(err) => {
                warn!(node = %node.id, kind = %node.kind, error = %err, "skipping subtree");
                None
            }
        };

        self.cache
            .borrow_mut()
            .insert(node.id, signature, fragment.clone());
        fragment
    }
}

impl Default for DocumentRenderer {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}

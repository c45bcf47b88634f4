//! Per-kind render handlers.
//!
//! Handlers return `Result<Option<Fragment>, RenderError>`; the dispatcher in
//! `DocumentRenderer::render_node` decides what a failure means.

use tracing::warn;

use crate::error::RenderError;
use crate::parser::{Node, NodeKind};
use crate::renderer::components::{AttributeReader, IndentationHelper};
use crate::renderer::fragment::{merge_block, merge_inline, BlockFragment, Fragment, InlineFragment};
use crate::renderer::list::{resolve_bullet, BulletKind, ListKind, ListState, OrderedType};
use crate::renderer::renderer::DocumentRenderer;
use crate::renderer::traits::{Capability, RenderContext};
use crate::renderer::wrap::{align_line, strip_ansi, trim_end_ansi, visual_length, wrap, Alignment};

const DEFAULT_BLOCKQUOTE_MARKER: &str = "│ ";
const DEFAULT_RULE: &str = "─";
const DEFAULT_DD_INDENT: usize = 4;

impl DocumentRenderer {
    pub(crate) fn dispatch(
        &self,
        node: &Node,
        ctx: &RenderContext,
    ) -> Result<Option<Fragment>, RenderError> {
        match node.kind.capability() {
            Capability::Void => Ok(None),
            Capability::Inline => Ok(self.render_inline(node, ctx).map(Fragment::Inline)),
            Capability::Block => self.render_block(node, ctx),
        }
    }

    fn render_inline(&self, node: &Node, ctx: &RenderContext) -> Option<InlineFragment> {
        match node.kind {
            NodeKind::Text => text_fragment(node, ctx),
            NodeKind::LineBreak => Some(InlineFragment::new("\n")),
            NodeKind::Image => image_fragment(node, ctx),
            NodeKind::Link => self.link(node, ctx),
            _ => {
                let style = ctx.theme.style_for(node);
                self.inline_container(node, ctx, |value| style.paint(&value))
            }
        }
    }

    fn render_block(&self, node: &Node, ctx: &RenderContext) -> Result<Option<Fragment>, RenderError> {
        let fragment = match node.kind {
            NodeKind::Paragraph | NodeKind::Division => {
                let margin = if node.kind == NodeKind::Paragraph {
                    ctx.margin(1)
                } else {
                    0
                };
                self.aligned_block(node, ctx, margin, None)
            }
            NodeKind::Heading(_) => self.heading(node, ctx),
            NodeKind::Blockquote => self.blockquote(node, ctx),
            NodeKind::Preformatted => self.preformatted(node, ctx),
            NodeKind::HorizontalRule => Some(horizontal_rule(node, ctx)),
            NodeKind::UnorderedList | NodeKind::OrderedList => self.list(node, ctx),
            NodeKind::ListItem => self.list_item(node, ctx),
            NodeKind::DefinitionList => self.block_container(node, ctx, ctx.margin(1)),
            NodeKind::DefinitionTerm => {
                let style = ctx.theme.style_for(node);
                self.block_container(node, ctx, 0)
                    .map(|block| block.map_value(|value| style.paint(&value)))
            }
            NodeKind::DefinitionDescription => {
                let indent = ctx
                    .theme
                    .get(node.kind.style_key())
                    .indent
                    .unwrap_or(DEFAULT_DD_INDENT);
                let style = ctx.theme.style_for(node);
                self.block_container(node, &ctx.narrowed(indent), 0).map(|block| {
                    block.map_value(|value| IndentationHelper::indent(&style.paint(&value), indent))
                })
            }
            NodeKind::Table => return self.render_table(node, ctx),
            _ => self.block_container(node, ctx, 0),
        };
        Ok(fragment.map(Fragment::Block))
    }

    /// Folds the children of an inline element and applies `wrapper` once to
    /// the merged value. Boundary whitespace passes through untouched.
    fn inline_container(
        &self,
        node: &Node,
        ctx: &RenderContext,
        wrapper: impl FnOnce(String) -> String,
    ) -> Option<InlineFragment> {
        let merged = node.children.iter().fold(None, |acc, child| {
            match self.render_node(child, ctx) {
                Some(Fragment::Inline(inline)) => merge_inline(acc, Some(inline)),
                // A block inside inline content keeps its text on its own lines.
                Some(Fragment::Block(block)) => match block.value {
                    Some(value) => merge_inline(acc, Some(InlineFragment::new(format!("\n{}\n", value)))),
                    None => acc,
                },
                None => acc,
            }
        });
        merged.map(|inline| inline.map_value(wrapper))
    }

    /// Folds the children of a block element. Pending inline content is
    /// wrapped into a block whenever a block child arrives and at the end.
    /// The margins are at least `margin`.
    pub(crate) fn block_container(
        &self,
        node: &Node,
        ctx: &RenderContext,
        margin: usize,
    ) -> Option<BlockFragment> {
        let (block, inline) =
            node.children
                .iter()
                .fold((None, None), |(block, inline), child| match self.render_node(child, ctx) {
                    Some(Fragment::Inline(fragment)) => (block, merge_inline(inline, Some(fragment))),
                    Some(Fragment::Block(fragment)) => {
                        (merge_block(flush(block, inline, ctx), Some(fragment)), None)
                    }
                    None => (block, inline),
                });

        match flush(block, inline, ctx) {
            Some(block) => Some(BlockFragment {
                margin_top: block.margin_top.max(margin),
                margin_bottom: block.margin_bottom.max(margin),
                ..block
            }),
            None if margin > 0 => Some(BlockFragment::empty(margin, margin)),
            None => None,
        }
    }

    /// Block container painted with the node's style and aligned by its
    /// `align` attribute or theme entry. `marker` prefixes the first line.
    fn aligned_block(
        &self,
        node: &Node,
        ctx: &RenderContext,
        margin: usize,
        marker: Option<&str>,
    ) -> Option<BlockFragment> {
        let style = ctx.theme.style_for(node);
        let resolved = ctx.theme.get(node.kind.style_key());
        let alignment = node
            .attr("align")
            .and_then(Alignment::parse)
            .or(resolved.align)
            .unwrap_or_default();
        let marker_width = marker.map_or(0, visual_length);

        self.block_container(node, &ctx.narrowed(marker_width), margin)
            .map(|block| {
                block.map_value(|value| {
                    let value = match marker {
                        Some(marker) => IndentationHelper::prefix_lines(
                            &value,
                            marker,
                            &IndentationHelper::hanging(marker),
                        ),
                        None => value,
                    };
                    align_block(&style.paint(&value), ctx.width, alignment)
                })
            })
    }

    fn heading(&self, node: &Node, ctx: &RenderContext) -> Option<BlockFragment> {
        let marker = ctx.theme.get(node.kind.style_key()).marker.clone();
        self.aligned_block(node, ctx, ctx.margin(1), marker.as_deref())
    }

    fn blockquote(&self, node: &Node, ctx: &RenderContext) -> Option<BlockFragment> {
        let marker = node
            .attr("marker")
            .map(str::to_string)
            .or_else(|| ctx.theme.get("blockquote").marker.clone())
            .unwrap_or_else(|| DEFAULT_BLOCKQUOTE_MARKER.to_string());
        let style = ctx.theme.style_for(node);
        let inner = ctx.narrowed(visual_length(&marker));

        self.block_container(node, &inner, ctx.margin(1)).map(|block| {
            block.map_value(|value| {
                style.paint(&IndentationHelper::prefix_lines(&value, &marker, &marker))
            })
        })
    }

    fn preformatted(&self, node: &Node, ctx: &RenderContext) -> Option<BlockFragment> {
        let style = ctx.theme.style_for(node);
        let indent = ctx.theme.get("pre").indent.unwrap_or(0);
        let inner = ctx.preformatted();

        self.block_container(node, &inner, ctx.margin(1)).map(|block| {
            block.map_value(|value| {
                // A newline right after the opening tag is not content.
                let value = value.strip_prefix('\n').unwrap_or(&value);
                let value = value.trim_end();
                IndentationHelper::indent(&style.paint(value), indent)
            })
        })
    }

    fn link(&self, node: &Node, ctx: &RenderContext) -> Option<InlineFragment> {
        let style = ctx.theme.style_for(node);
        let href = node
            .attr("href")
            .map(str::trim)
            .filter(|href| !href.is_empty() && !href.starts_with('#'));

        let fragment = self.inline_container(node, ctx, |value| {
            let painted = style.paint(&value);
            match href {
                Some(href) if strip_ansi(&value).trim() != href => format!("{} ({})", painted, href),
                _ => painted,
            }
        });
        match fragment {
            Some(fragment) if fragment.value.is_some() => Some(fragment),
            // A link without text shows its target.
            other => match href {
                Some(href) => merge_inline(other, Some(InlineFragment::new(style.paint(href)))),
                None => other,
            },
        }
    }

    fn list(&self, node: &Node, ctx: &RenderContext) -> Option<BlockFragment> {
        let theme = ctx.theme;
        let parent_bullet = ctx.list.as_ref().and_then(|list| list.bullet);
        let items: Vec<&Node> = node
            .children
            .iter()
            .filter(|child| child.kind == NodeKind::ListItem)
            .collect();

        let (kind, bullet) = match node.kind {
            NodeKind::OrderedList => {
                let kind = node
                    .attr("type")
                    .and_then(|value| {
                        OrderedType::parse(value).or_else(|| {
                            warn!(node = %node.id, value, "unknown ordered list type");
                            None
                        })
                    })
                    .unwrap_or_default();
                (ListKind::Ordered(kind), parent_bullet)
            }
            _ => {
                let requested = node.attr("type").and_then(|value| {
                    BulletKind::parse(value).or_else(|| {
                        warn!(node = %node.id, value, "unknown bullet type");
                        None
                    })
                });
                let bullet = resolve_bullet(requested, parent_bullet);
                (ListKind::Unordered(bullet), Some(bullet))
            }
        };

        let ordered = matches!(kind, ListKind::Ordered(_));
        let reversed = ordered && AttributeReader::flag(node, "reversed").unwrap_or(false);
        let step: i64 = if reversed { -1 } else { 1 };
        let default_start = if reversed { items.len() as i64 } else { 1 };
        let mut next = if ordered {
            clamp_ordinal(AttributeReader::parse_or(node, "start", default_start))
        } else {
            1
        };
        let list_marker = node
            .attr("marker")
            .map(str::to_string)
            .or_else(|| theme.get(node.kind.style_key()).marker.clone());

        let mut states: Vec<ListState> = items
            .iter()
            .map(|item| {
                let index = if ordered {
                    clamp_ordinal(AttributeReader::parse_or(item, "value", next))
                } else {
                    next
                };
                next = index.saturating_add(step);
                ListState {
                    index,
                    kind,
                    compact: AttributeReader::flag(node, "compact").unwrap_or(theme.list.compact),
                    marker_width: 0,
                    bullet,
                    marker: item.attr("marker").map(str::to_string).or_else(|| list_marker.clone()),
                }
            })
            .collect();

        let marker_width = states
            .iter()
            .map(|state| visual_length(&state.marker_text(&theme.list)) + 1)
            .max()
            .unwrap_or(0)
            .max(theme.list.indent);
        for state in &mut states {
            state.marker_width = marker_width;
        }

        // Children that are not `li` continue the item before them.
        let continuation = states
            .first()
            .cloned()
            .map(|state| ListState { index: 0, ..state });
        let mut states = states.into_iter();
        let mut content: Option<BlockFragment> = None;
        for child in &node.children {
            let fragment = if child.kind == NodeKind::ListItem {
                let state = states.next();
                self.render_node(child, &ctx.with_list(state))
            } else {
                let inner = ctx.with_list(continuation.clone()).narrowed(marker_width);
                self.render_node(child, &inner).and_then(|fragment| match fragment {
                    Fragment::Block(block) => Some(
                        block.map_value(|value| IndentationHelper::indent(&value, marker_width)),
                    ),
                    Fragment::Inline(inline) => inline
                        .value
                        .filter(|value| !value.trim().is_empty())
                        .map(|value| {
                            BlockFragment::new(IndentationHelper::indent(
                                &wrap(&value, inner.width, ctx.preformatted),
                                marker_width,
                            ))
                        }),
                }.map(Fragment::Block))
            };
            if let Some(Fragment::Block(block)) = fragment {
                content = merge_block(content, Some(block));
            }
        }

        let margin = if ctx.list.is_some() { 0 } else { ctx.margin(1) };
        match content {
            Some(block) => Some(BlockFragment {
                margin_top: block.margin_top.max(margin),
                margin_bottom: block.margin_bottom.max(margin),
                ..block
            }),
            None if margin > 0 => Some(BlockFragment::empty(margin, margin)),
            None => None,
        }
    }

    fn list_item(&self, node: &Node, ctx: &RenderContext) -> Option<BlockFragment> {
        let theme = ctx.theme;
        let state = ctx
            .list
            .clone()
            .unwrap_or_else(|| ListState::orphan(&theme.list));
        let marker = state.marker_text(&theme.list);
        let marker_len = visual_length(&marker);
        let width = state.marker_width.max(marker_len + 1);
        let painted = theme.style_for(node).paint(&marker);

        let first = match (state.kind, &state.marker) {
            (ListKind::Ordered(_), None) => {
                format!("{}{} ", " ".repeat(width - marker_len - 1), painted)
            }
            _ => format!("{}{}", painted, " ".repeat(width - marker_len)),
        };
        let rest = " ".repeat(width);

        let compact = state.compact;
        let inner = ctx.narrowed(width).with_list(Some(state));
        let block = self
            .block_container(node, &inner, 0)
            .unwrap_or_else(|| BlockFragment::empty(0, 0));
        let block = if compact {
            BlockFragment {
                margin_top: 0,
                margin_bottom: 0,
                ..block
            }
        } else {
            block
        };

        let value = match block.value {
            Some(value) => IndentationHelper::prefix_lines(&value, &first, &rest),
            None => trim_end_ansi(&first),
        };
        Some(BlockFragment {
            value: Some(value),
            ..block
        })
    }
}

/// Ordinals are kept in the 32-bit range browsers use.
fn clamp_ordinal(value: i64) -> i64 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX))
}

/// Wraps pending inline content and appends it to `block`.
fn flush(
    block: Option<BlockFragment>,
    inline: Option<InlineFragment>,
    ctx: &RenderContext,
) -> Option<BlockFragment> {
    match inline.and_then(|inline| inline.value) {
        Some(value) => merge_block(
            block,
            Some(BlockFragment::new(wrap(&value, ctx.width, ctx.preformatted))),
        ),
        None => block,
    }
}

fn text_fragment(node: &Node, ctx: &RenderContext) -> Option<InlineFragment> {
    let raw = node.text.as_deref().filter(|raw| !raw.is_empty())?;
    if ctx.preformatted {
        return Some(InlineFragment::new(raw));
    }

    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return Some(InlineFragment::whitespace(' '));
    }
    Some(InlineFragment {
        pre: raw.starts_with(char::is_whitespace).then_some(' '),
        value: Some(collapsed),
        post: raw.ends_with(char::is_whitespace).then_some(' '),
    })
}

fn image_fragment(node: &Node, ctx: &RenderContext) -> Option<InlineFragment> {
    let alt = node.attr("alt").map(str::trim).filter(|alt| !alt.is_empty());
    let label = alt.or_else(|| {
        node.attr("src")
            .and_then(|src| src.trim_end_matches('/').rsplit('/').next())
            .filter(|name| !name.is_empty())
    })?;
    let style = ctx.theme.style_for(node);
    Some(InlineFragment::new(style.paint(&format!("[{}]", label))))
}

fn horizontal_rule(node: &Node, ctx: &RenderContext) -> BlockFragment {
    let resolved = ctx.theme.get(node.kind.style_key());
    let unit = resolved.marker.as_deref().unwrap_or(DEFAULT_RULE);
    let count = ctx.width / visual_length(unit).max(1);
    let margin = ctx.margin(1);
    BlockFragment::new(ctx.theme.style_for(node).paint(&unit.repeat(count))).with_margins(margin, margin)
}

/// Aligns every line of `text` within `width`. Left alignment leaves the
/// text alone so no trailing padding is added.
fn align_block(text: &str, width: usize, alignment: Alignment) -> String {
    if alignment == Alignment::Left {
        return text.to_string();
    }
    text.split('\n')
        .map(|line| trim_end_ansi(&align_line(line, width, alignment)))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Theme;

    #[test]
    fn test_text_collapses_whitespace() {
        let theme = Theme::plain();
        let ctx = RenderContext::new(&theme, 80);
        let node = Node::text("  hello \n  world ");
        assert_eq!(
            text_fragment(&node, &ctx),
            Some(InlineFragment {
                pre: Some(' '),
                value: Some("hello world".to_string()),
                post: Some(' '),
            })
        );
        assert_eq!(
            text_fragment(&Node::text(" \n "), &ctx),
            Some(InlineFragment::whitespace(' '))
        );
        assert_eq!(
            text_fragment(&Node::text("  a  b "), &ctx.preformatted()),
            Some(InlineFragment::new("  a  b "))
        );
    }

    #[test]
    fn test_image_label() {
        let theme = Theme::plain();
        let ctx = RenderContext::new(&theme, 80);
        let img = Node::element("img").with_attr("src", "/assets/logo.png");
        assert_eq!(image_fragment(&img, &ctx).and_then(|f| f.value).as_deref(), Some("[logo.png]"));
        let img = img.with_attr("alt", "Logo");
        assert_eq!(image_fragment(&img, &ctx).and_then(|f| f.value).as_deref(), Some("[Logo]"));
        assert_eq!(image_fragment(&Node::element("img"), &ctx), None);
    }

    #[test]
    fn test_align_block() {
        assert_eq!(align_block("ab\nc", 6, Alignment::Right), "    ab\n     c");
        assert_eq!(align_block("ab", 6, Alignment::Center), "  ab");
        assert_eq!(align_block("ab", 6, Alignment::Left), "ab");
    }

    #[test]
    fn test_horizontal_rule_spans_width() {
        let theme = Theme::plain();
        let ctx = RenderContext::new(&theme, 12);
        let rule = horizontal_rule(&Node::element("hr"), &ctx);
        assert_eq!(rule.value.as_deref(), Some("─".repeat(12).as_str()));
        assert_eq!((rule.margin_top, rule.margin_bottom), (1, 1));
    }
}

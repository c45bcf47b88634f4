//! # Table Layout Engine
//!
//! Turns a `<table>` subtree into a bordered grid, or into `Header: value`
//! lines when the terminal is too narrow for one.
//!
//! Cell color priority, highest first: cell `color`, row `color`,
//! highlighted row, section `color`, column color, alternate row color,
//! then the `th`/`td` theme entry (or `table_cell` when that is unstyled).

pub mod border;
pub mod layout;
pub mod types;

pub use border::{ascii_fallback, BorderChars, BorderStyle};
pub use layout::{column_widths, render_grid, Grid, PlacedCell};
pub use types::{parse_ranges, CellRecord, RowRecord, TableOptions, TableSection, VAlign};

use tracing::debug;

use crate::error::RenderError;
use crate::parser::{Node, NodeKind};
use crate::renderer::components::{trim_blank_lines, AttributeReader};
use crate::renderer::fragment::{BlockFragment, Fragment};
use crate::renderer::renderer::DocumentRenderer;
use crate::renderer::traits::{RenderContext, TableHints};
use crate::renderer::wrap::{align_line, max_line_width, strip_ansi, wrap, Alignment};
use crate::theme::{Style, Theme};

/// Upper bounds browsers apply to span attributes.
const MAX_COLSPAN: usize = 1000;
const MAX_ROWSPAN: usize = 65534;

/// A `<tr>` with the section it belongs to and the section element, if any.
struct SourceRow<'n> {
    section: TableSection,
    row: &'n Node,
    group: Option<&'n Node>,
}

/// Coloring inputs of one cell that can only be settled once the cell has a
/// column.
struct PendingColor {
    base: Style,
    explicit: Option<Style>,
    alternate: Option<Style>,
    explicit_align: bool,
}

impl DocumentRenderer {
    pub(crate) fn render_table(
        &self,
        node: &Node,
        ctx: &RenderContext,
    ) -> Result<Option<Fragment>, RenderError> {
        let theme = ctx.theme;
        let options = TableOptions::from_node(node, theme);

        let mut caption = None;
        let mut rows = Vec::new();
        for child in &node.children {
            match child.kind {
                NodeKind::Caption => {
                    caption.get_or_insert(child);
                }
                NodeKind::TableHead | NodeKind::TableBody | NodeKind::TableFoot => {
                    let section = match child.kind {
                        NodeKind::TableHead => TableSection::Head,
                        NodeKind::TableFoot => TableSection::Foot,
                        _ => TableSection::Body,
                    };
                    rows.extend(
                        child
                            .children
                            .iter()
                            .filter(|row| row.kind == NodeKind::TableRow)
                            .map(|row| SourceRow {
                                section,
                                row,
                                group: Some(child),
                            }),
                    );
                }
                NodeKind::TableRow => rows.push(SourceRow {
                    section: TableSection::Body,
                    row: child,
                    group: None,
                }),
                _ => {}
            }
        }

        if rows.is_empty() {
            return Err(RenderError::MalformedNode {
                id: node.id,
                kind: node.kind.to_string(),
                reason: "table has no rows".to_string(),
            });
        }

        // Without a thead, a leading row made only of th cells is the header.
        if !rows.iter().any(|r| r.section == TableSection::Head) {
            let first = &mut rows[0];
            let mut cells = first.row.children.iter().filter(|c| c.kind.is_table_cell()).peekable();
            if cells.peek().is_some() && cells.all(|c| c.kind == NodeKind::TableHeaderCell) {
                first.section = TableSection::Head;
            }
        }
        rows.sort_by_key(|r| section_order(r.section));

        let mut records = Vec::with_capacity(rows.len());
        let mut pending = Vec::new();
        let mut numbers = Vec::with_capacity(rows.len());
        let mut body_row = 0;

        for (index, source) in rows.iter().enumerate() {
            let data_row = (source.section == TableSection::Body).then(|| {
                body_row += 1;
                body_row
            });
            numbers.push(match (source.section, data_row) {
                (TableSection::Head, _) => "#".to_string(),
                (_, Some(n)) => n.to_string(),
                _ => String::new(),
            });

            let levels = 1 + usize::from(source.group.is_some());
            let cell_ctx = ctx
                .with_depth(ctx.depth + levels)
                .with_table(TableHints {
                    section: Some(source.section),
                    row: Some(index),
                })
                .narrowed(4);

            let row_color = source.row.attr("color").map(|s| theme.parse_override(s));
            let section_color = source
                .group
                .and_then(|g| g.attr("color"))
                .map(|s| theme.parse_override(s));
            let highlight = data_row
                .filter(|&n| options.is_highlighted(n))
                .map(|_| options.highlight);
            let alternate = data_row.filter(|n| n % 2 == 0).and(options.alternate);

            let mut cells = Vec::new();
            for cell in source.row.children.iter().filter(|c| c.kind.is_table_cell()) {
                let content = self
                    .render_node(cell, &cell_ctx)
                    .and_then(Fragment::into_text)
                    .map(|text| trim_blank_lines(&text).to_string())
                    .unwrap_or_default();
                let h_align = cell.attr("align").and_then(Alignment::parse);

                pending.push(PendingColor {
                    base: cell_theme_style(theme, &cell.kind),
                    explicit: cell
                        .attr("color")
                        .map(|s| theme.parse_override(s))
                        .or(row_color)
                        .or(highlight)
                        .or(section_color),
                    alternate,
                    explicit_align: h_align.is_some(),
                });
                cells.push(CellRecord {
                    content,
                    h_align: h_align.unwrap_or_default(),
                    v_align: cell.attr("valign").and_then(VAlign::parse).unwrap_or_default(),
                    col_span: AttributeReader::parse_or(cell, "colspan", 1usize).clamp(1, MAX_COLSPAN),
                    row_span: AttributeReader::parse_or(cell, "rowspan", 1usize).clamp(1, MAX_ROWSPAN),
                    color: Style::default(),
                    is_header: cell.kind == NodeKind::TableHeaderCell,
                });
            }
            records.push(RowRecord::new(source.section, cells));
        }

        let mut grid = Grid::build(records);
        for (placed, color) in grid.cells.iter_mut().zip(&pending) {
            let chosen = color
                .explicit
                .or(options.column_color(placed.col))
                .or(color.alternate);
            placed.cell.color = match chosen {
                Some(over) => color.base.overlay(&over),
                None => color.base,
            };
            if !color.explicit_align {
                if let Some(align) = options.column_alignment(placed.col) {
                    placed.cell.h_align = align;
                }
            }
        }
        if options.row_numbers {
            let style = theme.get("row_number").style;
            grid.prepend_column(numbers.into_iter().map(|n| {
                let mut cell = CellRecord::new(n);
                cell.h_align = Alignment::Right;
                cell.color = style;
                cell
            }));
        }

        let border_style = match node.attr("color") {
            Some(spec) => theme.get("table_border").style.overlay(&theme.parse_override(spec)),
            None => theme.get("table_border").style,
        };
        let chars = if options.ascii {
            BorderStyle::Ascii.chars()
        } else {
            options.border.chars()
        };

        let nested = ctx.table.section.is_some();
        let widths = if nested || ctx.width < options.responsive_threshold {
            None
        } else {
            column_widths(&grid, ctx.width)
        };
        let (body, centered_width) = match widths {
            Some(widths) => {
                let drawn = render_grid(&grid, &widths, chars, border_style);
                let width = max_line_width(&drawn);
                (drawn, Some(width))
            }
            None => {
                debug!(node = %node.id, width = ctx.width, nested, "rendering table in responsive mode");
                let labels = theme.get("th").style;
                (responsive(&grid, ctx.width, labels, options.row_numbers), None)
            }
        };

        let mut text = String::new();
        if let Some(caption) = caption {
            if let Some(title) = self.render_node(caption, ctx).and_then(Fragment::into_text) {
                let title = theme.style_for(caption).paint(trim_blank_lines(&title));
                let title = wrap(&title, ctx.width, false);
                for line in title.split('\n') {
                    match centered_width {
                        Some(width) => text.push_str(align_line(line, width, Alignment::Center).trim_end()),
                        None => text.push_str(line),
                    }
                    text.push('\n');
                }
            }
        }
        text.push_str(&body);
        if options.ascii {
            text = ascii_fallback(&text);
        }

        let margin = ctx.margin(1);
        Ok(Some(BlockFragment::new(text).with_margins(margin, margin).into()))
    }
}

fn section_order(section: TableSection) -> u8 {
    match section {
        TableSection::Head => 0,
        TableSection::Body => 1,
        TableSection::Foot => 2,
    }
}

fn cell_theme_style(theme: &Theme, kind: &NodeKind) -> Style {
    let style = theme.get(kind.style_key()).style;
    if style.is_plain() {
        theme.get("table_cell").style
    } else {
        style
    }
}

/// `Header: value` lines for every non-header row, one blank line between
/// rows. Labels come from the header cell covering the value's column.
fn responsive(grid: &Grid, width: usize, label_style: Style, numbered: bool) -> String {
    let head_rows: Vec<usize> = (0..grid.row_count())
        .filter(|&r| grid.sections[r] == TableSection::Head)
        .collect();
    let mut data_rows: Vec<usize> = (0..grid.row_count())
        .filter(|&r| grid.sections[r] != TableSection::Head)
        .collect();
    let labelled = !data_rows.is_empty();
    if !labelled {
        data_rows = head_rows.clone();
    }

    let offset = usize::from(numbered);
    let label_for = |col: usize| -> String {
        let header = if labelled {
            head_rows
                .iter()
                .rev()
                .filter_map(|&r| grid.cell_at(r, col))
                .map(|placed| strip_ansi(&placed.cell.content).trim().to_string())
                .find(|text| !text.is_empty())
        } else {
            None
        };
        match header {
            Some(text) => text.replace('\n', " "),
            None if numbered && col == 0 => "#".to_string(),
            None => format!("Column {}", col + 1 - offset),
        }
    };

    let mut blocks = Vec::new();
    for r in data_rows {
        let mut lines = Vec::new();
        for placed in grid.row_cells(r) {
            let value = placed.cell.content.trim();
            if strip_ansi(value).trim().is_empty() {
                continue;
            }
            let label = label_style.paint(&label_for(placed.col));
            let line = format!("{}: {}", label, placed.cell.color.paint(value));
            lines.push(wrap(&line, width, false));
        }
        if !lines.is_empty() {
            blocks.push(lines.join("\n"));
        }
    }
    blocks.join("\n\n")
}

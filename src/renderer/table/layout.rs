//! Grid placement, column sizing and drawing of bordered tables.
//!
//! Every cell is padded by one column on each side and separated from its
//! neighbours by a single border column, so a table with `n` columns spends
//! `3n + 1` columns on decoration.

use crate::renderer::table::border::BorderChars;
use crate::renderer::table::types::{CellRecord, RowRecord, TableSection, VAlign};
use crate::renderer::wrap::{align_line, max_line_width, strip_ansi, visual_length, wrap};
use crate::theme::Style;

/// Columns between two adjacent cell contents: padding, border, padding.
const GUTTER: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedCell {
    pub row: usize,
    pub col: usize,
    pub rows: usize,
    pub cols: usize,
    pub cell: CellRecord,
}

/// Cells placed on a rectangular slot grid.
///
/// Cells are stored in input order (row-major, then left to right), followed
/// by the empty cells that pad short rows.
#[derive(Debug, Clone)]
pub struct Grid {
    pub cells: Vec<PlacedCell>,
    slots: Vec<Vec<usize>>,
    pub sections: Vec<TableSection>,
    pub columns: usize,
}

impl Grid {
    pub fn build(rows: Vec<RowRecord>) -> Self {
        let sections: Vec<TableSection> = rows.iter().map(|row| row.section).collect();
        let row_count = rows.len();
        let mut occupancy: Vec<Vec<Option<usize>>> = vec![Vec::new(); row_count];
        let mut cells = Vec::new();

        for (r, row) in rows.into_iter().enumerate() {
            let mut section_end = r + 1;
            while section_end < row_count && sections[section_end] == sections[r] {
                section_end += 1;
            }

            let mut col = 0;
            for cell in row.cells {
                while matches!(occupancy[r].get(col), Some(Some(_))) {
                    col += 1;
                }
                // A colspan stops at the first slot claimed by a rowspan from above.
                let mut cols = 1;
                while cols < cell.col_span && matches!(occupancy[r].get(col + cols), None | Some(None)) {
                    cols += 1;
                }
                let mut rows_spanned = 1;
                while rows_spanned < cell.row_span && r + rows_spanned < section_end {
                    let below = &occupancy[r + rows_spanned];
                    if (col..col + cols).any(|c| matches!(below.get(c), Some(Some(_)))) {
                        break;
                    }
                    rows_spanned += 1;
                }

                let index = cells.len();
                for line in &mut occupancy[r..r + rows_spanned] {
                    if line.len() < col + cols {
                        line.resize(col + cols, None);
                    }
                    for slot in &mut line[col..col + cols] {
                        *slot = Some(index);
                    }
                }
                cells.push(PlacedCell {
                    row: r,
                    col,
                    rows: rows_spanned,
                    cols,
                    cell,
                });
                col += cols;
            }
        }

        let columns = occupancy.iter().map(Vec::len).max().unwrap_or(0).max(1);
        let mut slots = Vec::with_capacity(row_count);
        for (r, line) in occupancy.into_iter().enumerate() {
            let mut filled = Vec::with_capacity(columns);
            for c in 0..columns {
                match line.get(c).copied().flatten() {
                    Some(index) => filled.push(index),
                    None => {
                        filled.push(cells.len());
                        cells.push(PlacedCell {
                            row: r,
                            col: c,
                            rows: 1,
                            cols: 1,
                            cell: CellRecord::new(""),
                        });
                    }
                }
            }
            slots.push(filled);
        }

        Self {
            cells,
            slots,
            sections,
            columns,
        }
    }

    pub fn row_count(&self) -> usize {
        self.slots.len()
    }

    /// Prepends a column holding one cell per row.
    pub fn prepend_column(&mut self, cells: impl IntoIterator<Item = CellRecord>) {
        for placed in &mut self.cells {
            placed.col += 1;
        }
        for (r, cell) in cells.into_iter().take(self.slots.len()).enumerate() {
            self.slots[r].insert(0, self.cells.len());
            self.cells.push(PlacedCell {
                row: r,
                col: 0,
                rows: 1,
                cols: 1,
                cell,
            });
        }
        self.columns += 1;
    }

    pub fn cell_at(&self, row: usize, col: usize) -> Option<&PlacedCell> {
        let index = *self.slots.get(row)?.get(col)?;
        self.cells.get(index)
    }

    /// Whether a vertical border runs between columns `col - 1` and `col`
    /// on `row`.
    fn boundary(&self, row: usize, col: usize) -> bool {
        col == 0 || col >= self.columns || self.slots[row][col - 1] != self.slots[row][col]
    }

    /// Cells whose top-left corner is on `row`, left to right.
    pub fn row_cells(&self, row: usize) -> impl Iterator<Item = &PlacedCell> {
        let mut origins: Vec<&PlacedCell> = self
            .cells
            .iter()
            .filter(|placed| placed.row == row)
            .collect();
        origins.sort_by_key(|placed| placed.col);
        origins.into_iter()
    }
}

/// Content width of a cell spanning `cols` columns starting at `col`.
fn span_width(widths: &[usize], col: usize, cols: usize) -> usize {
    widths[col..col + cols].iter().sum::<usize>() + GUTTER * (cols - 1)
}

fn longest_word(text: &str) -> usize {
    strip_ansi(text)
        .split_whitespace()
        .map(visual_length)
        .max()
        .unwrap_or(0)
}

/// Widens the spanned columns so together they hold `need` columns,
/// spreading the excess evenly.
fn distribute(widths: &mut [usize], col: usize, cols: usize, need: usize) {
    let have = span_width(widths, col, cols);
    if need <= have {
        return;
    }
    let excess = need - have;
    for (offset, width) in widths[col..col + cols].iter_mut().enumerate() {
        *width += excess / cols + usize::from(offset < excess % cols);
    }
}

/// Column content widths for a table that must fit in `available` columns,
/// or `None` when even the narrowest layout is too wide.
pub fn column_widths(grid: &Grid, available: usize) -> Option<Vec<usize>> {
    let n = grid.columns;
    let overhead = GUTTER * n + 1;
    let budget = available.checked_sub(overhead)?;

    let mut natural = vec![1; n];
    let mut minimum = vec![1; n];
    let mut spanning = Vec::new();
    for placed in &grid.cells {
        let content = &placed.cell.content;
        if placed.cols == 1 {
            natural[placed.col] = natural[placed.col].max(max_line_width(content));
            minimum[placed.col] = minimum[placed.col].max(longest_word(content));
        } else {
            spanning.push(placed);
        }
    }
    spanning.sort_by_key(|placed| placed.cols);
    for placed in spanning {
        let content = &placed.cell.content;
        distribute(&mut minimum, placed.col, placed.cols, longest_word(content));
        distribute(&mut natural, placed.col, placed.cols, max_line_width(content));
    }

    let mut widths: Vec<usize> = natural
        .iter()
        .zip(&minimum)
        .map(|(natural, minimum)| *natural.max(minimum))
        .collect();
    if minimum.iter().sum::<usize>() > budget {
        return None;
    }
    let mut total: usize = widths.iter().sum();
    while total > budget {
        let widest = (0..n)
            .filter(|&c| widths[c] > minimum[c])
            .max_by_key(|&c| (widths[c], std::cmp::Reverse(c)))?;
        widths[widest] -= 1;
        total -= 1;
    }
    Some(widths)
}

/// Draws the bordered grid. Borders are painted with `border`, every cell
/// segment (padding included) with the cell's own color.
pub fn render_grid(grid: &Grid, widths: &[usize], chars: &BorderChars, border: Style) -> String {
    let wrapped: Vec<Vec<String>> = grid
        .cells
        .iter()
        .map(|placed| {
            let width = span_width(widths, placed.col, placed.cols);
            wrap(&placed.cell.content, width, false)
                .split('\n')
                .map(str::to_string)
                .collect()
        })
        .collect();

    let rows = grid.row_count();
    let mut heights = vec![1; rows];
    let mut tall: Vec<usize> = Vec::new();
    for (index, placed) in grid.cells.iter().enumerate() {
        if placed.rows == 1 {
            heights[placed.row] = heights[placed.row].max(wrapped[index].len());
        } else {
            tall.push(index);
        }
    }
    tall.sort_by_key(|&index| grid.cells[index].rows);
    for index in tall {
        let placed = &grid.cells[index];
        let last = placed.row + placed.rows - 1;
        let have: usize = heights[placed.row..=last].iter().sum();
        if wrapped[index].len() > have {
            heights[last] += wrapped[index].len() - have;
        }
    }

    let vertical = border.paint(&chars.vertical.to_string());
    let mut out = Vec::new();
    if rows > 0 {
        out.push(rule(grid, widths, chars, border, None, Some(0)));
    }
    for r in 0..rows {
        for l in 0..heights[r] {
            let mut line = vertical.clone();
            let mut c = 0;
            while c < grid.columns {
                let index = grid.slots[r][c];
                let placed = &grid.cells[index];
                let lines = &wrapped[index];
                let width = span_width(widths, placed.col, placed.cols);

                let offset: usize = heights[placed.row..r].iter().sum::<usize>() + l;
                let total: usize = heights[placed.row..placed.row + placed.rows].iter().sum();
                let spare = total.saturating_sub(lines.len());
                let top = match placed.cell.v_align {
                    VAlign::Top => 0,
                    VAlign::Middle => spare / 2,
                    VAlign::Bottom => spare,
                };
                let text = offset
                    .checked_sub(top)
                    .and_then(|i| lines.get(i))
                    .map_or("", String::as_str);

                let segment = format!(" {} ", align_line(text, width, placed.cell.h_align));
                line.push_str(&placed.cell.color.paint(&segment));
                line.push_str(&vertical);
                c = placed.col + placed.cols;
            }
            out.push(line);
        }
        if r + 1 < rows && grid.sections[r] != grid.sections[r + 1] {
            out.push(rule(grid, widths, chars, border, Some(r), Some(r + 1)));
        }
    }
    if rows > 0 {
        out.push(rule(grid, widths, chars, border, Some(rows - 1), None));
    }
    out.join("\n")
}

/// Horizontal rule between row `above` and row `below`.
fn rule(
    grid: &Grid,
    widths: &[usize],
    chars: &BorderChars,
    border: Style,
    above: Option<usize>,
    below: Option<usize>,
) -> String {
    let (left, right) = match (above, below) {
        (None, _) => (chars.top_left, chars.top_right),
        (_, None) => (chars.bottom_left, chars.bottom_right),
        _ => (chars.t_right, chars.t_left),
    };

    let mut line = String::new();
    line.push(left);
    for (c, width) in widths.iter().enumerate() {
        line.extend(std::iter::repeat(chars.horizontal).take(width + 2));
        if c + 1 < widths.len() {
            let up = above.is_some_and(|r| grid.boundary(r, c + 1));
            let down = below.is_some_and(|r| grid.boundary(r, c + 1));
            line.push(match (up, down) {
                (true, true) => chars.cross,
                (false, true) => chars.t_down,
                (true, false) => chars.t_up,
                (false, false) => chars.horizontal,
            });
        }
    }
    line.push(right);
    border.paint(&line)
}

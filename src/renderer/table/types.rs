use std::ops::RangeInclusive;
use tracing::warn;

use crate::parser::Node;
use crate::renderer::components::AttributeReader;
use crate::renderer::table::border::BorderStyle;
use crate::renderer::wrap::Alignment;
use crate::theme::{Style, Theme};

/// Section a table row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableSection {
    Head,
    Body,
    Foot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VAlign {
    #[default]
    Top,
    Middle,
    Bottom,
}

impl VAlign {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "top" | "baseline" => Some(VAlign::Top),
            "middle" | "center" => Some(VAlign::Middle),
            "bottom" => Some(VAlign::Bottom),
            _ => None,
        }
    }
}

/// One rendered cell, ready for layout.
#[derive(Debug, Clone, PartialEq)]
pub struct CellRecord {
    pub content: String,
    pub h_align: Alignment,
    pub v_align: VAlign,
    pub col_span: usize,
    pub row_span: usize,
    pub color: Style,
    pub is_header: bool,
}

impl CellRecord {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            h_align: Alignment::Left,
            v_align: VAlign::Top,
            col_span: 1,
            row_span: 1,
            color: Style::default(),
            is_header: false,
        }
    }

    pub fn with_spans(mut self, col_span: usize, row_span: usize) -> Self {
        self.col_span = col_span.max(1);
        self.row_span = row_span.max(1);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowRecord {
    pub section: TableSection,
    pub cells: Vec<CellRecord>,
}

impl RowRecord {
    pub fn new(section: TableSection, cells: Vec<CellRecord>) -> Self {
        Self { section, cells }
    }
}

/// Table-wide settings: `table` attributes layered over the theme.
#[derive(Debug, Clone, PartialEq)]
pub struct TableOptions {
    pub border: BorderStyle,
    pub ascii: bool,
    pub row_numbers: bool,
    pub responsive_threshold: usize,
    pub highlight_rows: Vec<RangeInclusive<usize>>,
    pub highlight: Style,
    pub alternate: Option<Style>,
    /// Per data column; `None` leaves the column alone.
    pub column_colors: Vec<Option<Style>>,
    pub column_align: Vec<Option<Alignment>>,
}

impl TableOptions {
    pub fn from_theme(theme: &Theme) -> Self {
        let table = &theme.table;
        Self {
            border: table.border,
            ascii: table.ascii,
            row_numbers: table.row_numbers,
            responsive_threshold: table.responsive_threshold,
            highlight_rows: Vec::new(),
            highlight: table.highlight,
            alternate: table.alternate,
            column_colors: Vec::new(),
            column_align: Vec::new(),
        }
    }

    pub fn from_node(node: &Node, theme: &Theme) -> Self {
        let mut options = Self::from_theme(theme);

        if let Some(value) = node.attr("border-style") {
            match BorderStyle::parse(value) {
                Some(border) => options.border = border,
                None => warn!(value, "unknown border-style on <table>"),
            }
        }
        if let Some(ascii) = AttributeReader::flag(node, "ascii") {
            options.ascii = ascii;
        }
        if let Some(numbers) = AttributeReader::flag(node, "row-numbers") {
            options.row_numbers = numbers;
        }
        options.responsive_threshold =
            AttributeReader::parse_or(node, "responsive-threshold", options.responsive_threshold);

        if let Some(value) = node.attr("highlight-rows") {
            match parse_ranges(value) {
                Some(ranges) => options.highlight_rows = ranges,
                None => warn!(value, "invalid highlight-rows on <table>"),
            }
        }
        if let Some(spec) = node.attr("highlight-color") {
            options.highlight = theme.parse_override(spec);
        }
        if let Some(spec) = node.attr("alternate-color") {
            options.alternate = Some(theme.parse_override(spec));
        }
        if let Some(value) = node.attr("column-colors") {
            options.column_colors = split_list(value, ';')
                .map(|spec| spec.map(|spec| theme.parse_override(spec)))
                .collect();
        }
        if let Some(value) = node.attr("column-align") {
            options.column_align = split_list(value, ',')
                .map(|spec| {
                    spec.and_then(|spec| {
                        let align = Alignment::parse(spec);
                        if align.is_none() {
                            warn!(value = spec, "invalid column-align entry on <table>");
                        }
                        align
                    })
                })
                .collect();
        }

        options
    }

    /// Whether the 1-based body row `row` is highlighted.
    pub fn is_highlighted(&self, row: usize) -> bool {
        self.highlight_rows.iter().any(|range| range.contains(&row))
    }

    pub fn column_color(&self, column: usize) -> Option<Style> {
        self.column_colors.get(column).copied().flatten()
    }

    pub fn column_alignment(&self, column: usize) -> Option<Alignment> {
        self.column_align.get(column).copied().flatten()
    }
}

/// Parses row ranges such as `"1-3,5"`. Reversed ranges are normalized.
pub fn parse_ranges(value: &str) -> Option<Vec<RangeInclusive<usize>>> {
    let mut ranges = Vec::new();
    for part in value.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let range = match part.split_once('-') {
            Some((start, end)) => {
                let start: usize = start.trim().parse().ok()?;
                let end: usize = end.trim().parse().ok()?;
                start.min(end)..=start.max(end)
            }
            None => {
                let row: usize = part.parse().ok()?;
                row..=row
            }
        };
        ranges.push(range);
    }
    Some(ranges)
}

/// Splits a positional list; empty entries keep their slot as `None`.
fn split_list(value: &str, separator: char) -> impl Iterator<Item = Option<&str>> {
    value.split(separator).map(|entry| {
        let entry = entry.trim();
        (!entry.is_empty()).then_some(entry)
    })
}

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// A style value in the theme file: either a bare style string or a
/// detailed object.
///
/// ```json
/// { "h1": "bold magenta", "blockquote": { "color": "dim italic", "marker": "> " } }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StyleSpec {
    Color(String),
    Detailed(DetailedStyle),
}

impl From<&str> for StyleSpec {
    fn from(value: &str) -> Self {
        StyleSpec::Color(value.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DetailedStyle {
    pub color: Option<String>,
    #[serde(alias = "bg")]
    pub background: Option<String>,
    pub bold: bool,
    pub dim: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub marker: Option<String>,
    pub indent: Option<usize>,
    pub align: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TableConfig {
    pub border_style: String,
    pub ascii: bool,
    pub responsive_threshold: usize,
    pub row_numbers: bool,
    pub alternate_color: Option<String>,
    pub highlight_color: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            border_style: "single".to_string(),
            ascii: false,
            responsive_threshold: 40,
            row_numbers: false,
            alternate_color: None,
            highlight_color: "inverse".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    /// Bullet symbols for disc, square and circle.
    pub bullets: [String; 3],
    /// Minimum indentation of list item bodies.
    pub indent: usize,
    /// Drop the blank lines that block content puts between items.
    pub compact: bool,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            bullets: ["•".to_string(), "▪".to_string(), "◦".to_string()],
            indent: 2,
            compact: false,
        }
    }
}

/// Raw theme configuration as read from disk. Keys missing from the file
/// fall back to the built-in defaults when the `Theme` is resolved.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub styles: HashMap<String, StyleSpec>,
    pub table: TableConfig,
    pub list: ListConfig,
    /// Emit no escape sequences at all.
    pub no_color: bool,
}

impl ThemeConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse theme configuration")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read theme file {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("Invalid theme file {}", path.display()))
    }

    /// Theme file in the user configuration directory, if one exists.
    pub fn default_path() -> Option<std::path::PathBuf> {
        let path = dirs::config_dir()?.join("termdoc").join("theme.json");
        path.is_file().then_some(path)
    }
}

/// Built-in element styles used when the configuration does not name them.
pub(crate) fn default_styles() -> Vec<(&'static str, StyleSpec)> {
    let detailed = |color: &str, marker: &str| {
        StyleSpec::Detailed(DetailedStyle {
            color: Some(color.to_string()),
            marker: Some(marker.to_string()),
            ..Default::default()
        })
    };

    vec![
        ("h1", "bold underline magenta".into()),
        ("h2", "bold magenta".into()),
        ("h3", "bold cyan".into()),
        ("h4", "bold blue".into()),
        ("h5", "bold".into()),
        ("h6", "bold dim".into()),
        ("strong", "bold".into()),
        ("em", "italic".into()),
        ("u", "underline".into()),
        ("del", "strikethrough".into()),
        ("code", "yellow".into()),
        ("kbd", "inverse".into()),
        ("mark", "black on yellow".into()),
        ("a", "blue underline".into()),
        ("img", "dim".into()),
        ("hr", "dim".into()),
        ("blockquote", detailed("dim italic", "│ ")),
        (
            "pre",
            StyleSpec::Detailed(DetailedStyle {
                color: Some("yellow".to_string()),
                indent: Some(2),
                ..Default::default()
            }),
        ),
        ("li", "cyan".into()),
        ("dt", "bold".into()),
        (
            "dd",
            StyleSpec::Detailed(DetailedStyle {
                indent: Some(4),
                ..Default::default()
            }),
        ),
        ("th", "bold".into()),
        ("td", "none".into()),
        ("table_cell", "none".into()),
        ("table_border", "dim".into()),
        ("caption", "italic".into()),
        ("row_number", "dim".into()),
    ]
}

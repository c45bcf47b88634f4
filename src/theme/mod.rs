//! Style resolution.
//!
//! A [`ThemeConfig`] (string shorthand or detailed object per element) is
//! resolved once into a [`Theme`]. Per-node override attributes are layered
//! on top at render time with [`Theme::style_for`].

pub mod config;
pub mod style;

use std::collections::HashMap;
use tracing::warn;

use crate::parser::Node;
use crate::renderer::table::BorderStyle;
use crate::renderer::wrap::Alignment;

pub use config::{DetailedStyle, ListConfig, StyleSpec, TableConfig, ThemeConfig};
pub use style::{Color, Style};

/// Fully resolved style of one element kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedStyle {
    pub style: Style,
    pub marker: Option<String>,
    pub indent: Option<usize>,
    pub align: Option<Alignment>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableTheme {
    pub border: BorderStyle,
    pub ascii: bool,
    pub responsive_threshold: usize,
    pub row_numbers: bool,
    pub alternate: Option<Style>,
    pub highlight: Style,
}

#[derive(Debug, Clone)]
pub struct Theme {
    styles: HashMap<String, ResolvedStyle>,
    pub table: TableTheme,
    pub list: ListConfig,
    colors: bool,
    unstyled: ResolvedStyle,
}

impl Theme {
    pub fn from_config(config: &ThemeConfig) -> Self {
        let colors = !config.no_color;
        let mut styles = HashMap::new();

        for (name, spec) in config::default_styles() {
            styles.insert(name.to_string(), resolve_spec(name, &spec, colors));
        }
        for (name, spec) in &config.styles {
            styles.insert(name.to_ascii_lowercase(), resolve_spec(name, spec, colors));
        }

        let table = TableTheme {
            border: BorderStyle::parse(&config.table.border_style).unwrap_or_else(|| {
                warn!(value = %config.table.border_style, "unknown border style, using single");
                BorderStyle::Single
            }),
            ascii: config.table.ascii,
            responsive_threshold: config.table.responsive_threshold,
            row_numbers: config.table.row_numbers,
            alternate: config
                .table
                .alternate_color
                .as_deref()
                .map(|spec| parse_or_plain("table.alternate-color", spec, colors)),
            highlight: parse_or_plain("table.highlight-color", &config.table.highlight_color, colors),
        };

        Self {
            styles,
            table,
            list: config.list.clone(),
            colors,
            unstyled: ResolvedStyle::default(),
        }
    }

    /// Theme that keeps markers and layout settings but emits no escapes.
    pub fn plain() -> Self {
        Self::from_config(&ThemeConfig {
            no_color: true,
            ..ThemeConfig::default()
        })
    }

    pub fn colors_enabled(&self) -> bool {
        self.colors
    }

    /// Theme entry for an element name, or an empty style.
    pub fn get(&self, name: &str) -> &ResolvedStyle {
        self.styles.get(name).unwrap_or(&self.unstyled)
    }

    /// Theme style for `node` with its `color` attribute layered on top.
    pub fn style_for(&self, node: &Node) -> Style {
        let base = self.get(node.kind.style_key()).style;
        match node.attr("color") {
            Some(spec) => base.overlay(&self.parse_override(spec)),
            None => base,
        }
    }

    /// Parses a style string coming from a node attribute. Invalid values
    /// fall back to an unstyled `Style`.
    pub fn parse_override(&self, spec: &str) -> Style {
        parse_or_plain("color attribute", spec, self.colors)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_config(&ThemeConfig::default())
    }
}

fn parse_or_plain(origin: &str, spec: &str, colors: bool) -> Style {
    if !colors {
        return Style::default();
    }
    Style::parse(spec).unwrap_or_else(|err| {
        warn!(origin, spec, error = %err, "invalid style, rendering unstyled");
        Style::default()
    })
}

fn resolve_spec(name: &str, spec: &StyleSpec, colors: bool) -> ResolvedStyle {
    match spec {
        StyleSpec::Color(value) => ResolvedStyle {
            style: parse_or_plain(name, value, colors),
            ..ResolvedStyle::default()
        },
        StyleSpec::Detailed(detail) => {
            let mut style = detail
                .color
                .as_deref()
                .map(|value| parse_or_plain(name, value, colors))
                .unwrap_or_default();
            if colors {
                if let Some(bg) = &detail.background {
                    match Color::parse(bg) {
                        Ok(color) => style.bg = Some(color),
                        Err(err) => warn!(element = name, error = %err, "invalid background"),
                    }
                }
                style.bold |= detail.bold;
                style.dim |= detail.dim;
                style.italic |= detail.italic;
                style.underline |= detail.underline;
                style.strikethrough |= detail.strikethrough;
            }

            ResolvedStyle {
                style,
                marker: detail.marker.clone(),
                indent: detail.indent,
                align: detail.align.as_deref().and_then(Alignment::parse),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_resolved() {
        let theme = Theme::default();
        assert!(theme.get("strong").style.bold);
        assert_eq!(theme.get("blockquote").marker.as_deref(), Some("│ "));
        assert_eq!(theme.get("pre").indent, Some(2));
        assert_eq!(theme.get("no-such-element"), &ResolvedStyle::default());
    }

    #[test]
    fn test_config_overrides_defaults() {
        let config = ThemeConfig::from_json(
            r#"{"styles": {"strong": "red", "p": {"align": "center"}}}"#,
        )
        .unwrap();
        let theme = Theme::from_config(&config);

        let strong = theme.get("strong").style;
        assert_eq!(strong.fg, Some(Color::Ansi(1)));
        assert!(!strong.bold);
        assert_eq!(theme.get("p").align, Some(Alignment::Center));
    }

    #[test]
    fn test_invalid_style_falls_back_to_plain() {
        let config = ThemeConfig::from_json(r#"{"styles": {"h1": "glitter"}}"#).unwrap();
        let theme = Theme::from_config(&config);
        assert!(theme.get("h1").style.is_plain());
    }

    #[test]
    fn test_attribute_override_wins() {
        let theme = Theme::default();
        let node = Node::element("strong").with_attr("color", "green");
        let style = theme.style_for(&node);
        assert_eq!(style.fg, Some(Color::Ansi(2)));
        assert!(style.bold);
    }

    #[test]
    fn test_plain_theme_has_no_colors() {
        let theme = Theme::plain();
        assert!(!theme.colors_enabled());
        assert!(theme.get("h1").style.is_plain());
        assert!(theme.parse_override("red").is_plain());
        assert_eq!(theme.get("blockquote").marker.as_deref(), Some("│ "));
    }
}

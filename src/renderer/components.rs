use std::str::FromStr;
use tracing::warn;

use crate::error::RenderError;
use crate::parser::Node;
use crate::renderer::wrap::{trim_end_ansi, visual_length};

/// Helper for reading override attributes
pub struct AttributeReader;

impl AttributeReader {
    /// Parses attribute `name`; `Ok(None)` when it is absent.
    pub fn parse<T: FromStr>(node: &Node, name: &str) -> Result<Option<T>, RenderError> {
        let Some(value) = node.attr(name) else {
            return Ok(None);
        };
        value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| RenderError::InvalidAttribute {
                kind: node.kind.to_string(),
                name: name.to_string(),
                value: value.to_string(),
            })
    }

    /// Like [`AttributeReader::parse`], but an invalid value is logged and
    /// replaced by `default`.
    pub fn parse_or<T: FromStr>(node: &Node, name: &str, default: T) -> T {
        match Self::parse(node, name) {
            Ok(value) => value.unwrap_or(default),
            Err(err) => {
                warn!(node = %node.id, error = %err, "ignoring attribute");
                default
            }
        }
    }

    /// Boolean attribute. A bare attribute (`compact`, `compact=""` or
    /// `compact="compact"`) is true.
    pub fn flag(node: &Node, name: &str) -> Option<bool> {
        let value = node.attr(name)?.trim().to_ascii_lowercase();
        match value.as_str() {
            "" | "true" | "yes" | "1" | "on" => Some(true),
            "false" | "no" | "0" | "off" => Some(false),
            other if other == name => Some(true),
            _ => {
                warn!(node = %node.id, attribute = name, value = %value, "expected a boolean");
                None
            }
        }
    }
}

/// Helper for consistent indentation
pub struct IndentationHelper;

impl IndentationHelper {
    /// Prefixes the first line with `first` and every other line with
    /// `rest`. Empty lines receive the prefix with its trailing blanks
    /// removed.
    pub fn prefix_lines(text: &str, first: &str, rest: &str) -> String {
        text.split('\n')
            .enumerate()
            .map(|(index, line)| {
                let prefix = if index == 0 { first } else { rest };
                if line.is_empty() {
                    trim_end_ansi(prefix)
                } else {
                    format!("{}{}", prefix, line)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn indent(text: &str, columns: usize) -> String {
        let pad = " ".repeat(columns);
        Self::prefix_lines(text, &pad, &pad)
    }

    /// Spaces covering the width of `marker`.
    pub fn hanging(marker: &str) -> String {
        " ".repeat(visual_length(marker))
    }
}

/// Removes leading and trailing blank lines of a rendered block.
pub fn trim_blank_lines(text: &str) -> &str {
    let start = text
        .char_indices()
        .take_while(|(_, c)| c.is_whitespace())
        .filter(|(_, c)| *c == '\n')
        .last()
        .map_or(0, |(i, _)| i + 1);
    let trimmed = &text[start..];
    match trimmed.rfind(|c: char| !c.is_whitespace()) {
        Some(end) => {
            let end = end + trimmed[end..].chars().next().map_or(1, char::len_utf8);
            let tail = &trimmed[end..];
            let cut = tail.find('\n').map_or(tail.len(), |i| i);
            &trimmed[..end + cut]
        }
        None => "",
    }
}

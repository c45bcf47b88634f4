//! Box-drawing character sets for table borders.

use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BorderStyle {
    #[default]
    Single,
    Double,
    Rounded,
    Bold,
    Ascii,
}

impl BorderStyle {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "single" | "light" => Some(BorderStyle::Single),
            "double" => Some(BorderStyle::Double),
            "rounded" | "round" => Some(BorderStyle::Rounded),
            "bold" | "heavy" => Some(BorderStyle::Bold),
            "ascii" | "plain" => Some(BorderStyle::Ascii),
            _ => None,
        }
    }

    pub fn chars(self) -> &'static BorderChars {
        match self {
            BorderStyle::Single => &SINGLE,
            BorderStyle::Double => &DOUBLE,
            BorderStyle::Rounded => &ROUNDED,
            BorderStyle::Bold => &BOLD,
            BorderStyle::Ascii => &ASCII,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorderChars {
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
    pub horizontal: char,
    pub vertical: char,
    pub cross: char,
    /// Top tee: ┬
    pub t_down: char,
    /// Bottom tee: ┴
    pub t_up: char,
    /// Left tee: ├
    pub t_right: char,
    /// Right tee: ┤
    pub t_left: char,
}

pub const SINGLE: BorderChars = BorderChars {
    top_left: '┌',
    top_right: '┐',
    bottom_left: '└',
    bottom_right: '┘',
    horizontal: '─',
    vertical: '│',
    cross: '┼',
    t_down: '┬',
    t_up: '┴',
    t_right: '├',
    t_left: '┤',
};

pub const DOUBLE: BorderChars = BorderChars {
    top_left: '╔',
    top_right: '╗',
    bottom_left: '╚',
    bottom_right: '╝',
    horizontal: '═',
    vertical: '║',
    cross: '╬',
    t_down: '╦',
    t_up: '╩',
    t_right: '╠',
    t_left: '╣',
};

pub const ROUNDED: BorderChars = BorderChars {
    top_left: '╭',
    top_right: '╮',
    bottom_left: '╰',
    bottom_right: '╯',
    ..SINGLE
};

pub const BOLD: BorderChars = BorderChars {
    top_left: '┏',
    top_right: '┓',
    bottom_left: '┗',
    bottom_right: '┛',
    horizontal: '━',
    vertical: '┃',
    cross: '╋',
    t_down: '┳',
    t_up: '┻',
    t_right: '┣',
    t_left: '┫',
};

pub const ASCII: BorderChars = BorderChars {
    top_left: '+',
    top_right: '+',
    bottom_left: '+',
    bottom_right: '+',
    horizontal: '-',
    vertical: '|',
    cross: '+',
    t_down: '+',
    t_up: '+',
    t_right: '+',
    t_left: '+',
};

static HORIZONTAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[─━═┄┅┈┉╌╍]").expect("valid horizontal pattern"));
static VERTICAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[│┃║┆┇┊┋╎╏]").expect("valid vertical pattern"));
static JUNCTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\u{250C}-\u{254B}\u{2552}-\u{256C}\u{256D}-\u{2570}]").expect("valid junction pattern"));

/// Replaces Unicode box drawing in already-rendered text with `+`, `-` and
/// `|`.
pub fn ascii_fallback(text: &str) -> String {
    let text = HORIZONTAL_RE.replace_all(text, "-");
    let text = VERTICAL_RE.replace_all(&text, "|");
    JUNCTION_RE.replace_all(&text, "+").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!(BorderStyle::parse("Double"), Some(BorderStyle::Double));
        assert_eq!(BorderStyle::parse("heavy"), Some(BorderStyle::Bold));
        assert_eq!(BorderStyle::parse("dotted"), None);
    }

    #[test]
    fn test_rounded_shares_lines_with_single() {
        let rounded = BorderStyle::Rounded.chars();
        assert_eq!(rounded.top_left, '╭');
        assert_eq!(rounded.horizontal, SINGLE.horizontal);
        assert_eq!(rounded.cross, SINGLE.cross);
    }

    #[test]
    fn test_ascii_fallback_strips_every_set() {
        for style in [
            BorderStyle::Single,
            BorderStyle::Double,
            BorderStyle::Rounded,
            BorderStyle::Bold,
        ] {
            let c = style.chars();
            let line = format!(
                "{}{}{}{}{} {} {}{}{}{}{}",
                c.top_left,
                c.horizontal,
                c.t_down,
                c.horizontal,
                c.top_right,
                c.vertical,
                c.t_right,
                c.cross,
                c.t_left,
                c.bottom_left,
                c.t_up
            );
            assert_eq!(ascii_fallback(&line), "+-+-+ | +++++", "style {:?}", style);
        }
    }

    #[test]
    fn test_ascii_fallback_leaves_text_alone() {
        assert_eq!(ascii_fallback("plain • text"), "plain • text");
    }
}

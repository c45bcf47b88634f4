//! ANSI SGR styles.
//!
//! A [`Style`] is parsed from a short string (`"bold red"`, `"#ff8800"`,
//! `"black on yellow"`, `"bg:blue"`) and paints text with matching open and
//! close sequences. Painting is nesting-safe: close codes of an inner style
//! re-open the outer style, and every line is closed and re-opened so a
//! style never leaks across a newline.

use crate::error::StyleError;

const ESC: &str = "\x1b[";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    /// One of the 16 basic terminal colors (8..16 are the bright variants).
    Ansi(u8),
    /// 256-color palette index.
    Fixed(u8),
    Rgb(u8, u8, u8),
}

impl Color {
    pub fn parse(token: &str) -> Result<Self, StyleError> {
        let token = token.trim().to_ascii_lowercase();
        if let Some(hex) = token.strip_prefix('#') {
            return parse_hex(hex).ok_or(StyleError::InvalidHex(token.clone()));
        }
        if let Ok(index) = token.parse::<u8>() {
            return Ok(Color::Fixed(index));
        }

        let (bright, base) = match token
            .strip_prefix("bright_")
            .or_else(|| token.strip_prefix("bright-"))
            .or_else(|| token.strip_suffix("bright"))
        {
            Some(base) => (true, base),
            None => (false, token.as_str()),
        };

        let index = match base {
            "black" => 0,
            "red" => 1,
            "green" => 2,
            "yellow" => 3,
            "blue" => 4,
            "magenta" => 5,
            "cyan" => 6,
            "white" => 7,
            "gray" | "grey" if !bright => return Ok(Color::Ansi(8)),
            _ => return Err(StyleError::UnknownToken(token.clone())),
        };
        Ok(Color::Ansi(if bright { index + 8 } else { index }))
    }

    fn params(&self, background: bool) -> String {
        let (base, bright_base, extended) = if background {
            (40u16, 100u16, 48u16)
        } else {
            (30, 90, 38)
        };
        match *self {
            Color::Ansi(n) if n < 8 => (base + u16::from(n)).to_string(),
            Color::Ansi(n) => (bright_base + u16::from(n % 8)).to_string(),
            Color::Fixed(n) => format!("{};5;{}", extended, n),
            Color::Rgb(r, g, b) => format!("{};2;{};{};{}", extended, r, g, b),
        }
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.is_ascii() {
        return None;
    }
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return None,
    };
    let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
    Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Style {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
    pub dim: bool,
    pub italic: bool,
    pub underline: bool,
    pub inverse: bool,
    pub strikethrough: bool,
}

impl Style {
    pub fn parse(spec: &str) -> Result<Self, StyleError> {
        let mut style = Style::default();
        let mut tokens = spec
            .split(|c: char| c.is_whitespace() || c == '+' || c == ',')
            .filter(|t| !t.is_empty());

        while let Some(token) = tokens.next() {
            match token.to_ascii_lowercase().as_str() {
                "none" | "default" | "plain" | "reset" => {}
                "bold" | "strong" => style.bold = true,
                "dim" | "faint" => style.dim = true,
                "italic" => style.italic = true,
                "underline" | "underlined" => style.underline = true,
                "inverse" | "reverse" => style.inverse = true,
                "strikethrough" | "strike" => style.strikethrough = true,
                "on" => {
                    let color = tokens.next().ok_or(StyleError::MissingBackground)?;
                    style.bg = Some(Color::parse(color)?);
                }
                other => {
                    if let Some(color) = other.strip_prefix("bg:") {
                        style.bg = Some(Color::parse(color)?);
                    } else {
                        style.fg = Some(Color::parse(other.strip_prefix("fg:").unwrap_or(other))?);
                    }
                }
            }
        }

        Ok(style)
    }

    pub fn is_plain(&self) -> bool {
        *self == Style::default()
    }

    /// Layers `over` on top of `self`: its colors win, modifiers accumulate.
    pub fn overlay(&self, over: &Style) -> Style {
        Style {
            fg: over.fg.or(self.fg),
            bg: over.bg.or(self.bg),
            bold: self.bold || over.bold,
            dim: self.dim || over.dim,
            italic: self.italic || over.italic,
            underline: self.underline || over.underline,
            inverse: self.inverse || over.inverse,
            strikethrough: self.strikethrough || over.strikethrough,
        }
    }

    /// (open, close) SGR parameter pairs, one per active attribute.
    fn attributes(&self) -> Vec<(String, &'static str)> {
        let mut attrs = Vec::new();
        if let Some(fg) = self.fg {
            attrs.push((fg.params(false), "39"));
        }
        if let Some(bg) = self.bg {
            attrs.push((bg.params(true), "49"));
        }
        let flags = [
            (self.bold, "1", "22"),
            (self.dim, "2", "22"),
            (self.italic, "3", "23"),
            (self.underline, "4", "24"),
            (self.inverse, "7", "27"),
            (self.strikethrough, "9", "29"),
        ];
        for (enabled, open, close) in flags {
            if enabled {
                attrs.push((open.to_string(), close));
            }
        }
        attrs
    }

    pub fn paint(&self, text: &str) -> String {
        if text.is_empty() || self.is_plain() {
            return text.to_string();
        }

        let attrs = self.attributes();
        let open = format!(
            "{}{}m",
            ESC,
            attrs.iter().map(|(o, _)| o.as_str()).collect::<Vec<_>>().join(";")
        );
        let mut close = String::new();
        for (_, code) in &attrs {
            let seq = format!("{}{}m", ESC, code);
            if !close.contains(&seq) {
                close.push_str(&seq);
            }
        }

        let mut body = text.to_string();
        for (reopen, code) in &attrs {
            let inner_close = format!("{}{}m", ESC, code);
            if body.contains(&inner_close) {
                body = body.replace(&inner_close, &format!("{}{}{}m", inner_close, ESC, reopen));
            }
        }
        if body.contains(RESET) {
            body = body.replace(RESET, &format!("{}{}", RESET, open));
        }
        // Every line is closed on its own; empty lines stay empty.
        body.split('\n')
            .map(|line| {
                if line.is_empty() {
                    String::new()
                } else {
                    format!("{}{}{}", open, line, close)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

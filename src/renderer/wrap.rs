//! ANSI-aware measuring, wrapping and alignment of terminal text.
//!
//! Escape sequences have zero width and wide characters count double, so
//! decisions are made on what the terminal actually shows.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_width::UnicodeWidthChar;

static ANSI_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)")
        .expect("valid ANSI pattern")
});

static TRAILING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\s|\x1b\[[0-9;?]*[ -/]*[@-~])+$").expect("valid trailing pattern")
});

const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "left" | "start" | "justify" => Some(Alignment::Left),
            "center" | "centre" | "middle" => Some(Alignment::Center),
            "right" | "end" => Some(Alignment::Right),
            _ => None,
        }
    }
}

pub fn strip_ansi(text: &str) -> String {
    ANSI_RE.replace_all(text, "").into_owned()
}

/// Display width of `text`, ignoring escape sequences.
pub fn visual_length(text: &str) -> usize {
    strip_ansi(text)
        .chars()
        .map(|c| UnicodeWidthChar::width(c).unwrap_or(0))
        .sum()
}

/// Widest line of a multi-line string.
pub fn max_line_width(text: &str) -> usize {
    text.lines().map(visual_length).max().unwrap_or(0)
}

/// Wraps `text` to `width` columns. Hard line breaks are kept, trailing
/// whitespace is trimmed from every line, and styles open at a break are
/// closed before it and re-opened after it. Preformatted text is returned
/// untouched.
pub fn wrap(text: &str, width: usize, preformatted: bool) -> String {
    if preformatted {
        return text.to_string();
    }
    let width = width.max(1);

    let lines: Vec<String> = text
        .split('\n')
        .flat_map(|line| wrap_line(line, width))
        .collect();
    carry_styles(lines)
}

/// Pads a single line to `width` according to `alignment`. Lines that are
/// already wide enough are returned as-is.
pub fn align_line(line: &str, width: usize, alignment: Alignment) -> String {
    let len = visual_length(line);
    if len >= width {
        return line.to_string();
    }
    let padding = width - len;
    match alignment {
        Alignment::Left => format!("{}{}", line, " ".repeat(padding)),
        Alignment::Right => format!("{}{}", " ".repeat(padding), line),
        Alignment::Center => {
            let left = padding / 2;
            format!("{}{}{}", " ".repeat(left), line, " ".repeat(padding - left))
        }
    }
}

/// Removes trailing whitespace, looking through trailing escape sequences.
pub fn trim_end_ansi(line: &str) -> String {
    match TRAILING_RE.find(line) {
        Some(m) => {
            let mut out = line[..m.start()].to_string();
            for escape in ANSI_RE.find_iter(m.as_str()) {
                out.push_str(escape.as_str());
            }
            out
        }
        None => line.to_string(),
    }
}

fn escape_at(text: &str, i: usize) -> Option<regex::Match<'_>> {
    if !text[i..].starts_with('\x1b') {
        return None;
    }
    ANSI_RE.find_at(text, i).filter(|m| m.start() == i)
}

#[derive(Debug)]
enum Piece<'a> {
    Word(&'a str, usize),
    Space(&'a str, usize),
}

/// Splits a line into words and whitespace runs. Escape sequences belong to
/// the word that follows them (or precedes them at the end of the line).
fn pieces(line: &str) -> Vec<Piece<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut width = 0;
    let mut in_space: Option<bool> = None;
    let mut i = 0;

    while i < line.len() {
        if let Some(m) = escape_at(line, i) {
            if in_space == Some(true) {
                out.push(Piece::Space(&line[start..i], width));
                start = i;
                width = 0;
                in_space = Some(false);
            } else if in_space.is_none() {
                in_space = Some(false);
            }
            i = m.end();
            continue;
        }

        let Some(ch) = line[i..].chars().next() else {
            break;
        };
        let is_space = ch == ' ' || ch == '\t';
        if in_space.is_some() && in_space != Some(is_space) && i > start {
            if in_space == Some(true) {
                out.push(Piece::Space(&line[start..i], width));
            } else {
                out.push(Piece::Word(&line[start..i], width));
            }
            start = i;
            width = 0;
        }
        in_space = Some(is_space);
        width += UnicodeWidthChar::width(ch).unwrap_or(0);
        i += ch.len_utf8();
    }

    if start < line.len() {
        match in_space {
            Some(true) => out.push(Piece::Space(&line[start..], width)),
            _ => out.push(Piece::Word(&line[start..], width)),
        }
    }
    out
}

fn wrap_line(line: &str, width: usize) -> Vec<String> {
    if visual_length(line) <= width {
        return vec![trim_end_ansi(line)];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;
    let mut pending = "";
    let mut pending_width = 0;
    let mut at_line_start = true;

    for piece in pieces(line) {
        match piece {
            Piece::Space(space, w) => {
                if at_line_start && lines.is_empty() {
                    // Leading indentation of the first line is kept.
                    current.push_str(space);
                    current_width += w;
                } else if !at_line_start {
                    pending = space;
                    pending_width = w;
                }
            }
            Piece::Word(word, 0) => current.push_str(word),
            Piece::Word(word, w) => {
                if !at_line_start && current_width + pending_width + w > width {
                    lines.push(trim_end_ansi(&current));
                    current.clear();
                    current_width = 0;
                    at_line_start = true;
                }
                if !at_line_start {
                    current.push_str(pending);
                    current_width += pending_width;
                }
                pending = "";
                pending_width = 0;

                if current_width + w > width {
                    for chunk in break_word(word, width, width.saturating_sub(current_width)) {
                        current.push_str(&chunk);
                        lines.push(trim_end_ansi(&current));
                        current.clear();
                    }
                    // The last chunk stays open on the current line.
                    if let Some(last) = lines.pop() {
                        current = last;
                    }
                    current_width = visual_length(&current);
                } else {
                    current.push_str(word);
                    current_width += w;
                }
                at_line_start = false;
            }
        }
    }

    lines.push(trim_end_ansi(&current));
    lines
}

/// Splits a word wider than the line into chunks. The first chunk fits in
/// `first_width`, the others in `width`.
fn break_word(word: &str, width: usize, first_width: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;
    let mut limit = if first_width == 0 { width } else { first_width };
    let mut i = 0;

    while i < word.len() {
        if let Some(m) = escape_at(word, i) {
            current.push_str(m.as_str());
            i = m.end();
            continue;
        }
        let Some(ch) = word[i..].chars().next() else {
            break;
        };
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if current_width + w > limit && current_width > 0 {
            chunks.push(std::mem::take(&mut current));
            current_width = 0;
            limit = width;
        }
        current.push(ch);
        current_width += w;
        i += ch.len_utf8();
    }
    chunks.push(current);
    chunks
}

/// SGR attributes that are active at some point of a string.
#[derive(Debug, Default, Clone)]
struct SgrState {
    fg: Option<String>,
    bg: Option<String>,
    intensity: Vec<&'static str>,
    flags: Vec<&'static str>,
}

impl SgrState {
    fn feed(&mut self, text: &str) {
        for m in ANSI_RE.find_iter(text) {
            let seq = m.as_str();
            if let Some(params) = seq.strip_prefix("\x1b[").and_then(|s| s.strip_suffix('m')) {
                self.apply(params);
            }
        }
    }

    fn apply(&mut self, params: &str) {
        let codes: Vec<&str> = params.split(';').collect();
        let mut i = 0;
        while i < codes.len() {
            match codes[i] {
                "" | "0" => *self = SgrState::default(),
                "1" => push_unique(&mut self.intensity, "1"),
                "2" => push_unique(&mut self.intensity, "2"),
                "22" => self.intensity.clear(),
                "3" => push_unique(&mut self.flags, "3"),
                "4" => push_unique(&mut self.flags, "4"),
                "7" => push_unique(&mut self.flags, "7"),
                "9" => push_unique(&mut self.flags, "9"),
                "23" => self.flags.retain(|f| *f != "3"),
                "24" => self.flags.retain(|f| *f != "4"),
                "27" => self.flags.retain(|f| *f != "7"),
                "29" => self.flags.retain(|f| *f != "9"),
                "39" => self.fg = None,
                "49" => self.bg = None,
                code @ ("38" | "48") => {
                    let len = match codes.get(i + 1) {
                        Some(&"5") => 3,
                        Some(&"2") => 5,
                        _ => 1,
                    };
                    let end = (i + len).min(codes.len());
                    let value = codes[i..end].join(";");
                    if code == "38" {
                        self.fg = Some(value);
                    } else {
                        self.bg = Some(value);
                    }
                    i = end;
                    continue;
                }
                code => {
                    if let Ok(n) = code.parse::<u8>() {
                        match n {
                            30..=37 | 90..=97 => self.fg = Some(code.to_string()),
                            40..=47 | 100..=107 => self.bg = Some(code.to_string()),
                            _ => {}
                        }
                    }
                }
            }
            i += 1;
        }
    }

    fn is_empty(&self) -> bool {
        self.fg.is_none() && self.bg.is_none() && self.intensity.is_empty() && self.flags.is_empty()
    }

    fn reopen(&self) -> String {
        let mut params: Vec<String> = Vec::new();
        params.extend(self.fg.iter().cloned());
        params.extend(self.bg.iter().cloned());
        params.extend(self.intensity.iter().map(|s| s.to_string()));
        params.extend(self.flags.iter().map(|s| s.to_string()));
        format!("\x1b[{}m", params.join(";"))
    }
}

fn push_unique(list: &mut Vec<&'static str>, code: &'static str) {
    if !list.contains(&code) {
        list.push(code);
    }
}

fn carry_styles(lines: Vec<String>) -> String {
    let mut state = SgrState::default();
    let mut out = Vec::with_capacity(lines.len());
    let count = lines.len();

    for (index, line) in lines.into_iter().enumerate() {
        let mut line = if state.is_empty() {
            line
        } else {
            format!("{}{}", state.reopen(), line)
        };
        state.feed(&line);
        if index + 1 < count && !state.is_empty() {
            line.push_str(RESET);
        }
        out.push(line);
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visual_length_ignores_sgr() {
        let colored = "\x1b[31mhello\x1b[39m \x1b[1;4mworld\x1b[0m";
        assert_eq!(visual_length(colored), "hello world".len());
        assert_eq!(strip_ansi(colored), "hello world");
    }

    #[test]
    fn test_visual_length_counts_wide_characters() {
        assert_eq!(visual_length("日本"), 4);
        assert_eq!(visual_length("a•b"), 3);
    }

    #[test]
    fn test_wrap_greedy_words() {
        let wrapped = wrap("the quick brown fox jumps", 10, false);
        assert_eq!(wrapped, "the quick\nbrown fox\njumps");
    }

    #[test]
    fn test_wrap_is_noop_when_preformatted() {
        let text = "a very long line that would otherwise wrap   ";
        assert_eq!(wrap(text, 5, true), text);
    }

    #[test]
    fn test_wrap_keeps_hard_breaks_and_trims() {
        assert_eq!(wrap("one   \ntwo", 20, false), "one\ntwo");
    }

    #[test]
    fn test_wrap_breaks_long_words() {
        assert_eq!(wrap("abcdefghij", 4, false), "abcd\nefgh\nij");
        assert_eq!(wrap("ab cdefghij", 4, false), "ab\ncdef\nghij");
    }

    #[test]
    fn test_wrap_measures_without_escapes() {
        let red = |s: &str| format!("\x1b[31m{}\x1b[39m", s);
        let text = format!("{} {}", red("aaaa"), red("bbbb"));
        let wrapped = wrap(&text, 9, false);
        assert_eq!(strip_ansi(&wrapped), "aaaa bbbb");
    }

    #[test]
    fn test_wrap_reopens_styles_across_breaks() {
        let text = "\x1b[32maaaa bbbb\x1b[39m";
        let wrapped = wrap(text, 4, false);
        let lines: Vec<&str> = wrapped.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(RESET));
        assert!(lines[1].starts_with("\x1b[32m"));
        assert_eq!(strip_ansi(&wrapped), "aaaa\nbbbb");
    }

    #[test]
    fn test_trim_end_looks_through_escapes() {
        assert_eq!(trim_end_ansi("ab  \x1b[39m  "), "ab\x1b[39m");
        assert_eq!(trim_end_ansi("ab"), "ab");
    }

    #[test]
    fn test_align_line() {
        assert_eq!(align_line("ab", 6, Alignment::Left), "ab    ");
        assert_eq!(align_line("ab", 6, Alignment::Right), "    ab");
        assert_eq!(align_line("ab", 7, Alignment::Center), "  ab   ");
        assert_eq!(align_line("\x1b[1mab\x1b[22m", 4, Alignment::Right), "  \x1b[1mab\x1b[22m");
        assert_eq!(align_line("toolong", 3, Alignment::Center), "toolong");
    }

    #[test]
    fn test_alignment_parse() {
        assert_eq!(Alignment::parse("CENTER"), Some(Alignment::Center));
        assert_eq!(Alignment::parse("end"), Some(Alignment::Right));
        assert_eq!(Alignment::parse("diagonal"), None);
    }
}

//! # List Numbering
//!
//! Marker resolution for ordered and unordered lists.
//!
//! - Ordered lists: decimal, bijective base-26 letters and Roman numerals
//! - Unordered lists: a `disc → square → circle` rotation that advances with
//!   every nesting level unless a type is requested explicitly

use crate::theme::ListConfig;

/// Numbering system of an ordered list (the HTML `type` attribute).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrderedType {
    #[default]
    Decimal,
    UpperAlpha,
    LowerAlpha,
    UpperRoman,
    LowerRoman,
}

impl OrderedType {
    pub fn parse(symbol: &str) -> Option<Self> {
        match symbol.trim() {
            "1" => Some(OrderedType::Decimal),
            "A" => Some(OrderedType::UpperAlpha),
            "a" => Some(OrderedType::LowerAlpha),
            "I" => Some(OrderedType::UpperRoman),
            "i" => Some(OrderedType::LowerRoman),
            _ => None,
        }
    }
}

/// Bullet of an unordered list, in rotation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BulletKind {
    #[default]
    Disc,
    Square,
    Circle,
}

impl BulletKind {
    const ROTATION: [BulletKind; 3] = [BulletKind::Disc, BulletKind::Square, BulletKind::Circle];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "disc" => Some(BulletKind::Disc),
            "square" => Some(BulletKind::Square),
            "circle" => Some(BulletKind::Circle),
            _ => None,
        }
    }

    fn position(self) -> usize {
        match self {
            BulletKind::Disc => 0,
            BulletKind::Square => 1,
            BulletKind::Circle => 2,
        }
    }

    /// The kind one nesting level further down.
    pub fn next(self) -> Self {
        Self::ROTATION[(self.position() + 1) % Self::ROTATION.len()]
    }

    pub fn symbol(self, config: &ListConfig) -> &str {
        &config.bullets[self.position()]
    }
}

/// Kind of the list an item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    Ordered(OrderedType),
    Unordered(BulletKind),
}

/// Numbering state handed down to list items through the render context.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListState {
    /// Number of the current item (may be zero or negative for `start` and
    /// `reversed` lists).
    pub index: i64,
    pub kind: ListKind,
    pub compact: bool,
    /// Columns reserved for the marker, including the gap after it.
    pub marker_width: usize,
    /// Bullet of the innermost enclosing unordered list, if any.
    pub bullet: Option<BulletKind>,
    /// Explicit marker text requested by the list.
    pub marker: Option<String>,
}

impl ListState {
    /// State for an `li` found outside of any list.
    pub fn orphan(config: &ListConfig) -> Self {
        Self {
            index: 1,
            kind: ListKind::Unordered(BulletKind::Disc),
            compact: config.compact,
            marker_width: config.indent.max(2),
            bullet: Some(BulletKind::Disc),
            marker: None,
        }
    }

    /// Marker text of the current item, without padding.
    pub fn marker_text(&self, config: &ListConfig) -> String {
        match (&self.marker, self.kind) {
            (Some(marker), _) => marker.clone(),
            (None, ListKind::Ordered(kind)) => format!("{}.", ordered_marker(self.index, kind)),
            (None, ListKind::Unordered(bullet)) => bullet.symbol(config).to_string(),
        }
    }
}

/// Resolves the bullet of an unordered list.
///
/// An explicitly requested type wins. Otherwise a nested list takes the
/// type after its parent's in the rotation, wrapping modulo three, and a
/// top-level list starts with a disc.
pub fn resolve_bullet(requested: Option<BulletKind>, parent: Option<BulletKind>) -> BulletKind {
    match (requested, parent) {
        (Some(kind), _) => kind,
        (None, Some(parent)) => parent.next(),
        (None, None) => BulletKind::Disc,
    }
}

/// Formats the marker text of an ordered list item (without the trailing
/// period). Numbers the letter and Roman systems cannot express fall back to
/// decimal.
pub fn ordered_marker(index: i64, kind: OrderedType) -> String {
    match kind {
        OrderedType::Decimal => index.to_string(),
        OrderedType::UpperAlpha => alpha(index).unwrap_or_else(|| index.to_string()),
        OrderedType::LowerAlpha => alpha(index)
            .map(|s| s.to_ascii_lowercase())
            .unwrap_or_else(|| index.to_string()),
        OrderedType::UpperRoman => roman(index).unwrap_or_else(|| index.to_string()),
        OrderedType::LowerRoman => roman(index)
            .map(|s| s.to_ascii_lowercase())
            .unwrap_or_else(|| index.to_string()),
    }
}

/// Bijective base-26: 1 → A, 26 → Z, 27 → AA.
fn alpha(index: i64) -> Option<String> {
    if index < 1 {
        return None;
    }
    let mut n = index;
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push((b'A' + (n % 26) as u8) as char);
        n /= 26;
    }
    Some(letters.iter().rev().collect())
}

fn roman(index: i64) -> Option<String> {
    const NUMERALS: [(i64, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];

    if !(1..=3999).contains(&index) {
        return None;
    }
    let mut n = index;
    let mut out = String::new();
    for (value, numeral) in NUMERALS {
        while n >= value {
            out.push_str(numeral);
            n -= value;
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_item_in_every_system() {
        assert_eq!(ordered_marker(1, OrderedType::Decimal), "1");
        assert_eq!(ordered_marker(1, OrderedType::UpperAlpha), "A");
        assert_eq!(ordered_marker(1, OrderedType::LowerAlpha), "a");
        assert_eq!(ordered_marker(1, OrderedType::UpperRoman), "I");
        assert_eq!(ordered_marker(1, OrderedType::LowerRoman), "i");
    }

    #[test]
    fn test_alpha_is_bijective_base_26() {
        assert_eq!(ordered_marker(26, OrderedType::UpperAlpha), "Z");
        assert_eq!(ordered_marker(27, OrderedType::UpperAlpha), "AA");
        assert_eq!(ordered_marker(27, OrderedType::LowerAlpha), "aa");
        assert_eq!(ordered_marker(52, OrderedType::UpperAlpha), "AZ");
        assert_eq!(ordered_marker(703, OrderedType::UpperAlpha), "AAA");
    }

    #[test]
    fn test_roman_numerals() {
        assert_eq!(ordered_marker(4, OrderedType::UpperRoman), "IV");
        assert_eq!(ordered_marker(9, OrderedType::LowerRoman), "ix");
        assert_eq!(ordered_marker(1994, OrderedType::UpperRoman), "MCMXCIV");
        assert_eq!(ordered_marker(3999, OrderedType::UpperRoman), "MMMCMXCIX");
    }

    #[test]
    fn test_out_of_range_falls_back_to_decimal() {
        assert_eq!(ordered_marker(0, OrderedType::UpperAlpha), "0");
        assert_eq!(ordered_marker(-2, OrderedType::LowerRoman), "-2");
        assert_eq!(ordered_marker(4000, OrderedType::UpperRoman), "4000");
    }

    #[test]
    fn test_ordered_type_parse() {
        assert_eq!(OrderedType::parse("I"), Some(OrderedType::UpperRoman));
        assert_eq!(OrderedType::parse("i"), Some(OrderedType::LowerRoman));
        assert_eq!(OrderedType::parse("x"), None);
    }

    #[test]
    fn test_bullet_rotation_through_nesting() {
        let outer = resolve_bullet(None, None);
        let middle = resolve_bullet(None, Some(outer));
        let inner = resolve_bullet(None, Some(middle));
        let fourth = resolve_bullet(None, Some(inner));

        assert_eq!(outer, BulletKind::Disc);
        assert_eq!(middle, BulletKind::Square);
        assert_eq!(inner, BulletKind::Circle);
        assert_eq!(fourth, BulletKind::Disc);
    }

    #[test]
    fn test_requested_bullet_wins() {
        assert_eq!(
            resolve_bullet(Some(BulletKind::Circle), Some(BulletKind::Disc)),
            BulletKind::Circle
        );
        // Rotation continues from the explicit type.
        assert_eq!(
            resolve_bullet(None, Some(BulletKind::Circle)),
            BulletKind::Disc
        );
    }

    #[test]
    fn test_bullet_symbols_come_from_config() {
        let config = ListConfig::default();
        assert_eq!(BulletKind::Disc.symbol(&config), "•");
        assert_eq!(BulletKind::Square.symbol(&config), "▪");
        assert_eq!(BulletKind::Circle.symbol(&config), "◦");
    }
}

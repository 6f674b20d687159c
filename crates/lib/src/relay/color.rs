//! Username colors: gateway color tags (Discord role colors) to in-game display colors.

use serde::{Deserialize, Serialize};

/// In-game display color for a relayed username.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayColor {
    Black,
    DarkBlue,
    DarkGreen,
    DarkAqua,
    DarkRed,
    DarkPurple,
    Gold,
    Gray,
    DarkGray,
    Blue,
    Green,
    Aqua,
    Red,
    LightPurple,
    Yellow,
    White,
}

/// Recognized `userColor` keys. Closed set; anything else resolves to the default color.
const COLOR_TAGS: &[(&str, DisplayColor)] = &[
    ("white", DisplayColor::White),
    ("light_gray", DisplayColor::Gray),
    ("gray", DisplayColor::DarkGray),
    ("dark_gray", DisplayColor::DarkGray),
    ("black", DisplayColor::Black),
    ("red", DisplayColor::Red),
    ("dark_red", DisplayColor::DarkRed),
    ("gold", DisplayColor::Gold),
    ("yellow", DisplayColor::Yellow),
    ("dark_green", DisplayColor::DarkGreen),
    ("green", DisplayColor::Green),
    ("aqua", DisplayColor::Aqua),
    ("dark_aqua", DisplayColor::DarkAqua),
    ("blue", DisplayColor::Blue),
    ("dark_blue", DisplayColor::DarkBlue),
    ("light_purple", DisplayColor::LightPurple),
    ("dark_purple", DisplayColor::DarkPurple),
];

impl DisplayColor {
    /// Color used when a message has no tag or an unrecognized one, unless configured otherwise.
    pub const DEFAULT: DisplayColor = DisplayColor::Aqua;

    /// Look up a color tag. Exact, case-sensitive match against the known keys.
    pub fn from_tag(tag: &str) -> Option<Self> {
        COLOR_TAGS
            .iter()
            .find(|(key, _)| *key == tag)
            .map(|(_, color)| *color)
    }

    /// Resolve an optional tag, falling back to `default` for absent or unknown keys.
    pub fn resolve(tag: Option<&str>, default: DisplayColor) -> Self {
        tag.and_then(Self::from_tag).unwrap_or(default)
    }

    /// Upper-case color name, e.g. `RED`, `DARK_PURPLE`.
    pub fn name(self) -> &'static str {
        match self {
            DisplayColor::Black => "BLACK",
            DisplayColor::DarkBlue => "DARK_BLUE",
            DisplayColor::DarkGreen => "DARK_GREEN",
            DisplayColor::DarkAqua => "DARK_AQUA",
            DisplayColor::DarkRed => "DARK_RED",
            DisplayColor::DarkPurple => "DARK_PURPLE",
            DisplayColor::Gold => "GOLD",
            DisplayColor::Gray => "GRAY",
            DisplayColor::DarkGray => "DARK_GRAY",
            DisplayColor::Blue => "BLUE",
            DisplayColor::Green => "GREEN",
            DisplayColor::Aqua => "AQUA",
            DisplayColor::Red => "RED",
            DisplayColor::LightPurple => "LIGHT_PURPLE",
            DisplayColor::Yellow => "YELLOW",
            DisplayColor::White => "WHITE",
        }
    }

    /// Minecraft legacy formatting code (the character after `§`).
    pub fn legacy_code(self) -> char {
        match self {
            DisplayColor::Black => '0',
            DisplayColor::DarkBlue => '1',
            DisplayColor::DarkGreen => '2',
            DisplayColor::DarkAqua => '3',
            DisplayColor::DarkRed => '4',
            DisplayColor::DarkPurple => '5',
            DisplayColor::Gold => '6',
            DisplayColor::Gray => '7',
            DisplayColor::DarkGray => '8',
            DisplayColor::Blue => '9',
            DisplayColor::Green => 'a',
            DisplayColor::Aqua => 'b',
            DisplayColor::Red => 'c',
            DisplayColor::LightPurple => 'd',
            DisplayColor::Yellow => 'e',
            DisplayColor::White => 'f',
        }
    }

    /// Closest ANSI SGR foreground sequence, for terminal hosts.
    pub fn ansi(self) -> &'static str {
        match self {
            DisplayColor::Black => "\x1b[30m",
            DisplayColor::DarkBlue => "\x1b[34m",
            DisplayColor::DarkGreen => "\x1b[32m",
            DisplayColor::DarkAqua => "\x1b[36m",
            DisplayColor::DarkRed => "\x1b[31m",
            DisplayColor::DarkPurple => "\x1b[35m",
            DisplayColor::Gold => "\x1b[33m",
            DisplayColor::Gray => "\x1b[37m",
            DisplayColor::DarkGray => "\x1b[90m",
            DisplayColor::Blue => "\x1b[94m",
            DisplayColor::Green => "\x1b[92m",
            DisplayColor::Aqua => "\x1b[96m",
            DisplayColor::Red => "\x1b[91m",
            DisplayColor::LightPurple => "\x1b[95m",
            DisplayColor::Yellow => "\x1b[93m",
            DisplayColor::White => "\x1b[97m",
        }
    }
}

/// All recognized color tags, in table order.
pub fn color_tags() -> impl Iterator<Item = &'static str> {
    COLOR_TAGS.iter().map(|(key, _)| *key)
}

/// How color and reset markers are rendered into display text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorStyle {
    /// Bracketed names: `<RED>Bob<RESET>`.
    #[default]
    Tagged,
    /// Minecraft section-sign codes: `§cBob§r`.
    Legacy,
    /// ANSI escape sequences for terminals.
    Ansi,
}

impl ColorStyle {
    pub fn paint(self, color: DisplayColor) -> String {
        match self {
            ColorStyle::Tagged => format!("<{}>", color.name()),
            ColorStyle::Legacy => format!("§{}", color.legacy_code()),
            ColorStyle::Ansi => color.ansi().to_string(),
        }
    }

    pub fn reset(self) -> &'static str {
        match self {
            ColorStyle::Tagged => "<RESET>",
            ColorStyle::Legacy => "§r",
            ColorStyle::Ansi => "\x1b[0m",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tag_resolves() {
        for tag in color_tags() {
            assert!(DisplayColor::from_tag(tag).is_some(), "{tag} not in table");
        }
        assert_eq!(color_tags().count(), 17);
    }

    #[test]
    fn grays_follow_discord_naming() {
        assert_eq!(DisplayColor::from_tag("light_gray"), Some(DisplayColor::Gray));
        assert_eq!(DisplayColor::from_tag("gray"), Some(DisplayColor::DarkGray));
        assert_eq!(DisplayColor::from_tag("dark_gray"), Some(DisplayColor::DarkGray));
    }

    #[test]
    fn unknown_and_absent_tags_use_default() {
        let default = DisplayColor::Gold;
        assert_eq!(DisplayColor::resolve(None, default), default);
        assert_eq!(DisplayColor::resolve(Some(""), default), default);
        assert_eq!(DisplayColor::resolve(Some("RED"), default), default);
        assert_eq!(DisplayColor::resolve(Some("magenta"), default), default);
        assert_eq!(DisplayColor::resolve(Some("red"), default), DisplayColor::Red);
    }

    #[test]
    fn styles_render_markers() {
        assert_eq!(ColorStyle::Tagged.paint(DisplayColor::DarkPurple), "<DARK_PURPLE>");
        assert_eq!(ColorStyle::Legacy.paint(DisplayColor::Red), "§c");
        assert_eq!(ColorStyle::Legacy.reset(), "§r");
        assert_eq!(ColorStyle::Ansi.paint(DisplayColor::Aqua), "\x1b[96m");
    }

    #[test]
    fn style_parses_lowercase() {
        let style: ColorStyle = serde_json::from_str("\"legacy\"").unwrap();
        assert_eq!(style, ColorStyle::Legacy);
    }
}

//! Style classes and the permission node each one requires.

use super::token::Token;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Capability classes a styled nickname can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleClass {
    /// Any color: legacy `0-9a-f`, `&#rrggbb` or compact hex.
    Color,
    /// `&l`
    Bold,
    /// `&m`
    Strikethrough,
    /// `&n`
    Underline,
    /// `&o`
    Italic,
    /// `&k` (glyph obfuscation, also the hide marker)
    Obfuscate,
    /// `&r`
    Reset,
}

impl StyleClass {
    /// Order in which capabilities are checked.
    pub const CHECK_ORDER: [StyleClass; 7] = [
        StyleClass::Color,
        StyleClass::Bold,
        StyleClass::Strikethrough,
        StyleClass::Underline,
        StyleClass::Italic,
        StyleClass::Reset,
        StyleClass::Obfuscate,
    ];

    /// Class of a style token; `None` for visible characters.
    pub fn of(token: &Token<'_>) -> Option<StyleClass> {
        match token {
            Token::HexColor(_) | Token::CompactHex(_) => Some(StyleClass::Color),
            Token::Legacy { code, .. } => Some(match code {
                'k' => StyleClass::Obfuscate,
                'l' => StyleClass::Bold,
                'm' => StyleClass::Strikethrough,
                'n' => StyleClass::Underline,
                'o' => StyleClass::Italic,
                'r' => StyleClass::Reset,
                _ => StyleClass::Color,
            }),
            Token::Visible(_) => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StyleClass::Color => "colors",
            StyleClass::Bold => "bold",
            StyleClass::Strikethrough => "strikethrough",
            StyleClass::Underline => "underline",
            StyleClass::Italic => "italic",
            StyleClass::Obfuscate => "obfuscate",
            StyleClass::Reset => "reset",
        }
    }
}

impl fmt::Display for StyleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Permission node names, one per style class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StyleNodes {
    pub colors: String,
    pub bold: String,
    pub strikethrough: String,
    pub underline: String,
    pub italic: String,
    pub obfuscate: String,
    pub reset: String,
}

impl Default for StyleNodes {
    fn default() -> Self {
        Self {
            colors: "networknick.nick.colors".to_string(),
            bold: "networknick.nick.format.l".to_string(),
            strikethrough: "networknick.nick.format.m".to_string(),
            underline: "networknick.nick.format.n".to_string(),
            italic: "networknick.nick.format.o".to_string(),
            obfuscate: "networknick.nick.format.k".to_string(),
            reset: "networknick.nick.format.r".to_string(),
        }
    }
}

impl StyleNodes {
    pub fn node_for(&self, class: StyleClass) -> &str {
        match class {
            StyleClass::Color => &self.colors,
            StyleClass::Bold => &self.bold,
            StyleClass::Strikethrough => &self.strikethrough,
            StyleClass::Underline => &self.underline,
            StyleClass::Italic => &self.italic,
            StyleClass::Obfuscate => &self.obfuscate,
            StyleClass::Reset => &self.reset,
        }
    }
}

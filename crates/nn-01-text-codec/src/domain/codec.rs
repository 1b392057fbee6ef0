//! Strip / validate / trim operations over tokenized nicknames.
//!
//! All operations treat `&` and `§` spellings identically, so a value that has
//! already been rendered once is still classified correctly.

use super::token::{is_marker, tokenize, Token, NATIVE_MARKER};
use crate::error::CodecError;

/// Marker prefix identifying a hidden nickname.
pub const HIDE_TOKEN: &str = "&k";

/// Remove every formatting token, keeping only visible characters.
pub fn strip(raw: &str) -> String {
    tokenize(raw)
        .filter_map(|(_, t)| match t {
            Token::Visible(c) => Some(c),
            _ => None,
        })
        .collect()
}

/// Number of visible characters in `raw`.
pub fn visible_len(raw: &str) -> usize {
    tokenize(raw).filter(|(_, t)| !t.is_style()).count()
}

/// Check that `raw` consists only of color tokens and `[A-Za-z0-9_]`.
pub fn validate_charset(raw: &str) -> Result<(), CodecError> {
    if raw.is_empty() {
        return Err(CodecError::Empty);
    }
    for (position, token) in tokenize(raw) {
        if let Token::Visible(c) = token {
            if !(c.is_ascii_alphanumeric() || c == '_') {
                return Err(CodecError::InvalidCharacter { position, found: c });
            }
        }
    }
    Ok(())
}

/// Copy tokens left to right until `max_visible` visible characters were copied.
///
/// Style tokens are copied whole; anything after the last allowed visible
/// character is dropped.
pub fn trim_to_visible(raw: &str, max_visible: usize) -> String {
    let mut out = String::with_capacity(raw.len());
    if max_visible == 0 {
        return out;
    }

    let mut visible = 0;
    for (_, token) in tokenize(raw) {
        match token {
            Token::Visible(c) => {
                out.push(c);
                visible += 1;
                if visible >= max_visible {
                    break;
                }
            }
            other => out.push_str(&other.as_str()),
        }
    }
    out
}

/// True when any color or format token is present.
pub fn has_style_token(raw: &str) -> bool {
    tokenize(raw).any(|(_, t)| t.is_style())
}

/// True when the trimmed value starts with the hide marker in either spelling.
///
/// Only the lowercase `k` code marks a hidden value; `&K` is an ordinary
/// obfuscate token.
pub fn is_hide_nick(raw: &str) -> bool {
    let mut chars = raw.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(m), Some(code)) => is_marker(m) && code == 'k',
        _ => false,
    }
}

/// Prefix `raw` with the hide marker unless it already carries one.
pub fn force_hide_token(raw: &str) -> String {
    let trimmed = raw.trim();
    if is_hide_nick(trimmed) {
        trimmed.to_string()
    } else {
        format!("{HIDE_TOKEN}{trimmed}")
    }
}

/// Comparison key: tokens stripped, whitespace trimmed, lower-cased.
pub fn normalize_for_compare(raw: &str) -> String {
    strip(raw).trim().to_lowercase()
}

/// Rewrite every token with the native marker, ready for presentation.
///
/// `&#rrggbb` becomes the native compact form `§x§r§r§g§g§b§b`.
pub fn to_native(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 8);
    for (_, token) in tokenize(raw) {
        match token {
            Token::Visible(c) => out.push(c),
            Token::Legacy { code, .. } => {
                out.push(NATIVE_MARKER);
                out.push(code);
            }
            Token::HexColor(s) => {
                out.push(NATIVE_MARKER);
                out.push('x');
                for digit in s.chars().skip(2) {
                    out.push(NATIVE_MARKER);
                    out.push(digit.to_ascii_lowercase());
                }
            }
            Token::CompactHex(s) => {
                for c in s.chars() {
                    if is_marker(c) {
                        out.push(NATIVE_MARKER);
                    } else {
                        out.push(c.to_ascii_lowercase());
                    }
                }
            }
        }
    }
    out
}

//! Domain layer: pure string handling, no I/O.

pub mod codec;
pub mod style;
pub mod token;

pub use codec::{
    force_hide_token, has_style_token, is_hide_nick, normalize_for_compare, strip, to_native,
    trim_to_visible, validate_charset, visible_len, HIDE_TOKEN,
};
pub use style::{StyleClass, StyleNodes};
pub use token::{is_marker, tokenize, Token, Tokenizer, AMP_MARKER, NATIVE_MARKER};

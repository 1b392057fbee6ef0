//! # NN-01 Text Codec
//!
//! Parsing, validation and trimming of nicknames that carry inline color and
//! format escapes.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): tokenizer, strip / validate / trim, style classes
//! - **Validator** (`validator`): `NicknameValidator`, the single acceptance
//!   path shared by every command entry point
//!
//! ## Token Grammar
//!
//! Both escape spellings are accepted everywhere: the ASCII `&` used in input
//! and the native `§` produced by rendering.
//!
//! | Token | Example |
//! |-------|---------|
//! | Extended color | `&#ff00ff` |
//! | Compact hex color | `&x&f&f&0&0&f&f` |
//! | Legacy color / format | `&a`, `&l`, `§k` |
//! | Visible | `[A-Za-z0-9_]` |
//!
//! ## Invariants
//!
//! - `trim_to_visible(s, n)` never splits a token and keeps at most `n` visible characters
//! - an accepted user nickname has between 3 and `max_visible_len` visible characters

pub mod domain;
pub mod error;
pub mod validator;

pub use domain::{
    force_hide_token, has_style_token, is_hide_nick, normalize_for_compare, strip, to_native,
    trim_to_visible, validate_charset, visible_len, StyleClass, StyleNodes, Token, HIDE_TOKEN,
};
pub use error::CodecError;
pub use validator::{
    clamp_max_visible_len, CapabilityCheck, Nickname, NicknameValidator,
    DEFAULT_MAX_VISIBLE_LEN, MAX_VISIBLE_LEN_CAP, MIN_VISIBLE_LEN,
};

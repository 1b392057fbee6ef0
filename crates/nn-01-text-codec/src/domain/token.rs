//! Tokenizer for inline formatting escapes.
//!
//! Grammar (case-insensitive, `M` is either escape marker):
//!
//! ```text
//! HexColor   := M '#' HEX{6}            e.g. &#ff00ff
//! CompactHex := M 'x' (M HEX){6}        e.g. &x&f&f&0&0&f&f
//! Legacy     := M [0-9a-fk-or]          e.g. &l, §a
//! Visible    := any other single char
//! ```
//!
//! Every sub-marker of a `CompactHex` token must use the same spelling as its
//! leading marker. Alternatives are tried in the order above; a marker that
//! starts none of them is an ordinary visible character.

/// ASCII escape marker used in user input and config.
pub const AMP_MARKER: char = '&';

/// Native in-band marker produced by rendering.
pub const NATIVE_MARKER: char = '\u{00A7}';

/// Whether `c` is one of the two escape-marker spellings.
#[inline]
pub fn is_marker(c: char) -> bool {
    c == AMP_MARKER || c == NATIVE_MARKER
}

/// Single-character legacy codes: 16 colors plus k, l, m, n, o, r.
#[inline]
pub fn is_legacy_code(c: char) -> bool {
    matches!(c.to_ascii_lowercase(), '0'..='9' | 'a'..='f' | 'k'..='o' | 'r')
}

/// One lexical unit of a raw nickname.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// `&#rrggbb` extended color.
    HexColor(&'a str),
    /// `&x&r&r&g&g&b&b` compact hex color.
    CompactHex(&'a str),
    /// `&c` single-character color or format code.
    Legacy { raw: &'a str, code: char },
    /// A rendered character.
    Visible(char),
}

impl<'a> Token<'a> {
    /// Source text of this token.
    pub fn as_str(&self) -> std::borrow::Cow<'a, str> {
        match *self {
            Token::HexColor(s) | Token::CompactHex(s) => s.into(),
            Token::Legacy { raw, .. } => raw.into(),
            Token::Visible(c) => c.to_string().into(),
        }
    }

    /// True for anything that is not a visible character.
    pub fn is_style(&self) -> bool {
        !matches!(self, Token::Visible(_))
    }
}

/// Left-to-right token iterator. Yields `(char_position, token)`.
pub struct Tokenizer<'a> {
    input: &'a str,
    byte_pos: usize,
    char_pos: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            byte_pos: 0,
            char_pos: 0,
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = (usize, Token<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.input[self.byte_pos..];
        let first = rest.chars().next()?;
        let start = self.char_pos;

        if is_marker(first) {
            if let Some(len) = match_hex_color(rest) {
                return Some(self.advance(start, len, Token::HexColor(&rest[..len]), 8));
            }
            if let Some(len) = match_compact_hex(rest) {
                return Some(self.advance(start, len, Token::CompactHex(&rest[..len]), 14));
            }
            if let Some((len, code)) = match_legacy(rest) {
                let token = Token::Legacy {
                    raw: &rest[..len],
                    code: code.to_ascii_lowercase(),
                };
                return Some(self.advance(start, len, token, 2));
            }
        }

        Some(self.advance(start, first.len_utf8(), Token::Visible(first), 1))
    }
}

impl<'a> Tokenizer<'a> {
    fn advance(
        &mut self,
        start: usize,
        byte_len: usize,
        token: Token<'a>,
        char_len: usize,
    ) -> (usize, Token<'a>) {
        self.byte_pos += byte_len;
        self.char_pos += char_len;
        (start, token)
    }
}

/// Tokenize `input`.
pub fn tokenize(input: &str) -> Tokenizer<'_> {
    Tokenizer::new(input)
}

fn match_hex_color(s: &str) -> Option<usize> {
    let mut it = s.char_indices();
    let (_, marker) = it.next()?;
    if !is_marker(marker) {
        return None;
    }
    let (_, hash) = it.next()?;
    if hash != '#' {
        return None;
    }
    for _ in 0..6 {
        let (_, c) = it.next()?;
        if !c.is_ascii_hexdigit() {
            return None;
        }
    }
    Some(it.next().map_or(s.len(), |(i, _)| i))
}

fn match_compact_hex(s: &str) -> Option<usize> {
    let mut it = s.char_indices();
    let (_, marker) = it.next()?;
    if !is_marker(marker) {
        return None;
    }
    let (_, x) = it.next()?;
    if !x.eq_ignore_ascii_case(&'x') {
        return None;
    }
    for _ in 0..6 {
        let (_, m) = it.next()?;
        if m != marker {
            return None;
        }
        let (_, c) = it.next()?;
        if !c.is_ascii_hexdigit() {
            return None;
        }
    }
    Some(it.next().map_or(s.len(), |(i, _)| i))
}

fn match_legacy(s: &str) -> Option<(usize, char)> {
    let mut it = s.char_indices();
    let (_, marker) = it.next()?;
    if !is_marker(marker) {
        return None;
    }
    let (_, code) = it.next()?;
    if !is_legacy_code(code) {
        return None;
    }
    Some((it.next().map_or(s.len(), |(i, _)| i), code))
}

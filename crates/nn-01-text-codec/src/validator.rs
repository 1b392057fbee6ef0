//! Nickname acceptance.
//!
//! One pure function decides whether a candidate may be written to the
//! directory for a given actor:
//!
//! 1. charset check
//! 2. capability check per style class present
//! 3. trim to the visible length limit
//! 4. reject if fewer than `MIN_VISIBLE_LEN` visible characters remain

use crate::domain::{strip, tokenize, trim_to_visible, validate_charset, StyleClass, StyleNodes};
use crate::error::CodecError;
use std::collections::HashSet;
use std::fmt;

/// Shortest user-chosen nickname, in visible characters.
pub const MIN_VISIBLE_LEN: usize = 3;

/// Upper bound for the configured visible length.
pub const MAX_VISIBLE_LEN_CAP: usize = 16;

pub const DEFAULT_MAX_VISIBLE_LEN: usize = 16;

/// Clamp a configured maximum into `[MIN_VISIBLE_LEN, MAX_VISIBLE_LEN_CAP]`.
pub fn clamp_max_visible_len(configured: i64) -> usize {
    configured.clamp(MIN_VISIBLE_LEN as i64, MAX_VISIBLE_LEN_CAP as i64) as usize
}

/// Answers "does the actor hold this permission node".
pub trait CapabilityCheck {
    fn has_capability(&self, node: &str) -> bool;
}

impl<F> CapabilityCheck for F
where
    F: Fn(&str) -> bool,
{
    fn has_capability(&self, node: &str) -> bool {
        self(node)
    }
}

/// An accepted nickname in raw form (tokens included).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Nickname {
    raw: String,
}

impl Nickname {
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Tokens stripped.
    pub fn visible(&self) -> String {
        strip(&self.raw)
    }

    pub fn into_raw(self) -> String {
        self.raw
    }
}

impl fmt::Display for Nickname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Validates candidate nicknames against the token grammar and the actor's capabilities.
#[derive(Debug, Clone, Default)]
pub struct NicknameValidator {
    nodes: StyleNodes,
}

impl NicknameValidator {
    pub fn new(nodes: StyleNodes) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &StyleNodes {
        &self.nodes
    }

    /// Accept `raw` for `actor`, trimmed to `max_visible_len` visible characters.
    pub fn accept(
        &self,
        actor: &dyn CapabilityCheck,
        raw: &str,
        max_visible_len: usize,
    ) -> Result<Nickname, CodecError> {
        let raw = raw.trim();
        validate_charset(raw)?;
        self.check_capabilities(actor, raw)?;

        let trimmed = trim_to_visible(raw, max_visible_len);
        let visible_len = strip(&trimmed).chars().count();
        if visible_len < MIN_VISIBLE_LEN {
            return Err(CodecError::TooShort {
                visible_len,
                min: MIN_VISIBLE_LEN,
            });
        }

        Ok(Nickname { raw: trimmed })
    }

    /// First missing capability among the style classes used in `raw`.
    pub fn check_capabilities(
        &self,
        actor: &dyn CapabilityCheck,
        raw: &str,
    ) -> Result<(), CodecError> {
        let used: HashSet<StyleClass> = tokenize(raw)
            .filter_map(|(_, t)| StyleClass::of(&t))
            .collect();

        for class in StyleClass::CHECK_ORDER {
            if !used.contains(&class) {
                continue;
            }
            let node = self.nodes.node_for(class);
            if !actor.has_capability(node) {
                return Err(CodecError::PermissionDenied {
                    class,
                    node: node.to_string(),
                });
            }
        }
        Ok(())
    }
}

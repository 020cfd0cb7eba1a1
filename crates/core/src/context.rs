//! Embedded Context Extraction
//!
//! The upstream message composer prefixes user text with machine-generated
//! tags such as `[SESSION_ID: abc] [PATH: e1/acme/Xyz] [BOT_ID: fp01]`.
//! This module pulls those tags out into a typed [`EmbeddedContext`] and
//! returns the user text with the tags removed.
//!
//! Grammar: `[KEY: value]` where `KEY` is one of the literal keys in
//! [`MetadataKey`] and `value` is any run of characters other than `]`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Recognized metadata keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataKey {
    SessionId,
    Path,
    BotId,
}

impl MetadataKey {
    /// All recognized keys, in extraction order
    pub const ALL: [MetadataKey; 3] = [Self::SessionId, Self::Path, Self::BotId];

    /// Literal key as it appears inside the brackets
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SessionId => "SESSION_ID",
            Self::Path => "PATH",
            Self::BotId => "BOT_ID",
        }
    }

    /// Opening sequence used by the detection gate, e.g. `[SESSION_ID:`
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::SessionId => "[SESSION_ID:",
            Self::Path => "[PATH:",
            Self::BotId => "[BOT_ID:",
        }
    }

    fn capture_pattern(&self) -> &'static Regex {
        match self {
            Self::SessionId => &SESSION_ID_TAG,
            Self::Path => &PATH_TAG,
            Self::BotId => &BOT_ID_TAG,
        }
    }
}

impl std::fmt::Display for MetadataKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

static SESSION_ID_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[SESSION_ID:\s*([^\]]+)\]").expect("valid SESSION_ID pattern"));
static PATH_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[PATH:\s*([^\]]+)\]").expect("valid PATH pattern"));
static BOT_ID_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[BOT_ID:\s*([^\]]+)\]").expect("valid BOT_ID pattern"));

/// Any recognized tag plus the whitespace run that follows it
static ANY_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[(?:SESSION_ID|PATH|BOT_ID):[^\]]*\]\s*").expect("valid tag removal pattern")
});

/// Metadata recovered from a raw tool query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedContext {
    /// Value of the first `[SESSION_ID: ...]` tag
    pub session_id: Option<String>,
    /// Value of the first `[PATH: ...]` tag
    pub path: Option<String>,
    /// Value of the first `[BOT_ID: ...]` tag
    pub bot_id: Option<String>,
    /// Message with all recognized tags removed
    pub clean_message: String,
}

impl EmbeddedContext {
    /// Context for a message that carries no tags at all
    pub fn untagged(message: impl Into<String>) -> Self {
        Self {
            clean_message: message.into(),
            ..Default::default()
        }
    }

    /// True when no key resolved
    pub fn is_empty(&self) -> bool {
        self.session_id.is_none() && self.path.is_none() && self.bot_id.is_none()
    }
}

/// Detection gate: does the message contain any recognized tag prefix?
///
/// Messages that fail the gate are never parsed, so ordinary bracketed text
/// such as `[NOTE: ...]` passes through untouched.
pub fn has_embedded_context(message: &str) -> bool {
    MetadataKey::ALL
        .iter()
        .any(|key| message.contains(key.prefix()))
}

/// Extract embedded metadata from a raw message.
///
/// Messages without any tag prefix are returned verbatim. Otherwise each key
/// takes the first matching tag, values are trimmed (an all-whitespace value
/// counts as absent) and every recognized tag is stripped from the message
/// along with the whitespace that follows it.
pub fn extract_context(message: &str) -> EmbeddedContext {
    if !has_embedded_context(message) {
        return EmbeddedContext::untagged(message);
    }

    EmbeddedContext {
        session_id: capture(MetadataKey::SessionId, message),
        path: capture(MetadataKey::Path, message),
        bot_id: capture(MetadataKey::BotId, message),
        clean_message: strip_tags(message),
    }
}

fn capture(key: MetadataKey, message: &str) -> Option<String> {
    key.capture_pattern()
        .captures(message)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Remove recognized tags until none remain, then trim.
///
/// A single pass can splice two fragments into a new tag
/// (`[BOT_[PATH: x]ID: y]`), so removal repeats to a fixed point.
fn strip_tags(message: &str) -> String {
    let mut current = message.to_string();
    while ANY_TAG.is_match(&current) {
        current = ANY_TAG.replace_all(&current, "").into_owned();
    }
    current.trim().to_string()
}

//! Command matching for the Herald framework.
//!
//! A command literal is matched against message content in one of three
//! [`TriggerMatch`] modes. Literals come from user configuration, so they are
//! passed through [`regex::escape`] before being composed into an anchored
//! pattern: `a.b` matches the text `a.b` and nothing else.
//!
//! Matching is case-sensitive and compares code points literally.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Runs of two or more whitespace characters.
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("whitespace pattern is valid"));

/// How a command literal is compared with message content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TriggerMatch {
    /// The command appears anywhere in the content.
    Contains,
    /// The content is exactly the command.
    Equals,
    /// The content is the command, or the command followed by whitespace and
    /// arguments.
    #[default]
    StartsWith,
}

impl TriggerMatch {
    /// Returns the anchored pattern for `command`, or `None` for
    /// [`TriggerMatch::Contains`], which needs no pattern.
    fn pattern(&self, command: &str) -> Option<String> {
        let literal = regex::escape(command);
        match self {
            Self::Contains => None,
            Self::Equals => Some(format!("^{literal}$")),
            Self::StartsWith => Some(format!(r"^{literal}(?:$|\s)")),
        }
    }
}

/// Returns `true` if `content` matches `command` under `mode`.
///
/// # Example
///
/// ```rust
/// use herald_framework::matcher::{TriggerMatch, matches};
///
/// assert!(matches("!ping", "!ping", TriggerMatch::StartsWith));
/// assert!(matches("!ping now", "!ping", TriggerMatch::StartsWith));
/// assert!(!matches("!pingx", "!ping", TriggerMatch::StartsWith));
/// ```
pub fn matches(content: &str, command: &str, mode: TriggerMatch) -> bool {
    let Some(pattern) = mode.pattern(command) else {
        return content.contains(command);
    };

    match Regex::new(&pattern) {
        Ok(re) => re.is_match(content),
        Err(e) => {
            warn!(command, error = %e, "Command literal could not be compiled");
            false
        }
    }
}

/// Removes the first occurrence of `text` from `content`, collapses runs of
/// whitespace into a single space and trims the result.
pub fn strip_text(content: &str, text: &str) -> String {
    let removed = if text.is_empty() {
        content.to_string()
    } else {
        content.replacen(text, "", 1)
    };
    WHITESPACE_RUN.replace_all(&removed, " ").trim().to_string()
}

/// Returns the first whitespace-delimited token of `content`.
pub fn first_token(content: &str) -> Option<&str> {
    content.split_whitespace().next()
}

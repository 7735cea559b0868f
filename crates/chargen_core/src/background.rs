use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core_api::{CoreError, CoreErrorCode};

pub const BONUS_CLAUSE_MARKER: &str = "Choose:";

const TITLE_SEPARATORS: [&str; 5] = [" - ", " — ", "–", ":", "—"];
const TITLE_FALLBACK_WORDS: usize = 5;

// Choose: +1 <A> or +1 <B>, closed by a sentence terminator or end of text.
static BONUS_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Choose:\s*\+1\s*(.+?)\s+or\s+\+1\s*(.+?)\s*(?:[.!?;\n]|$)")
        .expect("bonus clause pattern is valid")
});

/// The two skills a background lets the player pick between. Names are kept
/// as written in the background text and only matched against skills when
/// the bonus is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusOptions {
    pub first: String,
    pub second: String,
}

impl BonusOptions {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.first == name || self.second == name
    }

    pub fn as_pair(&self) -> (&str, &str) {
        (&self.first, &self.second)
    }
}

pub fn parse_bonus_clause(text: &str) -> Option<BonusOptions> {
    let caps = BONUS_CLAUSE.captures(text)?;
    let first = caps.get(1)?.as_str().trim();
    let second = caps.get(2)?.as_str().trim();
    if first.is_empty() || second.is_empty() {
        return None;
    }
    Some(BonusOptions::new(first, second))
}

/// Like [`parse_bonus_clause`], but text that announces a clause with
/// `Choose:` and then fails the grammar is rejected instead of read as
/// "no bonus". Used when content tables are loaded.
pub fn validate_bonus_clause(text: &str) -> Result<Option<BonusOptions>, CoreError> {
    match parse_bonus_clause(text) {
        Some(opts) => Ok(Some(opts)),
        None if text.contains(BONUS_CLAUSE_MARKER) => Err(CoreError::new(
            CoreErrorCode::InvalidContent,
            format!(
                "background has a malformed bonus clause (expected \"Choose: +1 <Skill> or +1 <Skill>.\"): {text:?}"
            ),
        )),
        None => Ok(None),
    }
}

pub fn extract_title(text: &str) -> String {
    for sep in TITLE_SEPARATORS {
        if let Some((head, _)) = text.split_once(sep) {
            let head = head.trim();
            if !head.is_empty() {
                return head.to_string();
            }
        }
    }
    text.split_whitespace()
        .take(TITLE_FALLBACK_WORDS)
        .collect::<Vec<_>>()
        .join(" ")
}

//! # Text Matching
//!
//! Literal, optionally case-insensitive matching over paragraph text. Match
//! positions are reported in characters, which is how marks address text.

use crate::error::{LayoutError, Result};
use regex::{Regex, RegexBuilder};

/// Compiled size allowed for one query
const QUERY_SIZE_LIMIT: usize = 1 << 16;

/// A single match inside one text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextMatch {
    /// Character offset of the match
    pub start: usize,
    /// Length in characters
    pub length: usize,
}

/// Compiled literal query
#[derive(Debug, Clone)]
pub struct TextMatcher {
    regex: Regex,
}

impl TextMatcher {
    /// Compiles `query`; empty queries are rejected
    pub fn new(query: &str, ignore_case: bool) -> Result<Self> {
        if query.is_empty() {
            return Err(LayoutError::EmptyQuery);
        }
        let regex = RegexBuilder::new(&regex::escape(query))
            .case_insensitive(ignore_case)
            .size_limit(QUERY_SIZE_LIMIT)
            .build()?;
        Ok(TextMatcher { regex })
    }

    /// All non-overlapping matches in `text`
    pub fn find_all(&self, text: &str) -> Vec<TextMatch> {
        let mut matches = Vec::new();
        // Byte offsets advance monotonically, so chars are counted once.
        let mut chars_before = 0;
        let mut bytes_counted = 0;
        for found in self.regex.find_iter(text) {
            chars_before += text[bytes_counted..found.start()].chars().count();
            bytes_counted = found.start();
            let length = found.as_str().chars().count();
            matches.push(TextMatch {
                start: chars_before,
                length,
            });
        }
        matches
    }
}

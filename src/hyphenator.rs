//! # Hyphenation
//!
//! Hyphenation points per word, consumed by the line breaker when a word
//! overflows the line. Pattern dictionaries come from the `hyphenation` crate;
//! [`ExplicitHyphenator`] serves fixed word lists.

use crate::error::{LayoutError, Result};
use ::hyphenation::{Hyphenator as _, Load, Standard};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

pub use ::hyphenation::Language;

/// Allowed break positions of one word
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HyphenationInfo {
    /// `mask[i]`: a break is allowed before character `i`
    mask: Vec<bool>,
}

impl HyphenationInfo {
    /// No break points for a word of `len` characters
    pub fn none(len: usize) -> Self {
        HyphenationInfo {
            mask: vec![false; len + 1],
        }
    }

    /// Break points given as character indices
    pub fn from_points(len: usize, points: &[usize]) -> Self {
        let mut info = HyphenationInfo::none(len);
        for &point in points {
            if point > 0 && point < len {
                info.mask[point] = true;
            }
        }
        info
    }

    /// Computes the points of `word`, adding a break after every explicit hyphen
    pub fn for_word(hyphenator: &dyn Hyphenator, word: &str) -> Self {
        let len = word.chars().count();
        let mut info = hyphenator.hyphenate(word);
        info.mask.resize(len + 1, false);
        for (index, ch) in word.chars().enumerate() {
            if ch == '-' && index + 1 < len {
                info.mask[index + 1] = true;
            }
        }
        info
    }

    /// Whether the word may break before character `position`
    #[inline]
    pub fn is_possible(&self, position: usize) -> bool {
        self.mask.get(position).copied().unwrap_or(false)
    }

    pub fn points(&self) -> Vec<usize> {
        self.mask
            .iter()
            .enumerate()
            .filter_map(|(i, &allowed)| allowed.then_some(i))
            .collect()
    }
}

/// Supplies hyphenation points for words
pub trait Hyphenator: Send + Sync {
    fn hyphenate(&self, word: &str) -> HyphenationInfo;
}

/// Never hyphenates
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHyphenation;

impl Hyphenator for NoHyphenation {
    fn hyphenate(&self, word: &str) -> HyphenationInfo {
        HyphenationInfo::none(word.chars().count())
    }
}

/// Fixed word list, each entry written with its breaks as in `hy-phen-ation`
#[derive(Debug, Clone, Default)]
pub struct ExplicitHyphenator {
    words: HashMap<String, Vec<usize>>,
}

impl ExplicitHyphenator {
    pub fn new() -> Self {
        ExplicitHyphenator::default()
    }

    pub fn with_words(words: &[&str]) -> Self {
        let mut hyphenator = ExplicitHyphenator::new();
        for word in words {
            hyphenator.add(word);
        }
        hyphenator
    }

    /// Registers a word spelled with `-` at each break
    pub fn add(&mut self, spelled: &str) {
        let mut word = String::new();
        let mut points = Vec::new();
        let mut length = 0;
        for ch in spelled.chars() {
            if ch == '-' {
                points.push(length);
            } else {
                word.extend(ch.to_lowercase());
                length += 1;
            }
        }
        self.words.insert(word, points);
    }
}

impl Hyphenator for ExplicitHyphenator {
    fn hyphenate(&self, word: &str) -> HyphenationInfo {
        let len = word.chars().count();
        match self.words.get(&word.to_lowercase()) {
            Some(points) => HyphenationInfo::from_points(len, points),
            None => HyphenationInfo::none(len),
        }
    }
}

/// Liang pattern dictionary loaded through the `hyphenation` crate
pub struct DictionaryHyphenator {
    language: Language,
    dictionary: Standard,
}

impl DictionaryHyphenator {
    /// Loads a serialized `hyphenation` dictionary from disk
    pub fn from_path(language: Language, path: impl AsRef<Path>) -> Result<Self> {
        let dictionary = Standard::from_path(language, path.as_ref())
            .map_err(|e| LayoutError::Hyphenation(format!("{}: {}", path.as_ref().display(), e)))?;
        Ok(DictionaryHyphenator { language, dictionary })
    }

    pub fn language(&self) -> Language {
        self.language
    }
}

impl fmt::Debug for DictionaryHyphenator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DictionaryHyphenator")
            .field("language", &self.language)
            .finish()
    }
}

impl Hyphenator for DictionaryHyphenator {
    fn hyphenate(&self, word: &str) -> HyphenationInfo {
        let len = word.chars().count();
        let breaks = self.dictionary.hyphenate(word).breaks;
        // Dictionary breaks are byte offsets.
        let points: Vec<usize> = breaks
            .iter()
            .map(|&byte| word[..byte.min(word.len())].chars().count())
            .collect();
        HyphenationInfo::from_points(len, &points)
    }
}

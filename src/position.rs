//! # Positions and Marks
//!
//! A [`Position`] addresses a point in the document as
//! `(paragraph, element, char)`. It is the opaque value handed out to
//! callers that persist a reading position, so it round-trips through serde.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A point in the document, ordered lexicographically
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Position {
    /// Paragraph index in the model
    pub paragraph: usize,
    /// Element index inside the paragraph
    pub element: usize,
    /// Character index inside the element (words only)
    pub char_index: usize,
}

impl Position {
    /// Creates a new position
    #[inline]
    pub fn new(paragraph: usize, element: usize, char_index: usize) -> Self {
        Position {
            paragraph,
            element,
            char_index,
        }
    }

    /// Start of a paragraph
    #[inline]
    pub fn paragraph_start(paragraph: usize) -> Self {
        Position::new(paragraph, 0, 0)
    }

    /// Compares at element granularity
    pub fn compare_ignoring_char(&self, other: &Position) -> Ordering {
        self.paragraph
            .cmp(&other.paragraph)
            .then(self.element.cmp(&other.element))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.paragraph, self.element, self.char_index)
    }
}

/// A search match: `length` characters at `offset` in the paragraph's text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Mark {
    pub paragraph: usize,
    pub offset: usize,
    pub length: usize,
}

impl Mark {
    pub fn new(paragraph: usize, offset: usize, length: usize) -> Self {
        Mark {
            paragraph,
            offset,
            length,
        }
    }

    /// Orders marks by where they begin, ignoring their length.
    ///
    /// Navigation compares a match against the zero-length mark of a cursor,
    /// so two marks starting at the same character are considered level.
    pub fn compare_start(&self, other: &Mark) -> Ordering {
        self.paragraph
            .cmp(&other.paragraph)
            .then(self.offset.cmp(&other.offset))
    }

    /// Character offset one past the end of the match
    #[inline]
    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

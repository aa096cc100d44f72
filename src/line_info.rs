//! # Line Infos
//!
//! [`LineInfo`] is one laid-out line. It is keyed in the [`LineInfoCache`] by
//! where it starts and the style in effect there, never by where it ends.

use crate::position::Position;
use crate::style::StyleSnapshot;
use std::collections::HashMap;

/// One laid-out line of a paragraph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineInfo {
    pub paragraph_index: usize,
    /// Element count of the paragraph
    pub paragraph_length: usize,
    pub start_element_index: usize,
    pub start_char_index: usize,
    /// First element after the leading style changes
    pub real_start_element_index: usize,
    pub real_start_char_index: usize,
    pub end_element_index: usize,
    pub end_char_index: usize,
    /// Whether the line holds anything drawable
    pub is_visible: bool,
    pub left_indent: i32,
    pub width: i32,
    pub height: i32,
    pub descent: i32,
    pub vspace_before: i32,
    pub vspace_after: i32,
    /// Set once the gap to the previous line has been collapsed
    pub previous_info_used: bool,
    /// Space removed from `height` when collapsing against the previous line
    pub collapsed_space: i32,
    /// Breakable spaces available for justification
    pub space_counter: usize,
    /// Style in effect where the line starts; part of the cache key
    pub start_style: StyleSnapshot,
    /// Style after the leading style changes, used when placing the line
    pub real_start_style: StyleSnapshot,
}

impl LineInfo {
    /// An empty line starting at the given element
    pub fn new(
        paragraph_index: usize,
        paragraph_length: usize,
        start_element_index: usize,
        start_char_index: usize,
        start_style: StyleSnapshot,
    ) -> Self {
        LineInfo {
            paragraph_index,
            paragraph_length,
            start_element_index,
            start_char_index,
            real_start_element_index: start_element_index,
            real_start_char_index: start_char_index,
            end_element_index: start_element_index,
            end_char_index: start_char_index,
            is_visible: false,
            left_indent: 0,
            width: 0,
            height: 0,
            descent: 0,
            vspace_before: 0,
            vspace_after: 0,
            previous_info_used: false,
            collapsed_space: 0,
            space_counter: 0,
            real_start_style: start_style.clone(),
            start_style,
        }
    }

    #[inline]
    pub fn is_end_of_paragraph(&self) -> bool {
        self.end_element_index == self.paragraph_length
    }

    pub fn start(&self) -> Position {
        Position::new(self.paragraph_index, self.start_element_index, self.start_char_index)
    }

    pub fn real_start(&self) -> Position {
        Position::new(
            self.paragraph_index,
            self.real_start_element_index,
            self.real_start_char_index,
        )
    }

    pub fn end(&self) -> Position {
        Position::new(self.paragraph_index, self.end_element_index, self.end_char_index)
    }

    /// Vertical extent including the gap after the line
    pub fn total_height(&self) -> i32 {
        self.height + self.descent + self.vspace_after
    }

    pub fn key(&self) -> LineKey {
        LineKey {
            paragraph_index: self.paragraph_index,
            start_element_index: self.start_element_index,
            start_char_index: self.start_char_index,
            start_style: self.start_style.clone(),
        }
    }

    /// This line with the space before it collapsed against the space after
    /// `previous`. Applying it twice is a no-op.
    pub fn adjust(mut self, previous: Option<&LineInfo>) -> LineInfo {
        if !self.previous_info_used {
            if let Some(previous) = previous {
                let collapsed = previous.vspace_after.min(self.vspace_before);
                self.height -= collapsed;
                self.collapsed_space = collapsed;
                self.previous_info_used = true;
            }
        }
        self
    }

    /// Undoes [`LineInfo::adjust`], giving the context-free form that is cached
    pub fn unadjusted(mut self) -> LineInfo {
        if self.previous_info_used {
            self.height += self.collapsed_space;
            self.collapsed_space = 0;
            self.previous_info_used = false;
        }
        self
    }
}

/// Cache key: where the line starts and with which style
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineKey {
    pub paragraph_index: usize,
    pub start_element_index: usize,
    pub start_char_index: usize,
    pub start_style: StyleSnapshot,
}

/// Memoized lines of the current layout pass
#[derive(Debug, Default)]
pub struct LineInfoCache {
    lines: HashMap<LineKey, LineInfo>,
    hits: usize,
    misses: usize,
}

impl LineInfoCache {
    pub fn new() -> Self {
        LineInfoCache::default()
    }

    /// Looks up a line, counting the hit or miss
    pub fn get(&mut self, key: &LineKey) -> Option<&LineInfo> {
        match self.lines.get(key) {
            Some(line) => {
                self.hits += 1;
                Some(line)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Stores the context-free form of `line`
    pub fn insert(&mut self, line: LineInfo) {
        let line = line.unadjusted();
        self.lines.insert(line.key(), line);
    }

    /// Stores the lines of a page that is about to be rebuilt
    pub fn store_all(&mut self, lines: &[LineInfo]) {
        for line in lines {
            self.insert(line.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// (hits, misses) since the last clear
    pub fn stats(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.hits = 0;
        self.misses = 0;
    }
}

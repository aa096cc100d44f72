//! # Highlightings
//!
//! Structural ranges painted over the text: the reader's own highlight,
//! search results and the selection. A range only knows positions; its
//! pixels come from the page's areas when it is drawn.

use crate::element_area::{ElementArea, Hull};
use crate::page::Page;
use crate::position::Position;
use crate::style::Color;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HighlightKind {
    Manual,
    Search,
    Selection,
}

/// A range `[start, end]` with its display colours
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Highlighting {
    pub kind: HighlightKind,
    pub start: Position,
    pub end: Position,
    pub background: Option<Color>,
    pub foreground: Option<Color>,
    pub outline: Option<Color>,
}

impl Highlighting {
    /// A range with no colours; the bounds are swapped when reversed
    pub fn new(kind: HighlightKind, start: Position, end: Position) -> Self {
        let (start, end) = if end < start { (end, start) } else { (start, end) };
        Highlighting {
            kind,
            start,
            end,
            background: None,
            foreground: None,
            outline: None,
        }
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    pub fn with_foreground(mut self, color: Color) -> Self {
        self.foreground = Some(color);
        self
    }

    pub fn with_outline(mut self, color: Color) -> Self {
        self.outline = Some(color);
        self
    }

    /// The page shows part of the range.
    ///
    /// The page end is exclusive; the range end names an element that is
    /// still drawn, so it counts up to its last character.
    pub fn intersects(&self, page: &Page) -> bool {
        match (page.start.position(), page.end.position()) {
            (Some(page_start), Some(page_end)) => {
                page_start.compare_ignoring_char(&self.end) != Ordering::Greater && page_end > self.start
            }
            _ => false,
        }
    }

    /// The area's element lies inside the range
    #[inline]
    pub fn contains_area(&self, area: &ElementArea) -> bool {
        area.is_within(&self.start, &self.end)
    }

    /// Rectangles of the range on `page`
    pub fn hull(&self, page: &Page) -> Hull {
        page.areas.hull(&self.start, &self.end)
    }
}

/// Unordered collection of highlightings
#[derive(Debug, Clone, Default)]
pub struct HighlightSet {
    items: Vec<Highlighting>,
}

impl HighlightSet {
    pub fn new() -> Self {
        HighlightSet::default()
    }

    pub fn add(&mut self, highlighting: Highlighting) {
        self.items.push(highlighting);
    }

    pub fn add_all(&mut self, highlightings: impl IntoIterator<Item = Highlighting>) {
        self.items.extend(highlightings);
    }

    /// Drops every highlighting of `kind`; true if any was removed
    pub fn remove_kind(&mut self, kind: HighlightKind) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.kind != kind);
        self.items.len() != before
    }

    /// True if the set was not empty
    pub fn clear(&mut self) -> bool {
        let had_items = !self.items.is_empty();
        self.items.clear();
        had_items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Highlighting> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn of_kind(&self, kind: HighlightKind) -> impl Iterator<Item = &Highlighting> {
        self.items.iter().filter(move |item| item.kind == kind)
    }

    /// Highlightings visible on `page`
    pub fn intersecting<'s>(&'s self, page: &'s Page) -> impl Iterator<Item = &'s Highlighting> + 's {
        self.items.iter().filter(move |item| item.intersects(page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::WordCursor;
    use crate::element_area::tests::area;
    use crate::paint::Rect;

    fn page(start: Position, end: Position) -> Page {
        let mut page = Page::new();
        page.start = WordCursor::new(start);
        page.end = WordCursor::new(end);
        page
    }

    #[test]
    fn test_reversed_bounds_are_ordered() {
        let highlighting = Highlighting::new(HighlightKind::Manual, Position::new(3, 0, 0), Position::new(1, 2, 0));
        assert_eq!(highlighting.start, Position::new(1, 2, 0));
        assert_eq!(highlighting.end, Position::new(3, 0, 0));
    }

    #[test]
    fn test_intersects_page() {
        let highlighting = Highlighting::new(HighlightKind::Manual, Position::new(1, 0, 0), Position::new(1, 4, 0));
        assert!(highlighting.intersects(&page(Position::new(0, 0, 0), Position::new(2, 0, 0))));
        assert!(highlighting.intersects(&page(Position::new(1, 3, 0), Position::new(2, 0, 0))));
        assert!(highlighting.intersects(&page(Position::new(1, 4, 0), Position::new(2, 0, 0))));
        assert!(highlighting.intersects(&page(Position::new(1, 4, 2), Position::new(2, 0, 0))));
        assert!(!highlighting.intersects(&page(Position::new(1, 5, 0), Position::new(2, 0, 0))));
        assert!(!highlighting.intersects(&page(Position::new(0, 0, 0), Position::new(1, 0, 0))));
        assert!(!highlighting.intersects(&Page::new()));
    }

    #[test]
    fn test_single_element_range_on_first_element() {
        let word = Highlighting::new(HighlightKind::Selection, Position::new(2, 0, 0), Position::new(2, 0, 0));
        assert!(word.intersects(&page(Position::new(2, 0, 0), Position::new(3, 0, 0))));
        assert!(!word.intersects(&page(Position::new(0, 0, 0), Position::new(2, 0, 0))));
        assert!(!word.intersects(&page(Position::new(2, 1, 0), Position::new(3, 0, 0))));
    }

    #[test]
    fn test_hull_and_containment() {
        let mut shown = page(Position::new(0, 0, 0), Position::new(1, 0, 0));
        shown.areas.push(area(0, 0, (0, 39), (0, 11)));
        shown.areas.push(area(2, 0, (50, 89), (0, 11)));
        let highlighting = Highlighting::new(HighlightKind::Search, Position::new(0, 2, 0), Position::new(0, 2, 0));
        assert_eq!(highlighting.hull(&shown).rects(), &[Rect::new(50, 0, 40, 12)]);
        assert!(highlighting.contains_area(&shown.areas.areas()[1]));
        assert!(!highlighting.contains_area(&shown.areas.areas()[0]));
    }

    #[test]
    fn test_set_operations() {
        let mut set = HighlightSet::new();
        let range = |kind| Highlighting::new(kind, Position::new(0, 0, 0), Position::new(0, 5, 0));
        set.add(range(HighlightKind::Manual));
        set.add_all(vec![range(HighlightKind::Search), range(HighlightKind::Search)]);
        assert_eq!(set.len(), 3);
        assert_eq!(set.of_kind(HighlightKind::Search).count(), 2);
        assert!(set.remove_kind(HighlightKind::Search));
        assert!(!set.remove_kind(HighlightKind::Search));
        let visible = page(Position::new(0, 0, 0), Position::new(1, 0, 0));
        assert_eq!(set.intersecting(&visible).count(), 1);
        assert!(set.clear());
        assert!(!set.clear());
    }
}

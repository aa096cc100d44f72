//! # Pages
//!
//! A [`Page`] is one screen of content: the cursors bounding it, its lines
//! and its element areas. The view keeps three of them (previous, current,
//! next) and rotates the slots as the reader moves.

use crate::cursor::WordCursor;
use crate::element_area::ElementAreaVector;
use crate::line_info::LineInfo;
use crate::model::TextModel;
use crate::position::Position;
use serde::{Deserialize, Serialize};

/// How far a page turn moves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScrollingMode {
    /// The next page starts where the current one ends
    #[default]
    NoOverlapping,
    /// Keep the last `n` lines of the current page
    KeepLines(usize),
    /// Move by `n` lines
    ScrollLines(usize),
    /// Move by a percentage of the page height
    ScrollPercentage(u32),
}

/// Build state of a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintState {
    NothingToPaint,
    StartIsKnown,
    EndIsKnown,
    ToScrollForward(ScrollingMode),
    ToScrollBackward(ScrollingMode),
    Ready,
}

/// Slot in the pagination window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageIndex {
    Previous,
    Current,
    Next,
}

impl PageIndex {
    #[inline]
    pub fn slot(self) -> usize {
        match self {
            PageIndex::Previous => 0,
            PageIndex::Current => 1,
            PageIndex::Next => 2,
        }
    }
}

/// Text column size a page was laid out for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageGeometry {
    pub column_width: i32,
    pub height: i32,
    pub two_column: bool,
}

#[derive(Debug, Clone)]
pub struct Page {
    pub start: WordCursor,
    pub end: WordCursor,
    pub line_infos: Vec<LineInfo>,
    pub areas: ElementAreaVector,
    pub paint_state: PaintState,
    geometry: PageGeometry,
    /// Lines in the first column; zero for a single column
    pub column0_height: usize,
    pub page_number_hint: Option<usize>,
}

impl Default for Page {
    fn default() -> Self {
        Page::new()
    }
}

impl Page {
    pub fn new() -> Self {
        Page {
            start: WordCursor::NULL,
            end: WordCursor::NULL,
            line_infos: Vec::new(),
            areas: ElementAreaVector::new(),
            paint_state: PaintState::NothingToPaint,
            geometry: PageGeometry::default(),
            column0_height: 0,
            page_number_hint: None,
        }
    }

    /// Clears the page back to `NothingToPaint`
    pub fn reset(&mut self) {
        self.start.reset();
        self.end.reset();
        self.line_infos.clear();
        self.areas.clear();
        self.paint_state = PaintState::NothingToPaint;
    }

    #[inline]
    pub fn geometry(&self) -> PageGeometry {
        self.geometry
    }

    /// Applies a new size. A page that had content keeps one of its cursors
    /// and is rebuilt from it: the end for the previous page, else the start.
    pub fn set_geometry(&mut self, geometry: PageGeometry, keep_end: bool) {
        if self.geometry == geometry {
            return;
        }
        self.geometry = geometry;
        if self.paint_state == PaintState::NothingToPaint {
            return;
        }
        self.line_infos.clear();
        self.areas.clear();
        let keep_start = if keep_end { self.end.is_null() && !self.start.is_null() } else { !self.start.is_null() };
        if keep_start {
            self.end.reset();
            self.paint_state = PaintState::StartIsKnown;
        } else if !self.end.is_null() {
            self.start.reset();
            self.paint_state = PaintState::EndIsKnown;
        }
    }

    fn invalidate(&mut self, state: PaintState) {
        self.line_infos.clear();
        self.areas.clear();
        self.paint_state = state;
    }

    /// Starts the page at a known cursor
    pub fn move_start_cursor(&mut self, cursor: WordCursor) {
        self.start = cursor;
        self.end.reset();
        self.invalidate(PaintState::StartIsKnown);
    }

    /// Starts the page at `position`, clamped to the model
    pub fn move_start_to(&mut self, model: &dyn TextModel, position: Position) {
        if self.start.is_null() {
            self.start = self.end;
        }
        self.start.move_to_paragraph(model, position.paragraph);
        self.start.move_to(model, position.element, position.char_index);
        self.end.reset();
        self.invalidate(PaintState::StartIsKnown);
    }

    /// Ends the page at `position`, clamped to the model
    pub fn move_end_to(&mut self, model: &dyn TextModel, position: Position) {
        if self.end.is_null() {
            self.end = self.start;
        }
        self.end.move_to_paragraph(model, position.paragraph);
        self.end.move_to(model, position.element, position.char_index);
        self.start.reset();
        self.invalidate(PaintState::EndIsKnown);
    }

    /// No visible line
    pub fn is_empty_page(&self) -> bool {
        !self.line_infos.iter().any(|line| line.is_visible)
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.paint_state == PaintState::Ready
    }

    /// End of the `count`-th visible line from the top
    pub fn find_line_from_start(&self, count: usize) -> WordCursor {
        if count == 0 {
            return WordCursor::NULL;
        }
        let mut remaining = count;
        let mut found = None;
        for line in &self.line_infos {
            found = Some(line);
            if line.is_visible {
                remaining -= 1;
                if remaining == 0 {
                    break;
                }
            }
        }
        found.map_or(WordCursor::NULL, |line| WordCursor::new(line.end()))
    }

    /// Start of the `count`-th visible line from the bottom
    pub fn find_line_from_end(&self, count: usize) -> WordCursor {
        if count == 0 {
            return WordCursor::NULL;
        }
        let mut remaining = count;
        let mut found = None;
        for line in self.line_infos.iter().rev() {
            found = Some(line);
            if line.is_visible {
                remaining -= 1;
                if remaining == 0 {
                    break;
                }
            }
        }
        found.map_or(WordCursor::NULL, |line| WordCursor::new(line.start()))
    }

    /// End of the first line reaching `percent` of the page height
    pub fn find_percent_from_start(&self, percent: u32) -> WordCursor {
        let mut height = self.geometry.height * percent as i32 / 100;
        let mut visible_seen = false;
        let mut found = None;
        for line in &self.line_infos {
            found = Some(line);
            visible_seen |= line.is_visible;
            height -= line.total_height();
            if visible_seen && height <= 0 {
                break;
            }
        }
        found.map_or(WordCursor::NULL, |line| WordCursor::new(line.end()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{StyleSnapshot, TextStyle};
    use crate::text_model::PlainTextModel;

    fn line(paragraph: usize, start: usize, end: usize, visible: bool) -> LineInfo {
        let mut info = LineInfo::new(paragraph, 5, start, 0, StyleSnapshot::base(TextStyle::default()));
        info.end_element_index = end;
        info.is_visible = visible;
        info.height = 10;
        info.descent = 2;
        info
    }

    fn page_with_lines() -> Page {
        let mut page = Page::new();
        page.set_geometry(
            PageGeometry {
                column_width: 100,
                height: 48,
                two_column: false,
            },
            false,
        );
        page.line_infos = vec![line(0, 0, 3, true), line(0, 3, 5, true), line(1, 0, 0, false), line(2, 0, 3, true)];
        page
    }

    #[test]
    fn test_find_lines() {
        let page = page_with_lines();
        assert_eq!(page.find_line_from_start(2).position(), Some(Position::new(0, 5, 0)));
        assert_eq!(page.find_line_from_start(3).position(), Some(Position::new(2, 3, 0)));
        assert!(page.find_line_from_start(0).is_null());
        assert_eq!(page.find_line_from_end(1).position(), Some(Position::new(2, 0, 0)));
        assert_eq!(page.find_line_from_end(2).position(), Some(Position::new(0, 3, 0)));
        assert_eq!(page.find_line_from_end(10).position(), Some(Position::new(0, 0, 0)));
        assert!(Page::new().find_line_from_end(1).is_null());
    }

    #[test]
    fn test_find_percent() {
        let page = page_with_lines();
        // 24px of 48: the second line reaches it
        assert_eq!(page.find_percent_from_start(50).position(), Some(Position::new(0, 5, 0)));
        assert_eq!(page.find_percent_from_start(1).position(), Some(Position::new(0, 3, 0)));
    }

    #[test]
    fn test_default_scrolling_mode() {
        assert_eq!(ScrollingMode::default(), ScrollingMode::NoOverlapping);
        let json = serde_json::to_string(&ScrollingMode::default()).unwrap();
        assert_eq!(json, "\"NoOverlapping\"");
    }

    #[test]
    fn test_empty_page() {
        let mut page = page_with_lines();
        assert!(!page.is_empty_page());
        page.line_infos.retain(|line| !line.is_visible);
        assert!(page.is_empty_page());
    }

    #[test]
    fn test_move_cursors() {
        let model = PlainTextModel::from_paragraphs(&["AAAA BBBB", "CCCC"]);
        let mut page = Page::new();
        page.move_start_to(&model, Position::new(1, 9, 0));
        assert_eq!(page.paint_state, PaintState::StartIsKnown);
        assert_eq!(page.start.position(), Some(Position::new(1, 1, 0)));
        assert!(page.end.is_null());
        page.move_end_to(&model, Position::new(7, 0, 0));
        assert_eq!(page.paint_state, PaintState::EndIsKnown);
        assert_eq!(page.end.position(), Some(Position::new(1, 0, 0)));
        assert!(page.start.is_null());
        page.reset();
        assert_eq!(page.paint_state, PaintState::NothingToPaint);
    }

    #[test]
    fn test_resize_keeps_a_cursor() {
        let mut page = page_with_lines();
        page.start = WordCursor::at_paragraph(0);
        page.end = WordCursor::at_paragraph(3);
        page.paint_state = PaintState::Ready;
        let wide = PageGeometry {
            column_width: 200,
            height: 48,
            two_column: false,
        };
        let mut previous = page.clone();
        page.set_geometry(wide, false);
        assert_eq!(page.paint_state, PaintState::StartIsKnown);
        assert!(page.end.is_null() && page.line_infos.is_empty());
        previous.set_geometry(wide, true);
        assert_eq!(previous.paint_state, PaintState::EndIsKnown);
        assert!(previous.start.is_null());
    }
}

//! # Page Layout Module
//!
//! Fills pages with lines and finds page starts going backwards:
//! - forward building from a known start, one or two columns
//! - backward search by pixels or by visible lines
//! - the paint-state machine that turns a pending scroll into a ready page

use crate::cursor::WordCursor;
use crate::line_breaking::{LayoutEnv, LineBreaker};
use crate::line_info::{LineInfo, LineInfoCache};
use crate::layout_strategy::LayoutStrategy;
use crate::model::TextModel;
use crate::page::{Page, PageGeometry, PaintState, ScrollingMode};
use log::debug;

/// Measure used by the backward search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeUnit {
    Pixel,
    /// Visible lines
    Line,
}

#[derive(Debug, Clone, Copy, Default)]
struct ParagraphSize {
    height: i32,
    top_margin: i32,
    bottom_margin: i32,
}

/// Builds the line lists of pages
pub struct PageBuilder<'a> {
    breaker: LineBreaker<'a>,
    geometry: PageGeometry,
}

impl<'a> PageBuilder<'a> {
    pub fn new(env: LayoutEnv<'a>, cache: &'a mut LineInfoCache) -> Self {
        PageBuilder {
            geometry: env.geometry,
            breaker: LineBreaker::new(env, cache),
        }
    }

    #[inline]
    fn model(&self) -> &'a dyn TextModel {
        self.breaker.env().model
    }

    #[inline]
    fn strategy(&self) -> &'a dyn LayoutStrategy {
        self.breaker.env().strategy
    }

    fn line_size(&self, line: &LineInfo, unit: SizeUnit) -> i32 {
        match unit {
            SizeUnit::Pixel => self.strategy().line_advance(line),
            SizeUnit::Line => i32::from(line.is_visible),
        }
    }

    /// Fills `page.line_infos` from `start` until the page is full and
    /// returns the cursor after the last line placed
    pub fn build(&mut self, page: &mut Page, start: WordCursor) -> WordCursor {
        let model = self.model();
        let strategy = self.strategy();
        let text_height = self.geometry.height;
        let two_column = self.geometry.two_column;
        let mut result = start;
        page.line_infos.clear();
        page.column0_height = 0;

        let mut budget = text_height;
        let mut previous: Option<LineInfo> = None;
        loop {
            let Some(paragraph) = result.paragraph(model) else {
                break;
            };
            self.breaker.reset_style();
            self.breaker.apply_style_changes(&paragraph, 0, result.element_index());
            let end_index = paragraph.len();
            let (mut element, mut char_index) = (result.element_index(), result.char_index());
            let mut last: Option<LineInfo> = None;
            while element != end_index {
                let line = self
                    .breaker
                    .layout_line(&paragraph, element, char_index, end_index, previous.as_ref());
                let extent = strategy.line_extent(&line);
                budget -= extent;
                if budget < 0 && page.line_infos.len() > page.column0_height {
                    if page.column0_height == 0 && two_column {
                        budget = text_height - extent;
                        page.column0_height = page.line_infos.len();
                    } else {
                        last = Some(line);
                        break;
                    }
                }
                budget -= line.vspace_after;
                element = line.end_element_index;
                char_index = line.end_char_index;
                result.move_to(model, element, char_index);
                page.line_infos.push(line.clone());
                last = Some(line);
                if budget < 0 {
                    if page.column0_height == 0 && two_column {
                        budget = text_height;
                        page.column0_height = page.line_infos.len();
                    } else {
                        break;
                    }
                }
            }
            previous = last;

            let next_paragraph = result.is_end_of_paragraph(model) && result.next_paragraph(model);
            let at_section_end = result
                .paragraph(model)
                .map_or(false, |paragraph| paragraph.is_end_of_section());
            if next_paragraph
                && at_section_end
                && page.column0_height == 0
                && two_column
                && !page.line_infos.is_empty()
            {
                budget = text_height;
                page.column0_height = page.line_infos.len();
            }
            if !(next_paragraph
                && budget >= 0
                && (!at_section_end || page.line_infos.len() == page.column0_height))
            {
                break;
            }
        }
        self.breaker.reset_style();
        result
    }

    /// Start of the page that ends at `end`
    pub fn find_start_of_previous_page(&mut self, end: WordCursor) -> WordCursor {
        let height = self.geometry.height;
        let mut start = end;
        if self.geometry.two_column {
            start = self.find_start(start, SizeUnit::Pixel, height);
        }
        self.find_start(start, SizeUnit::Pixel, height)
    }

    /// Walks back from `end` until `size` units fit between the result and `end`
    pub fn find_start(&mut self, end: WordCursor, unit: SizeUnit, size: i32) -> WordCursor {
        let model = self.model();
        let mut start = end;
        let mut paragraph_size = self.paragraph_size(&start, true, unit);
        let mut height = size - paragraph_size.height;
        let mut position_changed = !start.is_start_of_paragraph();
        start.move_to_paragraph_start();
        while height > 0 {
            let previous_size = paragraph_size;
            let at_section_end = start
                .paragraph(model)
                .map_or(false, |paragraph| paragraph.is_end_of_section());
            if position_changed && at_section_end {
                break;
            }
            if !start.previous_paragraph(model) {
                break;
            }
            if !start
                .paragraph(model)
                .map_or(false, |paragraph| paragraph.is_end_of_section())
            {
                position_changed = true;
            }
            paragraph_size = self.paragraph_size(&start, false, unit);
            height -= paragraph_size.height;
            height += paragraph_size.bottom_margin.min(previous_size.top_margin);
        }
        self.skip(&mut start, unit, -height);

        if unit == SizeUnit::Pixel {
            let mut same_start = start.same_position_as(&end);
            if !same_start && start.is_end_of_paragraph(model) && end.is_start_of_paragraph() {
                let mut next = start;
                next.next_paragraph(model);
                same_start = next.same_position_as(&end);
            }
            if same_start {
                start = self.find_start(end, SizeUnit::Line, 1);
            }
        }
        start
    }

    /// Size of the cursor's paragraph, or of its part before the cursor
    fn paragraph_size(&mut self, cursor: &WordCursor, before_cursor: bool, unit: SizeUnit) -> ParagraphSize {
        let mut size = ParagraphSize::default();
        let Some(paragraph) = cursor.paragraph(self.model()) else {
            return size;
        };
        let end_index = if before_cursor {
            cursor.element_index()
        } else {
            paragraph.len()
        };
        self.breaker.reset_style();
        let (mut element, mut char_index) = (0, 0);
        let mut previous: Option<LineInfo> = None;
        while element != end_index {
            let line = self
                .breaker
                .layout_line(&paragraph, element, char_index, end_index, previous.as_ref());
            element = line.end_element_index;
            char_index = line.end_char_index;
            size.height += self.line_size(&line, unit);
            if previous.is_none() {
                size.top_margin = line.vspace_before;
            }
            size.bottom_margin = line.vspace_after;
            previous = Some(line);
        }
        size
    }

    /// Moves the cursor forward by whole lines until `size` units are passed
    fn skip(&mut self, cursor: &mut WordCursor, unit: SizeUnit, mut size: i32) {
        let model = self.model();
        let Some(paragraph) = cursor.paragraph(model) else {
            return;
        };
        let end_index = paragraph.len();
        self.breaker.reset_style();
        self.breaker.apply_style_changes(&paragraph, 0, cursor.element_index());
        let mut previous: Option<LineInfo> = None;
        while !cursor.is_end_of_paragraph(model) && size > 0 {
            let line = self.breaker.layout_line(
                &paragraph,
                cursor.element_index(),
                cursor.char_index(),
                end_index,
                previous.as_ref(),
            );
            cursor.move_to(model, line.end_element_index, line.end_char_index);
            size -= self.line_size(&line, unit);
            previous = Some(line);
        }
    }

    /// Brings `page` to `Ready`, returning the state it had before
    pub fn prepare(&mut self, page: &mut Page) -> PaintState {
        let old_state = page.paint_state;
        if matches!(old_state, PaintState::NothingToPaint | PaintState::Ready) {
            return old_state;
        }
        let model = self.model();
        self.breaker.cache_mut().store_all(&page.line_infos);

        match old_state {
            PaintState::ToScrollForward(mode) => {
                if !page.end.is_end_of_text(model) {
                    self.scroll_forward(page, mode);
                }
            }
            PaintState::ToScrollBackward(mode) => {
                if !page.start.is_start_of_text() {
                    self.scroll_backward(page, mode);
                }
            }
            PaintState::StartIsKnown => {
                if !page.start.is_null() {
                    let start = page.start;
                    page.end = self.build(page, start);
                }
            }
            PaintState::EndIsKnown => {
                if !page.end.is_null() {
                    page.start = self.find_start_of_previous_page(page.end);
                    let start = page.start;
                    page.end = self.build(page, start);
                }
            }
            PaintState::NothingToPaint | PaintState::Ready => {}
        }
        debug!(
            "prepared page {:?} .. {:?} with {} lines from {:?}",
            page.start.position(),
            page.end.position(),
            page.line_infos.len(),
            old_state
        );
        page.paint_state = PaintState::Ready;
        self.breaker.cache_mut().clear();
        old_state
    }

    fn scroll_forward(&mut self, page: &mut Page, mode: ScrollingMode) {
        let model = self.model();
        let mut start = match mode {
            ScrollingMode::NoOverlapping => WordCursor::NULL,
            ScrollingMode::KeepLines(lines) => page.find_line_from_end(lines),
            ScrollingMode::ScrollLines(lines) => {
                let mut cursor = page.find_line_from_start(lines);
                if cursor.is_end_of_paragraph(model) {
                    cursor.next_paragraph(model);
                }
                cursor
            }
            ScrollingMode::ScrollPercentage(percent) => page.find_percent_from_start(percent),
        };
        if !start.is_null() && start.same_position_as(&page.start) {
            start = page.find_line_from_start(1);
        }
        if !start.is_null() {
            let end = self.build(page, start);
            let keeps_end = matches!(mode, ScrollingMode::KeepLines(_)) && end.same_position_as(&page.end);
            if !page.is_empty_page() && !keeps_end {
                page.start = start;
                page.end = end;
                return;
            }
        }
        page.start = page.end;
        let start = page.start;
        page.end = self.build(page, start);
    }

    fn scroll_backward(&mut self, page: &mut Page, mode: ScrollingMode) {
        page.start = match mode {
            ScrollingMode::NoOverlapping => self.find_start_of_previous_page(page.start),
            ScrollingMode::KeepLines(lines) => {
                let mut end = page.find_line_from_start(lines);
                if !end.is_null() && end.same_position_as(&page.end) {
                    end = page.find_line_from_end(1);
                }
                if end.is_null() {
                    self.find_start_of_previous_page(page.start)
                } else {
                    let start = self.find_start_of_previous_page(end);
                    if start.same_position_as(&page.start) {
                        self.find_start_of_previous_page(page.start)
                    } else {
                        start
                    }
                }
            }
            ScrollingMode::ScrollLines(lines) => self.find_start(page.start, SizeUnit::Line, lines as i32),
            ScrollingMode::ScrollPercentage(percent) => {
                self.find_start(page.start, SizeUnit::Pixel, self.geometry.height * percent as i32 / 100)
            }
        };
        let start = page.start;
        page.end = self.build(page, start);
        if page.is_empty_page() {
            page.start = self.find_start(page.start, SizeUnit::Line, 1);
            let start = page.start;
            page.end = self.build(page, start);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line_breaking::tests::{geometry, Fixture};
    use crate::position::Position;
    use crate::text_model::TextModelBuilder;

    fn three_paragraphs() -> Fixture {
        Fixture::paragraphs(&["AAAA BBBB", "CCCC", "DDDD EEEE FFFF"])
    }

    fn ready_page(builder: &mut PageBuilder<'_>, start: Position) -> Page {
        let mut page = Page::new();
        page.start = WordCursor::new(start);
        page.paint_state = PaintState::StartIsKnown;
        builder.prepare(&mut page);
        page
    }

    fn line_ranges(page: &Page) -> Vec<(Position, Position)> {
        page.line_infos.iter().map(|line| (line.start(), line.end())).collect()
    }

    #[test]
    fn test_build_fills_one_page() {
        let fixture = three_paragraphs();
        let mut cache = LineInfoCache::new();
        let mut builder = PageBuilder::new(fixture.env(geometry(90, 24)), &mut cache);
        let page = ready_page(&mut builder, Position::new(0, 0, 0));
        assert_eq!(page.paint_state, PaintState::Ready);
        assert_eq!(
            line_ranges(&page),
            vec![
                (Position::new(0, 0, 0), Position::new(0, 3, 0)),
                (Position::new(1, 0, 0), Position::new(1, 1, 0)),
            ]
        );
        assert_eq!(page.end.position(), Some(Position::new(2, 0, 0)));

        let second = ready_page(&mut builder, Position::new(2, 0, 0));
        assert_eq!(second.line_infos.len(), 2);
        assert!(second.end.is_end_of_text(&fixture.model));
    }

    #[test]
    fn test_two_columns() {
        let fixture = three_paragraphs();
        let mut cache = LineInfoCache::new();
        let mut layout = geometry(90, 24);
        layout.two_column = true;
        let mut builder = PageBuilder::new(fixture.env(layout), &mut cache);
        let page = ready_page(&mut builder, Position::new(0, 0, 0));
        assert_eq!(page.line_infos.len(), 4);
        assert_eq!(page.column0_height, 2);
        assert!(page.end.is_end_of_text(&fixture.model));
    }

    #[test]
    fn test_previous_page_round_trip() {
        let fixture = three_paragraphs();
        let mut cache = LineInfoCache::new();
        let mut builder = PageBuilder::new(fixture.env(geometry(90, 24)), &mut cache);
        let first = ready_page(&mut builder, Position::new(0, 0, 0));
        let start = builder.find_start_of_previous_page(first.end);
        assert_eq!(start.position(), Some(Position::new(0, 0, 0)));

        let mut by_end = Page::new();
        by_end.end = WordCursor::new(Position::new(2, 5, 0));
        by_end.paint_state = PaintState::EndIsKnown;
        assert_eq!(builder.prepare(&mut by_end), PaintState::EndIsKnown);
        assert_eq!(by_end.start.position(), Some(Position::new(2, 0, 0)));
        assert_eq!(by_end.line_infos.len(), 2);
    }

    #[test]
    fn test_two_column_previous_page_spans_both_columns() {
        let fixture = Fixture::paragraphs(&["AAAA", "BBBB", "CCCC", "DDDD", "EEEE", "FFFF", "GGGG"]);
        let mut cache = LineInfoCache::new();
        let mut layout = geometry(90, 24);
        layout.two_column = true;
        let mut builder = PageBuilder::new(fixture.env(layout), &mut cache);

        let end = WordCursor::new(Position::new(6, 0, 0));
        let one_column = builder.find_start(end, SizeUnit::Pixel, 24);
        assert_eq!(one_column.position(), Some(Position::new(4, 0, 0)));
        let start = builder.find_start_of_previous_page(end);
        assert_eq!(start.position(), Some(Position::new(2, 0, 0)));

        let mut by_end = Page::new();
        by_end.end = end;
        by_end.paint_state = PaintState::EndIsKnown;
        builder.prepare(&mut by_end);
        assert_eq!(by_end.start.position(), Some(Position::new(2, 0, 0)));
        assert_eq!(by_end.end.position(), Some(Position::new(6, 0, 0)));
        assert_eq!(by_end.line_infos.len(), 4);
        assert_eq!(by_end.column0_height, 2);

        let forward = ready_page(&mut builder, Position::new(2, 0, 0));
        assert_eq!(forward.end.position(), Some(Position::new(6, 0, 0)));
    }

    #[test]
    fn test_find_start_by_lines() {
        let fixture = three_paragraphs();
        let mut cache = LineInfoCache::new();
        let mut builder = PageBuilder::new(fixture.env(geometry(90, 24)), &mut cache);
        let end = WordCursor::new(Position::new(2, 0, 0));
        assert_eq!(
            builder.find_start(end, SizeUnit::Line, 1).position(),
            Some(Position::new(1, 0, 0))
        );
        assert_eq!(
            builder.find_start(end, SizeUnit::Line, 2).position(),
            Some(Position::new(0, 0, 0))
        );
        let inside = WordCursor::new(Position::new(2, 3, 0));
        assert_eq!(
            builder.find_start(inside, SizeUnit::Line, 1).position(),
            Some(Position::new(2, 0, 0))
        );
    }

    #[test]
    fn test_scroll_forward_modes() {
        let fixture = three_paragraphs();
        let mut cache = LineInfoCache::new();
        let mut builder = PageBuilder::new(fixture.env(geometry(90, 24)), &mut cache);

        let mut page = ready_page(&mut builder, Position::new(0, 0, 0));
        page.paint_state = PaintState::ToScrollForward(ScrollingMode::NoOverlapping);
        builder.prepare(&mut page);
        assert_eq!(page.start.position(), Some(Position::new(2, 0, 0)));

        let mut page = ready_page(&mut builder, Position::new(0, 0, 0));
        page.paint_state = PaintState::ToScrollForward(ScrollingMode::KeepLines(1));
        builder.prepare(&mut page);
        assert_eq!(page.start.position(), Some(Position::new(1, 0, 0)));
        assert_eq!(page.end.position(), Some(Position::new(2, 3, 0)));

        let mut page = ready_page(&mut builder, Position::new(0, 0, 0));
        page.paint_state = PaintState::ToScrollForward(ScrollingMode::ScrollLines(1));
        builder.prepare(&mut page);
        assert_eq!(page.start.position(), Some(Position::new(1, 0, 0)));
    }

    #[test]
    fn test_scroll_forward_at_end_keeps_page() {
        let fixture = three_paragraphs();
        let mut cache = LineInfoCache::new();
        let mut builder = PageBuilder::new(fixture.env(geometry(90, 24)), &mut cache);
        let mut page = ready_page(&mut builder, Position::new(2, 0, 0));
        page.paint_state = PaintState::ToScrollForward(ScrollingMode::NoOverlapping);
        builder.prepare(&mut page);
        assert_eq!(page.start.position(), Some(Position::new(2, 0, 0)));
        assert!(page.is_ready());
    }

    #[test]
    fn test_scroll_backward_modes() {
        let fixture = three_paragraphs();
        let mut cache = LineInfoCache::new();
        let mut builder = PageBuilder::new(fixture.env(geometry(90, 24)), &mut cache);

        let mut page = ready_page(&mut builder, Position::new(2, 0, 0));
        page.paint_state = PaintState::ToScrollBackward(ScrollingMode::NoOverlapping);
        builder.prepare(&mut page);
        assert_eq!(page.start.position(), Some(Position::new(0, 0, 0)));
        assert_eq!(page.end.position(), Some(Position::new(2, 0, 0)));

        let mut page = ready_page(&mut builder, Position::new(2, 0, 0));
        page.paint_state = PaintState::ToScrollBackward(ScrollingMode::ScrollLines(1));
        builder.prepare(&mut page);
        assert_eq!(page.start.position(), Some(Position::new(1, 0, 0)));
    }

    #[test]
    fn test_page_stops_at_section_end() {
        let model = TextModelBuilder::new()
            .paragraph("AAAA")
            .end_of_section()
            .paragraph("BBBB")
            .build();
        let fixture = Fixture::new(model);
        let mut cache = LineInfoCache::new();
        let mut builder = PageBuilder::new(fixture.env(geometry(90, 100)), &mut cache);
        let page = ready_page(&mut builder, Position::new(0, 0, 0));
        assert_eq!(page.line_infos.len(), 1);
        assert_eq!(page.end.position(), Some(Position::new(1, 0, 0)));
    }

    #[test]
    fn test_lines_come_from_cache_on_rebuild() {
        let fixture = three_paragraphs();
        let mut cache = LineInfoCache::new();
        {
            let mut builder = PageBuilder::new(fixture.env(geometry(90, 24)), &mut cache);
            let mut page = ready_page(&mut builder, Position::new(0, 0, 0));
            let before = page.line_infos.clone();
            page.paint_state = PaintState::StartIsKnown;
            builder.prepare(&mut page);
            assert_eq!(page.line_infos, before);
        }
        assert!(cache.is_empty());
    }
}

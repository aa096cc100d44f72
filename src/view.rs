//! # Text View
//!
//! The pagination controller. A [`TextView`] owns the document, the three
//! page slots (previous, current, next), the line cache and the overlays,
//! and is the single entry point for navigation, search, painting and
//! hit testing. Pages are built lazily: navigation only records what is
//! known about a page and the next prepare or paint does the layout.

use crate::area_renderer::AreaRenderer;
use crate::config::ViewConfig;
use crate::cursor::{ParagraphCursor, WordCursor};
use crate::element_area::{ElementArea, Hull};
use crate::error::Result;
use crate::highlighting::{HighlightKind, HighlightSet, Highlighting};
use crate::hyphenator::{Hyphenator, NoHyphenation};
use crate::layout_strategy::LayoutStrategy;
use crate::line_breaking::LayoutEnv;
use crate::line_info::LineInfoCache;
use crate::metrics::{MonospaceMeasurer, TextMeasurer};
use crate::model::{Element, TextModel};
use crate::page::{Page, PageIndex, PaintState, ScrollingMode};
use crate::page_layout::PageBuilder;
use crate::paint::{DrawSurface, Point};
use crate::painter::{Overlay, Painter};
use crate::position::{Mark, Position};
use crate::selection::{Selection, SelectionHandle};
use crate::style::{DefaultStyleResolver, StyleResolver, TextStyle};
use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

const PREVIOUS: usize = 0;
const CURRENT: usize = 1;
const NEXT: usize = 2;

/// Reach of a tap that starts a selection
pub const MAX_SELECTION_DISTANCE: i32 = 10;

/// Characters sampled for the average character width
const CHAR_SAMPLE_SIZE: usize = 512;

/// Measured when the document has no text of its own
const FALLBACK_SAMPLE: &str = "Pack my box with five dozen liquor jugs. The quick brown fox jumps over \
    the lazy dog while five boxing wizards jump quickly. Sphinx of black quartz, judge my vow.";

/// Page number and page count, estimated for long documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagePosition {
    pub current: usize,
    pub total: usize,
}

pub struct TextView {
    model: Option<Box<dyn TextModel>>,
    resolver: Box<dyn StyleResolver>,
    measurer: Box<dyn TextMeasurer>,
    hyphenator: Box<dyn Hyphenator>,
    config: ViewConfig,
    strategy: Box<dyn LayoutStrategy>,
    pages: [Page; 3],
    line_cache: LineInfoCache,
    highlights: HighlightSet,
    selection: Selection,
    outline: Option<Position>,
    show_outline: bool,
    char_width: Option<f32>,
}

impl TextView {
    /// An empty view with monospace metrics and no hyphenation
    pub fn new(config: ViewConfig) -> Result<Self> {
        config.validate()?;
        let strategy = config.layout.strategy();
        Ok(TextView {
            model: None,
            resolver: Box::new(DefaultStyleResolver::with_defaults(TextStyle::default())),
            measurer: Box::new(MonospaceMeasurer::default()),
            hyphenator: Box::new(NoHyphenation),
            config,
            strategy,
            pages: [Page::new(), Page::new(), Page::new()],
            line_cache: LineInfoCache::new(),
            highlights: HighlightSet::new(),
            selection: Selection::new(),
            outline: None,
            show_outline: true,
            char_width: None,
        })
    }

    pub fn model(&self) -> Option<&dyn TextModel> {
        self.model.as_deref()
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn page(&self, index: PageIndex) -> &Page {
        &self.pages[index.slot()]
    }

    /// Replaces the document and opens it at its first paragraph
    pub fn set_model(&mut self, model: Option<Box<dyn TextModel>>) {
        self.selection.clear();
        self.highlights.clear();
        self.outline = None;
        self.char_width = None;
        self.line_cache.clear();
        self.model = model;
        for page in &mut self.pages {
            page.reset();
        }
        if self.model.as_deref().map_or(0, |model| model.paragraph_count()) > 0 {
            self.pages[CURRENT].move_start_cursor(WordCursor::at_paragraph(0));
        }
        debug!(
            "model set with {} paragraphs",
            self.model.as_deref().map_or(0, |model| model.paragraph_count())
        );
    }

    /// Applies a validated configuration; pages are relaid on next prepare
    pub fn set_config(&mut self, config: ViewConfig) -> Result<()> {
        config.validate()?;
        self.strategy = config.layout.strategy();
        self.config = config;
        self.char_width = None;
        self.rebuild_paint_info();
        Ok(())
    }

    pub fn set_style_resolver(&mut self, resolver: Box<dyn StyleResolver>) {
        self.resolver = resolver;
        self.clear_caches();
    }

    pub fn set_measurer(&mut self, measurer: Box<dyn TextMeasurer>) {
        self.measurer = measurer;
        self.clear_caches();
    }

    pub fn set_hyphenator(&mut self, hyphenator: Box<dyn Hyphenator>) {
        self.hyphenator = hyphenator;
        self.clear_caches();
    }

    /// Drops every measurement derived from the collaborators
    pub fn clear_caches(&mut self) {
        self.char_width = None;
        self.rebuild_paint_info();
    }

    /// Keeps the current page's known cursor and forgets everything else
    pub fn rebuild_paint_info(&mut self) {
        self.reset_neighbours();
        if let Some(model) = self.model.as_deref() {
            let page = &mut self.pages[CURRENT];
            if page.paint_state != PaintState::NothingToPaint {
                page.line_infos.clear();
                page.areas.clear();
                if !page.start.is_null() {
                    page.start.rebuild(model);
                    page.end.reset();
                    page.paint_state = PaintState::StartIsKnown;
                } else if !page.end.is_null() {
                    page.end.rebuild(model);
                    page.start.reset();
                    page.paint_state = PaintState::EndIsKnown;
                }
            }
        }
        self.line_cache.clear();
    }

    fn reset_neighbours(&mut self) {
        self.pages[PREVIOUS].reset();
        self.pages[NEXT].reset();
    }

    /// Lays out the page in `slot` if anything about it is pending
    fn prepare_slot(&mut self, slot: usize) {
        let Some(model) = self.model.as_deref() else {
            return;
        };
        let geometry = self.strategy.column_geometry(&self.config);
        let page = &mut self.pages[slot];
        page.set_geometry(geometry, slot == PREVIOUS);
        let env = LayoutEnv::new(
            model,
            self.resolver.as_ref(),
            self.measurer.as_ref(),
            self.hyphenator.as_ref(),
            self.strategy.as_ref(),
            geometry,
        )
        .configured(&self.config);
        let old_state = PageBuilder::new(env, &mut self.line_cache).prepare(page);
        if matches!(old_state, PaintState::NothingToPaint | PaintState::Ready) {
            return;
        }
        let origin = self.strategy.origin(&self.config);
        page.areas = AreaRenderer::new(env, origin, self.config.space_between_columns).render(page);

        if slot == CURRENT {
            if old_state != PaintState::StartIsKnown {
                self.pages[PREVIOUS].reset();
            }
            if old_state != PaintState::EndIsKnown {
                self.pages[NEXT].reset();
            }
        }
    }

    /// Seeds an empty neighbour from the current page, then lays it out
    fn prepare_neighbour(&mut self, index: PageIndex) {
        let slot = index.slot();
        if slot != CURRENT && self.pages[slot].paint_state == PaintState::NothingToPaint {
            self.prepare_slot(CURRENT);
            let current = &self.pages[CURRENT];
            let (start, end) = (current.start, current.end);
            let page = &mut self.pages[slot];
            if slot == PREVIOUS {
                if !start.is_null() {
                    page.end = start;
                    page.paint_state = PaintState::EndIsKnown;
                }
            } else if !end.is_null() {
                page.start = end;
                page.paint_state = PaintState::StartIsKnown;
            }
        }
        self.prepare_slot(slot);
    }

    pub fn prepare_page(&mut self, index: PageIndex) {
        self.prepare_neighbour(index);
    }

    /// Forgets the neighbours and lays out the current page
    pub fn prepare_paint_info(&mut self) {
        self.reset_neighbours();
        self.prepare_slot(CURRENT);
    }

    /// Draws the page in slot `index`
    pub fn paint(&mut self, surface: &mut dyn DrawSurface, index: PageIndex) {
        if self.model.as_deref().map_or(0, |model| model.paragraph_count()) == 0 {
            surface.clear(self.config.colors.background);
            return;
        }
        self.prepare_neighbour(index);
        let Some(model) = self.model.as_deref() else {
            return;
        };
        let page = &self.pages[index.slot()];
        if page.start.is_null() || page.end.is_null() {
            surface.clear(self.config.colors.background);
            return;
        }

        let colors = &self.config.colors;
        let selection = self.selection.to_highlighting().map(|highlighting| {
            let highlighting = highlighting.with_background(colors.selection_background);
            match colors.selection_foreground {
                Some(color) => highlighting.with_foreground(color),
                None => highlighting,
            }
        });
        let mut highlightings: Vec<&Highlighting> = selection
            .iter()
            .filter(|highlighting| highlighting.intersects(page))
            .collect();
        highlightings.extend(self.highlights.intersecting(page));

        let overlay = Overlay {
            highlightings,
            outline: self
                .outline
                .filter(|_| self.show_outline)
                .and_then(|position| page.areas.area_at(&position))
                .map(Hull::from_area),
            handles: [SelectionHandle::Left, SelectionHandle::Right]
                .into_iter()
                .filter_map(|handle| self.selection.handle_point(page, handle).map(|point| (handle, point)))
                .collect(),
            handle_size: self.resolver.base_style().font_size / 2,
        };
        let geometry = page.geometry();
        let metrics = LayoutEnv::new(
            model,
            self.resolver.as_ref(),
            self.measurer.as_ref(),
            self.hyphenator.as_ref(),
            self.strategy.as_ref(),
            geometry,
        )
        .configured(&self.config)
        .metrics;
        Painter::new(model, &self.config, self.strategy.as_ref(), metrics).paint(surface, page, &overlay);
    }

    /// Marks the current page to scroll on the next prepare
    pub fn turn_page(&mut self, forward: bool, mode: Option<ScrollingMode>) {
        self.prepare_slot(CURRENT);
        self.reset_neighbours();
        let mode = mode.unwrap_or(self.config.scrolling);
        let page = &mut self.pages[CURRENT];
        if page.is_ready() {
            page.paint_state = if forward {
                PaintState::ToScrollForward(mode)
            } else {
                PaintState::ToScrollBackward(mode)
            };
        }
    }

    /// Rotates the page window after an animated turn to `index`
    pub fn scroll_finished(&mut self, index: PageIndex) {
        match index {
            PageIndex::Current => {}
            PageIndex::Previous => {
                self.pages.rotate_right(1);
                self.pages[PREVIOUS].reset();
                if self.pages[CURRENT].paint_state == PaintState::NothingToPaint {
                    self.prepare_slot(NEXT);
                    let start = self.pages[NEXT].start;
                    let current = &mut self.pages[CURRENT];
                    current.end = start;
                    current.paint_state = PaintState::EndIsKnown;
                } else {
                    let end = self.pages[CURRENT].end;
                    let next_start = self.pages[NEXT].start;
                    if !end.is_null() && !next_start.is_null() && !end.same_position_as(&next_start) {
                        let next = &mut self.pages[NEXT];
                        next.reset();
                        next.start = end;
                        next.paint_state = PaintState::StartIsKnown;
                    }
                }
            }
            PageIndex::Next => {
                self.pages.rotate_left(1);
                self.pages[NEXT].reset();
                match self.pages[CURRENT].paint_state {
                    PaintState::NothingToPaint => {
                        self.prepare_slot(PREVIOUS);
                        let end = self.pages[PREVIOUS].end;
                        let current = &mut self.pages[CURRENT];
                        current.start = end;
                        current.paint_state = PaintState::StartIsKnown;
                    }
                    PaintState::Ready => {
                        let end = self.pages[CURRENT].end;
                        let next = &mut self.pages[NEXT];
                        next.start = end;
                        next.paint_state = PaintState::StartIsKnown;
                    }
                    _ => {}
                }
            }
        }
        debug!("scrolled to {:?}, current page starts at {:?}", index, self.pages[CURRENT].start.position());
    }

    pub fn can_scroll(&mut self, index: PageIndex) -> bool {
        match index {
            PageIndex::Current => true,
            PageIndex::Next => {
                let end = self.end_cursor();
                match self.model.as_deref() {
                    Some(model) => !end.is_null() && !end.is_end_of_text(model),
                    None => false,
                }
            }
            PageIndex::Previous => {
                let start = self.start_cursor();
                !start.is_null() && !start.is_start_of_text()
            }
        }
    }

    /// Start of the current page, laying it out if needed
    pub fn start_cursor(&mut self) -> WordCursor {
        if self.pages[CURRENT].start.is_null() {
            self.prepare_slot(CURRENT);
        }
        self.pages[CURRENT].start
    }

    /// End of the current page, laying it out if needed
    pub fn end_cursor(&mut self) -> WordCursor {
        if self.pages[CURRENT].end.is_null() {
            self.prepare_slot(CURRENT);
        }
        self.pages[CURRENT].end
    }

    fn has_text(&self) -> bool {
        self.model.as_deref().map_or(false, |model| model.paragraph_count() > 0)
    }

    /// Opens the page starting at `position`
    pub fn goto_position(&mut self, position: Position) {
        let Some(model) = self.model.as_deref() else {
            return;
        };
        if model.paragraph_count() == 0 {
            return;
        }
        self.pages[CURRENT].move_start_to(model, position);
        self.reset_neighbours();
        self.prepare_slot(CURRENT);
        if self.pages[CURRENT].is_empty_page() {
            self.turn_page(true, Some(ScrollingMode::NoOverlapping));
        }
    }

    /// Opens the page ending at `position`
    pub fn goto_position_by_end(&mut self, position: Position) {
        let Some(model) = self.model.as_deref() else {
            return;
        };
        if model.paragraph_count() == 0 {
            return;
        }
        self.pages[CURRENT].move_end_to(model, position);
        self.reset_neighbours();
        self.prepare_slot(CURRENT);
        if self.pages[CURRENT].is_empty_page() {
            self.turn_page(false, Some(ScrollingMode::NoOverlapping));
        }
    }

    pub fn goto_home(&mut self) {
        let start = self.start_cursor();
        if !start.is_null() && start.is_start_of_paragraph() && start.paragraph_index() == Some(0) {
            return;
        }
        self.goto_position(Position::paragraph_start(0));
        self.prepare_paint_info();
    }

    fn cursor_mark(&self, cursor: WordCursor) -> Option<Mark> {
        cursor.mark(self.model.as_deref()?)
    }

    /// Turns pages forward until the current page covers `mark`
    pub fn goto_mark(&mut self, mark: Option<Mark>) {
        let Some(mark) = mark else {
            return;
        };
        self.reset_neighbours();
        if self.pages[CURRENT].start.is_null() {
            self.prepare_slot(CURRENT);
        }
        let start = self.pages[CURRENT].start;
        if start.is_null() {
            return;
        }
        let starts_after = self
            .cursor_mark(start)
            .map_or(true, |start_mark| start_mark.compare_start(&mark) == Ordering::Greater);
        if start.paragraph_index() != Some(mark.paragraph) || starts_after {
            self.goto_position(Position::paragraph_start(mark.paragraph));
            self.prepare_slot(CURRENT);
        }
        self.turn_until(|view| {
            let end = view.pages[CURRENT].end;
            view.cursor_mark(end)
                .map_or(false, |end_mark| mark.compare_start(&end_mark) == Ordering::Greater)
        });
    }

    /// Turns pages forward until the current page shows part of `highlighting`
    pub fn goto_highlighting(&mut self, highlighting: &Highlighting) {
        self.reset_neighbours();
        if self.pages[CURRENT].start.is_null() {
            self.prepare_slot(CURRENT);
        }
        if self.pages[CURRENT].start.is_null() {
            return;
        }
        if !highlighting.intersects(&self.pages[CURRENT]) {
            self.goto_position(Position::paragraph_start(highlighting.start.paragraph));
            self.prepare_slot(CURRENT);
        }
        self.turn_until(|view| !highlighting.intersects(&view.pages[CURRENT]));
    }

    /// Turns forward while `pending` holds and the page still moves
    fn turn_until(&mut self, pending: impl Fn(&TextView) -> bool) {
        if self.pages[CURRENT].end.is_null() {
            self.prepare_slot(CURRENT);
        }
        while pending(&*self) {
            let before = self.pages[CURRENT].end;
            self.turn_page(true, Some(ScrollingMode::NoOverlapping));
            self.prepare_slot(CURRENT);
            if self.pages[CURRENT].end.same_position_as(&before) {
                break;
            }
        }
    }

    /// Marks every match of `text` and moves to the one nearest the current
    /// page in the requested direction. Returns the number of matches.
    pub fn search(&mut self, text: &str, ignore_case: bool, whole_text: bool, backward: bool) -> usize {
        if text.is_empty() {
            return 0;
        }
        let Some(model) = self.model.as_deref_mut() else {
            return 0;
        };
        let paragraphs = model.paragraph_count();
        let count = model.search(text, 0, paragraphs, ignore_case);
        self.reset_neighbours();
        if !self.pages[CURRENT].start.is_null() {
            self.rebuild_paint_info();
            if count > 0 {
                let start = self.cursor_mark(self.pages[CURRENT].start);
                let target = self.model.as_deref().and_then(|model| match (whole_text, backward) {
                    (true, false) => model.first_mark(),
                    (true, true) => model.last_mark(),
                    (false, false) => start.and_then(|mark| model.next_mark(&mark)),
                    (false, true) => start.and_then(|mark| model.previous_mark(&mark)),
                });
                self.goto_mark(target);
            }
        }
        debug!("search for {:?} marked {} matches", text, count);
        count
    }

    fn mark_after_page(&self) -> Option<Mark> {
        let end = self.pages[CURRENT].end;
        let model = self.model.as_deref()?;
        model.next_mark(&end.mark(model)?)
    }

    fn mark_before_page(&self) -> Option<Mark> {
        let start = self.pages[CURRENT].start;
        let model = self.model.as_deref()?;
        model.previous_mark(&start.mark(model)?)
    }

    pub fn can_find_next(&self) -> bool {
        self.mark_after_page().is_some()
    }

    pub fn find_next(&mut self) {
        let mark = self.mark_after_page();
        self.goto_mark(mark);
    }

    pub fn can_find_previous(&self) -> bool {
        self.mark_before_page().is_some()
    }

    pub fn find_previous(&mut self) {
        let mark = self.mark_before_page();
        self.goto_mark(mark);
    }

    pub fn clear_find_results(&mut self) {
        if self.find_results_are_empty() {
            return;
        }
        if let Some(model) = self.model.as_deref_mut() {
            model.remove_all_marks();
        }
        self.rebuild_paint_info();
    }

    pub fn find_results_are_empty(&self) -> bool {
        self.model.as_deref().map_or(true, |model| model.marks().is_empty())
    }

    fn size_of_text_before_cursor(&self, cursor: &WordCursor) -> Option<usize> {
        let model = self.model.as_deref()?;
        let paragraph = cursor.paragraph(model)?;
        let index = paragraph.index();
        let mut size = model.text_length_up_to(index);
        let length = paragraph.len();
        if length > 0 {
            size += (model.text_length_up_to(index + 1) - size) * cursor.element_index() / length;
        }
        Some(size)
    }

    fn size_of_full_text(&self) -> usize {
        match self.model.as_deref() {
            Some(model) if model.paragraph_count() > 0 => model.text_length_up_to(model.paragraph_count()),
            _ => 1,
        }
    }

    fn current_char_number(&mut self, index: PageIndex, start_not_end: bool) -> usize {
        if !self.has_text() {
            return 0;
        }
        self.prepare_neighbour(index);
        let page = &self.pages[index.slot()];
        if start_not_end {
            self.size_of_text_before_cursor(&page.start).unwrap_or(0)
        } else {
            self.size_of_text_before_cursor(&page.end)
                .unwrap_or_else(|| self.size_of_full_text().saturating_sub(1))
                .max(1)
        }
    }

    /// Average advance of the document's characters in the base style
    fn char_width(&mut self) -> f32 {
        if let Some(width) = self.char_width {
            return width;
        }
        let mut sample = String::new();
        let mut sampled = 0;
        if let Some(model) = self.model.as_deref() {
            let count = model.paragraph_count();
            let total = model.text_length_up_to(count);
            let mut paragraph = if total > CHAR_SAMPLE_SIZE {
                model.find_paragraph_by_text_length((total - CHAR_SAMPLE_SIZE) / 2)
            } else {
                0
            };
            'paragraphs: while let Some(cursor) = ParagraphCursor::new(model, paragraph) {
                for word in cursor.elements().iter().filter_map(Element::as_word) {
                    for c in word.text().chars() {
                        if sampled == CHAR_SAMPLE_SIZE {
                            break 'paragraphs;
                        }
                        sample.push(c);
                        sampled += 1;
                    }
                }
                paragraph += 1;
            }
        }
        if sampled == 0 {
            sample = FALLBACK_SAMPLE.chars().take(CHAR_SAMPLE_SIZE).collect();
            sampled = sample.chars().count();
        }
        let style = self.resolver.base_style();
        let width = (self.measurer.string_width(&sample, &style) as f32 / sampled as f32).max(1.0);
        self.char_width = Some(width);
        width
    }

    fn chars_per_page(&mut self) -> f32 {
        let char_width = self.char_width();
        let Some(model) = self.model.as_deref() else {
            return 1.0;
        };
        let style = self.resolver.base_style();
        let geometry = self.strategy.column_geometry(&self.config);
        let text_width = geometry.column_width as f32;
        let paragraphs = model.paragraph_count().max(1);
        let chars_per_paragraph = (model.text_length_up_to(paragraphs) as f32 / paragraphs as f32).max(1.0);

        let indent_width = style.first_line_indent as f32;
        let effective_width = text_width - (indent_width + 0.5 * text_width) / chars_per_paragraph;
        let chars_per_line = (effective_width / char_width).min(chars_per_paragraph * 1.2);

        let line_height = self.measurer.string_height(&style) * style.line_space_percent / 100
            + self.measurer.descent(&style);
        let spacing = (style.space_before + style.space_after / 2) as f32 / chars_per_paragraph;
        let effective_height = (geometry.height as f32 - spacing) as i32;
        let lines_per_page = effective_height / line_height.max(1);

        (chars_per_line * lines_per_page as f32).max(1.0)
    }

    fn text_page_number(&mut self, text_size: usize) -> usize {
        if !self.has_text() {
            return 1;
        }
        let factor = 1.0 / self.chars_per_page();
        let pages = text_size as f32 * factor;
        ((pages + 1.0 - 0.5 * factor) as usize).max(1)
    }

    /// Current page number and page count. Short documents are counted
    /// exactly from the page window; long ones are estimated from the
    /// average number of characters per page.
    pub fn page_position(&mut self) -> PagePosition {
        let end_chars = self.current_char_number(PageIndex::Current, false);
        let mut current = self.text_page_number(end_chars);
        let full = self.size_of_full_text();
        let total = self.text_page_number(full);
        if total > 3 {
            return PagePosition { current, total };
        }

        self.prepare_slot(CURRENT);
        let start = self.pages[CURRENT].start;
        if start.is_null() {
            return PagePosition { current, total };
        }
        if start.is_start_of_text() {
            current = 1;
        } else {
            self.prepare_neighbour(PageIndex::Previous);
            let previous = self.pages[PREVIOUS].start;
            if !previous.is_null() {
                current = if previous.is_start_of_text() { 2 } else { 3 };
            }
        }

        let mut total = current;
        let end = self.pages[CURRENT].end;
        let Some(model) = self.model.as_deref() else {
            return PagePosition { current, total };
        };
        if !end.is_null() && !end.is_end_of_text(model) {
            self.prepare_neighbour(PageIndex::Next);
            if let Some(model) = self.model.as_deref() {
                let next = self.pages[NEXT].end;
                if !next.is_null() {
                    total += if next.is_end_of_text(model) { 1 } else { 2 };
                }
            }
        }
        PagePosition { current, total }
    }

    pub fn progress(&mut self) -> PagePosition {
        self.page_position()
    }

    /// Opens the estimated page `page`, counted from one
    pub fn goto_page(&mut self, page: usize) {
        if !self.has_text() {
            return;
        }
        let text_size = (page as f32 * self.chars_per_page()) as usize;
        let Some(model) = self.model.as_deref() else {
            return;
        };
        // Inclusive length of paragraphs 0..=index
        let length_through = |index: usize| model.text_length_up_to(index + 1);
        let mut paragraph = model.find_paragraph_by_text_length(text_size);
        if paragraph > 0 && length_through(paragraph) > text_size {
            paragraph -= 1;
        }
        let mut size = length_through(paragraph);
        let mut size_before = model.text_length_up_to(paragraph);
        while paragraph > 0 && size == size_before {
            paragraph -= 1;
            size = size_before;
            size_before = model.text_length_up_to(paragraph);
        }
        let element = if size == size_before {
            0
        } else {
            ParagraphCursor::new(model, paragraph).map_or(0, |cursor| cursor.len())
        };
        self.goto_position_by_end(Position::new(paragraph, element, 0));
    }

    pub fn scrollbar_full_size(&self) -> usize {
        self.size_of_full_text()
    }

    pub fn scrollbar_thumb_position(&mut self, index: PageIndex) -> usize {
        self.current_char_number(index, true)
    }

    pub fn scrollbar_thumb_length(&mut self, index: PageIndex) -> usize {
        let start = self.current_char_number(index, true);
        let end = self.current_char_number(index, false);
        end.saturating_sub(start).max(1)
    }

    fn frame_point(&self, x: i32, y: i32) -> (i32, i32) {
        self.strategy.to_frame(&self.config, x, y)
    }

    fn handle_offset(&self) -> i32 {
        self.resolver.base_style().font_size / 2
    }

    /// Starts a selection at the element under the point
    pub fn init_selection(&mut self, x: i32, y: i32) -> bool {
        let (x, y) = self.frame_point(x, y);
        let y = y - self.handle_offset();
        self.selection
            .start(&self.pages[CURRENT].areas, x, y, MAX_SELECTION_DISTANCE)
    }

    pub fn move_selection_cursor_to(&mut self, handle: SelectionHandle, x: i32, y: i32) {
        let (x, y) = self.frame_point(x, y);
        let y = y - self.handle_offset();
        self.selection.set_cursor_in_movement(handle, x, y);
        self.selection
            .expand_to(&self.pages[CURRENT].areas, x, y, i32::MAX);
    }

    pub fn release_selection_cursor(&mut self) {
        self.selection.stop();
    }

    pub fn selection_cursor_in_movement(&self) -> Option<SelectionHandle> {
        self.selection.cursor_in_movement()
    }

    pub fn clear_selection(&mut self) -> bool {
        self.selection.clear()
    }

    pub fn is_selection_empty(&self) -> bool {
        self.selection.is_empty()
    }

    pub fn selection_start_position(&self) -> Option<Position> {
        self.selection.start_position()
    }

    pub fn selection_end_position(&self) -> Option<Position> {
        self.selection.end_position()
    }

    /// Selection as a highlighting in the configured selection colours
    pub fn selection_highlighting(&self) -> Option<Highlighting> {
        let colors = &self.config.colors;
        let highlighting = self.selection.to_highlighting()?.with_background(colors.selection_background);
        Some(match colors.selection_foreground {
            Some(color) => highlighting.with_foreground(color),
            None => highlighting,
        })
    }

    /// Top of the selection on the current page
    pub fn selection_start_y(&self) -> i32 {
        if self.selection.is_empty() {
            return 0;
        }
        let page = &self.pages[CURRENT];
        if let Some(area) = self.selection.start_area(page) {
            return area.y_start;
        }
        if self.selection.has_part_before_page(page) {
            page.areas.first_area().map_or(0, |area| area.y_start)
        } else {
            page.areas.last_area().map_or(0, |area| area.y_end)
        }
    }

    /// Bottom of the selection on the current page
    pub fn selection_end_y(&self) -> i32 {
        if self.selection.is_empty() {
            return 0;
        }
        let page = &self.pages[CURRENT];
        if let Some(area) = self.selection.end_area(page) {
            return area.y_end;
        }
        if self.selection.has_part_after_page(page) {
            page.areas.last_area().map_or(0, |area| area.y_end)
        } else {
            page.areas.first_area().map_or(0, |area| area.y_start)
        }
    }

    pub fn selection_cursor_point(&self, handle: SelectionHandle) -> Option<Point> {
        self.selection.handle_point(&self.pages[CURRENT], handle)
    }

    /// Handle whose point is nearest to `(x, y)`, within `max_distance2`
    pub fn find_selection_cursor(&self, x: i32, y: i32, max_distance2: i64) -> Option<SelectionHandle> {
        if self.selection.is_empty() {
            return None;
        }
        let (x, y) = self.frame_point(x, y);
        let distance2 = |handle| {
            self.selection_cursor_point(handle)
                .map(|point| point.distance2(x, y))
        };
        let (handle, distance) = match (distance2(SelectionHandle::Left), distance2(SelectionHandle::Right)) {
            (Some(left), Some(right)) if right < left => (SelectionHandle::Right, right),
            (Some(left), _) => (SelectionHandle::Left, left),
            (None, Some(right)) => (SelectionHandle::Right, right),
            (None, None) => return None,
        };
        (distance <= max_distance2).then_some(handle)
    }

    /// Replaces the manual highlight
    pub fn highlight(&mut self, start: Position, end: Position) {
        self.highlights.remove_kind(HighlightKind::Manual);
        let colors = &self.config.colors;
        let mut highlighting =
            Highlighting::new(HighlightKind::Manual, start, end).with_background(colors.highlight_background);
        if let Some(color) = colors.highlight_foreground {
            highlighting = highlighting.with_foreground(color);
        }
        self.highlights.add(highlighting);
    }

    pub fn add_highlighting(&mut self, highlighting: Highlighting) {
        self.highlights.add(highlighting);
    }

    pub fn add_highlightings(&mut self, highlightings: impl IntoIterator<Item = Highlighting>) {
        self.highlights.add_all(highlightings);
    }

    pub fn remove_highlightings(&mut self, kind: HighlightKind) -> bool {
        self.highlights.remove_kind(kind)
    }

    /// Drops the manual highlight; true if there was one
    pub fn clear_highlighting(&mut self) -> bool {
        self.highlights.remove_kind(HighlightKind::Manual)
    }

    pub fn highlightings(&self) -> &HighlightSet {
        &self.highlights
    }

    /// Filled highlighting under the element nearest to the point
    pub fn find_highlighting(&self, x: i32, y: i32, max_distance: i32) -> Option<&Highlighting> {
        let area = self.find_area(x, y, max_distance)?;
        self.highlights
            .iter()
            .find(|highlighting| highlighting.background.is_some() && highlighting.contains_area(area))
    }

    /// Area under the point on the current page
    pub fn element_at(&self, x: i32, y: i32) -> Option<&ElementArea> {
        let (x, y) = self.frame_point(x, y);
        self.pages[CURRENT].areas.binary_search(x, y)
    }

    /// Nearest area on the current page within `max_distance`
    pub fn find_area(&self, x: i32, y: i32, max_distance: i32) -> Option<&ElementArea> {
        let (x, y) = self.frame_point(x, y);
        self.pages[CURRENT].areas.find_nearest(x, y, max_distance)
    }

    /// Outlines the element at `position` when it is on the page
    pub fn outline_area(&mut self, position: Position) {
        self.outline = Some(position);
        self.show_outline = true;
    }

    pub fn hide_outline(&mut self) {
        self.show_outline = false;
    }

    pub fn outlined_area(&self) -> Option<&ElementArea> {
        let position = self.outline.filter(|_| self.show_outline)?;
        self.pages[CURRENT].areas.area_at(&position)
    }
}

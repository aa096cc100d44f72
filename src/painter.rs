//! # Painter
//!
//! Draws a ready page onto a [`DrawSurface`]: background, frame decoration,
//! highlight fills, the text with its search marks, images and placeholders,
//! then outlines and selection handles on top.

use crate::config::ViewConfig;
use crate::cursor::ParagraphCursor;
use crate::element_area::{AreaKind, ElementArea, Hull};
use crate::highlighting::Highlighting;
use crate::layout_strategy::LayoutStrategy;
use crate::metrics::{ElementMetrics, HYPHEN};
use crate::model::{Element, TextModel, Word};
use crate::page::Page;
use crate::paint::{DrawSurface, Point, Rect};
use crate::selection::SelectionHandle;
use crate::style::{Color, TextStyle};
use log::trace;

const HIGHLIGHT_ALPHA: u8 = 128;
const VIDEO_INSET: i32 = 10;
const PLAY_BUTTON: Color = Color::rgb(196, 196, 196);

/// Everything drawn over the text of one page
#[derive(Debug, Default)]
pub struct Overlay<'a> {
    pub highlightings: Vec<&'a Highlighting>,
    pub outline: Option<Hull>,
    pub handles: Vec<(SelectionHandle, Point)>,
    /// Half height of a selection handle
    pub handle_size: i32,
}

pub struct Painter<'a> {
    model: &'a dyn TextModel,
    config: &'a ViewConfig,
    strategy: &'a dyn LayoutStrategy,
    metrics: ElementMetrics<'a>,
}

/// Search-mark runs of a word piece, relative to the piece start
fn mark_runs(model: &dyn TextModel, paragraph: usize, word: &Word, start: usize, length: usize) -> Vec<(usize, usize)> {
    let from = word.offset() + start;
    let to = from + length;
    model
        .paragraph_marks(paragraph)
        .into_iter()
        .filter_map(|mark| {
            let run_start = mark.offset.max(from);
            let run_end = mark.end().min(to);
            (run_start < run_end).then(|| (run_start - from, run_end - run_start))
        })
        .collect()
}

impl<'a> Painter<'a> {
    pub fn new(
        model: &'a dyn TextModel,
        config: &'a ViewConfig,
        strategy: &'a dyn LayoutStrategy,
        metrics: ElementMetrics<'a>,
    ) -> Self {
        Painter {
            model,
            config,
            strategy,
            metrics,
        }
    }

    pub fn paint(&self, surface: &mut dyn DrawSurface, page: &Page, overlay: &Overlay<'_>) {
        let colors = &self.config.colors;
        surface.clear(colors.background);
        let rotation = self.strategy.rotation(self.config);
        if let Some(rotation) = rotation {
            surface.push_rotation(rotation);
        }
        self.strategy
            .frame_decoration(surface, self.config, colors.video_placeholder);

        for highlighting in &overlay.highlightings {
            if let Some(background) = highlighting.background {
                for rect in highlighting.hull(page).rects() {
                    surface.fill_rect(*rect, background, HIGHLIGHT_ALPHA);
                }
            }
        }

        for area in page.areas.iter() {
            self.draw_area(surface, area, &overlay.highlightings);
        }

        for highlighting in &overlay.highlightings {
            if let Some(outline) = highlighting.outline {
                for rect in highlighting.hull(page).rects() {
                    surface.stroke_rect(*rect, outline);
                }
            }
        }
        if let Some(hull) = &overlay.outline {
            for rect in hull.rects() {
                surface.stroke_rect(*rect, colors.selection_background);
            }
        }
        for (handle, point) in &overlay.handles {
            self.draw_handle(surface, *handle, *point, overlay.handle_size);
        }

        if rotation.is_some() {
            surface.pop_rotation();
        }
        trace!("painted {} areas", page.areas.len());
    }

    fn text_color(&self, area: &ElementArea, highlightings: &[&Highlighting]) -> Color {
        let highlighted = highlightings
            .iter()
            .find(|highlighting| highlighting.contains_area(area))
            .and_then(|highlighting| highlighting.foreground);
        match highlighted {
            Some(color) => color,
            None if area.style.style().hyperlink => self.config.colors.hyperlink,
            None => area.style.style().color,
        }
    }

    fn draw_area(&self, surface: &mut dyn DrawSurface, area: &ElementArea, highlightings: &[&Highlighting]) {
        let Some(paragraph) = ParagraphCursor::new(self.model, area.position.paragraph) else {
            return;
        };
        let Some(element) = paragraph.element(area.position.element) else {
            return;
        };
        let style = area.style.style();
        match (area.kind, element) {
            (AreaKind::Word, Element::Word(word)) => {
                let baseline = area.y_end - self.metrics.measurer.descent(style) - style.vertical_align;
                let color = self.text_color(area, highlightings);
                self.draw_word(surface, area, word, baseline, color);
            }
            (AreaKind::Space, _) => {
                let baseline = area.y_end - self.metrics.measurer.descent(style);
                surface.draw_text(area.x_start, baseline, " ", style, style.color);
            }
            (AreaKind::Image, Element::Image(image)) => {
                surface.draw_image(
                    area.x_start,
                    area.y_end,
                    image,
                    self.metrics.image_size(image),
                    self.config.image_scaling,
                    self.config.image_color_adjusting,
                );
            }
            (AreaKind::Video, Element::Video(_)) => self.draw_video_placeholder(surface, area),
            (AreaKind::Extension, Element::Extension(extension)) => extension.draw(surface, area),
            _ => {}
        }
    }

    fn draw_word(&self, surface: &mut dyn DrawSurface, area: &ElementArea, word: &Word, y: i32, color: Color) {
        let style = area.style.style();
        let start = area.position.char_index;
        let length = area.length;
        let mut x = area.x_start;
        let mut position = 0;
        for (run_start, run_length) in mark_runs(self.model, area.position.paragraph, word, start, length) {
            if run_start > position {
                x = self.draw_piece(surface, x, y, word.slice(start + position, run_start - position), style, color);
            }
            let text = word.slice(start + run_start, run_length);
            let end_x = x + self.metrics.measurer.string_width(text, style);
            let top = y - self.metrics.measurer.string_height(style);
            let bottom = y + self.metrics.measurer.descent(style);
            surface.fill_rect(
                Rect::from_corners(x, top, end_x - 1, bottom),
                self.config.colors.search_background,
                u8::MAX,
            );
            surface.draw_text(x, y, text, style, self.config.colors.search_foreground);
            x = end_x;
            position = run_start + run_length;
        }
        if position < length {
            x = self.draw_piece(surface, x, y, word.slice(start + position, length - position), style, color);
        }
        if area.add_hyphenation_sign {
            surface.draw_text(x, y, HYPHEN, style, color);
        }
    }

    fn draw_piece(&self, surface: &mut dyn DrawSurface, x: i32, y: i32, text: &str, style: &TextStyle, color: Color) -> i32 {
        surface.draw_text(x, y, text, style, color);
        x + self.metrics.measurer.string_width(text, style)
    }

    fn draw_video_placeholder(&self, surface: &mut dyn DrawSurface, area: &ElementArea) {
        let x_start = area.x_start + VIDEO_INSET;
        let x_end = area.x_end - VIDEO_INSET;
        let y_start = area.y_start + VIDEO_INSET;
        let y_end = area.y_end - VIDEO_INSET;
        if x_end <= x_start || y_end <= y_start {
            return;
        }
        let line = area.style.style().color;
        surface.fill_rect(
            Rect::from_corners(x_start, y_start, x_end, y_end),
            self.config.colors.video_placeholder,
            u8::MAX,
        );
        surface.draw_line(x_start, y_start, x_start, y_end, line);
        surface.draw_line(x_start, y_end, x_end, y_end, line);
        surface.draw_line(x_end, y_end, x_end, y_start, line);
        surface.draw_line(x_end, y_start, x_start, y_start, line);

        let width = x_end - x_start;
        let height = y_end - y_start;
        let left = x_start + width * 7 / 16;
        let right = x_start + width * 10 / 16;
        let top = y_start + height * 2 / 6;
        let bottom = y_start + height * 4 / 6;
        let center = y_start + height / 2;
        surface.fill_polygon(
            &[Point::new(left, top), Point::new(left, bottom), Point::new(right, center)],
            PLAY_BUTTON,
        );
    }

    fn draw_handle(&self, surface: &mut dyn DrawSurface, handle: SelectionHandle, point: Point, size: i32) {
        let size = size.max(2);
        let color = self.config.colors.selection_background;
        surface.fill_rect(Rect::new(point.x - 1, point.y - size, 3, 2 * size), color, u8::MAX);
        // knob above the left handle, below the right one
        let knob_y = match handle {
            SelectionHandle::Left => point.y - size,
            SelectionHandle::Right => point.y + size,
        };
        surface.fill_polygon(
            &[
                Point::new(point.x, knob_y - size / 2),
                Point::new(point.x + size / 2, knob_y),
                Point::new(point.x, knob_y + size / 2),
                Point::new(point.x - size / 2, knob_y),
            ],
            color,
        );
    }
}

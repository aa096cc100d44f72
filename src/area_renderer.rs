//! # Area Renderer
//!
//! Turns the lines of a ready page into positioned [`ElementArea`]s: applies
//! the paragraph alignment, spreads justification over the line's gaps and
//! moves to the second column when the first one is full.

use crate::cursor::ParagraphCursor;
use crate::element_area::{AreaKind, ElementArea, ElementAreaVector};
use crate::line_breaking::LayoutEnv;
use crate::line_info::LineInfo;
use crate::model::Element;
use crate::page::Page;
use crate::position::Position;
use crate::style::Alignment;

/// Share of `full` given to the next of `gaps` remaining gaps. Earlier gaps
/// take the rounding remainder.
pub fn gap_share(full: i32, gaps: usize) -> i32 {
    if gaps == 0 {
        return 0;
    }
    let gaps = gaps as i32;
    if full > 0 {
        (full + gaps - 1) / gaps
    } else {
        full / gaps
    }
}

pub struct AreaRenderer<'a> {
    env: LayoutEnv<'a>,
    origin: (i32, i32),
    column_gap: i32,
}

impl<'a> AreaRenderer<'a> {
    pub fn new(env: LayoutEnv<'a>, origin: (i32, i32), column_gap: i32) -> Self {
        AreaRenderer {
            env,
            origin,
            column_gap,
        }
    }

    /// Areas of every line of `page`, in reading order
    pub fn render(&self, page: &Page) -> ElementAreaVector {
        let mut areas = ElementAreaVector::new();
        let (origin_x, origin_y) = self.origin;
        let strategy = self.env.strategy;
        let (mut x, mut y) = (origin_x, origin_y);
        let mut column_index = 0;
        for (index, line) in page.line_infos.iter().enumerate() {
            if page.column0_height > 0 && index == page.column0_height {
                x += self.env.geometry.column_width + self.column_gap;
                y = origin_y;
                column_index = 1;
            }
            self.render_line(&mut areas, line, x, y, column_index);
            y += strategy.line_advance(line);
        }
        areas
    }

    fn render_line(&self, areas: &mut ElementAreaVector, line: &LineInfo, x: i32, top: i32, column_index: usize) {
        let Some(paragraph) = ParagraphCursor::new(self.env.model, line.paragraph_index) else {
            return;
        };
        let metrics = self.env.metrics;
        let column_width = self.env.geometry.column_width;
        let y = self
            .env
            .strategy
            .baseline(line, top, self.origin.1 + self.env.geometry.height - 1);

        let mut style = line.real_start_style.clone();
        let end_of_paragraph = line.is_end_of_paragraph();
        let mut x = x + line.left_indent;
        let mut full_correction = 0;
        {
            let text_style = style.style();
            let free = column_width - text_style.right_indent - line.width;
            match text_style.alignment {
                Alignment::Right => x += free,
                Alignment::Center => x += free / 2,
                Alignment::Justify if !end_of_paragraph => full_correction = free,
                _ => {}
            }
        }

        let mut space_counter = line.space_counter;
        let mut word_occurred = false;
        let mut change_style = true;
        let mut pending_space: Option<ElementArea> = None;
        let mut char_index = line.real_start_char_index;
        for element_index in line.real_start_element_index..line.end_element_index {
            let Some(element) = paragraph.element(element_index) else {
                break;
            };
            let width = metrics.element_width(element, char_index, style.style());
            let position = Position::new(line.paragraph_index, element_index, char_index);
            match element {
                Element::HSpace => {
                    if word_occurred && space_counter > 0 {
                        let correction = gap_share(full_correction, space_counter);
                        let space_width = metrics.space_width(style.style()) + correction;
                        pending_space = style.style().underline.then(|| ElementArea {
                            position,
                            length: 0,
                            kind: AreaKind::Space,
                            is_last_in_element: true,
                            add_hyphenation_sign: false,
                            change_style: false,
                            style: style.clone(),
                            x_start: x,
                            x_end: x + space_width,
                            y_start: y,
                            y_end: y,
                            column_index,
                        });
                        x += space_width;
                        full_correction -= correction;
                        word_occurred = false;
                        space_counter -= 1;
                    }
                }
                Element::Control { kind, start } => {
                    style = style.apply(self.env.resolver, *kind, *start);
                    change_style = true;
                }
                Element::NBSpace => {}
                Element::Word(_) | Element::Image(_) | Element::Video(_) | Element::Extension(_) => {
                    let height = metrics.element_height(element, style.style());
                    let descent = metrics.element_descent(element, style.style());
                    let (kind, length) = match element {
                        Element::Word(word) => (AreaKind::Word, word.len().saturating_sub(char_index)),
                        Element::Image(_) => (AreaKind::Image, 0),
                        Element::Video(_) => (AreaKind::Video, 0),
                        _ => (AreaKind::Extension, 0),
                    };
                    if let Some(space) = pending_space.take() {
                        areas.push(space);
                    }
                    areas.push(ElementArea {
                        position,
                        length,
                        kind,
                        is_last_in_element: true,
                        add_hyphenation_sign: false,
                        change_style,
                        style: style.clone(),
                        x_start: x,
                        x_end: x + width - 1,
                        y_start: y - height + 1,
                        y_end: y + descent,
                        column_index,
                    });
                    change_style = false;
                    word_occurred = true;
                }
            }
            x += width;
            char_index = 0;
        }

        if !end_of_paragraph && line.end_char_index > 0 {
            if let Some(Element::Word(word)) = paragraph.element(line.end_element_index) {
                let start = if line.real_start_element_index == line.end_element_index {
                    line.real_start_char_index
                } else {
                    0
                };
                let end = line.end_char_index.min(word.len());
                if end > start {
                    let add_hyphenation_sign = word.char_at(end - 1) != Some('-');
                    let text_style = style.style();
                    let width = metrics.word_width(word, text_style, start, end - start, add_hyphenation_sign);
                    let height = metrics.word_height(text_style);
                    let descent = metrics.measurer.descent(text_style);
                    areas.push(ElementArea {
                        position: Position::new(line.paragraph_index, line.end_element_index, start),
                        length: end - start,
                        kind: AreaKind::Word,
                        is_last_in_element: false,
                        add_hyphenation_sign,
                        change_style,
                        style: style.clone(),
                        x_start: x,
                        x_end: x + width - 1,
                        y_start: y - height + 1,
                        y_end: y + descent,
                        column_index,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::WordCursor;
    use crate::line_breaking::tests::{base_style, geometry, Fixture};
    use crate::line_info::LineInfoCache;
    use crate::page::PaintState;
    use crate::page_layout::PageBuilder;
    use crate::style::TextStyle;

    fn page_for(fixture: &Fixture, width: i32, height: i32, two_column: bool) -> Page {
        let mut cache = LineInfoCache::new();
        let mut layout = geometry(width, height);
        layout.two_column = two_column;
        let mut builder = PageBuilder::new(fixture.env(layout), &mut cache);
        let mut page = Page::new();
        page.start = WordCursor::at_paragraph(0);
        page.paint_state = PaintState::StartIsKnown;
        builder.prepare(&mut page);
        page
    }

    fn spans(areas: &ElementAreaVector) -> Vec<(usize, i32, i32)> {
        areas
            .iter()
            .map(|area| (area.position.element, area.x_start, area.x_end))
            .collect()
    }

    #[test]
    fn test_gap_share() {
        assert_eq!(gap_share(7, 3), 3);
        assert_eq!(gap_share(4, 2), 2);
        assert_eq!(gap_share(-7, 3), -2);
        assert_eq!(gap_share(5, 0), 0);
        // shares handed out one by one add up to the whole
        let (mut full, mut total) = (11, 0);
        for gaps in (1..=4).rev() {
            let share = gap_share(full, gaps);
            full -= share;
            total += share;
        }
        assert_eq!(total, 11);
    }

    #[test]
    fn test_left_aligned_areas() {
        let fixture = Fixture::paragraphs(&["AAAA BBBB", "CCCC"]);
        let page = page_for(&fixture, 90, 24, false);
        let areas = AreaRenderer::new(fixture.env(geometry(90, 24)), (0, 0), 0).render(&page);
        assert_eq!(spans(&areas), vec![(0, 0, 39), (2, 50, 89), (0, 0, 39)]);
        let first = areas.first_area().unwrap();
        assert_eq!((first.y_start, first.y_end), (1, 12));
        let last = areas.last_area().unwrap();
        assert_eq!(last.position.paragraph, 1);
        assert_eq!((last.y_start, last.y_end), (13, 24));
    }

    #[test]
    fn test_justified_line_spreads_gaps() {
        let mut fixture = Fixture::paragraphs(&["AA BB CC DDDDDDDD"]);
        fixture.resolver.set_base(TextStyle {
            alignment: Alignment::Justify,
            ..base_style()
        });
        let page = page_for(&fixture, 100, 100, false);
        let areas = AreaRenderer::new(fixture.env(geometry(100, 100)), (0, 0), 0).render(&page);
        // "AA BB CC" is 80px wide; 20px spread over two gaps
        assert_eq!(spans(&areas)[..3], [(0, 0, 19), (2, 40, 59), (4, 80, 99)]);
        // the last line of the paragraph is not stretched
        assert_eq!(spans(&areas)[3], (6, 0, 79));
    }

    #[test]
    fn test_right_and_center() {
        let mut fixture = Fixture::paragraphs(&["AAAA"]);
        fixture.resolver.set_base(TextStyle {
            alignment: Alignment::Right,
            ..base_style()
        });
        let page = page_for(&fixture, 100, 100, false);
        let areas = AreaRenderer::new(fixture.env(geometry(100, 100)), (5, 0), 0).render(&page);
        assert_eq!(spans(&areas), vec![(0, 65, 104)]);

        fixture.resolver.set_base(TextStyle {
            alignment: Alignment::Center,
            ..base_style()
        });
        let page = page_for(&fixture, 100, 100, false);
        let areas = AreaRenderer::new(fixture.env(geometry(100, 100)), (0, 0), 0).render(&page);
        assert_eq!(spans(&areas), vec![(0, 30, 69)]);
    }

    #[test]
    fn test_hyphenated_tail_area() {
        let mut fixture = Fixture::paragraphs(&["aa hyphenation"]);
        fixture.hyphenator.add("hy-phen-ation");
        let page = page_for(&fixture, 100, 100, false);
        let areas = AreaRenderer::new(fixture.env(geometry(100, 100)), (0, 0), 0).render(&page);
        let pieces: Vec<_> = areas
            .iter()
            .map(|a| (a.position, a.length, a.add_hyphenation_sign, a.is_last_in_element))
            .collect();
        assert_eq!(
            pieces,
            vec![
                (Position::new(0, 0, 0), 2, false, true),
                (Position::new(0, 2, 0), 6, true, false),
                (Position::new(0, 2, 6), 5, false, true),
            ]
        );
        assert_eq!(areas.areas()[1].x_end, 99);
    }

    #[test]
    fn test_second_column_offset() {
        let fixture = Fixture::paragraphs(&["AAAA BBBB", "CCCC", "DDDD EEEE FFFF"]);
        let page = page_for(&fixture, 90, 24, true);
        let areas = AreaRenderer::new(fixture.env(geometry(90, 24)), (0, 0), 10).render(&page);
        let second: Vec<_> = areas.iter().filter(|a| a.column_index == 1).collect();
        assert_eq!(second.len(), 3);
        assert_eq!(second[0].x_start, 100);
        assert_eq!(second[0].y_start, 1);
    }

    #[test]
    fn test_underlined_space_area() {
        let mut fixture = Fixture::paragraphs(&["AA BB"]);
        fixture.resolver.set_base(TextStyle {
            underline: true,
            ..base_style()
        });
        let page = page_for(&fixture, 100, 100, false);
        let areas = AreaRenderer::new(fixture.env(geometry(100, 100)), (0, 0), 0).render(&page);
        let kinds: Vec<_> = areas.iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![AreaKind::Word, AreaKind::Space, AreaKind::Word]);
    }
}

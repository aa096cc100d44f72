//! # Line Breaking Module
//!
//! Greedy line breaking over a paragraph's elements with style changes,
//! no-break spaces and hyphenation. Lines are memoized in the
//! [`LineInfoCache`] by where they start, so re-laying a region that did not
//! change costs one lookup per line.

use crate::config::ViewConfig;
use crate::cursor::ParagraphCursor;
use crate::hyphenator::{HyphenationInfo, Hyphenator};
use crate::layout_strategy::LayoutStrategy;
use crate::line_info::{LineInfo, LineInfoCache, LineKey};
use crate::metrics::{ElementMetrics, TextMeasurer};
use crate::model::{Element, ScalingType, TextModel, Word};
use crate::page::PageGeometry;
use crate::style::{Alignment, StyleResolver, StyleSnapshot};
use log::{trace, warn};

/// Indents larger than this close to the right edge are pulled back
const MIN_LINE_ROOM: i32 = 20;

/// Shortest word worth hyphenating when something already fits on the line
const MIN_HYPHENATED_WORD: usize = 3;

/// Collaborators one layout pass measures against
#[derive(Clone, Copy)]
pub struct LayoutEnv<'a> {
    pub model: &'a dyn TextModel,
    pub resolver: &'a dyn StyleResolver,
    pub hyphenator: &'a dyn Hyphenator,
    pub strategy: &'a dyn LayoutStrategy,
    pub metrics: ElementMetrics<'a>,
    pub geometry: PageGeometry,
    pub auto_hyphenation: bool,
}

impl<'a> LayoutEnv<'a> {
    pub fn new(
        model: &'a dyn TextModel,
        resolver: &'a dyn StyleResolver,
        measurer: &'a dyn TextMeasurer,
        hyphenator: &'a dyn Hyphenator,
        strategy: &'a dyn LayoutStrategy,
        geometry: PageGeometry,
    ) -> Self {
        LayoutEnv {
            model,
            resolver,
            hyphenator,
            strategy,
            metrics: ElementMetrics {
                measurer,
                image_scaling: ScalingType::FitMaximum,
                area_width: geometry.column_width,
                area_height: geometry.height,
            },
            geometry,
            auto_hyphenation: true,
        }
    }

    /// Takes the image scaling and hyphenation switches from `config`
    pub fn configured(mut self, config: &ViewConfig) -> Self {
        self.metrics.image_scaling = config.image_scaling;
        self.auto_hyphenation = config.auto_hyphenation;
        self
    }

    pub fn base_style(&self) -> StyleSnapshot {
        StyleSnapshot::from_resolver(self.resolver)
    }
}

/// Lays out single lines, carrying the current style between calls
pub struct LineBreaker<'a> {
    env: LayoutEnv<'a>,
    cache: &'a mut LineInfoCache,
    style: StyleSnapshot,
    last_word: Option<(String, HyphenationInfo)>,
}

impl<'a> LineBreaker<'a> {
    pub fn new(env: LayoutEnv<'a>, cache: &'a mut LineInfoCache) -> Self {
        let style = env.base_style();
        LineBreaker {
            env,
            cache,
            style,
            last_word: None,
        }
    }

    #[inline]
    pub fn env(&self) -> &LayoutEnv<'a> {
        &self.env
    }

    #[inline]
    pub fn style(&self) -> &StyleSnapshot {
        &self.style
    }

    pub fn cache_mut(&mut self) -> &mut LineInfoCache {
        self.cache
    }

    pub fn set_style(&mut self, style: StyleSnapshot) {
        self.style = style;
    }

    /// Back to the paragraph base style
    pub fn reset_style(&mut self) {
        self.style = self.env.base_style();
    }

    /// Applies the style changes among elements `from..to`
    pub fn apply_style_changes(&mut self, paragraph: &ParagraphCursor<'_>, from: usize, to: usize) {
        let to = to.min(paragraph.len());
        if from >= to {
            return;
        }
        for element in &paragraph.elements()[from..to] {
            if let Element::Control { kind, start } = element {
                self.style = self.style.apply(self.env.resolver, *kind, *start);
            }
        }
    }

    /// Lays out the line starting at `(start, start_char)`, considering
    /// elements up to `end`. The result always ends after its start: a line
    /// that cannot advance is stretched to the end of the paragraph.
    pub fn layout_line(
        &mut self,
        paragraph: &ParagraphCursor<'_>,
        start: usize,
        start_char: usize,
        end: usize,
        previous: Option<&LineInfo>,
    ) -> LineInfo {
        let key = LineKey {
            paragraph_index: paragraph.index(),
            start_element_index: start,
            start_char_index: start_char,
            start_style: self.style.clone(),
        };
        if let Some(cached) = self.cache.get(&key).cloned() {
            self.apply_style_changes(paragraph, start, cached.end_element_index);
            return cached.adjust(previous);
        }

        let mut info = self.measure_line(paragraph, start, start_char, end);
        if info.end_element_index == start && info.end_char_index == start_char {
            warn!(
                "line at {}:{}:{} does not advance, forcing it to the paragraph end",
                paragraph.index(),
                start,
                start_char
            );
            info.end_element_index = paragraph.len();
            info.end_char_index = 0;
            info.vspace_after = self.env.strategy.paragraph_space_after(self.style.style());
        }
        trace!(
            "line {} .. {} width {} height {}",
            info.start(),
            info.end(),
            info.width,
            info.height
        );
        if info.end_element_index != end || end == paragraph.len() {
            self.cache.insert(info.clone());
        }
        info.adjust(previous)
    }

    fn hyphenation_info(&mut self, word: &Word) -> HyphenationInfo {
        match &self.last_word {
            Some((text, info)) if text == word.text() => info.clone(),
            _ => {
                let info = HyphenationInfo::for_word(self.env.hyphenator, word.text());
                self.last_word = Some((word.text().to_string(), info.clone()));
                info
            }
        }
    }

    fn measure_line(&mut self, paragraph: &ParagraphCursor<'_>, start: usize, start_char: usize, end: usize) -> LineInfo {
        let metrics = self.env.metrics;
        let mut info = LineInfo::new(paragraph.index(), paragraph.len(), start, start_char, self.style.clone());
        let mut current = start;
        let mut current_char = start_char;
        let is_first_line = start == 0 && start_char == 0;

        if is_first_line {
            while current < end {
                match paragraph.element(current) {
                    Some(Element::Control { kind, start }) => {
                        self.style = self.style.apply(self.env.resolver, *kind, *start);
                        current += 1;
                        current_char = 0;
                    }
                    _ => break,
                }
            }
            info.real_start_style = self.style.clone();
            info.real_start_element_index = current;
            info.real_start_char_index = current_char;
        }

        let mut stored_style = self.style.clone();
        let max_width = {
            let style = stored_style.style();
            let max_width = self.env.geometry.column_width - style.right_indent;
            info.left_indent = style.left_indent;
            if is_first_line && style.alignment != Alignment::Center {
                info.left_indent += style.first_line_indent;
            }
            if info.left_indent > max_width - MIN_LINE_ROOM {
                info.left_indent = max_width * 3 / 4;
            }
            max_width
        };
        info.width = info.left_indent;

        if info.real_start_element_index == end {
            info.end_element_index = info.real_start_element_index;
            info.end_char_index = info.real_start_char_index;
            return info;
        }

        let mut new_width = info.width;
        let mut new_height = info.height;
        let mut new_descent = info.descent;
        let mut word_occurred = false;
        let mut is_visible = false;
        let mut last_space_width = 0;
        let mut space_counter = 0usize;
        let mut remove_last_space = false;

        while current < end {
            let Some(element) = paragraph.element(current) else {
                break;
            };
            let snapshot = self.style.clone();
            let style = snapshot.style();
            new_width += metrics.element_width(element, current_char, style);
            new_height = new_height.max(metrics.element_height(element, style));
            new_descent = new_descent.max(metrics.element_descent(element, style));
            match element {
                Element::HSpace => {
                    if word_occurred {
                        word_occurred = false;
                        space_counter += 1;
                        last_space_width = metrics.space_width(style);
                        new_width += last_space_width;
                    }
                }
                Element::NBSpace => word_occurred = true,
                Element::Word(_) | Element::Image(_) | Element::Video(_) | Element::Extension(_) => {
                    word_occurred = true;
                    is_visible = true;
                }
                Element::Control { kind, start } => {
                    self.style = self.style.apply(self.env.resolver, *kind, *start);
                }
            }
            if new_width > max_width && (info.end_element_index != start || element.is_word()) {
                break;
            }
            let previous_element = element;
            current += 1;
            current_char = 0;
            let allow_break = match paragraph.element(current) {
                Some(next) if current != end => {
                    !previous_element.is_nb_space()
                        && !next.is_nb_space()
                        && (!next.is_word() || previous_element.is_word())
                        && !next.is_image()
                }
                _ => true,
            };
            if allow_break {
                info.is_visible = is_visible;
                info.width = new_width;
                info.height = info.height.max(new_height);
                info.descent = info.descent.max(new_descent);
                info.end_element_index = current;
                info.end_char_index = current_char;
                info.space_counter = space_counter;
                stored_style = self.style.clone();
                remove_last_space = !word_occurred && space_counter > 0;
            }
        }

        let hyphenation_possible = self.env.auto_hyphenation && self.style.style().allow_hyphenations;
        if current != end && (hyphenation_possible || info.end_element_index == start) {
            if let Some(Element::Word(word)) = paragraph.element(current) {
                let snapshot = self.style.clone();
                let style = snapshot.style();
                new_width -= metrics.word_width(word, style, current_char, word.len().saturating_sub(current_char), false);
                let space_left = max_width - new_width;
                let first_on_line = info.end_element_index == start;
                if (word.len() > MIN_HYPHENATED_WORD && space_left > 2 * metrics.space_width(style)) || first_on_line {
                    let hyphenation = self.hyphenation_info(word);
                    let needs_hyphen = |at: usize| word.char_at(at - 1) != Some('-');
                    let mut position = current_char;
                    let mut subword_width = 0;

                    // Largest hyphenation point whose prefix fits.
                    let (mut left, mut right) = (current_char, word.len().saturating_sub(1));
                    while right > left {
                        let middle = (right + left + 1) / 2;
                        let mut candidate = middle;
                        while candidate > left && !hyphenation.is_possible(candidate) {
                            candidate -= 1;
                        }
                        if candidate > left {
                            let width = metrics.word_width(
                                word,
                                style,
                                current_char,
                                candidate - current_char,
                                needs_hyphen(candidate),
                            );
                            if width <= space_left {
                                left = middle;
                                position = candidate;
                                subword_width = width;
                            } else {
                                right = middle - 1;
                            }
                        } else {
                            left = middle;
                        }
                    }

                    // Nothing fits on an empty line: cut anywhere, one character at least.
                    if position == current_char && first_on_line {
                        subword_width = metrics.word_width(word, style, current_char, 1, false);
                        let mut right = if word.len() == current_char + 1 { word.len() } else { word.len() - 1 };
                        let mut left = current_char + 1;
                        while right > left {
                            let middle = (right + left + 1) / 2;
                            let width =
                                metrics.word_width(word, style, current_char, middle - current_char, needs_hyphen(middle));
                            if width <= space_left {
                                left = middle;
                                subword_width = width;
                            } else {
                                right = middle - 1;
                            }
                        }
                        position = right;
                    }

                    if position > current_char {
                        info.is_visible = true;
                        info.width = new_width + subword_width;
                        info.height = info.height.max(new_height);
                        info.descent = info.descent.max(new_descent);
                        if position >= word.len() {
                            info.end_element_index = current + 1;
                            info.end_char_index = 0;
                        } else {
                            info.end_element_index = current;
                            info.end_char_index = position;
                        }
                        info.space_counter = space_counter;
                        stored_style = self.style.clone();
                        remove_last_space = false;
                    }
                }
            }
        }

        if remove_last_space {
            info.width -= last_space_width;
            info.space_counter -= 1;
        }
        self.style = stored_style;

        if is_first_line {
            info.vspace_before = info.real_start_style.style().space_before;
            info.height += info.vspace_before;
        }
        if info.is_end_of_paragraph() {
            info.vspace_after = self.env.strategy.paragraph_space_after(self.style.style());
        }
        info
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::hyphenator::ExplicitHyphenator;
    use crate::layout_strategy::HorizontalLayout;
    use crate::metrics::MonospaceMeasurer;
    use crate::position::Position;
    use crate::style::{DefaultStyleResolver, StyleDecoration, StyleKind, TextStyle};
    use crate::text_model::{PlainTextModel, TextModelBuilder};

    pub(crate) fn base_style() -> TextStyle {
        TextStyle {
            font_size: 10,
            alignment: Alignment::Left,
            ..TextStyle::default()
        }
    }

    pub(crate) fn geometry(column_width: i32, height: i32) -> PageGeometry {
        PageGeometry {
            column_width,
            height,
            two_column: false,
        }
    }

    /// Collaborators with 10px monospace glyphs
    pub(crate) struct Fixture {
        pub model: PlainTextModel,
        pub resolver: DefaultStyleResolver,
        pub measurer: MonospaceMeasurer,
        pub hyphenator: ExplicitHyphenator,
        pub strategy: HorizontalLayout,
    }

    impl Fixture {
        pub fn new(model: PlainTextModel) -> Self {
            Fixture {
                model,
                resolver: DefaultStyleResolver::new(base_style()),
                measurer: MonospaceMeasurer::default(),
                hyphenator: ExplicitHyphenator::new(),
                strategy: HorizontalLayout,
            }
        }

        pub fn paragraphs(texts: &[&str]) -> Self {
            Fixture::new(PlainTextModel::from_paragraphs(texts))
        }

        pub fn env(&self, geometry: PageGeometry) -> LayoutEnv<'_> {
            LayoutEnv::new(
                &self.model,
                &self.resolver,
                &self.measurer,
                &self.hyphenator,
                &self.strategy,
                geometry,
            )
        }
    }

    fn lines_of(breaker: &mut LineBreaker<'_>, paragraph: usize) -> Vec<LineInfo> {
        let model = breaker.env().model;
        let cursor = ParagraphCursor::new(model, paragraph).unwrap();
        breaker.reset_style();
        let mut lines: Vec<LineInfo> = Vec::new();
        let (mut element, mut char_index) = (0, 0);
        while element != cursor.len() {
            let line = breaker.layout_line(&cursor, element, char_index, cursor.len(), lines.last());
            element = line.end_element_index;
            char_index = line.end_char_index;
            lines.push(line);
        }
        lines
    }

    #[test]
    fn test_two_words_per_line() {
        let fixture = Fixture::paragraphs(&["AAAA BBBB", "CCCC", "DDDD EEEE FFFF"]);
        let mut cache = LineInfoCache::new();
        let mut breaker = LineBreaker::new(fixture.env(geometry(90, 24)), &mut cache);

        let first = lines_of(&mut breaker, 0);
        assert_eq!(first.len(), 1);
        assert_eq!((first[0].end_element_index, first[0].width), (3, 90));
        assert_eq!((first[0].height, first[0].descent), (10, 2));
        assert!(first[0].is_end_of_paragraph());

        let third = lines_of(&mut breaker, 2);
        let ranges: Vec<_> = third
            .iter()
            .map(|l| (l.start_element_index, l.end_element_index, l.width))
            .collect();
        assert_eq!(ranges, vec![(0, 3, 90), (3, 5, 40)]);
        assert_eq!(third[0].space_counter, 1);
    }

    #[test]
    fn test_lines_partition_paragraph() {
        let fixture = Fixture::paragraphs(&["the quick brown fox jumps over the lazy dog and keeps running far away"]);
        let mut cache = LineInfoCache::new();
        let mut breaker = LineBreaker::new(fixture.env(geometry(100, 500)), &mut cache);
        let lines = lines_of(&mut breaker, 0);
        assert!(lines.len() > 3);
        let mut expected_start = Position::new(0, 0, 0);
        for line in &lines {
            assert_eq!(line.start(), expected_start);
            assert!(line.end() > line.real_start());
            assert!(line.width <= 100);
            expected_start = line.end();
        }
        assert_eq!(expected_start.element, fixture.model.paragraph(0).unwrap().len());

        let again = lines_of(&mut breaker, 0);
        assert_eq!(again, lines);
    }

    #[test]
    fn test_hyphenation_picks_largest_fitting_prefix() {
        let mut fixture = Fixture::paragraphs(&["aa hyphenation"]);
        fixture.hyphenator.add("hy-phen-ation");
        let mut cache = LineInfoCache::new();
        let mut breaker = LineBreaker::new(fixture.env(geometry(100, 500)), &mut cache);
        let lines = lines_of(&mut breaker, 0);
        assert_eq!(lines.len(), 2);
        // "aa hyphen-" is exactly 100px
        assert_eq!(lines[0].end(), Position::new(0, 2, 6));
        assert_eq!(lines[0].width, 100);
        assert_eq!(lines[1].start(), Position::new(0, 2, 6));
        assert_eq!(lines[1].width, 50);
    }

    #[test]
    fn test_no_hyphenation_when_disabled() {
        let fixture = Fixture::paragraphs(&["aa hyphenation"]);
        let mut cache = LineInfoCache::new();
        let mut env = fixture.env(geometry(100, 500));
        env.auto_hyphenation = false;
        let mut breaker = LineBreaker::new(env, &mut cache);
        let lines = lines_of(&mut breaker, 0);
        assert_eq!(lines[0].end(), Position::new(0, 1, 0));
        assert_eq!(lines[0].width, 20);
        // alone on its line the word is still cut to fit
        assert_eq!(lines[1].end(), Position::new(0, 2, 9));
        assert_eq!(lines[1].width, 100);
    }

    #[test]
    fn test_long_word_is_forced_apart() {
        let fixture = Fixture::paragraphs(&["abcdefghijkl"]);
        let mut cache = LineInfoCache::new();
        let mut breaker = LineBreaker::new(fixture.env(geometry(50, 500)), &mut cache);
        let lines = lines_of(&mut breaker, 0);
        let ends: Vec<_> = lines.iter().map(LineInfo::end).collect();
        assert_eq!(
            ends,
            vec![Position::new(0, 0, 4), Position::new(0, 0, 8), Position::new(0, 1, 0)]
        );
        assert!(lines.iter().all(|l| l.width <= 50));
    }

    #[test]
    fn test_single_wide_character_still_advances() {
        let fixture = Fixture::paragraphs(&["W"]);
        let mut cache = LineInfoCache::new();
        let mut breaker = LineBreaker::new(fixture.env(geometry(5, 500)), &mut cache);
        let lines = lines_of(&mut breaker, 0);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].end(), Position::new(0, 1, 0));
    }

    #[test]
    fn test_no_break_around_nbsp() {
        let fixture = Fixture::paragraphs(&["aaaa bb\u{a0}cc"]);
        let mut cache = LineInfoCache::new();
        let mut breaker = LineBreaker::new(fixture.env(geometry(80, 500)), &mut cache);
        let lines = lines_of(&mut breaker, 0);
        // "bb cc" cannot be split, so it moves down as a whole
        assert_eq!(lines[0].end(), Position::new(0, 1, 0));
        assert_eq!(lines[1].start(), Position::new(0, 1, 0));
        assert_eq!(lines[1].end(), Position::new(0, 5, 0));
        assert_eq!(lines[1].width, 50);
    }

    #[test]
    fn test_leading_style_changes() {
        let model = TextModelBuilder::new()
            .begin_paragraph()
            .control(StyleKind::STRONG, true)
            .text("Big words here")
            .control(StyleKind::STRONG, false)
            .end_paragraph()
            .build();
        let mut fixture = Fixture::new(model);
        fixture.resolver.set_decoration(
            StyleKind::STRONG,
            StyleDecoration {
                font_size_percent: Some(200),
                first_line_indent: Some(10),
                space_before: Some(6),
                ..StyleDecoration::default()
            },
        );
        let mut cache = LineInfoCache::new();
        let mut breaker = LineBreaker::new(fixture.env(geometry(200, 500)), &mut cache);
        let lines = lines_of(&mut breaker, 0);
        let first = &lines[0];
        assert_eq!(first.real_start_element_index, 1);
        assert_eq!(first.real_start_style.style().font_size, 20);
        assert_eq!(first.start_style.style().font_size, 10);
        assert_eq!(first.left_indent, 10);
        // indent + "Big words" at 20px
        assert_eq!(first.width, 10 + 60 + 20 + 100);
        assert_eq!(first.height, 20 + 6);
        assert_eq!(first.vspace_before, 6);
    }

    #[test]
    fn test_cache_hit_and_invalidation() {
        let mut fixture = Fixture::paragraphs(&["AAAA BBBB"]);
        let mut cache = LineInfoCache::new();
        let first = {
            let mut breaker = LineBreaker::new(fixture.env(geometry(200, 500)), &mut cache);
            let first = lines_of(&mut breaker, 0);
            let second = lines_of(&mut breaker, 0);
            assert_eq!(first, second);
            first
        };
        assert_eq!(cache.stats(), (1, 1));

        fixture.resolver.set_base(TextStyle {
            font_size: 20,
            ..base_style()
        });
        cache.clear();
        let mut breaker = LineBreaker::new(fixture.env(geometry(200, 500)), &mut cache);
        let resized = lines_of(&mut breaker, 0);
        assert_ne!(resized[0].width, first[0].width);
        assert_eq!(resized[0].width, 180);
    }

    #[test]
    fn test_indent_pulled_back_from_edge() {
        let mut fixture = Fixture::paragraphs(&["a"]);
        fixture.resolver.set_base(TextStyle {
            left_indent: 90,
            ..base_style()
        });
        let mut cache = LineInfoCache::new();
        let mut breaker = LineBreaker::new(fixture.env(geometry(100, 500)), &mut cache);
        let line = lines_of(&mut breaker, 0).remove(0);
        assert_eq!(line.left_indent, 75);
    }

    #[test]
    fn test_space_after_on_paragraph_end() {
        let mut fixture = Fixture::paragraphs(&["AAAA BBBB CCCC"]);
        fixture.resolver.set_base(TextStyle {
            space_after: 7,
            ..base_style()
        });
        let mut cache = LineInfoCache::new();
        let mut breaker = LineBreaker::new(fixture.env(geometry(90, 500)), &mut cache);
        let lines = lines_of(&mut breaker, 0);
        assert_eq!(lines[0].vspace_after, 0);
        assert_eq!(lines[1].vspace_after, 7);
    }
}

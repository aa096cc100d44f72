//! # In-Memory Text Model
//!
//! A reference [`TextModel`] built from plain strings. Text is tokenised into
//! words and spaces the way the line breaker expects:
//! - whitespace runs collapse into one breakable space
//! - U+00A0 becomes a non-breaking space
//! - CJK graphemes stand alone so lines may break between any two of them

use crate::find::TextMatcher;
use crate::model::{
    Element, ExtensionElement, ImageElement, Paragraph, ParagraphKind, TextModel, VideoElement, Word,
};
use crate::position::Mark;
use crate::style::StyleKind;
use log::debug;
use std::sync::Arc;
use unicode_segmentation::UnicodeSegmentation;

const NO_BREAK_SPACE: char = '\u{00A0}';

/// Paragraph list with cumulative lengths and a mark index
#[derive(Debug, Clone, Default)]
pub struct PlainTextModel {
    paragraphs: Vec<Paragraph>,
    texts: Vec<String>,
    /// Text length of paragraphs `0..=i`
    cumulative: Vec<usize>,
    marks: Vec<Mark>,
}

impl PlainTextModel {
    /// One text paragraph per string
    pub fn from_paragraphs<S: AsRef<str>>(paragraphs: &[S]) -> Self {
        let mut builder = TextModelBuilder::new();
        for text in paragraphs {
            builder = builder.paragraph(text.as_ref());
        }
        builder.build()
    }

    /// Plain text of paragraph `index`
    pub fn paragraph_text(&self, index: usize) -> Option<&str> {
        self.texts.get(index).map(String::as_str)
    }
}

impl TextModel for PlainTextModel {
    fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    fn paragraph(&self, index: usize) -> Option<&Paragraph> {
        self.paragraphs.get(index)
    }

    fn text_length_up_to(&self, index: usize) -> usize {
        let index = index.min(self.cumulative.len());
        if index == 0 {
            0
        } else {
            self.cumulative[index - 1]
        }
    }

    fn find_paragraph_by_text_length(&self, length: usize) -> usize {
        let index = self.cumulative.partition_point(|&total| total < length);
        index.min(self.cumulative.len().saturating_sub(1))
    }

    fn marks(&self) -> &[Mark] {
        &self.marks
    }

    fn search(&mut self, text: &str, from: usize, to: usize, ignore_case: bool) -> usize {
        self.marks.clear();
        let matcher = match TextMatcher::new(text, ignore_case) {
            Ok(matcher) => matcher,
            Err(err) => {
                debug!("search for {:?} skipped: {}", text, err);
                return 0;
            }
        };
        let to = to.min(self.texts.len());
        for paragraph in from.min(to)..to {
            for found in matcher.find_all(&self.texts[paragraph]) {
                self.marks.push(Mark::new(paragraph, found.start, found.length));
            }
        }
        debug!("search for {:?} found {} marks", text, self.marks.len());
        self.marks.len()
    }

    fn remove_all_marks(&mut self) {
        self.marks.clear();
    }
}

#[derive(Debug)]
struct ParagraphDraft {
    kind: ParagraphKind,
    elements: Vec<Element>,
    text: String,
    length: usize,
}

/// Incremental builder for [`PlainTextModel`]
#[derive(Debug, Default)]
pub struct TextModelBuilder {
    model: PlainTextModel,
    draft: Option<ParagraphDraft>,
}

impl TextModelBuilder {
    pub fn new() -> Self {
        TextModelBuilder::default()
    }

    /// Adds a complete text paragraph
    pub fn paragraph(self, text: &str) -> Self {
        self.begin_paragraph().text(text).end_paragraph()
    }

    /// Starts a paragraph, closing any open one
    pub fn begin_paragraph(self) -> Self {
        let mut builder = self.end_paragraph();
        builder.draft = Some(ParagraphDraft {
            kind: ParagraphKind::Text,
            elements: Vec::new(),
            text: String::new(),
            length: 0,
        });
        builder
    }

    /// Appends text to the open paragraph (opening one if needed)
    pub fn text(mut self, text: &str) -> Self {
        let draft = self.draft_mut();
        tokenize(text, draft.length, &mut draft.elements);
        draft.text.push_str(text);
        draft.length += text.chars().count();
        self
    }

    /// Appends `text` wrapped in a style span
    pub fn styled(self, kind: StyleKind, text: &str) -> Self {
        self.control(kind, true).text(text).control(kind, false)
    }

    pub fn control(mut self, kind: StyleKind, start: bool) -> Self {
        self.draft_mut().elements.push(Element::Control { kind, start });
        self
    }

    pub fn image(mut self, image: ImageElement) -> Self {
        self.draft_mut().elements.push(Element::Image(image));
        self
    }

    pub fn video(mut self, sources: Vec<String>) -> Self {
        self.draft_mut().elements.push(Element::Video(VideoElement { sources }));
        self
    }

    pub fn extension(mut self, extension: Arc<dyn ExtensionElement>) -> Self {
        self.draft_mut().elements.push(Element::Extension(extension));
        self
    }

    /// Closes the open paragraph, if any
    pub fn end_paragraph(mut self) -> Self {
        if let Some(draft) = self.draft.take() {
            self.push(
                Paragraph::new(draft.kind, draft.elements, draft.length),
                draft.text,
            );
        }
        self
    }

    /// Adds a section break
    pub fn end_of_section(self) -> Self {
        let mut builder = self.end_paragraph();
        builder.push(Paragraph::end_of_section(), String::new());
        builder
    }

    pub fn build(self) -> PlainTextModel {
        self.end_paragraph().model
    }

    fn draft_mut(&mut self) -> &mut ParagraphDraft {
        self.draft.get_or_insert_with(|| ParagraphDraft {
            kind: ParagraphKind::Text,
            elements: Vec::new(),
            text: String::new(),
            length: 0,
        })
    }

    fn push(&mut self, paragraph: Paragraph, text: String) {
        let total = self.model.cumulative.last().copied().unwrap_or(0) + paragraph.text_length;
        self.model.cumulative.push(total);
        self.model.paragraphs.push(paragraph);
        self.model.texts.push(text);
    }
}

/// Checks if a character is CJK
#[inline]
fn is_cjk(ch: char) -> bool {
    let code = ch as u32;
    // CJK Unified Ideographs
    (0x4E00..=0x9FFF).contains(&code)
        // CJK Unified Ideographs Extension A
        || (0x3400..=0x4DBF).contains(&code)
        // CJK Symbols and Punctuation
        || (0x3000..=0x303F).contains(&code)
        // Hiragana and Katakana
        || (0x3040..=0x30FF).contains(&code)
}

fn flush_word(word: &mut String, offset: usize, elements: &mut Vec<Element>) {
    if !word.is_empty() {
        elements.push(Element::Word(Word::new(std::mem::take(word), offset)));
    }
}

fn tokenize(text: &str, base_offset: usize, elements: &mut Vec<Element>) {
    let mut word = String::new();
    let mut word_offset = base_offset;
    let mut offset = base_offset;

    for grapheme in text.graphemes(true) {
        let first = grapheme.chars().next().unwrap_or(' ');
        let length = grapheme.chars().count();
        if first == NO_BREAK_SPACE {
            flush_word(&mut word, word_offset, elements);
            elements.push(Element::NBSpace);
        } else if first.is_whitespace() {
            flush_word(&mut word, word_offset, elements);
            if !matches!(elements.last(), Some(Element::HSpace)) {
                elements.push(Element::HSpace);
            }
        } else if is_cjk(first) {
            flush_word(&mut word, word_offset, elements);
            elements.push(Element::Word(Word::new(grapheme, offset)));
        } else {
            if word.is_empty() {
                word_offset = offset;
            }
            word.push_str(grapheme);
        }
        offset += length;
    }
    flush_word(&mut word, word_offset, elements);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(paragraph: &Paragraph) -> Vec<String> {
        paragraph
            .elements
            .iter()
            .map(|element| match element {
                Element::Word(word) => word.text().to_string(),
                Element::HSpace => " ".to_string(),
                Element::NBSpace => "~".to_string(),
                Element::Control { start: true, .. } => "<".to_string(),
                Element::Control { start: false, .. } => ">".to_string(),
                _ => "?".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_tokenize_words_and_spaces() {
        let model = PlainTextModel::from_paragraphs(&["AAAA  BBBB\u{00A0}CC"]);
        let paragraph = model.paragraph(0).unwrap();
        assert_eq!(words(paragraph), vec!["AAAA", " ", "BBBB", "~", "CC"]);
        let offsets: Vec<usize> = paragraph
            .elements
            .iter()
            .filter_map(|e| e.as_word().map(Word::offset))
            .collect();
        assert_eq!(offsets, vec![0, 6, 11]);
    }

    #[test]
    fn test_tokenize_cjk() {
        let model = PlainTextModel::from_paragraphs(&["中文ab"]);
        assert_eq!(words(model.paragraph(0).unwrap()), vec!["中", "文", "ab"]);
    }

    #[test]
    fn test_builder_spans() {
        let model = TextModelBuilder::new()
            .begin_paragraph()
            .text("plain ")
            .styled(StyleKind::STRONG, "bold")
            .end_paragraph()
            .end_of_section()
            .paragraph("next")
            .build();
        assert_eq!(model.paragraph_count(), 3);
        assert_eq!(words(model.paragraph(0).unwrap()), vec!["plain", " ", "<", "bold", ">"]);
        assert_eq!(model.paragraph(1).unwrap().kind, ParagraphKind::EndOfSection);
        assert_eq!(model.paragraph_text(0), Some("plain bold"));
    }

    #[test]
    fn test_text_lengths() {
        let model = PlainTextModel::from_paragraphs(&["abcd", "", "efghij"]);
        assert_eq!(model.text_length_up_to(0), 0);
        assert_eq!(model.text_length_up_to(1), 4);
        assert_eq!(model.text_length_up_to(2), 4);
        assert_eq!(model.text_length_up_to(3), 10);
        assert_eq!(model.text_length_up_to(99), 10);
        assert_eq!(model.find_paragraph_by_text_length(0), 0);
        assert_eq!(model.find_paragraph_by_text_length(4), 0);
        assert_eq!(model.find_paragraph_by_text_length(5), 2);
        assert_eq!(model.find_paragraph_by_text_length(50), 2);
    }

    #[test]
    fn test_search_marks() {
        let mut model = PlainTextModel::from_paragraphs(&["one target", "none", "Target two target"]);
        assert_eq!(model.search("target", 0, 3, true), 3);
        assert_eq!(model.first_mark(), Some(Mark::new(0, 4, 6)));
        assert_eq!(model.last_mark(), Some(Mark::new(2, 11, 6)));
        assert_eq!(model.next_mark(&Mark::new(0, 4, 0)), Some(Mark::new(0, 4, 6)));
        assert_eq!(model.next_mark(&Mark::new(1, 0, 0)), Some(Mark::new(2, 0, 6)));
        assert_eq!(model.previous_mark(&Mark::new(2, 0, 0)), Some(Mark::new(0, 4, 6)));
        assert_eq!(model.previous_mark(&Mark::new(0, 4, 0)), None);
        assert_eq!(model.paragraph_marks(2).len(), 2);

        assert_eq!(model.search("target", 0, 3, false), 2);
        model.remove_all_marks();
        assert!(model.marks().is_empty());
        assert_eq!(model.search("", 0, 3, false), 0);
    }
}

//! # Document Model Interface
//!
//! The engine consumes documents through [`TextModel`]: a paragraph list where
//! each paragraph is a sequence of [`Element`]s, plus text lengths for
//! position estimates and a mark index filled by search.

use crate::element_area::ElementArea;
use crate::paint::DrawSurface;
use crate::position::Mark;
use crate::style::StyleKind;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// A run of non-breaking characters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    text: String,
    /// Character offset of the word in its paragraph's text
    offset: usize,
    length: usize,
}

impl Word {
    pub fn new(text: impl Into<String>, offset: usize) -> Self {
        let text = text.into();
        let length = text.chars().count();
        Word { text, offset, length }
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Length in characters
    #[inline]
    pub fn len(&self) -> usize {
        self.length
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn char_at(&self, index: usize) -> Option<char> {
        self.text.chars().nth(index)
    }

    /// Substring of `len` characters starting at character `start`
    pub fn slice(&self, start: usize, len: usize) -> &str {
        let from = self.byte_offset(start);
        let to = self.byte_offset(start + len);
        &self.text[from..to]
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }
}

/// How an image is fitted into the text area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ScalingType {
    OriginalSize,
    FitMaximum,
}

impl Default for ScalingType {
    fn default() -> Self {
        ScalingType::FitMaximum
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageElement {
    /// Identifier resolved by the draw surface
    pub id: String,
    pub width: i32,
    pub height: i32,
}

impl ImageElement {
    pub fn new(id: impl Into<String>, width: i32, height: i32) -> Self {
        ImageElement {
            id: id.into(),
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoElement {
    pub sources: Vec<String>,
}

/// Inline element measured and drawn by a host extension
pub trait ExtensionElement: fmt::Debug + Send + Sync {
    fn width(&self) -> i32;
    fn height(&self) -> i32;
    fn draw(&self, surface: &mut dyn DrawSurface, area: &ElementArea);
}

/// One item of a paragraph's element stream
#[derive(Debug, Clone)]
pub enum Element {
    Word(Word),
    /// Breakable space
    HSpace,
    /// Non-breaking space
    NBSpace,
    Image(ImageElement),
    Video(VideoElement),
    Extension(Arc<dyn ExtensionElement>),
    /// Opens or closes a style span
    Control { kind: StyleKind, start: bool },
}

impl Element {
    #[inline]
    pub fn is_word(&self) -> bool {
        matches!(self, Element::Word(_))
    }

    #[inline]
    pub fn is_nb_space(&self) -> bool {
        matches!(self, Element::NBSpace)
    }

    #[inline]
    pub fn is_image(&self) -> bool {
        matches!(self, Element::Image(_))
    }

    #[inline]
    pub fn is_style_change(&self) -> bool {
        matches!(self, Element::Control { .. })
    }

    pub fn as_word(&self) -> Option<&Word> {
        match self {
            Element::Word(word) => Some(word),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParagraphKind {
    Text,
    /// Empty paragraph separating sections; pages never run across it
    EndOfSection,
}

#[derive(Debug, Clone)]
pub struct Paragraph {
    pub kind: ParagraphKind,
    pub elements: Vec<Element>,
    /// Length of the paragraph's text in characters
    pub text_length: usize,
}

impl Paragraph {
    pub fn new(kind: ParagraphKind, elements: Vec<Element>, text_length: usize) -> Self {
        Paragraph {
            kind,
            elements,
            text_length,
        }
    }

    pub fn end_of_section() -> Self {
        Paragraph::new(ParagraphKind::EndOfSection, Vec::new(), 0)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Document collaborator consumed by the view
pub trait TextModel: Send {
    fn paragraph_count(&self) -> usize;

    fn paragraph(&self, index: usize) -> Option<&Paragraph>;

    /// Total text length of paragraphs `0..index`
    fn text_length_up_to(&self, index: usize) -> usize;

    /// Index of the paragraph holding character `length` of the whole text,
    /// clamped to the last paragraph
    fn find_paragraph_by_text_length(&self, length: usize) -> usize;

    /// Current search marks in document order
    fn marks(&self) -> &[Mark];

    /// Replaces the marks with the matches of `text` in paragraphs `from..to`
    fn search(&mut self, text: &str, from: usize, to: usize, ignore_case: bool) -> usize;

    fn remove_all_marks(&mut self);

    fn first_mark(&self) -> Option<Mark> {
        self.marks().iter().min_by(|a, b| a.compare_start(b)).copied()
    }

    fn last_mark(&self) -> Option<Mark> {
        self.marks().iter().max_by(|a, b| a.compare_start(b)).copied()
    }

    /// First mark at or after `position`
    fn next_mark(&self, position: &Mark) -> Option<Mark> {
        self.marks()
            .iter()
            .filter(|mark| mark.compare_start(position) != Ordering::Less)
            .min_by(|a, b| a.compare_start(b))
            .copied()
    }

    /// Last mark strictly before `position`
    fn previous_mark(&self, position: &Mark) -> Option<Mark> {
        self.marks()
            .iter()
            .filter(|mark| mark.compare_start(position) == Ordering::Less)
            .max_by(|a, b| a.compare_start(b))
            .copied()
    }

    /// Marks of paragraph `paragraph`
    fn paragraph_marks(&self, paragraph: usize) -> Vec<Mark> {
        self.marks()
            .iter()
            .filter(|mark| mark.paragraph == paragraph)
            .copied()
            .collect()
    }
}

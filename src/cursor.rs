//! # Cursors
//!
//! [`ParagraphCursor`] is a borrowed view over one paragraph of the model.
//! [`WordCursor`] is a plain value: a position (or nothing) that is moved
//! against a model passed in by the caller. Pages hold word cursors, so
//! copying one never aliases another page's state.

use crate::model::{Element, Paragraph, ParagraphKind, TextModel};
use crate::position::{Mark, Position};

/// Lazy view over a paragraph's element sequence
#[derive(Clone, Copy)]
pub struct ParagraphCursor<'m> {
    index: usize,
    paragraph: &'m Paragraph,
    model: &'m dyn TextModel,
}

impl<'m> ParagraphCursor<'m> {
    /// Cursor over paragraph `index`, if it exists
    pub fn new(model: &'m dyn TextModel, index: usize) -> Option<Self> {
        model.paragraph(index).map(|paragraph| ParagraphCursor {
            index,
            paragraph,
            model,
        })
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.paragraph.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.paragraph.is_empty()
    }

    #[inline]
    pub fn element(&self, index: usize) -> Option<&'m Element> {
        self.paragraph.elements.get(index)
    }

    pub fn elements(&self) -> &'m [Element] {
        &self.paragraph.elements
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.model.paragraph_count()
    }

    pub fn is_end_of_section(&self) -> bool {
        self.paragraph.kind == ParagraphKind::EndOfSection
    }

    pub fn next(&self) -> Option<ParagraphCursor<'m>> {
        ParagraphCursor::new(self.model, self.index + 1)
    }

    pub fn previous(&self) -> Option<ParagraphCursor<'m>> {
        if self.index == 0 {
            None
        } else {
            ParagraphCursor::new(self.model, self.index - 1)
        }
    }
}

impl std::fmt::Debug for ParagraphCursor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParagraphCursor")
            .field("index", &self.index)
            .field("len", &self.len())
            .finish()
    }
}

/// A position in the document, or the null cursor.
///
/// The null cursor means "not computed yet" and is never laid out from.
/// Ordering puts the null cursor before every position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WordCursor {
    position: Option<Position>,
}

impl WordCursor {
    pub const NULL: WordCursor = WordCursor { position: None };

    pub fn new(position: Position) -> Self {
        WordCursor {
            position: Some(position),
        }
    }

    /// Start of paragraph `index`
    pub fn at_paragraph(index: usize) -> Self {
        WordCursor::new(Position::paragraph_start(index))
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.position.is_none()
    }

    #[inline]
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn paragraph_index(&self) -> Option<usize> {
        self.position.map(|p| p.paragraph)
    }

    pub fn element_index(&self) -> usize {
        self.position.map_or(0, |p| p.element)
    }

    pub fn char_index(&self) -> usize {
        self.position.map_or(0, |p| p.char_index)
    }

    pub fn reset(&mut self) {
        self.position = None;
    }

    pub fn set(&mut self, other: &WordCursor) {
        self.position = other.position;
    }

    pub fn paragraph<'m>(&self, model: &'m dyn TextModel) -> Option<ParagraphCursor<'m>> {
        self.position
            .and_then(|p| ParagraphCursor::new(model, p.paragraph))
    }

    pub fn same_position_as(&self, other: &WordCursor) -> bool {
        match (self.position, other.position) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    pub fn is_start_of_paragraph(&self) -> bool {
        matches!(self.position, Some(p) if p.element == 0 && p.char_index == 0)
    }

    pub fn is_end_of_paragraph(&self, model: &dyn TextModel) -> bool {
        match self.paragraph(model) {
            Some(paragraph) => self.element_index() == paragraph.len(),
            None => false,
        }
    }

    pub fn is_start_of_text(&self) -> bool {
        self.is_start_of_paragraph() && self.paragraph_index() == Some(0)
    }

    pub fn is_end_of_text(&self, model: &dyn TextModel) -> bool {
        match self.paragraph(model) {
            Some(paragraph) => paragraph.is_last() && self.element_index() == paragraph.len(),
            None => false,
        }
    }

    /// Moves to the start of the next paragraph; false at the last one
    pub fn next_paragraph(&mut self, model: &dyn TextModel) -> bool {
        match self.paragraph(model).and_then(|p| p.next()) {
            Some(next) => {
                self.position = Some(Position::paragraph_start(next.index()));
                true
            }
            None => false,
        }
    }

    /// Moves to the start of the previous paragraph; false at the first one
    pub fn previous_paragraph(&mut self, model: &dyn TextModel) -> bool {
        match self.paragraph(model).and_then(|p| p.previous()) {
            Some(previous) => {
                self.position = Some(Position::paragraph_start(previous.index()));
                true
            }
            None => false,
        }
    }

    /// Moves to the start of paragraph `index`, clamped to the model.
    /// Works on a null cursor too.
    pub fn move_to_paragraph(&mut self, model: &dyn TextModel, index: usize) {
        let count = model.paragraph_count();
        if count == 0 {
            self.position = None;
            return;
        }
        self.position = Some(Position::paragraph_start(index.min(count - 1)));
    }

    pub fn move_to_paragraph_start(&mut self) {
        if let Some(p) = self.position.as_mut() {
            p.element = 0;
            p.char_index = 0;
        }
    }

    pub fn move_to_paragraph_end(&mut self, model: &dyn TextModel) {
        if let Some(len) = self.paragraph(model).map(|p| p.len()) {
            if let Some(p) = self.position.as_mut() {
                p.element = len;
                p.char_index = 0;
            }
        }
    }

    /// Moves inside the current paragraph. Out-of-range element indices clamp
    /// to the paragraph end; a char index is kept only inside a word.
    pub fn move_to(&mut self, model: &dyn TextModel, element: usize, char_index: usize) {
        let Some(paragraph) = self.paragraph(model) else {
            return;
        };
        let (element, char_index) = if element > paragraph.len() {
            (paragraph.len(), 0)
        } else {
            let char_index = match paragraph.element(element) {
                Some(Element::Word(word)) if char_index <= word.len() => char_index,
                _ => 0,
            };
            (element, char_index)
        };
        if let Some(p) = self.position.as_mut() {
            p.element = element;
            p.char_index = char_index;
        }
    }

    /// Re-clamps the cursor after the model changed underneath it
    pub fn rebuild(&mut self, model: &dyn TextModel) {
        let Some(position) = self.position else {
            return;
        };
        if position.paragraph >= model.paragraph_count() {
            self.move_to_paragraph(model, position.paragraph);
            self.move_to_paragraph_end(model);
        } else {
            self.move_to(model, position.element, position.char_index);
        }
    }

    /// Zero-length mark at the first word at or after the cursor
    pub fn mark(&self, model: &dyn TextModel) -> Option<Mark> {
        let paragraph = self.paragraph(model)?;
        let word = paragraph.elements()[self.element_index().min(paragraph.len())..]
            .iter()
            .find_map(Element::as_word);
        Some(match word {
            Some(word) => Mark::new(paragraph.index(), word.offset(), 0),
            None => Mark::new(paragraph.index() + 1, 0, 0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text_model::PlainTextModel;

    fn model() -> PlainTextModel {
        PlainTextModel::from_paragraphs(&["AAAA BBBB", "CCCC", "DDDD EEEE FFFF"])
    }

    #[test]
    fn test_null_cursor() {
        let model = model();
        let mut cursor = WordCursor::NULL;
        assert!(cursor.is_null());
        assert!(!cursor.is_end_of_text(&model));
        assert!(!cursor.next_paragraph(&model));
        assert!(cursor.mark(&model).is_none());
        cursor.move_to(&model, 1, 0);
        assert!(cursor.is_null());
        cursor.move_to_paragraph(&model, 1);
        assert_eq!(cursor.position(), Some(Position::new(1, 0, 0)));
    }

    #[test]
    fn test_paragraph_navigation() {
        let model = model();
        let mut cursor = WordCursor::at_paragraph(0);
        assert!(cursor.is_start_of_text());
        assert!(cursor.next_paragraph(&model));
        assert!(cursor.next_paragraph(&model));
        assert!(!cursor.next_paragraph(&model));
        cursor.move_to_paragraph_end(&model);
        assert!(cursor.is_end_of_paragraph(&model));
        assert!(cursor.is_end_of_text(&model));
        assert!(cursor.previous_paragraph(&model));
        assert_eq!(cursor.position(), Some(Position::new(1, 0, 0)));
    }

    #[test]
    fn test_move_to_clamps() {
        let model = model();
        let mut cursor = WordCursor::at_paragraph(0);
        cursor.move_to(&model, 2, 3);
        assert_eq!(cursor.position(), Some(Position::new(0, 2, 3)));
        cursor.move_to(&model, 2, 9);
        assert_eq!(cursor.position(), Some(Position::new(0, 2, 0)));
        cursor.move_to(&model, 1, 1);
        assert_eq!(cursor.position(), Some(Position::new(0, 1, 0)));
        cursor.move_to(&model, 40, 1);
        assert_eq!(cursor.position(), Some(Position::new(0, 3, 0)));
    }

    #[test]
    fn test_cursor_ordering_and_copy() {
        let a = WordCursor::new(Position::new(0, 2, 0));
        let mut b = a;
        b.move_to_paragraph_start();
        assert!(b < a);
        assert!(WordCursor::NULL < b);
        assert!(!WordCursor::NULL.same_position_as(&WordCursor::NULL));
    }

    #[test]
    fn test_mark_of_cursor() {
        let model = model();
        let cursor = WordCursor::new(Position::new(2, 1, 0));
        assert_eq!(cursor.mark(&model), Some(Mark::new(2, 5, 0)));
        let end = WordCursor::new(Position::new(0, 3, 0));
        assert_eq!(end.mark(&model), Some(Mark::new(1, 0, 0)));
    }

    #[test]
    fn test_rebuild_after_shrink() {
        let model = PlainTextModel::from_paragraphs(&["one two"]);
        let mut cursor = WordCursor::new(Position::new(4, 1, 0));
        cursor.rebuild(&model);
        assert_eq!(cursor.position(), Some(Position::new(0, 3, 0)));
    }
}

//! # Element Metrics
//!
//! Pixel measurement of elements. Glyph measurement itself belongs to the
//! platform and comes in through [`TextMeasurer`]; [`ElementMetrics`] turns
//! that into widths, heights and descents for every element kind so the line
//! breaker and the area renderer agree on the same numbers.

use crate::model::{Element, ImageElement, ScalingType, Word};
use crate::style::TextStyle;

pub const HYPHEN: &str = "-";

/// Measures text for a resolved style
pub trait TextMeasurer: Send + Sync {
    fn string_width(&self, text: &str, style: &TextStyle) -> i32;

    fn space_width(&self, style: &TextStyle) -> i32 {
        self.string_width(" ", style)
    }

    /// Ascent plus descent of a line of text
    fn string_height(&self, style: &TextStyle) -> i32;

    fn descent(&self, style: &TextStyle) -> i32;
}

/// Every character advances by a fixed share of the font size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonospaceMeasurer {
    /// Advance as a percentage of the font size
    pub advance_percent: i32,
}

impl MonospaceMeasurer {
    pub fn new(advance_percent: i32) -> Self {
        MonospaceMeasurer { advance_percent }
    }
}

impl Default for MonospaceMeasurer {
    fn default() -> Self {
        MonospaceMeasurer::new(100)
    }
}

impl TextMeasurer for MonospaceMeasurer {
    fn string_width(&self, text: &str, style: &TextStyle) -> i32 {
        let chars = text.chars().count() as i32;
        chars * style.font_size * self.advance_percent / 100
    }

    fn string_height(&self, style: &TextStyle) -> i32 {
        style.font_size
    }

    fn descent(&self, style: &TextStyle) -> i32 {
        style.font_size / 5
    }
}

/// Element measurement against a text area
#[derive(Clone, Copy)]
pub struct ElementMetrics<'a> {
    pub measurer: &'a dyn TextMeasurer,
    pub image_scaling: ScalingType,
    /// Width of one text column
    pub area_width: i32,
    pub area_height: i32,
}

impl<'a> ElementMetrics<'a> {
    pub fn space_width(&self, style: &TextStyle) -> i32 {
        self.measurer.space_width(style)
    }

    /// Width of `len` characters of `word` from `start`, optionally followed
    /// by a hyphen
    pub fn word_width(&self, word: &Word, style: &TextStyle, start: usize, len: usize, add_hyphen: bool) -> i32 {
        let mut width = self.measurer.string_width(word.slice(start, len), style);
        if add_hyphen {
            width += self.measurer.string_width(HYPHEN, style);
        }
        width
    }

    /// Height of a word line box, including line spacing
    pub fn word_height(&self, style: &TextStyle) -> i32 {
        self.measurer.string_height(style) * style.line_space_percent / 100 + style.vertical_align
    }

    /// Displayed size of an image
    pub fn image_size(&self, image: &ImageElement) -> (i32, i32) {
        let (width, height) = (image.width.max(0), image.height.max(0));
        match self.image_scaling {
            ScalingType::OriginalSize => (width, height),
            ScalingType::FitMaximum => {
                if width == 0 || height == 0 {
                    return (width, height);
                }
                let max_width = self.area_width.max(1);
                let max_height = self.area_height.max(1);
                if width <= max_width && height <= max_height {
                    return (width, height);
                }
                // Integer scale by the tighter of the two ratios.
                if width as i64 * max_height as i64 >= height as i64 * max_width as i64 {
                    (max_width, (height as i64 * max_width as i64 / width as i64) as i32)
                } else {
                    ((width as i64 * max_height as i64 / height as i64) as i32, max_height)
                }
            }
        }
    }

    pub fn video_size(&self) -> (i32, i32) {
        (self.area_width.min(300), self.area_height.min(200))
    }

    /// Width of the element from character `char_index` on
    pub fn element_width(&self, element: &Element, char_index: usize, style: &TextStyle) -> i32 {
        match element {
            Element::Word(word) => {
                let start = char_index.min(word.len());
                self.word_width(word, style, start, word.len() - start, false)
            }
            Element::NBSpace => self.space_width(style),
            Element::Image(image) => self.image_size(image).0,
            Element::Video(_) => self.video_size().0,
            Element::Extension(extension) => extension.width(),
            Element::HSpace | Element::Control { .. } => 0,
        }
    }

    pub fn element_height(&self, element: &Element, style: &TextStyle) -> i32 {
        match element {
            Element::Word(_) => self.word_height(style),
            Element::Image(image) => self.image_size(image).1,
            Element::Video(_) => self.video_size().1,
            Element::Extension(extension) => extension.height(),
            Element::HSpace | Element::NBSpace | Element::Control { .. } => 0,
        }
    }

    pub fn element_descent(&self, element: &Element, style: &TextStyle) -> i32 {
        match element {
            Element::Word(_) => self.measurer.descent(style),
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(font_size: i32) -> TextStyle {
        TextStyle {
            font_size,
            ..TextStyle::default()
        }
    }

    fn metrics(measurer: &MonospaceMeasurer, scaling: ScalingType) -> ElementMetrics<'_> {
        ElementMetrics {
            measurer,
            image_scaling: scaling,
            area_width: 200,
            area_height: 100,
        }
    }

    #[test]
    fn test_monospace_measurer() {
        let measurer = MonospaceMeasurer::default();
        let style = style(10);
        assert_eq!(measurer.string_width("abcd", &style), 40);
        assert_eq!(measurer.space_width(&style), 10);
        assert_eq!(measurer.string_height(&style), 10);
        assert_eq!(measurer.descent(&style), 2);
        assert_eq!(MonospaceMeasurer::new(50).string_width("abcd", &style), 20);
    }

    #[test]
    fn test_word_width_with_hyphen() {
        let measurer = MonospaceMeasurer::default();
        let metrics = metrics(&measurer, ScalingType::FitMaximum);
        let word = Word::new("hyphenation", 0);
        let style = style(10);
        assert_eq!(metrics.word_width(&word, &style, 0, 6, false), 60);
        assert_eq!(metrics.word_width(&word, &style, 0, 6, true), 70);
        assert_eq!(metrics.element_width(&Element::Word(word), 6, &style), 50);
    }

    #[test]
    fn test_image_fit() {
        let measurer = MonospaceMeasurer::default();
        let fit = metrics(&measurer, ScalingType::FitMaximum);
        assert_eq!(fit.image_size(&ImageElement::new("a", 100, 50)), (100, 50));
        assert_eq!(fit.image_size(&ImageElement::new("b", 400, 100)), (200, 50));
        assert_eq!(fit.image_size(&ImageElement::new("c", 100, 400)), (25, 100));
        let original = metrics(&measurer, ScalingType::OriginalSize);
        assert_eq!(original.image_size(&ImageElement::new("b", 400, 100)), (400, 100));
    }

    #[test]
    fn test_heights_and_descents() {
        let measurer = MonospaceMeasurer::default();
        let metrics = metrics(&measurer, ScalingType::FitMaximum);
        let style = TextStyle {
            font_size: 10,
            line_space_percent: 150,
            ..TextStyle::default()
        };
        let word = Element::Word(Word::new("x", 0));
        assert_eq!(metrics.element_height(&word, &style), 15);
        assert_eq!(metrics.element_descent(&word, &style), 2);
        assert_eq!(metrics.element_height(&Element::HSpace, &style), 0);
        assert_eq!(metrics.element_width(&Element::NBSpace, 0, &style), 10);
        assert_eq!(metrics.video_size(), (200, 100));
    }
}

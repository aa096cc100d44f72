//! Paginated text layout.
//!
//! A [`TextView`] cuts a paragraph-structured [`TextModel`] into screen-sized
//! pages, keeps a window of three pages around the one on screen and turns
//! them on request. Painting goes through the [`DrawSurface`] trait, so the
//! host decides what a glyph or a rectangle becomes.

pub mod area_renderer;
pub mod config;
pub mod cursor;
pub mod element_area;
pub mod error;
pub mod find;
pub mod highlighting;
pub mod hyphenator;
pub mod layout_strategy;
pub mod line_breaking;
pub mod line_info;
pub mod metrics;
pub mod model;
pub mod page;
pub mod page_layout;
pub mod paint;
pub mod painter;
pub mod position;
pub mod selection;
pub mod shared;
pub mod style;
pub mod text_model;
pub mod view;

pub use config::{ColorProfile, ViewConfig};
pub use cursor::{ParagraphCursor, WordCursor};
pub use element_area::{AreaKind, ElementArea, ElementAreaVector, Hull};
pub use error::{LayoutError, Result};
pub use highlighting::{HighlightKind, HighlightSet, Highlighting};
pub use hyphenator::{DictionaryHyphenator, ExplicitHyphenator, HyphenationInfo, Hyphenator, NoHyphenation};
pub use layout_strategy::{HorizontalLayout, LayoutMode, LayoutStrategy, VerticalLayout};
pub use metrics::{MonospaceMeasurer, TextMeasurer};
pub use model::{Element, ExtensionElement, ImageElement, Paragraph, ParagraphKind, TextModel, VideoElement, Word};
pub use page::{PageIndex, PaintState, ScrollingMode};
pub use paint::{DrawCommand, DrawSurface, Point, Rect, RecordingSurface};
pub use position::{Mark, Position};
pub use selection::SelectionHandle;
pub use shared::SharedTextView;
pub use style::{Alignment, Color, DefaultStyleResolver, StyleKind, StyleResolver, TextStyle};
pub use text_model::{PlainTextModel, TextModelBuilder};
pub use view::{PagePosition, TextView};

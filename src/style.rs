//! # Style Resolution
//!
//! Provides the resolved style record used for measurement and placement:
//! - [`TextStyle`], the flat record of font, spacing, indent and alignment
//! - [`StyleResolver`], the collaborator that maps a style-change element to a record
//! - [`StyleSnapshot`], a persistent style stack captured at line starts and
//!   used as part of the line cache key

use crate::error::{LayoutError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// An opaque RGB colour, serialized as `#RRGGBB`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }

    /// Parses `#RRGGBB` (the leading `#` is optional)
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(LayoutError::InvalidColor(hex.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| LayoutError::InvalidColor(hex.to_string()))
        };
        Ok(Color::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Color {
    type Error = LayoutError;

    fn try_from(value: String) -> Result<Self> {
        Color::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Horizontal alignment of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Alignment {
    Left,
    Right,
    Center,
    Justify,
}

impl Default for Alignment {
    fn default() -> Self {
        Alignment::Justify
    }
}

/// Identifies a style-control span in the element stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StyleKind(pub u16);

impl StyleKind {
    pub const REGULAR: StyleKind = StyleKind(0);
    pub const TITLE: StyleKind = StyleKind(1);
    pub const SUBTITLE: StyleKind = StyleKind(2);
    pub const EMPHASIS: StyleKind = StyleKind(3);
    pub const STRONG: StyleKind = StyleKind(4);
    pub const CODE: StyleKind = StyleKind(5);
    pub const HYPERLINK: StyleKind = StyleKind(6);
    pub const CITE: StyleKind = StyleKind(7);
    pub const CENTERED: StyleKind = StyleKind(8);
}

/// A fully resolved style record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_family: String,
    /// Font size in pixels
    pub font_size: i32,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strike_through: bool,
    /// Line height as a percentage of the font height
    pub line_space_percent: i32,
    pub space_before: i32,
    pub space_after: i32,
    pub left_indent: i32,
    pub right_indent: i32,
    pub first_line_indent: i32,
    pub alignment: Alignment,
    pub allow_hyphenations: bool,
    /// Baseline shift, positive raises the text
    pub vertical_align: i32,
    pub color: Color,
    pub hyperlink: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        TextStyle {
            font_family: "sans-serif".to_string(),
            font_size: 16,
            bold: false,
            italic: false,
            underline: false,
            strike_through: false,
            line_space_percent: 100,
            space_before: 0,
            space_after: 0,
            left_indent: 0,
            right_indent: 0,
            first_line_indent: 0,
            alignment: Alignment::default(),
            allow_hyphenations: true,
            vertical_align: 0,
            color: Color::BLACK,
            hyperlink: false,
        }
    }
}

/// Partial override applied on top of a parent style
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleDecoration {
    pub font_family: Option<String>,
    /// Font size as a percentage of the parent size
    pub font_size_percent: Option<i32>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub strike_through: Option<bool>,
    pub line_space_percent: Option<i32>,
    pub space_before: Option<i32>,
    pub space_after: Option<i32>,
    pub left_indent: Option<i32>,
    pub right_indent: Option<i32>,
    pub first_line_indent: Option<i32>,
    pub alignment: Option<Alignment>,
    pub allow_hyphenations: Option<bool>,
    pub vertical_align: Option<i32>,
    pub color: Option<Color>,
    pub hyperlink: Option<bool>,
}

impl StyleDecoration {
    /// Resolves this decoration against its parent
    pub fn apply(&self, parent: &TextStyle) -> TextStyle {
        let mut style = parent.clone();
        if let Some(family) = &self.font_family {
            style.font_family = family.clone();
        }
        if let Some(percent) = self.font_size_percent {
            style.font_size = (parent.font_size * percent / 100).max(1);
        }
        style.bold = self.bold.unwrap_or(parent.bold);
        style.italic = self.italic.unwrap_or(parent.italic);
        style.underline = self.underline.unwrap_or(parent.underline);
        style.strike_through = self.strike_through.unwrap_or(parent.strike_through);
        style.line_space_percent = self.line_space_percent.unwrap_or(parent.line_space_percent);
        style.space_before = self.space_before.unwrap_or(parent.space_before);
        style.space_after = self.space_after.unwrap_or(parent.space_after);
        style.left_indent = self.left_indent.unwrap_or(parent.left_indent);
        style.right_indent = self.right_indent.unwrap_or(parent.right_indent);
        style.first_line_indent = self.first_line_indent.unwrap_or(parent.first_line_indent);
        style.alignment = self.alignment.unwrap_or(parent.alignment);
        style.allow_hyphenations = self.allow_hyphenations.unwrap_or(parent.allow_hyphenations);
        style.vertical_align = self.vertical_align.unwrap_or(parent.vertical_align);
        style.color = self.color.unwrap_or(parent.color);
        style.hyperlink = self.hyperlink.unwrap_or(parent.hyperlink);
        style
    }
}

/// Maps style-control spans to resolved style records
pub trait StyleResolver: Send + Sync {
    /// Style in effect at the start of every paragraph
    fn base_style(&self) -> TextStyle;

    /// Style in effect inside a span of `kind` opened under `parent`
    fn resolve(&self, parent: &TextStyle, kind: StyleKind) -> TextStyle;
}

/// Table-driven resolver: a base style plus one decoration per kind
#[derive(Debug, Clone)]
pub struct DefaultStyleResolver {
    base: TextStyle,
    decorations: HashMap<StyleKind, StyleDecoration>,
}

impl DefaultStyleResolver {
    /// Creates a resolver with no decorations
    pub fn new(base: TextStyle) -> Self {
        DefaultStyleResolver {
            base,
            decorations: HashMap::new(),
        }
    }

    /// Creates a resolver with the stock decorations for the built-in kinds
    pub fn with_defaults(base: TextStyle) -> Self {
        let mut resolver = DefaultStyleResolver::new(base);
        resolver.set_decoration(
            StyleKind::TITLE,
            StyleDecoration {
                font_size_percent: Some(150),
                bold: Some(true),
                alignment: Some(Alignment::Center),
                space_after: Some(8),
                allow_hyphenations: Some(false),
                ..Default::default()
            },
        );
        resolver.set_decoration(
            StyleKind::SUBTITLE,
            StyleDecoration {
                font_size_percent: Some(120),
                bold: Some(true),
                space_after: Some(4),
                ..Default::default()
            },
        );
        resolver.set_decoration(
            StyleKind::EMPHASIS,
            StyleDecoration {
                italic: Some(true),
                ..Default::default()
            },
        );
        resolver.set_decoration(
            StyleKind::STRONG,
            StyleDecoration {
                bold: Some(true),
                ..Default::default()
            },
        );
        resolver.set_decoration(
            StyleKind::CODE,
            StyleDecoration {
                font_family: Some("monospace".to_string()),
                allow_hyphenations: Some(false),
                ..Default::default()
            },
        );
        resolver.set_decoration(
            StyleKind::HYPERLINK,
            StyleDecoration {
                underline: Some(true),
                hyperlink: Some(true),
                ..Default::default()
            },
        );
        resolver.set_decoration(
            StyleKind::CITE,
            StyleDecoration {
                italic: Some(true),
                left_indent: Some(20),
                right_indent: Some(20),
                ..Default::default()
            },
        );
        resolver.set_decoration(
            StyleKind::CENTERED,
            StyleDecoration {
                alignment: Some(Alignment::Center),
                ..Default::default()
            },
        );
        resolver
    }

    pub fn set_decoration(&mut self, kind: StyleKind, decoration: StyleDecoration) {
        self.decorations.insert(kind, decoration);
    }

    pub fn base(&self) -> &TextStyle {
        &self.base
    }

    pub fn set_base(&mut self, base: TextStyle) {
        self.base = base;
    }
}

impl Default for DefaultStyleResolver {
    fn default() -> Self {
        DefaultStyleResolver::with_defaults(TextStyle::default())
    }
}

impl StyleResolver for DefaultStyleResolver {
    fn base_style(&self) -> TextStyle {
        self.base.clone()
    }

    fn resolve(&self, parent: &TextStyle, kind: StyleKind) -> TextStyle {
        match self.decorations.get(&kind) {
            Some(decoration) => decoration.apply(parent),
            None => parent.clone(),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct StyleNode {
    style: TextStyle,
    kind: Option<StyleKind>,
    parent: Option<StyleSnapshot>,
}

/// Immutable style stack.
///
/// Cloning is cheap and equality/hash cover the whole stack, which is what the
/// line cache needs for a style fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StyleSnapshot(Arc<StyleNode>);

impl StyleSnapshot {
    /// A stack holding only the paragraph base style
    pub fn base(style: TextStyle) -> Self {
        StyleSnapshot(Arc::new(StyleNode {
            style,
            kind: None,
            parent: None,
        }))
    }

    /// Base style of the resolver
    pub fn from_resolver(resolver: &dyn StyleResolver) -> Self {
        StyleSnapshot::base(resolver.base_style())
    }

    #[inline]
    pub fn style(&self) -> &TextStyle {
        &self.0.style
    }

    /// Kind of the innermost open span
    pub fn kind(&self) -> Option<StyleKind> {
        self.0.kind
    }

    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut node = &self.0;
        while let Some(parent) = &node.parent {
            depth += 1;
            node = &parent.0;
        }
        depth
    }

    /// Opens a span
    pub fn push(&self, kind: StyleKind, style: TextStyle) -> Self {
        StyleSnapshot(Arc::new(StyleNode {
            style,
            kind: Some(kind),
            parent: Some(self.clone()),
        }))
    }

    /// Closes the innermost span; the base style is never popped
    pub fn pop(&self) -> Self {
        match &self.0.parent {
            Some(parent) => parent.clone(),
            None => self.clone(),
        }
    }

    /// Applies a style-control element
    pub fn apply(&self, resolver: &dyn StyleResolver, kind: StyleKind, start: bool) -> Self {
        if start {
            self.push(kind, resolver.resolve(self.style(), kind))
        } else {
            self.pop()
        }
    }
}

//! # Layout Strategies
//!
//! Everything that differs between the ordinary horizontal page and the
//! rotated, grid-ruled vertical page. A strategy is picked once from
//! [`LayoutMode`] and handed to the page builder, the area renderer and the
//! painter.

use crate::config::ViewConfig;
use crate::error::{LayoutError, Result};
use crate::line_info::LineInfo;
use crate::page::PageGeometry;
use crate::paint::{DrawSurface, Rect, Rotation};
use crate::style::{Color, TextStyle};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Selects the layout strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutMode {
    Horizontal,
    /// Rotated page with one text line per grid row
    Vertical { line_height: i32, frame_width: i32 },
}

impl Default for LayoutMode {
    fn default() -> Self {
        LayoutMode::Horizontal
    }
}

impl LayoutMode {
    pub fn validate(&self) -> Result<()> {
        match *self {
            LayoutMode::Horizontal => Ok(()),
            LayoutMode::Vertical { line_height, frame_width } => {
                if line_height <= 0 {
                    return Err(LayoutError::InvalidConfig(format!(
                        "vertical line height must be positive, got {}",
                        line_height
                    )));
                }
                if frame_width < 0 {
                    return Err(LayoutError::InvalidConfig(format!(
                        "vertical frame width must not be negative, got {}",
                        frame_width
                    )));
                }
                Ok(())
            }
        }
    }

    pub fn strategy(&self) -> Box<dyn LayoutStrategy> {
        match *self {
            LayoutMode::Horizontal => Box::new(HorizontalLayout),
            LayoutMode::Vertical { line_height, frame_width } => Box::new(VerticalLayout {
                line_height,
                frame_width,
            }),
        }
    }
}

/// Geometry policy of a page
pub trait LayoutStrategy: fmt::Debug + Send + Sync {
    /// Column size of the text frame
    fn column_geometry(&self, config: &ViewConfig) -> PageGeometry;

    /// Top-left corner of the text frame, in frame coordinates
    fn origin(&self, config: &ViewConfig) -> (i32, i32);

    /// Page budget a line uses, not counting the gap after it
    fn line_extent(&self, line: &LineInfo) -> i32;

    /// Gap after the last line of a paragraph
    fn paragraph_space_after(&self, style: &TextStyle) -> i32;

    /// Distance from the top of a line to the top of the next one
    fn line_advance(&self, line: &LineInfo) -> i32 {
        self.line_extent(line) + line.vspace_after
    }

    /// Baseline of a line whose box starts at `top`, never below `bottom`
    fn baseline(&self, line: &LineInfo, top: i32, bottom: i32) -> i32;

    /// Rotation the surface applies before drawing the frame
    fn rotation(&self, _config: &ViewConfig) -> Option<Rotation> {
        None
    }

    /// Maps a surface point into frame coordinates
    fn to_frame(&self, _config: &ViewConfig, x: i32, y: i32) -> (i32, i32) {
        (x, y)
    }

    /// Ornaments drawn under the text
    fn frame_decoration(&self, _surface: &mut dyn DrawSurface, _config: &ViewConfig, _color: Color) {}
}

/// Left-to-right lines stacked top to bottom
#[derive(Debug, Clone, Copy, Default)]
pub struct HorizontalLayout;

impl LayoutStrategy for HorizontalLayout {
    fn column_geometry(&self, config: &ViewConfig) -> PageGeometry {
        PageGeometry {
            column_width: config.column_width(),
            height: config.text_area_height(),
            two_column: config.two_column_view,
        }
    }

    fn origin(&self, config: &ViewConfig) -> (i32, i32) {
        (config.left_margin, config.top_margin)
    }

    #[inline]
    fn line_extent(&self, line: &LineInfo) -> i32 {
        line.height + line.descent
    }

    fn paragraph_space_after(&self, style: &TextStyle) -> i32 {
        style.space_after
    }

    fn baseline(&self, line: &LineInfo, top: i32, bottom: i32) -> i32 {
        (top + line.height).min(bottom)
    }
}

/// Quarter-turned frame with a fixed line grid and ruled borders
#[derive(Debug, Clone, Copy)]
pub struct VerticalLayout {
    pub line_height: i32,
    pub frame_width: i32,
}

impl VerticalLayout {
    fn frame(&self, config: &ViewConfig) -> Rect {
        let (x, y) = self.origin(config);
        let geometry = self.column_geometry(config);
        Rect::new(x, y, geometry.column_width, geometry.height)
    }
}

impl LayoutStrategy for VerticalLayout {
    fn column_geometry(&self, config: &ViewConfig) -> PageGeometry {
        PageGeometry {
            column_width: config.height - config.top_margin - config.bottom_margin - 2 * self.frame_width,
            height: config.width - config.left_margin - config.right_margin - 2 * self.frame_width,
            two_column: false,
        }
    }

    fn origin(&self, config: &ViewConfig) -> (i32, i32) {
        (config.top_margin + self.frame_width, config.right_margin + self.frame_width)
    }

    #[inline]
    fn line_extent(&self, _line: &LineInfo) -> i32 {
        self.line_height
    }

    fn paragraph_space_after(&self, _style: &TextStyle) -> i32 {
        0
    }

    fn baseline(&self, line: &LineInfo, top: i32, bottom: i32) -> i32 {
        // Centre the glyph box in its grid row.
        let slack = (self.line_height - line.height - line.descent).max(0);
        (top + slack / 2 + line.height).min(bottom)
    }

    fn rotation(&self, config: &ViewConfig) -> Option<Rotation> {
        Some(Rotation::Clockwise { offset: config.width })
    }

    fn to_frame(&self, config: &ViewConfig, x: i32, y: i32) -> (i32, i32) {
        (y, config.width - x)
    }

    fn frame_decoration(&self, surface: &mut dyn DrawSurface, config: &ViewConfig, color: Color) {
        let frame = self.frame(config);
        let border = self.frame_width;
        surface.stroke_rect(
            Rect::new(frame.x - border, frame.y - border, frame.width + 2 * border, frame.height + 2 * border),
            color,
        );
        surface.stroke_rect(frame, color);
        let mut y = frame.y + self.line_height;
        while y < frame.bottom() {
            surface.draw_line(frame.x, y, frame.right(), y, color);
            y += self.line_height;
        }
    }
}

//! # View Configuration
//!
//! Viewport geometry, pagination options and colours. Loaded from JSON by the
//! host; every field has a default so partial documents are accepted.

use crate::error::{LayoutError, Result};
use crate::layout_strategy::LayoutMode;
use crate::model::ScalingType;
use crate::page::ScrollingMode;
use crate::paint::ColorAdjustingMode;
use crate::style::Color;
use serde::{Deserialize, Serialize};

/// Colours the view paints with besides the text colours of styles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorProfile {
    pub background: Color,
    pub selection_background: Color,
    pub selection_foreground: Option<Color>,
    pub highlight_background: Color,
    pub highlight_foreground: Option<Color>,
    /// Background of search marks inside words
    pub search_background: Color,
    pub search_foreground: Color,
    pub hyperlink: Color,
    pub video_placeholder: Color,
}

impl Default for ColorProfile {
    fn default() -> Self {
        ColorProfile {
            background: Color::WHITE,
            selection_background: Color::rgb(0x82, 0xB1, 0xFF),
            selection_foreground: None,
            highlight_background: Color::rgb(0xFF, 0xE0, 0x82),
            highlight_foreground: None,
            search_background: Color::rgb(0xFF, 0x98, 0x00),
            search_foreground: Color::BLACK,
            hyperlink: Color::rgb(0x15, 0x65, 0xC0),
            video_placeholder: Color::rgb(127, 127, 127),
        }
    }
}

/// Everything the view needs to know about its viewport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub width: i32,
    pub height: i32,
    pub left_margin: i32,
    pub right_margin: i32,
    pub top_margin: i32,
    pub bottom_margin: i32,
    pub two_column_view: bool,
    pub space_between_columns: i32,
    pub auto_hyphenation: bool,
    /// Mode used by `turn_page` when the caller does not pass one
    pub scrolling: ScrollingMode,
    pub layout: LayoutMode,
    pub image_scaling: ScalingType,
    pub image_color_adjusting: ColorAdjustingMode,
    pub colors: ColorProfile,
}

impl Default for ViewConfig {
    fn default() -> Self {
        ViewConfig {
            width: 600,
            height: 800,
            left_margin: 20,
            right_margin: 20,
            top_margin: 20,
            bottom_margin: 20,
            two_column_view: false,
            space_between_columns: 30,
            auto_hyphenation: true,
            scrolling: ScrollingMode::NoOverlapping,
            layout: LayoutMode::Horizontal,
            image_scaling: ScalingType::FitMaximum,
            image_color_adjusting: ColorAdjustingMode::None,
            colors: ColorProfile::default(),
        }
    }
}

impl ViewConfig {
    /// Viewport without margins
    pub fn with_size(width: i32, height: i32) -> Self {
        ViewConfig {
            width,
            height,
            left_margin: 0,
            right_margin: 0,
            top_margin: 0,
            bottom_margin: 0,
            ..ViewConfig::default()
        }
    }

    /// Parses and validates a JSON configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ViewConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        let margins = [
            ("left_margin", self.left_margin),
            ("right_margin", self.right_margin),
            ("top_margin", self.top_margin),
            ("bottom_margin", self.bottom_margin),
            ("space_between_columns", self.space_between_columns),
        ];
        for (name, value) in margins {
            if value < 0 {
                return Err(LayoutError::InvalidConfig(format!("{} must not be negative, got {}", name, value)));
            }
        }
        if self.text_area_width() <= 0 || self.text_area_height() <= 0 {
            return Err(LayoutError::InvalidConfig(format!(
                "text area is empty: {}x{} after margins",
                self.text_area_width(),
                self.text_area_height()
            )));
        }
        if self.two_column_view && self.column_width() <= 0 {
            return Err(LayoutError::InvalidConfig(
                "columns do not fit next to each other".to_string(),
            ));
        }
        if let ScrollingMode::ScrollPercentage(percent) = self.scrolling {
            if percent == 0 || percent > 100 {
                return Err(LayoutError::InvalidConfig(format!("scroll percentage {} out of 1..=100", percent)));
            }
        }
        self.layout.validate()
    }

    pub fn text_area_width(&self) -> i32 {
        self.width - self.left_margin - self.right_margin
    }

    pub fn text_area_height(&self) -> i32 {
        self.height - self.top_margin - self.bottom_margin
    }

    /// Width of one text column
    pub fn column_width(&self) -> i32 {
        if self.two_column_view {
            (self.text_area_width() - self.space_between_columns) / 2
        } else {
            self.text_area_width()
        }
    }
}

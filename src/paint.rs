//! # Draw Surface
//!
//! The engine issues primitives against [`DrawSurface`]; it never owns the
//! surface. [`RecordingSurface`] keeps the primitives as [`DrawCommand`]s,
//! which hosts can replay and tests can inspect.

use crate::model::{ImageElement, ScalingType};
use crate::style::{Color, TextStyle};
use serde::{Deserialize, Serialize};

/// Rectangle with inclusive pixel bounds at `x..x+width`, `y..y+height`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Rect { x, y, width, height }
    }

    /// Rectangle covering the inclusive corners
    pub fn from_corners(x_start: i32, y_start: i32, x_end: i32, y_end: i32) -> Self {
        Rect::new(x_start, y_start, x_end - x_start + 1, y_end - y_start + 1)
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Smallest rectangle covering both
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(x, y, self.right().max(other.right()) - x, self.bottom().max(other.bottom()) - y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }

    pub fn distance2(&self, x: i32, y: i32) -> i64 {
        let dx = (x - self.x) as i64;
        let dy = (y - self.y) as i64;
        dx * dx + dy * dy
    }
}

/// How image colours are adapted to the page background
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorAdjustingMode {
    None,
    DarkenToBackground,
    LightenToBackground,
}

impl Default for ColorAdjustingMode {
    fn default() -> Self {
        ColorAdjustingMode::None
    }
}

/// Frame rotation requested by a layout strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rotation {
    /// Quarter turn clockwise around the top-left corner, shifted right by `offset`
    Clockwise { offset: i32 },
}

/// Platform drawing surface
pub trait DrawSurface {
    fn clear(&mut self, color: Color);

    /// Draws `text` with its baseline at `y`
    fn draw_text(&mut self, x: i32, y: i32, text: &str, style: &TextStyle, color: Color);

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color);

    fn fill_rect(&mut self, rect: Rect, color: Color, alpha: u8);

    fn stroke_rect(&mut self, rect: Rect, color: Color);

    fn fill_polygon(&mut self, points: &[Point], color: Color);

    fn stroke_polygon(&mut self, points: &[Point], color: Color);

    /// Draws an image with its bottom-left corner at `(x, y)`
    fn draw_image(
        &mut self,
        x: i32,
        y: i32,
        image: &ImageElement,
        size: (i32, i32),
        scaling: ScalingType,
        adjust: ColorAdjustingMode,
    );

    fn push_rotation(&mut self, _rotation: Rotation) {}

    fn pop_rotation(&mut self) {}
}

/// A recorded draw primitive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    Clear(Color),
    Text {
        x: i32,
        y: i32,
        text: String,
        color: Color,
    },
    Line {
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        color: Color,
    },
    FillRect {
        rect: Rect,
        color: Color,
        alpha: u8,
    },
    StrokeRect {
        rect: Rect,
        color: Color,
    },
    FillPolygon {
        points: Vec<Point>,
        color: Color,
    },
    StrokePolygon {
        points: Vec<Point>,
        color: Color,
    },
    Image {
        x: i32,
        y: i32,
        id: String,
        width: i32,
        height: i32,
        adjust: ColorAdjustingMode,
    },
    PushRotation(Rotation),
    PopRotation,
}

/// Surface that records every primitive
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        RecordingSurface::default()
    }

    /// Text runs in drawing order
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }
}

impl DrawSurface for RecordingSurface {
    fn clear(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear(color));
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str, _style: &TextStyle, color: Color) {
        self.commands.push(DrawCommand::Text {
            x,
            y,
            text: text.to_string(),
            color,
        });
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        self.commands.push(DrawCommand::Line { x0, y0, x1, y1, color });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color, alpha: u8) {
        self.commands.push(DrawCommand::FillRect { rect, color, alpha });
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::StrokeRect { rect, color });
    }

    fn fill_polygon(&mut self, points: &[Point], color: Color) {
        self.commands.push(DrawCommand::FillPolygon {
            points: points.to_vec(),
            color,
        });
    }

    fn stroke_polygon(&mut self, points: &[Point], color: Color) {
        self.commands.push(DrawCommand::StrokePolygon {
            points: points.to_vec(),
            color,
        });
    }

    fn draw_image(
        &mut self,
        x: i32,
        y: i32,
        image: &ImageElement,
        size: (i32, i32),
        _scaling: ScalingType,
        adjust: ColorAdjustingMode,
    ) {
        self.commands.push(DrawCommand::Image {
            x,
            y,
            id: image.id.clone(),
            width: size.0,
            height: size.1,
            adjust,
        });
    }

    fn push_rotation(&mut self, rotation: Rotation) {
        self.commands.push(DrawCommand::PushRotation(rotation));
    }

    fn pop_rotation(&mut self) {
        self.commands.push(DrawCommand::PopRotation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_geometry() {
        let rect = Rect::from_corners(10, 20, 19, 29);
        assert_eq!(rect, Rect::new(10, 20, 10, 10));
        assert_eq!(rect.right(), 20);
        assert_eq!(rect.bottom(), 30);
        assert!(rect.contains(19, 29));
        assert!(!rect.contains(20, 29));
        assert!(Rect::new(0, 0, 0, 5).is_empty());
        let union = rect.union(&Rect::new(0, 25, 5, 20));
        assert_eq!(union, Rect::new(0, 20, 20, 25));
    }

    #[test]
    fn test_point_distance() {
        assert_eq!(Point::new(1, 1).distance2(4, 5), 25);
    }

    #[test]
    fn test_recording_surface() {
        let mut surface = RecordingSurface::new();
        let style = TextStyle::default();
        surface.clear(Color::WHITE);
        surface.draw_text(0, 10, "hello", &style, Color::BLACK);
        surface.push_rotation(Rotation::Clockwise { offset: 800 });
        surface.pop_rotation();
        assert_eq!(surface.texts(), vec!["hello"]);
        assert_eq!(surface.commands.len(), 4);
        surface.clear_commands();
        assert!(surface.commands.is_empty());
    }
}

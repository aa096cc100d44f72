//! # Selection
//!
//! The reader's selection: two element-granularity bounds and the handle
//! being dragged. Dragging one handle across the other swaps their roles so
//! the left bound never passes the right one.

use crate::element_area::{ElementArea, ElementAreaVector};
use crate::highlighting::{HighlightKind, Highlighting};
use crate::page::Page;
use crate::paint::Point;
use crate::position::Position;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionHandle {
    Left,
    Right,
}

#[derive(Debug, Clone, Default)]
pub struct Selection {
    left: Option<Position>,
    right: Option<Position>,
    in_movement: Option<SelectionHandle>,
    movement_point: Point,
}

fn element_of(area: &ElementArea) -> Position {
    Position::new(area.position.paragraph, area.position.element, 0)
}

impl Selection {
    pub fn new() -> Self {
        Selection::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.left.is_none()
    }

    /// True if there was something to clear
    pub fn clear(&mut self) -> bool {
        if self.is_empty() {
            return false;
        }
        self.stop();
        self.left = None;
        self.right = None;
        true
    }

    /// Selects the element nearest to the point
    pub fn start(&mut self, areas: &ElementAreaVector, x: i32, y: i32, max_distance: i32) -> bool {
        self.clear();
        match areas.find_nearest(x, y, max_distance) {
            Some(area) => {
                let element = element_of(area);
                self.left = Some(element);
                self.right = Some(element);
                true
            }
            None => false,
        }
    }

    pub fn stop(&mut self) {
        self.in_movement = None;
    }

    pub fn set_cursor_in_movement(&mut self, handle: SelectionHandle, x: i32, y: i32) {
        self.in_movement = Some(handle);
        self.movement_point = Point::new(x, y);
    }

    pub fn cursor_in_movement(&self) -> Option<SelectionHandle> {
        self.in_movement
    }

    pub fn cursor_in_movement_point(&self) -> Point {
        self.movement_point
    }

    /// Moves the dragged bound to the element nearest the point
    pub fn expand_to(&mut self, areas: &ElementAreaVector, x: i32, y: i32, max_distance: i32) {
        let (Some(left), Some(right)) = (self.left, self.right) else {
            return;
        };
        let Some(area) = areas.find_nearest(x, y, max_distance) else {
            return;
        };
        let element = element_of(area);
        if self.in_movement == Some(SelectionHandle::Right) {
            if left <= element {
                self.right = Some(element);
            } else {
                self.right = Some(left);
                self.left = Some(element);
                self.in_movement = Some(SelectionHandle::Left);
            }
        } else if right >= element {
            self.left = Some(element);
        } else {
            self.left = Some(right);
            self.right = Some(element);
            self.in_movement = Some(SelectionHandle::Right);
        }
    }

    pub fn start_position(&self) -> Option<Position> {
        self.left
    }

    pub fn end_position(&self) -> Option<Position> {
        self.right
    }

    /// First area of the selection on `page`
    pub fn start_area<'p>(&self, page: &'p Page) -> Option<&'p ElementArea> {
        let left = self.left?;
        let right = self.right?;
        page.areas
            .first_area_from(&left)
            .filter(|area| area.position.compare_ignoring_char(&right) != Ordering::Greater)
    }

    /// Last area of the selection on `page`
    pub fn end_area<'p>(&self, page: &'p Page) -> Option<&'p ElementArea> {
        let left = self.left?;
        let right = self.right?;
        page.areas
            .last_area_up_to(&right)
            .filter(|area| area.position.compare_ignoring_char(&left) != Ordering::Less)
    }

    /// The selection starts before the first area of `page`
    pub fn has_part_before_page(&self, page: &Page) -> bool {
        let (Some(left), Some(first)) = (self.left, page.areas.first_area()) else {
            return false;
        };
        match left.compare_ignoring_char(&first.position) {
            Ordering::Less => true,
            Ordering::Equal => first.position.char_index > 0,
            Ordering::Greater => false,
        }
    }

    /// The selection ends after the last area of `page`
    pub fn has_part_after_page(&self, page: &Page) -> bool {
        let (Some(right), Some(last)) = (self.right, page.areas.last_area()) else {
            return false;
        };
        match right.compare_ignoring_char(&last.position) {
            Ordering::Greater => true,
            Ordering::Equal => !last.is_last_in_element,
            Ordering::Less => false,
        }
    }

    /// Where the handle is drawn on `page`, if it is on the page at all
    pub fn handle_point(&self, page: &Page, handle: SelectionHandle) -> Option<Point> {
        if self.in_movement == Some(handle) {
            return Some(self.movement_point);
        }
        match handle {
            SelectionHandle::Left => {
                if self.has_part_before_page(page) {
                    return None;
                }
                self.start_area(page)
                    .map(|area| Point::new(area.x_start, (area.y_start + area.y_end) / 2))
            }
            SelectionHandle::Right => {
                if self.has_part_after_page(page) {
                    return None;
                }
                self.end_area(page)
                    .map(|area| Point::new(area.x_end, (area.y_start + area.y_end) / 2))
            }
        }
    }

    /// The selection as a drawable range
    pub fn to_highlighting(&self) -> Option<Highlighting> {
        Some(Highlighting::new(HighlightKind::Selection, self.left?, self.right?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::WordCursor;
    use crate::element_area::tests::area;

    fn page() -> Page {
        let mut page = Page::new();
        page.start = WordCursor::new(Position::new(0, 0, 0));
        page.end = WordCursor::new(Position::new(1, 0, 0));
        page.areas.push(area(0, 0, (0, 39), (0, 11)));
        page.areas.push(area(2, 0, (50, 89), (0, 11)));
        page.areas.push(area(4, 0, (0, 39), (12, 23)));
        page
    }

    #[test]
    fn test_start_and_expand() {
        let page = page();
        let mut selection = Selection::new();
        assert!(!selection.start(&page.areas, 500, 500, 10));
        assert!(selection.is_empty());
        assert!(selection.start(&page.areas, 55, 5, 10));
        assert_eq!(selection.start_position(), Some(Position::new(0, 2, 0)));

        selection.set_cursor_in_movement(SelectionHandle::Right, 10, 20);
        selection.expand_to(&page.areas, 10, 20, 10);
        assert_eq!(selection.end_position(), Some(Position::new(0, 4, 0)));
        assert_eq!(selection.cursor_in_movement(), Some(SelectionHandle::Right));
    }

    #[test]
    fn test_drag_across_swaps_handles() {
        let page = page();
        let mut selection = Selection::new();
        selection.start(&page.areas, 55, 5, 10);
        selection.set_cursor_in_movement(SelectionHandle::Right, 5, 5);
        selection.expand_to(&page.areas, 5, 5, 10);
        assert_eq!(selection.start_position(), Some(Position::new(0, 0, 0)));
        assert_eq!(selection.end_position(), Some(Position::new(0, 2, 0)));
        assert_eq!(selection.cursor_in_movement(), Some(SelectionHandle::Left));
    }

    #[test]
    fn test_handle_points() {
        let page = page();
        let mut selection = Selection::new();
        selection.start(&page.areas, 5, 5, 10);
        selection.set_cursor_in_movement(SelectionHandle::Right, 60, 5);
        selection.expand_to(&page.areas, 60, 5, 10);
        selection.stop();
        assert_eq!(selection.handle_point(&page, SelectionHandle::Left), Some(Point::new(0, 5)));
        assert_eq!(selection.handle_point(&page, SelectionHandle::Right), Some(Point::new(89, 5)));
        assert!(!selection.has_part_before_page(&page));
        assert!(!selection.has_part_after_page(&page));
        let highlighting = selection.to_highlighting().unwrap();
        assert_eq!(highlighting.hull(&page).rects().len(), 1);
        assert!(selection.clear());
        assert!(selection.handle_point(&page, SelectionHandle::Left).is_none());
    }
}

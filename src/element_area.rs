//! # Element Areas
//!
//! Pixel-positioned pieces of a rendered page. Areas are stored in reading
//! order, column by column, so hit-testing is a binary search within a column.

use crate::paint::Rect;
use crate::position::Position;
use crate::style::StyleSnapshot;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AreaKind {
    Word,
    /// A gap drawn only when the style decorates it
    Space,
    Image,
    Video,
    Extension,
}

/// One placed element (or part of a word)
#[derive(Debug, Clone, PartialEq)]
pub struct ElementArea {
    /// Paragraph, element and first character of the piece
    pub position: Position,
    /// Characters covered; zero for non-words
    pub length: usize,
    pub kind: AreaKind,
    pub is_last_in_element: bool,
    pub add_hyphenation_sign: bool,
    /// The style differs from the previous area's
    pub change_style: bool,
    pub style: StyleSnapshot,
    pub x_start: i32,
    pub x_end: i32,
    pub y_start: i32,
    pub y_end: i32,
    pub column_index: usize,
}

impl ElementArea {
    /// Position just after the piece
    pub fn end_position(&self) -> Position {
        Position::new(
            self.position.paragraph,
            self.position.element,
            self.position.char_index + self.length,
        )
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x_start && x <= self.x_end && y >= self.y_start && y <= self.y_end
    }

    /// Chebyshev distance from the point to the box, zero inside
    pub fn distance_to(&self, x: i32, y: i32) -> i32 {
        let dx = (self.x_start - x).max(x - self.x_end).max(0);
        let dy = (self.y_start - y).max(y - self.y_end).max(0);
        dx.max(dy)
    }

    pub fn rect(&self) -> Rect {
        Rect::from_corners(self.x_start, self.y_start, self.x_end, self.y_end)
    }

    /// Element-granularity test against `[from, to]`
    pub fn is_within(&self, from: &Position, to: &Position) -> bool {
        from.compare_ignoring_char(&self.position) != Ordering::Greater
            && self.position.compare_ignoring_char(to) != Ordering::Greater
    }
}

/// Rectangles covering a highlighted range, one per line run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hull {
    rects: Vec<Rect>,
}

impl Hull {
    pub fn new(rects: Vec<Rect>) -> Self {
        Hull { rects }
    }

    pub fn from_area(area: &ElementArea) -> Self {
        Hull::new(vec![area.rect()])
    }

    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn bounds(&self) -> Option<Rect> {
        let (first, rest) = self.rects.split_first()?;
        Some(rest.iter().fold(*first, |acc, rect| acc.union(rect)))
    }
}

/// The areas of one page
#[derive(Debug, Clone, Default)]
pub struct ElementAreaVector {
    areas: Vec<ElementArea>,
}

impl ElementAreaVector {
    pub fn new() -> Self {
        ElementAreaVector::default()
    }

    pub fn push(&mut self, area: ElementArea) {
        self.areas.push(area);
    }

    pub fn clear(&mut self) {
        self.areas.clear();
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    pub fn areas(&self) -> &[ElementArea] {
        &self.areas
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ElementArea> {
        self.areas.iter()
    }

    pub fn first_area(&self) -> Option<&ElementArea> {
        self.areas.first()
    }

    pub fn last_area(&self) -> Option<&ElementArea> {
        self.areas.last()
    }

    fn columns(&self) -> [&[ElementArea]; 2] {
        let split = self.areas.partition_point(|area| area.column_index == 0);
        let (first, second) = self.areas.split_at(split);
        [first, second]
    }

    /// Area under the point
    pub fn binary_search(&self, x: i32, y: i32) -> Option<&ElementArea> {
        self.columns()
            .into_iter()
            .find_map(|column| search_column(column, x, y))
    }

    /// Closest area within `max_distance` of the point
    pub fn find_nearest(&self, x: i32, y: i32, max_distance: i32) -> Option<&ElementArea> {
        if let Some(area) = self.binary_search(x, y) {
            return Some(area);
        }
        self.areas
            .iter()
            .map(|area| (area.distance_to(x, y), area))
            .filter(|(distance, _)| *distance <= max_distance)
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, area)| area)
    }

    /// Area whose element is at `position`
    pub fn area_at(&self, position: &Position) -> Option<&ElementArea> {
        self.areas
            .iter()
            .find(|area| area.position.compare_ignoring_char(position) == Ordering::Equal)
    }

    /// First area at or after `position`
    pub fn first_area_from(&self, position: &Position) -> Option<&ElementArea> {
        self.areas
            .iter()
            .find(|area| area.position.compare_ignoring_char(position) != Ordering::Less)
    }

    /// Last area at or before `position`
    pub fn last_area_up_to(&self, position: &Position) -> Option<&ElementArea> {
        self.areas
            .iter()
            .rev()
            .find(|area| area.position.compare_ignoring_char(position) != Ordering::Greater)
    }

    /// Rectangles covering the areas in `[from, to]`, merged per line
    pub fn hull(&self, from: &Position, to: &Position) -> Hull {
        let mut rects: Vec<(usize, Rect)> = Vec::new();
        for area in self.areas.iter().filter(|area| area.is_within(from, to)) {
            let rect = area.rect();
            match rects.last_mut() {
                Some((column, current))
                    if *column == area.column_index
                        && rect.y < current.bottom()
                        && current.y < rect.bottom() =>
                {
                    *current = current.union(&rect);
                }
                _ => rects.push((area.column_index, rect)),
            }
        }
        Hull::new(rects.into_iter().map(|(_, rect)| rect).collect())
    }
}

fn search_column(areas: &[ElementArea], x: i32, y: i32) -> Option<&ElementArea> {
    let (mut left, mut right) = (0, areas.len());
    while left < right {
        let middle = (left + right) / 2;
        let candidate = &areas[middle];
        if candidate.y_start > y {
            right = middle;
        } else if candidate.y_end < y {
            left = middle + 1;
        } else if candidate.x_start > x {
            right = middle;
        } else if candidate.x_end < x {
            left = middle + 1;
        } else {
            return Some(candidate);
        }
    }
    None
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::style::TextStyle;

    pub(crate) fn area(element: usize, column: usize, x: (i32, i32), y: (i32, i32)) -> ElementArea {
        ElementArea {
            position: Position::new(0, element, 0),
            length: 4,
            kind: AreaKind::Word,
            is_last_in_element: true,
            add_hyphenation_sign: false,
            change_style: false,
            style: StyleSnapshot::base(TextStyle::default()),
            x_start: x.0,
            x_end: x.1,
            y_start: y.0,
            y_end: y.1,
            column_index: column,
        }
    }

    fn two_lines() -> ElementAreaVector {
        let mut vector = ElementAreaVector::new();
        vector.push(area(0, 0, (0, 39), (0, 11)));
        vector.push(area(2, 0, (50, 89), (0, 11)));
        vector.push(area(4, 0, (0, 39), (12, 23)));
        vector.push(area(6, 1, (120, 159), (0, 11)));
        vector
    }

    #[test]
    fn test_binary_search() {
        let vector = two_lines();
        assert_eq!(vector.binary_search(55, 5).map(|a| a.position.element), Some(2));
        assert_eq!(vector.binary_search(10, 20).map(|a| a.position.element), Some(4));
        assert_eq!(vector.binary_search(130, 3).map(|a| a.position.element), Some(6));
        assert!(vector.binary_search(45, 5).is_none());
        assert!(vector.binary_search(10, 40).is_none());
    }

    #[test]
    fn test_find_nearest() {
        let vector = two_lines();
        assert_eq!(vector.find_nearest(45, 5, 10).map(|a| a.position.element), Some(2));
        assert!(vector.find_nearest(10, 60, 10).is_none());
        assert_eq!(vector.find_nearest(10, 60, 40).map(|a| a.position.element), Some(4));
    }

    #[test]
    fn test_hull_merges_lines() {
        let vector = two_lines();
        let hull = vector.hull(&Position::new(0, 0, 0), &Position::new(0, 6, 0));
        assert_eq!(
            hull.rects(),
            &[
                Rect::new(0, 0, 90, 12),
                Rect::new(0, 12, 40, 12),
                Rect::new(120, 0, 40, 12)
            ]
        );
        let partial = vector.hull(&Position::new(0, 2, 3), &Position::new(0, 2, 0));
        assert_eq!(partial.rects(), &[Rect::new(50, 0, 40, 12)]);
        assert_eq!(hull.bounds(), Some(Rect::new(0, 0, 160, 24)));
    }

    #[test]
    fn test_positional_lookups() {
        let vector = two_lines();
        assert_eq!(vector.first_area_from(&Position::new(0, 1, 0)).map(|a| a.position.element), Some(2));
        assert_eq!(vector.last_area_up_to(&Position::new(0, 5, 0)).map(|a| a.position.element), Some(4));
        assert!(vector.area_at(&Position::new(0, 3, 0)).is_none());
        assert_eq!(vector.area_at(&Position::new(0, 4, 2)).map(|a| a.x_start), Some(0));
    }

    #[test]
    fn test_area_distance() {
        let a = area(0, 0, (10, 19), (10, 19));
        assert_eq!(a.distance_to(15, 15), 0);
        assert_eq!(a.distance_to(25, 12), 6);
        assert_eq!(a.distance_to(0, 40), 21);
        assert_eq!(a.end_position(), Position::new(0, 0, 4));
    }
}

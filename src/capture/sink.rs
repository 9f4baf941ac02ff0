//! The event interface between page rendering and text capture.

use crate::model::{Point, Rect};

/// A text column on the page, left to right.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    /// Column index (0 = leftmost)
    pub index: usize,
    /// Left boundary X coordinate
    pub left: f32,
    /// Right boundary X coordinate
    pub right: f32,
}

impl Column {
    /// A single column spanning the given horizontal extent.
    pub fn full_width(left: f32, right: f32) -> Self {
        Self {
            index: 0,
            left,
            right,
        }
    }

    /// Check if an X coordinate falls within this column.
    pub fn contains(&self, x: f32) -> bool {
        x >= self.left && x <= self.right
    }
}

/// Column index for an X coordinate: the first column whose right edge
/// lies at or beyond `x`, else the last column.
pub fn column_for(columns: &[Column], x: f32) -> usize {
    columns
        .iter()
        .find(|c| x <= c.right)
        .or(columns.last())
        .map_or(0, |c| c.index)
}

/// One rendered character.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    /// The character
    pub ch: char,
    /// Glyph box in page space
    pub bbox: Rect,
    /// Column the glyph's line belongs to
    pub column: usize,
    /// Baseline of the glyph's line
    pub baseline: f32,
}

impl Glyph {
    /// Point used for region hit tests.
    pub fn center(&self) -> Point {
        self.bbox.center()
    }
}

/// Position in reading order: column first, then top to bottom, then left
/// to right. Y is negated so that ascending keys follow the page downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadingKey {
    /// Column index
    pub column: usize,
    /// Negated Y coordinate
    pub neg_y: f32,
    /// X coordinate
    pub x: f32,
}

impl ReadingKey {
    /// Key of a point in the given column.
    pub fn new(column: usize, p: Point) -> Self {
        Self {
            column,
            neg_y: -p.y,
            x: p.x,
        }
    }

    /// Key of a glyph: its line baseline stands in for the Y coordinate.
    pub fn of_glyph(glyph: &Glyph) -> Self {
        Self {
            column: glyph.column,
            neg_y: -glyph.baseline,
            x: glyph.bbox.x0,
        }
    }
}

impl Eq for ReadingKey {}

impl PartialOrd for ReadingKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ReadingKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.column
            .cmp(&other.column)
            .then_with(|| self.neg_y.total_cmp(&other.neg_y))
            .then_with(|| self.x.total_cmp(&other.x))
    }
}

/// Receives the glyph stream of one page in reading order.
///
/// A renderer calls `begin_page` once, then nests blocks, lines and glyphs,
/// and finishes with `end_page`.
pub trait RenderSink {
    /// Start of the page, with the columns found by layout analysis.
    fn begin_page(&mut self, columns: &[Column]);

    /// Start of a paragraph-like block.
    fn begin_block(&mut self) {}

    /// Start of a text line.
    fn begin_line(&mut self) {}

    /// A rendered character.
    fn glyph(&mut self, glyph: &Glyph);

    /// End of a text line.
    fn end_line(&mut self) {}

    /// End of a block.
    fn end_block(&mut self) {}

    /// End of the page.
    fn end_page(&mut self);
}

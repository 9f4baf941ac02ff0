//! Page-space geometry: points, rectangles and quadrilaterals.
//!
//! Coordinates follow the PDF convention: origin at the bottom-left of the
//! page, Y increasing upward, units in points.

use serde::{Deserialize, Serialize};

/// Tolerance for edge tests.
const EPSILON: f32 = 1e-3;

/// A point in page space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

impl Point {
    /// Create a new point.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle with `x0 <= x1` and `y0 <= y1`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x0: f32,
    /// Bottom edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Top edge
    pub y1: f32,
}

impl Rect {
    /// Create a rectangle from two corners in any order.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// Build from a PDF rectangle array `[llx lly urx ury]`.
    pub fn from_coords(coords: &[f32]) -> Option<Self> {
        match coords {
            [x0, y0, x1, y1] => Some(Self::new(*x0, *y0, *x1, *y1)),
            _ => None,
        }
    }

    /// US Letter, used when a page has no usable MediaBox.
    pub fn letter() -> Self {
        Self::new(0.0, 0.0, 612.0, 792.0)
    }

    /// Width in points.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Height in points.
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Centre point.
    pub fn center(&self) -> Point {
        Point::new((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }

    /// Top-left corner, the natural reading anchor of the rectangle.
    pub fn top_left(&self) -> Point {
        Point::new(self.x0, self.y1)
    }

    /// Whether the point lies inside or on the boundary.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x0 - EPSILON
            && p.x <= self.x1 + EPSILON
            && p.y >= self.y0 - EPSILON
            && p.y <= self.y1 + EPSILON
    }
}

/// A quadrilateral from a `/QuadPoints` array.
///
/// The PDF reference prescribes a point order that many producers ignore,
/// so containment sorts the corners around their centroid first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    /// The four corners, as found in the file
    pub points: [Point; 4],
}

impl Quad {
    /// Create a quad from four corners.
    pub fn new(points: [Point; 4]) -> Self {
        Self { points }
    }

    /// Split a flat `/QuadPoints` array into quads. Trailing values that do
    /// not form a whole quad are ignored.
    pub fn from_coords(coords: &[f32]) -> Vec<Quad> {
        coords
            .chunks_exact(8)
            .map(|c| {
                Quad::new([
                    Point::new(c[0], c[1]),
                    Point::new(c[2], c[3]),
                    Point::new(c[4], c[5]),
                    Point::new(c[6], c[7]),
                ])
            })
            .collect()
    }

    /// Axis-aligned bounding rectangle.
    pub fn bounding_rect(&self) -> Rect {
        let xs = self.points.iter().map(|p| p.x);
        let ys = self.points.iter().map(|p| p.y);
        Rect {
            x0: xs.clone().fold(f32::INFINITY, f32::min),
            x1: xs.fold(f32::NEG_INFINITY, f32::max),
            y0: ys.clone().fold(f32::INFINITY, f32::min),
            y1: ys.fold(f32::NEG_INFINITY, f32::max),
        }
    }

    fn centroid(&self) -> Point {
        let (sx, sy) = self
            .points
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Point::new(sx / 4.0, sy / 4.0)
    }

    /// Corners in counter-clockwise order around the centroid.
    fn ring(&self) -> [Point; 4] {
        let c = self.centroid();
        let mut ring = self.points;
        ring.sort_by(|a, b| {
            let ta = (a.y - c.y).atan2(a.x - c.x);
            let tb = (b.y - c.y).atan2(b.x - c.x);
            ta.total_cmp(&tb)
        });
        ring
    }

    fn area(ring: &[Point; 4]) -> f32 {
        let mut twice = 0.0;
        for i in 0..4 {
            let a = ring[i];
            let b = ring[(i + 1) % 4];
            twice += a.x * b.y - b.x * a.y;
        }
        (twice / 2.0).abs()
    }

    /// Whether the point lies inside or on the boundary.
    pub fn contains(&self, p: Point) -> bool {
        let ring = self.ring();
        if Self::area(&ring) <= EPSILON {
            return self.bounding_rect().contains(p);
        }

        let mut sign = 0.0f32;
        for i in 0..4 {
            let a = ring[i];
            let b = ring[(i + 1) % 4];
            let cross = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
            if cross.abs() <= EPSILON {
                continue;
            }
            if sign == 0.0 {
                sign = cross.signum();
            } else if cross.signum() != sign {
                return false;
            }
        }
        true
    }
}

/// An RGB colour with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    /// Red
    pub r: f32,
    /// Green
    pub g: f32,
    /// Blue
    pub b: f32,
}

impl Rgb {
    /// Create a colour, rejecting components outside `[0, 1]`.
    pub fn new(r: f32, g: f32, b: f32) -> Option<Self> {
        let valid = |c: f32| (0.0..=1.0).contains(&c);
        (valid(r) && valid(g) && valid(b)).then_some(Self { r, g, b })
    }

    /// Hex notation, e.g. `#ffff00`.
    pub fn to_hex(&self) -> String {
        let byte = |c: f32| (c * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", byte(self.r), byte(self.g), byte(self.b))
    }
}

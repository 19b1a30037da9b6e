//! Selection region definitions.

use crate::input::PointerPoint;
use crate::util;

/// Axis-aligned selection rectangle in element (screen) coordinates.
///
/// Always normalized: `(x, y)` is the top-left corner and the size is
/// non-negative regardless of which way the user dragged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectangleRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl RectangleRegion {
    /// Builds a normalized rectangle from a drag anchor and the current cursor.
    pub fn from_corners(anchor: PointerPoint, cursor: PointerPoint) -> Self {
        let (x, width) = util::normalize_span(anchor.x, cursor.x);
        let (y, height) = util::normalize_span(anchor.y, cursor.y);
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True when both sides strictly exceed `min_size`.
    pub fn exceeds(&self, min_size: f64) -> bool {
        self.width > min_size && self.height > min_size
    }

    /// True when the rectangle covers no area.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Polygon selection in element (screen) coordinates.
///
/// Vertex order is insertion order. A polygon can only be closed once it has
/// at least [`PolygonRegion::MIN_POINTS`] vertices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolygonRegion {
    points: Vec<PointerPoint>,
    closed: bool,
}

impl PolygonRegion {
    /// Minimum vertex count for a closable polygon.
    pub const MIN_POINTS: usize = 3;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[PointerPoint] {
        &self.points
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Appends a vertex. Returns `false` if it repeats the previous vertex.
    pub(crate) fn push(&mut self, point: PointerPoint) -> bool {
        if self.points.last() == Some(&point) {
            return false;
        }
        self.points.push(point);
        true
    }

    /// Marks the polygon closed if it has enough vertices.
    pub(crate) fn close(&mut self) -> bool {
        if self.points.len() < Self::MIN_POINTS {
            return false;
        }
        self.closed = true;
        true
    }

    /// Edge list in vertex order.
    ///
    /// A closed polygon includes the final edge from the last vertex back to
    /// the first; an open one stops at the last vertex.
    pub fn edges(&self) -> Vec<(PointerPoint, PointerPoint)> {
        let mut edges: Vec<_> = self.points.windows(2).map(|w| (w[0], w[1])).collect();
        if self.closed {
            if let (Some(&first), Some(&last)) = (self.points.first(), self.points.last()) {
                edges.push((last, first));
            }
        }
        edges
    }

    /// Axis-aligned bounds of all vertices.
    pub fn bounding_box(&self) -> Option<RectangleRegion> {
        let first = self.points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &self.points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(RectangleRegion {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        })
    }
}

/// The single currently-active selection.
#[derive(Debug, Clone, PartialEq)]
pub enum CommittedRegion {
    Rectangle(RectangleRegion),
    Polygon(PolygonRegion),
}

impl CommittedRegion {
    /// Bounding rectangle of the region.
    pub fn bounds(&self) -> Option<RectangleRegion> {
        match self {
            CommittedRegion::Rectangle(rect) => Some(*rect),
            CommittedRegion::Polygon(polygon) => polygon.bounding_box(),
        }
    }
}

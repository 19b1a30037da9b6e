use crate::draw::{CommittedRegion, PolygonRegion, RectangleRegion};
use crate::input::SelectionMode;

use super::SelectionController;

/// Shape the overlay should cut out and outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActiveShape<'a> {
    /// In-progress drag or committed rectangle
    Rectangle(RectangleRegion),
    /// Open (in-progress) or closed polygon
    Polygon(&'a PolygonRegion),
}

impl SelectionController {
    /// Returns the shape to draw on the overlay, if any.
    ///
    /// An in-progress rectangle drag takes precedence over a committed
    /// rectangle. In Polygon mode the current vertex sequence is returned,
    /// whether open or closed.
    pub fn active_shape(&self) -> Option<ActiveShape<'_>> {
        match self.mode() {
            SelectionMode::Rectangle => {
                if let Some(drag) = self.rectangle_drag() {
                    return Some(ActiveShape::Rectangle(drag.region()));
                }
                match self.committed() {
                    Some(CommittedRegion::Rectangle(rect)) => Some(ActiveShape::Rectangle(*rect)),
                    _ => None,
                }
            }
            SelectionMode::Polygon => {
                if self.polygon().is_empty() {
                    None
                } else {
                    Some(ActiveShape::Polygon(self.polygon()))
                }
            }
        }
    }
}

use crate::input::{MouseButton, PointerPoint, SelectionMode};

use super::{SelectionController, SelectionError, SelectionOutcome};

impl SelectionController {
    /// Processes a mouse button press.
    ///
    /// # Behavior
    /// - Left click in Rectangle mode: starts a new drag at the pointer
    /// - Left click in Polygon mode: appends a vertex
    /// - Right click: cancels an in-progress rectangle drag
    pub fn on_mouse_press(&mut self, button: MouseButton, point: PointerPoint) -> SelectionOutcome {
        match button {
            MouseButton::Left => {
                let result = match self.mode() {
                    SelectionMode::Rectangle => self.begin_rectangle(point),
                    SelectionMode::Polygon => self.add_polygon_point(point),
                };
                settle(result)
            }
            MouseButton::Right => {
                if self.cancel_active() {
                    SelectionOutcome::Discarded
                } else {
                    SelectionOutcome::Ignored
                }
            }
            MouseButton::Middle => SelectionOutcome::Ignored,
        }
    }

    /// Processes pointer motion. Only an in-progress rectangle drag reacts.
    pub fn on_mouse_motion(&mut self, point: PointerPoint) -> SelectionOutcome {
        if self.rectangle_drag().is_none() {
            return SelectionOutcome::Ignored;
        }
        settle(self.update_rectangle(point))
    }

    /// Processes a mouse button release; finalizes a rectangle drag.
    pub fn on_mouse_release(
        &mut self,
        button: MouseButton,
        point: PointerPoint,
    ) -> SelectionOutcome {
        if button != MouseButton::Left || self.rectangle_drag().is_none() {
            return SelectionOutcome::Ignored;
        }
        settle(self.end_rectangle(point))
    }

    /// Processes a double click; closes the polygon in Polygon mode.
    ///
    /// The press events preceding a double click already placed the vertex
    /// under the pointer, so only the close is performed here.
    pub fn on_double_click(&mut self) -> SelectionOutcome {
        if self.mode() != SelectionMode::Polygon {
            return SelectionOutcome::Ignored;
        }
        settle(self.close_polygon())
    }

    /// Pointer left the drawing surface.
    pub fn on_mouse_leave(&mut self) -> SelectionOutcome {
        if self.cancel_active() {
            SelectionOutcome::Discarded
        } else {
            SelectionOutcome::Ignored
        }
    }
}

/// Logs a rejected command and reports it as ignored.
fn settle(result: Result<SelectionOutcome, SelectionError>) -> SelectionOutcome {
    result.unwrap_or_else(|err| {
        log::warn!("Selection command ignored: {}", err);
        SelectionOutcome::Ignored
    })
}

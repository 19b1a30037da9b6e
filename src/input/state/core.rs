//! Selection state machine.

use crate::draw::{CommittedRegion, PolygonRegion, RectangleRegion};
use crate::input::{PointerPoint, SelectionMode};
use std::collections::VecDeque;
use thiserror::Error;

/// Rectangles whose width or height does not exceed this are discarded.
pub const DEFAULT_MIN_SELECTION_SIZE: f64 = 10.0;

/// Upper bound on buffered trace records between drains.
const MAX_TRACES: usize = 256;

/// In-progress rectangle drag (exists only between pointer-down and pointer-up).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectangleDrag {
    /// Corner where the drag started
    pub anchor: PointerPoint,
    /// Latest cursor position
    pub cursor: PointerPoint,
}

impl RectangleDrag {
    /// Normalized rectangle spanned by the drag so far.
    pub fn region(&self) -> RectangleRegion {
        RectangleRegion::from_corners(self.anchor, self.cursor)
    }
}

/// Result of a selection command that was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// Nothing changed
    Ignored,
    /// In-progress state changed; overlay needs a redraw
    Updated,
    /// A region was committed; overlay and preview need refreshing
    Committed,
    /// The gesture ended without a region; overlay should be cleared
    Discarded,
}

/// Precondition violations for selection commands.
///
/// These never leave the event handler that detected them: the controller
/// state is unchanged and the caller only logs them.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SelectionError {
    #[error("{command} is only available in {expected} mode (active: {active})")]
    WrongMode {
        command: &'static str,
        expected: SelectionMode,
        active: SelectionMode,
    },

    #[error("no rectangle drag in progress")]
    NoActiveDrag,

    #[error("polygon needs at least {min} points to close, has {count}")]
    TooFewPoints { count: usize, min: usize },
}

/// Kind of state transition recorded in a [`SelectionTrace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceKind {
    ModeChanged,
    RectangleStarted,
    RectangleUpdated,
    RectangleCommitted,
    RectangleDiscarded,
    DragCancelled,
    PolygonPointAdded,
    PolygonRestarted,
    PolygonClosed,
    Cleared,
    Rejected,
}

/// Diagnostic record emitted on every selection state transition.
///
/// Purely a trace for UI feedback and debugging, not an error channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionTrace {
    /// Crop session active when the event happened
    pub session: u64,
    pub kind: TraceKind,
    /// Pointer position involved, if any
    pub point: Option<PointerPoint>,
}

/// Owns the crop tool mode, in-progress geometry and the committed region.
///
/// All mutation happens through the command methods below, which are called
/// synchronously from pointer/keyboard handlers in dispatch order.
#[derive(Debug)]
pub struct SelectionController {
    mode: SelectionMode,
    /// Minimum rectangle side (exclusive) for a commit
    min_size: f64,
    /// Crop session counter, bumped on every rectangle-draw start
    session: u64,
    drag: Option<RectangleDrag>,
    polygon: PolygonRegion,
    committed: Option<CommittedRegion>,
    traces: VecDeque<SelectionTrace>,
    /// Whether the overlay is out of date; the host clears it after drawing
    pub needs_redraw: bool,
}

impl Default for SelectionController {
    fn default() -> Self {
        Self::new(SelectionMode::default(), DEFAULT_MIN_SELECTION_SIZE)
    }
}

impl SelectionController {
    /// Creates an empty controller.
    ///
    /// # Arguments
    /// * `mode` - Initial crop tool mode
    /// * `min_size` - Rectangles must exceed this on both sides to commit
    pub fn new(mode: SelectionMode, min_size: f64) -> Self {
        Self {
            mode,
            min_size: min_size.max(0.0),
            session: 0,
            drag: None,
            polygon: PolygonRegion::new(),
            committed: None,
            traces: VecDeque::new(),
            needs_redraw: true,
        }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn min_size(&self) -> f64 {
        self.min_size
    }

    /// Current crop session id (0 before the first rectangle draw).
    pub fn session(&self) -> u64 {
        self.session
    }

    pub fn committed(&self) -> Option<&CommittedRegion> {
        self.committed.as_ref()
    }

    pub fn rectangle_drag(&self) -> Option<&RectangleDrag> {
        self.drag.as_ref()
    }

    pub fn polygon(&self) -> &PolygonRegion {
        &self.polygon
    }

    /// Drains trace records gathered since the last call.
    pub fn take_traces(&mut self) -> Vec<SelectionTrace> {
        self.traces.drain(..).collect()
    }

    fn trace(&mut self, kind: TraceKind, point: Option<PointerPoint>) {
        match point {
            Some(p) => log::debug!(
                "crop session {}: {:?} at ({:.1}, {:.1})",
                self.session,
                kind,
                p.x,
                p.y
            ),
            None => log::debug!("crop session {}: {:?}", self.session, kind),
        }
        if self.traces.len() >= MAX_TRACES {
            self.traces.pop_front();
        }
        self.traces.push_back(SelectionTrace {
            session: self.session,
            kind,
            point,
        });
    }

    fn reject(&mut self, err: SelectionError, point: Option<PointerPoint>) -> SelectionError {
        log::debug!("crop session {}: rejected: {}", self.session, err);
        self.trace(TraceKind::Rejected, point);
        err
    }

    fn require_mode(
        &mut self,
        command: &'static str,
        expected: SelectionMode,
        point: Option<PointerPoint>,
    ) -> Result<(), SelectionError> {
        if self.mode == expected {
            Ok(())
        } else {
            let active = self.mode;
            Err(self.reject(
                SelectionError::WrongMode {
                    command,
                    expected,
                    active,
                },
                point,
            ))
        }
    }

    fn reset(&mut self) {
        self.drag = None;
        self.polygon = PolygonRegion::new();
        self.committed = None;
        self.needs_redraw = true;
    }

    /// Switches the crop tool mode.
    ///
    /// Clears in-progress and committed state. Returns `false` (no-op) when
    /// the mode is already active.
    pub fn set_mode(&mut self, mode: SelectionMode) -> bool {
        if self.mode == mode {
            return false;
        }
        let previous = self.mode;
        self.mode = mode;
        self.reset();
        self.trace(TraceKind::ModeChanged, None);
        log::info!("Selection mode switched from {} to {}", previous, mode);
        true
    }

    /// Starts a rectangle drag at `point`, opening a new crop session.
    ///
    /// Any previously committed region is discarded.
    pub fn begin_rectangle(
        &mut self,
        point: PointerPoint,
    ) -> Result<SelectionOutcome, SelectionError> {
        self.require_mode("begin_rectangle", SelectionMode::Rectangle, Some(point))?;

        self.session += 1;
        self.committed = None;
        self.drag = Some(RectangleDrag {
            anchor: point,
            cursor: point,
        });
        self.needs_redraw = true;
        self.trace(TraceKind::RectangleStarted, Some(point));
        Ok(SelectionOutcome::Updated)
    }

    /// Moves the cursor corner of the in-progress drag. Never commits.
    pub fn update_rectangle(
        &mut self,
        point: PointerPoint,
    ) -> Result<SelectionOutcome, SelectionError> {
        let Some(drag) = self.drag.as_mut() else {
            return Err(self.reject(SelectionError::NoActiveDrag, Some(point)));
        };
        if drag.cursor == point {
            return Ok(SelectionOutcome::Ignored);
        }
        drag.cursor = point;
        self.needs_redraw = true;
        self.trace(TraceKind::RectangleUpdated, Some(point));
        Ok(SelectionOutcome::Updated)
    }

    /// Finalizes the drag at `point`.
    ///
    /// Commits when both sides exceed the minimum size, otherwise discards.
    /// The in-progress drag is cleared either way.
    pub fn end_rectangle(
        &mut self,
        point: PointerPoint,
    ) -> Result<SelectionOutcome, SelectionError> {
        let Some(drag) = self.drag.take() else {
            return Err(self.reject(SelectionError::NoActiveDrag, Some(point)));
        };
        let region = RectangleRegion::from_corners(drag.anchor, point);
        self.needs_redraw = true;

        if region.exceeds(self.min_size) {
            log::info!(
                "Crop session {} committed rectangle x={:.1} y={:.1} w={:.1} h={:.1}",
                self.session,
                region.x,
                region.y,
                region.width,
                region.height
            );
            self.committed = Some(CommittedRegion::Rectangle(region));
            self.trace(TraceKind::RectangleCommitted, Some(point));
            Ok(SelectionOutcome::Committed)
        } else {
            log::debug!(
                "Crop session {} discarded {:.1}x{:.1} rectangle (minimum {:.1})",
                self.session,
                region.width,
                region.height,
                self.min_size
            );
            self.committed = None;
            self.trace(TraceKind::RectangleDiscarded, Some(point));
            Ok(SelectionOutcome::Discarded)
        }
    }

    /// Appends a vertex to the current polygon. Never commits.
    ///
    /// Adding to an already closed polygon starts a new vertex sequence and
    /// discards the committed region.
    pub fn add_polygon_point(
        &mut self,
        point: PointerPoint,
    ) -> Result<SelectionOutcome, SelectionError> {
        self.require_mode("add_polygon_point", SelectionMode::Polygon, Some(point))?;

        if self.polygon.is_closed() {
            self.polygon = PolygonRegion::new();
            self.committed = None;
            self.needs_redraw = true;
            self.trace(TraceKind::PolygonRestarted, Some(point));
        }

        if !self.polygon.push(point) {
            return Ok(SelectionOutcome::Ignored);
        }
        self.needs_redraw = true;
        self.trace(TraceKind::PolygonPointAdded, Some(point));
        Ok(SelectionOutcome::Updated)
    }

    /// Closes the current polygon and commits it.
    ///
    /// Fails without touching state when fewer than three vertices exist.
    pub fn close_polygon(&mut self) -> Result<SelectionOutcome, SelectionError> {
        self.require_mode("close_polygon", SelectionMode::Polygon, None)?;

        if self.polygon.is_closed() {
            return Ok(SelectionOutcome::Ignored);
        }
        if !self.polygon.close() {
            let count = self.polygon.len();
            return Err(self.reject(
                SelectionError::TooFewPoints {
                    count,
                    min: PolygonRegion::MIN_POINTS,
                },
                None,
            ));
        }

        log::info!(
            "Crop session {} committed polygon with {} points",
            self.session,
            self.polygon.len()
        );
        self.committed = Some(CommittedRegion::Polygon(self.polygon.clone()));
        self.needs_redraw = true;
        self.trace(TraceKind::PolygonClosed, None);
        Ok(SelectionOutcome::Committed)
    }

    /// Pointer left the drawing surface.
    ///
    /// Drops an in-progress rectangle drag without committing. Accumulated
    /// polygon vertices are kept; only a mode change or `clear` removes them.
    pub fn cancel_active(&mut self) -> bool {
        if self.drag.take().is_none() {
            return false;
        }
        self.needs_redraw = true;
        self.trace(TraceKind::DragCancelled, None);
        true
    }

    /// Resets all in-progress and committed state for the current mode.
    pub fn clear(&mut self) {
        self.reset();
        self.trace(TraceKind::Cleared, None);
    }
}

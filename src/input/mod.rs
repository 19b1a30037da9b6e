//! Input handling and the region-selection state machine.
//!
//! This module translates pointer and keyboard events into selection
//! commands. It owns the active selection mode, any in-progress rectangle
//! drag or polygon vertex sequence, and the single committed region.

pub mod events;
pub mod mode;
pub mod state;

// Re-export commonly used types at module level
pub use events::{Key, MouseButton, PointerPoint};
pub use mode::SelectionMode;
pub use state::{
    ActiveShape, RectangleDrag, SelectionController, SelectionError, SelectionOutcome,
    SelectionTrace, TraceKind,
};

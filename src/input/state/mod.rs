mod core;
mod mouse;
mod render;

pub use core::{
    DEFAULT_MIN_SELECTION_SIZE, RectangleDrag, SelectionController, SelectionError,
    SelectionOutcome, SelectionTrace, TraceKind,
};
pub use render::ActiveShape;

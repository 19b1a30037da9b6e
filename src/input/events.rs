//! Generic input event types.

/// Pointer position in element-local (screen) coordinates.
///
/// Recorded points are plain values and never mutated after capture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPoint {
    pub x: f64,
    pub y: f64,
}

impl PointerPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for PointerPoint {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Generic key representation.
///
/// Hosts map their native key codes to these values before handing them to
/// the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Regular character key (a-z, 0-9, symbols)
    Char(char),
    /// Escape key
    Escape,
    /// Return/Enter key
    Return,
    /// Unmapped or unrecognized key
    Unknown,
}

/// Mouse button identification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    /// Left mouse button (selection button)
    Left,
    /// Right mouse button (cancels an in-progress drag)
    Right,
    /// Middle mouse button (currently unused)
    Middle,
}

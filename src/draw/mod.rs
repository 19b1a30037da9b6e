//! Rendering primitives for the crop overlay and previews (Cairo-based).
//!
//! This module defines the drawing-side types of the region-selection
//! subsystem:
//! - [`Color`]: RGBA color representation with predefined color constants
//! - Region geometry ([`RectangleRegion`], [`PolygonRegion`], [`CommittedRegion`])
//! - [`OverlaySurface`]: transparent mask surface sized to the displayed image
//! - [`PreviewGenerator`]: copies the selected pixels into a scaled preview

pub mod color;
pub mod overlay;
pub mod preview;
pub mod region;
pub mod render;

// Re-export commonly used types at module level
pub use color::Color;
pub use overlay::{OverlayStyle, OverlaySurface};
pub use preview::{PreviewError, PreviewGenerator, PreviewImage};
pub use region::{CommittedRegion, PolygonRegion, RectangleRegion};
pub use render::{clear_surface, render_overlay};

pub use color::{BLACK, BLUE, GREEN, RED, WHITE, YELLOW};

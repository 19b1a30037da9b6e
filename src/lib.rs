//! Library exports for the dicomcrop viewer core.
//!
//! Exposes the region-selection state machine, the overlay and preview
//! renderers, DICOM loading, and the viewer glue that ties them together so
//! that hosts (the bundled CLI, GUI front ends, tests) share one
//! implementation.

pub mod config;
pub mod dicom;
pub mod draw;
pub mod export;
pub mod input;
pub mod util;
pub mod viewer;

pub use config::Config;
pub use viewer::{Viewer, ViewerError, ViewerOptions};

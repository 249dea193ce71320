//! Demo viewer for the hybrid renderer.
//!
//! Builds a sample scenegraph, renders it through the hybrid compositor,
//! and exports both surfaces: the raster buffer as a PNG, the vector
//! document as an SVG.

pub mod config;
pub mod demo;

pub use config::ViewerConfig;
pub use demo::demo_scene;

/// Viewer version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Rendering backends and shared renderer infrastructure.
//!
//! This crate provides:
//! - The renderer lifecycle contract every backend satisfies
//! - The retained display-surface tree renderers draw into
//! - The resource loader backing image marks
//! - The vector and raster backends composited by the `compositor` crate

pub mod loader;
pub mod raster;
pub mod renderer;
pub mod surface;
pub mod vector;

pub use loader::{ImageData, ResourceLoader};
pub use raster::{DamageTracker, PixelBuffer, RasterRenderer};
pub use renderer::{Renderer, RendererState};
pub use surface::{
    PositionMode, SharedSurfaceTree, Surface, SurfaceId, SurfaceKind, SurfaceStyle, SurfaceTree,
};
pub use vector::{MarkGroup, VectorDoc, VectorElement, VectorRenderer};

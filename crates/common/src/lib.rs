//! Common types shared across the hybrid renderer workspace.

pub mod color;
pub mod error;
pub mod geometry;

pub use color::Color;
pub use error::{RenderError, RenderResult};
pub use geometry::{PixelRect, Point, Rect, Size};

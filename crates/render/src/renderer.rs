//! Renderer lifecycle contract.

use crate::surface::{SharedSurfaceTree, SurfaceId};
use common::color::Color;
use common::error::{RenderError, RenderResult};
use common::geometry::Point;
use scene::graph::Scenegraph;
use scene::item::MarkItem;
use scene::mark::MarkTypeSet;

/// Base lifecycle bookkeeping embedded in every renderer.
///
/// Holds the view geometry and backdrop shared by the lifecycle calls, so a
/// renderer's own stored state always agrees with what was forwarded to it.
#[derive(Clone, Debug)]
pub struct RendererState {
    width: f32,
    height: f32,
    origin: Point,
    scale: f32,
    background: Option<Color>,
}

impl RendererState {
    pub fn new() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            origin: Point::ZERO,
            scale: 1.0,
            background: None,
        }
    }

    /// Record a new view geometry.
    ///
    /// Extents must be finite and non-negative, the scale finite and
    /// strictly positive; zero extents are allowed.
    pub fn set_view(
        &mut self,
        width: f32,
        height: f32,
        origin: Point,
        scale: f32,
    ) -> RenderResult<()> {
        if !width.is_finite() || !height.is_finite() || width < 0.0 || height < 0.0 {
            return Err(RenderError::geometry(format!(
                "invalid view extent {width}x{height}"
            )));
        }
        if !origin.is_finite() {
            return Err(RenderError::geometry("non-finite view origin"));
        }
        if !scale.is_finite() || scale <= 0.0 {
            return Err(RenderError::geometry(format!("invalid scale factor {scale}")));
        }

        self.width = width;
        self.height = height;
        self.origin = origin;
        self.scale = scale;
        Ok(())
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn background(&self) -> Option<Color> {
        self.background
    }

    pub fn set_background(&mut self, color: Option<Color>) {
        self.background = color;
    }

    /// Width in device pixels.
    pub fn physical_width(&self) -> u32 {
        (self.width * self.scale).ceil() as u32
    }

    /// Height in device pixels.
    pub fn physical_height(&self) -> u32 {
        (self.height * self.scale).ceil() as u32
    }
}

impl Default for RendererState {
    fn default() -> Self {
        Self::new()
    }
}

/// Lifecycle interface satisfied by every backend and by the compositor.
pub trait Renderer {
    /// Bind the renderer to a surface created inside `container` and record
    /// the view geometry. Re-initializing replaces the previous binding.
    fn initialize(
        &mut self,
        surfaces: &SharedSurfaceTree,
        container: SurfaceId,
        width: f32,
        height: f32,
        origin: Point,
        scale: f32,
    ) -> RenderResult<()>;

    /// Apply a new view geometry to the renderer and its surface.
    fn resize(&mut self, width: f32, height: f32, origin: Point, scale: f32) -> RenderResult<()>;

    /// Store the backdrop color.
    fn background(&mut self, color: Color);

    /// Note a single item as needing redraw.
    fn dirty(&mut self, item: &MarkItem);

    /// Redraw every mark whose type is in `filter`. This is the internal
    /// hook behind [`Renderer::render`].
    fn draw(&mut self, scene: &Scenegraph, filter: MarkTypeSet) -> RenderResult<()>;

    /// Full redraw across every known mark type.
    fn render(&mut self, scene: &Scenegraph) -> RenderResult<()> {
        self.draw(scene, MarkTypeSet::all())
    }

    /// Detach from the surface tree and drop retained drawing state.
    /// Safe to call repeatedly; the renderer may be re-initialized after.
    fn release(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_view() {
        let mut state = RendererState::new();
        state
            .set_view(300.0, 200.0, Point::new(10.0, 5.0), 2.0)
            .unwrap();

        assert_eq!(state.width(), 300.0);
        assert_eq!(state.physical_width(), 600);
        assert_eq!(state.physical_height(), 400);
        assert_eq!(state.origin(), Point::new(10.0, 5.0));
    }

    #[test]
    fn test_set_view_rejects_bad_geometry() {
        let mut state = RendererState::new();
        assert!(state.set_view(f32::NAN, 10.0, Point::ZERO, 1.0).is_err());
        assert!(state.set_view(-1.0, 10.0, Point::ZERO, 1.0).is_err());
        assert!(state.set_view(10.0, 10.0, Point::ZERO, 0.0).is_err());
        // A failed call leaves the previous state untouched.
        assert_eq!(state.width(), 0.0);
        assert_eq!(state.scale(), 1.0);
    }
}

//! Raster rendering backend.
//!
//! Draws marks into an RGBA pixel surface. Per the rendering model, mark
//! content is stamped by extent: each item covers its bounds with its paint,
//! blended over the backdrop.

use crate::loader::ResourceLoader;
use crate::renderer::{Renderer, RendererState};
use crate::surface::{SharedSurfaceTree, SurfaceId, SurfaceKind};
use common::color::Color;
use common::error::{RenderError, RenderResult};
use common::geometry::{PixelRect, Point, Rect};
use scene::graph::Scenegraph;
use scene::item::MarkItem;
use scene::mark::{MarkType, MarkTypeSet};
use std::sync::Arc;

/// Pixel buffer for rasterization output.
pub struct PixelBuffer {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA pixel data (4 bytes per pixel).
    pub data: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let size = (width as usize) * (height as usize) * 4;
        Self {
            width,
            height,
            data: vec![0; size],
        }
    }

    /// Fill with a color.
    pub fn fill(&mut self, color: Color) {
        for chunk in self.data.chunks_exact_mut(4) {
            chunk[0] = color.r;
            chunk[1] = color.g;
            chunk[2] = color.b;
            chunk[3] = color.a;
        }
    }

    /// Clear to transparent.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Get pixel at position.
    pub fn get_pixel(&self, x: u32, y: u32) -> Color {
        if x >= self.width || y >= self.height {
            return Color::TRANSPARENT;
        }

        let offset = ((y * self.width + x) * 4) as usize;
        Color::rgba(
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
            self.data[offset + 3],
        )
    }

    /// Set pixel at position.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        if x >= self.width || y >= self.height {
            return;
        }

        let offset = ((y * self.width + x) * 4) as usize;
        self.data[offset] = color.r;
        self.data[offset + 1] = color.g;
        self.data[offset + 2] = color.b;
        self.data[offset + 3] = color.a;
    }

    /// Blend pixel at position using source-over compositing.
    pub fn blend_pixel(&mut self, x: u32, y: u32, color: Color) {
        if x >= self.width || y >= self.height || color.a == 0 {
            return;
        }

        let existing = self.get_pixel(x, y);
        self.set_pixel(x, y, color.blend_over(existing));
    }

    /// Blend a color over every pixel in `rect`, clipped to the buffer.
    pub fn fill_rect(&mut self, rect: PixelRect, color: Color) {
        if color.a == 0 {
            return;
        }

        let x0 = rect.x.max(0) as u32;
        let y0 = rect.y.max(0) as u32;
        let x1 = rect
            .x
            .saturating_add(rect.width as i32)
            .clamp(0, self.width as i32) as u32;
        let y1 = rect
            .y
            .saturating_add(rect.height as i32)
            .clamp(0, self.height as i32) as u32;

        for y in y0..y1 {
            for x in x0..x1 {
                self.blend_pixel(x, y, color);
            }
        }
    }

    /// Get as raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

/// Accumulates regions needing repaint between draws.
#[derive(Debug, Default)]
pub struct DamageTracker {
    regions: Vec<Rect>,
}

impl DamageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a damaged region.
    pub fn add_region(&mut self, rect: Rect) {
        self.regions.push(rect);
    }

    /// Get the combined damage region.
    pub fn combined(&self) -> Option<Rect> {
        let mut iter = self.regions.iter();
        let first = *iter.next()?;
        Some(iter.fold(first, |acc, rect| acc.union(rect)))
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Clear all damage.
    pub fn clear(&mut self) {
        self.regions.clear();
    }
}

/// The raster backend.
pub struct RasterRenderer {
    state: RendererState,
    loader: Arc<ResourceLoader>,
    surfaces: Option<SharedSurfaceTree>,
    surface: Option<SurfaceId>,
    buffer: PixelBuffer,
    damage: DamageTracker,
}

impl RasterRenderer {
    pub fn new(loader: Arc<ResourceLoader>) -> Self {
        Self {
            state: RendererState::new(),
            loader,
            surfaces: None,
            surface: None,
            buffer: PixelBuffer::new(0, 0),
            damage: DamageTracker::new(),
        }
    }

    pub fn state(&self) -> &RendererState {
        &self.state
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn damage(&self) -> &DamageTracker {
        &self.damage
    }

    pub fn surface_id(&self) -> Option<SurfaceId> {
        self.surface
    }

    fn detach(&mut self) {
        if let (Some(tree), Some(id)) = (self.surfaces.take(), self.surface.take()) {
            tree.write().remove(id);
        }
    }

    fn view_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.state.width(), self.state.height())
    }

    fn stamp(&mut self, item: &MarkItem) -> RenderResult<()> {
        if item.mark_type == MarkType::Image {
            if let Some(url) = &item.url {
                self.loader.load_image(url)?;
            }
        }

        let Some(paint) = item.fill.or(item.stroke) else {
            return Ok(());
        };

        let origin = self.state.origin();
        let rect = item
            .bounds
            .translate(origin.x, origin.y)
            .to_pixel_rect(self.state.scale());
        self.buffer.fill_rect(rect, paint.with_opacity(item.opacity));
        Ok(())
    }
}

impl Renderer for RasterRenderer {
    fn initialize(
        &mut self,
        surfaces: &SharedSurfaceTree,
        container: SurfaceId,
        width: f32,
        height: f32,
        origin: Point,
        scale: f32,
    ) -> RenderResult<()> {
        if !surfaces.read().contains(container) {
            return Err(RenderError::surface("unknown container surface"));
        }
        self.state.set_view(width, height, origin, scale)?;
        self.detach();

        let mut tree = surfaces.write();
        let id = tree.create_surface(SurfaceKind::Raster);
        tree.append_child(container, id);
        if let Some(surface) = tree.get_mut(id) {
            surface.style.width = width;
            surface.style.height = height;
            surface.style.scale = scale;
        }
        drop(tree);

        self.surfaces = Some(Arc::clone(surfaces));
        self.surface = Some(id);
        self.buffer = PixelBuffer::new(self.state.physical_width(), self.state.physical_height());
        self.damage.clear();
        Ok(())
    }

    fn resize(&mut self, width: f32, height: f32, origin: Point, scale: f32) -> RenderResult<()> {
        self.state.set_view(width, height, origin, scale)?;

        if let (Some(tree), Some(id)) = (&self.surfaces, self.surface) {
            let mut tree = tree.write();
            if let Some(surface) = tree.get_mut(id) {
                surface.style.width = width;
                surface.style.height = height;
                surface.style.scale = scale;
            }
        }

        // The old contents do not survive a reallocation.
        self.buffer = PixelBuffer::new(self.state.physical_width(), self.state.physical_height());
        self.damage.add_region(self.view_rect());
        Ok(())
    }

    fn background(&mut self, color: Color) {
        self.state.set_background(Some(color));
    }

    fn dirty(&mut self, item: &MarkItem) {
        let origin = self.state.origin();
        self.damage
            .add_region(item.bounds.translate(origin.x, origin.y));
    }

    fn draw(&mut self, scene: &Scenegraph, filter: MarkTypeSet) -> RenderResult<()> {
        if self.surface.is_none() {
            return Err(RenderError::invalid("raster renderer not initialized"));
        }

        match self.state.background() {
            Some(color) => self.buffer.fill(color),
            None => self.buffer.clear(),
        }

        for mark in scene.marks() {
            if !filter.contains_mark(mark.mark_type) {
                continue;
            }
            for item in &mark.items {
                self.stamp(item)?;
            }
        }

        self.damage.clear();
        Ok(())
    }

    fn release(&mut self) {
        self.detach();
        self.buffer = PixelBuffer::new(0, 0);
        self.damage.clear();
    }
}

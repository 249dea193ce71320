//! The hybrid compositor.
//!
//! Owns one vector and one raster backend, creates the layered display
//! surfaces they draw into, and partitions every render/dirty request
//! between them according to the routing configuration. In production
//! layering the vector surface absolutely overlays the raster surface and
//! ignores pointer input, so the pair behaves like a single renderer.

use crate::routing::{BackendKind, RoutingHandle};
use common::color::Color;
use common::error::{RenderError, RenderResult};
use common::geometry::Point;
use render::loader::ResourceLoader;
use render::raster::RasterRenderer;
use render::renderer::{Renderer, RendererState};
use render::surface::{PositionMode, SharedSurfaceTree, SurfaceId, SurfaceKind};
use render::vector::VectorRenderer;
use scene::graph::Scenegraph;
use scene::item::MarkItem;
use scene::mark::MarkTypeSet;
use std::sync::Arc;

/// Per-draw compositor statistics.
#[derive(Clone, Debug, Default)]
pub struct CompositorStats {
    /// Items routed to the vector backend by the last draw.
    pub vector_items: usize,
    /// Items routed to the raster backend by the last draw.
    pub raster_items: usize,
    /// Duration of the last draw in milliseconds.
    pub draw_time_ms: f32,
}

/// Compositing renderer layering a vector and a raster backend.
pub struct HybridRenderer {
    state: RendererState,
    routing: RoutingHandle,
    vector: VectorRenderer,
    raster: RasterRenderer,
    surfaces: Option<SharedSurfaceTree>,
    root: Option<SurfaceId>,
    /// Layering mode, fixed when the surfaces are created.
    debug_layering: bool,
    stats: CompositorStats,
}

impl HybridRenderer {
    /// Create a compositor with a private routing configuration.
    ///
    /// Both backends share the given resource loader.
    pub fn new(loader: Arc<ResourceLoader>) -> Self {
        Self::with_routing(loader, RoutingHandle::default())
    }

    /// Create a compositor observing a caller-provided routing handle.
    /// Several displays constructed over clones of one handle all see the
    /// same classification switch.
    pub fn with_routing(loader: Arc<ResourceLoader>, routing: RoutingHandle) -> Self {
        Self {
            state: RendererState::new(),
            routing,
            vector: VectorRenderer::new(loader.clone()),
            raster: RasterRenderer::new(loader),
            surfaces: None,
            root: None,
            debug_layering: false,
            stats: CompositorStats::default(),
        }
    }

    pub fn routing(&self) -> &RoutingHandle {
        &self.routing
    }

    pub fn state(&self) -> &RendererState {
        &self.state
    }

    pub fn vector(&self) -> &VectorRenderer {
        &self.vector
    }

    pub fn raster(&self) -> &RasterRenderer {
        &self.raster
    }

    /// The root layering surface, once initialized.
    pub fn root_surface(&self) -> Option<SurfaceId> {
        self.root
    }

    pub fn stats(&self) -> &CompositorStats {
        &self.stats
    }

    /// Style the root and the two child surfaces for the current mode.
    ///
    /// Production: the vector child overlays the raster child at the same
    /// origin and full extent, and does not intercept pointer input, so all
    /// interaction reaches the raster surface beneath. Debug: both children
    /// stay in normal flow, independently visible and interactive.
    fn apply_layering(&self) {
        let Some(tree) = &self.surfaces else { return };
        let (Some(root), Some(raster_id), Some(vector_id)) =
            (self.root, self.raster.surface_id(), self.vector.surface_id())
        else {
            return;
        };

        let mut tree = tree.write();
        let width = self.state.width();
        let height = self.state.height();
        let scale = self.state.scale();

        if let Some(surface) = tree.get_mut(root) {
            surface.style.position = PositionMode::Flow;
            surface.style.width = width;
            surface.style.height = height;
            surface.style.scale = scale;
        }
        if let Some(surface) = tree.get_mut(raster_id) {
            surface.style.position = PositionMode::Flow;
            surface.style.pointer_events = true;
        }
        if let Some(surface) = tree.get_mut(vector_id) {
            if self.debug_layering {
                surface.style.position = PositionMode::Flow;
                surface.style.offset = Point::ZERO;
                surface.style.pointer_events = true;
            } else {
                surface.style.position = PositionMode::Overlay;
                surface.style.offset = Point::ZERO;
                surface.style.pointer_events = false;
            }
        }
    }
}

impl Renderer for HybridRenderer {
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

        // Re-initializing replaces any previous binding.
        if self.root.is_some() {
            self.release();
        }

        let mut tree = surfaces.write();
        let root = tree.create_surface(SurfaceKind::Group);
        tree.append_child(container, root);
        drop(tree);

        self.surfaces = Some(Arc::clone(surfaces));
        self.root = Some(root);
        self.debug_layering = self.routing.snapshot().debug_layering();

        // Child order fixes the stacking: raster beneath, vector above.
        self.raster
            .initialize(surfaces, root, width, height, origin, scale)?;
        self.vector
            .initialize(surfaces, root, width, height, origin, scale)?;

        self.apply_layering();
        tracing::debug!(
            width,
            height,
            scale,
            debug_layering = self.debug_layering,
            "hybrid renderer initialized"
        );
        Ok(())
    }

    fn resize(&mut self, width: f32, height: f32, origin: Point, scale: f32) -> RenderResult<()> {
        if self.root.is_none() {
            return Err(RenderError::invalid("hybrid renderer not initialized"));
        }

        self.state.set_view(width, height, origin, scale)?;
        self.raster.resize(width, height, origin, scale)?;
        self.vector.resize(width, height, origin, scale)?;
        self.apply_layering();
        Ok(())
    }

    // Only the raster surface paints a backdrop; the vector surface above
    // it stays transparent so the raster background shows through.
    fn background(&mut self, color: Color) {
        self.raster.background(color);
    }

    fn dirty(&mut self, item: &MarkItem) {
        match self.routing.snapshot().backend_for(item.mark_type) {
            BackendKind::Vector => self.vector.dirty(item),
            BackendKind::Raster => self.raster.dirty(item),
        }
    }

    fn draw(&mut self, scene: &Scenegraph, filter: MarkTypeSet) -> RenderResult<()> {
        if self.root.is_none() {
            return Err(RenderError::invalid("hybrid renderer not initialized"));
        }

        let start = std::time::Instant::now();
        let config = self.routing.snapshot();
        let (vector_types, raster_types) = config.partition(filter);

        // A backend whose partition is empty receives no draw call; its
        // surface keeps whatever it last drew.
        if !vector_types.is_empty() {
            self.vector.draw(scene, vector_types)?;
        }
        if !raster_types.is_empty() {
            self.raster.draw(scene, raster_types)?;
        }

        let mut vector_items = 0;
        let mut raster_items = 0;
        for mark in scene.marks() {
            if vector_types.contains_mark(mark.mark_type) {
                vector_items += mark.len();
            } else if raster_types.contains_mark(mark.mark_type) {
                raster_items += mark.len();
            }
        }
        self.stats = CompositorStats {
            vector_items,
            raster_items,
            draw_time_ms: start.elapsed().as_secs_f32() * 1000.0,
        };
        Ok(())
    }

    fn release(&mut self) {
        self.vector.release();
        self.raster.release();
        if let (Some(tree), Some(root)) = (self.surfaces.take(), self.root.take()) {
            tree.write().remove(root);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::geometry::Rect;
    use render::surface::SurfaceTree;
    use scene::graph::SceneBuilder;
    use scene::item::Mark;
    use scene::mark::MarkType;

    const BLUE: Color = Color::rgb(0, 0, 255);
    const RED: Color = Color::rgb(255, 0, 0);

    /// A scene with one rect, one text label, and one line.
    fn mixed_scene() -> Scenegraph {
        let mut builder = SceneBuilder::new(60.0, 40.0);

        let mut rects = Mark::new(MarkType::Rect);
        let id = builder.next_item_id();
        rects.push(MarkItem::new(id, MarkType::Rect, Rect::new(0.0, 0.0, 10.0, 10.0)).with_fill(BLUE));
        builder.add_mark(rects);

        let mut labels = Mark::new(MarkType::Text);
        let id = builder.next_item_id();
        labels.push(
            MarkItem::new(id, MarkType::Text, Rect::new(20.0, 0.0, 10.0, 10.0))
                .with_fill(Color::BLACK)
                .with_text("label"),
        );
        builder.add_mark(labels);

        let mut lines = Mark::new(MarkType::Line);
        let id = builder.next_item_id();
        lines.push(
            MarkItem::new(id, MarkType::Line, Rect::new(40.0, 0.0, 10.0, 10.0))
                .with_stroke(RED, 1.0),
        );
        builder.add_mark(lines);

        builder.build()
    }

    fn window_tree() -> (SharedSurfaceTree, SurfaceId) {
        let mut tree = SurfaceTree::new();
        let window = tree.create_surface(SurfaceKind::Group);
        tree.set_root(window);
        (tree.into_shared(), window)
    }

    fn initialized(routing: RoutingHandle) -> (HybridRenderer, SharedSurfaceTree, SurfaceId) {
        let (shared, window) = window_tree();
        let mut hybrid = HybridRenderer::with_routing(Arc::new(ResourceLoader::new()), routing);
        hybrid
            .initialize(&shared, window, 60.0, 40.0, Point::ZERO, 1.0)
            .unwrap();
        (hybrid, shared, window)
    }

    #[test]
    fn test_surface_structure_production_mode() {
        let (hybrid, shared, window) = initialized(RoutingHandle::default());
        let tree = shared.read();

        let root = hybrid.root_surface().unwrap();
        assert_eq!(tree.children(window), &[root]);

        // Exactly two children in fixed order: raster beneath, vector above.
        let children = tree.children(root);
        assert_eq!(children.len(), 2);
        let raster = tree.get(children[0]).unwrap();
        let vector = tree.get(children[1]).unwrap();
        assert_eq!(raster.kind, SurfaceKind::Raster);
        assert_eq!(vector.kind, SurfaceKind::Vector);

        // The vector surface overlays the raster surface and lets pointer
        // input through.
        assert_eq!(vector.style.position, PositionMode::Overlay);
        assert_eq!(vector.style.offset, Point::ZERO);
        assert!(!vector.style.pointer_events);
        assert_eq!(raster.style.position, PositionMode::Flow);
        assert!(raster.style.pointer_events);
    }

    #[test]
    fn test_surface_structure_debug_mode() {
        let routing = RoutingHandle::default();
        routing.set([MarkType::Text], true);
        let (hybrid, shared, _window) = initialized(routing);

        let tree = shared.read();
        let root = hybrid.root_surface().unwrap();
        let children = tree.children(root);
        let vector = tree.get(children[1]).unwrap();
        assert_eq!(vector.style.position, PositionMode::Flow);
        assert!(vector.style.pointer_events);
    }

    #[test]
    fn test_render_partitions_default_config() {
        let (mut hybrid, _shared, _window) = initialized(RoutingHandle::default());
        hybrid.background(Color::WHITE);
        hybrid.render(&mixed_scene()).unwrap();

        // Vector backend drew exactly the text partition.
        assert_eq!(hybrid.vector().doc().mark_types(), MarkTypeSet::TEXT);
        assert_eq!(hybrid.vector().doc().element_count(), 1);

        // Raster backend stamped the rect and the line but not the text.
        let buffer = hybrid.raster().buffer();
        assert_eq!(buffer.get_pixel(5, 5), BLUE);
        assert_eq!(buffer.get_pixel(25, 5), Color::WHITE);
        assert_eq!(buffer.get_pixel(45, 5), RED);

        assert_eq!(hybrid.stats().vector_items, 1);
        assert_eq!(hybrid.stats().raster_items, 2);
    }

    #[test]
    fn test_render_with_explicit_subset() {
        let (mut hybrid, _shared, _window) = initialized(RoutingHandle::default());
        hybrid.background(Color::WHITE);

        let subset = MarkTypeSet::RECT | MarkTypeSet::TEXT;
        hybrid.draw(&mixed_scene(), subset).unwrap();

        // The line lies outside the subset: neither backend drew it.
        assert_eq!(hybrid.vector().doc().mark_types(), MarkTypeSet::TEXT);
        let buffer = hybrid.raster().buffer();
        assert_eq!(buffer.get_pixel(5, 5), BLUE);
        assert_eq!(buffer.get_pixel(45, 5), Color::WHITE);
    }

    #[test]
    fn test_empty_vector_set_routes_everything_to_raster() {
        let routing = RoutingHandle::default();
        routing.set([], false);
        let (mut hybrid, _shared, _window) = initialized(routing);
        hybrid.background(Color::WHITE);
        hybrid.render(&mixed_scene()).unwrap();

        assert!(hybrid.vector().doc().is_empty());
        assert_eq!(hybrid.stats().vector_items, 0);
        assert_eq!(hybrid.stats().raster_items, 3);

        // The text item now stamps into the raster surface.
        assert_eq!(hybrid.raster().buffer().get_pixel(25, 5), Color::BLACK);
    }

    #[test]
    fn test_dirty_routes_to_exactly_one_backend() {
        let (mut hybrid, _shared, _window) = initialized(RoutingHandle::default());
        let scene = mixed_scene();
        let text_item = scene
            .items()
            .find(|item| item.mark_type == MarkType::Text)
            .unwrap()
            .clone();
        let rect_item = scene
            .items()
            .find(|item| item.mark_type == MarkType::Rect)
            .unwrap()
            .clone();

        hybrid.dirty(&text_item);
        assert_eq!(hybrid.vector().pending_dirty().len(), 1);
        assert!(hybrid.raster().damage().is_empty());

        hybrid.dirty(&rect_item);
        assert_eq!(hybrid.vector().pending_dirty().len(), 1);
        assert_eq!(hybrid.raster().damage().len(), 1);
    }

    #[test]
    fn test_dirty_follows_routing_changes() {
        let (mut hybrid, _shared, _window) = initialized(RoutingHandle::default());
        let scene = mixed_scene();
        let text_item = scene
            .items()
            .find(|item| item.mark_type == MarkType::Text)
            .unwrap()
            .clone();

        hybrid.dirty(&text_item);
        hybrid.routing().set([], false);
        hybrid.dirty(&text_item);

        // Same item, different backend after the replacement.
        assert_eq!(hybrid.vector().pending_dirty().len(), 1);
        assert_eq!(hybrid.raster().damage().len(), 1);
    }

    #[test]
    fn test_routing_replacement_between_renders() {
        let (mut hybrid, _shared, _window) = initialized(RoutingHandle::default());
        hybrid.background(Color::WHITE);
        let scene = mixed_scene();

        hybrid.render(&scene).unwrap();
        assert_eq!(hybrid.vector().doc().element_count(), 1);
        assert_eq!(hybrid.raster().buffer().get_pixel(25, 5), Color::WHITE);

        hybrid.routing().set([], false);
        hybrid.render(&scene).unwrap();

        // The second render uses the new partition; the vector document
        // keeps what it last drew (it received no draw call).
        assert_eq!(hybrid.raster().buffer().get_pixel(25, 5), Color::BLACK);
        assert_eq!(hybrid.vector().doc().element_count(), 1);
    }

    #[test]
    fn test_resize_applies_one_tuple_everywhere() {
        let (mut hybrid, shared, _window) = initialized(RoutingHandle::default());
        let origin = Point::new(4.0, 6.0);
        hybrid.resize(200.0, 100.0, origin, 2.0).unwrap();

        for state in [hybrid.state(), hybrid.vector().state(), hybrid.raster().state()] {
            assert_eq!(state.width(), 200.0);
            assert_eq!(state.height(), 100.0);
            assert_eq!(state.origin(), origin);
            assert_eq!(state.scale(), 2.0);
        }
        assert_eq!(hybrid.raster().buffer().width, 400);

        let tree = shared.read();
        let root = hybrid.root_surface().unwrap();
        for id in [root, hybrid.raster().surface_id().unwrap(), hybrid.vector().surface_id().unwrap()] {
            let style = &tree.get(id).unwrap().style;
            assert_eq!((style.width, style.height, style.scale), (200.0, 100.0, 2.0));
        }
    }

    #[test]
    fn test_background_reaches_raster_only() {
        let (mut hybrid, _shared, _window) = initialized(RoutingHandle::default());
        hybrid.background(Color::rgb(1, 2, 3));

        assert_eq!(hybrid.raster().state().background(), Some(Color::rgb(1, 2, 3)));
        assert_eq!(hybrid.vector().state().background(), None);
    }

    #[test]
    fn test_draw_requires_initialize() {
        let mut hybrid = HybridRenderer::new(Arc::new(ResourceLoader::new()));
        let err = hybrid.render(&mixed_scene()).unwrap_err();
        assert!(matches!(err, RenderError::InvalidOperation(_)));
        assert!(hybrid.resize(10.0, 10.0, Point::ZERO, 1.0).is_err());
    }

    #[test]
    fn test_release_removes_surfaces() {
        let (mut hybrid, shared, window) = initialized(RoutingHandle::default());
        assert_eq!(shared.read().len(), 4);

        hybrid.release();
        let tree = shared.read();
        assert_eq!(tree.len(), 1);
        assert!(tree.children(window).is_empty());
        drop(tree);

        assert!(hybrid.root_surface().is_none());
        // Releasing again is a no-op.
        hybrid.release();

        // The compositor can be re-initialized after a release.
        hybrid
            .initialize(&shared, window, 30.0, 30.0, Point::ZERO, 1.0)
            .unwrap();
        assert_eq!(shared.read().len(), 4);
    }

    #[test]
    fn test_shared_routing_across_compositors() {
        let routing = RoutingHandle::default();
        let (mut first, _shared_a, _) = initialized(routing.clone());
        let (mut second, _shared_b, _) = initialized(routing.clone());
        first.background(Color::WHITE);
        second.background(Color::WHITE);

        routing.set([], false);
        let scene = mixed_scene();
        first.render(&scene).unwrap();
        second.render(&scene).unwrap();

        assert!(first.vector().doc().is_empty());
        assert!(second.vector().doc().is_empty());
    }
}

//! Vector rendering backend.
//!
//! Draws marks as retained vector elements grouped per mark type. The
//! element tree is the backend's surface content; [`VectorDoc::to_svg`]
//! serializes it for export.

use crate::loader::ResourceLoader;
use crate::renderer::{Renderer, RendererState};
use crate::surface::{SharedSurfaceTree, SurfaceId, SurfaceKind};
use common::color::Color;
use common::error::{RenderError, RenderResult};
use common::geometry::{Point, Rect};
use indexmap::IndexMap;
use scene::graph::Scenegraph;
use scene::item::{Mark, MarkItem};
use scene::mark::{MarkType, MarkTypeSet};
use std::fmt::Write as _;
use std::sync::Arc;

/// A retained vector element.
#[derive(Clone, Debug, PartialEq)]
pub enum VectorElement {
    /// A positioned text run.
    Text {
        id: u64,
        origin: Point,
        content: String,
        fill: Color,
        opacity: f32,
    },
    /// Any non-text primitive, retained by extent and paint.
    Shape {
        id: u64,
        bounds: Rect,
        fill: Option<Color>,
        stroke: Option<Color>,
        stroke_width: f32,
        opacity: f32,
    },
}

impl VectorElement {
    pub fn id(&self) -> u64 {
        match self {
            VectorElement::Text { id, .. } => *id,
            VectorElement::Shape { id, .. } => *id,
        }
    }
}

/// Elements of one mark type, kept together in document order.
#[derive(Clone, Debug, Default)]
pub struct MarkGroup {
    pub elements: Vec<VectorElement>,
}

impl MarkGroup {
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// The retained vector document: one group per materialized mark type.
#[derive(Clone, Debug, Default)]
pub struct VectorDoc {
    origin: Point,
    groups: IndexMap<MarkType, MarkGroup>,
}

impl VectorDoc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub(crate) fn set_origin(&mut self, origin: Point) {
        self.origin = origin;
    }

    pub fn group(&self, mark_type: MarkType) -> Option<&MarkGroup> {
        self.groups.get(&mark_type)
    }

    /// Materialized groups in document order.
    pub fn groups(&self) -> impl Iterator<Item = (MarkType, &MarkGroup)> {
        self.groups.iter().map(|(mark_type, group)| (*mark_type, group))
    }

    /// Mark types currently materialized.
    pub fn mark_types(&self) -> MarkTypeSet {
        self.groups.keys().copied().collect()
    }

    pub fn element_count(&self) -> usize {
        self.groups.values().map(|group| group.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    fn append(&mut self, mark_type: MarkType, elements: Vec<VectorElement>) {
        self.groups
            .entry(mark_type)
            .or_default()
            .elements
            .extend(elements);
    }

    fn remove_group(&mut self, mark_type: MarkType) {
        self.groups.shift_remove(&mark_type);
    }

    pub fn clear(&mut self) {
        self.groups.clear();
    }

    /// Serialize the document as standalone SVG markup.
    pub fn to_svg(&self, width: f32, height: f32) -> String {
        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}">"#
        );
        let _ = writeln!(
            svg,
            r#"  <g transform="translate({},{})">"#,
            self.origin.x, self.origin.y
        );

        for (mark_type, group) in self.groups() {
            let _ = writeln!(svg, r#"    <g class="mark-{}">"#, mark_type.name());
            for element in &group.elements {
                match element {
                    VectorElement::Text {
                        origin,
                        content,
                        fill,
                        opacity,
                        ..
                    } => {
                        let _ = writeln!(
                            svg,
                            r#"      <text x="{}" y="{}" fill="{}" opacity="{}">{}</text>"#,
                            origin.x,
                            origin.y,
                            fill.to_hex_string(),
                            opacity,
                            escape_text(content),
                        );
                    }
                    VectorElement::Shape {
                        bounds,
                        fill,
                        stroke,
                        stroke_width,
                        opacity,
                        ..
                    } => {
                        let fill = fill.map_or_else(|| "none".to_string(), |c| c.to_hex_string());
                        let stroke =
                            stroke.map_or_else(|| "none".to_string(), |c| c.to_hex_string());
                        let _ = writeln!(
                            svg,
                            r#"      <rect x="{}" y="{}" width="{}" height="{}" fill="{}" stroke="{}" stroke-width="{}" opacity="{}"/>"#,
                            bounds.x,
                            bounds.y,
                            bounds.width,
                            bounds.height,
                            fill,
                            stroke,
                            stroke_width,
                            opacity,
                        );
                    }
                }
            }
            let _ = writeln!(svg, "    </g>");
        }

        let _ = writeln!(svg, "  </g>");
        svg.push_str("</svg>\n");
        svg
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// The vector backend.
pub struct VectorRenderer {
    state: RendererState,
    loader: Arc<ResourceLoader>,
    surfaces: Option<SharedSurfaceTree>,
    surface: Option<SurfaceId>,
    doc: VectorDoc,
    /// Items noted dirty since the last draw, with their mark types.
    pending: Vec<(u64, MarkType)>,
}

impl VectorRenderer {
    pub fn new(loader: Arc<ResourceLoader>) -> Self {
        Self {
            state: RendererState::new(),
            loader,
            surfaces: None,
            surface: None,
            doc: VectorDoc::new(),
            pending: Vec::new(),
        }
    }

    pub fn state(&self) -> &RendererState {
        &self.state
    }

    pub fn doc(&self) -> &VectorDoc {
        &self.doc
    }

    pub fn surface_id(&self) -> Option<SurfaceId> {
        self.surface
    }

    /// Items noted dirty and not yet covered by a draw.
    pub fn pending_dirty(&self) -> &[(u64, MarkType)] {
        &self.pending
    }

    fn detach(&mut self) {
        if let (Some(tree), Some(id)) = (self.surfaces.take(), self.surface.take()) {
            tree.write().remove(id);
        }
    }

    fn build_elements(&self, mark: &Mark) -> RenderResult<Vec<VectorElement>> {
        let mut elements = Vec::with_capacity(mark.items.len());
        for item in &mark.items {
            elements.push(self.build_element(item)?);
        }
        Ok(elements)
    }

    fn build_element(&self, item: &MarkItem) -> RenderResult<VectorElement> {
        if item.mark_type == MarkType::Image {
            if let Some(url) = &item.url {
                self.loader.load_image(url)?;
            }
        }

        let element = match item.mark_type {
            MarkType::Text => VectorElement::Text {
                id: item.id,
                origin: item.bounds.origin(),
                content: item.text.clone().unwrap_or_default(),
                fill: item.fill.unwrap_or(Color::BLACK),
                opacity: item.opacity,
            },
            _ => VectorElement::Shape {
                id: item.id,
                bounds: item.bounds,
                fill: item.fill,
                stroke: item.stroke,
                stroke_width: item.stroke_width,
                opacity: item.opacity,
            },
        };
        Ok(element)
    }
}

impl Renderer for VectorRenderer {
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
        let id = tree.create_surface(SurfaceKind::Vector);
        tree.append_child(container, id);
        if let Some(surface) = tree.get_mut(id) {
            surface.style.width = width;
            surface.style.height = height;
            surface.style.scale = scale;
        }
        drop(tree);

        self.surfaces = Some(Arc::clone(surfaces));
        self.surface = Some(id);
        self.doc.clear();
        self.pending.clear();
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
        Ok(())
    }

    // The vector surface itself stays transparent; the backdrop is only
    // recorded so the stored state mirrors the lifecycle calls.
    fn background(&mut self, color: Color) {
        self.state.set_background(Some(color));
    }

    fn dirty(&mut self, item: &MarkItem) {
        self.pending.push((item.id, item.mark_type));
    }

    fn draw(&mut self, scene: &Scenegraph, filter: MarkTypeSet) -> RenderResult<()> {
        if self.surface.is_none() {
            return Err(RenderError::invalid("vector renderer not initialized"));
        }

        self.doc.set_origin(self.state.origin());

        // Rebuild every filtered group from the scene.
        for mark_type in filter.iter_marks() {
            self.doc.remove_group(mark_type);
        }
        for mark in scene.marks() {
            if !filter.contains_mark(mark.mark_type) {
                continue;
            }
            let elements = self.build_elements(mark)?;
            self.doc.append(mark.mark_type, elements);
        }

        self.pending
            .retain(|(_, mark_type)| !filter.contains_mark(*mark_type));
        Ok(())
    }

    fn release(&mut self) {
        self.detach();
        self.doc.clear();
        self.pending.clear();
    }
}

//! Display surfaces.
//!
//! The surface tree stands in for the host display system: every renderer
//! binds to one surface and the compositor arranges its surfaces so the
//! combined output reads as a single rendering. Child order within a parent
//! is paint order: earlier children sit visually beneath later ones.

use common::geometry::Point;
use parking_lot::RwLock;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::sync::Arc;

new_key_type! {
    /// Unique identifier for a surface.
    pub struct SurfaceId;
}

/// What a surface holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceKind {
    /// A plain layering element grouping child surfaces.
    Group,
    /// A raster pixel surface.
    Raster,
    /// A vector element surface.
    Vector,
}

/// How a surface is positioned within its parent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PositionMode {
    /// Normal block placement.
    #[default]
    Flow,
    /// Absolutely positioned at `offset` within the parent, on top of
    /// earlier siblings.
    Overlay,
}

/// Style properties governing layering and interaction.
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceStyle {
    /// Positioning mode.
    pub position: PositionMode,
    /// Top-left offset within the parent (used by `Overlay`).
    pub offset: Point,
    /// Content width in logical pixels.
    pub width: f32,
    /// Content height in logical pixels.
    pub height: f32,
    /// Device pixel ratio.
    pub scale: f32,
    /// Whether the surface intercepts pointer input.
    pub pointer_events: bool,
}

impl Default for SurfaceStyle {
    fn default() -> Self {
        Self {
            position: PositionMode::Flow,
            offset: Point::ZERO,
            width: 0.0,
            height: 0.0,
            scale: 1.0,
            pointer_events: true,
        }
    }
}

/// A node in the surface tree.
#[derive(Clone, Debug)]
pub struct Surface {
    /// Surface ID.
    pub id: SurfaceId,
    /// Parent surface.
    pub parent: Option<SurfaceId>,
    /// Child surfaces in paint order.
    pub children: SmallVec<[SurfaceId; 4]>,
    /// Surface kind.
    pub kind: SurfaceKind,
    /// Layering and interaction style.
    pub style: SurfaceStyle,
}

impl Surface {
    fn new(id: SurfaceId, kind: SurfaceKind) -> Self {
        Self {
            id,
            parent: None,
            children: SmallVec::new(),
            kind,
            style: SurfaceStyle::default(),
        }
    }
}

/// Tree of display surfaces.
pub struct SurfaceTree {
    surfaces: SlotMap<SurfaceId, Surface>,
    root: Option<SurfaceId>,
}

impl SurfaceTree {
    pub fn new() -> Self {
        Self {
            surfaces: SlotMap::with_key(),
            root: None,
        }
    }

    /// Create a detached surface.
    pub fn create_surface(&mut self, kind: SurfaceKind) -> SurfaceId {
        self.surfaces.insert_with_key(|id| Surface::new(id, kind))
    }

    pub fn root(&self) -> Option<SurfaceId> {
        self.root
    }

    pub fn set_root(&mut self, id: SurfaceId) {
        self.root = Some(id);
    }

    pub fn get(&self, id: SurfaceId) -> Option<&Surface> {
        self.surfaces.get(id)
    }

    pub fn get_mut(&mut self, id: SurfaceId) -> Option<&mut Surface> {
        self.surfaces.get_mut(id)
    }

    pub fn contains(&self, id: SurfaceId) -> bool {
        self.surfaces.contains_key(id)
    }

    /// Append a child surface. The child paints above existing siblings.
    pub fn append_child(&mut self, parent_id: SurfaceId, child_id: SurfaceId) {
        if let Some(child) = self.surfaces.get_mut(child_id) {
            child.parent = Some(parent_id);
        }
        if let Some(parent) = self.surfaces.get_mut(parent_id) {
            parent.children.push(child_id);
        }
    }

    /// Children of a surface, in paint order.
    pub fn children(&self, id: SurfaceId) -> &[SurfaceId] {
        self.surfaces
            .get(id)
            .map(|surface| surface.children.as_slice())
            .unwrap_or(&[])
    }

    /// Remove a surface and its entire subtree.
    pub fn remove(&mut self, id: SurfaceId) {
        if let Some(parent_id) = self.surfaces.get(id).and_then(|s| s.parent) {
            if let Some(parent) = self.surfaces.get_mut(parent_id) {
                parent.children.retain(|child| *child != id);
            }
        }

        let mut to_remove = vec![id];
        let mut i = 0;
        while i < to_remove.len() {
            if let Some(surface) = self.surfaces.get(to_remove[i]) {
                to_remove.extend(surface.children.iter().copied());
            }
            i += 1;
        }

        for id in to_remove {
            self.surfaces.remove(id);
        }

        if self.root == Some(id) {
            self.root = None;
        }
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// Wrap the tree in a shared handle.
    pub fn into_shared(self) -> SharedSurfaceTree {
        Arc::new(RwLock::new(self))
    }
}

impl Default for SurfaceTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared handle to a surface tree.
pub type SharedSurfaceTree = Arc<RwLock<SurfaceTree>>;

//! Routing configuration: which backend draws which mark type.

use parking_lot::RwLock;
use scene::mark::{MarkType, MarkTypeSet};
use std::sync::Arc;

/// The backend responsible for drawing a mark type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    Vector,
    Raster,
}

/// Classification of mark types between the two backends.
///
/// The classification is a total function over the closed mark-type
/// enumeration: a type listed in the vector set is vector-drawn, every
/// other type is raster-drawn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoutingConfig {
    vector_marks: MarkTypeSet,
    debug_layering: bool,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            vector_marks: MarkTypeSet::TEXT,
            debug_layering: false,
        }
    }
}

impl RoutingConfig {
    pub fn new(vector_marks: impl IntoIterator<Item = MarkType>, debug_layering: bool) -> Self {
        Self {
            vector_marks: vector_marks.into_iter().collect(),
            debug_layering,
        }
    }

    pub fn from_set(vector_marks: MarkTypeSet, debug_layering: bool) -> Self {
        Self {
            vector_marks,
            debug_layering,
        }
    }

    /// Mark types drawn by the vector backend.
    pub fn vector_marks(&self) -> MarkTypeSet {
        self.vector_marks
    }

    /// Whether the surfaces are stacked for inspection instead of overlaid.
    pub fn debug_layering(&self) -> bool {
        self.debug_layering
    }

    /// Classify a mark type.
    pub fn backend_for(&self, mark: MarkType) -> BackendKind {
        if self.vector_marks.contains_mark(mark) {
            BackendKind::Vector
        } else {
            BackendKind::Raster
        }
    }

    /// Split `domain` into (vector, raster) partitions.
    ///
    /// The partitions are exhaustive and exclusive: their union is `domain`
    /// and their intersection is empty.
    pub fn partition(&self, domain: MarkTypeSet) -> (MarkTypeSet, MarkTypeSet) {
        let vector = domain & self.vector_marks;
        let raster = domain - self.vector_marks;
        (vector, raster)
    }
}

/// Shared handle to a routing configuration.
///
/// Cloned handles observe the same configuration: a `set`/`replace` through
/// any clone is visible to every holder on its next [`RoutingHandle::snapshot`].
/// Renderers constructed without an explicit handle get a private one, so
/// configuration is per-instance unless callers opt into sharing.
#[derive(Clone, Default)]
pub struct RoutingHandle {
    inner: Arc<RwLock<RoutingConfig>>,
}

impl RoutingHandle {
    pub fn new(config: RoutingConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Replace the configuration wholesale.
    pub fn set(&self, vector_marks: impl IntoIterator<Item = MarkType>, debug_layering: bool) {
        self.replace(RoutingConfig::new(vector_marks, debug_layering));
    }

    /// Replace the configuration wholesale.
    pub fn replace(&self, config: RoutingConfig) {
        *self.inner.write() = config;
    }

    /// Read the current configuration.
    ///
    /// A snapshot is a plain value: partitions computed from it are not
    /// affected by later replacements.
    pub fn snapshot(&self) -> RoutingConfig {
        self.inner.read().clone()
    }
}

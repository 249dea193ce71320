//! Hybrid compositing renderer.
//!
//! Overlays a vector and a raster backend into a single visual output:
//! mark types are partitioned between the backends by a routing
//! configuration, lifecycle calls are forwarded to both, and the two
//! surfaces are layered so the combined output reads as one rendering.

pub mod hybrid;
pub mod routing;

pub use hybrid::{CompositorStats, HybridRenderer};
pub use routing::{BackendKind, RoutingConfig, RoutingHandle};

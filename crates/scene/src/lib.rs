//! Scenegraph model for the hybrid renderer.
//!
//! This crate defines:
//! - The closed enumeration of mark types and sets over it
//! - Mark items (drawable leaves) and homogeneous marks
//! - The scenegraph tree and a builder for constructing it

pub mod graph;
pub mod item;
pub mod mark;

pub use graph::{GroupItem, SceneBuilder, Scenegraph};
pub use item::{Mark, MarkItem};
pub use mark::{MarkType, MarkTypeSet};

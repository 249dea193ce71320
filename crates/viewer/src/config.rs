//! Viewer configuration.

use common::color::Color;
use scene::mark::{MarkType, MarkTypeSet};

/// Viewer configuration.
#[derive(Clone, Debug)]
pub struct ViewerConfig {
    /// Content width in logical pixels.
    pub width: f32,
    /// Content height in logical pixels.
    pub height: f32,
    /// Device pixel ratio.
    pub scale: f32,
    /// Backdrop painted by the raster surface.
    pub background: Color,
    /// Names of mark types drawn by the vector backend.
    pub vector_marks: Vec<String>,
    /// Stack the surfaces for inspection instead of overlaying them.
    pub debug_layering: bool,
    /// Output path for the raster surface.
    pub raster_output: String,
    /// Output path for the vector surface.
    pub vector_output: String,
}

impl ViewerConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration for high-dpi output.
    pub fn hidpi() -> Self {
        Self {
            scale: 2.0,
            ..Self::default()
        }
    }

    /// Resolve the configured mark-type names.
    ///
    /// Returns the recognized set plus the names that failed to parse;
    /// unrecognized names are skipped, which leaves those marks in the
    /// raster bucket.
    pub fn parse_vector_marks(&self) -> (MarkTypeSet, Vec<&str>) {
        let mut set = MarkTypeSet::empty();
        let mut unknown = Vec::new();
        for name in &self.vector_marks {
            match MarkType::from_name(name) {
                Some(mark) => set.insert_mark(mark),
                None => unknown.push(name.as_str()),
            }
        }
        (set, unknown)
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            width: 640.0,
            height: 480.0,
            scale: 1.0,
            background: Color::WHITE,
            vector_marks: vec!["text".to_string()],
            debug_layering: false,
            raster_output: "raster.png".to_string(),
            vector_output: "vector.svg".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_routes_text() {
        let config = ViewerConfig::default();
        let (set, unknown) = config.parse_vector_marks();
        assert_eq!(set, MarkTypeSet::TEXT);
        assert!(unknown.is_empty());
    }

    #[test]
    fn test_unknown_names_are_reported() {
        let config = ViewerConfig {
            vector_marks: vec!["text".to_string(), "sparkline".to_string()],
            ..ViewerConfig::default()
        };
        let (set, unknown) = config.parse_vector_marks();
        assert_eq!(set, MarkTypeSet::TEXT);
        assert_eq!(unknown, vec!["sparkline"]);
    }
}

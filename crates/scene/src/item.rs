//! Mark items: the drawable leaves of the scenegraph.

use crate::mark::MarkType;
use common::color::Color;
use common::geometry::Rect;
use serde::{Deserialize, Serialize};

/// A single drawable leaf node with one mark type.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MarkItem {
    /// Stable identity within the scenegraph.
    pub id: u64,
    /// Visual primitive category.
    pub mark_type: MarkType,
    /// Bounding rectangle in logical pixels.
    pub bounds: Rect,
    /// Fill color.
    pub fill: Option<Color>,
    /// Stroke color.
    pub stroke: Option<Color>,
    /// Stroke width in logical pixels.
    pub stroke_width: f32,
    /// Opacity (0.0 - 1.0).
    pub opacity: f32,
    /// Text content (text marks).
    pub text: Option<String>,
    /// Asset URL (image marks), resolved through the resource loader.
    pub url: Option<String>,
}

impl MarkItem {
    pub fn new(id: u64, mark_type: MarkType, bounds: Rect) -> Self {
        Self {
            id,
            mark_type,
            bounds,
            fill: None,
            stroke: None,
            stroke_width: 1.0,
            opacity: 1.0,
            text: None,
            url: None,
        }
    }

    pub fn with_fill(mut self, fill: Color) -> Self {
        self.fill = Some(fill);
        self
    }

    pub fn with_stroke(mut self, stroke: Color, width: f32) -> Self {
        self.stroke = Some(stroke);
        self.stroke_width = width;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// A homogeneous collection of items sharing one mark type.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Mark {
    /// Mark type of every item in this mark.
    pub mark_type: MarkType,
    /// Optional mark name, for diagnostics.
    pub name: Option<String>,
    /// Whether the mark participates in pointer interaction.
    pub interactive: bool,
    /// The drawable items.
    pub items: Vec<MarkItem>,
}

impl Mark {
    pub fn new(mark_type: MarkType) -> Self {
        Self {
            mark_type,
            name: None,
            interactive: true,
            items: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Append an item. The item's mark type must match the mark's.
    pub fn push(&mut self, item: MarkItem) {
        debug_assert_eq!(item.mark_type, self.mark_type);
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Union of the item bounds, or an empty rect for an empty mark.
    pub fn bounds(&self) -> Rect {
        let mut iter = self.items.iter();
        let first = match iter.next() {
            Some(item) => item.bounds,
            None => return Rect::ZERO,
        };
        iter.fold(first, |acc, item| acc.union(&item.bounds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_builder() {
        let item = MarkItem::new(1, MarkType::Rect, Rect::new(0.0, 0.0, 10.0, 10.0))
            .with_fill(Color::rgb(200, 0, 0))
            .with_opacity(1.5);

        assert_eq!(item.mark_type, MarkType::Rect);
        assert_eq!(item.opacity, 1.0);
        assert!(item.fill.is_some());
    }

    #[test]
    fn test_mark_bounds() {
        let mut mark = Mark::new(MarkType::Symbol);
        mark.push(MarkItem::new(1, MarkType::Symbol, Rect::new(0.0, 0.0, 10.0, 10.0)));
        mark.push(MarkItem::new(2, MarkType::Symbol, Rect::new(20.0, 5.0, 10.0, 10.0)));

        assert_eq!(mark.bounds(), Rect::new(0.0, 0.0, 30.0, 15.0));
        assert_eq!(Mark::new(MarkType::Symbol).bounds(), Rect::ZERO);
    }
}

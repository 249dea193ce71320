//! Scenegraph tree and builder.

use crate::item::{Mark, MarkItem};
use crate::mark::MarkTypeSet;
use common::geometry::Rect;
use serde::{Deserialize, Serialize};

/// A group node: child marks plus nested groups, with its own bounds.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GroupItem {
    /// Group bounds in logical pixels.
    pub bounds: Rect,
    /// Marks owned by this group, in paint order.
    pub marks: Vec<Mark>,
    /// Nested child groups, painted after the marks.
    pub groups: Vec<GroupItem>,
}

impl GroupItem {
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            marks: Vec::new(),
            groups: Vec::new(),
        }
    }

    fn collect_marks<'a>(&'a self, out: &mut Vec<&'a Mark>) {
        for mark in &self.marks {
            out.push(mark);
        }
        for group in &self.groups {
            group.collect_marks(out);
        }
    }
}

/// An externally-owned tree whose leaves are mark items.
///
/// Renderers only read the scenegraph; they never mutate it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scenegraph {
    root: GroupItem,
}

impl Scenegraph {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            root: GroupItem::new(Rect::new(0.0, 0.0, width, height)),
        }
    }

    pub fn root(&self) -> &GroupItem {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut GroupItem {
        &mut self.root
    }

    pub fn bounds(&self) -> Rect {
        self.root.bounds
    }

    /// Append a mark to the root group.
    pub fn add_mark(&mut self, mark: Mark) {
        self.root.marks.push(mark);
    }

    /// All marks in the tree, depth-first in paint order.
    pub fn marks(&self) -> Vec<&Mark> {
        let mut out = Vec::new();
        self.root.collect_marks(&mut out);
        out
    }

    /// All items in the tree, depth-first in paint order.
    pub fn items(&self) -> impl Iterator<Item = &MarkItem> {
        self.marks().into_iter().flat_map(|mark| mark.items.iter())
    }

    /// The set of mark types present anywhere in the tree.
    pub fn mark_types(&self) -> MarkTypeSet {
        self.marks().iter().map(|mark| mark.mark_type).collect()
    }

    /// Total number of items in the tree.
    pub fn item_count(&self) -> usize {
        self.marks().iter().map(|mark| mark.len()).sum()
    }
}

/// Builder for constructing scenes group by group.
pub struct SceneBuilder {
    scene: Scenegraph,
    /// Index path from the root to the group under construction.
    group_stack: Vec<usize>,
    next_id: u64,
}

impl SceneBuilder {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            scene: Scenegraph::new(width, height),
            group_stack: Vec::new(),
            next_id: 1,
        }
    }

    fn current_group(&mut self) -> &mut GroupItem {
        let mut group = &mut self.scene.root;
        for &index in &self.group_stack {
            group = &mut group.groups[index];
        }
        group
    }

    /// Open a nested group; subsequent marks land inside it.
    pub fn push_group(&mut self, bounds: Rect) -> &mut Self {
        let group = self.current_group();
        group.groups.push(GroupItem::new(bounds));
        let index = group.groups.len() - 1;
        self.group_stack.push(index);
        self
    }

    /// Close the current group.
    pub fn pop_group(&mut self) -> &mut Self {
        self.group_stack.pop();
        self
    }

    /// Append a fully-formed mark to the current group.
    pub fn add_mark(&mut self, mark: Mark) -> &mut Self {
        self.current_group().marks.push(mark);
        self
    }

    /// Allocate the next item id.
    pub fn next_item_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn build(self) -> Scenegraph {
        self.scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mark::MarkType;
    use common::color::Color;

    fn rect_mark(builder: &mut SceneBuilder, count: usize) -> Mark {
        let mut mark = Mark::new(MarkType::Rect);
        for i in 0..count {
            let id = builder.next_item_id();
            mark.push(
                MarkItem::new(id, MarkType::Rect, Rect::new(i as f32 * 10.0, 0.0, 8.0, 8.0))
                    .with_fill(Color::rgb(70, 130, 180)),
            );
        }
        mark
    }

    #[test]
    fn test_scene_queries() {
        let mut builder = SceneBuilder::new(200.0, 100.0);
        let rects = rect_mark(&mut builder, 3);
        builder.add_mark(rects);

        builder.push_group(Rect::new(50.0, 50.0, 100.0, 50.0));
        let mut labels = Mark::new(MarkType::Text);
        let id = builder.next_item_id();
        labels.push(
            MarkItem::new(id, MarkType::Text, Rect::new(0.0, 0.0, 40.0, 12.0)).with_text("total"),
        );
        builder.add_mark(labels);
        builder.pop_group();

        let scene = builder.build();
        assert_eq!(scene.marks().len(), 2);
        assert_eq!(scene.item_count(), 4);

        let types = scene.mark_types();
        assert!(types.contains_mark(MarkType::Rect));
        assert!(types.contains_mark(MarkType::Text));
        assert_eq!(types.count(), 2);
    }

    #[test]
    fn test_nested_group_paint_order() {
        let mut builder = SceneBuilder::new(100.0, 100.0);
        builder.push_group(Rect::new(0.0, 0.0, 50.0, 50.0));
        let mark = rect_mark(&mut builder, 1);
        builder.add_mark(mark);
        builder.pop_group();
        let outer = rect_mark(&mut builder, 2);
        builder.add_mark(outer);

        let scene = builder.build();
        let marks = scene.marks();
        // Root marks first, nested groups after.
        assert_eq!(marks[0].len(), 2);
        assert_eq!(marks[1].len(), 1);
    }
}

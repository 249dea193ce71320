//! Sample scenegraph used by the viewer binary and its tests.

use common::color::Color;
use common::geometry::Rect;
use scene::graph::{SceneBuilder, Scenegraph};
use scene::item::{Mark, MarkItem};
use scene::mark::MarkType;

const BAR_VALUES: [f32; 5] = [0.35, 0.62, 0.48, 0.91, 0.73];
const BAR_FILL: Color = Color::rgb(70, 130, 180);
const AXIS: Color = Color::rgb(68, 68, 68);

/// Build a small bar chart: bars, a baseline rule, point markers, and
/// text labels.
pub fn demo_scene(width: f32, height: f32) -> Scenegraph {
    let mut builder = SceneBuilder::new(width, height);

    let margin = 40.0;
    let plot_width = width - margin * 2.0;
    let plot_height = height - margin * 2.0;
    let baseline = margin + plot_height;
    let step = plot_width / BAR_VALUES.len() as f32;
    let bar_width = step * 0.7;

    let mut bars = Mark::new(MarkType::Rect).with_name("bars");
    for (index, value) in BAR_VALUES.iter().enumerate() {
        let bar_height = plot_height * value;
        let x = margin + index as f32 * step + (step - bar_width) / 2.0;
        let id = builder.next_item_id();
        bars.push(
            MarkItem::new(id, MarkType::Rect, Rect::new(x, baseline - bar_height, bar_width, bar_height))
                .with_fill(BAR_FILL),
        );
    }
    builder.add_mark(bars);

    let mut rule = Mark::new(MarkType::Rule).with_name("baseline");
    let id = builder.next_item_id();
    rule.push(
        MarkItem::new(id, MarkType::Rule, Rect::new(margin, baseline, plot_width, 1.0))
            .with_stroke(AXIS, 1.0),
    );
    builder.add_mark(rule);

    let mut points = Mark::new(MarkType::Symbol).with_name("peaks");
    for (index, value) in BAR_VALUES.iter().enumerate() {
        let x = margin + index as f32 * step + step / 2.0;
        let y = baseline - plot_height * value;
        let id = builder.next_item_id();
        points.push(
            MarkItem::new(id, MarkType::Symbol, Rect::new(x - 3.0, y - 3.0, 6.0, 6.0))
                .with_fill(AXIS),
        );
    }
    builder.add_mark(points);

    let mut labels = Mark::new(MarkType::Text).with_name("labels");
    let id = builder.next_item_id();
    labels.push(
        MarkItem::new(id, MarkType::Text, Rect::new(margin, margin / 2.0, 200.0, 14.0))
            .with_fill(Color::BLACK)
            .with_text("Sample bar chart"),
    );
    for (index, value) in BAR_VALUES.iter().enumerate() {
        let x = margin + index as f32 * step + step / 2.0 - 10.0;
        let id = builder.next_item_id();
        labels.push(
            MarkItem::new(id, MarkType::Text, Rect::new(x, baseline + 6.0, 20.0, 12.0))
                .with_fill(AXIS)
                .with_text(format!("{:.0}%", value * 100.0)),
        );
    }
    builder.add_mark(labels);

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scene::mark::MarkTypeSet;

    #[test]
    fn test_demo_scene_contents() {
        let scene = demo_scene(640.0, 480.0);

        let expected: MarkTypeSet =
            [MarkType::Rect, MarkType::Rule, MarkType::Symbol, MarkType::Text]
                .into_iter()
                .collect();
        assert_eq!(scene.mark_types(), expected);
        // 5 bars + 1 rule + 5 points + 6 labels.
        assert_eq!(scene.item_count(), 17);
    }
}

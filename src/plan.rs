//! Working out what is visible.

use crate::rect::Rect;
use crate::widget::Widget;
use cgmath::{EuclideanSpace, Point2, Vector2};

/// A widget that will be rendered this frame.
#[derive(Debug, Clone)]
pub struct RenderItem {
    pub widget: Widget,
    /// Resolved origin relative to the parent, in points.
    pub origin: Point2<f64>,
    pub width: f64,
    pub height: f64,
    /// Depth in the tree; the root is at level 0.
    pub level: usize,
    /// Index of the parent item in the same list.
    pub parent: Option<usize>,
    /// The widget's own scale.
    pub scale: f64,
    /// Product of the scales of all ancestors and the widget itself.
    pub composite_scale: f64,
    /// Origin in the view coordinate system.
    pub translated_origin: Point2<f64>,
    /// Visible part of the widget in the view coordinate system.
    pub scissor: Rect,
}

impl RenderItem {
    pub fn size(&self) -> Vector2<f64> {
        Vector2::new(self.width, self.height)
    }
}

struct Parent {
    index: Option<usize>,
    level: usize,
    size: Vector2<f64>,
    translated_origin: Point2<f64>,
    scale: f64,
    scissor: Rect,
}

/// Lists all visible widgets in the tree below (and including) `root` in pre-order.
///
/// Hidden widgets, widgets with no area, and widgets entirely outside the scissor of their parent
/// (or `viewport`, for the root) are skipped along with all of their subwidgets.
pub fn plan(root: &Widget, viewport: Rect) -> Vec<RenderItem> {
    let mut items = Vec::new();
    let top = Parent {
        index: None,
        level: 0,
        size: Vector2::new(0., 0.),
        translated_origin: Point2::origin(),
        scale: 1.,
        scissor: viewport,
    };
    visit(root, &top, &mut items);
    items
}

fn visit(widget: &Widget, parent: &Parent, items: &mut Vec<RenderItem>) {
    let snapshot = widget.snapshot(parent.size);
    if snapshot.hidden {
        return;
    }

    let frame = snapshot.frame;
    if frame.size.x <= 0. || frame.size.y <= 0. {
        return;
    }

    let composite_scale = parent.scale * snapshot.scale;
    let translated_origin = parent.translated_origin + frame.origin.to_vec() * parent.scale;
    let bounds = Rect::new(translated_origin, frame.size * composite_scale);
    let scissor = match parent.scissor.intersect(bounds) {
        Some(scissor) => scissor,
        None => return,
    };

    let level = match parent.index {
        Some(_) => parent.level + 1,
        None => 0,
    };
    let index = items.len();
    items.push(RenderItem {
        widget: widget.clone(),
        origin: frame.origin,
        width: frame.size.x,
        height: frame.size.y,
        level,
        parent: parent.index,
        scale: snapshot.scale,
        composite_scale,
        translated_origin,
        scissor,
    });

    let this = Parent {
        index: Some(index),
        level,
        size: frame.size,
        translated_origin,
        scale: composite_scale,
        scissor,
    };
    for child in &snapshot.children {
        visit(child, &this, items);
    }
}

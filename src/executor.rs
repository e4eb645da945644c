//! Drawing a planned frame.

use crate::canvas::Canvas;
use crate::plan::RenderItem;
use crate::rect::Rect;

/// Renders a list of items produced by the planner.
///
/// Every item is opened with `save`, its transform and scissor, and `widget_will_render`, then
/// finalized with `widget_did_render` and `restore` once all of its subwidgets have been
/// finalized. The canvas state is balanced when this returns.
pub fn execute(items: &[RenderItem], canvas: &mut dyn Canvas) {
    let mut stack: Vec<&RenderItem> = Vec::new();

    for item in items {
        finalize(&mut stack, item.level, canvas);
        stack.push(item);

        canvas.save();
        canvas.translate(item.origin.x, item.origin.y);
        canvas.scale(item.scale, item.scale);
        canvas.intersect_scissor(Rect::from_xywh(0., 0., item.width, item.height));

        item.widget.will_render(canvas);

        canvas.save();
        item.widget.render_on_demand(canvas, item.size());
        canvas.restore();
    }

    finalize(&mut stack, 0, canvas);
}

/// Pops and finalizes all open items at `level` or deeper.
fn finalize(stack: &mut Vec<&RenderItem>, level: usize, canvas: &mut dyn Canvas) {
    while let Some(item) = stack.last() {
        if item.level < level {
            break;
        }
        item.widget.did_render(canvas);
        canvas.restore();
        stack.pop();
    }
}

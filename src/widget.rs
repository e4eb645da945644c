//! Widgets.

use crate::cache::{FramebufferUpdate, RenderCache};
use crate::canvas::Canvas;
use crate::color::Color;
use crate::events::Event;
use crate::layout::{HorizontalAlignment, Length, Position, Unit, VerticalAlignment};
use crate::rect::Rect;
use crate::view::ViewCore;
use cgmath::{EuclideanSpace, Point2, Vector2, Zero};
use core::any::Any;
use core::{fmt, mem};
use parking_lot::{Mutex, RwLock};
use std::sync::{Arc, Weak};
use uuid::Uuid;

/// A unique identifier for a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WidgetId(Uuid);

impl WidgetId {
    fn new() -> WidgetId {
        WidgetId(Uuid::new_v4())
    }
}

/// A function that renders a widget's contents in its local coordinate system.
#[derive(Clone)]
pub struct RenderFunction(Arc<Mutex<dyn FnMut(&mut dyn Canvas) + Send>>);

impl RenderFunction {
    pub fn new<F: 'static + FnMut(&mut dyn Canvas) + Send>(function: F) -> Self {
        RenderFunction(Arc::new(Mutex::new(function)))
    }

    fn call(&self, canvas: &mut dyn Canvas) {
        (&mut *self.0.lock())(canvas)
    }
}

impl fmt::Debug for RenderFunction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "RenderFunction")
    }
}

/// Widget behavior.
///
/// All methods have empty default implementations, so implementors only need to override the hooks
/// they care about. Hooks are called with the widget they belong to; they may use it freely, but
/// must not trigger another hook of the same widget (e.g. by hit-testing the view from inside
/// `should_handle_event`).
pub trait Behavior: Any + Send {
    /// Renders the widget's contents.
    ///
    /// Not called if a render function is bound.
    fn render(&mut self, widget: &Widget, canvas: &mut dyn Canvas) {
        let _ = (widget, canvas);
    }

    /// Called right before the widget renders. Transforms applied here also apply to all
    /// subwidgets.
    ///
    /// Not called if the widget is not visible on screen.
    fn widget_will_render(&mut self, widget: &Widget, canvas: &mut dyn Canvas) {
        let _ = (widget, canvas);
    }

    /// Called after the widget and all of its visible subwidgets have rendered.
    ///
    /// Not called if the widget is not visible on screen.
    fn widget_did_render(&mut self, widget: &Widget, canvas: &mut dyn Canvas) {
        let _ = (widget, canvas);
    }

    /// Called before the view starts working out what to render, as long as the widget is
    /// attached and not hidden. A good place to update the widget's bounds, or to render into an
    /// offscreen framebuffer.
    fn view_will_render(&mut self, widget: &Widget, canvas: &mut dyn Canvas) {
        let _ = (widget, canvas);
    }

    /// Called after the view has rendered everything, as long as the widget is attached and not
    /// hidden.
    fn view_did_render(&mut self, widget: &Widget, canvas: &mut dyn Canvas) {
        let _ = (widget, canvas);
    }

    /// Returns true if the widget wants to become the event responder for a pointer at the given
    /// location (in the view coordinate system).
    fn should_handle_event(&mut self, widget: &Widget, location: Point2<f64>) -> bool {
        let _ = (widget, location);
        false
    }

    /// Handles an event. Only called on the current responder.
    ///
    /// Returns true if the event was handled.
    fn handle_event(&mut self, widget: &Widget, event: &Event) -> bool {
        let _ = (widget, event);
        false
    }
}

/// A widget that doesn't do anything on its own.
impl Behavior for () {}

struct WidgetState {
    parent: Weak<WidgetInner>,
    children: Vec<Widget>,
    /// The view this widget is attached to, if any.
    view: Option<Weak<ViewCore>>,
    x: Position<HorizontalAlignment>,
    y: Position<VerticalAlignment>,
    width: Length,
    height: Length,
    scale: f64,
    /// Memoized product of all scales from the root to this widget.
    measured_scale: Option<f64>,
    hidden: bool,
    is_opaque: bool,
    background_color: Color,
    uses_integer_dimensions: bool,
    rendering_offset: Vector2<f64>,
    frees_descendants_on_destruction: bool,
    animation_count: usize,
}

impl WidgetState {
    fn size(&self, parent_size: Vector2<f64>) -> Vector2<f64> {
        let width = self.width.resolve(parent_size.x);
        let height = self.height.resolve(parent_size.y);
        if self.uses_integer_dimensions {
            Vector2::new(width.ceil(), height.ceil())
        } else {
            Vector2::new(width, height)
        }
    }

    fn frame(&self, parent_size: Vector2<f64>) -> Rect {
        let size = self.size(parent_size);
        let origin = Point2::new(
            self.x.resolve(size.x, parent_size.x),
            self.y.resolve(size.y, parent_size.y),
        );
        Rect::new(origin, size)
    }

    fn attached_view(&self) -> Option<Arc<ViewCore>> {
        self.view.as_ref().and_then(Weak::upgrade)
    }
}

struct WidgetInner {
    id: WidgetId,
    state: RwLock<WidgetState>,
    behavior: Mutex<Box<dyn Behavior>>,
    render_function: Mutex<Option<RenderFunction>>,
    /// Present iff the widget caches its rendering.
    cache: Option<RenderCache>,
}

impl Drop for WidgetInner {
    fn drop(&mut self) {
        let state = self.state.get_mut();

        if let Some(view) = state.attached_view() {
            if state.animation_count > 0 {
                view.animation_stopped();
            }
            if let Some(fb) = self.cache.as_ref().and_then(RenderCache::take_framebuffer) {
                view.release_framebuffer(fb);
            }
        }

        let frees_descendants = state.frees_descendants_on_destruction;
        for child in mem::replace(&mut state.children, Vec::new()) {
            child.0.state.write().parent = Weak::new();
            child.attach_recursively(None);
            if frees_descendants {
                child.release_descendants();
            }
        }
    }
}

/// Per-frame data the planner needs from a widget.
pub(crate) struct Snapshot {
    pub hidden: bool,
    pub frame: Rect,
    pub scale: f64,
    pub children: Vec<Widget>,
}

/// A rectangular node in a widget tree.
///
/// This is a cheap handle; clones refer to the same widget. A widget owns its children and holds
/// a weak reference to its parent.
#[derive(Clone)]
pub struct Widget(Arc<WidgetInner>);

impl PartialEq for Widget {
    fn eq(&self, other: &Widget) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Widget {}

impl fmt::Debug for Widget {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let state = self.0.state.read();
        f.debug_struct("Widget")
            .field("id", &self.0.id)
            .field("x", &state.x)
            .field("y", &state.y)
            .field("width", &state.width)
            .field("height", &state.height)
            .field("scale", &state.scale)
            .field("hidden", &state.hidden)
            .field("caches_rendering", &self.0.cache.is_some())
            .field("children", &state.children)
            .finish()
    }
}

impl Default for Widget {
    fn default() -> Self {
        Widget::new()
    }
}

impl Widget {
    /// Creates a widget with no behavior.
    pub fn new() -> Widget {
        Widget::build(false, Box::new(()))
    }

    /// Creates a widget with no behavior that caches its rendering.
    pub fn cached() -> Widget {
        Widget::build(true, Box::new(()))
    }

    pub fn with_behavior<B: Behavior>(behavior: B) -> Widget {
        Widget::build(false, Box::new(behavior))
    }

    /// Creates a widget whose rendering is cached in an offscreen framebuffer and only regenerated
    /// when invalidated.
    pub fn cached_with_behavior<B: Behavior>(behavior: B) -> Widget {
        Widget::build(true, Box::new(behavior))
    }

    fn build(caches_rendering: bool, behavior: Box<dyn Behavior>) -> Widget {
        Widget(Arc::new(WidgetInner {
            id: WidgetId::new(),
            state: RwLock::new(WidgetState {
                parent: Weak::new(),
                children: Vec::new(),
                view: None,
                x: Position::default(),
                y: Position::default(),
                width: Length::default(),
                height: Length::default(),
                scale: 1.,
                measured_scale: None,
                hidden: false,
                is_opaque: true,
                background_color: Color::WHITE,
                uses_integer_dimensions: false,
                rendering_offset: Vector2::zero(),
                frees_descendants_on_destruction: false,
                animation_count: 0,
            }),
            behavior: Mutex::new(behavior),
            render_function: Mutex::new(None),
            cache: if caches_rendering {
                Some(RenderCache::new())
            } else {
                None
            },
        }))
    }

    pub fn id(&self) -> WidgetId {
        self.0.id
    }

    pub fn parent(&self) -> Option<Widget> {
        self.0.state.read().parent.upgrade().map(Widget)
    }

    pub fn children(&self) -> Vec<Widget> {
        self.0.state.read().children.clone()
    }

    /// Returns true if the widget is attached to a view that still exists.
    pub fn is_attached(&self) -> bool {
        self.view().is_some()
    }

    pub(crate) fn view(&self) -> Option<Arc<ViewCore>> {
        self.0.state.read().attached_view()
    }

    pub(crate) fn belongs_to(&self, view: &ViewCore) -> bool {
        let state = self.0.state.read();
        state
            .view
            .as_ref()
            .map_or(false, |v| core::ptr::eq(v.as_ptr(), view))
    }

    /// Returns true if this widget is an ancestor of `other`.
    pub fn is_ancestor_of(&self, other: &Widget) -> bool {
        let mut current = other.parent();
        while let Some(widget) = current {
            if widget == *self {
                return true;
            }
            current = widget.parent();
        }
        false
    }

    /// Adds a subwidget on top of all existing subwidgets.
    ///
    /// If the child already has a parent, it is removed from it first. Returns false (and does
    /// nothing) if this would create a cycle.
    pub fn add_child(&self, child: &Widget) -> bool {
        if child == self || child.is_ancestor_of(self) {
            log::warn!("refusing to add {:?} as a subwidget of itself", child.id());
            return false;
        }
        if child.parent().is_some() {
            child.remove_from_parent();
        }

        child.0.state.write().parent = Arc::downgrade(&self.0);
        let view = {
            let mut state = self.0.state.write();
            state.children.push(child.clone());
            state.view.clone()
        };
        child.attach_recursively(view);
        true
    }

    /// Unlinks the widget from its parent and detaches it from the view.
    ///
    /// Returns false if the widget has no parent or isn't one of its parent's children.
    pub fn remove_from_parent(&self) -> bool {
        let parent = match self.parent() {
            Some(parent) => parent,
            None => return false,
        };
        if !parent.remove_child(self) {
            return false;
        }
        self.0.state.write().parent = Weak::new();
        self.attach_recursively(None);
        true
    }

    fn remove_child(&self, child: &Widget) -> bool {
        let mut state = self.0.state.write();
        match state.children.iter().position(|c| c == child) {
            Some(index) => {
                state.children.remove(index);
                true
            }
            None => false,
        }
    }

    /// Moves a subwidget on top of its siblings.
    ///
    /// Returns false if `child` is not a subwidget of this widget.
    pub fn bring_child_to_front(&self, child: &Widget) -> bool {
        let mut state = self.0.state.write();
        match state.children.iter().position(|c| c == child) {
            Some(index) => {
                let child = state.children.remove(index);
                state.children.push(child);
                true
            }
            None => false,
        }
    }

    /// Moves this widget on top of its siblings.
    pub fn bring_to_front(&self) -> bool {
        match self.parent() {
            Some(parent) => parent.bring_child_to_front(self),
            None => false,
        }
    }

    /// Sets the view for this widget and all of its descendants.
    ///
    /// Also resets memoized scales, since the chain of ancestors may have changed.
    fn attach_recursively(&self, view: Option<Weak<ViewCore>>) {
        let (old_view, animation_count, children) = {
            let mut state = self.0.state.write();
            state.measured_scale = None;
            let old_view = mem::replace(&mut state.view, view.clone());
            let changed = match (&old_view, &view) {
                (Some(a), Some(b)) => !Weak::ptr_eq(a, b),
                (None, None) => false,
                _ => true,
            };
            if changed {
                let count = mem::replace(&mut state.animation_count, 0);
                (old_view, count, state.children.clone())
            } else {
                (None, 0, state.children.clone())
            }
        };

        if let Some(cache) = &self.0.cache {
            cache.invalidate();
            if old_view.is_some() {
                // framebuffers belong to the old view’s canvas
                if let Some(fb) = cache.take_framebuffer() {
                    if let Some(old) = old_view.as_ref().and_then(Weak::upgrade) {
                        old.release_framebuffer(fb);
                    }
                }
            }
        }
        if animation_count > 0 {
            if let Some(old) = old_view.as_ref().and_then(Weak::upgrade) {
                old.animation_stopped();
            }
        }

        for child in children {
            child.attach_recursively(view.clone());
        }
    }

    pub(crate) fn set_view(&self, view: Weak<ViewCore>) {
        self.attach_recursively(Some(view));
    }

    /// Empties the child lists of this widget and all of its descendants.
    fn release_descendants(&self) {
        let children = mem::replace(&mut self.0.state.write().children, Vec::new());
        for child in children {
            child.0.state.write().parent = Weak::new();
            child.release_descendants();
        }
    }

    fn parent_size(&self) -> Vector2<f64> {
        self.parent().map_or(Vector2::zero(), |parent| parent.size())
    }

    /// Returns the resolved size in points.
    pub fn size(&self) -> Vector2<f64> {
        let parent_size = self.parent_size();
        self.0.state.read().size(parent_size)
    }

    /// Returns the resolved origin and size relative to the parent, in points.
    pub fn frame(&self) -> Rect {
        let parent_size = self.parent_size();
        self.0.state.read().frame(parent_size)
    }

    pub fn width(&self) -> f64 {
        self.size().x
    }

    pub fn height(&self) -> f64 {
        self.size().y
    }

    /// Returns the horizontal position in points relative to the parent's left edge.
    pub fn x(&self) -> f64 {
        self.frame().origin.x
    }

    /// Returns the vertical position in points relative to the parent's top edge.
    pub fn y(&self) -> f64 {
        self.frame().origin.y
    }

    pub(crate) fn snapshot(&self, parent_size: Vector2<f64>) -> Snapshot {
        let state = self.0.state.read();
        Snapshot {
            hidden: state.hidden,
            frame: state.frame(parent_size),
            scale: state.scale,
            children: if state.hidden {
                Vec::new()
            } else {
                state.children.clone()
            },
        }
    }

    /// Returns the widget's scale in the view coordinate system.
    pub fn measured_scale(&self) -> f64 {
        let (memoized, scale, parent) = {
            let state = self.0.state.read();
            (state.measured_scale, state.scale, state.parent.upgrade())
        };
        if let Some(measured) = memoized {
            return measured;
        }

        let measured = parent.map_or(1., |parent| Widget(parent).measured_scale()) * scale;
        let mut state = self.0.state.write();
        if state.scale == scale {
            state.measured_scale = Some(measured);
        }
        measured
    }

    /// Returns the widget's origin and scaled size in the view coordinate system.
    pub fn measured_bounds(&self) -> Rect {
        let frame = self.frame();
        let origin = match self.parent() {
            Some(parent) => {
                parent.measured_bounds().origin + frame.origin.to_vec() * parent.measured_scale()
            }
            None => frame.origin,
        };
        Rect::new(origin, frame.size * self.measured_scale())
    }

    /// Returns true if the point (in the view coordinate system) is inside the widget's measured
    /// bounds grown by `padding` in every direction.
    pub fn collide_point(&self, point: Point2<f64>, padding: f64) -> bool {
        self.collide_point_with_padding(point, padding, padding, padding, padding)
    }

    pub fn collide_point_with_padding(
        &self,
        point: Point2<f64>,
        top: f64,
        right: f64,
        bottom: f64,
        left: f64,
    ) -> bool {
        self.measured_bounds()
            .outset(top, right, bottom, left)
            .contains(point)
    }

    /// Sets the bounds in points, relative to the parent's top left corner.
    pub fn set_bounds(&self, x: f64, y: f64, width: f64, height: f64) {
        {
            let mut state = self.0.state.write();
            state.x = Position::new(HorizontalAlignment::Left, Unit::Point, x);
            state.y = Position::new(VerticalAlignment::Top, Unit::Point, y);
            state.width = Length::new(Unit::Point, width);
            state.height = Length::new(Unit::Point, height);
        }
        self.invalidate_cache();
    }

    pub fn set_width(&self, unit: Unit, width: f64) {
        self.0.state.write().width = Length::new(unit, width);
        self.invalidate_cache();
    }

    pub fn set_height(&self, unit: Unit, height: f64) {
        self.0.state.write().height = Length::new(unit, height);
        self.invalidate_cache();
    }

    pub fn set_x(&self, alignment: HorizontalAlignment, unit: Unit, x: f64) {
        self.0.state.write().x = Position::new(alignment, unit, x);
    }

    pub fn set_y(&self, alignment: VerticalAlignment, unit: Unit, y: f64) {
        self.0.state.write().y = Position::new(alignment, unit, y);
    }

    pub fn scale(&self) -> f64 {
        self.0.state.read().scale
    }

    /// Sets the widget's scale. Must be positive.
    pub fn set_scale(&self, scale: f64) {
        if !(scale > 0. && scale.is_finite()) {
            log::warn!("ignoring invalid widget scale {}", scale);
            return;
        }
        self.0.state.write().scale = scale;
        self.reset_measured_scale_recursively();
    }

    fn reset_measured_scale_recursively(&self) {
        let children = {
            let mut state = self.0.state.write();
            state.measured_scale = None;
            state.children.clone()
        };
        self.invalidate_cache();
        for child in children {
            child.reset_measured_scale_recursively();
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.0.state.read().hidden
    }

    pub fn set_hidden(&self, hidden: bool) {
        self.0.state.write().hidden = hidden;
    }

    pub fn is_opaque(&self) -> bool {
        self.0.state.read().is_opaque
    }

    /// If true, the background color is filled into the widget's bounds before rendering.
    pub fn set_is_opaque(&self, is_opaque: bool) {
        self.0.state.write().is_opaque = is_opaque;
        self.invalidate_cache();
    }

    pub fn background_color(&self) -> Color {
        self.0.state.read().background_color
    }

    pub fn set_background_color(&self, color: Color) {
        self.0.state.write().background_color = color;
        self.invalidate_cache();
    }

    pub fn rendering_offset(&self) -> Vector2<f64> {
        self.0.state.read().rendering_offset
    }

    /// Sets the offset from the widget's origin at which its contents are rendered.
    pub fn set_rendering_offset(&self, offset: Vector2<f64>) {
        self.0.state.write().rendering_offset = offset;
        self.invalidate_cache();
    }

    pub fn uses_integer_dimensions(&self) -> bool {
        self.0.state.read().uses_integer_dimensions
    }

    /// If true, resolved widths and heights are rounded up to the next integer.
    pub fn set_uses_integer_dimensions(&self, value: bool) {
        self.0.state.write().uses_integer_dimensions = value;
        self.invalidate_cache();
    }

    pub fn frees_descendants_on_destruction(&self) -> bool {
        self.0.state.read().frees_descendants_on_destruction
    }

    /// If true, dropping the last handle to this widget also dismantles its whole subtree.
    /// Otherwise, subwidgets keep their own subtrees and are only unlinked.
    pub fn set_frees_descendants_on_destruction(&self, value: bool) {
        self.0.state.write().frees_descendants_on_destruction = value;
    }

    pub fn caches_rendering(&self) -> bool {
        self.0.cache.is_some()
    }

    /// Returns the render cache if the widget caches its rendering.
    pub fn cache(&self) -> Option<&RenderCache> {
        self.0.cache.as_ref()
    }

    /// Marks the cached rendering as stale, if there is one.
    pub fn invalidate_cache(&self) {
        if let Some(cache) = &self.0.cache {
            cache.invalidate();
        }
    }

    /// Binds a render function, replacing the previous one.
    pub fn bind_render_function<F>(&self, function: F)
    where
        F: 'static + FnMut(&mut dyn Canvas) + Send,
    {
        *self.0.render_function.lock() = Some(RenderFunction::new(function));
    }

    pub fn unbind_render_function(&self) {
        *self.0.render_function.lock() = None;
    }

    pub fn render_function_is_bound(&self) -> bool {
        self.0.render_function.lock().is_some()
    }

    /// Starts updating the view continuously. Must be balanced with `stop_animation`.
    ///
    /// Does nothing if the widget is not attached to a view.
    pub fn start_animation(&self) {
        let view = {
            let mut state = self.0.state.write();
            let view = match state.attached_view() {
                Some(view) => view,
                None => return,
            };
            state.animation_count += 1;
            if state.animation_count != 1 {
                return;
            }
            view
        };
        view.animation_started();
    }

    /// Ends a previous `start_animation` call.
    pub fn stop_animation(&self) {
        let view = {
            let mut state = self.0.state.write();
            let view = match state.attached_view() {
                Some(view) => view,
                None => return,
            };
            if state.animation_count == 0 {
                return;
            }
            state.animation_count -= 1;
            if state.animation_count != 0 {
                return;
            }
            view
        };
        view.animation_stopped();
    }

    pub fn is_animating(&self) -> bool {
        self.0.state.read().animation_count > 0
    }

    /// Redraws the view containing this widget (which redraws every widget in it).
    ///
    /// Does nothing if the widget is not attached to a view.
    pub fn redraw(&self) {
        let view = match self.view() {
            Some(view) => view,
            None => return,
        };
        self.invalidate_cache();
        view.redraw();
    }

    /// Begins rendering into `cache` at the best scale factor for this widget.
    ///
    /// Returns None if the widget is not attached or the framebuffer could not be allocated.
    pub fn begin_framebuffer_updates<'a>(
        &self,
        cache: &'a RenderCache,
        canvas: &'a mut dyn Canvas,
    ) -> Option<FramebufferUpdate<'a>> {
        let view = self.view()?;
        let scale_factor = view.scale_factor() * self.measured_scale();
        cache.begin_updates(canvas, self.size(), scale_factor)
    }

    /// Fills the background if opaque, then runs the render function or `Behavior::render`.
    fn execute_render_function(&self, canvas: &mut dyn Canvas, size: Vector2<f64>) {
        let (is_opaque, background_color, offset) = {
            let state = self.0.state.read();
            (
                state.is_opaque,
                state.background_color,
                state.rendering_offset,
            )
        };

        if is_opaque {
            canvas.fill_rect(Rect::new(Point2::origin(), size), background_color);
        }
        if offset != Vector2::zero() {
            canvas.translate(offset.x, offset.y);
        }

        let function = self.0.render_function.lock().clone();
        match function {
            Some(function) => function.call(canvas),
            None => self.0.behavior.lock().render(self, canvas),
        }
    }

    /// Regenerates the offscreen rendering if needed. Does nothing for uncached widgets.
    pub(crate) fn render_cache(&self, canvas: &mut dyn Canvas, size: Vector2<f64>, scale_factor: f64) {
        if let Some(cache) = &self.0.cache {
            cache.render_if_needed(canvas, size, scale_factor, |canvas| {
                self.execute_render_function(canvas, size)
            });
        }
    }

    /// Renders either directly or, for cached widgets, the cached framebuffer.
    pub(crate) fn render_on_demand(&self, canvas: &mut dyn Canvas, size: Vector2<f64>) {
        match &self.0.cache {
            Some(cache) => {
                cache.draw(canvas, Rect::new(Point2::origin(), size));
            }
            None => self.execute_render_function(canvas, size),
        }
    }

    pub(crate) fn will_render(&self, canvas: &mut dyn Canvas) {
        self.0.behavior.lock().widget_will_render(self, canvas);
    }

    pub(crate) fn did_render(&self, canvas: &mut dyn Canvas) {
        self.0.behavior.lock().widget_did_render(self, canvas);
    }

    pub(crate) fn view_will_render(&self, canvas: &mut dyn Canvas) {
        self.0.behavior.lock().view_will_render(self, canvas);
    }

    pub(crate) fn view_did_render(&self, canvas: &mut dyn Canvas) {
        self.0.behavior.lock().view_did_render(self, canvas);
    }

    pub(crate) fn should_handle_event(&self, location: Point2<f64>) -> bool {
        self.0.behavior.lock().should_handle_event(self, location)
    }

    pub(crate) fn handle_event(&self, event: &Event) -> bool {
        self.0.behavior.lock().handle_event(self, event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{Command, RecordingCanvas};

    fn sized(width: f64, height: f64) -> Widget {
        let widget = Widget::new();
        widget.set_bounds(0., 0., width, height);
        widget
    }

    #[test]
    fn test_remove_from_parent() {
        let parent = Widget::new();
        let child = Widget::new();
        assert!(!child.remove_from_parent(), "no parent yet");

        assert!(parent.add_child(&child));
        assert_eq!(child.parent(), Some(parent.clone()));

        assert!(child.remove_from_parent());
        assert!(parent.children().is_empty());
        assert_eq!(child.parent(), None);
        assert!(!child.remove_from_parent());
    }

    #[test]
    fn test_reparenting_keeps_a_single_parent() {
        let a = Widget::new();
        let b = Widget::new();
        let child = Widget::new();
        a.add_child(&child);
        b.add_child(&child);
        assert!(a.children().is_empty());
        assert_eq!(b.children(), vec![child.clone()]);
        assert_eq!(child.parent(), Some(b));
    }

    #[test]
    fn test_cycles_are_rejected() {
        let a = Widget::new();
        let b = Widget::new();
        assert!(a.add_child(&b));
        assert!(!b.add_child(&a));
        assert!(!a.add_child(&a));
        assert_eq!(a.parent(), None);
        assert_eq!(a.children(), vec![b]);
    }

    #[test]
    fn test_bring_to_front() {
        let parent = Widget::new();
        let (x, y, z) = (Widget::new(), Widget::new(), Widget::new());
        for w in &[&x, &y, &z] {
            parent.add_child(w);
        }
        assert!(x.bring_to_front());
        assert_eq!(parent.children(), vec![y.clone(), z.clone(), x.clone()]);
        assert!(!parent.bring_child_to_front(&Widget::new()));
        assert!(!parent.bring_to_front(), "root has no siblings to be in front of");
    }

    #[test]
    fn test_measured_scale_is_multiplicative() {
        let a = Widget::new();
        let b = Widget::new();
        let c = Widget::new();
        a.set_scale(2.);
        b.set_scale(3.);
        c.set_scale(0.5);
        a.add_child(&b);
        b.add_child(&c);
        assert_eq!(c.measured_scale(), 3.);

        // changing an ancestor resets memoized descendants
        a.set_scale(4.);
        assert_eq!(c.measured_scale(), 6.);

        // re-attaching somewhere else recomputes it
        let other = Widget::new();
        other.set_scale(10.);
        other.add_child(&c);
        assert_eq!(c.measured_scale(), 5.);
        c.remove_from_parent();
        assert_eq!(c.measured_scale(), 0.5);
    }

    #[test]
    fn test_invalid_scale_is_ignored() {
        let w = Widget::new();
        w.set_scale(0.);
        w.set_scale(-1.);
        w.set_scale(std::f64::NAN);
        assert_eq!(w.scale(), 1.);
    }

    #[test]
    fn test_percent_units_resolve_against_parent() {
        let parent = sized(800., 600.);
        let child = Widget::new();
        child.set_width(Unit::Percent, 50.);
        child.set_height(Unit::Percent, 50.);
        child.set_x(HorizontalAlignment::Right, Unit::Point, 10.);
        child.set_y(VerticalAlignment::Middle, Unit::Percent, 0.);
        parent.add_child(&child);

        assert_eq!(child.size(), Vector2::new(400., 300.));
        assert_eq!(child.x(), 390.);
        assert_eq!(child.y(), 150.);

        // without a parent, percentages resolve against nothing
        child.remove_from_parent();
        assert_eq!(child.width(), 0.);
    }

    #[test]
    fn test_integer_dimensions() {
        let w = sized(10.2, 3.5);
        w.set_uses_integer_dimensions(true);
        assert_eq!(w.size(), Vector2::new(11., 4.));
    }

    #[test]
    fn test_measured_bounds() {
        let root = sized(800., 600.);
        let a = Widget::new();
        a.set_bounds(100., 100., 200., 200.);
        a.set_scale(2.);
        let b = Widget::new();
        b.set_bounds(10., 20., 30., 40.);
        root.add_child(&a);
        a.add_child(&b);

        assert_eq!(a.measured_bounds(), Rect::from_xywh(100., 100., 400., 400.));
        assert_eq!(b.measured_bounds(), Rect::from_xywh(120., 140., 60., 80.));
        assert!(b.collide_point(Point2::new(125., 145.), 0.));
        assert!(!b.collide_point(Point2::new(119., 145.), 0.));
        assert!(b.collide_point(Point2::new(119., 145.), 2.));
    }

    #[test]
    fn test_render_function_replaces_previous() {
        let w = sized(10., 10.);
        w.set_is_opaque(false);
        let calls = Arc::new(Mutex::new(Vec::new()));

        let c = Arc::clone(&calls);
        w.bind_render_function(move |_| c.lock().push("first"));
        let c = Arc::clone(&calls);
        w.bind_render_function(move |_| c.lock().push("second"));
        assert!(w.render_function_is_bound());

        let mut canvas = RecordingCanvas::new();
        w.render_on_demand(&mut canvas, w.size());
        assert_eq!(*calls.lock(), vec!["second"]);

        w.unbind_render_function();
        assert!(!w.render_function_is_bound());
        w.render_on_demand(&mut canvas, w.size());
        assert_eq!(calls.lock().len(), 1);
    }

    #[test]
    fn test_opaque_background_and_rendering_offset() {
        let w = sized(10., 20.);
        w.set_background_color(Color::BLACK);
        w.set_rendering_offset(Vector2::new(2., 3.));
        w.bind_render_function(|canvas| canvas.save());

        let mut canvas = RecordingCanvas::new();
        w.render_on_demand(&mut canvas, w.size());
        assert_eq!(
            canvas.commands(),
            vec![
                Command::FillRect(Rect::from_xywh(0., 0., 10., 20.), Color::BLACK),
                Command::Translate(2., 3.),
                Command::Save,
            ]
        );
    }

    #[test]
    fn test_dropping_frees_descendants_only_when_asked() {
        let child = Widget::new();
        let grandchild = Widget::new();
        child.add_child(&grandchild);
        {
            let parent = Widget::new();
            parent.add_child(&child);
        }
        assert_eq!(child.parent(), None);
        assert_eq!(child.children(), vec![grandchild.clone()]);

        {
            let parent = Widget::new();
            parent.set_frees_descendants_on_destruction(true);
            parent.add_child(&child);
        }
        assert_eq!(child.parent(), None);
        assert!(child.children().is_empty());
        assert_eq!(grandchild.parent(), None);
    }

    #[test]
    fn test_unattached_widgets_ignore_animation_and_redraw() {
        let w = Widget::cached();
        w.start_animation();
        assert!(!w.is_animating());
        w.stop_animation();
        assert!(!w.is_animating());
        w.redraw();
        assert!(!w.is_attached());
    }
}

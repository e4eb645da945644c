//! Widget views.

use crate::canvas::{Canvas, FramebufferId, ScreenMetrics};
use crate::color::Color;
use crate::events::{Event, EventType};
use crate::executor::execute;
use crate::plan::plan;
use crate::rect::Rect;
use crate::redraw::RedrawCoalescer;
use crate::responder::Responder;
use crate::widget::{Behavior, Widget};
use cgmath::{EuclideanSpace, Point2};
use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use uuid::Uuid;

/// A unique identifier for a widget view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewId(Uuid);

impl ViewId {
    fn new() -> ViewId {
        ViewId(Uuid::new_v4())
    }
}

/// Initial widget view settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewConfig {
    /// Width in points.
    pub width: f64,
    /// Height in points.
    pub height: f64,
    pub is_opaque: bool,
    pub background_color: Color,
}

impl Default for ViewConfig {
    fn default() -> Self {
        ViewConfig {
            width: 0.,
            height: 0.,
            is_opaque: true,
            background_color: Color::WHITE,
        }
    }
}

impl ViewConfig {
    pub fn new() -> Self {
        ViewConfig::default()
    }

    pub fn width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }

    pub fn height(mut self, height: f64) -> Self {
        self.height = height;
        self
    }

    pub fn is_opaque(mut self, is_opaque: bool) -> Self {
        self.is_opaque = is_opaque;
        self
    }

    pub fn background_color(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }
}

/// Shared state of a widget view. Widgets hold a weak reference to this.
pub struct ViewCore {
    id: ViewId,
    root: Widget,
    canvas: Mutex<Box<dyn Canvas + Send>>,
    screen: Box<dyn ScreenMetrics>,
    /// Position and size of the view in its native container.
    frame: Mutex<Rect>,
    redraw: RedrawCoalescer,
    responder: Responder,
    animations: Mutex<usize>,
    event_sender: Sender<Event>,
    event_receiver: Receiver<Event>,
    /// Framebuffers of widgets that left this view; deleted before the next pass.
    released_sender: Sender<FramebufferId>,
    released_receiver: Receiver<FramebufferId>,
}

impl ViewCore {
    pub(crate) fn scale_factor(&self) -> f64 {
        self.screen.scale_factor()
    }

    pub(crate) fn release_framebuffer(&self, framebuffer: FramebufferId) {
        // the receiver lives as long as self
        let _ = self.released_sender.send(framebuffer);
    }

    pub(crate) fn animation_started(&self) {
        let mut animations = self.animations.lock();
        *animations += 1;
        if *animations == 1 {
            log::debug!("view {:?} started animating", self.id);
        }
    }

    pub(crate) fn animation_stopped(&self) {
        let mut animations = self.animations.lock();
        *animations = animations.saturating_sub(1);
        if *animations == 0 {
            log::debug!("view {:?} stopped animating", self.id);
        }
    }

    /// Runs a render pass, or asks the running one to go again.
    pub(crate) fn redraw(&self) -> usize {
        self.redraw.redraw(|| self.render_pass())
    }

    fn render_pass(&self) {
        let mut canvas = self.canvas.lock();
        let canvas: &mut dyn Canvas = &mut **canvas;

        for framebuffer in self.released_receiver.try_iter() {
            canvas.delete_framebuffer(framebuffer);
        }

        view_render_pass(&self.root, canvas, Widget::view_will_render);

        let size = self.root.size();
        let items = plan(&self.root, Rect::new(Point2::origin(), size));

        // offscreen first so it doesn't interfere with the onscreen frame
        let scale_factor = self.scale_factor();
        for item in &items {
            item.widget
                .render_cache(canvas, item.size(), scale_factor * item.composite_scale);
        }

        canvas.begin_frame(size.x, size.y, scale_factor);
        execute(&items, canvas);
        canvas.end_frame();

        view_render_pass(&self.root, canvas, Widget::view_did_render);

        log::trace!("view {:?} rendered {} widgets", self.id, items.len());
    }
}

/// Calls a hook on every widget that isn't hidden, top-down, each wrapped in save/restore.
fn view_render_pass(widget: &Widget, canvas: &mut dyn Canvas, hook: fn(&Widget, &mut dyn Canvas)) {
    if widget.is_hidden() {
        return;
    }
    canvas.save();
    hook(widget, canvas);
    canvas.restore();
    for child in widget.children() {
        view_render_pass(&child, canvas, hook);
    }
}

/// Renders a widget tree into a canvas and routes events to its widgets.
///
/// The view owns a root widget with the same size as the view; widgets added with `add_widget`
/// become subwidgets of it.
pub struct WidgetView {
    core: Arc<ViewCore>,
}

impl WidgetView {
    pub fn new<C, S>(canvas: C, screen: S) -> WidgetView
    where
        C: 'static + Canvas + Send,
        S: 'static + ScreenMetrics,
    {
        WidgetView::with_config(canvas, screen, ViewConfig::default())
    }

    pub fn with_config<C, S>(canvas: C, screen: S, config: ViewConfig) -> WidgetView
    where
        C: 'static + Canvas + Send,
        S: 'static + ScreenMetrics,
    {
        WidgetView::with_behavior(canvas, screen, config, ())
    }

    /// Creates a view whose root widget has the given behavior.
    ///
    /// The root's `view_will_render` and `view_did_render` hooks run first and last in every
    /// pass, which makes them the place for view-wide setup and teardown.
    pub fn with_behavior<C, S, B>(
        canvas: C,
        screen: S,
        config: ViewConfig,
        behavior: B,
    ) -> WidgetView
    where
        C: 'static + Canvas + Send,
        S: 'static + ScreenMetrics,
        B: Behavior,
    {
        let root = Widget::with_behavior(behavior);
        root.set_bounds(0., 0., config.width, config.height);
        root.set_is_opaque(config.is_opaque);
        root.set_background_color(config.background_color);

        let (event_sender, event_receiver) = channel::unbounded();
        let (released_sender, released_receiver) = channel::unbounded();

        let core = Arc::new(ViewCore {
            id: ViewId::new(),
            root,
            canvas: Mutex::new(Box::new(canvas)),
            screen: Box::new(screen),
            frame: Mutex::new(Rect::from_xywh(0., 0., config.width, config.height)),
            redraw: RedrawCoalescer::new(),
            responder: Responder::default(),
            animations: Mutex::new(0),
            event_sender,
            event_receiver,
            released_sender,
            released_receiver,
        });
        let weak: Weak<ViewCore> = Arc::downgrade(&core);
        core.root.set_view(weak);

        WidgetView { core }
    }

    pub fn id(&self) -> ViewId {
        self.core.id
    }

    /// Returns the root widget.
    pub fn root(&self) -> &Widget {
        &self.core.root
    }

    /// Adds a widget on top of all others.
    pub fn add_widget(&self, widget: &Widget) -> bool {
        self.core.root.add_child(widget)
    }

    /// Returns the frame last passed to `set_bounds`.
    pub fn bounds(&self) -> Rect {
        *self.core.frame.lock()
    }

    /// Sets the position and size of the view in points. The root widget is resized to match.
    pub fn set_bounds(&self, x: f64, y: f64, width: f64, height: f64) {
        *self.core.frame.lock() = Rect::from_xywh(x, y, width, height);
        self.core.root.set_bounds(0., 0., width, height);
    }

    pub fn is_opaque(&self) -> bool {
        self.core.root.is_opaque()
    }

    pub fn set_is_opaque(&self, is_opaque: bool) {
        self.core.root.set_is_opaque(is_opaque);
    }

    /// Renders everything.
    ///
    /// If a render is already in progress (e.g. when called from a widget hook or another thread),
    /// this returns immediately and the running render goes again once it's done. Returns the
    /// number of passes that were run by this call.
    pub fn render(&self) -> usize {
        self.core.redraw()
    }

    /// Requests a render; same as `render`, without the pass count.
    pub fn redraw(&self) {
        self.core.redraw();
    }

    /// Returns true if any widget in this view is animating.
    pub fn is_animating(&self) -> bool {
        *self.core.animations.lock() > 0
    }

    /// Finds the front-most widget that wants to handle a pointer at `location` and makes it the
    /// responder.
    ///
    /// Returns false if no widget claims the location; the previous responder is kept.
    pub fn should_handle_event(&self, location: Point2<f64>) -> bool {
        self.core.responder.resolve(&self.core.root, location)
    }

    /// Sends an event to the current responder.
    ///
    /// Returns true if the event was handled.
    pub fn handle_event(&self, event: &Event) -> bool {
        self.core.responder.dispatch(&self.core, event)
    }

    /// Returns the current responder.
    pub fn responder(&self) -> Option<Widget> {
        self.core.responder.current()
    }

    /// Returns a sender that can be used to post events from any thread.
    ///
    /// Posted events are processed by `poll_events`.
    pub fn event_sender(&self) -> Sender<Event> {
        self.core.event_sender.clone()
    }

    /// Processes all posted events.
    ///
    /// A new responder is found for every `Down` event before it is dispatched. Returns the
    /// number of events processed.
    pub fn poll_events(&self) -> usize {
        let mut count = 0;
        for event in self.core.event_receiver.try_iter() {
            if event.ty() == EventType::Down {
                if let Some(location) = event.location() {
                    self.should_handle_event(location);
                }
            }
            self.handle_event(&event);
            count += 1;
        }
        count
    }
}

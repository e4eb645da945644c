use cgmath::Point2;
use parking_lot::Mutex;
use perch::recording::{Command, RecordingCanvas};
use perch::*;
use std::sync::Arc;
use std::thread;

type Log = Arc<Mutex<Vec<String>>>;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn view_800x600(canvas: &RecordingCanvas) -> WidgetView {
    WidgetView::with_config(
        canvas.clone(),
        1.,
        ViewConfig::new().width(800.).height(600.).is_opaque(false),
    )
}

/// Records hooks and claims pointers inside its bounds.
struct Recorder {
    name: &'static str,
    log: Log,
}

impl Recorder {
    fn widget(name: &'static str, log: &Log) -> Widget {
        let widget = Widget::with_behavior(Recorder {
            name,
            log: Arc::clone(log),
        });
        widget.set_is_opaque(false);
        widget
    }
}

impl Behavior for Recorder {
    fn widget_did_render(&mut self, _: &Widget, _: &mut dyn Canvas) {
        self.log.lock().push(format!("did {}", self.name));
    }

    fn view_will_render(&mut self, _: &Widget, _: &mut dyn Canvas) {
        self.log.lock().push(format!("view will {}", self.name));
    }

    fn should_handle_event(&mut self, widget: &Widget, location: Point2<f64>) -> bool {
        widget.collide_point(location, 0.)
    }

    fn handle_event(&mut self, _: &Widget, event: &Event) -> bool {
        self.log.lock().push(format!("{} {:?}", self.name, event.ty()));
        true
    }
}

#[test]
fn half_size_child_is_clipped_to_its_bounds() {
    init();
    let canvas = RecordingCanvas::new();
    let view = view_800x600(&canvas);

    let a = Widget::new();
    a.set_is_opaque(false);
    a.set_x(HorizontalAlignment::Left, Unit::Point, 50.);
    a.set_y(VerticalAlignment::Top, Unit::Point, 50.);
    a.set_width(Unit::Percent, 50.);
    a.set_height(Unit::Percent, 50.);
    view.add_widget(&a);

    let items = plan(view.root(), Rect::from_xywh(0., 0., 800., 600.));
    assert_eq!(items.len(), 2);
    assert_eq!(items[1].widget, a);
    assert_eq!(items[1].translated_origin, Point2::new(50., 50.));
    assert_eq!(items[1].scissor, Rect::from_xywh(50., 50., 400., 300.));

    view.render();
    let commands = canvas.commands();
    assert!(commands.contains(&Command::Translate(50., 50.)));
    assert!(commands.contains(&Command::IntersectScissor(Rect::from_xywh(0., 0., 400., 300.))));
    assert_eq!(canvas.save_depth(), 0);
}

#[test]
fn did_render_fires_deepest_first() {
    init();
    let canvas = RecordingCanvas::new();
    let view = view_800x600(&canvas);
    let log = Log::default();

    let a = Recorder::widget("A", &log);
    let b = Recorder::widget("B", &log);
    let c = Recorder::widget("C", &log);
    a.set_bounds(0., 0., 300., 300.);
    b.set_bounds(10., 10., 200., 200.);
    c.set_bounds(10., 10., 100., 100.);
    view.add_widget(&a);
    a.add_child(&b);
    b.add_child(&c);

    assert_eq!(view.render(), 1);
    assert_eq!(
        *log.lock(),
        vec![
            "view will A",
            "view will B",
            "view will C",
            "did C",
            "did B",
            "did A",
        ]
    );
}

#[test]
fn hidden_widgets_are_skipped_entirely() {
    init();
    let canvas = RecordingCanvas::new();
    let view = view_800x600(&canvas);
    let log = Log::default();

    let a = Recorder::widget("A", &log);
    let b = Recorder::widget("B", &log);
    a.set_bounds(0., 0., 100., 100.);
    b.set_bounds(0., 0., 50., 50.);
    view.add_widget(&a);
    a.add_child(&b);
    a.set_hidden(true);

    view.render();
    assert!(log.lock().is_empty());
    assert_eq!(plan(view.root(), Rect::from_xywh(0., 0., 800., 600.)).len(), 1);
}

#[test]
fn redraw_requests_during_a_pass_collapse_into_one() {
    struct RedrawsOnce(bool);

    impl Behavior for RedrawsOnce {
        fn view_will_render(&mut self, widget: &Widget, _: &mut dyn Canvas) {
            if !self.0 {
                self.0 = true;
                widget.redraw();
                widget.redraw();
                widget.redraw();
            }
        }
    }

    init();
    let canvas = RecordingCanvas::new();
    let view = view_800x600(&canvas);
    let widget = Widget::with_behavior(RedrawsOnce(false));
    widget.set_bounds(0., 0., 10., 10.);
    view.add_widget(&widget);

    assert_eq!(view.render(), 2);
    let frames = canvas
        .commands()
        .iter()
        .filter(|c| **c == Command::EndFrame)
        .count();
    assert_eq!(frames, 2);
}

#[test]
fn widgets_can_request_redraws_from_other_threads() {
    init();
    let canvas = RecordingCanvas::new();
    let view = view_800x600(&canvas);
    let widget = Widget::new();
    widget.set_bounds(0., 0., 10., 10.);
    view.add_widget(&widget);

    let remote = widget.clone();
    thread::spawn(move || remote.redraw())
        .join()
        .expect("redraw thread panicked");

    assert!(canvas.commands().contains(&Command::EndFrame));
}

#[test]
fn cached_widgets_render_once_until_invalidated() {
    init();
    let canvas = RecordingCanvas::new();
    let view = WidgetView::with_config(
        canvas.clone(),
        2.,
        ViewConfig::new().width(800.).height(600.),
    );

    let renders = Arc::new(Mutex::new(0));
    let widget = Widget::cached();
    widget.set_bounds(10., 10., 100., 50.);
    let r = Arc::clone(&renders);
    widget.bind_render_function(move |_| *r.lock() += 1);
    view.add_widget(&widget);

    view.render();
    view.render();
    assert_eq!(*renders.lock(), 1);

    let framebuffer = widget
        .cache()
        .and_then(RenderCache::framebuffer)
        .expect("framebuffer should have been created");
    let commands = canvas.take_commands();
    assert!(commands.contains(&Command::CreateFramebuffer {
        framebuffer,
        width: 200,
        height: 100,
    }));
    let draws = commands
        .iter()
        .filter(|c| **c == Command::DrawFramebuffer(framebuffer, Rect::from_xywh(0., 0., 100., 50.)))
        .count();
    assert_eq!(draws, 2);

    widget.invalidate_cache();
    view.render();
    assert_eq!(*renders.lock(), 2);

    // a new scale needs more pixels
    widget.set_scale(2.);
    view.render();
    assert_eq!(*renders.lock(), 3);
    assert!(canvas.commands().contains(&Command::CreateFramebuffer {
        framebuffer: FramebufferId(framebuffer.0 + 1),
        width: 400,
        height: 200,
    }));
    assert_eq!(canvas.live_framebuffers(), 1);
}

#[test]
fn failed_allocations_skip_only_the_cached_widget() {
    init();
    let canvas = RecordingCanvas::new();
    canvas.set_fails_allocations(true);
    let view = view_800x600(&canvas);
    let log = Log::default();

    let cached = Widget::cached();
    cached.set_bounds(0., 0., 100., 100.);
    let l = Arc::clone(&log);
    cached.bind_render_function(move |_| l.lock().push("cached".to_string()));
    let plain = Recorder::widget("plain", &log);
    plain.set_bounds(100., 0., 100., 100.);
    view.add_widget(&cached);
    view.add_widget(&plain);

    view.render();
    assert_eq!(*log.lock(), vec!["view will plain", "did plain"]);
    assert!(!canvas
        .commands()
        .iter()
        .any(|c| matches!(c, Command::DrawFramebuffer(..))));
    assert_eq!(canvas.save_depth(), 0);
    assert!(cached.cache().map_or(false, RenderCache::should_redraw));

    // the next frame tries again
    canvas.set_fails_allocations(false);
    view.render();
    assert_eq!(log.lock().iter().filter(|s| *s == "cached").count(), 1);
}

#[test]
fn detached_widgets_give_back_their_framebuffers() {
    init();
    let canvas = RecordingCanvas::new();
    let view = view_800x600(&canvas);
    let widget = Widget::cached();
    widget.set_bounds(0., 0., 10., 10.);
    view.add_widget(&widget);

    view.render();
    assert_eq!(canvas.live_framebuffers(), 1);
    let framebuffer = widget.cache().and_then(RenderCache::framebuffer).unwrap();

    assert!(widget.remove_from_parent());
    assert!(!widget.is_attached());
    view.render();
    assert!(canvas
        .commands()
        .contains(&Command::DeleteFramebuffer(framebuffer)));
    assert_eq!(canvas.live_framebuffers(), 0);
}

#[test]
fn front_most_sibling_becomes_the_responder() {
    init();
    let view = view_800x600(&RecordingCanvas::new());
    let log = Log::default();
    let x = Recorder::widget("X", &log);
    let y = Recorder::widget("Y", &log);
    let z = Recorder::widget("Z", &log);
    for widget in &[&x, &y, &z] {
        widget.set_bounds(0., 0., 100., 100.);
        view.add_widget(widget);
    }

    assert!(view.should_handle_event(Point2::new(50., 50.)));
    assert_eq!(view.responder(), Some(z.clone()));

    // a miss keeps the old responder
    assert!(!view.should_handle_event(Point2::new(500., 500.)));
    assert_eq!(view.responder(), Some(z.clone()));

    assert!(view.handle_event(&Event::new(EventType::Move, PointerDevice::Cursor)));
    assert_eq!(*log.lock(), vec!["Z Move"]);

    x.bring_to_front();
    assert!(view.should_handle_event(Point2::new(50., 50.)));
    assert_eq!(view.responder(), Some(x));
}

#[test]
fn stale_responders_are_dropped() {
    init();
    let view = view_800x600(&RecordingCanvas::new());
    let log = Log::default();
    let widget = Recorder::widget("W", &log);
    widget.set_bounds(0., 0., 100., 100.);
    view.add_widget(&widget);

    assert!(view.should_handle_event(Point2::new(10., 10.)));
    widget.remove_from_parent();

    let event = Event::new(EventType::Up, PointerDevice::Touch);
    assert!(!view.handle_event(&event));
    assert_eq!(view.responder(), None);
    assert!(log.lock().is_empty());
}

#[test]
fn posted_events_are_routed_when_polled() {
    init();
    let view = view_800x600(&RecordingCanvas::new());
    let log = Log::default();
    let left = Recorder::widget("left", &log);
    let right = Recorder::widget("right", &log);
    left.set_bounds(0., 0., 100., 100.);
    right.set_bounds(100., 0., 100., 100.);
    view.add_widget(&left);
    view.add_widget(&right);

    let sender = view.event_sender();
    thread::spawn(move || {
        let at = |x| Point2::new(x, 50.);
        let events = vec![
            Event::new(EventType::Down, PointerDevice::Touch).with_location(at(150.)),
            Event::new(EventType::Move, PointerDevice::Touch).with_location(at(50.)),
            Event::new(EventType::Up, PointerDevice::Touch).with_location(at(50.)),
            Event::new(EventType::Down, PointerDevice::Pen).with_location(at(20.)),
        ];
        for event in events {
            sender.send(event).expect("view is gone");
        }
    })
    .join()
    .expect("sender thread panicked");

    assert_eq!(view.poll_events(), 4);
    assert_eq!(
        *log.lock(),
        vec!["right Down", "right Move", "right Up", "left Down"]
    );
    assert_eq!(view.poll_events(), 0);
}

#[test]
fn measured_scale_follows_reattachment() {
    init();
    let view = view_800x600(&RecordingCanvas::new());
    let outer = Widget::new();
    outer.set_bounds(100., 100., 400., 400.);
    outer.set_scale(2.);
    let inner = Widget::new();
    inner.set_bounds(10., 10., 50., 50.);
    inner.set_scale(1.5);
    view.add_widget(&outer);
    view.add_widget(&inner);

    assert_eq!(inner.measured_scale(), 1.5);
    outer.add_child(&inner);
    assert_eq!(inner.measured_scale(), 3.);
    assert_eq!(inner.measured_bounds(), Rect::from_xywh(120., 120., 150., 150.));

    let items = plan(view.root(), Rect::from_xywh(0., 0., 800., 600.));
    let item = items
        .iter()
        .find(|item| item.widget == inner)
        .expect("inner widget should be visible");
    assert_eq!(item.composite_scale, inner.measured_scale());
    assert_eq!(item.level, 2);
}

#[test]
fn cached_widgets_can_detach_themselves_while_rendering() {
    init();
    let canvas = RecordingCanvas::new();
    let view = view_800x600(&canvas);
    let widget = Widget::cached();
    widget.set_bounds(0., 0., 10., 10.);
    view.add_widget(&widget);

    let this = widget.clone();
    widget.bind_render_function(move |_| {
        let _ = format!("{:?}", this.cache());
        this.remove_from_parent();
    });

    view.render();
    assert!(!widget.is_attached());
    assert_eq!(widget.cache().and_then(RenderCache::framebuffer), None);

    // the released framebuffer is deleted by the next pass
    view.render();
    assert_eq!(canvas.live_framebuffers(), 0);
    widget.unbind_render_function();
}

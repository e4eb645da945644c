//! Hit-testing and the event responder.

use crate::events::Event;
use crate::view::ViewCore;
use crate::widget::Widget;
use cgmath::Point2;
use parking_lot::Mutex;

/// Finds the front-most subwidget of `widget` that wants to handle a pointer at `location`.
///
/// Subwidgets are tested back to front, and each one's own subwidgets are tested before it.
/// Hidden widgets and their subwidgets are ignored, including `widget` itself.
pub fn find_responder(widget: &Widget, location: Point2<f64>) -> Option<Widget> {
    if widget.is_hidden() {
        return None;
    }
    for child in widget.children().iter().rev() {
        if child.is_hidden() {
            continue;
        }
        if let Some(responder) = find_responder(child, location) {
            return Some(responder);
        }
        if child.should_handle_event(location) {
            return Some(child.clone());
        }
    }
    None
}

/// The single widget that currently receives events for a view.
#[derive(Debug, Default)]
pub(crate) struct Responder {
    current: Mutex<Option<Widget>>,
}

impl Responder {
    pub fn current(&self) -> Option<Widget> {
        self.current.lock().clone()
    }

    /// Makes the front-most widget claiming `location` the responder.
    ///
    /// If no widget claims it, the previous responder is kept and this returns false.
    pub fn resolve(&self, root: &Widget, location: Point2<f64>) -> bool {
        match find_responder(root, location) {
            Some(widget) => {
                log::debug!("new responder: {:?}", widget.id());
                *self.current.lock() = Some(widget);
                true
            }
            None => false,
        }
    }

    /// Sends an event to the responder.
    ///
    /// A responder that no longer belongs to `view` is cleared and the event is dropped.
    pub fn dispatch(&self, view: &ViewCore, event: &Event) -> bool {
        let responder = match self.current() {
            Some(responder) => responder,
            None => return false,
        };

        if !responder.belongs_to(view) {
            log::debug!("dropping stale responder {:?}", responder.id());
            let mut current = self.current.lock();
            if current.as_ref() == Some(&responder) {
                *current = None;
            }
            return false;
        }

        responder.handle_event(event)
    }
}

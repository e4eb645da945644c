//! Retained-mode widget trees.
//!
//! # Conceptual overview
//! Perch composites a tree of rectangular, independently scaled widgets into a single drawing
//! surface, and routes pointer events to the front-most widget that wants them.
//!
//! ## Widgets
//! A [`Widget`] is a cheap, cloneable handle to a node in a tree. Widgets own their subwidgets and
//! refer to their superwidget weakly. Positions and sizes are expressed either in points or in
//! percent of the superwidget’s resolved size, and x/y positions can be aligned to either edge or
//! the center of the superwidget. Every widget also has its own scale, which applies to itself and
//! all of its subwidgets.
//!
//! What a widget draws is defined either by a bound render function or by its [`Behavior`], which
//! also receives render and event hooks. Widgets that are expensive to draw can cache their
//! rendering in an offscreen framebuffer, which will only be regenerated when it is invalidated or
//! when the required pixel size changes.
//!
//! ## Rendering
//! A [`WidgetView`] owns a root widget and the [`Canvas`] everything is drawn into. Each render
//! pass
//!
//! 1. calls `view_will_render` on every widget that isn’t hidden,
//! 2. works out which widgets are visible and what their clip rectangles are (see [`plan`]),
//! 3. regenerates stale offscreen caches,
//! 4. draws the visible widgets parents-first, finalizing each one only after all of its
//!    subwidgets (see [`execute`]),
//! 5. and calls `view_did_render` on every widget that isn’t hidden.
//!
//! Render requests arriving while a pass is running (from widget hooks or other threads) don’t
//! block; they are collapsed into a single extra pass.
//!
//! ## Events
//! When a pointer goes down, the view looks for the front-most widget whose behavior claims the
//! location. That widget becomes the responder and receives all subsequent events until another
//! widget claims a new pointer.
//!
//! ## Coordinate System
//! The origin is at the top left corner of the view, and positive y points down. All coordinates
//! are in points; the screen scale factor only matters for framebuffer sizes.

pub mod cache;
pub mod canvas;
pub mod color;
pub mod events;
mod executor;
pub mod layout;
mod plan;
pub mod recording;
mod rect;
mod redraw;
mod responder;
mod view;
mod widget;

pub use cache::{FramebufferUpdate, RenderCache};
pub use canvas::{Canvas, CanvasError, FramebufferId, ScreenMetrics};
pub use color::Color;
pub use events::{Event, EventType, PointerDevice};
pub use executor::execute;
pub use layout::{HorizontalAlignment, Length, Position, Unit, VerticalAlignment};
pub use plan::{plan, RenderItem};
pub use rect::Rect;
pub use redraw::RedrawCoalescer;
pub use responder::find_responder;
pub use view::{ViewConfig, ViewId, WidgetView};
pub use widget::{Behavior, RenderFunction, Widget, WidgetId};

//! Events.

use cgmath::Point2;

/// Phases of a pointer interaction.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Down = 0,
    Move = 1,
    Up = 2,
    Cancel = 3,
}

/// Types of pointing devices or mechanisms.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerDevice {
    /// Touch input from a finger or something of the sort; is expected to be imprecise.
    Touch = 0,

    /// Pen input.
    Pen = 1,

    /// Any indirect input mechanism.
    Cursor = 2,
}

/// A pointer event.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    ty: EventType,

    /// The device type that emitted this event.
    device: PointerDevice,

    /// Event locations in the view coordinate system; one per active pointer.
    locations: Vec<Point2<f64>>,
}

impl Event {
    pub fn new(ty: EventType, device: PointerDevice) -> Event {
        Event {
            ty,
            device,
            locations: Vec::new(),
        }
    }

    /// Adds a pointer location.
    pub fn with_location(mut self, location: Point2<f64>) -> Event {
        self.locations.push(location);
        self
    }

    pub fn ty(&self) -> EventType {
        self.ty
    }

    pub fn device(&self) -> PointerDevice {
        self.device
    }

    /// Returns the location of the first pointer.
    pub fn location(&self) -> Option<Point2<f64>> {
        self.locations.first().copied()
    }

    pub fn locations(&self) -> &[Point2<f64>] {
        &self.locations
    }
}

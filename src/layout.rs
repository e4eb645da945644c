//! Units and alignments used to position widgets relative to their parent.

/// The unit a length is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    /// Percentage of the parent's resolved extent along the same axis.
    Percent,
    /// Absolute points.
    Point,
}

/// A value with a unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length {
    pub unit: Unit,
    pub value: f64,
}

impl Length {
    pub fn new(unit: Unit, value: f64) -> Length {
        Length { unit, value }
    }

    pub fn points(value: f64) -> Length {
        Length::new(Unit::Point, value)
    }

    pub fn percent(value: f64) -> Length {
        Length::new(Unit::Percent, value)
    }

    /// Resolves this length to points.
    ///
    /// - `extent`: the parent's resolved extent along the same axis
    pub fn resolve(self, extent: f64) -> f64 {
        match self.unit {
            Unit::Point => self.value,
            Unit::Percent => extent * self.value / 100.,
        }
    }
}

impl Default for Length {
    fn default() -> Self {
        Length::points(0.)
    }
}

/// Places a box of some size inside an extent along one axis.
pub trait Alignment: Copy + PartialEq + Default {
    /// Returns the position of the leading edge of the box.
    fn place(self, offset: f64, size: f64, extent: f64) -> f64;
}

/// Horizontal alignment of a widget inside its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HorizontalAlignment {
    Left,
    Center,
    Right,
}

impl Default for HorizontalAlignment {
    fn default() -> Self {
        HorizontalAlignment::Left
    }
}

impl Alignment for HorizontalAlignment {
    fn place(self, offset: f64, size: f64, extent: f64) -> f64 {
        match self {
            HorizontalAlignment::Left => offset,
            HorizontalAlignment::Center => (extent - size) / 2. + offset,
            HorizontalAlignment::Right => extent - size - offset,
        }
    }
}

/// Vertical alignment of a widget inside its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerticalAlignment {
    Top,
    Middle,
    Bottom,
}

impl Default for VerticalAlignment {
    fn default() -> Self {
        VerticalAlignment::Top
    }
}

impl Alignment for VerticalAlignment {
    fn place(self, offset: f64, size: f64, extent: f64) -> f64 {
        match self {
            VerticalAlignment::Top => offset,
            VerticalAlignment::Middle => (extent - size) / 2. + offset,
            VerticalAlignment::Bottom => extent - size - offset,
        }
    }
}

/// An aligned position along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position<A> {
    pub alignment: A,
    pub length: Length,
}

impl<A: Alignment> Position<A> {
    pub fn new(alignment: A, unit: Unit, value: f64) -> Self {
        Position {
            alignment,
            length: Length::new(unit, value),
        }
    }

    /// Resolves the position to points relative to the parent's leading edge.
    ///
    /// - `size`: the widget's resolved size along this axis
    /// - `extent`: the parent's resolved size along this axis
    pub fn resolve(&self, size: f64, extent: f64) -> f64 {
        let offset = self.length.resolve(extent);
        self.alignment.place(offset, size, extent)
    }
}

//! Traits for drawing backends.

use crate::color::Color;
use crate::rect::Rect;
use thiserror::Error;

/// Refers to an offscreen framebuffer owned by a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FramebufferId(pub u64);

/// Errors a canvas may report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CanvasError {
    /// The backend could not allocate an offscreen framebuffer.
    #[error("failed to allocate a {width}x{height} framebuffer")]
    FramebufferAllocation { width: u32, height: u32 },

    /// The framebuffer does not exist (anymore).
    #[error("no such framebuffer: {0:?}")]
    NoSuchFramebuffer(FramebufferId),
}

/// A drawing context.
///
/// The widget pipeline only sequences calls to it; drawing primitives beyond `fill_rect` are up to
/// the implementation and whatever widgets want to draw.
///
/// All coordinates are in points. Transforms and scissors are part of the state saved by `save`
/// and restored by `restore`.
pub trait Canvas {
    /// Starts a frame in the currently bound framebuffer (or on screen).
    ///
    /// The target is cleared to transparent.
    fn begin_frame(&mut self, width: f64, height: f64, scale_factor: f64);

    /// Flushes the current frame.
    fn end_frame(&mut self);

    /// Pushes the current state.
    fn save(&mut self);

    /// Pops the last saved state.
    fn restore(&mut self);

    fn translate(&mut self, x: f64, y: f64);

    fn scale(&mut self, x: f64, y: f64);

    /// Intersects the current scissor with the given rectangle in the current transform.
    fn intersect_scissor(&mut self, rect: Rect);

    /// Fills a rectangle in the current transform.
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Creates an offscreen framebuffer with the given size in pixels.
    fn create_framebuffer(&mut self, width: u32, height: u32)
        -> Result<FramebufferId, CanvasError>;

    /// Redirects drawing to the given framebuffer, or back to the screen if None.
    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferId>);

    fn delete_framebuffer(&mut self, framebuffer: FramebufferId);

    /// Draws the contents of a framebuffer, stretched to fill the given rectangle.
    fn draw_framebuffer(&mut self, framebuffer: FramebufferId, rect: Rect);
}

/// Screen metrics provided by the platform.
pub trait ScreenMetrics: Send + Sync {
    /// Returns the number of pixels per point.
    fn scale_factor(&self) -> f64;
}

/// A fixed scale factor.
impl ScreenMetrics for f64 {
    fn scale_factor(&self) -> f64 {
        *self
    }
}

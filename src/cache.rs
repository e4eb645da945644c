//! Offscreen render caches.

use crate::canvas::{Canvas, FramebufferId};
use crate::rect::Rect;
use cgmath::{Point2, Vector2};
use core::fmt;
use core::ops::{Deref, DerefMut};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Framebuffer {
    id: FramebufferId,
    /// Width in pixels.
    width: u32,
    /// Height in pixels.
    height: u32,
}

/// Returns the framebuffer size in pixels for a size in points.
fn pixel_size(size: Vector2<f64>, scale_factor: f64) -> (u32, u32) {
    (
        (size.x * scale_factor).ceil().max(0.) as u32,
        (size.y * scale_factor).ceil().max(0.) as u32,
    )
}

/// Caches rendered contents in an offscreen framebuffer.
///
/// The framebuffer is created lazily and re-created when the required pixel size changes. The
/// dirty flag is kept outside of the framebuffer lock so that invalidating a cache never blocks on
/// a render in progress.
pub struct RenderCache {
    framebuffer: Mutex<Option<Framebuffer>>,
    should_redraw: AtomicBool,
}

impl fmt::Debug for RenderCache {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("RenderCache")
            .field("framebuffer", &self.framebuffer())
            .field("should_redraw", &self.should_redraw())
            .finish()
    }
}

impl Default for RenderCache {
    fn default() -> Self {
        RenderCache::new()
    }
}

impl RenderCache {
    pub fn new() -> RenderCache {
        RenderCache {
            framebuffer: Mutex::new(None),
            should_redraw: AtomicBool::new(true),
        }
    }

    /// Marks the cached contents as stale; they will be regenerated on the next render.
    pub fn invalidate(&self) {
        self.should_redraw.store(true, Ordering::Release);
    }

    /// Returns true if the cached contents will be regenerated on the next render.
    pub fn should_redraw(&self) -> bool {
        self.should_redraw.load(Ordering::Acquire)
    }

    /// Returns the current framebuffer, if one has been created.
    pub fn framebuffer(&self) -> Option<FramebufferId> {
        self.framebuffer.lock().map(|fb| fb.id)
    }

    /// Begins rendering into the framebuffer.
    ///
    /// - `size`: the size of the contents in points
    /// - `scale_factor`: pixels per point
    ///
    /// Returns None if the framebuffer could not be allocated. Drawing through the returned guard
    /// ends up in the framebuffer until the guard is dropped.
    pub fn begin_updates<'a>(
        &'a self,
        canvas: &'a mut dyn Canvas,
        size: Vector2<f64>,
        scale_factor: f64,
    ) -> Option<FramebufferUpdate<'a>> {
        FramebufferUpdate::begin(&self.framebuffer, canvas, size, scale_factor)
    }

    /// Draws the cached contents into `rect`.
    ///
    /// Returns false if there is nothing to draw yet.
    pub fn draw(&self, canvas: &mut dyn Canvas, rect: Rect) -> bool {
        match *self.framebuffer.lock() {
            Some(fb) => {
                canvas.draw_framebuffer(fb.id, rect);
                true
            }
            None => false,
        }
    }

    /// Regenerates the cached contents if they are stale or if the pixel size changed.
    ///
    /// Returns true if `render` was called.
    pub(crate) fn render_if_needed<F>(
        &self,
        canvas: &mut dyn Canvas,
        size: Vector2<f64>,
        scale_factor: f64,
        render: F,
    ) -> bool
    where
        F: FnOnce(&mut dyn Canvas),
    {
        let (width, height) = pixel_size(size, scale_factor);
        let resized = self
            .framebuffer
            .lock()
            .map_or(true, |fb| fb.width != width || fb.height != height);
        let dirty = self.should_redraw.swap(false, Ordering::AcqRel);
        if !dirty && !resized {
            return false;
        }

        let update = FramebufferUpdate::begin(&self.framebuffer, canvas, size, scale_factor);
        let mut update = match update {
            Some(update) => update,
            None => {
                // try again next frame
                self.invalidate();
                return false;
            }
        };

        update.begin_frame(size.x, size.y, scale_factor);
        render(&mut *update);
        update.end_frame();
        true
    }

    /// Forgets the framebuffer and returns it so it can be deleted by its canvas.
    pub(crate) fn take_framebuffer(&self) -> Option<FramebufferId> {
        self.invalidate();
        self.framebuffer.lock().take().map(|fb| fb.id)
    }
}

/// A framebuffer bound for drawing.
///
/// Dereferences to the canvas; the framebuffer is unbound again when this is dropped. The cache
/// itself is not locked while this exists, so drawing code may query or invalidate it.
pub struct FramebufferUpdate<'a> {
    canvas: &'a mut dyn Canvas,
    framebuffer: Framebuffer,
    scale_factor: f64,
}

impl<'a> FramebufferUpdate<'a> {
    fn begin(
        slot: &Mutex<Option<Framebuffer>>,
        canvas: &'a mut dyn Canvas,
        size: Vector2<f64>,
        scale_factor: f64,
    ) -> Option<FramebufferUpdate<'a>> {
        let (width, height) = pixel_size(size, scale_factor);

        let framebuffer = {
            let mut slot = slot.lock();
            let existing = *slot;
            match existing {
                Some(fb) if fb.width == width && fb.height == height => fb,
                _ => {
                    if let Some(fb) = existing {
                        canvas.delete_framebuffer(fb.id);
                        *slot = None;
                    }
                    match canvas.create_framebuffer(width, height) {
                        Ok(id) => {
                            let fb = Framebuffer { id, width, height };
                            *slot = Some(fb);
                            fb
                        }
                        Err(err) => {
                            log::warn!("skipping offscreen render: {}", err);
                            return None;
                        }
                    }
                }
            }
        };

        canvas.bind_framebuffer(Some(framebuffer.id));

        Some(FramebufferUpdate {
            canvas,
            framebuffer,
            scale_factor,
        })
    }

    /// The scale factor the framebuffer was created with.
    ///
    /// Pass this to `Canvas::begin_frame` for the best quality.
    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    pub fn framebuffer(&self) -> FramebufferId {
        self.framebuffer.id
    }

    /// Returns the bounds of the framebuffer contents in points.
    pub fn bounds(&self) -> Rect {
        let Framebuffer { width, height, .. } = self.framebuffer;
        Rect::new(
            Point2::new(0., 0.),
            Vector2::new(width as f64, height as f64) / self.scale_factor,
        )
    }
}

impl<'a> Deref for FramebufferUpdate<'a> {
    type Target = dyn Canvas + 'a;
    fn deref(&self) -> &Self::Target {
        &*self.canvas
    }
}

impl<'a> DerefMut for FramebufferUpdate<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.canvas
    }
}

impl<'a> Drop for FramebufferUpdate<'a> {
    fn drop(&mut self) {
        self.canvas.bind_framebuffer(None);
    }
}

//! A canvas that records calls instead of drawing.

use crate::canvas::{Canvas, CanvasError, FramebufferId};
use crate::color::Color;
use crate::rect::Rect;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::Arc;

/// A recorded canvas call.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    BeginFrame {
        width: f64,
        height: f64,
        scale_factor: f64,
    },
    EndFrame,
    Save,
    Restore,
    Translate(f64, f64),
    Scale(f64, f64),
    IntersectScissor(Rect),
    FillRect(Rect, Color),
    CreateFramebuffer {
        framebuffer: FramebufferId,
        width: u32,
        height: u32,
    },
    BindFramebuffer(Option<FramebufferId>),
    DeleteFramebuffer(FramebufferId),
    DrawFramebuffer(FramebufferId, Rect),
}

#[derive(Debug, Default)]
struct Recording {
    commands: Vec<Command>,
    next_framebuffer: u64,
    framebuffers: BTreeSet<FramebufferId>,
    fails_allocations: bool,
    depth: usize,
}

/// A headless canvas.
///
/// Clones share the same recording, so one clone can be handed to a view while another is kept
/// around to inspect what was drawn.
#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    inner: Arc<Mutex<Recording>>,
}

impl RecordingCanvas {
    pub fn new() -> RecordingCanvas {
        RecordingCanvas::default()
    }

    /// If true, every framebuffer allocation will fail.
    pub fn set_fails_allocations(&self, fails: bool) {
        self.inner.lock().fails_allocations = fails;
    }

    /// Returns a copy of all commands recorded so far.
    pub fn commands(&self) -> Vec<Command> {
        self.inner.lock().commands.clone()
    }

    /// Removes and returns all commands recorded so far.
    pub fn take_commands(&self) -> Vec<Command> {
        std::mem::replace(&mut self.inner.lock().commands, Vec::new())
    }

    /// Returns the number of framebuffers that have been created but not deleted.
    pub fn live_framebuffers(&self) -> usize {
        self.inner.lock().framebuffers.len()
    }

    /// Returns the current number of unrestored saves.
    pub fn save_depth(&self) -> usize {
        self.inner.lock().depth
    }

    fn record(&self, command: Command) {
        self.inner.lock().commands.push(command);
    }
}

impl Canvas for RecordingCanvas {
    fn begin_frame(&mut self, width: f64, height: f64, scale_factor: f64) {
        self.record(Command::BeginFrame {
            width,
            height,
            scale_factor,
        });
    }

    fn end_frame(&mut self) {
        self.record(Command::EndFrame);
    }

    fn save(&mut self) {
        let mut inner = self.inner.lock();
        inner.depth += 1;
        inner.commands.push(Command::Save);
    }

    fn restore(&mut self) {
        let mut inner = self.inner.lock();
        if inner.depth == 0 {
            log::warn!("RecordingCanvas: restore without matching save");
        }
        inner.depth = inner.depth.saturating_sub(1);
        inner.commands.push(Command::Restore);
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.record(Command::Translate(x, y));
    }

    fn scale(&mut self, x: f64, y: f64) {
        self.record(Command::Scale(x, y));
    }

    fn intersect_scissor(&mut self, rect: Rect) {
        self.record(Command::IntersectScissor(rect));
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.record(Command::FillRect(rect, color));
    }

    fn create_framebuffer(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<FramebufferId, CanvasError> {
        let mut inner = self.inner.lock();
        if inner.fails_allocations || width == 0 || height == 0 {
            return Err(CanvasError::FramebufferAllocation { width, height });
        }
        inner.next_framebuffer += 1;
        let framebuffer = FramebufferId(inner.next_framebuffer);
        inner.framebuffers.insert(framebuffer);
        inner.commands.push(Command::CreateFramebuffer {
            framebuffer,
            width,
            height,
        });
        Ok(framebuffer)
    }

    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferId>) {
        self.record(Command::BindFramebuffer(framebuffer));
    }

    fn delete_framebuffer(&mut self, framebuffer: FramebufferId) {
        let mut inner = self.inner.lock();
        if !inner.framebuffers.remove(&framebuffer) {
            log::warn!("RecordingCanvas: {}", CanvasError::NoSuchFramebuffer(framebuffer));
        }
        inner.commands.push(Command::DeleteFramebuffer(framebuffer));
    }

    fn draw_framebuffer(&mut self, framebuffer: FramebufferId, rect: Rect) {
        self.record(Command::DrawFramebuffer(framebuffer, rect));
    }
}

//! Redraw coalescing.

use parking_lot::Mutex;
use std::thread;

#[derive(Debug, Default)]
struct Flags {
    is_redrawing: bool,
    waiting_for_redraw: bool,
}

/// Collapses concurrent and re-entrant redraw requests.
///
/// The lock is only held while the flags are inspected, never during a pass.
#[derive(Debug, Default)]
pub struct RedrawCoalescer {
    flags: Mutex<Flags>,
}

/// Clears the flags if a pass unwinds, so the next request can start over.
struct Unwinding<'a>(&'a Mutex<Flags>);

impl<'a> Drop for Unwinding<'a> {
    fn drop(&mut self) {
        if thread::panicking() {
            let mut flags = self.0.lock();
            flags.is_redrawing = false;
            flags.waiting_for_redraw = false;
        }
    }
}

impl RedrawCoalescer {
    pub fn new() -> RedrawCoalescer {
        RedrawCoalescer::default()
    }

    /// Runs `pass` unless one is already running, in which case one more pass is requested from
    /// the running redraw and this returns immediately.
    ///
    /// Returns the number of passes that were run by this call.
    pub fn redraw<F: FnMut()>(&self, mut pass: F) -> usize {
        {
            let mut flags = self.flags.lock();
            if flags.is_redrawing {
                flags.waiting_for_redraw = true;
                return 0;
            }
            flags.is_redrawing = true;
        }

        let _unwinding = Unwinding(&self.flags);
        let mut passes = 0;
        loop {
            pass();
            passes += 1;

            let mut flags = self.flags.lock();
            if flags.waiting_for_redraw {
                flags.waiting_for_redraw = false;
            } else {
                flags.is_redrawing = false;
                break;
            }
        }
        passes
    }
}

use crate::surface::{RenderStyle, Surface};
use std::f64::consts::{PI, TAU};

/// "Call me back next frame" primitive supplied by the frontend
/// (`requestAnimationFrame`, a winit redraw request, a test counter).
pub trait FrameClock {
    fn request_frame(&mut self);
    /// Cancel the outstanding request, if any.
    fn cancel_frame(&mut self);
}

/// Start/stop bookkeeping around a [`FrameClock`].
///
/// While running exactly one frame request is outstanding: `start` issues the
/// first, every completed frame issues the next, `stop` cancels it.
#[derive(Debug)]
pub struct RenderLoop<F: FrameClock> {
    clock: F,
    running: bool,
    frames: u64,
}

impl<F: FrameClock> RenderLoop<F> {
    pub fn new(clock: F) -> Self {
        Self {
            clock,
            running: false,
            frames: 0,
        }
    }

    /// Returns false if the loop was already running.
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.clock.request_frame();
        true
    }

    /// Returns false if the loop was already stopped.
    pub fn stop(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        self.clock.cancel_frame();
        true
    }

    /// Gate for a frame callback; a callback that fires after `stop` is refused.
    pub fn begin_frame(&mut self) -> Option<u64> {
        if !self.running {
            return None;
        }
        self.frames += 1;
        Some(self.frames)
    }

    /// Schedule the next frame.
    pub fn end_frame(&mut self) {
        if self.running {
            self.clock.request_frame();
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Frames rendered since construction.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn clock(&self) -> &F {
        &self.clock
    }
}

/// Clear the surface and draw the base line with its center piece.
pub fn draw_baseline<S: Surface>(surface: &mut S, style: &RenderStyle) {
    let (width, height) = surface.size();
    let offset_x = style.offset_x(width);
    let y = style.baseline_y(height);

    surface.clear_rect(0.0, 0.0, width, height);
    surface.set_line_width(style.line_width);
    surface.set_stroke_color(style.stroke_color);
    surface.set_fill_color(style.fill_color);

    surface.begin_path();
    surface.move_to(offset_x, y);
    surface.line_to(width - offset_x, y);
    surface.stroke();

    surface.begin_path();
    surface.arc(width / 2.0, y, style.center_piece, PI, TAU);
    surface.fill();
}

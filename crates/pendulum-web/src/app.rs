use crate::audio::WebAudio;
use crate::canvas::Canvas2dSurface;
use crate::dom;
use crate::frame::{FrameSlot, RafClock};
use pendulum_core::{patch_from_control, ConfigPatch, Simulation};
use web_sys as web;

/// Page-level state shared by the frame callback and the DOM handlers.
pub struct App {
    sim: Simulation<WebAudio, RafClock>,
    surface: Canvas2dSurface,
    status: Option<web::Element>,
}

impl App {
    pub fn new(
        sim: Simulation<WebAudio, RafClock>,
        surface: Canvas2dSurface,
        status: Option<web::Element>,
    ) -> Self {
        let app = Self {
            sim,
            surface,
            status,
        };
        app.sync_status();
        app
    }

    pub fn frame_slot(&self) -> FrameSlot {
        self.sim.render_loop().clock().slot()
    }

    pub fn on_frame(&mut self) {
        self.sim.frame(&mut self.surface);
    }

    pub fn redraw(&mut self) {
        self.sim.redraw(&mut self.surface);
    }

    /// Play/pause.
    pub fn toggle(&mut self) {
        if self.sim.is_running() {
            self.sim.stop();
        } else if let Err(e) = self.sim.start() {
            log::error!("[loop] start failed: {}", e);
        }
        self.sync_status();
    }

    pub fn apply(&mut self, patch: &ConfigPatch) {
        if let Err(e) = self.sim.configure(patch) {
            log::error!("[config] {}", e);
        }
        if !self.sim.is_running() {
            self.redraw();
        }
        self.sync_status();
    }

    pub fn apply_control(&mut self, key: &str, raw: &str) {
        match patch_from_control(key, raw) {
            Ok(patch) => self.apply(&patch),
            Err(e) => log::warn!("[config] ignored {} = {:?}: {}", key, raw, e),
        }
    }

    /// Refit the canvas and move the arcs onto the new base line.
    pub fn resize(&mut self) {
        let Some(window) = web::window() else {
            return;
        };
        dom::fit_canvas_to_window(&window, self.surface.canvas());
        self.surface.reset_context();
        let canvas = self.surface.canvas();
        let geometry = self
            .sim
            .style()
            .geometry_for(canvas.width() as f64, canvas.height() as f64);
        self.apply(&ConfigPatch::default().geometry(geometry));
    }

    fn sync_status(&self) {
        let Some(el) = &self.status else {
            return;
        };
        let (on, off) = if self.sim.is_running() {
            ("play", "pause")
        } else {
            ("pause", "play")
        };
        let _ = el.set_attribute("status", on);
        let classes = el.class_list();
        let _ = classes.add_1(on);
        let _ = classes.remove_1(off);
    }
}

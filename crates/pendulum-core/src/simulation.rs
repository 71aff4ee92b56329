//! The engine facade the frontends drive.
//!
//! `Simulation` owns the configuration snapshot, the live ensemble, the audio
//! backend and the render loop. Frontends call `configure`/`start`/`stop` from
//! their UI handlers and `frame` from their frame callback.

use crate::audio::AudioBackend;
use crate::config::{Config, ConfigPatch};
use crate::ensemble::Ensemble;
use crate::error::SimulationError;
use crate::render_loop::{draw_baseline, FrameClock, RenderLoop};
use crate::surface::{RenderStyle, Surface};

/// What happened during one rendered frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub frame: u64,
    pub triggers: usize,
}

pub struct Simulation<B: AudioBackend, F: FrameClock> {
    config: Config,
    needs_rebuild: bool,
    ensemble: Ensemble<B::Tone>,
    audio: B,
    render_loop: RenderLoop<F>,
    style: RenderStyle,
}

impl<B: AudioBackend, F: FrameClock> Simulation<B, F> {
    /// Nothing is built until the first `start` (or `rebuild`).
    pub fn new(
        config: Config,
        audio: B,
        clock: F,
        style: RenderStyle,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        Ok(Self {
            config,
            needs_rebuild: true,
            ensemble: Ensemble::new(),
            audio,
            render_loop: RenderLoop::new(clock),
            style,
        })
    }

    /// Merge `patch` into the configuration.
    ///
    /// An invalid result is rejected and the previous configuration kept. A
    /// change while running stops the loop; the rebuild then happens on the
    /// next `start`. A change while stopped rebuilds right away.
    pub fn configure(&mut self, patch: &ConfigPatch) -> Result<(), SimulationError> {
        let next = self.config.merged(patch);
        if let Err(e) = next.validate() {
            log::warn!("[config] rejected change: {}", e);
            return Err(e.into());
        }
        if next == self.config {
            return Ok(());
        }
        self.config = next;
        self.needs_rebuild = true;
        if self.render_loop.is_running() {
            self.stop();
            log::info!("[config] changed while running; rebuild deferred to next start");
            Ok(())
        } else {
            self.rebuild().map(|_| ())
        }
    }

    /// Tear down the current arcs and build a new set from the configuration.
    pub fn rebuild(&mut self) -> Result<usize, SimulationError> {
        let built = self.ensemble.rebuild(&self.config, &mut self.audio)?;
        self.needs_rebuild = false;
        Ok(built)
    }

    /// Start ticking, rebuilding first if the configuration changed. Resumes the
    /// audio clock. Returns false if already running.
    pub fn start(&mut self) -> Result<bool, SimulationError> {
        if self.render_loop.is_running() {
            return Ok(false);
        }
        if self.needs_rebuild || self.ensemble.is_empty() {
            self.rebuild()?;
        }
        self.audio.resume();
        self.render_loop.start();
        log::info!("[loop] started with {} arcs", self.ensemble.len());
        Ok(true)
    }

    /// Cancel the pending frame and suspend the audio clock. Returns false if
    /// already stopped.
    pub fn stop(&mut self) -> bool {
        if !self.render_loop.stop() {
            return false;
        }
        self.audio.suspend();
        log::info!("[loop] stopped after {} frames", self.render_loop.frames());
        true
    }

    /// Run one frame: base line first, then each arc advances and draws.
    /// Returns `None` when the loop is not running.
    pub fn frame<S: Surface>(&mut self, surface: &mut S) -> Option<FrameReport> {
        let frame = self.render_loop.begin_frame()?;
        draw_baseline(surface, &self.style);
        let now = self.audio.current_time();
        let mut triggers = 0;
        for arc in self.ensemble.arcs_mut() {
            if arc.advance(now).is_some() {
                triggers += 1;
            }
            arc.draw(surface, &self.style);
        }
        self.render_loop.end_frame();
        Some(FrameReport { frame, triggers })
    }

    /// Draw the current state without advancing (e.g. after a resize while stopped).
    pub fn redraw<S: Surface>(&self, surface: &mut S) {
        draw_baseline(surface, &self.style);
        for arc in self.ensemble.arcs() {
            arc.draw(surface, &self.style);
        }
    }

    /// Stop and dispose every arc.
    pub fn shutdown(&mut self) {
        self.stop();
        self.ensemble.teardown();
        self.needs_rebuild = true;
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn needs_rebuild(&self) -> bool {
        self.needs_rebuild
    }

    pub fn is_running(&self) -> bool {
        self.render_loop.is_running()
    }

    pub fn ensemble(&self) -> &Ensemble<B::Tone> {
        &self.ensemble
    }

    pub fn audio(&self) -> &B {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut B {
        &mut self.audio
    }

    pub fn render_loop(&self) -> &RenderLoop<F> {
        &self.render_loop
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }
}

impl<B: AudioBackend, F: FrameClock> Drop for Simulation<B, F> {
    fn drop(&mut self) {
        self.ensemble.teardown();
    }
}

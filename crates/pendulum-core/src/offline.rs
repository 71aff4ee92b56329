//! Deterministic backends without a browser or audio device.
//!
//! `OfflineAudio` keeps a manual clock and an event log shared with its tones,
//! `RecordingSurface` records draw calls, `ManualFrameClock` counts frame
//! requests. Tests and the native headless mode drive the engine with these.

use crate::audio::{AudioBackend, ToneSource};
use crate::automation::GainAutomation;
use crate::color::Rgb;
use crate::config::Waveform;
use crate::error::AudioError;
use crate::render_loop::FrameClock;
use crate::surface::Surface;
use std::cell::RefCell;
use std::rc::Rc;

/// Lifecycle events of offline tones, in the order they happened.
#[derive(Clone, Debug, PartialEq)]
pub enum ToneEvent {
    Created {
        id: usize,
        waveform: Waveform,
        frequency: f64,
    },
    Hold {
        id: usize,
        at: f64,
    },
    Ramp {
        id: usize,
        value: f32,
        end: f64,
    },
    Stopped {
        id: usize,
    },
}

#[derive(Debug, Default)]
struct ToneRecord {
    gain: GainAutomation,
    stopped: bool,
}

#[derive(Debug, Default)]
struct OfflineState {
    clock: f64,
    suspended: bool,
    tone_limit: Option<usize>,
    tones: Vec<ToneRecord>,
    events: Vec<ToneEvent>,
}

/// Audio backend with a hand-advanced clock.
#[derive(Clone, Debug, Default)]
pub struct OfflineAudio {
    state: Rc<RefCell<OfflineState>>,
}

impl OfflineAudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse tone creation once `limit` live tones exist.
    pub fn with_tone_limit(limit: usize) -> Self {
        let audio = Self::default();
        audio.state.borrow_mut().tone_limit = Some(limit);
        audio
    }

    pub fn set_tone_limit(&self, limit: Option<usize>) {
        self.state.borrow_mut().tone_limit = limit;
    }

    /// Move the clock forward; a suspended clock stays where it is.
    pub fn advance_clock(&self, secs: f64) {
        let mut s = self.state.borrow_mut();
        if !s.suspended {
            s.clock += secs;
        }
    }

    pub fn events(&self) -> Vec<ToneEvent> {
        self.state.borrow().events.clone()
    }

    pub fn clear_events(&self) {
        self.state.borrow_mut().events.clear();
    }

    pub fn tones_created(&self) -> usize {
        self.state.borrow().tones.len()
    }

    pub fn live_tones(&self) -> usize {
        self.state.borrow().tones.iter().filter(|t| !t.stopped).count()
    }

    pub fn gain_at(&self, id: usize, t: f64) -> Option<f32> {
        self.state.borrow().tones.get(id).map(|rec| rec.gain.value_at(t))
    }

    pub fn stop_count(&self, id: usize) -> usize {
        self.state
            .borrow()
            .events
            .iter()
            .filter(|e| matches!(e, ToneEvent::Stopped { id: i } if *i == id))
            .count()
    }

    pub fn trigger_count(&self) -> usize {
        self.state
            .borrow()
            .events
            .iter()
            .filter(|e| matches!(e, ToneEvent::Hold { .. }))
            .count()
    }
}

impl AudioBackend for OfflineAudio {
    type Tone = OfflineTone;

    fn current_time(&self) -> f64 {
        self.state.borrow().clock
    }

    fn create_tone(&mut self, waveform: Waveform, frequency: f64) -> Result<OfflineTone, AudioError> {
        let mut s = self.state.borrow_mut();
        let live = s.tones.iter().filter(|t| !t.stopped).count();
        if let Some(limit) = s.tone_limit {
            if live >= limit {
                return Err(AudioError::ToneCreation(format!(
                    "tone limit of {limit} reached"
                )));
            }
        }
        let id = s.tones.len();
        s.tones.push(ToneRecord {
            gain: GainAutomation::new(0.0),
            stopped: false,
        });
        s.events.push(ToneEvent::Created {
            id,
            waveform,
            frequency,
        });
        Ok(OfflineTone {
            id,
            state: Rc::clone(&self.state),
        })
    }

    fn suspend(&mut self) {
        self.state.borrow_mut().suspended = true;
    }

    fn resume(&mut self) {
        self.state.borrow_mut().suspended = false;
    }

    fn is_suspended(&self) -> bool {
        self.state.borrow().suspended
    }
}

#[derive(Debug)]
pub struct OfflineTone {
    id: usize,
    state: Rc<RefCell<OfflineState>>,
}

impl OfflineTone {
    pub fn id(&self) -> usize {
        self.id
    }
}

impl ToneSource for OfflineTone {
    fn hold_gain(&mut self, at: f64) {
        let mut s = self.state.borrow_mut();
        s.tones[self.id].gain.hold(at);
        s.events.push(ToneEvent::Hold { id: self.id, at });
    }

    fn ramp_gain(&mut self, value: f32, end: f64) {
        let mut s = self.state.borrow_mut();
        s.tones[self.id].gain.linear_ramp_to(value, end);
        s.events.push(ToneEvent::Ramp {
            id: self.id,
            value,
            end,
        });
    }

    fn stop(&mut self) {
        let mut s = self.state.borrow_mut();
        s.tones[self.id].stopped = true;
        s.events.push(ToneEvent::Stopped { id: self.id });
    }
}

/// Frame clock that only counts requests; tests call `Simulation::frame` directly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ManualFrameClock {
    pub requested: u64,
    pub cancelled: u64,
    pub pending: bool,
}

impl FrameClock for ManualFrameClock {
    fn request_frame(&mut self) {
        self.requested += 1;
        self.pending = true;
    }

    fn cancel_frame(&mut self) {
        if self.pending {
            self.cancelled += 1;
        }
        self.pending = false;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Clear {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    StrokeColor(Rgb),
    FillColor(Rgb),
    LineWidth(f64),
    BeginPath,
    MoveTo(f64, f64),
    LineTo(f64, f64),
    Arc {
        cx: f64,
        cy: f64,
        radius: f64,
        start: f64,
        end: f64,
    },
    Stroke,
    Fill,
    Text {
        text: String,
        x: f64,
        y: f64,
    },
}

/// Surface that records every call.
#[derive(Clone, Debug)]
pub struct RecordingSurface {
    pub width: f64,
    pub height: f64,
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.commands.push(DrawCommand::Clear {
            x,
            y,
            width,
            height,
        });
    }

    fn set_stroke_color(&mut self, color: Rgb) {
        self.commands.push(DrawCommand::StrokeColor(color));
    }

    fn set_fill_color(&mut self, color: Rgb) {
        self.commands.push(DrawCommand::FillColor(color));
    }

    fn set_line_width(&mut self, width: f64) {
        self.commands.push(DrawCommand::LineWidth(width));
    }

    fn begin_path(&mut self) {
        self.commands.push(DrawCommand::BeginPath);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.commands.push(DrawCommand::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.commands.push(DrawCommand::LineTo(x, y));
    }

    fn arc(&mut self, cx: f64, cy: f64, radius: f64, start: f64, end: f64) {
        self.commands.push(DrawCommand::Arc {
            cx,
            cy,
            radius,
            start,
            end,
        });
    }

    fn stroke(&mut self) {
        self.commands.push(DrawCommand::Stroke);
    }

    fn fill(&mut self) {
        self.commands.push(DrawCommand::Fill);
    }

    fn stroke_text(&mut self, text: &str, x: f64, y: f64) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            x,
            y,
        });
    }
}

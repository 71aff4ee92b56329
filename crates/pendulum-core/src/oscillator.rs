//! A single swinging arc: phase integration, crossing detection and drawing.
//!
//! The phase decreases by `angular_velocity` every tick, which sweeps the
//! marker clockwise on screen. Two boundaries are audible:
//!
//! - the zero crossing, where the phase wraps around `TAU`;
//! - the midline crossing, where the phase passes `PI` again.
//!
//! `crossed_zero` latches between the two so each boundary fires once per
//! revolution. A negative velocity mirrors both tests.

use crate::audio::ToneSource;
use crate::color::Rgb;
use crate::constants::PHASE_EPSILON;
use crate::error::ArcError;
use crate::marker::Marker;
use crate::surface::{RenderStyle, Surface};
use crate::voice::ToneVoice;
use std::f64::consts::{PI, TAU};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArcState {
    Idle,
    Running,
    Disposed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Crossing {
    Zero,
    Midline,
}

/// Construction parameters for one arc.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArcParams {
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
    pub starting_angle: f64,
    /// Radians per tick; non-zero and below `PI` in magnitude.
    pub angular_velocity: f64,
    pub color: Rgb,
    pub frequency: f64,
}

impl ArcParams {
    pub fn validate(&self) -> Result<(), ArcError> {
        if !(self.radius > 0.0 && self.radius.is_finite()) {
            return Err(ArcError::Radius(self.radius));
        }
        let w = self.angular_velocity;
        if !(w.is_finite() && w != 0.0 && w.abs() < PI) {
            return Err(ArcError::Velocity(w));
        }
        if !(self.frequency > 0.0 && self.frequency.is_finite()) {
            return Err(ArcError::Frequency(self.frequency));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct PendulumArc<T: ToneSource> {
    params: ArcParams,
    phase: f64,
    crossed_zero: bool,
    state: ArcState,
    marker: Marker,
    voice: ToneVoice<T>,
}

fn snap(phase: f64) -> f64 {
    if phase.abs() < PHASE_EPSILON {
        0.0
    } else if (phase - PI).abs() < PHASE_EPSILON {
        PI
    } else if (phase - TAU).abs() < PHASE_EPSILON {
        TAU
    } else {
        phase
    }
}

impl<T: ToneSource> PendulumArc<T> {
    pub fn new(params: ArcParams, voice: ToneVoice<T>) -> Result<Self, ArcError> {
        params.validate()?;
        let mut phase = snap(params.starting_angle.rem_euclid(TAU));
        if phase >= TAU {
            phase = 0.0;
        }
        let mut arc = Self {
            params,
            phase,
            crossed_zero: false,
            state: ArcState::Idle,
            marker: Marker::new(params.center_x, params.center_y, params.color),
            voice,
        };
        arc.place_marker();
        Ok(arc)
    }

    /// Advance one tick. Triggered ramps are scheduled at clock time `now`.
    pub fn advance(&mut self, now: f64) -> Option<Crossing> {
        if self.state == ArcState::Disposed {
            return None;
        }
        self.state = ArcState::Running;

        let w = self.params.angular_velocity;
        let mut phase = snap(self.phase - w);
        let wrapped = if w > 0.0 { phase <= 0.0 } else { phase >= TAU };

        let crossing = if wrapped {
            // |w| < PI, so a single period always brings the phase back in range
            phase = phase.rem_euclid(TAU);
            if phase >= TAU {
                phase = 0.0;
            }
            if self.crossed_zero {
                None
            } else {
                self.crossed_zero = true;
                Some(Crossing::Zero)
            }
        } else {
            let past_midline = if w > 0.0 { phase <= PI } else { phase >= PI };
            if self.crossed_zero && past_midline {
                self.crossed_zero = false;
                Some(Crossing::Midline)
            } else {
                None
            }
        };

        self.phase = phase;
        if let Some(c) = crossing {
            self.voice.trigger(now);
            log::trace!(
                "[arc] {:.0} Hz {:?} crossing at t={:.3}",
                self.params.frequency,
                c,
                now
            );
        }
        self.place_marker();
        crossing
    }

    fn place_marker(&mut self) {
        let p = &self.params;
        let dx = self.phase.cos() * p.radius;
        let dy = self.phase.sin() * p.radius;
        // Both branches land above the base line: the lower half is mirrored up.
        if self.phase < PI {
            self.marker.set_position(p.center_x + dx, p.center_y - dy);
        } else {
            self.marker.set_position(p.center_x + dx, p.center_y + dy);
        }
    }

    /// Stroke the upper semicircle and its frequency label, then the marker.
    pub fn draw<S: Surface>(&self, surface: &mut S, style: &RenderStyle) {
        if self.state == ArcState::Disposed {
            return;
        }
        let p = &self.params;
        surface.set_stroke_color(p.color);
        surface.begin_path();
        surface.arc(p.center_x, p.center_y, p.radius, PI, TAU);
        surface.stroke();
        surface.stroke_text(
            &format!("{}", p.frequency),
            p.center_x - p.radius,
            p.center_y + style.label_offset_y,
        );
        self.marker.draw(surface, style.marker_radius);
    }

    /// Stop the voice; later `advance`/`draw` calls do nothing.
    pub fn dispose(&mut self) -> bool {
        if self.state == ArcState::Disposed {
            return false;
        }
        self.state = ArcState::Disposed;
        self.voice.dispose()
    }

    pub fn params(&self) -> &ArcParams {
        &self.params
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn radius(&self) -> f64 {
        self.params.radius
    }

    pub fn frequency(&self) -> f64 {
        self.params.frequency
    }

    pub fn angular_velocity(&self) -> f64 {
        self.params.angular_velocity
    }

    pub fn color(&self) -> Rgb {
        self.params.color
    }

    pub fn crossed_zero(&self) -> bool {
        self.crossed_zero
    }

    pub fn state(&self) -> ArcState {
        self.state
    }

    pub fn marker(&self) -> &Marker {
        &self.marker
    }

    pub fn voice(&self) -> &ToneVoice<T> {
        &self.voice
    }

    pub fn voice_mut(&mut self) -> &mut ToneVoice<T> {
        &mut self.voice
    }
}

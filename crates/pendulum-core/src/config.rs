//! Simulation configuration.
//!
//! A [`Config`] is an immutable snapshot: frontends describe changes with a
//! [`ConfigPatch`], the simulation merges it into a copy, validates the copy and
//! only then replaces its snapshot. Everything an arc needs is derived from the
//! snapshot at rebuild time by the `*_for` helpers below.

use crate::color::Rgb;
use crate::constants::*;
use crate::error::ConfigError;
use crate::oscillator::ArcParams;
use std::f64::consts::{PI, TAU};
use std::fmt;
use std::str::FromStr;

/// Oscillator shape of every tone generator in the ensemble.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl Waveform {
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Square,
        Waveform::Sawtooth,
        Waveform::Triangle,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Square => "square",
            Waveform::Sawtooth => "sawtooth",
            Waveform::Triangle => "triangle",
        }
    }

    /// The next shape in `ALL`, wrapping around.
    pub fn next(self) -> Waveform {
        let i = Self::ALL.iter().position(|w| *w == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }
}

impl FromStr for Waveform {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|w| w.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownWaveform(s.to_string()))
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the arcs sit: a shared center and the stretch of base line their radii span.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Geometry {
    pub center_x: f64,
    pub center_y: f64,
    pub line_from: f64,
    pub line_to: f64,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            center_x: DEFAULT_SURFACE_WIDTH / 2.0,
            center_y: DEFAULT_SURFACE_HEIGHT - BASE_OFFSET_Y,
            line_from: BASE_OFFSET_X,
            line_to: DEFAULT_SURFACE_WIDTH / 2.0 - CENTER_PIECE_RADIUS,
        }
    }
}

/// Per-trigger gain envelope: up to `max_gain` in `attack_secs`, back to silence
/// in `release_secs`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Envelope {
    pub attack_secs: f64,
    pub release_secs: f64,
    pub max_gain: f32,
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            attack_secs: 0.2,
            release_secs: 1.0,
            max_gain: 0.2,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub arc_count: u32,
    pub base_frequency: f64,
    pub frequency_step: f64,
    /// Seconds after which every arc has completed a whole number of cycles.
    pub cycle_window_secs: f64,
    /// Cycles the outermost arc completes per window; arc `i` adds `arc_count - i`.
    pub base_cycles: f64,
    pub starting_angle: f64,
    pub envelope: Envelope,
    pub waveform: Waveform,
    pub color_from: Rgb,
    pub color_to: Rgb,
    pub geometry: Geometry,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            arc_count: 10,
            base_frequency: 200.0,
            frequency_step: 20.0,
            cycle_window_secs: 100.0,
            base_cycles: 40.0,
            starting_angle: PI,
            envelope: Envelope::default(),
            waveform: Waveform::Sine,
            color_from: Rgb::BLACK,
            color_to: Rgb::WHITE,
            geometry: Geometry::default(),
        }
    }
}

fn finite(field: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NotFinite { field, value })
    }
}

fn positive(field: &'static str, value: f64) -> Result<f64, ConfigError> {
    if finite(field, value)? > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.arc_count < 1 {
            return Err(ConfigError::ArcCount(self.arc_count));
        }
        positive("base frequency", self.base_frequency)?;
        finite("frequency step", self.frequency_step)?;
        positive("cycle window", self.cycle_window_secs)?;
        positive("base cycles", self.base_cycles)?;
        finite("starting angle", self.starting_angle)?;
        positive("attack time", self.envelope.attack_secs)?;
        positive("release time", self.envelope.release_secs)?;
        let gain = self.envelope.max_gain;
        if !(gain > 0.0 && gain <= 1.0) {
            return Err(ConfigError::MaxGain(gain));
        }

        let g = &self.geometry;
        finite("center x", g.center_x)?;
        finite("center y", g.center_y)?;
        finite("line start", g.line_from)?;
        finite("line end", g.line_to)?;
        if g.line_to <= g.line_from {
            return Err(ConfigError::RadiusRange {
                from: g.line_from,
                to: g.line_to,
            });
        }
        let step = self.radius_step();
        if !(step > 0.0 && step.is_finite()) {
            return Err(ConfigError::RadiusStep(step));
        }

        for index in 1..=self.arc_count {
            let frequency = self.frequency_for(index);
            if !(frequency > 0.0 && frequency.is_finite()) {
                return Err(ConfigError::Frequency { index, frequency });
            }
            let velocity = self.angular_velocity_for(index);
            // an overflowing window turns into a zero velocity; that arc would never move
            if !(velocity != 0.0 && velocity.abs() < PI) {
                return Err(ConfigError::Velocity { index, velocity });
            }
        }
        Ok(())
    }

    /// Copy of `self` with every field the patch carries replaced.
    pub fn merged(&self, patch: &ConfigPatch) -> Config {
        let mut next = self.clone();
        if let Some(v) = patch.arc_count {
            next.arc_count = v;
        }
        if let Some(v) = patch.base_frequency {
            next.base_frequency = v;
        }
        if let Some(v) = patch.frequency_step {
            next.frequency_step = v;
        }
        if let Some(v) = patch.cycle_window_secs {
            next.cycle_window_secs = v;
        }
        if let Some(v) = patch.base_cycles {
            next.base_cycles = v;
        }
        if let Some(v) = patch.starting_angle {
            next.starting_angle = v;
        }
        if let Some(v) = patch.attack_secs {
            next.envelope.attack_secs = v;
        }
        if let Some(v) = patch.release_secs {
            next.envelope.release_secs = v;
        }
        if let Some(v) = patch.max_gain {
            next.envelope.max_gain = v;
        }
        if let Some(v) = patch.waveform {
            next.waveform = v;
        }
        if let Some(v) = patch.color_from {
            next.color_from = v;
        }
        if let Some(v) = patch.color_to {
            next.color_to = v;
        }
        if let Some(v) = patch.geometry {
            next.geometry = v;
        }
        next
    }

    /// Spacing between consecutive radii.
    pub fn radius_step(&self) -> f64 {
        (self.geometry.line_to - self.geometry.line_from) / self.arc_count as f64
    }

    pub fn radius_for(&self, index: u32) -> f64 {
        self.radius_step() * index as f64
    }

    pub fn frequency_for(&self, index: u32) -> f64 {
        self.base_frequency + self.frequency_step * index as f64
    }

    pub fn cycles_for(&self, index: u32) -> f64 {
        self.base_cycles + (self.arc_count as f64 - index as f64)
    }

    /// Radians per tick for arc `index` (1-based); strictly decreasing in `index`.
    pub fn angular_velocity_for(&self, index: u32) -> f64 {
        self.cycles_for(index) * TAU / (self.cycle_window_secs * FRAME_RATE)
    }

    pub fn color_for(&self, index: u32) -> Rgb {
        self.color_from
            .lerp(self.color_to, index as f64 / self.arc_count as f64)
    }

    /// Everything needed to construct arc `index` (1-based).
    pub fn arc_params(&self, index: u32) -> ArcParams {
        ArcParams {
            center_x: self.geometry.center_x,
            center_y: self.geometry.center_y,
            radius: self.radius_for(index),
            starting_angle: self.starting_angle,
            angular_velocity: self.angular_velocity_for(index),
            color: self.color_for(index),
            frequency: self.frequency_for(index),
        }
    }
}

/// A partial configuration change; `None` fields keep their current value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigPatch {
    pub arc_count: Option<u32>,
    pub base_frequency: Option<f64>,
    pub frequency_step: Option<f64>,
    pub cycle_window_secs: Option<f64>,
    pub base_cycles: Option<f64>,
    pub starting_angle: Option<f64>,
    pub attack_secs: Option<f64>,
    pub release_secs: Option<f64>,
    pub max_gain: Option<f32>,
    pub waveform: Option<Waveform>,
    pub color_from: Option<Rgb>,
    pub color_to: Option<Rgb>,
    pub geometry: Option<Geometry>,
}

impl ConfigPatch {
    pub fn arc_count(mut self, v: u32) -> Self {
        self.arc_count = Some(v);
        self
    }

    pub fn waveform(mut self, v: Waveform) -> Self {
        self.waveform = Some(v);
        self
    }

    pub fn base_frequency(mut self, v: f64) -> Self {
        self.base_frequency = Some(v);
        self
    }

    pub fn geometry(mut self, v: Geometry) -> Self {
        self.geometry = Some(v);
        self
    }

    pub fn max_gain(mut self, v: f32) -> Self {
        self.max_gain = Some(v);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn velocities_strictly_decrease_with_index() {
        let cfg = Config::default();
        let mut prev = f64::INFINITY;
        for i in 1..=cfg.arc_count {
            let v = cfg.angular_velocity_for(i);
            assert!(v > 0.0 && v < prev, "velocity not decreasing at arc {i}");
            prev = v;
        }
    }

    #[test]
    fn outermost_arc_completes_base_cycles_per_window() {
        let cfg = Config::default();
        let ticks = cfg.cycle_window_secs * FRAME_RATE;
        let turns = cfg.angular_velocity_for(cfg.arc_count) * ticks / TAU;
        assert!((turns - cfg.base_cycles).abs() < 1e-9);
    }

    #[test]
    fn merge_only_touches_patched_fields() {
        let cfg = Config::default();
        let next = cfg.merged(&ConfigPatch::default().arc_count(7).waveform(Waveform::Square));
        assert_eq!(next.arc_count, 7);
        assert_eq!(next.waveform, Waveform::Square);
        assert_eq!(next.base_frequency, cfg.base_frequency);
        assert_eq!(next.geometry, cfg.geometry);
        assert_eq!(cfg.arc_count, 10);
    }

    #[test]
    fn rejects_each_invalid_field() {
        let base = Config::default();
        let flat = Geometry {
            line_from: 300.0,
            line_to: 300.0,
            ..Geometry::default()
        };
        let cases = [
            (ConfigPatch::default().arc_count(0), ConfigError::ArcCount(0)),
            (
                ConfigPatch::default().base_frequency(0.0),
                ConfigError::NotPositive {
                    field: "base frequency",
                    value: 0.0,
                },
            ),
            (ConfigPatch::default().max_gain(1.5), ConfigError::MaxGain(1.5)),
            (ConfigPatch::default().max_gain(0.0), ConfigError::MaxGain(0.0)),
            (
                ConfigPatch::default().geometry(flat),
                ConfigError::RadiusRange {
                    from: 300.0,
                    to: 300.0,
                },
            ),
        ];
        for (patch, expected) in cases {
            assert_eq!(base.merged(&patch).validate(), Err(expected));
        }
        let nan = base.merged(&ConfigPatch::default().base_frequency(f64::NAN));
        assert!(matches!(
            nan.validate(),
            Err(ConfigError::NotFinite {
                field: "base frequency",
                ..
            })
        ));
    }

    #[test]
    fn rejects_negative_frequency_for_late_arcs() {
        let cfg = Config {
            base_frequency: 50.0,
            frequency_step: -20.0,
            arc_count: 5,
            ..Config::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::Frequency {
                index: 3,
                frequency: -10.0
            })
        );
    }

    #[test]
    fn rejects_velocities_of_half_a_turn_per_tick() {
        let cfg = Config {
            cycle_window_secs: 0.5,
            ..Config::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Velocity { index: 1, .. })
        ));
    }

    #[test]
    fn rejects_a_window_so_long_the_velocity_vanishes() {
        let cfg = Config {
            cycle_window_secs: f64::MAX,
            ..Config::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::Velocity {
                index: 1,
                velocity: 0.0
            })
        );
    }

    #[test]
    fn rejects_a_radius_span_that_overflows() {
        let cfg = Config {
            geometry: Geometry {
                line_from: -1e308,
                line_to: 1e308,
                ..Geometry::default()
            },
            ..Config::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::RadiusStep(f64::INFINITY)));
    }

    #[test]
    fn waveform_parses_case_insensitively_and_cycles() {
        assert_eq!("Sawtooth".parse::<Waveform>().unwrap(), Waveform::Sawtooth);
        assert!("noise".parse::<Waveform>().is_err());
        assert_eq!(Waveform::Triangle.next(), Waveform::Sine);
    }
}

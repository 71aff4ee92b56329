//! User-adjustable parameters with the ranges the controls expose.
//!
//! Frontends build their sliders/menus from [`PARAMS`] and turn a raw control
//! value into a [`ConfigPatch`] with [`patch_from_control`]. Values outside the
//! listed range are rejected rather than clamped.

use crate::config::{ConfigPatch, Waveform};
use crate::error::ConfigError;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParamKind {
    Range { min: f64, max: f64, step: f64 },
    Menu { values: &'static [&'static str] },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParamSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: ParamKind,
    /// Default as the control shows it (matches `Config::default()`).
    pub default: &'static str,
}

const WAVEFORM_NAMES: &[&str] = &["sine", "square", "sawtooth", "triangle"];

pub const PARAMS: &[ParamSpec] = &[
    ParamSpec {
        key: "arc_count",
        label: "arcs",
        kind: ParamKind::Range {
            min: 5.0,
            max: 25.0,
            step: 1.0,
        },
        default: "10",
    },
    ParamSpec {
        key: "base_frequency",
        label: "base frequency",
        kind: ParamKind::Range {
            min: 100.0,
            max: 440.0,
            step: 10.0,
        },
        default: "200",
    },
    ParamSpec {
        key: "frequency_step",
        label: "frequency step",
        kind: ParamKind::Range {
            min: 5.0,
            max: 150.0,
            step: 5.0,
        },
        default: "20",
    },
    ParamSpec {
        key: "cycle_window",
        label: "time",
        kind: ParamKind::Range {
            min: 50.0,
            max: 10000.0,
            step: 10.0,
        },
        default: "100",
    },
    ParamSpec {
        key: "base_cycles",
        label: "cycles of outer arc",
        kind: ParamKind::Range {
            min: 25.0,
            max: 200.0,
            step: 1.0,
        },
        default: "40",
    },
    ParamSpec {
        key: "release_time",
        label: "release",
        kind: ParamKind::Range {
            min: 0.01,
            max: 2.0,
            step: 0.01,
        },
        default: "1",
    },
    ParamSpec {
        key: "attack_time",
        label: "attack",
        kind: ParamKind::Range {
            min: 0.01,
            max: 2.0,
            step: 0.01,
        },
        default: "0.2",
    },
    ParamSpec {
        key: "max_gain",
        label: "max gain",
        kind: ParamKind::Range {
            min: 0.01,
            max: 1.0,
            step: 0.01,
        },
        default: "0.2",
    },
    ParamSpec {
        key: "waveform",
        label: "wave type",
        kind: ParamKind::Menu {
            values: WAVEFORM_NAMES,
        },
        default: "sine",
    },
];

pub fn find_param(key: &str) -> Option<&'static ParamSpec> {
    PARAMS.iter().find(|p| p.key == key)
}

impl ParamSpec {
    fn parse_number(&self, raw: &str) -> Result<f64, ConfigError> {
        let value: f64 = raw.trim().parse().map_err(|_| ConfigError::Unparsable {
            name: self.key,
            value: raw.to_string(),
        })?;
        if let ParamKind::Range { min, max, .. } = self.kind {
            if !(value >= min && value <= max) {
                return Err(ConfigError::OutOfRange {
                    name: self.key,
                    value,
                    min,
                    max,
                });
            }
        }
        Ok(value)
    }
}

/// Translate one control change (`key`, raw text) into a patch.
pub fn patch_from_control(key: &str, raw: &str) -> Result<ConfigPatch, ConfigError> {
    let spec = find_param(key).ok_or_else(|| ConfigError::UnknownParam(key.to_string()))?;
    let mut patch = ConfigPatch::default();
    match spec.key {
        "waveform" => patch.waveform = Some(raw.parse::<Waveform>()?),
        "arc_count" => {
            let v = spec.parse_number(raw)?;
            if v.fract() != 0.0 {
                return Err(ConfigError::Unparsable {
                    name: spec.key,
                    value: raw.to_string(),
                });
            }
            patch.arc_count = Some(v as u32);
        }
        "base_frequency" => patch.base_frequency = Some(spec.parse_number(raw)?),
        "frequency_step" => patch.frequency_step = Some(spec.parse_number(raw)?),
        "cycle_window" => patch.cycle_window_secs = Some(spec.parse_number(raw)?),
        "base_cycles" => patch.base_cycles = Some(spec.parse_number(raw)?),
        "release_time" => patch.release_secs = Some(spec.parse_number(raw)?),
        "attack_time" => patch.attack_secs = Some(spec.parse_number(raw)?),
        "max_gain" => patch.max_gain = Some(spec.parse_number(raw)? as f32),
        other => return Err(ConfigError::UnknownParam(other.to_string())),
    }
    Ok(patch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn defaults_match_default_config() {
        let mut cfg = Config::default();
        for spec in PARAMS {
            let patch = patch_from_control(spec.key, spec.default).unwrap();
            cfg = cfg.merged(&patch);
        }
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn every_default_lies_inside_its_range() {
        for spec in PARAMS {
            if let ParamKind::Range { min, max, step } = spec.kind {
                let d: f64 = spec.default.parse().unwrap();
                assert!(d >= min && d <= max, "{} default out of range", spec.key);
                assert!(step > 0.0);
            }
        }
    }

    #[test]
    fn out_of_range_and_garbage_are_rejected() {
        assert!(matches!(
            patch_from_control("arc_count", "40"),
            Err(ConfigError::OutOfRange { name: "arc_count", .. })
        ));
        assert!(matches!(
            patch_from_control("arc_count", "7.5"),
            Err(ConfigError::Unparsable { .. })
        ));
        assert!(matches!(
            patch_from_control("max_gain", "loud"),
            Err(ConfigError::Unparsable { .. })
        ));
        assert!(matches!(
            patch_from_control("waveform", "noise"),
            Err(ConfigError::UnknownWaveform(_))
        ));
        assert!(matches!(
            patch_from_control("volume", "1"),
            Err(ConfigError::UnknownParam(_))
        ));
    }

    #[test]
    fn control_values_land_in_the_right_field() {
        let patch = patch_from_control("release_time", "0.5").unwrap();
        assert_eq!(patch.release_secs, Some(0.5));
        assert_eq!(
            ConfigPatch {
                release_secs: None,
                ..patch
            },
            ConfigPatch::default()
        );
        let patch = patch_from_control("waveform", "triangle").unwrap();
        assert_eq!(patch.waveform, Some(Waveform::Triangle));
    }
}

use thiserror::Error;

/// A configuration value outside its valid range. The live configuration is
/// never replaced when one of these is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("arc count must be at least 1, got {0}")]
    ArcCount(u32),
    #[error("{field} must be finite, got {value}")]
    NotFinite { field: &'static str, value: f64 },
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("max gain must be in (0, 1], got {0}")]
    MaxGain(f32),
    #[error("line end ({to}) must lie beyond line start ({from})")]
    RadiusRange { from: f64, to: f64 },
    #[error("arc {index} would sound at {frequency} Hz; frequencies must be positive")]
    Frequency { index: u32, frequency: f64 },
    #[error("radius step must be positive and finite, got {0}")]
    RadiusStep(f64),
    #[error("arc {index} would turn {velocity} rad per tick; must be non-zero and below pi")]
    Velocity { index: u32, velocity: f64 },
    #[error("unknown waveform {0:?}")]
    UnknownWaveform(String),
    #[error("unknown parameter {0:?}")]
    UnknownParam(String),
    #[error("cannot parse {value:?} for {name}")]
    Unparsable { name: &'static str, value: String },
    #[error("{name} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Failures reported by an audio backend.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AudioError {
    #[error("audio backend refused to create a tone generator: {0}")]
    ToneCreation(String),
    #[error("audio backend unavailable: {0}")]
    Unavailable(String),
}

/// Rejected arc parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArcError {
    #[error("radius must be positive and finite, got {0}")]
    Radius(f64),
    #[error("angular velocity must be non-zero, finite and below pi, got {0}")]
    Velocity(f64),
    #[error("frequency must be positive and finite, got {0}")]
    Frequency(f64),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnsembleError {
    #[error("tone generator for arc {index} could not be created")]
    Voice {
        index: u32,
        #[source]
        source: AudioError,
    },
    #[error("arc {index} is invalid")]
    Arc {
        index: u32,
        #[source]
        source: ArcError,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("rebuild aborted")]
    Rebuild(#[from] EnsembleError),
}

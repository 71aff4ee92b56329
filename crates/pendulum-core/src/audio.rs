use crate::config::Waveform;
use crate::error::AudioError;

/// A continuously running oscillator behind its own gain stage.
///
/// Gain changes are scheduled against the backend's clock and never block.
pub trait ToneSource {
    /// Cancel automation scheduled after `at` and pin the gain to whatever
    /// value it has at that instant.
    fn hold_gain(&mut self, at: f64);
    /// Ramp linearly from the previous scheduled point to `value` at `end`.
    fn ramp_gain(&mut self, value: f32, end: f64);
    /// Stop the oscillator and detach it from the output bus.
    fn stop(&mut self);
}

/// Factory for tone generators sharing one output bus and one clock.
pub trait AudioBackend {
    type Tone: ToneSource;

    /// Clock the gain ramps are scheduled against, in seconds.
    fn current_time(&self) -> f64;
    /// Create a running, silent tone generator.
    fn create_tone(&mut self, waveform: Waveform, frequency_hz: f64)
        -> Result<Self::Tone, AudioError>;
    /// Freeze the clock; in-flight ramps pause where they are.
    fn suspend(&mut self);
    fn resume(&mut self);
    fn is_suspended(&self) -> bool;
}

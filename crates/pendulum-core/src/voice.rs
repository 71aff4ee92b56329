use crate::audio::ToneSource;
use crate::config::Envelope;

/// One arc's synthesizer voice: a tone generator plus its trigger envelope.
///
/// The voice owns its source exclusively; disposing (or dropping) it stops the
/// source exactly once.
#[derive(Debug)]
pub struct ToneVoice<T: ToneSource> {
    source: Option<T>,
    envelope: Envelope,
    triggers: u64,
}

impl<T: ToneSource> ToneVoice<T> {
    pub fn new(source: T, envelope: Envelope) -> Self {
        Self {
            source: Some(source),
            envelope,
            triggers: 0,
        }
    }

    /// Attack to `max_gain`, then release to silence. Returns false once disposed.
    pub fn trigger(&mut self, now: f64) -> bool {
        let Some(source) = self.source.as_mut() else {
            return false;
        };
        let peak_at = now + self.envelope.attack_secs;
        source.hold_gain(now);
        source.ramp_gain(self.envelope.max_gain, peak_at);
        source.ramp_gain(0.0, peak_at + self.envelope.release_secs);
        self.triggers += 1;
        true
    }

    /// Fade from the current level to silence over the release time.
    pub fn release(&mut self, now: f64) {
        if let Some(source) = self.source.as_mut() {
            source.hold_gain(now);
            source.ramp_gain(0.0, now + self.envelope.release_secs);
        }
    }

    /// Stop the source. Returns true only for the call that actually stopped it.
    pub fn dispose(&mut self) -> bool {
        match self.source.take() {
            Some(mut source) => {
                source.stop();
                true
            }
            None => false,
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.source.is_none()
    }

    pub fn trigger_count(&self) -> u64 {
        self.triggers
    }
}

impl<T: ToneSource> Drop for ToneVoice<T> {
    fn drop(&mut self) {
        self.dispose();
    }
}

//! Software model of a gain parameter with scheduled linear ramps.
//!
//! Mirrors the parts of the WebAudio `AudioParam` timeline the voices rely on:
//! `setValueAtTime`, `linearRampToValueAtTime` and `cancelScheduledValues`.
//! Software backends (the native synth and the offline test backend) keep one
//! of these per tone and evaluate it against their own clock.

use smallvec::SmallVec;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Segment {
    Set,
    Ramp,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct GainEvent {
    time: f64,
    value: f32,
    segment: Segment,
}

#[derive(Clone, Debug, Default)]
pub struct GainAutomation {
    initial: f32,
    events: SmallVec<[GainEvent; 4]>,
}

impl GainAutomation {
    pub fn new(initial: f32) -> Self {
        Self {
            initial,
            events: SmallVec::new(),
        }
    }

    /// Value of the parameter at clock time `t`.
    pub fn value_at(&self, t: f64) -> f32 {
        let mut prev_time = 0.0;
        let mut prev_value = self.initial;
        for ev in &self.events {
            if ev.time <= t {
                prev_time = ev.time;
                prev_value = ev.value;
                continue;
            }
            return match ev.segment {
                Segment::Set => prev_value,
                Segment::Ramp => {
                    let span = ev.time - prev_time;
                    if span <= 0.0 {
                        ev.value
                    } else {
                        let k = ((t - prev_time) / span) as f32;
                        prev_value + (ev.value - prev_value) * k
                    }
                }
            };
        }
        prev_value
    }

    /// Drop every event scheduled after `at`.
    pub fn cancel_after(&mut self, at: f64) {
        self.events.retain(|ev| ev.time <= at);
    }

    pub fn set_value_at(&mut self, value: f32, at: f64) {
        self.insert(GainEvent {
            time: at,
            value,
            segment: Segment::Set,
        });
    }

    /// Ramp linearly from the previous event to `value`, arriving at `end`.
    pub fn linear_ramp_to(&mut self, value: f32, end: f64) {
        self.insert(GainEvent {
            time: end,
            value,
            segment: Segment::Ramp,
        });
    }

    /// Freeze the current value at `at` and discard anything scheduled later.
    pub fn hold(&mut self, at: f64) {
        let value = self.value_at(at);
        self.cancel_after(at);
        self.set_value_at(value, at);
    }

    /// Forget events that no longer influence values at or after `now`.
    pub fn prune(&mut self, now: f64) {
        let settled = self.events.iter().rposition(|ev| ev.time <= now);
        if let Some(last) = settled {
            self.initial = self.events[last].value;
            // The last settled event stays: a pending ramp starts from it.
            self.events.drain(..last);
        }
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    fn insert(&mut self, ev: GainEvent) {
        let at = self
            .events
            .iter()
            .position(|e| e.time > ev.time)
            .unwrap_or(self.events.len());
        self.events.insert(at, ev);
    }
}

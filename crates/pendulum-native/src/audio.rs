// ---------------- Native audio (cpal) ----------------
//
// A small software synth: one always-running oscillator per voice, each behind
// a scheduled gain (`GainAutomation`), mixed and soft-clipped in the cpal
// callback. The sample counter is the clock ramps are scheduled against.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use pendulum_core::{AudioBackend, AudioError, GainAutomation, ToneSource, Waveform};
use std::f32::consts::TAU;
use std::sync::{Arc, Mutex, MutexGuard};

pub const MAX_VOICES: usize = 64;
const FALLBACK_SAMPLE_RATE: f32 = 48_000.0;
// Settled automation events are dropped this often (in samples).
const PRUNE_INTERVAL: u64 = 4096;

struct SynthVoice {
    wave: Waveform,
    phase: f32,     // radians
    phase_inc: f32, // radians per sample
    gain: GainAutomation,
}

struct SynthState {
    sample_rate: f32,
    samples: u64,
    suspended: bool,
    voices: Vec<Option<SynthVoice>>,
}

impl SynthState {
    fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            samples: 0,
            suspended: false,
            voices: Vec::new(),
        }
    }

    fn now(&self) -> f64 {
        self.samples as f64 / self.sample_rate as f64
    }

    fn voice_mut(&mut self, slot: usize) -> Option<&mut SynthVoice> {
        self.voices.get_mut(slot).and_then(Option::as_mut)
    }

    /// One mono output sample; silence (and a frozen clock) while suspended.
    fn next_sample(&mut self) -> f32 {
        if self.suspended {
            return 0.0;
        }
        let t = self.now();
        let mut mix = 0.0f32;
        for voice in self.voices.iter_mut().flatten() {
            let gain = voice.gain.value_at(t);
            if gain > 0.0 {
                mix += render_wave_sample(voice.phase, voice.wave) * gain;
            }
            voice.phase += voice.phase_inc;
            if voice.phase >= TAU {
                voice.phase -= TAU;
            }
        }
        self.samples += 1;
        if self.samples % PRUNE_INTERVAL == 0 {
            for voice in self.voices.iter_mut().flatten() {
                voice.gain.prune(t);
            }
        }
        mix.tanh()
    }
}

fn lock(state: &Mutex<SynthState>) -> MutexGuard<'_, SynthState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

pub fn render_wave_sample(phase: f32, wave: Waveform) -> f32 {
    let saw = {
        // Map phase 0..2PI to -1..1
        let t = phase / TAU;
        2.0 * (t - t.floor()) - 1.0
    };
    match wave {
        Waveform::Sine => phase.sin(),
        Waveform::Square => {
            if phase.sin() >= 0.0 {
                1.0
            } else {
                -1.0
            }
        }
        Waveform::Sawtooth => saw,
        Waveform::Triangle => 1.0 - 2.0 * saw.abs(),
    }
}

pub struct CpalAudio {
    state: Arc<Mutex<SynthState>>,
    _stream: Option<cpal::Stream>,
}

impl CpalAudio {
    /// Open the default output device and start streaming.
    pub fn new() -> anyhow::Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow::anyhow!(AudioError::Unavailable("no output device".into())))?;
        let config = device.default_output_config()?;
        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;
        let state = Arc::new(Mutex::new(SynthState::new(sample_rate)));

        let err_fn = |err| log::error!("[audio] stream error: {err}");
        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => {
                build_stream_f32(&device, &config.into(), channels, Arc::clone(&state), err_fn)?
            }
            cpal::SampleFormat::I16 => {
                build_stream_i16(&device, &config.into(), channels, Arc::clone(&state), err_fn)?
            }
            cpal::SampleFormat::U16 => {
                build_stream_u16(&device, &config.into(), channels, Arc::clone(&state), err_fn)?
            }
            other => {
                return Err(anyhow::anyhow!(AudioError::Unavailable(format!(
                    "unsupported sample format {other:?}"
                ))))
            }
        };
        stream.play()?;
        log::info!(
            "[audio] streaming at {} Hz, {} channel(s)",
            sample_rate,
            channels
        );
        Ok(Self {
            state,
            _stream: Some(stream),
        })
    }

    /// Backend without an output stream; its clock never advances.
    pub fn silent() -> Self {
        Self {
            state: Arc::new(Mutex::new(SynthState::new(FALLBACK_SAMPLE_RATE))),
            _stream: None,
        }
    }
}

impl AudioBackend for CpalAudio {
    type Tone = CpalTone;

    fn current_time(&self) -> f64 {
        lock(&self.state).now()
    }

    fn create_tone(&mut self, waveform: Waveform, frequency_hz: f64) -> Result<CpalTone, AudioError> {
        let mut guard = lock(&self.state);
        let voice = SynthVoice {
            wave: waveform,
            phase: 0.0,
            phase_inc: TAU * frequency_hz as f32 / guard.sample_rate,
            gain: GainAutomation::new(0.0),
        };
        let slot = match guard.voices.iter().position(Option::is_none) {
            Some(free) => {
                guard.voices[free] = Some(voice);
                free
            }
            None if guard.voices.len() < MAX_VOICES => {
                guard.voices.push(Some(voice));
                guard.voices.len() - 1
            }
            None => {
                return Err(AudioError::ToneCreation(format!(
                    "voice limit of {MAX_VOICES} reached"
                )))
            }
        };
        Ok(CpalTone {
            slot,
            state: Arc::clone(&self.state),
        })
    }

    fn suspend(&mut self) {
        lock(&self.state).suspended = true;
    }

    fn resume(&mut self) {
        lock(&self.state).suspended = false;
    }

    fn is_suspended(&self) -> bool {
        lock(&self.state).suspended
    }
}

pub struct CpalTone {
    slot: usize,
    state: Arc<Mutex<SynthState>>,
}

impl ToneSource for CpalTone {
    fn hold_gain(&mut self, at: f64) {
        if let Some(v) = lock(&self.state).voice_mut(self.slot) {
            v.gain.hold(at);
        }
    }

    fn ramp_gain(&mut self, value: f32, end: f64) {
        if let Some(v) = lock(&self.state).voice_mut(self.slot) {
            v.gain.linear_ramp_to(value, end);
        }
    }

    fn stop(&mut self) {
        if let Some(v) = lock(&self.state).voices.get_mut(self.slot) {
            *v = None;
        }
    }
}

fn fill<T: Copy>(
    data: &mut [T],
    channels: usize,
    state: &Mutex<SynthState>,
    convert: impl Fn(f32) -> T,
) {
    let mut guard = lock(state);
    for frame in data.chunks_mut(channels.max(1)) {
        let s = convert(guard.next_sample());
        for out in frame.iter_mut() {
            *out = s;
        }
    }
}

fn build_stream_f32(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    state: Arc<Mutex<SynthState>>,
    err_fn: impl Fn(cpal::StreamError) + Send + 'static,
) -> Result<cpal::Stream, cpal::BuildStreamError> {
    device.build_output_stream(
        config,
        move |data: &mut [f32], _| fill(data, channels, &state, |s| s),
        err_fn,
        None,
    )
}

fn build_stream_i16(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    state: Arc<Mutex<SynthState>>,
    err_fn: impl Fn(cpal::StreamError) + Send + 'static,
) -> Result<cpal::Stream, cpal::BuildStreamError> {
    device.build_output_stream(
        config,
        move |data: &mut [i16], _| fill(data, channels, &state, |s| (s * i16::MAX as f32) as i16),
        err_fn,
        None,
    )
}

fn build_stream_u16(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    state: Arc<Mutex<SynthState>>,
    err_fn: impl Fn(cpal::StreamError) + Send + 'static,
) -> Result<cpal::Stream, cpal::BuildStreamError> {
    device.build_output_stream(
        config,
        move |data: &mut [u16], _| {
            fill(data, channels, &state, |s| {
                ((s * 0.5 + 0.5).clamp(0.0, 1.0) * u16::MAX as f32) as u16
            })
        },
        err_fn,
        None,
    )
}

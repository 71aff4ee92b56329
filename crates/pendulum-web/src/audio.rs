use pendulum_core::{AudioBackend, AudioError, ToneSource, Waveform};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

/// WebAudio backend: every tone is an oscillator behind its own gain node,
/// all of them summed into one master gain on the destination.
pub struct WebAudio {
    ctx: web::AudioContext,
    master: web::GainNode,
    suspended: bool,
}

fn create_gain(ctx: &web::AudioContext, value: f32, label: &str) -> Result<web::GainNode, AudioError> {
    match web::GainNode::new(ctx) {
        Ok(g) => {
            g.gain().set_value(value);
            Ok(g)
        }
        Err(e) => {
            log::error!("{} GainNode error: {:?}", label, e);
            Err(AudioError::ToneCreation(format!("{label} GainNode: {e:?}")))
        }
    }
}

fn oscillator_type(waveform: Waveform) -> web::OscillatorType {
    match waveform {
        Waveform::Sine => web::OscillatorType::Sine,
        Waveform::Square => web::OscillatorType::Square,
        Waveform::Sawtooth => web::OscillatorType::Sawtooth,
        Waveform::Triangle => web::OscillatorType::Triangle,
    }
}

// suspend()/resume() settle asynchronously; failures are only logged.
fn settle(label: &'static str, promise: Result<js_sys::Promise, JsValue>) {
    match promise {
        Ok(p) => spawn_local(async move {
            if let Err(e) = JsFuture::from(p).await {
                log::error!("[audio] {} failed: {:?}", label, e);
            }
        }),
        Err(e) => log::error!("[audio] {} rejected: {:?}", label, e),
    }
}

impl WebAudio {
    pub fn new() -> anyhow::Result<Self> {
        let ctx = web::AudioContext::new()
            .map_err(|e| anyhow::anyhow!(format!("AudioContext error: {:?}", e)))?;
        let master = create_gain(&ctx, 1.0, "Master")?;
        master
            .connect_with_audio_node(&ctx.destination())
            .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
        // Browsers keep a fresh context suspended until a user gesture.
        let suspended = ctx.state() != web::AudioContextState::Running;
        Ok(Self {
            ctx,
            master,
            suspended,
        })
    }
}

impl AudioBackend for WebAudio {
    type Tone = WebTone;

    fn current_time(&self) -> f64 {
        self.ctx.current_time()
    }

    fn create_tone(&mut self, waveform: Waveform, frequency_hz: f64) -> Result<WebTone, AudioError> {
        let gain = create_gain(&self.ctx, 0.0, "Voice")?;
        let osc = web::OscillatorNode::new(&self.ctx)
            .map_err(|e| AudioError::ToneCreation(format!("OscillatorNode: {:?}", e)))?;
        osc.set_type(oscillator_type(waveform));
        osc.frequency().set_value(frequency_hz as f32);
        osc.connect_with_audio_node(&gain)
            .and_then(|_| gain.connect_with_audio_node(&self.master))
            .map_err(|e| AudioError::ToneCreation(format!("connect: {:?}", e)))?;
        web::AudioScheduledSourceNode::start(&osc)
            .map_err(|e| AudioError::ToneCreation(format!("start: {:?}", e)))?;
        Ok(WebTone { osc, gain })
    }

    fn suspend(&mut self) {
        self.suspended = true;
        settle("suspend", self.ctx.suspend());
    }

    fn resume(&mut self) {
        self.suspended = false;
        settle("resume", self.ctx.resume());
    }

    fn is_suspended(&self) -> bool {
        self.suspended
    }
}

pub struct WebTone {
    osc: web::OscillatorNode,
    gain: web::GainNode,
}

impl ToneSource for WebTone {
    fn hold_gain(&mut self, at: f64) {
        let param = self.gain.gain();
        let current = param.value();
        let _ = param.cancel_scheduled_values(at);
        let _ = param.set_value_at_time(current, at);
    }

    fn ramp_gain(&mut self, value: f32, end: f64) {
        let _ = self.gain.gain().linear_ramp_to_value_at_time(value, end);
    }

    fn stop(&mut self) {
        let _ = web::AudioScheduledSourceNode::stop(&self.osc);
        let _ = self.osc.disconnect();
        let _ = self.gain.disconnect();
    }
}

use crate::audio::{AudioBackend, ToneSource};
use crate::config::Config;
use crate::error::EnsembleError;
use crate::oscillator::PendulumArc;
use crate::voice::ToneVoice;

/// The live set of arcs, stored densely in construction order.
///
/// A rebuild produces a new generation: the previous arcs are taken out of
/// the array and disposed (last first) before any new tone is created, and the
/// new arcs only become visible once all of them were built.
#[derive(Debug)]
pub struct Ensemble<T: ToneSource> {
    arcs: Vec<PendulumArc<T>>,
    generation: u64,
}

impl<T: ToneSource> Default for Ensemble<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ToneSource> Ensemble<T> {
    pub fn new() -> Self {
        Self {
            arcs: Vec::new(),
            generation: 0,
        }
    }

    /// Replace the current arcs with a fresh set built from `config`.
    ///
    /// On failure every arc created by this call is disposed again and the
    /// ensemble is left empty.
    pub fn rebuild<B>(&mut self, config: &Config, audio: &mut B) -> Result<usize, EnsembleError>
    where
        B: AudioBackend<Tone = T>,
    {
        let retired = self.teardown();
        let mut next = Vec::new();
        for index in 1..=config.arc_count {
            match build_arc(config, index, audio) {
                Ok(arc) => next.push(arc),
                Err(e) => {
                    log::warn!(
                        "[ensemble] rebuild aborted at arc {}/{}: {}",
                        index,
                        config.arc_count,
                        e
                    );
                    dispose_all(next);
                    return Err(e);
                }
            }
        }
        self.arcs = next;
        self.generation += 1;
        log::info!(
            "[ensemble] generation {}: {} arcs ({} retired), {:.0}-{:.0} Hz",
            self.generation,
            self.arcs.len(),
            retired,
            config.frequency_for(1),
            config.frequency_for(config.arc_count)
        );
        Ok(self.arcs.len())
    }

    /// Dispose every arc, last first. Returns how many were live.
    pub fn teardown(&mut self) -> usize {
        let disposed = dispose_all(std::mem::take(&mut self.arcs));
        if disposed > 0 {
            log::debug!("[ensemble] disposed {} arcs", disposed);
        }
        disposed
    }

    pub fn arcs(&self) -> &[PendulumArc<T>] {
        &self.arcs
    }

    pub fn arcs_mut(&mut self) -> &mut [PendulumArc<T>] {
        &mut self.arcs
    }

    pub fn get(&self, index: usize) -> Option<&PendulumArc<T>> {
        self.arcs.get(index)
    }

    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// Number of successful rebuilds so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl<T: ToneSource> Drop for Ensemble<T> {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn build_arc<B: AudioBackend>(
    config: &Config,
    index: u32,
    audio: &mut B,
) -> Result<PendulumArc<B::Tone>, EnsembleError> {
    let params = config.arc_params(index);
    params
        .validate()
        .map_err(|source| EnsembleError::Arc { index, source })?;
    let tone = audio
        .create_tone(config.waveform, params.frequency)
        .map_err(|source| EnsembleError::Voice { index, source })?;
    PendulumArc::new(params, ToneVoice::new(tone, config.envelope))
        .map_err(|source| EnsembleError::Arc { index, source })
}

fn dispose_all<T: ToneSource>(mut arcs: Vec<PendulumArc<T>>) -> usize {
    let mut disposed = 0;
    while let Some(mut arc) = arcs.pop() {
        if arc.dispose() {
            disposed += 1;
        }
    }
    disposed
}

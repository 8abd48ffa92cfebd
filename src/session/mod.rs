//! Per-user equalizer state and the recomputation pipeline.
//!
//! A [`Session`] owns the input signal, the output signal, the three gain
//! vectors and the active mode. Every operation runs to completion before it
//! returns; nothing here is shared between sessions.

pub mod artifacts;
pub mod modes;
pub mod playback;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::audio::{self, InputKind, Signal};
use crate::dsp::bands::{apply_bands, EdgeLookup};
use crate::dsp::spectrogram::{spectrogram, Spectrogram, SpectrogramParams};
use crate::dsp::transform::Spectrum;
use crate::error::{EqError, Result};

pub use artifacts::{ArtifactStamp, ArtifactStore};
pub use modes::{GainVector, Mode, ModeRegistry};
pub use playback::{to_playable, LoudnessHint, PlayableAudio};

/// Which of the two session signals to address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    Input,
    Output,
}

impl Channel {
    pub fn file_name(self) -> &'static str {
        match self {
            Channel::Input => "input.wav",
            Channel::Output => "output.wav",
        }
    }

    pub(crate) fn slot(self) -> usize {
        match self {
            Channel::Input => 0,
            Channel::Output => 1,
        }
    }
}

/// Rebuild an output signal from `input` with `gains` applied.
///
/// Always starts from the input, so repeated calls with the same gains give
/// the same result.
pub fn recompute(input: &Signal, gains: &GainVector, lookup: EdgeLookup) -> Result<Signal> {
    let spectrum = Spectrum::analyze(&input.samples, input.sample_rate);
    let shaped = apply_bands(&spectrum, gains.values(), lookup)?;
    Ok(input.with_samples(shaped.synthesize()))
}

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

pub struct Session {
    id: u64,
    input: Option<Signal>,
    output: Option<Signal>,
    registry: ModeRegistry,
    mode: Mode,
    lookup: EdgeLookup,
    input_version: u64,
    output_version: u64,
    hint: LoudnessHint,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(EdgeLookup::default())
    }
}

impl Session {
    pub fn new(lookup: EdgeLookup) -> Self {
        Self {
            id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
            input: None,
            output: None,
            registry: ModeRegistry::new(),
            mode: Mode::default(),
            lookup,
            input_version: 0,
            output_version: 0,
            hint: LoudnessHint::default(),
        }
    }

    /// Seeded loudness hint, for reproducible runs.
    pub fn with_hint_seed(mut self, seed: u64) -> Self {
        self.hint = LoudnessHint::new(Some(seed));
        self
    }

    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let signal = audio::ingest_file(path)?;
        self.install(signal);
        Ok(())
    }

    pub fn load(&mut self, raw: Vec<u8>, kind: InputKind) -> Result<()> {
        let signal = audio::ingest(raw, kind)?;
        self.install(signal);
        Ok(())
    }

    /// Replace both signals; output starts as an exact copy of input.
    pub fn install(&mut self, signal: Signal) {
        log::info!(
            "Loaded signal: {} samples @ {}Hz ({:.2}s)",
            signal.len(),
            signal.sample_rate,
            signal.duration()
        );
        self.output = Some(signal.clone());
        self.input = Some(signal);
        self.input_version += 1;
        self.output_version += 1;
        self.hint.regenerate();
    }

    pub fn input(&self) -> Option<&Signal> {
        self.input.as_ref()
    }

    pub fn output(&self) -> Option<&Signal> {
        self.output.as_ref()
    }

    pub fn signal(&self, channel: Channel) -> Option<&Signal> {
        match channel {
            Channel::Input => self.input(),
            Channel::Output => self.output(),
        }
    }

    pub fn version(&self, channel: Channel) -> u64 {
        match channel {
            Channel::Input => self.input_version,
            Channel::Output => self.output_version,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn edge_lookup(&self) -> EdgeLookup {
        self.lookup
    }

    /// Change which vector recomputation reads. Does not recompute.
    pub fn switch_mode(&mut self, mode: Mode) {
        if mode != self.mode {
            log::info!("Mode: {} -> {}", self.mode, mode);
            self.mode = mode;
        }
    }

    pub fn gains(&self, mode: Mode) -> &GainVector {
        self.registry.get_active_vector(mode)
    }

    pub fn active_gains(&self) -> &GainVector {
        self.registry.get_active_vector(self.mode)
    }

    /// Store a gain; recomputes when `mode` is the active one and a signal is loaded.
    pub fn set_gain(&mut self, mode: Mode, band: usize, value_db: f64) -> Result<()> {
        self.registry.set_gain(mode, band, value_db)?;
        if mode == self.mode && self.input.is_some() {
            self.refresh()?;
        }
        Ok(())
    }

    pub fn set_active_gain(&mut self, band: usize, value_db: f64) -> Result<()> {
        self.set_gain(self.mode, band, value_db)
    }

    /// Zero the active vector and recompute.
    pub fn reset(&mut self) -> Result<()> {
        self.registry.reset(self.mode);
        if self.input.is_some() {
            self.refresh()?;
        }
        Ok(())
    }

    pub fn reset_all(&mut self) -> Result<()> {
        self.registry.reset_all();
        if self.input.is_some() {
            self.refresh()?;
        }
        Ok(())
    }

    /// Recompute output from input and the active vector.
    ///
    /// On failure the previous output is kept and the error is returned.
    pub fn refresh(&mut self) -> Result<()> {
        let input = self.input.as_ref().ok_or(EqError::NoSignal)?;
        let gains = *self.registry.get_active_vector(self.mode);

        match recompute(input, &gains, self.lookup) {
            Ok(output) => {
                self.output = Some(output);
                self.output_version += 1;
                self.hint.regenerate();
                log::info!(
                    "Recomputed output ({} mode, version {})",
                    self.mode,
                    self.output_version
                );
                Ok(())
            }
            Err(e) => {
                log::warn!("Recompute skipped, keeping previous output: {}", e);
                Err(e)
            }
        }
    }

    pub fn loudness_hint(&self) -> Option<u8> {
        self.hint.current()
    }

    /// Process-unique id, distinguishing this session's artifacts from
    /// another session's with the same version numbers.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn stamp(&self, channel: Channel) -> ArtifactStamp {
        ArtifactStamp {
            session: self.id,
            version: self.version(channel),
        }
    }

    pub fn playable(&self, channel: Channel) -> Result<PlayableAudio> {
        let signal = self.signal(channel).ok_or(EqError::NoSignal)?;
        Ok(to_playable(signal))
    }

    /// Bring both waveform files up to date and return their paths.
    pub fn materialize(&self, store: &mut ArtifactStore) -> Result<(PathBuf, PathBuf)> {
        let input = store.refresh(
            Channel::Input,
            self.stamp(Channel::Input),
            &self.playable(Channel::Input)?,
        )?;
        let output = store.refresh(
            Channel::Output,
            self.stamp(Channel::Output),
            &self.playable(Channel::Output)?,
        )?;
        Ok((input, output))
    }

    /// Artifact path for `channel`, only if it still matches the signal.
    pub fn fresh_artifact(&self, store: &ArtifactStore, channel: Channel) -> Option<PathBuf> {
        store.fresh_path(channel, self.stamp(channel))
    }

    pub fn spectrogram(&self, channel: Channel, params: &SpectrogramParams) -> Result<Spectrogram> {
        let signal = self.signal(channel).ok_or(EqError::NoSignal)?;
        Ok(spectrogram(signal, params))
    }
}

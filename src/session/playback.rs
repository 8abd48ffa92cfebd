use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::ops::RangeInclusive;

use crate::audio::Signal;

/// Signed 16-bit full scale.
pub const PCM16_FULL_SCALE: f64 = 32767.0;

const HINT_RANGE: RangeInclusive<u8> = 90..=100;

/// Samples ready for a waveform container.
#[derive(Clone, Debug)]
pub struct PlayableAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl PlayableAudio {
    pub fn peak(&self) -> f32 {
        self.samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max)
    }
}

/// Map int16-scale amplitudes into the container's [-1, 1] range.
///
/// No clipping and no peak normalization: values pushed past full scale by
/// positive gain stay out of range.
pub fn to_playable(signal: &Signal) -> PlayableAudio {
    PlayableAudio {
        samples: signal
            .samples
            .iter()
            .map(|&s| (s / PCM16_FULL_SCALE) as f32)
            .collect(),
        sample_rate: signal.sample_rate,
    }
}

/// Volume value for a playback widget, redrawn on every regeneration so the
/// widget always sees a different value. Carries no measured loudness.
pub struct LoudnessHint {
    rng: ChaCha8Rng,
    last: Option<u8>,
}

impl LoudnessHint {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_os_rng(),
        };
        Self { rng, last: None }
    }

    pub fn current(&self) -> Option<u8> {
        self.last
    }

    pub fn regenerate(&mut self) -> u8 {
        let mut value = self.rng.random_range(HINT_RANGE);
        while Some(value) == self.last {
            value = self.rng.random_range(HINT_RANGE);
        }
        self.last = Some(value);
        value
    }
}

impl Default for LoudnessHint {
    fn default() -> Self {
        Self::new(None)
    }
}

use clap::ValueEnum;
use serde::Serialize;
use std::fmt;

use crate::dsp::bands::{BAND_COUNT, MAX_GAIN_DB, MIN_GAIN_DB};
use crate::error::{EqError, Result};

/// Named gain preset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Default,
    Music,
    Vocals,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Default, Mode::Music, Mode::Vocals];

    fn slot(self) -> usize {
        match self {
            Mode::Default => 0,
            Mode::Music => 1,
            Mode::Vocals => 2,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Default => "default",
            Mode::Music => "music",
            Mode::Vocals => "vocals",
        };
        f.write_str(name)
    }
}

/// Ten per-band gains in dB.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct GainVector([f64; BAND_COUNT]);

impl GainVector {
    pub fn values(&self) -> &[f64; BAND_COUNT] {
        &self.0
    }

    pub fn get(&self, band: usize) -> Option<f64> {
        self.0.get(band).copied()
    }

    pub fn is_neutral(&self) -> bool {
        self.0.iter().all(|&g| g == 0.0)
    }
}

/// Three independent gain vectors, one per [`Mode`].
#[derive(Clone, Debug, Default)]
pub struct ModeRegistry {
    vectors: [GainVector; 3],
}

impl ModeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a gain, rounded to slider precision (3 decimals).
    pub fn set_gain(&mut self, mode: Mode, band: usize, value_db: f64) -> Result<()> {
        if band >= BAND_COUNT {
            return Err(EqError::InvalidBand(band));
        }
        if !value_db.is_finite() || !(MIN_GAIN_DB..=MAX_GAIN_DB).contains(&value_db) {
            return Err(EqError::GainOutOfRange(value_db));
        }
        self.vectors[mode.slot()].0[band] = (value_db * 1000.0).round() / 1000.0;
        Ok(())
    }

    pub fn get_active_vector(&self, mode: Mode) -> &GainVector {
        &self.vectors[mode.slot()]
    }

    pub fn reset(&mut self, mode: Mode) {
        self.vectors[mode.slot()] = GainVector::default();
    }

    pub fn reset_all(&mut self) {
        self.vectors = Default::default();
    }
}

//! # bandeq
//!
//! Spectral 10-band graphic equalizer for one-channel signals.
//!
//! - **Ingestion**: WAV containers or `time,amplitude` tables into one [`Signal`]
//! - **Transform**: real FFT / inverse with a reproducible frequency axis
//! - **Band gains**: ten fixed octave bands, dB gains, three independent presets
//! - **Playback**: int16-scale to container-scale samples, atomic WAV artifacts
//! - **Spectrogram**: short-time power image of either signal
//!
//! ```rust,ignore
//! use bandeq::{Mode, Session};
//!
//! let mut session = Session::default();
//! session.load_file("take.csv".as_ref())?;
//! session.switch_mode(Mode::Vocals);
//! session.set_active_gain(6, 4.5)?;
//! let output = session.output().unwrap();
//! ```

pub mod audio;
pub mod config;
pub mod dsp;
pub mod error;
pub mod session;

pub use audio::{InputKind, PlotSeries, Signal};
pub use dsp::{EdgeLookup, Spectrogram, SpectrogramParams, Spectrum, BANDS, BAND_COUNT};
pub use error::{EqError, Result};
pub use session::{recompute, ArtifactStamp, ArtifactStore, Channel, GainVector, Mode, Session};

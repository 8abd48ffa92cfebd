pub mod bands;
pub mod spectrogram;
pub mod transform;

pub use bands::{apply_bands, band_range, db_to_linear, Band, EdgeLookup, BANDS, BAND_COUNT};
pub use spectrogram::{spectrogram, Spectrogram, SpectrogramParams};
pub use transform::{forward, frequencies, inverse, Spectrum};

use thiserror::Error;

/// Errors raised by the equalization engine.
#[derive(Error, Debug)]
pub enum EqError {
    #[error("Unsupported file format: '{extension}' (expected wav, csv or txt)")]
    UnsupportedFormat { extension: String },

    #[error("Cannot infer sample rate: {rows} rows spanning {span}s")]
    DegenerateTimeSpan { rows: usize, span: f64 },

    #[error("Band {band}: no bin at exactly {edge_hz} Hz on the frequency axis")]
    BandEdgeNotFound { band: usize, edge_hz: f64 },

    #[error("Table line {line}: {message}")]
    Table { line: usize, message: String },

    #[error("Waveform contains no samples")]
    EmptySignal,

    #[error("No audio track found")]
    NoAudioTrack,

    #[error("Unknown sample rate")]
    UnknownSampleRate,

    #[error("Band index {0} out of range (0-9)")]
    InvalidBand(usize),

    #[error("Gain {0} dB outside [-20, 20]")]
    GainOutOfRange(f64),

    #[error("No signal loaded")]
    NoSignal,

    #[error("Decode error: {0}")]
    Decode(#[from] symphonia::core::errors::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EqError>;

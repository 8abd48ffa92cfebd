use clap::Parser;
use std::path::PathBuf;

use bandeq::session::Mode;

#[derive(Parser, Debug)]
#[command(name = "bandeq", about = "10-band spectral equalizer for mono signals")]
pub struct Cli {
    /// Input signal (WAV, or a time,amplitude CSV/TXT table)
    pub input: PathBuf,

    /// Gain preset to edit and render
    #[arg(short, long, value_enum, default_value_t = Mode::Default)]
    pub mode: Mode,

    /// Band gain as BAND=DB, band numbered 1-10 (repeatable)
    #[arg(short, long = "gain", value_parser = parse_gain)]
    pub gains: Vec<(usize, f64)>,

    /// Require band edges to appear exactly on the frequency axis
    #[arg(long)]
    pub exact_edges: bool,

    /// Directory for input.wav / output.wav
    #[arg(short, long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Write input/output spectrograms as JSON
    #[arg(long)]
    pub spectrogram: Option<PathBuf>,

    /// Write time/amplitude series and gain state as JSON
    #[arg(long)]
    pub plot: Option<PathBuf>,

    /// Config file (defaults to bandeq.toml or the user config dir)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// `3=-6.5` -> `(2, -6.5)`; bands are 1-based on the command line.
pub fn parse_gain(s: &str) -> Result<(usize, f64), String> {
    let (band, db) = s
        .split_once('=')
        .ok_or_else(|| format!("expected BAND=DB, got '{}'", s))?;
    let band: usize = band
        .trim()
        .parse()
        .map_err(|_| format!("invalid band number '{}'", band))?;
    if !(1..=10).contains(&band) {
        return Err(format!("band must be 1-10, got {}", band));
    }
    let db: f64 = db
        .trim()
        .parse()
        .map_err(|_| format!("invalid gain '{}'", db))?;
    Ok((band - 1, db))
}

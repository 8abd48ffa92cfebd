mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::Path;

use bandeq::config;
use bandeq::session::Mode;
use bandeq::{
    ArtifactStore, Channel, EdgeLookup, EqError, GainVector, PlotSeries, Session, Spectrogram,
    SpectrogramParams, BANDS,
};
use cli::Cli;

#[derive(Serialize)]
struct PlotReport<'a> {
    mode: Mode,
    gains_db: &'a GainVector,
    loudness_hint: Option<u8>,
    input: PlotSeries,
    output: PlotSeries,
}

#[derive(Serialize)]
struct SpectrogramReport {
    input: Spectrogram,
    output: Spectrogram,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut cli = Cli::parse();
    let mut lookup = EdgeLookup::default();
    let mut spectrogram_params = SpectrogramParams::default();

    if let Some(path) = config::find_config(cli.config.as_deref()) {
        if let Some(cfg) = config::load_config(&path) {
            log::info!("Loaded config from {}", path.display());
            // Config values apply only where the CLI is at its default
            if !cli.exact_edges {
                lookup = cfg.engine.edge_lookup;
            }
            if cli.out_dir == Path::new(".") {
                cli.out_dir = cfg.output.dir;
            }
            spectrogram_params = cfg.spectrogram;
        } else {
            log::warn!("Failed to load config from {}", path.display());
        }
    }
    if cli.exact_edges {
        lookup = EdgeLookup::Exact;
    }

    log::info!("bandeq - spectral equalizer");
    log::info!("Input: {}", cli.input.display());
    log::info!("Mode: {}, edge lookup: {:?}", cli.mode, lookup);

    let mut session = Session::new(lookup);
    session
        .load_file(&cli.input)
        .with_context(|| format!("Failed to load {}", cli.input.display()))?;

    session.switch_mode(cli.mode);
    for &(band, db) in &cli.gains {
        match session.set_active_gain(band, db) {
            Ok(()) => {}
            // Already logged by the session; the output keeps its last good value
            Err(EqError::BandEdgeNotFound { .. }) => {}
            Err(e) => {
                return Err(e).with_context(|| format!("Invalid gain for band {}", band + 1))
            }
        }
    }

    let gains = session.active_gains();
    for (band, gain) in BANDS.iter().zip(gains.values()) {
        log::info!("  {:<18} {:+7.3} dB", band.label(), gain);
    }

    let input = session.input().context("No input signal")?;
    let output = session.output().context("No output signal")?;
    log::info!(
        "RMS: input {:.2}, output {:.2} ({} samples @ {}Hz)",
        input.rms(),
        output.rms(),
        input.len(),
        input.sample_rate
    );

    let mut store = ArtifactStore::new(&cli.out_dir);
    let (input_wav, output_wav) = session
        .materialize(&mut store)
        .context("Failed to write waveform files")?;
    log::info!("Playback files: {}, {}", input_wav.display(), output_wav.display());

    if let Some(ref path) = cli.spectrogram {
        let report = SpectrogramReport {
            input: session.spectrogram(Channel::Input, &spectrogram_params)?,
            output: session.spectrogram(Channel::Output, &spectrogram_params)?,
        };
        write_json(path, &report)?;
        log::info!("Spectrograms: {}", path.display());
    }

    if let Some(ref path) = cli.plot {
        let report = PlotReport {
            mode: session.mode(),
            gains_db: session.active_gains(),
            loudness_hint: session.loudness_hint(),
            input: input.plot_series(),
            output: output.plot_series(),
        };
        write_json(path, &report)?;
        log::info!("Plot data: {}", path.display());
    }

    log::info!("Done!");
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    serde_json::to_writer(std::io::BufWriter::new(file), value)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

use rayon::prelude::*;
use realfft::RealFftPlanner;
use serde::{Deserialize, Serialize};

use crate::audio::Signal;

/// Floor applied before taking logs so silent bins stay finite.
const POWER_FLOOR: f64 = 1e-20;

#[derive(Clone, Copy, Debug, Deserialize)]
pub struct SpectrogramParams {
    /// Analysis window length in samples
    #[serde(default = "default_window")]
    pub window: usize,
    /// Samples shared between consecutive windows
    #[serde(default = "default_overlap")]
    pub overlap: usize,
}

impl Default for SpectrogramParams {
    fn default() -> Self {
        Self {
            window: default_window(),
            overlap: default_overlap(),
        }
    }
}

fn default_window() -> usize { 1024 }
fn default_overlap() -> usize { 128 }

impl SpectrogramParams {
    fn hop(&self) -> usize {
        self.window.saturating_sub(self.overlap).max(1)
    }
}

/// Time-frequency power image.
#[derive(Clone, Debug, Serialize)]
pub struct Spectrogram {
    /// Window centres in seconds
    pub times: Vec<f64>,
    /// Bin frequencies in Hz (0 to Nyquist)
    pub freqs: Vec<f64>,
    /// One-sided power spectral density in dB, `power_db[frame][bin]`
    pub power_db: Vec<Vec<f64>>,
}

impl Spectrogram {
    pub fn num_frames(&self) -> usize {
        self.times.len()
    }

    pub fn num_bins(&self) -> usize {
        self.freqs.len()
    }
}

/// Short-time power spectrum of `signal`. Read-only.
pub fn spectrogram(signal: &Signal, params: &SpectrogramParams) -> Spectrogram {
    let window_len = params.window.max(2);
    let hop = params.hop();
    let fs = signal.sample_rate as f64;

    // Shorter signals are zero-padded to one full window
    let mut padded;
    let samples: &[f64] = if signal.samples.len() < window_len {
        padded = vec![0.0; window_len];
        padded[..signal.samples.len()].copy_from_slice(&signal.samples);
        &padded
    } else {
        &signal.samples
    };

    let num_frames = (samples.len() - window_len) / hop + 1;
    let num_bins = window_len / 2 + 1;
    let window = hann_window(window_len);
    let window_power: f64 = window.iter().map(|w| w * w).sum();
    let scale = 1.0 / (fs * window_power);

    let mut planner = RealFftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(window_len);

    let power_db: Vec<Vec<f64>> = (0..num_frames)
        .into_par_iter()
        .map(|frame_idx| {
            let start = frame_idx * hop;
            let mut frame: Vec<f64> = samples[start..start + window_len]
                .iter()
                .zip(&window)
                .map(|(&s, &w)| s * w)
                .collect();
            let mut spectrum = fft.make_output_vec();
            if let Err(e) = fft.process(&mut frame, &mut spectrum) {
                log::warn!("Spectrogram frame {} FFT failed: {}", frame_idx, e);
            }

            spectrum
                .iter()
                .enumerate()
                .map(|(k, c)| {
                    let mut power = c.norm_sqr() * scale;
                    // Fold negative frequencies into the one-sided estimate
                    let is_edge = k == 0 || (window_len % 2 == 0 && k == num_bins - 1);
                    if !is_edge {
                        power *= 2.0;
                    }
                    10.0 * power.max(POWER_FLOOR).log10()
                })
                .collect()
        })
        .collect();

    let times = (0..num_frames)
        .map(|i| (i * hop) as f64 / fs + window_len as f64 / (2.0 * fs))
        .collect();
    let freqs = (0..num_bins)
        .map(|k| k as f64 * fs / window_len as f64)
        .collect();

    log::debug!(
        "Spectrogram: {} frames x {} bins (window={}, hop={})",
        num_frames,
        num_bins,
        window_len,
        hop
    );

    Spectrogram {
        times,
        freqs,
        power_db,
    }
}

pub fn hann_window(size: usize) -> Vec<f64> {
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * std::f64::consts::PI * i as f64 / (size - 1) as f64).cos()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn tone(freq: f64, sample_rate: u32, n: usize) -> Signal {
        let samples = (0..n)
            .map(|i| 1000.0 * (2.0 * PI * freq * i as f64 / sample_rate as f64).sin())
            .collect();
        Signal::from_samples(samples, sample_rate)
    }

    #[test]
    fn test_hann_window() {
        let w = hann_window(1024);
        assert!(w[0].abs() < 1e-12);
        assert!(w[1023].abs() < 1e-12);
        assert!((w[511] - 1.0).abs() < 0.01);
    }

    #[test]
    fn frame_layout() {
        let signal = tone(1000.0, 8000, 8000);
        let image = spectrogram(&signal, &SpectrogramParams::default());
        // (8000 - 1024) / 896 + 1
        assert_eq!(image.num_frames(), 8);
        assert_eq!(image.num_bins(), 513);
        assert_eq!(image.power_db.len(), 8);
        assert!(image.power_db.iter().all(|row| row.len() == 513));
        assert!((image.times[0] - 512.0 / 8000.0).abs() < 1e-12);
        assert_eq!(*image.freqs.last().unwrap(), 4000.0);
    }

    #[test]
    fn tone_peaks_at_its_frequency() {
        let signal = tone(1000.0, 8000, 8000);
        let image = spectrogram(&signal, &SpectrogramParams::default());
        for row in &image.power_db {
            let peak = row
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
                .map(|(k, _)| k)
                .unwrap();
            assert_eq!(image.freqs[peak], 1000.0);
        }
    }

    #[test]
    fn short_signal_is_padded() {
        let signal = tone(5.0, 100, 100);
        let image = spectrogram(&signal, &SpectrogramParams::default());
        assert_eq!(image.num_frames(), 1);
        assert!(image.power_db[0].iter().all(|v| v.is_finite()));
    }

    #[test]
    fn does_not_touch_signal() {
        let signal = tone(440.0, 8000, 4000);
        let before = signal.clone();
        let _ = spectrogram(&signal, &SpectrogramParams { window: 256, overlap: 64 });
        assert_eq!(signal, before);
    }
}

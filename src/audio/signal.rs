use serde::Serialize;

/// Canonical one-channel signal shared by every engine stage.
#[derive(Clone, Debug, PartialEq)]
pub struct Signal {
    /// Time axis in seconds, one entry per sample
    pub time: Vec<f64>,
    /// Amplitude in signed 16-bit scale (full scale = 32767)
    pub samples: Vec<f64>,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl Signal {
    /// Build a signal whose time axis spans `0..=n/sample_rate` in `n` evenly spaced points.
    pub fn from_samples(samples: Vec<f64>, sample_rate: u32) -> Self {
        let time = linspace(0.0, samples.len() as f64 / sample_rate as f64, samples.len());
        Self {
            time,
            samples,
            sample_rate,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Same time axis and rate, new amplitudes.
    pub fn with_samples(&self, samples: Vec<f64>) -> Self {
        debug_assert_eq!(samples.len(), self.time.len());
        Self {
            time: self.time.clone(),
            samples,
            sample_rate: self.sample_rate,
        }
    }

    pub fn rms(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        (self.samples.iter().map(|s| s * s).sum::<f64>() / self.samples.len() as f64).sqrt()
    }

    pub fn plot_series(&self) -> PlotSeries {
        PlotSeries {
            time: self.time.clone(),
            amp: self.samples.clone(),
        }
    }
}

/// (time, amplitude) arrays handed to a plotting layer.
#[derive(Clone, Debug, Serialize)]
pub struct PlotSeries {
    pub time: Vec<f64>,
    pub amp: Vec<f64>,
}

fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (num - 1) as f64;
            (0..num).map(|i| start + i as f64 * step).collect()
        }
    }
}

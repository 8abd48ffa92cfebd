use realfft::RealFftPlanner;
use rustfft::num_complex::Complex;

/// One-sided spectrum of a real signal, bins paired with their frequencies.
#[derive(Clone, Debug)]
pub struct Spectrum {
    pub bins: Vec<Complex<f64>>,
    pub freqs: Vec<f64>,
    /// Length of the time-domain signal the bins came from
    pub n_samples: usize,
}

impl Spectrum {
    /// Forward transform plus its matching frequency axis.
    pub fn analyze(samples: &[f64], sample_rate: u32) -> Self {
        Self {
            bins: forward(samples),
            freqs: frequencies(samples.len(), sample_rate),
            n_samples: samples.len(),
        }
    }

    pub fn synthesize(&self) -> Vec<f64> {
        inverse(&self.bins, self.n_samples)
    }

    pub fn max_freq(&self) -> f64 {
        self.freqs.last().copied().unwrap_or(0.0)
    }
}

/// Number of non-negative frequency bins for a real signal of length `n`.
pub fn bin_count(n: usize) -> usize {
    if n == 0 {
        0
    } else {
        n / 2 + 1
    }
}

/// Real-input DFT, keeping only the `n/2 + 1` non-negative frequency bins.
pub fn forward(samples: &[f64]) -> Vec<Complex<f64>> {
    let n = samples.len();
    if n == 0 {
        return Vec::new();
    }

    let mut planner = RealFftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n);

    let mut input = samples.to_vec();
    let mut spectrum = fft.make_output_vec();
    if let Err(e) = fft.process(&mut input, &mut spectrum) {
        log::warn!("Forward FFT of {} samples failed: {}", n, e);
    }
    spectrum
}

/// Bin-centre frequencies, `0` up to Nyquist.
///
/// Computed as `k * (1 / (n * (1 / fs)))` so repeated calls with the same
/// `(n, fs)` yield bit-identical values.
pub fn frequencies(n_samples: usize, sample_rate: u32) -> Vec<f64> {
    if n_samples == 0 {
        return Vec::new();
    }
    let d = 1.0 / sample_rate as f64;
    let val = 1.0 / (n_samples as f64 * d);
    (0..bin_count(n_samples)).map(|k| k as f64 * val).collect()
}

/// Rebuild `n_samples` real samples from one-sided bins.
///
/// Missing bins are treated as zero. Imaginary parts of the DC bin (and the
/// Nyquist bin for even `n`) carry no information for a real signal and are
/// dropped.
pub fn inverse(bins: &[Complex<f64>], n_samples: usize) -> Vec<f64> {
    let n = n_samples;
    if n == 0 {
        return Vec::new();
    }

    let mut planner = RealFftPlanner::<f64>::new();
    let ifft = planner.plan_fft_inverse(n);

    let mut spectrum = ifft.make_input_vec();
    let half = spectrum.len().min(bins.len());
    spectrum[..half].copy_from_slice(&bins[..half]);
    spectrum[0].im = 0.0;
    if n % 2 == 0 {
        if let Some(nyquist) = spectrum.last_mut() {
            nyquist.im = 0.0;
        }
    }

    let mut output = ifft.make_output_vec();
    if let Err(e) = ifft.process(&mut spectrum, &mut output) {
        log::warn!("Inverse FFT of {} samples failed: {}", n, e);
    }

    // realfft inverse is unnormalized
    let norm = 1.0 / n as f64;
    output.iter_mut().for_each(|s| *s *= norm);
    output
}

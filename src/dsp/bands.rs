use serde::Deserialize;
use std::ops::RangeInclusive;

use super::transform::Spectrum;
use crate::error::{EqError, Result};

pub const BAND_COUNT: usize = 10;
pub const MIN_GAIN_DB: f64 = -20.0;
pub const MAX_GAIN_DB: f64 = 20.0;

/// A fixed frequency interval that receives one gain value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Band {
    pub low_hz: f64,
    pub high_hz: f64,
}

impl Band {
    const fn new(low_hz: f64, high_hz: f64) -> Self {
        Self { low_hz, high_hz }
    }

    pub fn label(&self) -> String {
        format!("{}Hz - {}Hz", self.low_hz, self.high_hz)
    }
}

/// Octave bands, contiguous and non-overlapping on an integer-Hz grid.
pub const BANDS: [Band; BAND_COUNT] = [
    Band::new(20.0, 40.0),
    Band::new(41.0, 80.0),
    Band::new(81.0, 160.0),
    Band::new(161.0, 320.0),
    Band::new(321.0, 640.0),
    Band::new(641.0, 1280.0),
    Band::new(1281.0, 2560.0),
    Band::new(2561.0, 5120.0),
    Band::new(5121.0, 10240.0),
    Band::new(10241.0, 20000.0),
];

/// How band edges are located on the frequency axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeLookup {
    /// Every bin with `low <= f <= high`. Bands without bins are skipped.
    #[default]
    Inclusive,
    /// Edges must appear verbatim on the axis; a miss fails the whole pass.
    /// The top band's upper edge falls back to the highest bin.
    Exact,
}

pub fn db_to_linear(gain_db: f64) -> f64 {
    10f64.powf(gain_db / 20.0)
}

/// Bin index range covered by band `index`, or `None` if no bin falls inside it.
pub fn band_range(
    freqs: &[f64],
    index: usize,
    lookup: EdgeLookup,
) -> Result<Option<RangeInclusive<usize>>> {
    let band = BANDS.get(index).ok_or(EqError::InvalidBand(index))?;
    if freqs.is_empty() {
        return Ok(None);
    }

    match lookup {
        EdgeLookup::Inclusive => {
            let start = freqs.partition_point(|&f| f < band.low_hz);
            let end = freqs.partition_point(|&f| f <= band.high_hz);
            if start >= end {
                Ok(None)
            } else {
                Ok(Some(start..=end - 1))
            }
        }
        EdgeLookup::Exact => {
            let is_top = index == BAND_COUNT - 1;
            let start = exact_index(freqs, band.low_hz).ok_or(EqError::BandEdgeNotFound {
                band: index + 1,
                edge_hz: band.low_hz,
            })?;
            let end = match exact_index(freqs, band.high_hz) {
                Some(end) => end,
                None if is_top => {
                    log::debug!(
                        "Band {}: {} Hz above Nyquist, clamping to {} Hz",
                        index + 1,
                        band.high_hz,
                        freqs[freqs.len() - 1]
                    );
                    freqs.len() - 1
                }
                None => {
                    return Err(EqError::BandEdgeNotFound {
                        band: index + 1,
                        edge_hz: band.high_hz,
                    })
                }
            };
            if end < start {
                Ok(Some(end..=start))
            } else {
                Ok(Some(start..=end))
            }
        }
    }
}

fn exact_index(freqs: &[f64], value: f64) -> Option<usize> {
    let idx = freqs.partition_point(|&f| f < value);
    (idx < freqs.len() && freqs[idx] == value).then_some(idx)
}

/// Scale each band's bins by its linear gain.
///
/// Every range is resolved before any bin is touched, so a lookup failure
/// leaves nothing half-applied. Bins outside all ten bands pass through.
pub fn apply_bands(
    spectrum: &Spectrum,
    gains_db: &[f64; BAND_COUNT],
    lookup: EdgeLookup,
) -> Result<Spectrum> {
    let ranges = (0..BAND_COUNT)
        .map(|i| band_range(&spectrum.freqs, i, lookup))
        .collect::<Result<Vec<_>>>()?;

    let mut out = spectrum.clone();
    for (i, (range, &gain_db)) in ranges.into_iter().zip(gains_db.iter()).enumerate() {
        let Some(range) = range else {
            log::debug!("Band {}: no bins below Nyquist, skipped", i + 1);
            continue;
        };
        let coef = db_to_linear(gain_db);
        log::debug!(
            "Band {}: bins {}..={} x{:.4} ({:+.3} dB)",
            i + 1,
            range.start(),
            range.end(),
            coef,
            gain_db
        );
        for bin in &mut out.bins[range] {
            *bin *= coef;
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::transform::frequencies;
    use approx::assert_relative_eq;
    use rustfft::num_complex::Complex;

    fn flat_spectrum(n: usize, sample_rate: u32) -> Spectrum {
        let freqs = frequencies(n, sample_rate);
        Spectrum {
            bins: vec![Complex::new(1.0, -1.0); freqs.len()],
            freqs,
            n_samples: n,
        }
    }

    #[test]
    fn table_is_contiguous() {
        for pair in BANDS.windows(2) {
            assert!(pair[0].low_hz < pair[0].high_hz);
            assert_eq!(pair[0].high_hz + 1.0, pair[1].low_hz);
        }
        assert_eq!(BANDS[0].label(), "20Hz - 40Hz");
    }

    #[test]
    fn db_conversion() {
        assert_relative_eq!(db_to_linear(0.0), 1.0);
        assert_relative_eq!(db_to_linear(20.0), 10.0);
        assert_relative_eq!(db_to_linear(-20.0), 0.1);
        assert_relative_eq!(db_to_linear(6.0), 1.9952623149688795, epsilon = 1e-12);
    }

    #[test]
    fn exact_and_inclusive_agree_on_integer_grid() {
        // n == fs gives a 1 Hz grid, so every edge below Nyquist is on the axis
        let freqs = frequencies(44100, 44100);
        for i in 0..BAND_COUNT {
            let exact = band_range(&freqs, i, EdgeLookup::Exact).unwrap();
            let inclusive = band_range(&freqs, i, EdgeLookup::Inclusive).unwrap();
            assert_eq!(exact, inclusive, "band {}", i + 1);
        }
        assert_eq!(
            band_range(&freqs, 0, EdgeLookup::Inclusive).unwrap(),
            Some(20..=40)
        );
        assert_eq!(
            band_range(&freqs, 9, EdgeLookup::Inclusive).unwrap(),
            Some(10241..=20000)
        );
    }

    #[test]
    fn ranges_never_overlap() {
        let freqs = frequencies(48000, 44100);
        let ranges: Vec<_> = (0..BAND_COUNT)
            .filter_map(|i| band_range(&freqs, i, EdgeLookup::Inclusive).unwrap())
            .collect();
        for pair in ranges.windows(2) {
            assert!(pair[0].end() < pair[1].start());
        }
    }

    #[test]
    fn exact_miss_is_an_error() {
        let freqs = frequencies(1000, 1013);
        let err = band_range(&freqs, 0, EdgeLookup::Exact).unwrap_err();
        assert!(matches!(
            err,
            EqError::BandEdgeNotFound { band: 1, edge_hz } if edge_hz == 20.0
        ));
    }

    #[test]
    fn exact_top_band_clamps_to_nyquist() {
        // 1 Hz grid up to 15000 Hz: 10241 present, 20000 absent
        let freqs = frequencies(30000, 30000);
        let range = band_range(&freqs, 9, EdgeLookup::Exact).unwrap().unwrap();
        assert_eq!(range, 10241..=15000);
    }

    #[test]
    fn inclusive_top_band_clamps_to_nyquist() {
        let freqs = frequencies(22050, 22050);
        let range = band_range(&freqs, 9, EdgeLookup::Inclusive).unwrap().unwrap();
        assert_eq!(*range.start(), 10241);
        assert_eq!(*range.end(), freqs.len() - 1);
    }

    #[test]
    fn bands_above_nyquist_are_empty() {
        let freqs = frequencies(8000, 8000);
        assert_eq!(band_range(&freqs, 9, EdgeLookup::Inclusive).unwrap(), None);
        assert_eq!(band_range(&freqs, 8, EdgeLookup::Inclusive).unwrap(), None);
        assert_eq!(
            band_range(&freqs, 7, EdgeLookup::Inclusive).unwrap(),
            Some(2561..=4000)
        );
    }

    #[test]
    fn invalid_band_index() {
        let freqs = frequencies(100, 100);
        assert!(matches!(
            band_range(&freqs, 10, EdgeLookup::Inclusive),
            Err(EqError::InvalidBand(10))
        ));
    }

    #[test]
    fn neutral_gains_leave_bins_untouched() {
        let spectrum = flat_spectrum(44100, 44100);
        let out = apply_bands(&spectrum, &[0.0; BAND_COUNT], EdgeLookup::Inclusive).unwrap();
        assert_eq!(out.bins, spectrum.bins);
        assert_eq!(out.freqs, spectrum.freqs);
    }

    #[test]
    fn gain_touches_only_its_band() {
        let spectrum = flat_spectrum(44100, 44100);
        let mut gains = [0.0; BAND_COUNT];
        gains[2] = 20.0;
        let out = apply_bands(&spectrum, &gains, EdgeLookup::Inclusive).unwrap();
        for (k, (before, after)) in spectrum.bins.iter().zip(&out.bins).enumerate() {
            if (81..=160).contains(&k) {
                assert_relative_eq!(after.norm(), before.norm() * 10.0, epsilon = 1e-12);
            } else {
                assert_eq!(after, before, "bin {}", k);
            }
        }
    }

    #[test]
    fn sub_band_and_gap_bins_pass_through() {
        // 0.5 Hz grid: 40.5 Hz sits between band 1 and band 2
        let spectrum = flat_spectrum(88200, 44100);
        let out = apply_bands(&spectrum, &[-20.0; BAND_COUNT], EdgeLookup::Inclusive).unwrap();
        assert_eq!(out.bins[0], spectrum.bins[0]);
        assert_eq!(out.bins[39], spectrum.bins[39]); // 19.5 Hz
        assert_eq!(out.bins[81], spectrum.bins[81]); // 40.5 Hz
        assert_relative_eq!(out.bins[80].re, 0.1, epsilon = 1e-12); // 40 Hz
    }

    #[test]
    fn failed_lookup_applies_nothing() {
        let spectrum = flat_spectrum(1000, 1013);
        assert!(apply_bands(&spectrum, &[5.0; BAND_COUNT], EdgeLookup::Exact).is_err());
    }
}

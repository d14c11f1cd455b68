//! Equal-width histograms
//!
//! Bins partition the subset's own `[min, max]` range into `bin_count`
//! equal widths. Every finite value lands in exactly one bin; the maximum
//! value is counted in the last bin rather than opening a new one, so bin
//! counts always sum to the number of values binned.

use serde::{Deserialize, Serialize};

/// An equal-width histogram over one value subset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Histogram {
    bin_count: usize,
    min: f64,
    max: f64,
    counts: Vec<usize>,
}

impl Histogram {
    /// Bin a value subset
    ///
    /// Non-finite values are ignored. An empty subset produces all-zero
    /// counts with a NaN range.
    pub fn from_values(values: &[f64], bin_count: usize) -> Self {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();

        if finite.is_empty() {
            return Self {
                bin_count,
                min: f64::NAN,
                max: f64::NAN,
                counts: vec![0; bin_count],
            };
        }

        let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let width = (max - min) / bin_count as f64;

        let mut counts = vec![0usize; bin_count];
        for &v in &finite {
            // A degenerate range puts everything in the first bin
            let idx = if width == 0.0 {
                0
            } else {
                (((v - min) / width) as usize).min(bin_count - 1)
            };
            counts[idx] += 1;
        }

        Self {
            bin_count,
            min,
            max,
            counts,
        }
    }

    /// Number of bins
    pub fn bin_count(&self) -> usize {
        self.bin_count
    }

    /// Lower edge of the binned range
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper edge of the binned range
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Per-bin counts
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Total number of values binned
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Width of one bin (NaN for an empty histogram)
    pub fn bin_width(&self) -> f64 {
        (self.max - self.min) / self.bin_count as f64
    }

    /// The `[lower, upper)` edges of bin `index` (the last bin is closed)
    pub fn bin_edges(&self, index: usize) -> Option<(f64, f64)> {
        if index >= self.bin_count {
            return None;
        }
        let width = self.bin_width();
        Some((
            self.min + index as f64 * width,
            self.min + (index + 1) as f64 * width,
        ))
    }

    /// Largest single bin count (useful for scaling)
    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

//! Summary statistics for column subsets
//!
//! Provides the full descriptive summary cached per column:
//! - Mean, sample variance, standard deviation
//! - Min, max, median, quartiles, IQR
//! - Skewness and kurtosis (bias-corrected)
//! - An equal-width histogram of the same subset
//!
//! Quantiles use linear interpolation on rank (the R-7 rule): for
//! probability `p` over `n` ascending values, the rank is `h = (n - 1) * p`
//! and the result interpolates between the values at `floor(h)` and
//! `floor(h) + 1`. The same rule is used for the median and both quartiles
//! so that summaries over different subsets stay comparable.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::histogram::Histogram;

/// Errors from statistics computation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatsError {
    /// The subset contains no (finite) values
    #[error("cannot summarize an empty subset")]
    EmptySubset,

    /// Histograms need at least one bin
    #[error("invalid histogram bin count: {0}")]
    InvalidBinCount(usize),
}

/// Result type for statistics computation
pub type StatsResult<T> = Result<T, StatsError>;

/// Summary statistics for one value subset
///
/// Non-finite input values are ignored; `count` reflects the values that
/// actually entered the summary. Statistics that are undefined for the
/// subset (skewness with fewer than 3 values, kurtosis with fewer than 4,
/// either with zero variance) are NaN.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryStats {
    /// Number of values summarized
    pub count: usize,
    /// Minimum value
    pub min: f64,
    /// Maximum value
    pub max: f64,
    /// Mean (average)
    pub mean: f64,
    /// Sample variance (n - 1 denominator; 0 for a single value)
    pub variance: f64,
    /// Standard deviation
    pub std_dev: f64,
    /// Median (50th percentile)
    pub median: f64,
    /// First quartile (25th percentile)
    pub quartile1: f64,
    /// Third quartile (75th percentile)
    pub quartile3: f64,
    /// Interquartile range
    pub iqr: f64,
    /// Bias-corrected sample skewness
    pub skewness: f64,
    /// Bias-corrected excess kurtosis
    pub kurtosis: f64,
    /// Equal-width histogram over this subset's range
    pub histogram: Histogram,
}

impl SummaryStats {
    /// Compute summary statistics over a value subset
    ///
    /// Returns [`StatsError::EmptySubset`] when no finite values are
    /// present, so an empty subset never masquerades as a NaN-filled
    /// summary.
    pub fn from_values(values: &[f64], bin_count: usize) -> StatsResult<Self> {
        if bin_count == 0 {
            return Err(StatsError::InvalidBinCount(bin_count));
        }

        let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return Err(StatsError::EmptySubset);
        }
        finite.sort_by(f64::total_cmp);

        let count = finite.len();
        let n = count as f64;
        let mean = finite.iter().sum::<f64>() / n;

        let variance = if count > 1 {
            finite.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0)
        } else {
            0.0
        };
        let std_dev = variance.sqrt();

        let min = finite[0];
        let max = finite[count - 1];

        let quartile1 = quantile_sorted(&finite, 0.25);
        let median = quantile_sorted(&finite, 0.5);
        let quartile3 = quantile_sorted(&finite, 0.75);

        let (skewness, kurtosis) = corrected_moments(&finite, mean, variance);
        let histogram = Histogram::from_values(&finite, bin_count);

        Ok(Self {
            count,
            min,
            max,
            mean,
            variance,
            std_dev,
            median,
            quartile1,
            quartile3,
            iqr: quartile3 - quartile1,
            skewness,
            kurtosis,
            histogram,
        })
    }

    /// Get the range (max - min)
    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}

/// Quantile by linear interpolation on rank (R-7) over ascending values
fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let h = (n - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

/// Bias-corrected sample skewness and excess kurtosis
///
/// Skewness: `sqrt(n(n-1)) / (n-2) * m3 / m2^(3/2)`.
/// Kurtosis: `((n+1) * (m4/m2^2 - 3) + 6) * (n-1) / ((n-2)(n-3))`.
/// Both NaN when the minimum sample size (3 / 4) is not met or the
/// variance is zero.
fn corrected_moments(values: &[f64], mean: f64, variance: f64) -> (f64, f64) {
    let count = values.len();
    let n = count as f64;

    if variance == 0.0 {
        return (f64::NAN, f64::NAN);
    }

    let m2 = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    let m3 = values.iter().map(|x| (x - mean).powi(3)).sum::<f64>() / n;
    let m4 = values.iter().map(|x| (x - mean).powi(4)).sum::<f64>() / n;

    let skewness = if count < 3 {
        f64::NAN
    } else {
        (n * (n - 1.0)).sqrt() / (n - 2.0) * m3 / m2.powf(1.5)
    };

    let kurtosis = if count < 4 {
        f64::NAN
    } else {
        let g2 = m4 / (m2 * m2) - 3.0;
        ((n + 1.0) * g2 + 6.0) * (n - 1.0) / ((n - 2.0) * (n - 3.0))
    };

    (skewness, kurtosis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_basic() {
        let data: Vec<f64> = (1..=10).map(|x| x as f64).collect();
        let stats = SummaryStats::from_values(&data, 10).unwrap();

        assert_eq!(stats.count, 10);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 10.0);
        assert!((stats.mean - 5.5).abs() < 1e-10);
        assert!((stats.median - 5.5).abs() < 1e-10);
        // sample variance of 1..10 is 55/6
        assert!((stats.variance - 55.0 / 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_quartiles_interpolated() {
        // R-7 over [1,2,3,4]: h = 0.75 -> 1.75, h = 2.25 -> 3.25
        let stats = SummaryStats::from_values(&[1.0, 2.0, 3.0, 4.0], 4).unwrap();
        assert!((stats.quartile1 - 1.75).abs() < 1e-10);
        assert!((stats.median - 2.5).abs() < 1e-10);
        assert!((stats.quartile3 - 3.25).abs() < 1e-10);
        assert!((stats.iqr - 1.5).abs() < 1e-10);
    }

    #[test]
    fn test_quartile_ordering() {
        let data = vec![7.0, 3.0, 9.0, 1.0, 4.0, 4.0, 2.0];
        let stats = SummaryStats::from_values(&data, 5).unwrap();
        assert!(stats.min <= stats.quartile1);
        assert!(stats.quartile1 <= stats.median);
        assert!(stats.median <= stats.quartile3);
        assert!(stats.quartile3 <= stats.max);
    }

    #[test]
    fn test_single_value() {
        let stats = SummaryStats::from_values(&[42.0], 4).unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.variance, 0.0);
        assert_eq!(stats.median, 42.0);
        assert!(stats.skewness.is_nan());
        assert!(stats.kurtosis.is_nan());
    }

    #[test]
    fn test_skewness_symmetric_data() {
        // Symmetric data has zero skewness
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let stats = SummaryStats::from_values(&data, 5).unwrap();
        assert!(stats.skewness.abs() < 1e-10);
    }

    #[test]
    fn test_skewness_right_tail() {
        let data = vec![1.0, 1.0, 1.0, 1.0, 10.0];
        let stats = SummaryStats::from_values(&data, 5).unwrap();
        assert!(stats.skewness > 0.0);
    }

    #[test]
    fn test_moments_undefined_small_n() {
        let stats = SummaryStats::from_values(&[1.0, 2.0], 2).unwrap();
        assert!(stats.skewness.is_nan());
        assert!(stats.kurtosis.is_nan());

        let stats = SummaryStats::from_values(&[1.0, 2.0, 3.0], 2).unwrap();
        assert!(!stats.skewness.is_nan());
        assert!(stats.kurtosis.is_nan());
    }

    #[test]
    fn test_moments_undefined_zero_variance() {
        let stats = SummaryStats::from_values(&[5.0; 10], 4).unwrap();
        assert_eq!(stats.variance, 0.0);
        assert!(stats.skewness.is_nan());
        assert!(stats.kurtosis.is_nan());
    }

    #[test]
    fn test_kurtosis_uniformish() {
        // Excess kurtosis of an evenly spaced sample is negative
        let data: Vec<f64> = (1..=20).map(|x| x as f64).collect();
        let stats = SummaryStats::from_values(&data, 5).unwrap();
        assert!(stats.kurtosis < 0.0);
    }

    #[test]
    fn test_empty_subset_is_an_error() {
        assert_eq!(
            SummaryStats::from_values(&[], 4).unwrap_err(),
            StatsError::EmptySubset
        );
        // all-NaN input is also empty after filtering
        assert_eq!(
            SummaryStats::from_values(&[f64::NAN, f64::NAN], 4).unwrap_err(),
            StatsError::EmptySubset
        );
    }

    #[test]
    fn test_non_finite_values_ignored() {
        let data = vec![1.0, f64::NAN, 3.0, f64::INFINITY, 5.0];
        let stats = SummaryStats::from_values(&data, 3).unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 5.0);
        assert!((stats.mean - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_zero_bins_rejected() {
        assert_eq!(
            SummaryStats::from_values(&[1.0], 0).unwrap_err(),
            StatsError::InvalidBinCount(0)
        );
    }

    #[test]
    fn test_histogram_attached() {
        let data: Vec<f64> = (0..100).map(|x| x as f64).collect();
        let stats = SummaryStats::from_values(&data, 10).unwrap();
        assert_eq!(stats.histogram.total(), 100);
        assert_eq!(stats.histogram.bin_count(), 10);
    }
}

//! Distribution statistics and histograms over simulation results

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Descriptive statistics over the finite values of one result column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    /// Finite values summarized
    pub count: usize,
    /// Undefined or non-finite values excluded from the statistics
    pub undefined: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub p5: f64,
    pub p95: f64,
    /// Share of finite values strictly above zero
    pub prob_positive: f64,
}

/// BCR statistics plus threshold probabilities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BcrSummary {
    pub distribution: DistributionSummary,
    pub prob_above_one: f64,
    pub target: f64,
    pub prob_above_target: f64,
}

/// One equal-width histogram bin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub bins: Vec<HistogramBin>,
}

/// Percentile of a sorted slice with linear interpolation
fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let frac = rank - lower as f64;
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}

/// Finite values sorted ascending, and how many were dropped
fn finite_sorted(values: &[Option<f64>]) -> (Vec<f64>, usize) {
    let mut finite: Vec<f64> = values
        .iter()
        .filter_map(|v| v.filter(|x| x.is_finite()))
        .collect();
    finite.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let undefined = values.len() - finite.len();
    (finite, undefined)
}

fn share_above(sorted: &[f64], threshold: f64) -> f64 {
    sorted.iter().filter(|v| **v > threshold).count() as f64 / sorted.len() as f64
}

/// Summarize a column; `None` when no finite value exists
pub fn summarize(values: &[Option<f64>]) -> Option<DistributionSummary> {
    let (sorted, undefined) = finite_sorted(values);
    if sorted.is_empty() {
        return None;
    }
    let n = sorted.len() as f64;
    let mean = sorted.iter().sum::<f64>() / n;
    let median = if sorted.len() % 2 == 0 {
        let mid = sorted.len() / 2;
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[sorted.len() / 2]
    };
    let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    Some(DistributionSummary {
        count: sorted.len(),
        undefined,
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        mean,
        median,
        std_dev: variance.sqrt(),
        p5: percentile_sorted(&sorted, 5.0),
        p95: percentile_sorted(&sorted, 95.0),
        prob_positive: share_above(&sorted, 0.0),
    })
}

/// BCR summary with P(BCR > 1) and P(BCR > target)
pub fn summarize_bcr(values: &[Option<f64>], target: f64) -> Option<BcrSummary> {
    let distribution = summarize(values)?;
    let (sorted, _) = finite_sorted(values);
    Some(BcrSummary {
        distribution,
        prob_above_one: share_above(&sorted, 1.0),
        target,
        prob_above_target: share_above(&sorted, target),
    })
}

impl Histogram {
    /// Equal-width bins over the finite range of `values`
    ///
    /// A zero-width range collapses into a single bin holding every value.
    pub fn build(values: &[Option<f64>], bin_count: usize) -> Self {
        let (sorted, _) = finite_sorted(values);
        if sorted.is_empty() || bin_count == 0 {
            return Self::default();
        }
        let min = sorted[0];
        let max = sorted[sorted.len() - 1];
        if max - min <= 0.0 {
            return Self {
                bins: vec![HistogramBin {
                    lower: min,
                    upper: max,
                    count: sorted.len(),
                }],
            };
        }

        let width = (max - min) / bin_count as f64;
        let mut bins: Vec<HistogramBin> = (0..bin_count)
            .map(|i| HistogramBin {
                lower: min + i as f64 * width,
                upper: if i == bin_count - 1 {
                    max
                } else {
                    min + (i + 1) as f64 * width
                },
                count: 0,
            })
            .collect();

        for v in &sorted {
            let idx = (((v - min) / width).floor() as usize).min(bin_count - 1);
            bins[idx].count += 1;
        }
        Self { bins }
    }

    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn column(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().map(|v| Some(*v)).collect()
    }

    #[test]
    fn test_basic_statistics() {
        let s = summarize(&column(&[-2.0, 1.0, 3.0, 6.0])).unwrap();
        assert_eq!(s.count, 4);
        assert_eq!(s.undefined, 0);
        assert_eq!(s.min, -2.0);
        assert_eq!(s.max, 6.0);
        assert_relative_eq!(s.mean, 2.0);
        assert_relative_eq!(s.median, 2.0);
        assert_relative_eq!(s.prob_positive, 0.75);
    }

    #[test]
    fn test_undefined_values_excluded_but_counted() {
        let values = vec![Some(1.0), None, Some(f64::NAN), Some(3.0), Some(f64::INFINITY)];
        let s = summarize(&values).unwrap();
        assert_eq!(s.count, 2);
        assert_eq!(s.undefined, 3);
        assert_relative_eq!(s.mean, 2.0);

        assert!(summarize(&[None, None]).is_none());
    }

    #[test]
    fn test_bcr_thresholds() {
        let s = summarize_bcr(&column(&[0.8, 1.2, 1.6, 2.0, 0.9]), 1.5).unwrap();
        assert_relative_eq!(s.prob_above_one, 0.6);
        assert_relative_eq!(s.prob_above_target, 0.4);
    }

    #[test]
    fn test_histogram_bins() {
        let values = column(&(0..100).map(|i| i as f64).collect::<Vec<_>>());
        let h = Histogram::build(&values, 20);
        assert_eq!(h.bins.len(), 20);
        assert_eq!(h.total(), 100);
        assert!(h.bins.iter().all(|b| b.count == 5));
        assert_eq!(h.bins[19].upper, 99.0);
    }

    #[test]
    fn test_histogram_degenerate() {
        let h = Histogram::build(&column(&[4.0, 4.0, 4.0]), 20);
        assert_eq!(h.bins.len(), 1);
        assert_eq!(h.bins[0].count, 3);
        assert!(Histogram::build(&[None], 20).bins.is_empty());
    }
}

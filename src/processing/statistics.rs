//! Descriptive statistics over a single series.
//!
//! All three measures follow the dashboard's conventions: empty input yields
//! 0, the median averages the two middle elements for even lengths, and the
//! standard deviation is the population form (divisor N, not N-1).
//! Statistics are always computed per series, never pooled across series.

use serde::Serialize;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Population standard deviation: sqrt of the mean squared deviation.
pub fn std_dev_pop(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Summary statistics for one series.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
}

impl SummaryStats {
    /// Compute statistics from series values, ignoring non-finite entries.
    /// Returns `None` when nothing remains, so the caller can render a
    /// "no data" card instead of a row of zeros.
    pub fn compute(values: &[f64]) -> Option<Self> {
        let vals: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if vals.is_empty() {
            return None;
        }
        Some(SummaryStats {
            count: vals.len(),
            mean: mean(&vals),
            median: median(&vals),
            std_dev: std_dev_pop(&vals),
        })
    }

    /// Format as a multi-line report block, four decimal places throughout.
    pub fn report(&self, label: &str) -> String {
        format!(
            "{}:\n  N: {}\n  Mean: {:.4}\n  Median: {:.4}\n  Std Dev (pop.): {:.4}\n",
            label, self.count, self.mean, self.median, self.std_dev
        )
    }
}

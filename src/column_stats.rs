//! Single-column descriptive statistics with memoized derived values.
//!
//! [`ColumnStats`] owns one numeric sequence at a time. The scalar
//! statistics (min, max, mean, standard deviation, median, mode) are
//! computed lazily on first read and cached until the next
//! [`set_data`](ColumnStats::set_data) call, which invalidates every
//! memo. Degenerate input never errors: empty or too-short data yields
//! 0 for scalar statistics and empty sequences for summaries, matching
//! the engine-wide sentinel policy.
//!
//! The memos live in [`Cell`]s, so reads take `&self`; the type is
//! deliberately not `Sync`. Callers needing concurrency use one
//! instance per computation.
//!
//! # Example
//!
//! ```
//! use tabstat::column_stats::ColumnStats;
//!
//! let stats = ColumnStats::new(vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
//! assert_eq!(stats.mean(), 5.0);
//! assert!((stats.std_dev() - 2.138089935).abs() < 1e-9);
//! assert_eq!(stats.mode(), 4.0);
//! ```

use std::cell::Cell;
use std::collections::HashMap;

// ── ColumnStats ───────────────────────────────────────────────────────

/// Descriptive statistics over one owned numeric column.
#[derive(Debug, Default)]
pub struct ColumnStats {
    data: Vec<f64>,
    min: Cell<Option<f64>>,
    max: Cell<Option<f64>>,
    mean: Cell<Option<f64>>,
    std_dev: Cell<Option<f64>>,
    median: Cell<Option<f64>>,
    mode: Cell<Option<f64>>,
}

impl ColumnStats {
    /// Creates a stats object owning `data`.
    pub fn new(data: Vec<f64>) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    /// Replaces the owned data, invalidating every memoized value.
    pub fn set_data(&mut self, data: Vec<f64>) {
        self.data = data;
        self.min.set(None);
        self.max.set(None);
        self.mean.set(None);
        self.std_dev.set(None);
        self.median.set(None);
        self.mode.set(None);
    }

    /// Returns the owned data.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Minimum value; 0 for empty data. Cached.
    pub fn min(&self) -> f64 {
        if let Some(v) = self.min.get() {
            return v;
        }
        let v = self
            .data
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min);
        let v = if v.is_finite() { v } else { 0.0 };
        self.min.set(Some(v));
        v
    }

    /// Maximum value; 0 for empty data. Cached.
    pub fn max(&self) -> f64 {
        if let Some(v) = self.max.get() {
            return v;
        }
        let v = self
            .data
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        let v = if v.is_finite() { v } else { 0.0 };
        self.max.set(Some(v));
        v
    }

    /// Arithmetic mean; 0 for empty data. Cached.
    pub fn mean(&self) -> f64 {
        if let Some(v) = self.mean.get() {
            return v;
        }
        let n = self.data.len();
        let v = if n == 0 {
            0.0
        } else {
            self.data.iter().sum::<f64>() / n as f64
        };
        self.mean.set(Some(v));
        v
    }

    /// Sample standard deviation via Welford's recurrence; 0 for fewer
    /// than two values. Cached.
    pub fn std_dev(&self) -> f64 {
        if let Some(v) = self.std_dev.get() {
            return v;
        }
        let v = welford_std_dev(&self.data);
        self.std_dev.set(Some(v));
        v
    }

    /// Median of a sorted copy; 0 for empty data. Cached.
    pub fn median(&self) -> f64 {
        if let Some(v) = self.median.get() {
            return v;
        }
        let v = if self.data.is_empty() {
            0.0
        } else {
            let mut sorted = self.data.clone();
            sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            median_of_sorted(&sorted)
        };
        self.median.set(Some(v));
        v
    }

    /// Most frequent value; ties are broken by the smallest value, so
    /// the result does not depend on bucket iteration order. 0 for
    /// empty data. Cached.
    pub fn mode(&self) -> f64 {
        if let Some(v) = self.mode.get() {
            return v;
        }
        // Bucket by exact bit pattern, the same trick the distinct
        // counter uses for f64 keys.
        let mut counts: HashMap<u64, usize> = HashMap::new();
        for &v in &self.data {
            *counts.entry(v.to_bits()).or_insert(0) += 1;
        }
        let mut best: Option<(f64, usize)> = None;
        for (&bits, &count) in &counts {
            let value = f64::from_bits(bits);
            best = match best {
                Some((bv, bc)) if count < bc || (count == bc && value >= bv) => Some((bv, bc)),
                _ => Some((value, count)),
            };
        }
        let v = best.map_or(0.0, |(value, _)| value);
        self.mode.set(Some(v));
        v
    }

    /// Five-number summary `[min, Q1, median, Q3, max]`.
    ///
    /// For odd lengths the median belongs to both halves, keeping each
    /// half self-consistent for quartile computation. A single value
    /// yields five copies of itself; empty data yields an empty vector.
    pub fn five_number_summary(&self) -> Vec<f64> {
        let n = self.data.len();
        if n == 0 {
            return Vec::new();
        }
        if n == 1 {
            return vec![self.data[0]; 5];
        }
        let mut sorted = self.data.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let median = median_of_sorted(&sorted);
        let lower = &sorted[..n.div_ceil(2)];
        let upper = &sorted[n / 2..];
        vec![
            sorted[0],
            median_of_sorted(lower),
            median,
            median_of_sorted(upper),
            sorted[n - 1],
        ]
    }

    /// Quantiles at levels `p, 2p, …` up to `(floor(1/p) − 1)·p`,
    /// linearly interpolated over the sorted data, with the minimum
    /// prepended and the maximum appended.
    ///
    /// `p` is sanitized to 0.25 when NaN or outside `[0.01, 0.99]`.
    /// Returns empty for fewer than two values.
    pub fn quantiles(&self, p: f64) -> Vec<f64> {
        let p = if p.is_nan() || !(0.01..=0.99).contains(&p) {
            0.25
        } else {
            p
        };
        let n = self.data.len();
        if n < 2 {
            return Vec::new();
        }
        let mut sorted = self.data.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let levels = (1.0 / p).floor() as usize - 1;
        let mut out = Vec::with_capacity(levels + 2);
        out.push(sorted[0]);
        for k in 1..=levels {
            let pos = k as f64 * p * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            let frac = pos - lo as f64;
            out.push(sorted[lo] + (sorted[hi] - sorted[lo]) * frac);
        }
        out.push(sorted[n - 1]);
        out
    }

    /// Geometric mean via the log-sum form; 0 for empty data or data
    /// containing non-positive values, where the mean is undefined.
    pub fn geometric_mean(&self) -> f64 {
        let n = self.data.len();
        if n == 0 || self.data.iter().any(|&v| v <= 0.0) {
            return 0.0;
        }
        let log_sum: f64 = self.data.iter().map(|v| v.ln()).sum();
        (log_sum / n as f64).exp()
    }

    /// Harmonic mean. Values with magnitude below 1e-9 contribute a
    /// zero reciprocal instead of blowing up the sum; 0 for empty data
    /// or a zero reciprocal sum.
    pub fn harmonic_mean(&self) -> f64 {
        let n = self.data.len();
        if n == 0 {
            return 0.0;
        }
        let recip_sum: f64 = self
            .data
            .iter()
            .map(|&v| if v.abs() < 1e-9 { 0.0 } else { 1.0 / v })
            .sum();
        if recip_sum == 0.0 {
            return 0.0;
        }
        n as f64 / recip_sum
    }

    /// Bias-corrected sample skewness (G1); 0 for fewer than three
    /// values or a constant column.
    pub fn skewness(&self) -> f64 {
        let n = self.data.len();
        if n < 3 {
            return 0.0;
        }
        let (m2, m3, _) = central_moments(&self.data);
        if m2 <= 0.0 {
            return 0.0;
        }
        let g1 = m3 / m2.powf(1.5);
        let n = n as f64;
        g1 * (n * (n - 1.0)).sqrt() / (n - 2.0)
    }

    /// Bias-corrected excess kurtosis (G2); 0 for fewer than four
    /// values or a constant column.
    pub fn kurtosis(&self) -> f64 {
        let n = self.data.len();
        if n < 4 {
            return 0.0;
        }
        let (m2, _, m4) = central_moments(&self.data);
        if m2 <= 0.0 {
            return 0.0;
        }
        let g2 = m4 / (m2 * m2) - 3.0;
        let n = n as f64;
        ((n + 1.0) * g2 + 6.0) * (n - 1.0) / ((n - 2.0) * (n - 3.0))
    }

    /// Sample covariance of two sequences. Returns 0 unless both have
    /// the same length of at least two.
    pub fn covariance(x: &[f64], y: &[f64]) -> f64 {
        let n = x.len();
        if n < 2 || y.len() != n {
            return 0.0;
        }
        let mean_x = x.iter().sum::<f64>() / n as f64;
        let mean_y = y.iter().sum::<f64>() / n as f64;
        let cross: f64 = x
            .iter()
            .zip(y)
            .map(|(a, b)| (a - mean_x) * (b - mean_y))
            .sum();
        cross / (n - 1) as f64
    }

    /// Pearson correlation of two sequences. Returns 0 for mismatched
    /// or too-short input, or when either sequence is constant.
    pub fn correlation(x: &[f64], y: &[f64]) -> f64 {
        let cov = Self::covariance(x, y);
        if cov == 0.0 {
            return 0.0;
        }
        let sx = welford_std_dev(x);
        let sy = welford_std_dev(y);
        if sx == 0.0 || sy == 0.0 {
            return 0.0;
        }
        cov / (sx * sy)
    }
}

// ── Numeric helpers ───────────────────────────────────────────────────

/// Sample standard deviation via Welford's online recurrence.
fn welford_std_dev(data: &[f64]) -> f64 {
    let n = data.len();
    if n < 2 {
        return 0.0;
    }
    let mut mean = 0.0;
    let mut m2 = 0.0;
    for (i, &v) in data.iter().enumerate() {
        let delta = v - mean;
        mean += delta / (i + 1) as f64;
        m2 += delta * (v - mean);
    }
    (m2 / (n - 1) as f64).sqrt()
}

/// Median of an already-sorted slice.
fn median_of_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

/// Second, third, and fourth central moments (population form).
fn central_moments(data: &[f64]) -> (f64, f64, f64) {
    let n = data.len() as f64;
    let mean = data.iter().sum::<f64>() / n;
    let mut m2 = 0.0;
    let mut m3 = 0.0;
    let mut m4 = 0.0;
    for &v in data {
        let d = v - mean;
        let d2 = d * d;
        m2 += d2;
        m3 += d2 * d;
        m4 += d2 * d2;
    }
    (m2 / n, m3 / n, m4 / n)
}

// ── Tests ─────────────────────────────────────────────────────────────

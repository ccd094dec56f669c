//! Facade applying [`ColumnStats`] to named columns of a [`Table`].
//!
//! Callers address columns by name and pick statistics by kind; the
//! facade extracts the numeric column, runs the computation, and
//! returns plain values ready for serialization. Unknown or
//! non-numeric columns follow the engine-wide sentinel policy: scalar
//! statistics come back 0, summaries come back empty.
//!
//! # Example
//!
//! ```
//! use tabstat::frame_stats::{single_stat, StatKind};
//! use tabstat::table::{Table, Value};
//!
//! let rows = vec![
//!     vec![Value::Text("x".into())],
//!     vec![Value::Number(1.0)],
//!     vec![Value::Number(2.0)],
//!     vec![Value::Number(6.0)],
//! ];
//! let mut table = Table::new();
//! table.load_rows(&rows);
//!
//! assert_eq!(single_stat(StatKind::Mean, &table, "x"), 3.0);
//! assert_eq!(single_stat(StatKind::Range, &table, "x"), 5.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::column_stats::ColumnStats;
use crate::table::Table;

// ── Statistic kinds ───────────────────────────────────────────────────

/// Single-column statistic selector for [`single_stat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatKind {
    Min,
    Max,
    Range,
    Mean,
    Median,
    Mode,
    StdDev,
    GeometricMean,
    HarmonicMean,
    Skewness,
    Kurtosis,
}

/// Two-column statistic selector for [`double_stat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PairKind {
    Correlation,
    Covariance,
}

/// Tukey outlier fences at `Q1 − 1.5·IQR` and `Q3 + 1.5·IQR`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TukeyFences {
    pub lower: f64,
    pub upper: f64,
}

// ── Facade operations ─────────────────────────────────────────────────

/// Five-number summary of a named column; empty for unknown,
/// non-numeric, or empty columns.
pub fn summary(table: &Table, column: &str) -> Vec<f64> {
    ColumnStats::new(table.numeric_column(column)).five_number_summary()
}

/// Dispatches one single-column statistic by kind.
pub fn single_stat(kind: StatKind, table: &Table, column: &str) -> f64 {
    let stats = ColumnStats::new(table.numeric_column(column));
    match kind {
        StatKind::Min => stats.min(),
        StatKind::Max => stats.max(),
        StatKind::Range => stats.max() - stats.min(),
        StatKind::Mean => stats.mean(),
        StatKind::Median => stats.median(),
        StatKind::Mode => stats.mode(),
        StatKind::StdDev => stats.std_dev(),
        StatKind::GeometricMean => stats.geometric_mean(),
        StatKind::HarmonicMean => stats.harmonic_mean(),
        StatKind::Skewness => stats.skewness(),
        StatKind::Kurtosis => stats.kurtosis(),
    }
}

/// Dispatches one two-column statistic across two named columns.
pub fn double_stat(kind: PairKind, table: &Table, first: &str, second: &str) -> f64 {
    let x = table.numeric_column(first);
    let y = table.numeric_column(second);
    match kind {
        PairKind::Correlation => ColumnStats::correlation(&x, &y),
        PairKind::Covariance => ColumnStats::covariance(&x, &y),
    }
}

/// Tukey outlier fences for a named column; the zero fences for
/// columns too short to have quartiles.
pub fn fences(table: &Table, column: &str) -> TukeyFences {
    let summary = summary(table, column);
    if summary.len() != 5 {
        return TukeyFences::default();
    }
    let (q1, q3) = (summary[1], summary[3]);
    let iqr = q3 - q1;
    TukeyFences {
        lower: q1 - 1.5 * iqr,
        upper: q3 + 1.5 * iqr,
    }
}

/// Interpolated quantiles of a named column at step `p`; see
/// [`ColumnStats::quantiles`] for the sanitization rules.
pub fn quantiles(table: &Table, column: &str, p: f64) -> Vec<f64> {
    ColumnStats::new(table.numeric_column(column)).quantiles(p)
}

/// Standardizes every numeric column to zero mean and unit variance on
/// an owned copy of the table; the original is never aliased or
/// mutated. Constant columns become all zeros rather than NaN.
pub fn z_score(table: &Table) -> Table {
    let mut standardized = table.clone();
    for name in table.column_names() {
        let values = table.numeric_column(name);
        if values.is_empty() {
            continue;
        }
        let stats = ColumnStats::new(values);
        let (mean, std_dev) = (stats.mean(), stats.std_dev());
        let scored: Vec<f64> = if std_dev == 0.0 {
            vec![0.0; stats.data().len()]
        } else {
            stats.data().iter().map(|v| (v - mean) / std_dev).collect()
        };
        standardized.replace_numeric_column(name, scored);
    }
    standardized
}

// ── Tests ─────────────────────────────────────────────────────────────

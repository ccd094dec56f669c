//! # tabstat
//!
//! Self-contained statistical computation engine for interactive and
//! business-report workloads: special-function approximations, a
//! chi-squared distribution utility, descriptive statistics, a
//! column-major tabular store, and contingency-table analysis built on
//! those primitives.
//!
//! The engine consumes row-oriented records or header-led rows, stores
//! them column-major, and hands back plain structured values ready for
//! serialization by the calling layer. There is no I/O, no wire
//! format, and no concurrency: every operation is a synchronous pure
//! computation over in-memory sequences.
//!
//! ## Modules
//!
//! - [`special`] — log-gamma, regularized incomplete beta/gamma and the inverse incomplete gamma (Lanczos, Lentz continued fractions, Gauss-Legendre quadrature, Newton refinement)
//! - [`chi2`] — chi-squared density, CDF, q-value, and inverse CDF over [`special`]
//! - [`column_stats`] — single-column descriptive statistics with memoized derived values (Welford variance, quantiles, bias-corrected shape statistics)
//! - [`table`] — column-major tabular store with typed columns, lookup/removal, and row-range splitting
//! - [`crosstab`] — one-way frequency tables, two-way contingency tables with chi-squared significance, full-table cross-tabulation, min-max normalization
//! - [`frame_stats`] — facade applying [`column_stats`] to named table columns (summary, fences, quantiles, z-scoring)
//! - [`error`] — error types
//!
//! ## Quick Start
//!
//! ```
//! use tabstat::crosstab::cross_table;
//! use tabstat::table::{Table, Value};
//!
//! let rows = vec![
//!     vec![Value::Text("shift".into()), Value::Text("outcome".into())],
//!     vec![Value::Text("day".into()), Value::Text("pass".into())],
//!     vec![Value::Text("day".into()), Value::Text("fail".into())],
//!     vec![Value::Text("night".into()), Value::Text("pass".into())],
//!     vec![Value::Text("night".into()), Value::Text("pass".into())],
//! ];
//! let mut table = Table::new();
//! table.load_rows(&rows);
//!
//! let result = cross_table(&table, "shift", "outcome", None, None).unwrap();
//! assert_eq!(result.df, 1);
//! assert_eq!(result.rows["day"].len(), 2);
//! ```

pub mod chi2;
pub mod column_stats;
pub mod crosstab;
pub mod error;
pub mod frame_stats;
pub mod special;
pub mod table;

pub use chi2::Chi2;
pub use column_stats::ColumnStats;
pub use error::StatError;
pub use table::{Column, ColumnType, Table, Value};

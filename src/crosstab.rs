//! Frequency tables, contingency analysis, and table normalization.
//!
//! One-way tables count distinct values of a single column. Two-way
//! [`cross_table`] builds a contingency table between two columns,
//! decomposes each cell into observed count and row/column/table
//! fractions, and tests independence with the chi-squared statistic
//! fed through [`Chi2`]. [`cross_tabulation`] applies the same
//! decomposition across a whole table at once, and [`normalize`]
//! min-max scales every numeric column on an owned copy.
//!
//! All mappings whose iteration order callers can observe are
//! insertion-ordered [`IndexMap`]s.
//!
//! # Example
//!
//! ```
//! use tabstat::crosstab::one_way_table;
//! use tabstat::table::{Table, Value};
//!
//! let rows = vec![
//!     vec![Value::Text("grade".into())],
//!     vec![Value::Text("A".into())],
//!     vec![Value::Text("B".into())],
//!     vec![Value::Text("A".into())],
//! ];
//! let mut table = Table::new();
//! table.load_rows(&rows);
//!
//! let freq = one_way_table(&table, "grade", false);
//! assert_eq!(freq["A"], 2.0);
//! assert_eq!(freq["B"], 1.0);
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::chi2::Chi2;
use crate::column_stats::ColumnStats;
use crate::error::StatError;
use crate::table::Table;

// ── Result types ──────────────────────────────────────────────────────

/// One contingency-table cell: observed count plus the three fractions
/// it represents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrossCell {
    /// Observed count.
    pub n: f64,
    /// Fraction of the cell's row total.
    pub r: f64,
    /// Fraction of the cell's column total.
    pub c: f64,
    /// Fraction of the grand total.
    pub t: f64,
}

/// A two-dimensional frequency decomposition with its chi-squared
/// independence test. Produced fresh on every call, never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContingencyTable {
    /// Column labels, in cell order.
    pub columns: Vec<String>,
    /// Row category → ordered cells, in first-seen row order.
    pub rows: IndexMap<String, Vec<CrossCell>>,
    /// Aggregate chi-squared statistic.
    pub chi2: f64,
    /// Degrees of freedom, `(rows − 1) × (columns − 1)`.
    pub df: usize,
    /// Significance: probability of a deviation this large by chance.
    /// −1 when the table is empty or degenerate.
    pub q: f64,
}

impl ContingencyTable {
    /// The sentinel result for empty or degenerate input.
    fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: IndexMap::new(),
            chi2: 0.0,
            df: 0,
            q: -1.0,
        }
    }
}

/// One entry of a one-way frequency table flattened for iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyEntry {
    pub item: String,
    pub count: f64,
}

// ── One-way tables ────────────────────────────────────────────────────

/// Counts distinct values of one column, in first-seen order.
///
/// With `as_percentage`, each count is replaced by its share of the
/// total, rounded to two decimal places. Unknown columns yield an
/// empty map.
pub fn one_way_table(table: &Table, column: &str, as_percentage: bool) -> IndexMap<String, f64> {
    let values = table.string_column(column);
    let mut freq: IndexMap<String, f64> = IndexMap::new();
    for value in values {
        *freq.entry(value).or_insert(0.0) += 1.0;
    }
    if as_percentage {
        let total: f64 = freq.values().sum();
        if total > 0.0 {
            for count in freq.values_mut() {
                *count = round2(*count / total * 100.0);
            }
        }
    }
    freq
}

/// Flattens a one-way table into `{item, count}` pairs, preserving
/// the map's order.
pub fn to_array(freq: &IndexMap<String, f64>) -> Vec<FrequencyEntry> {
    freq.iter()
        .map(|(item, &count)| FrequencyEntry {
            item: item.clone(),
            count,
        })
        .collect()
}

// ── Two-way tables ────────────────────────────────────────────────────

/// Builds a contingency table between two columns and tests their
/// independence.
///
/// Without `grouping`, the column categories are the distinct values of
/// `col_column` in first-seen order. With `grouping`, each entry is a
/// set of space-delimited literal values and an observation lands in
/// the first group containing its value; observations matching no group
/// are dropped from the counts. `column_names` overrides the column
/// labels when provided.
///
/// Cell fractions with a zero denominator are reported as 0; empty or
/// mismatched input yields the empty sentinel table. The only error is
/// numeric non-convergence inside the significance computation.
pub fn cross_table(
    table: &Table,
    row_column: &str,
    col_column: &str,
    grouping: Option<&[&str]>,
    column_names: Option<&[&str]>,
) -> Result<ContingencyTable, StatError> {
    let row_values = table.string_column(row_column);
    let col_values = table.string_column(col_column);
    if row_values.is_empty() || row_values.len() != col_values.len() {
        return Ok(ContingencyTable::empty());
    }

    // Column groups: literal value sets plus display labels.
    let (groups, labels): (Vec<Vec<String>>, Vec<String>) = match grouping {
        Some(spec) => {
            let groups: Vec<Vec<String>> = spec
                .iter()
                .map(|g| g.split_whitespace().map(str::to_string).collect())
                .collect();
            let labels = match column_names {
                Some(names) => names.iter().map(|s| s.to_string()).collect(),
                None => spec.iter().map(|s| s.to_string()).collect(),
            };
            (groups, labels)
        }
        None => {
            let mut distinct: Vec<String> = Vec::new();
            for value in &col_values {
                if !distinct.contains(value) {
                    distinct.push(value.clone());
                }
            }
            let labels = match column_names {
                Some(names) => names.iter().map(|s| s.to_string()).collect(),
                None => distinct.clone(),
            };
            (distinct.into_iter().map(|v| vec![v]).collect(), labels)
        }
    };
    if groups.is_empty() || labels.len() != groups.len() {
        return Ok(ContingencyTable::empty());
    }

    // Observed counts, rows in first-seen order. An observation whose
    // value matches no group registers nothing, not even its row
    // category, so dropped values cannot widen the table.
    let mut observed: IndexMap<String, Vec<f64>> = IndexMap::new();
    for (row_value, col_value) in row_values.iter().zip(&col_values) {
        let Some(g) = groups.iter().position(|set| set.contains(col_value)) else {
            continue;
        };
        let counts = observed
            .entry(row_value.clone())
            .or_insert_with(|| vec![0.0; groups.len()]);
        counts[g] += 1.0;
    }

    decompose(observed, labels)
}

/// Cross-tabulates a whole table at once: the first column labels the
/// rows (rows sharing a label are aggregated), and every other numeric
/// column is an observation series, ordered by column.
pub fn cross_tabulation(table: &Table) -> Result<ContingencyTable, StatError> {
    let names = table.column_names();
    if names.len() < 2 || table.row_count() == 0 {
        return Ok(ContingencyTable::empty());
    }
    let labels = table.string_column(&names[0]);

    let mut columns: Vec<String> = Vec::new();
    let mut series: Vec<Vec<f64>> = Vec::new();
    for name in &names[1..] {
        let values = table.numeric_column(name);
        if !values.is_empty() {
            columns.push(name.clone());
            series.push(values);
        }
    }
    if series.is_empty() {
        return Ok(ContingencyTable::empty());
    }

    let mut observed: IndexMap<String, Vec<f64>> = IndexMap::new();
    for (row, label) in labels.iter().enumerate() {
        let counts = observed
            .entry(label.clone())
            .or_insert_with(|| vec![0.0; series.len()]);
        for (col, values) in series.iter().enumerate() {
            counts[col] += values[row];
        }
    }

    decompose(observed, columns)
}

/// Shared expected-count / chi-squared decomposition over an observed
/// frequency matrix.
fn decompose(
    observed: IndexMap<String, Vec<f64>>,
    columns: Vec<String>,
) -> Result<ContingencyTable, StatError> {
    let n_cols = columns.len();
    if observed.is_empty() || n_cols == 0 {
        return Ok(ContingencyTable::empty());
    }

    let row_totals: Vec<f64> = observed.values().map(|row| row.iter().sum()).collect();
    let mut col_totals = vec![0.0; n_cols];
    for row in observed.values() {
        for (c, &count) in row.iter().enumerate() {
            col_totals[c] += count;
        }
    }
    let grand: f64 = row_totals.iter().sum();
    if grand <= 0.0 {
        return Ok(ContingencyTable::empty());
    }

    let mut chi2 = 0.0;
    let mut rows: IndexMap<String, Vec<CrossCell>> = IndexMap::with_capacity(observed.len());
    for ((category, counts), &row_total) in observed.iter().zip(&row_totals) {
        let cells: Vec<CrossCell> = counts
            .iter()
            .enumerate()
            .map(|(c, &n)| {
                let expected = row_total * col_totals[c] / grand;
                if expected > 0.0 {
                    let diff = n - expected;
                    chi2 += diff * diff / expected;
                }
                CrossCell {
                    n,
                    r: fraction(n, row_total),
                    c: fraction(n, col_totals[c]),
                    t: fraction(n, grand),
                }
            })
            .collect();
        rows.insert(category.clone(), cells);
    }

    let df = (rows.len().saturating_sub(1)) * (n_cols - 1);
    let q = Chi2::new(df as f64).q_value(chi2)?;

    Ok(ContingencyTable {
        columns,
        rows,
        chi2,
        df,
        q,
    })
}

// ── Normalization ─────────────────────────────────────────────────────

/// Min-max scales every numeric column to `[0, 1]` on an owned copy of
/// the table; the original is untouched. Constant columns become all
/// zeros; non-numeric columns pass through unchanged.
pub fn normalize(table: &Table) -> Table {
    let mut scaled = table.clone();
    for name in table.column_names() {
        let values = table.numeric_column(name);
        if values.is_empty() {
            continue;
        }
        let stats = ColumnStats::new(values);
        let (min, max) = (stats.min(), stats.max());
        let range = max - min;
        let rescaled: Vec<f64> = if range == 0.0 {
            vec![0.0; stats.data().len()]
        } else {
            stats.data().iter().map(|v| (v - min) / range).collect()
        };
        scaled.replace_numeric_column(name, rescaled);
    }
    scaled
}

fn fraction(n: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        n / denominator
    } else {
        0.0
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;

    fn table_of_strings(name: &str, values: &[&str]) -> Table {
        let mut rows = vec![vec![Value::Text(name.into())]];
        rows.extend(values.iter().map(|v| vec![Value::Text((*v).into())]));
        let mut table = Table::new();
        table.load_rows(&rows);
        table
    }

    fn two_column_table(rows_data: &[(&str, &str)]) -> Table {
        let mut rows = vec![vec![
            Value::Text("left".into()),
            Value::Text("right".into()),
        ]];
        rows.extend(
            rows_data
                .iter()
                .map(|(l, r)| vec![Value::Text((*l).into()), Value::Text((*r).into())]),
        );
        let mut table = Table::new();
        table.load_rows(&rows);
        table
    }

    #[test]
    fn one_way_counts_in_first_seen_order() {
        let table = table_of_strings("v", &["A", "B", "A", "C", "A"]);
        let freq = one_way_table(&table, "v", false);
        let entries: Vec<(&str, f64)> = freq.iter().map(|(k, &v)| (k.as_str(), v)).collect();
        assert_eq!(entries, vec![("A", 3.0), ("B", 1.0), ("C", 1.0)]);
    }

    #[test]
    fn one_way_percentages_round_to_two_decimals() {
        let table = table_of_strings("v", &["A", "A", "B"]);
        let freq = one_way_table(&table, "v", true);
        assert_eq!(freq["A"], 66.67);
        assert_eq!(freq["B"], 33.33);
    }

    #[test]
    fn one_way_unknown_column_is_empty() {
        let table = table_of_strings("v", &["A"]);
        assert!(one_way_table(&table, "w", false).is_empty());
    }

    #[test]
    fn to_array_preserves_order() {
        let table = table_of_strings("v", &["B", "A", "B"]);
        let entries = to_array(&one_way_table(&table, "v", false));
        assert_eq!(entries[0].item, "B");
        assert_eq!(entries[0].count, 2.0);
        assert_eq!(entries[1].item, "A");
        assert_eq!(entries[1].count, 1.0);
    }

    #[test]
    fn cross_table_counts_and_totals() {
        let table = two_column_table(&[
            ("x", "p"),
            ("x", "q"),
            ("y", "p"),
            ("y", "p"),
            ("x", "p"),
            ("y", "q"),
        ]);
        let result = cross_table(&table, "left", "right", None, None).unwrap();

        assert_eq!(result.columns, vec!["p", "q"]);
        assert_eq!(result.df, 1);

        // Row cell counts sum to the row total, and all rows to n.
        let mut grand = 0.0;
        for cells in result.rows.values() {
            let row_total: f64 = cells.iter().map(|c| c.n).sum();
            let r_sum: f64 = cells.iter().map(|c| c.r).sum();
            assert!((r_sum - 1.0).abs() < 1e-12);
            grand += row_total;
        }
        assert_eq!(grand, 6.0);

        // Table fractions sum to one.
        let t_sum: f64 = result
            .rows
            .values()
            .flat_map(|cells| cells.iter().map(|c| c.t))
            .sum();
        assert!((t_sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn cross_table_chi_squared_known_value() {
        // Observed [[10, 20], [20, 10]]: expected 15 everywhere,
        // chi2 = 4 * 25/15 = 20/3, df = 1.
        let mut rows_data = Vec::new();
        rows_data.extend(std::iter::repeat(("a", "p")).take(10));
        rows_data.extend(std::iter::repeat(("a", "q")).take(20));
        rows_data.extend(std::iter::repeat(("b", "p")).take(20));
        rows_data.extend(std::iter::repeat(("b", "q")).take(10));
        let table = two_column_table(&rows_data);

        let result = cross_table(&table, "left", "right", None, None).unwrap();
        assert_eq!(result.df, 1);
        assert!((result.chi2 - 20.0 / 3.0).abs() < 1e-9);
        // Strong association: significant at the 5% level.
        assert!(result.q > 0.0 && result.q < 0.05);

        let a_cells = &result.rows["a"];
        assert_eq!(a_cells[0].n, 10.0);
        assert!((a_cells[0].r - 10.0 / 30.0).abs() < 1e-12);
        assert!((a_cells[0].c - 10.0 / 30.0).abs() < 1e-12);
        assert!((a_cells[0].t - 10.0 / 60.0).abs() < 1e-12);
    }

    #[test]
    fn cross_table_independent_data_is_insignificant() {
        // Perfectly proportional rows: chi2 = 0, q = -1 sentinel
        // because a zero statistic is not a valid deviation.
        let table = two_column_table(&[
            ("a", "p"),
            ("a", "q"),
            ("b", "p"),
            ("b", "q"),
        ]);
        let result = cross_table(&table, "left", "right", None, None).unwrap();
        assert_eq!(result.chi2, 0.0);
        assert_eq!(result.q, -1.0);
    }

    #[test]
    fn cross_table_grouping_buckets_literals() {
        let table = two_column_table(&[
            ("x", "1"),
            ("x", "2"),
            ("x", "5"),
            ("y", "6"),
            ("y", "3"),
            ("y", "1"),
        ]);
        let grouping = ["1 2 3", "4 5 6"];
        let names = ["low", "high"];
        let result =
            cross_table(&table, "left", "right", Some(&grouping), Some(&names)).unwrap();

        assert_eq!(result.columns, vec!["low", "high"]);
        let x = &result.rows["x"];
        assert_eq!((x[0].n, x[1].n), (2.0, 1.0));
        let y = &result.rows["y"];
        assert_eq!((y[0].n, y[1].n), (2.0, 1.0));
    }

    #[test]
    fn cross_table_drops_unmatched_group_values() {
        let table = two_column_table(&[("x", "1"), ("x", "9"), ("y", "2")]);
        let grouping = ["1", "2"];
        let result =
            cross_table(&table, "left", "right", Some(&grouping), None).unwrap();

        // "9" matches no group and contributes to no cell.
        let total: f64 = result
            .rows
            .values()
            .flat_map(|cells| cells.iter().map(|c| c.n))
            .sum();
        assert_eq!(total, 2.0);
    }

    #[test]
    fn cross_table_all_unmatched_row_creates_no_category() {
        let table = two_column_table(&[("x", "1"), ("y", "2"), ("z", "9")]);
        let grouping = ["1", "2"];
        let result =
            cross_table(&table, "left", "right", Some(&grouping), None).unwrap();

        // "z" only ever observed an unmatched value: no row, no
        // degrees-of-freedom inflation from an all-zero category.
        assert!(!result.rows.contains_key("z"));
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.df, 1);
    }

    #[test]
    fn cross_table_unknown_columns_yield_sentinel() {
        let table = two_column_table(&[("x", "p")]);
        let result = cross_table(&table, "nope", "right", None, None).unwrap();
        assert!(result.rows.is_empty());
        assert_eq!(result.q, -1.0);
        assert_eq!(result.df, 0);
    }

    #[test]
    fn cross_tabulation_aggregates_by_first_column() {
        let rows = vec![
            vec![
                Value::Text("region".into()),
                Value::Text("sales".into()),
                Value::Text("returns".into()),
            ],
            vec![
                Value::Text("north".into()),
                Value::Number(10.0),
                Value::Number(2.0),
            ],
            vec![
                Value::Text("south".into()),
                Value::Number(20.0),
                Value::Number(4.0),
            ],
            vec![
                Value::Text("north".into()),
                Value::Number(5.0),
                Value::Number(1.0),
            ],
        ];
        let mut table = Table::new();
        table.load_rows(&rows);

        let result = cross_tabulation(&table).unwrap();
        assert_eq!(result.columns, vec!["sales", "returns"]);
        assert_eq!(result.rows.len(), 2);

        let north = &result.rows["north"];
        assert_eq!((north[0].n, north[1].n), (15.0, 3.0));
        let south = &result.rows["south"];
        assert_eq!((south[0].n, south[1].n), (20.0, 4.0));

        // Rows here are exactly proportional, so independence holds.
        assert!(result.chi2.abs() < 1e-9);
        assert_eq!(result.df, 1);
    }

    #[test]
    fn cross_tabulation_needs_observation_columns() {
        let table = table_of_strings("v", &["a", "b"]);
        let result = cross_tabulation(&table).unwrap();
        assert!(result.rows.is_empty());
    }

    #[test]
    fn normalize_scales_to_unit_interval() {
        let rows = vec![
            vec![Value::Text("x".into()), Value::Text("y".into())],
            vec![Value::Number(2.0), Value::Number(100.0)],
            vec![Value::Number(4.0), Value::Number(300.0)],
            vec![Value::Number(10.0), Value::Number(200.0)],
        ];
        let mut table = Table::new();
        table.load_rows(&rows);

        let scaled = normalize(&table);
        assert_eq!(scaled.numeric_column("x"), vec![0.0, 0.25, 1.0]);
        assert_eq!(scaled.numeric_column("y"), vec![0.0, 1.0, 0.5]);

        // Original untouched.
        assert_eq!(table.numeric_column("x"), vec![2.0, 4.0, 10.0]);
    }

    #[test]
    fn normalize_constant_column_becomes_zeros() {
        let rows = vec![
            vec![Value::Text("c".into())],
            vec![Value::Number(7.0)],
            vec![Value::Number(7.0)],
        ];
        let mut table = Table::new();
        table.load_rows(&rows);
        assert_eq!(normalize(&table).numeric_column("c"), vec![0.0, 0.0]);
    }

    #[test]
    fn contingency_table_serializes() {
        let table = two_column_table(&[("x", "p"), ("y", "q")]);
        let result = cross_table(&table, "left", "right", None, None).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert!(json["rows"]["x"][0]["n"].is_number());
        assert!(json["chi2"].is_number());
        assert!(json["df"].is_number());
    }
}

//! Column-major tabular store with typed columns.
//!
//! [`Table`] keeps an ordered list of column names ("categories"), a
//! parallel list of [`ColumnType`] tags, and a column-major store where
//! each column is a homogeneous [`Column`]. Invariant: the three lists
//! have equal length and all columns hold the same number of rows.
//!
//! Tables are built in one shot from row-oriented input — either
//! uniform-keyed records or an array-of-arrays with a header row — and
//! mutated only by column removal. Malformed input leaves the table in
//! its prior state; loading never panics and never half-applies.
//!
//! # Example
//!
//! ```
//! use indexmap::IndexMap;
//! use tabstat::table::{ColumnType, Table, Value};
//!
//! let records: Vec<IndexMap<String, Value>> = vec![
//!     IndexMap::from([
//!         ("name".to_string(), Value::Text("ore".into())),
//!         ("mass".to_string(), Value::Number(2.5)),
//!     ]),
//!     IndexMap::from([
//!         ("name".to_string(), Value::Text("slag".into())),
//!         ("mass".to_string(), Value::Number(1.25)),
//!     ]),
//! ];
//!
//! let mut table = Table::new();
//! table.load_records(&records);
//! assert_eq!(table.row_count(), 2);
//! assert_eq!(table.schema(), vec![
//!     ("name", ColumnType::Character),
//!     ("mass", ColumnType::Numeric),
//! ]);
//! ```

use std::cell::RefCell;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Record keys stripped automatically when loading records: persistence
/// identifiers from the calling layer, not observation data.
const RESERVED_KEYS: [&str; 2] = ["id", "_id"];

// ── Value ─────────────────────────────────────────────────────────────

/// A single cell value handed in by the calling layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
    Bool(bool),
}

impl Value {
    /// The column type this value belongs in.
    pub fn column_type(&self) -> ColumnType {
        match self {
            Self::Number(_) => ColumnType::Numeric,
            Self::Text(_) => ColumnType::Character,
            Self::Bool(_) => ColumnType::Boolean,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
        }
    }
}

// ── ColumnType ────────────────────────────────────────────────────────

/// Declared type tag for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Numeric,
    Character,
    Boolean,
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Numeric => write!(f, "NUMERIC"),
            Self::Character => write!(f, "CHARACTER"),
            Self::Boolean => write!(f, "BOOLEAN"),
        }
    }
}

// ── Column ────────────────────────────────────────────────────────────

/// Homogeneous column storage matching a [`ColumnType`] tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numeric(Vec<f64>),
    Character(Vec<String>),
    Boolean(Vec<bool>),
}

impl Column {
    fn with_type(ty: ColumnType) -> Self {
        match ty {
            ColumnType::Numeric => Self::Numeric(Vec::new()),
            ColumnType::Character => Self::Character(Vec::new()),
            ColumnType::Boolean => Self::Boolean(Vec::new()),
        }
    }

    /// Returns the type tag matching this column's storage.
    pub fn column_type(&self) -> ColumnType {
        match self {
            Self::Numeric(_) => ColumnType::Numeric,
            Self::Character(_) => ColumnType::Character,
            Self::Boolean(_) => ColumnType::Boolean,
        }
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(v) => v.len(),
            Self::Character(v) => v.len(),
            Self::Boolean(v) => v.len(),
        }
    }

    /// Returns `true` if the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the numeric values, or `None` for other column types.
    pub fn as_numeric(&self) -> Option<&[f64]> {
        match self {
            Self::Numeric(v) => Some(v),
            _ => None,
        }
    }

    /// Appends a value whose variant matches the storage; returns
    /// `false` on a type mismatch, leaving the column unchanged.
    fn push(&mut self, value: &Value) -> bool {
        match (self, value) {
            (Self::Numeric(v), Value::Number(x)) => v.push(*x),
            (Self::Character(v), Value::Text(x)) => v.push(x.clone()),
            (Self::Boolean(v), Value::Bool(x)) => v.push(*x),
            _ => return false,
        }
        true
    }

    /// Copies the column out as a row-agnostic value sequence.
    pub fn to_values(&self) -> Vec<Value> {
        match self {
            Self::Numeric(v) => v.iter().map(|&x| Value::Number(x)).collect(),
            Self::Character(v) => v.iter().map(|x| Value::Text(x.clone())).collect(),
            Self::Boolean(v) => v.iter().map(|&x| Value::Bool(x)).collect(),
        }
    }
}

// ── Table ─────────────────────────────────────────────────────────────

/// Train/test partition produced by [`Table::split`]: one value
/// sequence per column in each portion.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableSplit {
    pub train: Vec<Vec<Value>>,
    pub test: Vec<Vec<Value>>,
}

/// Column-major table with case-sensitive, unique column names.
#[derive(Debug, Clone, Default)]
pub struct Table {
    categories: Vec<String>,
    types: Vec<ColumnType>,
    columns: Vec<Column>,
    // Last (name, copy) pair served by get_column. Optimization only,
    // not part of the table invariant.
    read_cache: RefCell<Option<(String, Vec<Value>)>>,
}

impl Table {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the table from uniform-keyed records.
    ///
    /// Column names come from the first record's keys in order, with
    /// the reserved identifier keys `id`/`_id` stripped; column types
    /// come from the first record's value variants. Input is validated
    /// up front: empty input, records with missing keys, or values
    /// whose variant disagrees with the first record make the call a
    /// silent no-op, leaving the prior state intact.
    pub fn load_records(&mut self, records: &[IndexMap<String, Value>]) {
        let Some(first) = records.first() else {
            return;
        };
        let categories: Vec<String> = first
            .keys()
            .filter(|k| !RESERVED_KEYS.contains(&k.as_str()))
            .cloned()
            .collect();
        if categories.is_empty() {
            return;
        }
        let types: Vec<ColumnType> = categories
            .iter()
            .map(|k| first[k].column_type())
            .collect();

        // Full validation pass before any state is touched.
        for record in records {
            for (name, ty) in categories.iter().zip(&types) {
                match record.get(name) {
                    Some(value) if value.column_type() == *ty => {}
                    _ => return,
                }
            }
        }

        self.reset(categories, types);
        for record in records {
            for (i, name) in self.categories.iter().enumerate() {
                self.columns[i].push(&record[name]);
            }
        }
    }

    /// Loads the table from an array-of-arrays whose first row is the
    /// header; remaining rows are observations.
    ///
    /// Column types come from the first data row. The same validation
    /// policy as [`load_records`](Self::load_records) applies: ragged
    /// rows, mistyped values, or a missing data row leave the prior
    /// state intact.
    pub fn load_rows(&mut self, rows: &[Vec<Value>]) {
        if rows.len() < 2 {
            return;
        }
        let header = &rows[0];
        if header.is_empty() {
            return;
        }
        let categories: Vec<String> = header.iter().map(|v| v.to_string()).collect();
        // Column names are unique; a duplicate header would leave the
        // later column unaddressable by name.
        for (i, name) in categories.iter().enumerate() {
            if categories[..i].contains(name) {
                return;
            }
        }
        let types: Vec<ColumnType> = rows[1].iter().map(Value::column_type).collect();
        if types.len() != categories.len() {
            return;
        }

        for row in &rows[1..] {
            if row.len() != categories.len() {
                return;
            }
            for (value, ty) in row.iter().zip(&types) {
                if value.column_type() != *ty {
                    return;
                }
            }
        }

        self.reset(categories, types);
        for row in &rows[1..] {
            for (i, value) in row.iter().enumerate() {
                self.columns[i].push(value);
            }
        }
    }

    /// Drops all state and installs fresh empty columns.
    fn reset(&mut self, categories: Vec<String>, types: Vec<ColumnType>) {
        self.columns = types.iter().map(|&ty| Column::with_type(ty)).collect();
        self.categories = categories;
        self.types = types;
        self.read_cache.replace(None);
    }

    /// Returns the number of rows.
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    /// Returns the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if the table has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns the ordered column names.
    pub fn column_names(&self) -> &[String] {
        &self.categories
    }

    /// Returns the declared type tags, parallel to the names.
    pub fn column_types(&self) -> &[ColumnType] {
        &self.types
    }

    /// Returns (name, type) pairs for every column.
    pub fn schema(&self) -> Vec<(&str, ColumnType)> {
        self.categories
            .iter()
            .map(String::as_str)
            .zip(self.types.iter().copied())
            .collect()
    }

    /// Returns a reference to the column with the given name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.column_index(name).map(|i| &self.columns[i])
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.categories.iter().position(|c| c == name)
    }

    /// Returns a copy of the named column, or an empty sequence for an
    /// unknown name.
    ///
    /// The most recently fetched (name, copy) pair is cached so
    /// repeated access to the same column does not re-copy storage.
    pub fn get_column(&self, name: &str) -> Vec<Value> {
        if let Some((cached_name, values)) = self.read_cache.borrow().as_ref() {
            if cached_name == name {
                return values.clone();
            }
        }
        let Some(column) = self.column(name) else {
            return Vec::new();
        };
        let values = column.to_values();
        self.read_cache
            .replace(Some((name.to_string(), values.clone())));
        values
    }

    /// Returns a copy of a numeric column's values, or an empty vector
    /// for unknown or non-numeric columns.
    pub fn numeric_column(&self, name: &str) -> Vec<f64> {
        self.column(name)
            .and_then(Column::as_numeric)
            .map(<[f64]>::to_vec)
            .unwrap_or_default()
    }

    /// Returns the named column stringified row by row, for use as a
    /// categorical variable. Empty for an unknown name.
    pub fn string_column(&self, name: &str) -> Vec<String> {
        match self.column(name) {
            Some(Column::Character(v)) => v.clone(),
            Some(Column::Numeric(v)) => v.iter().map(f64::to_string).collect(),
            Some(Column::Boolean(v)) => v.iter().map(bool::to_string).collect(),
            None => Vec::new(),
        }
    }

    /// Removes the named column and its metadata. Unknown names are
    /// ignored. The read cache is invalidated if it referenced the
    /// removed column.
    pub fn remove_column(&mut self, name: &str) {
        let Some(index) = self.column_index(name) else {
            return;
        };
        self.categories.remove(index);
        self.types.remove(index);
        self.columns.remove(index);

        let cache_hit = self
            .read_cache
            .borrow()
            .as_ref()
            .is_some_and(|(cached, _)| cached == name);
        if cache_hit {
            self.read_cache.replace(None);
        }
    }

    /// Partitions the table's own columns into a train portion (rows
    /// `0..=row_index`) and a test portion (the rest), per column.
    /// An out-of-bounds index yields empty train and test sets.
    pub fn split(&self, row_index: usize) -> TableSplit {
        let columns: Vec<Vec<Value>> = self.columns.iter().map(Column::to_values).collect();
        Self::split_columns(&columns, row_index)
    }

    /// Same partition over a supplied replacement column set.
    pub fn split_columns(columns: &[Vec<Value>], row_index: usize) -> TableSplit {
        let row_count = columns.first().map_or(0, Vec::len);
        if row_index >= row_count {
            return TableSplit::default();
        }
        let mut split = TableSplit::default();
        for column in columns {
            split.train.push(column[..=row_index].to_vec());
            split.test.push(column[row_index + 1..].to_vec());
        }
        split
    }

    /// Replaces the named numeric column's values in place. Length or
    /// type mismatches are ignored. Used by the whole-table transforms
    /// to build owned copies without re-deriving the schema.
    pub(crate) fn replace_numeric_column(&mut self, name: &str, values: Vec<f64>) {
        let Some(index) = self.column_index(name) else {
            return;
        };
        if let Column::Numeric(existing) = &mut self.columns[index] {
            if existing.len() == values.len() {
                *existing = values;
                self.read_cache.replace(None);
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_records() -> Vec<IndexMap<String, Value>> {
        let mut records = Vec::new();
        for (id, name, score, active) in [
            (1.0, "alpha", 10.0, true),
            (2.0, "beta", 20.0, false),
            (3.0, "gamma", 30.0, true),
        ] {
            records.push(IndexMap::from([
                ("_id".to_string(), Value::Number(id)),
                ("name".to_string(), Value::Text(name.into())),
                ("score".to_string(), Value::Number(score)),
                ("active".to_string(), Value::Bool(active)),
            ]));
        }
        records
    }

    fn sample_table() -> Table {
        let mut table = Table::new();
        table.load_records(&sample_records());
        table
    }

    #[test]
    fn load_records_builds_columns_and_strips_reserved_keys() {
        let table = sample_table();
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.column_names(), &["name", "score", "active"]);
        assert_eq!(
            table.column_types(),
            &[
                ColumnType::Character,
                ColumnType::Numeric,
                ColumnType::Boolean
            ]
        );
        assert_eq!(table.numeric_column("score"), vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn malformed_records_leave_prior_state() {
        let mut table = sample_table();

        // Wrong variant in the second record.
        let mut bad = sample_records();
        bad[1]["score"] = Value::Text("not a number".into());
        table.load_records(&bad);
        assert_eq!(table.numeric_column("score"), vec![10.0, 20.0, 30.0]);

        // Missing key.
        let mut bad = sample_records();
        bad[2].shift_remove("active");
        table.load_records(&bad);
        assert_eq!(table.column_count(), 3);

        // Empty input.
        table.load_records(&[]);
        assert_eq!(table.row_count(), 3);
    }

    #[test]
    fn load_rows_uses_header_row() {
        let rows = vec![
            vec![Value::Text("x".into()), Value::Text("label".into())],
            vec![Value::Number(1.0), Value::Text("a".into())],
            vec![Value::Number(2.0), Value::Text("b".into())],
        ];
        let mut table = Table::new();
        table.load_rows(&rows);
        assert_eq!(table.column_names(), &["x", "label"]);
        assert_eq!(table.numeric_column("x"), vec![1.0, 2.0]);
        assert_eq!(table.string_column("label"), vec!["a", "b"]);
    }

    #[test]
    fn load_rows_rejects_ragged_and_headerless_input() {
        let mut table = sample_table();

        let ragged = vec![
            vec![Value::Text("x".into()), Value::Text("y".into())],
            vec![Value::Number(1.0)],
        ];
        table.load_rows(&ragged);
        assert_eq!(table.column_names(), &["name", "score", "active"]);

        // Header with no data rows cannot infer types.
        table.load_rows(&[vec![Value::Text("x".into())]]);
        assert_eq!(table.row_count(), 3);
    }

    #[test]
    fn load_rows_rejects_duplicate_header_names() {
        let mut table = sample_table();
        let duplicated = vec![
            vec![Value::Text("x".into()), Value::Text("x".into())],
            vec![Value::Number(1.0), Value::Number(2.0)],
        ];
        table.load_rows(&duplicated);
        assert_eq!(table.column_names(), &["name", "score", "active"]);
        assert_eq!(table.row_count(), 3);
    }

    #[test]
    fn get_column_copies_and_caches() {
        let table = sample_table();
        let first = table.get_column("score");
        assert_eq!(
            first,
            vec![Value::Number(10.0), Value::Number(20.0), Value::Number(30.0)]
        );
        // Second fetch is served from the cache and equals the first.
        assert_eq!(table.get_column("score"), first);
        // Unknown names yield an empty sequence.
        assert!(table.get_column("nope").is_empty());
    }

    #[test]
    fn remove_column_drops_metadata_and_cache() {
        let mut table = sample_table();
        let _ = table.get_column("score");
        table.remove_column("score");

        assert_eq!(table.column_names(), &["name", "active"]);
        assert_eq!(table.column_types().len(), 2);
        assert!(table.get_column("score").is_empty());
        assert!(table.numeric_column("score").is_empty());

        // Removing an unknown name is a no-op.
        table.remove_column("score");
        assert_eq!(table.column_count(), 2);
    }

    #[test]
    fn split_partitions_rows_inclusive() {
        let table = sample_table();
        let split = table.split(1);
        assert_eq!(split.train.len(), 3);
        assert_eq!(split.train[1], vec![Value::Number(10.0), Value::Number(20.0)]);
        assert_eq!(split.test[1], vec![Value::Number(30.0)]);
    }

    #[test]
    fn split_out_of_bounds_is_empty() {
        let table = sample_table();
        let split = table.split(3);
        assert!(split.train.is_empty());
        assert!(split.test.is_empty());
    }

    #[test]
    fn split_columns_accepts_replacement_data() {
        let columns = vec![
            vec![Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)],
            vec![Value::Number(4.0), Value::Number(5.0), Value::Number(6.0)],
        ];
        let split = Table::split_columns(&columns, 0);
        assert_eq!(split.train[0], vec![Value::Number(1.0)]);
        assert_eq!(split.test[0], vec![Value::Number(2.0), Value::Number(3.0)]);
        assert_eq!(split.train[1], vec![Value::Number(4.0)]);
    }

    #[test]
    fn string_column_stringifies_any_type() {
        let table = sample_table();
        assert_eq!(table.string_column("active"), vec!["true", "false", "true"]);
        assert_eq!(table.string_column("score"), vec!["10", "20", "30"]);
    }

    #[test]
    fn value_serializes_untagged() {
        let json = serde_json::to_string(&Value::Number(2.5)).unwrap();
        assert_eq!(json, "2.5");
        let json = serde_json::to_string(&Value::Text("a".into())).unwrap();
        assert_eq!(json, "\"a\"");
    }
}

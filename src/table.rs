//! Row-oriented comparison table.
//!
//! Rows are flat maps of column name to JSON value, exactly as the
//! statistics endpoint returns them. Merging two monthly tables tags every
//! row with a period label under [`PERIOD_COLUMN`]; rows of the first table
//! precede rows of the second and nothing is deduplicated.

use serde_json::{Map, Value};

/// One record of the remote dataset.
pub type Row = Map<String, Value>;

/// Column added by [`Table::labeled_union`] to tag each row with its period.
pub const PERIOD_COLUMN: &str = "period";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    rows: Vec<Row>,
}

impl Table {
    #[must_use]
    pub const fn new() -> Self {
        Self { rows: Vec::new() }
    }

    #[must_use]
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// A column exists if any row carries it. Matches dataframe-concat
    /// semantics where the column set is the union over all rows.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.rows.iter().any(|row| row.contains_key(name))
    }

    /// Row-wise union of two monthly tables, each row annotated with its
    /// source label. No schema reconciliation is performed.
    #[must_use]
    pub fn labeled_union(first: Self, first_label: &str, second: Self, second_label: &str) -> Self {
        let mut rows = Vec::with_capacity(first.rows.len() + second.rows.len());
        for (table, label) in [(first, first_label), (second, second_label)] {
            for mut row in table.rows {
                row.insert(
                    PERIOD_COLUMN.to_string(),
                    Value::String(label.to_string()),
                );
                rows.push(row);
            }
        }
        Self { rows }
    }
}

/// Read a cell as display text. Numbers are rendered in their JSON form.
#[must_use]
pub fn string_cell(row: &Row, column: &str) -> Option<String> {
    match row.get(column)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Read a cell as a number. The endpoint serializes some metrics as JSON
/// strings, so numeric strings are parsed too.
#[must_use]
pub fn numeric_cell(row: &Row, column: &str) -> Option<f64> {
    match row.get(column)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;

//! Chart derivation from the comparison table.
//!
//! Two charts are attempted, each independently gated on its required
//! columns being present. A missing column downgrades that chart to `None`
//! with a reported warning; the other chart is still attempted.

use crate::table::{PERIOD_COLUMN, Table, numeric_cell, string_cell};

use super::model::{ChartSpec, Series};

pub const REGION_COLUMN: &str = "PAG_REGIAO";
pub const AGE_COLUMN: &str = "PAG_IDADE";
pub const VALUE_COLUMN: &str = "VALOR";
pub const COUNT_COLUMN: &str = "QUANTIDADE";

/// Derive the two comparison charts: value by region and transaction count
/// by age bracket, each split into one series per period label.
#[must_use]
pub fn build_charts(table: &Table) -> (Option<ChartSpec>, Option<ChartSpec>) {
    let value_by_region = grouped_chart(table, REGION_COLUMN, VALUE_COLUMN, "Value by Region");
    if value_by_region.is_none() {
        eprintln!("Warning: column '{REGION_COLUMN}' or '{VALUE_COLUMN}' not found");
    }

    let count_by_age = grouped_chart(
        table,
        AGE_COLUMN,
        COUNT_COLUMN,
        "Transaction Count by Age Bracket",
    );
    if count_by_age.is_none() {
        eprintln!("Warning: column '{AGE_COLUMN}' or '{COUNT_COLUMN}' not found");
    }

    (value_by_region, count_by_age)
}

/// Build one grouped-bar chart, or `None` when either required column is
/// absent from the table.
///
/// Categories appear in first-encounter order across the whole table, as do
/// series labels. Each series value is the sum of the metric over the rows
/// carrying that category and label; rows missing the category or with a
/// non-numeric metric are skipped.
#[must_use]
pub fn grouped_chart(
    table: &Table,
    category_column: &str,
    metric_column: &str,
    title: &str,
) -> Option<ChartSpec> {
    if !table.has_column(category_column) || !table.has_column(metric_column) {
        return None;
    }

    let mut categories: Vec<String> = Vec::new();
    let mut labels: Vec<String> = Vec::new();
    let mut sums: std::collections::HashMap<(usize, usize), f64> = std::collections::HashMap::new();

    for row in table.rows() {
        let Some(category) = string_cell(row, category_column) else {
            continue;
        };
        let Some(value) = numeric_cell(row, metric_column) else {
            continue;
        };
        let label = string_cell(row, PERIOD_COLUMN).unwrap_or_default();

        let cat_idx = index_of(&mut categories, category);
        let label_idx = index_of(&mut labels, label);
        *sums.entry((label_idx, cat_idx)).or_insert(0.0) += value;
    }

    let series = labels
        .iter()
        .enumerate()
        .map(|(label_idx, label)| Series {
            label: label.clone(),
            values: (0..categories.len())
                .map(|cat_idx| sums.get(&(label_idx, cat_idx)).copied().unwrap_or(0.0))
                .collect(),
        })
        .collect();

    Some(ChartSpec {
        title: title.to_string(),
        category_column: category_column.to_string(),
        metric_column: metric_column.to_string(),
        categories,
        series,
    })
}

fn index_of(entries: &mut Vec<String>, entry: String) -> usize {
    entries.iter().position(|e| *e == entry).unwrap_or_else(|| {
        entries.push(entry);
        entries.len() - 1
    })
}

#[cfg(test)]
#[path = "builder_tests.rs"]
mod tests;

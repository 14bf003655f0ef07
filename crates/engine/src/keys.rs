use std::collections::HashSet;

use crate::model::{Cell, Table};

/// Column-name fragments that suggest an identifier column.
pub const KEY_NAME_PATTERNS: [&str; 12] = [
    "id",
    "code",
    "key",
    "identifier",
    "pk",
    "primary_key",
    "name",
    "title",
    "label",
    "sku",
    "product_id",
    "item_id",
];

/// Both tables must exceed this distinct/row ratio for a column to qualify.
pub const MIN_UNIQUENESS_RATIO: f64 = 0.5;

/// Propose identifier columns shared by both tables, in `table1` order.
///
/// A column qualifies when its name contains one of [`KEY_NAME_PATTERNS`]
/// (case-insensitive) and its raw values are more than half distinct in each
/// table. False positives are expected; callers only use the result as a
/// matching hint.
pub fn detect_key_columns(table1: &Table, table2: &Table) -> Vec<String> {
    table1
        .columns()
        .iter()
        .filter(|column| table2.has_column(column))
        .filter(|column| looks_like_key(column))
        .filter(|column| {
            uniqueness_ratio(table1, column) > MIN_UNIQUENESS_RATIO
                && uniqueness_ratio(table2, column) > MIN_UNIQUENESS_RATIO
        })
        .cloned()
        .collect()
}

pub fn looks_like_key(column: &str) -> bool {
    let lower = column.to_lowercase();
    KEY_NAME_PATTERNS.iter().any(|p| lower.contains(p))
}

/// Distinct raw values / row count. Zero for an empty table.
pub fn uniqueness_ratio(table: &Table, column: &str) -> f64 {
    if table.is_empty() {
        return 0.0;
    }
    let distinct: HashSet<RawValue<'_>> = table
        .rows()
        .iter()
        .map(|row| RawValue::of(row.get(column)))
        .collect();
    distinct.len() as f64 / table.len() as f64
}

/// Hashable identity of an un-normalized cell. Missing values count as one
/// distinct blank, same as an empty string.
#[derive(Debug, PartialEq, Eq, Hash)]
enum RawValue<'a> {
    Text(&'a str),
    Number(u64),
    Other(&'a str),
}

impl<'a> RawValue<'a> {
    fn of(cell: &'a Cell) -> Self {
        match cell {
            Cell::Null => RawValue::Text(""),
            Cell::Number(n) if n.is_nan() => RawValue::Text(""),
            // -0.0 == 0.0
            Cell::Number(n) => RawValue::Number((n + 0.0).to_bits()),
            Cell::Text(s) => RawValue::Text(s),
            Cell::Other(s) => RawValue::Other(s),
        }
    }
}

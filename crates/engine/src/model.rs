use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use serde::Serialize;

use crate::error::DiffError;

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

/// A single value read from a spreadsheet.
///
/// `Other` holds the canonical textual form of anything that is neither text
/// nor a number (booleans, date-times, error values).
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Null,
    Text(String),
    Number(f64),
    Other(String),
}

static NULL_CELL: Cell = Cell::Null;

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    pub fn other(repr: impl Into<String>) -> Self {
        Cell::Other(repr.into())
    }

    pub fn is_null(&self) -> bool {
        match self {
            Cell::Null => true,
            Cell::Number(n) => n.is_nan(),
            _ => false,
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(value as f64)
    }
}

impl From<i32> for Cell {
    fn from(value: i32) -> Self {
        Cell::Number(f64::from(value))
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Other(if value { "True" } else { "False" }.to_string())
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Cell::Null)
    }
}

// ---------------------------------------------------------------------------
// Rows + Tables
// ---------------------------------------------------------------------------

/// One record of a table, keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Row {
    cells: BTreeMap<String, Cell>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value at `column`; a column the row does not carry reads as `Null`.
    pub fn get(&self, column: &str) -> &Cell {
        self.cells.get(column).unwrap_or(&NULL_CELL)
    }

    pub fn set(&mut self, column: impl Into<String>, cell: Cell) {
        self.cells.insert(column.into(), cell);
    }

    pub fn remove(&mut self, column: &str) -> Option<Cell> {
        self.cells.remove(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    /// Values in the given column order.
    pub fn project<'a>(&'a self, columns: &'a [String]) -> impl Iterator<Item = &'a Cell> + 'a {
        columns.iter().map(move |c| self.get(c))
    }
}

impl<K: Into<String>, V: Into<Cell>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Row {
            cells: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// A loaded sheet: ordered unique column names plus ordered rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Result<Self, DiffError> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(DiffError::DuplicateColumn(column.clone()));
            }
        }
        for (idx, row) in rows.iter().enumerate() {
            if let Some(unknown) = row.columns().find(|c| !seen.contains(c)) {
                return Err(DiffError::UnknownColumn {
                    row: idx,
                    column: unknown.to_string(),
                });
            }
        }
        Ok(Self { columns, rows })
    }

    /// Build from positional rows. Short rows leave trailing columns `Null`.
    pub fn from_grid<C, R>(columns: C, grid: Vec<R>) -> Result<Self, DiffError>
    where
        C: IntoIterator,
        C::Item: Into<String>,
        R: IntoIterator<Item = Cell>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let mut rows = Vec::with_capacity(grid.len());
        for (idx, values) in grid.into_iter().enumerate() {
            let values: Vec<Cell> = values.into_iter().collect();
            if values.len() > columns.len() {
                return Err(DiffError::RowWidth {
                    row: idx,
                    expected: columns.len(),
                    found: values.len(),
                });
            }
            rows.push(columns.iter().cloned().zip(values).collect());
        }
        Self::new(columns, rows)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Copy of this table with `ignore` dropped from the header and every row.
    pub fn without_columns(&self, ignore: &BTreeSet<String>) -> Table {
        if ignore.is_empty() {
            return self.clone();
        }
        let columns = self
            .columns
            .iter()
            .filter(|c| !ignore.contains(*c))
            .cloned()
            .collect();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut row = row.clone();
                for column in ignore {
                    row.remove(column);
                }
                row
            })
            .collect();
        Table { columns, rows }
    }
}

/// Sheets of one input file, in source order.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: Vec<(String, Table)>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a sheet; a replaced sheet keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, table: Table) {
        let name = name.into();
        match self.sheets.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = table,
            None => self.sheets.push((name, table)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.sheets.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|(n, _)| n.as_str())
    }

    pub fn sheets(&self) -> &[(String, Table)] {
        &self.sheets
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Edit scripts
// ---------------------------------------------------------------------------

/// Index-based edit operation produced by an alignment strategy.
/// `Removed` indexes the first table, `Added` the second.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
    Added(usize),
    Removed(usize),
    Modified {
        before: usize,
        after: usize,
        changed_columns: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Added => "added",
            ChangeKind::Removed => "removed",
            ChangeKind::Modified => "modified",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of a sheet diff, carrying the row data it refers to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiffRecord {
    Added {
        row: Row,
    },
    Removed {
        row: Row,
    },
    Modified {
        before: Row,
        after: Row,
        /// Columns whose normalized values differ, in output column order.
        changed_columns: Vec<String>,
    },
}

impl DiffRecord {
    pub fn kind(&self) -> ChangeKind {
        match self {
            DiffRecord::Added { .. } => ChangeKind::Added,
            DiffRecord::Removed { .. } => ChangeKind::Removed,
            DiffRecord::Modified { .. } => ChangeKind::Modified,
        }
    }

    /// The row written to a report: the new values for added/modified rows.
    pub fn display_row(&self) -> &Row {
        match self {
            DiffRecord::Added { row } | DiffRecord::Removed { row } => row,
            DiffRecord::Modified { after, .. } => after,
        }
    }

    pub fn changed_columns(&self) -> &[String] {
        match self {
            DiffRecord::Modified { changed_columns, .. } => changed_columns,
            _ => &[],
        }
    }
}

// ---------------------------------------------------------------------------
// Sheet results
// ---------------------------------------------------------------------------

/// Which alignment produced a sheet's diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum Strategy {
    Lcs,
    KeyMatch { key_columns: Vec<String> },
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Lcs => write!(f, "lcs"),
            Strategy::KeyMatch { key_columns } => write!(f, "key_match({})", key_columns.join(", ")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChangeCounts {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
}

impl ChangeCounts {
    pub fn tally(records: &[DiffRecord]) -> Self {
        let mut counts = ChangeCounts::default();
        for record in records {
            match record.kind() {
                ChangeKind::Added => counts.added += 1,
                ChangeKind::Removed => counts.removed += 1,
                ChangeKind::Modified => counts.modified += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.added + self.removed + self.modified
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SheetDiffResult {
    pub sheet: String,
    /// Output columns: the first table's columns after ignore-column removal.
    pub columns: Vec<String>,
    pub strategy: Strategy,
    pub divergence_ratio: f64,
    pub rows1: usize,
    pub rows2: usize,
    pub counts: ChangeCounts,
    pub records: Vec<DiffRecord>,
}

impl SheetDiffResult {
    pub fn total(&self) -> usize {
        self.counts.total()
    }

    pub fn has_differences(&self) -> bool {
        !self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict {
    Ok,
    Mismatch { expected: i64 },
}

impl Verdict {
    pub fn is_ok(&self) -> bool {
        matches!(self, Verdict::Ok)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Ok => write!(f, "OK"),
            Verdict::Mismatch { expected } => write!(f, "MISMATCH (expected {expected})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub sheet: String,
    pub rows1: usize,
    pub rows2: usize,
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
    pub total: usize,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompareMeta {
    pub engine_version: String,
    pub run_at: String,
    pub ignored_columns: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkbookDiff {
    pub meta: CompareMeta,
    /// Every compared sheet, including unchanged ones.
    pub sheets: Vec<SheetDiffResult>,
    /// One row per sheet with at least one difference.
    pub summary: Vec<SummaryRow>,
}

impl WorkbookDiff {
    pub fn has_differences(&self) -> bool {
        self.sheets.iter().any(SheetDiffResult::has_differences)
    }

    /// Sheets that produce an output section.
    pub fn changed_sheets(&self) -> impl Iterator<Item = &SheetDiffResult> {
        self.sheets.iter().filter(|s| s.has_differences())
    }
}

// JSON diff report

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

use sheetcmp_engine::model::{
    ChangeCounts, CompareMeta, DiffRecord, Row, SheetDiffResult, Strategy, SummaryRow,
};
use sheetcmp_engine::WorkbookDiff;

use crate::error::IoError;

#[derive(Serialize)]
struct JsonReport<'a> {
    meta: &'a CompareMeta,
    sheets: Vec<JsonSheet<'a>>,
    summary: &'a [SummaryRow],
}

#[derive(Serialize)]
struct JsonSheet<'a> {
    sheet: &'a str,
    columns: &'a [String],
    strategy: &'a Strategy,
    divergence_ratio: f64,
    rows1: usize,
    rows2: usize,
    counts: ChangeCounts,
    records: Vec<JsonRecord<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum JsonRecord<'a> {
    Added {
        row: Map<String, Value>,
    },
    Removed {
        row: Map<String, Value>,
    },
    Modified {
        before: Map<String, Value>,
        after: Map<String, Value>,
        changed_columns: &'a [String],
    },
}

/// Row values keyed by column, in output column order.
fn project(row: &Row, columns: &[String]) -> Map<String, Value> {
    columns
        .iter()
        .map(|c| {
            let value = serde_json::to_value(row.get(c)).unwrap_or(Value::Null);
            (c.clone(), value)
        })
        .collect()
}

fn sheet_report(result: &SheetDiffResult) -> JsonSheet<'_> {
    let columns = result.columns.as_slice();
    let records = result
        .records
        .iter()
        .map(|record| match record {
            DiffRecord::Added { row } => JsonRecord::Added { row: project(row, columns) },
            DiffRecord::Removed { row } => JsonRecord::Removed { row: project(row, columns) },
            DiffRecord::Modified { before, after, changed_columns } => JsonRecord::Modified {
                before: project(before, columns),
                after: project(after, columns),
                changed_columns,
            },
        })
        .collect();

    JsonSheet {
        sheet: &result.sheet,
        columns,
        strategy: &result.strategy,
        divergence_ratio: result.divergence_ratio,
        rows1: result.rows1,
        rows2: result.rows2,
        counts: result.counts,
        records,
    }
}

pub fn to_json_value(diff: &WorkbookDiff) -> Result<Value, serde_json::Error> {
    let report = JsonReport {
        meta: &diff.meta,
        sheets: diff.sheets.iter().map(sheet_report).collect(),
        summary: &diff.summary,
    };
    serde_json::to_value(&report)
}

/// Write the full diff (every compared sheet) as pretty-printed JSON.
pub fn write_json_report(path: &Path, diff: &WorkbookDiff) -> Result<(), IoError> {
    let value = to_json_value(diff).map_err(|e| IoError::write(path, e))?;
    let file = File::create(path).map_err(|e| IoError::write(path, e))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &value).map_err(|e| IoError::write(path, e))?;
    log::info!("JSON report written to {}", path.display());
    Ok(())
}

use crate::config::CompareConfig;
use crate::keys::detect_key_columns;
use crate::lcs::{align, Alignment};
use crate::matcher::match_by_key;
use crate::model::{
    ChangeCounts, CompareMeta, DiffRecord, EditOp, SheetDiffResult, Strategy, Table, Workbook,
    WorkbookDiff,
};
use crate::signature::row_signatures;
use crate::summary::build_summary;

/// Above this divergence ratio a sheet with key columns is re-matched by key.
pub const DIVERGENCE_THRESHOLD: f64 = 0.3;

/// Compare every sheet present in both workbooks (in `book1` order).
pub fn compare_workbooks(book1: &Workbook, book2: &Workbook, config: &CompareConfig) -> WorkbookDiff {
    let mut sheets = Vec::new();
    for (name, table1) in book1.sheets() {
        let Some(table2) = book2.get(name) else {
            log::debug!("sheet '{name}' only in first input, skipped");
            continue;
        };
        sheets.push(compare_tables(name, table1, table2, config));
    }

    if sheets.is_empty() {
        log::warn!("inputs have no sheet names in common; nothing to compare");
    }

    let summary = build_summary(&sheets);

    WorkbookDiff {
        meta: CompareMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            ignored_columns: config.ignore_columns.iter().cloned().collect(),
        },
        sheets,
        summary,
    }
}

/// Drop configured ignore columns from both tables, then diff them.
pub fn compare_tables(
    sheet: &str,
    table1: &Table,
    table2: &Table,
    config: &CompareConfig,
) -> SheetDiffResult {
    let table1 = table1.without_columns(&config.ignore_columns);
    let table2 = table2.without_columns(&config.ignore_columns);
    diff_sheet(sheet, &table1, &table2)
}

/// Diff one sheet: order-preserving alignment first, key matching when the
/// alignment diverges too far and identifier columns are available.
pub fn diff_sheet(sheet: &str, table1: &Table, table2: &Table) -> SheetDiffResult {
    let alignment = align(&row_signatures(table1), &row_signatures(table2));
    let ratio = divergence_ratio(&alignment, table1.len(), table2.len());
    let key_columns = detect_key_columns(table1, table2);

    log::debug!(
        "sheet '{sheet}': lcs matched {} (+{} -{}), divergence {ratio:.3}, key columns {:?}",
        alignment.matched,
        alignment.added,
        alignment.removed,
        key_columns
    );

    let strategy = select_strategy(ratio, key_columns);
    let (ops, counts) = match &strategy {
        Strategy::Lcs => {
            let counts = ChangeCounts {
                added: alignment.added,
                removed: alignment.removed,
                modified: 0,
            };
            (alignment.ops, counts)
        }
        Strategy::KeyMatch { key_columns } => {
            let out = match_by_key(table1, table2, key_columns);
            let counts = ChangeCounts {
                added: out.added,
                removed: out.removed,
                modified: out.modified,
            };
            (out.ops, counts)
        }
    };

    let records = materialize(&ops, table1, table2);
    debug_assert_eq!(counts, ChangeCounts::tally(&records));

    log::info!(
        "sheet '{sheet}': {strategy}, {} added, {} removed, {} modified",
        counts.added,
        counts.removed,
        counts.modified
    );

    SheetDiffResult {
        sheet: sheet.to_string(),
        columns: table1.columns().to_vec(),
        strategy,
        divergence_ratio: ratio,
        rows1: table1.len(),
        rows2: table2.len(),
        counts,
        records,
    }
}

/// `(added + removed) / min(rows1, rows2)`, zero when either side is empty.
pub fn divergence_ratio(alignment: &Alignment, rows1: usize, rows2: usize) -> f64 {
    let denominator = rows1.min(rows2);
    if denominator == 0 {
        return 0.0;
    }
    (alignment.added + alignment.removed) as f64 / denominator as f64
}

pub fn select_strategy(divergence_ratio: f64, key_columns: Vec<String>) -> Strategy {
    if !key_columns.is_empty() && divergence_ratio > DIVERGENCE_THRESHOLD {
        Strategy::KeyMatch { key_columns }
    } else {
        Strategy::Lcs
    }
}

fn materialize(ops: &[EditOp], table1: &Table, table2: &Table) -> Vec<DiffRecord> {
    ops.iter()
        .map(|op| match op {
            EditOp::Added(j) => DiffRecord::Added {
                row: table2.rows()[*j].clone(),
            },
            EditOp::Removed(i) => DiffRecord::Removed {
                row: table1.rows()[*i].clone(),
            },
            EditOp::Modified {
                before,
                after,
                changed_columns,
            } => DiffRecord::Modified {
                before: table1.rows()[*before].clone(),
                after: table2.rows()[*after].clone(),
                changed_columns: changed_columns.clone(),
            },
        })
        .collect()
}

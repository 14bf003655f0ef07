use crate::model::{SheetDiffResult, SummaryRow, Verdict};

/// Check `rows1 + added - removed == rows2`.
pub fn validate_counts(rows1: usize, rows2: usize, added: usize, removed: usize) -> Verdict {
    let expected = rows1 as i64 + added as i64 - removed as i64;
    if expected == rows2 as i64 {
        Verdict::Ok
    } else {
        Verdict::Mismatch { expected }
    }
}

pub fn summarize(result: &SheetDiffResult) -> SummaryRow {
    let counts = result.counts;
    let verdict = validate_counts(result.rows1, result.rows2, counts.added, counts.removed);
    if let Verdict::Mismatch { expected } = verdict {
        log::warn!(
            "sheet '{}': reconciliation mismatch ({} + {} - {} = {expected}, found {})",
            result.sheet,
            result.rows1,
            counts.added,
            counts.removed,
            result.rows2
        );
    }
    SummaryRow {
        sheet: result.sheet.clone(),
        rows1: result.rows1,
        rows2: result.rows2,
        added: counts.added,
        removed: counts.removed,
        modified: counts.modified,
        total: counts.total(),
        verdict,
    }
}

/// Summary rows for sheets with at least one difference, in input order.
pub fn build_summary(results: &[SheetDiffResult]) -> Vec<SummaryRow> {
    results
        .iter()
        .filter(|r| r.has_differences())
        .map(summarize)
        .collect()
}

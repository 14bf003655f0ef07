// Excel import via calamine, diff report export via rust_xlsxwriter

use std::collections::HashSet;
use std::fmt::Display;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook as XlsxWorkbook, Worksheet, XlsxError};

use sheetcmp_engine::model::{DiffRecord, SheetDiffResult, SummaryRow, Verdict};
use sheetcmp_engine::{Cell, Table, Workbook, WorkbookDiff};

use crate::error::IoError;
use crate::header_names;

pub const SUMMARY_SHEET_NAME: &str = "Difference_Summary";

pub const SUMMARY_HEADER: [&str; 8] = [
    "Sheet Name",
    "File 1 Rows",
    "File 2 Rows",
    "Rows Added",
    "Rows Removed",
    "Rows Modified",
    "Total Differences",
    "Validation",
];

const ADDED_FILL: u32 = 0xC8E6C9;
const REMOVED_FILL: u32 = 0xFFCDD2;
const MODIFIED_FILL: u32 = 0xFFF59D;

/// Excel's sheet-name length limit.
const MAX_SHEET_NAME_LEN: usize = 31;

/// Excel's 1,048,576 row limit minus the header row.
pub const MAX_REPORT_ROWS: usize = 1_048_575;

// ============================================================================
// Import
// ============================================================================

/// Import every sheet of an Excel file (xlsx, xlsm, xls, xlsb, ods).
pub fn import(path: &Path) -> Result<Workbook, IoError> {
    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| IoError::read(path, format!("failed to open workbook: {e}")))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    if sheet_names.is_empty() {
        return Err(IoError::NoSheets(path.to_path_buf()));
    }

    let sheets = sheet_names
        .iter()
        .map(|name| (name.clone(), workbook.worksheet_range(name)));
    collect_sheets(path, sheets)
}

/// Build the workbook from per-sheet read results. A sheet that cannot be
/// read is skipped with a warning; the file fails only when none can be read.
fn collect_sheets<E: Display>(
    path: &Path,
    sheets: impl IntoIterator<Item = (String, Result<Range<Data>, E>)>,
) -> Result<Workbook, IoError> {
    let mut book = Workbook::new();
    let mut first_failure: Option<String> = None;

    for (sheet_name, range) in sheets {
        let range = match range {
            Ok(range) => range,
            Err(e) => {
                log::warn!("{}: sheet '{sheet_name}' skipped: {e}", path.display());
                if first_failure.is_none() {
                    first_failure = Some(format!("failed to read sheet '{sheet_name}': {e}"));
                }
                continue;
            }
        };
        let table = table_from_range(&range)
            .map_err(|e| IoError::read(path, format!("sheet '{sheet_name}': {e}")))?;
        log::debug!("sheet '{sheet_name}': {} columns, {} rows", table.columns().len(), table.len());
        book.insert(sheet_name, table);
    }

    match first_failure {
        Some(message) if book.is_empty() => Err(IoError::read(path, message)),
        _ => Ok(book),
    }
}

/// First row of the used range is the header; data may not begin at A1.
fn table_from_range(range: &Range<Data>) -> Result<Table, sheetcmp_engine::DiffError> {
    let (height, width) = range.get_size();
    if height == 0 || width == 0 {
        return Ok(Table::default());
    }

    // Leading empty columns still count as (unnamed) columns
    let (_, start_col) = range.start().unwrap_or((0, 0));
    let pad = start_col as usize;

    let mut rows = range.rows();
    let header: Vec<String> = std::iter::repeat(String::new())
        .take(pad)
        .chain(rows.next().into_iter().flatten().map(header_text))
        .collect();

    let mut grid: Vec<Vec<Cell>> = rows
        .map(|row| {
            std::iter::repeat(Cell::Null)
                .take(pad)
                .chain(row.iter().map(cell_from_data))
                .collect()
        })
        .collect();

    while grid.last().is_some_and(|row| row.iter().all(Cell::is_null)) {
        grid.pop();
    }

    Table::from_grid(header_names(header), grid)
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Null,
        Data::String(s) if s.is_empty() => Cell::Null,
        Data::String(s) => Cell::text(s.as_str()),
        Data::Float(n) => Cell::Number(*n),
        Data::Int(n) => Cell::from(*n),
        Data::Bool(b) => Cell::from(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ts) => Cell::other(ts.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => Cell::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::other(s.as_str()),
        Data::Error(_) => Cell::other("#ERR"),
    }
}

fn header_text(data: &Data) -> String {
    match data {
        Data::Float(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
        other => match cell_from_data(other) {
            Cell::Null => String::new(),
            Cell::Text(s) | Cell::Other(s) => s,
            Cell::Number(n) => n.to_string(),
        },
    }
}

// ============================================================================
// Export
// ============================================================================

/// Statistics from writing a diff report.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReportStats {
    /// Sheets written, including the summary sheet.
    pub sheets_written: usize,
    /// Diff rows written across all per-sheet sections.
    pub rows_written: usize,
    /// Sheets whose diff rows were cut at [`MAX_REPORT_ROWS`].
    pub truncated_sheets: usize,
}

struct ReportFormats {
    header: Format,
    added: Format,
    removed: Format,
    modified: Format,
}

impl ReportFormats {
    fn new() -> Self {
        let fill = |rgb: u32| {
            Format::new()
                .set_background_color(Color::RGB(rgb))
                .set_border(FormatBorder::Thin)
        };
        Self {
            header: Format::new().set_bold().set_border_bottom(FormatBorder::Thin),
            added: fill(ADDED_FILL),
            removed: fill(REMOVED_FILL),
            modified: fill(MODIFIED_FILL),
        }
    }
}

/// Write the summary sheet plus one sheet per changed sheet.
pub fn write_report(path: &Path, diff: &WorkbookDiff) -> Result<ReportStats, IoError> {
    let mut stats = ReportStats::default();
    let formats = ReportFormats::new();
    let mut xlsx_workbook = XlsxWorkbook::new();
    let mut used_names: HashSet<String> = HashSet::new();

    let err = |e: XlsxError| IoError::write(path, e);

    let summary_sheet = xlsx_workbook
        .add_worksheet()
        .set_name(SUMMARY_SHEET_NAME)
        .map_err(err)?;
    write_summary_sheet(summary_sheet, &diff.summary, &formats).map_err(err)?;
    used_names.insert(SUMMARY_SHEET_NAME.to_lowercase());
    stats.sheets_written += 1;

    for result in diff.changed_sheets() {
        let name = unique_sheet_name(&result.sheet, &mut used_names);
        let worksheet = xlsx_workbook
            .add_worksheet()
            .set_name(&name)
            .map_err(|e| IoError::write(path, format!("failed to create sheet '{name}': {e}")))?;
        let written = write_diff_sheet(worksheet, result, &formats).map_err(err)?;
        if written < result.records.len() {
            stats.truncated_sheets += 1;
        }
        stats.rows_written += written;
        stats.sheets_written += 1;
    }

    xlsx_workbook
        .save(path)
        .map_err(|e| IoError::write(path, format!("failed to save report: {e}")))?;

    log::info!(
        "report written to {} ({} sheet(s), {} row(s))",
        path.display(),
        stats.sheets_written,
        stats.rows_written
    );
    Ok(stats)
}

fn write_summary_sheet(
    worksheet: &mut Worksheet,
    summary: &[SummaryRow],
    formats: &ReportFormats,
) -> Result<(), XlsxError> {
    for (col, title) in SUMMARY_HEADER.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *title, &formats.header)?;
    }

    for (idx, row) in summary.iter().enumerate() {
        let r = idx as u32 + 1;
        worksheet.write_string(r, 0, &row.sheet)?;
        let counts = [row.rows1, row.rows2, row.added, row.removed, row.modified, row.total];
        for (offset, value) in counts.into_iter().enumerate() {
            worksheet.write_number(r, offset as u16 + 1, value as f64)?;
        }
        worksheet.write_string(r, 7, validation_label(&row.verdict))?;
    }

    worksheet.set_freeze_panes(1, 0)?;
    worksheet.autofit();
    Ok(())
}

/// Text shown in the summary's Validation column.
pub fn validation_label(verdict: &Verdict) -> String {
    match verdict {
        Verdict::Ok => format!("\u{2713} {verdict}"),
        Verdict::Mismatch { .. } => format!("\u{2717} {verdict}"),
    }
}

/// How many of `total` diff rows fit under `limit`; warns when rows are cut.
fn rows_to_write(sheet: &str, total: usize, limit: usize) -> usize {
    if total > limit {
        log::warn!(
            "sheet '{sheet}': {total} differences, report truncated to the first {limit}"
        );
    }
    total.min(limit)
}

/// Returns the number of diff rows written.
fn write_diff_sheet(
    worksheet: &mut Worksheet,
    result: &SheetDiffResult,
    formats: &ReportFormats,
) -> Result<usize, XlsxError> {
    for (col, name) in result.columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, name, &formats.header)?;
    }

    let count = rows_to_write(&result.sheet, result.records.len(), MAX_REPORT_ROWS);
    for (idx, record) in result.records.iter().take(count).enumerate() {
        let r = idx as u32 + 1;
        let row = record.display_row();
        for (col, column) in result.columns.iter().enumerate() {
            let format = match record {
                DiffRecord::Added { .. } => Some(&formats.added),
                DiffRecord::Removed { .. } => Some(&formats.removed),
                DiffRecord::Modified { changed_columns, .. } => {
                    changed_columns.contains(column).then_some(&formats.modified)
                }
            };
            write_cell(worksheet, r, col as u16, row.get(column), format)?;
        }
    }

    worksheet.set_freeze_panes(1, 0)?;
    worksheet.autofit();
    Ok(count)
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Cell,
    format: Option<&Format>,
) -> Result<(), XlsxError> {
    match (cell, format) {
        (Cell::Number(n), Some(f)) if n.is_finite() => {
            worksheet.write_number_with_format(row, col, *n, f)?;
        }
        (Cell::Number(n), None) if n.is_finite() => {
            worksheet.write_number(row, col, *n)?;
        }
        (Cell::Text(s) | Cell::Other(s), Some(f)) => {
            worksheet.write_string_with_format(row, col, s, f)?;
        }
        (Cell::Text(s) | Cell::Other(s), None) => {
            worksheet.write_string(row, col, s)?;
        }
        // Null and non-finite numbers: only the fill is visible
        (_, Some(f)) => {
            worksheet.write_blank(row, col, f)?;
        }
        (_, None) => {}
    }
    Ok(())
}

/// Sheet names are unique case-insensitively and at most 31 chars.
fn unique_sheet_name(base: &str, used: &mut HashSet<String>) -> String {
    let base: String = base.chars().take(MAX_SHEET_NAME_LEN).collect();
    let mut candidate = base.clone();
    let mut n = 2;
    while used.contains(&candidate.to_lowercase()) {
        let suffix = format!(" ({n})");
        let keep = MAX_SHEET_NAME_LEN.saturating_sub(suffix.chars().count());
        candidate = base.chars().take(keep).collect::<String>() + &suffix;
        n += 1;
    }
    used.insert(candidate.to_lowercase());
    candidate
}

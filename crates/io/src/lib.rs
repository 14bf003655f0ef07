// File I/O: spreadsheet readers and diff report writers

pub mod csv;
pub mod error;
pub mod json;
pub mod xlsx;

use std::collections::HashSet;
use std::path::Path;

use sheetcmp_engine::Workbook;

pub use error::IoError;

/// Sheet name given to single-table inputs (csv/tsv).
pub const SINGLE_SHEET_NAME: &str = "Sheet1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Excel,
    Csv,
    Tsv,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Result<Self, IoError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(InputFormat::Excel),
            "csv" | "txt" => Ok(InputFormat::Csv),
            "tsv" => Ok(InputFormat::Tsv),
            _ => Err(IoError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Load every sheet of `path` as a table (first row = header).
pub fn read_workbook(path: &Path) -> Result<Workbook, IoError> {
    if !path.is_file() {
        return Err(IoError::InputUnavailable(path.to_path_buf()));
    }
    let book = match InputFormat::from_path(path)? {
        InputFormat::Excel => xlsx::import(path)?,
        InputFormat::Csv => csv::import(path)?,
        InputFormat::Tsv => csv::import_with_delimiter(path, b'\t')?,
    };
    log::debug!("{}: {} sheet(s) loaded", path.display(), book.len());
    Ok(book)
}

/// Report file name: `{YYYYmmdd_HHMMSS}_{prefix}.xlsx`.
pub fn report_file_name(now: &chrono::NaiveDateTime, prefix: &str) -> String {
    format!("{}_{prefix}.xlsx", now.format("%Y%m%d_%H%M%S"))
}

/// Turn raw header cells into unique column names. Blank headers become
/// `Unnamed: N`; repeats get `.1`, `.2`, ... appended.
pub(crate) fn header_names<I: IntoIterator<Item = String>>(raw: I) -> Vec<String> {
    let raw: Vec<String> = raw.into_iter().collect();
    let mut taken: HashSet<String> = HashSet::new();
    let mut names = Vec::with_capacity(raw.len());

    for (idx, name) in raw.into_iter().enumerate() {
        let base = if name.trim().is_empty() {
            format!("Unnamed: {idx}")
        } else {
            name
        };
        let mut candidate = base.clone();
        let mut n = 1;
        while taken.contains(&candidate) {
            candidate = format!("{base}.{n}");
            n += 1;
        }
        taken.insert(candidate.clone());
        names.push(candidate);
    }

    names
}

// CSV/TSV import: one table per file

use std::io::Read;
use std::path::Path;

use sheetcmp_engine::{Cell, Table, Workbook};

use crate::error::IoError;
use crate::{header_names, SINGLE_SHEET_NAME};

pub fn import(path: &Path) -> Result<Workbook, IoError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    import_from_string(&content, delimiter).map_err(|e| IoError::read(path, e))
}

pub fn import_with_delimiter(path: &Path, delimiter: u8) -> Result<Workbook, IoError> {
    let content = read_file_as_utf8(path)?;
    import_from_string(&content, delimiter).map_err(|e| IoError::read(path, e))
}

const DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];
const SNIFF_RECORDS: usize = 10;

fn reader_builder(delimiter: u8) -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.delimiter(delimiter).has_headers(false).flexible(true);
    builder
}

/// Field count of each of the first records when split on `delimiter`.
/// Parsing stops at the first malformed record.
fn field_counts(content: &str, delimiter: u8) -> Vec<usize> {
    reader_builder(delimiter)
        .from_reader(content.as_bytes())
        .records()
        .take(SNIFF_RECORDS)
        .map_while(Result::ok)
        .map(|record| record.len())
        .collect()
}

/// Pick the delimiter whose leading records agree most on a multi-field width.
/// Ties keep the earlier candidate, so plain single-column text reads as comma.
fn sniff_delimiter(content: &str) -> u8 {
    let content = content.strip_prefix('\u{FEFF}').unwrap_or(content);
    let mut best = (0usize, b',');
    for delimiter in DELIMITERS {
        let counts = field_counts(content, delimiter);
        let Some(&width) = counts.first() else { continue };
        if width < 2 {
            continue;
        }
        let agreeing = counts.iter().filter(|&&n| n == width).count();
        if agreeing * width > best.0 {
            best = (agreeing * width, delimiter);
        }
    }
    best.1
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let mut file = std::fs::File::open(path).map_err(|e| IoError::read(path, e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| IoError::read(path, e))?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            // Excel-exported CSVs are commonly Windows-1252
            log::debug!("{}: not UTF-8, decoding as Windows-1252", path.display());
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

fn import_from_string(content: &str, delimiter: u8) -> Result<Workbook, String> {
    let content = content.strip_prefix('\u{FEFF}').unwrap_or(content);
    let mut reader = reader_builder(delimiter).from_reader(content.as_bytes());

    let mut records = reader.records();
    let header = match records.next() {
        Some(record) => record.map_err(|e| e.to_string())?,
        None => {
            let mut book = Workbook::new();
            book.insert(SINGLE_SHEET_NAME, Table::default());
            return Ok(book);
        }
    };

    let mut raw_header: Vec<String> = header.iter().map(str::to_string).collect();
    let mut grid: Vec<Vec<Cell>> = Vec::new();
    for result in records {
        let record = result.map_err(|e| e.to_string())?;
        grid.push(record.iter().map(parse_field).collect::<Vec<Cell>>());
    }
    // All-empty records inside the data are rows; only the tail is padding
    while grid.last().is_some_and(|row| row.iter().all(Cell::is_null)) {
        grid.pop();
    }
    // Ragged rows widen the header with unnamed columns
    let width = grid.iter().map(Vec::len).max().unwrap_or(0);
    while raw_header.len() < width {
        raw_header.push(String::new());
    }

    let table = Table::from_grid(header_names(raw_header), grid).map_err(|e| e.to_string())?;
    let mut book = Workbook::new();
    book.insert(SINGLE_SHEET_NAME, table);
    Ok(book)
}

/// Empty → Null, finite number → Number, anything else → Text.
fn parse_field(field: &str) -> Cell {
    if field.is_empty() {
        return Cell::Null;
    }
    match field.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => Cell::Number(n),
        _ => Cell::text(field),
    }
}

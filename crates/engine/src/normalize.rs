//! Canonical comparison strings for cell values.
//!
//! Every equality decision in the engine goes through [`normalize`]: two
//! cells are "the same" iff their normalized strings are equal. The function
//! is total and idempotent when its output is fed back in as text.

use crate::model::Cell;

/// Fractional digits used before trailing zeros are stripped.
pub const NUMBER_PRECISION: usize = 10;

pub fn normalize(cell: &Cell) -> String {
    match cell {
        Cell::Null => String::new(),
        Cell::Text(s) => normalize_text(s),
        Cell::Number(n) => normalize_number(*n),
        Cell::Other(repr) => normalize_text(repr),
    }
}

/// Strip zero-width characters, collapse whitespace runs to one ASCII space,
/// trim, lower-case.
pub fn normalize_text(raw: &str) -> String {
    let mut collapsed = String::with_capacity(raw.len());
    let mut pending_space = false;

    for ch in raw.chars() {
        if is_zero_width(ch) {
            continue;
        }
        if ch.is_whitespace() {
            pending_space = !collapsed.is_empty();
            continue;
        }
        if pending_space {
            collapsed.push(' ');
            pending_space = false;
        }
        collapsed.push(ch);
    }

    collapsed.to_lowercase()
}

/// Fixed-precision rendering with trailing fractional zeros removed.
/// NaN is a missing value and normalizes like `Null`.
pub fn normalize_number(value: f64) -> String {
    if value.is_nan() {
        return String::new();
    }

    let fixed = format!("{:.*}", NUMBER_PRECISION, value);
    let trimmed = if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.')
    } else {
        fixed.as_str()
    };

    match trimmed {
        "" | "-0" => "0".to_string(),
        s => s.to_string(),
    }
}

/// ZERO WIDTH SPACE, ZERO WIDTH NON-JOINER, ZERO WIDTH JOINER, BOM.
fn is_zero_width(ch: char) -> bool {
    matches!(ch, '\u{200B}'..='\u{200D}' | '\u{FEFF}')
}

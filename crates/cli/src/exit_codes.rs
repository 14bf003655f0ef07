//! CLI Exit Code Registry
//!
//! This is the single source of truth for all `sheetcmp` exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! | Code | Meaning                                                   |
//! |------|-----------------------------------------------------------|
//! | 0    | Comparison finished, no sheet differs                     |
//! | 1    | Comparison finished, at least one sheet differs           |
//! | 2    | Usage error (bad args, missing input file or output dir)  |
//! | 3    | Configuration file could not be read, parsed or validated |
//! | 4    | An input workbook could not be read                       |
//! | 5    | A report could not be written                             |
//!
//! Like `diff(1)`, exit 1 means "files differ", not "failed".
//! A reconciliation mismatch in the summary does not change the exit code.

use sheetcmp_io::IoError;

/// No differences found.
pub const EXIT_SUCCESS: u8 = 0;

/// At least one common sheet has a difference.
pub const EXIT_DIFFS: u8 = 1;

/// Bad arguments, missing input file, missing output folder, unsupported file type.
/// Matches clap's own exit code for argument errors.
pub const EXIT_USAGE: u8 = 2;

/// Config file unreadable, malformed TOML, or failed validation.
pub const EXIT_CONFIG: u8 = 3;

/// Input workbook could not be opened or decoded.
pub const EXIT_READ: u8 = 4;

/// Report (xlsx or JSON) could not be written.
pub const EXIT_WRITE: u8 = 5;

/// Map a reader/writer error to its exit code.
pub fn io_exit_code(err: &IoError) -> u8 {
    match err {
        IoError::InputUnavailable(_) | IoError::UnsupportedFormat(_) => EXIT_USAGE,
        IoError::NoSheets(_) | IoError::Read { .. } => EXIT_READ,
        IoError::Write { .. } => EXIT_WRITE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn codes_are_distinct() {
        let codes = [EXIT_SUCCESS, EXIT_DIFFS, EXIT_USAGE, EXIT_CONFIG, EXIT_READ, EXIT_WRITE];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn io_errors_map_by_kind() {
        let p = PathBuf::from("x.xlsx");
        assert_eq!(io_exit_code(&IoError::InputUnavailable(p.clone())), EXIT_USAGE);
        assert_eq!(io_exit_code(&IoError::UnsupportedFormat(p.clone())), EXIT_USAGE);
        assert_eq!(io_exit_code(&IoError::NoSheets(p.clone())), EXIT_READ);
        assert_eq!(
            io_exit_code(&IoError::Read { path: p.clone(), message: "bad".into() }),
            EXIT_READ
        );
        assert_eq!(io_exit_code(&IoError::Write { path: p, message: "bad".into() }), EXIT_WRITE);
    }
}

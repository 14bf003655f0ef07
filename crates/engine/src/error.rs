use std::fmt;

#[derive(Debug)]
pub enum DiffError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (blank ignore column, bad output prefix, etc.).
    ConfigValidation(String),
    /// A table header names the same column twice.
    DuplicateColumn(String),
    /// A row carries a value for a column its table does not declare.
    UnknownColumn { row: usize, column: String },
    /// A positional row is wider than the table header.
    RowWidth { row: usize, expected: usize, found: usize },
    /// IO error (config file read, etc.).
    Io(String),
}

impl fmt::Display for DiffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::DuplicateColumn(column) => write!(f, "duplicate column '{column}'"),
            Self::UnknownColumn { row, column } => {
                write!(f, "row {row}: value for unknown column '{column}'")
            }
            Self::RowWidth { row, expected, found } => {
                write!(f, "row {row}: {found} values for {expected} column(s)")
            }
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for DiffError {}

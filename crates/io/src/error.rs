use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum IoError {
    /// Input file or output folder does not exist.
    InputUnavailable(PathBuf),
    /// File extension is not a supported spreadsheet format.
    UnsupportedFormat(PathBuf),
    /// Workbook contains no sheets at all.
    NoSheets(PathBuf),
    /// Opening or decoding an input failed.
    Read { path: PathBuf, message: String },
    /// Creating or saving a report failed.
    Write { path: PathBuf, message: String },
}

impl IoError {
    pub(crate) fn read(path: &std::path::Path, message: impl fmt::Display) -> Self {
        Self::Read {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }

    pub(crate) fn write(path: &std::path::Path, message: impl fmt::Display) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InputUnavailable(path) => write!(f, "{}: not found", path.display()),
            Self::UnsupportedFormat(path) => {
                write!(f, "{}: unsupported file type (expected xlsx, xlsm, xls, xlsb, ods, csv or tsv)", path.display())
            }
            Self::NoSheets(path) => write!(f, "{}: workbook contains no sheets", path.display()),
            Self::Read { path, message } => write!(f, "{}: {message}", path.display()),
            Self::Write { path, message } => write!(f, "{}: {message}", path.display()),
        }
    }
}

impl std::error::Error for IoError {}

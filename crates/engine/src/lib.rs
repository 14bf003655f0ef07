//! `sheetcmp-engine` - row-level comparison of two versions of a dataset.
//!
//! Pure engine crate: receives loaded tables, returns per-sheet diffs and a
//! reconciliation summary. No spreadsheet IO dependencies.

pub mod config;
pub mod engine;
pub mod error;
pub mod keys;
pub mod lcs;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod signature;
pub mod summary;

pub use config::CompareConfig;
pub use engine::{compare_tables, compare_workbooks, diff_sheet};
pub use error::DiffError;
pub use model::{
    Cell, ChangeCounts, ChangeKind, DiffRecord, Row, SheetDiffResult, Strategy, SummaryRow, Table,
    Verdict, Workbook, WorkbookDiff,
};
pub use normalize::normalize;

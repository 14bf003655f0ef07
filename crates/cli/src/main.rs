// sheetcmp - compare two spreadsheet files sheet by sheet

mod exit_codes;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use sheetcmp_engine::{compare_workbooks, CompareConfig, DiffError, WorkbookDiff};
use sheetcmp_io::xlsx::validation_label;
use sheetcmp_io::{json, read_workbook, report_file_name, xlsx, IoError};

use exit_codes::{io_exit_code, EXIT_CONFIG, EXIT_DIFFS, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "sheetcmp")]
#[command(about = "Compare two spreadsheet files and report added, removed and modified rows")]
#[command(long_version = long_version())]
#[command(version)]
#[command(after_help = "\
Examples:
  sheetcmp old.xlsx new.xlsx -o reports
  sheetcmp jan.csv feb.csv --no-report --json diff.json
  sheetcmp a.xlsx b.xlsx -i 'Last Modified' -i 'Row Id'
  sheetcmp a.xlsx b.xlsx -c compare.toml

Exit codes: 0 no differences, 1 differences found, 2 usage, 3 config, 4 read, 5 write")]
struct Cli {
    /// Original workbook (xlsx, xlsm, xls, xlsb, ods, csv, tsv)
    file1: PathBuf,

    /// Updated workbook
    file2: PathBuf,

    /// Folder for the xlsx report (must exist)
    #[arg(long, short = 'o', value_name = "DIR", env = "SHEETCMP_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Column to leave out of the comparison. Repeatable.
    #[arg(long = "ignore-column", short = 'i', value_name = "NAME")]
    ignore_columns: Vec<String>,

    /// TOML config file
    #[arg(long, short = 'c', value_name = "PATH", env = "SHEETCMP_CONFIG")]
    config: Option<PathBuf>,

    /// Also write the full diff as JSON
    #[arg(long, value_name = "PATH")]
    json: Option<PathBuf>,

    /// Do not write the xlsx report
    #[arg(long)]
    no_report: bool,

    /// Log strategy decisions and per-sheet details
    #[arg(long, short = 'v', conflicts_with = "quiet")]
    verbose: bool,

    /// Only print errors
    #[arg(long, short = 'q')]
    quiet: bool,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  sheetcmp-engine ", env!("CARGO_PKG_VERSION"),
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

/// `RUST_LOG` wins; otherwise warn, debug with -v, error with -q.
fn init_logging(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn config(err: DiffError) -> Self {
        Self { code: EXIT_CONFIG, message: format!("config: {err}"), hint: None }
    }

    pub fn io(err: IoError) -> Self {
        let hint = match &err {
            IoError::UnsupportedFormat(_) => {
                Some("convert the file to xlsx or csv first".to_string())
            }
            IoError::NoSheets(_) => Some("is the workbook password protected or empty?".to_string()),
            _ => None,
        };
        Self { code: io_exit_code(&err), message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// Run
// ============================================================================

fn load_config(cli: &Cli) -> Result<CompareConfig, CliError> {
    let mut config = match &cli.config {
        Some(path) => CompareConfig::from_file(path).map_err(CliError::config)?,
        None => CompareConfig::default(),
    };

    config = config.with_ignored(cli.ignore_columns.iter().cloned());
    if let Some(dir) = &cli.output_dir {
        config.output.dir = Some(dir.clone());
    }
    if let Some(json) = &cli.json {
        config.output.json = Some(json.clone());
    }

    config.validate().map_err(CliError::config)?;
    Ok(config)
}

/// Inputs and the report folder must exist before anything is read.
fn check_paths(cli: &Cli, output_dir: &Path) -> Result<(), CliError> {
    for path in [&cli.file1, &cli.file2] {
        if !path.is_file() {
            return Err(CliError::io(IoError::InputUnavailable(path.clone()))
                .with_hint("both input files must exist"));
        }
    }
    if !cli.no_report && !output_dir.is_dir() {
        return Err(CliError::usage(format!(
            "output folder {} does not exist",
            output_dir.display()
        ))
        .with_hint("create it first or pass --no-report"));
    }
    Ok(())
}

fn run(cli: Cli) -> Result<u8, CliError> {
    let config = load_config(&cli)?;
    let output_dir = config.output.dir.clone().unwrap_or_else(|| PathBuf::from("."));
    check_paths(&cli, &output_dir)?;

    let book1 = read_workbook(&cli.file1).map_err(CliError::io)?;
    let book2 = read_workbook(&cli.file2).map_err(CliError::io)?;

    let diff = compare_workbooks(&book1, &book2, &config);

    if !cli.quiet {
        print_summary(&diff);
    }

    if !cli.no_report {
        let now = chrono::Local::now().naive_local();
        let path = output_dir.join(report_file_name(&now, &config.output.prefix));
        xlsx::write_report(&path, &diff).map_err(CliError::io)?;
        if !cli.quiet {
            eprintln!("report: {}", path.display());
        }
    }

    if let Some(path) = &config.output.json {
        json::write_json_report(path, &diff).map_err(CliError::io)?;
        if !cli.quiet {
            eprintln!("json:   {}", path.display());
        }
    }

    Ok(if diff.has_differences() { EXIT_DIFFS } else { EXIT_SUCCESS })
}

fn print_summary(diff: &WorkbookDiff) {
    for line in summary_lines(diff) {
        eprintln!("{line}");
    }
}

/// Count line, then a column-aligned table of the changed sheets.
fn summary_lines(diff: &WorkbookDiff) -> Vec<String> {
    let changed = diff.summary.len();
    let mut lines = vec![format!(
        "{} sheet(s) compared, {} with differences",
        diff.sheets.len(),
        changed
    )];
    if changed == 0 {
        return lines;
    }

    let strategies: Vec<String> = diff.changed_sheets().map(|r| r.strategy.to_string()).collect();
    let width = diff
        .summary
        .iter()
        .map(|s| s.sheet.chars().count())
        .max()
        .unwrap_or(0)
        .max("sheet".len());
    let strategy_width = strategies
        .iter()
        .map(|s| s.chars().count())
        .max()
        .unwrap_or(0)
        .max("strategy".len());

    lines.push(format!(
        "{:<width$}  {:>7}  {:>7}  {:>6}  {:>7}  {:>8}  {:>6}  {:<strategy_width$}  validation",
        "sheet", "rows1", "rows2", "added", "removed", "modified", "total", "strategy",
    ));
    for (row, strategy) in diff.summary.iter().zip(&strategies) {
        lines.push(format!(
            "{:<width$}  {:>7}  {:>7}  {:>6}  {:>7}  {:>8}  {:>6}  {:<strategy_width$}  {}",
            row.sheet,
            row.rows1,
            row.rows2,
            row.added,
            row.removed,
            row.modified,
            row.total,
            strategy,
            validation_label(&row.verdict),
        ));
    }
    lines
}

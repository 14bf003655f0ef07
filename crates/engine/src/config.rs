use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::DiffError;

pub const DEFAULT_REPORT_PREFIX: &str = "excel_differences";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Per-run comparison settings. Passed explicitly to the engine; there is no
/// process-wide state.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompareConfig {
    /// Columns dropped from both tables before any signature is built.
    #[serde(default)]
    pub ignore_columns: BTreeSet<String>,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Folder for the xlsx report. Defaults to the working directory.
    #[serde(default)]
    pub dir: Option<PathBuf>,
    /// File-name part after the timestamp.
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Optional JSON report path.
    #[serde(default)]
    pub json: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: None,
            prefix: default_prefix(),
            json: None,
        }
    }
}

fn default_prefix() -> String {
    DEFAULT_REPORT_PREFIX.to_string()
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl CompareConfig {
    pub fn from_toml(input: &str) -> Result<Self, DiffError> {
        let config: CompareConfig =
            toml::from_str(input).map_err(|e| DiffError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, DiffError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| DiffError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml(&text)
    }

    /// Add ignore columns on top of those already configured.
    pub fn with_ignored<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_columns.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn validate(&self) -> Result<(), DiffError> {
        if self.ignore_columns.iter().any(|c| c.trim().is_empty()) {
            return Err(DiffError::ConfigValidation(
                "ignore_columns entries must not be blank".into(),
            ));
        }

        let prefix = &self.output.prefix;
        if prefix.trim().is_empty() {
            return Err(DiffError::ConfigValidation(
                "output.prefix must not be blank".into(),
            ));
        }
        if prefix.contains(['/', '\\']) {
            return Err(DiffError::ConfigValidation(format!(
                "output.prefix '{prefix}' must not contain path separators"
            )));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Data validation utilities.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, error};

use td_core::data::GameConfig;
use td_core::error::ConfigError;

use crate::error::ToolError;

/// A problem found in one data file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileProblem {
    /// File the problem was found in.
    pub path: PathBuf,
    /// The problem.
    pub error: ConfigError,
}

/// Outcome of validating one file or a directory of files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Number of files checked.
    pub files_checked: usize,
    /// Every problem found, grouped by file in path order.
    pub problems: Vec<FileProblem>,
}

impl ValidationReport {
    /// True if no file had a problem.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.problems.is_empty()
    }

    /// Turn a failed report into [`ToolError::Invalid`].
    ///
    /// # Errors
    ///
    /// Fails if any problem was recorded.
    pub fn into_result(self) -> Result<usize, ToolError> {
        if self.is_ok() {
            Ok(self.files_checked)
        } else {
            Err(ToolError::Invalid {
                count: self.problems.len(),
                files: self.files_checked,
            })
        }
    }
}

/// Read and parse a RON game configuration without validating it.
///
/// # Errors
///
/// [`ToolError::Io`] if the file cannot be read, [`ToolError::Config`] if
/// it does not parse.
pub fn load_config(path: &Path) -> Result<GameConfig, ToolError> {
    let text = fs::read_to_string(path).map_err(|source| ToolError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(GameConfig::from_ron_str(&text)?)
}

/// Parse and validate RON source text, returning every problem found.
///
/// A parse failure is reported as the only problem.
#[must_use]
pub fn check_source(text: &str) -> Vec<ConfigError> {
    match GameConfig::from_ron_str(text) {
        Ok(config) => config.validate(),
        Err(err) => vec![err],
    }
}

/// Validate a single RON file, or every `.ron` file in a directory.
///
/// Problems are logged and collected; only unreadable paths abort.
///
/// # Errors
///
/// [`ToolError::Io`] if a path cannot be read.
pub fn validate_path(path: &Path) -> Result<ValidationReport, ToolError> {
    let files = if path.is_dir() {
        ron_files(path)?
    } else {
        vec![path.to_path_buf()]
    };

    let mut report = ValidationReport::default();
    for file in files {
        let text = fs::read_to_string(&file).map_err(|source| ToolError::Io {
            path: file.clone(),
            source,
        })?;

        let problems = check_source(&text);
        debug!(file = %file.display(), problems = problems.len(), "Checked data file");
        for problem in problems {
            error!(file = %file.display(), "{problem}");
            report.problems.push(FileProblem {
                path: file.clone(),
                error: problem,
            });
        }
        report.files_checked += 1;
    }

    Ok(report)
}

fn ron_files(dir: &Path) -> Result<Vec<PathBuf>, ToolError> {
    let entries = fs::read_dir(dir).map_err(|source| ToolError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ToolError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "ron") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

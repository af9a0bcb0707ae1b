//! Preprocessor errors and non-fatal diagnostics

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failures that abort a split
#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error("failed to open shader \"{}\": {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read shader \"{}\": {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PreprocessError {
    /// Path of the file that could not be processed
    pub fn path(&self) -> &Path {
        match self {
            PreprocessError::Open { path, .. } | PreprocessError::Read { path, .. } => path,
        }
    }
}

/// Why an `$include` was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncludeFailure {
    /// The directive carried no path
    MissingPath,
    /// The dependency is already being resolved further up the chain
    Cycle,
    /// Splitting the dependency failed; carries the rendered error
    Unreadable(String),
}

impl fmt::Display for IncludeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IncludeFailure::MissingPath => write!(f, "no include path given"),
            IncludeFailure::Cycle => write!(f, "circular include"),
            IncludeFailure::Unreadable(reason) => write!(f, "{reason}"),
        }
    }
}

/// Something worth reporting that did not abort the split
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    IncludeFailed {
        /// Resolved dependency path
        include: PathBuf,
        /// File containing the directive
        file: PathBuf,
        /// 1-based line of the directive
        line: usize,
        reason: IncludeFailure,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::IncludeFailed { include, file, line, reason } => write!(
                f,
                "failed to include \"{}\" ({reason})\n\tshader \"{}\":{line}",
                include.display(),
                file.display(),
            ),
        }
    }
}

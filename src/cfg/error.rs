//! Error types for configuration tree operations.

use std::io;
use std::path::{Path, PathBuf};

/// Result alias for configuration tree operations.
pub type Result<T> = std::result::Result<T, CfgError>;

/// Errors raised by the configuration tree, its parser and its loaders.
#[derive(Debug, thiserror::Error)]
pub enum CfgError {
    /// Entry name is empty, padded with whitespace, or contains `/` or a
    /// character of the text format (`=`, `{`, `}`, `#`, line breaks).
    #[error("Invalid entry name '{0}'")]
    InvalidName(String),

    /// A section with this name already exists and a node was supplied for it.
    #[error("Section '{0}' already exists")]
    DuplicateSection(String),

    /// The name is bound to the other kind of entry.
    #[error("Entry '{name}' is already declared as {existing}")]
    TypeConflict {
        /// The conflicting entry name.
        name: String,
        /// What the name is currently bound to ("an option" or "a section").
        existing: &'static str,
    },

    /// `append_to_option` on a name that was never declared as an option.
    #[error("Option '{0}' has not been declared")]
    UndeclaredOption(String),

    /// Lookup of a name that is not declared.
    #[error("Key '{0}' not found")]
    KeyNotFound(String),

    /// Rename target is already taken.
    #[error("Key '{0}' already exists")]
    KeyExists(String),

    /// No comment registered for the entry.
    #[error("No comment for entry '{0}'")]
    CommentNotFound(String),

    /// Structurally invalid configuration text.
    #[error("Malformed configuration at line {line}: {reason}")]
    MalformedInput {
        /// 1-based line number.
        line: usize,
        /// What was wrong.
        reason: String,
    },

    /// A node operation failed while parsing the given line.
    #[error("line {line}: {source}")]
    AtLine {
        line: usize,
        #[source]
        source: Box<CfgError>,
    },

    /// Loading a specific file failed.
    #[error("{}: {source}", .path.display())]
    InFile {
        path: PathBuf,
        #[source]
        source: Box<CfgError>,
    },

    #[error("Cannot build a configuration tree from JSON: {0}")]
    InvalidJson(String),

    #[error("Failed to read configuration: {0}")]
    Io(#[from] io::Error),
}

impl CfgError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        CfgError::MalformedInput {
            line,
            reason: reason.into(),
        }
    }

    pub(crate) fn in_file(path: &Path, source: CfgError) -> Self {
        CfgError::InFile {
            path: path.to_path_buf(),
            source: Box::new(source),
        }
    }

    pub(crate) fn at_line(line: usize, source: CfgError) -> Self {
        CfgError::AtLine {
            line,
            source: Box::new(source),
        }
    }

    /// Line number for parse-time errors.
    pub fn line(&self) -> Option<usize> {
        match self {
            CfgError::MalformedInput { line, .. } | CfgError::AtLine { line, .. } => Some(*line),
            CfgError::InFile { source, .. } => source.line(),
            _ => None,
        }
    }
}

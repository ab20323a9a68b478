//! Error types for index building and record rewriting.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = AnnotateError> = std::result::Result<T, E>;

/// Failures that abort a run. Malformed records are never reported here; they
/// pass through the rewriter untouched.
#[derive(Debug, Error)]
pub enum AnnotateError {
    /// A required column designator in a source declaration cannot be resolved.
    #[error("invalid {role} column '{designator}' for {book}:{sheet}")]
    Config {
        role: &'static str,
        designator: String,
        book: PathBuf,
        sheet: String,
    },

    /// The spreadsheet document could not be opened, or the named sheet is
    /// missing from it.
    #[error("definition source {book} unavailable: {reason}")]
    SourceNotFound { book: PathBuf, reason: String },

    /// Opening, creating, reading or writing a record file failed.
    #[error("I/O failure on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The record stream could not be parsed or written.
    #[error("CSV failure on {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A definition value cannot be represented in the output encoding.
    #[error("cannot encode value for line {line} of {path} as {encoding}")]
    Encode {
        path: PathBuf,
        line: u64,
        encoding: &'static str,
    },
}

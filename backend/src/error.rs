//! Error types for the Stocksync reconciliation engine.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`CsvError`] - Tabular codec errors (decode, parse, serialize)
//! - [`ArchiveError`] - Zip archive errors
//! - [`InputError`] - Expected user errors (wrong or missing file)
//! - [`RecordError`] - Per-record adapter failures, always recovered locally
//! - [`ReconcileError`] - Top-level operation errors
//! - [`ServerError`] - HTTP layer errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// CSV Codec Errors
// =============================================================================

/// Errors during CSV decoding, parsing or serialization.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to decode the byte stream.
    #[error("Failed to decode content: {0}")]
    EncodingError(String),

    /// Invalid CSV format.
    #[error("Line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,

    /// Failed to write CSV output.
    #[error("Failed to write CSV: {0}")]
    WriteError(String),
}

impl From<csv::Error> for CsvError {
    fn from(e: csv::Error) -> Self {
        let line = e
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(0);
        CsvError::ParseError {
            line,
            message: e.to_string(),
        }
    }
}

// =============================================================================
// Archive Errors
// =============================================================================

/// Errors while extracting a CSV from a zip archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The archive could not be read.
    #[error("Unreadable archive '{name}': {source}")]
    Zip {
        name: String,
        #[source]
        source: zip::result::ZipError,
    },

    /// The archive has no `.csv` entry.
    #[error("Cannot find .csv in zip file '{0}'")]
    NoCsvEntry(String),

    /// Reading the entry failed.
    #[error("Archive IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// The extraction worker died.
    #[error("Archive extraction aborted: {0}")]
    Aborted(String),
}

// =============================================================================
// Input Errors (expected, user-facing)
// =============================================================================

/// Errors caused by the files a user supplied.
///
/// These are surfaced with their message only; they never indicate a defect.
#[derive(Debug, Error)]
pub enum InputError {
    /// A required input was not supplied.
    #[error("no {0} selected")]
    MissingFile(String),

    /// File extension is neither `.csv` nor `.zip`.
    #[error("Unknown file type: {0}")]
    UnsupportedFile(String),

    /// The file does not carry the columns the importer needs.
    #[error(
        "Did you pick the right file for {label}?\nCSV headers don't look right.\n\n  Expected:\n {expected:?}\n\n  Got:\n {got:?}"
    )]
    WrongHeaders {
        label: String,
        expected: Vec<String>,
        got: Vec<String>,
    },
}

// =============================================================================
// Record Errors (recovered per record)
// =============================================================================

/// Failures deriving values from a single supplier record.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RecordError {
    /// A price formula produced a non-number.
    #[error("Price is not a number for SKU {0}")]
    PriceNotANumber(String),

    /// The adapter yielded no SKU.
    #[error("No SKU found for record")]
    MissingSku,
}

// =============================================================================
// Reconciliation Errors (top-level)
// =============================================================================

/// Top-level errors returned by the reconciliation operations.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The user supplied a wrong or missing file.
    #[error(transparent)]
    Input(#[from] InputError),

    /// CSV codec error.
    #[error("CSV error in '{file}': {source}")]
    Csv {
        file: String,
        #[source]
        source: CsvError,
    },

    /// Archive error.
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// A vendor name is not in the registry.
    #[error("Unknown vendor: {0}")]
    UnknownVendor(String),

    /// The run was cancelled before it finished.
    #[error("Run cancelled")]
    Cancelled,

    /// Another run is already in progress.
    #[error("Another run is already in progress")]
    Busy,

    /// Unexpected internal failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ReconcileError {
    /// Attach the file name to a codec error.
    pub fn csv(file: impl Into<String>, source: CsvError) -> Self {
        ReconcileError::Csv {
            file: file.into(),
            source,
        }
    }

    /// Whether this error is the user's to fix (message only, no diagnostics).
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            ReconcileError::Input(_)
                | ReconcileError::UnknownVendor(_)
                | ReconcileError::Cancelled
                | ReconcileError::Busy
        )
    }

    /// Message for display: the plain message for expected errors,
    /// the full debug chain otherwise.
    pub fn user_message(&self) -> String {
        if self.is_expected() {
            self.to_string()
        } else {
            format!("{}\n\n{:#?}", self, self)
        }
    }
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Reconciliation error.
    #[error("Reconcile error: {0}")]
    Reconcile(#[from] ReconcileError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server IO error.
    #[error("Server IO error: {0}")]
    IoError(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for archive operations.
pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Result type for reconciliation operations.
pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        let input_err = InputError::MissingFile("shopify products CSV".into());
        let err: ReconcileError = input_err.into();
        assert!(err.to_string().contains("shopify products CSV"));
        assert!(err.is_expected());

        let archive_err = ArchiveError::NoCsvEntry("feed.zip".into());
        let err: ReconcileError = archive_err.into();
        assert!(!err.is_expected());
    }

    #[test]
    fn test_wrong_headers_message() {
        let err = InputError::WrongHeaders {
            label: "Blitz CSV".into(),
            expected: vec!["Sku".into()],
            got: vec!["Code".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("Blitz CSV"));
        assert!(msg.contains("\"Sku\""));
        assert!(msg.contains("\"Code\""));
    }

    #[test]
    fn test_unexpected_error_carries_detail() {
        let err = ReconcileError::csv("feed.csv", CsvError::EmptyFile);
        let msg = err.user_message();
        assert!(msg.contains("feed.csv"));
        assert!(msg.contains("EmptyFile"));
    }
}

//! Error types for the roll-forward engine
//!
//! Covers every failure mode of a roll-forward run:
//! - DOCX container operations (zip archive, missing parts)
//! - WordprocessingML parsing and serialization
//! - Roll-forward requests (fiscal year range, unsupported inputs)
//! - File I/O (reading, writing, directories)

use std::fmt;
use std::io;

/// Result type alias for roll-forward operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the roll-forward engine
#[derive(Debug)]
pub enum Error {
    /// DOCX container and XML errors
    Docx(DocxError),
    /// Request validation errors
    RollForward(RollForwardError),
    /// I/O errors
    Io(IoError),
}

/// DOCX package errors
#[derive(Debug)]
pub enum DocxError {
    /// Bytes are not a readable zip archive
    InvalidArchive(String),
    /// A required part is absent from the package
    MissingPart(String),
    /// Part content is not well-formed XML
    Xml { part: String, details: String },
    /// Part content is not valid UTF-8
    Encoding { part: String, details: String },
    /// Writing the archive back failed
    WriteFailed(String),
}

/// Roll-forward request errors
#[derive(Debug)]
pub enum RollForwardError {
    /// Target fiscal year is outside the accepted range
    InvalidFiscalYear { year: i32, min: i32, max: i32 },
    /// Input file type cannot be rolled forward
    UnsupportedInput(String),
    /// Detection pattern does not compile or lacks a year group
    InvalidPattern { pattern: String, details: String },
}

/// File I/O errors
#[derive(Debug)]
pub enum IoError {
    /// Failed to read file
    FileReadFailed { path: String, source: io::Error },
    /// Failed to write file
    FileWriteFailed { path: String, source: io::Error },
    /// Failed to create directory
    DirectoryCreateFailed { path: String, source: io::Error },
    /// Other I/O error
    Other(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Docx(e) => write!(f, "DOCX error: {}", e),
            Error::RollForward(e) => write!(f, "Roll-forward error: {}", e),
            Error::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl fmt::Display for DocxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocxError::InvalidArchive(details) => {
                write!(f, "Not a valid DOCX archive: {}", details)
            }
            DocxError::MissingPart(part) => {
                write!(f, "Package is missing required part: {}", part)
            }
            DocxError::Xml { part, details } => {
                write!(f, "Malformed XML in {}: {}", part, details)
            }
            DocxError::Encoding { part, details } => {
                write!(f, "Invalid text encoding in {}: {}", part, details)
            }
            DocxError::WriteFailed(details) => {
                write!(f, "Failed to write DOCX archive: {}", details)
            }
        }
    }
}

impl fmt::Display for RollForwardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RollForwardError::InvalidFiscalYear { year, min, max } => {
                write!(
                    f,
                    "Fiscal year {} is outside the accepted range {}-{}",
                    year, min, max
                )
            }
            RollForwardError::UnsupportedInput(path) => {
                write!(f, "Unsupported input (expected .docx or .pdf): {}", path)
            }
            RollForwardError::InvalidPattern { pattern, details } => {
                write!(f, "Invalid fiscal-year pattern '{}': {}", pattern, details)
            }
        }
    }
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoError::FileReadFailed { path, source } => {
                write!(f, "Failed to read {}: {}", path, source)
            }
            IoError::FileWriteFailed { path, source } => {
                write!(f, "Failed to write {}: {}", path, source)
            }
            IoError::DirectoryCreateFailed { path, source } => {
                write!(f, "Failed to create directory {}: {}", path, source)
            }
            IoError::Other(source) => write!(f, "{}", source),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(IoError::FileReadFailed { source, .. })
            | Error::Io(IoError::FileWriteFailed { source, .. })
            | Error::Io(IoError::DirectoryCreateFailed { source, .. })
            | Error::Io(IoError::Other(source)) => Some(source),
            _ => None,
        }
    }
}

impl std::error::Error for DocxError {}
impl std::error::Error for RollForwardError {}
impl std::error::Error for IoError {}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(IoError::Other(err))
    }
}

impl From<DocxError> for Error {
    fn from(err: DocxError) -> Self {
        Error::Docx(err)
    }
}

impl From<RollForwardError> for Error {
    fn from(err: RollForwardError) -> Self {
        Error::RollForward(err)
    }
}

impl Error {
    /// Check if the input document itself is unusable (retrying won't help)
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Docx(DocxError::InvalidArchive(_))
                | Error::Docx(DocxError::MissingPart(_))
                | Error::Docx(DocxError::Xml { .. })
                | Error::Docx(DocxError::Encoding { .. })
                | Error::RollForward(RollForwardError::UnsupportedInput(_))
        )
    }

    /// Get formatted context string for logging
    pub fn context(&self) -> String {
        match self {
            Error::Docx(e) => format!("docx: {}", e),
            Error::RollForward(e) => format!("rollforward: {}", e),
            Error::Io(e) => format!("io: {}", e),
        }
    }
}

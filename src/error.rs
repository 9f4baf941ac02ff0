//! Error types for the annotext library.

use std::io;
use thiserror::Error;

/// Result type alias for annotext operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting annotations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// The document has no outline tree. Expected for most files.
    #[error("Document doesn't include outlines (\"bookmarks\")")]
    NoOutlines,

    /// A single page could not be rendered.
    #[error("Failed to render page {page}: {message}")]
    PageRender {
        /// Page number (1-indexed)
        page: usize,
        /// Underlying failure
        message: String,
    },

    /// Outline entries pointed at pages that were never enumerated.
    #[error("{count} outline(s) left unresolved after all pages were visited: {targets}")]
    UnresolvedOutlines {
        /// Number of outlines still pending
        count: usize,
        /// Human-readable list of the pending targets
        targets: String,
    },

    /// Error while producing a report (Markdown, JSON).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

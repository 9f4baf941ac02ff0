//! PDF header sniffing.
//!
//! Files are checked before lopdf sees them so that non-PDF inputs found
//! during a directory walk fail fast with [`Error::UnknownFormat`].

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3; // e.g., "1.7"

/// Readers tolerate junk before the header; so do we, up to this offset.
const HEADER_SEARCH_LEN: usize = 1024;

/// Header information of a PDF file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfFormat {
    /// PDF version (e.g., "1.7", "2.0")
    pub version: String,
    /// Offset of `%PDF-` in the file
    pub header_offset: usize,
}

impl std::fmt::Display for PdfFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PDF {}", self.version)
    }
}

/// Detect PDF format from a file path.
///
/// # Example
/// ```no_run
/// use annotext::detect::detect_format_from_path;
///
/// let format = detect_format_from_path("paper.pdf").unwrap();
/// println!("PDF version: {}", format.version);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<PdfFormat> {
    let mut head = Vec::with_capacity(HEADER_SEARCH_LEN);
    File::open(path)?
        .take(HEADER_SEARCH_LEN as u64)
        .read_to_end(&mut head)?;
    detect_format_from_bytes(&head)
}

/// Detect PDF format from the first bytes of a file.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<PdfFormat> {
    let window = &data[..data.len().min(HEADER_SEARCH_LEN)];
    let header_offset = window
        .windows(PDF_MAGIC.len())
        .position(|w| w == PDF_MAGIC)
        .ok_or(Error::UnknownFormat)?;

    let start = header_offset + PDF_MAGIC.len();
    let version_bytes = data
        .get(start..start + VERSION_LEN)
        .ok_or(Error::UnknownFormat)?;
    let version = String::from_utf8_lossy(version_bytes).to_string();

    if !is_supported_version(&version) {
        return Err(Error::UnsupportedVersion(version));
    }

    Ok(PdfFormat {
        version,
        header_offset,
    })
}

/// PDF 1.0 through 1.7, and 2.0.
fn is_supported_version(version: &str) -> bool {
    match version.as_bytes() {
        [b'1', b'.', minor] => (b'0'..=b'7').contains(minor),
        [b'2', b'.', b'0'] => true,
        _ => false,
    }
}

/// Check if a file looks like a PDF.
pub fn is_pdf<P: AsRef<Path>>(path: P) -> bool {
    detect_format_from_path(path).is_ok()
}

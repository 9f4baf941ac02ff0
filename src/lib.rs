//! # annotext
//!
//! Extract highlights and comments from PDF files together with the
//! sentences they belong to.
//!
//! Each page is rendered once. While glyphs stream past in reading order,
//! the text under every annotation is captured, annotations and outline
//! entries are numbered in stream order, and the page text is rebuilt.
//! Reply chains are then resolved and each highlight is aligned to the
//! sentences of the page that contain it.
//!
//! ## Quick Start
//!
//! ```no_run
//! use annotext::{process_file, ExtractOptions};
//!
//! fn main() -> annotext::Result<()> {
//!     let doc = process_file("paper.pdf", &ExtractOptions::default())?;
//!
//!     for annot in doc.annotations() {
//!         if let Some(context) = &annot.context {
//!             println!("p.{}: {}", annot.page_index + 1, context);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Consolidated notes
//!
//! ```no_run
//! use std::path::Path;
//! use annotext::{batch, write_report, ExtractOptions, ReportOptions};
//!
//! let report = batch::process_dir(Path::new("papers"), &ExtractOptions::default(), |_, _| {})?;
//! write_report(Path::new("notes"), &report.documents, &ReportOptions::default())?;
//! # Ok::<(), annotext::Error>(())
//! ```

pub mod batch;
pub mod capture;
pub mod context;
pub mod detect;
pub mod diagnostics;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;
pub mod resolve;
pub mod text;

// Re-export commonly used types
pub use context::align_sentences;
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_pdf, PdfFormat};
pub use diagnostics::{DiagnosticSink, LogSink, MemorySink, Severity};
pub use error::{Error, Result};
pub use model::{Annotation, AnnotationType, Document, Outline, OutlineTarget, Page};
pub use parser::{ErrorMode, ExtractOptions, Extractor, LopdfSource, PageSelection, PdfSource};
pub use render::{render_report, write_report, JsonFormat, ReportFormat, ReportOptions};

use std::path::Path;

/// Extract the annotations of a PDF file, logging diagnostics.
///
/// # Example
///
/// ```no_run
/// use annotext::{process_file, ExtractOptions};
///
/// let doc = process_file("paper.pdf", &ExtractOptions::default()).unwrap();
/// println!("{} annotation(s)", doc.annotation_count());
/// ```
pub fn process_file<P: AsRef<Path>>(path: P, options: &ExtractOptions) -> Result<Document> {
    process_file_with_sink(path, options, &mut LogSink)
}

/// Extract the annotations of a PDF file, reporting diagnostics to `sink`.
pub fn process_file_with_sink<P: AsRef<Path>>(
    path: P,
    options: &ExtractOptions,
    sink: &mut dyn DiagnosticSink,
) -> Result<Document> {
    let path = path.as_ref();
    let format = detect_format_from_path(path)?;
    log::debug!("{}: {}", path.display(), format);

    let source = LopdfSource::load_file(path)?;
    let doc = Extractor::new(options.clone()).extract(&source, sink)?;
    Ok(doc.with_source(path))
}

/// Extract the annotations of an in-memory PDF, logging diagnostics.
///
/// # Example
///
/// ```no_run
/// use annotext::{process_bytes, ExtractOptions};
///
/// let data = std::fs::read("paper.pdf").unwrap();
/// let doc = process_bytes(&data, &ExtractOptions::default()).unwrap();
/// ```
pub fn process_bytes(data: &[u8], options: &ExtractOptions) -> Result<Document> {
    process_bytes_with_sink(data, options, &mut LogSink)
}

/// Extract the annotations of an in-memory PDF, reporting diagnostics to
/// `sink`.
pub fn process_bytes_with_sink(
    data: &[u8],
    options: &ExtractOptions,
    sink: &mut dyn DiagnosticSink,
) -> Result<Document> {
    detect_format_from_bytes(data)?;
    let source = LopdfSource::load_bytes(data)?;
    Extractor::new(options.clone()).extract(&source, sink)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_bytes_empty_data() {
        assert!(matches!(
            process_bytes(&[], &ExtractOptions::default()),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_process_bytes_unknown_magic() {
        let data = [0xFF, 0xFE, 0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        assert!(process_bytes(&data, &ExtractOptions::default()).is_err());
    }

    #[test]
    fn test_process_bytes_truncated_pdf() {
        let result = process_bytes(b"%PDF-1.7\n1 0 obj\n<<", &ExtractOptions::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_process_file_missing() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = process_file(dir.path().join("missing.pdf"), &ExtractOptions::default());
        assert!(matches!(result, Err(Error::Io(_))));
    }
}

//! PDF parsing module.
//!
//! [`PdfSource`] is the seam between the extraction pipeline and the PDF
//! library; [`LopdfSource`] is the implementation used for real files.

mod annots;
pub mod backend;
pub mod content;
mod extractor;
mod labels;
pub mod layout;
mod options;
mod outlines;

pub use backend::{LopdfSource, PageInfo, PdfDict, PdfSource, PdfValue, RawAnnotation, RawOutline};
pub use content::{ContentOp, FontMetrics, TextDecoder, TextInterpreter, TextSpan};
pub use extractor::Extractor;
pub use layout::PageLayout;
pub use options::{ErrorMode, ExtractOptions, PageSelection};

//! Document model types for annotated PDF content.
//!
//! A [`Document`] owns its [`Page`]s; each page owns the [`Annotation`]s
//! and [`Outline`]s that belong to it. Nothing here refers to the PDF
//! library: object references are plain `(number, generation)` pairs.

mod annotation;
mod document;
mod geometry;
mod outline;
mod page;

pub use annotation::{Annotation, AnnotationType};
pub use document::Document;
pub use geometry::{Point, Quad, Rect, Rgb};
pub use outline::{Outline, OutlineTarget};
pub use page::{Page, PageRef};

/// Indirect object identifier: (object number, generation number).
pub type ObjectId = (u32, u16);

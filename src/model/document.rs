//! Document-level types.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{Annotation, Outline, Page};

/// An annotated PDF document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// File the document was read from
    pub source: Option<PathBuf>,

    /// `/Title` from the document information dictionary
    pub title: Option<String>,

    /// Pages in the document
    pub pages: Vec<Page>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the file the document came from.
    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    /// Get the number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Add a page to the document.
    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Get a page by zero-based index.
    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    /// Check if the document has any pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// All annotations in page order.
    pub fn annotations(&self) -> impl Iterator<Item = &Annotation> {
        self.pages.iter().flat_map(|p| p.annotations.iter())
    }

    /// All resolved outlines in page order.
    pub fn outlines(&self) -> impl Iterator<Item = &Outline> {
        self.pages.iter().flat_map(|p| p.outlines.iter())
    }

    /// Number of annotations across all pages.
    pub fn annotation_count(&self) -> usize {
        self.pages.iter().map(|p| p.annotations.len()).sum()
    }

    /// Whether any annotation has a context sentence.
    pub fn has_context(&self) -> bool {
        self.annotations().any(|a| a.context.is_some())
    }

    /// Heading used for this document in reports: the file name without
    /// its `.pdf` extension, falling back to the info title.
    pub fn display_title(&self) -> String {
        if let Some(name) = self.source.as_deref().and_then(file_title) {
            return name;
        }
        self.title
            .clone()
            .unwrap_or_else(|| "Untitled document".to_string())
    }
}

fn file_title(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_string_lossy();
    let title = match name.len().checked_sub(4) {
        Some(cut) if name.is_char_boundary(cut) && name[cut..].eq_ignore_ascii_case(".pdf") => {
            &name[..cut]
        }
        _ => &name[..],
    };
    Some(title.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnnotationType, Rect};

    #[test]
    fn test_document_new() {
        let doc = Document::new();
        assert!(doc.is_empty());
        assert_eq!(doc.page_count(), 0);
        assert!(!doc.has_context());
    }

    #[test]
    fn test_display_title() {
        let doc = Document::new().with_source("papers/On Sentences.PDF");
        assert_eq!(doc.display_title(), "On Sentences");

        let mut doc = Document::new();
        doc.title = Some("Info Title".to_string());
        assert_eq!(doc.display_title(), "Info Title");
    }

    #[test]
    fn test_annotation_iteration() {
        let mut doc = Document::new();
        for i in 0..2 {
            let mut page = Page::new(i, (i as u32 + 1, 0), Rect::letter());
            page.annotations.push(Annotation::new(i, AnnotationType::Highlight));
            doc.add_page(page);
        }
        assert_eq!(doc.annotation_count(), 2);
        assert_eq!(
            doc.annotations().map(|a| a.page_index).collect::<Vec<_>>(),
            vec![0, 1]
        );
    }
}

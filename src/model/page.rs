//! Page-level types.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::{Annotation, ObjectId, Outline, Rect};

/// Identifies a page in diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRef {
    /// Zero-based page index
    pub index: usize,
    /// Page label, if the document defines one
    pub label: Option<String>,
}

impl std::fmt::Display for PageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.label {
            Some(label) => write!(f, "page {} (#{})", label, self.index + 1),
            None => write!(f, "page #{}", self.index + 1),
        }
    }
}

/// A single page in the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Page index (0-indexed)
    pub index: usize,

    /// Page object id
    pub object_id: ObjectId,

    /// Human-readable page label (e.g. "iv")
    pub label: Option<String>,

    /// MediaBox
    pub bbox: Rect,

    /// Fixed column count; `None` lets layout analysis decide
    pub columns: Option<usize>,

    /// Annotations in reading order once processed
    pub annotations: Vec<Annotation>,

    /// Outlines pointing into this page, in reading order once processed
    pub outlines: Vec<Outline>,

    /// Reconstructed plain text, available after rendering
    pub full_text: Option<String>,
}

impl Page {
    /// Create a new page.
    pub fn new(index: usize, object_id: ObjectId, bbox: Rect) -> Self {
        Self {
            index,
            object_id,
            label: None,
            bbox,
            columns: None,
            annotations: Vec::new(),
            outlines: Vec::new(),
            full_text: None,
        }
    }

    /// Set the page label.
    pub fn with_label(mut self, label: Option<String>) -> Self {
        self.label = label;
        self
    }

    /// Fix the column count.
    pub fn with_columns(mut self, columns: Option<usize>) -> Self {
        self.columns = columns;
        self
    }

    /// Diagnostic reference to this page.
    pub fn page_ref(&self) -> PageRef {
        PageRef {
            index: self.index,
            label: self.label.clone(),
        }
    }

    /// Whether anything on the page needs the capture pass.
    pub fn needs_render(&self) -> bool {
        !self.annotations.is_empty() || !self.outlines.is_empty()
    }

    /// Sort annotations and outlines by sequence number. Items without one
    /// keep their relative order at the end.
    pub fn sort_by_sequence(&mut self) {
        self.annotations.sort_by(|a, b| cmp_sequence(a.sequence, b.sequence));
        self.outlines.sort_by(|a, b| cmp_sequence(a.sequence, b.sequence));
    }
}

fn cmp_sequence(a: Option<u32>, b: Option<u32>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

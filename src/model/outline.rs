//! Outline (bookmark) records.

use serde::{Deserialize, Serialize};

use super::{ObjectId, Point};

/// Where an outline entry points before it is linked to a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum OutlineTarget {
    /// Indirect reference to a page object
    Object(ObjectId),
    /// Zero-based page number
    PageNumber(usize),
}

impl std::fmt::Display for OutlineTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutlineTarget::Object((num, gen)) => write!(f, "object {} {}", num, gen),
            OutlineTarget::PageNumber(n) => write!(f, "page #{}", n),
        }
    }
}

/// A single bookmark.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outline {
    /// Bookmark title
    pub title: String,

    /// Nesting level (0 = top level)
    pub level: usize,

    /// Target page as written in the file
    pub target: OutlineTarget,

    /// Target position within the page, if the destination has one
    pub position: Option<Point>,

    /// Zero-based index of the page it resolved to
    pub page_index: Option<usize>,

    /// Reading-order position on the page
    #[serde(skip)]
    pub sequence: Option<u32>,
}

impl Outline {
    /// Create an unresolved outline.
    pub fn new(title: impl Into<String>, level: usize, target: OutlineTarget) -> Self {
        Self {
            title: title.into(),
            level,
            target,
            position: None,
            page_index: None,
            sequence: None,
        }
    }

    /// Set the in-page target position.
    pub fn with_position(mut self, position: Point) -> Self {
        self.position = Some(position);
        self
    }

    /// Link the outline to a page.
    pub fn resolve(&mut self, page_index: usize) {
        self.page_index = Some(page_index);
    }

    /// Whether the outline has been linked to a page.
    pub fn is_resolved(&self) -> bool {
        self.page_index.is_some()
    }
}

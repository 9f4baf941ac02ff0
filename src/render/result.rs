//! Rendering result with statistics.

use serde::{Deserialize, Serialize};

/// Result of rendering a report, including content and statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderResult {
    /// The rendered content
    pub content: String,

    /// What went into the report
    pub stats: ReportStats,
}

impl RenderResult {
    /// Create a new render result.
    pub fn new(content: String, stats: ReportStats) -> Self {
        Self { content, stats }
    }

    /// Whether nothing was rendered.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Statistics collected while rendering a report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportStats {
    /// Documents with a section in the report
    pub document_count: u32,

    /// Documents left out for lack of context sentences
    pub skipped_documents: u32,

    /// Bullets backed by a context sentence
    pub context_count: u32,

    /// Bullets that fell back to the highlighted text
    pub highlight_only_count: u32,

    /// Comments attached to a bullet
    pub comment_count: u32,

    /// Comments with no text under them
    pub standalone_comment_count: u32,
}

impl ReportStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of bullets written.
    pub fn bullet_count(&self) -> u32 {
        self.context_count + self.highlight_only_count + self.standalone_comment_count
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &ReportStats) {
        self.document_count += other.document_count;
        self.skipped_documents += other.skipped_documents;
        self.context_count += other.context_count;
        self.highlight_only_count += other.highlight_only_count;
        self.comment_count += other.comment_count;
        self.standalone_comment_count += other.standalone_comment_count;
    }
}

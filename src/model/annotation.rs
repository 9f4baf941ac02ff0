//! Annotation records.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::{ObjectId, Point, Quad, Rect, Rgb};
use crate::text::join_wrapped_lines;

/// Annotation kinds we extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationType {
    /// Highlighted text
    Highlight,
    /// Underlined text
    Underline,
    /// Struck-out text
    StrikeOut,
    /// Squiggly-underlined text
    Squiggly,
    /// Sticky note
    Text,
    /// Free-floating text box
    FreeText,
}

impl AnnotationType {
    /// Map a PDF `/Subtype` name to a supported kind.
    pub fn from_subtype(name: &str) -> Option<Self> {
        match name {
            "Highlight" => Some(Self::Highlight),
            "Underline" => Some(Self::Underline),
            "StrikeOut" => Some(Self::StrikeOut),
            "Squiggly" => Some(Self::Squiggly),
            "Text" => Some(Self::Text),
            "FreeText" => Some(Self::FreeText),
            _ => None,
        }
    }

    /// Subtypes dropped without a warning.
    pub fn is_ignored_subtype(name: &str) -> bool {
        // Links navigate, popups only control how a parent annotation is shown
        matches!(name, "Link" | "Popup" | "Widget")
    }

    /// The PDF `/Subtype` name.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Highlight => "Highlight",
            Self::Underline => "Underline",
            Self::StrikeOut => "StrikeOut",
            Self::Squiggly => "Squiggly",
            Self::Text => "Text",
            Self::FreeText => "FreeText",
        }
    }

    /// Text markup kinds mark up rendered text and therefore capture it.
    pub fn is_text_markup(&self) -> bool {
        matches!(
            self,
            Self::Highlight | Self::Underline | Self::StrikeOut | Self::Squiggly
        )
    }
}

impl std::fmt::Display for AnnotationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.pdf_name())
    }
}

/// A user annotation on a page.
///
/// Created from the page's `/Annots` entries, then filled in by the capture
/// pass (`text`, contexts, `sequence`), by reply resolution and finally by
/// sentence alignment (`context`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annotation {
    /// Zero-based index of the owning page
    pub page_index: usize,

    /// Indirect object the annotation was read from
    pub object_id: Option<ObjectId>,

    /// Annotation kind
    pub kind: AnnotationType,

    /// `/Rect` bounds
    pub rect: Option<Rect>,

    /// `/QuadPoints` regions
    pub quads: Vec<Quad>,

    /// `/T` author
    pub author: Option<String>,

    /// Creation (or, failing that, modification) date
    pub created: Option<DateTime<FixedOffset>>,

    /// `/C` colour
    pub color: Option<Rgb>,

    /// `/Contents`: the comment typed by the author
    pub contents: Option<String>,

    /// `/NM` name
    pub name: Option<String>,

    /// `/IRT` parent reference; cleared if the parent isn't on the page
    pub in_reply_to: Option<ObjectId>,

    /// Raw `/RT` marker
    pub reply_marker: Option<String>,

    /// Member of a reply group rather than a plain reply
    pub is_group_child: bool,

    /// Direct replies to this annotation
    pub replies: Vec<ObjectId>,

    /// Annotations grouped with this one
    pub group_children: Vec<ObjectId>,

    /// Captured text under the annotation's region
    pub text: Option<String>,

    /// Page text immediately before the captured text
    pub pre_context: Option<String>,

    /// Page text immediately after the captured text
    pub post_context: Option<String>,

    /// Reading-order position on the page
    #[serde(skip)]
    pub sequence: Option<u32>,

    /// Page sentence(s) containing the captured text
    pub context: Option<String>,
}

impl Annotation {
    /// Create an annotation with no fields populated.
    pub fn new(page_index: usize, kind: AnnotationType) -> Self {
        Self {
            page_index,
            object_id: None,
            kind,
            rect: None,
            quads: Vec::new(),
            author: None,
            created: None,
            color: None,
            contents: None,
            name: None,
            in_reply_to: None,
            reply_marker: None,
            is_group_child: false,
            replies: Vec::new(),
            group_children: Vec::new(),
            text: None,
            pre_context: None,
            post_context: None,
            sequence: None,
            context: None,
        }
    }

    /// Set the source object id.
    pub fn with_object_id(mut self, id: ObjectId) -> Self {
        self.object_id = Some(id);
        self
    }

    /// Set the rectangle.
    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.rect = Some(rect);
        self
    }

    /// Set the quadrilaterals.
    pub fn with_quads(mut self, quads: Vec<Quad>) -> Self {
        self.quads = quads;
        self
    }

    /// Set the comment contents.
    pub fn with_contents(mut self, contents: impl Into<String>) -> Self {
        self.contents = Some(contents.into());
        self
    }

    /// Mark as a reply to another annotation.
    pub fn with_reply_to(mut self, parent: ObjectId, marker: Option<&str>) -> Self {
        self.in_reply_to = Some(parent);
        self.reply_marker = marker.map(String::from);
        self
    }

    /// Whether text under this annotation is captured during rendering.
    ///
    /// Quads always define a capture region; a bare `/Rect` only does for
    /// text markup kinds. Sticky notes and text boxes never capture.
    pub fn has_region(&self) -> bool {
        !self.quads.is_empty() || (self.kind.is_text_markup() && self.rect.is_some())
    }

    /// Whether `p` falls inside the capture region.
    pub fn region_contains(&self, p: Point) -> bool {
        if !self.quads.is_empty() {
            return self.quads.iter().any(|q| q.contains(p));
        }
        self.kind.is_text_markup() && self.rect.map_or(false, |r| r.contains(p))
    }

    /// Reading-order anchor for annotations that don't capture text.
    pub fn anchor(&self) -> Option<Point> {
        if self.has_region() {
            return None;
        }
        self.rect.map(|r| r.top_left())
    }

    /// Captured text with line wraps joined, or `None` if nothing was captured.
    pub fn highlighted_text(&self) -> Option<String> {
        let text = self.text.as_deref()?;
        let joined = join_wrapped_lines(text);
        let trimmed = joined.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    /// A comment with no text under it.
    pub fn is_standalone_comment(&self) -> bool {
        self.highlighted_text().is_none()
            && self.contents.as_deref().is_some_and(|c| !c.trim().is_empty())
    }

    /// Whether this annotation replies to another one.
    pub fn is_reply(&self) -> bool {
        self.in_reply_to.is_some()
    }
}

//! Consolidated Markdown notes.
//!
//! Each document becomes a `# {title}` section with one bullet per
//! annotation, in page and reading order, closed by a `---` rule.

use crate::model::{Annotation, Document};

use super::{RenderResult, ReportOptions, ReportStats};

/// Render several documents into one report.
pub fn to_markdown(docs: &[Document], options: &ReportOptions) -> String {
    MarkdownRenderer::new(options.clone()).render(docs).content
}

/// Markdown report renderer.
pub struct MarkdownRenderer {
    options: ReportOptions,
    stats: ReportStats,
}

/// What an annotation contributes to the report.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Entry {
    /// A comment with no text under it
    Standalone { contents: String },
    /// A sentence (or, lacking one, the highlighted text) with an optional
    /// comment
    Bullet {
        text: String,
        has_context: bool,
        comment: Option<String>,
        highlight: Option<String>,
    },
}

impl Entry {
    fn from_annotation(annot: &Annotation) -> Option<Entry> {
        let contents = annot
            .contents
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(String::from);
        let highlight = annot.highlighted_text();

        let (text, has_context) = match (&annot.context, &highlight) {
            (Some(context), _) => (context.clone(), true),
            (None, Some(highlight)) => (highlight.clone(), false),
            (None, None) => {
                return contents.map(|contents| Entry::Standalone { contents });
            }
        };

        Some(Entry::Bullet {
            text,
            has_context,
            comment: contents,
            highlight,
        })
    }
}

impl MarkdownRenderer {
    /// Create a new Markdown renderer.
    pub fn new(options: ReportOptions) -> Self {
        Self {
            options,
            stats: ReportStats::new(),
        }
    }

    /// Render documents, skipping those without context when configured to.
    pub fn render(mut self, docs: &[Document]) -> RenderResult {
        let mut output = String::new();
        for doc in docs {
            if self.options.skip_without_context && !doc.has_context() {
                log::info!("No context sentences found in {}", doc.display_title());
                self.stats.skipped_documents += 1;
                continue;
            }
            self.render_document(&mut output, doc);
        }
        RenderResult::new(output, self.stats)
    }

    fn render_document(&mut self, output: &mut String, doc: &Document) {
        self.stats.document_count += 1;
        output.push_str(&format!("# {}\n\n", doc.display_title()));

        for annot in doc.annotations() {
            match Entry::from_annotation(annot) {
                Some(entry) => self.render_entry(output, entry),
                None => log::debug!("Annotation on page {} has nothing to report", annot.page_index + 1),
            }
        }

        output.push_str("---\n\n");
    }

    fn render_entry(&mut self, output: &mut String, entry: Entry) {
        match entry {
            Entry::Standalone { contents } => {
                self.stats.standalone_comment_count += 1;
                output.push_str(&format!(
                    "\n\n- > *standalone comment:* {}\n\n",
                    quote_continuation(&contents, "  > ")
                ));
            }
            Entry::Bullet {
                text,
                has_context,
                comment,
                highlight,
            } => {
                if has_context {
                    self.stats.context_count += 1;
                } else {
                    self.stats.highlight_only_count += 1;
                }

                let Some(comment) = comment else {
                    output.push_str(&format!("- {}\n", text));
                    return;
                };
                self.stats.comment_count += 1;

                output.push_str(&format!(
                    "- {}\n\n\t> *comment:* {}\n",
                    text,
                    quote_continuation(&comment, "\t> ")
                ));
                if self.options.include_highlight_text {
                    if let Some(highlight) = highlight {
                        output.push_str(&format!("\t>\n\t> *highlight_text:* {}\n", highlight));
                    }
                }
                output.push('\n');
            }
        }
    }
}

/// Keep a multi-line comment inside its blockquote.
fn quote_continuation(text: &str, prefix: &str) -> String {
    text.lines().collect::<Vec<_>>().join(&format!("\n{}", prefix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnnotationType, Page, Rect};

    fn highlight(text: &str, context: Option<&str>, contents: Option<&str>) -> Annotation {
        let mut annot = Annotation::new(0, AnnotationType::Highlight);
        annot.text = Some(text.to_string());
        annot.context = context.map(String::from);
        annot.contents = contents.map(String::from);
        annot
    }

    fn document(name: &str, annotations: Vec<Annotation>) -> Document {
        let mut page = Page::new(0, (1, 0), Rect::letter());
        page.annotations = annotations;
        let mut doc = Document::new().with_source(name);
        doc.add_page(page);
        doc
    }

    #[test]
    fn test_context_bullet() {
        let doc = document(
            "dir/paper.pdf",
            vec![highlight("was happy", Some("It was happy."), None)],
        );
        let md = to_markdown(&[doc], &ReportOptions::default());
        assert_eq!(md, "# paper\n\n- It was happy.\n---\n\n");
    }

    #[test]
    fn test_comment_block() {
        let doc = document(
            "paper.pdf",
            vec![highlight("was happy", Some("It was happy."), Some("Why?"))],
        );
        let md = to_markdown(&[doc], &ReportOptions::default());
        assert_eq!(
            md,
            "# paper\n\n- It was happy.\n\n\t> *comment:* Why?\n\t>\n\t> *highlight_text:* was happy\n\n---\n\n"
        );

        let without = ReportOptions::default().with_highlight_text(false);
        let doc = document(
            "paper.pdf",
            vec![highlight("was happy", Some("It was happy."), Some("Why?"))],
        );
        assert!(!to_markdown(&[doc], &without).contains("highlight_text"));
    }

    #[test]
    fn test_standalone_comment_and_fallback() {
        let mut note = Annotation::new(0, AnnotationType::Text);
        note.contents = Some("Remember this".to_string());
        let empty = Annotation::new(0, AnnotationType::Text);
        let doc = document(
            "paper.pdf",
            vec![
                highlight("orphan words", None, None),
                note,
                empty,
                highlight("x", Some("Has x."), None),
            ],
        );

        let result = MarkdownRenderer::new(ReportOptions::default()).render(&[doc]);
        assert!(result.content.contains("- orphan words\n"));
        assert!(result
            .content
            .contains("\n\n- > *standalone comment:* Remember this\n\n"));
        assert_eq!(result.stats.bullet_count(), 3);
        assert_eq!(result.stats.highlight_only_count, 1);
        assert_eq!(result.stats.standalone_comment_count, 1);
    }

    #[test]
    fn test_documents_without_context_are_skipped() {
        let bare = document("bare.pdf", vec![highlight("words", None, None)]);
        let rich = document("rich.pdf", vec![highlight("x", Some("Has x."), None)]);
        let docs = [bare, rich];

        let result = MarkdownRenderer::new(ReportOptions::default()).render(&docs);
        assert!(!result.content.contains("# bare"));
        assert!(result.content.contains("# rich"));
        assert_eq!(result.stats.skipped_documents, 1);

        let keep_all = ReportOptions::default().with_skip_without_context(false);
        assert!(to_markdown(&docs, &keep_all).contains("# bare"));
    }

    #[test]
    fn test_multiline_comment_stays_quoted() {
        let doc = document(
            "paper.pdf",
            vec![highlight("x", Some("Has x."), Some("line one\nline two"))],
        );
        let md = to_markdown(&[doc], &ReportOptions::default());
        assert!(md.contains("\t> *comment:* line one\n\t> line two\n"));
    }
}

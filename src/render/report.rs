//! Writing the consolidated report to disk.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::model::Document;

use super::{to_json, MarkdownRenderer, RenderResult, ReportFormat, ReportOptions, ReportStats};

/// Render documents in the configured format.
pub fn render_report(docs: &[Document], options: &ReportOptions) -> Result<RenderResult> {
    match options.format {
        ReportFormat::Markdown => Ok(MarkdownRenderer::new(options.clone()).render(docs)),
        ReportFormat::Json => {
            let kept: Vec<&Document> = docs
                .iter()
                .filter(|d| !options.skip_without_context || d.has_context())
                .collect();
            let stats = ReportStats {
                document_count: kept.len() as u32,
                skipped_documents: (docs.len() - kept.len()) as u32,
                ..Default::default()
            };
            Ok(RenderResult::new(to_json(&kept, options.json_format)?, stats))
        }
    }
}

/// Render documents and write the report into `output_dir`, creating the
/// directory if needed. Nothing is written when no document qualifies.
///
/// Returns the report path, or `None` when nothing was written.
pub fn write_report(
    output_dir: &Path,
    docs: &[Document],
    options: &ReportOptions,
) -> Result<(Option<PathBuf>, ReportStats)> {
    let result = render_report(docs, options)?;
    if result.stats.document_count == 0 {
        log::info!("No document has context sentences, no report written");
        return Ok((None, result.stats));
    }

    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(&options.file_name);
    fs::write(&path, result.content.as_bytes())?;
    log::info!(
        "Wrote {} document(s) to {}",
        result.stats.document_count,
        path.display()
    );
    Ok((Some(path), result.stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Annotation, AnnotationType, Page, Rect};
    use tempfile::TempDir;

    fn document(name: &str, context: Option<&str>) -> Document {
        let mut annot = Annotation::new(0, AnnotationType::Highlight);
        annot.text = Some("words".to_string());
        annot.context = context.map(String::from);
        let mut page = Page::new(0, (1, 0), Rect::letter());
        page.annotations.push(annot);
        let mut doc = Document::new().with_source(name);
        doc.add_page(page);
        doc
    }

    #[test]
    fn test_write_markdown_report() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("notes");
        let docs = [document("a.pdf", Some("Some words here."))];

        let (path, stats) = write_report(&out, &docs, &ReportOptions::default()).unwrap();
        let path = path.unwrap();
        assert_eq!(path, out.join("consolidated_notes.md"));
        assert_eq!(stats.document_count, 1);
        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.starts_with("# a\n\n- Some words here.\n"));
    }

    #[test]
    fn test_nothing_written_without_context() {
        let dir = TempDir::new().unwrap();
        let docs = [document("a.pdf", None)];

        let (path, stats) = write_report(dir.path(), &docs, &ReportOptions::default()).unwrap();
        assert!(path.is_none());
        assert_eq!(stats.skipped_documents, 1);
        assert!(!dir.path().join("consolidated_notes.md").exists());
    }

    #[test]
    fn test_json_report() {
        let docs = [document("a.pdf", Some("Ctx.")), document("b.pdf", None)];
        let options = ReportOptions::default().with_format(ReportFormat::Json);
        let result = render_report(&docs, &options).unwrap();

        let parsed: Vec<Document> = serde_json::from_str(&result.content).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(result.stats.skipped_documents, 1);
    }
}

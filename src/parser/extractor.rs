//! Per-document extraction pipeline.
//!
//! Outlines are read and filed first. Pages are then visited in document
//! order: each one drains the outlines waiting for it, builds its
//! annotations, and is rendered once through a [`PageCapture`] when it has
//! anything to capture. Reply links and context sentences are resolved
//! before moving on to the next page.

use crate::capture::PageCapture;
use crate::context::align_page;
use crate::diagnostics::DiagnosticSink;
use crate::error::{Error, Result};
use crate::model::{Annotation, Document, Outline, Page};
use crate::resolve::{object_index, resolve_replies, OutlineLocator};

use super::backend::{PageInfo, PdfSource};
use super::options::{ErrorMode, ExtractOptions};

/// Extracts annotated documents from a [`PdfSource`].
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    options: ExtractOptions,
}

impl Extractor {
    /// Create an extractor.
    pub fn new(options: ExtractOptions) -> Self {
        Self { options }
    }

    /// The options in use.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Run the whole pipeline over one document.
    pub fn extract(
        &self,
        source: &dyn PdfSource,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<Document> {
        let mut document = Document::new();
        document.title = source.title();

        let mut locator = self.load_outlines(source, sink);
        let pages = source.pages()?;
        log::debug!(
            "Extracting {} page(s), {} outline(s) pending",
            pages.len(),
            locator.pending_count()
        );

        for info in &pages {
            // Unselected pages still claim their outlines
            let outlines = locator.take_for_page(info.object_id, info.index);
            if !self.options.pages.includes(info.index as u32 + 1) {
                continue;
            }
            document.add_page(self.process_page(source, info, outlines, sink)?);
        }

        locator.finish()?;
        Ok(document)
    }

    fn load_outlines(&self, source: &dyn PdfSource, sink: &mut dyn DiagnosticSink) -> OutlineLocator {
        let mut locator = OutlineLocator::new();
        match source.outlines() {
            Ok(entries) => {
                for entry in entries {
                    let Some(target) = entry.target else {
                        sink.warn(
                            None,
                            &format!(
                                "outline \"{}\" has no resolvable destination, skipped",
                                entry.title
                            ),
                        );
                        continue;
                    };
                    let mut outline = Outline::new(entry.title, entry.level, target);
                    outline.position = entry.position;
                    locator.file(outline);
                }
            }
            Err(Error::NoOutlines) => sink.info(None, &Error::NoOutlines.to_string()),
            Err(e) => sink.warn(None, &format!("failed to read outlines: {}", e)),
        }
        locator
    }

    fn process_page(
        &self,
        source: &dyn PdfSource,
        info: &PageInfo,
        outlines: Vec<Outline>,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<Page> {
        let mut page = Page::new(info.index, info.object_id, info.bbox)
            .with_label(info.label.clone())
            .with_columns(self.options.columns_per_page);
        page.outlines = outlines;

        let page_ref = page.page_ref();
        page.annotations = info
            .annotations
            .iter()
            .filter_map(|raw| Annotation::from_raw(info.index, raw, &page_ref, sink))
            .collect();

        if !page.needs_render() {
            return Ok(page);
        }

        let columns = page.columns;
        let rendered = {
            let mut capture = PageCapture::new(&mut page, self.options.context_chars);
            source.render_page(info, columns, &mut capture)
        };

        if let Err(e) = rendered {
            if self.options.error_mode == ErrorMode::Strict {
                return Err(Error::PageRender {
                    page: info.index + 1,
                    message: e.to_string(),
                });
            }
            sink.warn(
                Some(&page_ref),
                &format!("failed to render, continuing without its text: {}", e),
            );
            discard_capture(&mut page);
        }

        let ids = object_index(&page.annotations);
        resolve_replies(&mut page.annotations, &ids, &page_ref, sink);

        if let Some(text) = page.full_text.take() {
            align_page(&text, &mut page.annotations);
            page.full_text = Some(text);
        }

        page.sort_by_sequence();
        Ok(page)
    }
}

/// Drop whatever a failed render left behind.
fn discard_capture(page: &mut Page) {
    page.full_text = None;
    for annot in &mut page.annotations {
        annot.text = None;
        annot.pre_context = None;
        annot.post_context = None;
        annot.sequence = None;
    }
    for outline in &mut page.outlines {
        outline.sequence = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{Column, Glyph, RenderSink};
    use crate::diagnostics::MemorySink;
    use crate::model::{OutlineTarget, Rect};
    use crate::parser::backend::{PdfValue, RawAnnotation, RawOutline};

    /// One line of text per page, highlighted in full when the page has
    /// a highlight.
    struct ScriptedSource {
        lines: Vec<&'static str>,
        outlines: Option<Vec<RawOutline>>,
        broken_page: Option<usize>,
    }

    impl ScriptedSource {
        fn new(lines: Vec<&'static str>) -> Self {
            Self {
                lines,
                outlines: None,
                broken_page: None,
            }
        }
    }

    fn highlight(y0: f32, y1: f32) -> RawAnnotation {
        let mut annot = RawAnnotation {
            object_id: Some((100, 0)),
            ..Default::default()
        };
        annot
            .fields
            .insert("Subtype".to_string(), PdfValue::Name(b"Highlight".to_vec()));
        annot.fields.insert(
            "Rect".to_string(),
            PdfValue::Array(vec![
                PdfValue::Real(0.0),
                PdfValue::Real(y0),
                PdfValue::Real(600.0),
                PdfValue::Real(y1),
            ]),
        );
        annot
    }

    impl PdfSource for ScriptedSource {
        fn pages(&self) -> Result<Vec<PageInfo>> {
            Ok(self
                .lines
                .iter()
                .enumerate()
                .map(|(index, _)| PageInfo {
                    index,
                    object_id: (index as u32 + 1, 0),
                    label: None,
                    bbox: Rect::letter(),
                    annotations: vec![highlight(695.0, 712.0)],
                })
                .collect())
        }

        fn outlines(&self) -> Result<Vec<RawOutline>> {
            self.outlines.clone().ok_or(Error::NoOutlines)
        }

        fn render_page(
            &self,
            page: &PageInfo,
            _columns: Option<usize>,
            sink: &mut dyn RenderSink,
        ) -> Result<()> {
            if self.broken_page == Some(page.index) {
                return Err(Error::PdfParse("bad content".to_string()));
            }
            sink.begin_page(&[Column::full_width(0.0, 612.0)]);
            sink.begin_block();
            sink.begin_line();
            for (i, ch) in self.lines[page.index].chars().enumerate() {
                let x = 72.0 + 6.0 * i as f32;
                sink.glyph(&Glyph {
                    ch,
                    bbox: Rect::new(x, 698.0, x + 6.0, 708.0),
                    column: 0,
                    baseline: 700.0,
                });
            }
            sink.end_line();
            sink.end_block();
            sink.end_page();
            Ok(())
        }
    }

    #[test]
    fn test_extract_highlight_context() {
        let source = ScriptedSource::new(vec!["The cat sat. It was happy."]);
        let mut sink = MemorySink::new();
        let doc = Extractor::default().extract(&source, &mut sink).unwrap();

        let annot = &doc.pages[0].annotations[0];
        assert_eq!(annot.text.as_deref(), Some("The cat sat. It was happy."));
        assert_eq!(annot.context.as_deref(), Some("The cat sat. It was happy."));
        assert_eq!(annot.sequence, Some(0));
        // Missing outline tree is informational only
        assert_eq!(sink.warning_count(), 0);
        assert_eq!(sink.entries.len(), 1);
    }

    #[test]
    fn test_outlines_resolve_across_pages() {
        let mut source = ScriptedSource::new(vec!["One.", "Two."]);
        source.outlines = Some(vec![
            RawOutline {
                title: "Second".to_string(),
                level: 0,
                target: Some(OutlineTarget::Object((2, 0))),
                position: None,
            },
            RawOutline {
                title: "Broken".to_string(),
                level: 0,
                target: None,
                position: None,
            },
        ]);
        let mut sink = MemorySink::new();
        let doc = Extractor::default().extract(&source, &mut sink).unwrap();

        assert!(doc.pages[0].outlines.is_empty());
        assert_eq!(doc.pages[1].outlines[0].title, "Second");
        assert_eq!(doc.pages[1].outlines[0].page_index, Some(1));
        assert_eq!(sink.warning_count(), 1);
    }

    #[test]
    fn test_unresolved_outline_is_fatal() {
        let mut source = ScriptedSource::new(vec!["Only."]);
        source.outlines = Some(vec![RawOutline {
            title: "Ghost".to_string(),
            level: 0,
            target: Some(OutlineTarget::PageNumber(5)),
            position: None,
        }]);
        let result = Extractor::default().extract(&source, &mut MemorySink::new());
        assert!(matches!(
            result,
            Err(Error::UnresolvedOutlines { count: 1, .. })
        ));
    }

    #[test]
    fn test_render_failure_modes() {
        let mut source = ScriptedSource::new(vec!["Fine.", "Broken."]);
        source.broken_page = Some(1);

        let mut sink = MemorySink::new();
        let doc = Extractor::default().extract(&source, &mut sink).unwrap();
        assert_eq!(doc.pages.len(), 2);
        assert!(doc.pages[1].full_text.is_none());
        assert!(doc.pages[1].annotations[0].text.is_none());
        assert_eq!(sink.warning_count(), 1);

        let strict = Extractor::new(ExtractOptions::new().strict());
        assert!(matches!(
            strict.extract(&source, &mut MemorySink::new()),
            Err(Error::PageRender { page: 2, .. })
        ));
    }

    #[test]
    fn test_page_selection_keeps_outline_resolution() {
        let mut source = ScriptedSource::new(vec!["One.", "Two."]);
        source.outlines = Some(vec![RawOutline {
            title: "First".to_string(),
            level: 0,
            target: Some(OutlineTarget::PageNumber(0)),
            position: None,
        }]);
        let options = ExtractOptions::new().with_pages(crate::parser::PageSelection::Pages(vec![2]));
        let doc = Extractor::new(options)
            .extract(&source, &mut MemorySink::new())
            .unwrap();

        assert_eq!(doc.pages.len(), 1);
        assert_eq!(doc.pages[0].index, 1);
    }
}

//! Single-pass capture of a page's glyph stream.
//!
//! [`PageCapture`] is the [`RenderSink`] handed to the renderer for one page.
//! It drives three consumers off the same events:
//!
//! - [`TextTracker`] records every character and builds the page text
//! - [`RegionMatcher`] collects the text under each annotation
//! - [`OutlineSequencer`] numbers positioned outlines and notes
//!
//! All sequence numbers come from one [`SequenceCounter`], so they are
//! unique on the page and follow the stream.

mod matcher;
mod sequencer;
mod sink;
mod tracker;

pub use matcher::RegionMatcher;
pub use sequencer::{OutlineSequencer, SequenceCounter};
pub use sink::{column_for, Column, Glyph, ReadingKey, RenderSink};
pub use tracker::TextTracker;

use crate::model::Page;

/// Default number of characters kept around captured text.
pub const DEFAULT_CONTEXT_CHARS: usize = 256;

/// Captures one page: text, annotation regions and sequence numbers.
pub struct PageCapture<'a> {
    page: &'a mut Page,
    tracker: TextTracker,
    matcher: RegionMatcher,
    sequencer: OutlineSequencer,
    counter: SequenceCounter,
}

impl<'a> PageCapture<'a> {
    /// Start capturing into `page`.
    pub fn new(page: &'a mut Page, context_chars: usize) -> Self {
        let matcher = RegionMatcher::new(&page.annotations, context_chars);
        Self {
            page,
            tracker: TextTracker::new(),
            matcher,
            sequencer: OutlineSequencer::default(),
            counter: SequenceCounter::default(),
        }
    }
}

impl RenderSink for PageCapture<'_> {
    fn begin_page(&mut self, columns: &[Column]) {
        self.tracker.reset();
        self.sequencer.begin_page(
            columns,
            &mut self.page.outlines,
            &self.page.annotations,
            &mut self.counter,
        );
        log::debug!(
            "Capturing {}: {} region(s), {} column(s)",
            self.page.page_ref(),
            self.matcher.region_count(),
            columns.len()
        );
    }

    fn begin_block(&mut self) {
        self.tracker.begin_block();
    }

    fn begin_line(&mut self) {
        self.tracker.begin_line();
    }

    fn glyph(&mut self, glyph: &Glyph) {
        let index = self.tracker.push(glyph.ch);
        self.sequencer.on_glyph(
            glyph,
            &mut self.page.outlines,
            &mut self.page.annotations,
            &mut self.counter,
        );
        self.matcher.on_glyph(
            &mut self.page.annotations,
            &self.tracker,
            glyph,
            index,
            &mut self.counter,
        );
        self.matcher.drain_ready(&mut self.page.annotations, &self.tracker);
    }

    fn end_line(&mut self) {
        self.tracker.end_line();
        self.matcher.drain_ready(&mut self.page.annotations, &self.tracker);
    }

    fn end_block(&mut self) {
        self.tracker.end_block();
    }

    fn end_page(&mut self) {
        self.matcher.finish(&mut self.page.annotations, &self.tracker);
        self.sequencer.finish(
            &mut self.page.outlines,
            &mut self.page.annotations,
            &mut self.counter,
        );
        self.page.full_text = Some(self.tracker.finish());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Annotation, AnnotationType, Outline, OutlineTarget, Point, Rect};

    /// Emits `lines` as one block in a single column, 6pt per character.
    fn render(sink: &mut dyn RenderSink, lines: &[(&str, f32)]) {
        sink.begin_page(&[Column::full_width(0.0, 612.0)]);
        sink.begin_block();
        for (text, y) in lines {
            sink.begin_line();
            for (i, ch) in text.chars().enumerate() {
                let x = 72.0 + i as f32 * 6.0;
                sink.glyph(&Glyph {
                    ch,
                    bbox: Rect::new(x, *y - 2.0, x + 6.0, *y + 8.0),
                    column: 0,
                    baseline: *y,
                });
            }
            sink.end_line();
        }
        sink.end_block();
        sink.end_page();
    }

    #[test]
    fn test_page_capture_end_to_end() {
        let mut page = Page::new(0, (3, 0), Rect::letter());
        page.annotations.push(
            Annotation::new(0, AnnotationType::Highlight)
                .with_rect(Rect::new(70.0, 645.0, 200.0, 660.0)),
        );
        page.annotations.push(
            Annotation::new(0, AnnotationType::Text)
                .with_rect(Rect::new(500.0, 690.0, 520.0, 710.0))
                .with_contents("note"),
        );
        page.outlines.push(Outline::new("Start", 0, OutlineTarget::Object((3, 0))));

        {
            let mut capture = PageCapture::new(&mut page, 16);
            render(
                &mut capture,
                &[("The cat sat.", 700.0), ("It was happy.", 650.0)],
            );
        }

        assert_eq!(
            page.full_text.as_deref(),
            Some("The cat sat.\nIt was happy.")
        );
        assert_eq!(page.annotations[0].text.as_deref(), Some("It was happy."));
        assert_eq!(page.annotations[0].pre_context.as_deref(), Some("The cat sat. "));

        // Outline without position, note at the top line, then the highlight
        assert_eq!(page.outlines[0].sequence, Some(0));
        assert_eq!(page.annotations[1].sequence, Some(1));
        assert_eq!(page.annotations[0].sequence, Some(2));
    }

    #[test]
    fn test_positioned_outline_between_lines() {
        let mut page = Page::new(0, (3, 0), Rect::letter());
        page.outlines.push(
            Outline::new("Section", 1, OutlineTarget::PageNumber(0))
                .with_position(Point::new(72.0, 660.0)),
        );
        page.annotations.push(
            Annotation::new(0, AnnotationType::Highlight)
                .with_rect(Rect::new(70.0, 695.0, 200.0, 710.0)),
        );

        {
            let mut capture = PageCapture::new(&mut page, 16);
            render(&mut capture, &[("first", 700.0), ("second", 650.0)]);
        }

        assert_eq!(page.annotations[0].sequence, Some(0));
        assert_eq!(page.outlines[0].sequence, Some(1));
    }
}

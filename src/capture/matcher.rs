//! Assigns rendered glyphs to the annotations whose region covers them.

use super::sequencer::SequenceCounter;
use super::sink::Glyph;
use super::tracker::TextTracker;
use crate::model::Annotation;
use crate::text::join_wrapped_lines;

/// Waiting for enough characters to fill an annotation's post-context.
#[derive(Debug, Clone, Copy)]
struct Subscriber {
    annotation: usize,
    from: usize,
}

/// Tests glyphs against annotation regions and accumulates captured text.
#[derive(Debug)]
pub struct RegionMatcher {
    context_chars: usize,
    /// Indices of annotations with a capture region
    regions: Vec<usize>,
    /// Line number of each annotation's most recent hit
    last_line: Vec<Option<usize>>,
    subscribers: Vec<Subscriber>,
}

impl RegionMatcher {
    /// Prepare matching for one page's annotations.
    pub fn new(annotations: &[Annotation], context_chars: usize) -> Self {
        let regions = annotations
            .iter()
            .enumerate()
            .filter(|(_, a)| a.has_region())
            .map(|(i, _)| i)
            .collect();
        Self {
            context_chars,
            regions,
            last_line: vec![None; annotations.len()],
            subscribers: Vec::new(),
        }
    }

    /// Number of annotations being matched.
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Test a glyph already recorded at `index` against every region.
    pub fn on_glyph(
        &mut self,
        annotations: &mut [Annotation],
        tracker: &TextTracker,
        glyph: &Glyph,
        index: usize,
        counter: &mut SequenceCounter,
    ) {
        let center = glyph.center();
        let line = tracker.line_number();

        for &i in &self.regions {
            let annot = &mut annotations[i];
            if !annot.region_contains(center) {
                continue;
            }

            match annot.text.as_mut() {
                None => {
                    annot.sequence = Some(counter.issue());
                    annot.pre_context = context(tracker.last(self.context_chars, index));
                    annot.text = Some(glyph.ch.to_string());
                }
                Some(text) => {
                    if self.last_line[i].is_some_and(|prev| prev != line) {
                        text.push('\n');
                    }
                    text.push(glyph.ch);
                }
            }
            self.last_line[i] = Some(line);

            self.subscribers.retain(|s| s.annotation != i);
            self.subscribers.push(Subscriber {
                annotation: i,
                from: index + 1,
            });
        }
    }

    /// Fill post-context for subscribers that have seen enough characters.
    pub fn drain_ready(&mut self, annotations: &mut [Annotation], tracker: &TextTracker) {
        let position = tracker.position();
        let wanted = self.context_chars;
        self.subscribers.retain(|s| {
            if position - s.from < wanted {
                return true;
            }
            annotations[s.annotation].post_context =
                context(tracker.slice(s.from, s.from + wanted));
            false
        });
    }

    /// Give remaining subscribers whatever followed them on the page.
    pub fn finish(&mut self, annotations: &mut [Annotation], tracker: &TextTracker) {
        for s in self.subscribers.drain(..) {
            annotations[s.annotation].post_context =
                context(tracker.slice(s.from, s.from + self.context_chars));
        }
    }
}

fn context(raw: String) -> Option<String> {
    let joined = join_wrapped_lines(&raw);
    (!joined.trim().is_empty()).then_some(joined)
}

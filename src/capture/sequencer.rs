//! Reading-order sequence numbers for items that sit at a position on the
//! page rather than under text.

use super::sink::{column_for, Column, Glyph, ReadingKey};
use crate::model::{Annotation, Outline};

/// The single per-page source of sequence numbers.
#[derive(Debug, Default)]
pub struct SequenceCounter {
    next: u32,
}

impl SequenceCounter {
    /// Take the next number.
    pub fn issue(&mut self) -> u32 {
        let n = self.next;
        self.next += 1;
        n
    }

    /// Numbers handed out so far.
    pub fn issued(&self) -> u32 {
        self.next
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarkerItem {
    Outline(usize),
    Annotation(usize),
}

#[derive(Debug, Clone, Copy)]
struct Marker {
    key: ReadingKey,
    item: MarkerItem,
}

/// Numbers outlines and region-less annotations as the glyph stream
/// passes their position.
#[derive(Debug, Default)]
pub struct OutlineSequencer {
    markers: Vec<Marker>,
    next: usize,
}

impl OutlineSequencer {
    /// Register the page's position markers.
    ///
    /// Outlines that have no in-page position are numbered immediately, so
    /// they come before anything else on the page.
    pub fn begin_page(
        &mut self,
        columns: &[Column],
        outlines: &mut [Outline],
        annotations: &[Annotation],
        counter: &mut SequenceCounter,
    ) {
        self.markers.clear();
        self.next = 0;

        for (i, outline) in outlines.iter_mut().enumerate() {
            match outline.position {
                Some(p) => self.markers.push(Marker {
                    key: ReadingKey::new(column_for(columns, p.x), p),
                    item: MarkerItem::Outline(i),
                }),
                None => outline.sequence = Some(counter.issue()),
            }
        }

        for (i, annot) in annotations.iter().enumerate() {
            if let Some(p) = annot.anchor() {
                self.markers.push(Marker {
                    key: ReadingKey::new(column_for(columns, p.x), p),
                    item: MarkerItem::Annotation(i),
                });
            }
        }

        // Stable, so equal keys keep outlines ahead of annotations
        self.markers.sort_by(|a, b| a.key.cmp(&b.key));
    }

    /// Number every marker the glyph has reached.
    pub fn on_glyph(
        &mut self,
        glyph: &Glyph,
        outlines: &mut [Outline],
        annotations: &mut [Annotation],
        counter: &mut SequenceCounter,
    ) {
        let key = ReadingKey::of_glyph(glyph);
        while let Some(marker) = self.markers.get(self.next) {
            if key < marker.key {
                break;
            }
            assign(marker.item, outlines, annotations, counter);
            self.next += 1;
        }
    }

    /// Number markers never reached, in reading order, and then every
    /// annotation still without a number, in page order.
    pub fn finish(
        &mut self,
        outlines: &mut [Outline],
        annotations: &mut [Annotation],
        counter: &mut SequenceCounter,
    ) {
        for marker in &self.markers[self.next..] {
            assign(marker.item, outlines, annotations, counter);
        }
        self.next = self.markers.len();

        for annot in annotations.iter_mut().filter(|a| a.sequence.is_none()) {
            annot.sequence = Some(counter.issue());
        }
    }
}

fn assign(
    item: MarkerItem,
    outlines: &mut [Outline],
    annotations: &mut [Annotation],
    counter: &mut SequenceCounter,
) {
    let slot = match item {
        MarkerItem::Outline(i) => &mut outlines[i].sequence,
        MarkerItem::Annotation(i) => &mut annotations[i].sequence,
    };
    if slot.is_none() {
        *slot = Some(counter.issue());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnnotationType, OutlineTarget, Point, Rect};

    fn glyph(x: f32, baseline: f32, column: usize) -> Glyph {
        Glyph {
            ch: 'x',
            bbox: Rect::new(x, baseline, x + 5.0, baseline + 10.0),
            column,
            baseline,
        }
    }

    fn columns() -> Vec<Column> {
        vec![
            Column {
                index: 0,
                left: 0.0,
                right: 300.0,
            },
            Column {
                index: 1,
                left: 300.0,
                right: 612.0,
            },
        ]
    }

    #[test]
    fn test_unpositioned_outlines_first() {
        let mut outlines = vec![
            Outline::new("Positioned", 0, OutlineTarget::PageNumber(0))
                .with_position(Point::new(50.0, 500.0)),
            Outline::new("Whole page", 0, OutlineTarget::PageNumber(0)),
        ];
        let mut annots: Vec<Annotation> = Vec::new();
        let mut counter = SequenceCounter::default();
        let mut seq = OutlineSequencer::default();

        seq.begin_page(&columns(), &mut outlines, &annots, &mut counter);
        assert_eq!(outlines[1].sequence, Some(0));
        assert_eq!(outlines[0].sequence, None);

        seq.on_glyph(&glyph(50.0, 700.0, 0), &mut outlines, &mut annots, &mut counter);
        assert_eq!(outlines[0].sequence, None);
        seq.on_glyph(&glyph(50.0, 490.0, 0), &mut outlines, &mut annots, &mut counter);
        assert_eq!(outlines[0].sequence, Some(1));
    }

    #[test]
    fn test_markers_follow_columns() {
        let mut outlines = vec![
            // Right column, near the top
            Outline::new("Right", 0, OutlineTarget::PageNumber(0))
                .with_position(Point::new(320.0, 780.0)),
            // Left column, near the bottom
            Outline::new("Left", 0, OutlineTarget::PageNumber(0))
                .with_position(Point::new(20.0, 100.0)),
        ];
        let mut annots = vec![Annotation::new(0, AnnotationType::Text)
            .with_rect(Rect::new(320.0, 300.0, 340.0, 320.0))];
        let mut counter = SequenceCounter::default();
        let mut seq = OutlineSequencer::default();

        seq.begin_page(&columns(), &mut outlines, &annots, &mut counter);
        // Left column text, bottom line
        seq.on_glyph(&glyph(20.0, 90.0, 0), &mut outlines, &mut annots, &mut counter);
        // Right column text, top line
        seq.on_glyph(&glyph(320.0, 770.0, 1), &mut outlines, &mut annots, &mut counter);
        seq.finish(&mut outlines, &mut annots, &mut counter);

        assert_eq!(outlines[1].sequence, Some(0));
        assert_eq!(outlines[0].sequence, Some(1));
        assert_eq!(annots[0].sequence, Some(2));
    }

    #[test]
    fn test_finish_numbers_leftovers() {
        let mut outlines: Vec<Outline> = Vec::new();
        let mut annots = vec![
            Annotation::new(0, AnnotationType::Highlight)
                .with_rect(Rect::new(0.0, 0.0, 10.0, 10.0)),
            Annotation::new(0, AnnotationType::Text)
                .with_rect(Rect::new(0.0, 0.0, 10.0, 10.0)),
        ];
        let mut counter = SequenceCounter::default();
        let mut seq = OutlineSequencer::default();

        seq.begin_page(&columns(), &mut outlines, &annots, &mut counter);
        seq.finish(&mut outlines, &mut annots, &mut counter);

        // Markers first, then annotations that matched nothing
        assert_eq!(annots[1].sequence, Some(0));
        assert_eq!(annots[0].sequence, Some(1));
        assert_eq!(counter.issued(), 2);
    }
}

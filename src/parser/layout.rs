//! Layout analysis for reading-order text.
//!
//! Spans from the content interpreter are split into columns, grouped into
//! lines by baseline, and lines into blocks by spacing. [`PageLayout::emit`]
//! then replays the page glyph by glyph in reading order: column by column,
//! top to bottom, left to right.

use std::cmp::Ordering;

use super::content::{PositionedChar, TextSpan};
use crate::capture::{column_for, Column, Glyph, RenderSink};
use crate::model::Rect;

/// A text line composed of multiple spans on the same baseline.
#[derive(Debug, Clone)]
pub struct TextLine {
    /// The spans in this line, sorted by X position
    pub spans: Vec<TextSpan>,
    /// Y position (baseline)
    pub y: f32,
    /// Leftmost X position
    pub x: f32,
    /// Dominant font size in this line
    pub font_size: f32,
}

impl TextLine {
    /// Create a new text line from spans.
    pub fn from_spans(mut spans: Vec<TextSpan>) -> Self {
        if spans.is_empty() {
            return Self {
                spans: vec![],
                y: 0.0,
                x: 0.0,
                font_size: 0.0,
            };
        }

        spans.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));

        // Dominant font size, weighted by text length
        let total_chars: usize = spans.iter().map(|s| s.text.len()).sum();
        let weighted_size: f32 = spans
            .iter()
            .map(|s| s.font_size * s.text.len() as f32)
            .sum();
        let font_size = if total_chars > 0 {
            weighted_size / total_chars as f32
        } else {
            spans[0].font_size
        };

        let y = spans[0].y;
        let x = spans[0].x;

        Self {
            spans,
            y,
            x,
            font_size,
        }
    }

    /// The line's glyphs, left to right.
    ///
    /// A space is synthesized where two characters are visibly apart but the
    /// content stream placed no space between them. CJK characters never get
    /// one.
    pub fn glyphs(&self, column: usize) -> Vec<Glyph> {
        let mut chars: Vec<&PositionedChar> = self.spans.iter().flat_map(|s| &s.chars).collect();
        chars.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));

        let mut glyphs = Vec::with_capacity(chars.len());
        let mut prev: Option<&PositionedChar> = None;
        for c in chars {
            if let Some(p) = prev {
                let gap = c.x - (p.x + p.width);
                let threshold = c.font_size.max(p.font_size) * 0.15;
                if gap > threshold
                    && !p.ch.is_whitespace()
                    && !c.ch.is_whitespace()
                    && !(is_spaceless_script_char(p.ch) && is_spaceless_script_char(c.ch))
                {
                    glyphs.push(self.glyph(' ', p.x + p.width, gap, p.font_size, column));
                }
            }
            glyphs.push(self.glyph(c.ch, c.x, c.width, c.font_size, column));
            prev = Some(c);
        }
        glyphs
    }

    fn glyph(&self, ch: char, x: f32, width: f32, font_size: f32, column: usize) -> Glyph {
        Glyph {
            ch,
            bbox: Rect::new(
                x,
                self.y - font_size * 0.2,
                x + width.max(0.0),
                self.y + font_size * 0.8,
            ),
            column,
            baseline: self.y,
        }
    }

    /// Get the combined text of the line.
    pub fn text(&self) -> String {
        self.glyphs(0).iter().map(|g| g.ch).collect()
    }
}

/// A text block (paragraph).
#[derive(Debug, Clone)]
pub struct TextBlock {
    /// Column the block belongs to
    pub column: usize,
    /// The lines in this block
    pub lines: Vec<TextLine>,
}

impl TextBlock {
    /// Get the combined text of all lines.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A page's text arranged in reading order.
#[derive(Debug, Clone)]
pub struct PageLayout {
    /// Columns, left to right
    pub columns: Vec<Column>,
    /// Blocks in reading order
    pub blocks: Vec<TextBlock>,
}

impl PageLayout {
    /// Arrange spans. `fixed_columns` splits the page into that many equal
    /// columns instead of detecting gutters.
    pub fn analyze(spans: Vec<TextSpan>, bbox: Rect, fixed_columns: Option<usize>) -> Self {
        let columns = match fixed_columns {
            Some(n) if n > 0 => even_columns(bbox, n),
            _ => detect_columns(&spans, bbox),
        };

        log::debug!("Using {} column(s)", columns.len());

        let mut column_spans: Vec<Vec<TextSpan>> = vec![Vec::new(); columns.len()];
        for span in spans {
            let col_idx = span_column(&columns, &span);
            column_spans[col_idx].push(span);
        }

        let mut blocks = Vec::new();
        for (col_idx, col_spans) in column_spans.into_iter().enumerate() {
            let lines = group_spans_into_lines(col_spans);
            blocks.extend(
                group_lines_into_blocks(lines)
                    .into_iter()
                    .map(|lines| TextBlock {
                        column: col_idx,
                        lines,
                    }),
            );
        }

        Self { columns, blocks }
    }

    /// Replay the page into a sink.
    pub fn emit(&self, sink: &mut dyn RenderSink) {
        sink.begin_page(&self.columns);
        for block in &self.blocks {
            sink.begin_block();
            for line in &block.lines {
                sink.begin_line();
                for glyph in line.glyphs(block.column) {
                    sink.glyph(&glyph);
                }
                sink.end_line();
            }
            sink.end_block();
        }
        sink.end_page();
    }

    /// Plain text of the page, blocks separated by blank lines.
    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .map(TextBlock::text)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Split the page box into `n` columns of equal width.
fn even_columns(bbox: Rect, n: usize) -> Vec<Column> {
    let width = bbox.width() / n as f32;
    (0..n)
        .map(|index| Column {
            index,
            left: bbox.x0 + width * index as f32,
            right: bbox.x0 + width * (index + 1) as f32,
        })
        .collect()
}

/// Check if a span belongs to a column: its left edge or its center falls
/// inside.
fn span_column(columns: &[Column], span: &TextSpan) -> usize {
    let center = span.x + span.width / 2.0;
    columns
        .iter()
        .position(|c| c.contains(span.x) || c.contains(center))
        .unwrap_or_else(|| column_for(columns, center))
}

/// Detect columns based on vertical gap (gutter) detection.
///
/// This looks for vertical empty spaces between text regions to identify
/// column boundaries. Returns at most two columns, sorted from left to
/// right, together covering the page box.
fn detect_columns(spans: &[TextSpan], bbox: Rect) -> Vec<Column> {
    if spans.is_empty() {
        return vec![Column::full_width(bbox.x0, bbox.x1)];
    }

    let min_x = spans.iter().map(|s| s.x).fold(f32::INFINITY, f32::min);
    let max_x = spans
        .iter()
        .map(|s| s.x + s.width)
        .fold(f32::NEG_INFINITY, f32::max);
    let left = bbox.x0.min(min_x - 10.0);
    let right = bbox.x1.max(max_x + 10.0);
    let single = || vec![Column::full_width(left, right)];

    let page_width = max_x - min_x;

    // Don't detect columns if the text is too narrow
    if page_width < 250.0 {
        return single();
    }

    // Divide the text extent into vertical slices and count spans in each
    let slice_width = 3.0;
    let num_slices = ((page_width / slice_width) as usize) + 1;
    let mut slice_occupancy = vec![0usize; num_slices];

    for span in spans {
        let start_slice = ((span.x - min_x) / slice_width) as usize;
        let end_slice = (((span.x + span.width) - min_x) / slice_width) as usize;

        for slot in slice_occupancy
            .iter_mut()
            .take(end_slice.min(num_slices - 1) + 1)
            .skip(start_slice)
        {
            *slot += 1;
        }
    }

    // Find the best gap (run of empty slices) in the middle 70% of the page
    let search_start = num_slices * 15 / 100;
    let search_end = num_slices * 85 / 100;
    let page_center = num_slices / 2;

    let mut best = Gap::default();
    let mut current = Gap::default();

    for (i, &occupancy) in slice_occupancy
        .iter()
        .enumerate()
        .take(search_end)
        .skip(search_start)
    {
        if occupancy == 0 {
            if current.len == 0 {
                current.start = i;
            }
            current.len += 1;
        } else {
            best = best.prefer(current, page_center, slice_width);
            current = Gap::default();
        }
    }
    best = best.prefer(current, page_center, slice_width);

    let gap_width = best.len as f32 * slice_width;

    log::debug!(
        "Best gap: width={:.1}pt at x={:.1}, text_width={:.1}",
        gap_width,
        min_x + best.start as f32 * slice_width,
        page_width
    );

    // Require a minimum gap width for column detection
    if gap_width < 12.0 {
        return single();
    }

    let gutter_center = min_x + (best.start as f32 + best.len as f32 / 2.0) * slice_width;

    // Both columns need a reasonable width
    if gutter_center - min_x < 80.0 || max_x - gutter_center < 80.0 {
        log::debug!("Column too narrow, treating as single column");
        return single();
    }

    // Both columns should hold at least 10% of spans
    let left_spans = spans
        .iter()
        .filter(|s| s.x + s.width / 2.0 < gutter_center)
        .count();
    let right_spans = spans.len() - left_spans;
    let min_spans = (spans.len() / 10).max(2);
    if left_spans < min_spans || right_spans < min_spans {
        log::debug!("Spans too imbalanced, treating as single column");
        return single();
    }

    vec![
        Column {
            index: 0,
            left,
            right: gutter_center,
        },
        Column {
            index: 1,
            left: gutter_center,
            right,
        },
    ]
}

/// A run of empty slices.
#[derive(Debug, Clone, Copy)]
struct Gap {
    start: usize,
    len: usize,
    center_dist: f32,
}

impl Default for Gap {
    fn default() -> Self {
        Self {
            start: 0,
            len: 0,
            center_dist: f32::MAX,
        }
    }
}

impl Gap {
    /// Keep whichever gap looks more like a gutter: clearly wider, or of
    /// similar width and closer to the center.
    fn prefer(self, candidate: Gap, page_center: usize, slice_width: f32) -> Gap {
        if candidate.len == 0 {
            return self;
        }
        let width = candidate.len as f32 * slice_width;
        if width < 10.0 {
            return self;
        }

        let center = candidate.start + candidate.len / 2;
        let center_dist = (center as f32 - page_center as f32).abs();
        let best_width = self.len as f32 * slice_width;

        if width > best_width * 1.5 || (width >= best_width * 0.7 && center_dist < self.center_dist)
        {
            Gap {
                center_dist,
                ..candidate
            }
        } else {
            self
        }
    }
}

/// Y-based line grouping within one column.
fn group_spans_into_lines(mut spans: Vec<TextSpan>) -> Vec<TextLine> {
    if spans.is_empty() {
        return vec![];
    }

    // Sort spans by Y (descending, since PDF Y is bottom-up) then X
    spans.sort_by(|a, b| {
        b.y.partial_cmp(&a.y)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal))
    });

    let mut lines: Vec<TextLine> = Vec::new();
    let mut current_line_spans: Vec<TextSpan> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        let y_tolerance = span.font_size * 0.3;

        match current_y {
            Some(y) if (span.y - y).abs() <= y_tolerance => current_line_spans.push(span),
            _ => {
                if !current_line_spans.is_empty() {
                    lines.push(TextLine::from_spans(std::mem::take(
                        &mut current_line_spans,
                    )));
                }
                current_y = Some(span.y);
                current_line_spans.push(span);
            }
        }
    }

    if !current_line_spans.is_empty() {
        lines.push(TextLine::from_spans(current_line_spans));
    }

    lines
}

/// Group lines into blocks (paragraphs) based on spacing.
fn group_lines_into_blocks(lines: Vec<TextLine>) -> Vec<Vec<TextLine>> {
    let avg_spacing = calculate_avg_line_spacing(&lines);

    let mut blocks: Vec<Vec<TextLine>> = Vec::new();
    let mut current: Vec<TextLine> = Vec::new();

    for line in lines {
        if let Some(prev_line) = current.last() {
            if should_break_block(prev_line, &line, avg_spacing) {
                blocks.push(std::mem::take(&mut current));
            }
        }
        current.push(line);
    }

    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

fn calculate_avg_line_spacing(lines: &[TextLine]) -> f32 {
    let spacings: Vec<f32> = lines
        .windows(2)
        .map(|w| (w[0].y - w[1].y).abs())
        .filter(|s| *s > 0.1)
        .collect();

    if spacings.is_empty() {
        return 12.0;
    }

    spacings.iter().sum::<f32>() / spacings.len() as f32
}

/// Determine if a new block should start.
fn should_break_block(prev_line: &TextLine, curr_line: &TextLine, avg_spacing: f32) -> bool {
    // Large spacing indicates new paragraph
    let spacing = (prev_line.y - curr_line.y).abs();
    if spacing > avg_spacing * 1.5 {
        return true;
    }

    // Significant font size change
    if (prev_line.font_size - curr_line.font_size).abs() > 1.0 {
        return true;
    }

    // Significant left margin change (indentation)
    (prev_line.x - curr_line.x).abs() > 20.0
}

/// Check if character is from a script that doesn't use word spaces.
/// Chinese and Japanese don't use spaces between words, but Korean does.
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and extensions
    (0x4E00..=0x9FFF).contains(&code)
    || (0x3400..=0x4DBF).contains(&code)
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana and Katakana
    || (0x3040..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A span of fixed-pitch characters, 6pt apart at size 10.
    fn span(text: &str, x: f32, y: f32) -> TextSpan {
        let chars = text
            .chars()
            .enumerate()
            .map(|(i, ch)| PositionedChar {
                ch,
                x: x + 6.0 * i as f32,
                y,
                width: 6.0,
                font_size: 10.0,
            })
            .collect();
        TextSpan::from_chars(chars).unwrap()
    }

    #[derive(Default)]
    struct Recorder {
        columns: usize,
        blocks: Vec<Vec<String>>,
    }

    impl RenderSink for Recorder {
        fn begin_page(&mut self, columns: &[Column]) {
            self.columns = columns.len();
        }

        fn begin_block(&mut self) {
            self.blocks.push(Vec::new());
        }

        fn begin_line(&mut self) {
            if let Some(block) = self.blocks.last_mut() {
                block.push(String::new());
            }
        }

        fn glyph(&mut self, glyph: &Glyph) {
            if let Some(line) = self.blocks.last_mut().and_then(|b| b.last_mut()) {
                line.push(glyph.ch);
            }
        }

        fn end_page(&mut self) {}
    }

    #[test]
    fn test_lines_group_by_baseline() {
        let spans = vec![
            span("world", 108.0, 700.5),
            span("Hello", 72.0, 700.0),
            span("Next line", 72.0, 686.0),
        ];
        let layout = PageLayout::analyze(spans, Rect::letter(), None);

        assert_eq!(layout.columns.len(), 1);
        assert_eq!(layout.blocks.len(), 1);
        assert_eq!(layout.blocks[0].lines.len(), 2);
        // The 6pt gap between "Hello" and "world" becomes a space
        assert_eq!(layout.blocks[0].lines[0].text(), "Hello world");
    }

    #[test]
    fn test_block_break_on_spacing() {
        let spans = vec![
            span("one", 72.0, 700.0),
            span("two", 72.0, 688.0),
            span("three", 72.0, 676.0),
            span("four", 72.0, 620.0),
        ];
        let layout = PageLayout::analyze(spans, Rect::letter(), None);
        assert_eq!(layout.blocks.len(), 2);
        assert_eq!(layout.text(), "one two three\n\nfour");
    }

    #[test]
    fn test_two_column_reading_order() {
        let mut spans = Vec::new();
        for i in 0..6 {
            let y = 700.0 - 12.0 * i as f32;
            spans.push(span("left column text here", 50.0, y));
            spans.push(span("right column text here", 320.0, y));
        }
        let layout = PageLayout::analyze(spans, Rect::letter(), None);

        assert_eq!(layout.columns.len(), 2);
        assert!(layout.blocks[0].column == 0);
        let text = layout.text();
        let last_left = text.rfind("left").unwrap();
        let first_right = text.find("right").unwrap();
        assert!(last_left < first_right);
    }

    #[test]
    fn test_fixed_columns() {
        let spans = vec![span("left", 100.0, 700.0), span("right", 400.0, 700.0)];
        let layout = PageLayout::analyze(spans, Rect::letter(), Some(2));
        assert_eq!(layout.columns.len(), 2);
        assert_eq!(layout.columns[1].left, 306.0);
        assert_eq!(layout.text(), "left\n\nright");
    }

    #[test]
    fn test_emit_structure() {
        let spans = vec![span("ab", 72.0, 700.0), span("cd", 72.0, 688.0)];
        let layout = PageLayout::analyze(spans, Rect::letter(), None);
        let mut recorder = Recorder::default();
        layout.emit(&mut recorder);

        assert_eq!(recorder.columns, 1);
        assert_eq!(recorder.blocks, vec![vec!["ab".to_string(), "cd".to_string()]]);
    }

    #[test]
    fn test_no_space_between_cjk() {
        let line = TextLine::from_spans(vec![span("日", 72.0, 700.0), span("本", 90.0, 700.0)]);
        assert_eq!(line.text(), "日本");
    }

    #[test]
    fn test_empty_page_has_one_column() {
        let layout = PageLayout::analyze(Vec::new(), Rect::letter(), None);
        assert_eq!(layout.columns.len(), 1);
        assert!(layout.blocks.is_empty());
    }
}

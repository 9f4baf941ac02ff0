//! Rolling record of the characters emitted while a page renders.

use crate::text::cleanup_text;

/// Keeps every character of the current page, indexed by stream position,
/// and assembles the page's linear text.
///
/// Line breaks are recorded as `\n` in the character stream so that context
/// slices read naturally across lines.
#[derive(Debug, Default)]
pub struct TextTracker {
    chars: Vec<char>,
    blocks: Vec<String>,
    lines: Vec<String>,
    line: String,
    line_number: usize,
}

impl TextTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything from the previous page.
    pub fn reset(&mut self) {
        self.chars.clear();
        self.blocks.clear();
        self.lines.clear();
        self.line.clear();
        self.line_number = 0;
    }

    /// Start a block.
    pub fn begin_block(&mut self) {
        self.flush_block();
    }

    /// Start a line.
    pub fn begin_line(&mut self) {
        self.line_number += 1;
    }

    /// Record a glyph character and return its stream position.
    pub fn push(&mut self, ch: char) -> usize {
        self.chars.push(ch);
        self.line.push(ch);
        self.chars.len() - 1
    }

    /// End the current line.
    pub fn end_line(&mut self) {
        if !self.chars.is_empty() && self.chars.last() != Some(&'\n') {
            self.chars.push('\n');
        }
        self.lines.push(std::mem::take(&mut self.line));
    }

    /// End the current block.
    pub fn end_block(&mut self) {
        self.flush_block();
    }

    fn flush_block(&mut self) {
        if !self.line.is_empty() {
            self.lines.push(std::mem::take(&mut self.line));
        }
        if self.lines.is_empty() {
            return;
        }
        let block = self.lines.join("\n");
        self.lines.clear();
        let block = block.trim();
        if !block.is_empty() {
            self.blocks.push(block.to_string());
        }
    }

    /// Number of characters recorded so far; the position of the next one.
    pub fn position(&self) -> usize {
        self.chars.len()
    }

    /// Lines started so far on this page.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Characters in `[from, to)`, clamped to what has been recorded.
    pub fn slice(&self, from: usize, to: usize) -> String {
        let to = to.min(self.chars.len());
        let from = from.min(to);
        self.chars[from..to].iter().collect()
    }

    /// Up to `n` characters immediately before position `before`.
    pub fn last(&self, n: usize, before: usize) -> String {
        self.slice(before.saturating_sub(n), before)
    }

    /// Finish the page and return its text.
    ///
    /// Lines of a block are joined with `\n`, blocks are trimmed and joined
    /// with single spaces, and the result is cleaned up.
    pub fn finish(&mut self) -> String {
        self.flush_block();
        let text = self.blocks.join(" ");
        cleanup_text(&text)
    }
}

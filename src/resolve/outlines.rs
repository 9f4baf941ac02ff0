//! Links outline entries to pages as the pages are enumerated.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::model::{ObjectId, Outline, OutlineTarget};

/// Key an outline waits under until its page shows up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutlineKey {
    /// Page object reference
    Object(ObjectId),
    /// Zero-based page number
    PageNumber(usize),
}

impl From<OutlineTarget> for OutlineKey {
    fn from(target: OutlineTarget) -> Self {
        match target {
            OutlineTarget::Object(id) => OutlineKey::Object(id),
            OutlineTarget::PageNumber(n) => OutlineKey::PageNumber(n),
        }
    }
}

/// Outlines waiting for their page.
#[derive(Debug, Default)]
pub struct OutlineLocator {
    pending: HashMap<OutlineKey, Vec<Outline>>,
    resolved: usize,
}

impl OutlineLocator {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// File every outline under its target.
    pub fn with_outlines(outlines: impl IntoIterator<Item = Outline>) -> Self {
        let mut locator = Self::new();
        for outline in outlines {
            locator.file(outline);
        }
        locator
    }

    /// File one outline.
    pub fn file(&mut self, outline: Outline) {
        self.pending
            .entry(outline.target.into())
            .or_default()
            .push(outline);
    }

    /// Number of outlines still waiting.
    pub fn pending_count(&self) -> usize {
        self.pending.values().map(Vec::len).sum()
    }

    /// Number of outlines resolved so far.
    pub fn resolved_count(&self) -> usize {
        self.resolved
    }

    /// Remove and resolve every outline that targets this page, either by
    /// object id or by index. Outlines keep their filing order.
    pub fn take_for_page(&mut self, object_id: ObjectId, index: usize) -> Vec<Outline> {
        let mut found = Vec::new();
        for key in [OutlineKey::Object(object_id), OutlineKey::PageNumber(index)] {
            if let Some(outlines) = self.pending.remove(&key) {
                found.extend(outlines);
            }
        }
        for outline in &mut found {
            outline.resolve(index);
        }
        self.resolved += found.len();
        found
    }

    /// Check that every filed outline found its page.
    pub fn finish(self) -> Result<()> {
        let count = self.pending_count();
        if count == 0 {
            log::debug!("Resolved all {} outline(s)", self.resolved);
            return Ok(());
        }

        let mut targets: Vec<String> = self
            .pending
            .values()
            .flatten()
            .map(|o| format!("\"{}\" -> {}", o.title, o.target))
            .collect();
        targets.sort();

        Err(Error::UnresolvedOutlines {
            count,
            targets: targets.join(", "),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outline(title: &str, target: OutlineTarget) -> Outline {
        Outline::new(title, 0, target)
    }

    #[test]
    fn test_both_keys_drain() {
        let mut locator = OutlineLocator::with_outlines([
            outline("By object", OutlineTarget::Object((5, 0))),
            outline("By number", OutlineTarget::PageNumber(0)),
            outline("Elsewhere", OutlineTarget::Object((9, 0))),
        ]);
        assert_eq!(locator.pending_count(), 3);

        let found = locator.take_for_page((5, 0), 0);
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|o| o.page_index == Some(0)));

        let found = locator.take_for_page((9, 0), 1);
        assert_eq!(found[0].title, "Elsewhere");
        assert_eq!(locator.resolved_count(), 3);
        assert!(locator.finish().is_ok());
    }

    #[test]
    fn test_each_outline_resolves_once() {
        let mut locator =
            OutlineLocator::with_outlines([outline("Once", OutlineTarget::Object((5, 0)))]);
        assert_eq!(locator.take_for_page((5, 0), 0).len(), 1);
        assert!(locator.take_for_page((5, 0), 0).is_empty());
    }

    #[test]
    fn test_leftovers_are_fatal() {
        let mut locator = OutlineLocator::with_outlines([
            outline("Ghost", OutlineTarget::Object((42, 0))),
            outline("Beyond", OutlineTarget::PageNumber(7)),
        ]);
        locator.take_for_page((1, 0), 0);

        match locator.finish() {
            Err(Error::UnresolvedOutlines { count, targets }) => {
                assert_eq!(count, 2);
                assert!(targets.contains("\"Ghost\" -> object 42 0"));
                assert!(targets.contains("\"Beyond\" -> page #7"));
            }
            other => panic!("expected UnresolvedOutlines, got {:?}", other),
        }
    }
}

//! Recoverable problems found while extracting annotations.
//!
//! Nothing in the extraction pipeline logs directly; it reports through a
//! [`DiagnosticSink`] so callers decide where messages end up. [`LogSink`]
//! is the default and forwards to the `log` facade.

use crate::model::PageRef;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Expected condition worth mentioning (e.g. no outline tree)
    Info,
    /// Something was dropped or repaired
    Warning,
}

/// Receives diagnostics from the extraction pipeline.
pub trait DiagnosticSink {
    /// Record one diagnostic, optionally tied to a page.
    fn record(&mut self, severity: Severity, page: Option<&PageRef>, message: &str);

    /// Shorthand for a warning.
    fn warn(&mut self, page: Option<&PageRef>, message: &str) {
        self.record(Severity::Warning, page, message);
    }

    /// Shorthand for an informational message.
    fn info(&mut self, page: Option<&PageRef>, message: &str) {
        self.record(Severity::Info, page, message);
    }
}

/// Forwards diagnostics to the `log` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn record(&mut self, severity: Severity, page: Option<&PageRef>, message: &str) {
        let level = match severity {
            Severity::Info => log::Level::Info,
            Severity::Warning => log::Level::Warn,
        };
        match page {
            Some(page) => log::log!(level, "{}: {}", page, message),
            None => log::log!(level, "{}", message),
        }
    }
}

/// A collected diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity
    pub severity: Severity,
    /// Page the diagnostic refers to, if any
    pub page: Option<PageRef>,
    /// Message text
    pub message: String,
}

/// Keeps diagnostics in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    /// Everything recorded so far, in order
    pub entries: Vec<Diagnostic>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded warnings.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    /// Number of recorded warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }
}

impl DiagnosticSink for MemorySink {
    fn record(&mut self, severity: Severity, page: Option<&PageRef>, message: &str) {
        self.entries.push(Diagnostic {
            severity,
            page: page.cloned(),
            message: message.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_collects() {
        let mut sink = MemorySink::new();
        let page = PageRef {
            index: 0,
            label: None,
        };
        sink.warn(Some(&page), "dropped");
        sink.info(None, "no outlines");

        assert_eq!(sink.entries.len(), 2);
        assert_eq!(sink.warning_count(), 1);
        assert_eq!(sink.entries[0].page, Some(page));
        assert_eq!(sink.entries[1].severity, Severity::Info);
    }

    #[test]
    fn test_log_sink_does_not_panic_without_logger() {
        let mut sink = LogSink;
        sink.warn(None, "nobody listening");
    }
}

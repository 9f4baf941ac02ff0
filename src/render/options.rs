//! Report options and configuration.

use std::path::Path;

use super::JsonFormat;

/// Default name of the consolidated report.
pub const DEFAULT_REPORT_NAME: &str = "consolidated_notes.md";

/// Options for writing annotation reports.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// File name of the report inside the output directory
    pub file_name: String,

    /// Leave out documents in which no annotation found a context sentence
    pub skip_without_context: bool,

    /// Quote the highlighted text under a comment
    pub include_highlight_text: bool,

    /// Output format
    pub format: ReportFormat,

    /// JSON layout, when `format` is JSON
    pub json_format: JsonFormat,
}

impl ReportOptions {
    /// Create new report options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the report file name.
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = name.into();
        self
    }

    /// Keep or skip documents without any context sentence.
    pub fn with_skip_without_context(mut self, skip: bool) -> Self {
        self.skip_without_context = skip;
        self
    }

    /// Include or omit the highlighted text under comments.
    pub fn with_highlight_text(mut self, include: bool) -> Self {
        self.include_highlight_text = include;
        self
    }

    /// Set the output format. Switching to JSON also switches a default
    /// `.md` file name to `.json`.
    pub fn with_format(mut self, format: ReportFormat) -> Self {
        if self.file_name == DEFAULT_REPORT_NAME && format == ReportFormat::Json {
            self.file_name = Path::new(DEFAULT_REPORT_NAME)
                .with_extension("json")
                .to_string_lossy()
                .into_owned();
        }
        self.format = format;
        self
    }

    /// Set the JSON layout.
    pub fn with_json_format(mut self, format: JsonFormat) -> Self {
        self.json_format = format;
        self
    }
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            file_name: DEFAULT_REPORT_NAME.to_string(),
            skip_without_context: true,
            include_highlight_text: true,
            format: ReportFormat::Markdown,
            json_format: JsonFormat::Pretty,
        }
    }
}

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// Consolidated Markdown notes
    #[default]
    Markdown,
    /// Documents serialized as a JSON array
    Json,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "md" | "markdown" => Ok(ReportFormat::Markdown),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!("Unknown report format: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_options_default() {
        let options = ReportOptions::default();
        assert_eq!(options.file_name, "consolidated_notes.md");
        assert!(options.skip_without_context);
        assert!(options.include_highlight_text);
        assert_eq!(options.format, ReportFormat::Markdown);
    }

    #[test]
    fn test_report_options_builder() {
        let options = ReportOptions::new()
            .with_skip_without_context(false)
            .with_highlight_text(false)
            .with_format(ReportFormat::Json);
        assert!(!options.skip_without_context);
        assert!(!options.include_highlight_text);
        assert_eq!(options.file_name, "consolidated_notes.json");

        let named = ReportOptions::new()
            .with_file_name("notes.txt")
            .with_format(ReportFormat::Json);
        assert_eq!(named.file_name, "notes.txt");
    }

    #[test]
    fn test_report_format_parse() {
        assert_eq!("md".parse::<ReportFormat>().unwrap(), ReportFormat::Markdown);
        assert_eq!("JSON".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert!("html".parse::<ReportFormat>().is_err());
    }
}

//! Rendering module for turning extracted documents into reports.

mod json;
mod markdown;
mod options;
mod report;
mod result;

pub use json::{to_json, JsonFormat};
pub use markdown::{to_markdown, MarkdownRenderer};
pub use options::{ReportFormat, ReportOptions, DEFAULT_REPORT_NAME};
pub use report::{render_report, write_report};
pub use result::{RenderResult, ReportStats};

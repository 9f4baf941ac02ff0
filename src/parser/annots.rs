//! Building [`Annotation`]s from raw annotation dictionaries.

use super::backend::{PdfValue, RawAnnotation};
use crate::diagnostics::DiagnosticSink;
use crate::model::{Annotation, AnnotationType, PageRef, Quad, Rect, Rgb};
use crate::text::{cleanup_text, parse_pdf_date};

impl Annotation {
    /// Build an annotation from its dictionary.
    ///
    /// Returns `None` for subtypes we don't extract; unknown subtypes are
    /// reported, links, popups and form widgets are not. Malformed optional
    /// fields are reported and left empty.
    pub fn from_raw(
        page_index: usize,
        raw: &RawAnnotation,
        page: &PageRef,
        sink: &mut dyn DiagnosticSink,
    ) -> Option<Annotation> {
        let subtype = raw.get("Subtype").and_then(PdfValue::as_name).unwrap_or("");
        let Some(kind) = AnnotationType::from_subtype(subtype) else {
            if !AnnotationType::is_ignored_subtype(subtype) {
                sink.warn(
                    Some(page),
                    &format!("unsupported annotation type '{}', skipped", subtype),
                );
            }
            return None;
        };

        let mut annot = Annotation::new(page_index, kind);
        annot.object_id = raw.object_id;
        annot.rect = raw
            .get("Rect")
            .and_then(PdfValue::as_numbers)
            .and_then(|c| Rect::from_coords(&c));
        annot.quads = raw
            .get("QuadPoints")
            .and_then(PdfValue::as_numbers)
            .map(|c| Quad::from_coords(&c))
            .unwrap_or_default();
        annot.color = color(raw, page, sink);
        annot.author = text_field(raw, "T");
        annot.name = text_field(raw, "NM");
        annot.contents = text_field(raw, "Contents");
        annot.created = ["CreationDate", "ModDate", "M"]
            .iter()
            .filter_map(|key| raw.get(key).and_then(PdfValue::as_text))
            .find_map(|s| parse_pdf_date(&s));
        annot.in_reply_to = raw.get("IRT").and_then(PdfValue::as_reference);
        annot.reply_marker = raw
            .get("RT")
            .and_then(PdfValue::as_name)
            .map(String::from);

        Some(annot)
    }
}

/// A text string field, cleaned up; blank values count as absent.
fn text_field(raw: &RawAnnotation, key: &str) -> Option<String> {
    let text = cleanup_text(&raw.get(key)?.as_text()?);
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// The `/C` colour. An empty array means transparent; anything other than
/// three components in `[0, 1]` is reported and dropped.
fn color(raw: &RawAnnotation, page: &PageRef, sink: &mut dyn DiagnosticSink) -> Option<Rgb> {
    let value = raw.get("C")?;
    let parsed = match value.as_numbers() {
        Some(c) if c.is_empty() => return None,
        Some(c) if c.len() == 3 => Rgb::new(c[0], c[1], c[2]),
        _ => None,
    };
    if parsed.is_none() {
        sink.warn(
            Some(page),
            &format!("invalid annotation colour {:?}, ignored", value),
        );
    }
    parsed
}

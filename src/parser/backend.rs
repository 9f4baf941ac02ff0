//! PDF backend abstraction layer.
//!
//! [`PdfSource`] is everything the extractor needs from a PDF: page
//! descriptors with their raw annotations, the outline tree, and a way to
//! render a page's glyphs into a [`RenderSink`]. [`LopdfSource`] implements
//! it on top of `lopdf`; nothing outside this module and its lopdf helpers
//! touches lopdf types.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use lopdf::{Dictionary, Document as LopdfDocument, Object};

use super::content::{ContentOp, FontMetrics, TextDecoder, TextInterpreter};
use super::{labels, layout, outlines};
use crate::capture::RenderSink;
use crate::error::{Error, Result};
use crate::model::{ObjectId, OutlineTarget, Point, Rect};
use crate::text::decode_pdf_string;

/// A decoded PDF value.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Dictionary(PdfDict),
    Reference(ObjectId),
    Other,
}

/// A decoded PDF dictionary.
pub type PdfDict = BTreeMap<String, PdfValue>;

impl PdfValue {
    /// Numeric value of an integer or real.
    pub fn as_number(&self) -> Option<f32> {
        match self {
            PdfValue::Integer(i) => Some(*i as f32),
            PdfValue::Real(r) => Some(*r),
            _ => None,
        }
    }

    /// Name as UTF-8.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            PdfValue::Name(n) => std::str::from_utf8(n).ok(),
            _ => None,
        }
    }

    /// Text string, decoded.
    pub fn as_text(&self) -> Option<String> {
        match self {
            PdfValue::Str(bytes) => Some(decode_pdf_string(bytes)),
            _ => None,
        }
    }

    /// Indirect reference.
    pub fn as_reference(&self) -> Option<ObjectId> {
        match self {
            PdfValue::Reference(id) => Some(*id),
            _ => None,
        }
    }

    /// Array elements.
    pub fn as_array(&self) -> Option<&[PdfValue]> {
        match self {
            PdfValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Array of numbers; `None` if any element isn't numeric.
    pub fn as_numbers(&self) -> Option<Vec<f32>> {
        self.as_array()?.iter().map(PdfValue::as_number).collect()
    }
}

/// An annotation dictionary as found on the page.
#[derive(Debug, Clone, Default)]
pub struct RawAnnotation {
    /// Indirect object the annotation lives in, if it isn't inline
    pub object_id: Option<ObjectId>,
    /// Decoded dictionary entries
    pub fields: PdfDict,
}

impl RawAnnotation {
    /// Look up a field.
    pub fn get(&self, key: &str) -> Option<&PdfValue> {
        self.fields.get(key)
    }
}

/// One page as enumerated from the page tree.
#[derive(Debug, Clone)]
pub struct PageInfo {
    /// Zero-based index
    pub index: usize,
    /// Page object id
    pub object_id: ObjectId,
    /// Page label from `/PageLabels`
    pub label: Option<String>,
    /// MediaBox
    pub bbox: Rect,
    /// Entries of `/Annots`
    pub annotations: Vec<RawAnnotation>,
}

/// An outline entry as read from the outline tree.
#[derive(Debug, Clone)]
pub struct RawOutline {
    /// Bookmark title
    pub title: String,
    /// Nesting level (0 = top level)
    pub level: usize,
    /// Target page; `None` when the destination could not be resolved
    pub target: Option<OutlineTarget>,
    /// Target position within the page
    pub position: Option<Point>,
}

/// Abstract interface for PDF document access.
pub trait PdfSource {
    /// All pages in document order.
    fn pages(&self) -> Result<Vec<PageInfo>>;

    /// All outline entries in tree order. Fails with [`Error::NoOutlines`]
    /// when the document has no outline tree.
    fn outlines(&self) -> Result<Vec<RawOutline>>;

    /// Render a page's text, in reading order, into `sink`.
    ///
    /// `columns` fixes the column count; `None` lets layout analysis decide.
    fn render_page(
        &self,
        page: &PageInfo,
        columns: Option<usize>,
        sink: &mut dyn RenderSink,
    ) -> Result<()>;

    /// Document title from the information dictionary.
    fn title(&self) -> Option<String> {
        None
    }
}

// ---------------------------------------------------------------------------
// LopdfSource: concrete implementation backed by lopdf
// ---------------------------------------------------------------------------

/// Concrete [`PdfSource`] backed by `lopdf::Document`.
pub struct LopdfSource {
    doc: LopdfDocument,
}

impl LopdfSource {
    /// Load from a file path.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let doc = LopdfDocument::load(path)?;
        Self::from_document(doc)
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        let doc = LopdfDocument::load_mem(data)?;
        Self::from_document(doc)
    }

    /// Wrap an already loaded document.
    pub fn from_document(doc: LopdfDocument) -> Result<Self> {
        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }
        Ok(Self { doc })
    }

    /// Direct access to the underlying `lopdf::Document`.
    pub fn raw_doc(&self) -> &LopdfDocument {
        &self.doc
    }

    /// Page content stream, concatenated when `/Contents` is an array.
    fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self.doc.get_dictionary(page_id)?;

        let contents = match page_dict.get(b"Contents") {
            Ok(contents) => contents,
            // A page without content is blank, not broken
            Err(_) => return Ok(Vec::new()),
        };

        match contents {
            Object::Reference(r) => match self.doc.get_object(*r)? {
                Object::Stream(s) => Ok(stream_bytes(s)),
                Object::Array(arr) => Ok(self.concat_streams(arr)),
                _ => Err(Error::PdfParse("Invalid content stream".to_string())),
            },
            Object::Array(arr) => Ok(self.concat_streams(arr)),
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }

    fn concat_streams(&self, refs: &[Object]) -> Vec<u8> {
        let mut content = Vec::new();
        for obj in refs {
            if let Object::Reference(r) = obj {
                if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                    content.extend_from_slice(&stream_bytes(s));
                    content.push(b' ');
                }
            }
        }
        content
    }

    /// The document catalog.
    pub(crate) fn catalog(&self) -> Option<&Dictionary> {
        let root = self.doc.trailer.get(b"Root").ok()?;
        self.resolve(root).as_dict().ok()
    }

    /// Follow a reference to its object, if it is one.
    pub(crate) fn resolve<'a>(&'a self, obj: &'a Object) -> &'a Object {
        match obj {
            Object::Reference(r) => self.doc.get_object(*r).unwrap_or(obj),
            _ => obj,
        }
    }

    /// Look up an inheritable page attribute, walking up `/Parent`.
    fn inherited<'a>(&'a self, page: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
        let mut dict = page;
        // Page trees are shallow; the bound only guards against cycles
        for _ in 0..32 {
            if let Ok(value) = dict.get(key) {
                return Some(self.resolve(value));
            }
            let parent = dict.get(b"Parent").ok()?.as_reference().ok()?;
            dict = self.doc.get_dictionary(parent).ok()?;
        }
        None
    }

    fn media_box(&self, page: &Dictionary) -> Rect {
        self.inherited(page, b"MediaBox")
            .and_then(|obj| obj.as_array().ok())
            .and_then(|arr| {
                let coords: Option<Vec<f32>> = arr.iter().map(|o| number(self.resolve(o))).collect();
                Rect::from_coords(&coords?)
            })
            .unwrap_or_else(Rect::letter)
    }

    fn raw_annotations(&self, page: &Dictionary) -> Vec<RawAnnotation> {
        let annots = match page.get(b"Annots") {
            Ok(obj) => self.resolve(obj),
            Err(_) => return Vec::new(),
        };
        let Ok(entries) = annots.as_array() else {
            return Vec::new();
        };

        entries
            .iter()
            .filter_map(|entry| {
                let (object_id, dict) = match entry {
                    Object::Reference(r) => (Some(*r), self.doc.get_dictionary(*r).ok()?),
                    Object::Dictionary(d) => (None, d),
                    _ => return None,
                };
                Some(RawAnnotation {
                    object_id,
                    fields: self.convert_annotation_dict(dict),
                })
            })
            .collect()
    }

    /// Decode an annotation dictionary. Direct values behind references
    /// are inlined; references to dictionaries (`/IRT`, `/P`, `/Popup`)
    /// stay references.
    fn convert_annotation_dict(&self, dict: &Dictionary) -> PdfDict {
        dict.iter()
            .map(|(key, value)| {
                let key = String::from_utf8_lossy(key).into_owned();
                let value = match value {
                    Object::Reference(r) => match self.doc.get_object(*r) {
                        Ok(Object::Dictionary(_)) | Ok(Object::Stream(_)) | Err(_) => {
                            PdfValue::Reference(*r)
                        }
                        Ok(target) => convert_object(target),
                    },
                    other => convert_object(other),
                };
                (key, value)
            })
            .collect()
    }

    fn page_fonts(&self, page_id: ObjectId) -> PageFonts<'_> {
        let fonts = self.doc.get_page_fonts(page_id).unwrap_or_default();
        let metrics = fonts
            .iter()
            .map(|(name, dict)| (name.clone(), self.font_metrics(dict)))
            .collect();
        PageFonts {
            doc: &self.doc,
            fonts,
            metrics,
        }
    }

    fn font_metrics(&self, font: &Dictionary) -> FontMetrics {
        let base_font = font
            .get(b"BaseFont")
            .ok()
            .and_then(|o| o.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        let composite = matches!(
            font.get(b"Subtype").ok().and_then(|o| o.as_name().ok()),
            Some(b"Type0")
        );
        let first_char = font
            .get(b"FirstChar")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(0)
            .max(0) as u32;
        let widths = font
            .get(b"Widths")
            .ok()
            .map(|o| self.resolve(o))
            .and_then(|o| o.as_array().ok())
            .map(|arr| {
                arr.iter()
                    .map(|w| number(self.resolve(w)).unwrap_or(0.0))
                    .collect()
            })
            .unwrap_or_default();

        FontMetrics::new(base_font, first_char, widths, composite)
    }
}

impl PdfSource for LopdfSource {
    fn pages(&self) -> Result<Vec<PageInfo>> {
        let pages = self.doc.get_pages();
        let labels = labels::page_labels(self, pages.len());

        let mut result = Vec::with_capacity(pages.len());
        for (index, (_, page_id)) in pages.into_iter().enumerate() {
            let dict = self.doc.get_dictionary(page_id)?;
            result.push(PageInfo {
                index,
                object_id: page_id,
                label: labels.get(index).cloned().flatten(),
                bbox: self.media_box(dict),
                annotations: self.raw_annotations(dict),
            });
        }
        Ok(result)
    }

    fn outlines(&self) -> Result<Vec<RawOutline>> {
        outlines::read_outlines(self)
    }

    fn render_page(
        &self,
        page: &PageInfo,
        columns: Option<usize>,
        sink: &mut dyn RenderSink,
    ) -> Result<()> {
        let content = self.page_content(page.object_id)?;
        let operations = decode_content(&content)?;
        let fonts = self.page_fonts(page.object_id);

        let spans = TextInterpreter::new(&fonts).run(&operations);
        let layout = layout::PageLayout::analyze(spans, page.bbox, columns);
        layout.emit(sink);
        Ok(())
    }

    fn title(&self) -> Option<String> {
        let info = self.doc.trailer.get(b"Info").ok()?;
        let info = self.resolve(info).as_dict().ok()?;
        match self.resolve(info.get(b"Title").ok()?) {
            Object::String(bytes, _) => {
                let title = decode_pdf_string(bytes);
                let title = title.trim();
                (!title.is_empty()).then(|| title.to_string())
            }
            _ => None,
        }
    }
}

/// Fonts of one page, for text decoding and glyph advances.
struct PageFonts<'a> {
    doc: &'a LopdfDocument,
    fonts: BTreeMap<Vec<u8>, &'a Dictionary>,
    metrics: HashMap<Vec<u8>, FontMetrics>,
}

impl TextDecoder for PageFonts<'_> {
    fn decode(&self, font: &[u8], bytes: &[u8]) -> String {
        if let Some(font_dict) = self.fonts.get(font) {
            if let Ok(enc) = font_dict.get_font_encoding(self.doc) {
                if let Ok(text) = LopdfDocument::decode_text(&enc, bytes) {
                    return text;
                }
            }
        }
        decode_pdf_string(bytes)
    }

    fn metrics(&self, font: &[u8]) -> Option<&FontMetrics> {
        self.metrics.get(font)
    }
}

/// Parse raw content stream bytes into a sequence of operations.
fn decode_content(data: &[u8]) -> Result<Vec<ContentOp>> {
    let content =
        lopdf::content::Content::decode(data).map_err(|e| Error::PdfParse(e.to_string()))?;

    Ok(content
        .operations
        .into_iter()
        .map(|op| ContentOp {
            operator: op.operator,
            operands: op.operands.iter().map(convert_object).collect(),
        })
        .collect())
}

/// Convert a `lopdf::Object` to [`PdfValue`].
pub(crate) fn convert_object(obj: &Object) -> PdfValue {
    match obj {
        Object::Null => PdfValue::Null,
        Object::Boolean(b) => PdfValue::Boolean(*b),
        Object::Integer(i) => PdfValue::Integer(*i),
        Object::Real(r) => PdfValue::Real(*r),
        Object::Name(n) => PdfValue::Name(n.clone()),
        Object::String(b, _) => PdfValue::Str(b.clone()),
        Object::Array(arr) => PdfValue::Array(arr.iter().map(convert_object).collect()),
        Object::Dictionary(d) => PdfValue::Dictionary(
            d.iter()
                .map(|(k, v)| (String::from_utf8_lossy(k).into_owned(), convert_object(v)))
                .collect(),
        ),
        Object::Reference(r) => PdfValue::Reference(*r),
        _ => PdfValue::Other,
    }
}

/// Stream data, decompressed when a filter is present.
fn stream_bytes(stream: &lopdf::Stream) -> Vec<u8> {
    match stream.decompressed_content() {
        Ok(data) => data,
        // Unfiltered streams report an error; their raw content is the data
        Err(_) => stream.content.clone(),
    }
}

/// Numeric value of a lopdf object.
pub(crate) fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_object() {
        assert_eq!(convert_object(&Object::Integer(42)), PdfValue::Integer(42));
        assert_eq!(
            convert_object(&Object::Reference((7, 0))),
            PdfValue::Reference((7, 0))
        );
        let arr = Object::Array(vec![Object::Integer(1), Object::Real(2.5)]);
        assert_eq!(convert_object(&arr).as_numbers(), Some(vec![1.0, 2.5]));
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(PdfValue::Name(b"Highlight".to_vec()).as_name(), Some("Highlight"));
        assert_eq!(PdfValue::Str(b"note".to_vec()).as_text().as_deref(), Some("note"));
        assert_eq!(PdfValue::Integer(3).as_number(), Some(3.0));
        assert_eq!(PdfValue::Other.as_number(), None);
        let mixed = PdfValue::Array(vec![PdfValue::Integer(1), PdfValue::Null]);
        assert_eq!(mixed.as_numbers(), None);
    }

    #[test]
    fn test_load_garbage_fails() {
        assert!(LopdfSource::load_bytes(b"not a pdf").is_err());
    }
}

//! Builds small annotated PDFs in memory.

#![allow(dead_code)]

use std::collections::BTreeMap;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

/// Body text used by most tests, 6pt per character at 12pt Helvetica.
pub const SENTENCES: &str = "The cat sat. It was happy. The dog barked.";

/// Left margin of every text line.
pub const LEFT: f32 = 72.0;

/// Advance of one Helvetica character at 12pt without `/Widths`.
pub const CHAR_WIDTH: f32 = 6.0;

pub struct PdfBuilder {
    doc: Document,
    pages_id: ObjectId,
    font_id: ObjectId,
    pages: Vec<ObjectId>,
    annots: BTreeMap<ObjectId, Vec<Object>>,
    outlines: Vec<(String, Object)>,
    title: Option<String>,
}

impl PdfBuilder {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        Self {
            doc,
            pages_id,
            font_id,
            pages: Vec::new(),
            annots: BTreeMap::new(),
            outlines: Vec::new(),
            title: None,
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// Add a page showing each `(text, baseline)` line at the left margin.
    pub fn page(&mut self, lines: &[(&str, f32)]) -> ObjectId {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
        ];
        for (text, y) in lines {
            operations.push(Operation::new("Tm", vec![
                1.into(),
                0.into(),
                0.into(),
                1.into(),
                LEFT.into(),
                (*y).into(),
            ]));
            operations.push(Operation::new("Tj", vec![Object::string_literal(*text)]));
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations };
        let encoded = content.encode().expect("content encodes");
        let content_id = self
            .doc
            .add_object(Stream::new(dictionary! {}, encoded));

        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => self.font_id },
            },
        });
        self.pages.push(page_id);
        page_id
    }

    /// Add an annotation dictionary to a page.
    pub fn annotation(&mut self, page: ObjectId, mut dict: Dictionary) -> ObjectId {
        dict.set("Type", "Annot");
        dict.set("P", page);
        let id = self.doc.add_object(dict);
        self.annots.entry(page).or_default().push(id.into());
        id
    }

    /// Add a top-level outline entry with an explicit `/Dest`.
    pub fn outline(&mut self, title: &str, dest: Vec<Object>) {
        self.outlines.push((title.to_string(), Object::Array(dest)));
    }

    pub fn build(mut self) -> Vec<u8> {
        for (page, annots) in std::mem::take(&mut self.annots) {
            if let Ok(dict) = self.doc.get_dictionary_mut(page) {
                dict.set("Annots", annots);
            }
        }

        let kids: Vec<Object> = self.pages.iter().map(|id| (*id).into()).collect();
        let count = kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let mut catalog = dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        };
        if let Some(outlines_id) = self.build_outlines() {
            catalog.set("Outlines", outlines_id);
        }
        let catalog_id = self.doc.add_object(catalog);
        self.doc.trailer.set("Root", catalog_id);

        if let Some(title) = &self.title {
            let info_id = self.doc.add_object(dictionary! {
                "Title" => Object::string_literal(title.as_str()),
            });
            self.doc.trailer.set("Info", info_id);
        }

        let mut bytes = Vec::new();
        self.doc.save_to(&mut bytes).expect("document saves");
        bytes
    }

    fn build_outlines(&mut self) -> Option<ObjectId> {
        if self.outlines.is_empty() {
            return None;
        }
        let root_id = self.doc.new_object_id();
        let item_ids: Vec<ObjectId> = self
            .outlines
            .iter()
            .map(|_| self.doc.new_object_id())
            .collect();

        for (i, (title, dest)) in self.outlines.iter().enumerate() {
            let mut item = dictionary! {
                "Title" => Object::string_literal(title.as_str()),
                "Parent" => root_id,
                "Dest" => dest.clone(),
            };
            if i > 0 {
                item.set("Prev", item_ids[i - 1]);
            }
            if let Some(next) = item_ids.get(i + 1) {
                item.set("Next", *next);
            }
            self.doc.objects.insert(item_ids[i], Object::Dictionary(item));
        }

        let first = item_ids[0];
        let last = item_ids[item_ids.len() - 1];
        self.doc.objects.insert(
            root_id,
            Object::Dictionary(dictionary! {
                "Type" => "Outlines",
                "First" => first,
                "Last" => last,
                "Count" => item_ids.len() as i64,
            }),
        );
        Some(root_id)
    }
}

/// Horizontal extent of `needle` within `line`, drawn at the left margin.
pub fn span_of(line: &str, needle: &str) -> (f32, f32) {
    let start = line.find(needle).expect("needle is on the line");
    let x0 = LEFT + start as f32 * CHAR_WIDTH;
    (x0, x0 + needle.len() as f32 * CHAR_WIDTH)
}

/// Numbers as PDF reals.
pub fn reals(values: &[f32]) -> Vec<Object> {
    values.iter().map(|v| Object::Real(*v)).collect()
}

/// A highlight over `needle` on the line with baseline `y`.
pub fn highlight(line: &str, needle: &str, y: f32) -> Dictionary {
    let (x0, x1) = span_of(line, needle);
    // Inset so the neighbouring glyph centres stay outside
    let (x0, x1) = (x0 + 1.0, x1 - 1.0);
    let (bottom, top) = (y - 4.0, y + 12.0);
    dictionary! {
        "Subtype" => "Highlight",
        "Rect" => reals(&[x0, bottom, x1, top]),
        "QuadPoints" => reals(&[x0, top, x1, top, x0, bottom, x1, bottom]),
        "C" => reals(&[1.0, 1.0, 0.0]),
        "T" => Object::string_literal("Reader"),
    }
}

/// A sticky note at `(x, y)`.
pub fn note(contents: &str, x: f32, y: f32) -> Dictionary {
    dictionary! {
        "Subtype" => "Text",
        "Rect" => reals(&[x, y - 20.0, x + 20.0, y]),
        "Contents" => Object::string_literal(contents),
    }
}

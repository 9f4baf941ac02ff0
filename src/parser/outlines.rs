//! Outline tree reading.
//!
//! Entries are returned in tree order (depth first) with their nesting
//! level. Destinations may be explicit arrays, names looked up in the
//! catalog's `/Dests` dictionary or `/Names /Dests` name tree, or GoTo
//! actions wrapping either.

use std::collections::{HashMap, HashSet};

use lopdf::{Dictionary, Object};

use super::backend::{number, LopdfSource, RawOutline};
use crate::error::{Error, Result};
use crate::model::{ObjectId, OutlineTarget, Point};
use crate::text::{cleanup_text, decode_pdf_string};

/// Nesting deeper than this is treated as a malformed tree.
const MAX_DEPTH: usize = 64;

/// Read every outline entry. Fails with [`Error::NoOutlines`] when the
/// document has no outline tree or the tree is empty.
pub fn read_outlines(source: &LopdfSource) -> Result<Vec<RawOutline>> {
    let root = source
        .catalog()
        .and_then(|catalog| catalog.get(b"Outlines").ok())
        .and_then(|obj| source.resolve(obj).as_dict().ok())
        .ok_or(Error::NoOutlines)?;
    let first = root
        .get(b"First")
        .ok()
        .and_then(|obj| obj.as_reference().ok())
        .ok_or(Error::NoOutlines)?;

    let mut reader = OutlineReader {
        source,
        names: NamedDestinations::load(source),
        visited: HashSet::new(),
        entries: Vec::new(),
    };
    reader.walk(first, 0)?;

    log::debug!("Read {} outline entries", reader.entries.len());
    Ok(reader.entries)
}

struct OutlineReader<'a> {
    source: &'a LopdfSource,
    names: NamedDestinations<'a>,
    visited: HashSet<ObjectId>,
    entries: Vec<RawOutline>,
}

impl<'a> OutlineReader<'a> {
    /// Visit a sibling chain starting at `first`, descending into children.
    fn walk(&mut self, first: ObjectId, level: usize) -> Result<()> {
        if level > MAX_DEPTH {
            return Err(Error::PdfParse("outline tree too deep".to_string()));
        }

        let source = self.source;
        let mut next = Some(first);
        while let Some(id) = next {
            if !self.visited.insert(id) {
                log::warn!("Outline entry {} {} visited twice, stopping", id.0, id.1);
                break;
            }
            let item = source.raw_doc().get_dictionary(id)?;

            let (target, position) = self.destination(item).unwrap_or((None, None));
            self.entries.push(RawOutline {
                title: title(item),
                level,
                target,
                position,
            });

            if let Some(child) = item.get(b"First").ok().and_then(|o| o.as_reference().ok()) {
                self.walk(child, level + 1)?;
            }
            next = item.get(b"Next").ok().and_then(|o| o.as_reference().ok());
        }
        Ok(())
    }

    fn destination(&self, item: &'a Dictionary) -> Option<(Option<OutlineTarget>, Option<Point>)> {
        let dest = match item.get(b"Dest") {
            Ok(dest) => dest,
            Err(_) => {
                let action = self.source.resolve(item.get(b"A").ok()?).as_dict().ok()?;
                let kind = action.get(b"S").ok()?.as_name().ok()?;
                if kind != b"GoTo" {
                    return None;
                }
                action.get(b"D").ok()?
            }
        };

        let array = match self.source.resolve(dest) {
            Object::Array(arr) => arr.as_slice(),
            Object::Name(name) | Object::String(name, _) => self.names.lookup(name)?,
            _ => return None,
        };
        Some(explicit_destination(self.source, array))
    }
}

fn title(item: &Dictionary) -> String {
    match item.get(b"Title") {
        Ok(Object::String(bytes, _)) => cleanup_text(&decode_pdf_string(bytes)).trim().to_string(),
        _ => String::new(),
    }
}

/// Target page and position of an explicit destination
/// `[page /XYZ left top zoom]`, `[page /FitH top]`, `[page /FitR l b r t]`, ...
fn explicit_destination(
    source: &LopdfSource,
    array: &[Object],
) -> (Option<OutlineTarget>, Option<Point>) {
    let target = match array.first() {
        Some(Object::Reference(id)) => Some(OutlineTarget::Object(*id)),
        Some(Object::Integer(n)) if *n >= 0 => Some(OutlineTarget::PageNumber(*n as usize)),
        _ => None,
    };

    let arg = |i: usize| array.get(i).and_then(|o| number(source.resolve(o)));
    let kind = array.get(1).and_then(|o| o.as_name().ok());
    let position = match kind {
        Some(b"XYZ") => arg(3).map(|top| Point::new(arg(2).unwrap_or(0.0), top)),
        Some(b"FitH") | Some(b"FitBH") => arg(2).map(|top| Point::new(0.0, top)),
        Some(b"FitR") => match (arg(2), arg(5)) {
            (Some(left), Some(top)) => Some(Point::new(left, top)),
            _ => None,
        },
        _ => None,
    };

    (target, position)
}

/// Named destinations from `/Dests` and the `/Names /Dests` name tree.
struct NamedDestinations<'a> {
    entries: HashMap<Vec<u8>, &'a Object>,
    source: &'a LopdfSource,
}

impl<'a> NamedDestinations<'a> {
    fn load(source: &'a LopdfSource) -> Self {
        let mut names = Self {
            entries: HashMap::new(),
            source,
        };
        let Some(catalog) = source.catalog() else {
            return names;
        };

        if let Some(dests) = catalog
            .get(b"Dests")
            .ok()
            .and_then(|o| source.resolve(o).as_dict().ok())
        {
            for (name, value) in dests.iter() {
                names.entries.insert(name.clone(), value);
            }
        }

        if let Some(tree) = catalog
            .get(b"Names")
            .ok()
            .and_then(|o| source.resolve(o).as_dict().ok())
            .and_then(|names| names.get(b"Dests").ok())
            .and_then(|o| source.resolve(o).as_dict().ok())
        {
            names.collect_tree(tree, 0);
        }

        names
    }

    fn collect_tree(&mut self, node: &'a Dictionary, depth: usize) {
        if depth > MAX_DEPTH {
            return;
        }
        let source = self.source;

        if let Ok(pairs) = node.get(b"Names").and_then(|o| source.resolve(o).as_array()) {
            for pair in pairs.chunks(2) {
                if let [Object::String(name, _), value] = pair {
                    self.entries.insert(name.clone(), value);
                }
            }
        }

        if let Ok(kids) = node.get(b"Kids").and_then(|o| source.resolve(o).as_array()) {
            for kid in kids {
                if let Ok(kid) = source.resolve(kid).as_dict() {
                    self.collect_tree(kid, depth + 1);
                }
            }
        }
    }

    /// The destination array behind a name. The value is either the array
    /// itself or a dictionary holding it under `/D`.
    fn lookup(&self, name: &[u8]) -> Option<&'a [Object]> {
        let value = self.source.resolve(*self.entries.get(name)?);
        match value {
            Object::Array(arr) => Some(arr.as_slice()),
            Object::Dictionary(dict) => {
                let d = dict.get(b"D").ok()?;
                self.source.resolve(d).as_array().ok().map(Vec::as_slice)
            }
            _ => None,
        }
    }
}

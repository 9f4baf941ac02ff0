//! Page labels from the catalog's `/PageLabels` number tree.

use lopdf::{Dictionary, Object};

use super::backend::LopdfSource;
use crate::text::decode_pdf_string;

/// Largest number rendered as roman numerals or letters.
const MAX_NON_DECIMAL: u32 = 100_000;

/// Numbering style of a label range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LabelStyle {
    Decimal,
    UpperRoman,
    LowerRoman,
    UpperAlpha,
    LowerAlpha,
}

impl LabelStyle {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"D" => Some(Self::Decimal),
            b"R" => Some(Self::UpperRoman),
            b"r" => Some(Self::LowerRoman),
            b"A" => Some(Self::UpperAlpha),
            b"a" => Some(Self::LowerAlpha),
            _ => None,
        }
    }

    fn format(self, n: u32) -> Option<String> {
        // Roman and letter labels grow linearly with the number
        if self != Self::Decimal && n > MAX_NON_DECIMAL {
            return None;
        }
        Some(match self {
            Self::Decimal => n.to_string(),
            Self::UpperRoman => roman(n),
            Self::LowerRoman => roman(n).to_lowercase(),
            Self::UpperAlpha => alpha(n),
            Self::LowerAlpha => alpha(n).to_lowercase(),
        })
    }
}

/// Labelling rule starting at a page index.
#[derive(Debug, Clone)]
struct LabelRange {
    first_page: usize,
    style: Option<LabelStyle>,
    prefix: String,
    start: u32,
}

impl LabelRange {
    fn label(&self, index: usize) -> Option<String> {
        let mut label = self.prefix.clone();
        if let Some(style) = self.style {
            let offset = u32::try_from(index - self.first_page).ok()?;
            let number = self.start.checked_add(offset)?;
            label.push_str(&style.format(number)?);
        }
        (!label.is_empty()).then_some(label)
    }
}

/// Labels for the first `count` pages. Pages outside any labelled range
/// (or every page, when the document has no labels) get `None`.
pub fn page_labels(source: &LopdfSource, count: usize) -> Vec<Option<String>> {
    let mut ranges = Vec::new();
    if let Some(tree) = source
        .catalog()
        .and_then(|catalog| catalog.get(b"PageLabels").ok())
        .and_then(|obj| source.resolve(obj).as_dict().ok())
    {
        collect_ranges(source, tree, &mut ranges, 0);
    }
    ranges.sort_by_key(|r| r.first_page);

    (0..count)
        .map(|index| {
            ranges
                .iter()
                .rev()
                .find(|r| r.first_page <= index)
                .and_then(|r| r.label(index))
        })
        .collect()
}

/// Walk a number tree node.
fn collect_ranges(
    source: &LopdfSource,
    node: &Dictionary,
    ranges: &mut Vec<LabelRange>,
    depth: usize,
) {
    if depth > 16 {
        log::warn!("PageLabels tree too deep, ignoring the rest");
        return;
    }

    if let Ok(nums) = node.get(b"Nums").and_then(|o| source.resolve(o).as_array()) {
        for pair in nums.chunks(2) {
            let [key, value] = pair else { continue };
            let Ok(first_page) = source.resolve(key).as_i64() else {
                continue;
            };
            let Ok(dict) = source.resolve(value).as_dict() else {
                continue;
            };
            ranges.push(parse_range(source, first_page.max(0) as usize, dict));
        }
    }

    if let Ok(kids) = node.get(b"Kids").and_then(|o| source.resolve(o).as_array()) {
        for kid in kids {
            if let Ok(kid) = source.resolve(kid).as_dict() {
                collect_ranges(source, kid, ranges, depth + 1);
            }
        }
    }
}

fn parse_range(source: &LopdfSource, first_page: usize, dict: &Dictionary) -> LabelRange {
    let style = dict
        .get(b"S")
        .ok()
        .and_then(|o| o.as_name().ok())
        .and_then(LabelStyle::from_name);
    let prefix = match dict.get(b"P").map(|o| source.resolve(o)) {
        Ok(Object::String(bytes, _)) => decode_pdf_string(bytes),
        _ => String::new(),
    };
    let start = dict
        .get(b"St")
        .ok()
        .and_then(|o| source.resolve(o).as_i64().ok())
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| *n > 0)
        .unwrap_or(1);

    LabelRange {
        first_page,
        style,
        prefix,
        start,
    }
}

fn roman(mut n: u32) -> String {
    const NUMERALS: [(u32, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    let mut out = String::new();
    for (value, numeral) in NUMERALS {
        while n >= value {
            out.push_str(numeral);
            n -= value;
        }
    }
    out
}

/// A..Z, then AA..ZZ, then AAA..
fn alpha(n: u32) -> String {
    if n == 0 {
        return String::new();
    }
    let letter = (b'A' + ((n - 1) % 26) as u8) as char;
    std::iter::repeat(letter)
        .take(((n - 1) / 26 + 1) as usize)
        .collect()
}

//! Text normalisation shared by the capture pass, annotation parsing and
//! sentence alignment.

use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Typographic ligatures and their decomposition.
const LIGATURES: &[(char, &str)] = &[
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
    ('\u{FB05}', "st"),
    ('\u{FB06}', "st"),
];

fn sentence_end() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?]\s+").expect("sentence boundary pattern is valid"))
}

fn horizontal_space_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[ \t]{2,}").expect("whitespace pattern is valid"))
}

/// Normalise extracted text: unify line endings, expand ligatures, replace
/// typographic quotes and ellipses, collapse runs of horizontal whitespace
/// and apply Unicode NFC.
pub fn cleanup_text(text: &str) -> String {
    let text = normalize_line_endings(text);

    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if let Some((_, expanded)) = LIGATURES.iter().find(|(lig, _)| *lig == c) {
            out.push_str(expanded);
            continue;
        }
        match c {
            '\u{2018}' | '\u{2019}' | '\u{201B}' => out.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{201F}' => out.push('"'),
            '\u{2026}' => out.push_str("..."),
            '\u{00A0}' => out.push(' '),
            '\u{FFFD}' => {}
            _ => out.push(c),
        }
    }

    let collapsed = horizontal_space_run().replace_all(&out, " ");
    collapsed.nfc().collect()
}

/// Replace `\r\n` and lone `\r` with `\n`.
pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Join text that was wrapped across lines: a hyphen at the end of a line
/// keeps the hyphen and drops the break, any other break becomes a space.
pub fn join_wrapped_lines(text: &str) -> String {
    normalize_line_endings(text)
        .replace("-\n", "-")
        .replace('\n', " ")
}

/// Split text into sentences after `.`, `!` or `?` followed by whitespace.
///
/// The terminating punctuation stays with its sentence; the whitespace run
/// after it is dropped. Sentences are returned untrimmed.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for m in sentence_end().find_iter(text) {
        // Punctuation is a single ASCII byte
        sentences.push(&text[start..m.start() + 1]);
        start = m.end();
    }
    sentences.push(&text[start..]);
    sentences
}

/// Decode a PDF text string: UTF-16BE or UTF-8 with a byte order mark,
/// otherwise PDFDocEncoding (treated as Latin-1).
pub fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8_lossy(rest).into_owned();
    }
    bytes.iter().map(|&b| b as char).collect()
}

/// Parse a PDF date string (`D:YYYYMMDDHHmmSSOHH'mm'`).
///
/// Everything after the year is optional. A missing or `Z` offset is UTC.
pub fn parse_pdf_date(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    let s = s.strip_prefix("D:").unwrap_or(s);

    if s.len() < 4 {
        return None;
    }

    let year: i32 = s.get(0..4)?.parse().ok()?;
    let month: u32 = s.get(4..6).and_then(|m| m.parse().ok()).unwrap_or(1);
    let day: u32 = s.get(6..8).and_then(|d| d.parse().ok()).unwrap_or(1);
    let hour: u32 = s.get(8..10).and_then(|h| h.parse().ok()).unwrap_or(0);
    let minute: u32 = s.get(10..12).and_then(|m| m.parse().ok()).unwrap_or(0);
    let second: u32 = s.get(12..14).and_then(|s| s.parse().ok()).unwrap_or(0);

    let offset = s.get(14..).map(parse_offset).unwrap_or(Some(0))?;
    let tz = FixedOffset::east_opt(offset)?;

    let naive = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)?;
    tz.from_local_datetime(&naive).single()
}

/// Offset in seconds from a `Z`, `+HH'mm'` or `-HH'mm` suffix.
fn parse_offset(s: &str) -> Option<i32> {
    let mut chars = s.chars();
    let sign = match chars.next() {
        None | Some('Z') => return Some(0),
        Some('+') => 1,
        Some('-') => -1,
        Some(_) => return None,
    };
    let digits: String = chars.filter(|c| c.is_ascii_digit()).collect();
    let hours: i32 = digits.get(0..2)?.parse().ok()?;
    let minutes: i32 = digits.get(2..4).and_then(|m| m.parse().ok()).unwrap_or(0);
    Some(sign * (hours * 3600 + minutes * 60))
}

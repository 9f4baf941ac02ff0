//! Finds the sentences of page text that an annotation's text belongs to.
//!
//! Both texts are split with the same lightweight rule: a sentence ends at
//! `.`, `!` or `?` followed by whitespace. The first page sentence that
//! contains the annotation's first fragment opens the window; each further
//! fragment must appear in the sentence right after the window, otherwise
//! the window stops growing.

use crate::model::Annotation;
use crate::text::{join_wrapped_lines, split_sentences};

/// Locate the page sentence(s) containing `annotation_text`.
///
/// Returns the matched sentences joined by single spaces, or `None` when
/// the annotation text is blank or its first fragment is on no sentence.
///
/// # Example
///
/// ```
/// use annotext::context::align_sentences;
///
/// let page = "The cat sat. It was happy. The dog barked.";
/// assert_eq!(
///     align_sentences(page, "It was happy.").as_deref(),
///     Some("It was happy.")
/// );
/// ```
pub fn align_sentences(page_text: &str, annotation_text: &str) -> Option<String> {
    let annotation_text = join_wrapped_lines(annotation_text);
    let annotation_text = annotation_text.trim();
    if annotation_text.is_empty() {
        return None;
    }

    let page_text = join_wrapped_lines(page_text);
    let sentences: Vec<&str> = split_sentences(&page_text)
        .into_iter()
        .map(str::trim)
        .collect();
    let fragments: Vec<&str> = split_sentences(annotation_text)
        .into_iter()
        .map(str::trim)
        .collect();

    let first = fragments.first()?;
    let start = sentences.iter().position(|s| s.contains(first))?;

    let mut end = start;
    for fragment in &fragments[1..] {
        match sentences.get(end + 1) {
            Some(next) if next.contains(fragment) => end += 1,
            _ => break,
        }
    }

    Some(sentences[start..=end].join(" "))
}

/// Set `context` on every annotation of a page from its captured text.
/// Returns how many annotations received a context.
pub fn align_page(page_text: &str, annotations: &mut [Annotation]) -> usize {
    let mut aligned = 0;
    for annot in annotations.iter_mut() {
        annot.context = annot
            .text
            .as_deref()
            .and_then(|text| align_sentences(page_text, text));
        if annot.context.is_some() {
            aligned += 1;
        }
    }
    aligned
}

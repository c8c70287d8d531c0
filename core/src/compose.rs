use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::document::{DocId, Document};
use crate::extract::collapse_whitespace;
use crate::intent::{Intent, GENERIC_INTRO};
use crate::snapshot::Snapshot;

/// Snippet window around the earliest key-term occurrence.
const WINDOW_BEFORE: usize = 100;
const WINDOW_AFTER: usize = 300;

const MAX_SENTENCES: usize = 3;
const MAX_SOURCES: usize = 3;

const NO_SNIPPET: &str = "The linked page has relevant information about your question.";
const FOOTER: &str =
    " See the linked pages for full details, or reach out to our staff if you need more help.";

lazy_static! {
    static ref SENTENCE_BOUNDARY: Regex = Regex::new(r"[.!?]\s+").expect("valid regex");
}

/// A document surfaced alongside a composed answer.
#[derive(Debug, Clone, Serialize)]
pub struct Source {
    pub url: String,
    pub title: String,
    pub section: String,
}

#[derive(Debug, Clone)]
pub struct ComposedAnswer {
    pub text: String,
    pub sources: Vec<Source>,
}

/// Compose the final answer from ranked results: a trimmed snippet from
/// the best document wrapped in the intent's intro and the fixed
/// footer, plus up to three source links.
pub fn compose(
    snapshot: &Snapshot,
    results: &[DocId],
    key_terms: &[String],
    intent: Option<&Intent>,
) -> ComposedAnswer {
    let sources: Vec<Source> = results
        .iter()
        .take(MAX_SOURCES)
        .filter_map(|id| snapshot.doc(*id))
        .map(|doc| Source {
            url: doc.url.clone(),
            title: doc.title.clone(),
            section: doc.section.clone(),
        })
        .collect();

    let snippet = results
        .first()
        .and_then(|id| snapshot.doc(*id))
        .map(|doc| snippet_sentences(doc, key_terms))
        .unwrap_or_default();

    let body = if snippet.is_empty() {
        NO_SNIPPET.to_string()
    } else {
        snippet.join(" ")
    };
    let intro = intent.map(|i| i.intro).unwrap_or(GENERIC_INTRO);

    ComposedAnswer {
        text: format!("{intro}{body}{FOOTER}"),
        sources,
    }
}

/// Extract the snippet window from a document and split it into at most
/// MAX_SENTENCES segments.
fn snippet_sentences(doc: &Document, key_terms: &[String]) -> Vec<String> {
    let window = snippet_window(&doc.text, key_terms);
    let mut sentences = split_sentences(&window);
    sentences.truncate(MAX_SENTENCES);
    sentences
}

/// A bounded excerpt centered near the earliest key-term occurrence
/// (offset 0 when no term occurs), whitespace-collapsed and trimmed.
pub fn snippet_window(text: &str, key_terms: &[String]) -> String {
    let offset = key_terms
        .iter()
        .filter_map(|term| find_case_insensitive(text, term))
        .min()
        .unwrap_or(0);
    let start = char_floor(text, offset.saturating_sub(WINDOW_BEFORE));
    let end = char_ceil(text, (offset + WINDOW_AFTER).min(text.len()));
    collapse_whitespace(&text[start..end])
}

/// Byte offset in `haystack` where `needle` first matches, compared
/// case-insensitively. Scans the original string so the offset stays
/// valid even when lowercasing changes byte lengths.
fn find_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    let needle: Vec<char> = needle.chars().flat_map(char::to_lowercase).collect();
    if needle.is_empty() {
        return Some(0);
    }
    haystack.char_indices().map(|(i, _)| i).find(|&i| {
        haystack[i..]
            .chars()
            .flat_map(char::to_lowercase)
            .take(needle.len())
            .eq(needle.iter().copied())
    })
}

fn split_sentences(window: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut start = 0;
    for m in SENTENCE_BOUNDARY.find_iter(window) {
        // Keep the terminating punctuation, drop the whitespace.
        let segment = window[start..m.start() + 1].trim();
        if !segment.is_empty() {
            out.push(segment.to_string());
        }
        start = m.end();
    }
    let rest = window[start..].trim();
    if !rest.is_empty() {
        out.push(rest.to_string());
    }
    out
}

fn char_floor(s: &str, mut i: usize) -> usize {
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

fn char_ceil(s: &str, mut i: usize) -> usize {
    while i < s.len() && !s.is_char_boundary(i) {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_terminal_punctuation() {
        let parts = split_sentences("One here. Two there! Three? And a tail");
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], "One here.");
        assert_eq!(parts[1], "Two there!");
        assert_eq!(parts[2], "Three?");
        assert_eq!(parts[3], "And a tail");
    }

    #[test]
    fn window_contains_a_key_term() {
        let filler = "x".repeat(500);
        let text = format!("{filler} The front desk is open from 9am. More text follows here.");
        let window = snippet_window(&text, &["desk".to_string()]);
        assert!(window.contains("desk"));
    }

    #[test]
    fn window_offset_tracks_original_bytes() {
        // U+0130 lowercases to two chars, so a lowered copy of the text
        // is longer than the original; the window must still land on
        // the term's position in the original.
        let prefix = "İ".repeat(120);
        let text = format!("{prefix}Visit the Registrar office today.");
        let window = snippet_window(&text, &["registrar".to_string()]);
        assert!(window.contains("Registrar office today"));
    }

    #[test]
    fn window_defaults_to_text_start() {
        let text = "No matching vocabulary in this text at all.";
        let window = snippet_window(text, &["zzz".to_string()]);
        assert!(window.starts_with("No matching"));
    }
}

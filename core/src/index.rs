use std::collections::HashMap;

use crate::document::{DocId, Document};
use crate::tokenizer::tokenize;

pub type TermId = u32;

pub const NUM_FIELDS: usize = 3;

/// Relative field importance: title > section > text.
pub const FIELD_BOOSTS: [f32; NUM_FIELDS] = [6.0, 3.0, 1.0];

const FIELD_TITLE: usize = 0;
const FIELD_SECTION: usize = 1;
const FIELD_TEXT: usize = 2;

/// Match quality applied when a query token is only a prefix of the
/// indexed term rather than an exact hit.
const PREFIX_QUALITY: f32 = 0.75;

#[derive(Debug, Clone, Copy)]
pub struct Posting {
    pub doc_id: DocId,
    pub tf: u32,
}

/// How per-token matches combine into document hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combine {
    /// Every query token must match the document (conjunctive).
    All,
    /// Any matching token contributes (disjunctive).
    Any,
}

#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
    /// Edit-distance budget as a fraction of the query token length.
    pub fuzziness: f32,
    /// Whether a query token may match indexed terms it is a prefix of.
    pub prefix: bool,
    pub combine: Combine,
}

#[derive(Debug, Clone, Copy)]
pub struct Hit {
    pub doc_id: DocId,
    pub score: f32,
}

/// In-memory inverted index over the title/section/text fields of a
/// document set. Rebuilt deterministically from the persisted document
/// list; never mutated after construction.
#[derive(Default)]
pub struct SearchIndex {
    dictionary: HashMap<String, TermId>,
    vocab: Vec<String>,
    postings: Vec<[Vec<Posting>; NUM_FIELDS]>,
    num_docs: u32,
}

impl SearchIndex {
    pub fn build(docs: &[Document]) -> Self {
        let mut index = SearchIndex {
            num_docs: docs.len() as u32,
            ..SearchIndex::default()
        };
        for doc in docs {
            index.add_field(doc.id, FIELD_TITLE, &doc.title);
            index.add_field(doc.id, FIELD_SECTION, &doc.section);
            index.add_field(doc.id, FIELD_TEXT, &doc.text);
        }
        index
    }

    pub fn num_docs(&self) -> u32 {
        self.num_docs
    }

    pub fn num_terms(&self) -> usize {
        self.vocab.len()
    }

    fn add_field(&mut self, doc_id: DocId, field: usize, text: &str) {
        let mut tf_counts: HashMap<TermId, u32> = HashMap::new();
        for term in tokenize(text) {
            let tid = self.intern(term);
            *tf_counts.entry(tid).or_insert(0) += 1;
        }
        for (tid, tf) in tf_counts {
            self.postings[tid as usize][field].push(Posting { doc_id, tf });
        }
    }

    fn intern(&mut self, term: String) -> TermId {
        if let Some(&tid) = self.dictionary.get(&term) {
            return tid;
        }
        let tid = self.vocab.len() as TermId;
        self.vocab.push(term.clone());
        self.dictionary.insert(term, tid);
        self.postings.push([Vec::new(), Vec::new(), Vec::new()]);
        tid
    }

    /// Search with per-field boosts. Each query token is matched against
    /// the vocabulary exactly, by prefix, and by bounded edit distance;
    /// a document's score sums boost x tf x match-quality over all
    /// matched terms and fields.
    pub fn search(&self, query: &str, opts: SearchOptions) -> Vec<Hit> {
        let mut q_tokens = tokenize(query);
        q_tokens.sort();
        q_tokens.dedup();
        if q_tokens.is_empty() {
            return Vec::new();
        }

        let mut scores: HashMap<DocId, f32> = HashMap::new();
        let mut match_counts: HashMap<DocId, usize> = HashMap::new();
        for token in &q_tokens {
            let mut token_docs: HashMap<DocId, f32> = HashMap::new();
            for (tid, quality) in self.matching_terms(token, &opts) {
                for field in 0..NUM_FIELDS {
                    for p in &self.postings[tid][field] {
                        *token_docs.entry(p.doc_id).or_insert(0.0) +=
                            FIELD_BOOSTS[field] * p.tf as f32 * quality;
                    }
                }
            }
            for (doc_id, s) in token_docs {
                *scores.entry(doc_id).or_insert(0.0) += s;
                *match_counts.entry(doc_id).or_insert(0) += 1;
            }
        }

        if opts.combine == Combine::All {
            scores.retain(|doc_id, _| match_counts.get(doc_id) == Some(&q_tokens.len()));
        }

        let mut hits: Vec<Hit> = scores
            .into_iter()
            .map(|(doc_id, score)| Hit { doc_id, score })
            .collect();
        // Ties break toward the earlier document.
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.doc_id.cmp(&b.doc_id))
        });
        hits
    }

    /// Linear vocabulary scan; a single site's vocabulary is small enough
    /// that automata or tries would not pay for themselves.
    fn matching_terms(&self, token: &str, opts: &SearchOptions) -> Vec<(usize, f32)> {
        let token_len = token.chars().count();
        let budget = (token_len as f32 * opts.fuzziness).floor() as usize;
        let mut out = Vec::new();
        for (tid, term) in self.vocab.iter().enumerate() {
            let quality = if term == token {
                Some(1.0)
            } else if opts.prefix && term.starts_with(token) {
                Some(PREFIX_QUALITY)
            } else if budget > 0 {
                bounded_levenshtein(token, term, budget)
                    .map(|d| 1.0 - d as f32 / token_len as f32)
            } else {
                None
            };
            if let Some(q) = quality {
                out.push((tid, q));
            }
        }
        out
    }
}

/// Levenshtein distance between `a` and `b`, or None when it exceeds
/// `max`. Two-row DP with an early length-difference cutoff.
pub fn bounded_levenshtein(a: &str, b: &str, max: usize) -> Option<usize> {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.len().abs_diff(b.len()) > max {
        return None;
    }
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr: Vec<usize> = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        let mut row_min = curr[0];
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
            row_min = row_min.min(curr[j + 1]);
        }
        if row_min > max {
            return None;
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    let dist = prev[b.len()];
    if dist <= max {
        Some(dist)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levenshtein_basics() {
        assert_eq!(bounded_levenshtein("hours", "hours", 2), Some(0));
        assert_eq!(bounded_levenshtein("hours", "huors", 2), Some(2));
        assert_eq!(bounded_levenshtein("hours", "ours", 2), Some(1));
        assert_eq!(bounded_levenshtein("hours", "parking", 2), None);
    }

    #[test]
    fn levenshtein_respects_bound() {
        assert_eq!(bounded_levenshtein("abc", "xyz", 2), None);
        assert_eq!(bounded_levenshtein("abc", "xyz", 3), Some(3));
    }
}

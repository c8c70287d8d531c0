use tracing::debug;

use crate::document::DocId;
use crate::index::{Combine, SearchOptions};
use crate::intent::Intent;
use crate::snapshot::Snapshot;

/// URL/title markers identifying a front-desk page for the hours
/// promotion rule.
const FRONT_DESK_MARKERS: &[&str] = &["front-desk", "front_desk", "frontdesk", "front desk"];

/// Run the retrieval cascade: each stage only executes when the
/// previous one returned zero hits, and only one stage's results are
/// ever used.
///
/// 1. expanded query, tight fuzziness, all tokens required
/// 2. expanded query, looser fuzziness, any token
/// 3. raw question, loosest fuzziness, any token
/// 4. literal key-term overlap against title+section, best single doc
pub fn retrieve(
    snapshot: &Snapshot,
    question: &str,
    intent: Option<&Intent>,
    expanded: &str,
    key_terms: &[String],
) -> Vec<DocId> {
    let stages: [(&str, SearchOptions); 3] = [
        (
            expanded,
            SearchOptions {
                fuzziness: 0.25,
                prefix: true,
                combine: Combine::All,
            },
        ),
        (
            expanded,
            SearchOptions {
                fuzziness: 0.4,
                prefix: true,
                combine: Combine::Any,
            },
        ),
        (
            question,
            SearchOptions {
                fuzziness: 0.5,
                prefix: true,
                combine: Combine::Any,
            },
        ),
    ];

    let mut results: Vec<DocId> = Vec::new();
    for (stage, (query, opts)) in stages.iter().enumerate() {
        let hits = snapshot.index.search(query, *opts);
        if !hits.is_empty() {
            debug!(stage = stage + 1, hits = hits.len(), "cascade stage hit");
            results = hits.into_iter().map(|h| h.doc_id).collect();
            break;
        }
    }
    if results.is_empty() {
        if let Some(doc_id) = literal_fallback(snapshot, key_terms) {
            debug!(doc_id, "literal fallback hit");
            results.push(doc_id);
        }
    }

    if intent.map(|i| i.id) == Some("hours") {
        promote_front_desk(snapshot, &mut results);
    }
    results
}

/// Stage 4: score every document by how many key terms occur literally
/// in its title+section; return the single best, ties broken by first
/// occurrence.
fn literal_fallback(snapshot: &Snapshot, key_terms: &[String]) -> Option<DocId> {
    let mut best: Option<(DocId, usize)> = None;
    for doc in &snapshot.documents {
        let haystack = format!("{} {}", doc.title, doc.section).to_lowercase();
        let count = key_terms
            .iter()
            .filter(|term| haystack.contains(term.as_str()))
            .count();
        if count > 0 && best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((doc.id, count));
        }
    }
    best.map(|(doc_id, _)| doc_id)
}

/// If a front-desk page ranked below the top spot, move it to the top
/// without otherwise reordering.
fn promote_front_desk(snapshot: &Snapshot, results: &mut Vec<DocId>) {
    for pos in 1..results.len() {
        let Some(doc) = snapshot.doc(results[pos]) else {
            continue;
        };
        let url = doc.url.to_lowercase();
        let title = doc.title.to_lowercase();
        if FRONT_DESK_MARKERS
            .iter()
            .any(|m| url.contains(m) || title.contains(m))
        {
            let id = results.remove(pos);
            results.insert(0, id);
            return;
        }
    }
}

use crate::document::{DocId, Document};
use crate::index::SearchIndex;

/// An immutable, fully-built document set plus its derived index.
/// Rebuilding produces a brand-new snapshot; readers hold an `Arc` to
/// whichever snapshot was live when they started.
pub struct Snapshot {
    pub documents: Vec<Document>,
    pub index: SearchIndex,
}

impl Snapshot {
    /// Build the search index for a document set. Deterministic: the
    /// same documents always produce the same index.
    pub fn build(documents: Vec<Document>) -> Self {
        let index = SearchIndex::build(&documents);
        Snapshot { documents, index }
    }

    pub fn doc(&self, id: DocId) -> Option<&Document> {
        self.documents.get(id as usize)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

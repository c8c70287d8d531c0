use serde::{Deserialize, Serialize};

pub type DocId = u32;

/// A single crawled page. Ids are dense 0-based indexes assigned when a
/// document set is constructed; a document never changes after that.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub url: String,
    pub title: String,
    pub section: String,
    pub text: String,
}

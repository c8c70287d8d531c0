pub mod compose;
pub mod document;
pub mod extract;
pub mod index;
pub mod intent;
pub mod persist;
pub mod retrieve;
pub mod snapshot;
pub mod tokenizer;

pub use document::{DocId, Document};
pub use snapshot::Snapshot;

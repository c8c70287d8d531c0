use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{BufReader, Write};
use std::path::Path;

use crate::document::Document;

/// On-disk snapshot format: just the document list. The index is
/// derived and rebuilt from it at load time.
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotFile {
    documents: Vec<Document>,
}

pub fn save_documents(path: &Path, documents: &[Document]) -> Result<()> {
    if let Some(dir) = path.parent() {
        create_dir_all(dir)
            .with_context(|| format!("creating snapshot directory {}", dir.display()))?;
    }
    let file = SnapshotFile {
        documents: documents.to_vec(),
    };
    let json = serde_json::to_string_pretty(&file)?;
    let mut f =
        File::create(path).with_context(|| format!("creating snapshot {}", path.display()))?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

/// Load the persisted document list. Missing or malformed files are
/// errors; callers treat either as "no snapshot" and start empty.
pub fn load_documents(path: &Path) -> Result<Vec<Document>> {
    let f = File::open(path).with_context(|| format!("opening snapshot {}", path.display()))?;
    let file: SnapshotFile = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parsing snapshot {}", path.display()))?;
    Ok(file.documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn doc(id: u32, title: &str) -> Document {
        Document {
            id,
            url: format!("https://example.edu/{id}"),
            title: title.into(),
            section: String::new(),
            text: "some text".into(),
        }
    }

    #[test]
    fn round_trips_documents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("documents.json");
        let docs = vec![doc(0, "First"), doc(1, "Second")];
        save_documents(&path, &docs).unwrap();
        let loaded = load_documents(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1].title, "Second");
    }

    #[test]
    fn missing_snapshot_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(load_documents(&dir.path().join("nope.json")).is_err());
    }

    #[test]
    fn malformed_snapshot_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("documents.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(load_documents(&path).is_err());
    }
}

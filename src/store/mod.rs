//! Flat-file record store.
//!
//! Each collection lives in a single JSON file holding a pretty-printed
//! array of records. There is no indexing and no partial update: every
//! mutation reads the whole collection into memory and writes the whole
//! collection back out. Overwrites are done in place with no temp-file
//! rename step, so a crash mid-write can corrupt the file. Both properties
//! are accepted limitations at the data volumes this service handles.

mod models;
mod repo;

pub use models::*;
pub use repo::AuthRepository;

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// One typed collection persisted as a JSON array file.
pub struct JsonStore<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T> JsonStore<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record in file order. A missing file is an empty
    /// collection, not an error; any other I/O failure or malformed JSON
    /// propagates to the caller.
    pub async fn read_all(&self) -> Result<Vec<T>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read {}", self.path.display()))
            }
        };

        serde_json::from_str(&content)
            .with_context(|| format!("Malformed collection file {}", self.path.display()))
    }

    /// Serialize the full collection and overwrite the file, creating
    /// parent directories as needed.
    pub async fn write_all(&self, records: &[T]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(records)
            .context("Failed to serialize collection")?;

        tokio::fs::write(&self.path, json)
            .await
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Record {
        id: String,
        value: i64,
    }

    fn store_in(dir: &Path) -> JsonStore<Record> {
        JsonStore::new(dir.join("records.json"))
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        assert!(store.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store: JsonStore<Record> = JsonStore::new(dir.path().join("a/b/records.json"));
        store.write_all(&[]).await.unwrap();
        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn round_trip_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let records = vec![
            Record { id: "b".into(), value: 2 },
            Record { id: "a".into(), value: 1 },
        ];
        store.write_all(&records).await.unwrap();
        assert_eq!(store.read_all().await.unwrap(), records);
    }

    #[tokio::test]
    async fn malformed_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        tokio::fs::write(store.path(), "{not json").await.unwrap();
        assert!(store.read_all().await.is_err());
    }

    #[tokio::test]
    async fn rewriting_an_unmodified_collection_is_byte_stable() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let records = vec![
            Record { id: "a".into(), value: 1 },
            Record { id: "b".into(), value: 2 },
        ];
        store.write_all(&records).await.unwrap();
        let first = tokio::fs::read(store.path()).await.unwrap();

        let reread = store.read_all().await.unwrap();
        store.write_all(&reread).await.unwrap();
        let second = tokio::fs::read(store.path()).await.unwrap();

        assert_eq!(first, second);
    }
}

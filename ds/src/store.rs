//! Core DocStore implementation

use eyre::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A directory of JSON documents, one file per key.
///
/// Writes go through a temp file in the same directory followed by a rename,
/// so a document is always either the previous version or the new one.
#[derive(Debug, Clone)]
pub struct DocStore {
    /// Base path for storage
    root: PathBuf,
}

impl DocStore {
    /// Open or create a document store at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        fs::create_dir_all(&root).context("Failed to create store directory")?;
        debug!(?root, "Opened document store");
        Ok(Self { root })
    }

    /// Open an independent substore rooted at `<root>/<namespace>`
    ///
    /// The namespace must be a single path component; keys written through
    /// the substore never collide with the parent store's keys.
    pub fn scoped(&self, namespace: &str) -> Result<Self> {
        if namespace.is_empty() || namespace.contains(['/', '\\']) || namespace == "." || namespace == ".." {
            return Err(eyre::eyre!("Invalid store namespace: '{}'", namespace));
        }
        Self::open(self.root.join(namespace))
    }

    /// Root directory of this store
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the document backing a key
    pub fn doc_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }

    /// Check whether a document exists for the key
    pub fn contains(&self, key: &str) -> bool {
        self.doc_path(key).is_file()
    }

    /// Read and deserialize the document for a key, `None` if absent
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = self.doc_path(key);
        if !path.is_file() {
            debug!(key, "read: no document");
            return Ok(None);
        }
        let content = fs::read_to_string(&path).context(format!("Failed to read document: {}", path.display()))?;
        let value = serde_json::from_str(&content).context(format!("Malformed document: {}", path.display()))?;
        Ok(Some(value))
    }

    /// Serialize and atomically write the document for a key
    ///
    /// Documents are rendered with 4-space indentation so diffs of the data
    /// directory stay stable across runs.
    pub fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        value
            .serialize(&mut ser)
            .context(format!("Failed to serialize document '{}'", key))?;
        buf.push(b'\n');

        let path = self.doc_path(key);
        let mut tmp = tempfile::NamedTempFile::new_in(&self.root).context("Failed to create temp file")?;
        tmp.write_all(&buf).context("Failed to write temp file")?;
        tmp.persist(&path)
            .context(format!("Failed to persist document: {}", path.display()))?;
        debug!(key, bytes = buf.len(), "write: document persisted");
        Ok(())
    }

    /// List the keys of all documents in this store
    pub fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().map(|e| e == "json").unwrap_or(false)
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}

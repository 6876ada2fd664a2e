//! The accumulated schedule corpus
//!
//! Keyed by repository, then by file path. Re-discovering a (repository,
//! path) pair overwrites its entry list, so repeated runs are idempotent
//! while newly discovered pairs keep accumulating.

use docstore::DocStore;
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::extract::ScheduleEntry;

/// Document key the corpus is persisted under
pub const CORPUS_KEY: &str = "crons";

/// Persistent collection of every schedule list discovered so far
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Corpus {
    repositories: BTreeMap<String, BTreeMap<String, Vec<ScheduleEntry>>>,
}

impl Corpus {
    /// Load prior accumulated state; an absent document yields an empty
    /// corpus (first run)
    pub fn load(store: &DocStore) -> Result<Self> {
        let corpus: Option<Self> = store.read(CORPUS_KEY).context("Failed to load corpus")?;
        let corpus = corpus.unwrap_or_default();
        debug!(
            repositories = corpus.repository_count(),
            files = corpus.file_count(),
            "load: corpus ready"
        );
        Ok(corpus)
    }

    /// Serialize the full corpus as one atomic write
    pub fn persist(&self, store: &DocStore) -> Result<()> {
        store.write(CORPUS_KEY, self).context("Failed to persist corpus")
    }

    /// Insert or overwrite the entry list for a (repository, path) pair
    pub fn record(&mut self, repository: &str, path: &str, entries: Vec<ScheduleEntry>) {
        self.repositories
            .entry(repository.to_string())
            .or_default()
            .insert(path.to_string(), entries);
    }

    /// Every schedule entry across all repositories and files
    pub fn entries(&self) -> impl Iterator<Item = &ScheduleEntry> {
        self.repositories.values().flat_map(|files| files.values()).flatten()
    }

    pub fn repository_count(&self) -> usize {
        self.repositories.len()
    }

    pub fn file_count(&self) -> usize {
        self.repositories.values().map(|files| files.len()).sum()
    }

    pub fn entry_count(&self) -> usize {
        self.entries().count()
    }
}

//! GitHub API wire types and search primitives

use serde::Deserialize;

/// Result ordering for code search
///
/// The search index caps returned results far below the true match count, so
/// the pipeline randomizes the order per run to sample a different slice of
/// the window each time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOrder {
    Ascending,
    Descending,
}

impl SearchOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchOrder::Ascending => "asc",
            SearchOrder::Descending => "desc",
        }
    }

    /// Pick asc or desc with equal probability
    pub fn random() -> Self {
        if rand::random() {
            SearchOrder::Ascending
        } else {
            SearchOrder::Descending
        }
    }
}

/// One searchable file location discovered by code search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Owning repository, e.g. "org/repo"
    pub repository: String,
    /// File path within the repository
    pub path: String,
}

/// One page of code search results
#[derive(Debug, Clone)]
pub struct SearchPage {
    /// Total matches reported by the index (not the number retrievable)
    pub total_count: u64,
    pub candidates: Vec<Candidate>,
}

// GitHub API response types

#[derive(Debug, Deserialize)]
pub(crate) struct CodeSearchResponse {
    pub total_count: u64,
    pub items: Vec<CodeSearchItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CodeSearchItem {
    pub path: String,
    pub repository: RepositoryRef,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RepositoryRef {
    pub full_name: String,
}

impl From<CodeSearchResponse> for SearchPage {
    fn from(response: CodeSearchResponse) -> Self {
        SearchPage {
            total_count: response.total_count,
            candidates: response
                .items
                .into_iter()
                .map(|item| Candidate {
                    repository: item.repository.full_name,
                    path: item.path,
                })
                .collect(),
        }
    }
}

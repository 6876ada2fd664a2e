//! Scan orchestration
//!
//! Composes search, fetch, extraction, the corpus, and the aggregator into
//! one sequential run. Candidates are processed as each search page arrives;
//! per-candidate failures are logged skips, never fatal. Persistence happens
//! once, after all processing.

use docstore::DocStore;
use eyre::{Context, Result};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::corpus::Corpus;
use crate::extract::extract_schedules;
use crate::github::{Candidate, GitHubClient, SEARCH_PAGE_SIZE, SEARCH_RESULT_CAP, SearchOrder};
use crate::stats::{self, Reports};

/// Document keys for the derived artifacts
pub const FREQUENCIES_KEY: &str = "frequencies";
pub const DESCRIPTIONS_KEY: &str = "descriptions";
pub const TIMES_KEY: &str = "times";
pub const DAY_OF_WEEK_KEY: &str = "day_of_week";

/// What a run should cover
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// The entire search index, into the shared global corpus
    Full,
    /// One account's repositories, into an account-scoped corpus
    Account(String),
}

/// Counters reported at the end of a run
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Total matches the search index reported
    pub discovered: u64,
    /// Candidates actually processed
    pub processed: usize,
    /// Candidates skipped on fetch or extraction failure
    pub skipped: usize,
    /// Corpus size after the run
    pub repositories: usize,
    pub files: usize,
    pub schedules: usize,
}

/// The scan pipeline
pub struct Pipeline {
    client: GitHubClient,
    store: DocStore,
    config: Config,
}

/// Build the search query for a scope
fn scan_query(base_query: &str, scope: &Scope) -> String {
    match scope {
        Scope::Full => base_query.to_string(),
        Scope::Account(account) => format!("user:{} {}", account, base_query),
    }
}

/// Write every derived artifact for a corpus snapshot
pub fn persist_reports(store: &DocStore, reports: &Reports) -> Result<()> {
    store.write(FREQUENCIES_KEY, &reports.frequencies)?;
    store.write(DESCRIPTIONS_KEY, &reports.descriptions)?;
    store.write(TIMES_KEY, &reports.times)?;
    store.write(DAY_OF_WEEK_KEY, &reports.day_of_week)?;
    Ok(())
}

impl Pipeline {
    pub fn new(client: GitHubClient, store: DocStore, config: Config) -> Self {
        Self { client, store, config }
    }

    /// Run one scan to completion and persist corpus plus statistics
    pub async fn run(&mut self, scope: &Scope) -> Result<RunSummary> {
        let store = match scope {
            Scope::Full => self.store.clone(),
            Scope::Account(account) => self
                .store
                .scoped(account)
                .context("Failed to open account-scoped store")?,
        };
        let query = scan_query(&self.config.search_query, scope);
        let order = SearchOrder::random();
        info!(%query, order = order.as_str(), "run: starting scan");

        let mut corpus = Corpus::load(&store)?;
        let mut summary = RunSummary::default();

        let mut page = 1;
        let mut current = self.client.search_page(&query, order, page).await?;
        summary.discovered = current.total_count;
        println!("Found {} results from code search", summary.discovered);

        loop {
            let batch_len = current.candidates.len();
            for candidate in std::mem::take(&mut current.candidates) {
                summary.processed += 1;
                println!(
                    "Processing {} of {}: {}/{}",
                    summary.processed, summary.discovered, candidate.repository, candidate.path
                );
                if !self.process_candidate(&candidate, &mut corpus).await {
                    summary.skipped += 1;
                }
            }

            // The index caps retrievable results well below total_count
            let exhausted = batch_len < SEARCH_PAGE_SIZE as usize
                || summary.processed as u64 >= summary.discovered.min(SEARCH_RESULT_CAP);
            if exhausted {
                break;
            }
            page += 1;
            current = self.client.search_page(&query, order, page).await?;
        }

        corpus.persist(&store)?;
        let reports = stats::aggregate(&corpus);
        persist_reports(&store, &reports)?;
        info!(data_dir = %store.root().display(), "run: artifacts persisted");

        summary.repositories = corpus.repository_count();
        summary.files = corpus.file_count();
        summary.schedules = corpus.entry_count();
        Ok(summary)
    }

    /// Fetch one candidate and fold its schedules into the corpus
    ///
    /// Returns false when the candidate was skipped. The scratch clone
    /// directory is removed on drop on every path out of here.
    async fn process_candidate(&mut self, candidate: &Candidate, corpus: &mut Corpus) -> bool {
        let scratch = match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(e) => {
                warn!(error = %e, "process_candidate: could not allocate scratch directory");
                return false;
            }
        };

        if let Err(e) = self
            .client
            .fetch_repository(&candidate.repository, scratch.path(), self.config.clone_depth)
            .await
        {
            warn!(repository = %candidate.repository, error = %e, "process_candidate: fetch failed, skipping");
            return false;
        }

        let file = scratch.path().join(&candidate.path);
        match extract_schedules(&file) {
            Ok(entries) if entries.is_empty() => {
                debug!(repository = %candidate.repository, path = %candidate.path, "process_candidate: no schedules");
                true
            }
            Ok(entries) => {
                debug!(
                    repository = %candidate.repository,
                    path = %candidate.path,
                    count = entries.len(),
                    "process_candidate: recorded"
                );
                corpus.record(&candidate.repository, &candidate.path, entries);
                true
            }
            Err(e) => {
                warn!("Issue reading {}: {}", file.display(), e);
                false
            }
        }
    }
}

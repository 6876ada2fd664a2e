//! GitHub API client implementation
//!
//! Wraps code search and shallow repository fetch. Both operations run
//! through the rate limiter: a quota rejection puts the limiter into its
//! exhausted state and the request is retried after the reset, without
//! bound - the quota is externally replenished, not adversarial.

use reqwest::Client;
use reqwest::header::HeaderMap;
use std::path::Path;
use std::process::Stdio;
use tracing::{debug, info};

use super::types::CodeSearchResponse;
use super::{GithubError, SearchOrder, SearchPage};
use crate::ratelimit::RateLimiter;

const DEFAULT_BASE_URL: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("cronsweep/", env!("CARGO_PKG_VERSION"));

/// Results per search page (GitHub maximum)
pub const SEARCH_PAGE_SIZE: u32 = 100;

/// Hard cap the search index places on retrievable results per query
pub const SEARCH_RESULT_CAP: u64 = 1000;

/// GitHub API client with rate-limit-aware retries
pub struct GitHubClient {
    http: Client,
    token: String,
    base_url: String,
    limiter: RateLimiter,
    skip_lfs: bool,
}

impl GitHubClient {
    /// Create a client using the given access token
    pub fn new(token: String, limiter: RateLimiter, skip_lfs: bool) -> Result<Self, GithubError> {
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            token,
            base_url: DEFAULT_BASE_URL.to_string(),
            limiter,
            skip_lfs,
        })
    }

    /// Override the API base URL (test servers)
    #[allow(dead_code)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch one page of code search results, sorted by index time
    ///
    /// Retries forever on quota exhaustion; every other failure is returned.
    pub async fn search_page(
        &mut self,
        query: &str,
        order: SearchOrder,
        page: u32,
    ) -> Result<SearchPage, GithubError> {
        loop {
            self.limiter.wait_if_needed().await;
            match self.try_search_page(query, order, page).await {
                Err(GithubError::RateLimited { reset }) => {
                    self.limiter.exhausted(reset);
                    continue;
                }
                other => return other,
            }
        }
    }

    async fn try_search_page(
        &mut self,
        query: &str,
        order: SearchOrder,
        page: u32,
    ) -> Result<SearchPage, GithubError> {
        let url = format!("{}/search/code", self.base_url);
        debug!(query, order = order.as_str(), page, "try_search_page: requesting");

        let response = self
            .http
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .query(&[
                ("q", query),
                ("sort", "indexed"),
                ("order", order.as_str()),
                ("per_page", &SEARCH_PAGE_SIZE.to_string()),
                ("page", &page.to_string()),
            ])
            .send()
            .await?;

        let (remaining, reset) = quota_headers(response.headers());
        self.limiter.observe(remaining, reset);

        let status = response.status();
        if (status.as_u16() == 403 || status.as_u16() == 429) && remaining == Some(0) {
            debug!(status = status.as_u16(), "try_search_page: quota exhausted");
            return Err(GithubError::RateLimited {
                reset: reset.and_then(|epoch| chrono::DateTime::from_timestamp(epoch, 0)),
            });
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GithubError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let api_response: CodeSearchResponse = response.json().await?;
        Ok(SearchPage::from(api_response))
    }

    /// Shallow-clone a repository into the destination directory
    ///
    /// LFS smudging is disabled in the child environment when configured, so
    /// large binary attachments are never downloaded. Terminal prompts are
    /// suppressed: a deleted or private repository must fail, not hang.
    pub async fn fetch_repository(
        &mut self,
        repository: &str,
        destination: &Path,
        depth: u32,
    ) -> Result<(), GithubError> {
        self.limiter.wait_if_needed().await;

        let url = format!("https://github.com/{}.git", repository);
        debug!(repository, ?destination, depth, "fetch_repository: cloning");

        let mut cmd = tokio::process::Command::new("git");
        cmd.arg("clone")
            .arg("--quiet")
            .arg("--depth")
            .arg(depth.to_string())
            .arg(&url)
            .arg(destination)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        if self.skip_lfs {
            cmd.env("GIT_LFS_SKIP_SMUDGE", "1");
        }

        let output = cmd.output().await.map_err(|e| GithubError::CloneFailed {
            repository: repository.to_string(),
            message: format!("failed to spawn git: {}", e),
        })?;

        if !output.status.success() {
            return Err(GithubError::CloneFailed {
                repository: repository.to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        info!(repository, "fetch_repository: clone complete");
        Ok(())
    }
}

/// Extract `x-ratelimit-remaining` / `x-ratelimit-reset` header values
fn quota_headers(headers: &HeaderMap) -> (Option<u64>, Option<i64>) {
    let parse = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    let remaining = parse("x-ratelimit-remaining").and_then(|s| s.parse().ok());
    let reset = parse("x-ratelimit-reset").and_then(|s| s.parse().ok());
    (remaining, reset)
}

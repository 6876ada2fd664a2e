//! GitHub retrieval client
//!
//! Code search and shallow repository fetch, threaded through the rate
//! limiter so quota exhaustion stalls the pipeline instead of failing it.

mod client;
mod error;
mod types;

pub use client::{GitHubClient, SEARCH_PAGE_SIZE, SEARCH_RESULT_CAP};
pub use error::GithubError;
pub use types::{Candidate, SearchOrder, SearchPage};

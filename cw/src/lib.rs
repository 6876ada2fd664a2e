//! Cronsweep - a census of cron schedules in GitHub Actions workflows
//!
//! Searches the code index for workflow files declaring `schedule:` triggers,
//! shallow-clones each candidate, extracts its cron expressions into a
//! durable corpus, and derives frequency, time-of-day, and day-of-week
//! statistics from the accumulated data.
//!
//! # Architecture
//!
//! ```text
//! search -> fetch -> extract -> corpus -> aggregate -> docstore
//!    \________ rate limiter ________/
//! ```
//!
//! Artifacts land in the data directory as JSON documents: `crons.json`
//! (the corpus), `frequencies.json`, `descriptions.json`, `times.json`, and
//! `day_of_week.json`. Scoped scans write the same set under an
//! account-named subdirectory.

pub mod cli;
pub mod config;
pub mod corpus;
pub mod extract;
pub mod github;
pub mod pipeline;
pub mod ratelimit;
pub mod stats;

pub use corpus::Corpus;
pub use extract::{ExtractError, ScheduleEntry, extract_schedules};
pub use pipeline::{Pipeline, RunSummary, Scope};
pub use ratelimit::RateLimiter;

//! Schedule extraction from workflow files
//!
//! Workflow files are YAML documents with a trigger section under the `on`
//! key. YAML 1.1 parsers coerce the unquoted reserved word `on` to boolean
//! true, so documents round-tripped through such tooling can carry either a
//! boolean-true key or the literal string `"on"` - the extractor accepts
//! both, boolean form first.

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors that make a workflow file unusable
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// One schedule trigger: a cron expression plus whatever sibling keys the
/// workflow author put next to it.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Five-field cron expression; absent on malformed entries, which the
    /// aggregator skips
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cron: Option<String>,

    /// Sibling metadata from the source document, preserved verbatim
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ScheduleEntry {
    pub fn new(cron: impl Into<String>) -> Self {
        Self {
            cron: Some(cron.into()),
            extra: serde_json::Map::new(),
        }
    }
}

/// Extract the schedule entry list from a workflow file
///
/// Returns an empty list when the document has no trigger section or no
/// `schedule` subsection - that is an ordinary workflow, not an error.
pub fn extract_schedules(path: &Path) -> Result<Vec<ScheduleEntry>, ExtractError> {
    let content = std::fs::read_to_string(path)?;
    let document: Value = serde_yaml::from_str(&content)?;

    let Some(trigger) = trigger_section(&document) else {
        debug!(?path, "extract_schedules: no trigger section");
        return Ok(Vec::new());
    };
    let Some(schedules) = trigger.get("schedule").and_then(Value::as_sequence) else {
        debug!(?path, "extract_schedules: no schedule subsection");
        return Ok(Vec::new());
    };

    let mut entries = Vec::new();
    for item in schedules {
        match serde_yaml::from_value::<ScheduleEntry>(item.clone()) {
            Ok(entry) => entries.push(entry),
            Err(e) => debug!(?path, error = %e, "extract_schedules: skipping unreadable entry"),
        }
    }
    Ok(entries)
}

/// Locate the trigger mapping: boolean-true key first, then literal "on"
fn trigger_section(document: &Value) -> Option<&Value> {
    let mapping = document.as_mapping()?;
    mapping
        .get(&Value::Bool(true))
        .or_else(|| mapping.get(&Value::String("on".to_string())))
}

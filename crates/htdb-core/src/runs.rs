//! Run metadata for one end-to-end scraping operation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of scraping run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunType {
    /// Re-crawl the entire catalog from scratch.
    FullRefresh,
    /// Crawl only for additions since the last run; existing records are
    /// detected as duplicates and skipped before persistence.
    IncrementalUpdate,
}

impl RunType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RunType::FullRefresh => "full_refresh",
            RunType::IncrementalUpdate => "incremental_update",
        }
    }

    /// Parses a run-type string as stored in the database.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "full_refresh" => Some(RunType::FullRefresh),
            "incremental_update" => Some(RunType::IncrementalUpdate),
            _ => None,
        }
    }
}

impl std::fmt::Display for RunType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a scraping run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    InProgress,
    Completed,
    Failed,
}

impl RunStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::InProgress => "in_progress",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
        }
    }

    /// Parses a status string as stored in the database.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "in_progress" => Some(RunStatus::InProgress),
            "completed" => Some(RunStatus::Completed),
            "failed" => Some(RunStatus::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata for one scraping run, owned by the operation tracker and
/// persisted through the storage port.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationMetadata {
    /// Storage-assigned identifier; all later counter updates reference it.
    pub id: i64,
    /// Stable external identifier.
    pub public_id: Uuid,
    pub run_type: RunType,
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub brands_processed: i32,
    pub products_processed: i32,
    pub error_count: i32,
    pub error_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_type_round_trips_through_str() {
        assert_eq!(RunType::FullRefresh.as_str(), "full_refresh");
        assert_eq!(RunType::IncrementalUpdate.as_str(), "incremental_update");
        assert_eq!(RunType::parse("full_refresh"), Some(RunType::FullRefresh));
        assert_eq!(RunType::parse("hourly"), None);
    }

    #[test]
    fn run_status_parse_accepts_stored_values() {
        assert_eq!(RunStatus::parse("in_progress"), Some(RunStatus::InProgress));
        assert_eq!(RunStatus::parse("completed"), Some(RunStatus::Completed));
        assert_eq!(RunStatus::parse("failed"), Some(RunStatus::Failed));
        assert_eq!(RunStatus::parse("queued"), None);
    }

    #[test]
    fn run_type_serializes_snake_case() {
        let json = serde_json::to_string(&RunType::FullRefresh).unwrap();
        assert_eq!(json, "\"full_refresh\"");
    }
}

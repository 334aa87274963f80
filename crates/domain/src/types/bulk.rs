//! Asynchronous bulk operation state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a platform-managed bulk mutation job.
///
/// `Completed`, `Failed` and `Canceled` are terminal; everything else keeps
/// the polling loop alive. Statuses the platform may add later deserialize
/// into `Other` and are treated as non-terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkOperationStatus {
    Created,
    Queued,
    Running,
    Completed,
    Failed,
    Canceled,
    Other(String),
}

impl BulkOperationStatus {
    /// True when no further state transition can occur.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Canceled)
    }

    /// Canonical wire representation (SCREAMING_SNAKE_CASE).
    pub fn as_str(&self) -> &str {
        match self {
            Self::Created => "CREATED",
            Self::Queued => "QUEUED",
            Self::Running => "RUNNING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Canceled => "CANCELED",
            Self::Other(raw) => raw,
        }
    }
}

impl From<&str> for BulkOperationStatus {
    fn from(raw: &str) -> Self {
        match raw {
            "CREATED" => Self::Created,
            "QUEUED" => Self::Queued,
            "RUNNING" => Self::Running,
            "COMPLETED" => Self::Completed,
            "FAILED" => Self::Failed,
            "CANCELED" => Self::Canceled,
            other => Self::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for BulkOperationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for BulkOperationStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BulkOperationStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from(raw.as_str()))
    }
}

/// A platform-managed asynchronous mutation job, tracked by polling.
///
/// The terminal status is the authoritative truth for success or failure;
/// `Failed`/`Canceled` are outcomes the caller branches on, not errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkOperation {
    pub id: String,
    pub status: BulkOperationStatus,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub object_count: Option<u64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// Result-file URL published by the platform once the job completes.
    #[serde(default)]
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses() {
        assert!(BulkOperationStatus::Completed.is_terminal());
        assert!(BulkOperationStatus::Failed.is_terminal());
        assert!(BulkOperationStatus::Canceled.is_terminal());
        assert!(!BulkOperationStatus::Queued.is_terminal());
        assert!(!BulkOperationStatus::Running.is_terminal());
        assert!(!BulkOperationStatus::Other("EXPIRING".into()).is_terminal());
    }

    #[test]
    fn status_round_trips_through_wire_form() {
        for raw in ["CREATED", "QUEUED", "RUNNING", "COMPLETED", "FAILED", "CANCELED", "EXPIRING"] {
            let status = BulkOperationStatus::from(raw);
            assert_eq!(status.as_str(), raw);
        }
    }
}

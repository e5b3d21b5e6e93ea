use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::sources::ImportHealth;

/// How an import run was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunKind {
    Manual,
    Scheduled,
}

/// Overall classification of a completed import run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Partial,
    Error,
}

impl From<RunStatus> for ImportHealth {
    fn from(status: RunStatus) -> Self {
        match status {
            RunStatus::Success => ImportHealth::Success,
            RunStatus::Partial => ImportHealth::Partial,
            RunStatus::Error => ImportHealth::Error,
        }
    }
}

/// One failed lead inside a run, kept for operator drill-down.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedLead {
    pub phone_number: String,
    pub error: String,
}

/// Structured error detail attached to an import run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunErrorDetails {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_leads: Vec<FailedLead>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_error: Option<String>,
    /// Pagination was cut short by a page fetch failure after the first page.
    #[serde(default)]
    pub fetch_truncated: bool,
}

/// Append-only audit record, one per import run (including fatal runs).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRun {
    pub id: Uuid,
    pub config_id: Uuid,
    pub tenant_id: Uuid,
    pub kind: RunKind,
    pub status: RunStatus,

    pub leads_processed: u32,
    pub leads_imported: u32,
    pub leads_updated: u32,
    pub leads_duplicated: u32,
    pub leads_errored: u32,

    pub error_message: Option<String>,
    pub error_details: Option<RunErrorDetails>,

    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: i64,
}

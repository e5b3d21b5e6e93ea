use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which class of leads a source config pulls from the external system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LeadType {
    Crm,
    Marketing,
    #[default]
    Both,
}

impl LeadType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadType::Crm => "crm",
            LeadType::Marketing => "marketing",
            LeadType::Both => "both",
        }
    }
}

/// Outcome class of the most recent import run, kept on the config itself
/// so operators can see source health at a glance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImportHealth {
    #[default]
    Never,
    Success,
    Partial,
    Error,
}

/// A tenant's configured connection to one external lead API, including
/// fetch filters and polling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub id: Uuid,
    pub tenant_id: Uuid,
    /// Display name, unique per tenant.
    pub name: String,

    // Connection
    pub base_url: String,
    pub api_key: String,

    // Fetch filters
    pub lead_type: LeadType,
    pub days_filter: Option<String>,
    pub source_filter: Option<String>,
    pub campaign_filter: Option<String>,

    /// Campaign newly imported contacts are routed into.
    pub target_campaign_id: Option<Uuid>,

    // Polling
    pub polling_enabled: bool,
    pub polling_interval_minutes: u32,
    pub is_active: bool,

    // Import behavior
    pub max_leads_per_import: Option<usize>,
    /// Minutes between the scheduled first contacts of consecutive imports.
    pub contact_delay_minutes: u32,

    // Health, written only by the import pipeline
    pub last_import_at: Option<DateTime<Utc>>,
    pub last_import_status: ImportHealth,
    pub last_import_leads_count: u32,
    pub last_import_error_message: Option<String>,
    pub next_scheduled_run: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SourceConfig {
    /// A config only qualifies for recurring execution when it is both
    /// active and has polling turned on.
    pub fn polling_eligible(&self) -> bool {
        self.is_active && self.polling_enabled
    }
}

/// Health fields patched onto a config after every import run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigHealthPatch {
    pub last_import_at: DateTime<Utc>,
    pub last_import_status: ImportHealth,
    pub last_import_leads_count: u32,
    /// `None` clears a previous error message.
    pub last_import_error_message: Option<String>,
}

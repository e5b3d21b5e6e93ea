use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a contact in the outreach pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    Pending,
    Contacted,
    Converted,
}

/// Free-form qualification info attached to a contact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadInfo {
    pub objectives: Option<String>,
    pub desires: Option<String>,
    pub hook: Option<String>,
    pub source: Option<String>,
}

impl LeadInfo {
    /// True when at least one field carries a non-empty value after trimming.
    pub fn has_content(&self) -> bool {
        [&self.objectives, &self.desires, &self.hook, &self.source]
            .iter()
            .any(|field| field.as_deref().is_some_and(|v| !v.trim().is_empty()))
    }
}

/// A contact owned by the persistence collaborator. Identity within a tenant
/// is the normalized phone number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub status: ContactStatus,
    pub lead_info: Option<LeadInfo>,
    pub agent_config_id: Uuid,
    pub campaign_id: Option<Uuid>,
    /// When the first outbound contact is scheduled to happen.
    pub contact_schedule: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a contact from an imported lead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewContact {
    pub tenant_id: Uuid,
    pub agent_config_id: Uuid,
    pub campaign_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub status: ContactStatus,
    pub contact_schedule: Option<DateTime<Utc>>,
    pub lead_info: Option<LeadInfo>,
}

/// Partial update for an existing contact; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub status: Option<ContactStatus>,
    pub lead_info: Option<LeadInfo>,
}

/// A marketing campaign contacts can be routed into. Carries per-campaign
/// defaults for the lead-info fallback chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub preferred_agent_config_id: Option<Uuid>,
    pub default_objectives: Option<String>,
    pub implicit_desires: Option<String>,
    pub hook_text: Option<String>,
}

/// An outreach agent configuration; the last level of the lead-info
/// fallback chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub display_name: String,
    pub default_objectives: Option<String>,
    pub default_desires: Option<String>,
    pub default_hook: Option<String>,
}

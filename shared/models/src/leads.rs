use serde::{Deserialize, Serialize};

/// Raw lead record as returned by the external API. The wire format is
/// camelCase; every field is optional because upstream data quality varies
/// and a malformed record must stay a per-record problem.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExternalLeadRecord {
    pub id: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub lead_type: Option<String>,
    pub source: Option<String>,
    pub details: Option<LeadDetails>,
}

/// Type-specific detail payload; only present for marketing leads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeadDetails {
    pub additional_data: Option<LeadAdditionalData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeadAdditionalData {
    pub objectives: Option<String>,
    pub desires: Option<String>,
    pub hook: Option<String>,
}

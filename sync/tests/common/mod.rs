#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use leadhub_config::EngineSettings;
use leadhub_models::{AgentConfig, Campaign, ImportHealth, LeadType, SourceConfig};
use leadhub_sync::stores::InMemoryStores;
use leadhub_sync::{LeadImportService, PollingScheduler};

pub fn source_config(tenant_id: Uuid, base_url: &str) -> SourceConfig {
    let now = Utc::now();
    SourceConfig {
        id: Uuid::new_v4(),
        tenant_id,
        name: "Orbital Method Import".to_string(),
        base_url: base_url.to_string(),
        api_key: "test-key".to_string(),
        lead_type: LeadType::Both,
        days_filter: None,
        source_filter: None,
        campaign_filter: None,
        target_campaign_id: None,
        polling_enabled: false,
        polling_interval_minutes: 5,
        is_active: true,
        max_leads_per_import: None,
        contact_delay_minutes: 1,
        last_import_at: None,
        last_import_status: ImportHealth::Never,
        last_import_leads_count: 0,
        last_import_error_message: None,
        next_scheduled_run: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn agent(tenant_id: Uuid) -> AgentConfig {
    AgentConfig {
        id: Uuid::new_v4(),
        tenant_id,
        display_name: "Primary agent".to_string(),
        default_objectives: None,
        default_desires: None,
        default_hook: None,
    }
}

pub fn campaign(tenant_id: Uuid) -> Campaign {
    Campaign {
        id: Uuid::new_v4(),
        tenant_id,
        name: "Spring launch".to_string(),
        preferred_agent_config_id: None,
        default_objectives: None,
        implicit_desires: None,
        hook_text: None,
    }
}

pub fn importer(stores: Arc<InMemoryStores>) -> Arc<LeadImportService> {
    Arc::new(LeadImportService::new(
        stores.clone(),
        stores.clone(),
        stores.clone(),
        stores,
        EngineSettings::default(),
    ))
}

pub fn scheduler(stores: Arc<InMemoryStores>) -> PollingScheduler {
    PollingScheduler::new(
        stores.clone(),
        importer(stores),
        &EngineSettings::default(),
    )
}

pub fn lead_json(full_name: &str, phone: &str) -> Value {
    json!({
        "id": Uuid::new_v4().to_string(),
        "fullName": full_name,
        "phone": phone,
        "status": "new",
        "type": "crm",
    })
}

pub fn page_json(leads: Vec<Value>, total: usize) -> Value {
    json!({ "success": true, "data": leads, "total": total })
}

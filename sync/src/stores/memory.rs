//! In-memory store implementation backing the test suite and local
//! development. Not intended for production use.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use leadhub_models::{
    AgentConfig, Campaign, ConfigHealthPatch, Contact, ContactPatch, ImportRun, NewContact,
    SourceConfig,
};

use super::{AuditStore, CampaignStore, ConfigStore, ContactStore};

/// One struct implementing every collaborator trait over `RwLock`ed maps.
#[derive(Default)]
pub struct InMemoryStores {
    configs: RwLock<HashMap<Uuid, SourceConfig>>,
    tenants: RwLock<HashMap<Uuid, String>>,
    contacts: RwLock<Vec<Contact>>,
    campaigns: RwLock<HashMap<Uuid, Campaign>>,
    agents: RwLock<Vec<AgentConfig>>,
    runs: RwLock<Vec<ImportRun>>,
}

impl InMemoryStores {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn add_tenant(&self, tenant_id: Uuid, role: &str) {
        self.tenants.write().await.insert(tenant_id, role.to_string());
    }

    pub async fn add_config(&self, config: SourceConfig) {
        self.configs.write().await.insert(config.id, config);
    }

    pub async fn remove_config(&self, config_id: Uuid) {
        self.configs.write().await.remove(&config_id);
    }

    pub async fn set_polling_enabled(&self, config_id: Uuid, enabled: bool) {
        if let Some(config) = self.configs.write().await.get_mut(&config_id) {
            config.polling_enabled = enabled;
        }
    }

    pub async fn add_campaign(&self, campaign: Campaign) {
        self.campaigns.write().await.insert(campaign.id, campaign);
    }

    pub async fn add_agent(&self, agent: AgentConfig) {
        self.agents.write().await.push(agent);
    }

    pub async fn add_contact(&self, contact: Contact) {
        self.contacts.write().await.push(contact);
    }

    /// Snapshot of every stored contact, for assertions.
    pub async fn contacts(&self) -> Vec<Contact> {
        self.contacts.read().await.clone()
    }

    /// Snapshot of one config, for assertions.
    pub async fn config(&self, config_id: Uuid) -> Option<SourceConfig> {
        self.configs.read().await.get(&config_id).cloned()
    }
}

#[async_trait]
impl ConfigStore for InMemoryStores {
    async fn get_config(
        &self,
        tenant_id: Uuid,
        config_id: Uuid,
    ) -> anyhow::Result<Option<SourceConfig>> {
        Ok(self
            .configs
            .read()
            .await
            .get(&config_id)
            .filter(|c| c.tenant_id == tenant_id)
            .cloned())
    }

    async fn list_configs(&self, tenant_id: Uuid) -> anyhow::Result<Vec<SourceConfig>> {
        let mut configs: Vec<SourceConfig> = self
            .configs
            .read()
            .await
            .values()
            .filter(|c| c.tenant_id == tenant_id)
            .cloned()
            .collect();
        configs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(configs)
    }

    async fn list_tenants_with_role(&self, role: &str) -> anyhow::Result<Vec<Uuid>> {
        let mut tenants: Vec<Uuid> = self
            .tenants
            .read()
            .await
            .iter()
            .filter(|(_, r)| r.as_str() == role)
            .map(|(id, _)| *id)
            .collect();
        tenants.sort();
        Ok(tenants)
    }

    async fn update_health(
        &self,
        config_id: Uuid,
        tenant_id: Uuid,
        patch: ConfigHealthPatch,
    ) -> anyhow::Result<()> {
        let mut configs = self.configs.write().await;
        let config = configs
            .get_mut(&config_id)
            .filter(|c| c.tenant_id == tenant_id)
            .ok_or_else(|| anyhow::anyhow!("source config {config_id} not found"))?;

        config.last_import_at = Some(patch.last_import_at);
        config.last_import_status = patch.last_import_status;
        config.last_import_leads_count = patch.last_import_leads_count;
        config.last_import_error_message = patch.last_import_error_message;
        config.updated_at = Utc::now();
        Ok(())
    }

    async fn set_next_scheduled_run(
        &self,
        config_id: Uuid,
        tenant_id: Uuid,
        at: Option<DateTime<Utc>>,
    ) -> anyhow::Result<()> {
        let mut configs = self.configs.write().await;
        if let Some(config) = configs
            .get_mut(&config_id)
            .filter(|c| c.tenant_id == tenant_id)
        {
            config.next_scheduled_run = at;
        }
        Ok(())
    }
}

#[async_trait]
impl ContactStore for InMemoryStores {
    async fn find_by_phone(
        &self,
        tenant_id: Uuid,
        phone_number: &str,
    ) -> anyhow::Result<Option<Contact>> {
        Ok(self
            .contacts
            .read()
            .await
            .iter()
            .find(|c| c.tenant_id == tenant_id && c.phone_number == phone_number)
            .cloned())
    }

    async fn create(&self, contact: NewContact) -> anyhow::Result<Contact> {
        let now = Utc::now();
        let created = Contact {
            id: Uuid::new_v4(),
            tenant_id: contact.tenant_id,
            first_name: contact.first_name,
            last_name: contact.last_name,
            phone_number: contact.phone_number,
            status: contact.status,
            lead_info: contact.lead_info,
            agent_config_id: contact.agent_config_id,
            campaign_id: contact.campaign_id,
            contact_schedule: contact.contact_schedule,
            created_at: now,
            updated_at: now,
        };
        self.contacts.write().await.push(created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        contact_id: Uuid,
        tenant_id: Uuid,
        patch: ContactPatch,
    ) -> anyhow::Result<Contact> {
        let mut contacts = self.contacts.write().await;
        let contact = contacts
            .iter_mut()
            .find(|c| c.id == contact_id && c.tenant_id == tenant_id)
            .ok_or_else(|| anyhow::anyhow!("contact {contact_id} not found"))?;

        if let Some(first_name) = patch.first_name {
            contact.first_name = first_name;
        }
        if let Some(last_name) = patch.last_name {
            contact.last_name = last_name;
        }
        if let Some(status) = patch.status {
            contact.status = status;
        }
        if let Some(lead_info) = patch.lead_info {
            contact.lead_info = Some(lead_info);
        }
        contact.updated_at = Utc::now();
        Ok(contact.clone())
    }
}

#[async_trait]
impl CampaignStore for InMemoryStores {
    async fn get_campaign(
        &self,
        campaign_id: Uuid,
        tenant_id: Uuid,
    ) -> anyhow::Result<Option<Campaign>> {
        Ok(self
            .campaigns
            .read()
            .await
            .get(&campaign_id)
            .filter(|c| c.tenant_id == tenant_id)
            .cloned())
    }

    async fn get_agent_config(
        &self,
        tenant_id: Uuid,
        agent_config_id: Uuid,
    ) -> anyhow::Result<Option<AgentConfig>> {
        Ok(self
            .agents
            .read()
            .await
            .iter()
            .find(|a| a.tenant_id == tenant_id && a.id == agent_config_id)
            .cloned())
    }

    async fn list_agents(&self, tenant_id: Uuid) -> anyhow::Result<Vec<AgentConfig>> {
        Ok(self
            .agents
            .read()
            .await
            .iter()
            .filter(|a| a.tenant_id == tenant_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AuditStore for InMemoryStores {
    async fn append_run(&self, run: ImportRun) -> anyhow::Result<()> {
        self.runs.write().await.push(run);
        Ok(())
    }

    async fn list_runs(&self, config_id: Uuid) -> anyhow::Result<Vec<ImportRun>> {
        Ok(self
            .runs
            .read()
            .await
            .iter()
            .filter(|r| r.config_id == config_id)
            .cloned()
            .collect())
    }
}

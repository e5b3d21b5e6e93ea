//! Collaborator interfaces for persistence.
//!
//! The engine never talks to a database directly; config, contact, campaign
//! and audit storage are owned by external collaborators consumed through
//! these narrow traits.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use leadhub_models::{
    AgentConfig, Campaign, ConfigHealthPatch, Contact, ContactPatch, ImportRun, NewContact,
    SourceConfig,
};

pub use memory::InMemoryStores;

/// Store of per-tenant source configurations.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn get_config(
        &self,
        tenant_id: Uuid,
        config_id: Uuid,
    ) -> anyhow::Result<Option<SourceConfig>>;

    async fn list_configs(&self, tenant_id: Uuid) -> anyhow::Result<Vec<SourceConfig>>;

    /// All tenants carrying the given role, across the whole installation.
    async fn list_tenants_with_role(&self, role: &str) -> anyhow::Result<Vec<Uuid>>;

    /// Patch a config's health fields after an import run.
    async fn update_health(
        &self,
        config_id: Uuid,
        tenant_id: Uuid,
        patch: ConfigHealthPatch,
    ) -> anyhow::Result<()>;

    /// Record (or clear) the next time the scheduler will fire for a config.
    async fn set_next_scheduled_run(
        &self,
        config_id: Uuid,
        tenant_id: Uuid,
        at: Option<DateTime<Utc>>,
    ) -> anyhow::Result<()>;
}

/// Store of contacts; identity within a tenant is the normalized phone number.
#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn find_by_phone(
        &self,
        tenant_id: Uuid,
        phone_number: &str,
    ) -> anyhow::Result<Option<Contact>>;

    async fn create(&self, contact: NewContact) -> anyhow::Result<Contact>;

    async fn update(
        &self,
        contact_id: Uuid,
        tenant_id: Uuid,
        patch: ContactPatch,
    ) -> anyhow::Result<Contact>;
}

/// Store of campaigns and outreach agent configurations.
#[async_trait]
pub trait CampaignStore: Send + Sync {
    async fn get_campaign(
        &self,
        campaign_id: Uuid,
        tenant_id: Uuid,
    ) -> anyhow::Result<Option<Campaign>>;

    async fn get_agent_config(
        &self,
        tenant_id: Uuid,
        agent_config_id: Uuid,
    ) -> anyhow::Result<Option<AgentConfig>>;

    /// Agents for a tenant in a stable order; "first available" fallback
    /// resolution depends on that stability.
    async fn list_agents(&self, tenant_id: Uuid) -> anyhow::Result<Vec<AgentConfig>>;
}

/// Append-only audit trail of import runs.
#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn append_run(&self, run: ImportRun) -> anyhow::Result<()>;

    async fn list_runs(&self, config_id: Uuid) -> anyhow::Result<Vec<ImportRun>>;
}

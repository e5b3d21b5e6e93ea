//! Multi-tenant external lead synchronization engine.
//!
//! Periodically pulls lead records from third-party REST APIs, deduplicates
//! them against existing contacts by (tenant, normalized phone), schedules
//! their first outbound contact with anti-burst jitter, and keeps auditable
//! health state per source config. Persistence and the HTTP surface belong
//! to collaborators: stores are consumed through the traits in [`stores`],
//! and the router triggering manual imports maps an `Ok` outcome (success or
//! partial) to 200 and a fatal [`ImportError`] to 500.

pub mod errors;
pub mod services;
pub mod stores;

pub use errors::{ImportError, SchedulerError, SourceClientError};
pub use services::external_api_client::{ConnectionCheck, ExternalLeadApiClient, LeadFilters};
pub use services::lead_import::{ImportOutcome, LeadImportService};
pub use services::polling_scheduler::PollingScheduler;
pub use stores::{AuditStore, CampaignStore, ConfigStore, ContactStore};

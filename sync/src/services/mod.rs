pub mod external_api_client;
pub mod lead_import;
pub mod polling_scheduler;

pub use external_api_client::{ConnectionCheck, ExternalLeadApiClient, LeadFilters, LeadPage};
pub use lead_import::{ImportOutcome, LeadImportService};
pub use polling_scheduler::PollingScheduler;

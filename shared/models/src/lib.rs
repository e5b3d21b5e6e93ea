pub mod contacts;
pub mod imports;
pub mod leads;
pub mod sources;

pub use contacts::{AgentConfig, Campaign, Contact, ContactPatch, ContactStatus, LeadInfo, NewContact};
pub use imports::{FailedLead, ImportRun, RunErrorDetails, RunKind, RunStatus};
pub use leads::{ExternalLeadRecord, LeadAdditionalData, LeadDetails};
pub use sources::{ConfigHealthPatch, ImportHealth, LeadType, SourceConfig};

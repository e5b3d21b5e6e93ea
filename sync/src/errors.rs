use uuid::Uuid;

/// Errors from the external lead API client.
#[derive(Debug, thiserror::Error)]
pub enum SourceClientError {
    #[error("External API unreachable: {0}")]
    Unreachable(String),

    #[error("External API rejected the credentials: {0}")]
    AuthenticationFailed(String),

    #[error("External API returned error {status}: {detail}")]
    Api { status: u16, detail: String },

    #[error("External API response is missing the success flag")]
    MalformedResponse,

    #[error("Request to external API failed: {0}")]
    RequestFailed(String),
}

/// Fatal errors that abort an import run. Per-lead problems are counters on
/// the run result, never a variant here.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Failed to fetch leads from external API: {0}")]
    SourceUnavailable(String),

    #[error("No outreach agent configured for tenant; configure at least one agent before importing leads")]
    NoAgentConfigured,

    #[error("Persistence error during import: {0}")]
    Store(#[from] anyhow::Error),
}

/// Errors from the polling scheduler's job lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("Source config {0} not found")]
    ConfigNotFound(Uuid),

    #[error("Polling is disabled for source config {0}")]
    PollingDisabled(Uuid),

    #[error("Source config {0} is inactive")]
    ConfigInactive(Uuid),

    #[error("Invalid polling interval: {0} minutes")]
    InvalidInterval(u32),

    #[error("Persistence error in scheduler: {0}")]
    Store(#[from] anyhow::Error),
}

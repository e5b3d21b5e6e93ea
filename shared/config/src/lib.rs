pub mod tracing_init;

pub use tracing_init::init_tracing;

/// Tunables for the lead synchronization engine, read once at startup.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Country code assumed for phone numbers without an international prefix.
    pub default_country_code: String,
    /// Page size used when draining the external API.
    pub fetch_page_size: usize,
    /// Bound of the uniform anti-burst jitter applied to contact schedules.
    pub contact_jitter_seconds: i64,
    /// Tenant role whose source configs the polling scheduler picks up.
    pub polling_tenant_role: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            default_country_code: "39".to_string(),
            fetch_page_size: 100,
            contact_jitter_seconds: 30,
            polling_tenant_role: "consultant".to_string(),
        }
    }
}

impl EngineSettings {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        let defaults = Self::default();

        Self {
            default_country_code: std::env::var("LEADHUB_DEFAULT_COUNTRY_CODE")
                .unwrap_or(defaults.default_country_code),
            fetch_page_size: std::env::var("LEADHUB_FETCH_PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.fetch_page_size),
            contact_jitter_seconds: std::env::var("LEADHUB_CONTACT_JITTER_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.contact_jitter_seconds),
            polling_tenant_role: std::env::var("LEADHUB_POLLING_TENANT_ROLE")
                .unwrap_or(defaults.polling_tenant_role),
        }
    }
}

//! Import orchestrator: one complete synchronization run for one source
//! config — drain every page, dedup against existing contacts, apply the
//! default fallback chain, compute a jittered contact schedule, persist,
//! and leave one audit record behind.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use leadhub_config::EngineSettings;
use leadhub_models::{
    AgentConfig, Campaign, ConfigHealthPatch, ContactPatch, ContactStatus, ExternalLeadRecord,
    FailedLead, ImportRun, LeadInfo, NewContact, RunErrorDetails, RunKind, RunStatus, SourceConfig,
};

use crate::errors::ImportError;
use crate::services::external_api_client::{ExternalLeadApiClient, LeadFilters};
use crate::stores::{AuditStore, CampaignStore, ConfigStore, ContactStore};

/// Aggregate result of one import run.
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub status: RunStatus,
    pub processed: u32,
    pub imported: u32,
    pub updated: u32,
    pub duplicated: u32,
    pub errored: u32,
    pub skipped: u32,
    /// Pagination was cut short by a page fetch failure after the first page.
    pub fetch_truncated: bool,
    pub errors: Vec<String>,
    pub failed_leads: Vec<FailedLead>,
}

enum LeadAction {
    Created,
    Updated,
}

pub struct LeadImportService {
    configs: Arc<dyn ConfigStore>,
    contacts: Arc<dyn ContactStore>,
    campaigns: Arc<dyn CampaignStore>,
    audit: Arc<dyn AuditStore>,
    settings: EngineSettings,
}

impl LeadImportService {
    pub fn new(
        configs: Arc<dyn ConfigStore>,
        contacts: Arc<dyn ContactStore>,
        campaigns: Arc<dyn CampaignStore>,
        audit: Arc<dyn AuditStore>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            configs,
            contacts,
            campaigns,
            audit,
            settings,
        }
    }

    /// Execute one full synchronization run for a source config.
    ///
    /// Always leaves an audit record and a health update behind, including on
    /// the fatal paths (source unreachable on the first page, no agent
    /// configured for the tenant), which propagate as errors after the
    /// bookkeeping writes.
    pub async fn run(
        &self,
        config: &SourceConfig,
        kind: RunKind,
    ) -> Result<ImportOutcome, ImportError> {
        let started_at = Utc::now();

        match self.execute(config, started_at).await {
            Ok(outcome) => {
                self.record_run(config, kind, &outcome, started_at).await?;
                Ok(outcome)
            }
            Err(err) => {
                self.record_fatal(config, kind, &err, started_at).await;
                Err(err)
            }
        }
    }

    async fn execute(
        &self,
        config: &SourceConfig,
        started_at: DateTime<Utc>,
    ) -> Result<ImportOutcome, ImportError> {
        let client = ExternalLeadApiClient::new(&config.base_url, &config.api_key);
        let filters = LeadFilters::from_config(config);
        let page_size = self.settings.fetch_page_size;
        let cap = config.max_leads_per_import;

        info!(config = %config.id, name = %config.name, "📥 starting pagination fetch");

        let mut all_leads: Vec<ExternalLeadRecord> = Vec::new();
        let mut reported_total: Option<usize> = None;
        let mut fetch_truncated = false;
        let mut offset = 0;

        loop {
            match client.fetch_leads(&filters, page_size, offset).await {
                Ok(page) => {
                    debug!(offset, count = page.data.len(), "fetched lead page");
                    if page.total.is_some() {
                        reported_total = page.total;
                    }
                    let last_page = page.data.len() < page_size;
                    all_leads.extend(page.data);
                    offset += page_size;

                    // Stop draining as soon as the cap is reached; further
                    // pages would be fetched only to be thrown away.
                    if let Some(max) = cap {
                        if all_leads.len() >= max {
                            info!(max, "reached max leads per import during fetch");
                            break;
                        }
                    }
                    if last_page {
                        break;
                    }
                }
                Err(err) if all_leads.is_empty() => {
                    return Err(ImportError::SourceUnavailable(err.to_string()));
                }
                Err(err) => {
                    warn!(
                        %err,
                        offset,
                        collected = all_leads.len(),
                        "page fetch failed after earlier pages succeeded; continuing with partial data"
                    );
                    fetch_truncated = true;
                    break;
                }
            }
        }

        let fetched = all_leads.len();
        info!(fetched, "total leads fetched from external API");

        let mut errors: Vec<String> = Vec::new();
        let mut skipped: u32 = 0;
        let mut leads = all_leads;
        if let Some(max) = cap {
            if leads.len() > max || reported_total.is_some_and(|total| total > max) {
                let overflow = reported_total
                    .map(|total| total.saturating_sub(max))
                    .filter(|n| *n > 0)
                    .unwrap_or_else(|| leads.len().saturating_sub(max));
                leads.truncate(max);
                if overflow > 0 {
                    warn!(max, overflow, "⚠️ limiting import to the configured cap");
                    errors.push(format!(
                        "{overflow} lead(s) skipped due to the max leads per import limit"
                    ));
                    skipped = overflow as u32;
                }
            }
        }

        // Resolve the routing agent once per run: the target campaign's
        // preferred agent when set, otherwise the tenant's first agent.
        let mut campaign: Option<Campaign> = None;
        let mut agent_config_id: Option<Uuid> = None;

        if let Some(campaign_id) = config.target_campaign_id {
            campaign = self
                .campaigns
                .get_campaign(campaign_id, config.tenant_id)
                .await?;
            if let Some(preferred) = campaign.as_ref().and_then(|c| c.preferred_agent_config_id) {
                debug!(agent = %preferred, "using preferred agent from target campaign");
                agent_config_id = Some(preferred);
            }
        }

        let agent_config_id = match agent_config_id {
            Some(id) => id,
            None => {
                let agents = self.campaigns.list_agents(config.tenant_id).await?;
                match agents.first() {
                    Some(agent) => {
                        debug!(agent = %agent.id, "using first available agent as fallback");
                        agent.id
                    }
                    None => return Err(ImportError::NoAgentConfigured),
                }
            }
        };

        let agent_config = self
            .campaigns
            .get_agent_config(config.tenant_id, agent_config_id)
            .await?;

        let delay_minutes = i64::from(config.contact_delay_minutes.max(1));
        info!(
            count = leads.len(),
            delay_minutes, "⏰ scheduling leads with progressive delay"
        );

        let mut outcome = ImportOutcome {
            status: RunStatus::Success,
            processed: fetched as u32,
            imported: 0,
            updated: 0,
            duplicated: 0,
            errored: 0,
            skipped,
            fetch_truncated,
            errors,
            failed_leads: Vec::new(),
        };

        for (i, lead) in leads.iter().enumerate() {
            let result = self
                .process_lead(
                    config,
                    lead,
                    i,
                    started_at,
                    delay_minutes,
                    campaign.as_ref(),
                    agent_config.as_ref(),
                    agent_config_id,
                )
                .await;

            match result {
                Ok(LeadAction::Created) => outcome.imported += 1,
                Ok(LeadAction::Updated) => outcome.updated += 1,
                Err(err) => {
                    outcome.errored += 1;
                    let label = lead
                        .id
                        .clone()
                        .or_else(|| lead.phone.clone())
                        .unwrap_or_else(|| format!("#{i}"));
                    warn!(lead = %label, %err, "lead processing failed");
                    outcome.failed_leads.push(FailedLead {
                        phone_number: lead.phone.clone().unwrap_or_default(),
                        error: err.to_string(),
                    });
                    outcome.errors.push(format!("Lead {label}: {err}"));
                }
            }
        }

        outcome.status = if outcome.errored == 0 {
            RunStatus::Success
        } else if outcome.imported + outcome.updated > 0 {
            RunStatus::Partial
        } else {
            RunStatus::Error
        };

        Ok(outcome)
    }

    #[allow(clippy::too_many_arguments)]
    async fn process_lead(
        &self,
        config: &SourceConfig,
        lead: &ExternalLeadRecord,
        index: usize,
        base_time: DateTime<Utc>,
        delay_minutes: i64,
        campaign: Option<&Campaign>,
        agent: Option<&AgentConfig>,
        agent_config_id: Uuid,
    ) -> anyhow::Result<LeadAction> {
        let (first_name, last_name) = split_full_name(lead.full_name.as_deref().unwrap_or(""));
        let raw_phone = lead.phone.as_deref().unwrap_or("");

        if first_name.is_empty() || raw_phone.trim().is_empty() {
            anyhow::bail!("missing required fields (name or phone)");
        }

        let phone_number = normalize_phone(raw_phone, &self.settings.default_country_code);

        let existing = self
            .contacts
            .find_by_phone(config.tenant_id, &phone_number)
            .await?;

        let lead_info = build_lead_info(lead, campaign, agent);

        if let Some(existing) = existing {
            // Status only ever moves forward: an upstream "converted" wins,
            // anything else keeps what we already know.
            let status = if lead.status.as_deref() == Some("converted") {
                ContactStatus::Converted
            } else {
                existing.status
            };

            self.contacts
                .update(
                    existing.id,
                    config.tenant_id,
                    ContactPatch {
                        first_name: Some(first_name),
                        last_name: Some(last_name),
                        status: Some(status),
                        lead_info,
                    },
                )
                .await?;
            debug!(%phone_number, "🔄 updated existing contact");
            Ok(LeadAction::Updated)
        } else {
            let scheduled = base_time
                + Duration::minutes(index as i64 * delay_minutes)
                + jitter(self.settings.contact_jitter_seconds);

            self.contacts
                .create(NewContact {
                    tenant_id: config.tenant_id,
                    agent_config_id,
                    campaign_id: config.target_campaign_id,
                    first_name,
                    last_name,
                    phone_number: phone_number.clone(),
                    status: ContactStatus::Pending,
                    contact_schedule: Some(scheduled),
                    lead_info,
                })
                .await?;
            debug!(%phone_number, %scheduled, "✅ imported new contact");
            Ok(LeadAction::Created)
        }
    }

    async fn record_run(
        &self,
        config: &SourceConfig,
        kind: RunKind,
        outcome: &ImportOutcome,
        started_at: DateTime<Utc>,
    ) -> Result<(), ImportError> {
        let completed_at = Utc::now();
        let has_details = !outcome.failed_leads.is_empty() || outcome.fetch_truncated;

        self.audit
            .append_run(ImportRun {
                id: Uuid::new_v4(),
                config_id: config.id,
                tenant_id: config.tenant_id,
                kind,
                status: outcome.status,
                leads_processed: outcome.processed,
                leads_imported: outcome.imported,
                leads_updated: outcome.updated,
                leads_duplicated: outcome.duplicated,
                leads_errored: outcome.errored,
                error_message: (!outcome.errors.is_empty()).then(|| outcome.errors.join("; ")),
                error_details: has_details.then(|| RunErrorDetails {
                    failed_leads: outcome.failed_leads.clone(),
                    api_error: None,
                    fetch_truncated: outcome.fetch_truncated,
                }),
                started_at,
                completed_at,
                duration_ms: (completed_at - started_at).num_milliseconds(),
            })
            .await?;

        self.configs
            .update_health(
                config.id,
                config.tenant_id,
                ConfigHealthPatch {
                    last_import_at: completed_at,
                    last_import_status: outcome.status.into(),
                    last_import_leads_count: outcome.imported + outcome.updated,
                    last_import_error_message: outcome.errors.first().cloned(),
                },
            )
            .await?;

        info!(
            config = %config.id,
            imported = outcome.imported,
            updated = outcome.updated,
            errored = outcome.errored,
            status = ?outcome.status,
            "✅ import completed"
        );
        Ok(())
    }

    /// Fatal-path bookkeeping: the run still leaves an `error` audit record
    /// and marks the config unhealthy before the error propagates. Failures
    /// here are logged, never allowed to mask the original error.
    async fn record_fatal(
        &self,
        config: &SourceConfig,
        kind: RunKind,
        err: &ImportError,
        started_at: DateTime<Utc>,
    ) {
        error!(config = %config.id, %err, "fatal error during lead import");

        let completed_at = Utc::now();
        let message = err.to_string();

        let run = ImportRun {
            id: Uuid::new_v4(),
            config_id: config.id,
            tenant_id: config.tenant_id,
            kind,
            status: RunStatus::Error,
            leads_processed: 0,
            leads_imported: 0,
            leads_updated: 0,
            leads_duplicated: 0,
            leads_errored: 0,
            error_message: Some(message.clone()),
            error_details: Some(RunErrorDetails {
                failed_leads: Vec::new(),
                api_error: Some(message.clone()),
                fetch_truncated: false,
            }),
            started_at,
            completed_at,
            duration_ms: (completed_at - started_at).num_milliseconds(),
        };
        if let Err(audit_err) = self.audit.append_run(run).await {
            error!(%audit_err, "failed to write audit record for fatal import error");
        }

        let patch = ConfigHealthPatch {
            last_import_at: completed_at,
            last_import_status: RunStatus::Error.into(),
            last_import_leads_count: 0,
            last_import_error_message: Some(message),
        };
        if let Err(health_err) = self
            .configs
            .update_health(config.id, config.tenant_id, patch)
            .await
        {
            error!(%health_err, "failed to update config health after fatal import error");
        }
    }
}

/// Split a full name at the first whitespace run; single-token names get an
/// empty last name.
pub fn split_full_name(full_name: &str) -> (String, String) {
    let mut parts = full_name.split_whitespace();
    let first = parts.next().unwrap_or("").to_string();
    let last = parts.collect::<Vec<_>>().join(" ");
    (first, last)
}

/// Normalize a raw phone number into `+<countrycode><digits>` form.
///
/// Whitespace, dashes and parentheses are stripped. A number already carrying
/// the country code but missing the `+` gets it prepended; one with neither
/// is assumed local and gets the default country code. Normalizing an
/// already-normalized number is a no-op.
pub fn normalize_phone(raw: &str, default_country_code: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')'))
        .collect();

    if cleaned.starts_with('+') {
        cleaned
    } else if cleaned.starts_with(default_country_code) {
        format!("+{cleaned}")
    } else {
        format!("+{default_country_code}{cleaned}")
    }
}

/// First non-empty value (after trimming) of the fallback chain: explicit
/// record value, then campaign default, then agent default.
fn first_non_empty(
    explicit: Option<&str>,
    campaign: Option<&str>,
    agent: Option<&str>,
) -> Option<String> {
    [explicit, campaign, agent]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(str::to_string)
}

/// Assemble the lead-info block for a record, resolving each field through
/// the fallback chain independently. Returns `None` when no field survives,
/// so empty blocks are never attached to contacts.
fn build_lead_info(
    lead: &ExternalLeadRecord,
    campaign: Option<&Campaign>,
    agent: Option<&AgentConfig>,
) -> Option<LeadInfo> {
    // The detail payload is only meaningful for marketing leads.
    let extra = match lead.lead_type.as_deref() {
        Some("marketing") => lead.details.as_ref().and_then(|d| d.additional_data.as_ref()),
        _ => None,
    };

    let info = LeadInfo {
        objectives: first_non_empty(
            extra.and_then(|e| e.objectives.as_deref()),
            campaign.and_then(|c| c.default_objectives.as_deref()),
            agent.and_then(|a| a.default_objectives.as_deref()),
        ),
        desires: first_non_empty(
            extra.and_then(|e| e.desires.as_deref()),
            campaign.and_then(|c| c.implicit_desires.as_deref()),
            agent.and_then(|a| a.default_desires.as_deref()),
        ),
        hook: first_non_empty(
            extra.and_then(|e| e.hook.as_deref()),
            campaign.and_then(|c| c.hook_text.as_deref()),
            agent.and_then(|a| a.default_hook.as_deref()),
        ),
        source: first_non_empty(lead.source.as_deref(), None, None),
    };

    info.has_content().then_some(info)
}

/// Uniform random offset in `[-bound, +bound]` seconds. Purely cosmetic
/// anti-burst spacing; never large enough to matter for ordering.
fn jitter(bound_seconds: i64) -> Duration {
    if bound_seconds <= 0 {
        return Duration::zero();
    }
    Duration::seconds(rand::thread_rng().gen_range(-bound_seconds..=bound_seconds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadhub_models::LeadAdditionalData;
    use leadhub_models::LeadDetails;

    #[test]
    fn split_full_name_separates_first_token() {
        assert_eq!(
            split_full_name("Mario Rossi"),
            ("Mario".to_string(), "Rossi".to_string())
        );
        assert_eq!(
            split_full_name("Anna Maria De Luca"),
            ("Anna".to_string(), "Maria De Luca".to_string())
        );
        assert_eq!(split_full_name("Madonna"), ("Madonna".to_string(), String::new()));
        assert_eq!(split_full_name("   "), (String::new(), String::new()));
    }

    #[test]
    fn normalize_phone_equivalent_spellings_collapse() {
        let expected = "+393331234567";
        assert_eq!(normalize_phone("333 123 4567", "39"), expected);
        assert_eq!(normalize_phone("39 333 1234567", "39"), expected);
        assert_eq!(normalize_phone("+39 333-123-4567", "39"), expected);
        assert_eq!(normalize_phone("(333) 123-4567", "39"), expected);
    }

    #[test]
    fn normalize_phone_is_idempotent() {
        let once = normalize_phone("333 123 4567", "39");
        assert_eq!(normalize_phone(&once, "39"), once);
    }

    #[test]
    fn normalize_phone_keeps_foreign_prefixes() {
        assert_eq!(normalize_phone("+44 20 7946 0958", "39"), "+442079460958");
    }

    #[test]
    fn first_non_empty_prefers_explicit_then_campaign() {
        assert_eq!(
            first_non_empty(Some("a"), Some("b"), Some("c")),
            Some("a".to_string())
        );
        assert_eq!(
            first_non_empty(Some("  "), Some("b"), Some("c")),
            Some("b".to_string())
        );
        assert_eq!(
            first_non_empty(None, None, Some("c")),
            Some("c".to_string())
        );
        assert_eq!(first_non_empty(None, Some(""), None), None);
    }

    fn marketing_lead(objectives: Option<&str>) -> ExternalLeadRecord {
        ExternalLeadRecord {
            lead_type: Some("marketing".to_string()),
            details: Some(LeadDetails {
                additional_data: Some(LeadAdditionalData {
                    objectives: objectives.map(str::to_string),
                    desires: None,
                    hook: None,
                }),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn lead_info_falls_back_to_campaign_default() {
        let campaign = Campaign {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            name: "Launch".to_string(),
            preferred_agent_config_id: None,
            default_objectives: Some("grow revenue".to_string()),
            implicit_desires: None,
            hook_text: None,
        };

        let info = build_lead_info(&marketing_lead(None), Some(&campaign), None)
            .expect("campaign default should produce lead info");
        assert_eq!(info.objectives.as_deref(), Some("grow revenue"));
    }

    #[test]
    fn lead_info_omitted_when_every_field_is_empty() {
        assert!(build_lead_info(&marketing_lead(None), None, None).is_none());
    }

    #[test]
    fn lead_info_ignores_details_for_crm_leads() {
        let mut lead = marketing_lead(Some("explicit goal"));
        lead.lead_type = Some("crm".to_string());
        assert!(build_lead_info(&lead, None, None).is_none());
    }

    #[test]
    fn jitter_stays_within_bound() {
        for _ in 0..200 {
            let j = jitter(30).num_seconds();
            assert!((-30..=30).contains(&j), "jitter {j} out of bound");
        }
        assert_eq!(jitter(0), Duration::zero());
    }
}

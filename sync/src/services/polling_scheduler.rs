//! Polling scheduler: owns one recurring import job per active,
//! polling-enabled source config, across every tenant.
//!
//! The registry is an explicitly-owned object, injected where it is needed;
//! tests construct isolated instances. Every tick re-reads its config from
//! the store and decides from the stored flags — never from the copy
//! captured at start — so toggling a config mid-flight takes effect without
//! a restart.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use cron::Schedule;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use leadhub_config::EngineSettings;
use leadhub_models::RunKind;

use crate::errors::SchedulerError;
use crate::services::lead_import::LeadImportService;
use crate::stores::ConfigStore;

/// One live recurring job in the registry.
struct PollingJob {
    /// Generation tag; a tick only unregisters itself while this still
    /// matches, so a stale job can never remove its replacement.
    job_id: Uuid,
    tenant_id: Uuid,
    handle: JoinHandle<()>,
}

/// Owns the recurring import jobs for every polling-enabled source config.
pub struct PollingScheduler {
    configs: Arc<dyn ConfigStore>,
    importer: Arc<LeadImportService>,
    jobs: Arc<Mutex<HashMap<Uuid, PollingJob>>>,
    initialized: AtomicBool,
    tenant_role: String,
}

impl PollingScheduler {
    pub fn new(
        configs: Arc<dyn ConfigStore>,
        importer: Arc<LeadImportService>,
        settings: &EngineSettings,
    ) -> Self {
        Self {
            configs,
            importer,
            jobs: Arc::new(Mutex::new(HashMap::new())),
            initialized: AtomicBool::new(false),
            tenant_role: settings.polling_tenant_role.clone(),
        }
    }

    /// Load every eligible config across all tenants and start its job.
    /// Idempotent: a second call warns and returns. A single misconfigured
    /// tenant or config is logged and skipped, never blocks the rest.
    pub async fn initialize(&self) {
        if self.initialized.swap(true, Ordering::SeqCst) {
            warn!("polling scheduler already initialized; skipping");
            return;
        }
        info!("initializing polling scheduler");

        let tenants = match self.configs.list_tenants_with_role(&self.tenant_role).await {
            Ok(tenants) => tenants,
            Err(err) => {
                error!(%err, "failed to list tenants; scheduler starts empty");
                return;
            }
        };

        let mut started = 0usize;
        for tenant_id in tenants {
            let configs = match self.configs.list_configs(tenant_id).await {
                Ok(configs) => configs,
                Err(err) => {
                    error!(%err, %tenant_id, "failed to list configs for tenant; skipping");
                    continue;
                }
            };

            for config in configs.into_iter().filter(|c| c.polling_eligible()) {
                match self.start_polling(tenant_id, config.id).await {
                    Ok(()) => started += 1,
                    Err(err) => {
                        warn!(%err, config = %config.id, "failed to start polling for config; skipping")
                    }
                }
            }
        }
        info!(started, "polling scheduler initialized");
    }

    /// Register the recurring job for a config, replacing any previous job
    /// for the same id. The config is re-read fresh so interval or flag
    /// changes made since the last start take effect.
    pub async fn start_polling(
        &self,
        tenant_id: Uuid,
        config_id: Uuid,
    ) -> Result<(), SchedulerError> {
        let config = self
            .configs
            .get_config(tenant_id, config_id)
            .await?
            .ok_or(SchedulerError::ConfigNotFound(config_id))?;

        if !config.polling_enabled {
            return Err(SchedulerError::PollingDisabled(config_id));
        }
        if !config.is_active {
            return Err(SchedulerError::ConfigInactive(config_id));
        }

        let expression = interval_to_cron(config.polling_interval_minutes)
            .ok_or(SchedulerError::InvalidInterval(config.polling_interval_minutes))?;
        let schedule = Schedule::from_str(&expression)
            .map_err(|_| SchedulerError::InvalidInterval(config.polling_interval_minutes))?;

        info!(
            config = %config_id,
            interval = config.polling_interval_minutes,
            %expression,
            "scheduling recurring import"
        );

        let job_id = Uuid::new_v4();
        let handle = self.spawn_job(job_id, tenant_id, config_id, schedule.clone());

        // Replace-not-stack: abort the previous job inside the same critical
        // section that registers the new one, so two concurrent starts for
        // one id can never leave two live timers.
        {
            let mut jobs = self.jobs.lock().await;
            if let Some(previous) = jobs.insert(
                config_id,
                PollingJob {
                    job_id,
                    tenant_id,
                    handle,
                },
            ) {
                debug!(config = %config_id, "stopping previous job before replacement");
                previous.handle.abort();
            }
        }

        if let Some(next) = schedule.upcoming(Utc).next() {
            if let Err(err) = self
                .configs
                .set_next_scheduled_run(config_id, tenant_id, Some(next))
                .await
            {
                warn!(%err, config = %config_id, "failed to record next scheduled run");
            }
        }

        Ok(())
    }

    /// Cancel the job for a config. A no-op when none is registered.
    pub async fn stop_polling(&self, config_id: Uuid) {
        let removed = self.jobs.lock().await.remove(&config_id);
        match removed {
            Some(job) => {
                job.handle.abort();
                info!(config = %config_id, "polling stopped");
                if let Err(err) = self
                    .configs
                    .set_next_scheduled_run(config_id, job.tenant_id, None)
                    .await
                {
                    warn!(%err, config = %config_id, "failed to clear next scheduled run");
                }
            }
            None => debug!(config = %config_id, "stop requested for config with no active job"),
        }
    }

    /// Cancel every job; used at process shutdown.
    pub async fn stop_all(&self) {
        let mut jobs = self.jobs.lock().await;
        let count = jobs.len();
        for (_, job) in jobs.drain() {
            job.handle.abort();
        }
        info!(count, "stopped all polling jobs");
    }

    pub async fn active_job_count(&self) -> usize {
        self.jobs.lock().await.len()
    }

    pub async fn is_polling(&self, config_id: Uuid) -> bool {
        self.jobs.lock().await.contains_key(&config_id)
    }

    fn spawn_job(
        &self,
        job_id: Uuid,
        tenant_id: Uuid,
        config_id: Uuid,
        schedule: Schedule,
    ) -> JoinHandle<()> {
        let configs = Arc::clone(&self.configs);
        let importer = Arc::clone(&self.importer);
        let jobs = Arc::clone(&self.jobs);

        tokio::spawn(async move {
            loop {
                let Some(next) = schedule.upcoming(Utc).next() else {
                    warn!(config = %config_id, "schedule produced no upcoming fire time; stopping job");
                    break;
                };
                let wait = (next - Utc::now()).to_std().unwrap_or_default();
                tokio::time::sleep(wait).await;

                // Freshness contract: decide from the stored config, not the
                // copy the job was started with.
                let config = match configs.get_config(tenant_id, config_id).await {
                    Ok(Some(config)) => config,
                    Ok(None) => {
                        info!(config = %config_id, "config deleted; job self-cancelling");
                        Self::unregister(&jobs, config_id, job_id).await;
                        let _ = configs.set_next_scheduled_run(config_id, tenant_id, None).await;
                        return;
                    }
                    Err(err) => {
                        error!(%err, config = %config_id, "failed to reload config for tick; retrying next tick");
                        continue;
                    }
                };

                if !config.polling_eligible() {
                    info!(config = %config_id, "polling disabled mid-flight; job self-cancelling");
                    Self::unregister(&jobs, config_id, job_id).await;
                    let _ = configs.set_next_scheduled_run(config_id, tenant_id, None).await;
                    return;
                }

                match importer.run(&config, RunKind::Scheduled).await {
                    Ok(outcome) => info!(
                        config = %config_id,
                        imported = outcome.imported,
                        updated = outcome.updated,
                        errored = outcome.errored,
                        "scheduled import completed"
                    ),
                    Err(err) => error!(%err, config = %config_id, "scheduled import failed"),
                }

                if let Some(next) = schedule.upcoming(Utc).next() {
                    if let Err(err) = configs
                        .set_next_scheduled_run(config_id, tenant_id, Some(next))
                        .await
                    {
                        warn!(%err, config = %config_id, "failed to record next scheduled run");
                    }
                }
            }
        })
    }

    /// Remove a job's own registry entry, but only while the entry still
    /// belongs to it; a replacement registered in the meantime stays.
    async fn unregister(jobs: &Mutex<HashMap<Uuid, PollingJob>>, config_id: Uuid, job_id: Uuid) {
        let mut jobs = jobs.lock().await;
        if jobs.get(&config_id).is_some_and(|job| job.job_id == job_id) {
            jobs.remove(&config_id);
        }
    }
}

/// Map a polling interval in minutes onto a six-field cron expression
/// (`sec min hour dom month dow`).
///
/// One minute ticks every minute, sub-hour intervals use a minute step,
/// whole hours use an hour step, exact day multiples fire at midnight, and
/// any other value falls back to a raw minute step.
pub fn interval_to_cron(minutes: u32) -> Option<String> {
    const DAY: u32 = 1440;
    match minutes {
        0 => None,
        1 => Some("0 * * * * *".to_string()),
        m if m < 60 => Some(format!("0 */{m} * * * *")),
        60 => Some("0 0 * * * *".to_string()),
        DAY => Some("0 0 0 * * *".to_string()),
        m if m % DAY == 0 => Some(format!("0 0 0 */{} * *", m / DAY)),
        m if m % 60 == 0 => Some(format!("0 0 */{} * * *", m / 60)),
        m => Some(format!("0 */{m} * * * *")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_mapping_examples() {
        assert_eq!(interval_to_cron(0), None);
        assert_eq!(interval_to_cron(1).as_deref(), Some("0 * * * * *"));
        assert_eq!(interval_to_cron(15).as_deref(), Some("0 */15 * * * *"));
        assert_eq!(interval_to_cron(60).as_deref(), Some("0 0 * * * *"));
        assert_eq!(interval_to_cron(120).as_deref(), Some("0 0 */2 * * *"));
        assert_eq!(interval_to_cron(1440).as_deref(), Some("0 0 0 * * *"));
        assert_eq!(interval_to_cron(2880).as_deref(), Some("0 0 0 */2 * *"));
    }

    #[test]
    fn awkward_intervals_fall_back_to_minute_steps() {
        assert_eq!(interval_to_cron(90).as_deref(), Some("0 */90 * * * *"));
        assert_eq!(interval_to_cron(45).as_deref(), Some("0 */45 * * * *"));
    }

    #[test]
    fn every_mapping_parses_as_a_schedule() {
        for minutes in [1, 2, 15, 45, 59, 60, 90, 120, 180, 720, 1440, 2880, 4320] {
            let expression = interval_to_cron(minutes).expect("interval should map");
            assert!(
                Schedule::from_str(&expression).is_ok(),
                "expression {expression} for {minutes}m should parse"
            );
        }
    }
}

//! Durable schedule runner.
//!
//! Schedules live in the database, not in process memory: the stateless
//! `run_due_schedules` entry point executes due rows and advances their
//! `next_run`, so an external cron trigger or the in-process loop below can
//! drive it interchangeably and nothing is lost on restart. Per-row
//! failures are logged and skipped; the sweep never aborts.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Notify;
use tracing::{info, warn};
use uuid::Uuid;

use hearth_core::error::HearthError;
use hearth_core::types::{Schedule, ScheduleFrequency, ScheduleKind};
use hearth_storage::{Database, ScheduleRepository};

use crate::service::HearthService;

/// Drives recurring insight/suggestion generation from the schedules table.
pub struct ScheduleRunner {
    service: Arc<HearthService>,
    schedules: ScheduleRepository,
    shutdown: Arc<Notify>,
    poll_interval_secs: u64,
}

impl ScheduleRunner {
    pub fn new(db: Arc<Database>, service: Arc<HearthService>, poll_interval_secs: u64) -> Self {
        Self {
            service,
            schedules: ScheduleRepository::new(db),
            shutdown: Arc::new(Notify::new()),
            poll_interval_secs,
        }
    }

    /// Create and persist a schedule. The first run lands one interval out.
    pub fn create_schedule(
        &self,
        family_id: &str,
        kind: ScheduleKind,
        frequency: ScheduleFrequency,
    ) -> Result<Schedule, HearthError> {
        let now = Utc::now();
        let schedule = Schedule {
            id: Uuid::new_v4(),
            family_id: family_id.to_string(),
            kind,
            frequency,
            next_run: now + frequency.interval(),
            enabled: true,
            last_run: None,
            created_at: now,
        };
        self.schedules.save(&schedule)?;
        info!(
            "Created {} schedule {} for {} ({})",
            frequency.as_str(),
            schedule.id,
            family_id,
            kind.as_str()
        );
        Ok(schedule)
    }

    /// Disable a schedule. Idempotent: cancelling twice (or cancelling an
    /// unknown id) is not an error.
    pub fn cancel_schedule(&self, schedule_id: Uuid) -> Result<(), HearthError> {
        self.schedules.set_enabled(schedule_id, false)
    }

    /// Execute every enabled schedule whose `next_run` has passed.
    ///
    /// Stateless: callers supply `now`, each due row runs once, and
    /// `next_run` advances by the row's interval. Returns the number of
    /// schedules that ran. A failing row is logged and skipped.
    pub async fn run_due_schedules(&self, now: DateTime<Utc>) -> Result<usize, HearthError> {
        let due = self.schedules.due(now)?;
        let mut ran = 0;

        for schedule in due {
            let outcome_error = match schedule.kind {
                ScheduleKind::Insights => {
                    self.service.generate_insights(&schedule.family_id).await.error
                }
                ScheduleKind::Suggestions => {
                    self.service
                        .generate_suggestions(&schedule.family_id)
                        .await
                        .error
                }
            };
            if let Some(error) = outcome_error {
                warn!(
                    "Scheduled {} generation for {} failed: {}",
                    schedule.kind.as_str(),
                    schedule.family_id,
                    error
                );
            }

            // Advance next_run regardless: a failing family must not wedge
            // the schedule into a hot loop.
            let next = now + schedule.frequency.interval();
            if let Err(e) = self.schedules.complete_run(schedule.id, now, next) {
                warn!("Failed to advance schedule {}: {}", schedule.id, e);
                continue;
            }
            ran += 1;
        }

        Ok(ran)
    }

    /// Background loop: run due schedules, sleep until the next one (or the
    /// poll interval), repeat. Returns on shutdown.
    pub async fn run(&self) {
        loop {
            let now = Utc::now();
            if let Err(e) = self.run_due_schedules(now).await {
                warn!("Schedule sweep failed: {}", e);
            }

            let sleep_secs = match self.schedules.next_due_at() {
                Ok(Some(next)) => {
                    let until = (next - Utc::now()).num_seconds().max(1) as u64;
                    until.min(self.poll_interval_secs)
                }
                _ => self.poll_interval_secs,
            };

            tokio::select! {
                _ = tokio::time::sleep(std::time::Duration::from_secs(sleep_secs)) => {}
                _ = self.shutdown.notified() => return,
            }
        }
    }

    /// Signal the background loop to stop. Idempotent.
    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }
}

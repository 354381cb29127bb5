//! Durable recurring-generation schedules.
//!
//! Schedules are plain rows, not in-process timers: a stateless runner
//! queries due rows, executes them, and advances `next_run`, so nothing is
//! lost on process restart.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, Row};
use uuid::Uuid;

use hearth_core::error::HearthError;
use hearth_core::types::{Schedule, ScheduleFrequency, ScheduleKind};

use crate::codec;
use crate::db::Database;

/// Repository for durable generation schedules.
pub struct ScheduleRepository {
    db: Arc<Database>,
}

impl ScheduleRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Store or replace a schedule.
    pub fn save(&self, schedule: &Schedule) -> Result<(), HearthError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO schedules
                 (id, family_id, kind, frequency, next_run, enabled, last_run, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    schedule.id.to_string(),
                    schedule.family_id,
                    schedule.kind.as_str(),
                    schedule.frequency.as_str(),
                    codec::to_epoch(schedule.next_run),
                    schedule.enabled as i32,
                    schedule.last_run.map(codec::to_epoch),
                    codec::to_epoch(schedule.created_at),
                ],
            )
            .map_err(|e| HearthError::Storage(format!("Failed to save schedule: {}", e)))?;
            Ok(())
        })
    }

    pub fn find_by_id(&self, id: Uuid) -> Result<Option<Schedule>, HearthError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(&format!("{} WHERE id = ?1", SELECT_SCHEDULE))
                .map_err(|e| HearthError::Storage(e.to_string()))?;

            let result = stmt
                .query_row(rusqlite::params![id.to_string()], |row| {
                    Ok(row_to_schedule(row))
                })
                .optional()
                .map_err(|e| HearthError::Storage(e.to_string()))?;

            match result {
                Some(schedule) => Ok(Some(schedule?)),
                None => Ok(None),
            }
        })
    }

    /// Enabled schedules whose `next_run` is at or before `now`.
    pub fn due(&self, now: DateTime<Utc>) -> Result<Vec<Schedule>, HearthError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "{} WHERE enabled = 1 AND next_run <= ?1 ORDER BY next_run",
                    SELECT_SCHEDULE
                ))
                .map_err(|e| HearthError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map(rusqlite::params![codec::to_epoch(now)], |row| {
                    Ok(row_to_schedule(row))
                })
                .map_err(|e| HearthError::Storage(e.to_string()))?;

            let mut schedules = Vec::new();
            for row in rows {
                schedules.push(row.map_err(|e| HearthError::Storage(e.to_string()))??);
            }
            Ok(schedules)
        })
    }

    /// The earliest `next_run` among enabled schedules, if any.
    pub fn next_due_at(&self) -> Result<Option<DateTime<Utc>>, HearthError> {
        self.db.with_conn(|conn| {
            let next: Option<i64> = conn
                .query_row(
                    "SELECT MIN(next_run) FROM schedules WHERE enabled = 1",
                    [],
                    |row| row.get(0),
                )
                .map_err(|e| HearthError::Storage(e.to_string()))?;
            Ok(next.map(codec::from_epoch))
        })
    }

    /// Record a completed run and advance `next_run`.
    pub fn complete_run(
        &self,
        id: Uuid,
        ran_at: DateTime<Utc>,
        next_run: DateTime<Utc>,
    ) -> Result<(), HearthError> {
        self.db.with_conn(|conn| {
            let changed = conn
                .execute(
                    "UPDATE schedules SET last_run = ?2, next_run = ?3 WHERE id = ?1",
                    rusqlite::params![
                        id.to_string(),
                        codec::to_epoch(ran_at),
                        codec::to_epoch(next_run)
                    ],
                )
                .map_err(|e| HearthError::Storage(e.to_string()))?;
            if changed == 0 {
                return Err(HearthError::NotFound(format!("schedule {}", id)));
            }
            Ok(())
        })
    }

    /// Enable or disable a schedule. Idempotent: disabling a schedule that
    /// is already disabled (or missing) is not an error.
    pub fn set_enabled(&self, id: Uuid, enabled: bool) -> Result<(), HearthError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "UPDATE schedules SET enabled = ?2 WHERE id = ?1",
                rusqlite::params![id.to_string(), enabled as i32],
            )
            .map_err(|e| HearthError::Storage(e.to_string()))?;
            Ok(())
        })
    }
}

const SELECT_SCHEDULE: &str = "SELECT id, family_id, kind, frequency, next_run, enabled,
        last_run, created_at
 FROM schedules";

fn row_to_schedule(row: &Row<'_>) -> Result<Schedule, HearthError> {
    let id: String = row.get(0).map_err(|e| HearthError::Storage(e.to_string()))?;
    let family_id: String = row.get(1).map_err(|e| HearthError::Storage(e.to_string()))?;
    let kind: String = row.get(2).map_err(|e| HearthError::Storage(e.to_string()))?;
    let frequency: String = row.get(3).map_err(|e| HearthError::Storage(e.to_string()))?;
    let next_run: i64 = row.get(4).map_err(|e| HearthError::Storage(e.to_string()))?;
    let enabled: i32 = row.get(5).map_err(|e| HearthError::Storage(e.to_string()))?;
    let last_run: Option<i64> = row.get(6).map_err(|e| HearthError::Storage(e.to_string()))?;
    let created_at: i64 = row.get(7).map_err(|e| HearthError::Storage(e.to_string()))?;

    Ok(Schedule {
        id: codec::parse_uuid(&id)?,
        family_id,
        kind: ScheduleKind::parse(&kind)
            .ok_or_else(|| HearthError::Storage(format!("Unknown schedule kind: {}", kind)))?,
        frequency: ScheduleFrequency::parse(&frequency).ok_or_else(|| {
            HearthError::Storage(format!("Unknown schedule frequency: {}", frequency))
        })?,
        next_run: codec::from_epoch(next_run),
        enabled: enabled != 0,
        last_run: last_run.map(codec::from_epoch),
        created_at: codec::from_epoch(created_at),
    })
}

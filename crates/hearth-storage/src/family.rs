//! Family record repository: members, tasks, and events.
//!
//! These are the raw inputs the insight and suggestion generators analyze.

use std::sync::Arc;

use rusqlite::Row;

use hearth_core::error::HearthError;
use hearth_core::types::{FamilyEvent, FamilyMember, FamilyTask, MemberRole, TaskState};

use crate::codec;
use crate::db::Database;

/// Repository for family members, tasks, and events.
pub struct FamilyRepository {
    db: Arc<Database>,
}

impl FamilyRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    // ── Members ─────────────────────────────────────────────────────

    pub fn save_member(&self, member: &FamilyMember) -> Result<(), HearthError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO family_members
                 (id, family_id, name, role, birth_date, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    member.id.to_string(),
                    member.family_id,
                    member.name,
                    member.role.as_str(),
                    member.birth_date.map(|d| d.to_string()),
                    codec::to_epoch(member.created_at),
                ],
            )
            .map_err(|e| HearthError::Storage(format!("Failed to save member: {}", e)))?;
            Ok(())
        })
    }

    pub fn list_members(&self, family_id: &str) -> Result<Vec<FamilyMember>, HearthError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, family_id, name, role, birth_date, created_at
                     FROM family_members WHERE family_id = ?1 ORDER BY created_at",
                )
                .map_err(|e| HearthError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map(rusqlite::params![family_id], |row| Ok(row_to_member(row)))
                .map_err(|e| HearthError::Storage(e.to_string()))?;

            let mut members = Vec::new();
            for row in rows {
                members.push(row.map_err(|e| HearthError::Storage(e.to_string()))??);
            }
            Ok(members)
        })
    }

    // ── Tasks ───────────────────────────────────────────────────────

    pub fn save_task(&self, task: &FamilyTask) -> Result<(), HearthError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO family_tasks
                 (id, family_id, title, task_type, assignee_id, due_date, status,
                  completed_at, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                rusqlite::params![
                    task.id.to_string(),
                    task.family_id,
                    task.title,
                    task.task_type,
                    task.assignee_id.map(|a| a.to_string()),
                    task.due_date.map(|d| d.to_string()),
                    task.status.as_str(),
                    task.completed_at.map(codec::to_epoch),
                    codec::to_epoch(task.created_at),
                ],
            )
            .map_err(|e| HearthError::Storage(format!("Failed to save task: {}", e)))?;
            Ok(())
        })
    }

    pub fn list_tasks(&self, family_id: &str) -> Result<Vec<FamilyTask>, HearthError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, family_id, title, task_type, assignee_id, due_date, status,
                            completed_at, created_at
                     FROM family_tasks WHERE family_id = ?1 ORDER BY created_at",
                )
                .map_err(|e| HearthError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map(rusqlite::params![family_id], |row| Ok(row_to_task(row)))
                .map_err(|e| HearthError::Storage(e.to_string()))?;

            let mut tasks = Vec::new();
            for row in rows {
                tasks.push(row.map_err(|e| HearthError::Storage(e.to_string()))??);
            }
            Ok(tasks)
        })
    }

    // ── Events ──────────────────────────────────────────────────────

    pub fn save_event(&self, event: &FamilyEvent) -> Result<(), HearthError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO family_events
                 (id, family_id, title, category, event_date, event_time, attendee_ids,
                  created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    event.id.to_string(),
                    event.family_id,
                    event.title,
                    event.category,
                    event.event_date.to_string(),
                    event.event_time.map(|t| t.format("%H:%M").to_string()),
                    codec::to_json(&event.attendee_ids)?,
                    codec::to_epoch(event.created_at),
                ],
            )
            .map_err(|e| HearthError::Storage(format!("Failed to save event: {}", e)))?;
            Ok(())
        })
    }

    pub fn list_events(&self, family_id: &str) -> Result<Vec<FamilyEvent>, HearthError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, family_id, title, category, event_date, event_time,
                            attendee_ids, created_at
                     FROM family_events WHERE family_id = ?1 ORDER BY event_date",
                )
                .map_err(|e| HearthError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map(rusqlite::params![family_id], |row| Ok(row_to_event(row)))
                .map_err(|e| HearthError::Storage(e.to_string()))?;

            let mut events = Vec::new();
            for row in rows {
                events.push(row.map_err(|e| HearthError::Storage(e.to_string()))??);
            }
            Ok(events)
        })
    }
}

fn row_to_member(row: &Row<'_>) -> Result<FamilyMember, HearthError> {
    let id: String = row.get(0).map_err(|e| HearthError::Storage(e.to_string()))?;
    let family_id: String = row.get(1).map_err(|e| HearthError::Storage(e.to_string()))?;
    let name: String = row.get(2).map_err(|e| HearthError::Storage(e.to_string()))?;
    let role: String = row.get(3).map_err(|e| HearthError::Storage(e.to_string()))?;
    let birth_date: Option<String> = row.get(4).map_err(|e| HearthError::Storage(e.to_string()))?;
    let created_at: i64 = row.get(5).map_err(|e| HearthError::Storage(e.to_string()))?;

    Ok(FamilyMember {
        id: codec::parse_uuid(&id)?,
        family_id,
        name,
        role: MemberRole::parse(&role)
            .ok_or_else(|| HearthError::Storage(format!("Unknown member role: {}", role)))?,
        birth_date: codec::opt_date(birth_date),
        created_at: codec::from_epoch(created_at),
    })
}

fn row_to_task(row: &Row<'_>) -> Result<FamilyTask, HearthError> {
    let id: String = row.get(0).map_err(|e| HearthError::Storage(e.to_string()))?;
    let family_id: String = row.get(1).map_err(|e| HearthError::Storage(e.to_string()))?;
    let title: String = row.get(2).map_err(|e| HearthError::Storage(e.to_string()))?;
    let task_type: String = row.get(3).map_err(|e| HearthError::Storage(e.to_string()))?;
    let assignee_id: Option<String> = row.get(4).map_err(|e| HearthError::Storage(e.to_string()))?;
    let due_date: Option<String> = row.get(5).map_err(|e| HearthError::Storage(e.to_string()))?;
    let status: String = row.get(6).map_err(|e| HearthError::Storage(e.to_string()))?;
    let completed_at: Option<i64> = row.get(7).map_err(|e| HearthError::Storage(e.to_string()))?;
    let created_at: i64 = row.get(8).map_err(|e| HearthError::Storage(e.to_string()))?;

    Ok(FamilyTask {
        id: codec::parse_uuid(&id)?,
        family_id,
        title,
        task_type,
        assignee_id: codec::opt_uuid(assignee_id)?,
        due_date: codec::opt_date(due_date),
        status: TaskState::parse(&status)
            .ok_or_else(|| HearthError::Storage(format!("Unknown task status: {}", status)))?,
        completed_at: completed_at.map(codec::from_epoch),
        created_at: codec::from_epoch(created_at),
    })
}

fn row_to_event(row: &Row<'_>) -> Result<FamilyEvent, HearthError> {
    let id: String = row.get(0).map_err(|e| HearthError::Storage(e.to_string()))?;
    let family_id: String = row.get(1).map_err(|e| HearthError::Storage(e.to_string()))?;
    let title: String = row.get(2).map_err(|e| HearthError::Storage(e.to_string()))?;
    let category: String = row.get(3).map_err(|e| HearthError::Storage(e.to_string()))?;
    let event_date: String = row.get(4).map_err(|e| HearthError::Storage(e.to_string()))?;
    let event_time: Option<String> = row.get(5).map_err(|e| HearthError::Storage(e.to_string()))?;
    let attendee_ids: String = row.get(6).map_err(|e| HearthError::Storage(e.to_string()))?;
    let created_at: i64 = row.get(7).map_err(|e| HearthError::Storage(e.to_string()))?;

    Ok(FamilyEvent {
        id: codec::parse_uuid(&id)?,
        family_id,
        title,
        category,
        event_date: codec::opt_date(Some(event_date.clone())).ok_or_else(|| {
            HearthError::Storage(format!("Bad event date: {}", event_date))
        })?,
        event_time: codec::opt_time(event_time),
        attendee_ids: codec::from_json(&attendee_ids)?,
        created_at: codec::from_epoch(created_at),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, Utc};
    use uuid::Uuid;

    fn repo() -> FamilyRepository {
        FamilyRepository::new(Arc::new(Database::in_memory().unwrap()))
    }

    fn make_member(family: &str, name: &str, role: MemberRole) -> FamilyMember {
        FamilyMember {
            id: Uuid::new_v4(),
            family_id: family.to_string(),
            name: name.to_string(),
            role,
            birth_date: NaiveDate::from_ymd_opt(2017, 5, 12),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_member_roundtrip() {
        let repo = repo();
        let member = make_member("fam-1", "Ada", MemberRole::Child);
        repo.save_member(&member).unwrap();

        let members = repo.list_members("fam-1").unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].name, "Ada");
        assert_eq!(members[0].role, MemberRole::Child);
        assert_eq!(members[0].birth_date, NaiveDate::from_ymd_opt(2017, 5, 12));
    }

    #[test]
    fn test_task_roundtrip() {
        let repo = repo();
        let assignee = Uuid::new_v4();
        let task = FamilyTask {
            id: Uuid::new_v4(),
            family_id: "fam-1".to_string(),
            title: "Pack lunches".to_string(),
            task_type: "chore".to_string(),
            assignee_id: Some(assignee),
            due_date: NaiveDate::from_ymd_opt(2026, 8, 10),
            status: TaskState::Open,
            completed_at: None,
            created_at: Utc::now(),
        };
        repo.save_task(&task).unwrap();

        let tasks = repo.list_tasks("fam-1").unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].assignee_id, Some(assignee));
        assert_eq!(tasks[0].status, TaskState::Open);
        assert!(tasks[0].completed_at.is_none());
    }

    #[test]
    fn test_event_roundtrip() {
        let repo = repo();
        let attendees = vec![Uuid::new_v4(), Uuid::new_v4()];
        let event = FamilyEvent {
            id: Uuid::new_v4(),
            family_id: "fam-1".to_string(),
            title: "Soccer practice".to_string(),
            category: "sports".to_string(),
            event_date: NaiveDate::from_ymd_opt(2026, 8, 12).unwrap(),
            event_time: NaiveTime::from_hms_opt(16, 30, 0),
            attendee_ids: attendees.clone(),
            created_at: Utc::now(),
        };
        repo.save_event(&event).unwrap();

        let events = repo.list_events("fam-1").unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].attendee_ids, attendees);
        assert_eq!(
            events[0].event_time,
            NaiveTime::from_hms_opt(16, 30, 0)
        );
    }

    #[test]
    fn test_family_scoping() {
        let repo = repo();
        repo.save_member(&make_member("fam-1", "Ada", MemberRole::Child))
            .unwrap();
        repo.save_member(&make_member("fam-2", "Ben", MemberRole::Child))
            .unwrap();
        assert_eq!(repo.list_members("fam-1").unwrap().len(), 1);
        assert_eq!(repo.list_members("fam-2").unwrap().len(), 1);
        assert!(repo.list_members("fam-3").unwrap().is_empty());
    }
}

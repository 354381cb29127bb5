//! The ten insight generators.
//!
//! Each generator is an independent, side-effect-free analysis function
//! `(ctx, family_id, now) -> Result<Vec<Insight>>`. The orchestrator runs
//! all of them per cycle and isolates failures per generator.

pub mod medical;
pub mod milestones;
pub mod relationship;
pub mod schedule;
pub mod sibling;
pub mod tasks;
pub mod workload;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use hearth_core::types::{Insight, InsightStatus, InsightType, Severity};

use crate::context::InsightContext;
use crate::error::InsightError;

/// Signature every generator conforms to.
pub type GeneratorFn =
    fn(&InsightContext, &str, DateTime<Utc>) -> Result<Vec<Insight>, InsightError>;

/// All ten generators, in the order the orchestrator runs them.
pub const GENERATORS: &[(&str, GeneratorFn)] = &[
    ("workload_imbalance", workload::workload_imbalance),
    ("scheduling_conflict", schedule::scheduling_conflict),
    ("overdue_task", tasks::overdue_tasks),
    ("sibling_dynamics", sibling::sibling_dynamics),
    ("relationship_health", relationship::relationship_health),
    ("medical_reminder", medical::medical_reminders),
    ("milestone", milestones::milestones),
    ("family_time", relationship::family_time),
    ("task_streak", tasks::task_streaks),
    ("event_preparation", schedule::event_preparation),
];

/// Insights expire this many days after generation.
pub(crate) const INSIGHT_TTL_DAYS: i64 = 30;

/// Construct an insight with the standard defaults.
///
/// `actionable` follows from the presence of action items, which keeps the
/// invariant that every actionable insight carries at least one.
#[allow(clippy::too_many_arguments)]
pub(crate) fn new_insight(
    family_id: &str,
    insight_type: InsightType,
    title: String,
    description: String,
    severity: Severity,
    confidence: f32,
    entities: Vec<String>,
    action_items: Vec<String>,
    now: DateTime<Utc>,
) -> Insight {
    Insight {
        id: Uuid::new_v4(),
        family_id: family_id.to_string(),
        insight_type,
        title,
        description,
        severity,
        entities,
        actionable: !action_items.is_empty(),
        action_items,
        confidence,
        generated_at: now,
        expires_at: now + Duration::days(INSIGHT_TTL_DAYS),
        status: InsightStatus::Active,
        seen_by: vec![],
        actions_completed: vec![],
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Shared test fixtures for the generator tests.

    use std::sync::Arc;

    use chrono::{NaiveDate, NaiveTime, Utc};
    use uuid::Uuid;

    use hearth_core::types::{
        FamilyEvent, FamilyMember, FamilyTask, MemberRole, TaskState,
    };
    use hearth_storage::Database;

    use super::*;

    pub fn context() -> (Arc<Database>, InsightContext) {
        let db = Arc::new(Database::in_memory().unwrap());
        let ctx = InsightContext::new(Arc::clone(&db));
        (db, ctx)
    }

    pub fn member(family: &str, name: &str, role: MemberRole) -> FamilyMember {
        FamilyMember {
            id: Uuid::new_v4(),
            family_id: family.to_string(),
            name: name.to_string(),
            role,
            birth_date: None,
            created_at: Utc::now(),
        }
    }

    pub fn open_task(
        family: &str,
        title: &str,
        task_type: &str,
        assignee: Uuid,
        due: Option<NaiveDate>,
    ) -> FamilyTask {
        FamilyTask {
            id: Uuid::new_v4(),
            family_id: family.to_string(),
            title: title.to_string(),
            task_type: task_type.to_string(),
            assignee_id: Some(assignee),
            due_date: due,
            status: TaskState::Open,
            completed_at: None,
            created_at: Utc::now(),
        }
    }

    pub fn event(
        family: &str,
        title: &str,
        date: NaiveDate,
        time: Option<NaiveTime>,
        attendees: Vec<Uuid>,
    ) -> FamilyEvent {
        FamilyEvent {
            id: Uuid::new_v4(),
            family_id: family.to_string(),
            title: title.to_string(),
            category: "general".to_string(),
            event_date: date,
            event_time: time,
            attendee_ids: attendees,
            created_at: Utc::now(),
        }
    }
}

//! Overdue task detection and completion streak recognition.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use hearth_core::types::{FamilyTask, Insight, InsightType, Severity, TaskState};

use crate::context::InsightContext;
use crate::error::InsightError;

use super::new_insight;

/// Days overdue that raise the insight to high severity.
const HIGH_SEVERITY_OVERDUE_DAYS: i64 = 7;
/// Overdue count per assignee that raises the insight to high severity.
const HIGH_SEVERITY_OVERDUE_COUNT: usize = 5;

/// Completions within the streak window needed for recognition.
const STREAK_COMPLETIONS: usize = 5;
/// The streak window, in days.
const STREAK_WINDOW_DAYS: i64 = 7;

/// Flag open tasks past their due date, one insight per assignee.
pub fn overdue_tasks(
    ctx: &InsightContext,
    family_id: &str,
    now: DateTime<Utc>,
) -> Result<Vec<Insight>, InsightError> {
    let today = now.date_naive();
    let members = ctx.family.list_members(family_id)?;
    let tasks = ctx.family.list_tasks(family_id)?;

    let mut overdue_by_assignee: HashMap<Option<Uuid>, Vec<&FamilyTask>> = HashMap::new();
    for task in &tasks {
        if task.status != TaskState::Open {
            continue;
        }
        let Some(due) = task.due_date else { continue };
        if due < today {
            overdue_by_assignee.entry(task.assignee_id).or_default().push(task);
        }
    }

    let mut insights = Vec::new();
    for (assignee, overdue) in overdue_by_assignee {
        let name = assignee
            .and_then(|id| members.iter().find(|m| m.id == id))
            .map(|m| m.name.clone())
            .unwrap_or_else(|| "Unassigned".to_string());

        let oldest_days = overdue
            .iter()
            .filter_map(|t| t.due_date.map(|d| (today - d).num_days()))
            .max()
            .unwrap_or(0);

        let severity = if oldest_days >= HIGH_SEVERITY_OVERDUE_DAYS
            || overdue.len() >= HIGH_SEVERITY_OVERDUE_COUNT
        {
            Severity::High
        } else {
            Severity::Medium
        };

        let mut entities: Vec<String> = overdue.iter().map(|t| t.id.to_string()).collect();
        if let Some(id) = assignee {
            entities.insert(0, id.to_string());
        }

        insights.push(new_insight(
            family_id,
            InsightType::OverdueTask,
            format!("Overdue tasks: {}", name),
            format!(
                "{} has {} overdue task(s); the oldest is {} day(s) past due.",
                name,
                overdue.len(),
                oldest_days
            ),
            severity,
            0.85,
            entities,
            vec![
                "Review and reschedule the overdue tasks".to_string(),
                "Drop tasks that are no longer needed".to_string(),
            ],
            now,
        ));
    }

    Ok(insights)
}

/// Recognize members who completed a run of tasks recently with nothing
/// overdue. Low severity, positive signal.
pub fn task_streaks(
    ctx: &InsightContext,
    family_id: &str,
    now: DateTime<Utc>,
) -> Result<Vec<Insight>, InsightError> {
    let today = now.date_naive();
    let window_start = now - Duration::days(STREAK_WINDOW_DAYS);
    let members = ctx.family.list_members(family_id)?;
    let tasks = ctx.family.list_tasks(family_id)?;

    let mut insights = Vec::new();
    for member in &members {
        let completed_recently = tasks
            .iter()
            .filter(|t| {
                t.assignee_id == Some(member.id)
                    && t.status == TaskState::Completed
                    && t.completed_at.is_some_and(|c| c >= window_start)
            })
            .count();

        let has_overdue = tasks.iter().any(|t| {
            t.assignee_id == Some(member.id)
                && t.status == TaskState::Open
                && t.due_date.is_some_and(|d| d < today)
        });

        if completed_recently >= STREAK_COMPLETIONS && !has_overdue {
            insights.push(new_insight(
                family_id,
                InsightType::TaskStreak,
                format!("{} is on a roll", member.name),
                format!(
                    "{} completed {} tasks in the last {} days with nothing overdue.",
                    member.name, completed_recently, STREAK_WINDOW_DAYS
                ),
                Severity::Low,
                0.9,
                vec![member.id.to_string()],
                vec![format!("Acknowledge {}'s streak", member.name)],
                now,
            ));
        }
    }

    Ok(insights)
}

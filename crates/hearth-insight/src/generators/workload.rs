//! Workload imbalance detection across guardians.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use hearth_core::types::{Insight, InsightType, Severity, TaskState};

use crate::context::InsightContext;
use crate::error::InsightError;

use super::new_insight;

/// Ratio of max to average active tasks that flags an imbalance.
const IMBALANCE_RATIO: f64 = 1.5;
/// Ratio beyond which the imbalance is high severity.
const HIGH_SEVERITY_RATIO: f64 = 2.0;
/// Minimum active tasks on the busiest guardian to flag at all.
const MIN_MAX_TASKS: usize = 5;
/// Share of one task type held by one person that flags concentration.
const CONCENTRATION_SHARE: f64 = 0.8;
/// Minimum tasks of a type before concentration is considered.
const MIN_TYPE_TASKS: usize = 5;

/// Flag guardians carrying a disproportionate share of active tasks, plus
/// per-task-type concentration on a single person.
pub fn workload_imbalance(
    ctx: &InsightContext,
    family_id: &str,
    now: DateTime<Utc>,
) -> Result<Vec<Insight>, InsightError> {
    let members = ctx.family.list_members(family_id)?;
    let guardians: Vec<_> = members.iter().filter(|m| m.role.is_guardian()).collect();
    if guardians.is_empty() {
        return Ok(vec![]);
    }

    let tasks = ctx.family.list_tasks(family_id)?;
    let active: Vec<_> = tasks
        .iter()
        .filter(|t| t.status == TaskState::Open)
        .collect();
    if active.is_empty() {
        return Ok(vec![]);
    }

    let mut insights = Vec::new();

    // Pass 1: total active-task counts per guardian.
    let mut counts: HashMap<Uuid, usize> = guardians.iter().map(|g| (g.id, 0)).collect();
    for task in &active {
        if let Some(assignee) = task.assignee_id {
            if let Some(count) = counts.get_mut(&assignee) {
                *count += 1;
            }
        }
    }

    let total: usize = counts.values().sum();
    let avg = total as f64 / guardians.len() as f64;
    if let Some((&busiest, &max)) = counts.iter().max_by_key(|(_, &count)| count) {
        if avg > 0.0 {
            let ratio = max as f64 / avg;
            if ratio > IMBALANCE_RATIO && max > MIN_MAX_TASKS {
                let name = guardians
                    .iter()
                    .find(|g| g.id == busiest)
                    .map(|g| g.name.as_str())
                    .unwrap_or("one guardian");
                let severity = if ratio > HIGH_SEVERITY_RATIO {
                    Severity::High
                } else {
                    Severity::Medium
                };
                insights.push(new_insight(
                    family_id,
                    InsightType::WorkloadImbalance,
                    format!("Uneven workload: {}", name),
                    format!(
                        "{} has {} active tasks, {:.1}x the family average of {:.1}.",
                        name, max, ratio, avg
                    ),
                    severity,
                    0.8,
                    vec![busiest.to_string()],
                    vec![
                        "Review the open task list together".to_string(),
                        format!("Reassign some of {}'s tasks", name),
                    ],
                    now,
                ));
            }
        }
    }

    // Pass 2: one person holding most of a task type.
    let mut by_type: HashMap<&str, Vec<Uuid>> = HashMap::new();
    for task in &active {
        if let Some(assignee) = task.assignee_id {
            by_type.entry(task.task_type.as_str()).or_default().push(assignee);
        }
    }

    for (task_type, assignees) in by_type {
        if task_type.is_empty() || assignees.len() < MIN_TYPE_TASKS {
            continue;
        }
        let mut per_person: HashMap<Uuid, usize> = HashMap::new();
        for assignee in &assignees {
            *per_person.entry(*assignee).or_insert(0) += 1;
        }
        if let Some((&holder, &held)) = per_person.iter().max_by_key(|(_, &count)| count) {
            let share = held as f64 / assignees.len() as f64;
            if share > CONCENTRATION_SHARE {
                let name = members
                    .iter()
                    .find(|m| m.id == holder)
                    .map(|m| m.name.as_str())
                    .unwrap_or("one person");
                insights.push(new_insight(
                    family_id,
                    InsightType::WorkloadImbalance,
                    format!("Task concentration: {}", task_type),
                    format!(
                        "{} holds {} of {} active '{}' tasks.",
                        name,
                        held,
                        assignees.len(),
                        task_type
                    ),
                    Severity::Medium,
                    0.75,
                    vec![holder.to_string()],
                    vec![format!("Rotate '{}' tasks across the family", task_type)],
                    now,
                ));
            }
        }
    }

    Ok(insights)
}

//! Health/wellness and financial optimization suggestions.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use hearth_core::types::{
    ConfidenceLevel, InsightType, Severity, Suggestion, SuggestionType, TaskState,
};

use crate::error::SuggestError;
use crate::snapshot::FamilyContext;

use super::new_suggestion;

/// Open errand-like tasks before suggesting a consolidated run.
const ERRAND_BATCH_THRESHOLD: usize = 5;

/// Task types treated as errands for batching purposes.
const ERRAND_TYPES: &[&str] = &["shopping", "errand", "grocery"];

/// Follow up on medical reminders and nudge toward a movement habit.
pub fn health_wellness(
    ctx: &FamilyContext,
    now: DateTime<Utc>,
) -> Result<Vec<Suggestion>, SuggestError> {
    let mut suggestions = Vec::new();

    let reminders = ctx.insights_of_type(InsightType::MedicalReminder);
    if !reminders.is_empty() {
        let entities: Vec<String> = reminders
            .iter()
            .flat_map(|i| i.entities.iter().cloned())
            .collect();
        suggestions.push(new_suggestion(
            &ctx.family_id,
            SuggestionType::HealthWellness,
            "Book the pending medical appointments".to_string(),
            "Medical reminders are waiting; booking them now beats the seasonal rush."
                .to_string(),
            Severity::High,
            0.85,
            0.8,
            ConfidenceLevel::VeryHigh,
            entities,
            vec![
                "Call the clinic this week".to_string(),
                "Add the appointments to the calendar".to_string(),
            ],
            now,
        ));
    }

    let has_sports_event = ctx.events.iter().any(|e| e.category == "sports");
    if !has_sports_event {
        suggestions.push(new_suggestion(
            &ctx.family_id,
            SuggestionType::HealthWellness,
            "Start a family walk habit".to_string(),
            "No active events are on the calendar; a short recurring walk is an easy start."
                .to_string(),
            Severity::Low,
            0.55,
            0.5,
            ConfidenceLevel::Medium,
            vec![],
            vec!["Pick two evenings a week for a walk".to_string()],
            now,
        ));
    }

    Ok(suggestions)
}

/// Suggest consolidating errand-type tasks into one run.
pub fn financial_optimization(
    ctx: &FamilyContext,
    now: DateTime<Utc>,
) -> Result<Vec<Suggestion>, SuggestError> {
    let mut by_type: HashMap<&str, usize> = HashMap::new();
    for task in &ctx.tasks {
        if task.status == TaskState::Open && ERRAND_TYPES.contains(&task.task_type.as_str()) {
            *by_type.entry(task.task_type.as_str()).or_insert(0) += 1;
        }
    }

    let total: usize = by_type.values().sum();
    if total < ERRAND_BATCH_THRESHOLD {
        return Ok(vec![]);
    }

    Ok(vec![new_suggestion(
        &ctx.family_id,
        SuggestionType::FinancialOptimization,
        "Batch the errands into one trip".to_string(),
        format!(
            "{} open shopping and errand tasks are scattered; one planned trip saves time and fuel.",
            total
        ),
        Severity::Low,
        0.65,
        0.55,
        ConfidenceLevel::Medium,
        vec![],
        vec![
            "Combine the shopping lists".to_string(),
            "Plan one route for all the stops".to_string(),
        ],
        now,
    )])
}

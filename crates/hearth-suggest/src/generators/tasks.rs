//! Task optimization and workload balance suggestions.

use chrono::{DateTime, Utc};

use hearth_core::types::{
    ConfidenceLevel, InsightType, Severity, Suggestion, SuggestionType, TaskState,
};

use crate::error::SuggestError;
use crate::snapshot::FamilyContext;

use super::new_suggestion;

/// Open tasks without a due date before suggesting date hygiene.
const UNDATED_TASK_THRESHOLD: usize = 3;

/// Suggest task hygiene improvements: missing due dates and a recurring
/// review when overdue insights keep appearing.
pub fn task_optimization(
    ctx: &FamilyContext,
    now: DateTime<Utc>,
) -> Result<Vec<Suggestion>, SuggestError> {
    let mut suggestions = Vec::new();

    let undated: Vec<_> = ctx
        .tasks
        .iter()
        .filter(|t| t.status == TaskState::Open && t.due_date.is_none())
        .collect();
    if undated.len() >= UNDATED_TASK_THRESHOLD {
        suggestions.push(new_suggestion(
            &ctx.family_id,
            SuggestionType::TaskOptimization,
            "Give open tasks due dates".to_string(),
            format!(
                "{} open tasks have no due date, so nothing surfaces them before they slip.",
                undated.len()
            ),
            Severity::Low,
            0.75,
            0.6,
            ConfidenceLevel::High,
            undated.iter().map(|t| t.id.to_string()).collect(),
            vec!["Add a due date to each open task".to_string()],
            now,
        ));
    }

    if !ctx.insights_of_type(InsightType::OverdueTask).is_empty() {
        suggestions.push(new_suggestion(
            &ctx.family_id,
            SuggestionType::TaskOptimization,
            "Start a weekly task review".to_string(),
            "Overdue tasks keep appearing; a short weekly review catches them early.".to_string(),
            Severity::Medium,
            0.7,
            0.65,
            ConfidenceLevel::High,
            vec![],
            vec![
                "Pick a 15-minute slot each week".to_string(),
                "Walk the open task list together".to_string(),
            ],
            now,
        ));
    }

    Ok(suggestions)
}

/// Suggest rebalancing when workload imbalance insights are present.
pub fn workload_balance(
    ctx: &FamilyContext,
    now: DateTime<Utc>,
) -> Result<Vec<Suggestion>, SuggestError> {
    let imbalances = ctx.insights_of_type(InsightType::WorkloadImbalance);
    if imbalances.is_empty() {
        return Ok(vec![]);
    }

    let entities: Vec<String> = imbalances
        .iter()
        .flat_map(|i| i.entities.iter().cloned())
        .collect();

    Ok(vec![new_suggestion(
        &ctx.family_id,
        SuggestionType::WorkloadBalance,
        "Rebalance the household workload".to_string(),
        "One person is carrying a disproportionate share of active tasks.".to_string(),
        Severity::Medium,
        0.8,
        0.7,
        ConfidenceLevel::High,
        entities,
        vec![
            "List the recurring tasks and who owns them".to_string(),
            "Swap or rotate the heaviest categories".to_string(),
        ],
        now,
    )])
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::generators::fixtures::{empty_context, insight, open_task};

    #[test]
    fn test_undated_tasks_trigger_suggestion() {
        let mut ctx = empty_context("fam-1");
        for i in 0..3 {
            ctx.tasks.push(open_task("fam-1", &format!("t{}", i), "chore"));
        }

        let suggestions = task_optimization(&ctx, Utc::now()).unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].title, "Give open tasks due dates");
        assert_eq!(suggestions[0].entities.len(), 3);
        assert!((suggestions[0].relevance_score - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn test_few_undated_tasks_no_suggestion() {
        let mut ctx = empty_context("fam-1");
        ctx.tasks.push(open_task("fam-1", "t0", "chore"));
        assert!(task_optimization(&ctx, Utc::now()).unwrap().is_empty());
    }

    #[test]
    fn test_overdue_insights_trigger_review_suggestion() {
        let mut ctx = empty_context("fam-1");
        ctx.recent_insights
            .push(insight("fam-1", InsightType::OverdueTask, "Overdue tasks: Dana"));

        let suggestions = task_optimization(&ctx, Utc::now()).unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].title, "Start a weekly task review");
    }

    #[test]
    fn test_workload_balance_follows_insights() {
        let mut ctx = empty_context("fam-1");
        assert!(workload_balance(&ctx, Utc::now()).unwrap().is_empty());

        let mut imbalance = insight(
            "fam-1",
            InsightType::WorkloadImbalance,
            "Uneven workload: Dana",
        );
        imbalance.entities = vec!["member-1".to_string()];
        ctx.recent_insights.push(imbalance);

        let suggestions = workload_balance(&ctx, Utc::now()).unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].suggestion_type, SuggestionType::WorkloadBalance);
        assert_eq!(suggestions[0].entities, vec!["member-1".to_string()]);
    }
}

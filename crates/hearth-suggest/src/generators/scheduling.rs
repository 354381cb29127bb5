//! Schedule optimization and family activity suggestions.

use chrono::{DateTime, Duration, Utc};

use hearth_core::types::{ConfidenceLevel, InsightType, Severity, Suggestion, SuggestionType};

use crate::error::SuggestError;
use crate::snapshot::FamilyContext;

use super::new_suggestion;

/// Events missing a start time before suggesting calendar hygiene.
const UNTIMED_EVENT_THRESHOLD: usize = 3;

/// Days without any family event before suggesting an outing.
const ACTIVITY_GAP_DAYS: i64 = 14;

/// Suggest calendar improvements when conflicts or untimed events pile up.
pub fn schedule_optimization(
    ctx: &FamilyContext,
    now: DateTime<Utc>,
) -> Result<Vec<Suggestion>, SuggestError> {
    let mut suggestions = Vec::new();

    if !ctx.insights_of_type(InsightType::SchedulingConflict).is_empty() {
        suggestions.push(new_suggestion(
            &ctx.family_id,
            SuggestionType::ScheduleOptimization,
            "Hold a Sunday calendar review".to_string(),
            "Conflicts keep landing on the same days; ten minutes on Sunday avoids most of them."
                .to_string(),
            Severity::Medium,
            0.75,
            0.7,
            ConfidenceLevel::High,
            vec![],
            vec![
                "Walk the week's events together on Sunday".to_string(),
                "Resolve overlaps before they hit".to_string(),
            ],
            now,
        ));
    }

    let untimed = ctx.events.iter().filter(|e| e.event_time.is_none()).count();
    if untimed >= UNTIMED_EVENT_THRESHOLD {
        suggestions.push(new_suggestion(
            &ctx.family_id,
            SuggestionType::ScheduleOptimization,
            "Add start times to events".to_string(),
            format!(
                "{} events have no start time, which hides same-day collisions.",
                untimed
            ),
            Severity::Low,
            0.65,
            0.55,
            ConfidenceLevel::Medium,
            vec![],
            vec!["Fill in the missing start times".to_string()],
            now,
        ));
    }

    Ok(suggestions)
}

/// Suggest a shared outing when family time has lapsed.
pub fn family_activity(
    ctx: &FamilyContext,
    now: DateTime<Utc>,
) -> Result<Vec<Suggestion>, SuggestError> {
    let flagged = !ctx.insights_of_type(InsightType::FamilyTime).is_empty();

    let today = now.date_naive();
    let window_start = today - Duration::days(ACTIVITY_GAP_DAYS);
    let recent_event = ctx
        .events
        .iter()
        .any(|e| e.event_date >= window_start && e.event_date <= today);

    if !flagged && recent_event {
        return Ok(vec![]);
    }

    Ok(vec![new_suggestion(
        &ctx.family_id,
        SuggestionType::FamilyActivity,
        "Plan a family outing this weekend".to_string(),
        "The calendar has had no shared activity lately.".to_string(),
        Severity::Low,
        0.7,
        0.65,
        ConfidenceLevel::High,
        vec![],
        vec![
            "Pick something everyone enjoys".to_string(),
            "Put it on the calendar before the week fills up".to_string(),
        ],
        now,
    )])
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::generators::fixtures::{empty_context, event, insight};

    #[test]
    fn test_conflict_insights_trigger_review() {
        let mut ctx = empty_context("fam-1");
        ctx.recent_insights.push(insight(
            "fam-1",
            InsightType::SchedulingConflict,
            "Busy day for Ada",
        ));

        let suggestions = schedule_optimization(&ctx, Utc::now()).unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].title, "Hold a Sunday calendar review");
    }

    #[test]
    fn test_untimed_events_trigger_hygiene() {
        let mut ctx = empty_context("fam-1");
        let today = Utc::now().date_naive();
        for i in 0..3 {
            ctx.events
                .push(event("fam-1", &format!("e{}", i), "general", today));
        }

        let suggestions = schedule_optimization(&ctx, Utc::now()).unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].title, "Add start times to events");
        assert_eq!(suggestions[0].confidence_level, ConfidenceLevel::Medium);
    }

    #[test]
    fn test_family_activity_on_gap() {
        let ctx = empty_context("fam-1");
        let suggestions = family_activity(&ctx, Utc::now()).unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].suggestion_type, SuggestionType::FamilyActivity);
    }

    #[test]
    fn test_recent_event_suppresses_activity_suggestion() {
        let mut ctx = empty_context("fam-1");
        let today = Utc::now().date_naive();
        ctx.events.push(event("fam-1", "Picnic", "general", today - Duration::days(3)));
        assert!(family_activity(&ctx, Utc::now()).unwrap().is_empty());
    }

    #[test]
    fn test_family_time_insight_overrides_recent_event() {
        let mut ctx = empty_context("fam-1");
        let today = Utc::now().date_naive();
        ctx.events.push(event("fam-1", "Solo errand", "general", today - Duration::days(3)));
        ctx.recent_insights.push(insight(
            "fam-1",
            InsightType::FamilyTime,
            "Time for a family activity",
        ));
        assert_eq!(family_activity(&ctx, Utc::now()).unwrap().len(), 1);
    }
}

//! Child development and educational opportunity suggestions.

use chrono::{DateTime, Utc};

use hearth_core::types::{
    ConfidenceLevel, MemberRole, Severity, Suggestion, SuggestionType,
};

use crate::error::SuggestError;
use crate::snapshot::FamilyContext;

use super::new_suggestion;

/// Event categories that count as enrichment for a child.
const ENRICHMENT_CATEGORIES: &[&str] = &["sports", "music", "art", "class", "lesson", "club"];

/// Suggest an activity for children who attend no enrichment events.
pub fn child_development(
    ctx: &FamilyContext,
    now: DateTime<Utc>,
) -> Result<Vec<Suggestion>, SuggestError> {
    let mut suggestions = Vec::new();

    for child in ctx.members.iter().filter(|m| m.role == MemberRole::Child) {
        let enrolled = ctx.events.iter().any(|e| {
            ENRICHMENT_CATEGORIES.contains(&e.category.as_str())
                && e.attendee_ids.contains(&child.id)
        });
        if enrolled {
            continue;
        }
        suggestions.push(new_suggestion(
            &ctx.family_id,
            SuggestionType::ChildDevelopment,
            format!("Find an activity for {}", child.name),
            format!(
                "{} has no recurring activity on the calendar; a class or team adds structure.",
                child.name
            ),
            Severity::Low,
            0.65,
            0.6,
            ConfidenceLevel::Medium,
            vec![child.id.to_string()],
            vec![
                format!("Ask {} what sounds fun", child.name),
                "Check local programs with open spots".to_string(),
            ],
            now,
        ));
    }

    Ok(suggestions)
}

/// Suggest library or learning programs when no class-like events exist.
pub fn educational_opportunity(
    ctx: &FamilyContext,
    now: DateTime<Utc>,
) -> Result<Vec<Suggestion>, SuggestError> {
    let has_children = ctx.members.iter().any(|m| m.role == MemberRole::Child);
    if !has_children {
        return Ok(vec![]);
    }

    let has_learning_event = ctx
        .events
        .iter()
        .any(|e| matches!(e.category.as_str(), "class" | "lesson" | "tutoring"));
    if has_learning_event {
        return Ok(vec![]);
    }

    Ok(vec![new_suggestion(
        &ctx.family_id,
        SuggestionType::EducationalOpportunity,
        "Look into free library programs".to_string(),
        "Nothing learning-related is on the calendar; libraries run free weekly programs."
            .to_string(),
        Severity::Low,
        0.6,
        0.55,
        ConfidenceLevel::Medium,
        vec![],
        vec![
            "Check the library's events page".to_string(),
            "Pick one program to try this month".to_string(),
        ],
        now,
    )])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    use crate::generators::fixtures::{empty_context, event, member};

    #[test]
    fn test_child_without_activity_gets_suggestion() {
        let mut ctx = empty_context("fam-1");
        let ada = member("fam-1", "Ada", MemberRole::Child);
        ctx.members.push(ada.clone());

        let suggestions = child_development(&ctx, Utc::now()).unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].title, "Find an activity for Ada");
        assert_eq!(suggestions[0].entities, vec![ada.id.to_string()]);
    }

    #[test]
    fn test_enrolled_child_skipped() {
        let mut ctx = empty_context("fam-1");
        let ada = member("fam-1", "Ada", MemberRole::Child);
        let today = Utc::now().date_naive();
        let mut soccer = event("fam-1", "Soccer", "sports", today + Duration::days(2));
        soccer.attendee_ids = vec![ada.id];
        ctx.members.push(ada);
        ctx.events.push(soccer);

        assert!(child_development(&ctx, Utc::now()).unwrap().is_empty());
    }

    #[test]
    fn test_adults_never_flagged() {
        let mut ctx = empty_context("fam-1");
        ctx.members.push(member("fam-1", "Dana", MemberRole::Parent));
        assert!(child_development(&ctx, Utc::now()).unwrap().is_empty());
    }

    #[test]
    fn test_educational_opportunity_requires_children() {
        let mut ctx = empty_context("fam-1");
        assert!(educational_opportunity(&ctx, Utc::now()).unwrap().is_empty());

        ctx.members.push(member("fam-1", "Ada", MemberRole::Child));
        assert_eq!(educational_opportunity(&ctx, Utc::now()).unwrap().len(), 1);
    }

    #[test]
    fn test_learning_event_suppresses_suggestion() {
        let mut ctx = empty_context("fam-1");
        ctx.members.push(member("fam-1", "Ada", MemberRole::Child));
        let today = Utc::now().date_naive();
        ctx.events.push(event("fam-1", "Piano lesson", "lesson", today));
        assert!(educational_opportunity(&ctx, Utc::now()).unwrap().is_empty());
    }
}

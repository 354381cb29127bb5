//! Relationship enhancement and sibling dynamics suggestions.

use chrono::{DateTime, Utc};

use hearth_core::types::{ConfidenceLevel, InsightType, Severity, Suggestion, SuggestionType};

use crate::error::SuggestError;
use crate::snapshot::FamilyContext;

use super::new_suggestion;

/// Suggest a recurring shared evening when relationship health flags.
pub fn relationship_enhancement(
    ctx: &FamilyContext,
    now: DateTime<Utc>,
) -> Result<Vec<Suggestion>, SuggestError> {
    let flags = ctx.insights_of_type(InsightType::RelationshipHealth);
    if flags.is_empty() {
        return Ok(vec![]);
    }

    let entities: Vec<String> = flags
        .iter()
        .flat_map(|i| i.entities.iter().cloned())
        .collect();

    Ok(vec![new_suggestion(
        &ctx.family_id,
        SuggestionType::RelationshipEnhancement,
        "Make a recurring evening for the adults".to_string(),
        "Shared time for the guardians keeps slipping; a standing slot protects it.".to_string(),
        Severity::Medium,
        0.75,
        0.75,
        ConfidenceLevel::High,
        entities,
        vec![
            "Pick a recurring evening that usually stays free".to_string(),
            "Line up childcare for it".to_string(),
        ],
        now,
    )])
}

/// Turn sibling dynamics insights into joint-project suggestions.
pub fn sibling_dynamics(
    ctx: &FamilyContext,
    now: DateTime<Utc>,
) -> Result<Vec<Suggestion>, SuggestError> {
    let dynamics = ctx.insights_of_type(InsightType::SiblingDynamics);
    if dynamics.is_empty() {
        return Ok(vec![]);
    }

    let entities: Vec<String> = dynamics
        .iter()
        .flat_map(|i| i.entities.iter().cloned())
        .collect();

    Ok(vec![new_suggestion(
        &ctx.family_id,
        SuggestionType::SiblingDynamics,
        "Set up a sibling project".to_string(),
        "The siblings are teaching and learning from each other; a joint project builds on it."
            .to_string(),
        Severity::Low,
        0.7,
        0.7,
        ConfidenceLevel::High,
        entities,
        vec![
            "Let the kids pick a project together".to_string(),
            "Set aside a weekend block for it".to_string(),
        ],
        now,
    )])
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::generators::fixtures::{empty_context, insight};

    #[test]
    fn test_relationship_enhancement_follows_insight() {
        let mut ctx = empty_context("fam-1");
        assert!(relationship_enhancement(&ctx, Utc::now()).unwrap().is_empty());

        let mut health = insight(
            "fam-1",
            InsightType::RelationshipHealth,
            "No shared time for the adults lately",
        );
        health.entities = vec!["g-1".to_string(), "g-2".to_string()];
        ctx.recent_insights.push(health);

        let suggestions = relationship_enhancement(&ctx, Utc::now()).unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(
            suggestions[0].suggestion_type,
            SuggestionType::RelationshipEnhancement
        );
        assert_eq!(suggestions[0].entities.len(), 2);
        assert!(suggestions[0].actionable);
    }

    #[test]
    fn test_sibling_dynamics_follows_insight() {
        let mut ctx = empty_context("fam-1");
        assert!(sibling_dynamics(&ctx, Utc::now()).unwrap().is_empty());

        ctx.recent_insights.push(insight(
            "fam-1",
            InsightType::SiblingDynamics,
            "Ada is teaching Ben",
        ));

        let suggestions = sibling_dynamics(&ctx, Utc::now()).unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].title, "Set up a sibling project");
        assert!((suggestions[0].relevance_score - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn test_multiple_insights_one_suggestion() {
        let mut ctx = empty_context("fam-1");
        ctx.recent_insights.push(insight(
            "fam-1",
            InsightType::SiblingDynamics,
            "Ada is teaching Ben",
        ));
        ctx.recent_insights.push(insight(
            "fam-1",
            InsightType::SiblingDynamics,
            "Ada and Ben share interests",
        ));
        // Insights fold into one suggestion, not one each.
        assert_eq!(sibling_dynamics(&ctx, Utc::now()).unwrap().len(), 1);
    }
}

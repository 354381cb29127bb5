//! The ten suggestion generators.
//!
//! Each generator reads the shared family snapshot and returns zero or more
//! suggestions with a heuristic default relevance score and qualitative
//! confidence level. The engine may re-score them through the relevance
//! model afterwards.

pub mod development;
pub mod relationships;
pub mod scheduling;
pub mod tasks;
pub mod wellness;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use hearth_core::types::{
    ConfidenceLevel, Severity, Suggestion, SuggestionStatus, SuggestionType,
};

use crate::error::SuggestError;
use crate::snapshot::FamilyContext;

/// Signature every suggestion generator conforms to.
pub type SuggestionGeneratorFn =
    fn(&FamilyContext, DateTime<Utc>) -> Result<Vec<Suggestion>, SuggestError>;

/// All ten generators, in the order the engine runs them.
pub const GENERATORS: &[(&str, SuggestionGeneratorFn)] = &[
    ("task_optimization", tasks::task_optimization),
    ("workload_balance", tasks::workload_balance),
    ("relationship_enhancement", relationships::relationship_enhancement),
    ("child_development", development::child_development),
    ("family_activity", scheduling::family_activity),
    ("schedule_optimization", scheduling::schedule_optimization),
    ("health_wellness", wellness::health_wellness),
    ("educational_opportunity", development::educational_opportunity),
    ("financial_optimization", wellness::financial_optimization),
    ("sibling_dynamics", relationships::sibling_dynamics),
];

/// Suggestions expire this many days after generation.
pub(crate) const SUGGESTION_TTL_DAYS: i64 = 30;

/// Construct a suggestion with the standard defaults.
#[allow(clippy::too_many_arguments)]
pub(crate) fn new_suggestion(
    family_id: &str,
    suggestion_type: SuggestionType,
    title: String,
    description: String,
    severity: Severity,
    confidence: f32,
    relevance_score: f64,
    confidence_level: ConfidenceLevel,
    entities: Vec<String>,
    action_items: Vec<String>,
    now: DateTime<Utc>,
) -> Suggestion {
    Suggestion {
        id: Uuid::new_v4(),
        family_id: family_id.to_string(),
        suggestion_type,
        title,
        description,
        severity,
        entities,
        actionable: !action_items.is_empty(),
        action_items,
        confidence,
        relevance_score,
        confidence_level,
        generated_at: now,
        expires_at: now + Duration::days(SUGGESTION_TTL_DAYS),
        status: SuggestionStatus::Active,
        seen_by: vec![],
        feedback_count: 0,
        implemented_count: 0,
        implemented_by: vec![],
        dismissal_reason: None,
    }
}

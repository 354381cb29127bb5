//! Per-cycle family data snapshot.
//!
//! Built once per generation cycle and shared read-only across all the
//! suggestion generators.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use hearth_core::error::HearthError;
use hearth_core::types::{
    FamilyEvent, FamilyMember, FamilyTask, Insight, InsightType, SuggestionFeedback,
};
use hearth_storage::{Database, FamilyRepository, FeedbackRepository, InsightRepository};

/// Days of insight history included in the snapshot.
const INSIGHT_LOOKBACK_DAYS: i64 = 14;

/// Read-only family data shared by all suggestion generators in one cycle.
#[derive(Debug, Clone)]
pub struct FamilyContext {
    pub family_id: String,
    pub members: Vec<FamilyMember>,
    pub tasks: Vec<FamilyTask>,
    pub events: Vec<FamilyEvent>,
    pub recent_insights: Vec<Insight>,
    pub feedback_history: Vec<SuggestionFeedback>,
}

impl FamilyContext {
    /// Load the snapshot from storage.
    pub fn load(
        db: &Arc<Database>,
        family_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, HearthError> {
        let family = FamilyRepository::new(Arc::clone(db));
        let insights = InsightRepository::new(Arc::clone(db));
        let feedback = FeedbackRepository::new(Arc::clone(db));

        Ok(Self {
            family_id: family_id.to_string(),
            members: family.list_members(family_id)?,
            tasks: family.list_tasks(family_id)?,
            events: family.list_events(family_id)?,
            recent_insights: insights
                .list_since(family_id, now - Duration::days(INSIGHT_LOOKBACK_DAYS))?,
            feedback_history: feedback.list_for_family(family_id)?,
        })
    }

    /// Recent insights of a given type.
    pub fn insights_of_type(&self, insight_type: InsightType) -> Vec<&Insight> {
        self.recent_insights
            .iter()
            .filter(|i| i.insight_type == insight_type)
            .collect()
    }

    /// Average feedback rating across the family's history, if any.
    pub fn average_feedback_rating(&self) -> Option<f64> {
        if self.feedback_history.is_empty() {
            return None;
        }
        let sum: u32 = self.feedback_history.iter().map(|f| f.rating as u32).sum();
        Some(sum as f64 / self.feedback_history.len() as f64)
    }
}

//! Suggestion generation engine and lifecycle operations.
//!
//! One cycle: build the family snapshot, run all generators (failures
//! isolated per generator), re-score through the relevance model when it is
//! initialized (whole-batch neutral fallback otherwise), sort by relevance,
//! apply the 7-day (type, title) dedup window, and persist. Lifecycle
//! mutators record synthetic feedback and forward it to the model.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use hearth_core::config::SuggestionConfig;
use hearth_core::error::HearthError;
use hearth_core::types::{ConfidenceLevel, Suggestion, SuggestionFeedback};
use hearth_storage::{Database, FeedbackRepository, GraphService, SuggestionRepository};

use crate::generators::{SuggestionGeneratorFn, GENERATORS};
use crate::relevance::RelevanceModel;
use crate::snapshot::FamilyContext;

/// Rating recorded when a suggestion is implemented.
const IMPLEMENTED_RATING: u8 = 5;
/// Rating recorded when a suggestion is dismissed.
const DISMISSED_RATING: u8 = 1;

/// Suggestion engine over the document store and a pluggable relevance model.
pub struct SuggestionEngine {
    db: Arc<Database>,
    suggestions: SuggestionRepository,
    feedback: FeedbackRepository,
    graph: GraphService,
    model: Arc<dyn RelevanceModel>,
    config: SuggestionConfig,
}

impl SuggestionEngine {
    pub fn new(db: Arc<Database>, model: Arc<dyn RelevanceModel>, config: SuggestionConfig) -> Self {
        Self {
            suggestions: SuggestionRepository::new(Arc::clone(&db)),
            feedback: FeedbackRepository::new(Arc::clone(&db)),
            graph: GraphService::new(Arc::clone(&db)),
            db,
            model,
            config,
        }
    }

    /// Run one generation cycle for the family and persist the survivors,
    /// sorted by descending relevance.
    pub async fn generate(&self, family_id: &str) -> Result<Vec<Suggestion>, HearthError> {
        self.generate_with(family_id, GENERATORS).await
    }

    /// Like [`generate`](Self::generate) with an explicit generator table.
    pub async fn generate_with(
        &self,
        family_id: &str,
        generators: &[(&str, SuggestionGeneratorFn)],
    ) -> Result<Vec<Suggestion>, HearthError> {
        let now = Utc::now();
        let ctx = FamilyContext::load(&self.db, family_id, now)?;

        let mut produced: Vec<Suggestion> = Vec::new();
        for (name, generator) in generators {
            match generator(&ctx, now) {
                Ok(suggestions) => {
                    debug!("Generator {} produced {} suggestion(s)", name, suggestions.len());
                    produced.extend(suggestions);
                }
                Err(e) => {
                    warn!("Suggestion generator {} failed: {}", name, e);
                }
            }
        }

        self.enhance_relevance(&mut produced, &ctx).await;

        produced.sort_by(|a, b| {
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let window_start = now - Duration::days(self.config.dedup_window_days);
        let mut stored = Vec::new();
        for suggestion in produced {
            match self.suggestions.exists_recent(
                family_id,
                suggestion.suggestion_type,
                &suggestion.title,
                window_start,
            ) {
                Ok(true) => {
                    debug!(
                        "Skipping duplicate suggestion '{}' within the {}d window",
                        suggestion.title, self.config.dedup_window_days
                    );
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    warn!(
                        "Dedup check failed for '{}': {}; skipping",
                        suggestion.title, e
                    );
                    continue;
                }
            }

            if let Err(e) = self.suggestions.save(&suggestion) {
                warn!("Failed to save suggestion '{}': {}; skipping", suggestion.title, e);
                continue;
            }
            self.mirror_into_graph(&suggestion);
            stored.push(suggestion);
        }

        info!(
            "Suggestion cycle for {} stored {} suggestion(s)",
            family_id,
            stored.len()
        );
        Ok(stored)
    }

    /// Re-score the batch through the relevance model.
    ///
    /// When the model is uninitialized, or any prediction fails, every
    /// suggestion in the batch gets the neutral score instead; the batch
    /// itself never fails.
    async fn enhance_relevance(&self, suggestions: &mut [Suggestion], ctx: &FamilyContext) {
        if !self.model.is_initialized() {
            debug!("Relevance model not initialized; applying neutral fallback");
            apply_neutral_fallback(suggestions);
            return;
        }

        let mut failed = false;
        for suggestion in suggestions.iter_mut() {
            let features = self.model.generate_features(suggestion, ctx);
            match self.model.predict_relevance(&features).await {
                Ok(score) => {
                    suggestion.relevance_score = score.clamp(0.0, 1.0);
                    suggestion.confidence_level = level_for_score(suggestion.relevance_score);
                }
                Err(e) => {
                    warn!("Relevance scoring failed: {}; applying neutral fallback", e);
                    failed = true;
                    break;
                }
            }
        }
        if failed {
            apply_neutral_fallback(suggestions);
        }
    }

    /// Mirror a stored suggestion into the property graph, with edges to
    /// the entities it references. Failures are logged and skipped.
    fn mirror_into_graph(&self, suggestion: &Suggestion) {
        let properties = serde_json::json!({
            "type": suggestion.suggestion_type.as_str(),
            "severity": suggestion.severity.as_str(),
            "relevance_score": suggestion.relevance_score,
        });
        if let Err(e) = self.graph.upsert_node(
            &suggestion.family_id,
            "suggestion",
            &suggestion.id.to_string(),
            &suggestion.title,
            &properties,
        ) {
            warn!("Skipping graph mirror for suggestion {}: {}", suggestion.id, e);
            return;
        }
        for entity_id in &suggestion.entities {
            let edge_id = format!("{}-{}", suggestion.id, entity_id);
            if let Err(e) = self.graph.upsert_edge(
                &suggestion.family_id,
                "suggestion_about",
                &edge_id,
                ("suggestion", &suggestion.id.to_string()),
                ("entity", entity_id),
                &serde_json::json!({}),
            ) {
                warn!("Skipping suggestion edge {}: {}", edge_id, e);
            }
        }
    }

    /// Idempotent append to the suggestion's seen-by list.
    pub fn mark_seen(&self, suggestion_id: Uuid, user_id: &str) -> Result<(), HearthError> {
        self.suggestions.mark_seen(suggestion_id, user_id)
    }

    /// Move an active suggestion to implemented and record a synthetic
    /// 5-star feedback entry.
    pub async fn mark_implemented(
        &self,
        suggestion_id: Uuid,
        user_id: &str,
    ) -> Result<(), HearthError> {
        self.suggestions.mark_implemented(suggestion_id, user_id)?;
        self.record_feedback(
            suggestion_id,
            user_id,
            IMPLEMENTED_RATING,
            Some("implemented"),
        )
        .await
    }

    /// Move an active suggestion to dismissed with a reason and record a
    /// synthetic 1-star feedback entry.
    pub async fn dismiss(
        &self,
        suggestion_id: Uuid,
        user_id: &str,
        reason: &str,
    ) -> Result<(), HearthError> {
        self.suggestions.dismiss(suggestion_id, reason)?;
        self.record_feedback(suggestion_id, user_id, DISMISSED_RATING, Some(reason))
            .await
    }

    /// Append a feedback record, bump the suggestion counter, and forward
    /// to the model's feedback sink when initialized.
    pub async fn record_feedback(
        &self,
        suggestion_id: Uuid,
        user_id: &str,
        rating: u8,
        comment: Option<&str>,
    ) -> Result<(), HearthError> {
        let suggestion = self
            .suggestions
            .find_by_id(suggestion_id)?
            .ok_or_else(|| HearthError::NotFound(format!("suggestion {}", suggestion_id)))?;

        let feedback = SuggestionFeedback {
            id: Uuid::new_v4(),
            suggestion_id,
            family_id: suggestion.family_id.clone(),
            user_id: user_id.to_string(),
            rating,
            comment: comment.map(str::to_string),
            created_at: Utc::now(),
        };

        self.feedback.save(&feedback)?;
        self.suggestions.increment_feedback(suggestion_id)?;

        if self.model.is_initialized() {
            if let Err(e) = self.model.record_feedback(&feedback).await {
                warn!("Model feedback sink rejected record: {}", e);
            }
        }
        Ok(())
    }
}

fn apply_neutral_fallback(suggestions: &mut [Suggestion]) {
    for suggestion in suggestions.iter_mut() {
        suggestion.relevance_score = 0.5;
        suggestion.confidence_level = ConfidenceLevel::Medium;
    }
}

fn level_for_score(score: f64) -> ConfidenceLevel {
    if score >= 0.8 {
        ConfidenceLevel::VeryHigh
    } else if score >= 0.65 {
        ConfidenceLevel::High
    } else if score >= 0.45 {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::DateTime;

    use hearth_core::types::{Severity, SuggestionStatus, SuggestionType};

    use crate::error::SuggestError;
    use crate::generators::new_suggestion;
    use crate::relevance::{
        HeuristicRelevanceModel, NullRelevanceModel, RelevanceFeatures,
    };

    fn fixed_suggestion(
        ctx: &FamilyContext,
        now: DateTime<Utc>,
    ) -> Result<Vec<Suggestion>, SuggestError> {
        Ok(vec![new_suggestion(
            &ctx.family_id,
            SuggestionType::FamilyActivity,
            "Fixed suggestion".to_string(),
            "Always produced".to_string(),
            Severity::Low,
            0.7,
            0.65,
            ConfidenceLevel::High,
            vec![],
            vec!["Do it".to_string()],
            now,
        )])
    }

    fn failing_generator(
        _ctx: &FamilyContext,
        _now: DateTime<Utc>,
    ) -> Result<Vec<Suggestion>, SuggestError> {
        Err(SuggestError::Generator("intentional failure".to_string()))
    }

    fn engine_with(model: Arc<dyn RelevanceModel>) -> (Arc<Database>, SuggestionEngine) {
        let db = Arc::new(Database::in_memory().unwrap());
        let engine = SuggestionEngine::new(Arc::clone(&db), model, SuggestionConfig::default());
        (db, engine)
    }

    #[tokio::test]
    async fn test_uninitialized_model_neutral_fallback() {
        let (_db, engine) = engine_with(Arc::new(NullRelevanceModel));
        let table: &[(&str, SuggestionGeneratorFn)] = &[("fixed", fixed_suggestion)];

        let stored = engine.generate_with("fam-1", table).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert!((stored[0].relevance_score - 0.5).abs() < f64::EPSILON);
        assert_eq!(stored[0].confidence_level, ConfidenceLevel::Medium);
    }

    #[tokio::test]
    async fn test_initialized_model_rescores() {
        let (_db, engine) = engine_with(Arc::new(HeuristicRelevanceModel::new()));
        let table: &[(&str, SuggestionGeneratorFn)] = &[("fixed", fixed_suggestion)];

        let stored = engine.generate_with("fam-1", table).await.unwrap();
        assert_eq!(stored.len(), 1);
        // The heuristic model produced a real score, not the neutral 0.5.
        assert!((stored[0].relevance_score - 0.5).abs() > 1e-9);
    }

    #[tokio::test]
    async fn test_scoring_failure_falls_back_whole_batch() {
        struct FailingModel;

        #[async_trait]
        impl RelevanceModel for FailingModel {
            fn is_initialized(&self) -> bool {
                true
            }
            fn generate_features(
                &self,
                suggestion: &Suggestion,
                _ctx: &FamilyContext,
            ) -> RelevanceFeatures {
                RelevanceFeatures {
                    base_relevance: suggestion.relevance_score,
                    severity_weight: 0.0,
                    actionable: suggestion.actionable,
                    action_item_count: suggestion.action_items.len(),
                    feedback_affinity: 0.5,
                    feedback_volume: 0.0,
                }
            }
            async fn predict_relevance(
                &self,
                _features: &RelevanceFeatures,
            ) -> Result<f64, SuggestError> {
                Err(SuggestError::ModelUnavailable("scorer crashed".to_string()))
            }
            async fn record_feedback(
                &self,
                _feedback: &SuggestionFeedback,
            ) -> Result<(), SuggestError> {
                Ok(())
            }
            fn model_version(&self) -> u32 {
                1
            }
        }

        let (_db, engine) = engine_with(Arc::new(FailingModel));
        let table: &[(&str, SuggestionGeneratorFn)] = &[("fixed", fixed_suggestion)];

        let stored = engine.generate_with("fam-1", table).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert!((stored[0].relevance_score - 0.5).abs() < f64::EPSILON);
        assert_eq!(stored[0].confidence_level, ConfidenceLevel::Medium);
    }

    #[tokio::test]
    async fn test_failing_generator_isolated() {
        let (_db, engine) = engine_with(Arc::new(HeuristicRelevanceModel::new()));
        let table: &[(&str, SuggestionGeneratorFn)] = &[
            ("broken", failing_generator),
            ("fixed", fixed_suggestion),
        ];
        let stored = engine.generate_with("fam-1", table).await.unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn test_dedup_window_blocks_repeat() {
        let (_db, engine) = engine_with(Arc::new(HeuristicRelevanceModel::new()));
        let table: &[(&str, SuggestionGeneratorFn)] = &[("fixed", fixed_suggestion)];

        assert_eq!(engine.generate_with("fam-1", table).await.unwrap().len(), 1);
        assert!(engine.generate_with("fam-1", table).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mark_implemented_records_five_star_feedback() {
        let (db, engine) = engine_with(Arc::new(HeuristicRelevanceModel::new()));
        let table: &[(&str, SuggestionGeneratorFn)] = &[("fixed", fixed_suggestion)];
        let stored = engine.generate_with("fam-1", table).await.unwrap();
        let id = stored[0].id;

        engine.mark_implemented(id, "user-1").await.unwrap();

        let suggestions = SuggestionRepository::new(Arc::clone(&db));
        let found = suggestions.find_by_id(id).unwrap().unwrap();
        assert_eq!(found.status, SuggestionStatus::Implemented);
        assert_eq!(found.feedback_count, 1);

        let feedback = FeedbackRepository::new(db);
        let records = feedback.list_for_family("fam-1").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].rating, 5);
    }

    #[tokio::test]
    async fn test_dismiss_records_one_star_feedback() {
        let (db, engine) = engine_with(Arc::new(HeuristicRelevanceModel::new()));
        let table: &[(&str, SuggestionGeneratorFn)] = &[("fixed", fixed_suggestion)];
        let stored = engine.generate_with("fam-1", table).await.unwrap();
        let id = stored[0].id;

        engine.dismiss(id, "user-1", "not for us").await.unwrap();

        let suggestions = SuggestionRepository::new(Arc::clone(&db));
        let found = suggestions.find_by_id(id).unwrap().unwrap();
        assert_eq!(found.status, SuggestionStatus::Dismissed);
        assert_eq!(found.dismissal_reason.as_deref(), Some("not for us"));

        let feedback = FeedbackRepository::new(db);
        let records = feedback.list_for_family("fam-1").unwrap();
        assert_eq!(records[0].rating, 1);
    }

    #[tokio::test]
    async fn test_feedback_forwarded_to_model() {
        let model = Arc::new(HeuristicRelevanceModel::new());
        let (_db, engine) = engine_with(Arc::clone(&model) as Arc<dyn RelevanceModel>);
        let table: &[(&str, SuggestionGeneratorFn)] = &[("fixed", fixed_suggestion)];
        let stored = engine.generate_with("fam-1", table).await.unwrap();

        engine
            .record_feedback(stored[0].id, "user-1", 4, Some("nice"))
            .await
            .unwrap();
        assert_eq!(model.pending_feedback_count(), 1);
    }

    #[tokio::test]
    async fn test_mark_seen_idempotent() {
        let (db, engine) = engine_with(Arc::new(HeuristicRelevanceModel::new()));
        let table: &[(&str, SuggestionGeneratorFn)] = &[("fixed", fixed_suggestion)];
        let stored = engine.generate_with("fam-1", table).await.unwrap();
        let id = stored[0].id;

        engine.mark_seen(id, "user-1").unwrap();
        engine.mark_seen(id, "user-1").unwrap();

        let suggestions = SuggestionRepository::new(db);
        let found = suggestions.find_by_id(id).unwrap().unwrap();
        assert_eq!(found.seen_by, vec!["user-1".to_string()]);
    }

    #[test]
    fn test_level_for_score_bands() {
        assert_eq!(level_for_score(0.9), ConfidenceLevel::VeryHigh);
        assert_eq!(level_for_score(0.7), ConfidenceLevel::High);
        assert_eq!(level_for_score(0.5), ConfidenceLevel::Medium);
        assert_eq!(level_for_score(0.2), ConfidenceLevel::Low);
    }
}

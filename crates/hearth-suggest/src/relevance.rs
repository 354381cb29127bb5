//! Pluggable relevance scoring for suggestions.
//!
//! The model is a capability interface: callers never special-case "no
//! model" logic outside this boundary. The default heuristic implementation
//! satisfies the interface with no external model and reproduces the
//! retrain contract: once 50 feedback records have queued, the version
//! bumps and the queue clears (retraining itself is a placeholder).

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use hearth_core::types::{Severity, Suggestion, SuggestionFeedback};

use crate::error::SuggestError;
use crate::snapshot::FamilyContext;

/// Feedback records that queue before a retrain (version bump).
pub const RETRAIN_THRESHOLD: usize = 50;

/// Feature vector extracted from a suggestion and its family context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelevanceFeatures {
    /// The generator's heuristic default score.
    pub base_relevance: f64,
    /// Severity mapped to [0, 1].
    pub severity_weight: f64,
    /// Whether the suggestion carries action items.
    pub actionable: bool,
    /// Number of action items.
    pub action_item_count: usize,
    /// Average family feedback rating normalized to [0, 1], 0.5 when none.
    pub feedback_affinity: f64,
    /// Feedback volume normalized to [0, 1].
    pub feedback_volume: f64,
}

/// Pluggable relevance scorer.
#[async_trait]
pub trait RelevanceModel: Send + Sync {
    /// Whether the model is ready to score. When false the engine applies
    /// the neutral fallback to the whole batch.
    fn is_initialized(&self) -> bool;

    /// Extract scoring features from a suggestion and the family snapshot.
    fn generate_features(&self, suggestion: &Suggestion, ctx: &FamilyContext)
        -> RelevanceFeatures;

    /// Predict a relevance score in [0, 1].
    async fn predict_relevance(&self, features: &RelevanceFeatures) -> Result<f64, SuggestError>;

    /// Feed a feedback record into the model's training queue.
    async fn record_feedback(&self, feedback: &SuggestionFeedback) -> Result<(), SuggestError>;

    /// Current model version; bumps on retrain.
    fn model_version(&self) -> u32;
}

/// Default heuristic model: deterministic weighted scoring, feedback
/// accumulation, and the 50-record retrain/version-bump contract.
pub struct HeuristicRelevanceModel {
    version: AtomicU32,
    pending_feedback: Mutex<Vec<u8>>,
    retrain_threshold: usize,
}

impl HeuristicRelevanceModel {
    pub fn new() -> Self {
        Self::with_threshold(RETRAIN_THRESHOLD)
    }

    pub fn with_threshold(retrain_threshold: usize) -> Self {
        Self {
            version: AtomicU32::new(1),
            pending_feedback: Mutex::new(Vec::new()),
            retrain_threshold,
        }
    }

    /// Number of feedback records currently queued for the next retrain.
    pub fn pending_feedback_count(&self) -> usize {
        self.pending_feedback.lock().map(|p| p.len()).unwrap_or(0)
    }
}

impl Default for HeuristicRelevanceModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RelevanceModel for HeuristicRelevanceModel {
    fn is_initialized(&self) -> bool {
        true
    }

    fn generate_features(
        &self,
        suggestion: &Suggestion,
        ctx: &FamilyContext,
    ) -> RelevanceFeatures {
        let severity_weight = match suggestion.severity {
            Severity::High => 1.0,
            Severity::Medium => 0.6,
            Severity::Low => 0.3,
        };
        let feedback_affinity = ctx
            .average_feedback_rating()
            .map(|avg| (avg - 1.0) / 4.0)
            .unwrap_or(0.5);
        let feedback_volume = (ctx.feedback_history.len() as f64 / 20.0).min(1.0);

        RelevanceFeatures {
            base_relevance: suggestion.relevance_score,
            severity_weight,
            actionable: suggestion.actionable,
            action_item_count: suggestion.action_items.len(),
            feedback_affinity,
            feedback_volume,
        }
    }

    async fn predict_relevance(&self, features: &RelevanceFeatures) -> Result<f64, SuggestError> {
        let actionable = if features.actionable { 1.0 } else { 0.0 };
        let score = 0.4 * features.base_relevance
            + 0.2 * features.severity_weight
            + 0.25 * features.feedback_affinity
            + 0.1 * actionable
            + 0.05 * features.feedback_volume;
        Ok(score.clamp(0.0, 1.0))
    }

    async fn record_feedback(&self, feedback: &SuggestionFeedback) -> Result<(), SuggestError> {
        if !(1..=5).contains(&feedback.rating) {
            return Err(SuggestError::InvalidFeedback(format!(
                "rating {} out of range",
                feedback.rating
            )));
        }
        let mut pending = self
            .pending_feedback
            .lock()
            .map_err(|e| SuggestError::Storage(format!("feedback queue poisoned: {}", e)))?;
        pending.push(feedback.rating);

        if pending.len() >= self.retrain_threshold {
            // Retraining is a placeholder; the threshold and version bump
            // are the contract.
            pending.clear();
            let new_version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
            info!("Relevance model retrained; now at version {}", new_version);
        }
        Ok(())
    }

    fn model_version(&self) -> u32 {
        self.version.load(Ordering::SeqCst)
    }
}

/// A model that reports itself uninitialized; used to exercise the
/// engine's neutral fallback path.
pub struct NullRelevanceModel;

#[async_trait]
impl RelevanceModel for NullRelevanceModel {
    fn is_initialized(&self) -> bool {
        false
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

    async fn predict_relevance(&self, _features: &RelevanceFeatures) -> Result<f64, SuggestError> {
        Err(SuggestError::ModelUnavailable(
            "null model cannot score".to_string(),
        ))
    }

    async fn record_feedback(&self, _feedback: &SuggestionFeedback) -> Result<(), SuggestError> {
        Ok(())
    }

    fn model_version(&self) -> u32 {
        0
    }
}

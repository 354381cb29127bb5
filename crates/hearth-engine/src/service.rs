//! The Hearth service facade.
//!
//! The entry points consuming surfaces call: graph extraction and merge,
//! similarity detection and duplicate bookkeeping, insight and suggestion
//! generation, and the lifecycle mutators. Every method returns the uniform
//! [`ApiResponse`] envelope.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use hearth_core::config::HearthConfig;
use hearth_core::error::HearthError;
use hearth_core::types::{Document, Insight, Suggestion};
use hearth_extract::{ExtractionOutcome, ExtractionResult, GraphExtractor, GraphMerger};
use hearth_insight::InsightOrchestrator;
use hearth_similarity::{DuplicateMarker, SimilarDocument, SimilarityDetector};
use hearth_storage::{Database, DocumentRepository, InsightRepository};
use hearth_suggest::{HeuristicRelevanceModel, RelevanceModel, SuggestionEngine};

use crate::api::ApiResponse;

/// Facade over the extraction, similarity, insight, and suggestion
/// components.
pub struct HearthService {
    documents: DocumentRepository,
    insights: InsightRepository,
    extractor: GraphExtractor,
    merger: GraphMerger,
    detector: SimilarityDetector,
    duplicates: DuplicateMarker,
    insight_orchestrator: InsightOrchestrator,
    suggestion_engine: SuggestionEngine,
    /// Per-family generation locks: cycles for one family are serialized so
    /// the check-then-insert dedup windows stay meaningful in-process.
    family_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl HearthService {
    pub fn new(db: Arc<Database>, config: HearthConfig, model: Arc<dyn RelevanceModel>) -> Self {
        Self {
            documents: DocumentRepository::new(Arc::clone(&db)),
            insights: InsightRepository::new(Arc::clone(&db)),
            extractor: GraphExtractor::new(Arc::clone(&db)),
            merger: GraphMerger::new(Arc::clone(&db)),
            detector: SimilarityDetector::new(Arc::clone(&db), config.similarity.clone()),
            duplicates: DuplicateMarker::new(Arc::clone(&db)),
            insight_orchestrator: InsightOrchestrator::new(
                Arc::clone(&db),
                config.insight.clone(),
            ),
            suggestion_engine: SuggestionEngine::new(db, model, config.suggestion.clone()),
            family_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Construct with the built-in heuristic relevance model, using the
    /// configured retrain threshold.
    pub fn with_default_model(db: Arc<Database>, config: HearthConfig) -> Self {
        let model = Arc::new(HeuristicRelevanceModel::with_threshold(
            config.suggestion.retrain_threshold,
        ));
        Self::new(db, config, model)
    }

    async fn family_lock(&self, family_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.family_locks.lock().await;
        Arc::clone(
            locks
                .entry(family_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }

    fn load_document(&self, document_id: Uuid) -> Result<Document, HearthError> {
        self.documents
            .find_by_id(document_id)?
            .ok_or_else(|| HearthError::NotFound(format!("document {}", document_id)))
    }

    // ── Extraction ──────────────────────────────────────────────────

    /// Extract and persist a knowledge graph for a stored document.
    pub fn extract_knowledge_graph(
        &self,
        document_id: Uuid,
        result: &ExtractionResult,
    ) -> ApiResponse<ExtractionOutcome> {
        ApiResponse::from_result(
            self.load_document(document_id)
                .and_then(|doc| self.extractor.extract(&doc, result)),
        )
    }

    /// Merge the graphs of several documents into one.
    pub fn merge_graphs(
        &self,
        family_id: &str,
        document_ids: &[Uuid],
    ) -> ApiResponse<ExtractionOutcome> {
        ApiResponse::from_result(self.merger.merge(family_id, document_ids))
    }

    // ── Similarity ──────────────────────────────────────────────────

    /// Find prior documents similar to the given one.
    pub fn detect_similar_documents(
        &self,
        document_id: Uuid,
        text: Option<&str>,
    ) -> ApiResponse<Vec<SimilarDocument>> {
        ApiResponse::from_result(
            self.load_document(document_id)
                .and_then(|doc| self.detector.detect_similar(&doc, text)),
        )
    }

    /// Mark a document as a duplicate of another.
    pub fn mark_duplicate(&self, duplicate_id: Uuid, original_id: Uuid) -> ApiResponse<()> {
        ApiResponse::from_result(self.duplicates.mark(duplicate_id, original_id))
    }

    /// Reverse a duplicate marking.
    pub fn unmark_duplicate(&self, duplicate_id: Uuid, original_id: Uuid) -> ApiResponse<()> {
        ApiResponse::from_result(self.duplicates.unmark(duplicate_id, original_id))
    }

    // ── Generation ──────────────────────────────────────────────────

    /// Run one insight generation cycle for the family.
    pub async fn generate_insights(&self, family_id: &str) -> ApiResponse<Vec<Insight>> {
        let lock = self.family_lock(family_id).await;
        let _guard = lock.lock().await;
        ApiResponse::from_result(self.insight_orchestrator.generate(family_id))
    }

    /// Run one suggestion generation cycle for the family.
    pub async fn generate_suggestions(&self, family_id: &str) -> ApiResponse<Vec<Suggestion>> {
        let lock = self.family_lock(family_id).await;
        let _guard = lock.lock().await;
        ApiResponse::from_result(self.suggestion_engine.generate(family_id).await)
    }

    // ── Insight lifecycle ───────────────────────────────────────────

    pub fn mark_insight_seen(&self, insight_id: Uuid, user_id: &str) -> ApiResponse<()> {
        ApiResponse::from_result(self.insights.mark_seen(insight_id, user_id))
    }

    pub fn dismiss_insight(&self, insight_id: Uuid) -> ApiResponse<()> {
        ApiResponse::from_result(self.insights.dismiss(insight_id))
    }

    pub fn complete_insight_action(
        &self,
        insight_id: Uuid,
        action_index: usize,
        user_id: &str,
    ) -> ApiResponse<()> {
        ApiResponse::from_result(self.insights.complete_action(insight_id, action_index, user_id))
    }

    // ── Suggestion lifecycle ────────────────────────────────────────

    pub fn mark_suggestion_seen(&self, suggestion_id: Uuid, user_id: &str) -> ApiResponse<()> {
        ApiResponse::from_result(self.suggestion_engine.mark_seen(suggestion_id, user_id))
    }

    pub async fn mark_implemented(&self, suggestion_id: Uuid, user_id: &str) -> ApiResponse<()> {
        ApiResponse::from_result(
            self.suggestion_engine
                .mark_implemented(suggestion_id, user_id)
                .await,
        )
    }

    pub async fn dismiss_suggestion(
        &self,
        suggestion_id: Uuid,
        user_id: &str,
        reason: &str,
    ) -> ApiResponse<()> {
        ApiResponse::from_result(
            self.suggestion_engine
                .dismiss(suggestion_id, user_id, reason)
                .await,
        )
    }

    pub async fn record_feedback(
        &self,
        suggestion_id: Uuid,
        user_id: &str,
        rating: u8,
        comment: Option<&str>,
    ) -> ApiResponse<()> {
        ApiResponse::from_result(
            self.suggestion_engine
                .record_feedback(suggestion_id, user_id, rating, comment)
                .await,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use hearth_core::types::DocumentType;
    use hearth_suggest::HeuristicRelevanceModel;

    fn make_doc(family: &str, title: &str, doc_type: DocumentType, content: &str) -> Document {
        Document {
            id: Uuid::new_v4(),
            family_id: family.to_string(),
            title: title.to_string(),
            doc_type,
            category: None,
            source: None,
            author: None,
            file_type: None,
            language: None,
            tags: vec![],
            content: if content.is_empty() {
                None
            } else {
                Some(content.to_string())
            },
            doc_date: None,
            has_graph: false,
            graph_id: None,
            is_duplicate: false,
            original_document_id: None,
            duplicate_ids: vec![],
            created_at: Utc::now(),
        }
    }

    fn setup() -> (Arc<Database>, HearthService) {
        let db = Arc::new(Database::in_memory().unwrap());
        let service = HearthService::new(
            Arc::clone(&db),
            HearthConfig::default(),
            Arc::new(HeuristicRelevanceModel::new()),
        );
        (db, service)
    }

    #[tokio::test]
    async fn test_extract_envelope_success() {
        let (db, service) = setup();
        let docs = DocumentRepository::new(db);
        let doc = make_doc("fam-1", "Visit", DocumentType::Medical, "");
        docs.save(&doc).unwrap();

        let result = ExtractionResult {
            patient_name: Some("Sam".to_string()),
            provider_name: Some("Dr. Lee".to_string()),
            diagnosis: Some("flu".to_string()),
            ..Default::default()
        };
        let response = service.extract_knowledge_graph(doc.id, &result);
        assert!(response.success);
        let outcome = response.data.unwrap();
        assert_eq!(outcome.entity_count, 3);
        assert_eq!(outcome.relationship_count, 2);
    }

    #[tokio::test]
    async fn test_missing_document_yields_error_envelope() {
        let (_db, service) = setup();
        let response =
            service.extract_knowledge_graph(Uuid::new_v4(), &ExtractionResult::default());
        assert!(!response.success);
        assert!(response.error.unwrap().contains("Not found"));
    }

    #[tokio::test]
    async fn test_insufficient_payload_is_soft_failure_envelope() {
        let (db, service) = setup();
        let docs = DocumentRepository::new(db);
        let doc = make_doc("fam-1", "Empty", DocumentType::Medical, "");
        docs.save(&doc).unwrap();

        // The envelope succeeds; the outcome inside reports the soft failure.
        let response = service.extract_knowledge_graph(doc.id, &ExtractionResult::default());
        assert!(response.success);
        let outcome = response.data.unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.entity_count, 0);
    }

    #[tokio::test]
    async fn test_detect_similar_and_duplicate_flow() {
        let (db, service) = setup();
        let docs = DocumentRepository::new(Arc::clone(&db));
        let body = "Grades for the fall semester. Math: A. Reading: B+.";
        let prior = make_doc("fam-1", "Report Card Fall 2023", DocumentType::School, body);
        let target = make_doc("fam-1", "Report Card Fall 2024", DocumentType::School, body);
        docs.save(&prior).unwrap();
        docs.save(&target).unwrap();

        let response = service.detect_similar_documents(target.id, None);
        assert!(response.success);
        let similar = response.data.unwrap();
        assert_eq!(similar.len(), 1);

        let response = service.mark_duplicate(target.id, prior.id);
        assert!(response.success);
        let marked = docs.find_by_id(target.id).unwrap().unwrap();
        assert!(marked.is_duplicate);

        let response = service.unmark_duplicate(target.id, prior.id);
        assert!(response.success);
        let unmarked = docs.find_by_id(target.id).unwrap().unwrap();
        assert!(!unmarked.is_duplicate);
    }

    #[tokio::test]
    async fn test_generation_and_lifecycle_flow() {
        let (_db, service) = setup();

        let response = service.generate_suggestions("fam-1").await;
        assert!(response.success);
        let suggestions = response.data.unwrap();
        // Empty family still yields the always-on nudges.
        assert!(!suggestions.is_empty());

        // Sorted descending by relevance.
        for pair in suggestions.windows(2) {
            assert!(pair[0].relevance_score >= pair[1].relevance_score);
        }

        let id = suggestions[0].id;
        assert!(service.mark_suggestion_seen(id, "user-1").success);
        assert!(service.record_feedback(id, "user-1", 4, None).await.success);
        assert!(service.mark_implemented(id, "user-1").await.success);

        // Terminal state: dismissing an implemented suggestion fails softly.
        let response = service.dismiss_suggestion(id, "user-1", "late").await;
        assert!(!response.success);
    }

    #[tokio::test]
    async fn test_merge_graphs_envelope() {
        let (db, service) = setup();
        let docs = DocumentRepository::new(db);
        let doc = make_doc("fam-1", "Visit", DocumentType::Medical, "");
        docs.save(&doc).unwrap();

        let result = ExtractionResult {
            patient_name: Some("Sam".to_string()),
            ..Default::default()
        };
        service.extract_knowledge_graph(doc.id, &result);

        let response = service.merge_graphs("fam-1", &[doc.id]);
        assert!(response.success);
        assert!(response.data.unwrap().success);

        // No graphs at all: the outcome inside reports the explicit failure.
        let response = service.merge_graphs("fam-1", &[Uuid::new_v4()]);
        assert!(response.success);
        let outcome = response.data.unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("no graphs found"));
    }
}

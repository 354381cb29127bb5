//! Similarity detector: candidate retrieval, multi-factor scoring, and the
//! report threshold.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use hearth_core::config::SimilarityConfig;
use hearth_core::error::HearthError;
use hearth_core::types::Document;
use hearth_storage::{Database, DocumentRepository};

use crate::metrics::{cosine_similarity, jaccard_similarity, metadata_similarity};
use crate::tokenize::{significant_title_words, term_frequency, tokenize};

/// A candidate document scored against the target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarDocument {
    pub document_id: Uuid,
    pub title: String,
    pub combined_score: f64,
    pub title_score: f64,
    pub metadata_score: f64,
    pub content_score: f64,
}

/// Multi-factor similarity detector over the document store.
pub struct SimilarityDetector {
    documents: DocumentRepository,
    config: SimilarityConfig,
}

impl SimilarityDetector {
    pub fn new(db: Arc<Database>, config: SimilarityConfig) -> Self {
        Self {
            documents: DocumentRepository::new(db),
            config,
        }
    }

    /// Find prior documents similar to the target.
    ///
    /// `text` overrides the stored content for the target when the caller
    /// already has the extracted text in hand. Candidates are documents of
    /// the same type plus documents sharing significant title words; self is
    /// always excluded. Only candidates whose combined score strictly
    /// exceeds the threshold are reported, sorted descending.
    pub fn detect_similar(
        &self,
        document: &Document,
        text: Option<&str>,
    ) -> Result<Vec<SimilarDocument>, HearthError> {
        let candidates = self.gather_candidates(document)?;
        debug!(
            "Scoring {} candidates against document {}",
            candidates.len(),
            document.id
        );

        let target_text = text
            .map(str::to_string)
            .or_else(|| document.content.clone())
            .unwrap_or_default();
        let target_tf = term_frequency(&target_text);
        let target_title: HashSet<String> = tokenize(&document.title).into_iter().collect();

        let mut results = Vec::new();
        for candidate in candidates {
            let title_set: HashSet<String> = tokenize(&candidate.title).into_iter().collect();
            let title_score = jaccard_similarity(&target_title, &title_set);

            let metadata_score = metadata_similarity(document, &candidate);

            let candidate_tf = term_frequency(candidate.content.as_deref().unwrap_or_default());
            let content_score = cosine_similarity(&target_tf, &candidate_tf);

            let combined_score = self.config.title_weight * title_score
                + self.config.metadata_weight * metadata_score
                + self.config.content_weight * content_score;

            if !self.passes_threshold(combined_score) {
                continue;
            }

            results.push(SimilarDocument {
                document_id: candidate.id,
                title: candidate.title,
                combined_score,
                title_score,
                metadata_score,
                content_score,
            });
        }

        results.sort_by(|a, b| {
            b.combined_score
                .partial_cmp(&a.combined_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(results)
    }

    /// A candidate is reported only when its combined score strictly
    /// exceeds the threshold: exactly at the threshold is excluded.
    pub fn passes_threshold(&self, combined_score: f64) -> bool {
        combined_score > self.config.threshold
    }

    /// Same-type documents plus title-word matches, deduplicated, self
    /// excluded.
    fn gather_candidates(&self, document: &Document) -> Result<Vec<Document>, HearthError> {
        let mut candidates = Vec::new();
        let mut seen: HashSet<Uuid> = HashSet::new();
        seen.insert(document.id);

        for doc in self
            .documents
            .find_by_type(&document.family_id, document.doc_type)?
        {
            if seen.insert(doc.id) {
                candidates.push(doc);
            }
        }

        let words = significant_title_words(&document.title);
        if !words.is_empty() {
            for doc in self
                .documents
                .find_by_title_words(&document.family_id, &words)?
            {
                if seen.insert(doc.id) {
                    candidates.push(doc);
                }
            }
        }

        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use hearth_core::types::DocumentType;

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

    fn setup() -> (Arc<Database>, DocumentRepository, SimilarityDetector) {
        let db = Arc::new(Database::in_memory().unwrap());
        let repo = DocumentRepository::new(Arc::clone(&db));
        let detector = SimilarityDetector::new(Arc::clone(&db), SimilarityConfig::default());
        (db, repo, detector)
    }

    #[test]
    fn test_report_card_duplicates_flagged() {
        let (_db, repo, detector) = setup();
        let body = "Grades for the fall semester. Math: A. Reading: B+. Science: A-. \
                    Teacher comments: consistent effort across all subjects this term.";

        let prior = make_doc("fam-1", "Report Card Fall 2023", DocumentType::School, body);
        repo.save(&prior).unwrap();

        let target = make_doc("fam-1", "Report Card Fall 2024", DocumentType::School, body);
        repo.save(&target).unwrap();

        let results = detector.detect_similar(&target, None).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document_id, prior.id);
        assert!(
            results[0].combined_score > 0.5,
            "combined score {} should exceed 0.5",
            results[0].combined_score
        );
    }

    #[test]
    fn test_self_is_always_excluded() {
        let (_db, repo, detector) = setup();
        let target = make_doc("fam-1", "Unique Title", DocumentType::School, "content");
        repo.save(&target).unwrap();

        let results = detector.detect_similar(&target, None).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_threshold_boundary_strict() {
        let (_db, _repo, detector) = setup();
        assert!(!detector.passes_threshold(0.5));
        assert!(detector.passes_threshold(0.5001));
        assert!(!detector.passes_threshold(0.4999));
    }

    #[test]
    fn test_dissimilar_documents_not_reported() {
        let (_db, repo, detector) = setup();
        let prior = make_doc(
            "fam-1",
            "Dentist Appointment Reminder",
            DocumentType::Medical,
            "Cleaning scheduled for next month at the downtown office.",
        );
        repo.save(&prior).unwrap();

        let target = make_doc(
            "fam-1",
            "Soccer Season Registration",
            DocumentType::Activity,
            "Sign up for the spring soccer league before the deadline.",
        );
        repo.save(&target).unwrap();

        let results = detector.detect_similar(&target, None).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_title_word_candidates_cross_type() {
        let (_db, repo, detector) = setup();
        let body = "Annual physical exam summary with growth measurements and vision check.";

        // Same title words, different document type: still a candidate via
        // the title index, and similar enough to be reported.
        let prior = make_doc("fam-1", "Physical Exam Summary 2025", DocumentType::Generic, body);
        repo.save(&prior).unwrap();

        let target = make_doc("fam-1", "Physical Exam Summary 2026", DocumentType::Medical, body);
        repo.save(&target).unwrap();

        let results = detector.detect_similar(&target, None).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document_id, prior.id);
    }

    #[test]
    fn test_results_sorted_descending() {
        let (_db, repo, detector) = setup();
        let body = "Weekly newsletter with lunch menu, homework reminders, and field trip forms.";

        let near = make_doc("fam-1", "School Newsletter Week 12", DocumentType::School, body);
        repo.save(&near).unwrap();

        let far = make_doc(
            "fam-1",
            "School Newsletter Week 3",
            DocumentType::School,
            "Weekly newsletter with lunch menu and a note about picture day retakes.",
        );
        repo.save(&far).unwrap();

        let target = make_doc("fam-1", "School Newsletter Week 13", DocumentType::School, body);
        repo.save(&target).unwrap();

        let results = detector.detect_similar(&target, None).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].combined_score >= results[1].combined_score);
        assert_eq!(results[0].document_id, near.id);
    }

    #[test]
    fn test_text_override_beats_stored_content() {
        let (_db, repo, detector) = setup();
        let body = "Permission slip for the museum field trip, due Friday with payment.";

        let prior = make_doc("fam-1", "Field Trip Permission Slip", DocumentType::School, body);
        repo.save(&prior).unwrap();

        // Stored content is empty; the caller provides extracted text.
        let target = make_doc("fam-1", "Field Trip Permission Slip", DocumentType::School, "");
        repo.save(&target).unwrap();

        let results = detector.detect_similar(&target, Some(body)).unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].content_score > 0.9);
    }
}

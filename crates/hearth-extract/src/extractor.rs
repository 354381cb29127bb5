//! Document-to-graph extraction pipeline.
//!
//! Orchestrates entity mapping, the contact pattern pass, relationship
//! building, graph persistence, and the document back-reference side effect.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use hearth_core::error::HearthError;
use hearth_core::types::{Document, DocumentType, KnowledgeGraph};
use hearth_storage::{Database, DocumentRepository, GraphRepository, GraphService};

use crate::entities::extract_entities;
use crate::patterns::ContactExtractor;
use crate::relations::build_relationships;
use crate::types::{ExtractionOutcome, ExtractionResult};

/// Extracts a knowledge graph from one processed document.
pub struct GraphExtractor {
    documents: DocumentRepository,
    graphs: GraphRepository,
    graph_service: GraphService,
    contacts: ContactExtractor,
}

impl GraphExtractor {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            documents: DocumentRepository::new(Arc::clone(&db)),
            graphs: GraphRepository::new(Arc::clone(&db)),
            graph_service: GraphService::new(db),
            contacts: ContactExtractor::new(),
        }
    }

    /// Extract and persist a knowledge graph for the document.
    ///
    /// Fails soft: a result bundle with no usable analysis payload yields a
    /// failed outcome with empty sets, not an error. Side effects on
    /// success: the graph snapshot is persisted, the document is flagged
    /// with a back-reference, and entities/relationships are upserted into
    /// the property graph (per-item failures are logged and skipped).
    pub fn extract(
        &self,
        document: &Document,
        result: &ExtractionResult,
    ) -> Result<ExtractionOutcome, HearthError> {
        if !result.has_analysis() {
            warn!(
                "Document {} has no usable analysis payload; skipping extraction",
                document.id
            );
            return Ok(ExtractionOutcome::failure("no usable analysis payload"));
        }

        let doc_type = result
            .document_type
            .as_deref()
            .map(DocumentType::from_tag)
            .unwrap_or(document.doc_type);

        let mut entities = extract_entities(doc_type, result);

        // Free text adds contact-like entities, never replaces structured ones.
        if let Some(text) = &result.text {
            entities.extend(self.contacts.extract(text));
        }

        let relationships = build_relationships(doc_type, &entities);

        debug!(
            "Extracted {} entities and {} relationships from document {} ({})",
            entities.len(),
            relationships.len(),
            document.id,
            doc_type.as_str()
        );

        let now = Utc::now();
        let graph = KnowledgeGraph {
            id: Uuid::new_v4(),
            family_id: document.family_id.clone(),
            document_ids: vec![document.id],
            entities,
            relationships,
            created_at: now,
            updated_at: now,
            is_merged: false,
        };

        self.graphs.save(&graph)?;
        self.documents.set_graph(document.id, graph.id)?;
        self.upsert_into_graph_service(&graph);

        Ok(ExtractionOutcome::success(
            graph.id,
            graph.entities.len(),
            graph.relationships.len(),
        ))
    }

    /// Mirror the snapshot into the property graph. Per-item failures are
    /// logged and skipped; the batch never aborts.
    fn upsert_into_graph_service(&self, graph: &KnowledgeGraph) {
        for entity in &graph.entities {
            let properties = serde_json::json!({
                "category": entity.category.as_str(),
                "confidence": entity.confidence,
            });
            if let Err(e) = self.graph_service.upsert_node(
                &graph.family_id,
                &entity.entity_type,
                &entity.id.to_string(),
                &entity.value,
                &properties,
            ) {
                warn!("Skipping node upsert for {}: {}", entity.id, e);
            }
        }
        for rel in &graph.relationships {
            let properties = serde_json::json!({
                "label": rel.label,
                "confidence": rel.confidence,
            });
            if let Err(e) = self.graph_service.upsert_edge(
                &graph.family_id,
                &rel.rel_type,
                &rel.id.to_string(),
                ("entity", &rel.source_id.to_string()),
                ("entity", &rel.target_id.to_string()),
                &properties,
            ) {
                warn!("Skipping edge upsert for {}: {}", rel.id, e);
            }
        }
    }
}

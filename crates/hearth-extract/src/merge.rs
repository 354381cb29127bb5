//! Graph merge across documents.
//!
//! Deduplicates entities by `(type, lowercased value)`, remaps relationship
//! endpoints to the surviving entity, deduplicates relationships by
//! `(source, target, type)`, and persists a merged graph referencing all
//! input documents.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use hearth_core::error::HearthError;
use hearth_core::types::{Entity, KnowledgeGraph, Relationship};
use hearth_storage::{Database, GraphRepository};

use crate::types::ExtractionOutcome;

/// Merges the knowledge graphs of multiple documents into one.
pub struct GraphMerger {
    graphs: GraphRepository,
}

impl GraphMerger {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            graphs: GraphRepository::new(db),
        }
    }

    /// Merge the graphs of the given documents into a new `is_merged` graph.
    ///
    /// Documents without a graph are logged and skipped; if none of the
    /// inputs have a graph the outcome is an explicit "no graphs found"
    /// failure, not an error.
    pub fn merge(
        &self,
        family_id: &str,
        document_ids: &[Uuid],
    ) -> Result<ExtractionOutcome, HearthError> {
        let mut source_graphs = Vec::new();
        for doc_id in document_ids {
            match self.graphs.find_for_document(*doc_id) {
                Ok(Some(graph)) => source_graphs.push(graph),
                Ok(None) => warn!("Document {} has no graph; skipping in merge", doc_id),
                Err(e) => warn!("Failed to load graph for {}: {}; skipping", doc_id, e),
            }
        }

        if source_graphs.is_empty() {
            return Ok(ExtractionOutcome::failure("no graphs found"));
        }

        let (entities, id_map) = dedupe_entities(&source_graphs);
        let relationships = remap_relationships(&source_graphs, &id_map);

        let now = Utc::now();
        let merged = KnowledgeGraph {
            id: Uuid::new_v4(),
            family_id: family_id.to_string(),
            document_ids: document_ids.to_vec(),
            entities,
            relationships,
            created_at: now,
            updated_at: now,
            is_merged: true,
        };
        self.graphs.save(&merged)?;

        info!(
            "Merged {} graphs into {} ({} entities, {} relationships)",
            source_graphs.len(),
            merged.id,
            merged.entities.len(),
            merged.relationships.len()
        );

        Ok(ExtractionOutcome::success(
            merged.id,
            merged.entities.len(),
            merged.relationships.len(),
        ))
    }
}

/// Deduplicate entities by `(type, lowercased value)`. The first entity
/// encountered for a key survives; the map records old id -> survivor id.
fn dedupe_entities(graphs: &[KnowledgeGraph]) -> (Vec<Entity>, HashMap<Uuid, Uuid>) {
    let mut survivors: Vec<Entity> = Vec::new();
    let mut by_key: HashMap<(String, String), Uuid> = HashMap::new();
    let mut id_map: HashMap<Uuid, Uuid> = HashMap::new();

    for graph in graphs {
        for entity in &graph.entities {
            let key = (entity.entity_type.clone(), entity.value.to_lowercase());
            match by_key.get(&key) {
                Some(survivor_id) => {
                    id_map.insert(entity.id, *survivor_id);
                }
                None => {
                    by_key.insert(key, entity.id);
                    id_map.insert(entity.id, entity.id);
                    survivors.push(entity.clone());
                }
            }
        }
    }

    (survivors, id_map)
}

/// Remap relationship endpoints to surviving entities and deduplicate by
/// `(source, target, type)`. Endpoints unknown to the map (cross-batch
/// dangling references) pass through unchanged.
fn remap_relationships(
    graphs: &[KnowledgeGraph],
    id_map: &HashMap<Uuid, Uuid>,
) -> Vec<Relationship> {
    let mut seen: HashSet<(Uuid, Uuid, String)> = HashSet::new();
    let mut merged = Vec::new();

    for graph in graphs {
        for rel in &graph.relationships {
            let source = *id_map.get(&rel.source_id).unwrap_or(&rel.source_id);
            let target = *id_map.get(&rel.target_id).unwrap_or(&rel.target_id);
            if !seen.insert((source, target, rel.rel_type.clone())) {
                continue;
            }
            let mut remapped = rel.clone();
            remapped.source_id = source;
            remapped.target_id = target;
            merged.push(remapped);
        }
    }

    merged
}

//! Knowledge graph snapshot repository.
//!
//! Stores the per-document (or merged) entity/relationship sets produced by
//! the extractor. Entities and relationships are persisted as JSON columns;
//! the queryable property-graph lives in [`crate::graph`].

use std::sync::Arc;

use rusqlite::{OptionalExtension, Row};
use uuid::Uuid;

use hearth_core::error::HearthError;
use hearth_core::types::KnowledgeGraph;

use crate::codec;
use crate::db::Database;

/// Repository for knowledge graph snapshots.
pub struct GraphRepository {
    db: Arc<Database>,
}

impl GraphRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Store or replace a graph snapshot.
    pub fn save(&self, graph: &KnowledgeGraph) -> Result<(), HearthError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO graphs
                 (id, family_id, document_ids, entities, relationships, is_merged,
                  created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    graph.id.to_string(),
                    graph.family_id,
                    codec::to_json(&graph.document_ids)?,
                    codec::to_json(&graph.entities)?,
                    codec::to_json(&graph.relationships)?,
                    graph.is_merged as i32,
                    codec::to_epoch(graph.created_at),
                    codec::to_epoch(graph.updated_at),
                ],
            )
            .map_err(|e| HearthError::Storage(format!("Failed to save graph: {}", e)))?;
            Ok(())
        })
    }

    /// Find a graph snapshot by id.
    pub fn find_by_id(&self, id: Uuid) -> Result<Option<KnowledgeGraph>, HearthError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(&format!("{} WHERE g.id = ?1", SELECT_GRAPH))
                .map_err(|e| HearthError::Storage(e.to_string()))?;

            let result = stmt
                .query_row(rusqlite::params![id.to_string()], |row| {
                    Ok(row_to_graph(row))
                })
                .optional()
                .map_err(|e| HearthError::Storage(e.to_string()))?;

            match result {
                Some(graph) => Ok(Some(graph?)),
                None => Ok(None),
            }
        })
    }

    /// The graph extracted for a document, following the document's
    /// back-reference.
    pub fn find_for_document(&self, document_id: Uuid) -> Result<Option<KnowledgeGraph>, HearthError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "{} JOIN documents d ON d.graph_id = g.id WHERE d.id = ?1",
                    SELECT_GRAPH
                ))
                .map_err(|e| HearthError::Storage(e.to_string()))?;

            let result = stmt
                .query_row(rusqlite::params![document_id.to_string()], |row| {
                    Ok(row_to_graph(row))
                })
                .optional()
                .map_err(|e| HearthError::Storage(e.to_string()))?;

            match result {
                Some(graph) => Ok(Some(graph?)),
                None => Ok(None),
            }
        })
    }

    /// All graph snapshots for a family, newest first.
    pub fn list_by_family(&self, family_id: &str) -> Result<Vec<KnowledgeGraph>, HearthError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "{} WHERE g.family_id = ?1 ORDER BY g.created_at DESC",
                    SELECT_GRAPH
                ))
                .map_err(|e| HearthError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map(rusqlite::params![family_id], |row| Ok(row_to_graph(row)))
                .map_err(|e| HearthError::Storage(e.to_string()))?;

            let mut graphs = Vec::new();
            for row in rows {
                let graph = row.map_err(|e| HearthError::Storage(e.to_string()))??;
                graphs.push(graph);
            }
            Ok(graphs)
        })
    }
}

const SELECT_GRAPH: &str = "SELECT g.id, g.family_id, g.document_ids, g.entities,
        g.relationships, g.is_merged, g.created_at, g.updated_at
 FROM graphs g";

fn row_to_graph(row: &Row<'_>) -> Result<KnowledgeGraph, HearthError> {
    let id: String = row.get(0).map_err(|e| HearthError::Storage(e.to_string()))?;
    let family_id: String = row.get(1).map_err(|e| HearthError::Storage(e.to_string()))?;
    let document_ids: String = row.get(2).map_err(|e| HearthError::Storage(e.to_string()))?;
    let entities: String = row.get(3).map_err(|e| HearthError::Storage(e.to_string()))?;
    let relationships: String = row.get(4).map_err(|e| HearthError::Storage(e.to_string()))?;
    let is_merged: i32 = row.get(5).map_err(|e| HearthError::Storage(e.to_string()))?;
    let created_at: i64 = row.get(6).map_err(|e| HearthError::Storage(e.to_string()))?;
    let updated_at: i64 = row.get(7).map_err(|e| HearthError::Storage(e.to_string()))?;

    Ok(KnowledgeGraph {
        id: codec::parse_uuid(&id)?,
        family_id,
        document_ids: codec::from_json(&document_ids)?,
        entities: codec::from_json(&entities)?,
        relationships: codec::from_json(&relationships)?,
        is_merged: is_merged != 0,
        created_at: codec::from_epoch(created_at),
        updated_at: codec::from_epoch(updated_at),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use hearth_core::types::{Document, DocumentType, Entity, EntityCategory, Relationship};

    use crate::documents::DocumentRepository;

    fn make_graph(family: &str, doc_id: Uuid) -> KnowledgeGraph {
        let patient = Entity::new("patient", "Sam", EntityCategory::Person, 0.9);
        let provider = Entity::new("provider", "Dr. Lee", EntityCategory::Person, 0.9);
        let rel = Relationship::new(patient.id, provider.id, "treated_by", "treated by");
        KnowledgeGraph {
            id: Uuid::new_v4(),
            family_id: family.to_string(),
            document_ids: vec![doc_id],
            entities: vec![patient, provider],
            relationships: vec![rel],
            created_at: Utc::now(),
            updated_at: Utc::now(),
            is_merged: false,
        }
    }

    #[test]
    fn test_save_and_find_roundtrip() {
        let db = Arc::new(Database::in_memory().unwrap());
        let repo = GraphRepository::new(db);
        let graph = make_graph("fam-1", Uuid::new_v4());
        repo.save(&graph).unwrap();

        let found = repo.find_by_id(graph.id).unwrap().unwrap();
        assert_eq!(found.entities.len(), 2);
        assert_eq!(found.relationships.len(), 1);
        assert_eq!(found.relationships[0].rel_type, "treated_by");
        assert!(!found.is_merged);
    }

    #[test]
    fn test_find_for_document_follows_back_reference() {
        let db = Arc::new(Database::in_memory().unwrap());
        let graphs = GraphRepository::new(Arc::clone(&db));
        let docs = DocumentRepository::new(Arc::clone(&db));

        let doc = Document {
            id: Uuid::new_v4(),
            family_id: "fam-1".to_string(),
            title: "Visit".to_string(),
            doc_type: DocumentType::Medical,
            category: None,
            source: None,
            author: None,
            file_type: None,
            language: None,
            tags: vec![],
            content: None,
            doc_date: None,
            has_graph: false,
            graph_id: None,
            is_duplicate: false,
            original_document_id: None,
            duplicate_ids: vec![],
            created_at: Utc::now(),
        };
        docs.save(&doc).unwrap();

        let graph = make_graph("fam-1", doc.id);
        graphs.save(&graph).unwrap();
        docs.set_graph(doc.id, graph.id).unwrap();

        let found = graphs.find_for_document(doc.id).unwrap().unwrap();
        assert_eq!(found.id, graph.id);

        // A document without a graph yields None, not an error.
        assert!(graphs.find_for_document(Uuid::new_v4()).unwrap().is_none());
    }
}

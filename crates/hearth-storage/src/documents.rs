//! Document store repository.
//!
//! Persists family documents and the duplicate-detection bookkeeping the
//! similarity detector maintains (is_duplicate flag, original back-reference,
//! duplicate id list on the original).

use std::sync::Arc;

use rusqlite::{OptionalExtension, Row};
use uuid::Uuid;

use hearth_core::error::HearthError;
use hearth_core::types::{Document, DocumentType};

use crate::codec;
use crate::db::Database;

/// Repository for family documents.
pub struct DocumentRepository {
    db: Arc<Database>,
}

impl DocumentRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Store or replace a document.
    pub fn save(&self, doc: &Document) -> Result<(), HearthError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO documents
                 (id, family_id, title, title_lower, doc_type, category, source, author,
                  file_type, language, tags, content, doc_date, has_graph, graph_id,
                  is_duplicate, original_document_id, duplicate_ids, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                         ?16, ?17, ?18, ?19)",
                rusqlite::params![
                    doc.id.to_string(),
                    doc.family_id,
                    doc.title,
                    doc.title.to_lowercase(),
                    doc.doc_type.as_str(),
                    doc.category,
                    doc.source,
                    doc.author,
                    doc.file_type,
                    doc.language,
                    codec::to_json(&doc.tags)?,
                    doc.content,
                    doc.doc_date.map(|d| d.to_string()),
                    doc.has_graph as i32,
                    doc.graph_id.map(|g| g.to_string()),
                    doc.is_duplicate as i32,
                    doc.original_document_id.map(|o| o.to_string()),
                    codec::to_json(&doc.duplicate_ids)?,
                    codec::to_epoch(doc.created_at),
                ],
            )
            .map_err(|e| HearthError::Storage(format!("Failed to save document: {}", e)))?;
            Ok(())
        })
    }

    /// Find a document by id.
    pub fn find_by_id(&self, id: Uuid) -> Result<Option<Document>, HearthError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(&format!("{} WHERE id = ?1", SELECT_DOCUMENT))
                .map_err(|e| HearthError::Storage(e.to_string()))?;

            let result = stmt
                .query_row(rusqlite::params![id.to_string()], |row| {
                    Ok(row_to_document(row))
                })
                .optional()
                .map_err(|e| HearthError::Storage(e.to_string()))?;

            match result {
                Some(doc) => Ok(Some(doc?)),
                None => Ok(None),
            }
        })
    }

    /// All documents for a family, newest first.
    pub fn list_by_family(&self, family_id: &str) -> Result<Vec<Document>, HearthError> {
        self.query_documents(
            &format!(
                "{} WHERE family_id = ?1 ORDER BY created_at DESC",
                SELECT_DOCUMENT
            ),
            rusqlite::params![family_id],
        )
    }

    /// Documents of a given type within a family.
    pub fn find_by_type(
        &self,
        family_id: &str,
        doc_type: DocumentType,
    ) -> Result<Vec<Document>, HearthError> {
        self.query_documents(
            &format!(
                "{} WHERE family_id = ?1 AND doc_type = ?2 ORDER BY created_at DESC",
                SELECT_DOCUMENT
            ),
            rusqlite::params![family_id, doc_type.as_str()],
        )
    }

    /// Documents whose lowercased title contains any of the given words.
    pub fn find_by_title_words(
        &self,
        family_id: &str,
        words: &[String],
    ) -> Result<Vec<Document>, HearthError> {
        let mut found = Vec::new();
        let mut seen = std::collections::HashSet::new();
        for word in words {
            let pattern = format!("%{}%", word.to_lowercase());
            let docs = self.query_documents(
                &format!(
                    "{} WHERE family_id = ?1 AND title_lower LIKE ?2",
                    SELECT_DOCUMENT
                ),
                rusqlite::params![family_id, pattern],
            )?;
            for doc in docs {
                if seen.insert(doc.id) {
                    found.push(doc);
                }
            }
        }
        Ok(found)
    }

    /// Record that a knowledge graph was extracted for this document.
    pub fn set_graph(&self, id: Uuid, graph_id: Uuid) -> Result<(), HearthError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "UPDATE documents SET has_graph = 1, graph_id = ?2 WHERE id = ?1",
                rusqlite::params![id.to_string(), graph_id.to_string()],
            )
            .map_err(|e| HearthError::Storage(format!("Failed to set graph flag: {}", e)))?;
            Ok(())
        })
    }

    /// Mark `duplicate_id` as a duplicate of `original_id`.
    ///
    /// Two writes: the duplicate gets the flag and back-reference, the
    /// original's duplicate list gains the id (array-union semantics).
    pub fn mark_duplicate(&self, duplicate_id: Uuid, original_id: Uuid) -> Result<(), HearthError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "UPDATE documents SET is_duplicate = 1, original_document_id = ?2 WHERE id = ?1",
                rusqlite::params![duplicate_id.to_string(), original_id.to_string()],
            )
            .map_err(|e| HearthError::Storage(format!("Failed to mark duplicate: {}", e)))?;
            Ok(())
        })?;
        self.update_duplicate_list(original_id, duplicate_id, true)
    }

    /// Reverse both sides of a duplicate marking.
    pub fn unmark_duplicate(
        &self,
        duplicate_id: Uuid,
        original_id: Uuid,
    ) -> Result<(), HearthError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "UPDATE documents SET is_duplicate = 0, original_document_id = NULL WHERE id = ?1",
                rusqlite::params![duplicate_id.to_string()],
            )
            .map_err(|e| HearthError::Storage(format!("Failed to unmark duplicate: {}", e)))?;
            Ok(())
        })?;
        self.update_duplicate_list(original_id, duplicate_id, false)
    }

    /// Read-modify-write the original's duplicate id list.
    fn update_duplicate_list(
        &self,
        original_id: Uuid,
        duplicate_id: Uuid,
        add: bool,
    ) -> Result<(), HearthError> {
        self.db.with_conn(|conn| {
            let existing: Option<String> = conn
                .query_row(
                    "SELECT duplicate_ids FROM documents WHERE id = ?1",
                    rusqlite::params![original_id.to_string()],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|e| HearthError::Storage(e.to_string()))?;

            let Some(text) = existing else {
                return Err(HearthError::NotFound(format!(
                    "document {}",
                    original_id
                )));
            };

            let mut ids: Vec<Uuid> = codec::from_json(&text)?;
            if add {
                if !ids.contains(&duplicate_id) {
                    ids.push(duplicate_id);
                }
            } else {
                ids.retain(|d| *d != duplicate_id);
            }

            conn.execute(
                "UPDATE documents SET duplicate_ids = ?2 WHERE id = ?1",
                rusqlite::params![original_id.to_string(), codec::to_json(&ids)?],
            )
            .map_err(|e| HearthError::Storage(e.to_string()))?;
            Ok(())
        })
    }

    fn query_documents(
        &self,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<Document>, HearthError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(sql)
                .map_err(|e| HearthError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map(params, |row| Ok(row_to_document(row)))
                .map_err(|e| HearthError::Storage(e.to_string()))?;

            let mut docs = Vec::new();
            for row in rows {
                let doc = row.map_err(|e| HearthError::Storage(e.to_string()))??;
                docs.push(doc);
            }
            Ok(docs)
        })
    }
}

const SELECT_DOCUMENT: &str = "SELECT id, family_id, title, doc_type, category, source, author,
        file_type, language, tags, content, doc_date, has_graph, graph_id, is_duplicate,
        original_document_id, duplicate_ids, created_at
 FROM documents";

fn row_to_document(row: &Row<'_>) -> Result<Document, HearthError> {
    let id: String = row.get(0).map_err(|e| HearthError::Storage(e.to_string()))?;
    let family_id: String = row.get(1).map_err(|e| HearthError::Storage(e.to_string()))?;
    let title: String = row.get(2).map_err(|e| HearthError::Storage(e.to_string()))?;
    let doc_type: String = row.get(3).map_err(|e| HearthError::Storage(e.to_string()))?;
    let category: Option<String> = row.get(4).map_err(|e| HearthError::Storage(e.to_string()))?;
    let source: Option<String> = row.get(5).map_err(|e| HearthError::Storage(e.to_string()))?;
    let author: Option<String> = row.get(6).map_err(|e| HearthError::Storage(e.to_string()))?;
    let file_type: Option<String> = row.get(7).map_err(|e| HearthError::Storage(e.to_string()))?;
    let language: Option<String> = row.get(8).map_err(|e| HearthError::Storage(e.to_string()))?;
    let tags: String = row.get(9).map_err(|e| HearthError::Storage(e.to_string()))?;
    let content: Option<String> = row.get(10).map_err(|e| HearthError::Storage(e.to_string()))?;
    let doc_date: Option<String> = row.get(11).map_err(|e| HearthError::Storage(e.to_string()))?;
    let has_graph: i32 = row.get(12).map_err(|e| HearthError::Storage(e.to_string()))?;
    let graph_id: Option<String> = row.get(13).map_err(|e| HearthError::Storage(e.to_string()))?;
    let is_duplicate: i32 = row.get(14).map_err(|e| HearthError::Storage(e.to_string()))?;
    let original: Option<String> = row.get(15).map_err(|e| HearthError::Storage(e.to_string()))?;
    let duplicate_ids: String = row.get(16).map_err(|e| HearthError::Storage(e.to_string()))?;
    let created_at: i64 = row.get(17).map_err(|e| HearthError::Storage(e.to_string()))?;

    Ok(Document {
        id: codec::parse_uuid(&id)?,
        family_id,
        title,
        doc_type: DocumentType::from_tag(&doc_type),
        category,
        source,
        author,
        file_type,
        language,
        tags: codec::from_json(&tags)?,
        content,
        doc_date: codec::opt_date(doc_date),
        has_graph: has_graph != 0,
        graph_id: codec::opt_uuid(graph_id)?,
        is_duplicate: is_duplicate != 0,
        original_document_id: codec::opt_uuid(original)?,
        duplicate_ids: codec::from_json(&duplicate_ids)?,
        created_at: codec::from_epoch(created_at),
    })
}

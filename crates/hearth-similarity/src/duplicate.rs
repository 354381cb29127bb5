//! Bidirectional duplicate bookkeeping.
//!
//! Marking is two writes against the document store (the duplicate's flag
//! and back-reference, the original's duplicate list); there is no
//! distributed transaction guarantee between them.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use hearth_core::error::HearthError;
use hearth_storage::{Database, DocumentRepository};

/// Marks and unmarks duplicate documents.
pub struct DuplicateMarker {
    documents: DocumentRepository,
}

impl DuplicateMarker {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            documents: DocumentRepository::new(db),
        }
    }

    /// Mark `duplicate_id` as a duplicate of `original_id`.
    pub fn mark(&self, duplicate_id: Uuid, original_id: Uuid) -> Result<(), HearthError> {
        if duplicate_id == original_id {
            return Err(HearthError::InvalidInput(
                "a document cannot be a duplicate of itself".to_string(),
            ));
        }
        self.documents.mark_duplicate(duplicate_id, original_id)?;
        info!("Marked {} as duplicate of {}", duplicate_id, original_id);
        Ok(())
    }

    /// Reverse both sides of a duplicate marking.
    pub fn unmark(&self, duplicate_id: Uuid, original_id: Uuid) -> Result<(), HearthError> {
        self.documents.unmark_duplicate(duplicate_id, original_id)?;
        info!("Unmarked {} as duplicate of {}", duplicate_id, original_id);
        Ok(())
    }
}

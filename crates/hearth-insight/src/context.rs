//! Shared read-only context for the insight generators.

use std::sync::Arc;

use hearth_storage::{Database, DocumentRepository, FamilyRepository, GraphService};

/// Repository bundle the generators query. Generators are read-only against
/// this context and independent of each other.
pub struct InsightContext {
    pub family: FamilyRepository,
    pub documents: DocumentRepository,
    pub graph: GraphService,
}

impl InsightContext {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            family: FamilyRepository::new(Arc::clone(&db)),
            documents: DocumentRepository::new(Arc::clone(&db)),
            graph: GraphService::new(db),
        }
    }
}

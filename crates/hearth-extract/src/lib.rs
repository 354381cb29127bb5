//! Hearth extract crate - document-to-graph extraction.
//!
//! Converts one processed document into typed entities and relationships:
//! - Type-branched mapping of analyzed fields to entities
//! - Pattern-based contact extraction from free text
//! - Cross-product relationship templates per document type
//! - Unconditional temporal and contextual linking passes
//! - Merge of per-document graphs with entity deduplication

pub mod entities;
pub mod extractor;
pub mod merge;
pub mod patterns;
pub mod relations;
pub mod types;

pub use entities::extract_entities;
pub use extractor::GraphExtractor;
pub use merge::GraphMerger;
pub use patterns::ContactExtractor;
pub use relations::{build_relationships, link_contextual, link_temporal};
pub use types::{ExtractionOutcome, ExtractionResult};

//! Hearth similarity crate - near-duplicate document detection.
//!
//! Computes multi-factor similarity between a document and candidate prior
//! documents: Jaccard title similarity, field-level metadata similarity with
//! date proximity credit, and term-frequency cosine content similarity,
//! combined with fixed weights. Also maintains the bidirectional duplicate
//! bookkeeping on the document store.

pub mod detector;
pub mod duplicate;
pub mod metrics;
pub mod tokenize;

pub use detector::{SimilarDocument, SimilarityDetector};
pub use duplicate::DuplicateMarker;
pub use metrics::{cosine_similarity, jaccard_similarity, metadata_similarity};
pub use tokenize::{significant_title_words, term_frequency, tokenize};

//! Hearth suggest crate - actionable, relevance-ranked recommendations.
//!
//! Ten generators transform a per-cycle family snapshot (members, tasks,
//! events, recent insights, feedback history) into suggestions. A pluggable
//! relevance model re-scores them when available, with a whole-batch
//! fallback to a neutral score when it is not. Suggestions carry a full
//! feedback/implementation/dismissal lifecycle.

pub mod engine;
pub mod error;
pub mod generators;
pub mod relevance;
pub mod snapshot;

pub use engine::SuggestionEngine;
pub use error::SuggestError;
pub use relevance::{
    HeuristicRelevanceModel, NullRelevanceModel, RelevanceFeatures, RelevanceModel,
};
pub use snapshot::FamilyContext;

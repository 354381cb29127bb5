//! Hearth storage crate - SQLite-backed document store and graph accessor.
//!
//! The document store and the property-graph query service are external
//! collaborators in deployment; this crate gives both a concrete embedded
//! implementation behind the repository seam so the rest of the system is
//! fully testable. All access goes through raw SQL repositories over a
//! shared [`Database`] handle.

pub(crate) mod codec;
pub mod db;
pub mod documents;
pub mod family;
pub mod graph;
pub mod graphs;
pub mod insights;
pub mod migrations;
pub mod schedules;
pub mod suggestions;

pub use db::Database;
pub use documents::DocumentRepository;
pub use family::FamilyRepository;
pub use graph::{GraphEdgeRow, GraphNodeRow, GraphService};
pub use graphs::GraphRepository;
pub use insights::{InsightRepository, NotificationRepository};
pub use schedules::ScheduleRepository;
pub use suggestions::{FeedbackRepository, SuggestionRepository};

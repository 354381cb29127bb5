//! Hearth core crate - shared domain types, error taxonomy, and configuration.
//!
//! Every other crate in the workspace builds on the vocabulary defined here:
//! entities and relationships extracted from family documents, the knowledge
//! graphs that hold them, and the insights and suggestions mined from them.

pub mod config;
pub mod error;
pub mod types;

pub use config::HearthConfig;
pub use error::{HearthError, Result};

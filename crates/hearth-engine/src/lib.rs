//! Hearth engine crate - the public service facade.
//!
//! Ties the pipeline together behind a uniform result envelope: extraction,
//! merge, similarity, insight and suggestion generation, lifecycle
//! mutators, and the durable schedule runner. Generation cycles are
//! serialized per family so the dedup-window checks stay meaningful.

pub mod api;
pub mod scheduler;
pub mod service;

pub use api::ApiResponse;
pub use scheduler::ScheduleRunner;
pub use service::HearthService;

use tracing_subscriber::filter::LevelFilter;

/// Initialize tracing output for an embedding application.
///
/// `level` is one of trace/debug/info/warn/error; anything else falls back
/// to info. Safe to call once per process.
pub fn init_tracing(level: &str) {
    let filter = match level {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => LevelFilter::INFO,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(filter)
        .try_init();
}

//! Insight generation orchestrator.
//!
//! Runs all generators per cycle, isolates per-generator failures, applies
//! the 24-hour (type, title) dedup window, persists survivors, and projects
//! notifications from actionable insights. Persistence failures skip the
//! item and continue the batch.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info, warn};

use hearth_core::config::InsightConfig;
use hearth_core::error::HearthError;
use hearth_core::types::Insight;
use hearth_storage::{Database, InsightRepository, NotificationRepository};

use crate::context::InsightContext;
use crate::generators::{GeneratorFn, GENERATORS};
use crate::notify::notification_from;

/// Orchestrates one insight generation cycle per family.
pub struct InsightOrchestrator {
    ctx: InsightContext,
    insights: InsightRepository,
    notifications: NotificationRepository,
    config: InsightConfig,
}

impl InsightOrchestrator {
    pub fn new(db: Arc<Database>, config: InsightConfig) -> Self {
        Self {
            ctx: InsightContext::new(Arc::clone(&db)),
            insights: InsightRepository::new(Arc::clone(&db)),
            notifications: NotificationRepository::new(db),
            config,
        }
    }

    /// Run all generators for the family and persist the surviving insights.
    ///
    /// Returns the insights that were actually stored (new within the dedup
    /// window and successfully saved).
    pub fn generate(&self, family_id: &str) -> Result<Vec<Insight>, HearthError> {
        self.generate_with(family_id, GENERATORS)
    }

    /// Like [`generate`](Self::generate) with an explicit generator table.
    pub fn generate_with(
        &self,
        family_id: &str,
        generators: &[(&str, GeneratorFn)],
    ) -> Result<Vec<Insight>, HearthError> {
        let now = Utc::now();
        let mut produced = Vec::new();

        for (name, generator) in generators {
            match generator(&self.ctx, family_id, now) {
                Ok(insights) => {
                    debug!("Generator {} produced {} insight(s)", name, insights.len());
                    produced.extend(insights);
                }
                Err(e) => {
                    // One failing analyzer never aborts the cycle.
                    warn!("Insight generator {} failed: {}", name, e);
                }
            }
        }

        let window_start = now - Duration::hours(self.config.dedup_window_hours);
        let mut stored = Vec::new();

        for mut insight in produced {
            // Normalize the TTL to the configured window.
            insight.expires_at =
                insight.generated_at + Duration::days(self.config.insight_ttl_days);
            match self.insights.exists_recent(
                family_id,
                insight.insight_type,
                &insight.title,
                window_start,
            ) {
                Ok(true) => {
                    debug!(
                        "Skipping duplicate insight '{}' within the {}h window",
                        insight.title, self.config.dedup_window_hours
                    );
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    warn!("Dedup check failed for '{}': {}; skipping", insight.title, e);
                    continue;
                }
            }

            if let Err(e) = self.insights.save(&insight) {
                warn!("Failed to save insight '{}': {}; skipping", insight.title, e);
                continue;
            }
            self.mirror_into_graph(&insight);

            if let Some(notification) =
                notification_from(&insight, self.config.notification_ttl_days)
            {
                if let Err(e) = self.notifications.save(&notification) {
                    warn!(
                        "Failed to save notification for '{}': {}",
                        insight.title, e
                    );
                }
            }

            stored.push(insight);
        }

        info!(
            "Insight cycle for {} stored {} insight(s)",
            family_id,
            stored.len()
        );
        Ok(stored)
    }

    /// Mirror a stored insight into the property graph, with edges to the
    /// entities that triggered it. Failures are logged and skipped.
    fn mirror_into_graph(&self, insight: &Insight) {
        let properties = serde_json::json!({
            "type": insight.insight_type.as_str(),
            "severity": insight.severity.as_str(),
            "confidence": insight.confidence,
        });
        if let Err(e) = self.ctx.graph.upsert_node(
            &insight.family_id,
            "insight",
            &insight.id.to_string(),
            &insight.title,
            &properties,
        ) {
            warn!("Skipping graph mirror for insight {}: {}", insight.id, e);
            return;
        }
        for entity_id in &insight.entities {
            let edge_id = format!("{}-{}", insight.id, entity_id);
            if let Err(e) = self.ctx.graph.upsert_edge(
                &insight.family_id,
                "insight_about",
                &edge_id,
                ("insight", &insight.id.to_string()),
                ("entity", entity_id),
                &serde_json::json!({}),
            ) {
                warn!("Skipping insight edge {}: {}", edge_id, e);
            }
        }
    }
}

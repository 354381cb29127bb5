//! Notification projection from actionable insights.
//!
//! One-way: the notification copies what it needs (title, body, action
//! items) and carries its own TTL; later changes to the insight do not
//! propagate.

use chrono::Duration;
use uuid::Uuid;

use hearth_core::types::{Insight, Notification};

/// Project a notification from an insight with its own TTL. Returns `None`
/// for non-actionable insights.
pub fn notification_from(insight: &Insight, ttl_days: i64) -> Option<Notification> {
    if !insight.actionable {
        return None;
    }
    Some(Notification {
        id: Uuid::new_v4(),
        family_id: insight.family_id.clone(),
        title: insight.title.clone(),
        body: insight.description.clone(),
        urgency: insight.severity.urgency(),
        action_items: insight.action_items.clone(),
        source_insight_id: insight.id,
        expires_at: insight.generated_at + Duration::days(ttl_days),
        created_at: insight.generated_at,
    })
}

//! Insight and notification repositories.
//!
//! The dedup-window check (`exists_recent`) is a query-then-write: callers
//! serialize generation per family to keep it meaningful.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, Row};
use uuid::Uuid;

use hearth_core::error::HearthError;
use hearth_core::types::{
    ActionCompletion, Insight, InsightStatus, InsightType, Notification, Severity, Urgency,
};

use crate::codec;
use crate::db::Database;

/// Repository for generated insights.
pub struct InsightRepository {
    db: Arc<Database>,
}

impl InsightRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Store or replace an insight.
    pub fn save(&self, insight: &Insight) -> Result<(), HearthError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO insights
                 (id, family_id, insight_type, title, description, severity, entities,
                  actionable, action_items, confidence, generated_at, expires_at, status,
                  seen_by, actions_completed)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                rusqlite::params![
                    insight.id.to_string(),
                    insight.family_id,
                    insight.insight_type.as_str(),
                    insight.title,
                    insight.description,
                    insight.severity.as_str(),
                    codec::to_json(&insight.entities)?,
                    insight.actionable as i32,
                    codec::to_json(&insight.action_items)?,
                    insight.confidence as f64,
                    codec::to_epoch(insight.generated_at),
                    codec::to_epoch(insight.expires_at),
                    insight.status.as_str(),
                    codec::to_json(&insight.seen_by)?,
                    codec::to_json(&insight.actions_completed)?,
                ],
            )
            .map_err(|e| HearthError::Storage(format!("Failed to save insight: {}", e)))?;
            Ok(())
        })
    }

    /// Find an insight by id.
    pub fn find_by_id(&self, id: Uuid) -> Result<Option<Insight>, HearthError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(&format!("{} WHERE id = ?1", SELECT_INSIGHT))
                .map_err(|e| HearthError::Storage(e.to_string()))?;

            let result = stmt
                .query_row(rusqlite::params![id.to_string()], |row| {
                    Ok(row_to_insight(row))
                })
                .optional()
                .map_err(|e| HearthError::Storage(e.to_string()))?;

            match result {
                Some(insight) => Ok(Some(insight?)),
                None => Ok(None),
            }
        })
    }

    /// True when an insight with the same `(type, title)` was generated for
    /// the family at or after `since`.
    pub fn exists_recent(
        &self,
        family_id: &str,
        insight_type: InsightType,
        title: &str,
        since: DateTime<Utc>,
    ) -> Result<bool, HearthError> {
        self.db.with_conn(|conn| {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM insights
                     WHERE family_id = ?1 AND insight_type = ?2 AND title = ?3
                       AND generated_at >= ?4",
                    rusqlite::params![
                        family_id,
                        insight_type.as_str(),
                        title,
                        codec::to_epoch(since)
                    ],
                    |row| row.get(0),
                )
                .map_err(|e| HearthError::Storage(e.to_string()))?;
            Ok(count > 0)
        })
    }

    /// Active, unexpired insights for a family.
    pub fn list_active(
        &self,
        family_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<Insight>, HearthError> {
        self.query_insights(
            &format!(
                "{} WHERE family_id = ?1 AND status = 'active' AND expires_at > ?2
                 ORDER BY generated_at DESC",
                SELECT_INSIGHT
            ),
            rusqlite::params![family_id, codec::to_epoch(now)],
        )
    }

    /// Insights generated at or after `since`, regardless of status.
    pub fn list_since(
        &self,
        family_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<Insight>, HearthError> {
        self.query_insights(
            &format!(
                "{} WHERE family_id = ?1 AND generated_at >= ?2 ORDER BY generated_at DESC",
                SELECT_INSIGHT
            ),
            rusqlite::params![family_id, codec::to_epoch(since)],
        )
    }

    /// Idempotent append to the seen-by list.
    pub fn mark_seen(&self, id: Uuid, user_id: &str) -> Result<(), HearthError> {
        self.db.with_conn(|conn| {
            let existing: Option<String> = conn
                .query_row(
                    "SELECT seen_by FROM insights WHERE id = ?1",
                    rusqlite::params![id.to_string()],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|e| HearthError::Storage(e.to_string()))?;

            let Some(text) = existing else {
                return Err(HearthError::NotFound(format!("insight {}", id)));
            };

            let mut seen: Vec<String> = codec::from_json(&text)?;
            if !seen.iter().any(|u| u == user_id) {
                seen.push(user_id.to_string());
            }

            conn.execute(
                "UPDATE insights SET seen_by = ?2 WHERE id = ?1",
                rusqlite::params![id.to_string(), codec::to_json(&seen)?],
            )
            .map_err(|e| HearthError::Storage(e.to_string()))?;
            Ok(())
        })
    }

    /// Dismiss an insight.
    pub fn dismiss(&self, id: Uuid) -> Result<(), HearthError> {
        self.db.with_conn(|conn| {
            let changed = conn
                .execute(
                    "UPDATE insights SET status = 'dismissed' WHERE id = ?1",
                    rusqlite::params![id.to_string()],
                )
                .map_err(|e| HearthError::Storage(e.to_string()))?;
            if changed == 0 {
                return Err(HearthError::NotFound(format!("insight {}", id)));
            }
            Ok(())
        })
    }

    /// Record a completed action item.
    pub fn complete_action(
        &self,
        id: Uuid,
        action_index: usize,
        user_id: &str,
    ) -> Result<(), HearthError> {
        self.db.with_conn(|conn| {
            let existing: Option<String> = conn
                .query_row(
                    "SELECT actions_completed FROM insights WHERE id = ?1",
                    rusqlite::params![id.to_string()],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|e| HearthError::Storage(e.to_string()))?;

            let Some(text) = existing else {
                return Err(HearthError::NotFound(format!("insight {}", id)));
            };

            let mut completed: Vec<ActionCompletion> = codec::from_json(&text)?;
            completed.push(ActionCompletion {
                action_index,
                user_id: user_id.to_string(),
                completed_at: Utc::now(),
            });

            conn.execute(
                "UPDATE insights SET actions_completed = ?2 WHERE id = ?1",
                rusqlite::params![id.to_string(), codec::to_json(&completed)?],
            )
            .map_err(|e| HearthError::Storage(e.to_string()))?;
            Ok(())
        })
    }

    fn query_insights(
        &self,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<Insight>, HearthError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(sql)
                .map_err(|e| HearthError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map(params, |row| Ok(row_to_insight(row)))
                .map_err(|e| HearthError::Storage(e.to_string()))?;

            let mut insights = Vec::new();
            for row in rows {
                insights.push(row.map_err(|e| HearthError::Storage(e.to_string()))??);
            }
            Ok(insights)
        })
    }
}

const SELECT_INSIGHT: &str = "SELECT id, family_id, insight_type, title, description, severity,
        entities, actionable, action_items, confidence, generated_at, expires_at, status,
        seen_by, actions_completed
 FROM insights";

fn row_to_insight(row: &Row<'_>) -> Result<Insight, HearthError> {
    let id: String = row.get(0).map_err(|e| HearthError::Storage(e.to_string()))?;
    let family_id: String = row.get(1).map_err(|e| HearthError::Storage(e.to_string()))?;
    let insight_type: String = row.get(2).map_err(|e| HearthError::Storage(e.to_string()))?;
    let title: String = row.get(3).map_err(|e| HearthError::Storage(e.to_string()))?;
    let description: String = row.get(4).map_err(|e| HearthError::Storage(e.to_string()))?;
    let severity: String = row.get(5).map_err(|e| HearthError::Storage(e.to_string()))?;
    let entities: String = row.get(6).map_err(|e| HearthError::Storage(e.to_string()))?;
    let actionable: i32 = row.get(7).map_err(|e| HearthError::Storage(e.to_string()))?;
    let action_items: String = row.get(8).map_err(|e| HearthError::Storage(e.to_string()))?;
    let confidence: f64 = row.get(9).map_err(|e| HearthError::Storage(e.to_string()))?;
    let generated_at: i64 = row.get(10).map_err(|e| HearthError::Storage(e.to_string()))?;
    let expires_at: i64 = row.get(11).map_err(|e| HearthError::Storage(e.to_string()))?;
    let status: String = row.get(12).map_err(|e| HearthError::Storage(e.to_string()))?;
    let seen_by: String = row.get(13).map_err(|e| HearthError::Storage(e.to_string()))?;
    let actions_completed: String = row.get(14).map_err(|e| HearthError::Storage(e.to_string()))?;

    Ok(Insight {
        id: codec::parse_uuid(&id)?,
        family_id,
        insight_type: InsightType::parse(&insight_type)
            .ok_or_else(|| HearthError::Storage(format!("Unknown insight type: {}", insight_type)))?,
        title,
        description,
        severity: Severity::parse(&severity)
            .ok_or_else(|| HearthError::Storage(format!("Unknown severity: {}", severity)))?,
        entities: codec::from_json(&entities)?,
        actionable: actionable != 0,
        action_items: codec::from_json(&action_items)?,
        confidence: confidence as f32,
        generated_at: codec::from_epoch(generated_at),
        expires_at: codec::from_epoch(expires_at),
        status: InsightStatus::parse(&status)
            .ok_or_else(|| HearthError::Storage(format!("Unknown insight status: {}", status)))?,
        seen_by: codec::from_json(&seen_by)?,
        actions_completed: codec::from_json(&actions_completed)?,
    })
}

/// Repository for notifications projected from insights.
pub struct NotificationRepository {
    db: Arc<Database>,
}

impl NotificationRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn save(&self, notification: &Notification) -> Result<(), HearthError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO notifications
                 (id, family_id, title, body, urgency, action_items, source_insight_id,
                  expires_at, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                rusqlite::params![
                    notification.id.to_string(),
                    notification.family_id,
                    notification.title,
                    notification.body,
                    notification.urgency.as_str(),
                    codec::to_json(&notification.action_items)?,
                    notification.source_insight_id.to_string(),
                    codec::to_epoch(notification.expires_at),
                    codec::to_epoch(notification.created_at),
                ],
            )
            .map_err(|e| HearthError::Storage(format!("Failed to save notification: {}", e)))?;
            Ok(())
        })
    }

    /// Unexpired notifications for a family, newest first.
    pub fn list_active(
        &self,
        family_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<Notification>, HearthError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, family_id, title, body, urgency, action_items,
                            source_insight_id, expires_at, created_at
                     FROM notifications
                     WHERE family_id = ?1 AND expires_at > ?2
                     ORDER BY created_at DESC",
                )
                .map_err(|e| HearthError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map(
                    rusqlite::params![family_id, codec::to_epoch(now)],
                    |row| Ok(row_to_notification(row)),
                )
                .map_err(|e| HearthError::Storage(e.to_string()))?;

            let mut notifications = Vec::new();
            for row in rows {
                notifications.push(row.map_err(|e| HearthError::Storage(e.to_string()))??);
            }
            Ok(notifications)
        })
    }
}

fn row_to_notification(row: &Row<'_>) -> Result<Notification, HearthError> {
    let id: String = row.get(0).map_err(|e| HearthError::Storage(e.to_string()))?;
    let family_id: String = row.get(1).map_err(|e| HearthError::Storage(e.to_string()))?;
    let title: String = row.get(2).map_err(|e| HearthError::Storage(e.to_string()))?;
    let body: String = row.get(3).map_err(|e| HearthError::Storage(e.to_string()))?;
    let urgency: String = row.get(4).map_err(|e| HearthError::Storage(e.to_string()))?;
    let action_items: String = row.get(5).map_err(|e| HearthError::Storage(e.to_string()))?;
    let source: String = row.get(6).map_err(|e| HearthError::Storage(e.to_string()))?;
    let expires_at: i64 = row.get(7).map_err(|e| HearthError::Storage(e.to_string()))?;
    let created_at: i64 = row.get(8).map_err(|e| HearthError::Storage(e.to_string()))?;

    Ok(Notification {
        id: codec::parse_uuid(&id)?,
        family_id,
        title,
        body,
        urgency: Urgency::parse(&urgency)
            .ok_or_else(|| HearthError::Storage(format!("Unknown urgency: {}", urgency)))?,
        action_items: codec::from_json(&action_items)?,
        source_insight_id: codec::parse_uuid(&source)?,
        expires_at: codec::from_epoch(expires_at),
        created_at: codec::from_epoch(created_at),
    })
}

//! Suggestion and feedback repositories.
//!
//! Suggestions carry a relevance score and a feedback/implementation
//! lifecycle; feedback rows are append-only.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, Row};
use uuid::Uuid;

use hearth_core::error::HearthError;
use hearth_core::types::{
    ConfidenceLevel, Severity, Suggestion, SuggestionFeedback, SuggestionStatus, SuggestionType,
};

use crate::codec;
use crate::db::Database;

/// Repository for generated suggestions.
pub struct SuggestionRepository {
    db: Arc<Database>,
}

impl SuggestionRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Store or replace a suggestion.
    pub fn save(&self, suggestion: &Suggestion) -> Result<(), HearthError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO suggestions
                 (id, family_id, suggestion_type, title, description, severity, entities,
                  actionable, action_items, confidence, relevance_score, confidence_level,
                  generated_at, expires_at, status, seen_by, feedback_count,
                  implemented_count, implemented_by, dismissal_reason)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                         ?16, ?17, ?18, ?19, ?20)",
                rusqlite::params![
                    suggestion.id.to_string(),
                    suggestion.family_id,
                    suggestion.suggestion_type.as_str(),
                    suggestion.title,
                    suggestion.description,
                    suggestion.severity.as_str(),
                    codec::to_json(&suggestion.entities)?,
                    suggestion.actionable as i32,
                    codec::to_json(&suggestion.action_items)?,
                    suggestion.confidence as f64,
                    suggestion.relevance_score,
                    suggestion.confidence_level.as_str(),
                    codec::to_epoch(suggestion.generated_at),
                    codec::to_epoch(suggestion.expires_at),
                    suggestion.status.as_str(),
                    codec::to_json(&suggestion.seen_by)?,
                    suggestion.feedback_count,
                    suggestion.implemented_count,
                    codec::to_json(&suggestion.implemented_by)?,
                    suggestion.dismissal_reason,
                ],
            )
            .map_err(|e| HearthError::Storage(format!("Failed to save suggestion: {}", e)))?;
            Ok(())
        })
    }

    /// Find a suggestion by id.
    pub fn find_by_id(&self, id: Uuid) -> Result<Option<Suggestion>, HearthError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(&format!("{} WHERE id = ?1", SELECT_SUGGESTION))
                .map_err(|e| HearthError::Storage(e.to_string()))?;

            let result = stmt
                .query_row(rusqlite::params![id.to_string()], |row| {
                    Ok(row_to_suggestion(row))
                })
                .optional()
                .map_err(|e| HearthError::Storage(e.to_string()))?;

            match result {
                Some(suggestion) => Ok(Some(suggestion?)),
                None => Ok(None),
            }
        })
    }

    /// True when a suggestion with the same `(type, title)` was generated
    /// for the family at or after `since`.
    pub fn exists_recent(
        &self,
        family_id: &str,
        suggestion_type: SuggestionType,
        title: &str,
        since: DateTime<Utc>,
    ) -> Result<bool, HearthError> {
        self.db.with_conn(|conn| {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM suggestions
                     WHERE family_id = ?1 AND suggestion_type = ?2 AND title = ?3
                       AND generated_at >= ?4",
                    rusqlite::params![
                        family_id,
                        suggestion_type.as_str(),
                        title,
                        codec::to_epoch(since)
                    ],
                    |row| row.get(0),
                )
                .map_err(|e| HearthError::Storage(e.to_string()))?;
            Ok(count > 0)
        })
    }

    /// Active suggestions for a family, highest relevance first.
    pub fn list_active(&self, family_id: &str) -> Result<Vec<Suggestion>, HearthError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "{} WHERE family_id = ?1 AND status = 'active'
                     ORDER BY relevance_score DESC",
                    SELECT_SUGGESTION
                ))
                .map_err(|e| HearthError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map(rusqlite::params![family_id], |row| {
                    Ok(row_to_suggestion(row))
                })
                .map_err(|e| HearthError::Storage(e.to_string()))?;

            let mut suggestions = Vec::new();
            for row in rows {
                suggestions.push(row.map_err(|e| HearthError::Storage(e.to_string()))??);
            }
            Ok(suggestions)
        })
    }

    /// Idempotent append to the seen-by list.
    pub fn mark_seen(&self, id: Uuid, user_id: &str) -> Result<(), HearthError> {
        self.db.with_conn(|conn| {
            let existing: Option<String> = conn
                .query_row(
                    "SELECT seen_by FROM suggestions WHERE id = ?1",
                    rusqlite::params![id.to_string()],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|e| HearthError::Storage(e.to_string()))?;

            let Some(text) = existing else {
                return Err(HearthError::NotFound(format!("suggestion {}", id)));
            };

            let mut seen: Vec<String> = codec::from_json(&text)?;
            if !seen.iter().any(|u| u == user_id) {
                seen.push(user_id.to_string());
            }

            conn.execute(
                "UPDATE suggestions SET seen_by = ?2 WHERE id = ?1",
                rusqlite::params![id.to_string(), codec::to_json(&seen)?],
            )
            .map_err(|e| HearthError::Storage(e.to_string()))?;
            Ok(())
        })
    }

    /// Move an active suggestion to implemented, crediting `user_id`.
    ///
    /// The status transition only applies from `active`; implemented and
    /// dismissed are terminal.
    pub fn mark_implemented(&self, id: Uuid, user_id: &str) -> Result<(), HearthError> {
        self.db.with_conn(|conn| {
            let existing: Option<(String, String)> = conn
                .query_row(
                    "SELECT status, implemented_by FROM suggestions WHERE id = ?1",
                    rusqlite::params![id.to_string()],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()
                .map_err(|e| HearthError::Storage(e.to_string()))?;

            let Some((status, implemented_by)) = existing else {
                return Err(HearthError::NotFound(format!("suggestion {}", id)));
            };
            if status != "active" {
                return Err(HearthError::InvalidInput(format!(
                    "suggestion {} is {}, not active",
                    id, status
                )));
            }

            let mut by: Vec<String> = codec::from_json(&implemented_by)?;
            if !by.iter().any(|u| u == user_id) {
                by.push(user_id.to_string());
            }

            conn.execute(
                "UPDATE suggestions
                 SET status = 'implemented',
                     implemented_count = implemented_count + 1,
                     implemented_by = ?2
                 WHERE id = ?1",
                rusqlite::params![id.to_string(), codec::to_json(&by)?],
            )
            .map_err(|e| HearthError::Storage(e.to_string()))?;
            Ok(())
        })
    }

    /// Move an active suggestion to dismissed with a reason.
    pub fn dismiss(&self, id: Uuid, reason: &str) -> Result<(), HearthError> {
        self.db.with_conn(|conn| {
            let changed = conn
                .execute(
                    "UPDATE suggestions SET status = 'dismissed', dismissal_reason = ?2
                     WHERE id = ?1 AND status = 'active'",
                    rusqlite::params![id.to_string(), reason],
                )
                .map_err(|e| HearthError::Storage(e.to_string()))?;
            if changed == 0 {
                return Err(HearthError::InvalidInput(format!(
                    "suggestion {} not active or not found",
                    id
                )));
            }
            Ok(())
        })
    }

    /// Increment the suggestion-level feedback counter.
    pub fn increment_feedback(&self, id: Uuid) -> Result<(), HearthError> {
        self.db.with_conn(|conn| {
            let changed = conn
                .execute(
                    "UPDATE suggestions SET feedback_count = feedback_count + 1 WHERE id = ?1",
                    rusqlite::params![id.to_string()],
                )
                .map_err(|e| HearthError::Storage(e.to_string()))?;
            if changed == 0 {
                return Err(HearthError::NotFound(format!("suggestion {}", id)));
            }
            Ok(())
        })
    }
}

const SELECT_SUGGESTION: &str = "SELECT id, family_id, suggestion_type, title, description,
        severity, entities, actionable, action_items, confidence, relevance_score,
        confidence_level, generated_at, expires_at, status, seen_by, feedback_count,
        implemented_count, implemented_by, dismissal_reason
 FROM suggestions";

fn row_to_suggestion(row: &Row<'_>) -> Result<Suggestion, HearthError> {
    let id: String = row.get(0).map_err(|e| HearthError::Storage(e.to_string()))?;
    let family_id: String = row.get(1).map_err(|e| HearthError::Storage(e.to_string()))?;
    let suggestion_type: String = row.get(2).map_err(|e| HearthError::Storage(e.to_string()))?;
    let title: String = row.get(3).map_err(|e| HearthError::Storage(e.to_string()))?;
    let description: String = row.get(4).map_err(|e| HearthError::Storage(e.to_string()))?;
    let severity: String = row.get(5).map_err(|e| HearthError::Storage(e.to_string()))?;
    let entities: String = row.get(6).map_err(|e| HearthError::Storage(e.to_string()))?;
    let actionable: i32 = row.get(7).map_err(|e| HearthError::Storage(e.to_string()))?;
    let action_items: String = row.get(8).map_err(|e| HearthError::Storage(e.to_string()))?;
    let confidence: f64 = row.get(9).map_err(|e| HearthError::Storage(e.to_string()))?;
    let relevance_score: f64 = row.get(10).map_err(|e| HearthError::Storage(e.to_string()))?;
    let confidence_level: String = row.get(11).map_err(|e| HearthError::Storage(e.to_string()))?;
    let generated_at: i64 = row.get(12).map_err(|e| HearthError::Storage(e.to_string()))?;
    let expires_at: i64 = row.get(13).map_err(|e| HearthError::Storage(e.to_string()))?;
    let status: String = row.get(14).map_err(|e| HearthError::Storage(e.to_string()))?;
    let seen_by: String = row.get(15).map_err(|e| HearthError::Storage(e.to_string()))?;
    let feedback_count: u32 = row.get(16).map_err(|e| HearthError::Storage(e.to_string()))?;
    let implemented_count: u32 = row.get(17).map_err(|e| HearthError::Storage(e.to_string()))?;
    let implemented_by: String = row.get(18).map_err(|e| HearthError::Storage(e.to_string()))?;
    let dismissal_reason: Option<String> =
        row.get(19).map_err(|e| HearthError::Storage(e.to_string()))?;

    Ok(Suggestion {
        id: codec::parse_uuid(&id)?,
        family_id,
        suggestion_type: SuggestionType::parse(&suggestion_type).ok_or_else(|| {
            HearthError::Storage(format!("Unknown suggestion type: {}", suggestion_type))
        })?,
        title,
        description,
        severity: Severity::parse(&severity)
            .ok_or_else(|| HearthError::Storage(format!("Unknown severity: {}", severity)))?,
        entities: codec::from_json(&entities)?,
        actionable: actionable != 0,
        action_items: codec::from_json(&action_items)?,
        confidence: confidence as f32,
        relevance_score,
        confidence_level: ConfidenceLevel::parse(&confidence_level).ok_or_else(|| {
            HearthError::Storage(format!("Unknown confidence level: {}", confidence_level))
        })?,
        generated_at: codec::from_epoch(generated_at),
        expires_at: codec::from_epoch(expires_at),
        status: SuggestionStatus::parse(&status)
            .ok_or_else(|| HearthError::Storage(format!("Unknown suggestion status: {}", status)))?,
        seen_by: codec::from_json(&seen_by)?,
        feedback_count,
        implemented_count,
        implemented_by: codec::from_json(&implemented_by)?,
        dismissal_reason,
    })
}

/// Repository for append-only suggestion feedback.
pub struct FeedbackRepository {
    db: Arc<Database>,
}

impl FeedbackRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn save(&self, feedback: &SuggestionFeedback) -> Result<(), HearthError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO suggestion_feedback
                 (id, suggestion_id, family_id, user_id, rating, comment, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    feedback.id.to_string(),
                    feedback.suggestion_id.to_string(),
                    feedback.family_id,
                    feedback.user_id,
                    feedback.rating,
                    feedback.comment,
                    codec::to_epoch(feedback.created_at),
                ],
            )
            .map_err(|e| HearthError::Storage(format!("Failed to save feedback: {}", e)))?;
            Ok(())
        })
    }

    /// All feedback for a family, newest first.
    pub fn list_for_family(&self, family_id: &str) -> Result<Vec<SuggestionFeedback>, HearthError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, suggestion_id, family_id, user_id, rating, comment, created_at
                     FROM suggestion_feedback
                     WHERE family_id = ?1 ORDER BY created_at DESC",
                )
                .map_err(|e| HearthError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map(rusqlite::params![family_id], |row| Ok(row_to_feedback(row)))
                .map_err(|e| HearthError::Storage(e.to_string()))?;

            let mut feedback = Vec::new();
            for row in rows {
                feedback.push(row.map_err(|e| HearthError::Storage(e.to_string()))??);
            }
            Ok(feedback)
        })
    }
}

fn row_to_feedback(row: &Row<'_>) -> Result<SuggestionFeedback, HearthError> {
    let id: String = row.get(0).map_err(|e| HearthError::Storage(e.to_string()))?;
    let suggestion_id: String = row.get(1).map_err(|e| HearthError::Storage(e.to_string()))?;
    let family_id: String = row.get(2).map_err(|e| HearthError::Storage(e.to_string()))?;
    let user_id: String = row.get(3).map_err(|e| HearthError::Storage(e.to_string()))?;
    let rating: u8 = row.get(4).map_err(|e| HearthError::Storage(e.to_string()))?;
    let comment: Option<String> = row.get(5).map_err(|e| HearthError::Storage(e.to_string()))?;
    let created_at: i64 = row.get(6).map_err(|e| HearthError::Storage(e.to_string()))?;

    Ok(SuggestionFeedback {
        id: codec::parse_uuid(&id)?,
        suggestion_id: codec::parse_uuid(&suggestion_id)?,
        family_id,
        user_id,
        rating,
        comment,
        created_at: codec::from_epoch(created_at),
    })
}

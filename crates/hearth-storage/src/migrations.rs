//! Database schema migrations.
//!
//! Applies the initial schema: documents, graphs, graph nodes/edges,
//! family records, insights, notifications, suggestions, feedback,
//! and schedules.

use rusqlite::Connection;
use tracing::info;

use hearth_core::error::HearthError;

/// Run all pending database migrations.
///
/// Currently implements the initial schema (version 1). Future migrations
/// can be added by checking the current version and applying incremental changes.
pub fn run_migrations(conn: &Connection) -> Result<(), HearthError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| HearthError::Storage(format!("Failed to create migrations table: {}", e)))?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| HearthError::Storage(format!("Failed to query migration version: {}", e)))?;

    if current_version < 1 {
        apply_v1(conn)?;
        info!("Applied migration v1: initial_schema");
    }

    Ok(())
}

/// Version 1: Initial schema.
fn apply_v1(conn: &Connection) -> Result<(), HearthError> {
    conn.execute_batch(
        "
        -- Family documents with duplicate bookkeeping.
        CREATE TABLE IF NOT EXISTS documents (
            id                    TEXT PRIMARY KEY NOT NULL,
            family_id             TEXT NOT NULL,
            title                 TEXT NOT NULL DEFAULT '',
            title_lower           TEXT NOT NULL DEFAULT '',
            doc_type              TEXT NOT NULL DEFAULT 'generic'
                                  CHECK (doc_type IN ('medical', 'school', 'activity',
                                                      'family', 'email', 'generic')),
            category              TEXT,
            source                TEXT,
            author                TEXT,
            file_type             TEXT,
            language              TEXT,
            tags                  TEXT NOT NULL DEFAULT '[]',
            content               TEXT,
            doc_date              TEXT,
            has_graph             INTEGER NOT NULL DEFAULT 0,
            graph_id              TEXT,
            is_duplicate          INTEGER NOT NULL DEFAULT 0,
            original_document_id  TEXT,
            duplicate_ids         TEXT NOT NULL DEFAULT '[]',
            created_at            INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );

        CREATE INDEX IF NOT EXISTS idx_documents_family
            ON documents (family_id, doc_type);

        CREATE INDEX IF NOT EXISTS idx_documents_title_lower
            ON documents (family_id, title_lower);

        -- Knowledge graph snapshots (one per document, or merged).
        CREATE TABLE IF NOT EXISTS graphs (
            id             TEXT PRIMARY KEY NOT NULL,
            family_id      TEXT NOT NULL,
            document_ids   TEXT NOT NULL DEFAULT '[]',
            entities       TEXT NOT NULL DEFAULT '[]',
            relationships  TEXT NOT NULL DEFAULT '[]',
            is_merged      INTEGER NOT NULL DEFAULT 0,
            created_at     INTEGER NOT NULL,
            updated_at     INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_graphs_family
            ON graphs (family_id, created_at DESC);

        -- Property-graph nodes, upsert keyed by (node_type, id).
        CREATE TABLE IF NOT EXISTS graph_nodes (
            node_type   TEXT NOT NULL,
            id          TEXT NOT NULL,
            family_id   TEXT NOT NULL,
            label       TEXT NOT NULL DEFAULT '',
            properties  TEXT NOT NULL DEFAULT '{}',
            updated_at  INTEGER NOT NULL,
            PRIMARY KEY (node_type, id)
        );

        CREATE INDEX IF NOT EXISTS idx_graph_nodes_family
            ON graph_nodes (family_id, node_type);

        -- Property-graph edges, upsert keyed by (edge_type, id).
        CREATE TABLE IF NOT EXISTS graph_edges (
            edge_type    TEXT NOT NULL,
            id           TEXT NOT NULL,
            family_id    TEXT NOT NULL,
            source_type  TEXT NOT NULL,
            source_id    TEXT NOT NULL,
            target_type  TEXT NOT NULL,
            target_id    TEXT NOT NULL,
            properties   TEXT NOT NULL DEFAULT '{}',
            updated_at   INTEGER NOT NULL,
            PRIMARY KEY (edge_type, id)
        );

        CREATE INDEX IF NOT EXISTS idx_graph_edges_family
            ON graph_edges (family_id, edge_type);

        -- Family members, tasks, events.
        CREATE TABLE IF NOT EXISTS family_members (
            id          TEXT PRIMARY KEY NOT NULL,
            family_id   TEXT NOT NULL,
            name        TEXT NOT NULL,
            role        TEXT NOT NULL CHECK (role IN ('parent', 'guardian', 'child')),
            birth_date  TEXT,
            created_at  INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_family_members_family
            ON family_members (family_id);

        CREATE TABLE IF NOT EXISTS family_tasks (
            id            TEXT PRIMARY KEY NOT NULL,
            family_id     TEXT NOT NULL,
            title         TEXT NOT NULL,
            task_type     TEXT NOT NULL DEFAULT '',
            assignee_id   TEXT,
            due_date      TEXT,
            status        TEXT NOT NULL DEFAULT 'open'
                          CHECK (status IN ('open', 'completed')),
            completed_at  INTEGER,
            created_at    INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_family_tasks_family
            ON family_tasks (family_id, status);

        CREATE TABLE IF NOT EXISTS family_events (
            id            TEXT PRIMARY KEY NOT NULL,
            family_id     TEXT NOT NULL,
            title         TEXT NOT NULL,
            category      TEXT NOT NULL DEFAULT '',
            event_date    TEXT NOT NULL,
            event_time    TEXT,
            attendee_ids  TEXT NOT NULL DEFAULT '[]',
            created_at    INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_family_events_family
            ON family_events (family_id, event_date);

        -- Generated insights.
        CREATE TABLE IF NOT EXISTS insights (
            id                 TEXT PRIMARY KEY NOT NULL,
            family_id          TEXT NOT NULL,
            insight_type       TEXT NOT NULL,
            title              TEXT NOT NULL,
            description        TEXT NOT NULL DEFAULT '',
            severity           TEXT NOT NULL CHECK (severity IN ('low', 'medium', 'high')),
            entities           TEXT NOT NULL DEFAULT '[]',
            actionable         INTEGER NOT NULL DEFAULT 0,
            action_items       TEXT NOT NULL DEFAULT '[]',
            confidence         REAL NOT NULL DEFAULT 0.0,
            generated_at       INTEGER NOT NULL,
            expires_at         INTEGER NOT NULL,
            status             TEXT NOT NULL DEFAULT 'active'
                               CHECK (status IN ('active', 'dismissed')),
            seen_by            TEXT NOT NULL DEFAULT '[]',
            actions_completed  TEXT NOT NULL DEFAULT '[]'
        );

        CREATE INDEX IF NOT EXISTS idx_insights_dedup
            ON insights (family_id, insight_type, title, generated_at DESC);

        CREATE INDEX IF NOT EXISTS idx_insights_family_status
            ON insights (family_id, status, expires_at);

        -- Notifications projected from actionable insights.
        CREATE TABLE IF NOT EXISTS notifications (
            id                 TEXT PRIMARY KEY NOT NULL,
            family_id          TEXT NOT NULL,
            title              TEXT NOT NULL,
            body               TEXT NOT NULL DEFAULT '',
            urgency            TEXT NOT NULL CHECK (urgency IN ('normal', 'important', 'urgent')),
            action_items       TEXT NOT NULL DEFAULT '[]',
            source_insight_id  TEXT NOT NULL,
            expires_at         INTEGER NOT NULL,
            created_at         INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_notifications_family
            ON notifications (family_id, expires_at);

        -- Generated suggestions.
        CREATE TABLE IF NOT EXISTS suggestions (
            id                 TEXT PRIMARY KEY NOT NULL,
            family_id          TEXT NOT NULL,
            suggestion_type    TEXT NOT NULL,
            title              TEXT NOT NULL,
            description        TEXT NOT NULL DEFAULT '',
            severity           TEXT NOT NULL CHECK (severity IN ('low', 'medium', 'high')),
            entities           TEXT NOT NULL DEFAULT '[]',
            actionable         INTEGER NOT NULL DEFAULT 0,
            action_items       TEXT NOT NULL DEFAULT '[]',
            confidence         REAL NOT NULL DEFAULT 0.0,
            relevance_score    REAL NOT NULL DEFAULT 0.5,
            confidence_level   TEXT NOT NULL DEFAULT 'medium'
                               CHECK (confidence_level IN ('very_high', 'high', 'medium', 'low')),
            generated_at       INTEGER NOT NULL,
            expires_at         INTEGER NOT NULL,
            status             TEXT NOT NULL DEFAULT 'active'
                               CHECK (status IN ('active', 'implemented', 'dismissed')),
            seen_by            TEXT NOT NULL DEFAULT '[]',
            feedback_count     INTEGER NOT NULL DEFAULT 0,
            implemented_count  INTEGER NOT NULL DEFAULT 0,
            implemented_by     TEXT NOT NULL DEFAULT '[]',
            dismissal_reason   TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_suggestions_dedup
            ON suggestions (family_id, suggestion_type, title, generated_at DESC);

        CREATE INDEX IF NOT EXISTS idx_suggestions_family_status
            ON suggestions (family_id, status, relevance_score DESC);

        -- Append-only suggestion feedback.
        CREATE TABLE IF NOT EXISTS suggestion_feedback (
            id             TEXT PRIMARY KEY NOT NULL,
            suggestion_id  TEXT NOT NULL,
            family_id      TEXT NOT NULL,
            user_id        TEXT NOT NULL,
            rating         INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
            comment        TEXT,
            created_at     INTEGER NOT NULL,
            FOREIGN KEY (suggestion_id) REFERENCES suggestions(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_suggestion_feedback_family
            ON suggestion_feedback (family_id, created_at DESC);

        -- Durable recurring generation schedules.
        CREATE TABLE IF NOT EXISTS schedules (
            id          TEXT PRIMARY KEY NOT NULL,
            family_id   TEXT NOT NULL,
            kind        TEXT NOT NULL CHECK (kind IN ('insights', 'suggestions')),
            frequency   TEXT NOT NULL CHECK (frequency IN ('hourly', 'daily', 'weekly')),
            next_run    INTEGER NOT NULL,
            enabled     INTEGER NOT NULL DEFAULT 1,
            last_run    INTEGER,
            created_at  INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_schedules_due
            ON schedules (enabled, next_run);

        INSERT INTO schema_migrations (version, name) VALUES (1, 'initial_schema');
        ",
    )
    .map_err(|e| HearthError::Storage(format!("Failed to apply v1 schema: {}", e)))?;

    Ok(())
}

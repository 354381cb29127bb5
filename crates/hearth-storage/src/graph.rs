//! Property-graph query service accessor.
//!
//! Thin but load-bearing: upserts nodes and edges keyed by `(type, id)` and
//! answers the tabular pattern queries the insight generators run (for
//! example, sibling influence edges with their JSON properties).

use std::sync::Arc;

use chrono::Utc;
use rusqlite::Row;

use hearth_core::error::HearthError;

use crate::codec;
use crate::db::Database;

/// A node row returned from a pattern query.
#[derive(Debug, Clone)]
pub struct GraphNodeRow {
    pub id: String,
    pub label: String,
    pub properties: serde_json::Value,
}

/// An edge row returned from a pattern query.
#[derive(Debug, Clone)]
pub struct GraphEdgeRow {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    pub properties: serde_json::Value,
}

/// Accessor over the property-graph tables.
pub struct GraphService {
    db: Arc<Database>,
}

impl GraphService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert or update a node keyed by `(node_type, id)`.
    pub fn upsert_node(
        &self,
        family_id: &str,
        node_type: &str,
        id: &str,
        label: &str,
        properties: &serde_json::Value,
    ) -> Result<(), HearthError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO graph_nodes (node_type, id, family_id, label, properties, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT (node_type, id) DO UPDATE SET
                     family_id = excluded.family_id,
                     label = excluded.label,
                     properties = excluded.properties,
                     updated_at = excluded.updated_at",
                rusqlite::params![
                    node_type,
                    id,
                    family_id,
                    label,
                    codec::to_json(properties)?,
                    codec::to_epoch(Utc::now()),
                ],
            )
            .map_err(|e| HearthError::Graph(format!("Failed to upsert node: {}", e)))?;
            Ok(())
        })
    }

    /// Insert or update an edge keyed by `(edge_type, id)`.
    ///
    /// Endpoints are `(type, id)` pairs referencing nodes that may or may not
    /// exist yet; readers tolerate dangling references.
    #[allow(clippy::too_many_arguments)]
    pub fn upsert_edge(
        &self,
        family_id: &str,
        edge_type: &str,
        id: &str,
        source: (&str, &str),
        target: (&str, &str),
        properties: &serde_json::Value,
    ) -> Result<(), HearthError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO graph_edges
                 (edge_type, id, family_id, source_type, source_id, target_type, target_id,
                  properties, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 ON CONFLICT (edge_type, id) DO UPDATE SET
                     family_id = excluded.family_id,
                     source_type = excluded.source_type,
                     source_id = excluded.source_id,
                     target_type = excluded.target_type,
                     target_id = excluded.target_id,
                     properties = excluded.properties,
                     updated_at = excluded.updated_at",
                rusqlite::params![
                    edge_type,
                    id,
                    family_id,
                    source.0,
                    source.1,
                    target.0,
                    target.1,
                    codec::to_json(properties)?,
                    codec::to_epoch(Utc::now()),
                ],
            )
            .map_err(|e| HearthError::Graph(format!("Failed to upsert edge: {}", e)))?;
            Ok(())
        })
    }

    /// All nodes of a type within a family.
    pub fn nodes_of_type(
        &self,
        family_id: &str,
        node_type: &str,
    ) -> Result<Vec<GraphNodeRow>, HearthError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, label, properties FROM graph_nodes
                     WHERE family_id = ?1 AND node_type = ?2",
                )
                .map_err(|e| HearthError::Graph(e.to_string()))?;

            let rows = stmt
                .query_map(rusqlite::params![family_id, node_type], |row| {
                    Ok(row_to_node(row))
                })
                .map_err(|e| HearthError::Graph(e.to_string()))?;

            collect_rows(rows)
        })
    }

    /// All edges of a type within a family.
    pub fn edges_of_type(
        &self,
        family_id: &str,
        edge_type: &str,
    ) -> Result<Vec<GraphEdgeRow>, HearthError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, source_id, target_id, properties FROM graph_edges
                     WHERE family_id = ?1 AND edge_type = ?2",
                )
                .map_err(|e| HearthError::Graph(e.to_string()))?;

            let rows = stmt
                .query_map(rusqlite::params![family_id, edge_type], |row| {
                    Ok(row_to_edge(row))
                })
                .map_err(|e| HearthError::Graph(e.to_string()))?;

            collect_rows(rows)
        })
    }
}

fn collect_rows<T>(
    rows: impl Iterator<Item = rusqlite::Result<Result<T, HearthError>>>,
) -> Result<Vec<T>, HearthError> {
    let mut out = Vec::new();
    for row in rows {
        let item = row.map_err(|e| HearthError::Graph(e.to_string()))??;
        out.push(item);
    }
    Ok(out)
}

fn row_to_node(row: &Row<'_>) -> Result<GraphNodeRow, HearthError> {
    let id: String = row.get(0).map_err(|e| HearthError::Graph(e.to_string()))?;
    let label: String = row.get(1).map_err(|e| HearthError::Graph(e.to_string()))?;
    let properties: String = row.get(2).map_err(|e| HearthError::Graph(e.to_string()))?;
    Ok(GraphNodeRow {
        id,
        label,
        properties: codec::from_json(&properties)?,
    })
}

fn row_to_edge(row: &Row<'_>) -> Result<GraphEdgeRow, HearthError> {
    let id: String = row.get(0).map_err(|e| HearthError::Graph(e.to_string()))?;
    let source_id: String = row.get(1).map_err(|e| HearthError::Graph(e.to_string()))?;
    let target_id: String = row.get(2).map_err(|e| HearthError::Graph(e.to_string()))?;
    let properties: String = row.get(3).map_err(|e| HearthError::Graph(e.to_string()))?;
    Ok(GraphEdgeRow {
        id,
        source_id,
        target_id,
        properties: codec::from_json(&properties)?,
    })
}

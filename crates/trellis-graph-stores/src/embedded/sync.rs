//! SQLite <-> petgraph synchronization.
//!
//! Persists node and edge records with insert-or-replace semantics and
//! hydrates the in-memory graph from SQLite on startup.

use rusqlite::{params, Connection};
use tracing::warn;

use trellis_core::error::TrellisResult;
use trellis_core::types::{Edge, Node};

use super::graph_ops::{self, IdIndex, KnowledgeGraph};

/// Load the entire graph from SQLite into petgraph.
///
/// Called on startup, before the store accepts any call. A node row whose
/// metadata blob fails to decode is hydrated with empty metadata rather
/// than aborting — corruption in one record must not block the rest of
/// the graph from loading.
pub fn load_graph(
    conn: &Connection,
    graph: &mut KnowledgeGraph,
    ids: &mut IdIndex,
) -> TrellisResult<()> {
    graph.clear();
    ids.clear();

    let mut stmt = conn.prepare("SELECT id, text, metadata FROM nodes")?;
    let node_iter = stmt.query_map([], |row| {
        let id: String = row.get(0)?;
        let text: String = row.get(1)?;
        let metadata_str: String = row.get(2)?;
        Ok((id, text, metadata_str))
    })?;

    for node_result in node_iter {
        let (id, text, metadata_str) = node_result?;
        let metadata = match serde_json::from_str(&metadata_str) {
            Ok(metadata) => metadata,
            Err(err) => {
                warn!(id, %err, "undecodable node metadata, hydrating empty");
                Default::default()
            }
        };
        graph_ops::upsert_vertex(graph, ids, &Node { id, text, metadata });
    }

    let mut stmt = conn.prepare("SELECT source, target, edge_type, weight FROM edges")?;
    let edge_iter = stmt.query_map([], |row| {
        Ok(Edge {
            source: row.get(0)?,
            target: row.get(1)?,
            edge_type: row.get(2)?,
            weight: row.get(3)?,
        })
    })?;

    for edge_result in edge_iter {
        // Endpoints without node rows become placeholder vertices, so
        // traversal after a restart matches traversal before it.
        graph_ops::upsert_link(graph, ids, &edge_result?);
    }

    Ok(())
}

/// Save a node to SQLite, replacing text and metadata on conflict.
pub fn save_node(conn: &Connection, node: &Node) -> TrellisResult<()> {
    let metadata_str = serde_json::to_string(&node.metadata)?;
    conn.execute(
        r#"
        INSERT INTO nodes (id, text, metadata, updated_at)
        VALUES (?1, ?2, ?3, datetime('now'))
        ON CONFLICT(id) DO UPDATE SET
            text = excluded.text,
            metadata = excluded.metadata,
            updated_at = datetime('now')
        "#,
        params![node.id, node.text, metadata_str],
    )?;
    Ok(())
}

/// Save an edge to SQLite, replacing the weight on conflict of the
/// `(source, target, type)` triple.
pub fn save_edge(conn: &Connection, edge: &Edge) -> TrellisResult<()> {
    conn.execute(
        r#"
        INSERT INTO edges (source, target, edge_type, weight, updated_at)
        VALUES (?1, ?2, ?3, ?4, datetime('now'))
        ON CONFLICT(source, target, edge_type) DO UPDATE SET
            weight = excluded.weight,
            updated_at = datetime('now')
        "#,
        params![edge.source, edge.target, edge.edge_type, edge.weight],
    )?;
    Ok(())
}

//! SQLite schema for the embedded graph store.
//!
//! Two relations back the graph:
//! - `nodes`: keyed by `id`, with text and an opaque serialized-metadata blob
//! - `edges`: keyed by the composite `(source, target, edge_type)`, with a
//!   numeric weight
//!
//! Edge endpoints are deliberately not foreign keys — orphan edges are
//! representable and tolerated.

use rusqlite::Connection;

use trellis_core::error::TrellisResult;

/// SQL for the nodes table.
pub const CREATE_NODES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS nodes (
    id TEXT PRIMARY KEY,
    text TEXT NOT NULL DEFAULT '',
    metadata TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
)
"#;

/// SQL for the edges table.
pub const CREATE_EDGES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS edges (
    source TEXT NOT NULL,
    target TEXT NOT NULL,
    edge_type TEXT NOT NULL,
    weight REAL NOT NULL DEFAULT 1.0,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (source, target, edge_type)
)
"#;

/// Index for efficient traversal from source.
pub const CREATE_EDGES_SOURCE_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_edges_source ON edges(source)
"#;

/// Index for efficient traversal to target.
pub const CREATE_EDGES_TARGET_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_edges_target ON edges(target)
"#;

/// Initialize the graph schema in the given database connection.
///
/// Creates tables and indexes if they don't exist. Safe to call multiple
/// times (idempotent).
pub fn init_schema(conn: &Connection) -> TrellisResult<()> {
    conn.execute(CREATE_NODES_TABLE, [])?;
    conn.execute(CREATE_EDGES_TABLE, [])?;
    conn.execute(CREATE_EDGES_SOURCE_INDEX, [])?;
    conn.execute(CREATE_EDGES_TARGET_INDEX, [])?;
    Ok(())
}

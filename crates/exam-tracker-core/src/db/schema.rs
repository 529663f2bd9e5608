//! SQLite schema definition.

/// Complete database schema for the exam tracker.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Key-Value Slots (local persistence for client-side collections)
-- ============================================================================

CREATE TABLE IF NOT EXISTS kv_slots (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,                         -- serialized payload, rewritten in full
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- ============================================================================
-- Dashboard Data Points
-- ============================================================================

CREATE TABLE IF NOT EXISTS data_points (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    label TEXT NOT NULL,
    value INTEGER NOT NULL
);
"#;

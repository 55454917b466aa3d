//! SQL schema for the saved-state store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One canonical JSON payload per storage key, overwritten on every save.
CREATE TABLE IF NOT EXISTS saved_state (
    storage_key TEXT PRIMARY KEY,
    payload     TEXT NOT NULL,   -- canonical serialized ontology
    saved_at    TEXT NOT NULL    -- ISO 8601 UTC
);

PRAGMA user_version = 1;
";

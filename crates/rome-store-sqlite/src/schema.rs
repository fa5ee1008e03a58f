//! SQL schema for the ROME SQLite store.
//!
//! Connection-level settings run once at startup. Per-kind tables are created
//! lazily by [`table_ddl`] the first time a kind is ingested.

use rome_core::ResourceKind;

pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA user_version = 1;
";

/// DDL for one kind's table; idempotent thanks to `IF NOT EXISTS`.
///
/// Rows are insert-only. No UPDATE or DELETE is ever issued.
pub fn table_ddl(kind: ResourceKind) -> String {
  format!(
    "CREATE TABLE IF NOT EXISTS {table} (
        code          TEXT PRIMARY KEY,
        libelle       TEXT NOT NULL,
        payload       TEXT NOT NULL,   -- detail record as compact JSON
        downloaded_at TEXT NOT NULL    -- RFC 3339 UTC
    );",
    table = kind.table(),
  )
}

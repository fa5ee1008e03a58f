//! [`SqliteStore`]: the SQLite implementation of [`RomeStore`].

use std::path::Path;

use rome_core::{PersistedRow, ResourceKind, store::RomeStore};
use rusqlite::OptionalExtension as _;

use crate::{
  Error, Result,
  encode::RawRow,
  schema::{SCHEMA, table_ddl},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A ROME store backed by a single SQLite file.
///
/// Rows staged with `insert` live in memory until `commit` writes them in
/// one transaction.
pub struct SqliteStore {
  conn:    tokio_rusqlite::Connection,
  pending: Vec<PersistedRow>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn).await
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn).await
  }

  async fn init(conn: tokio_rusqlite::Connection) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(Self { conn, pending: Vec::new() })
  }

  /// Number of rows staged but not yet committed.
  pub fn pending(&self) -> usize { self.pending.len() }

  /// Number of stored rows for `kind`; zero if its table was never created.
  pub async fn count(&self, kind: ResourceKind) -> Result<u64> {
    let table = kind.table();
    let count = self
      .conn
      .call(move |conn| {
        if !table_exists(conn, table)? {
          return Ok(0);
        }
        let n: i64 =
          conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?;
        Ok(n as u64)
      })
      .await?;
    Ok(count)
  }

  /// Fetch one stored row by its code.
  pub async fn get(
    &self,
    kind: ResourceKind,
    code: &str,
  ) -> Result<Option<PersistedRow>> {
    let code = code.to_owned();

    let raw: Option<RawRow> = self
      .conn
      .call(move |conn| {
        if !table_exists(conn, kind.table())? {
          return Ok(None);
        }
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT code, libelle, payload, downloaded_at FROM {} WHERE code = ?1",
                kind.table()
              ),
              rusqlite::params![code],
              |row| {
                Ok(RawRow {
                  kind,
                  code:          row.get(0)?,
                  libelle:       row.get(1)?,
                  payload:       row.get(2)?,
                  downloaded_at: row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRow::into_row).transpose()
  }
}

fn table_exists(conn: &rusqlite::Connection, table: &str) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
        rusqlite::params![table],
        |_| Ok(true),
      )
      .optional()?
      .unwrap_or(false),
  )
}

/// Primary-key and unique-index violations.
fn is_key_conflict(err: &rusqlite::Error) -> bool {
  match err {
    rusqlite::Error::SqliteFailure(e, msg) => {
      e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        || (e.code == rusqlite::ErrorCode::ConstraintViolation
          && msg
            .as_deref()
            .is_some_and(|m| m.starts_with("UNIQUE constraint failed")))
    }
    _ => false,
  }
}

// ─── RomeStore impl ──────────────────────────────────────────────────────────

impl RomeStore for SqliteStore {
  type Error = Error;

  async fn ensure_table(&mut self, kind: ResourceKind) -> Result<()> {
    let ddl = table_ddl(kind);
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(&ddl)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn insert(&mut self, row: PersistedRow) -> Result<()> {
    self.pending.push(row);
    Ok(())
  }

  async fn commit(&mut self) -> Result<()> {
    if self.pending.is_empty() {
      return Ok(());
    }
    let rows: Vec<RawRow> = self.pending.iter().map(RawRow::from_row).collect();

    // Some((kind, code)) when a row hit an existing key; the transaction is
    // dropped, and so rolled back, before returning.
    let conflict: Option<(ResourceKind, String)> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for row in rows {
          let sql = format!(
            "INSERT INTO {} (code, libelle, payload, downloaded_at)
             VALUES (?1, ?2, ?3, ?4)",
            row.kind.table()
          );
          let inserted = tx.execute(
            &sql,
            rusqlite::params![row.code, row.libelle, row.payload, row.downloaded_at],
          );
          match inserted {
            Ok(_) => {}
            Err(e) if is_key_conflict(&e) => return Ok(Some((row.kind, row.code))),
            Err(e) => return Err(e.into()),
          }
        }
        tx.commit()?;
        Ok(None)
      })
      .await?;

    if let Some((kind, code)) = conflict {
      return Err(Error::DuplicateKey { kind, code });
    }
    self.pending.clear();
    Ok(())
  }

  async fn rollback(&mut self) -> Result<()> {
    self.pending.clear();
    Ok(())
  }
}

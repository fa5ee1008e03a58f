//! Error type for `rome-store-sqlite`.

use rome_core::{ResourceKind, store::StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A staged row's code already exists in its table.
  #[error("duplicate key {code:?} in table {}", kind.table())]
  DuplicateKey { kind: ResourceKind, code: String },
}

impl StoreError for Error {
  fn is_duplicate_key(&self) -> bool { matches!(self, Self::DuplicateKey { .. }) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

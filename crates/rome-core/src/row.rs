//! [`PersistedRow`]: a detail record flattened for storage.

use chrono::{DateTime, Utc};

use crate::{Result, kind::ResourceKind, schema::DetailRecord};

/// One stored entry, keyed by `code` within its kind's table.
///
/// Nested cross-references travel inside `payload` as the upstream snapshot;
/// they are never resolved against other tables.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedRow {
  pub kind:          ResourceKind,
  pub code:          String,
  pub libelle:       String,
  /// The full detail record as compact JSON.
  pub payload:       String,
  pub downloaded_at: DateTime<Utc>,
}

impl PersistedRow {
  pub fn from_detail(
    record: &DetailRecord,
    downloaded_at: DateTime<Utc>,
  ) -> Result<Self> {
    Ok(Self {
      kind: record.kind(),
      code: record.code().to_owned(),
      libelle: record.libelle().to_owned(),
      payload: record.to_json()?.to_string(),
      downloaded_at,
    })
  }
}

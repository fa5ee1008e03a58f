//! Conversions between [`PersistedRow`] and the plain-text columns stored in
//! SQLite. Timestamps are RFC 3339 strings.

use chrono::{DateTime, Utc};
use rome_core::{PersistedRow, ResourceKind};

use crate::{Error, Result};

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// Column values for one row, owned so they can cross into the database
/// thread.
pub struct RawRow {
  pub kind:          ResourceKind,
  pub code:          String,
  pub libelle:       String,
  pub payload:       String,
  pub downloaded_at: String,
}

impl RawRow {
  pub fn from_row(row: &PersistedRow) -> Self {
    Self {
      kind:          row.kind,
      code:          row.code.clone(),
      libelle:       row.libelle.clone(),
      payload:       row.payload.clone(),
      downloaded_at: encode_dt(row.downloaded_at),
    }
  }

  pub fn into_row(self) -> Result<PersistedRow> {
    Ok(PersistedRow {
      kind:          self.kind,
      code:          self.code,
      libelle:       self.libelle,
      payload:       self.payload,
      downloaded_at: decode_dt(&self.downloaded_at)?,
    })
  }
}

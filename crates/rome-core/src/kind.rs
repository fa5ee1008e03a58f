//! Resource kinds: the taxonomy categories exposed by the ROME API.
//!
//! Every kind maps, at compile time, to its upstream path segment, its table
//! name and the parser for its detail payload.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  schema::{self, DetailRecord, Summary},
};

/// One category of the ROME nomenclature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
  Domains,
  MacroDomains,
  Themes,
  Occupations,
  Appellations,
}

impl ResourceKind {
  /// Every kind, in the order a full download visits them.
  pub const ALL: [ResourceKind; 5] = [
    ResourceKind::Domains,
    ResourceKind::MacroDomains,
    ResourceKind::Themes,
    ResourceKind::Occupations,
    ResourceKind::Appellations,
  ];

  /// Path segment under the API base URL for both list and detail calls.
  pub fn path_segment(self) -> &'static str {
    match self {
      Self::Domains => "domaine-professionnel",
      Self::MacroDomains => "grand-domaine",
      Self::Themes => "theme",
      Self::Occupations => "metier",
      Self::Appellations => "appellation",
    }
  }

  /// Name of the table holding this kind's rows.
  pub fn table(self) -> &'static str {
    match self {
      Self::Domains => "domaines",
      Self::MacroDomains => "grands_domaines",
      Self::Themes => "themes",
      Self::Occupations => "metiers",
      Self::Appellations => "appellations",
    }
  }

  /// Canonical lowercase name, also accepted by [`FromStr`].
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Domains => "domains",
      Self::MacroDomains => "macro-domains",
      Self::Themes => "themes",
      Self::Occupations => "occupations",
      Self::Appellations => "appellations",
    }
  }

  /// `{base}/{segment}`
  pub fn list_url(self, base: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), self.path_segment())
  }

  /// Parse a list response body into summary records.
  pub fn parse_list(self, body: &str) -> Result<Vec<Summary>> {
    schema::parse_summaries(self, body)
  }

  /// Parse a detail response body into the record type for this kind.
  pub fn parse_detail(self, body: &str) -> Result<DetailRecord> {
    match self {
      Self::Domains => schema::parse(self, body).map(DetailRecord::Domain),
      Self::MacroDomains => {
        schema::parse(self, body).map(DetailRecord::MacroDomain)
      }
      Self::Themes => schema::parse(self, body).map(DetailRecord::Theme),
      Self::Occupations => {
        schema::parse(self, body).map(DetailRecord::Occupation)
      }
      Self::Appellations => {
        schema::parse(self, body).map(DetailRecord::Appellation)
      }
    }
  }
}

impl fmt::Display for ResourceKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.pad(self.as_str())
  }
}

impl FromStr for ResourceKind {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    Self::ALL
      .into_iter()
      .find(|k| k.as_str() == s || k.path_segment() == s || k.table() == s)
      .ok_or_else(|| Error::UnknownKind(s.to_owned()))
  }
}

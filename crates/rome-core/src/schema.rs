//! Typed records for ROME API payloads and the fallible parsers that build
//! them.
//!
//! Required fields that are missing or mistyped reject the whole payload.
//! Optional fields default to `None`, and an optional field whose value does
//! not fit its type is also read as `None`. Optional lists keep their
//! well-formed elements and drop the rest. Unknown fields are ignored.

use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::debug;

use crate::{Error, Result, kind::ResourceKind};

/// Read an optional field, treating an ill-typed value as absent.
fn lenient<'de, D, T>(de: D) -> std::result::Result<Option<T>, D::Error>
where
  D: Deserializer<'de>,
  T: DeserializeOwned,
{
  let value = Value::deserialize(de)?;
  if value.is_null() {
    return Ok(None);
  }
  match T::deserialize(value) {
    Ok(v) => Ok(Some(v)),
    Err(error) => {
      debug!(%error, "discarding malformed optional field");
      Ok(None)
    }
  }
}

/// Read an optional list, keeping the well-formed elements. A value that is
/// not an array is read as absent.
fn lenient_list<'de, D, T>(de: D) -> std::result::Result<Option<Vec<T>>, D::Error>
where
  D: Deserializer<'de>,
  T: DeserializeOwned,
{
  let items = match Value::deserialize(de)? {
    Value::Null => return Ok(None),
    Value::Array(items) => items,
    other => {
      debug!(found = %other, "discarding optional list that is not an array");
      return Ok(None);
    }
  };
  let kept = items
    .into_iter()
    .enumerate()
    .filter_map(|(index, item)| {
      T::deserialize(item)
        .inspect_err(|error| debug!(index, %error, "discarding malformed list element"))
        .ok()
    })
    .collect();
  Ok(Some(kept))
}

// ─── List items ──────────────────────────────────────────────────────────────

/// Minimal list entry; only used to drive detail fetches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
  pub code:    String,
  pub libelle: String,
}

// ─── Nested references ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetenceEsco {
  pub uri:     String,
  pub libelle: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Competence {
  pub code:     String,
  pub libelle:  String,
  pub code_ogr: String,
  #[serde(rename = "type")]
  pub kind:     String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetenceCle {
  pub competence: Competence,
  pub frequence:  i64,
}

/// A `{code, libelle}` pair used by NAF divisions, formacodes and work
/// contexts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeLabel {
  pub code:    String,
  pub libelle: String,
}

pub type DivisionNaf = CodeLabel;
pub type Formacode = CodeLabel;
pub type ContexteTravail = CodeLabel;

// ─── Detail records ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroDomain {
  pub code:                    String,
  pub libelle:                 String,
  #[serde(default, deserialize_with = "lenient_list")]
  pub domaine_professionnels:  Option<Vec<Domain>>,
  #[serde(default, deserialize_with = "lenient_list")]
  pub metiers:                 Option<Vec<Occupation>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
  pub code:          String,
  pub libelle:       String,
  #[serde(default, deserialize_with = "lenient")]
  pub grand_domaine: Option<Box<MacroDomain>>,
  #[serde(default, deserialize_with = "lenient_list")]
  pub metiers:       Option<Vec<Occupation>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
  pub code:       String,
  pub libelle:    String,
  #[serde(default, deserialize_with = "lenient")]
  pub definition: Option<String>,
  /// Occupation codes attached to the theme.
  #[serde(default, deserialize_with = "lenient_list")]
  pub metiers:    Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Occupation {
  pub code:                       String,
  pub libelle:                    String,
  #[serde(default, deserialize_with = "lenient")]
  pub definition:                 Option<String>,
  #[serde(default, deserialize_with = "lenient")]
  pub acces_emploi:               Option<String>,
  #[serde(default, deserialize_with = "lenient")]
  pub riasec_majeur:              Option<String>,
  #[serde(default, deserialize_with = "lenient")]
  pub riasec_mineur:              Option<String>,
  #[serde(default, deserialize_with = "lenient")]
  pub transition_ecologique:      Option<bool>,
  #[serde(default, deserialize_with = "lenient")]
  pub transition_numerique:       Option<bool>,
  #[serde(default, deserialize_with = "lenient")]
  pub code_isco:                  Option<String>,
  #[serde(default, deserialize_with = "lenient")]
  pub domaine_professionnel:      Option<Box<Domain>>,
  #[serde(default, deserialize_with = "lenient_list")]
  pub appellations:               Option<Vec<Appellation>>,
  #[serde(default, deserialize_with = "lenient_list")]
  pub themes:                     Option<Vec<Theme>>,
  #[serde(default, deserialize_with = "lenient_list")]
  pub competences_mobilisees:     Option<Vec<Competence>>,
  #[serde(default, deserialize_with = "lenient_list")]
  pub divisions_naf:              Option<Vec<DivisionNaf>>,
  #[serde(default, deserialize_with = "lenient_list")]
  pub formacodes:                 Option<Vec<Formacode>>,
  #[serde(default, deserialize_with = "lenient_list")]
  pub contextes_travail:          Option<Vec<ContexteTravail>>,
  #[serde(default, deserialize_with = "lenient_list")]
  pub metiers_proches:            Option<Vec<Occupation>>,
  #[serde(default, deserialize_with = "lenient_list")]
  pub metiers_envisageables:      Option<Vec<Occupation>>,
  #[serde(default, deserialize_with = "lenient_list")]
  pub appellations_proches:       Option<Vec<Appellation>>,
  #[serde(default, deserialize_with = "lenient_list")]
  pub appellations_envisageables: Option<Vec<Appellation>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appellation {
  pub code:                       String,
  pub libelle:                    String,
  #[serde(default, deserialize_with = "lenient")]
  pub libelle_court:              Option<String>,
  #[serde(default, deserialize_with = "lenient")]
  pub emploi_cadre:               Option<bool>,
  #[serde(default, deserialize_with = "lenient")]
  pub emploi_reglemente:          Option<bool>,
  #[serde(default, deserialize_with = "lenient")]
  pub transition_ecologique:      Option<bool>,
  #[serde(default, deserialize_with = "lenient")]
  pub transition_numerique:       Option<bool>,
  #[serde(default, deserialize_with = "lenient")]
  pub classification:             Option<String>,
  #[serde(default, deserialize_with = "lenient")]
  pub metier:                     Option<Box<Occupation>>,
  #[serde(default, deserialize_with = "lenient")]
  pub appellation_esco:           Option<CompetenceEsco>,
  #[serde(default, deserialize_with = "lenient_list")]
  pub competences_cles:           Option<Vec<CompetenceCle>>,
  #[serde(default, deserialize_with = "lenient_list")]
  pub metiers_proches:            Option<Vec<Occupation>>,
  #[serde(default, deserialize_with = "lenient_list")]
  pub metiers_envisageables:      Option<Vec<Occupation>>,
  #[serde(default, deserialize_with = "lenient_list")]
  pub appellations_proches:       Option<Vec<Appellation>>,
  #[serde(default, deserialize_with = "lenient_list")]
  pub appellations_envisageables: Option<Vec<Appellation>>,
}

/// A validated detail payload, tagged with the kind it was fetched as.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailRecord {
  Domain(Domain),
  MacroDomain(MacroDomain),
  Theme(Theme),
  Occupation(Occupation),
  Appellation(Appellation),
}

impl DetailRecord {
  pub fn kind(&self) -> ResourceKind {
    match self {
      Self::Domain(_) => ResourceKind::Domains,
      Self::MacroDomain(_) => ResourceKind::MacroDomains,
      Self::Theme(_) => ResourceKind::Themes,
      Self::Occupation(_) => ResourceKind::Occupations,
      Self::Appellation(_) => ResourceKind::Appellations,
    }
  }

  pub fn code(&self) -> &str {
    match self {
      Self::Domain(r) => &r.code,
      Self::MacroDomain(r) => &r.code,
      Self::Theme(r) => &r.code,
      Self::Occupation(r) => &r.code,
      Self::Appellation(r) => &r.code,
    }
  }

  pub fn libelle(&self) -> &str {
    match self {
      Self::Domain(r) => &r.libelle,
      Self::MacroDomain(r) => &r.libelle,
      Self::Theme(r) => &r.libelle,
      Self::Occupation(r) => &r.libelle,
      Self::Appellation(r) => &r.libelle,
    }
  }

  /// The record as a JSON value, in the upstream field naming.
  pub fn to_json(&self) -> Result<serde_json::Value> {
    let value = match self {
      Self::Domain(r) => serde_json::to_value(r)?,
      Self::MacroDomain(r) => serde_json::to_value(r)?,
      Self::Theme(r) => serde_json::to_value(r)?,
      Self::Occupation(r) => serde_json::to_value(r)?,
      Self::Appellation(r) => serde_json::to_value(r)?,
    };
    Ok(value)
  }
}

// ─── Parsers ─────────────────────────────────────────────────────────────────

/// Parse one record of type `T` fetched as `kind`.
pub fn parse<T: DeserializeOwned>(kind: ResourceKind, body: &str) -> Result<T> {
  serde_json::from_str(body).map_err(|source| Error::Validation { kind, source })
}

/// Parse a list response. Every entry must carry a non-empty code.
pub fn parse_summaries(kind: ResourceKind, body: &str) -> Result<Vec<Summary>> {
  let summaries: Vec<Summary> = parse(kind, body)?;
  if let Some(index) = summaries.iter().position(|s| s.code.trim().is_empty()) {
    return Err(Error::EmptyCode { kind, index });
  }
  Ok(summaries)
}

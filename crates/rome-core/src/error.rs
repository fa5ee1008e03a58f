//! Error types for `rome-core`.

use thiserror::Error;

use crate::kind::ResourceKind;

#[derive(Debug, Error)]
pub enum Error {
  /// A payload did not match the expected record shape.
  #[error("validation error for {kind}: {source}")]
  Validation {
    kind:   ResourceKind,
    #[source]
    source: serde_json::Error,
  },

  #[error("{kind} summary record at position {index} has an empty code")]
  EmptyCode { kind: ResourceKind, index: usize },

  #[error("unknown resource kind: {0:?}")]
  UnknownKind(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  pub fn is_validation(&self) -> bool {
    matches!(self, Self::Validation { .. } | Self::EmptyCode { .. })
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

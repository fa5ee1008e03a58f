//! Error type for `rome-ingest`.

use rome_core::ResourceKind;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Anything that aborts a run. Duplicate keys never surface here.
#[derive(Debug, Error)]
pub enum Error {
  #[error("source error: {0}")]
  Source(#[source] BoxError),

  #[error("store error: {0}")]
  Store(#[source] BoxError),

  #[error("cannot convert {kind} {code} into a row: {source}")]
  Convert {
    kind:   ResourceKind,
    code:   String,
    #[source]
    source: rome_core::Error,
  },
}

impl Error {
  /// The source or store error, if it is an `E`.
  pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
    match self {
      Self::Source(e) | Self::Store(e) => e.downcast_ref(),
      Self::Convert { .. } => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

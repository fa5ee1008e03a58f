//! Error type for `rome-client`.

use rome_core::source::SourceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Credentials are missing from both explicit input and the environment.
  #[error("configuration error: {0}")]
  Configuration(String),

  /// DNS, timeout, reset or body-read failure.
  #[error("exception on ROME request URL={url}: {message}")]
  Connection { url: String, message: String },

  /// The upstream answered with a status other than 200.
  #[error("request failure, URL={url}: {failure}")]
  Request { url: String, failure: RequestFailure },

  #[error("malformed token response: {0}")]
  Token(String),

  #[error(transparent)]
  Validation(#[from] rome_core::Error),

  #[error("failed to build HTTP client: {0}")]
  Http(#[source] reqwest::Error),
}

/// Non-200 outcomes, by status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestFailure {
  #[error("400 bad request, reason: {reason}")]
  BadRequest { reason: String },

  #[error("401 unauthorized, check credentials")]
  Unauthorized,

  #[error("404 not found")]
  NotFound,

  #[error("429 requests quota exceeded")]
  QuotaExceeded,

  #[error("{status}: {body}")]
  Other { status: u16, body: String },
}

impl Error {
  /// The status failure, if this is a [`Error::Request`].
  pub fn failure(&self) -> Option<&RequestFailure> {
    match self {
      Self::Request { failure, .. } => Some(failure),
      _ => None,
    }
  }
}

impl SourceError for Error {
  fn is_quota_exceeded(&self) -> bool {
    matches!(self.failure(), Some(RequestFailure::QuotaExceeded))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

//! The `ResourceSource` trait: where summaries and detail records come from.
//!
//! Implemented by the HTTP client in `rome-client`. The ingestion pipeline
//! depends on this abstraction so it can be driven by any upstream.

use std::future::Future;

use crate::{
  kind::ResourceKind,
  schema::{DetailRecord, Summary},
};

/// Errors raised by a [`ResourceSource`].
pub trait SourceError: std::error::Error + Send + Sync + 'static {
  /// True when the upstream asked the caller to back off before retrying.
  fn is_quota_exceeded(&self) -> bool;
}

/// List and detail access for every [`ResourceKind`].
///
/// Implementations surface their errors unchanged and never retry.
pub trait ResourceSource: Send + Sync {
  type Error: SourceError;

  /// Fetch the summary list for `kind`.
  fn fetch_list(
    &self,
    kind: ResourceKind,
  ) -> impl Future<Output = Result<Vec<Summary>, Self::Error>> + Send + '_;

  /// Fetch and validate the detail record for `code`.
  fn fetch_detail<'a>(
    &'a self,
    kind: ResourceKind,
    code: &'a str,
  ) -> impl Future<Output = Result<DetailRecord, Self::Error>> + Send + 'a;
}

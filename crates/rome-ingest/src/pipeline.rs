//! [`Ingestor`]: the per-kind fetch, validate and persist loop.

use std::time::Duration;

use chrono::Utc;
use rome_core::{
  DetailRecord, PersistedRow, ResourceKind,
  source::{ResourceSource, SourceError},
  store::{RomeStore, StoreError},
};
use serde::Serialize;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::{Error, Result};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Client-side throttling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
  /// Pause before each list call.
  pub list_delay:    Duration,
  /// Pause before each detail call.
  pub detail_delay:  Duration,
  /// Wait before the single retry of a quota-exceeded detail call.
  pub quota_backoff: Duration,
}

impl Default for PipelineConfig {
  fn default() -> Self {
    Self {
      list_delay:    Duration::from_secs(2),
      detail_delay:  Duration::from_millis(500),
      quota_backoff: Duration::from_secs(2),
    }
  }
}

impl PipelineConfig {
  /// No pauses at all; for fakes and local upstreams.
  pub fn without_delays() -> Self {
    Self {
      list_delay:    Duration::ZERO,
      detail_delay:  Duration::ZERO,
      quota_backoff: Duration::ZERO,
    }
  }
}

// ─── Report ───────────────────────────────────────────────────────────────────

/// Outcome of one [`Ingestor::download_one`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KindReport {
  pub kind:      ResourceKind,
  /// Length of the summary list.
  pub listed:    usize,
  /// Summaries whose detail was fetched and committed or skipped.
  pub processed: usize,
  pub stored:    usize,
  /// Rows discarded because their key already existed.
  pub skipped:   usize,
}

impl KindReport {
  fn new(kind: ResourceKind) -> Self {
    Self { kind, listed: 0, processed: 0, stored: 0, skipped: 0 }
  }
}

// ─── Ingestor ─────────────────────────────────────────────────────────────────

/// Drives one source into one store, one item and one commit at a time.
pub struct Ingestor<Src, St> {
  source: Src,
  store:  St,
  config: PipelineConfig,
}

fn source_err<E: SourceError>(e: E) -> Error { Error::Source(Box::new(e)) }

fn store_err<E: StoreError>(e: E) -> Error { Error::Store(Box::new(e)) }

impl<Src, St> Ingestor<Src, St>
where
  Src: ResourceSource,
  St: RomeStore,
{
  pub fn new(source: Src, store: St, config: PipelineConfig) -> Self {
    Self { source, store, config }
  }

  pub fn source(&self) -> &Src { &self.source }

  pub fn store(&self) -> &St { &self.store }

  pub fn config(&self) -> &PipelineConfig { &self.config }

  pub fn into_parts(self) -> (Src, St) { (self.source, self.store) }

  /// Fetch every `kind` summary, then fetch, convert and commit each detail
  /// in list order.
  ///
  /// A row whose key already exists is logged, rolled back and skipped. Any
  /// other failure aborts and is returned.
  pub async fn download_one(&mut self, kind: ResourceKind) -> Result<KindReport> {
    let mut report = KindReport::new(kind);
    self.store.ensure_table(kind).await.map_err(store_err)?;

    sleep(self.config.list_delay).await;
    let summaries = self.source.fetch_list(kind).await.map_err(source_err)?;
    report.listed = summaries.len();
    info!(%kind, listed = report.listed, "got list of {kind} with {} elements", report.listed);

    for summary in &summaries {
      sleep(self.config.detail_delay).await;
      let record = self
        .fetch_detail_with_retry(kind, &summary.code)
        .await
        .map_err(source_err)?;

      let row = PersistedRow::from_detail(&record, Utc::now()).map_err(|source| {
        Error::Convert { kind, code: summary.code.clone(), source }
      })?;
      self.store.insert(row).await.map_err(store_err)?;

      match self.store.commit().await {
        Ok(()) => {
          report.stored += 1;
          info!(%kind, code = %summary.code, "element downloaded into database");
        }
        Err(e) if e.is_duplicate_key() => {
          warn!(%kind, code = %summary.code, error = %e, "duplicate key, element skipped");
          self.store.rollback().await.map_err(store_err)?;
          report.skipped += 1;
        }
        Err(e) => return Err(store_err(e)),
      }
      report.processed += 1;
    }

    info!(
      %kind,
      processed = report.processed,
      stored = report.stored,
      skipped = report.skipped,
      "list of {kind} with {} elements finished",
      report.listed
    );
    Ok(report)
  }

  /// One detail call, retried exactly once after a quota-exceeded signal.
  async fn fetch_detail_with_retry(
    &self,
    kind: ResourceKind,
    code: &str,
  ) -> std::result::Result<DetailRecord, Src::Error> {
    match self.source.fetch_detail(kind, code).await {
      Err(e) if e.is_quota_exceeded() => {
        warn!(
          %kind,
          code,
          backoff_ms = self.config.quota_backoff.as_millis() as u64,
          "exceeded requests quota, retrying after backoff"
        );
        sleep(self.config.quota_backoff).await;
        self.source.fetch_detail(kind, code).await
      }
      other => other,
    }
  }
}

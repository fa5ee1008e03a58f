//! The job runner: every resource kind through one [`Ingestor`].

use anyhow::Context as _;
use rome_client::RomeClient;
use rome_core::{ResourceKind, source::ResourceSource, store::RomeStore};
use rome_store_sqlite::SqliteStore;
use serde::Serialize;
use tracing::{error, info};

use crate::{IngestConfig, Ingestor, KindReport, Result};

/// Per-kind reports of one run, in visiting order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
  pub kinds: Vec<KindReport>,
}

impl RunReport {
  pub fn processed(&self) -> usize { self.kinds.iter().map(|k| k.processed).sum() }

  pub fn stored(&self) -> usize { self.kinds.iter().map(|k| k.stored).sum() }

  pub fn skipped(&self) -> usize { self.kinds.iter().map(|k| k.skipped).sum() }
}

/// `requested` in canonical order without repeats; everything when empty.
pub fn select_kinds(requested: &[ResourceKind]) -> Vec<ResourceKind> {
  ResourceKind::ALL
    .into_iter()
    .filter(|k| requested.is_empty() || requested.contains(k))
    .collect()
}

impl<Src, St> Ingestor<Src, St>
where
  Src: ResourceSource,
  St: RomeStore,
{
  /// Run [`download_one`](Self::download_one) for each selected kind, in
  /// order. The first failure aborts the run.
  pub async fn download_all(&mut self, requested: &[ResourceKind]) -> Result<RunReport> {
    let kinds = select_kinds(requested);
    let mut report = RunReport::default();

    for kind in kinds {
      info!(%kind, "start job to download {kind}");
      match self.download_one(kind).await {
        Ok(kind_report) => {
          info!(%kind, stored = kind_report.stored, "end of job for {kind}");
          report.kinds.push(kind_report);
        }
        Err(e) => {
          error!(%kind, error = %e, "job for {kind} aborted");
          return Err(e);
        }
      }
    }

    info!(
      jobs = report.kinds.len(),
      processed = report.processed(),
      stored = report.stored(),
      skipped = report.skipped(),
      "all of the {} jobs are finished",
      report.kinds.len()
    );
    Ok(report)
  }
}

/// Authenticate, open the store at `config.store_path`, and download the
/// requested kinds.
pub async fn run(config: &IngestConfig, requested: &[ResourceKind]) -> anyhow::Result<RunReport> {
  let client = RomeClient::connect(config.credential_source(), config.api.clone())
    .await
    .context("failed to authenticate against the ROME API")?;

  let store = SqliteStore::open(&config.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", config.store_path))?;

  let mut ingestor = Ingestor::new(client, store, config.pipeline_config());
  let report = ingestor.download_all(requested).await?;
  Ok(report)
}

//! Pipeline tests: a scripted in-memory source feeding an in-memory
//! `SqliteStore`.

use std::{
  collections::HashMap,
  sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
  },
  time::Duration,
};

use rome_client::{Error as ClientError, RequestFailure};
use rome_core::{DetailRecord, ResourceKind, Summary, source::ResourceSource};
use rome_store_sqlite::SqliteStore;
use tokio::time::Instant;

use crate::{Error, Ingestor, PipelineConfig, runner::select_kinds};

// ─── Scripted source ─────────────────────────────────────────────────────────

#[derive(Default)]
struct ScriptedSource {
  lists:        HashMap<ResourceKind, Vec<Summary>>,
  /// Detail bodies by code; codes without an entry get a minimal valid body.
  bodies:       HashMap<String, String>,
  /// Fixed failures by code.
  failures:     HashMap<String, RequestFailure>,
  /// Remaining quota-exceeded answers by code.
  quota:        Mutex<HashMap<String, usize>>,
  list_calls:   AtomicUsize,
  detail_calls: AtomicUsize,
  /// Every detail call, in order.
  log:          Mutex<Vec<(ResourceKind, String)>>,
}

impl ScriptedSource {
  fn with_list(mut self, kind: ResourceKind, codes: &[&str]) -> Self {
    let list = codes
      .iter()
      .map(|c| Summary { code: (*c).into(), libelle: format!("libellé {c}") })
      .collect();
    self.lists.insert(kind, list);
    self
  }

  fn with_body(mut self, code: &str, body: &str) -> Self {
    self.bodies.insert(code.into(), body.into());
    self
  }

  fn with_failure(mut self, code: &str, failure: RequestFailure) -> Self {
    self.failures.insert(code.into(), failure);
    self
  }

  fn with_quota(self, code: &str, times: usize) -> Self {
    self.quota.lock().unwrap().insert(code.into(), times);
    self
  }

  fn request_error(kind: ResourceKind, code: &str, failure: RequestFailure) -> ClientError {
    ClientError::Request {
      url: format!("{}/{code}", kind.list_url("http://upstream.test/metiers")),
      failure,
    }
  }
}

impl ResourceSource for ScriptedSource {
  type Error = ClientError;

  async fn fetch_list(&self, kind: ResourceKind) -> Result<Vec<Summary>, ClientError> {
    self.list_calls.fetch_add(1, Ordering::SeqCst);
    Ok(self.lists.get(&kind).cloned().unwrap_or_default())
  }

  async fn fetch_detail(
    &self,
    kind: ResourceKind,
    code: &str,
  ) -> Result<DetailRecord, ClientError> {
    self.detail_calls.fetch_add(1, Ordering::SeqCst);
    self.log.lock().unwrap().push((kind, code.to_owned()));

    let throttled = match self.quota.lock().unwrap().get_mut(code) {
      Some(left) if *left > 0 => {
        *left -= 1;
        true
      }
      _ => false,
    };
    if throttled {
      return Err(Self::request_error(kind, code, RequestFailure::QuotaExceeded));
    }
    if let Some(failure) = self.failures.get(code) {
      return Err(Self::request_error(kind, code, failure.clone()));
    }

    let body = self
      .bodies
      .get(code)
      .cloned()
      .unwrap_or_else(|| format!(r#"{{ "code": "{code}", "libelle": "libellé {code}" }}"#));
    Ok(kind.parse_detail(&body)?)
  }
}

async fn ingestor(source: ScriptedSource) -> Ingestor<ScriptedSource, SqliteStore> {
  let store = SqliteStore::open_in_memory().await.expect("in-memory store");
  Ingestor::new(source, store, PipelineConfig::without_delays())
}

fn failure_of(err: &Error) -> Option<&RequestFailure> {
  err.downcast_ref::<ClientError>().and_then(ClientError::failure)
}

// ─── Call counts ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn one_list_call_and_one_detail_call_per_item() {
  for kind in ResourceKind::ALL {
    let source = ScriptedSource::default().with_list(kind, &["C1", "C2", "C3"]);
    let mut ing = ingestor(source).await;

    let report = ing.download_one(kind).await.unwrap();

    assert_eq!(ing.source().list_calls.load(Ordering::SeqCst), 1);
    assert_eq!(ing.source().detail_calls.load(Ordering::SeqCst), 3);
    assert_eq!(report.listed, 3);
    assert_eq!(report.processed, 3);
    assert_eq!(report.stored, 3);
    assert_eq!(ing.store().count(kind).await.unwrap(), 3);
  }
}

#[tokio::test]
async fn details_are_fetched_in_list_order() {
  let source = ScriptedSource::default().with_list(ResourceKind::Themes, &["T03", "T01", "T02"]);
  let mut ing = ingestor(source).await;
  ing.download_one(ResourceKind::Themes).await.unwrap();

  let log = ing.source().log.lock().unwrap().clone();
  let codes: Vec<_> = log.iter().map(|(_, c)| c.as_str()).collect();
  assert_eq!(codes, ["T03", "T01", "T02"]);
}

#[tokio::test]
async fn empty_list_completes_with_nothing_stored() {
  let mut ing = ingestor(ScriptedSource::default()).await;
  let report = ing.download_one(ResourceKind::Appellations).await.unwrap();

  assert_eq!(report.listed, 0);
  assert_eq!(report.processed, 0);
  assert_eq!(ing.source().detail_calls.load(Ordering::SeqCst), 0);
  assert_eq!(ing.store().count(ResourceKind::Appellations).await.unwrap(), 0);
}

// ─── Idempotence ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn rerun_skips_every_existing_row() {
  let source = ScriptedSource::default().with_list(ResourceKind::Domains, &["A11", "A12", "A13"]);
  let mut ing = ingestor(source).await;

  let first = ing.download_one(ResourceKind::Domains).await.unwrap();
  let second = ing.download_one(ResourceKind::Domains).await.unwrap();

  assert_eq!((first.stored, first.skipped), (3, 0));
  assert_eq!((second.stored, second.skipped), (0, 3));
  assert_eq!(second.processed, 3);
  assert_eq!(ing.store().count(ResourceKind::Domains).await.unwrap(), 3);
  assert_eq!(ing.store().pending(), 0);
}

// ─── Quota retry ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn single_quota_signal_is_retried_once() {
  let source = ScriptedSource::default()
    .with_list(ResourceKind::Occupations, &["A1101", "A1202"])
    .with_quota("A1202", 1);
  let mut ing = ingestor(source).await;

  let report = ing.download_one(ResourceKind::Occupations).await.unwrap();

  assert_eq!(report.stored, 2);
  assert_eq!(ing.source().detail_calls.load(Ordering::SeqCst), 3);
  assert!(
    ing
      .store()
      .get(ResourceKind::Occupations, "A1202")
      .await
      .unwrap()
      .is_some()
  );
}

#[tokio::test]
async fn second_quota_signal_aborts_the_run() {
  let source = ScriptedSource::default()
    .with_list(ResourceKind::Occupations, &["A1101", "A1202", "A1203"])
    .with_quota("A1202", 2);
  let mut ing = ingestor(source).await;

  let err = ing.download_one(ResourceKind::Occupations).await.unwrap_err();

  assert_eq!(failure_of(&err), Some(&RequestFailure::QuotaExceeded));
  // A1101 once, A1202 twice, A1203 never.
  assert_eq!(ing.source().detail_calls.load(Ordering::SeqCst), 3);
  assert_eq!(ing.store().count(ResourceKind::Occupations).await.unwrap(), 1);
}

#[tokio::test]
async fn quota_retry_is_not_applied_to_other_failures() {
  let source = ScriptedSource::default()
    .with_list(ResourceKind::Themes, &["T01"])
    .with_failure("T01", RequestFailure::Other { status: 503, body: "down".into() });
  let mut ing = ingestor(source).await;

  ing.download_one(ResourceKind::Themes).await.unwrap_err();
  assert_eq!(ing.source().detail_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn pauses_before_lists_details_and_the_quota_retry() {
  let config = PipelineConfig {
    list_delay:    Duration::from_secs(2),
    detail_delay:  Duration::from_millis(500),
    quota_backoff: Duration::from_secs(7),
  };
  let source = ScriptedSource::default()
    .with_list(ResourceKind::Appellations, &["10001", "10002"])
    .with_quota("10002", 1);
  let store = SqliteStore::open_in_memory().await.unwrap();
  let mut ing = Ingestor::new(source, store, config.clone());

  let started = Instant::now();
  let report = ing.download_one(ResourceKind::Appellations).await.unwrap();

  assert_eq!(report.stored, 2);
  assert_eq!(
    started.elapsed(),
    config.list_delay + 2 * config.detail_delay + config.quota_backoff
  );
}

#[tokio::test(start_paused = true)]
async fn no_backoff_without_a_quota_signal() {
  let config = PipelineConfig {
    list_delay:    Duration::from_secs(1),
    detail_delay:  Duration::from_millis(250),
    quota_backoff: Duration::from_secs(60),
  };
  let source = ScriptedSource::default().with_list(ResourceKind::Themes, &["T01", "T02", "T03"]);
  let store = SqliteStore::open_in_memory().await.unwrap();
  let mut ing = Ingestor::new(source, store, config.clone());

  let started = Instant::now();
  ing.download_one(ResourceKind::Themes).await.unwrap();

  assert_eq!(started.elapsed(), config.list_delay + 3 * config.detail_delay);
}

// ─── Status failures ─────────────────────────────────────────────────────────

#[tokio::test]
async fn not_found_aborts_and_leaves_store_untouched() {
  let source = ScriptedSource::default()
    .with_list(ResourceKind::Appellations, &["10001"])
    .with_failure("10001", RequestFailure::NotFound);
  let mut ing = ingestor(source).await;

  let err = ing.download_one(ResourceKind::Appellations).await.unwrap_err();

  assert_eq!(failure_of(&err), Some(&RequestFailure::NotFound));
  assert_eq!(ing.store().count(ResourceKind::Appellations).await.unwrap(), 0);
  assert_eq!(ing.store().pending(), 0);
}

#[tokio::test]
async fn unauthorized_aborts_and_leaves_store_untouched() {
  let source = ScriptedSource::default()
    .with_list(ResourceKind::Domains, &["A11"])
    .with_failure("A11", RequestFailure::Unauthorized);
  let mut ing = ingestor(source).await;

  let err = ing.download_one(ResourceKind::Domains).await.unwrap_err();

  assert_eq!(failure_of(&err), Some(&RequestFailure::Unauthorized));
  assert_eq!(ing.store().count(ResourceKind::Domains).await.unwrap(), 0);
}

#[tokio::test]
async fn invalid_detail_payload_aborts() {
  let source = ScriptedSource::default()
    .with_list(ResourceKind::Themes, &["T01", "T02"])
    .with_body("T02", r#"{ "code": "T02" }"#);
  let mut ing = ingestor(source).await;

  let err = ing.download_one(ResourceKind::Themes).await.unwrap_err();

  assert!(matches!(
    err.downcast_ref::<ClientError>(),
    Some(ClientError::Validation(e)) if e.is_validation()
  ));
  assert_eq!(ing.store().count(ResourceKind::Themes).await.unwrap(), 1);
}

// ─── Duplicate keys ──────────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_detail_key_is_skipped() {
  // The upstream answers A12 with A11's record, so the second commit collides.
  let source = ScriptedSource::default()
    .with_list(ResourceKind::Domains, &["A11", "A12"])
    .with_body("A12", r#"{ "code": "A11", "libelle": "Engins agricoles" }"#);
  let mut ing = ingestor(source).await;

  let report = ing.download_one(ResourceKind::Domains).await.unwrap();

  assert_eq!(report.processed, 2);
  assert_eq!(report.stored, 1);
  assert_eq!(report.skipped, 1);
  assert_eq!(ing.store().count(ResourceKind::Domains).await.unwrap(), 1);
  let row = ing
    .store()
    .get(ResourceKind::Domains, "A11")
    .await
    .unwrap()
    .unwrap();
  assert_eq!(row.libelle, "libellé A11");
}

#[tokio::test]
async fn items_after_a_duplicate_are_still_stored() {
  let source = ScriptedSource::default()
    .with_list(ResourceKind::Domains, &["A11", "A12", "A13"])
    .with_body("A12", r#"{ "code": "A11", "libelle": "Engins agricoles" }"#);
  let mut ing = ingestor(source).await;

  let report = ing.download_one(ResourceKind::Domains).await.unwrap();

  assert_eq!((report.stored, report.skipped), (2, 1));
  assert!(ing.store().get(ResourceKind::Domains, "A13").await.unwrap().is_some());
}

// ─── Job runner ──────────────────────────────────────────────────────────────

#[test]
fn select_kinds_keeps_canonical_order() {
  assert_eq!(select_kinds(&[]), ResourceKind::ALL);
  assert_eq!(
    select_kinds(&[
      ResourceKind::Appellations,
      ResourceKind::Domains,
      ResourceKind::Appellations,
    ]),
    [ResourceKind::Domains, ResourceKind::Appellations]
  );
}

#[tokio::test]
async fn download_all_visits_every_kind_in_order() {
  let mut source = ScriptedSource::default();
  for kind in ResourceKind::ALL {
    let code = format!("{}-1", kind.table());
    source = source.with_list(kind, &[code.as_str()]);
  }
  let mut ing = ingestor(source).await;

  let report = ing.download_all(&[]).await.unwrap();

  let kinds: Vec<_> = report.kinds.iter().map(|k| k.kind).collect();
  assert_eq!(kinds, ResourceKind::ALL);
  assert_eq!(report.stored(), 5);
  assert_eq!(ing.source().list_calls.load(Ordering::SeqCst), 5);

  let log = ing.source().log.lock().unwrap().clone();
  let visited: Vec<_> = log.iter().map(|(k, _)| *k).collect();
  assert_eq!(visited, ResourceKind::ALL);
}

#[tokio::test]
async fn download_all_stops_at_the_first_failing_kind() {
  let source = ScriptedSource::default()
    .with_list(ResourceKind::Domains, &["A11"])
    .with_list(ResourceKind::MacroDomains, &["A"])
    .with_list(ResourceKind::Themes, &["T01"])
    .with_failure("A", RequestFailure::NotFound);
  let mut ing = ingestor(source).await;

  ing.download_all(&[]).await.unwrap_err();

  assert_eq!(ing.source().list_calls.load(Ordering::SeqCst), 2);
  assert_eq!(ing.store().count(ResourceKind::Domains).await.unwrap(), 1);
  assert_eq!(ing.store().count(ResourceKind::Themes).await.unwrap(), 0);
}

//! Runtime configuration, deserialised from `rome.toml` and `ROME_*`
//! environment variables.

use std::{path::PathBuf, time::Duration};

use rome_client::{ClientConfig, CredentialSource};
use serde::Deserialize;

use crate::PipelineConfig;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
  pub store_path:    PathBuf,
  /// Explicit credentials. When both are absent the client falls back to the
  /// environment variables named in `api`.
  pub client_id:     Option<String>,
  pub client_secret: Option<String>,
  pub api:           ClientConfig,
  pub pipeline:      PipelineSettings,
}

impl Default for IngestConfig {
  fn default() -> Self {
    Self {
      store_path:    PathBuf::from("rome.sqlite"),
      client_id:     None,
      client_secret: None,
      api:           ClientConfig::default(),
      pipeline:      PipelineSettings::default(),
    }
  }
}

/// [`PipelineConfig`] in milliseconds, as written in the config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
  pub list_delay_ms:    u64,
  pub detail_delay_ms:  u64,
  pub quota_backoff_ms: u64,
}

impl Default for PipelineSettings {
  fn default() -> Self {
    let d = PipelineConfig::default();
    Self {
      list_delay_ms:    d.list_delay.as_millis() as u64,
      detail_delay_ms:  d.detail_delay.as_millis() as u64,
      quota_backoff_ms: d.quota_backoff.as_millis() as u64,
    }
  }
}

impl IngestConfig {
  /// Layer `path` (optional) under `ROME_`-prefixed environment variables.
  /// Nested keys use `__`, e.g. `ROME_API__API_BASE_URL`.
  pub fn load(path: impl Into<PathBuf>) -> Result<Self, config::ConfigError> {
    Self::load_with(path, environment())
  }

  fn load_with(
    path: impl Into<PathBuf>,
    env: config::Environment,
  ) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path.into()).required(false))
      .add_source(env)
      .build()?
      .try_deserialize()
  }

  /// Explicit when either value is configured, otherwise the environment.
  pub fn credential_source(&self) -> CredentialSource {
    if self.client_id.is_none() && self.client_secret.is_none() {
      CredentialSource::Environment
    } else {
      CredentialSource::Explicit {
        client_id:     self.client_id.clone(),
        client_secret: self.client_secret.clone(),
      }
    }
  }

  pub fn pipeline_config(&self) -> PipelineConfig {
    PipelineConfig {
      list_delay:    Duration::from_millis(self.pipeline.list_delay_ms),
      detail_delay:  Duration::from_millis(self.pipeline.detail_delay_ms),
      quota_backoff: Duration::from_millis(self.pipeline.quota_backoff_ms),
    }
  }
}

/// `ROME_` prefix, `__` between nested keys.
fn environment() -> config::Environment {
  config::Environment::with_prefix("ROME")
    .prefix_separator("_")
    .separator("__")
    .try_parsing(true)
}

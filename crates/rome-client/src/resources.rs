//! Per-kind list and detail accessors.
//!
//! URLs and parsers come from [`ResourceKind`]; errors from the client pass
//! through unchanged and nothing here retries.

use reqwest::Url;
use rome_core::{DetailRecord, ResourceKind, Summary, source::ResourceSource};

use crate::{Error, Result, RomeClient};

impl RomeClient {
  /// `GET {base}/{segment}`
  pub async fn fetch_list(&self, kind: ResourceKind) -> Result<Vec<Summary>> {
    let url = kind.list_url(&self.config().api_base_url);
    let body = self.get_text(&url).await?;
    Ok(kind.parse_list(&body)?)
  }

  /// `GET {base}/{segment}/{code}`
  pub async fn fetch_detail(&self, kind: ResourceKind, code: &str) -> Result<DetailRecord> {
    let url = self.detail_url(kind, code)?;
    let body = self.get_text(&url).await?;
    Ok(kind.parse_detail(&body)?)
  }

  /// `{base}/{segment}/{code}`, with `code` percent-encoded as one path
  /// segment.
  pub fn detail_url(&self, kind: ResourceKind, code: &str) -> Result<String> {
    let base = &self.config().api_base_url;
    let invalid = || Error::Configuration(format!("api_base_url {base:?} cannot take a path"));

    let mut url = Url::parse(&kind.list_url(base)).map_err(|_| invalid())?;
    url
      .path_segments_mut()
      .map_err(|()| invalid())?
      .pop_if_empty()
      .push(code);
    Ok(url.into())
  }
}

impl ResourceSource for RomeClient {
  type Error = Error;

  async fn fetch_list(&self, kind: ResourceKind) -> Result<Vec<Summary>> {
    RomeClient::fetch_list(self, kind).await
  }

  async fn fetch_detail(&self, kind: ResourceKind, code: &str) -> Result<DetailRecord> {
    RomeClient::fetch_detail(self, kind, code).await
  }
}

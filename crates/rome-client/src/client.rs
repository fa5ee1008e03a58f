//! [`RomeClient`]: token exchange and the shared request executor.

use std::time::Duration;

use reqwest::{
  Client, Method, Response, StatusCode,
  header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue},
};
use serde::Deserialize;
use tracing::{debug, info};

use crate::{
  CredentialSource, Credentials,
  error::{Error, RequestFailure, Result},
};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

// ─── Configuration ────────────────────────────────────────────────────────────

/// Endpoints and fixed parameters of the upstream API.
///
/// The defaults target the production France Travail endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
  /// OAuth2 token endpoint.
  pub auth_url:          String,
  /// Value of the `realm` query parameter sent with the token request.
  pub realm:             String,
  pub scope:             String,
  /// Base URL under which every resource kind's path segment lives.
  pub api_base_url:      String,
  pub timeout_secs:      u64,
  /// Environment variable read for the client id in environment mode.
  pub client_id_var:     String,
  pub client_secret_var: String,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self {
      auth_url:          "https://entreprise.pole-emploi.fr/connexion/oauth2/access_token"
        .into(),
      realm:             "/partenaire".into(),
      scope:             "nomenclatureRome api_rome-competencesv1 api_rome-metiersv1 \
                          api_rome-contextes-travailv1"
        .into(),
      api_base_url:      "https://api.pole-emploi.io/partenaire/rome-metiers/v1/metiers"
        .into(),
      timeout_secs:      30,
      client_id_var:     "ENV_FT_CLIENT_ID".into(),
      client_secret_var: "ENV_FT_CLIENT_SECRET".into(),
    }
  }
}

// ─── Client ───────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct TokenResponse {
  access_token: String,
}

/// An authenticated ROME API client.
///
/// Only exists once the token exchange succeeded; the token is never
/// refreshed, so a run outliving it fails with
/// [`RequestFailure::Unauthorized`].
#[derive(Clone)]
pub struct RomeClient {
  http:          Client,
  config:        ClientConfig,
  authorization: HeaderValue,
}

impl RomeClient {
  /// Resolve credentials from `source`, then authenticate.
  ///
  /// Missing credentials fail with [`Error::Configuration`] before any
  /// network call.
  pub async fn connect(source: CredentialSource, config: ClientConfig) -> Result<Self> {
    let credentials = source.resolve(&config)?;
    Self::authenticate(credentials, config).await
  }

  /// Exchange `credentials` for a bearer token.
  pub async fn authenticate(credentials: Credentials, config: ClientConfig) -> Result<Self> {
    let http = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()
      .map_err(Error::Http)?;

    // Form content type only: the token request must not carry Authorization.
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
    let form = [
      ("grant_type", "client_credentials"),
      ("client_id", credentials.client_id.as_str()),
      ("client_secret", credentials.client_secret.as_str()),
      ("scope", config.scope.as_str()),
    ];

    let response = send(
      &http,
      Method::POST,
      &config.auth_url,
      headers,
      &[("realm", config.realm.as_str())],
      Some(&form),
    )
    .await?;
    let body = read_text(&config.auth_url, response).await?;

    let token: TokenResponse =
      serde_json::from_str(&body).map_err(|e| Error::Token(e.to_string()))?;
    if token.access_token.is_empty() {
      return Err(Error::Token("empty access_token".into()));
    }
    let mut authorization = HeaderValue::from_str(&format!("Bearer {}", token.access_token))
      .map_err(|e| Error::Token(e.to_string()))?;
    authorization.set_sensitive(true);

    info!(client_id = %credentials.client_id, "authenticated against ROME API");
    Ok(Self { http, config, authorization })
  }

  pub fn config(&self) -> &ClientConfig { &self.config }

  /// `GET url`. Without `headers`, the bearer token is attached.
  pub async fn get(
    &self,
    url: &str,
    headers: Option<HeaderMap>,
    params: &[(&str, &str)],
  ) -> Result<Response> {
    self.execute(Method::GET, url, headers, params, None).await
  }

  /// `POST url` with an optional form body. Without `headers`, the bearer
  /// token is attached.
  pub async fn post(
    &self,
    url: &str,
    headers: Option<HeaderMap>,
    params: &[(&str, &str)],
    form: Option<&[(&str, &str)]>,
  ) -> Result<Response> {
    self.execute(Method::POST, url, headers, params, form).await
  }

  /// `GET url` and return the body text.
  pub(crate) async fn get_text(&self, url: &str) -> Result<String> {
    let response = self.get(url, None, &[]).await?;
    read_text(url, response).await
  }

  fn default_headers(&self) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, self.authorization.clone());
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
    headers
  }

  async fn execute(
    &self,
    method: Method,
    url: &str,
    headers: Option<HeaderMap>,
    params: &[(&str, &str)],
    form: Option<&[(&str, &str)]>,
  ) -> Result<Response> {
    let headers = headers.unwrap_or_else(|| self.default_headers());
    send(&self.http, method, url, headers, params, form).await
  }
}

// ─── Executor ─────────────────────────────────────────────────────────────────

async fn send(
  http: &Client,
  method: Method,
  url: &str,
  headers: HeaderMap,
  params: &[(&str, &str)],
  form: Option<&[(&str, &str)]>,
) -> Result<Response> {
  debug!(%method, url, "ROME request");

  let mut request = http.request(method, url).headers(headers);
  if !params.is_empty() {
    request = request.query(params);
  }
  if let Some(form) = form {
    request = request.form(form);
  }

  let response = request.send().await.map_err(|e| Error::Connection {
    url:     url.to_owned(),
    message: e.to_string(),
  })?;
  check_status(url, response).await
}

/// Map every status except 200 to a [`RequestFailure`].
async fn check_status(url: &str, response: Response) -> Result<Response> {
  let status = response.status();
  let failure = match status {
    StatusCode::OK => return Ok(response),
    StatusCode::BAD_REQUEST => RequestFailure::BadRequest {
      reason: status.canonical_reason().unwrap_or_default().to_owned(),
    },
    StatusCode::UNAUTHORIZED => RequestFailure::Unauthorized,
    StatusCode::NOT_FOUND => RequestFailure::NotFound,
    StatusCode::TOO_MANY_REQUESTS => RequestFailure::QuotaExceeded,
    other => RequestFailure::Other {
      status: other.as_u16(),
      body:   response.text().await.unwrap_or_default(),
    },
  };
  Err(Error::Request { url: url.to_owned(), failure })
}

async fn read_text(url: &str, response: Response) -> Result<String> {
  response.text().await.map_err(|e| Error::Connection {
    url:     url.to_owned(),
    message: e.to_string(),
  })
}

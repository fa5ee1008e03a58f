//! Client credentials and where they come from.

use std::fmt;

use crate::{ClientConfig, Error, Result};

/// Where [`RomeClient::connect`](crate::RomeClient::connect) takes its
/// credentials from.
#[derive(Debug, Clone)]
pub enum CredentialSource {
  /// Values supplied by the caller; both must be present and non-empty.
  Explicit {
    client_id:     Option<String>,
    client_secret: Option<String>,
  },
  /// The two variables named by [`ClientConfig::client_id_var`] and
  /// [`ClientConfig::client_secret_var`].
  Environment,
}

/// A resolved client id and secret. Held in memory only.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
  pub client_id:     String,
  pub client_secret: String,
}

impl fmt::Debug for Credentials {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Credentials")
      .field("client_id", &self.client_id)
      .field("client_secret", &"<redacted>")
      .finish()
  }
}

impl CredentialSource {
  pub fn explicit(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
    Self::Explicit {
      client_id:     Some(client_id.into()),
      client_secret: Some(client_secret.into()),
    }
  }

  /// Resolve against the process environment.
  pub fn resolve(self, config: &ClientConfig) -> Result<Credentials> {
    self.resolve_with(config, |name| std::env::var(name).ok())
  }

  /// Resolve using `lookup` in place of the process environment.
  pub fn resolve_with(
    self,
    config: &ClientConfig,
    lookup: impl Fn(&str) -> Option<String>,
  ) -> Result<Credentials> {
    let present = |v: Option<String>| v.filter(|s| !s.is_empty());

    let (client_id, client_secret) = match self {
      Self::Explicit { client_id, client_secret } => (
        present(client_id)
          .ok_or_else(|| Error::Configuration("missing client_id value".into()))?,
        present(client_secret)
          .ok_or_else(|| Error::Configuration("missing client_secret value".into()))?,
      ),
      Self::Environment => (
        present(lookup(&config.client_id_var)).ok_or_else(|| {
          Error::Configuration(format!(
            "missing variable {} in environment variables",
            config.client_id_var
          ))
        })?,
        present(lookup(&config.client_secret_var)).ok_or_else(|| {
          Error::Configuration(format!(
            "missing variable {} in environment variables",
            config.client_secret_var
          ))
        })?,
      ),
    };

    Ok(Credentials { client_id, client_secret })
  }
}

//! Authenticated HTTP client for the France Travail ROME API.
//!
//! [`RomeClient::connect`] resolves credentials, performs the OAuth2
//! client-credentials exchange once, and then attaches the bearer token to
//! every request. The per-kind list and detail accessors live in
//! [`resources`].

pub mod client;
pub mod credentials;
pub mod error;
pub mod resources;

pub use client::{ClientConfig, RomeClient};
pub use credentials::{CredentialSource, Credentials};
pub use error::{Error, RequestFailure, Result};

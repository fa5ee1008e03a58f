//! Core types and trait definitions for the ROME ingestion client.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! The client, the SQLite store and the ingestion pipeline all depend on it.

pub mod error;
pub mod kind;
pub mod row;
pub mod schema;
pub mod source;
pub mod store;

pub use error::{Error, Result};
pub use kind::ResourceKind;
pub use row::PersistedRow;
pub use schema::{DetailRecord, Summary};

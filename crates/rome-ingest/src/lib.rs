//! Download orchestration for the ROME nomenclature.
//!
//! [`Ingestor::download_one`] drives list → detail → validate → persist for
//! one resource kind; [`Ingestor::download_all`] sequences every kind, and
//! [`runner::run`] wires a live [`RomeClient`](rome_client::RomeClient) to a
//! [`SqliteStore`](rome_store_sqlite::SqliteStore).

pub mod config;
pub mod error;
pub mod pipeline;
pub mod runner;

pub use crate::{
  config::IngestConfig,
  error::{Error, Result},
  pipeline::{Ingestor, KindReport, PipelineConfig},
  runner::RunReport,
};

#[cfg(test)]
mod tests;

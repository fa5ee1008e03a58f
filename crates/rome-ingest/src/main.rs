//! rome-ingest binary.
//!
//! Reads `rome.toml` (or the path given with `--config`) layered under
//! `ROME_*` environment variables, then downloads the ROME nomenclature into
//! a SQLite file.
//!
//! # Usage
//!
//! ```text
//! rome-ingest download
//! rome-ingest download --kind themes --kind occupations
//! rome-ingest show occupations A1101
//! rome-ingest status
//! ```

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use rome_client::RomeClient;
use rome_core::ResourceKind;
use rome_ingest::{IngestConfig, runner};
use rome_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "ROME nomenclature downloader")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "rome.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Download every kind (or the given ones) into the store.
  Download {
    /// Restrict the run to these kinds; repeatable.
    #[arg(short, long = "kind", value_name = "KIND")]
    kinds: Vec<ResourceKind>,
  },
  /// Fetch a list, or one record when CODE is given, and print it as JSON.
  Show {
    kind: ResourceKind,
    code: Option<String>,
  },
  /// Print the number of stored rows per kind.
  Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let config = IngestConfig::load(&cli.config)
    .with_context(|| format!("failed to read config {:?}", cli.config))?;

  match cli.command {
    Command::Download { kinds } => {
      let report = runner::run(&config, &kinds).await?;
      println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Command::Show { kind, code } => {
      let client = RomeClient::connect(config.credential_source(), config.api.clone())
        .await
        .context("failed to authenticate against the ROME API")?;
      let json = match code {
        Some(code) => client.fetch_detail(kind, &code).await?.to_json()?,
        None => serde_json::to_value(client.fetch_list(kind).await?)?,
      };
      println!("{}", serde_json::to_string_pretty(&json)?);
    }
    Command::Status => {
      let store = SqliteStore::open(&config.store_path)
        .await
        .with_context(|| format!("failed to open store at {:?}", config.store_path))?;
      for kind in ResourceKind::ALL {
        println!("{:<14} {:<16} {}", kind, kind.table(), store.count(kind).await?);
      }
    }
  }

  Ok(())
}

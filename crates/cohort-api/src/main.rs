//! cohort-api server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and serves the candidate API over HTTP.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use chrono::Utc;
use clap::Parser;
use cohort_api::{AppState, ServerConfig};
use cohort_store_sqlite::{NewCandidate, SqliteStore};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Cohort candidate API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Load a small demonstration data set into the store and continue.
  #[arg(long)]
  seed_demo: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration. Defaults let the server start without a file.
  let settings = config::Config::builder()
    .set_default("host", "127.0.0.1")?
    .set_default("port", 8080)?
    .set_default("store_path", "cohort.db")?
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("COHORT"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Open SQLite store.
  let store = SqliteStore::open(&server_cfg.store_path)
    .await
    .with_context(|| {
      format!("failed to open store at {:?}", server_cfg.store_path)
    })?;

  if cli.seed_demo {
    seed_demo(&store).await.context("failed to seed demo data")?;
    tracing::info!("seeded demonstration data");
  }

  // Build application state.
  let state = AppState {
    store:  Arc::new(store),
    config: Arc::new(server_cfg.clone()),
  };

  let app = cohort_api::router(state).layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// A handful of sites, projects, and candidates for local exploration.
async fn seed_demo(store: &SqliteStore) -> anyhow::Result<()> {
  store
    .add_site(1, "Montreal Neurological Institute", "MTL")
    .await?;
  store.add_site(2, "Ottawa General Hospital", "OTT").await?;
  store.add_project(1, "Alpha Study").await?;
  store.add_project(2, "Beta Study").await?;

  let now = Utc::now();
  let demo = [
    (100001, "MTL0001", 1, Some(1), "1988-03-12", "Female", Some("French")),
    (100002, "MTL0002", 1, Some(2), "1992-11-02", "Male", Some("English")),
    (100003, "OTT0001", 2, None, "1979-07-30", "Female", None),
  ];

  for (cand_id, pscid, site_id, project_id, dob, gender, language) in demo {
    store
      .add_candidate(NewCandidate {
        cand_id,
        pscid: pscid.to_string(),
        site_id,
        project_id,
        dob: dob.parse()?,
        gender: gender.to_string(),
        language: language.map(str::to_string),
        active: true,
        test_date: now,
      })
      .await?;
  }

  Ok(())
}

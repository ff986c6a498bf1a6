use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use lawtextdb_core::Services;
use lawtextdb_core::config_file;
use lawtextdb_index::SearchIndex;
use lawtextdb_pdf_mupdf::MupdfBackend;
use lawtextdb_store::PrimaryStore;
use lawtextdb_web::settings::Overrides;
use lawtextdb_web::{AppState, Settings};

#[derive(Parser, Debug)]
#[command(version, about = "Law text upload, moderation, and search server", long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the default locations
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on, e.g. 127.0.0.1:8080
    #[arg(long)]
    bind: Option<String>,

    /// Directory holding the database and the search index
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => config_file::load_from_path(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => config_file::load_config(),
    };
    let settings = Settings::resolve(
        config,
        Overrides {
            bind: cli.bind,
            data_dir: cli.data_dir,
        },
    );

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let store = PrimaryStore::open(&settings.database_path).with_context(|| {
        format!(
            "Failed to open database at {}",
            settings.database_path.display()
        )
    })?;
    let index = SearchIndex::open(&settings.index_path).with_context(|| {
        format!(
            "Failed to open search index at {}",
            settings.index_path.display()
        )
    })?;
    tracing::info!(
        database = %settings.database_path.display(),
        index = %settings.index_path.display(),
        law_texts = store.count().unwrap_or_default(),
        indexed = index.count(),
        "storage ready"
    );

    let services = Services::new(
        Arc::new(store),
        Arc::new(index),
        Arc::new(MupdfBackend::new()),
    );
    let app = lawtextdb_web::app(AppState::from(services), &settings);

    let listener = tokio::net::TcpListener::bind(&settings.bind)
        .await
        .with_context(|| format!("Failed to bind {}", settings.bind))?;
    tracing::info!("Listening on http://{}", settings.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await?;

    Ok(())
}

//! Load Open Library works with English descriptions into a LanceDB collection.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use squrrl_core::config::Settings;
use squrrl_core::lang::WhatlangDetector;
use squrrl_core::loader::load_data;
use squrrl_core::registry::BookRegistry;
use squrrl_embed::load_embedder;
use squrrl_vector::insert_books;

#[derive(Parser, Debug)]
#[command(name = "squrrl")]
#[command(about = "Embed Open Library book descriptions into a vector collection")]
struct Args {
    /// TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::load(&args.config).with_context(|| format!("loading {}", args.config.display()))?;
    info!(directory = %settings.base.directory().display(), "loading source files");
    let loaded = load_data(&settings.base, &WhatlangDetector::new())?;
    let books = BookRegistry::new(loaded.books);

    let model_dir = settings.base.model_dir();
    let embedder = load_embedder(&settings.base.transformer_model, model_dir.as_deref())?;
    let report = tokio::runtime::Runtime::new()?
        .block_on(async { insert_books(&settings, &loaded.authors, &books, embedder.as_ref()).await })?;
    info!(
        rows = report.rows_inserted,
        batches = report.batches,
        dim = report.dim,
        indexed = report.indexed,
        collection = %settings.vector.collection,
        "done"
    );
    Ok(())
}

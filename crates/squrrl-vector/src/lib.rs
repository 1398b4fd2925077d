//! squrrl-vector
//!
//! LanceDB ingestion sink: embeds book descriptions in fixed-size batches,
//! appends `(title_id, author, description)` rows to the collection, then
//! builds the similarity index.

use anyhow::{bail, Result};
use arrow_schema::DataType;
use indicatif::{ProgressBar, ProgressStyle};
use lancedb::Table;
use tracing::{debug, info, warn};

use squrrl_core::batch::{batch_ranges, InsertBatch};
use squrrl_core::config::Settings;
use squrrl_core::registry::{AuthorRegistry, BookRegistry};
use squrrl_core::traits::Embedder;

pub mod index_build;
pub mod schema;
pub mod table;
pub mod writer;

use schema::{build_book_schema, DESCRIPTION};

/// Outcome of one ingestion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestReport {
    pub batches: usize,
    pub rows_inserted: usize,
    pub dim: usize,
    pub indexed: bool,
}

fn progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} books ({percent}%) {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

/// Embed every book from `base.insert_startpoint` on and append it to the
/// collection, then build the configured index.
///
/// A zero start point replaces the collection; otherwise rows are appended to
/// the existing one, which is only correct when the book list is re-derived
/// from unchanged inputs.
pub async fn insert_books(
    settings: &Settings,
    authors: &AuthorRegistry,
    books: &BookRegistry,
    embedder: &dyn Embedder,
) -> Result<IngestReport> {
    let base = &settings.base;
    let dim = embedder.dim();
    let schema = build_book_schema(i32::try_from(dim)?);
    let conn = table::open_db(&settings.vector.uri).await?;
    let collection = settings.vector.collection.as_str();
    let start = base.insert_startpoint;

    let table = if start == 0 {
        table::recreate_table(&conn, collection, schema).await?
    } else {
        let table = table::ensure_table(&conn, collection, schema).await?;
        check_dimension(&table, dim).await?;
        warn!(start, "resuming insert; assumes source files and filters are unchanged since the interrupted run");
        let existing = table::row_count(&table).await?;
        if existing != start {
            warn!(existing, start, "collection row count differs from insert_startpoint");
        }
        table
    };

    let all = books.as_slice();
    if start > all.len() {
        warn!(start, books = all.len(), "insert_startpoint is past the end of the book list");
    }
    info!(model = embedder.model_id(), dim, books = all.len(), start, chunk = base.chunk_size, "inserting books");
    let pb = progress_bar(all.len().saturating_sub(start) as u64);
    let mut report = IngestReport { batches: 0, rows_inserted: 0, dim, indexed: false };
    for range in batch_ranges(all.len(), base.chunk_size, start) {
        let chunk = &all[range.clone()];
        // every book must still resolve through the registry
        for book in chunk {
            authors.find_by_id(book.author.id)?;
        }
        let texts: Vec<String> = chunk.iter().map(|b| b.description.clone()).collect();
        let vectors = embedder.embed_batch(&texts)?;
        let batch = InsertBatch::from_books(chunk, vectors)?;
        writer::insert_batch(&table, &batch, dim).await?;
        report.batches += 1;
        report.rows_inserted += batch.len();
        pb.inc(batch.len() as u64);
        debug!(start = range.start, end = range.end, "inserted batch");
    }
    pb.finish_and_clear();
    info!(rows = report.rows_inserted, batches = report.batches, "insert complete");

    let rows = table::row_count(&table).await?;
    report.indexed = index_build::build_index(&table, rows, dim, &settings.index).await?;
    Ok(report)
}

/// Refuse to append vectors of a different width than the stored column.
async fn check_dimension(table: &Table, dim: usize) -> Result<()> {
    let schema = table.schema().await?;
    let field = schema.field_with_name(DESCRIPTION)?;
    match field.data_type() {
        DataType::FixedSizeList(_, width) if usize::try_from(*width).ok() == Some(dim) => Ok(()),
        other => bail!("collection {} has {DESCRIPTION} of type {other}, embedder produces {dim} dimensions", table.name()),
    }
}

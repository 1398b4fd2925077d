//! Load orchestrator: author key file first, then the works file.

use indicatif::{ProgressBar, ProgressIterator, ProgressStyle};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

use crate::config::BaseConfig;
use crate::decode::{collect_books, read_authors, SkipStats, WorkRecords};
use crate::error::{Error, Result};
use crate::registry::AuthorRegistry;
use crate::traits::LanguageDetector;
use crate::types::Book;

/// Output of one pass over both source files.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub authors: AuthorRegistry,
    /// Accepted books in works-file order; ids are source line numbers.
    pub books: Vec<Book>,
    pub stats: SkipStats,
}

fn open(path: &Path) -> Result<BufReader<File>> {
    File::open(path).map(BufReader::new).map_err(|e| Error::io(path, e))
}

/// Count lines for the progress bar total.
pub fn count_lines(path: &Path) -> Result<u64> {
    let mut count = 0u64;
    for chunk in open(path)?.split(b'\n') {
        chunk.map_err(|e| Error::io(path, e))?;
        count += 1;
    }
    Ok(count)
}

fn progress_bar(total: u64, unit: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let template = format!("{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {unit} ({{percent}}%)");
    if let Ok(style) = ProgressStyle::default_bar().template(&template) {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

/// Decode the author key file into a registry; ids are line numbers.
pub fn load_authors(path: &Path) -> Result<AuthorRegistry> {
    debug!(path = %path.display(), "reading authors file");
    let pb = progress_bar(count_lines(path)?, "authors");
    let authors = read_authors(open(path)?.lines().progress_with(pb.clone())).map_err(|e| Error::io(path, e))?;
    pb.finish_and_clear();
    info!(count = authors.len(), "loaded authors");
    Ok(authors)
}

/// Decode the works file against `authors`, keeping accepted books in order.
pub fn load_books(path: &Path, authors: &AuthorRegistry, detector: &dyn LanguageDetector) -> Result<(Vec<Book>, SkipStats)> {
    info!(path = %path.display(), "reading works file");
    let pb = progress_bar(count_lines(path)?, "works");
    let mut records = WorkRecords::new(open(path)?.lines().progress_with(pb.clone()), authors, detector);
    let books = collect_books(&mut records).map_err(|e| Error::io(path, e))?;
    pb.finish_and_clear();
    Ok((books, records.stats()))
}

/// Build the author registry and the accepted book list for one run.
pub fn load_data(config: &BaseConfig, detector: &dyn LanguageDetector) -> Result<Loaded> {
    debug!("loading data");
    let authors = load_authors(&config.author_path())?;
    let (books, stats) = load_books(&config.works_path(), &authors, detector)?;
    info!("Found {} books", books.len());
    info!("{:0.3} percent skipped for missing keys or unknown authors", stats.failure_percent());
    debug!(
        malformed = stats.malformed,
        missing_keys = stats.missing_keys,
        no_author_key = stats.no_author_key,
        unknown_author = stats.unknown_author,
        non_english = stats.non_english,
        "skip breakdown"
    );
    Ok(Loaded { authors, books, stats })
}

//! Decoders for the two Open Library source files.
//!
//! The author key file holds one `[reference,name,...]` record per line. The
//! works file holds one JSON object per line; each is joined to its first
//! author and filtered to English descriptions. Rejected works are skipped,
//! never raised, and the reason is tallied in [`SkipStats`].

use std::fmt;
use std::io;

use serde_json::Value;

use crate::registry::AuthorRegistry;
use crate::traits::LanguageDetector;
use crate::types::{Author, AuthorId, Book, BookId};

/// Decode one author key line. `id` is the zero-based line number.
pub fn parse_author_line(line: &str, id: AuthorId) -> Author {
    let line = line.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
    let inner = line.strip_prefix('[').unwrap_or(line);
    let inner = inner.strip_suffix(']').unwrap_or(inner);
    let mut fields = inner.split(',');
    let reference = fields.next().unwrap_or_default().trim();
    let name = fields.map(str::trim).collect::<Vec<_>>().join(", ");
    Author::new(name, id, reference)
}

/// Read every line of the key file into a registry, one author per line.
pub fn read_authors<I>(lines: I) -> io::Result<AuthorRegistry>
where
    I: Iterator<Item = io::Result<String>>,
{
    let mut authors = Vec::new();
    for (i, line) in lines.enumerate() {
        authors.push(parse_author_line(&line?, i as AuthorId));
    }
    Ok(AuthorRegistry::new(authors))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Not a JSON object, or a structured description without a string `value`.
    Malformed,
    /// One of `title`, `authors`, `description` is absent.
    MissingKeys,
    /// Neither `authors[0].author.key` nor `authors[0].key` is a string.
    NoAuthorKey,
    NonEnglish,
    /// The author reference is not in the registry.
    UnknownAuthor,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkipReason::Malformed => "malformed record",
            SkipReason::MissingKeys => "missing keys",
            SkipReason::NoAuthorKey => "no author key",
            SkipReason::NonEnglish => "non-English description",
            SkipReason::UnknownAuthor => "unknown author",
        };
        f.write_str(s)
    }
}

/// Per-reason tally of one pass over the works file.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SkipStats {
    pub total: usize,
    pub accepted: usize,
    pub malformed: usize,
    pub missing_keys: usize,
    pub no_author_key: usize,
    pub non_english: usize,
    pub unknown_author: usize,
}

impl SkipStats {
    pub fn record(&mut self, outcome: Result<(), SkipReason>) {
        self.total += 1;
        match outcome {
            Ok(()) => self.accepted += 1,
            Err(SkipReason::Malformed) => self.malformed += 1,
            Err(SkipReason::MissingKeys) => self.missing_keys += 1,
            Err(SkipReason::NoAuthorKey) => self.no_author_key += 1,
            Err(SkipReason::NonEnglish) => self.non_english += 1,
            Err(SkipReason::UnknownAuthor) => self.unknown_author += 1,
        }
    }

    /// Every rejected record, including the language filter.
    pub fn skipped(&self) -> usize { self.total - self.accepted }

    /// Rejections caused by data-quality gaps; the language filter is not one.
    pub fn failures(&self) -> usize {
        self.malformed + self.missing_keys + self.no_author_key + self.unknown_author
    }

    pub fn failure_percent(&self) -> f64 {
        if self.total == 0 { return 0.0; }
        100.0 * self.failures() as f64 / self.total as f64
    }
}

/// Replace each line break (`\r\n`, `\n`, `\r`) with a single space.
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

fn author_reference(authors: &Value) -> Option<&str> {
    let first = authors.get(0)?;
    first
        .pointer("/author/key")
        .and_then(Value::as_str)
        .or_else(|| first.get("key").and_then(Value::as_str))
}

fn description_text(description: &Value) -> Option<String> {
    match description {
        Value::Object(map) => map.get("value").and_then(Value::as_str).map(str::to_string),
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn title_text(title: &Value) -> String {
    match title {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Decode a single works line into a book, or the reason it was skipped.
pub fn decode_work(
    line: &str,
    index: BookId,
    authors: &AuthorRegistry,
    detector: &dyn LanguageDetector,
) -> Result<Book, SkipReason> {
    let entry: Value = serde_json::from_str(line.trim()).map_err(|_| SkipReason::Malformed)?;
    let entry = entry.as_object().ok_or(SkipReason::Malformed)?;
    let (Some(title), Some(work_authors), Some(description)) =
        (entry.get("title"), entry.get("authors"), entry.get("description"))
    else {
        return Err(SkipReason::MissingKeys);
    };
    let reference = author_reference(work_authors).ok_or(SkipReason::NoAuthorKey)?;
    let description = description_text(description).ok_or(SkipReason::Malformed)?;
    let description = normalize_newlines(&description);
    if !detector.is_english(&description) {
        return Err(SkipReason::NonEnglish);
    }
    let author = authors.find_by_reference(reference).map_err(|_| SkipReason::UnknownAuthor)?;
    Ok(Book::new(index, title_text(title), author, description))
}

/// Lazy, single-pass decoder over the works file.
///
/// Yields one `Option<Book>` per input line, in line order, and keeps a
/// running [`SkipStats`]. Line read errors end the pass.
pub struct WorkRecords<'a, I> {
    lines: std::iter::Enumerate<I>,
    authors: &'a AuthorRegistry,
    detector: &'a dyn LanguageDetector,
    stats: SkipStats,
}

impl<'a, I> WorkRecords<'a, I>
where
    I: Iterator<Item = io::Result<String>>,
{
    pub fn new(lines: I, authors: &'a AuthorRegistry, detector: &'a dyn LanguageDetector) -> Self {
        Self { lines: lines.enumerate(), authors, detector, stats: SkipStats::default() }
    }

    pub fn stats(&self) -> SkipStats { self.stats }
}

impl<I> Iterator for WorkRecords<'_, I>
where
    I: Iterator<Item = io::Result<String>>,
{
    type Item = io::Result<Option<Book>>;

    fn next(&mut self) -> Option<Self::Item> {
        let (i, line) = self.lines.next()?;
        let line = match line {
            Ok(line) => line,
            Err(e) => return Some(Err(e)),
        };
        match decode_work(&line, i as BookId, self.authors, self.detector) {
            Ok(book) => {
                self.stats.record(Ok(()));
                Some(Ok(Some(book)))
            }
            Err(reason) => {
                tracing::trace!(line = i, %reason, "skipping work record");
                self.stats.record(Err(reason));
                Some(Ok(None))
            }
        }
    }
}

/// Drain a [`WorkRecords`] pass into the accepted books, in line order.
pub fn collect_books<I>(records: &mut WorkRecords<'_, I>) -> io::Result<Vec<Book>>
where
    I: Iterator<Item = io::Result<String>>,
{
    records.by_ref().filter_map(Result::transpose).collect()
}

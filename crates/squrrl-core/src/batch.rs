//! Column batches handed to the vector sink, and the checks they must pass
//! before any insert is attempted.

use std::ops::Range;

use crate::error::{Error, Result};
use crate::types::Book;

/// Three parallel columns: book id, author id, description embedding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsertBatch {
    pub title_ids: Vec<i64>,
    pub author_ids: Vec<i64>,
    pub vectors: Vec<Vec<f32>>,
}

impl InsertBatch {
    /// Pair `books` with their embeddings. Ids that overflow `i64` are
    /// rejected here since the collection stores signed 64-bit keys.
    pub fn from_books(books: &[Book], vectors: Vec<Vec<f32>>) -> Result<Self> {
        let mut title_ids = Vec::with_capacity(books.len());
        let mut author_ids = Vec::with_capacity(books.len());
        for book in books {
            title_ids.push(to_i64(book.id, "title_id")?);
            author_ids.push(to_i64(book.author.id, "author")?);
        }
        Ok(Self { title_ids, author_ids, vectors })
    }

    pub fn len(&self) -> usize { self.title_ids.len() }

    pub fn is_empty(&self) -> bool { self.title_ids.is_empty() }

    /// Reject empty batches, ragged columns, vectors of the wrong width and
    /// non-finite vector entries.
    pub fn validate(&self, dim: usize) -> Result<()> {
        if self.title_ids.is_empty() {
            return Err(Error::InvalidBatch("fields must not be empty".to_string()));
        }
        let lens = [self.title_ids.len(), self.author_ids.len(), self.vectors.len()];
        if lens.iter().any(|&l| l != lens[0]) {
            return Err(Error::InvalidBatch(format!("fields must have the same length, are {lens:?}")));
        }
        for (row, v) in self.vectors.iter().enumerate() {
            if v.len() != dim {
                return Err(Error::InvalidBatch(format!(
                    "vector at row {row} has dimension {}, expected {dim}",
                    v.len()
                )));
            }
            if v.iter().any(|x| !x.is_finite()) {
                return Err(Error::InvalidBatch(format!("vector at row {row} contains non-finite values")));
            }
        }
        Ok(())
    }
}

fn to_i64(id: u64, column: &str) -> Result<i64> {
    i64::try_from(id).map_err(|_| Error::InvalidBatch(format!("{column} {id} does not fit in Int64")))
}

/// Consecutive `[start, start + size)` windows over `len` items, beginning at
/// `offset`. The last window may be short; no window is ever empty.
pub fn batch_ranges(len: usize, size: usize, offset: usize) -> impl Iterator<Item = Range<usize>> {
    let size = size.max(1);
    (offset..len).step_by(size).map(move |start| start..(start + size).min(len))
}

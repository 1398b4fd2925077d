//! Domain types shared by the loader and the vector sink.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub type AuthorId = u64;
pub type BookId = u64;

/// Language code carried by every book that passed the language filter.
pub const ENGLISH: &str = "en";

/// An author from the key file.
///
/// - `id`: dense id, equal to the zero-based line of the key file
/// - `reference`: external Open Library key such as `/authors/OL1A`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub id: AuthorId,
    pub reference: String,
}

impl Author {
    pub fn new(name: impl Into<String>, id: AuthorId, reference: impl Into<String>) -> Self {
        Self { name: name.into(), id, reference: reference.into() }
    }
}

/// A work accepted by the decoder.
///
/// `id` is the zero-based line of the record in the works file and is never
/// renumbered, so accepted ids are increasing but sparse. `author` is shared
/// with the `AuthorRegistry` it was resolved from.
#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    pub title: String,
    pub author: Arc<Author>,
    pub id: BookId,
    pub description: String,
    pub language: &'static str,
}

impl Book {
    pub fn new(id: BookId, title: impl Into<String>, author: Arc<Author>, description: impl Into<String>) -> Self {
        Self { title: title.into(), author, id, description: description.into(), language: ENGLISH }
    }
}

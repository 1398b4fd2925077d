//! Instance-owned author and book registries.
//!
//! Both registries keep their entities in insertion order and rebuild their
//! lookup maps on every append. The pipeline appends once, right after
//! decoding, so the rebuild cost is paid a single time.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::types::{Author, AuthorId, Book, BookId};

#[derive(Debug, Default, Clone)]
pub struct AuthorRegistry {
    authors: Vec<Arc<Author>>,
    by_reference: HashMap<String, Arc<Author>>,
    by_id: HashMap<AuthorId, Arc<Author>>,
}

impl AuthorRegistry {
    pub fn new(authors: impl IntoIterator<Item = Author>) -> Self {
        let mut registry = Self::default();
        registry.add_authors(authors);
        registry
    }

    pub fn add_author(&mut self, author: Author) {
        self.add_authors(std::iter::once(author));
    }

    pub fn add_authors(&mut self, authors: impl IntoIterator<Item = Author>) {
        self.authors.extend(authors.into_iter().map(Arc::new));
        self.update_lookups();
    }

    /// Later entries win when two authors share a reference; both stay
    /// reachable by id.
    fn update_lookups(&mut self) {
        self.by_reference = self.authors.iter().map(|a| (a.reference.clone(), Arc::clone(a))).collect();
        self.by_id = self.authors.iter().map(|a| (a.id, Arc::clone(a))).collect();
    }

    pub fn find_by_reference(&self, reference: &str) -> Result<Arc<Author>> {
        self.by_reference
            .get(reference)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("author with reference '{reference}'")))
    }

    pub fn find_by_id(&self, id: AuthorId) -> Result<Arc<Author>> {
        self.by_id.get(&id).cloned().ok_or_else(|| Error::NotFound(format!("author with id {id}")))
    }

    pub fn len(&self) -> usize { self.authors.len() }

    pub fn is_empty(&self) -> bool { self.authors.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Author>> { self.authors.iter() }
}

#[derive(Debug, Default, Clone)]
pub struct BookRegistry {
    books: Vec<Book>,
    by_id: HashMap<BookId, usize>,
}

impl BookRegistry {
    pub fn new(books: impl IntoIterator<Item = Book>) -> Self {
        let mut registry = Self::default();
        registry.add_books(books);
        registry
    }

    pub fn add_book(&mut self, book: Book) {
        self.add_books(std::iter::once(book));
    }

    pub fn add_books(&mut self, books: impl IntoIterator<Item = Book>) {
        self.books.extend(books);
        self.by_id = self.books.iter().enumerate().map(|(pos, b)| (b.id, pos)).collect();
    }

    pub fn find_by_id(&self, id: BookId) -> Result<&Book> {
        self.by_id
            .get(&id)
            .map(|&pos| &self.books[pos])
            .ok_or_else(|| Error::NotFound(format!("book with id {id}")))
    }

    pub fn len(&self) -> usize { self.books.len() }

    pub fn is_empty(&self) -> bool { self.books.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &Book> { self.books.iter() }

    /// Books in the order they were added; the sink batches over this slice.
    pub fn as_slice(&self) -> &[Book] { &self.books }
}

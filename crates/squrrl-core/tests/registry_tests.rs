use std::io::{BufRead, Cursor};

use squrrl_core::decode::{parse_author_line, read_authors};
use squrrl_core::registry::{AuthorRegistry, BookRegistry};
use squrrl_core::types::{Author, Book};
use squrrl_core::Error;

#[test]
fn author_line_splits_reference_and_name() {
    let a = parse_author_line("[/authors/OL1A,Jane,Doe]", 0);
    assert_eq!(a, Author::new("Jane, Doe", 0, "/authors/OL1A"));
}

#[test]
fn author_line_tolerates_line_endings_and_padding() {
    let a = parse_author_line("[/authors/OL2A, Tolkien,  J. R. R. ]\r\n", 7);
    assert_eq!(a.reference, "/authors/OL2A");
    assert_eq!(a.name, "Tolkien, J. R. R.");
    assert_eq!(a.id, 7);

    let a = parse_author_line("  [/authors/OL1A,Jane,Doe] \t", 0);
    assert_eq!(a, Author::new("Jane, Doe", 0, "/authors/OL1A"));
}

#[test]
fn author_line_byte_order_mark_is_dropped() {
    let a = parse_author_line("\u{feff}[/authors/OL1A,Jane,Doe]", 0);
    assert_eq!(a.reference, "/authors/OL1A");
    assert_eq!(a.name, "Jane, Doe");

    let text = "\u{feff}[/authors/OL1A,Jane]\n[/authors/OL2A,John]\n";
    let registry = read_authors(Cursor::new(text).lines()).expect("read");
    assert_eq!(registry.find_by_reference("/authors/OL1A").expect("first author resolves").id, 0);
}

#[test]
fn author_line_without_name() {
    let a = parse_author_line("[/authors/OL3A]", 2);
    assert_eq!(a.reference, "/authors/OL3A");
    assert_eq!(a.name, "");
}

#[test]
fn author_ids_are_line_numbers() {
    let text = "[/authors/A,One]\n[/authors/B,Two]\n[/authors/C,Three]\n";
    let registry = read_authors(Cursor::new(text).lines()).expect("read");
    assert_eq!(registry.len(), 3);
    let ids: Vec<u64> = registry.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![0, 1, 2], "ids form the contiguous range [0, N)");
    assert_eq!(registry.find_by_reference("/authors/B").expect("B").id, 1);
    assert_eq!(registry.find_by_id(2).expect("2").name, "Three");
}

#[test]
fn duplicate_reference_keeps_both_ids() {
    let text = "[/authors/A,First]\n[/authors/A,Second]\n";
    let registry = read_authors(Cursor::new(text).lines()).expect("read");
    assert_eq!(registry.find_by_reference("/authors/A").expect("A").name, "Second", "later line wins by reference");
    assert_eq!(registry.find_by_id(0).expect("0").name, "First");
    assert_eq!(registry.find_by_id(1).expect("1").name, "Second");
}

#[test]
fn lookup_misses_are_not_found() {
    let registry = AuthorRegistry::new(vec![Author::new("Jane", 0, "/authors/OL1A")]);
    assert!(matches!(registry.find_by_reference("/authors/missing"), Err(Error::NotFound(_))));
    assert!(matches!(registry.find_by_id(42), Err(Error::NotFound(_))));
}

#[test]
fn add_authors_extends_lookups() {
    let mut registry = AuthorRegistry::new(vec![Author::new("Jane", 0, "/authors/OL1A")]);
    registry.add_author(Author::new("John", 1, "/authors/OL2A"));
    registry.add_authors(vec![Author::new("Ann", 2, "/authors/OL3A"), Author::new("Bo", 3, "/authors/OL4A")]);
    assert_eq!(registry.len(), 4);
    assert_eq!(registry.find_by_reference("/authors/OL1A").expect("first still present").id, 0);
    assert_eq!(registry.find_by_reference("/authors/OL4A").expect("last").id, 3);
}

#[test]
fn registries_do_not_share_state() {
    let a = AuthorRegistry::new(vec![Author::new("Jane", 0, "/authors/OL1A")]);
    let b = AuthorRegistry::new(vec![Author::new("John", 0, "/authors/OL2A")]);
    assert!(a.find_by_reference("/authors/OL2A").is_err());
    assert!(b.find_by_reference("/authors/OL1A").is_err());
    assert_eq!(a.len(), 1);
    assert_eq!(b.len(), 1);
}

#[test]
fn book_registry_lookup_and_order() {
    let authors = AuthorRegistry::new(vec![Author::new("Jane", 0, "/authors/OL1A")]);
    let jane = authors.find_by_id(0).expect("jane");
    let mut books = BookRegistry::new(vec![Book::new(3, "A", jane.clone(), "first")]);
    books.add_book(Book::new(9, "B", jane.clone(), "second"));
    books.add_books(vec![Book::new(12, "C", jane, "third")]);

    assert_eq!(books.len(), 3);
    assert_eq!(books.find_by_id(9).expect("9").title, "B");
    assert!(matches!(books.find_by_id(4), Err(Error::NotFound(_))));
    let ids: Vec<u64> = books.as_slice().iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![3, 9, 12]);
    assert!(books.iter().all(|b| b.language == "en"));
}

use std::sync::Arc;

use squrrl_core::batch::{batch_ranges, InsertBatch};
use squrrl_core::types::{Author, Book};
use squrrl_core::Error;

fn batch(n: usize, dim: usize) -> InsertBatch {
    InsertBatch {
        title_ids: (0..n as i64).collect(),
        author_ids: vec![0; n],
        vectors: vec![vec![0.5; dim]; n],
    }
}

#[test]
fn well_formed_batch_passes() {
    batch(3, 4).validate(4).expect("valid");
}

#[test]
fn mismatched_lengths_are_rejected() {
    let mut b = batch(3, 4);
    b.vectors.pop();
    let err = b.validate(4).expect_err("ragged columns");
    assert!(matches!(err, Error::InvalidBatch(_)));
    assert!(err.to_string().contains("[3, 3, 2]"), "message lists lengths: {err}");

    let mut b = batch(3, 4);
    b.author_ids.push(9);
    assert!(matches!(b.validate(4), Err(Error::InvalidBatch(_))));
}

#[test]
fn empty_batch_is_rejected() {
    assert!(matches!(InsertBatch::default().validate(4), Err(Error::InvalidBatch(_))));
}

#[test]
fn vector_width_must_match_dimension() {
    let mut b = batch(2, 4);
    b.vectors[1] = vec![0.1; 3];
    assert!(matches!(b.validate(4), Err(Error::InvalidBatch(_))));
}

#[test]
fn non_finite_values_are_rejected() {
    let mut b = batch(2, 4);
    b.vectors[0][2] = f32::NAN;
    assert!(matches!(b.validate(4), Err(Error::InvalidBatch(_))));
}

#[test]
fn from_books_takes_ids_in_order() {
    let a = Arc::new(Author::new("Jane", 7, "/authors/OL1A"));
    let books = vec![Book::new(3, "A", a.clone(), "x"), Book::new(11, "B", a, "y")];
    let b = InsertBatch::from_books(&books, vec![vec![1.0, 0.0], vec![0.0, 1.0]]).expect("fits");
    assert_eq!(b.title_ids, vec![3, 11]);
    assert_eq!(b.author_ids, vec![7, 7]);
    b.validate(2).expect("valid");
}

#[test]
fn ids_beyond_int64_are_rejected() {
    let a = Arc::new(Author::new("Jane", 0, "/authors/OL1A"));
    let books = vec![Book::new(u64::MAX, "A", a, "x")];
    assert!(matches!(InsertBatch::from_books(&books, vec![vec![1.0]]), Err(Error::InvalidBatch(_))));
}

#[test]
fn ranges_cover_tail_without_empty_batch() {
    let r: Vec<_> = batch_ranges(25, 10, 0).collect();
    assert_eq!(r, vec![0..10, 10..20, 20..25]);
    let r: Vec<_> = batch_ranges(20, 10, 0).collect();
    assert_eq!(r, vec![0..10, 10..20], "no trailing empty window when len divides evenly");
}

#[test]
fn ranges_resume_from_offset() {
    let r: Vec<_> = batch_ranges(25, 10, 10).collect();
    assert_eq!(r, vec![10..20, 20..25]);
    assert_eq!(batch_ranges(5, 10, 5).count(), 0);
    assert_eq!(batch_ranges(5, 10, 50).count(), 0);
    assert_eq!(batch_ranges(0, 10, 0).count(), 0);
}

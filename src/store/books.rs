//! Book records.

use crate::models::Book;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Book map keyed by id. Insertion sequence numbers give every book a
/// stable position for sort tiebreaking.
#[derive(Default)]
pub struct BookStore {
    books: DashMap<Uuid, Book>,
    next_seq: AtomicU64,
}

impl BookStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a book, assigning its sequence number.
    pub fn insert(&self, mut book: Book) -> Book {
        book.seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        self.books.insert(book.id, book.clone());
        book
    }

    pub fn get(&self, id: Uuid) -> Option<Book> {
        self.books.get(&id).map(|b| b.clone())
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.books.contains_key(&id)
    }

    /// Apply an in-place edit; returns the updated book.
    pub fn update<F: FnOnce(&mut Book)>(&self, id: Uuid, f: F) -> Option<Book> {
        self.books.get_mut(&id).map(|mut b| {
            f(&mut b);
            b.clone()
        })
    }

    pub fn remove(&self, id: Uuid) -> Option<Book> {
        self.books.remove(&id).map(|(_, b)| b)
    }

    pub fn all(&self) -> Vec<Book> {
        self.books.iter().map(|b| b.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}

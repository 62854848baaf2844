//! Review records with a per-book index.

use crate::models::Review;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Review map plus a book-id index. The index holds review ids in insertion
/// order; presentation order (newest first) is derived on read.
#[derive(Default)]
pub struct ReviewStore {
    reviews: DashMap<Uuid, Review>,
    by_book: DashMap<Uuid, Vec<Uuid>>,
    next_seq: AtomicU64,
}

impl ReviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a review into the map and link it into the book index.
    pub fn insert(&self, mut review: Review) -> Review {
        review.seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        let id = review.id;
        let book_id = review.book_id;
        self.reviews.insert(id, review.clone());
        self.by_book.entry(book_id).or_default().push(id);
        review
    }

    /// Undo a staged insert whose book vanished before index linking
    /// completed. Leaves the store as if the insert never happened.
    pub fn unstage(&self, id: Uuid) {
        if let Some((_, review)) = self.reviews.remove(&id) {
            if let Some(mut ids) = self.by_book.get_mut(&review.book_id) {
                ids.retain(|r| *r != id);
            }
        }
    }

    pub fn get(&self, id: Uuid) -> Option<Review> {
        self.reviews.get(&id).map(|r| r.clone())
    }

    pub fn update<F: FnOnce(&mut Review)>(&self, id: Uuid, f: F) -> Option<Review> {
        self.reviews.get_mut(&id).map(|mut r| {
            f(&mut r);
            r.clone()
        })
    }

    pub fn remove(&self, id: Uuid) -> Option<Review> {
        let removed = self.reviews.remove(&id).map(|(_, r)| r);
        if let Some(review) = &removed {
            if let Some(mut ids) = self.by_book.get_mut(&review.book_id) {
                ids.retain(|r| *r != id);
            }
        }
        removed
    }

    /// All reviews for a book, newest first (a fresh submission is the
    /// prepended head of the list).
    pub fn for_book(&self, book_id: Uuid) -> Vec<Review> {
        let ids = match self.by_book.get(&book_id) {
            Some(ids) => ids.clone(),
            None => return Vec::new(),
        };
        let mut reviews: Vec<Review> = ids
            .iter()
            .filter_map(|id| self.reviews.get(id).map(|r| r.clone()))
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.seq.cmp(&a.seq)));
        reviews
    }

    /// All reviews authored by a user, newest first.
    pub fn for_user(&self, user_id: Uuid) -> Vec<Review> {
        let mut reviews: Vec<Review> = self
            .reviews
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.clone())
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.seq.cmp(&a.seq)));
        reviews
    }

    /// Every review, newest first.
    pub fn all(&self) -> Vec<Review> {
        let mut reviews: Vec<Review> = self.reviews.iter().map(|r| r.clone()).collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.seq.cmp(&a.seq)));
        reviews
    }

    /// Drop every review of a book (book deletion cascade). Returns how
    /// many were removed.
    pub fn remove_for_book(&self, book_id: Uuid) -> usize {
        let ids = self
            .by_book
            .remove(&book_id)
            .map(|(_, ids)| ids)
            .unwrap_or_default();
        for id in &ids {
            self.reviews.remove(id);
        }
        ids.len()
    }

    pub fn count_for_book(&self, book_id: Uuid) -> usize {
        self.by_book.get(&book_id).map(|ids| ids.len()).unwrap_or(0)
    }

    /// Mean rating over a book's reviews; 0.0 with no reviews.
    pub fn average_for_book(&self, book_id: Uuid) -> f64 {
        let reviews = self.for_book(book_id);
        if reviews.is_empty() {
            return 0.0;
        }
        let sum: u32 = reviews.iter().map(|r| r.rating as u32).sum();
        sum as f64 / reviews.len() as f64
    }

    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use std::collections::HashSet;

    fn review(book_id: Uuid, rating: u8, age_mins: i64) -> Review {
        Review {
            id: Uuid::new_v4(),
            seq: 0,
            book_id,
            user_id: Uuid::new_v4(),
            user_name: "u".to_string(),
            user_avatar: String::new(),
            rating,
            text: "t".to_string(),
            spoiler: false,
            likers: HashSet::new(),
            created_at: Utc::now() - Duration::minutes(age_mins),
        }
    }

    #[test]
    fn test_newest_first_for_book() {
        let store = ReviewStore::new();
        let book_id = Uuid::new_v4();
        let old = store.insert(review(book_id, 3, 60));
        let new = store.insert(review(book_id, 5, 1));

        let ordered = store.for_book(book_id);
        assert_eq!(ordered[0].id, new.id);
        assert_eq!(ordered[1].id, old.id);
    }

    #[test]
    fn test_aggregates_are_derived() {
        let store = ReviewStore::new();
        let book_id = Uuid::new_v4();
        assert_eq!(store.average_for_book(book_id), 0.0);

        store.insert(review(book_id, 2, 10));
        store.insert(review(book_id, 5, 5));
        assert_eq!(store.count_for_book(book_id), 2);
        assert_eq!(store.average_for_book(book_id), 3.5);

        let ids: Vec<Uuid> = store.for_book(book_id).iter().map(|r| r.id).collect();
        store.remove(ids[0]);
        assert_eq!(store.count_for_book(book_id), 1);
        assert_eq!(store.average_for_book(book_id), 2.0);
    }

    #[test]
    fn test_unstage_reverses_insert() {
        let store = ReviewStore::new();
        let book_id = Uuid::new_v4();
        let r = store.insert(review(book_id, 4, 0));

        store.unstage(r.id);
        assert!(store.get(r.id).is_none());
        assert_eq!(store.count_for_book(book_id), 0);
        assert!(store.for_book(book_id).is_empty());
    }

    #[test]
    fn test_remove_for_book_cascade() {
        let store = ReviewStore::new();
        let book_id = Uuid::new_v4();
        let other = Uuid::new_v4();
        store.insert(review(book_id, 4, 0));
        store.insert(review(book_id, 2, 1));
        store.insert(review(other, 5, 2));

        assert_eq!(store.remove_for_book(book_id), 2);
        assert_eq!(store.len(), 1);
        assert_eq!(store.count_for_book(other), 1);
    }
}

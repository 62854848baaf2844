//! Catalog filtering, ordering, and pagination.
//!
//! Filters apply in a fixed order: substring search over title/author, then
//! exact genre match, then one of four total orderings. Ties under every
//! ordering fall back to insertion sequence, so repeated queries over an
//! unchanged catalog return identical sequences. Results are recomputed on
//! every request; nothing here memoizes.

use crate::models::BookView;
use chrono::{DateTime, Duration, Utc};

/// Sort keys accepted by the catalog list endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Case-insensitive lexicographic title order.
    #[default]
    Title,
    /// Descending average rating.
    Rating,
    /// Descending review count.
    Reviews,
    /// Descending creation time.
    Newest,
}

impl SortKey {
    /// Unknown keys fall back to title order, matching the form default.
    pub fn parse(s: &str) -> SortKey {
        match s {
            "rating" => SortKey::Rating,
            "reviews" => SortKey::Reviews,
            "newest" => SortKey::Newest,
            _ => SortKey::Title,
        }
    }
}

/// Apply search filter, genre filter, and ordering, in that order.
pub fn filter_and_sort(
    mut books: Vec<BookView>,
    search: Option<&str>,
    genre: Option<&str>,
    sort: SortKey,
) -> Vec<BookView> {
    if let Some(query) = search {
        let query = query.to_lowercase();
        if !query.is_empty() {
            books.retain(|b| {
                b.title.to_lowercase().contains(&query) || b.author.to_lowercase().contains(&query)
            });
        }
    }

    if let Some(genre) = genre {
        if !genre.is_empty() && genre != "All" {
            books.retain(|b| b.genre == genre);
        }
    }

    books.sort_by(|a, b| {
        let ord = match sort {
            SortKey::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortKey::Rating => b
                .average_rating
                .partial_cmp(&a.average_rating)
                .unwrap_or(std::cmp::Ordering::Equal),
            SortKey::Reviews => b.review_count.cmp(&a.review_count),
            SortKey::Newest => b.created_at.cmp(&a.created_at),
        };
        ord.then(a.seq.cmp(&b.seq))
    });

    books
}

/// Slice a sorted sequence into one page. Returns the page items and the
/// pre-pagination total.
pub fn paginate<T>(items: Vec<T>, page: usize, limit: usize) -> (Vec<T>, usize) {
    let total = items.len();
    let start = page.max(1).saturating_sub(1).saturating_mul(limit);
    let paged = items.into_iter().skip(start).take(limit).collect();
    (paged, total)
}

/// Trending: top five books ranked by recent review count (the caller counts
/// reviews past [`trending_cutoff`]), ties broken by average rating then title.
pub fn trending(books: Vec<(BookView, usize)>) -> Vec<BookView> {
    let mut ranked: Vec<(BookView, usize)> =
        books.into_iter().filter(|(_, recent)| *recent > 0).collect();

    ranked.sort_by(|(a, ra), (b, rb)| {
        rb.cmp(ra)
            .then(
                b.average_rating
                    .partial_cmp(&a.average_rating)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
            .then(a.title.cmp(&b.title))
    });

    ranked.into_iter().take(5).map(|(b, _)| b).collect()
}

/// The trailing window a review must fall in to count as trending activity.
pub fn trending_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(7)
}

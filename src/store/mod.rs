//! In-memory data store.
//!
//! Composes the book, review, and user maps and implements every domain
//! operation over them. Mutations validate first and touch the maps only
//! once validation has passed; the one write that spans two maps (review
//! insert) re-checks its book after staging and unstages on loss, so a
//! failed write always leaves the store exactly as it was.

pub mod books;
pub mod journal;
pub mod reviews;
pub mod users;

use crate::catalog;
use crate::error::ApiError;
use crate::models::{
    AnalyticsResponse, Book, BookView, CreateBookRequest, CreateReviewRequest, FlaggedReview,
    Review, ReviewView, Role, Status, UpdateBookRequest, UpdateProfileRequest, UserProfile,
    UserStats, UserView,
};
use crate::validation;
use books::BookStore;
use chrono::{DateTime, Datelike, Utc};
use reviews::ReviewStore;
use std::collections::HashSet;
use users::UserStore;
use uuid::Uuid;

pub struct Store {
    pub books: BookStore,
    pub reviews: ReviewStore,
    pub users: UserStore,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        Self {
            books: BookStore::new(),
            reviews: ReviewStore::new(),
            users: UserStore::new(),
        }
    }

    fn check_active(&self, user: &UserProfile) -> Result<(), ApiError> {
        if user.is_banned() {
            Err(ApiError::Forbidden(
                "banned accounts cannot make changes".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    // --- Projections ---

    pub fn book_view(&self, book: &Book) -> BookView {
        book.view(
            self.reviews.average_for_book(book.id),
            self.reviews.count_for_book(book.id),
        )
    }

    pub fn book_views(&self) -> Vec<BookView> {
        self.books.all().iter().map(|b| self.book_view(b)).collect()
    }

    pub fn get_book_view(&self, id: Uuid) -> Result<BookView, ApiError> {
        self.books
            .get(id)
            .map(|b| self.book_view(&b))
            .ok_or_else(|| ApiError::NotFound(format!("no book with id {}", id)))
    }

    pub fn user_stats(&self, id: Uuid) -> UserStats {
        let reviews = self.reviews.for_user(id);
        let average_rating = if reviews.is_empty() {
            0.0
        } else {
            reviews.iter().map(|r| r.rating as u32).sum::<u32>() as f64 / reviews.len() as f64
        };
        UserStats {
            review_count: reviews.len(),
            average_rating,
            followers_count: self.users.followers_count(id),
            following_count: self.users.following_count(id),
        }
    }

    pub fn user_view(&self, user: &UserProfile) -> UserView {
        user.view(self.user_stats(user.id))
    }

    pub fn get_user_view(&self, id: Uuid) -> Result<UserView, ApiError> {
        self.users
            .get(id)
            .map(|u| self.user_view(&u))
            .ok_or_else(|| ApiError::NotFound(format!("no user with id {}", id)))
    }

    /// Trending books: recent review counts feed the catalog ranking.
    pub fn trending(&self, now: DateTime<Utc>) -> Vec<BookView> {
        let cutoff = catalog::trending_cutoff(now);
        let ranked = self
            .books
            .all()
            .iter()
            .map(|b| {
                let recent = self
                    .reviews
                    .for_book(b.id)
                    .iter()
                    .filter(|r| r.created_at > cutoff)
                    .count();
                (self.book_view(b), recent)
            })
            .collect();
        catalog::trending(ranked)
    }

    // --- Users ---

    /// Create an account. The caller digests the password.
    pub fn create_user(
        &self,
        name: &str,
        email: &str,
        password_digest: &str,
        role: Role,
    ) -> Result<UserProfile, ApiError> {
        validation::check_required("name", name)?;
        if !validation::is_valid_email(email) {
            return Err(ApiError::InvalidRequest(format!(
                "invalid email address: {}",
                email
            )));
        }
        let user = UserProfile {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            bio: String::new(),
            avatar: default_avatar(name),
            role,
            status: Status::Active,
            join_date: Utc::now(),
            password_digest: password_digest.to_string(),
        };
        if !self.users.insert(user.clone()) {
            return Err(ApiError::Conflict(format!(
                "email already registered: {}",
                email
            )));
        }
        Ok(user)
    }

    /// Profile edit: self or admin.
    pub fn update_profile(
        &self,
        actor: &UserProfile,
        target: Uuid,
        req: &UpdateProfileRequest,
    ) -> Result<UserView, ApiError> {
        self.check_active(actor)?;
        if actor.id != target && actor.role < Role::Admin {
            return Err(ApiError::Forbidden(
                "cannot edit another user's profile".to_string(),
            ));
        }
        if let Some(name) = &req.name {
            validation::check_required("name", name)?;
        }
        let updated = self
            .users
            .update(target, |u| {
                if let Some(name) = &req.name {
                    u.name = name.trim().to_string();
                }
                if let Some(bio) = &req.bio {
                    u.bio = bio.clone();
                }
                if let Some(avatar) = &req.avatar {
                    u.avatar = avatar.clone();
                }
            })
            .ok_or_else(|| ApiError::NotFound(format!("no user with id {}", target)))?;
        Ok(self.user_view(&updated))
    }

    pub fn follow(&self, actor: &UserProfile, target: Uuid) -> Result<UserView, ApiError> {
        self.check_active(actor)?;
        if actor.id == target {
            return Err(ApiError::InvalidRequest(
                "cannot follow yourself".to_string(),
            ));
        }
        if !self.users.contains(target) {
            return Err(ApiError::NotFound(format!("no user with id {}", target)));
        }
        if !self.users.follow(actor.id, target) {
            return Err(ApiError::Conflict("already following".to_string()));
        }
        self.get_user_view(target)
    }

    pub fn unfollow(&self, actor: &UserProfile, target: Uuid) -> Result<UserView, ApiError> {
        self.check_active(actor)?;
        if !self.users.contains(target) {
            return Err(ApiError::NotFound(format!("no user with id {}", target)));
        }
        if !self.users.unfollow(actor.id, target) {
            return Err(ApiError::Conflict("not following".to_string()));
        }
        self.get_user_view(target)
    }

    // --- Books ---

    pub fn create_book(
        &self,
        author: &UserProfile,
        req: &CreateBookRequest,
    ) -> Result<BookView, ApiError> {
        self.check_active(author)?;
        validation::check_required("title", &req.title)?;
        validation::check_required("author", &req.author)?;
        validation::check_required("description", &req.description)?;
        validation::check_genre(&req.genre)?;
        validation::check_publication_year(req.publication_year)?;

        let cover_image = req
            .cover_image
            .clone()
            .or_else(|| req.isbn.as_ref().map(|isbn| open_library_cover(isbn)))
            .unwrap_or_else(|| PLACEHOLDER_COVER.to_string());

        let book = self.books.insert(Book {
            id: Uuid::new_v4(),
            seq: 0,
            title: req.title.trim().to_string(),
            author: req.author.trim().to_string(),
            isbn: req.isbn.clone(),
            genre: req.genre.clone(),
            description: req.description.clone(),
            cover_image,
            publication_year: req.publication_year,
            created_at: Utc::now(),
        });
        Ok(self.book_view(&book))
    }

    /// Book edit: moderator or admin.
    pub fn update_book(
        &self,
        actor: &UserProfile,
        id: Uuid,
        req: &UpdateBookRequest,
    ) -> Result<BookView, ApiError> {
        self.check_active(actor)?;
        if actor.role < Role::Moderator {
            return Err(ApiError::Forbidden(
                "moderator role required to edit books".to_string(),
            ));
        }
        if let Some(title) = &req.title {
            validation::check_required("title", title)?;
        }
        if let Some(genre) = &req.genre {
            validation::check_genre(genre)?;
        }
        if let Some(year) = req.publication_year {
            validation::check_publication_year(year)?;
        }
        let updated = self
            .books
            .update(id, |b| {
                if let Some(title) = &req.title {
                    b.title = title.trim().to_string();
                }
                if let Some(author) = &req.author {
                    b.author = author.trim().to_string();
                }
                if let Some(genre) = &req.genre {
                    b.genre = genre.clone();
                }
                if let Some(description) = &req.description {
                    b.description = description.clone();
                }
                if let Some(isbn) = &req.isbn {
                    b.isbn = Some(isbn.clone());
                }
                if let Some(cover) = &req.cover_image {
                    b.cover_image = cover.clone();
                }
                if let Some(year) = req.publication_year {
                    b.publication_year = year;
                }
            })
            .ok_or_else(|| ApiError::NotFound(format!("no book with id {}", id)))?;
        Ok(self.book_view(&updated))
    }

    /// Book delete: moderator or admin. Cascades the book's reviews.
    pub fn delete_book(&self, actor: &UserProfile, id: Uuid) -> Result<usize, ApiError> {
        self.check_active(actor)?;
        if actor.role < Role::Moderator {
            return Err(ApiError::Forbidden(
                "moderator role required to delete books".to_string(),
            ));
        }
        if self.books.remove(id).is_none() {
            return Err(ApiError::NotFound(format!("no book with id {}", id)));
        }
        Ok(self.reviews.remove_for_book(id))
    }

    // --- Reviews ---

    pub fn create_review(
        &self,
        author: &UserProfile,
        book_id: Uuid,
        req: &CreateReviewRequest,
    ) -> Result<ReviewView, ApiError> {
        self.check_active(author)?;
        validation::check_rating(req.rating)?;
        validation::check_review_text(&req.text)?;
        if !self.books.contains(book_id) {
            return Err(ApiError::NotFound(format!("no book with id {}", book_id)));
        }

        let review = self.reviews.insert(Review {
            id: Uuid::new_v4(),
            seq: 0,
            book_id,
            user_id: author.id,
            user_name: author.name.clone(),
            user_avatar: author.avatar.clone(),
            rating: req.rating,
            text: req.text.clone(),
            spoiler: req.spoiler,
            likers: HashSet::new(),
            created_at: Utc::now(),
        });

        // The book may have been deleted between the existence check and
        // the index link. Unstage so the failed write leaves no trace.
        if !self.books.contains(book_id) {
            self.reviews.unstage(review.id);
            return Err(ApiError::NotFound(format!("no book with id {}", book_id)));
        }

        Ok(review.view(Some(author.id)))
    }

    /// Review edit: the author, or moderator and up.
    pub fn update_review(
        &self,
        actor: &UserProfile,
        id: Uuid,
        req: &CreateReviewRequest,
    ) -> Result<ReviewView, ApiError> {
        self.check_active(actor)?;
        validation::check_rating(req.rating)?;
        validation::check_review_text(&req.text)?;
        let existing = self
            .reviews
            .get(id)
            .ok_or_else(|| ApiError::NotFound(format!("no review with id {}", id)))?;
        if existing.user_id != actor.id && actor.role < Role::Moderator {
            return Err(ApiError::Forbidden(
                "cannot edit another user's review".to_string(),
            ));
        }
        let updated = self
            .reviews
            .update(id, |r| {
                r.rating = req.rating;
                r.text = req.text.clone();
                r.spoiler = req.spoiler;
            })
            .ok_or_else(|| ApiError::NotFound(format!("no review with id {}", id)))?;
        Ok(updated.view(Some(actor.id)))
    }

    pub fn delete_review(&self, actor: &UserProfile, id: Uuid) -> Result<(), ApiError> {
        self.check_active(actor)?;
        let existing = self
            .reviews
            .get(id)
            .ok_or_else(|| ApiError::NotFound(format!("no review with id {}", id)))?;
        if existing.user_id != actor.id && actor.role < Role::Moderator {
            return Err(ApiError::Forbidden(
                "cannot delete another user's review".to_string(),
            ));
        }
        self.reviews.remove(id);
        Ok(())
    }

    pub fn like_review(&self, actor: &UserProfile, id: Uuid) -> Result<ReviewView, ApiError> {
        self.check_active(actor)?;
        let existing = self
            .reviews
            .get(id)
            .ok_or_else(|| ApiError::NotFound(format!("no review with id {}", id)))?;
        if existing.likers.contains(&actor.id) {
            return Err(ApiError::Conflict("review already liked".to_string()));
        }
        let updated = self
            .reviews
            .update(id, |r| {
                r.likers.insert(actor.id);
            })
            .ok_or_else(|| ApiError::NotFound(format!("no review with id {}", id)))?;
        Ok(updated.view(Some(actor.id)))
    }

    pub fn unlike_review(&self, actor: &UserProfile, id: Uuid) -> Result<ReviewView, ApiError> {
        self.check_active(actor)?;
        let existing = self
            .reviews
            .get(id)
            .ok_or_else(|| ApiError::NotFound(format!("no review with id {}", id)))?;
        if !existing.likers.contains(&actor.id) {
            return Err(ApiError::Conflict("review not liked".to_string()));
        }
        let updated = self
            .reviews
            .update(id, |r| {
                r.likers.remove(&actor.id);
            })
            .ok_or_else(|| ApiError::NotFound(format!("no review with id {}", id)))?;
        Ok(updated.view(Some(actor.id)))
    }

    // --- Admin ---

    pub fn change_role(&self, target: Uuid, role: Role) -> Result<UserView, ApiError> {
        let updated = self
            .users
            .update(target, |u| u.role = role)
            .ok_or_else(|| ApiError::NotFound(format!("no user with id {}", target)))?;
        Ok(self.user_view(&updated))
    }

    pub fn ban(&self, target: Uuid) -> Result<UserView, ApiError> {
        let existing = self
            .users
            .get(target)
            .ok_or_else(|| ApiError::NotFound(format!("no user with id {}", target)))?;
        if existing.status == Status::Banned {
            return Err(ApiError::Conflict("user is already banned".to_string()));
        }
        let updated = self
            .users
            .update(target, |u| u.status = Status::Banned)
            .ok_or_else(|| ApiError::NotFound(format!("no user with id {}", target)))?;
        Ok(self.user_view(&updated))
    }

    pub fn unban(&self, target: Uuid) -> Result<UserView, ApiError> {
        let existing = self
            .users
            .get(target)
            .ok_or_else(|| ApiError::NotFound(format!("no user with id {}", target)))?;
        if existing.status == Status::Active {
            return Err(ApiError::Conflict("user is not banned".to_string()));
        }
        let updated = self
            .users
            .update(target, |u| u.status = Status::Active)
            .ok_or_else(|| ApiError::NotFound(format!("no user with id {}", target)))?;
        Ok(self.user_view(&updated))
    }

    /// Platform analytics, computed live from the maps.
    pub fn analytics(&self, now: DateTime<Utc>) -> AnalyticsResponse {
        let reviews = self.reviews.all();
        let avg_rating = if reviews.is_empty() {
            0.0
        } else {
            reviews.iter().map(|r| r.rating as u32).sum::<u32>() as f64 / reviews.len() as f64
        };
        let same_month =
            |t: &DateTime<Utc>| t.year() == now.year() && t.month() == now.month();
        AnalyticsResponse {
            total_users: self.users.len(),
            total_books: self.books.len(),
            total_reviews: reviews.len(),
            avg_rating,
            new_users_this_month: self
                .users
                .all()
                .iter()
                .filter(|u| same_month(&u.join_date))
                .count(),
            new_books_this_month: self
                .books
                .all()
                .iter()
                .filter(|b| same_month(&b.created_at))
                .count(),
        }
    }

    /// The moderation queue: spoiler-marked reviews, newest first.
    pub fn flagged(&self) -> Vec<FlaggedReview> {
        self.reviews
            .all()
            .into_iter()
            .filter(|r| r.spoiler)
            .map(|r| FlaggedReview {
                book_title: self
                    .books
                    .get(r.book_id)
                    .map(|b| b.title)
                    .unwrap_or_default(),
                review: r.view(None),
            })
            .collect()
    }
}

const PLACEHOLDER_COVER: &str = "https://placehold.co/300x450?text=No+Cover";

fn open_library_cover(isbn: &str) -> String {
    format!("https://covers.openlibrary.org/b/isbn/{}-M.jpg", isbn)
}

fn default_avatar(name: &str) -> String {
    format!(
        "https://ui-avatars.com/api/?name={}",
        name.trim().replace(' ', "+")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Status;

    fn seeded() -> (Store, UserProfile) {
        let store = Store::new();
        let user = store
            .create_user("Ann Reviewer", "ann@example.com", "digest", Role::User)
            .unwrap();
        (store, user)
    }

    fn book_req(title: &str) -> CreateBookRequest {
        CreateBookRequest {
            title: title.to_string(),
            author: "Someone".to_string(),
            genre: "Fiction".to_string(),
            description: "About things.".to_string(),
            isbn: None,
            cover_image: None,
            publication_year: 2010,
        }
    }

    fn review_req(rating: u8) -> CreateReviewRequest {
        CreateReviewRequest {
            rating,
            text: "Loved it.".to_string(),
            spoiler: false,
        }
    }

    #[test]
    fn test_review_updates_computed_aggregates() {
        let (store, user) = seeded();
        let book = store.create_book(&user, &book_req("Dust")).unwrap();
        assert_eq!(book.review_count, 0);
        assert_eq!(book.average_rating, 0.0);

        store.create_review(&user, book.id, &review_req(5)).unwrap();
        store.create_review(&user, book.id, &review_req(2)).unwrap();

        let view = store.get_book_view(book.id).unwrap();
        assert_eq!(view.review_count, 2);
        assert_eq!(view.average_rating, 3.5);
    }

    #[test]
    fn test_invalid_review_leaves_store_unchanged() {
        let (store, user) = seeded();
        let book = store.create_book(&user, &book_req("Dust")).unwrap();

        let err = store.create_review(&user, book.id, &review_req(0)).unwrap_err();
        assert_eq!(err.code(), "invalid_request");
        assert_eq!(store.reviews.len(), 0);
        assert_eq!(store.get_book_view(book.id).unwrap().review_count, 0);
    }

    #[test]
    fn test_banned_author_cannot_write_but_store_reads_fine() {
        let (store, user) = seeded();
        let book = store.create_book(&user, &book_req("Dust")).unwrap();
        store.ban(user.id).unwrap();
        let banned = store.users.get(user.id).unwrap();

        assert_eq!(
            store
                .create_review(&banned, book.id, &review_req(4))
                .unwrap_err()
                .code(),
            "forbidden"
        );
        assert_eq!(
            store.create_book(&banned, &book_req("More")).unwrap_err().code(),
            "forbidden"
        );
        assert!(store.get_book_view(book.id).is_ok());
    }

    #[test]
    fn test_ban_is_surgical_and_conflict_on_repeat() {
        let (store, first) = seeded();
        let second = store
            .create_user("Bea", "bea@example.com", "digest", Role::User)
            .unwrap();

        store.ban(first.id).unwrap();
        assert_eq!(store.users.get(first.id).unwrap().status, Status::Banned);
        assert_eq!(store.users.get(second.id).unwrap().status, Status::Active);

        assert_eq!(store.ban(first.id).unwrap_err().code(), "conflict");
        store.unban(first.id).unwrap();
        assert_eq!(store.unban(first.id).unwrap_err().code(), "conflict");
    }

    #[test]
    fn test_role_change_targets_exactly_one_user() {
        let (store, first) = seeded();
        let second = store
            .create_user("Bea", "bea@example.com", "digest", Role::User)
            .unwrap();

        store.change_role(second.id, Role::Moderator).unwrap();
        assert_eq!(store.users.get(first.id).unwrap().role, Role::User);
        assert_eq!(store.users.get(second.id).unwrap().role, Role::Moderator);
    }

    #[test]
    fn test_review_permissions() {
        let (store, author) = seeded();
        let other = store
            .create_user("Bea", "bea@example.com", "digest", Role::User)
            .unwrap();
        let moderator = store
            .create_user("Mod", "mod@example.com", "digest", Role::Moderator)
            .unwrap();
        let book = store.create_book(&author, &book_req("Dust")).unwrap();
        let review = store.create_review(&author, book.id, &review_req(4)).unwrap();

        assert_eq!(
            store
                .update_review(&other, review.id, &review_req(1))
                .unwrap_err()
                .code(),
            "forbidden"
        );
        assert!(store.update_review(&author, review.id, &review_req(3)).is_ok());
        assert!(store.delete_review(&moderator, review.id).is_ok());
    }

    #[test]
    fn test_like_unlike_with_conflicts() {
        let (store, author) = seeded();
        let book = store.create_book(&author, &book_req("Dust")).unwrap();
        let review = store.create_review(&author, book.id, &review_req(4)).unwrap();

        assert_eq!(
            store.unlike_review(&author, review.id).unwrap_err().code(),
            "conflict"
        );
        let liked = store.like_review(&author, review.id).unwrap();
        assert_eq!(liked.likes, 1);
        assert!(liked.is_liked);
        assert_eq!(
            store.like_review(&author, review.id).unwrap_err().code(),
            "conflict"
        );
        let unliked = store.unlike_review(&author, review.id).unwrap();
        assert_eq!(unliked.likes, 0);
    }

    #[test]
    fn test_update_book_moderator_gate_and_partial_fields() {
        let (store, author) = seeded();
        let moderator = store
            .create_user("Mod", "mod@example.com", "digest", Role::Moderator)
            .unwrap();
        let book = store.create_book(&author, &book_req("Dust")).unwrap();

        let edit = UpdateBookRequest {
            title: Some("Dust, Revised".to_string()),
            genre: Some("Mystery".to_string()),
            ..Default::default()
        };
        assert_eq!(
            store.update_book(&author, book.id, &edit).unwrap_err().code(),
            "forbidden"
        );

        // Only the supplied fields change.
        let updated = store.update_book(&moderator, book.id, &edit).unwrap();
        assert_eq!(updated.title, "Dust, Revised");
        assert_eq!(updated.genre, "Mystery");
        assert_eq!(updated.author, "Someone");
        assert_eq!(updated.publication_year, 2010);

        // Field validation still applies on edit.
        let bad_genre = UpdateBookRequest {
            genre: Some("All".to_string()),
            ..Default::default()
        };
        assert_eq!(
            store
                .update_book(&moderator, book.id, &bad_genre)
                .unwrap_err()
                .code(),
            "invalid_request"
        );
        let bad_year = UpdateBookRequest {
            publication_year: Some(999),
            ..Default::default()
        };
        assert_eq!(
            store
                .update_book(&moderator, book.id, &bad_year)
                .unwrap_err()
                .code(),
            "invalid_request"
        );
        assert_eq!(store.get_book_view(book.id).unwrap().genre, "Mystery");

        assert_eq!(
            store
                .update_book(&moderator, Uuid::new_v4(), &edit)
                .unwrap_err()
                .code(),
            "not_found"
        );
    }

    #[test]
    fn test_delete_book_cascades_reviews() {
        let (store, author) = seeded();
        let moderator = store
            .create_user("Mod", "mod@example.com", "digest", Role::Moderator)
            .unwrap();
        let book = store.create_book(&author, &book_req("Dust")).unwrap();
        store.create_review(&author, book.id, &review_req(4)).unwrap();
        store.create_review(&author, book.id, &review_req(5)).unwrap();

        assert_eq!(
            store.delete_book(&author, book.id).unwrap_err().code(),
            "forbidden"
        );
        assert_eq!(store.delete_book(&moderator, book.id).unwrap(), 2);
        assert_eq!(store.reviews.len(), 0);
        assert_eq!(store.get_book_view(book.id).unwrap_err().code(), "not_found");
    }

    #[test]
    fn test_profile_edit_self_or_admin_only() {
        let (store, user) = seeded();
        let other = store
            .create_user("Bea", "bea@example.com", "digest", Role::User)
            .unwrap();
        let admin = store
            .create_user("Root", "root@example.com", "digest", Role::Admin)
            .unwrap();
        let req = UpdateProfileRequest {
            bio: Some("hello".to_string()),
            ..Default::default()
        };

        assert_eq!(
            store.update_profile(&other, user.id, &req).unwrap_err().code(),
            "forbidden"
        );
        assert!(store.update_profile(&user, user.id, &req).is_ok());
        assert!(store.update_profile(&admin, user.id, &req).is_ok());
        assert_eq!(store.users.get(user.id).unwrap().bio, "hello");
    }

    #[test]
    fn test_self_follow_rejected() {
        let (store, user) = seeded();
        assert_eq!(
            store.follow(&user, user.id).unwrap_err().code(),
            "invalid_request"
        );
    }

    #[test]
    fn test_analytics_counts_live_data() {
        let (store, user) = seeded();
        let book = store.create_book(&user, &book_req("Dust")).unwrap();
        store.create_review(&user, book.id, &review_req(5)).unwrap();
        store.create_review(&user, book.id, &review_req(3)).unwrap();

        let analytics = store.analytics(Utc::now());
        assert_eq!(analytics.total_users, 1);
        assert_eq!(analytics.total_books, 1);
        assert_eq!(analytics.total_reviews, 2);
        assert_eq!(analytics.avg_rating, 4.0);
        assert_eq!(analytics.new_users_this_month, 1);
        assert_eq!(analytics.new_books_this_month, 1);
    }

    #[test]
    fn test_flagged_content_is_spoiler_reviews() {
        let (store, user) = seeded();
        let book = store.create_book(&user, &book_req("Dust")).unwrap();
        store.create_review(&user, book.id, &review_req(3)).unwrap();
        store
            .create_review(
                &user,
                book.id,
                &CreateReviewRequest {
                    rating: 5,
                    text: "The butler did it.".to_string(),
                    spoiler: true,
                },
            )
            .unwrap();

        let flagged = store.flagged();
        assert_eq!(flagged.len(), 1);
        assert!(flagged[0].review.spoiler);
        assert_eq!(flagged[0].book_title, "Dust");
    }

    #[test]
    fn test_trending_window() {
        let (store, user) = seeded();
        let active = store.create_book(&user, &book_req("Active")).unwrap();
        let _quiet = store.create_book(&user, &book_req("Quiet")).unwrap();
        store.create_review(&user, active.id, &review_req(4)).unwrap();

        let trending = store.trending(Utc::now());
        assert_eq!(trending.len(), 1);
        assert_eq!(trending[0].id, active.id);

        // Ten days out, the review ages past the window.
        let later = Utc::now() + chrono::Duration::days(10);
        assert!(store.trending(later).is_empty());
    }

    #[test]
    fn test_isbn_derives_cover_url() {
        let (store, user) = seeded();
        let mut req = book_req("Dust");
        req.isbn = Some("9780441013593".to_string());
        let book = store.create_book(&user, &req).unwrap();
        assert!(book.cover_image.contains("9780441013593"));
    }
}

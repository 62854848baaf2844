//! Core records and wire types for the catalog.
//!
//! Stored records hold only source data; aggregates (average rating, review
//! count, follower counts) are computed projections and appear only on the
//! `*View` wire types. Wire fields are camelCase to match the browser client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Canonical genre list. Index 0 ("All") is a filter wildcard, not a
/// valid genre for a stored book.
pub const GENRES: &[&str] = &[
    "All",
    "Classic",
    "Fiction",
    "Fantasy",
    "Science Fiction",
    "Mystery",
    "Romance",
    "Non-Fiction",
    "Biography",
    "History",
];

/// Whether a genre is assignable to a book.
pub fn is_valid_genre(genre: &str) -> bool {
    genre != "All" && GENRES.contains(&genre)
}

/// User role, ordered by privilege.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Moderator,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "user" => Some(Role::User),
            "moderator" => Some(Role::Moderator),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// Account status. Banned users keep read access; every write path
/// re-checks this and refuses them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Active,
    Banned,
}

/// Stored book record. No stored aggregates: rating and review count are
/// always derived from the live review set.
#[derive(Debug, Clone)]
pub struct Book {
    pub id: Uuid,
    /// Insertion sequence, used as the final sort tiebreaker.
    pub seq: u64,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub genre: String,
    pub description: String,
    pub cover_image: String,
    pub publication_year: i32,
    pub created_at: DateTime<Utc>,
}

/// Book as rendered on the wire, with computed aggregates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookView {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub genre: String,
    pub description: String,
    pub cover_image: String,
    pub publication_year: i32,
    pub average_rating: f64,
    pub review_count: usize,
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    pub seq: u64,
}

impl Book {
    pub fn view(&self, average_rating: f64, review_count: usize) -> BookView {
        BookView {
            id: self.id,
            title: self.title.clone(),
            author: self.author.clone(),
            isbn: self.isbn.clone(),
            genre: self.genre.clone(),
            description: self.description.clone(),
            cover_image: self.cover_image.clone(),
            publication_year: self.publication_year,
            average_rating,
            review_count,
            created_at: self.created_at,
            seq: self.seq,
        }
    }
}

/// Stored review. Author name/avatar are denormalized at creation time;
/// likers is the set of user ids that liked this review.
#[derive(Debug, Clone)]
pub struct Review {
    pub id: Uuid,
    pub seq: u64,
    pub book_id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_avatar: String,
    pub rating: u8,
    pub text: String,
    pub spoiler: bool,
    pub likers: HashSet<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Review as rendered for a particular viewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    pub id: Uuid,
    pub book_id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_avatar: String,
    pub rating: u8,
    pub text: String,
    pub spoiler: bool,
    pub likes: usize,
    pub is_liked: bool,
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// `viewer` decides the `isLiked` flag; pass `None` for anonymous reads.
    pub fn view(&self, viewer: Option<Uuid>) -> ReviewView {
        ReviewView {
            id: self.id,
            book_id: self.book_id,
            user_id: self.user_id,
            user_name: self.user_name.clone(),
            user_avatar: self.user_avatar.clone(),
            rating: self.rating,
            text: self.text.clone(),
            spoiler: self.spoiler,
            likes: self.likers.len(),
            is_liked: viewer.map(|v| self.likers.contains(&v)).unwrap_or(false),
            created_at: self.created_at,
        }
    }
}

/// Stored user record. The password digest never leaves the store.
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub bio: String,
    pub avatar: String,
    pub role: Role,
    pub status: Status,
    pub join_date: DateTime<Utc>,
    pub password_digest: String,
}

impl UserProfile {
    pub fn is_banned(&self) -> bool {
        self.status == Status::Banned
    }
}

/// Profile as rendered on the wire, with computed stats.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub bio: String,
    pub avatar: String,
    pub role: Role,
    pub status: Status,
    pub review_count: usize,
    pub average_rating: f64,
    pub followers_count: usize,
    pub following_count: usize,
    pub join_date: DateTime<Utc>,
}

/// Computed per-user statistics.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserStats {
    pub review_count: usize,
    pub average_rating: f64,
    pub followers_count: usize,
    pub following_count: usize,
}

impl UserProfile {
    pub fn view(&self, stats: UserStats) -> UserView {
        UserView {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            bio: self.bio.clone(),
            avatar: self.avatar.clone(),
            role: self.role,
            status: self.status,
            review_count: stats.review_count,
            average_rating: stats.average_rating,
            followers_count: stats.followers_count,
            following_count: stats.following_count,
            join_date: self.join_date,
        }
    }
}

// --- Request bodies ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookRequest {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub description: String,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    pub publication_year: i32,
}

/// Partial book update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub publication_year: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReviewRequest {
    pub rating: u8,
    pub text: String,
    #[serde(default)]
    pub spoiler: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleChangeRequest {
    pub role: Role,
}

// --- Response bodies ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetTokenResponse {
    /// Returned directly because no mailer exists.
    pub reset_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookListResponse {
    pub books: Vec<BookView>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewListResponse {
    pub reviews: Vec<ReviewView>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserListResponse {
    pub users: Vec<UserView>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub total_users: usize,
    pub total_books: usize,
    pub total_reviews: usize,
    pub avg_rating: f64,
    pub new_users_this_month: usize,
    pub new_books_this_month: usize,
}

/// A review surfaced in the moderation queue, with its book title attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlaggedReview {
    pub book_title: String,
    #[serde(flatten)]
    pub review: ReviewView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlaggedContentResponse {
    pub reviews: Vec<FlaggedReview>,
}

//! Seed fixtures.
//!
//! The store starts empty and is seeded at startup from the built-in set
//! below or from an operator-supplied JSON file. Fixture timestamps are
//! relative (`days_ago`) so trending and "new this month" always have
//! live-looking data regardless of when the process starts.

use crate::auth::digest_password;
use crate::config::AuthConfig;
use crate::error::ApiError;
use crate::models::{Book, Review, Role, Status, UserProfile};
use crate::store::Store;
use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use uuid::Uuid;

/// A complete seed set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub users: Vec<SeedUser>,
    #[serde(default)]
    pub books: Vec<SeedBook>,
    #[serde(default)]
    pub reviews: Vec<SeedReview>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedUser {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub joined_days_ago: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedBook {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub isbn: Option<String>,
    pub genre: String,
    pub description: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    pub publication_year: i32,
    #[serde(default)]
    pub added_days_ago: i64,
}

/// Reviews reference their book by title and author by email, so fixture
/// files stay readable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedReview {
    pub book_title: String,
    pub user_email: String,
    pub rating: u8,
    pub text: String,
    #[serde(default)]
    pub spoiler: bool,
    #[serde(default)]
    pub days_ago: i64,
}

/// Load a fixture file.
pub fn load_file(path: &Path) -> Result<SeedData> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading fixtures {}", path.display()))?;
    let data: SeedData = serde_json::from_str(&text)
        .with_context(|| format!("parsing fixtures {}", path.display()))?;
    Ok(data)
}

/// Apply a seed set to an empty store. Fixture inserts bypass the write
/// journal and permission checks; they are operator data, not user writes.
pub fn apply(store: &Store, data: &SeedData) -> Result<()> {
    let now = Utc::now();

    for seed in &data.users {
        let user = UserProfile {
            id: Uuid::new_v4(),
            name: seed.name.clone(),
            email: seed.email.clone(),
            bio: seed.bio.clone(),
            avatar: format!(
                "https://ui-avatars.com/api/?name={}",
                seed.name.replace(' ', "+")
            ),
            role: seed.role,
            status: seed.status,
            join_date: now - Duration::days(seed.joined_days_ago),
            password_digest: digest_password(&seed.password),
        };
        if !store.users.insert(user) {
            anyhow::bail!("duplicate fixture email: {}", seed.email);
        }
    }

    for seed in &data.books {
        let cover_image = seed
            .cover_image
            .clone()
            .or_else(|| {
                seed.isbn
                    .as_ref()
                    .map(|isbn| format!("https://covers.openlibrary.org/b/isbn/{}-M.jpg", isbn))
            })
            .unwrap_or_else(|| "https://placehold.co/300x450?text=No+Cover".to_string());
        store.books.insert(Book {
            id: Uuid::new_v4(),
            seq: 0,
            title: seed.title.clone(),
            author: seed.author.clone(),
            isbn: seed.isbn.clone(),
            genre: seed.genre.clone(),
            description: seed.description.clone(),
            cover_image,
            publication_year: seed.publication_year,
            created_at: now - Duration::days(seed.added_days_ago),
        });
    }

    for seed in &data.reviews {
        let book = store
            .books
            .all()
            .into_iter()
            .find(|b| b.title == seed.book_title)
            .with_context(|| format!("fixture review references unknown book: {}", seed.book_title))?;
        let user = store
            .users
            .get_by_email(&seed.user_email)
            .with_context(|| format!("fixture review references unknown user: {}", seed.user_email))?;
        store.reviews.insert(Review {
            id: Uuid::new_v4(),
            seq: 0,
            book_id: book.id,
            user_id: user.id,
            user_name: user.name.clone(),
            user_avatar: user.avatar.clone(),
            rating: seed.rating,
            text: seed.text.clone(),
            spoiler: seed.spoiler,
            likers: HashSet::new(),
            created_at: now - Duration::days(seed.days_ago),
        });
    }

    Ok(())
}

/// Seed the configured admin account, if a password was provided.
pub fn seed_admin(store: &Store, auth: &AuthConfig) -> Result<bool> {
    let Some(password) = &auth.admin_password else {
        return Ok(false);
    };
    match store.create_user(
        &auth.admin_name,
        &auth.admin_email,
        &digest_password(password.expose_secret()),
        Role::Admin,
    ) {
        Ok(_) => Ok(true),
        // Fixture files may carry their own admin under the same email.
        Err(ApiError::Conflict(_)) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// The built-in seed set.
pub fn builtin() -> SeedData {
    SeedData {
        users: vec![
            SeedUser {
                name: "John Doe".to_string(),
                email: "john@example.com".to_string(),
                password: "Reader2024".to_string(),
                bio: "Mystery devotee. Judging books by their last pages.".to_string(),
                role: Role::User,
                status: Status::Active,
                joined_days_ago: 400,
            },
            SeedUser {
                name: "Jane Smith".to_string(),
                email: "jane@example.com".to_string(),
                password: "Reader2024".to_string(),
                bio: "I read everything twice.".to_string(),
                role: Role::User,
                status: Status::Active,
                joined_days_ago: 210,
            },
            SeedUser {
                name: "Bob Johnson".to_string(),
                email: "bob@example.com".to_string(),
                password: "Reader2024".to_string(),
                bio: String::new(),
                role: Role::Moderator,
                status: Status::Active,
                joined_days_ago: 530,
            },
        ],
        books: vec![
            SeedBook {
                title: "The Midnight Library".to_string(),
                author: "Matt Haig".to_string(),
                isbn: Some("9780525559474".to_string()),
                genre: "Fiction".to_string(),
                description: "Between life and death there is a library of other lives."
                    .to_string(),
                cover_image: None,
                publication_year: 2020,
                added_days_ago: 90,
            },
            SeedBook {
                title: "Dune".to_string(),
                author: "Frank Herbert".to_string(),
                isbn: Some("9780441013593".to_string()),
                genre: "Science Fiction".to_string(),
                description: "The desert planet Arrakis and the spice that rules it.".to_string(),
                cover_image: None,
                publication_year: 1965,
                added_days_ago: 300,
            },
            SeedBook {
                title: "The Name of the Wind".to_string(),
                author: "Patrick Rothfuss".to_string(),
                isbn: Some("9780756404741".to_string()),
                genre: "Fantasy".to_string(),
                description: "Kvothe tells the story of how he became a legend.".to_string(),
                cover_image: None,
                publication_year: 2007,
                added_days_ago: 150,
            },
            SeedBook {
                title: "The Thursday Murder Club".to_string(),
                author: "Richard Osman".to_string(),
                isbn: Some("9781984880963".to_string()),
                genre: "Mystery".to_string(),
                description: "Four retirees meet weekly to investigate cold cases.".to_string(),
                cover_image: None,
                publication_year: 2020,
                added_days_ago: 45,
            },
            SeedBook {
                title: "Pride and Prejudice".to_string(),
                author: "Jane Austen".to_string(),
                isbn: Some("9780141439518".to_string()),
                genre: "Classic".to_string(),
                description: "It is a truth universally acknowledged...".to_string(),
                cover_image: None,
                publication_year: 1813,
                added_days_ago: 500,
            },
            SeedBook {
                title: "Sapiens".to_string(),
                author: "Yuval Noah Harari".to_string(),
                isbn: Some("9780062316097".to_string()),
                genre: "Non-Fiction".to_string(),
                description: "A brief history of humankind.".to_string(),
                cover_image: None,
                publication_year: 2011,
                added_days_ago: 365,
            },
            SeedBook {
                title: "The Song of Achilles".to_string(),
                author: "Madeline Miller".to_string(),
                isbn: Some("9780062060624".to_string()),
                genre: "Romance".to_string(),
                description: "The tale of Achilles and Patroclus, retold.".to_string(),
                cover_image: None,
                publication_year: 2012,
                added_days_ago: 30,
            },
            SeedBook {
                title: "A Promised Land".to_string(),
                author: "Barack Obama".to_string(),
                isbn: Some("9781524763169".to_string()),
                genre: "Biography".to_string(),
                description: "A memoir of a presidency's first term.".to_string(),
                cover_image: None,
                publication_year: 2020,
                added_days_ago: 200,
            },
        ],
        reviews: vec![
            SeedReview {
                book_title: "The Midnight Library".to_string(),
                user_email: "john@example.com".to_string(),
                rating: 5,
                text: "Finished it in one sitting. The premise never wears thin.".to_string(),
                spoiler: false,
                days_ago: 2,
            },
            SeedReview {
                book_title: "The Midnight Library".to_string(),
                user_email: "jane@example.com".to_string(),
                rating: 4,
                text: "Warm and clever, though the ending is a touch tidy.".to_string(),
                spoiler: false,
                days_ago: 5,
            },
            SeedReview {
                book_title: "Dune".to_string(),
                user_email: "bob@example.com".to_string(),
                rating: 5,
                text: "Still the benchmark for world-building.".to_string(),
                spoiler: false,
                days_ago: 20,
            },
            SeedReview {
                book_title: "Dune".to_string(),
                user_email: "jane@example.com".to_string(),
                rating: 4,
                text: "Dense but rewarding. Keep the glossary handy.".to_string(),
                spoiler: false,
                days_ago: 3,
            },
            SeedReview {
                book_title: "The Name of the Wind".to_string(),
                user_email: "john@example.com".to_string(),
                rating: 4,
                text: "Beautiful prose. Kvothe is insufferable in the best way.".to_string(),
                spoiler: false,
                days_ago: 1,
            },
            SeedReview {
                book_title: "The Thursday Murder Club".to_string(),
                user_email: "jane@example.com".to_string(),
                rating: 5,
                text: "The killer being the gardener's son completely got me.".to_string(),
                spoiler: true,
                days_ago: 4,
            },
            SeedReview {
                book_title: "The Thursday Murder Club".to_string(),
                user_email: "bob@example.com".to_string(),
                rating: 3,
                text: "Charming, but the plot leans hard on coincidence.".to_string(),
                spoiler: false,
                days_ago: 6,
            },
            SeedReview {
                book_title: "Pride and Prejudice".to_string(),
                user_email: "jane@example.com".to_string(),
                rating: 5,
                text: "Re-read for the tenth time. Still perfect.".to_string(),
                spoiler: false,
                days_ago: 60,
            },
            SeedReview {
                book_title: "Sapiens".to_string(),
                user_email: "john@example.com".to_string(),
                rating: 3,
                text: "Sweeping, occasionally glib. Worth arguing with.".to_string(),
                spoiler: false,
                days_ago: 45,
            },
            SeedReview {
                book_title: "The Song of Achilles".to_string(),
                user_email: "jane@example.com".to_string(),
                rating: 5,
                text: "Wrecked me. Knowing the Iliad does not soften it.".to_string(),
                spoiler: false,
                days_ago: 2,
            },
        ],
    }
}

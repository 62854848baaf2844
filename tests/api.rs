//! End-to-end tests: each test binds an ephemeral port and drives the full
//! HTTP surface through the typed client.

use bookpro::client::{api_failure, BookQuery, BookproClient, PageQuery};
use bookpro::config::Config;
use bookpro::models::{
    CreateBookRequest, CreateReviewRequest, Role, UpdateBookRequest, UpdateProfileRequest,
};
use bookpro::server::{self, AppState};
use secrecy::SecretString;
use std::sync::Arc;

const ADMIN_EMAIL: &str = "admin@bookpro.local";
const ADMIN_PASSWORD: &str = "RootPass1";

/// Spin up a server on an ephemeral port. `seeded` controls whether the
/// built-in fixtures load; the admin account is always present.
async fn spawn(seeded: bool) -> (String, Arc<AppState>) {
    let mut config = Config::default();
    config.store.seed_fixtures = seeded;
    config.auth.admin_password = Some(SecretString::from(ADMIN_PASSWORD.to_string()));

    let state = AppState::new(config);
    state.seed().expect("seed store");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    let app = server::router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    (format!("http://{}", addr), state)
}

async fn admin_client(base: &str) -> BookproClient {
    let mut client = BookproClient::new(base);
    client
        .login(ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .expect("admin login");
    client
}

fn book_request(title: &str) -> CreateBookRequest {
    CreateBookRequest {
        title: title.to_string(),
        author: "Test Author".to_string(),
        genre: "Fiction".to_string(),
        description: "A book for testing.".to_string(),
        isbn: None,
        cover_image: None,
        publication_year: 2015,
    }
}

fn review_request(rating: u8, text: &str) -> CreateReviewRequest {
    CreateReviewRequest {
        rating,
        text: text.to_string(),
        spoiler: false,
    }
}

#[tokio::test]
async fn signup_login_logout_flow() {
    let (base, _state) = spawn(false).await;
    let mut client = BookproClient::new(&base);

    let user = client
        .signup("Ann Reviewer", "ann@example.com", "Password1")
        .await
        .unwrap();
    assert_eq!(user.name, "Ann Reviewer");
    assert_eq!(user.role, Role::User);
    assert!(client.token().is_some());

    // Duplicate email conflicts.
    let mut dup = BookproClient::new(&base);
    let err = dup
        .signup("Other", "ann@example.com", "Password1")
        .await
        .unwrap_err();
    assert_eq!(api_failure(&err).unwrap().error, "conflict");

    // Weak password rejected.
    let mut weak = BookproClient::new(&base);
    let err = weak
        .signup("Weak", "weak@example.com", "short")
        .await
        .unwrap_err();
    assert_eq!(api_failure(&err).unwrap().error, "invalid_request");

    // Wrong password is a 401.
    let mut login = BookproClient::new(&base);
    let err = login
        .login("ann@example.com", "WrongPass1")
        .await
        .unwrap_err();
    assert_eq!(api_failure(&err).unwrap().error, "unauthorized");

    // Logout revokes the token; further writes fail.
    client.logout().await.unwrap();
    let mut stale = BookproClient::new(&base);
    stale.set_token(Some("stale-token".to_string()));
    let err = stale
        .create_book(&book_request("After Logout"))
        .await
        .unwrap_err();
    assert_eq!(api_failure(&err).unwrap().status, 401);
}

#[tokio::test]
async fn catalog_search_genre_sort_example() {
    let (base, _state) = spawn(true).await;
    let client = BookproClient::new(&base);

    // Search "the", genre All, sort by rating.
    let result = client
        .list_books(&BookQuery {
            search: Some("the".to_string()),
            genre: Some("All".to_string()),
            sort: Some("rating".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(!result.books.is_empty());
    for book in &result.books {
        assert!(book.title.to_lowercase().contains("the"));
    }
    for pair in result.books.windows(2) {
        assert!(pair[0].average_rating >= pair[1].average_rating);
    }
    let titles: Vec<&str> = result.books.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "The Song of Achilles",
            "The Midnight Library",
            "The Name of the Wind",
            "The Thursday Murder Club",
        ]
    );

    // Genre filter is exact.
    let mysteries = client
        .list_books(&BookQuery {
            genre: Some("Mystery".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(mysteries.books.iter().all(|b| b.genre == "Mystery"));

    // Pagination reports the pre-page total.
    let page = client
        .list_books(&BookQuery {
            page: Some(2),
            limit: Some(3),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.total, 8);
    assert_eq!(page.books.len(), 3);
    assert_eq!(page.page, 2);
}

#[tokio::test]
async fn review_submission_updates_computed_aggregates() {
    let (base, state) = spawn(false).await;
    let mut client = BookproClient::new(&base);
    client
        .signup("Ann", "ann@example.com", "Password1")
        .await
        .unwrap();

    let book = client.create_book(&book_request("Aggregates")).await.unwrap();
    assert_eq!(book.review_count, 0);
    assert_eq!(book.average_rating, 0.0);

    client
        .create_review(book.id, &review_request(5, "Excellent"))
        .await
        .unwrap();
    client
        .create_review(book.id, &review_request(2, "Hmm"))
        .await
        .unwrap();

    let view = client.get_book(book.id).await.unwrap();
    assert_eq!(view.review_count, 2);
    assert_eq!(view.average_rating, 3.5);

    // Newest first; the fresh submission is the head of the list.
    let reviews = client
        .book_reviews(book.id, &PageQuery::default())
        .await
        .unwrap();
    assert_eq!(reviews.total, 2);
    assert_eq!(reviews.reviews[0].text, "Hmm");

    // Out-of-range rating is rejected and journaled as failed.
    let err = client
        .create_review(book.id, &review_request(6, "Too high"))
        .await
        .unwrap_err();
    assert_eq!(api_failure(&err).unwrap().error, "invalid_request");
    assert_eq!(state.store.reviews.len(), 2);

    let failed = state
        .journal
        .recent(10)
        .into_iter()
        .find(|r| matches!(&r.state, bookpro::store::journal::WriteState::Failed { error } if error == "invalid_request"));
    assert!(failed.is_some());
}

#[tokio::test]
async fn like_unlike_with_conflicts() {
    let (base, _state) = spawn(false).await;
    let mut author = BookproClient::new(&base);
    author
        .signup("Ann", "ann@example.com", "Password1")
        .await
        .unwrap();
    let book = author.create_book(&book_request("Likes")).await.unwrap();
    let review = author
        .create_review(book.id, &review_request(4, "Good"))
        .await
        .unwrap();

    let mut other = BookproClient::new(&base);
    other
        .signup("Bea", "bea@example.com", "Password1")
        .await
        .unwrap();

    let liked = other.like_review(review.id).await.unwrap();
    assert_eq!(liked.likes, 1);
    assert!(liked.is_liked);

    let err = other.like_review(review.id).await.unwrap_err();
    assert_eq!(api_failure(&err).unwrap().error, "conflict");

    let unliked = other.unlike_review(review.id).await.unwrap();
    assert_eq!(unliked.likes, 0);
    let err = other.unlike_review(review.id).await.unwrap_err();
    assert_eq!(api_failure(&err).unwrap().error, "conflict");

    // The author's own read shows the like as someone else's.
    let from_author = author
        .book_reviews(book.id, &PageQuery::default())
        .await
        .unwrap();
    assert!(!from_author.reviews[0].is_liked);
}

#[tokio::test]
async fn admin_console_role_and_ban_flow() {
    let (base, _state) = spawn(false).await;
    let mut user = BookproClient::new(&base);
    let ann = user
        .signup("Ann", "ann@example.com", "Password1")
        .await
        .unwrap();
    let mut other = BookproClient::new(&base);
    let bea = other
        .signup("Bea", "bea@example.com", "Password1")
        .await
        .unwrap();

    // Non-admin sessions cannot reach the console.
    let err = user.admin_users(&PageQuery::default()).await.unwrap_err();
    assert_eq!(api_failure(&err).unwrap().error, "forbidden");

    let admin = admin_client(&base).await;

    // Search finds by name or email, case-insensitively.
    let found = admin
        .admin_users(&PageQuery {
            search: Some("BEA".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(found.users.len(), 1);
    assert_eq!(found.users[0].id, bea.id);

    // Role change mutates exactly the targeted user.
    admin.set_user_role(bea.id, Role::Moderator).await.unwrap();
    let ann_after = admin.get_user(ann.id).await.unwrap();
    let bea_after = admin.get_user(bea.id).await.unwrap();
    assert_eq!(ann_after.role, Role::User);
    assert_eq!(bea_after.role, Role::Moderator);

    // Ban: exactly that row, write paths refuse, reads still work.
    admin.ban_user(ann.id).await.unwrap();
    let err = admin.ban_user(ann.id).await.unwrap_err();
    assert_eq!(api_failure(&err).unwrap().error, "conflict");

    let listing = admin.admin_users(&PageQuery::default()).await.unwrap();
    for entry in &listing.users {
        let banned = entry.id == ann.id;
        assert_eq!(entry.status == bookpro::models::Status::Banned, banned);
    }

    let err = user
        .create_book(&book_request("While Banned"))
        .await
        .unwrap_err();
    assert_eq!(api_failure(&err).unwrap().error, "forbidden");
    assert!(user.list_books(&BookQuery::default()).await.is_ok());

    admin.unban_user(ann.id).await.unwrap();
    assert!(user.create_book(&book_request("After Unban")).await.is_ok());
}

#[tokio::test]
async fn profiles_are_public_but_edits_are_guarded() {
    let (base, _state) = spawn(false).await;
    let mut owner = BookproClient::new(&base);
    let ann = owner
        .signup("Ann", "ann@example.com", "Password1")
        .await
        .unwrap();

    // Read-only profile view without any session.
    let anonymous = BookproClient::new(&base);
    let profile = anonymous.get_user(ann.id).await.unwrap();
    assert_eq!(profile.name, "Ann");

    // Mutation without a session is a 401.
    let err = anonymous
        .update_profile(
            ann.id,
            &UpdateProfileRequest {
                bio: Some("hacked".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(api_failure(&err).unwrap().status, 401);

    // Another user cannot edit; the owner can.
    let mut other = BookproClient::new(&base);
    other
        .signup("Bea", "bea@example.com", "Password1")
        .await
        .unwrap();
    let err = other
        .update_profile(
            ann.id,
            &UpdateProfileRequest {
                bio: Some("nope".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(api_failure(&err).unwrap().error, "forbidden");

    let updated = owner
        .update_profile(
            ann.id,
            &UpdateProfileRequest {
                bio: Some("Reader of everything.".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.bio, "Reader of everything.");
}

#[tokio::test]
async fn follow_edges_and_profile_stats() {
    let (base, _state) = spawn(false).await;
    let mut ann = BookproClient::new(&base);
    let ann_view = ann
        .signup("Ann", "ann@example.com", "Password1")
        .await
        .unwrap();
    let mut bea = BookproClient::new(&base);
    let bea_view = bea
        .signup("Bea", "bea@example.com", "Password1")
        .await
        .unwrap();

    let err = ann.follow(ann_view.id).await.unwrap_err();
    assert_eq!(api_failure(&err).unwrap().error, "invalid_request");

    let target = ann.follow(bea_view.id).await.unwrap();
    assert_eq!(target.followers_count, 1);

    let err = ann.follow(bea_view.id).await.unwrap_err();
    assert_eq!(api_failure(&err).unwrap().error, "conflict");

    let ann_profile = ann.get_user(ann_view.id).await.unwrap();
    assert_eq!(ann_profile.following_count, 1);
    assert_eq!(ann_profile.followers_count, 0);

    let after = ann.unfollow(bea_view.id).await.unwrap();
    assert_eq!(after.followers_count, 0);
}

#[tokio::test]
async fn trending_analytics_and_flagged_content() {
    let (base, _state) = spawn(true).await;
    let client = BookproClient::new(&base);

    let trending = client.trending().await.unwrap();
    assert_eq!(trending.len(), 5);
    assert_eq!(trending[0].title, "The Midnight Library");
    assert_eq!(trending[1].title, "The Thursday Murder Club");

    let admin = admin_client(&base).await;
    let analytics = admin.analytics().await.unwrap();
    // Three fixture users plus the seeded admin.
    assert_eq!(analytics.total_users, 4);
    assert_eq!(analytics.total_books, 8);
    assert_eq!(analytics.total_reviews, 10);
    assert!((analytics.avg_rating - 4.3).abs() < 1e-9);

    let flagged = admin.flagged_content().await.unwrap();
    assert_eq!(flagged.reviews.len(), 1);
    assert!(flagged.reviews[0].review.spoiler);
    assert_eq!(flagged.reviews[0].book_title, "The Thursday Murder Club");
}

#[tokio::test]
async fn password_reset_revokes_sessions() {
    let (base, _state) = spawn(false).await;
    let mut client = BookproClient::new(&base);
    client
        .signup("Ann", "ann@example.com", "Password1")
        .await
        .unwrap();

    let reset_token = client.forgot_password("ann@example.com").await.unwrap();
    client
        .reset_password(&reset_token, "NewPassword2")
        .await
        .unwrap();

    // Old session gone, token single-use, old password dead.
    let err = client
        .create_book(&book_request("Stale Session"))
        .await
        .unwrap_err();
    assert_eq!(api_failure(&err).unwrap().status, 401);
    assert!(client
        .reset_password(&reset_token, "NewPassword3")
        .await
        .is_err());

    let mut fresh = BookproClient::new(&base);
    assert!(fresh.login("ann@example.com", "Password1").await.is_err());
    assert!(fresh
        .login("ann@example.com", "NewPassword2")
        .await
        .is_ok());
}

#[tokio::test]
async fn book_moderation_edit_and_delete_cascades() {
    let (base, _state) = spawn(false).await;
    let mut author = BookproClient::new(&base);
    let ann = author
        .signup("Ann", "ann@example.com", "Password1")
        .await
        .unwrap();
    let book = author.create_book(&book_request("Doomed")).await.unwrap();
    author
        .create_review(book.id, &review_request(4, "Fine"))
        .await
        .unwrap();

    // Plain users can neither edit nor delete.
    let edit = UpdateBookRequest {
        description: Some("Now with a foreword.".to_string()),
        ..Default::default()
    };
    let err = author.update_book(book.id, &edit).await.unwrap_err();
    assert_eq!(api_failure(&err).unwrap().error, "forbidden");
    let err = author.delete_book(book.id).await.unwrap_err();
    assert_eq!(api_failure(&err).unwrap().error, "forbidden");

    let admin = admin_client(&base).await;
    admin.set_user_role(ann.id, Role::Moderator).await.unwrap();

    // As a moderator the edit goes through and touches only the given field.
    let updated = author.update_book(book.id, &edit).await.unwrap();
    assert_eq!(updated.description, "Now with a foreword.");
    assert_eq!(updated.title, "Doomed");

    author.delete_book(book.id).await.unwrap();
    let err = author.get_book(book.id).await.unwrap_err();
    assert_eq!(api_failure(&err).unwrap().error, "not_found");
    let remaining = author.recent_reviews(&PageQuery::default()).await.unwrap();
    assert_eq!(remaining.total, 0);
}

#[tokio::test]
async fn health_and_metrics_endpoints() {
    let (base, _state) = spawn(true).await;

    let health: serde_json::Value = reqwest::get(format!("{}/health", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["books"], 8);

    let metrics = reqwest::get(format!("{}/metrics", base))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(metrics.contains("bookpro_http_requests_total"));
}

#[tokio::test]
async fn unknown_book_is_not_found() {
    let (base, _state) = spawn(false).await;
    let client = BookproClient::new(&base);
    let err = client.get_book(uuid::Uuid::new_v4()).await.unwrap_err();
    let failure = api_failure(&err).unwrap();
    assert_eq!(failure.error, "not_found");
    assert_eq!(failure.status, 404);
}

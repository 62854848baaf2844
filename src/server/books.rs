//! Book routes: catalog list, detail, trending, CRUD, and per-book reviews.

use super::{AppState, ListParams};
use crate::catalog::{self, SortKey};
use crate::error::ApiError;
use crate::models::{
    BookListResponse, BookView, CreateBookRequest, CreateReviewRequest, ReviewListResponse,
    ReviewView, UpdateBookRequest,
};
use crate::store::journal::WriteKind;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_handler).post(create_handler))
        .route("/trending", get(trending_handler))
        .route(
            "/{id}",
            get(detail_handler)
                .put(update_handler)
                .delete(delete_handler),
        )
        .route(
            "/{id}/reviews",
            get(book_reviews_handler).post(create_review_handler),
        )
}

/// GET /api/books
///
/// Search filter, then genre filter, then ordering; pagination last.
/// Recomputed on every request.
async fn list_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Json<BookListResponse> {
    let sort = SortKey::parse(params.sort.as_deref().unwrap_or("title"));
    let filtered = catalog::filter_and_sort(
        state.store.book_views(),
        params.search.as_deref(),
        params.genre.as_deref(),
        sort,
    );
    let limit = params.clamped_limit();
    let (books, total) = catalog::paginate(filtered, params.page, limit);
    Json(BookListResponse {
        books,
        total,
        page: params.page,
        limit,
    })
}

/// GET /api/books/trending
async fn trending_handler(State(state): State<Arc<AppState>>) -> Json<Vec<BookView>> {
    Json(state.store.trending(Utc::now()))
}

/// GET /api/books/{id}
async fn detail_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookView>, ApiError> {
    Ok(Json(state.store.get_book_view(id)?))
}

/// POST /api/books
async fn create_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateBookRequest>,
) -> Result<Json<BookView>, ApiError> {
    let user = state.current_user(&headers)?;
    let book = state.journaled(WriteKind::CreateBook, Some(user.id), || {
        state.store.create_book(&user, &req)
    })?;
    eprintln!("[books] {} added \"{}\"", user.name, book.title);
    Ok(Json(book))
}

/// PUT /api/books/{id} (moderator and up)
async fn update_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<UpdateBookRequest>,
) -> Result<Json<BookView>, ApiError> {
    let user = state.current_user(&headers)?;
    let book = state.journaled(WriteKind::UpdateBook, Some(user.id), || {
        state.store.update_book(&user, id, &req)
    })?;
    Ok(Json(book))
}

/// DELETE /api/books/{id} (moderator and up; cascades reviews)
async fn delete_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = state.current_user(&headers)?;
    let cascaded = state.journaled(WriteKind::DeleteBook, Some(user.id), || {
        state.store.delete_book(&user, id)
    })?;
    eprintln!("[books] {} deleted book {} ({} reviews)", user.name, id, cascaded);
    Ok(Json(json!({ "success": true, "reviews_removed": cascaded })))
}

/// GET /api/books/{id}/reviews — newest first, paginated.
async fn book_reviews_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(params): Query<ListParams>,
    headers: HeaderMap,
) -> Result<Json<ReviewListResponse>, ApiError> {
    if !state.store.books.contains(id) {
        return Err(ApiError::NotFound(format!("no book with id {}", id)));
    }
    let viewer = state.optional_user(&headers).map(|u| u.id);
    let views: Vec<ReviewView> = state
        .store
        .reviews
        .for_book(id)
        .iter()
        .map(|r| r.view(viewer))
        .collect();
    let limit = params.clamped_limit();
    let (reviews, total) = catalog::paginate(views, params.page, limit);
    Ok(Json(ReviewListResponse {
        reviews,
        total,
        page: params.page,
        limit,
    }))
}

/// POST /api/books/{id}/reviews
async fn create_review_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<CreateReviewRequest>,
) -> Result<Json<ReviewView>, ApiError> {
    let user = state.current_user(&headers)?;
    let review = state.journaled(WriteKind::CreateReview, Some(user.id), || {
        state.store.create_review(&user, id, &req)
    })?;
    Ok(Json(review))
}

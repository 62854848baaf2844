//! Review routes: recent feed, edits, and likes.

use super::{AppState, ListParams};
use crate::catalog;
use crate::error::ApiError;
use crate::models::{CreateReviewRequest, ReviewListResponse, ReviewView};
use crate::store::journal::WriteKind;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_handler))
        .route("/{id}", put(update_handler).delete(delete_handler))
        .route("/{id}/like", post(like_handler).delete(unlike_handler))
}

/// GET /api/reviews — recent reviews across all books, newest first.
async fn list_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
    headers: HeaderMap,
) -> Json<ReviewListResponse> {
    let viewer = state.optional_user(&headers).map(|u| u.id);
    let views: Vec<ReviewView> = state
        .store
        .reviews
        .all()
        .iter()
        .map(|r| r.view(viewer))
        .collect();
    let limit = params.clamped_limit();
    let (reviews, total) = catalog::paginate(views, params.page, limit);
    Json(ReviewListResponse {
        reviews,
        total,
        page: params.page,
        limit,
    })
}

/// PUT /api/reviews/{id} — author, or moderator and up.
async fn update_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<CreateReviewRequest>,
) -> Result<Json<ReviewView>, ApiError> {
    let user = state.current_user(&headers)?;
    let review = state.journaled(WriteKind::UpdateReview, Some(user.id), || {
        state.store.update_review(&user, id, &req)
    })?;
    Ok(Json(review))
}

/// DELETE /api/reviews/{id} — author, or moderator and up.
async fn delete_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = state.current_user(&headers)?;
    state.journaled(WriteKind::DeleteReview, Some(user.id), || {
        state.store.delete_review(&user, id)
    })?;
    Ok(Json(json!({ "success": true })))
}

/// POST /api/reviews/{id}/like — 409 when already liked.
async fn like_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<ReviewView>, ApiError> {
    let user = state.current_user(&headers)?;
    let review = state.journaled(WriteKind::LikeReview, Some(user.id), || {
        state.store.like_review(&user, id)
    })?;
    Ok(Json(review))
}

/// DELETE /api/reviews/{id}/like — 409 when not liked.
async fn unlike_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<ReviewView>, ApiError> {
    let user = state.current_user(&headers)?;
    let review = state.journaled(WriteKind::UnlikeReview, Some(user.id), || {
        state.store.unlike_review(&user, id)
    })?;
    Ok(Json(review))
}

//! User routes: profiles, a user's reviews, and follow edges.
//!
//! Profile reads are public; a fetch without a session is the read-only
//! view, identical in shape.

use super::{AppState, ListParams};
use crate::catalog;
use crate::error::ApiError;
use crate::models::{ReviewListResponse, ReviewView, UpdateProfileRequest, UserView};
use crate::store::journal::WriteKind;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use uuid::Uuid;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/{id}", get(profile_handler).put(update_handler))
        .route("/{id}/reviews", get(user_reviews_handler))
        .route("/{id}/follow", post(follow_handler).delete(unfollow_handler))
}

/// GET /api/users/{id}
async fn profile_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserView>, ApiError> {
    Ok(Json(state.store.get_user_view(id)?))
}

/// PUT /api/users/{id} — self or admin.
async fn update_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserView>, ApiError> {
    let user = state.current_user(&headers)?;
    let updated = state.journaled(WriteKind::UpdateProfile, Some(user.id), || {
        state.store.update_profile(&user, id, &req)
    })?;
    Ok(Json(updated))
}

/// GET /api/users/{id}/reviews — newest first, paginated.
async fn user_reviews_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(params): Query<ListParams>,
    headers: HeaderMap,
) -> Result<Json<ReviewListResponse>, ApiError> {
    if !state.store.users.contains(id) {
        return Err(ApiError::NotFound(format!("no user with id {}", id)));
    }
    let viewer = state.optional_user(&headers).map(|u| u.id);
    let views: Vec<ReviewView> = state
        .store
        .reviews
        .for_user(id)
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

/// POST /api/users/{id}/follow
async fn follow_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<UserView>, ApiError> {
    let user = state.current_user(&headers)?;
    let target = state.journaled(WriteKind::Follow, Some(user.id), || {
        state.store.follow(&user, id)
    })?;
    Ok(Json(target))
}

/// DELETE /api/users/{id}/follow
async fn unfollow_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<UserView>, ApiError> {
    let user = state.current_user(&headers)?;
    let target = state.journaled(WriteKind::Unfollow, Some(user.id), || {
        state.store.unfollow(&user, id)
    })?;
    Ok(Json(target))
}

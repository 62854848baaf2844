//! Admin console routes. Every handler requires an admin-role session,
//! re-checked against the live user record per request.

use super::{AppState, ListParams};
use crate::catalog;
use crate::error::ApiError;
use crate::models::{
    AnalyticsResponse, FlaggedContentResponse, Role, RoleChangeRequest, UserListResponse, UserView,
};
use crate::store::journal::{WriteKind, WriteRecord};
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(list_users_handler))
        .route("/users/{id}/role", put(change_role_handler))
        .route("/users/{id}/ban", put(ban_handler))
        .route("/users/{id}/unban", put(unban_handler))
        .route("/analytics", get(analytics_handler))
        .route("/flagged-content", get(flagged_handler))
        .route("/writes", get(writes_handler))
}

/// GET /api/admin/users — paginated, case-insensitive name/email search.
async fn list_users_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
    headers: HeaderMap,
) -> Result<Json<UserListResponse>, ApiError> {
    state.require_role(&headers, Role::Admin)?;

    let mut users = state.store.users.all();
    if let Some(search) = &params.search {
        let query = search.to_lowercase();
        if !query.is_empty() {
            users.retain(|u| {
                u.name.to_lowercase().contains(&query) || u.email.to_lowercase().contains(&query)
            });
        }
    }
    let views: Vec<UserView> = users.iter().map(|u| state.store.user_view(u)).collect();
    let limit = params.clamped_limit();
    let (users, total) = catalog::paginate(views, params.page, limit);
    Ok(Json(UserListResponse {
        users,
        total,
        page: params.page,
        limit,
    }))
}

/// PUT /api/admin/users/{id}/role
async fn change_role_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<RoleChangeRequest>,
) -> Result<Json<UserView>, ApiError> {
    let admin = state.require_role(&headers, Role::Admin)?;
    let updated = state.journaled(WriteKind::ChangeRole, Some(admin.id), || {
        state.store.change_role(id, req.role)
    })?;
    eprintln!(
        "[admin] {} set role of {} to {}",
        admin.name,
        id,
        req.role.as_str()
    );
    Ok(Json(updated))
}

/// PUT /api/admin/users/{id}/ban — 409 when already banned.
async fn ban_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<UserView>, ApiError> {
    let admin = state.require_role(&headers, Role::Admin)?;
    let updated = state.journaled(WriteKind::BanUser, Some(admin.id), || {
        state.store.ban(id)
    })?;
    eprintln!("[admin] {} banned {}", admin.name, id);
    Ok(Json(updated))
}

/// PUT /api/admin/users/{id}/unban — 409 when not banned.
async fn unban_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<UserView>, ApiError> {
    let admin = state.require_role(&headers, Role::Admin)?;
    let updated = state.journaled(WriteKind::UnbanUser, Some(admin.id), || {
        state.store.unban(id)
    })?;
    Ok(Json(updated))
}

/// GET /api/admin/analytics — computed live, never stored.
async fn analytics_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<AnalyticsResponse>, ApiError> {
    state.require_role(&headers, Role::Admin)?;
    Ok(Json(state.store.analytics(Utc::now())))
}

/// GET /api/admin/flagged-content — the moderation queue.
async fn flagged_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<FlaggedContentResponse>, ApiError> {
    state.require_role(&headers, Role::Admin)?;
    Ok(Json(FlaggedContentResponse {
        reviews: state.store.flagged(),
    }))
}

/// GET /api/admin/writes — recent journaled writes, newest first.
async fn writes_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
    headers: HeaderMap,
) -> Result<Json<Vec<WriteRecord>>, ApiError> {
    state.require_role(&headers, Role::Admin)?;
    Ok(Json(state.journal.recent(params.clamped_limit())))
}

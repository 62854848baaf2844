//! Auth routes: signup, login, logout, password reset.

use super::AppState;
use crate::auth::digest_password;
use crate::error::ApiError;
use crate::metrics;
use crate::models::{
    AuthResponse, ForgotPasswordRequest, LoginRequest, ResetPasswordRequest, ResetTokenResponse,
    Role, SignupRequest,
};
use crate::store::journal::WriteKind;
use crate::validation;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/signup", post(signup_handler))
        .route("/login", post(login_handler))
        .route("/logout", post(logout_handler))
        .route("/forgot-password", post(forgot_password_handler))
        .route("/reset-password", post(reset_password_handler))
}

/// POST /api/auth/signup
async fn signup_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = state.journaled(WriteKind::Signup, None, || {
        if !validation::is_strong_password(&req.password) {
            return Err(ApiError::InvalidRequest(
                "password must be at least 8 characters with an uppercase letter and a digit"
                    .to_string(),
            ));
        }
        state.store.create_user(
            &req.name,
            &req.email,
            &digest_password(&req.password),
            Role::User,
        )
    })?;

    let token = state.sessions.issue(user.id);
    metrics::SESSIONS_ISSUED.inc();
    eprintln!("[auth] new account {} ({})", user.email, user.id);

    Ok(Json(AuthResponse {
        token,
        user: state.store.user_view(&user),
    }))
}

/// POST /api/auth/login
///
/// Banned accounts may still log in and browse; every write path re-checks
/// status and refuses them.
async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = state
        .store
        .users
        .get_by_email(&req.email)
        .filter(|u| u.password_digest == digest_password(&req.password))
        .ok_or_else(|| ApiError::Unauthorized("invalid email or password".to_string()))?;

    let token = state.sessions.issue(user.id);
    metrics::SESSIONS_ISSUED.inc();

    Ok(Json(AuthResponse {
        token,
        user: state.store.user_view(&user),
    }))
}

/// POST /api/auth/logout
async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let token = super::guard::bearer_token(&headers)?;
    if !state.sessions.revoke(token) {
        return Err(ApiError::Unauthorized("invalid session token".to_string()));
    }
    Ok(Json(json!({ "success": true })))
}

/// POST /api/auth/forgot-password
///
/// The reset token comes back in the response body; no mailer exists.
async fn forgot_password_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<ResetTokenResponse>, ApiError> {
    let user = state
        .store
        .users
        .get_by_email(&req.email)
        .ok_or_else(|| ApiError::NotFound(format!("no account for {}", req.email)))?;

    let reset_token = state.sessions.issue_reset(user.id);
    Ok(Json(ResetTokenResponse { reset_token }))
}

/// POST /api/auth/reset-password
///
/// Consumes the single-use token, sets the new password, and revokes every
/// live session of the account.
async fn reset_password_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.journaled(WriteKind::PasswordReset, None, || {
        if !validation::is_strong_password(&req.password) {
            return Err(ApiError::InvalidRequest(
                "password must be at least 8 characters with an uppercase letter and a digit"
                    .to_string(),
            ));
        }
        let user_id = state.sessions.consume_reset(&req.token)?;
        let digest = digest_password(&req.password);
        state
            .store
            .users
            .update(user_id, |u| u.password_digest = digest.clone())
            .ok_or_else(|| ApiError::NotFound("account no longer exists".to_string()))?;
        let revoked = state.sessions.revoke_user(user_id);
        eprintln!("[auth] password reset for {} ({} sessions revoked)", user_id, revoked);
        Ok(())
    })?;

    Ok(Json(json!({ "success": true })))
}

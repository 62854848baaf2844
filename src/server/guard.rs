//! Session guard: bearer-token extraction and per-request authorization.
//!
//! Every protected handler resolves the live user record here, so role and
//! ban status are re-checked on each request rather than trusted from
//! anything the client holds.

use super::AppState;
use crate::error::ApiError;
use crate::models::{Role, UserProfile};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;

/// Pull the bearer token out of the Authorization header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_string()))?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("malformed authorization header".to_string()))
}

impl AppState {
    /// Resolve the requester. 401 on missing, unknown, or expired tokens,
    /// and when the session's user no longer exists.
    pub fn current_user(&self, headers: &HeaderMap) -> Result<UserProfile, ApiError> {
        let token = bearer_token(headers)?;
        let user_id = self.sessions.resolve(token)?;
        self.store
            .users
            .get(user_id)
            .ok_or_else(|| ApiError::Unauthorized("session user no longer exists".to_string()))
    }

    /// Resolve the requester if a valid session is presented; public reads
    /// use this for viewer-relative fields and otherwise proceed anonymously.
    pub fn optional_user(&self, headers: &HeaderMap) -> Option<UserProfile> {
        self.current_user(headers).ok()
    }

    /// Resolve the requester and require at least `role`.
    pub fn require_role(
        &self,
        headers: &HeaderMap,
        role: Role,
    ) -> Result<UserProfile, ApiError> {
        let user = self.current_user(headers)?;
        if user.role < role {
            return Err(ApiError::Forbidden(format!(
                "{} role required",
                role.as_str()
            )));
        }
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::http::HeaderValue;

    fn headers_with(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        headers
    }

    #[test]
    fn test_bearer_extraction() {
        assert!(bearer_token(&HeaderMap::new()).is_err());

        let mut bad = HeaderMap::new();
        bad.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(bearer_token(&bad).is_err());

        let good = headers_with("tok123");
        assert_eq!(bearer_token(&good).unwrap(), "tok123");
    }

    #[test]
    fn test_guard_resolves_live_user_and_role() {
        let state = AppState::new(Config::default());
        let user = state
            .store
            .create_user("Ann", "ann@example.com", "digest", Role::User)
            .unwrap();
        let token = state.sessions.issue(user.id);
        let headers = headers_with(&token);

        assert_eq!(state.current_user(&headers).unwrap().id, user.id);
        assert_eq!(
            state
                .require_role(&headers, Role::Admin)
                .unwrap_err()
                .code(),
            "forbidden"
        );

        // Role changes take effect on the next request without reissuing.
        state.store.change_role(user.id, Role::Admin).unwrap();
        assert!(state.require_role(&headers, Role::Admin).is_ok());
    }

    #[test]
    fn test_unknown_token_is_unauthorized() {
        let state = AppState::new(Config::default());
        let headers = headers_with("nope");
        assert_eq!(
            state.current_user(&headers).unwrap_err().code(),
            "unauthorized"
        );
        assert!(state.optional_user(&headers).is_none());
    }
}

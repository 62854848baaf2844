//! Sessions and credentials.
//!
//! Tokens are opaque random strings; the server resolves everything else
//! (user record, role, status) per request, so nothing client-held is
//! trusted beyond possession of the token. Password digests are bare
//! SHA-256 hex, which is deliberately as far as this service goes.

use crate::error::ApiError;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};
use uuid::Uuid;

const SESSION_TOKEN_LEN: usize = 48;
const RESET_TOKEN_LEN: usize = 32;

/// SHA-256 hex digest of a password.
pub fn digest_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Random alphanumeric token.
fn random_token(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// An issued session.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// A single-use password-reset token.
#[derive(Debug, Clone)]
struct ResetToken {
    user_id: Uuid,
    expires_at: DateTime<Utc>,
}

/// Token maps with TTL enforcement. Expired entries are rejected on
/// lookup and reclaimed by the periodic sweep.
pub struct SessionManager {
    sessions: DashMap<String, Session>,
    reset_tokens: DashMap<String, ResetToken>,
    session_ttl: Duration,
    reset_ttl: Duration,
}

impl SessionManager {
    pub fn new(session_ttl_secs: u64, reset_ttl_secs: u64) -> Self {
        Self {
            sessions: DashMap::new(),
            reset_tokens: DashMap::new(),
            session_ttl: Duration::seconds(session_ttl_secs as i64),
            reset_ttl: Duration::seconds(reset_ttl_secs as i64),
        }
    }

    /// Issue a session token for a user.
    pub fn issue(&self, user_id: Uuid) -> String {
        let token = random_token(SESSION_TOKEN_LEN);
        let now = Utc::now();
        self.sessions.insert(
            token.clone(),
            Session {
                user_id,
                issued_at: now,
                expires_at: now + self.session_ttl,
            },
        );
        token
    }

    /// Resolve a token to its user id; unknown and expired tokens are
    /// indistinguishable to the caller.
    pub fn resolve(&self, token: &str) -> Result<Uuid, ApiError> {
        let session = self
            .sessions
            .get(token)
            .ok_or_else(|| ApiError::Unauthorized("invalid session token".to_string()))?;
        if session.expires_at <= Utc::now() {
            drop(session);
            self.sessions.remove(token);
            return Err(ApiError::Unauthorized("session expired".to_string()));
        }
        Ok(session.user_id)
    }

    /// Revoke one token. Returns false when it was not live.
    pub fn revoke(&self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    /// Revoke every session of a user (password reset). Returns how many
    /// were dropped.
    pub fn revoke_user(&self, user_id: Uuid) -> usize {
        let tokens: Vec<String> = self
            .sessions
            .iter()
            .filter(|s| s.user_id == user_id)
            .map(|s| s.key().clone())
            .collect();
        for token in &tokens {
            self.sessions.remove(token);
        }
        tokens.len()
    }

    /// Issue a password-reset token.
    pub fn issue_reset(&self, user_id: Uuid) -> String {
        let token = random_token(RESET_TOKEN_LEN);
        self.reset_tokens.insert(
            token.clone(),
            ResetToken {
                user_id,
                expires_at: Utc::now() + self.reset_ttl,
            },
        );
        token
    }

    /// Consume a reset token; single-use, invalid once expired.
    pub fn consume_reset(&self, token: &str) -> Result<Uuid, ApiError> {
        let (_, reset) = self
            .reset_tokens
            .remove(token)
            .ok_or_else(|| ApiError::Unauthorized("invalid reset token".to_string()))?;
        if reset.expires_at <= Utc::now() {
            return Err(ApiError::Unauthorized("reset token expired".to_string()));
        }
        Ok(reset.user_id)
    }

    /// Drop expired sessions and reset tokens. Returns how many sessions
    /// were reclaimed.
    pub fn sweep(&self) -> usize {
        let now = Utc::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, s| s.expires_at > now);
        self.reset_tokens.retain(|_, r| r.expires_at > now);
        before - self.sessions.len()
    }

    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }
}

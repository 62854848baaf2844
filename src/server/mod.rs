//! HTTP server: state, router assembly, and service plumbing.

pub mod admin;
pub mod auth_routes;
pub mod books;
pub mod guard;
pub mod reviews;
pub mod users;

use crate::auth::SessionManager;
use crate::config::Config;
use crate::error::ApiError;
use crate::fixtures;
use crate::metrics;
use crate::store::journal::{WriteJournal, WriteKind};
use crate::store::Store;
use anyhow::Result;
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::{middleware, Json, Router};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

/// How many recent writes the journal retains for the admin audit view.
const JOURNAL_CAPACITY: usize = 1024;

/// Shared state for the catalog service
pub struct AppState {
    pub config: Config,
    pub store: Store,
    pub sessions: SessionManager,
    pub journal: WriteJournal,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: Config) -> Arc<Self> {
        let sessions = SessionManager::new(
            config.auth.session_ttl_secs,
            config.auth.reset_ttl_secs,
        );
        Arc::new(Self {
            config,
            store: Store::new(),
            sessions,
            journal: WriteJournal::new(JOURNAL_CAPACITY),
            started_at: Instant::now(),
        })
    }

    /// Seed the store per configuration: fixture file if set, otherwise the
    /// built-in set (unless seeding is disabled), plus the admin account.
    pub fn seed(&self) -> Result<()> {
        if self.config.store.seed_fixtures {
            let data = match self.config.resolve_fixtures_file() {
                Some(path) => fixtures::load_file(&path)?,
                None => fixtures::builtin(),
            };
            fixtures::apply(&self.store, &data)?;
            eprintln!(
                "[store] seeded {} books, {} users, {} reviews",
                self.store.books.len(),
                self.store.users.len(),
                self.store.reviews.len()
            );
        }
        if fixtures::seed_admin(&self.store, &self.config.auth)? {
            eprintln!("[store] seeded admin account {}", self.config.auth.admin_email);
        }
        Ok(())
    }

    /// Run a mutation through the write journal: the record enters pending,
    /// and ends committed or failed with the error code. The closure must
    /// leave the store untouched on error.
    pub fn journaled<T>(
        &self,
        kind: WriteKind,
        actor: Option<Uuid>,
        f: impl FnOnce() -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let write_id = self.journal.begin(kind, actor);
        match f() {
            Ok(value) => {
                self.journal.commit(write_id);
                metrics::WRITES
                    .with_label_values(&[kind.as_str(), "committed"])
                    .inc();
                Ok(value)
            }
            Err(e) => {
                self.journal.fail(write_id, e.code());
                metrics::WRITES
                    .with_label_values(&[kind.as_str(), "failed"])
                    .inc();
                Err(e)
            }
        }
    }
}

/// Build the full router for a state instance.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = match &state.config.server.cors_origin {
        Some(origin) => match origin.parse::<HeaderValue>() {
            Ok(value) => CorsLayer::new()
                .allow_origin(value)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers(Any),
            Err(_) => {
                eprintln!("[server] invalid cors_origin {:?}, allowing any", origin);
                CorsLayer::permissive()
            }
        },
        None => CorsLayer::permissive(),
    };

    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics::handler))
        .nest("/api/auth", auth_routes::routes())
        .nest("/api/books", books::routes())
        .nest("/api/reviews", reviews::routes())
        .nest("/api/users", users::routes())
        .nest("/api/admin", admin::routes())
        .layer(cors)
        .layer(middleware::from_fn(metrics::track))
        .with_state(state)
}

/// Run the service: seed the store, start the session sweeper, serve.
pub async fn run(config: Config) -> Result<()> {
    let state = AppState::new(config);
    state.seed()?;

    spawn_session_sweeper(state.clone());

    let addr = format!("{}:{}", state.config.server.bind, state.config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    eprintln!("[server] listening on {}", addr);

    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// Background task reclaiming expired sessions and reset tokens.
fn spawn_session_sweeper(state: Arc<AppState>) {
    let interval = state.config.auth.sweep_interval_secs.max(1);
    tokio::spawn(async move {
        let mut ticker =
            tokio::time::interval(std::time::Duration::from_secs(interval));
        ticker.tick().await; // first tick fires immediately
        loop {
            ticker.tick().await;
            let swept = state.sessions.sweep();
            if swept > 0 {
                eprintln!("[auth] swept {} expired sessions", swept);
            }
        }
    });
}

async fn health_handler(
    axum::extract::State(state): axum::extract::State<Arc<AppState>>,
) -> Json<serde_json::Value> {
    let writes = state.journal.counts();
    Json(json!({
        "status": "ok",
        "uptime_secs": state.started_at.elapsed().as_secs(),
        "books": state.store.books.len(),
        "reviews": state.store.reviews.len(),
        "users": state.store.users.len(),
        "active_sessions": state.sessions.active_count(),
        "writes": {
            "pending": writes.pending,
            "committed": writes.committed,
            "failed": writes.failed,
        },
    }))
}

/// Shared list-query parameters.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ListParams {
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
}

fn default_page() -> usize {
    1
}

fn default_limit() -> usize {
    20
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
            search: None,
            genre: None,
            sort: None,
        }
    }
}

impl ListParams {
    /// Clamp limit to something the server is willing to serve.
    pub fn clamped_limit(&self) -> usize {
        self.limit.clamp(1, 100)
    }
}

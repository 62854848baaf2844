//! Typed HTTP client for the catalog service.
//!
//! Covers the full REST surface so browser-equivalent flows can be driven
//! from Rust. A token set via [`BookproClient::set_token`] rides along as a
//! bearer header on every request, mirroring the original client's
//! interceptor.

use crate::models::{
    AuthResponse, BookListResponse, BookView, CreateBookRequest, CreateReviewRequest,
    FlaggedContentResponse, ForgotPasswordRequest, LoginRequest, ResetPasswordRequest,
    ResetTokenResponse, ReviewListResponse, ReviewView, Role, RoleChangeRequest, SignupRequest,
    UpdateBookRequest, UpdateProfileRequest, UserListResponse, UserView,
};
use anyhow::Result;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A structured error response from the service.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiFailure {
    pub error: String,
    pub message: String,
    #[serde(skip)]
    pub status: u16,
}

impl std::fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.error, self.status, self.message)
    }
}

impl std::error::Error for ApiFailure {}

/// Catalog list query. Absent fields are left to server defaults.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BookQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PageQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

pub struct BookproClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl BookproClient {
    /// `base_url` is the service root, e.g. `http://localhost:3001`.
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        Err(decode_failure(status, response.text().await.ok()).into())
    }

    // --- Auth ---

    pub async fn signup(&mut self, name: &str, email: &str, password: &str) -> Result<UserView> {
        let req = SignupRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let auth: AuthResponse = self
            .send(self.request(Method::POST, "/api/auth/signup").json(&req))
            .await?;
        self.token = Some(auth.token);
        Ok(auth.user)
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<UserView> {
        let req = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let auth: AuthResponse = self
            .send(self.request(Method::POST, "/api/auth/login").json(&req))
            .await?;
        self.token = Some(auth.token);
        Ok(auth.user)
    }

    pub async fn logout(&mut self) -> Result<()> {
        let _: serde_json::Value = self
            .send(self.request(Method::POST, "/api/auth/logout"))
            .await?;
        self.token = None;
        Ok(())
    }

    pub async fn forgot_password(&self, email: &str) -> Result<String> {
        let req = ForgotPasswordRequest {
            email: email.to_string(),
        };
        let resp: ResetTokenResponse = self
            .send(
                self.request(Method::POST, "/api/auth/forgot-password")
                    .json(&req),
            )
            .await?;
        Ok(resp.reset_token)
    }

    pub async fn reset_password(&self, token: &str, password: &str) -> Result<()> {
        let req = ResetPasswordRequest {
            token: token.to_string(),
            password: password.to_string(),
        };
        let _: serde_json::Value = self
            .send(
                self.request(Method::POST, "/api/auth/reset-password")
                    .json(&req),
            )
            .await?;
        Ok(())
    }

    // --- Books ---

    pub async fn list_books(&self, query: &BookQuery) -> Result<BookListResponse> {
        self.send(self.request(Method::GET, "/api/books").query(query))
            .await
    }

    pub async fn get_book(&self, id: Uuid) -> Result<BookView> {
        self.send(self.request(Method::GET, &format!("/api/books/{}", id)))
            .await
    }

    pub async fn create_book(&self, req: &CreateBookRequest) -> Result<BookView> {
        self.send(self.request(Method::POST, "/api/books").json(req))
            .await
    }

    pub async fn update_book(&self, id: Uuid, req: &UpdateBookRequest) -> Result<BookView> {
        self.send(
            self.request(Method::PUT, &format!("/api/books/{}", id))
                .json(req),
        )
        .await
    }

    pub async fn delete_book(&self, id: Uuid) -> Result<()> {
        let _: serde_json::Value = self
            .send(self.request(Method::DELETE, &format!("/api/books/{}", id)))
            .await?;
        Ok(())
    }

    pub async fn trending(&self) -> Result<Vec<BookView>> {
        self.send(self.request(Method::GET, "/api/books/trending"))
            .await
    }

    pub async fn book_reviews(&self, id: Uuid, query: &PageQuery) -> Result<ReviewListResponse> {
        self.send(
            self.request(Method::GET, &format!("/api/books/{}/reviews", id))
                .query(query),
        )
        .await
    }

    // --- Reviews ---

    pub async fn recent_reviews(&self, query: &PageQuery) -> Result<ReviewListResponse> {
        self.send(self.request(Method::GET, "/api/reviews").query(query))
            .await
    }

    pub async fn create_review(
        &self,
        book_id: Uuid,
        req: &CreateReviewRequest,
    ) -> Result<ReviewView> {
        self.send(
            self.request(Method::POST, &format!("/api/books/{}/reviews", book_id))
                .json(req),
        )
        .await
    }

    pub async fn update_review(&self, id: Uuid, req: &CreateReviewRequest) -> Result<ReviewView> {
        self.send(
            self.request(Method::PUT, &format!("/api/reviews/{}", id))
                .json(req),
        )
        .await
    }

    pub async fn delete_review(&self, id: Uuid) -> Result<()> {
        let _: serde_json::Value = self
            .send(self.request(Method::DELETE, &format!("/api/reviews/{}", id)))
            .await?;
        Ok(())
    }

    pub async fn like_review(&self, id: Uuid) -> Result<ReviewView> {
        self.send(self.request(Method::POST, &format!("/api/reviews/{}/like", id)))
            .await
    }

    pub async fn unlike_review(&self, id: Uuid) -> Result<ReviewView> {
        self.send(self.request(Method::DELETE, &format!("/api/reviews/{}/like", id)))
            .await
    }

    // --- Users ---

    pub async fn get_user(&self, id: Uuid) -> Result<UserView> {
        self.send(self.request(Method::GET, &format!("/api/users/{}", id)))
            .await
    }

    pub async fn update_profile(&self, id: Uuid, req: &UpdateProfileRequest) -> Result<UserView> {
        self.send(
            self.request(Method::PUT, &format!("/api/users/{}", id))
                .json(req),
        )
        .await
    }

    pub async fn user_reviews(&self, id: Uuid, query: &PageQuery) -> Result<ReviewListResponse> {
        self.send(
            self.request(Method::GET, &format!("/api/users/{}/reviews", id))
                .query(query),
        )
        .await
    }

    pub async fn follow(&self, id: Uuid) -> Result<UserView> {
        self.send(self.request(Method::POST, &format!("/api/users/{}/follow", id)))
            .await
    }

    pub async fn unfollow(&self, id: Uuid) -> Result<UserView> {
        self.send(self.request(Method::DELETE, &format!("/api/users/{}/follow", id)))
            .await
    }

    // --- Admin ---

    pub async fn admin_users(&self, query: &PageQuery) -> Result<UserListResponse> {
        self.send(self.request(Method::GET, "/api/admin/users").query(query))
            .await
    }

    pub async fn set_user_role(&self, id: Uuid, role: Role) -> Result<UserView> {
        self.send(
            self.request(Method::PUT, &format!("/api/admin/users/{}/role", id))
                .json(&RoleChangeRequest { role }),
        )
        .await
    }

    pub async fn ban_user(&self, id: Uuid) -> Result<UserView> {
        self.send(self.request(Method::PUT, &format!("/api/admin/users/{}/ban", id)))
            .await
    }

    pub async fn unban_user(&self, id: Uuid) -> Result<UserView> {
        self.send(self.request(Method::PUT, &format!("/api/admin/users/{}/unban", id)))
            .await
    }

    pub async fn analytics(&self) -> Result<crate::models::AnalyticsResponse> {
        self.send(self.request(Method::GET, "/api/admin/analytics"))
            .await
    }

    pub async fn flagged_content(&self) -> Result<FlaggedContentResponse> {
        self.send(self.request(Method::GET, "/api/admin/flagged-content"))
            .await
    }
}

fn decode_failure(status: StatusCode, body: Option<String>) -> ApiFailure {
    let mut failure = body
        .as_deref()
        .and_then(|text| serde_json::from_str::<ApiFailure>(text).ok())
        .unwrap_or_else(|| ApiFailure {
            error: "internal".to_string(),
            message: body.unwrap_or_default(),
            status: 0,
        });
    failure.status = status.as_u16();
    failure
}

/// Extract the structured failure from a client error, if it is one.
pub fn api_failure(err: &anyhow::Error) -> Option<&ApiFailure> {
    err.downcast_ref::<ApiFailure>()
}

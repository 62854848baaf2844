//! Input validation helpers shared by the auth and write paths.

use crate::error::ApiError;
use crate::models::is_valid_genre;
use chrono::{Datelike, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex"));

/// Checks if an email address is plausibly well-formed.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Checks if a password is strong.
///
/// A strong password must:
/// - Be at least 8 characters long
/// - Contain at least one uppercase letter
/// - Contain at least one digit
pub fn is_strong_password(password: &str) -> bool {
    if password.len() < 8 {
        return false;
    }

    let has_uppercase = password.chars().any(|c| c.is_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    has_uppercase && has_digit
}

/// Validate a review rating (integer 1-5).
pub fn check_rating(rating: u8) -> Result<(), ApiError> {
    if (1..=5).contains(&rating) {
        Ok(())
    } else {
        Err(ApiError::InvalidRequest(format!(
            "rating must be between 1 and 5, got {}",
            rating
        )))
    }
}

/// Validate review text: non-empty after trimming.
pub fn check_review_text(text: &str) -> Result<(), ApiError> {
    if text.trim().is_empty() {
        Err(ApiError::InvalidRequest(
            "review text must not be empty".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Validate a required string field.
pub fn check_required(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        Err(ApiError::InvalidRequest(format!("{} is required", field)))
    } else {
        Ok(())
    }
}

/// Validate a book genre against the canonical list.
pub fn check_genre(genre: &str) -> Result<(), ApiError> {
    if is_valid_genre(genre) {
        Ok(())
    } else {
        Err(ApiError::InvalidRequest(format!(
            "unknown genre: {}",
            genre
        )))
    }
}

/// Validate a publication year: 1000 through the current year.
pub fn check_publication_year(year: i32) -> Result<(), ApiError> {
    let current = Utc::now().year();
    if (1000..=current).contains(&year) {
        Ok(())
    } else {
        Err(ApiError::InvalidRequest(format!(
            "publication year must be between 1000 and {}",
            current
        )))
    }
}

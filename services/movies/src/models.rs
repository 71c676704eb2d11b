//! API models for request and response payloads

use serde::{Deserialize, Serialize};

pub mod movie;

/// Request for user login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub user: String,
    pub password: String,
}

/// Response for a successful login
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub user: String,
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Query parameters accepted by `GET /movies`
///
/// Both fields are kept as raw strings so the gate runs before any parsing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovieQuery {
    pub category: Option<String>,
    pub year: Option<String>,
}

impl MovieQuery {
    /// Whether the caller asked for the category and year lookup
    pub fn is_search(&self) -> bool {
        self.category.is_some() || self.year.is_some()
    }
}

/// Plain message body
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

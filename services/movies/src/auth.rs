//! Auth gate: token issuance, bearer verification and per-capability guards
//!
//! Every route action maps to a [`Capability`]. The gate holds the set of
//! capabilities that require a bearer token, so any route can be protected
//! by configuration alone.

use std::{collections::HashSet, fmt, str::FromStr};

use axum::http::{HeaderMap, header::AUTHORIZATION};
use tracing::{debug, warn};

use crate::{error::ApiError, jwt::JwtService};

/// A route action that may be protected by the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Login,
    Greeting,
    Health,
    ListMovies,
    GetMovie,
    SearchMovies,
    CreateMovie,
    UpdateMovie,
    DeleteMovie,
}

impl Capability {
    pub const ALL: [Capability; 9] = [
        Capability::Login,
        Capability::Greeting,
        Capability::Health,
        Capability::ListMovies,
        Capability::GetMovie,
        Capability::SearchMovies,
        Capability::CreateMovie,
        Capability::UpdateMovie,
        Capability::DeleteMovie,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Login => "login",
            Capability::Greeting => "greeting",
            Capability::Health => "health",
            Capability::ListMovies => "list_movies",
            Capability::GetMovie => "get_movie",
            Capability::SearchMovies => "search_movies",
            Capability::CreateMovie => "create_movie",
            Capability::UpdateMovie => "update_movie",
            Capability::DeleteMovie => "delete_movie",
        }
    }

    /// Parse a comma separated list such as `"search_movies, delete_movie"`
    pub fn parse_list(list: &str) -> Result<HashSet<Capability>, UnknownCapability> {
        list.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a configured capability name is not recognised
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unknown capability: {0}")]
pub struct UnknownCapability(pub String);

impl FromStr for Capability {
    type Err = UnknownCapability;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::ALL
            .into_iter()
            .find(|capability| capability.as_str() == s)
            .ok_or_else(|| UnknownCapability(s.to_string()))
    }
}

/// The authenticated caller, taken from a verified token
#[derive(Debug, Clone, PartialEq)]
pub struct Subject(pub String);

/// The single account allowed to obtain tokens through `/login`
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

/// Auth gate shared by the router and the handlers
#[derive(Clone)]
pub struct AuthGate {
    jwt_service: JwtService,
    protected: HashSet<Capability>,
    credentials: Option<Credentials>,
}

impl AuthGate {
    pub fn new(
        jwt_service: JwtService,
        protected: HashSet<Capability>,
        credentials: Option<Credentials>,
    ) -> Self {
        Self {
            jwt_service,
            protected,
            credentials,
        }
    }

    pub fn is_protected(&self, capability: Capability) -> bool {
        self.protected.contains(&capability)
    }

    pub fn access_token_expiry(&self) -> u64 {
        self.jwt_service.access_token_expiry()
    }

    /// Issue a token for `subject`
    pub fn issue_token(&self, subject: &str) -> Result<String, ApiError> {
        self.jwt_service.issue_token(subject).map_err(|e| {
            tracing::error!("Failed to generate access token: {}", e);
            ApiError::InternalServerError
        })
    }

    /// Check a login attempt against the configured account and issue a token
    pub fn login(&self, user: &str, password: &str) -> Result<String, ApiError> {
        let Some(credentials) = &self.credentials else {
            warn!("Login attempt for {} but no login account is configured", user);
            return Err(ApiError::Unauthorized);
        };

        if credentials.user != user || credentials.password != password {
            warn!("Rejected login attempt for user: {}", user);
            return Err(ApiError::Unauthorized);
        }

        self.issue_token(user)
    }

    /// Extract the bearer token from the Authorization header and verify it
    pub fn verify_bearer(&self, headers: &HeaderMap) -> Result<Subject, ApiError> {
        let auth_header = headers
            .get(AUTHORIZATION)
            .and_then(|header| header.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(ApiError::Unauthorized)?;

        let claims = self.jwt_service.validate_token(token).map_err(|e| {
            debug!("Failed to validate token: {}", e);
            ApiError::Unauthorized
        })?;

        Ok(Subject(claims.sub))
    }

    /// Guard for one capability: `None` when the capability is open,
    /// the verified subject when it is protected
    pub fn authorize(
        &self,
        capability: Capability,
        headers: &HeaderMap,
    ) -> Result<Option<Subject>, ApiError> {
        if !self.is_protected(capability) {
            return Ok(None);
        }

        self.verify_bearer(headers).map(Some)
    }
}

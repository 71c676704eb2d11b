//! HS256 bearer tokens for the movies API
//!
//! Tokens are signed with a secret held by the server. They carry the
//! subject, issue time, expiry and a unique token id.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const DEFAULT_EXPIRY_SECS: u64 = 900;

/// Signing settings
///
/// - `JWT_SECRET`: HMAC secret, required and non-empty
/// - `JWT_ACCESS_TOKEN_EXPIRY`: token lifetime in seconds, 900 when unset
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry: u64,
}

impl JwtConfig {
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?;
        if secret.trim().is_empty() {
            bail!("JWT_SECRET must not be empty");
        }

        let access_token_expiry = std::env::var("JWT_ACCESS_TOKEN_EXPIRY")
            .ok()
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(DEFAULT_EXPIRY_SECS);

        Ok(Self {
            secret,
            access_token_expiry,
        })
    }
}

/// Payload of an access token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: Uuid,
}

/// Issues and verifies access tokens
#[derive(Clone)]
pub struct JwtService {
    encoder: EncodingKey,
    decoder: DecodingKey,
    rules: Validation,
    lifetime: u64,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        let mut rules = Validation::new(Algorithm::HS256);
        rules.set_required_spec_claims(&["exp", "sub"]);
        rules.leeway = 0;

        Self {
            encoder: EncodingKey::from_secret(config.secret.as_bytes()),
            decoder: DecodingKey::from_secret(config.secret.as_bytes()),
            rules,
            lifetime: config.access_token_expiry,
        }
    }

    /// Sign a fresh token for `subject`
    pub fn issue_token(&self, subject: &str) -> Result<String> {
        self.issue_token_at(subject, Utc::now())
    }

    /// Sign a token whose lifetime starts at `issued_at`
    pub fn issue_token_at(&self, subject: &str, issued_at: DateTime<Utc>) -> Result<String> {
        let lifetime = i64::try_from(self.lifetime).context("token lifetime out of range")?;
        let iat = issued_at.timestamp();

        let claims = Claims {
            sub: subject.to_string(),
            iat,
            exp: iat + lifetime,
            jti: Uuid::new_v4(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoder)
            .context("failed to sign token")
    }

    /// Check signature and expiry, returning the claims of a good token
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.decoder, &self.rules)?;
        Ok(data.claims)
    }

    /// Token lifetime in seconds
    pub fn access_token_expiry(&self) -> u64 {
        self.lifetime
    }
}

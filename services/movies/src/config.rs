//! Service settings loaded from `MOVIES_*` environment variables

use std::{collections::HashSet, net::SocketAddr};

use anyhow::{Context, Result};
use ::config::{Config, Environment};
use serde::Deserialize;

use crate::auth::{Capability, Credentials};

/// Service settings
///
/// # Environment Variables
/// - `MOVIES_HOST`: Interface to bind (default: "0.0.0.0")
/// - `MOVIES_PORT`: Port to bind (default: 3000)
/// - `MOVIES_SEED_FIXTURES`: Seed an empty table with the fixture rows (default: false)
/// - `MOVIES_PROTECTED`: Comma separated capabilities that require a bearer token
///   (default: "search_movies")
/// - `MOVIES_LOGIN_USER` / `MOVIES_LOGIN_PASSWORD`: Account allowed to obtain tokens
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub seed_fixtures: bool,
    pub protected: String,
    pub login_user: Option<String>,
    pub login_password: Option<String>,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let settings = Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 3000)?
            .set_default("seed_fixtures", false)?
            .set_default("protected", "search_movies")?
            .add_source(Environment::with_prefix("MOVIES"))
            .build()
            .context("Failed to load MOVIES_* settings")?;

        settings
            .try_deserialize()
            .context("Invalid MOVIES_* settings")
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .context("MOVIES_HOST/MOVIES_PORT")
    }

    pub fn protected_capabilities(&self) -> Result<HashSet<Capability>> {
        Capability::parse_list(&self.protected).context("MOVIES_PROTECTED")
    }

    /// The login account, only when both halves are configured
    pub fn login_credentials(&self) -> Option<Credentials> {
        match (&self.login_user, &self.login_password) {
            (Some(user), Some(password)) if !user.is_empty() && !password.is_empty() => {
                Some(Credentials {
                    user: user.clone(),
                    password: password.clone(),
                })
            }
            _ => None,
        }
    }
}

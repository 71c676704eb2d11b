//! Movies service
//!
//! CRUD over the `movies` table plus a token login, served with axum.

pub mod auth;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod validation;

pub use routes::create_router;
pub use state::AppState;

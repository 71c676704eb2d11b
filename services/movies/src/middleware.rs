//! Per-route guard middleware backed by the auth gate

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::{
    auth::{AuthGate, Capability},
    error::ApiError,
};

/// State handed to [`require_capability`] for one route
#[derive(Clone)]
pub struct RouteGuard {
    gate: AuthGate,
    capability: Capability,
}

impl RouteGuard {
    pub fn new(gate: AuthGate, capability: Capability) -> Self {
        Self { gate, capability }
    }
}

/// Reject the request unless the route's capability is open or the caller
/// presents a valid bearer token
pub async fn require_capability(
    State(guard): State<RouteGuard>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(subject) = guard.gate.authorize(guard.capability, req.headers())? {
        debug!("{} authorized for {}", subject.0, guard.capability);
        req.extensions_mut().insert(subject);
    }

    Ok(next.run(req).await)
}

/*!
 * # Actor identity
 *
 * Authentication happens upstream: the gateway in front of this service
 * verifies the user and forwards their id in the `x-user-id` header. Handlers
 * that write take an [`Actor`] argument, which is recorded in the audit
 * columns of every row they touch.
 */

use crate::errors::ServiceError;
use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use std::fmt;
use tracing::debug;

/// Header carrying the authenticated user id.
pub const ACTOR_HEADER: &str = "x-user-id";

/// Audit columns are `VARCHAR(64)`.
const MAX_ACTOR_LEN: usize = 64;

/// The authenticated user performing a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor(String);

impl Actor {
    pub fn new(user_id: impl Into<String>) -> Result<Self, ServiceError> {
        let user_id = user_id.into();
        let trimmed = user_id.trim();
        if trimmed.is_empty() {
            return Err(ServiceError::Unauthorized(format!(
                "Missing {} header",
                ACTOR_HEADER
            )));
        }
        if trimmed.len() > MAX_ACTOR_LEN {
            return Err(ServiceError::Unauthorized(format!(
                "{} must be at most {} characters",
                ACTOR_HEADER, MAX_ACTOR_LEN
            )));
        }
        Ok(Actor(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        let actor = Actor::new(value)?;
        tracing::Span::current().record("actor", actor.as_str());
        debug!(actor = %actor, "Resolved request actor");
        Ok(actor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> Result<Actor, ServiceError> {
        let (mut parts, _) = request.into_parts();
        Actor::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn header_becomes_actor() {
        let request = Request::builder()
            .header(ACTOR_HEADER, " logistics.officer ")
            .body(())
            .unwrap();
        let actor = extract(request).await.unwrap();
        assert_eq!(actor.as_str(), "logistics.officer");
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let request = Request::builder().body(()).unwrap();
        let err = extract(request).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }

    #[test]
    fn overlong_ids_are_rejected() {
        assert!(Actor::new("x".repeat(65)).is_err());
        assert!(Actor::new("x".repeat(64)).is_ok());
    }
}

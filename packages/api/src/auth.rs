// ABOUTME: Acting-user extraction for API handlers
// ABOUTME: Reads the x-user-id header; real authentication lives upstream

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::convert::Infallible;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const DEFAULT_USER_ID: &str = "default-user";

/// The user a request acts as. The surrounding deployment authenticates and
/// sets the header; without it every write is attributed to the default user.
#[derive(Debug, Clone)]
pub struct RequestUser {
    pub id: String,
}

impl<S> FromRequestParts<S> for RequestUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(DEFAULT_USER_ID)
            .to_string();

        Ok(RequestUser { id })
    }
}

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;

/// Header set by the authentication gateway in front of this service
pub const USER_ID_HEADER: &str = "x-user-id";

/// Authenticated caller id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(pub String);

impl Caller {
    pub fn id(&self) -> &str {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| Caller(id.to_string()))
            .ok_or(AppError::Unauthorized)
    }
}

use std::convert::Infallible;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

/// Stands in for the authenticated user until token verification is wired in.
pub const PLACEHOLDER_USER_ID: i32 = 1;

/// The user a request acts on behalf of. An auth layer can insert one into the
/// request extensions; otherwise every request runs as the placeholder user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurrentUser {
    pub user_id: i32,
}

impl Default for CurrentUser {
    fn default() -> Self {
        Self {
            user_id: PLACEHOLDER_USER_ID,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<CurrentUser>().copied().unwrap_or_default())
    }
}

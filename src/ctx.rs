use crate::error::{Error, Result};
use axum::{extract::FromRequestParts, http::request::Parts};

/// Verified staff identity, inserted by the auth middleware.
#[derive(Clone, Debug)]
pub struct Ctx {
    username: String,
}

impl Ctx {
    pub fn new(username: String) -> Self {
        Self { username }
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl<S> FromRequestParts<S> for Ctx
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<Ctx>()
            .cloned()
            .ok_or(Error::AuthFailCtxNotInRequestExt)
    }
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Validation
    #[error("{0}")]
    Validation(String),

    // Auth errors
    #[error("Invalid username or password.")]
    LoginFail,
    #[error("Authentication token not provided.")]
    AuthFailNoToken,
    #[error("Authentication token wrong format.")]
    AuthFailTokenWrongFormat,
    #[error("Token invalid or expired.")]
    AuthFailTokenInvalid,
    #[error("Invalid refresh token.")]
    RefreshTokenInvalid,
    #[error("Auth context missing.")]
    AuthFailCtxNotInRequestExt,

    // Store / generic
    #[error("{message}")]
    Store {
        message: String,
        details: Option<String>,
    },
    #[error("{0}")]
    Internal(String),
}

pub type Result<T> = core::result::Result<T, Error>;

impl Error {
    /// Store failure with a caller-facing message and the raw store error
    /// surfaced as `details`.
    pub fn store(message: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Error::Store {
            message: message.into(),
            details: Some(err.to_string()),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::LoginFail | Error::AuthFailNoToken | Error::AuthFailTokenWrongFormat => {
                StatusCode::UNAUTHORIZED
            }
            Error::AuthFailTokenInvalid | Error::RefreshTokenInvalid => StatusCode::FORBIDDEN,
            Error::AuthFailCtxNotInRequestExt | Error::Store { .. } | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = match &self {
            Error::Store {
                message,
                details: Some(details),
            } => json!({ "error": message, "details": details }),
            other => json!({ "error": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::store("Store operation failed.", err)
    }
}

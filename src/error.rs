//! User-facing error taxonomy for the auth core.
//!
//! Every variant is recovered at the handler boundary and rendered as a
//! structured JSON body; none of them abort the process. Infrastructure
//! failures (database, signing keys) stay on `anyhow` and map to 500s at
//! the handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::guard::AccountStatus;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("account is {0}")]
    AccountNotActive(AccountStatus),
    #[error("invalid one-time code")]
    InvalidCode,
    #[error("one-time code expired, request a new one")]
    Expired,
    #[error("could not send one-time code")]
    DispatchFailure,
    #[error("permission denied")]
    Unauthorized,
    #[error("session is invalid or expired")]
    SessionInvalid,
}

impl Error {
    /// Stable machine-readable tag carried in the response body.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "InvalidCredentials",
            Self::AccountNotActive(_) => "AccountNotActive",
            Self::InvalidCode => "InvalidCode",
            Self::Expired => "Expired",
            Self::DispatchFailure => "DispatchFailure",
            Self::Unauthorized => "Unauthorized",
            Self::SessionInvalid => "SessionInvalid",
        }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials | Self::SessionInvalid => StatusCode::UNAUTHORIZED,
            Self::AccountNotActive(_) | Self::Unauthorized => StatusCode::FORBIDDEN,
            Self::InvalidCode | Self::Expired => StatusCode::BAD_REQUEST,
            Self::DispatchFailure => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.code(),
            "message": self.to_string(),
        }));
        (self.status(), body).into_response()
    }
}

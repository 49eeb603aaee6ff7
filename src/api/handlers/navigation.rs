//! GET /v1/navigation

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::HeaderMap,
    response::{IntoResponse, Json, Response},
};
use sqlx::PgPool;

use super::auth::session::probe_session;
use super::auth::AuthState;
use crate::authz::{navigation_for, permissions_for, NavSection};
use crate::error::Error;
use crate::guard::{evaluate, GuardOutcome, SessionProbe};

/// Navigation tree for the caller's role set. Derived entirely from the
/// authorization resolver, so a role change shows up after the next login.
#[utoipa::path(
    get,
    path = "/v1/navigation",
    responses(
        (status = 200, description = "Visible sections", body = [NavSection]),
        (status = 401, description = "No session or token invalid"),
        (status = 403, description = "Account not active"),
    ),
    security(("bearer" = [])),
    tag = "navigation"
)]
pub async fn navigation(
    headers: HeaderMap,
    Extension(pool): Extension<PgPool>,
    Extension(state): Extension<Arc<AuthState>>,
) -> Response {
    let probe = match probe_session(&headers, &pool, &state).await {
        Ok(probe) => probe,
        Err(status) => return status.into_response(),
    };

    match evaluate(&probe) {
        GuardOutcome::Permit => {
            let SessionProbe::Present(snapshot) = probe else {
                return Error::SessionInvalid.into_response();
            };
            let held = permissions_for(&snapshot.roles);
            Json(navigation_for(&held)).into_response()
        }
        GuardOutcome::Blocked(status) => Error::AccountNotActive(status).into_response(),
        _ => Error::SessionInvalid.into_response(),
    }
}

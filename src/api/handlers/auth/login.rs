//! POST /v1/auth/login

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use sqlx::PgPool;
use tracing::{debug, error, info};

use super::rate_limit::{RateLimitAction, RateLimitDecision};
use super::storage::lookup_user_by_email;
use super::types::{LoginRequest, LoginResponse, UserProfile};
use super::utils::{extract_client_ip, normalize_email, verify_password};
use super::AuthState;
use crate::error::Error;
use crate::guard::AccountStatus;

/// Authenticate with email and password.
///
/// Credentials are the only gate here: a suspended or pending account still
/// authenticates, and the route guard is what keeps it off protected views.
/// Accounts with OTP enabled get a one-time code instead of a token.
#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 400, description = "Missing or invalid payload"),
        (status = 401, description = "Invalid email or password"),
        (status = 429, description = "Too many attempts"),
        (status = 502, description = "One-time code dispatch failed"),
    ),
    tag = "auth"
)]
pub async fn login(
    headers: HeaderMap,
    Extension(pool): Extension<PgPool>,
    Extension(state): Extension<Arc<AuthState>>,
    payload: Option<Json<LoginRequest>>,
) -> Response {
    let Some(Json(payload)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing login payload".to_string()).into_response();
    };

    let email = normalize_email(&payload.email);
    if email.is_empty() || payload.password.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            "Email and password are required".to_string(),
        )
            .into_response();
    }

    let client_ip = extract_client_ip(&headers);
    let limiter = state.rate_limiter();
    if limiter.check_ip(client_ip.as_deref(), RateLimitAction::Login) == RateLimitDecision::Limited
        || limiter.check_email(&email, RateLimitAction::Login) == RateLimitDecision::Limited
    {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            "Too many login attempts, try again later".to_string(),
        )
            .into_response();
    }

    let user = match lookup_user_by_email(&pool, &email).await {
        Ok(user) => user,
        Err(err) => {
            error!("login lookup failed: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    // Unknown email and bad password collapse to the same answer.
    let Some(user) = user else {
        debug!(email = %email, "login for unknown email");
        return Error::InvalidCredentials.into_response();
    };

    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            debug!(email = %email, "login password mismatch");
            return Error::InvalidCredentials.into_response();
        }
        Err(err) => {
            error!(email = %email, "stored password hash unusable: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    }

    if user.otp_enabled {
        // The login is parked until the code comes back on verify-otp.
        let destination = user.contact_number.clone().unwrap_or_else(|| email.clone());
        if let Err(err) = state.otp().issue(&email, &destination).await {
            return err.into_response();
        }
        info!(email = %email, "one-time code dispatched");
        return Json(LoginResponse {
            requires_otp: true,
            token: None,
            user: None,
        })
        .into_response();
    }

    let token = match state.sessions().mint(user.id, &user.email, &user.roles) {
        Ok(token) => token,
        Err(err) => {
            error!("session mint failed: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let status = AccountStatus::from_db(&user.status).unwrap_or(AccountStatus::Inactive);
    info!(email = %email, status = %status, "login succeeded");
    Json(LoginResponse {
        requires_otp: false,
        token: Some(token),
        user: Some(UserProfile {
            id: user.id.to_string(),
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            roles: user.roles,
            status,
        }),
    })
    .into_response()
}

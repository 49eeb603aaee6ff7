//! POST /v1/auth/verify-otp and /v1/auth/resend-otp

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
use super::types::{ResendOtpRequest, UserProfile, VerifyOtpRequest, VerifyOtpResponse};
use super::utils::{extract_client_ip, normalize_email};
use super::AuthState;
use crate::error::Error;
use crate::guard::AccountStatus;

/// Complete an OTP-gated login by presenting the dispatched code.
#[utoipa::path(
    post,
    path = "/v1/auth/verify-otp",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "Code accepted, session issued", body = VerifyOtpResponse),
        (status = 400, description = "Wrong or expired code"),
        (status = 401, description = "No account for this email"),
        (status = 429, description = "Too many attempts"),
    ),
    tag = "auth"
)]
pub async fn verify_otp(
    headers: HeaderMap,
    Extension(pool): Extension<PgPool>,
    Extension(state): Extension<Arc<AuthState>>,
    payload: Option<Json<VerifyOtpRequest>>,
) -> Response {
    let Some(Json(payload)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    let email = normalize_email(&payload.email);
    let client_ip = extract_client_ip(&headers);
    let limiter = state.rate_limiter();
    if limiter.check_ip(client_ip.as_deref(), RateLimitAction::VerifyOtp)
        == RateLimitDecision::Limited
        || limiter.check_email(&email, RateLimitAction::VerifyOtp) == RateLimitDecision::Limited
    {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            "Too many attempts, try again later".to_string(),
        )
            .into_response();
    }

    // The code check happens before any database work so a wrong code never
    // leaks whether the account exists in a different state.
    if let Err(err) = state.otp().verify(&email, payload.otp.trim()).await {
        debug!(email = %email, code = err.code(), "otp verification rejected");
        return err.into_response();
    }

    let user = match lookup_user_by_email(&pool, &email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            // Challenge existed but the account is gone; treat as stale login.
            return Error::InvalidCredentials.into_response();
        }
        Err(err) => {
            error!("verify-otp lookup failed: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let token = match state.sessions().mint(user.id, &user.email, &user.roles) {
        Ok(token) => token,
        Err(err) => {
            error!("session mint failed: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let status = AccountStatus::from_db(&user.status).unwrap_or(AccountStatus::Inactive);
    info!(email = %email, "otp login completed");
    Json(VerifyOtpResponse {
        token,
        user: UserProfile {
            id: user.id.to_string(),
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            roles: user.roles,
            status,
        },
    })
    .into_response()
}

/// Re-dispatch a one-time code, superseding any live challenge.
///
/// The response is opaque for unknown or OTP-disabled accounts so the
/// endpoint cannot be used to enumerate emails.
#[utoipa::path(
    post,
    path = "/v1/auth/resend-otp",
    request_body = ResendOtpRequest,
    responses(
        (status = 204, description = "Accepted"),
        (status = 400, description = "Missing payload"),
        (status = 429, description = "Too many attempts"),
        (status = 502, description = "One-time code dispatch failed"),
    ),
    tag = "auth"
)]
pub async fn resend_otp(
    headers: HeaderMap,
    Extension(pool): Extension<PgPool>,
    Extension(state): Extension<Arc<AuthState>>,
    payload: Option<Json<ResendOtpRequest>>,
) -> Response {
    let Some(Json(payload)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    let email = normalize_email(&payload.email);
    let client_ip = extract_client_ip(&headers);
    let limiter = state.rate_limiter();
    if limiter.check_ip(client_ip.as_deref(), RateLimitAction::ResendOtp)
        == RateLimitDecision::Limited
        || limiter.check_email(&email, RateLimitAction::ResendOtp) == RateLimitDecision::Limited
    {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            "Too many attempts, try again later".to_string(),
        )
            .into_response();
    }

    let user = match lookup_user_by_email(&pool, &email).await {
        Ok(user) => user,
        Err(err) => {
            error!("resend-otp lookup failed: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    match user {
        Some(user) if user.otp_enabled => {
            let destination = user.contact_number.clone().unwrap_or_else(|| email.clone());
            if let Err(err) = state.otp().issue(&email, &destination).await {
                return err.into_response();
            }
            info!(email = %email, "one-time code re-dispatched");
        }
        _ => {
            debug!(email = %email, "resend-otp for unknown or otp-disabled account");
        }
    }

    StatusCode::NO_CONTENT.into_response()
}

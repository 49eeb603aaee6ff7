//! POST /v1/auth/register

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use sqlx::PgPool;
use tracing::{error, info};

use super::rate_limit::{RateLimitAction, RateLimitDecision};
use super::storage::{insert_user, SignupOutcome};
use super::types::RegisterRequest;
use super::utils::{extract_client_ip, hash_password, normalize_email, valid_email};
use super::AuthState;
use crate::authz::Role;

/// Self-service registration. New accounts land as `pending` with the
/// resident role and stay off protected views until an administrator
/// approves them.
#[utoipa::path(
    post,
    path = "/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created, pending approval"),
        (status = 400, description = "Missing or invalid payload"),
        (status = 409, description = "Email already registered"),
        (status = 429, description = "Too many attempts"),
    ),
    tag = "auth"
)]
pub async fn register(
    headers: HeaderMap,
    Extension(pool): Extension<PgPool>,
    Extension(state): Extension<Arc<AuthState>>,
    payload: Option<Json<RegisterRequest>>,
) -> Response {
    let Some(Json(payload)) = payload else {
        return (
            StatusCode::BAD_REQUEST,
            "Missing registration payload".to_string(),
        )
            .into_response();
    };

    let email = normalize_email(&payload.email);
    if !valid_email(&email) {
        return (StatusCode::BAD_REQUEST, "Invalid email address".to_string()).into_response();
    }
    if payload.password.len() < 8 {
        return (
            StatusCode::BAD_REQUEST,
            "Password must be at least 8 characters".to_string(),
        )
            .into_response();
    }
    if payload.first_name.trim().is_empty() || payload.last_name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            "First and last name are required".to_string(),
        )
            .into_response();
    }

    let client_ip = extract_client_ip(&headers);
    if state
        .rate_limiter()
        .check_ip(client_ip.as_deref(), RateLimitAction::Register)
        == RateLimitDecision::Limited
    {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            "Too many registrations, try again later".to_string(),
        )
            .into_response();
    }

    let password_hash = match hash_password(&payload.password) {
        Ok(hash) => hash,
        Err(err) => {
            error!("password hashing failed: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let roles = vec![Role::ParentResident.as_tag().to_string()];
    let outcome = insert_user(
        &pool,
        &email,
        &password_hash,
        payload.first_name.trim(),
        payload.last_name.trim(),
        payload.middle_name.as_deref().map(str::trim),
        payload.contact_number.as_deref().map(str::trim),
        &roles,
    )
    .await;

    match outcome {
        Ok(SignupOutcome::Created) => {
            info!(email = %email, "registration created, pending approval");
            StatusCode::CREATED.into_response()
        }
        Ok(SignupOutcome::Conflict) => (
            StatusCode::CONFLICT,
            "Email already registered".to_string(),
        )
            .into_response(),
        Err(err) => {
            error!("registration insert failed: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::rate_limit::{NoopRateLimiter, RateLimiter};
    use super::super::state::{AuthConfig, AuthState};
    use super::super::types::RegisterRequest;
    use super::register;
    use crate::otp::LogOtpSender;
    use anyhow::Result;
    use axum::extract::Extension;
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::Json;
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use std::sync::Arc;

    fn auth_state() -> Arc<AuthState> {
        let config = AuthConfig::new("http://localhost:5173".to_string());
        let limiter: Arc<dyn RateLimiter> = Arc::new(NoopRateLimiter);
        Arc::new(AuthState::new(
            config,
            &SecretString::from("test-secret".to_string()),
            Arc::new(LogOtpSender),
            limiter,
        ))
    }

    fn request(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            first_name: "Ana".to_string(),
            last_name: "Santos".to_string(),
            middle_name: None,
            contact_number: None,
        }
    }

    #[tokio::test]
    async fn register_missing_payload() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response =
            register(HeaderMap::new(), Extension(pool), Extension(auth_state()), None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn register_invalid_email() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = register(
            HeaderMap::new(),
            Extension(pool),
            Extension(auth_state()),
            Some(Json(request("not-an-email", "long-enough"))),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn register_short_password() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = register(
            HeaderMap::new(),
            Extension(pool),
            Extension(auth_state()),
            Some(Json(request("ana@barangay.ph", "short"))),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn register_blank_names() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let mut payload = request("ana@barangay.ph", "long-enough");
        payload.first_name = "   ".to_string();
        let response = register(
            HeaderMap::new(),
            Extension(pool),
            Extension(auth_state()),
            Some(Json(payload)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }
}

//! GET /v1/auth/session and the shared bearer-token authentication step.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use sqlx::PgPool;
use tracing::{debug, error};
use uuid::Uuid;

use super::storage::lookup_status;
use super::types::SessionResponse;
use super::AuthState;
use crate::authz::Role;
use crate::error::Error;
use crate::guard::{
    blocked_notice, evaluate, AccountStatus, GuardOutcome, SessionProbe, SessionSnapshot,
};

pub(super) fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Resolve the caller into a guard probe: verify the token, then re-read the
/// current account status from the credential store. The role set comes from
/// the token snapshot; the status never does.
///
/// Infrastructure failures are `Err`; an absent or bad token is
/// `Ok(SessionProbe::Missing)` so the guard decides the response.
pub(crate) async fn probe_session(
    headers: &HeaderMap,
    pool: &PgPool,
    state: &AuthState,
) -> Result<SessionProbe, StatusCode> {
    let Some(token) = extract_bearer_token(headers) else {
        return Ok(SessionProbe::Missing);
    };

    let claims = match state.sessions().verify(token) {
        Ok(claims) => claims,
        Err(_) => {
            debug!("session token failed verification");
            return Ok(SessionProbe::Missing);
        }
    };

    let Ok(user_id) = Uuid::parse_str(&claims.sub) else {
        debug!("session token carries a malformed subject");
        return Ok(SessionProbe::Missing);
    };

    let status = match lookup_status(pool, user_id).await {
        Ok(Some(status)) => status,
        Ok(None) => {
            // Account deleted since the token was minted.
            return Ok(SessionProbe::Missing);
        }
        Err(err) => {
            error!("status lookup failed: {err}");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let Some(status) = AccountStatus::from_db(&status) else {
        error!(status = %status, "unknown account status in credential store");
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    };

    Ok(SessionProbe::Present(SessionSnapshot {
        user_id,
        email: claims.email,
        roles: Role::parse_tags(&claims.roles),
        status,
    }))
}

/// Describe the current session: who the caller is, their status, and the
/// blocking notice when the account is not active. A blocked account is a
/// legitimate session, so this returns 200 with the notice rather than an
/// error.
#[utoipa::path(
    get,
    path = "/v1/auth/session",
    responses(
        (status = 200, description = "Session details", body = SessionResponse),
        (status = 401, description = "No session or token invalid"),
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
pub async fn session(
    headers: HeaderMap,
    Extension(pool): Extension<PgPool>,
    Extension(state): Extension<Arc<AuthState>>,
) -> Response {
    let probe = match probe_session(&headers, &pool, &state).await {
        Ok(probe) => probe,
        Err(status) => return status.into_response(),
    };

    match evaluate(&probe) {
        GuardOutcome::Permit | GuardOutcome::Blocked(_) => {
            let SessionProbe::Present(snapshot) = probe else {
                return Error::SessionInvalid.into_response();
            };
            let notice = if snapshot.status.is_active() {
                None
            } else {
                Some(blocked_notice(snapshot.status))
            };
            Json(SessionResponse {
                user_id: snapshot.user_id.to_string(),
                email: snapshot.email,
                roles: snapshot
                    .roles
                    .iter()
                    .map(|role| role.as_tag().to_string())
                    .collect(),
                status: snapshot.status,
                notice,
            })
            .into_response()
        }
        _ => Error::SessionInvalid.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::super::rate_limit::{NoopRateLimiter, RateLimiter};
    use super::super::state::{AuthConfig, AuthState};
    use super::{extract_bearer_token, session};
    use crate::otp::LogOtpSender;
    use anyhow::Result;
    use axum::extract::Extension;
    use axum::http::{header::AUTHORIZATION, HeaderMap, HeaderValue, StatusCode};
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

    #[tokio::test]
    async fn session_without_token_is_unauthorized() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = session(HeaderMap::new(), Extension(pool), Extension(auth_state())).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        Ok(())
    }

    #[test]
    fn bearer_token_is_extracted() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(extract_bearer_token(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn missing_or_malformed_header_yields_none() {
        assert_eq!(extract_bearer_token(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert_eq!(extract_bearer_token(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(extract_bearer_token(&headers), None);
    }
}

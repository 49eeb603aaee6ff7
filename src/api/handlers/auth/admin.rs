//! Administrator endpoints: account approval and role assignment.
//!
//! Both require an active session holding the user-management permission;
//! the guard outcome maps straight onto the error taxonomy.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

use super::session::probe_session;
use super::storage::{approve_user, update_roles};
use super::types::UpdateRolesRequest;
use super::AuthState;
use crate::authz::{Permission, Role};
use crate::error::Error;
use crate::guard::{evaluate_with_permission, GuardOutcome};

async fn require_user_management(
    headers: &HeaderMap,
    pool: &PgPool,
    state: &AuthState,
) -> Result<(), Response> {
    let probe = probe_session(headers, pool, state)
        .await
        .map_err(IntoResponse::into_response)?;

    match evaluate_with_permission(&probe, Permission::UserManagement) {
        GuardOutcome::Permit => Ok(()),
        GuardOutcome::Denied => Err(Error::Unauthorized.into_response()),
        GuardOutcome::Blocked(status) => Err(Error::AccountNotActive(status).into_response()),
        _ => Err(Error::SessionInvalid.into_response()),
    }
}

/// Approve a pending registration, flipping the account to active.
#[utoipa::path(
    post,
    path = "/v1/admin/users/{id}/approve",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 204, description = "Account approved"),
        (status = 401, description = "No session or token invalid"),
        (status = 403, description = "Caller lacks user management"),
        (status = 404, description = "User not found or not pending"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn approve(
    headers: HeaderMap,
    Extension(pool): Extension<PgPool>,
    Extension(state): Extension<Arc<AuthState>>,
    Path(user_id): Path<Uuid>,
) -> Response {
    if let Err(response) = require_user_management(&headers, &pool, &state).await {
        return response;
    }

    match approve_user(&pool, user_id).await {
        Ok(true) => {
            info!(user_id = %user_id, "account approved");
            StatusCode::NO_CONTENT.into_response()
        }
        Ok(false) => (
            StatusCode::NOT_FOUND,
            "No pending account with that id".to_string(),
        )
            .into_response(),
        Err(err) => {
            error!("approve failed: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Replace a user's role set. The set must be non-empty and every tag must
/// name a known role; unknown tags reject the whole request instead of being
/// silently dropped.
#[utoipa::path(
    put,
    path = "/v1/admin/users/{id}/roles",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UpdateRolesRequest,
    responses(
        (status = 204, description = "Roles updated"),
        (status = 400, description = "Empty or unknown role set"),
        (status = 401, description = "No session or token invalid"),
        (status = 403, description = "Caller lacks user management"),
        (status = 404, description = "User not found"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn set_roles(
    headers: HeaderMap,
    Extension(pool): Extension<PgPool>,
    Extension(state): Extension<Arc<AuthState>>,
    Path(user_id): Path<Uuid>,
    payload: Option<Json<UpdateRolesRequest>>,
) -> Response {
    let Some(Json(payload)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    if payload.roles.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            "Role set must not be empty".to_string(),
        )
            .into_response();
    }
    for tag in &payload.roles {
        if Role::from_tag(tag).is_none() {
            return (StatusCode::BAD_REQUEST, format!("Unknown role: {tag}")).into_response();
        }
    }

    if let Err(response) = require_user_management(&headers, &pool, &state).await {
        return response;
    }

    match update_roles(&pool, user_id, &payload.roles).await {
        Ok(true) => {
            info!(user_id = %user_id, roles = ?payload.roles, "roles updated");
            StatusCode::NO_CONTENT.into_response()
        }
        Ok(false) => (StatusCode::NOT_FOUND, "No account with that id".to_string()).into_response(),
        Err(err) => {
            error!("role update failed: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::rate_limit::{NoopRateLimiter, RateLimiter};
    use super::super::state::{AuthConfig, AuthState};
    use super::super::types::UpdateRolesRequest;
    use super::{approve, set_roles};
    use crate::otp::LogOtpSender;
    use anyhow::Result;
    use axum::extract::{Extension, Path};
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::Json;
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use std::sync::Arc;
    use uuid::Uuid;

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

    fn roles(tags: &[&str]) -> Option<Json<UpdateRolesRequest>> {
        Some(Json(UpdateRolesRequest {
            roles: tags.iter().map(ToString::to_string).collect(),
        }))
    }

    #[tokio::test]
    async fn set_roles_missing_payload() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = set_roles(
            HeaderMap::new(),
            Extension(pool),
            Extension(auth_state()),
            Path(Uuid::new_v4()),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn set_roles_rejects_empty_role_set() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = set_roles(
            HeaderMap::new(),
            Extension(pool),
            Extension(auth_state()),
            Path(Uuid::new_v4()),
            roles(&[]),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn set_roles_rejects_unknown_tag() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = set_roles(
            HeaderMap::new(),
            Extension(pool),
            Extension(auth_state()),
            Path(Uuid::new_v4()),
            roles(&["bhw", "mayor"]),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn set_roles_without_session_is_unauthorized() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = set_roles(
            HeaderMap::new(),
            Extension(pool),
            Extension(auth_state()),
            Path(Uuid::new_v4()),
            roles(&["bhw"]),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        Ok(())
    }

    #[tokio::test]
    async fn approve_without_session_is_unauthorized() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = approve(
            HeaderMap::new(),
            Extension(pool),
            Extension(auth_state()),
            Path(Uuid::new_v4()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        Ok(())
    }
}

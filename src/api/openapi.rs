//! `OpenAPI` document for the portal API, derived from the
//! `#[utoipa::path]` annotations on the handlers and served at
//! `/openapi.json`.

use axum::response::Json;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use super::handlers::{auth, health, navigation};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        auth::register::register,
        auth::login::login,
        auth::otp::verify_otp,
        auth::otp::resend_otp,
        auth::session::session,
        auth::admin::approve,
        auth::admin::set_roles,
        navigation::navigation,
    ),
    components(schemas(
        health::Health,
        auth::types::RegisterRequest,
        auth::types::LoginRequest,
        auth::types::LoginResponse,
        auth::types::UserProfile,
        auth::types::VerifyOtpRequest,
        auth::types::VerifyOtpResponse,
        auth::types::ResendOtpRequest,
        auth::types::SessionResponse,
        auth::types::UpdateRolesRequest,
        crate::authz::NavItem,
        crate::authz::NavSection,
        crate::authz::Role,
        crate::guard::AccountStatus,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration, login and session management"),
        (name = "admin", description = "Account approval and role assignment"),
        (name = "navigation", description = "Role-derived navigation tree"),
        (name = "health", description = "Service health"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Serve the generated document.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

use crate::api;
use crate::api::handlers::auth::{AuthConfig, AuthState, NoopRateLimiter};
use crate::otp::LogOtpSender;
use anyhow::Result;
use secrecy::SecretString;
use std::sync::Arc;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub session_secret: SecretString,
    pub frontend_base_url: String,
    pub session_ttl_seconds: i64,
    pub otp_ttl_seconds: u64,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let auth_config = AuthConfig::new(args.frontend_base_url)
        .with_session_ttl_seconds(args.session_ttl_seconds)
        .with_otp_ttl_seconds(args.otp_ttl_seconds);

    let auth_state = Arc::new(AuthState::new(
        auth_config,
        &args.session_secret,
        Arc::new(LogOtpSender),
        Arc::new(NoopRateLimiter),
    ));

    api::new(args.port, args.dsn, auth_state).await
}

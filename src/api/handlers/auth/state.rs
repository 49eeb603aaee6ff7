//! Auth configuration and the shared state extension.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;

use super::rate_limit::RateLimiter;
use crate::otp::{OtpIssuer, OtpSender, DEFAULT_OTP_TTL_SECONDS};
use crate::session::{SessionIssuer, DEFAULT_SESSION_TTL_SECONDS};

#[derive(Clone, Debug)]
pub struct AuthConfig {
    frontend_base_url: String,
    session_ttl_seconds: i64,
    otp_ttl_seconds: u64,
}

impl AuthConfig {
    #[must_use]
    pub fn new(frontend_base_url: String) -> Self {
        Self {
            frontend_base_url,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            otp_ttl_seconds: DEFAULT_OTP_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_otp_ttl_seconds(mut self, seconds: u64) -> Self {
        self.otp_ttl_seconds = seconds;
        self
    }

    pub(crate) fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    #[must_use]
    pub const fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    #[must_use]
    pub const fn otp_ttl_seconds(&self) -> u64 {
        self.otp_ttl_seconds
    }
}

/// Everything the auth handlers need, injected as one axum extension
/// instead of read from ambient state.
pub struct AuthState {
    config: AuthConfig,
    sessions: SessionIssuer,
    otp: OtpIssuer,
    rate_limiter: Arc<dyn RateLimiter>,
}

impl AuthState {
    #[must_use]
    pub fn new(
        config: AuthConfig,
        session_secret: &SecretString,
        otp_sender: Arc<dyn OtpSender>,
        rate_limiter: Arc<dyn RateLimiter>,
    ) -> Self {
        let sessions = SessionIssuer::new(session_secret, config.session_ttl_seconds());
        let otp = OtpIssuer::new(
            Duration::from_secs(config.otp_ttl_seconds()),
            otp_sender,
        );
        Self {
            config,
            sessions,
            otp,
            rate_limiter,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionIssuer {
        &self.sessions
    }

    #[must_use]
    pub fn otp(&self) -> &OtpIssuer {
        &self.otp
    }

    pub(super) fn rate_limiter(&self) -> &dyn RateLimiter {
        self.rate_limiter.as_ref()
    }
}

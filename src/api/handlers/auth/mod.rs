//! Authentication and account administration endpoints.

pub mod admin;
pub mod login;
pub mod otp;
pub mod rate_limit;
pub mod register;
pub mod session;
mod state;
mod storage;
pub mod types;
mod utils;

pub use rate_limit::{NoopRateLimiter, RateLimitAction, RateLimitDecision, RateLimiter};
pub use state::{AuthConfig, AuthState};

//! One-time password lifecycle: issue, dispatch, verify.
//!
//! A challenge lives in memory, keyed by the account email, and is
//! single-use: verified once, it cannot be replayed. Issuing again for the
//! same key supersedes the prior challenge — at most one live challenge per
//! key at any time.

mod dispatch;
mod service;

pub use dispatch::{LogOtpSender, OtpSender};
pub use service::{OtpIssuer, CODE_LENGTH, DEFAULT_OTP_TTL_SECONDS};

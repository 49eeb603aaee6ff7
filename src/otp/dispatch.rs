//! Delivery abstraction for one-time codes.
//!
//! The portal sends codes over SMS or email through a provider that lives
//! outside this repository. The issuer only needs a send that either
//! happened or did not: a failed send must surface to the caller, never
//! drop silently.

use anyhow::Result;
use tracing::info;

/// Dispatch channel for one-time codes.
pub trait OtpSender: Send + Sync {
    /// Deliver `code` to `destination` (phone number or email address).
    ///
    /// # Errors
    /// Returns an error when delivery did not happen; the issuer then
    /// discards the challenge and reports a dispatch failure.
    fn send(&self, destination: &str, code: &str) -> Result<()>;
}

/// Local dev sender that logs the code instead of sending it.
#[derive(Clone, Debug)]
pub struct LogOtpSender;

impl OtpSender for LogOtpSender {
    fn send(&self, destination: &str, code: &str) -> Result<()> {
        info!(destination = %destination, code = %code, "otp dispatch stub");
        Ok(())
    }
}

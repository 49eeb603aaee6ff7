//! The OTP issuer: ephemeral keyed challenges behind an async mutex.
//!
//! Challenge records never touch the database — they are short-lived,
//! single-use, and per-instance, held in a `HashMap` keyed by account
//! email. Inserting for a key that already holds a live challenge replaces
//! it, which is exactly the last-writer-wins supersession the login flow
//! needs: racing issues resolve to the most recent code.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::{rngs::OsRng, Rng};
use tokio::sync::Mutex;
use tracing::warn;

use super::dispatch::OtpSender;
use crate::error::Error;

pub const CODE_LENGTH: usize = 6;
pub const DEFAULT_OTP_TTL_SECONDS: u64 = 5 * 60;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ChallengeStatus {
    Issued,
    /// Consumed by a successful verify; kept so a replay fails as expired
    /// instead of looking like a fresh mismatch.
    Verified,
}

struct Challenge {
    code: String,
    issued_at: Instant,
    status: ChallengeStatus,
    /// Code of the challenge this one replaced, if it was still live.
    /// A verify attempt with it fails as expired, not as a mismatch.
    prior_code: Option<String>,
}

pub struct OtpIssuer {
    ttl: Duration,
    sender: Arc<dyn OtpSender>,
    challenges: Mutex<HashMap<String, Challenge>>,
}

impl OtpIssuer {
    #[must_use]
    pub fn new(ttl: Duration, sender: Arc<dyn OtpSender>) -> Self {
        Self {
            ttl,
            sender,
            challenges: Mutex::new(HashMap::new()),
        }
    }

    /// Generate, dispatch, and record a challenge for `key`.
    ///
    /// Issuance and dispatch are one unit: if the send fails, no challenge
    /// is recorded (and any prior live challenge for the key is discarded
    /// so a retry starts clean) and `DispatchFailure` is returned.
    pub async fn issue(&self, key: &str, destination: &str) -> Result<(), Error> {
        let code = generate_code();

        if let Err(err) = self.sender.send(destination, &code) {
            warn!(key = %key, "otp dispatch failed: {err}");
            let mut challenges = self.challenges.lock().await;
            challenges.remove(key);
            return Err(Error::DispatchFailure);
        }

        let mut challenges = self.challenges.lock().await;
        // Drop stale entries so abandoned logins don't accumulate.
        let ttl = self.ttl;
        challenges.retain(|_, challenge| challenge.issued_at.elapsed() < ttl);
        let prior_code = challenges
            .get(key)
            .filter(|challenge| challenge.status == ChallengeStatus::Issued)
            .map(|challenge| challenge.code.clone());
        challenges.insert(
            key.to_string(),
            Challenge {
                code,
                issued_at: Instant::now(),
                status: ChallengeStatus::Issued,
                prior_code,
            },
        );
        Ok(())
    }

    /// Verify `candidate` against the live challenge for `key`.
    ///
    /// - match before expiry: the challenge is consumed, `Ok(())`;
    /// - mismatch: `InvalidCode`, challenge stays live (bounded retry);
    /// - past expiry, consumed, superseded by a resend, or no challenge:
    ///   `Expired` — the remedy is always to request a new code.
    pub async fn verify(&self, key: &str, candidate: &str) -> Result<(), Error> {
        let mut challenges = self.challenges.lock().await;

        let Some(challenge) = challenges.get_mut(key) else {
            return Err(Error::Expired);
        };

        if challenge.issued_at.elapsed() >= self.ttl {
            challenges.remove(key);
            return Err(Error::Expired);
        }

        match challenge.status {
            ChallengeStatus::Verified => Err(Error::Expired),
            ChallengeStatus::Issued => {
                if challenge.code == candidate {
                    challenge.status = ChallengeStatus::Verified;
                    Ok(())
                } else if challenge.prior_code.as_deref() == Some(candidate) {
                    Err(Error::Expired)
                } else {
                    Err(Error::InvalidCode)
                }
            }
        }
    }
}

/// Uniform 6-digit code from the OS entropy source — never derived from a
/// timestamp or counter.
fn generate_code() -> String {
    let value: u32 = OsRng.gen_range(0..1_000_000);
    format!("{value:06}")
}

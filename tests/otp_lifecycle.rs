//! End-to-end exercise of the OTP-gated login flow without a database:
//! challenge issuance, retry, supersession and session minting.

use anyhow::{anyhow, Result};
use gabay::otp::{OtpIssuer, OtpSender};
use gabay::session::SessionIssuer;
use gabay::Error;
use secrecy::SecretString;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

#[derive(Default)]
struct RecordingSender {
    sent: Mutex<Vec<(String, String)>>,
    fail: AtomicBool,
}

impl RecordingSender {
    fn last_code(&self) -> Option<String> {
        self.sent
            .lock()
            .expect("sender lock")
            .last()
            .map(|(_, code)| code.clone())
    }

    fn sent_count(&self) -> usize {
        self.sent.lock().expect("sender lock").len()
    }
}

impl OtpSender for RecordingSender {
    fn send(&self, destination: &str, code: &str) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("sms gateway unreachable"));
        }
        self.sent
            .lock()
            .expect("sender lock")
            .push((destination.to_string(), code.to_string()));
        Ok(())
    }
}

fn otp_issuer() -> (OtpIssuer, Arc<RecordingSender>) {
    let sender = Arc::new(RecordingSender::default());
    (
        OtpIssuer::new(Duration::from_secs(300), sender.clone()),
        sender,
    )
}

#[tokio::test]
async fn full_otp_login_flow_issues_a_session() {
    let (otp, sender) = otp_issuer();
    let sessions = SessionIssuer::new(&SecretString::from("integration-secret".to_string()), 3600);

    // Credentials verified; account has OTP enabled, so a code goes out.
    otp.issue("nurse@barangay.ph", "+639170000001")
        .await
        .expect("issue");
    assert_eq!(sender.sent_count(), 1);
    let code = sender.last_code().expect("dispatched code");

    // A typo first: the challenge survives the mismatch.
    let wrong = if code == "111111" { "222222" } else { "111111" };
    assert_eq!(
        otp.verify("nurse@barangay.ph", wrong).await,
        Err(Error::InvalidCode)
    );

    // Correct code completes the login and a token is minted.
    assert_eq!(otp.verify("nurse@barangay.ph", &code).await, Ok(()));
    let user_id = Uuid::new_v4();
    let token = sessions
        .mint(user_id, "nurse@barangay.ph", &["bhw".to_string()])
        .expect("mint");

    let claims = sessions.verify(&token).expect("verify token");
    assert_eq!(claims.sub, user_id.to_string());
    assert_eq!(claims.roles, vec!["bhw".to_string()]);

    // The consumed challenge cannot complete a second login.
    assert_eq!(
        otp.verify("nurse@barangay.ph", &code).await,
        Err(Error::Expired)
    );
}

#[tokio::test]
async fn resend_supersedes_and_only_latest_code_works() {
    let (otp, sender) = otp_issuer();

    otp.issue("nurse@barangay.ph", "+639170000001")
        .await
        .expect("first issue");
    let first = sender.last_code().expect("first code");

    otp.issue("nurse@barangay.ph", "+639170000001")
        .await
        .expect("resend");
    let second = sender.last_code().expect("second code");
    assert_eq!(sender.sent_count(), 2);

    // The superseded code reads as expired, so the caller knows to use the
    // freshest one rather than retyping.
    assert_eq!(
        otp.verify("nurse@barangay.ph", &first).await,
        Err(Error::Expired)
    );
    assert_eq!(otp.verify("nurse@barangay.ph", &second).await, Ok(()));
}

#[tokio::test]
async fn dispatch_failure_surfaces_and_clears_state() {
    let (otp, sender) = otp_issuer();

    otp.issue("nurse@barangay.ph", "+639170000001")
        .await
        .expect("issue");
    let code = sender.last_code().expect("dispatched code");

    sender.fail.store(true, Ordering::SeqCst);
    assert_eq!(
        otp.issue("nurse@barangay.ph", "+639170000001").await,
        Err(Error::DispatchFailure)
    );

    // The earlier challenge is gone; the user must request a fresh code.
    assert_eq!(
        otp.verify("nurse@barangay.ph", &code).await,
        Err(Error::Expired)
    );

    sender.fail.store(false, Ordering::SeqCst);
    otp.issue("nurse@barangay.ph", "+639170000001")
        .await
        .expect("recovered issue");
    let fresh = sender.last_code().expect("fresh code");
    assert_eq!(otp.verify("nurse@barangay.ph", &fresh).await, Ok(()));
}

#[tokio::test]
async fn expired_session_token_is_rejected() {
    let sessions = SessionIssuer::new(&SecretString::from("integration-secret".to_string()), -1);
    let token = sessions
        .mint(Uuid::new_v4(), "late@barangay.ph", &["visitor".to_string()])
        .expect("mint");
    assert_eq!(sessions.verify(&token), Err(Error::SessionInvalid));
}

//! Route-guard evaluation and the account status model.
//!
//! The guard is a pure predicate over a session probe: it never touches the
//! network or mutates anything, so an evaluation abandoned mid-navigation
//! (client unmount, request cancellation) leaves no state behind. The API
//! layer builds the probe (verify token, read current status) and then maps
//! the outcome to a response; a frontend shell applies the same mapping to
//! rendering.
//!
//! Status gating is deliberately separate from authentication: a suspended
//! user still authenticates and holds a valid token, and the guard is what
//! keeps them on the blocking screen.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::authz::{authorize, permissions_for, Permission, Role};

/// Account lifecycle status. Transitions are administrator-driven except
/// pending→active at approval.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Pending,
    Active,
    Suspended,
    Inactive,
}

impl AccountStatus {
    /// Parse the persisted `users.status` textual value.
    #[must_use]
    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "active" => Some(Self::Active),
            "suspended" => Some(Self::Suspended),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Inactive => "inactive",
        }
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the guard knows about the caller once the probe resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub user_id: Uuid,
    pub email: String,
    /// Role set snapshotted into the token at login.
    pub roles: Vec<Role>,
    /// Current status, read from the credential store at request time.
    pub status: AccountStatus,
}

/// The state of the session check feeding a guard evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionProbe {
    /// Check still in flight; render nothing yet.
    Unknown,
    /// No token, or the token failed verification.
    Missing,
    Present(SessionSnapshot),
}

/// Terminal decision for one protected navigation/request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Neutral waiting indicator; neither content nor redirect may flash.
    Waiting,
    RedirectToLogin,
    /// Expected terminal state while the account is not active; not an error.
    Blocked(AccountStatus),
    /// Holds a permission the required check asked for, but the caller does not.
    Denied,
    Permit,
}

/// User-readable notice for the blocking screen. Names the current status so
/// a suspended resident sees "suspended", not a generic failure.
#[must_use]
pub fn blocked_notice(status: AccountStatus) -> String {
    match status {
        AccountStatus::Pending => {
            "Your account is pending barangay approval. You will be notified once it is reviewed."
                .to_string()
        }
        status => format!("Your account is {status}. Please contact the barangay office."),
    }
}

/// Steps 1, 2 and 4 of the guard: presence, status, and the in-flight case.
#[must_use]
pub fn evaluate(probe: &SessionProbe) -> GuardOutcome {
    match probe {
        SessionProbe::Unknown => GuardOutcome::Waiting,
        SessionProbe::Missing => GuardOutcome::RedirectToLogin,
        SessionProbe::Present(snapshot) => {
            if snapshot.status.is_active() {
                GuardOutcome::Permit
            } else {
                GuardOutcome::Blocked(snapshot.status)
            }
        }
    }
}

/// Full guard: presence and status first, then the fine-grained permission
/// check delegated to the authorization resolver.
#[must_use]
pub fn evaluate_with_permission(probe: &SessionProbe, required: Permission) -> GuardOutcome {
    match evaluate(probe) {
        GuardOutcome::Permit => {
            let SessionProbe::Present(snapshot) = probe else {
                // evaluate() only permits a present probe.
                return GuardOutcome::RedirectToLogin;
            };
            let held = permissions_for(&snapshot.roles);
            if authorize(required, &held) {
                GuardOutcome::Permit
            } else {
                GuardOutcome::Denied
            }
        }
        outcome => outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        blocked_notice, evaluate, evaluate_with_permission, AccountStatus, GuardOutcome,
        SessionProbe, SessionSnapshot,
    };
    use crate::authz::{Permission, Role};
    use uuid::Uuid;

    fn snapshot(roles: Vec<Role>, status: AccountStatus) -> SessionProbe {
        SessionProbe::Present(SessionSnapshot {
            user_id: Uuid::new_v4(),
            email: "resident@barangay.ph".to_string(),
            roles,
            status,
        })
    }

    #[test]
    fn missing_session_redirects() {
        assert_eq!(
            evaluate(&SessionProbe::Missing),
            GuardOutcome::RedirectToLogin
        );
    }

    #[test]
    fn in_flight_check_waits() {
        assert_eq!(evaluate(&SessionProbe::Unknown), GuardOutcome::Waiting);
    }

    #[test]
    fn pending_account_blocks_and_never_permits() {
        let probe = snapshot(vec![Role::ParentResident], AccountStatus::Pending);
        assert_eq!(
            evaluate(&probe),
            GuardOutcome::Blocked(AccountStatus::Pending)
        );
        // Even with the right permission held, status wins.
        assert_eq!(
            evaluate_with_permission(&probe, Permission::CertificateRequests),
            GuardOutcome::Blocked(AccountStatus::Pending)
        );
    }

    #[test]
    fn suspended_notice_names_the_status() {
        assert!(blocked_notice(AccountStatus::Suspended).contains("suspended"));
        assert!(blocked_notice(AccountStatus::Inactive).contains("inactive"));
    }

    #[test]
    fn active_account_permits() {
        let probe = snapshot(vec![Role::Bhw], AccountStatus::Active);
        assert_eq!(evaluate(&probe), GuardOutcome::Permit);
    }

    #[test]
    fn permission_check_delegates_to_resolver() {
        let probe = snapshot(vec![Role::Bhw], AccountStatus::Active);
        assert_eq!(
            evaluate_with_permission(&probe, Permission::HealthDashboard),
            GuardOutcome::Permit
        );
        assert_eq!(
            evaluate_with_permission(&probe, Permission::UserManagement),
            GuardOutcome::Denied
        );
    }

    #[test]
    fn status_round_trips_through_db_strings() {
        for status in [
            AccountStatus::Pending,
            AccountStatus::Active,
            AccountStatus::Suspended,
            AccountStatus::Inactive,
        ] {
            assert_eq!(AccountStatus::from_db(status.as_str()), Some(status));
        }
        assert_eq!(AccountStatus::from_db("banned"), None);
    }
}

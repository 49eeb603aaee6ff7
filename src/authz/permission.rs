//! The closed set of capabilities a role can grant.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A capability tag. A user's effective permission set is the union of the
/// permissions granted by every role they hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    UserManagement,
    HealthDashboard,
    MaternalRecords,
    /// Resident-facing view of their own maternal visits.
    MaternalSelfService,
    DaycareDashboard,
    DaycareRecords,
    SkDashboard,
    SkCertificates,
    Announcements,
    CertificateRequests,
    ProfileSettings,
}

impl Permission {
    pub const ALL: [Permission; 11] = [
        Permission::UserManagement,
        Permission::HealthDashboard,
        Permission::MaternalRecords,
        Permission::MaternalSelfService,
        Permission::DaycareDashboard,
        Permission::DaycareRecords,
        Permission::SkDashboard,
        Permission::SkCertificates,
        Permission::Announcements,
        Permission::CertificateRequests,
        Permission::ProfileSettings,
    ];
}

//! The closed set of portal roles.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A role tag assigned to a user. Users carry a non-empty set of these;
/// the set is snapshotted into the session token at login.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SystemAdmin,
    /// Barangay health worker (maternal health tracking).
    Bhw,
    DaycareStaff,
    /// Sangguniang Kabataan (youth council) officer.
    SkOfficer,
    ParentResident,
    Visitor,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::SystemAdmin,
        Role::Bhw,
        Role::DaycareStaff,
        Role::SkOfficer,
        Role::ParentResident,
        Role::Visitor,
    ];

    /// Parse a stored role tag. Unknown tags yield `None` so callers fail
    /// closed instead of inventing a fallback role — `visitor` is only ever
    /// explicit.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "system_admin" => Some(Self::SystemAdmin),
            "bhw" => Some(Self::Bhw),
            "daycare_staff" => Some(Self::DaycareStaff),
            "sk_officer" => Some(Self::SkOfficer),
            "parent_resident" => Some(Self::ParentResident),
            "visitor" => Some(Self::Visitor),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_tag(&self) -> &'static str {
        match self {
            Self::SystemAdmin => "system_admin",
            Self::Bhw => "bhw",
            Self::DaycareStaff => "daycare_staff",
            Self::SkOfficer => "sk_officer",
            Self::ParentResident => "parent_resident",
            Self::Visitor => "visitor",
        }
    }

    /// Parse a slice of stored tags, dropping unknown ones.
    ///
    /// Role records are written through the admin role-update path which
    /// only accepts known tags, so a drop here means the enum and the data
    /// drifted; the caller logs it.
    #[must_use]
    pub fn parse_tags(tags: &[String]) -> Vec<Self> {
        tags.iter().filter_map(|tag| Self::from_tag(tag)).collect()
    }
}

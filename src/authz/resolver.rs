//! Role→permission resolution.
//!
//! The grant table is a static, exhaustive match over the closed `Role`
//! enum. It is configuration, not user data: changing what a barangay
//! health worker may see is a code change reviewed like any other.

use std::collections::BTreeSet;

use super::{Permission, Role};

/// The static grant table. Exhaustive over `Role`, so a new role cannot be
/// added without deciding its permissions.
const fn grants(role: Role) -> &'static [Permission] {
    match role {
        Role::SystemAdmin => &[
            Permission::UserManagement,
            Permission::HealthDashboard,
            Permission::DaycareDashboard,
            Permission::SkDashboard,
            Permission::Announcements,
            Permission::CertificateRequests,
            Permission::ProfileSettings,
        ],
        Role::Bhw => &[
            Permission::HealthDashboard,
            Permission::MaternalRecords,
            Permission::Announcements,
            Permission::ProfileSettings,
        ],
        Role::DaycareStaff => &[
            Permission::DaycareDashboard,
            Permission::DaycareRecords,
            Permission::Announcements,
            Permission::ProfileSettings,
        ],
        Role::SkOfficer => &[
            Permission::SkDashboard,
            Permission::SkCertificates,
            Permission::Announcements,
            Permission::ProfileSettings,
        ],
        Role::ParentResident => &[
            Permission::MaternalSelfService,
            Permission::CertificateRequests,
            Permission::Announcements,
            Permission::ProfileSettings,
        ],
        Role::Visitor => &[Permission::Announcements],
    }
}

/// Union of the static grants of every role in the set.
///
/// Pure: consults the role set and nothing else. An empty slice yields the
/// empty set — rejecting empty role sets is the job of the writers
/// (registration, role update), not the resolver.
#[must_use]
pub fn permissions_for(roles: &[Role]) -> BTreeSet<Permission> {
    roles
        .iter()
        .flat_map(|role| grants(*role).iter().copied())
        .collect()
}

/// Allow iff the required permission is in the caller's set.
#[must_use]
pub fn authorize(required: Permission, held: &BTreeSet<Permission>) -> bool {
    held.contains(&required)
}

#[cfg(test)]
mod tests {
    use super::{authorize, permissions_for};
    use crate::authz::{Permission, Role};
    use std::collections::BTreeSet;

    #[test]
    fn union_homomorphism_over_singletons() {
        // permissions_for(R) == ∪ permissions_for({r}) for every subset we
        // can build out of the full role list.
        let all = Role::ALL;
        for mask in 0u32..(1 << all.len()) {
            let subset: Vec<Role> = all
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, r)| *r)
                .collect();
            let combined = permissions_for(&subset);
            let mut unioned = BTreeSet::new();
            for role in &subset {
                unioned.extend(permissions_for(&[*role]));
            }
            assert_eq!(combined, unioned, "subset {subset:?}");
        }
    }

    #[test]
    fn empty_role_set_yields_empty_permissions() {
        assert!(permissions_for(&[]).is_empty());
    }

    #[test]
    fn duplicate_roles_do_not_change_the_set() {
        assert_eq!(
            permissions_for(&[Role::Bhw, Role::Bhw]),
            permissions_for(&[Role::Bhw])
        );
    }

    #[test]
    fn authorize_is_membership_exhaustively() {
        // Check every (permission, role set) pairing over singleton sets.
        for role in Role::ALL {
            let held = permissions_for(&[role]);
            for permission in Permission::ALL {
                assert_eq!(
                    authorize(permission, &held),
                    held.contains(&permission),
                    "{role:?} / {permission:?}"
                );
            }
        }
    }

    #[test]
    fn bhw_sees_health_but_not_user_management() {
        let held = permissions_for(&[Role::Bhw]);
        assert!(authorize(Permission::HealthDashboard, &held));
        assert!(authorize(Permission::MaternalRecords, &held));
        assert!(!authorize(Permission::UserManagement, &held));
    }

    #[test]
    fn visitor_is_announcements_only() {
        let held = permissions_for(&[Role::Visitor]);
        assert_eq!(held.len(), 1);
        assert!(authorize(Permission::Announcements, &held));
    }
}

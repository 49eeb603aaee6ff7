//! Permission-gated navigation tree.
//!
//! The sidebar is derived data: a fixed catalog of sections, each guarded by
//! a permission set, each sub-item guarded by a single permission. Sections
//! can be contributed by more than one catalog block (the staff-facing and
//! resident-facing health catalogs both emit "Health Services"), so
//! contributions are merged by title before being returned:
//!
//! - sections deduplicate by title, item lists are concatenated;
//! - items deduplicate by title, the last contribution wins;
//! - order is first-seen order of distinct titles.
//!
//! The last-write-wins rule is deliberate and pinned by tests; changing it
//! silently reorders or relabels live sidebars.

use std::collections::BTreeSet;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Permission;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NavItem {
    pub title: String,
    pub path: String,
}

impl NavItem {
    fn new(title: &str, path: &str) -> Self {
        Self {
            title: title.to_string(),
            path: path.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NavSection {
    pub title: String,
    pub items: Vec<NavItem>,
}

/// One catalog entry: a section plus the permissions guarding it and its items.
struct SectionSpec {
    title: &'static str,
    /// Included iff the caller holds at least one of these.
    guard: &'static [Permission],
    items: &'static [(Permission, &'static str, &'static str)],
}

/// Catalog order is sidebar order. "Health Services" appears twice on
/// purpose: once for barangay health staff, once for residents tracking
/// their own visits. The merge below folds them into one section.
const CATALOG: &[SectionSpec] = &[
    SectionSpec {
        title: "User Management",
        guard: &[Permission::UserManagement],
        items: &[
            (Permission::UserManagement, "Residents", "/admin/users"),
            (
                Permission::UserManagement,
                "Pending Approvals",
                "/admin/approvals",
            ),
        ],
    },
    SectionSpec {
        title: "Health Services",
        guard: &[Permission::HealthDashboard, Permission::MaternalRecords],
        items: &[
            (
                Permission::HealthDashboard,
                "Maternal Dashboard",
                "/health/dashboard",
            ),
            (
                Permission::MaternalRecords,
                "Patient Records",
                "/health/records",
            ),
            (
                Permission::MaternalRecords,
                "Immunization Schedule",
                "/health/immunization",
            ),
        ],
    },
    SectionSpec {
        title: "Health Services",
        guard: &[Permission::MaternalSelfService],
        items: &[(
            Permission::MaternalSelfService,
            "My Prenatal Visits",
            "/health/my-visits",
        )],
    },
    SectionSpec {
        title: "Daycare",
        guard: &[Permission::DaycareDashboard, Permission::DaycareRecords],
        items: &[
            (
                Permission::DaycareDashboard,
                "Daycare Dashboard",
                "/daycare/dashboard",
            ),
            (Permission::DaycareRecords, "Enrollment", "/daycare/enrollment"),
            (Permission::DaycareRecords, "Attendance", "/daycare/attendance"),
        ],
    },
    SectionSpec {
        title: "Youth Programs",
        guard: &[Permission::SkDashboard, Permission::SkCertificates],
        items: &[
            (Permission::SkDashboard, "SK Events", "/sk/events"),
            (Permission::SkCertificates, "Certificates", "/sk/certificates"),
        ],
    },
    SectionSpec {
        title: "Announcements",
        guard: &[Permission::Announcements],
        items: &[(Permission::Announcements, "Barangay Feed", "/announcements")],
    },
    SectionSpec {
        title: "Certificates",
        guard: &[Permission::CertificateRequests],
        items: &[(
            Permission::CertificateRequests,
            "Request Certificate",
            "/certificates/request",
        )],
    },
    SectionSpec {
        title: "Settings",
        guard: &[Permission::ProfileSettings],
        items: &[(Permission::ProfileSettings, "Profile", "/settings/profile")],
    },
];

/// Build the navigation tree for a permission set.
#[must_use]
pub fn navigation_for(held: &BTreeSet<Permission>) -> Vec<NavSection> {
    let contributions = CATALOG
        .iter()
        .filter(|spec| spec.guard.iter().any(|p| held.contains(p)))
        .map(|spec| NavSection {
            title: spec.title.to_string(),
            items: spec
                .items
                .iter()
                .filter(|(permission, _, _)| held.contains(permission))
                .map(|(_, title, path)| NavItem::new(title, path))
                .collect(),
        })
        .collect();

    merge_sections(contributions)
}

/// Merge same-title sections and dedupe items by title.
///
/// Last write wins for an item title that appears twice; first-seen order
/// is preserved for both sections and items.
pub(crate) fn merge_sections(contributions: Vec<NavSection>) -> Vec<NavSection> {
    let mut sections: Vec<NavSection> = Vec::new();
    let mut section_index: HashMap<String, usize> = HashMap::new();

    for contribution in contributions {
        let index = match section_index.get(&contribution.title) {
            Some(index) => *index,
            None => {
                section_index.insert(contribution.title.clone(), sections.len());
                sections.push(NavSection {
                    title: contribution.title,
                    items: Vec::new(),
                });
                sections.len() - 1
            }
        };

        for item in contribution.items {
            let section = &mut sections[index];
            match section.items.iter_mut().find(|i| i.title == item.title) {
                Some(existing) => *existing = item,
                None => section.items.push(item),
            }
        }
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::{merge_sections, navigation_for, NavItem, NavSection};
    use crate::authz::{permissions_for, Permission, Role};
    use std::collections::BTreeSet;
    use std::collections::HashSet;

    fn section(title: &str, items: &[(&str, &str)]) -> NavSection {
        NavSection {
            title: title.to_string(),
            items: items
                .iter()
                .map(|(t, p)| NavItem::new(t, p))
                .collect(),
        }
    }

    #[test]
    fn bhw_gets_health_services_but_not_user_management() {
        let nav = navigation_for(&permissions_for(&[Role::Bhw]));
        let titles: Vec<&str> = nav.iter().map(|s| s.title.as_str()).collect();
        assert!(titles.contains(&"Health Services"));
        assert!(!titles.contains(&"User Management"));
    }

    #[test]
    fn no_duplicate_titles_for_any_role_combination() {
        let all = Role::ALL;
        for mask in 0u32..(1 << all.len()) {
            let subset: Vec<Role> = all
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, r)| *r)
                .collect();
            let nav = navigation_for(&permissions_for(&subset));

            let mut section_titles = HashSet::new();
            for section in &nav {
                assert!(
                    section_titles.insert(section.title.clone()),
                    "duplicate section {:?} for {subset:?}",
                    section.title
                );
                let mut item_titles = HashSet::new();
                for item in &section.items {
                    assert!(
                        item_titles.insert(item.title.clone()),
                        "duplicate item {:?} in {:?} for {subset:?}",
                        item.title,
                        section.title
                    );
                }
            }
        }
    }

    #[test]
    fn staff_and_resident_health_sections_merge() {
        // A BHW who is also a resident gets one Health Services section
        // containing both the staff items and their own visits.
        let nav = navigation_for(&permissions_for(&[Role::Bhw, Role::ParentResident]));
        let health: Vec<&NavSection> = nav
            .iter()
            .filter(|s| s.title == "Health Services")
            .collect();
        assert_eq!(health.len(), 1);
        let item_titles: Vec<&str> = health[0].items.iter().map(|i| i.title.as_str()).collect();
        assert!(item_titles.contains(&"Maternal Dashboard"));
        assert!(item_titles.contains(&"My Prenatal Visits"));
    }

    #[test]
    fn empty_permissions_yield_empty_navigation() {
        assert!(navigation_for(&BTreeSet::new()).is_empty());
    }

    #[test]
    fn merge_keeps_first_seen_order_and_last_write_wins() {
        let merged = merge_sections(vec![
            section("A", &[("one", "/a/one"), ("two", "/a/two")]),
            section("B", &[("three", "/b/three")]),
            // Second "A" contribution: replaces "two", appends "four".
            section("A", &[("two", "/a/two-v2"), ("four", "/a/four")]),
        ]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].title, "A");
        assert_eq!(merged[1].title, "B");

        let a_items: Vec<(&str, &str)> = merged[0]
            .items
            .iter()
            .map(|i| (i.title.as_str(), i.path.as_str()))
            .collect();
        assert_eq!(
            a_items,
            vec![("one", "/a/one"), ("two", "/a/two-v2"), ("four", "/a/four")]
        );
    }

    #[test]
    fn section_with_no_visible_items_still_requires_guard_permission() {
        // Announcements-only visitor: exactly the sections their single
        // permission guards.
        let nav = navigation_for(&permissions_for(&[Role::Visitor]));
        assert_eq!(nav.len(), 1);
        assert_eq!(nav[0].title, "Announcements");
    }
}

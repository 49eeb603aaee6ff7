//! # Gabay Barangay portal backend
//!
//! `gabay` is the account and access backend for a barangay services portal
//! serving health workers, daycare staff, SK officers and residents.
//!
//! ## Roles and permissions
//!
//! Every account carries one or more roles (`system_admin`, `bhw`,
//! `daycare_staff`, `sk_officer`, `parent_resident`, `visitor`). Each role
//! grants a fixed set of permissions, and a multi-role account holds the
//! union. Unknown role tags grant nothing. The sidebar navigation is derived
//! from the permission set, never stored.
//!
//! ## Sessions and the route guard
//!
//! Login issues a signed, time-limited bearer token. Accounts flagged for
//! OTP get a one-time code first and the token only after verification.
//! Authentication and account status are separate gates: a suspended user
//! still logs in, but the route guard re-reads the current status on every
//! protected request and keeps non-active accounts on a blocking screen.
//!
//! ## Approval workflow
//!
//! Self-registered accounts start as `pending` residents. An administrator
//! with the user-management permission approves them and assigns roles.

pub mod api;
pub mod authz;
pub mod cli;
pub mod error;
pub mod guard;
pub mod otp;
pub mod session;

pub use error::Error;

//! Role-based authorization: the static role→permission table, the
//! permission-set resolver, and the derived navigation tree.
//!
//! Everything here is pure and deterministic: the resolver consults the role
//! set and nothing else (no per-resource attributes, no clock). Permission
//! checks are plain set membership — no wildcards, no hierarchy.

mod navigation;
mod permission;
mod resolver;
mod role;

pub use navigation::{navigation_for, NavItem, NavSection};
pub use permission::Permission;
pub use resolver::{authorize, permissions_for};
pub use role::Role;

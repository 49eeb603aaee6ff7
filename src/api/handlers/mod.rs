//! API handlers for the portal backend.

pub mod auth;
pub mod health;
pub mod navigation;

//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own business logic and persistence so route handlers
//! stay focused on request translation and auth plumbing.

pub mod assistant;
pub mod auth;
pub mod session;
pub mod store;

//! Domain and session types for the admin portal.

pub mod session;

pub use session::{CurrentAdmin, CurrentSuperAdmin, session_keys};

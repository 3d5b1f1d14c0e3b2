//! HTTP middleware stack for the admin portal.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions, in-memory store)
//! 4. Auth extractors (per-handler, not a blanket layer)

pub mod auth;
pub mod session;

pub use auth::{
    OptionalAdminAuth, RequireAdminAuth, RequireSuperAdmin, clear_current_admin,
    clear_current_superadmin, set_current_admin, set_current_superadmin,
};
pub use session::create_session_layer;

//! Session-related types.
//!
//! Types stored in the session for authentication state. The standard and
//! super-admin portals use distinct keys so that logging in or out of one
//! surface never touches the other.

use serde::{Deserialize, Serialize};

use pappi_core::{Email, RestaurantId, UserId, UserRole};

/// Session-stored restaurant-owner identity.
///
/// Carried by every authenticated admin request; the restaurant is resolved
/// (or self-healed into existence) during login, so handlers can rely on it
/// being present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// User's backend ID.
    pub user_id: UserId,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: Email,
    /// Role as reported by the backend (always `admin` on this surface).
    pub role: UserRole,
    /// Bearer token issued at login.
    pub token: String,
    /// The owner's restaurant.
    pub restaurant_id: RestaurantId,
    /// Restaurant display name for the shell header.
    pub restaurant_name: String,
}

/// Session-stored super-admin identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentSuperAdmin {
    /// User's backend ID.
    pub user_id: UserId,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: Email,
    /// Bearer token issued at login.
    pub token: String,
}

/// Session keys for authentication data.
pub mod session_keys {
    /// Key for the standard restaurant-admin portal identity.
    pub const CURRENT_ADMIN: &str = "current_admin";

    /// Key for the super-admin portal identity.
    ///
    /// Deliberately separate from [`CURRENT_ADMIN`]: the two login surfaces
    /// must not leak privileges into each other.
    pub const CURRENT_SUPERADMIN: &str = "current_superadmin";
}

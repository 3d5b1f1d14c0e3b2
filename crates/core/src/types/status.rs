//! Status enums for server-owned entities.
//!
//! The backend is the source of truth for every status here; the portal only
//! reflects the values it is handed. Unknown strings are deserialization
//! errors, not a silent fallback.

use serde::{Deserialize, Serialize};

/// Lifecycle status of an order.
///
/// Orders move forward through these states on the backend; the portal
/// triggers the PENDING → CONFIRMED → READY transitions and may cancel,
/// while the delivery side drives `DriverAssigned` and onward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Ready,
    DriverAssigned,
    PickedUp,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// All statuses in lifecycle order. Used for stable board grouping.
    pub const ALL: [Self; 7] = [
        Self::Pending,
        Self::Confirmed,
        Self::Ready,
        Self::DriverAssigned,
        Self::PickedUp,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Whether this status is terminal (excluded from the active board).
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Wire representation as sent to the status-update endpoint.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Ready => "READY",
            Self::DriverAssigned => "DRIVER_ASSIGNED",
            Self::PickedUp => "PICKED_UP",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Human-readable label for board headers.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::Ready => "Ready for pickup",
            Self::DriverAssigned => "Driver assigned",
            Self::PickedUp => "Out for delivery",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "CONFIRMED" => Ok(Self::Confirmed),
            "READY" => Ok(Self::Ready),
            "DRIVER_ASSIGNED" => Ok(Self::DriverAssigned),
            "PICKED_UP" => Ok(Self::PickedUp),
            "DELIVERED" => Ok(Self::Delivered),
            "CANCELLED" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// User role on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Restaurant owner managing a single restaurant.
    Admin,
    /// Privileged role approving/rejecting pending registrations.
    Superadmin,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Superadmin => write!(f, "superadmin"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "superadmin" => Ok(Self::Superadmin),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}

/// Account-status codes carried on failed auth responses.
///
/// These branch the login flow; any other failure is treated as plain
/// invalid credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    /// Registered but verification codes not yet entered.
    NotVerified,
    /// Verified, waiting on super-admin approval.
    PendingApproval,
    /// Registration rejected by a super admin.
    Rejected,
}

impl AccountStatus {
    /// Parse a `code` field from an auth error body, if it is one of ours.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "NOT_VERIFIED" => Some(Self::NotVerified),
            "PENDING_APPROVAL" => Some(Self::PendingApproval),
            "REJECTED" => Some(Self::Rejected),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_serde_screaming() {
        let status: OrderStatus = serde_json::from_str("\"DRIVER_ASSIGNED\"").unwrap();
        assert_eq!(status, OrderStatus::DriverAssigned);
        assert_eq!(
            serde_json::to_string(&OrderStatus::PickedUp).unwrap(),
            "\"PICKED_UP\""
        );
    }

    #[test]
    fn test_order_status_unknown_rejected() {
        let result: Result<OrderStatus, _> = serde_json::from_str("\"REFUNDED\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Ready,
            OrderStatus::DriverAssigned,
            OrderStatus::PickedUp,
        ] {
            assert!(!status.is_terminal());
        }
    }

    #[test]
    fn test_order_status_roundtrip() {
        for status in OrderStatus::ALL {
            let parsed: OrderStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_user_role_serde() {
        let role: UserRole = serde_json::from_str("\"superadmin\"").unwrap();
        assert_eq!(role, UserRole::Superadmin);
        assert_eq!(serde_json::to_string(&UserRole::Admin).unwrap(), "\"admin\"");
    }

    #[test]
    fn test_account_status_from_code() {
        assert_eq!(
            AccountStatus::from_code("NOT_VERIFIED"),
            Some(AccountStatus::NotVerified)
        );
        assert_eq!(
            AccountStatus::from_code("PENDING_APPROVAL"),
            Some(AccountStatus::PendingApproval)
        );
        assert_eq!(
            AccountStatus::from_code("REJECTED"),
            Some(AccountStatus::Rejected)
        );
        assert_eq!(AccountStatus::from_code("SOMETHING_ELSE"), None);
    }
}

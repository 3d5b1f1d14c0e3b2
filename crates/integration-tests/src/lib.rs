//! Integration tests for the Pappi admin portal.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the backend (or point PAPPI_API_URL at a deployment)
//! # Start the portal
//! cargo run -p pappi-admin
//!
//! # Run integration tests
//! cargo test -p pappi-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `portal_auth` - Login surfaces and session namespacing
//! - `portal_orders` - Order board rendering and actions
//!
//! Tests are `#[ignore]`d by default because they need a running portal and
//! a reachable backend.

#![cfg_attr(not(test), forbid(unsafe_code))]

//! HTTP route handlers for the admin portal.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Redirect to the dashboard
//!
//! # Auth (standard portal)
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action
//! GET  /auth/register          - Registration page
//! POST /auth/register          - Registration action (renders the one-time codes)
//! GET  /auth/verify            - Verification-code page
//! POST /auth/verify            - Verification action
//! POST /auth/logout            - Logout action
//!
//! # Order board
//! GET  /orders                 - Active orders grouped by status (15s refresh)
//! POST /orders/{id}/confirm    - PENDING -> CONFIRMED with estimated minutes
//! POST /orders/{id}/ready      - CONFIRMED -> READY
//! POST /orders/{id}/cancel     - Cancel an active order
//!
//! # Menu editor
//! GET  /menu                       - Category grid
//! POST /menu/categories            - Create category (multipart)
//! POST /menu/categories/{id}       - Update category (multipart)
//! POST /menu/categories/{id}/delete - Delete category
//! GET  /menu/categories/{id}       - Products of a category
//! POST /menu/products              - Create product (multipart)
//! POST /menu/products/{id}         - Update product (multipart)
//! POST /menu/products/{id}/delete  - Delete product
//! GET  /menu/crop/{id}             - Crop step for an oversized upload
//! GET  /menu/crop/{id}/image       - Parked upload bytes for the crop preview
//! POST /menu/crop/{id}             - Apply the crop and resume the parked write
//! POST /menu/crop/{id}/cancel      - Abandon the parked write
//!
//! # Restaurant config
//! GET  /settings               - Profile form
//! POST /settings               - Save profile (multipart, optional new logo)
//!
//! # Analytics
//! GET  /dashboard              - Stat cards + charts for a selectable range
//!
//! # Super admin (separate session namespace)
//! GET  /superadmin/login       - Super-admin login page
//! POST /superadmin/login       - Super-admin login action (role-gated)
//! POST /superadmin/logout      - Super-admin logout
//! GET  /superadmin             - Pending registrations
//! POST /superadmin/approve/{id} - Approve a registration
//! POST /superadmin/reject/{id}  - Reject a registration
//! ```

pub mod auth;
pub mod dashboard;
pub mod menu;
pub mod orders;
pub mod settings;
pub mod superadmin;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/verify", get(auth::verify_page).post(auth::verify))
        .route("/logout", post(auth::logout))
}

/// Create the order board router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::board))
        .route("/{id}/confirm", post(orders::confirm))
        .route("/{id}/ready", post(orders::ready))
        .route("/{id}/cancel", post(orders::cancel))
}

/// Create the menu editor router.
pub fn menu_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(menu::categories_page))
        .route("/categories", post(menu::create_category))
        .route(
            "/categories/{id}",
            get(menu::products_page).post(menu::update_category),
        )
        .route("/categories/{id}/delete", post(menu::delete_category))
        .route("/products", post(menu::create_product))
        .route("/products/{id}", post(menu::update_product))
        .route("/products/{id}/delete", post(menu::delete_product))
        .route("/crop/{id}", get(menu::crop_page).post(menu::apply_crop))
        .route("/crop/{id}/image", get(menu::crop_image))
        .route("/crop/{id}/cancel", post(menu::cancel_crop))
}

/// Create the super-admin router.
pub fn superadmin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(superadmin::approvals_page))
        .route(
            "/login",
            get(superadmin::login_page).post(superadmin::login),
        )
        .route("/logout", post(superadmin::logout))
        .route("/approve/{id}", post(superadmin::approve))
        .route("/reject/{id}", post(superadmin::reject))
}

/// Create all routes for the admin portal.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/dashboard") }))
        .route("/dashboard", get(dashboard::dashboard))
        .route(
            "/settings",
            get(settings::settings_page).post(settings::save_settings),
        )
        .nest("/auth", auth_routes())
        .nest("/orders", order_routes())
        .nest("/menu", menu_routes())
        .nest("/superadmin", superadmin_routes())
}

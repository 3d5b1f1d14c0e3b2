//! Super-admin portal handlers.
//!
//! A separate login surface with its own session key: valid credentials for
//! any role other than `superadmin` are denied here, and logging out clears
//! only the super-admin namespace.

use askama::Template;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use pappi_core::{Email, UserId, UserRole};

use crate::filters;
use crate::middleware::{RequireSuperAdmin, clear_current_superadmin, set_current_superadmin};
use crate::models::CurrentSuperAdmin;
use crate::state::AppState;

// =============================================================================
// Form / Query Types
// =============================================================================

/// Super-admin login form data.
#[derive(Debug, Deserialize)]
pub struct SuperLoginForm {
    pub email: String,
    pub password: String,
}

/// Query parameters for error/notice display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub notice: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Super-admin login page template.
#[derive(Template)]
#[template(path = "superadmin/login.html")]
pub struct SuperLoginTemplate {
    pub error: Option<String>,
    pub notice: Option<String>,
}

/// Pending-approvals view row.
#[derive(Debug, Clone)]
pub struct PendingUserView {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
    pub restaurant_name: String,
}

/// Pending-approvals page template.
#[derive(Template)]
#[template(path = "superadmin/index.html")]
pub struct ApprovalsTemplate {
    pub admin_name: String,
    pub users: Vec<PendingUserView>,
    pub error: Option<String>,
    pub notice: Option<String>,
}

fn render<T: Template>(template: &T) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
}

// =============================================================================
// Login / Logout
// =============================================================================

/// Display the super-admin login page.
pub async fn login_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    render(&SuperLoginTemplate {
        error: query.error,
        notice: query.notice,
    })
}

/// Handle super-admin login.
///
/// Denies any account that is not a super admin, even with valid
/// credentials.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SuperLoginForm>,
) -> Response {
    if form.email.is_empty() || form.password.is_empty() {
        return Redirect::to("/superadmin/login?error=missing_fields").into_response();
    }

    let login = match state.backend().login(&form.email, &form.password).await {
        Ok(login) => login,
        Err(e) => {
            tracing::warn!("Super-admin login failed: {}", e);
            return Redirect::to("/superadmin/login?error=credentials").into_response();
        }
    };

    // Role gate: this surface is for super admins only.
    if login.user.role != UserRole::Superadmin {
        tracing::warn!(user_id = %login.user.id, "non-superadmin denied at super-admin login");
        return Redirect::to("/superadmin/login?error=denied").into_response();
    }

    let email = match Email::parse(&login.user.email) {
        Ok(email) => email,
        Err(e) => {
            tracing::error!("Backend returned unparseable email: {}", e);
            return Redirect::to("/superadmin/login?error=backend").into_response();
        }
    };

    let admin = CurrentSuperAdmin {
        user_id: login.user.id,
        name: login.user.name,
        email,
        token: login.token,
    };

    if let Err(e) = set_current_superadmin(&session, &admin).await {
        tracing::error!("Failed to set session: {}", e);
        return Redirect::to("/superadmin/login?error=session").into_response();
    }

    tracing::info!(user_id = %admin.user_id, "super admin logged in");
    Redirect::to("/superadmin").into_response()
}

/// Handle super-admin logout.
///
/// Clears only the super-admin session key; a standard-portal session in
/// the same browser is untouched.
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_superadmin(&session).await {
        tracing::error!("Failed to clear session: {}", e);
    }

    Redirect::to("/superadmin/login").into_response()
}

// =============================================================================
// Approvals
// =============================================================================

/// Pending-approvals page handler.
#[instrument(skip(admin, state))]
pub async fn approvals_page(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
) -> Html<String> {
    let users = match state.backend().pending_users().await {
        Ok(users) => users,
        Err(e) => {
            tracing::error!("Failed to fetch pending users: {e}");
            Vec::new()
        }
    };

    let users = users
        .into_iter()
        .map(|user| PendingUserView {
            id: user.id.as_i32(),
            name: user.name,
            email: user.email,
            phone: user.phone.unwrap_or_default(),
            role: user.role.to_string(),
            restaurant_name: user.restaurant_name.unwrap_or_default(),
        })
        .collect();

    render(&ApprovalsTemplate {
        admin_name: admin.name,
        users,
        error: query.error,
        notice: query.notice,
    })
}

/// Approve a pending registration, then refresh the list.
#[instrument(skip(_admin, state))]
pub async fn approve(
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Response {
    match state.backend().approve_user(UserId::new(id)).await {
        Ok(()) => {
            tracing::info!(user_id = id, "registration approved");
            Redirect::to("/superadmin?notice=approved").into_response()
        }
        Err(e) => {
            tracing::error!(user_id = id, "Failed to approve user: {e}");
            Redirect::to("/superadmin?error=approve_failed").into_response()
        }
    }
}

/// Reject a pending registration, then refresh the list.
#[instrument(skip(_admin, state))]
pub async fn reject(
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Response {
    match state.backend().reject_user(UserId::new(id)).await {
        Ok(()) => {
            tracing::info!(user_id = id, "registration rejected");
            Redirect::to("/superadmin?notice=rejected").into_response()
        }
        Err(e) => {
            tracing::error!(user_id = id, "Failed to reject user: {e}");
            Redirect::to("/superadmin?error=reject_failed").into_response()
        }
    }
}

//! Authentication route handlers for the standard portal.
//!
//! Handles login, registration, code verification, and logout against the
//! backend auth endpoints. Failed logins branch on the server-supplied
//! account-status code; everything else is a generic credentials error.

use askama::Template;
use axum::{
    Form,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use pappi_core::{AccountStatus, Email, UserId, UserRole};

use crate::backend::{BackendError, RegisterInput, Restaurant};
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{clear_current_admin, set_current_admin};
use crate::models::CurrentAdmin;
use crate::state::AppState;

/// Category assigned to restaurants created by the self-healing path.
const DEFAULT_RESTAURANT_CATEGORY: &str = "General";

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub restaurant_name: String,
}

/// Verification form data.
#[derive(Debug, Deserialize)]
pub struct VerifyForm {
    pub user_id: i32,
    pub email: String,
    pub email_code: String,
    pub sms_code: String,
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for error/notice display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub notice: Option<String>,
}

/// Query parameters carried into the verification step.
#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    pub user_id: Option<i32>,
    pub email: Option<String>,
    pub error: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub notice: Option<String>,
}

/// Registration page template.
#[derive(Template)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub error: Option<String>,
}

/// One-time verification codes page.
///
/// This deployment returns the codes in the registration response instead of
/// dispatching them; they must be shown before the verification step.
#[derive(Template)]
#[template(path = "auth/register_codes.html")]
pub struct RegisterCodesTemplate {
    pub user_id: i32,
    pub email: String,
    pub email_code: String,
    pub sms_code: String,
}

/// Verification page template.
#[derive(Template)]
#[template(path = "auth/verify.html")]
pub struct VerifyTemplate {
    pub user_id: i32,
    pub email: String,
    pub error: Option<String>,
}

fn render<T: Template>(template: &T) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    render(&LoginTemplate {
        error: query.error,
        notice: query.notice,
    })
}

/// Handle login form submission.
///
/// On success, resolves the owner's restaurant (creating one if missing),
/// stores the identity in the standard-portal session key, and spawns the
/// realtime connection.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    if form.email.is_empty() || form.password.is_empty() {
        return Redirect::to("/auth/login?error=missing_fields").into_response();
    }

    let login = match state.backend().login(&form.email, &form.password).await {
        Ok(login) => login,
        Err(e) => return login_failure_response(&e),
    };

    // The standard portal is for restaurant owners; send super admins to
    // their own surface instead of mixing the namespaces.
    if login.user.role == UserRole::Superadmin {
        return Redirect::to("/superadmin/login?error=use_superadmin").into_response();
    }

    let email = match Email::parse(&login.user.email) {
        Ok(email) => email,
        Err(e) => {
            tracing::error!("Backend returned unparseable email: {}", e);
            return Redirect::to("/auth/login?error=backend").into_response();
        }
    };

    // Resolve the owner's restaurant, self-healing if none is linked yet.
    let restaurant = match resolve_restaurant(&state, login.user.id, &login.user.name).await {
        Ok(restaurant) => restaurant,
        Err(e) => {
            tracing::error!("Failed to resolve restaurant: {}", e);
            return Redirect::to("/auth/login?error=backend").into_response();
        }
    };

    let admin = CurrentAdmin {
        user_id: login.user.id,
        name: login.user.name.clone(),
        email,
        role: login.user.role,
        token: login.token,
        restaurant_id: restaurant.id,
        restaurant_name: restaurant.name.clone(),
    };

    if let Err(e) = set_current_admin(&session, &admin).await {
        tracing::error!("Failed to set session: {}", e);
        return Redirect::to("/auth/login?error=session").into_response();
    }

    set_sentry_user(&admin.user_id, Some(admin.email.as_str()));

    // Both user and restaurant identity are known now: bring up realtime.
    state.realtime().connect(restaurant.id);

    tracing::info!(user_id = %admin.user_id, restaurant_id = %restaurant.id, "admin logged in");
    Redirect::to("/dashboard").into_response()
}

/// Map a failed login to the matching redirect branch.
fn login_failure_response(error: &BackendError) -> Response {
    match error.account_status() {
        Some(AccountStatus::NotVerified) => {
            // Carry the returned user id into the verification step.
            let user_id = match error {
                BackendError::Api { user_id, .. } => *user_id,
                _ => None,
            };
            let target = match user_id {
                Some(id) => format!("/auth/verify?user_id={id}"),
                None => "/auth/verify".to_string(),
            };
            Redirect::to(&target).into_response()
        }
        Some(AccountStatus::PendingApproval) => {
            Redirect::to("/auth/login?notice=pending_approval").into_response()
        }
        Some(AccountStatus::Rejected) => {
            Redirect::to("/auth/login?notice=rejected").into_response()
        }
        None => {
            tracing::warn!("Login failed: {}", error);
            Redirect::to("/auth/login?error=credentials").into_response()
        }
    }
}

/// Find the restaurant owned by a user, creating one if none exists.
///
/// The self-healing path creates exactly one restaurant so dependent screens
/// never render without one.
async fn resolve_restaurant(
    state: &AppState,
    owner_id: UserId,
    owner_name: &str,
) -> Result<Restaurant, BackendError> {
    let restaurants = state.backend().restaurants().await?;
    if let Some(restaurant) = restaurants.into_iter().find(|r| r.owner_id == owner_id) {
        return Ok(restaurant);
    }

    tracing::info!(%owner_id, "no restaurant linked to owner, creating one");
    state
        .backend()
        .create_restaurant(owner_id, owner_name, DEFAULT_RESTAURANT_CATEGORY)
        .await
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    render(&RegisterTemplate { error: query.error })
}

/// Handle registration form submission.
///
/// Renders the one-time verification codes returned by the backend; the
/// operator carries them into the verification step.
#[instrument(skip(state, form))]
pub async fn register(State(state): State<AppState>, Form(form): Form<RegisterForm>) -> Response {
    if form.name.is_empty() || form.email.is_empty() || form.password.is_empty() {
        return Redirect::to("/auth/register?error=missing_fields").into_response();
    }

    let input = RegisterInput::admin(
        form.name,
        form.email.clone(),
        form.password,
        form.phone,
        form.restaurant_name,
    );

    match state.backend().register(&input).await {
        Ok(response) => render(&RegisterCodesTemplate {
            user_id: response.user_id.as_i32(),
            email: form.email,
            email_code: response.email_code,
            sms_code: response.sms_code,
        })
        .into_response(),
        Err(e) => {
            tracing::warn!("Registration failed: {}", e);
            let error_msg = e.to_string();
            if error_msg.contains("taken") || error_msg.contains("exists") {
                Redirect::to("/auth/register?error=email_taken").into_response()
            } else {
                Redirect::to("/auth/register?error=failed").into_response()
            }
        }
    }
}

// =============================================================================
// Verification Routes
// =============================================================================

/// Display the verification-code page.
pub async fn verify_page(Query(query): Query<VerifyQuery>) -> Response {
    match query.user_id {
        Some(user_id) => render(&VerifyTemplate {
            user_id,
            email: query.email.unwrap_or_default(),
            error: query.error,
        })
        .into_response(),
        None => Redirect::to("/auth/login?error=verification_link").into_response(),
    }
}

/// Handle verification form submission.
#[instrument(skip(state, form))]
pub async fn verify(State(state): State<AppState>, Form(form): Form<VerifyForm>) -> Response {
    if form.email_code.is_empty() || form.sms_code.is_empty() {
        let target = format!(
            "/auth/verify?user_id={}&email={}&error=missing_codes",
            form.user_id,
            urlencoding::encode(&form.email)
        );
        return Redirect::to(&target).into_response();
    }

    match state
        .backend()
        .verify(
            UserId::new(form.user_id),
            &form.email_code,
            &form.sms_code,
            &form.email,
        )
        .await
    {
        Ok(response) => {
            tracing::info!(user_id = form.user_id, "account verified: {}", response.message);
            Redirect::to("/auth/login?notice=verified").into_response()
        }
        Err(e) => {
            tracing::warn!("Verification failed: {}", e);
            let target = format!(
                "/auth/verify?user_id={}&email={}&error=invalid_codes",
                form.user_id,
                urlencoding::encode(&form.email)
            );
            Redirect::to(&target).into_response()
        }
    }
}

// =============================================================================
// Logout Route
// =============================================================================

/// Handle logout.
///
/// Tears down the restaurant's realtime connection and clears only the
/// standard-portal session key; a super-admin session in the same browser
/// is untouched.
pub async fn logout(State(state): State<AppState>, session: Session) -> Response {
    if let Ok(Some(admin)) = session
        .get::<CurrentAdmin>(crate::models::session_keys::CURRENT_ADMIN)
        .await
    {
        state.realtime().disconnect(admin.restaurant_id);
    }

    if let Err(e) = clear_current_admin(&session).await {
        tracing::error!("Failed to clear session: {}", e);
    }

    clear_sentry_user();

    Redirect::to("/auth/login").into_response()
}

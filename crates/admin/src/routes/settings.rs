//! Restaurant config editor handlers.
//!
//! Loads the session restaurant's profile into a form and saves it back as
//! a multipart PUT, optionally with a new logo (same image pipeline as the
//! menu, widescreen aspect). The only validation is a non-empty name; the
//! geolocation helper in the template fills the coordinate fields from the
//! browser's location API.

use askama::Template;
use axum::{
    extract::{Multipart, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::backend::RestaurantUpdate;
use crate::filters;
use crate::middleware::{RequireAdminAuth, set_current_admin};
use crate::services::images::AspectRatio;
use crate::services::uploads::PendingAction;
use crate::state::AppState;

use super::menu::{StagedImage, collect_form, stage_upload};
use super::orders::AdminUserView;

// =============================================================================
// View Types
// =============================================================================

/// Profile form values.
#[derive(Debug, Clone, Default)]
pub struct RestaurantFormView {
    pub name: String,
    pub description: String,
    pub category: String,
    /// Coordinates as text so empty fields round-trip cleanly.
    pub latitude: String,
    pub longitude: String,
    /// Resolved logo URL; empty when no logo is set.
    pub logo_url: String,
}

/// Query parameters for flash display.
#[derive(Debug, Deserialize)]
pub struct SettingsQuery {
    pub error: Option<String>,
    pub notice: Option<String>,
}

/// Settings page template.
#[derive(Template)]
#[template(path = "settings.html")]
pub struct SettingsTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub restaurant: RestaurantFormView,
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
// Handlers
// =============================================================================

/// Settings page handler.
#[instrument(skip(admin, state))]
pub async fn settings_page(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<SettingsQuery>,
) -> Response {
    let restaurants = match state.backend().restaurants().await {
        Ok(restaurants) => restaurants,
        Err(e) => {
            tracing::error!("Failed to fetch restaurants: {e}");
            Vec::new()
        }
    };

    let restaurant = restaurants
        .into_iter()
        .find(|r| r.id == admin.restaurant_id)
        .map(|r| RestaurantFormView {
            name: r.name,
            description: r.description.unwrap_or_default(),
            category: r.category.unwrap_or_default(),
            latitude: r.latitude.map(|v| v.to_string()).unwrap_or_default(),
            longitude: r.longitude.map(|v| v.to_string()).unwrap_or_default(),
            logo_url: r
                .image_url
                .as_deref()
                .map(|path| state.image_url(path))
                .unwrap_or_default(),
        })
        .unwrap_or_else(|| RestaurantFormView {
            name: admin.restaurant_name.clone(),
            ..RestaurantFormView::default()
        });

    let template = SettingsTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/settings".to_string(),
        restaurant,
        error: query.error,
        notice: query.notice,
    };

    render(&template).into_response()
}

/// Save the profile from a multipart submission.
#[instrument(skip(admin, state, session, multipart))]
pub async fn save_settings(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    multipart: Multipart,
) -> Response {
    let form = match collect_form(multipart).await {
        Ok(form) => form,
        Err(e) => {
            tracing::warn!("Bad multipart submission: {e}");
            return Redirect::to("/settings?error=bad_form").into_response();
        }
    };

    let name = form.field("name");
    if name.is_empty() {
        return Redirect::to("/settings?error=name_required").into_response();
    }

    let mut update = RestaurantUpdate {
        name,
        description: form.field("description"),
        category: form.field("category"),
        latitude: form.field("latitude").trim().parse::<f64>().ok(),
        longitude: form.field("longitude").trim().parse::<f64>().ok(),
        image: None,
    };

    match stage_upload(&state, form.image, AspectRatio::Widescreen, || {
        PendingAction::UpdateRestaurant(admin.restaurant_id, update.clone())
    }) {
        StagedImage::Crop(id) => {
            return Redirect::to(&format!("/menu/crop/{id}")).into_response();
        }
        StagedImage::Invalid => {
            return Redirect::to("/settings?error=invalid_image").into_response();
        }
        StagedImage::Attach(image) => update.image = image,
    }

    let updated = match state
        .backend()
        .update_restaurant(admin.restaurant_id, &update)
        .await
    {
        Ok(updated) => updated,
        Err(e) => {
            tracing::error!("Failed to save settings: {e}");
            return Redirect::to("/settings?error=save_failed").into_response();
        }
    };

    // Keep the shell header in sync with a renamed restaurant.
    if updated.name != admin.restaurant_name {
        let mut refreshed = admin.clone();
        refreshed.restaurant_name = updated.name;
        if let Err(e) = set_current_admin(&session, &refreshed).await {
            tracing::warn!("Failed to refresh session restaurant name: {e}");
        }
    }

    Redirect::to("/settings?notice=saved").into_response()
}

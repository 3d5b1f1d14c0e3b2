//! Menu editor handlers: categories, products, and the crop step.
//!
//! Create/update submissions arrive as multipart forms because they may
//! carry an image. Uploads within the limits are forwarded to the backend
//! directly; oversized uploads are parked and the operator is routed
//! through the crop page before the write resumes.

use std::collections::HashMap;
use std::str::FromStr;

use askama::Template;
use axum::{
    Form,
    extract::{Multipart, Path, Query, State},
    http::header,
    response::{Html, IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use pappi_core::{CategoryId, ProductId};

use crate::backend::{Category, CategoryInput, ImagePayload, Product, ProductInput};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::services::images::{self, AspectRatio, CropRect};
use crate::services::uploads::{PendingAction, PendingUpload};
use crate::state::AppState;

use super::orders::AdminUserView;

// =============================================================================
// Multipart Helpers
// =============================================================================

/// An uploaded file pulled out of a multipart form.
#[derive(Debug, Clone)]
pub(crate) struct UploadedFile {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub file_name: String,
}

/// Text fields plus the optional image of a multipart submission.
#[derive(Debug, Default)]
pub(crate) struct CollectedForm {
    pub fields: HashMap<String, String>,
    pub image: Option<UploadedFile>,
}

impl CollectedForm {
    pub(crate) fn field(&self, name: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_default()
    }
}

/// Drain a multipart stream into text fields and an optional `image` part.
///
/// An empty file input (no selection) counts as no image.
pub(crate) async fn collect_form(mut multipart: Multipart) -> Result<CollectedForm, String> {
    let mut form = CollectedForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| e.to_string())?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "image" {
            let file_name = field
                .file_name()
                .filter(|f| !f.is_empty())
                .unwrap_or("upload")
                .to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field.bytes().await.map_err(|e| e.to_string())?.to_vec();
            if !bytes.is_empty() {
                form.image = Some(UploadedFile {
                    bytes,
                    content_type,
                    file_name,
                });
            }
        } else {
            let value = field.text().await.map_err(|e| e.to_string())?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

/// Outcome of staging an upload against the image limits.
pub(crate) enum StagedImage {
    /// No image, or an image within limits - attach and submit.
    Attach(Option<ImagePayload>),
    /// Oversized - parked; redirect to the crop page with this id.
    Crop(Uuid),
    /// Not a decodable image.
    Invalid,
}

/// Check an upload against the limits, parking it for the crop step when it
/// exceeds them.
pub(crate) fn stage_upload(
    state: &AppState,
    upload: Option<UploadedFile>,
    aspect: AspectRatio,
    action: impl FnOnce() -> PendingAction,
) -> StagedImage {
    let Some(upload) = upload else {
        return StagedImage::Attach(None);
    };

    let inspected = match images::inspect(&upload.bytes) {
        Ok(inspected) => inspected,
        Err(e) => {
            tracing::warn!("rejected upload: {e}");
            return StagedImage::Invalid;
        }
    };

    if inspected.needs_crop() {
        let id = state.pending_uploads().insert(
            upload.bytes,
            upload.content_type,
            inspected.width,
            inspected.height,
            aspect,
            action(),
        );
        return StagedImage::Crop(id);
    }

    StagedImage::Attach(Some(ImagePayload {
        bytes: upload.bytes,
        file_name: upload.file_name,
        content_type: upload.content_type,
    }))
}

fn render<T: Template>(template: &T) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
}

// =============================================================================
// View Types
// =============================================================================

/// A category card.
#[derive(Debug, Clone)]
pub struct CategoryView {
    pub id: i32,
    pub name: String,
    /// Resolved image URL; empty when the category has no image.
    pub image_url: String,
}

/// A product card.
#[derive(Debug, Clone)]
pub struct ProductView {
    pub id: i32,
    pub name: String,
    pub price: String,
    /// Price without the currency symbol, for the edit form.
    pub price_raw: String,
    pub description: String,
    /// Resolved image URL; empty when the product has no image.
    pub image_url: String,
}

fn category_view(state: &AppState, category: &Category) -> CategoryView {
    CategoryView {
        id: category.id.as_i32(),
        name: category.name.clone(),
        image_url: category
            .image_path
            .as_deref()
            .map(|path| state.image_url(path))
            .unwrap_or_default(),
    }
}

fn product_view(state: &AppState, product: &Product) -> ProductView {
    ProductView {
        id: product.id.as_i32(),
        name: product.name.clone(),
        price: format!("${}", product.price),
        price_raw: product.price.to_string(),
        description: product.description.clone().unwrap_or_default(),
        image_url: product
            .image_path
            .as_deref()
            .map(|path| state.image_url(path))
            .unwrap_or_default(),
    }
}

/// Query parameters for flash display.
#[derive(Debug, Deserialize)]
pub struct MenuQuery {
    pub error: Option<String>,
    pub notice: Option<String>,
}

// =============================================================================
// Category Pages
// =============================================================================

/// Category grid template.
#[derive(Template)]
#[template(path = "menu/index.html")]
pub struct MenuTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub categories: Vec<CategoryView>,
    pub error: Option<String>,
    pub notice: Option<String>,
}

/// Category grid page.
#[instrument(skip(admin, state))]
pub async fn categories_page(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<MenuQuery>,
) -> Html<String> {
    let categories = match state.backend().categories(admin.restaurant_id).await {
        Ok(categories) => categories,
        Err(e) => {
            tracing::error!("Failed to fetch categories: {e}");
            Vec::new()
        }
    };

    let template = MenuTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/menu".to_string(),
        categories: categories
            .iter()
            .map(|c| category_view(&state, c))
            .collect(),
        error: query.error,
        notice: query.notice,
    };

    render(&template)
}

/// Create a category from a multipart submission.
#[instrument(skip(admin, state, multipart))]
pub async fn create_category(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Response {
    let form = match collect_form(multipart).await {
        Ok(form) => form,
        Err(e) => {
            tracing::warn!("Bad multipart submission: {e}");
            return Redirect::to("/menu?error=bad_form").into_response();
        }
    };

    let name = form.field("name");
    if name.is_empty() {
        return Redirect::to("/menu?error=name_required").into_response();
    }

    let mut input = CategoryInput {
        restaurant_id: admin.restaurant_id,
        name,
        image: None,
    };

    match stage_upload(&state, form.image, AspectRatio::Widescreen, || {
        PendingAction::CreateCategory(input.clone())
    }) {
        StagedImage::Crop(id) => {
            return Redirect::to(&format!("/menu/crop/{id}")).into_response();
        }
        StagedImage::Invalid => {
            return Redirect::to("/menu?error=invalid_image").into_response();
        }
        StagedImage::Attach(image) => input.image = image,
    }

    match state.backend().create_category(&input).await {
        Ok(()) => Redirect::to("/menu?notice=category_created").into_response(),
        Err(e) => {
            tracing::error!("Failed to create category: {e}");
            Redirect::to("/menu?error=save_failed").into_response()
        }
    }
}

/// Update a category from a multipart submission.
#[instrument(skip(admin, state, multipart))]
pub async fn update_category(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Response {
    let category_id = CategoryId::new(id);

    let form = match collect_form(multipart).await {
        Ok(form) => form,
        Err(e) => {
            tracing::warn!("Bad multipart submission: {e}");
            return Redirect::to("/menu?error=bad_form").into_response();
        }
    };

    let name = form.field("name");
    if name.is_empty() {
        return Redirect::to("/menu?error=name_required").into_response();
    }

    let mut input = CategoryInput {
        restaurant_id: admin.restaurant_id,
        name,
        image: None,
    };

    match stage_upload(&state, form.image, AspectRatio::Widescreen, || {
        PendingAction::UpdateCategory(category_id, input.clone())
    }) {
        StagedImage::Crop(crop_id) => {
            return Redirect::to(&format!("/menu/crop/{crop_id}")).into_response();
        }
        StagedImage::Invalid => {
            return Redirect::to("/menu?error=invalid_image").into_response();
        }
        StagedImage::Attach(image) => input.image = image,
    }

    match state.backend().update_category(category_id, &input).await {
        Ok(()) => Redirect::to("/menu?notice=category_updated").into_response(),
        Err(e) => {
            tracing::error!(%category_id, "Failed to update category: {e}");
            Redirect::to("/menu?error=save_failed").into_response()
        }
    }
}

/// Delete a category.
///
/// The grid asks for confirmation before this posts.
#[instrument(skip(_admin, state))]
pub async fn delete_category(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Response {
    let category_id = CategoryId::new(id);

    match state.backend().delete_category(category_id).await {
        Ok(()) => Redirect::to("/menu?notice=category_deleted").into_response(),
        Err(e) => {
            tracing::error!(%category_id, "Failed to delete category: {e}");
            Redirect::to("/menu?error=delete_failed").into_response()
        }
    }
}

// =============================================================================
// Product Pages
// =============================================================================

/// Products-of-a-category template.
#[derive(Template)]
#[template(path = "menu/category.html")]
pub struct CategoryProductsTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub category_id: i32,
    pub category_name: String,
    pub products: Vec<ProductView>,
    pub error: Option<String>,
    pub notice: Option<String>,
}

/// Products page for one category.
#[instrument(skip(admin, state))]
pub async fn products_page(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<MenuQuery>,
) -> Response {
    let category_id = CategoryId::new(id);

    let (categories_result, products_result) = tokio::join!(
        state.backend().categories(admin.restaurant_id),
        state.backend().products_by_category(category_id),
    );

    let Some(category) = categories_result
        .ok()
        .and_then(|cs| cs.into_iter().find(|c| c.id == category_id))
    else {
        return Redirect::to("/menu?error=category_missing").into_response();
    };

    let products = match products_result {
        Ok(products) => products,
        Err(e) => {
            tracing::error!(%category_id, "Failed to fetch products: {e}");
            Vec::new()
        }
    };

    let template = CategoryProductsTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/menu".to_string(),
        category_id: category.id.as_i32(),
        category_name: category.name,
        products: products.iter().map(|p| product_view(&state, p)).collect(),
        error: query.error,
        notice: query.notice,
    };

    render(&template).into_response()
}

/// Parse and validate the shared product fields of a multipart form.
fn product_input_from_form(
    admin_restaurant: pappi_core::RestaurantId,
    form: &CollectedForm,
) -> Result<ProductInput, &'static str> {
    let name = form.field("name");
    if name.is_empty() {
        return Err("name_required");
    }

    let price = Decimal::from_str(form.field("price").trim()).map_err(|_| "price_invalid")?;
    if price < Decimal::ZERO {
        return Err("price_invalid");
    }

    let category_id = form
        .field("category_id")
        .parse::<i32>()
        .map_err(|_| "bad_form")?;

    Ok(ProductInput {
        restaurant_id: admin_restaurant,
        category_id: CategoryId::new(category_id),
        name,
        description: form.field("description"),
        price,
        image: None,
    })
}

/// Create a product from a multipart submission.
#[instrument(skip(admin, state, multipart))]
pub async fn create_product(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Response {
    let form = match collect_form(multipart).await {
        Ok(form) => form,
        Err(e) => {
            tracing::warn!("Bad multipart submission: {e}");
            return Redirect::to("/menu?error=bad_form").into_response();
        }
    };

    let mut input = match product_input_from_form(admin.restaurant_id, &form) {
        Ok(input) => input,
        Err(code) => return Redirect::to(&format!("/menu?error={code}")).into_response(),
    };
    let back = format!("/menu/categories/{}", input.category_id);

    match stage_upload(&state, form.image, AspectRatio::Square, || {
        PendingAction::CreateProduct(input.clone())
    }) {
        StagedImage::Crop(id) => {
            return Redirect::to(&format!("/menu/crop/{id}")).into_response();
        }
        StagedImage::Invalid => {
            return Redirect::to(&format!("{back}?error=invalid_image")).into_response();
        }
        StagedImage::Attach(image) => input.image = image,
    }

    match state.backend().create_product(&input).await {
        Ok(()) => Redirect::to(&format!("{back}?notice=product_created")).into_response(),
        Err(e) => {
            tracing::error!("Failed to create product: {e}");
            Redirect::to(&format!("{back}?error=save_failed")).into_response()
        }
    }
}

/// Update a product from a multipart submission.
#[instrument(skip(admin, state, multipart))]
pub async fn update_product(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Response {
    let product_id = ProductId::new(id);

    let form = match collect_form(multipart).await {
        Ok(form) => form,
        Err(e) => {
            tracing::warn!("Bad multipart submission: {e}");
            return Redirect::to("/menu?error=bad_form").into_response();
        }
    };

    let mut input = match product_input_from_form(admin.restaurant_id, &form) {
        Ok(input) => input,
        Err(code) => return Redirect::to(&format!("/menu?error={code}")).into_response(),
    };
    let back = format!("/menu/categories/{}", input.category_id);

    match stage_upload(&state, form.image, AspectRatio::Square, || {
        PendingAction::UpdateProduct(product_id, input.clone())
    }) {
        StagedImage::Crop(crop_id) => {
            return Redirect::to(&format!("/menu/crop/{crop_id}")).into_response();
        }
        StagedImage::Invalid => {
            return Redirect::to(&format!("{back}?error=invalid_image")).into_response();
        }
        StagedImage::Attach(image) => input.image = image,
    }

    match state.backend().update_product(product_id, &input).await {
        Ok(()) => Redirect::to(&format!("{back}?notice=product_updated")).into_response(),
        Err(e) => {
            tracing::error!(%product_id, "Failed to update product: {e}");
            Redirect::to(&format!("{back}?error=save_failed")).into_response()
        }
    }
}

/// Delete a product.
#[instrument(skip(_admin, state))]
pub async fn delete_product(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Response {
    let product_id = ProductId::new(id);

    match state.backend().delete_product(product_id).await {
        Ok(()) => Redirect::to("/menu?notice=product_deleted").into_response(),
        Err(e) => {
            tracing::error!(%product_id, "Failed to delete product: {e}");
            Redirect::to("/menu?error=delete_failed").into_response()
        }
    }
}

// =============================================================================
// Crop Step
// =============================================================================

/// Crop page template.
#[derive(Template)]
#[template(path = "menu/crop.html")]
pub struct CropTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub upload_id: String,
    pub image_width: u32,
    pub image_height: u32,
    pub size_display: String,
    pub aspect_label: String,
    pub crop: CropRect,
}

/// Format an upload size for the warning banner.
fn format_size(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

const fn aspect_label(aspect: AspectRatio) -> &'static str {
    match aspect {
        AspectRatio::Square => "square (1:1)",
        AspectRatio::Widescreen => "widescreen (16:9)",
    }
}

/// Crop page for a parked upload.
#[instrument(skip(admin, state))]
pub async fn crop_page(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Response {
    let Some(upload) = state.pending_uploads().get(id) else {
        return Redirect::to("/menu?error=crop_expired").into_response();
    };

    let crop = images::default_crop(upload.width, upload.height, upload.aspect);

    let template = CropTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/menu".to_string(),
        upload_id: id.to_string(),
        image_width: upload.width,
        image_height: upload.height,
        size_display: format_size(upload.bytes.len()),
        aspect_label: aspect_label(upload.aspect).to_string(),
        crop,
    };

    render(&template).into_response()
}

/// Serve the parked upload bytes for the crop preview.
#[instrument(skip(_admin, state))]
pub async fn crop_image(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let upload = state
        .pending_uploads()
        .get(id)
        .ok_or_else(|| AppError::NotFound(format!("upload {id}")))?;

    Ok(([(header::CONTENT_TYPE, upload.content_type)], upload.bytes).into_response())
}

/// Operator-adjusted crop rectangle.
#[derive(Debug, Deserialize)]
pub struct CropForm {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Apply the crop and resume the parked write.
#[instrument(skip(_admin, state, form))]
pub async fn apply_crop(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(form): Form<CropForm>,
) -> Response {
    let Some(upload) = state.pending_uploads().take(id) else {
        return Redirect::to("/menu?error=crop_expired").into_response();
    };

    let rect = CropRect {
        x: form.x,
        y: form.y,
        width: form.width,
        height: form.height,
    };

    let back = upload.action.return_path();

    let cropped = match images::crop_to_jpeg(&upload.bytes, rect, upload.aspect) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!("Crop failed: {e}");
            return Redirect::to(&format!("{back}?error=crop_failed")).into_response();
        }
    };

    let payload = ImagePayload {
        bytes: cropped,
        file_name: "cropped.jpg".to_string(),
        content_type: "image/jpeg".to_string(),
    };

    match resume_action(&state, upload, payload).await {
        Ok(()) => Redirect::to(&format!("{back}?notice=saved")).into_response(),
        Err(e) => {
            tracing::error!("Failed to resume write after crop: {e}");
            Redirect::to(&format!("{back}?error=save_failed")).into_response()
        }
    }
}

/// Abandon a parked write.
#[instrument(skip(_admin, state))]
pub async fn cancel_crop(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Response {
    let back = state
        .pending_uploads()
        .take(id)
        .map_or_else(|| "/menu".to_string(), |upload| upload.action.return_path());

    Redirect::to(&back).into_response()
}

/// Resume a parked write with the cropped image attached.
async fn resume_action(
    state: &AppState,
    upload: PendingUpload,
    image: ImagePayload,
) -> Result<(), crate::backend::BackendError> {
    match upload.action {
        PendingAction::CreateCategory(mut input) => {
            input.image = Some(image);
            state.backend().create_category(&input).await
        }
        PendingAction::UpdateCategory(id, mut input) => {
            input.image = Some(image);
            state.backend().update_category(id, &input).await
        }
        PendingAction::CreateProduct(mut input) => {
            input.image = Some(image);
            state.backend().create_product(&input).await
        }
        PendingAction::UpdateProduct(id, mut input) => {
            input.image = Some(image);
            state.backend().update_product(id, &input).await
        }
        PendingAction::UpdateRestaurant(id, mut update) => {
            update.image = Some(image);
            state.backend().update_restaurant(id, &update).await.map(|_| ())
        }
    }
}

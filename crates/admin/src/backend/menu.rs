//! Menu endpoints: restaurants, categories, and products.
//!
//! Writes go as multipart forms because they may carry an image; the backend
//! stores the upload and returns the reference on the entity.

use reqwest::multipart;

use pappi_core::{CategoryId, ProductId, RestaurantId, UserId};

use super::types::{
    Category, CategoryInput, ImagePayload, Product, ProductInput, Restaurant, RestaurantUpdate,
};
use super::{BackendClient, BackendError};

impl BackendClient {
    /// List all restaurants.
    ///
    /// The portal picks out the one owned by the logged-in user; the
    /// endpoint has no owner filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn restaurants(&self) -> Result<Vec<Restaurant>, BackendError> {
        let response = self.get("/menu/restaurants").send().await?;
        Self::decode(response).await
    }

    /// Create a restaurant for an owner.
    ///
    /// Used by the self-healing path when a logged-in owner has no linked
    /// restaurant yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn create_restaurant(
        &self,
        owner_id: UserId,
        name: &str,
        category: &str,
    ) -> Result<Restaurant, BackendError> {
        let response = self
            .post("/menu/restaurants")
            .json(&serde_json::json!({
                "owner_id": owner_id,
                "name": name,
                "category": category,
            }))
            .send()
            .await?;

        Self::decode(response).await
    }

    /// Update a restaurant profile, optionally replacing the logo.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn update_restaurant(
        &self,
        id: RestaurantId,
        update: &RestaurantUpdate,
    ) -> Result<Restaurant, BackendError> {
        let mut form = multipart::Form::new()
            .text("name", update.name.clone())
            .text("description", update.description.clone())
            .text("category", update.category.clone());

        if let Some(lat) = update.latitude {
            form = form.text("latitude", lat.to_string());
        }
        if let Some(lng) = update.longitude {
            form = form.text("longitude", lng.to_string());
        }
        if let Some(image) = &update.image {
            form = form.part("image", image_part(image)?);
        }

        let response = self
            .put(&format!("/menu/restaurants/{id}"))
            .multipart(form)
            .send()
            .await?;

        Self::decode(response).await
    }

    /// List the categories of a restaurant.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn categories(
        &self,
        restaurant_id: RestaurantId,
    ) -> Result<Vec<Category>, BackendError> {
        let response = self
            .get(&format!("/menu/categories/{restaurant_id}"))
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn create_category(&self, input: &CategoryInput) -> Result<(), BackendError> {
        let response = self
            .post("/menu/categories")
            .multipart(category_form(input)?)
            .send()
            .await?;
        Self::expect_success(response).await
    }

    /// Update a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn update_category(
        &self,
        id: CategoryId,
        input: &CategoryInput,
    ) -> Result<(), BackendError> {
        let response = self
            .put(&format!("/menu/categories/{id}"))
            .multipart(category_form(input)?)
            .send()
            .await?;
        Self::expect_success(response).await
    }

    /// Delete a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete_category(&self, id: CategoryId) -> Result<(), BackendError> {
        let response = self.delete(&format!("/menu/categories/{id}")).send().await?;
        Self::expect_success(response).await
    }

    /// List the products of a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn products_by_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Product>, BackendError> {
        let response = self
            .get(&format!("/menu/products/category/{category_id}"))
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn create_product(&self, input: &ProductInput) -> Result<(), BackendError> {
        let response = self
            .post("/menu/products")
            .multipart(product_form(input)?)
            .send()
            .await?;
        Self::expect_success(response).await
    }

    /// Update a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn update_product(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<(), BackendError> {
        let response = self
            .put(&format!("/menu/products/{id}"))
            .multipart(product_form(input)?)
            .send()
            .await?;
        Self::expect_success(response).await
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete_product(&self, id: ProductId) -> Result<(), BackendError> {
        let response = self.delete(&format!("/menu/products/{id}")).send().await?;
        Self::expect_success(response).await
    }
}

/// Build the multipart form for a category write.
fn category_form(input: &CategoryInput) -> Result<multipart::Form, BackendError> {
    let mut form = multipart::Form::new()
        .text("restaurant_id", input.restaurant_id.to_string())
        .text("name", input.name.clone());

    if let Some(image) = &input.image {
        form = form.part("image", image_part(image)?);
    }

    Ok(form)
}

/// Build the multipart form for a product write.
fn product_form(input: &ProductInput) -> Result<multipart::Form, BackendError> {
    let mut form = multipart::Form::new()
        .text("restaurant_id", input.restaurant_id.to_string())
        .text("category_id", input.category_id.to_string())
        .text("name", input.name.clone())
        .text("description", input.description.clone())
        .text("price", input.price.to_string());

    if let Some(image) = &input.image {
        form = form.part("image", image_part(image)?);
    }

    Ok(form)
}

/// Build a multipart part from an image payload.
fn image_part(image: &ImagePayload) -> Result<multipart::Part, BackendError> {
    multipart::Part::bytes(image.bytes.clone())
        .file_name(image.file_name.clone())
        .mime_str(&image.content_type)
        .map_err(|e| BackendError::Request(e.to_string()))
}

//! Stash for uploads parked during the crop step.
//!
//! When an upload exceeds the image limits, the write it belonged to is
//! parked here and the operator is sent to the crop page. Confirming the
//! crop resumes the parked write with the cropped image attached; stale
//! entries are pruned so abandoned crops do not accumulate.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use pappi_core::{CategoryId, ProductId, RestaurantId};

use crate::backend::{CategoryInput, ProductInput, RestaurantUpdate};

use super::images::AspectRatio;

/// How long a parked upload survives before being pruned.
const PENDING_TTL_MINUTES: i64 = 15;

/// The write a parked upload belongs to, minus its image.
#[derive(Debug, Clone)]
pub enum PendingAction {
    CreateCategory(CategoryInput),
    UpdateCategory(CategoryId, CategoryInput),
    CreateProduct(ProductInput),
    UpdateProduct(ProductId, ProductInput),
    UpdateRestaurant(RestaurantId, RestaurantUpdate),
}

impl PendingAction {
    /// Where to send the operator after the write completes.
    #[must_use]
    pub fn return_path(&self) -> String {
        match self {
            Self::CreateCategory(_) | Self::UpdateCategory(..) => "/menu".to_string(),
            Self::CreateProduct(input) => format!("/menu/categories/{}", input.category_id),
            Self::UpdateProduct(_, input) => format!("/menu/categories/{}", input.category_id),
            Self::UpdateRestaurant(..) => "/settings".to_string(),
        }
    }
}

/// A parked upload awaiting its crop.
#[derive(Debug, Clone)]
pub struct PendingUpload {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub width: u32,
    pub height: u32,
    pub aspect: AspectRatio,
    pub action: PendingAction,
    created_at: DateTime<Utc>,
}

/// In-memory stash of parked uploads, keyed by a one-time id.
#[derive(Clone, Default)]
pub struct PendingUploads {
    entries: Arc<Mutex<HashMap<Uuid, PendingUpload>>>,
}

impl PendingUploads {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Park an upload and return its id for the crop round-trip.
    #[must_use]
    pub fn insert(
        &self,
        bytes: Vec<u8>,
        content_type: String,
        width: u32,
        height: u32,
        aspect: AspectRatio,
        action: PendingAction,
    ) -> Uuid {
        let id = Uuid::new_v4();
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        // Prune stale entries while we hold the lock anyway
        let cutoff = Utc::now() - Duration::minutes(PENDING_TTL_MINUTES);
        entries.retain(|_, upload| upload.created_at > cutoff);

        entries.insert(
            id,
            PendingUpload {
                bytes,
                content_type,
                width,
                height,
                aspect,
                action,
                created_at: Utc::now(),
            },
        );
        id
    }

    /// Look at a parked upload without consuming it (crop page render).
    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<PendingUpload> {
        let entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.get(&id).cloned()
    }

    /// Consume a parked upload (crop confirmed or abandoned).
    #[must_use]
    pub fn take(&self, id: Uuid) -> Option<PendingUpload> {
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.remove(&id)
    }
}

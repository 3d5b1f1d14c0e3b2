//! Application state shared across handlers.

use std::sync::Arc;

use crate::backend::{BackendClient, BackendError};
use crate::config::AdminConfig;
use crate::realtime::RealtimeManager;
use crate::services::uploads::PendingUploads;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration, the backend API client, the realtime connection registry,
/// and the crop-step upload stash.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    backend: BackendClient,
    realtime: RealtimeManager,
    pending_uploads: PendingUploads,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend HTTP client fails to build.
    pub fn new(config: AdminConfig) -> Result<Self, BackendError> {
        let backend = BackendClient::new(config.backend())?;
        let realtime = RealtimeManager::new(config.backend().socket_url.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                realtime,
                pending_uploads: PendingUploads::new(),
            }),
        })
    }

    /// Get a reference to the portal configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the Pappi backend API client.
    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        &self.inner.backend
    }

    /// Get a reference to the realtime connection registry.
    #[must_use]
    pub fn realtime(&self) -> &RealtimeManager {
        &self.inner.realtime
    }

    /// Get a reference to the crop-step upload stash.
    #[must_use]
    pub fn pending_uploads(&self) -> &PendingUploads {
        &self.inner.pending_uploads
    }

    /// Resolve an image reference that may be absolute or relative.
    #[must_use]
    pub fn image_url(&self, reference: &str) -> String {
        self.inner.config.backend().resolve_image_url(reference)
    }
}

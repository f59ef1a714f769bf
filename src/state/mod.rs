use std::sync::Arc;

use crate::{
    dao::session_store::SessionStore,
    error::ServiceError,
    services::allocator::SessionCodeAllocator,
    slides::PresentationProvider,
};

/// Cheaply clonable handle passed to every handler.
pub type SharedState = Arc<AppState>;

/// Handles built once at start-up and shared by every request.
pub struct AppState {
    store: Arc<dyn SessionStore>,
    slides: Option<Arc<dyn PresentationProvider>>,
    allocator: SessionCodeAllocator,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(
        store: Arc<dyn SessionStore>,
        slides: Option<Arc<dyn PresentationProvider>>,
        allocator: SessionCodeAllocator,
    ) -> SharedState {
        Arc::new(Self {
            store,
            slides,
            allocator,
        })
    }

    /// Relational store holding sessions and players.
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Presentation provider, or an error when none was configured.
    pub fn require_slides(&self) -> Result<&Arc<dyn PresentationProvider>, ServiceError> {
        self.slides
            .as_ref()
            .ok_or(ServiceError::ProviderNotConfigured)
    }

    /// Session code allocator configured at start-up.
    pub fn allocator(&self) -> &SessionCodeAllocator {
        &self.allocator
    }
}

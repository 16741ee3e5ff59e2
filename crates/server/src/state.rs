//! Application State
//!
//! Shared state across all handlers.

use std::sync::Arc;

use concierge_agent::{DialogManager, SessionStore};
use concierge_booking::{BookingService, InMemoryBookingService};
use concierge_config::Settings;

/// Application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration
    pub config: Arc<Settings>,
    /// Session store, shared with the reaper
    pub store: Arc<SessionStore>,
    /// Authoritative turn processor
    pub manager: Arc<DialogManager>,
}

impl AppState {
    /// Create new application state backed by the in-memory booking data.
    pub fn new(config: Settings) -> Self {
        Self::with_booking(config, Arc::new(InMemoryBookingService::new()))
    }

    /// Create application state with a specific booking backend.
    pub fn with_booking(config: Settings, booking: Arc<dyn BookingService>) -> Self {
        let store = Arc::new(SessionStore::new());
        Self {
            config: Arc::new(config),
            manager: Arc::new(DialogManager::new(store.clone(), booking)),
            store,
        }
    }
}

//! Session context and store
//!
//! One [`SessionContext`] per active call. Turns for a session are strictly
//! sequential: the context sits behind an async mutex that is held across
//! suspending collaborator calls, while unrelated sessions proceed in
//! parallel. The store enforces no TTL itself; an external reaper evicts
//! idle sessions through [`SessionStore::cleanup_expired`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tokio::sync::Mutex;

use concierge_core::{AssistanceLevel, Booking, CompletedService, Seat, SeatType, ServiceKind};

use crate::dialog::DialogState;

/// Partially-collected fields for the service currently being configured,
/// keyed by the active service kind so only that service's fields can be
/// populated. Cleared when the service is finalized or abandoned.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PendingService {
    #[default]
    None,
    Seat {
        seat_type: Option<SeatType>,
        offered: Option<Seat>,
    },
    Baggage {
        kg: Option<u32>,
    },
    Wheelchair {
        passenger: Option<String>,
        level: Option<AssistanceLevel>,
    },
    Pet {
        breed: Option<String>,
        weight_kg: Option<u32>,
    },
}

/// Mutable state of one conversation.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub session_id: String,
    /// Single source of truth for what input is expected next
    pub dialog_state: DialogState,
    /// Extracted opportunistically, never required
    pub customer_name: Option<String>,
    /// Set iff `booking` is set; immutable once validated unless the
    /// customer disputes the confirmed flight
    pub pnr: Option<String>,
    pub booking: Option<Booking>,
    /// Built once at intake, consumed front-to-back, no duplicates
    pub requested_services: Vec<ServiceKind>,
    /// Cursor into `requested_services`; monotonically non-decreasing
    pub current_service_index: usize,
    /// Seat type mentioned together with the request, carried into the
    /// seat sub-state
    pub noted_seat_type: Option<SeatType>,
    /// Baggage weight mentioned together with the request
    pub noted_baggage_kg: Option<u32>,
    pub pending: PendingService,
    /// Append-only; a service lands here only after its confirm sub-state
    /// accepted and the booking mutation succeeded
    pub completed_services: Vec<CompletedService>,
    /// Raw utterances that matched no known service keyword; non-empty
    /// forces the specialist transfer offer
    pub unknown_requests: Vec<String>,
    /// Latched when pet travel details are collected
    pub transfer_required: bool,
}

impl SessionContext {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            dialog_state: DialogState::WaitingName,
            customer_name: None,
            pnr: None,
            booking: None,
            requested_services: Vec::new(),
            current_service_index: 0,
            noted_seat_type: None,
            noted_baggage_kg: None,
            pending: PendingService::None,
            completed_services: Vec::new(),
            unknown_requests: Vec::new(),
            transfer_required: false,
        }
    }

    /// Queue a requested service, ignoring duplicates.
    pub fn queue_service(&mut self, kind: ServiceKind) {
        if !self.requested_services.contains(&kind) {
            self.requested_services.push(kind);
        }
    }

    /// The service the cursor points at, if any remain.
    pub fn current_service(&self) -> Option<ServiceKind> {
        self.requested_services
            .get(self.current_service_index)
            .copied()
    }

    /// Move past the current service and drop its pending data.
    pub fn advance_service(&mut self) {
        if self.current_service_index < self.requested_services.len() {
            self.current_service_index += 1;
        }
        self.pending = PendingService::None;
    }

    pub fn record_completed(&mut self, kind: ServiceKind, detail: String, price: u32) {
        self.completed_services.push(CompletedService {
            kind,
            detail,
            price,
        });
    }

    /// Whether the conversation must end in a specialist transfer.
    pub fn transfer_pending(&self) -> bool {
        self.transfer_required || !self.unknown_requests.is_empty()
    }

    pub fn total_due(&self) -> u32 {
        self.completed_services.iter().map(|s| s.price).sum()
    }

    /// Discard the flight after the customer disputes it. Requested
    /// services stay queued.
    pub fn clear_flight(&mut self) {
        self.pnr = None;
        self.booking = None;
    }

    /// Best name we have for the customer, if any.
    pub fn known_passenger(&self) -> Option<String> {
        self.customer_name.clone().or_else(|| {
            self.booking
                .as_ref()
                .and_then(|b| b.lead_passenger().map(String::from))
        })
    }

    /// Name used on booking mutations and the summary.
    pub fn passenger_name(&self) -> String {
        self.known_passenger()
            .unwrap_or_else(|| "Primary passenger".to_string())
    }
}

/// One live session: context behind the per-session turn lock, plus the
/// activity timestamps the reaper looks at.
pub struct SessionHandle {
    pub id: String,
    pub created_at: Instant,
    last_activity: RwLock<Instant>,
    pub context: Mutex<SessionContext>,
}

impl SessionHandle {
    fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            context: Mutex::new(SessionContext::new(&id)),
            id,
            created_at: Instant::now(),
            last_activity: RwLock::new(Instant::now()),
        }
    }

    /// Update last activity
    pub fn touch(&self) {
        *self.last_activity.write() = Instant::now();
    }

    /// Check if session is expired
    pub fn is_expired(&self, timeout: Duration) -> bool {
        self.last_activity.read().elapsed() > timeout
    }
}

/// Keyed store of live sessions. Concurrent sessions share no mutable
/// state beyond the map itself.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<SessionHandle>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Create a session. With `fresh_start` an existing session under the
    /// same id is reset to a brand-new context; without it the existing
    /// session is returned untouched.
    pub fn create(&self, id: &str, fresh_start: bool) -> Arc<SessionHandle> {
        let mut sessions = self.sessions.write();

        if !fresh_start {
            if let Some(existing) = sessions.get(id) {
                return existing.clone();
            }
        }

        let handle = Arc::new(SessionHandle::new(id));
        sessions.insert(id.to_string(), handle.clone());
        tracing::info!(session_id = id, "created session");
        handle
    }

    pub fn get(&self, id: &str) -> Option<Arc<SessionHandle>> {
        self.sessions.read().get(id).cloned()
    }

    pub fn remove(&self, id: &str) {
        if self.sessions.write().remove(id).is_some() {
            tracing::info!(session_id = id, "removed session");
        }
    }

    pub fn count(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn list(&self) -> Vec<String> {
        self.sessions.read().keys().cloned().collect()
    }

    /// Evict sessions idle longer than `timeout`. Returns how many were
    /// removed.
    pub fn cleanup_expired(&self, timeout: Duration) -> usize {
        let mut sessions = self.sessions.write();
        let expired: Vec<String> = sessions
            .iter()
            .filter(|(_, handle)| handle.is_expired(timeout))
            .map(|(id, _)| id.clone())
            .collect();

        for id in &expired {
            sessions.remove(id);
            tracing::info!(session_id = %id, "expired session");
        }
        expired.len()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_dedup_and_cursor() {
        let mut ctx = SessionContext::new("s1");

        ctx.queue_service(ServiceKind::Seat);
        ctx.queue_service(ServiceKind::Baggage);
        ctx.queue_service(ServiceKind::Seat);
        assert_eq!(
            ctx.requested_services,
            vec![ServiceKind::Seat, ServiceKind::Baggage]
        );

        assert_eq!(ctx.current_service(), Some(ServiceKind::Seat));
        ctx.advance_service();
        assert_eq!(ctx.current_service(), Some(ServiceKind::Baggage));
        ctx.advance_service();
        assert_eq!(ctx.current_service(), None);

        // Cursor never exceeds the list length
        ctx.advance_service();
        assert_eq!(ctx.current_service_index, 2);
    }

    #[test]
    fn test_advance_clears_pending() {
        let mut ctx = SessionContext::new("s1");
        ctx.pending = PendingService::Baggage { kg: Some(10) };
        ctx.advance_service();
        assert_eq!(ctx.pending, PendingService::None);
    }

    #[test]
    fn test_transfer_pending_conditions() {
        let mut ctx = SessionContext::new("s1");
        assert!(!ctx.transfer_pending());

        ctx.unknown_requests.push("change my flight".to_string());
        assert!(ctx.transfer_pending());

        let mut ctx = SessionContext::new("s2");
        ctx.transfer_required = true;
        assert!(ctx.transfer_pending());
    }

    #[test]
    fn test_store_create_is_idempotent_reset() {
        let store = SessionStore::new();

        let first = store.create("call-1", true);
        {
            let mut ctx = first.context.try_lock().unwrap();
            ctx.customer_name = Some("Rahul".to_string());
        }

        // Without fresh start the same handle comes back
        let same = store.create("call-1", false);
        assert!(Arc::ptr_eq(&first, &same));

        // A fresh start replaces the context entirely
        let reset = store.create("call-1", true);
        assert!(!Arc::ptr_eq(&first, &reset));
        assert_eq!(reset.context.try_lock().unwrap().customer_name, None);
    }

    #[test]
    fn test_store_cleanup_expired() {
        let store = SessionStore::new();
        store.create("a", true);
        store.create("b", true);
        assert_eq!(store.count(), 2);

        // Zero timeout expires everything that has any elapsed time
        std::thread::sleep(Duration::from_millis(2));
        let removed = store.cleanup_expired(Duration::ZERO);
        assert_eq!(removed, 2);
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_store_get_and_remove() {
        let store = SessionStore::new();
        store.create("a", true);

        assert!(store.get("a").is_some());
        assert!(store.get("missing").is_none());

        store.remove("a");
        assert!(store.get("a").is_none());
    }
}

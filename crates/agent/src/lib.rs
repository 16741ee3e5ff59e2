//! Dialog core for the airline add-on concierge
//!
//! Features:
//! - Pattern-table intent detection and entity extraction
//! - Session-keyed conversation context with per-session turn sequencing
//! - Dialog state machine driving the add-on flows (seat, baggage,
//!   priority, wheelchair, pet travel)
//! - WhatsApp summary formatting and specialist hand-off

pub mod dialog;
pub mod extract;
pub mod session;
pub mod summary;

pub use dialog::{DialogManager, DialogState, TurnOutcome, GREETING};
pub use extract::{
    classify_polarity, extract, Entities, Extraction, IntentKind, IntentMatch, Polarity,
};
pub use session::{PendingService, SessionContext, SessionHandle, SessionStore};
pub use summary::format_summary;

use thiserror::Error;

/// Agent errors
#[derive(Error, Debug)]
pub enum AgentError {
    /// The session was never started or has been evicted; the caller must
    /// restart the call.
    #[error("Session not found: {0}")]
    SessionNotFound(String),
}

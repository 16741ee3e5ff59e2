//! HTTP transport for the concierge
//!
//! Thin wrapper around the dialog core: session routes, a chat route, and
//! the background reaper that evicts idle sessions. All decision logic
//! lives in `concierge-agent`; this crate only moves requests in and
//! responses out.

pub mod http;
pub mod reaper;
pub mod state;

pub use http::create_router;
pub use reaper::start_cleanup_task;
pub use state::AppState;

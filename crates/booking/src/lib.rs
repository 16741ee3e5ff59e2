//! Booking collaborator contract
//!
//! The dialog core never touches reservation data directly; every read and
//! mutation goes through the [`BookingService`] trait. Production deployments
//! implement it against the reservation backend; tests and local runs use the
//! bundled [`InMemoryBookingService`].
//!
//! Every operation can fail. The dialog core treats a failure as retryable:
//! it surfaces a generic retry prompt and holds the session at the
//! pre-mutation state so the caller's next confirmation retries idempotently.

pub mod memory;

pub use memory::{FlakyBookingService, InMemoryBookingService};

use async_trait::async_trait;
use thiserror::Error;

use concierge_core::{AssistanceLevel, Booking, Seat, SeatType};

/// Booking collaborator errors
#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Booking service unavailable: {0}")]
    Unavailable(String),

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Timeout")]
    Timeout,
}

/// Operations the dialog core delegates to the reservation backend.
#[async_trait]
pub trait BookingService: Send + Sync {
    /// Look up a booking by PNR. `Ok(None)` means the PNR does not exist,
    /// which is a normal outcome, not an error.
    async fn lookup_booking(&self, pnr: &str) -> Result<Option<Booking>, BookingError>;

    /// Find one available seat of the requested type on a flight.
    async fn find_available_seat(
        &self,
        flight_number: &str,
        seat_type: SeatType,
    ) -> Result<Option<Seat>, BookingError>;

    /// Assign a seat to a passenger on the booking.
    async fn book_seat(
        &self,
        pnr: &str,
        passenger_name: &str,
        seat_id: &str,
    ) -> Result<(), BookingError>;

    /// Add extra checked baggage allowance in kilograms.
    async fn add_baggage(&self, pnr: &str, kg: u32) -> Result<(), BookingError>;

    /// Enable complimentary priority boarding.
    async fn enable_priority(&self, pnr: &str) -> Result<(), BookingError>;

    /// Register wheelchair assistance for a passenger.
    async fn register_wheelchair(
        &self,
        pnr: &str,
        passenger_name: &str,
        level: AssistanceLevel,
    ) -> Result<(), BookingError>;

    /// Send the booking summary to the customer over WhatsApp.
    async fn send_summary(&self, pnr: &str, summary_text: &str) -> Result<(), BookingError>;
}

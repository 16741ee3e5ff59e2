//! In-memory booking backend
//!
//! Stub implementation of [`BookingService`] with a small set of fixture
//! bookings and per-flight seat maps. Used by tests and local development;
//! state is process-local and lost on restart.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::RwLock;

use concierge_core::{AssistanceLevel, Booking, Seat, SeatType};

use crate::{BookingError, BookingService};

/// Mutable per-PNR state accumulated by mutations.
#[derive(Debug, Default, Clone)]
struct BookingRecord {
    seat_assignments: Vec<(String, String)>,
    extra_baggage_kg: u32,
    priority: bool,
    wheelchair: Vec<(String, AssistanceLevel)>,
    summaries_sent: Vec<String>,
}

/// In-memory reservation backend with fixture data.
pub struct InMemoryBookingService {
    bookings: RwLock<HashMap<String, Booking>>,
    /// (flight_number, seat_type) -> free seats, consumed front-to-back
    seat_inventory: RwLock<HashMap<(String, SeatType), Vec<String>>>,
    records: RwLock<HashMap<String, BookingRecord>>,
}

impl InMemoryBookingService {
    /// Create a backend pre-loaded with the fixture bookings.
    pub fn new() -> Self {
        let service = Self {
            bookings: RwLock::new(HashMap::new()),
            seat_inventory: RwLock::new(HashMap::new()),
            records: RwLock::new(HashMap::new()),
        };
        service.load_fixtures();
        service
    }

    /// Create an empty backend (no bookings, no seats).
    pub fn empty() -> Self {
        Self {
            bookings: RwLock::new(HashMap::new()),
            seat_inventory: RwLock::new(HashMap::new()),
            records: RwLock::new(HashMap::new()),
        }
    }

    fn load_fixtures(&self) {
        let fixtures = [
            (
                "ABC123",
                "HA302",
                "Mumbai",
                "Delhi",
                "2026-09-14",
                vec!["Rahul Sharma", "Meera Sharma"],
            ),
            (
                "XYZ789",
                "HA114",
                "Bengaluru",
                "Kolkata",
                "2026-09-20",
                vec!["Priya Nair"],
            ),
            (
                "PQR456",
                "HA578",
                "Chennai",
                "Hyderabad",
                "2026-10-02",
                vec!["Arjun Reddy", "Kavya Reddy", "Dev Reddy"],
            ),
        ];

        let mut bookings = self.bookings.write();
        for (pnr, flight, origin, destination, date, passengers) in fixtures {
            bookings.insert(
                pnr.to_string(),
                Booking {
                    pnr: pnr.to_string(),
                    flight_number: flight.to_string(),
                    origin_city: origin.to_string(),
                    destination_city: destination.to_string(),
                    date: NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("fixture date"),
                    passengers: passengers.into_iter().map(String::from).collect(),
                },
            );
        }

        let mut inventory = self.seat_inventory.write();
        for flight in ["HA302", "HA114", "HA578"] {
            inventory.insert(
                (flight.to_string(), SeatType::Window),
                vec!["14A".to_string(), "21F".to_string(), "22A".to_string()],
            );
            inventory.insert(
                (flight.to_string(), SeatType::Aisle),
                vec!["15C".to_string(), "16D".to_string()],
            );
            inventory.insert(
                (flight.to_string(), SeatType::ExtraLegroom),
                vec!["1A".to_string(), "2C".to_string()],
            );
        }
    }

    /// Add or replace a booking (test hook).
    pub fn insert_booking(&self, booking: Booking) {
        self.bookings.write().insert(booking.pnr.clone(), booking);
    }

    /// Replace the free-seat list for a flight/type (test hook).
    pub fn set_seats(&self, flight_number: &str, seat_type: SeatType, seats: Vec<String>) {
        self.seat_inventory
            .write()
            .insert((flight_number.to_string(), seat_type), seats);
    }

    /// Seat assignments recorded for a PNR.
    pub fn seat_assignments(&self, pnr: &str) -> Vec<(String, String)> {
        self.records
            .read()
            .get(pnr)
            .map(|r| r.seat_assignments.clone())
            .unwrap_or_default()
    }

    /// Accumulated extra baggage for a PNR.
    pub fn extra_baggage_kg(&self, pnr: &str) -> u32 {
        self.records
            .read()
            .get(pnr)
            .map(|r| r.extra_baggage_kg)
            .unwrap_or(0)
    }

    /// Whether priority boarding was enabled for a PNR.
    pub fn priority_enabled(&self, pnr: &str) -> bool {
        self.records.read().get(pnr).map(|r| r.priority).unwrap_or(false)
    }

    /// Wheelchair registrations for a PNR.
    pub fn wheelchair_registrations(&self, pnr: &str) -> Vec<(String, AssistanceLevel)> {
        self.records
            .read()
            .get(pnr)
            .map(|r| r.wheelchair.clone())
            .unwrap_or_default()
    }

    /// Summary texts sent for a PNR, in send order.
    pub fn summaries_sent(&self, pnr: &str) -> Vec<String> {
        self.records
            .read()
            .get(pnr)
            .map(|r| r.summaries_sent.clone())
            .unwrap_or_default()
    }

    fn require_booking(&self, pnr: &str) -> Result<(), BookingError> {
        if self.bookings.read().contains_key(pnr) {
            Ok(())
        } else {
            Err(BookingError::Rejected(format!("unknown PNR {pnr}")))
        }
    }
}

impl Default for InMemoryBookingService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookingService for InMemoryBookingService {
    async fn lookup_booking(&self, pnr: &str) -> Result<Option<Booking>, BookingError> {
        Ok(self.bookings.read().get(pnr).cloned())
    }

    async fn find_available_seat(
        &self,
        flight_number: &str,
        seat_type: SeatType,
    ) -> Result<Option<Seat>, BookingError> {
        let inventory = self.seat_inventory.read();
        let seat = inventory
            .get(&(flight_number.to_string(), seat_type))
            .and_then(|seats| seats.first())
            .map(|seat_id| Seat {
                seat_id: seat_id.clone(),
                seat_type,
            });
        Ok(seat)
    }

    async fn book_seat(
        &self,
        pnr: &str,
        passenger_name: &str,
        seat_id: &str,
    ) -> Result<(), BookingError> {
        self.require_booking(pnr)?;

        let mut inventory = self.seat_inventory.write();
        let slot = inventory
            .iter_mut()
            .find(|(_, seats)| seats.iter().any(|s| s == seat_id));

        match slot {
            Some((_, seats)) => {
                seats.retain(|s| s != seat_id);
            }
            None => {
                return Err(BookingError::Rejected(format!(
                    "seat {seat_id} is no longer available"
                )));
            }
        }
        drop(inventory);

        self.records
            .write()
            .entry(pnr.to_string())
            .or_default()
            .seat_assignments
            .push((passenger_name.to_string(), seat_id.to_string()));

        tracing::debug!(pnr, seat_id, "seat booked");
        Ok(())
    }

    async fn add_baggage(&self, pnr: &str, kg: u32) -> Result<(), BookingError> {
        self.require_booking(pnr)?;
        self.records
            .write()
            .entry(pnr.to_string())
            .or_default()
            .extra_baggage_kg += kg;
        Ok(())
    }

    async fn enable_priority(&self, pnr: &str) -> Result<(), BookingError> {
        self.require_booking(pnr)?;
        self.records
            .write()
            .entry(pnr.to_string())
            .or_default()
            .priority = true;
        Ok(())
    }

    async fn register_wheelchair(
        &self,
        pnr: &str,
        passenger_name: &str,
        level: AssistanceLevel,
    ) -> Result<(), BookingError> {
        self.require_booking(pnr)?;
        self.records
            .write()
            .entry(pnr.to_string())
            .or_default()
            .wheelchair
            .push((passenger_name.to_string(), level));
        Ok(())
    }

    async fn send_summary(&self, pnr: &str, summary_text: &str) -> Result<(), BookingError> {
        self.require_booking(pnr)?;
        self.records
            .write()
            .entry(pnr.to_string())
            .or_default()
            .summaries_sent
            .push(summary_text.to_string());
        Ok(())
    }
}

/// Failure-injecting wrapper around another backend.
///
/// Fails the next `n` calls with [`BookingError::Unavailable`], then
/// delegates. Lets tests exercise the hold-state-and-retry path.
pub struct FlakyBookingService<S> {
    inner: S,
    failures_remaining: AtomicUsize,
}

impl<S> FlakyBookingService<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            failures_remaining: AtomicUsize::new(0),
        }
    }

    /// Make the next `n` calls fail.
    pub fn fail_next(&self, n: usize) {
        self.failures_remaining.store(n, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), BookingError> {
        let remaining = self.failures_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_remaining.store(remaining - 1, Ordering::SeqCst);
            return Err(BookingError::Unavailable("injected failure".to_string()));
        }
        Ok(())
    }
}

impl<S> std::ops::Deref for FlakyBookingService<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: BookingService> BookingService for FlakyBookingService<S> {
    async fn lookup_booking(&self, pnr: &str) -> Result<Option<Booking>, BookingError> {
        self.check()?;
        self.inner.lookup_booking(pnr).await
    }

    async fn find_available_seat(
        &self,
        flight_number: &str,
        seat_type: SeatType,
    ) -> Result<Option<Seat>, BookingError> {
        self.check()?;
        self.inner.find_available_seat(flight_number, seat_type).await
    }

    async fn book_seat(
        &self,
        pnr: &str,
        passenger_name: &str,
        seat_id: &str,
    ) -> Result<(), BookingError> {
        self.check()?;
        self.inner.book_seat(pnr, passenger_name, seat_id).await
    }

    async fn add_baggage(&self, pnr: &str, kg: u32) -> Result<(), BookingError> {
        self.check()?;
        self.inner.add_baggage(pnr, kg).await
    }

    async fn enable_priority(&self, pnr: &str) -> Result<(), BookingError> {
        self.check()?;
        self.inner.enable_priority(pnr).await
    }

    async fn register_wheelchair(
        &self,
        pnr: &str,
        passenger_name: &str,
        level: AssistanceLevel,
    ) -> Result<(), BookingError> {
        self.check()?;
        self.inner.register_wheelchair(pnr, passenger_name, level).await
    }

    async fn send_summary(&self, pnr: &str, summary_text: &str) -> Result<(), BookingError> {
        self.check()?;
        self.inner.send_summary(pnr, summary_text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup_fixture() {
        let service = InMemoryBookingService::new();

        let booking = service.lookup_booking("ABC123").await.unwrap().unwrap();
        assert_eq!(booking.flight_number, "HA302");
        assert_eq!(booking.passengers.len(), 2);

        assert!(service.lookup_booking("ZZZ999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_seat_booking_consumes_inventory() {
        let service = InMemoryBookingService::new();

        let seat = service
            .find_available_seat("HA302", SeatType::Window)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(seat.seat_id, "14A");

        service.book_seat("ABC123", "Rahul Sharma", "14A").await.unwrap();

        // Double booking the same seat is rejected
        let err = service.book_seat("ABC123", "Meera Sharma", "14A").await;
        assert!(err.is_err());

        // Next window seat offered is the following one
        let next = service
            .find_available_seat("HA302", SeatType::Window)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(next.seat_id, "21F");
    }

    #[tokio::test]
    async fn test_baggage_accumulates() {
        let service = InMemoryBookingService::new();

        service.add_baggage("ABC123", 10).await.unwrap();
        service.add_baggage("ABC123", 5).await.unwrap();

        assert_eq!(service.extra_baggage_kg("ABC123"), 15);
    }

    #[tokio::test]
    async fn test_mutations_reject_unknown_pnr() {
        let service = InMemoryBookingService::new();

        assert!(service.add_baggage("NOPE00", 10).await.is_err());
        assert!(service.enable_priority("NOPE00").await.is_err());
    }

    #[tokio::test]
    async fn test_empty_backend_accepts_inserted_bookings() {
        let service = InMemoryBookingService::empty();
        assert!(service.lookup_booking("ABC123").await.unwrap().is_none());

        service.insert_booking(Booking {
            pnr: "NEW001".to_string(),
            flight_number: "HA900".to_string(),
            origin_city: "Pune".to_string(),
            destination_city: "Goa".to_string(),
            date: NaiveDate::parse_from_str("2026-11-05", "%Y-%m-%d").unwrap(),
            passengers: vec!["Sana Khan".to_string()],
        });

        let booking = service.lookup_booking("NEW001").await.unwrap().unwrap();
        assert_eq!(booking.flight_number, "HA900");

        // No seats configured for the new flight yet
        let seat = service
            .find_available_seat("HA900", SeatType::Window)
            .await
            .unwrap();
        assert!(seat.is_none());
    }

    #[tokio::test]
    async fn test_flaky_wrapper_recovers() {
        let service = FlakyBookingService::new(InMemoryBookingService::new());
        service.fail_next(2);

        assert!(service.lookup_booking("ABC123").await.is_err());
        assert!(service.enable_priority("ABC123").await.is_err());
        assert!(service.enable_priority("ABC123").await.is_ok());
    }
}

//! Domain types shared across the concierge crates.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Bookable add-on service kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    /// Paid seat selection (window/aisle/extra legroom)
    Seat,
    /// Extra checked baggage by weight
    Baggage,
    /// Priority boarding (complimentary)
    Priority,
    /// Wheelchair assistance (complimentary)
    Wheelchair,
    /// Pet travel (specialist-handled, unpriced)
    Pet,
}

impl ServiceKind {
    /// Get service display name
    pub fn display_name(&self) -> &'static str {
        match self {
            ServiceKind::Seat => "seat selection",
            ServiceKind::Baggage => "extra baggage",
            ServiceKind::Priority => "priority boarding",
            ServiceKind::Wheelchair => "wheelchair assistance",
            ServiceKind::Pet => "pet travel",
        }
    }
}

/// Seat categories offered as paid add-ons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeatType {
    Window,
    Aisle,
    ExtraLegroom,
}

impl SeatType {
    /// Canonical lowercase-hyphenated form
    pub fn canonical(&self) -> &'static str {
        match self {
            SeatType::Window => "window",
            SeatType::Aisle => "aisle",
            SeatType::ExtraLegroom => "extra-legroom",
        }
    }

    /// Get seat type display name
    pub fn display_name(&self) -> &'static str {
        match self {
            SeatType::Window => "window",
            SeatType::Aisle => "aisle",
            SeatType::ExtraLegroom => "extra legroom",
        }
    }
}

/// Wheelchair assistance levels (closed set).
///
/// Free-text phrasings are normalized into one of these; anything that
/// does not match a sub-phrase defaults to
/// [`AssistanceLevel::FullAssistance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssistanceLevel {
    GateToGate,
    CheckinToBoarding,
    ArrivalAssistance,
    #[default]
    FullAssistance,
}

impl AssistanceLevel {
    /// Canonical lowercase-hyphenated form
    pub fn canonical(&self) -> &'static str {
        match self {
            AssistanceLevel::GateToGate => "gate-to-gate",
            AssistanceLevel::CheckinToBoarding => "checkin-to-boarding",
            AssistanceLevel::ArrivalAssistance => "arrival-assistance",
            AssistanceLevel::FullAssistance => "full-assistance",
        }
    }

    /// Get assistance level display name
    pub fn display_name(&self) -> &'static str {
        match self {
            AssistanceLevel::GateToGate => "gate to gate",
            AssistanceLevel::CheckinToBoarding => "check-in to boarding",
            AssistanceLevel::ArrivalAssistance => "arrival assistance",
            AssistanceLevel::FullAssistance => "full assistance",
        }
    }
}

/// Snapshot of a confirmed booking, fetched once per validated PNR.
///
/// Read-only within the dialog core; a disputed flight clears the whole
/// snapshot together with the PNR.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub pnr: String,
    pub flight_number: String,
    pub origin_city: String,
    pub destination_city: String,
    pub date: NaiveDate,
    pub passengers: Vec<String>,
}

impl Booking {
    /// Lead passenger name, used when the caller never introduced
    /// themselves.
    pub fn lead_passenger(&self) -> Option<&str> {
        self.passengers.first().map(String::as_str)
    }

    /// Human-readable route, e.g. "Mumbai to Delhi"
    pub fn route(&self) -> String {
        format!("{} to {}", self.origin_city, self.destination_city)
    }
}

/// A concrete seat on a flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub seat_id: String,
    pub seat_type: SeatType,
}

/// A finalized add-on, appended only after its confirm sub-state accepted
/// a positive response and the booking mutation succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedService {
    pub kind: ServiceKind,
    /// Human-readable detail line, e.g. "Window seat 14A"
    pub detail: String,
    /// Price in rupees; 0 for complimentary services
    pub price: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seat_type_canonical() {
        assert_eq!(SeatType::Window.canonical(), "window");
        assert_eq!(SeatType::ExtraLegroom.canonical(), "extra-legroom");
    }

    #[test]
    fn test_assistance_default_and_canonical() {
        assert_eq!(AssistanceLevel::default(), AssistanceLevel::FullAssistance);
        assert_eq!(AssistanceLevel::GateToGate.canonical(), "gate-to-gate");
        assert_eq!(
            AssistanceLevel::CheckinToBoarding.canonical(),
            "checkin-to-boarding"
        );
    }

    #[test]
    fn test_booking_helpers() {
        let booking = Booking {
            pnr: "ABC123".to_string(),
            flight_number: "HA302".to_string(),
            origin_city: "Mumbai".to_string(),
            destination_city: "Delhi".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 9, 14).expect("valid date"),
            passengers: vec!["Rahul Sharma".to_string(), "Meera Sharma".to_string()],
        };

        assert_eq!(booking.route(), "Mumbai to Delhi");
        assert_eq!(booking.lead_passenger(), Some("Rahul Sharma"));
    }
}

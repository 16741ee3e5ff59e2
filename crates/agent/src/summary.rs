//! WhatsApp summary formatting
//!
//! Pure formatting: the only side effect around the summary is the
//! `send_summary` collaborator call made by the dialog manager.

use concierge_core::{Booking, CompletedService};

/// Payment links are templated on the PNR.
const PAYMENT_URL_BASE: &str = "https://pay.horizonairways.example";

/// Render the structured summary block: PNR, passenger, flight, one line
/// per completed service with its price or "FREE", the total due, and the
/// payment link.
pub fn format_summary(
    booking: &Booking,
    passenger: &str,
    services: &[CompletedService],
) -> String {
    let mut out = String::new();
    out.push_str("Horizon Airways booking summary\n");
    out.push_str(&format!("PNR: {}\n", booking.pnr));
    out.push_str(&format!("Passenger: {passenger}\n"));
    out.push_str(&format!(
        "Flight {}, {}, {}\n",
        booking.flight_number,
        booking.route(),
        booking.date.format("%d %b %Y"),
    ));

    for service in services {
        if service.price == 0 {
            out.push_str(&format!("{}: FREE\n", service.detail));
        } else {
            out.push_str(&format!("{}: Rs.{}\n", service.detail, service.price));
        }
    }

    let total: u32 = services.iter().map(|s| s.price).sum();
    out.push_str(&format!("Total due: Rs.{total}\n"));
    out.push_str(&format!("Pay securely: {PAYMENT_URL_BASE}/{}", booking.pnr));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use concierge_core::ServiceKind;

    fn booking() -> Booking {
        Booking {
            pnr: "ABC123".to_string(),
            flight_number: "HA302".to_string(),
            origin_city: "Mumbai".to_string(),
            destination_city: "Delhi".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 9, 14).expect("valid date"),
            passengers: vec!["Rahul Sharma".to_string()],
        }
    }

    #[test]
    fn test_summary_structure() {
        let services = vec![
            CompletedService {
                kind: ServiceKind::Seat,
                detail: "Window seat 14A".to_string(),
                price: 200,
            },
            CompletedService {
                kind: ServiceKind::Priority,
                detail: "Priority boarding".to_string(),
                price: 0,
            },
        ];

        let text = format_summary(&booking(), "Rahul", &services);

        assert!(text.contains("PNR: ABC123"));
        assert!(text.contains("Passenger: Rahul"));
        assert!(text.contains("Flight HA302, Mumbai to Delhi, 14 Sep 2026"));
        assert!(text.contains("Window seat 14A: Rs.200"));
        assert!(text.contains("Priority boarding: FREE"));
        assert!(text.contains("Total due: Rs.200"));
        assert!(text.ends_with("https://pay.horizonairways.example/ABC123"));
    }

    #[test]
    fn test_summary_total_sums_prices() {
        let services = vec![
            CompletedService {
                kind: ServiceKind::Seat,
                detail: "Extra legroom seat 1A".to_string(),
                price: 800,
            },
            CompletedService {
                kind: ServiceKind::Baggage,
                detail: "11 kg extra baggage".to_string(),
                price: 1500,
            },
        ];

        let text = format_summary(&booking(), "Rahul", &services);
        assert!(text.contains("Total due: Rs.2300"));
    }

    #[test]
    fn test_summary_without_services() {
        let text = format_summary(&booking(), "Rahul", &[]);
        assert!(text.contains("Total due: Rs.0"));
    }
}

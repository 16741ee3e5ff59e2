//! Core types for the airline add-on concierge
//!
//! This crate provides foundational types used across all other crates:
//! - Booking and passenger types
//! - Add-on service types
//! - Pricing policy

pub mod pricing;
pub mod types;

pub use pricing::{baggage_price, seat_price};
pub use types::{AssistanceLevel, Booking, CompletedService, Seat, SeatType, ServiceKind};

//! Add-on pricing policy.
//!
//! Prices are fixed per fare rules and quoted in whole rupees. Priority
//! boarding and wheelchair assistance are complimentary; pet travel carries
//! no price because the specialist desk handles it end to end.

use crate::types::SeatType;

/// Fixed price for a window seat.
pub const WINDOW_SEAT_PRICE: u32 = 200;
/// Fixed price for an aisle seat.
pub const AISLE_SEAT_PRICE: u32 = 150;
/// Fixed price for an extra-legroom seat.
pub const EXTRA_LEGROOM_SEAT_PRICE: u32 = 800;

/// Baggage is charged per started 5 kg slab.
pub const BAGGAGE_SLAB_KG: u32 = 5;
/// Price of one baggage slab.
pub const BAGGAGE_SLAB_PRICE: u32 = 500;

/// Price of a seat add-on by seat type.
pub fn seat_price(seat_type: SeatType) -> u32 {
    match seat_type {
        SeatType::Window => WINDOW_SEAT_PRICE,
        SeatType::Aisle => AISLE_SEAT_PRICE,
        SeatType::ExtraLegroom => EXTRA_LEGROOM_SEAT_PRICE,
    }
}

/// Price of `kg` kilograms of extra baggage: every started 5 kg slab costs 500.
pub fn baggage_price(kg: u32) -> u32 {
    kg.div_ceil(BAGGAGE_SLAB_KG) * BAGGAGE_SLAB_PRICE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seat_prices() {
        assert_eq!(seat_price(SeatType::Window), 200);
        assert_eq!(seat_price(SeatType::Aisle), 150);
        assert_eq!(seat_price(SeatType::ExtraLegroom), 800);
    }

    #[test]
    fn test_baggage_slabs() {
        assert_eq!(baggage_price(1), 500);
        assert_eq!(baggage_price(5), 500);
        assert_eq!(baggage_price(6), 1000);
        assert_eq!(baggage_price(10), 1000);
        assert_eq!(baggage_price(11), 1500);
        assert_eq!(baggage_price(23), 2500);
    }
}

//! Parking fee schedule.

use super::records::{Membership, Timestamp};

/// Flat charge covering the first `BASE_HOURS`.
pub const BASE_FEE: f64 = 100.0;
pub const BASE_HOURS: f64 = 3.0;
/// Charge per started hour past `BASE_HOURS`.
pub const HOURLY_FEE: f64 = 50.0;
/// Fraction of the fee paid by discounted tiers.
pub const MEMBER_RATE: f64 = 0.90;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Fee for a stay of `hours`. Negative durations are charged as zero.
pub fn parking_fee(hours: f64, membership: Membership) -> f64 {
    let hours = hours.max(0.0);
    let fee = if hours <= BASE_HOURS {
        BASE_FEE
    } else {
        BASE_FEE + (hours - BASE_HOURS).ceil() * HOURLY_FEE
    };
    if membership.has_discount() {
        fee * MEMBER_RATE
    } else {
        fee
    }
}

/// Hours from `arrival` to `departure`, zero if the clock went backwards.
pub fn hours_between(arrival: Timestamp, departure: Timestamp) -> f64 {
    departure.saturating_sub(arrival).max(0) as f64 / SECONDS_PER_HOUR
}

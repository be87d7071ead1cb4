//! Precise arithmetic over f64-stored amounts
//!
//! Documents store money and rating averages as `f64` in currency/rating
//! units; all arithmetic goes through `Decimal` so repeated updates do not
//! accumulate float drift.

use rust_decimal::prelude::*;

/// Convert an f64 currency/rating value to Decimal
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

/// Convert a Decimal back to the stored f64 representation
pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Fold one more rating into a running average
///
/// `(current * count + new) / (count + 1)`, computed in Decimal.
pub fn updated_average(current: f64, count: u32, new_rating: u8) -> f64 {
    let total = to_decimal(current) * Decimal::from(count) + Decimal::from(new_rating);
    to_f64(total / Decimal::from(count + 1))
}

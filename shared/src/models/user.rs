//! User rating aggregate

use serde::{Deserialize, Serialize};

/// Derived seller rating aggregate
///
/// Updated only inside the review-submission transaction so concurrent
/// submissions cannot lose an update.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SellerRating {
    /// Running arithmetic mean of all ratings received
    pub rating: f64,
    pub review_count: u32,
}

//! Listing Model

use serde::{Deserialize, Serialize};

/// Listing status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListingStatus {
    #[default]
    Available,
    Reserved,
    Sold,
}

/// Item condition declared by the seller
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Condition {
    New,
    LikeNew,
    Good,
    Fair,
    Worn,
}

/// Paid visibility boost tier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BoostType {
    Featured,
    TopOfCategory,
    Urgent,
}

/// Listing entity
///
/// `status`/`reserved_until` are mutated only by the reservation and
/// payment-confirmation commands; everything else treats the listing as
/// read-only once published.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub seller_id: String,
    pub title: String,
    pub description: String,
    /// Price in currency unit (always > 0)
    pub price: f64,
    pub condition: Condition,
    pub category: String,
    pub postal_code: String,
    pub image_urls: Vec<String>,
    pub status: ListingStatus,
    /// Reservation deadline (Unix millis); set iff status == Reserved
    pub reserved_until: Option<i64>,
    /// Order currently holding the reservation; set iff status == Reserved
    pub reserved_by_order: Option<String>,
    pub is_boosted: bool,
    pub boost_type: Option<BoostType>,
    /// Boost expiry (Unix millis)
    pub boost_ends: Option<i64>,
    /// Creation time (Unix millis)
    pub created_at: i64,
}

impl Listing {
    /// Whether a reservation is currently held and not yet expired
    pub fn has_live_reservation(&self, now: i64) -> bool {
        self.status == ListingStatus::Reserved
            && self.reserved_until.is_some_and(|until| until > now)
    }
}

/// Seller publish payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingDraft {
    pub title: String,
    pub description: String,
    /// Price in currency unit
    pub price: f64,
    pub condition: Condition,
    pub category: String,
    pub postal_code: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

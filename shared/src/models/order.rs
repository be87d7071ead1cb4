//! Order Model

use serde::{Deserialize, Serialize};

/// Order lifecycle status
///
/// Transitions are validated centrally by the fulfillment state machine;
/// the enum itself only knows which states are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    PendingPayment,
    PaidPendingShipment,
    Shipped,
    Delivered,
    Completed,
    Disputed,
    Cancelled,
}

impl OrderStatus {
    /// Terminal states accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// Payment capture status (driven by the external payment collaborator)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
}

/// How the buyer receives the item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryMethod {
    Domicile,
    Pickup,
}

/// Shipping address (present iff delivery method is DOMICILE)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShippingAddress {
    pub recipient: String,
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub phone: Option<String>,
}

/// Order entity
///
/// The display snapshot (`title`, `image_url`, `price_paid`) is copied
/// from the listing at reservation time and never joined back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub listing_id: String,
    pub seller_id: String,
    pub buyer_id: String,
    pub title: String,
    pub image_url: Option<String>,
    /// Price paid in currency unit
    pub price_paid: f64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub delivery_method: DeliveryMethod,
    pub shipping_address: Option<ShippingAddress>,
    pub tracking_number: Option<String>,
    /// Creation time (Unix millis)
    pub created_at: i64,
    pub shipped_at: Option<i64>,
    pub delivered_at: Option<i64>,
    pub buyer_confirmed_at: Option<i64>,
    pub buyer_review_left: bool,
}

/// Buyer-supplied fields of a reservation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDraft {
    pub delivery_method: DeliveryMethod,
    pub shipping_address: Option<ShippingAddress>,
}

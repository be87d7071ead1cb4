//! Post-commit notification events
//!
//! Commands return the events describing what they committed; the manager
//! broadcasts them after the transaction commits. Delivery is best-effort
//! and at-most-once per transition — a closed or lagging subscriber never
//! affects the committed state.

use serde::Serialize;
use shared::models::BoostType;

/// Why an order was cancelled
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CancelReason {
    PaymentFailed,
    ReservationExpired,
}

/// Events emitted by committed marketplace transactions
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketEvent {
    ListingPublished {
        listing_id: String,
        seller_id: String,
    },
    ListingBoosted {
        listing_id: String,
        boost_type: BoostType,
    },
    OrderReserved {
        order_id: String,
        listing_id: String,
        buyer_id: String,
        seller_id: String,
    },
    OrderCancelled {
        order_id: String,
        listing_id: String,
        reason: CancelReason,
    },
    PaymentConfirmed {
        order_id: String,
        listing_id: String,
    },
    OrderShipped {
        order_id: String,
        buyer_id: String,
        tracking_number: String,
    },
    OrderDelivered {
        order_id: String,
        seller_id: String,
    },
    OrderCompleted {
        order_id: String,
        seller_id: String,
    },
    /// Signal for the external payout collaborator; emitted alongside
    /// `OrderCompleted`
    PayoutRequested {
        order_id: String,
        seller_id: String,
        /// Amount in currency unit
        amount: f64,
    },
    DisputeOpened {
        dispute_id: String,
        order_id: String,
        seller_id: String,
    },
    DisputeEscalated {
        dispute_id: String,
        order_id: String,
    },
    ReviewSubmitted {
        review_id: String,
        target_user_id: String,
        rating: f64,
        review_count: u32,
    },
}

impl MarketEvent {
    /// Short event kind for logging and notification routing
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ListingPublished { .. } => "listing_published",
            Self::ListingBoosted { .. } => "listing_boosted",
            Self::OrderReserved { .. } => "order_reserved",
            Self::OrderCancelled { .. } => "order_cancelled",
            Self::PaymentConfirmed { .. } => "payment_confirmed",
            Self::OrderShipped { .. } => "order_shipped",
            Self::OrderDelivered { .. } => "order_delivered",
            Self::OrderCompleted { .. } => "order_completed",
            Self::PayoutRequested { .. } => "payout_requested",
            Self::DisputeOpened { .. } => "dispute_opened",
            Self::DisputeEscalated { .. } => "dispute_escalated",
            Self::ReviewSubmitted { .. } => "review_submitted",
        }
    }

    /// Resource family the event belongs to
    pub fn resource(&self) -> &'static str {
        match self {
            Self::ListingPublished { .. } | Self::ListingBoosted { .. } => "listing",
            Self::OrderReserved { .. }
            | Self::OrderCancelled { .. }
            | Self::PaymentConfirmed { .. }
            | Self::OrderShipped { .. }
            | Self::OrderDelivered { .. }
            | Self::OrderCompleted { .. }
            | Self::PayoutRequested { .. } => "order",
            Self::DisputeOpened { .. } | Self::DisputeEscalated { .. } => "dispute",
            Self::ReviewSubmitted { .. } => "review",
        }
    }
}

//! Fulfillment state machine
//!
//! The single source of truth for order status transitions. Every command
//! that moves an order calls [`apply`]; anything outside the table fails
//! with `InvalidStateTransition` and the caller must not mutate the order.
//!
//! ```text
//! PENDING_PAYMENT ─ConfirmPayment→ PAID_PENDING_SHIPMENT ─Ship→ SHIPPED
//!       │                                                          │
//!       └─Cancel→ CANCELLED                    ConfirmDelivery     │
//!                                                          ▼       │
//!                                 COMPLETED ←Complete─ DELIVERED ←─┘
//!
//! any non-terminal ─OpenDispute→ DISPUTED
//! ```

use super::error::MarketError;
use shared::models::OrderStatus;

/// Lifecycle actions an order can be subjected to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderAction {
    ConfirmPayment,
    Cancel,
    Ship,
    ConfirmDelivery,
    Complete,
    OpenDispute,
}

impl OrderAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ConfirmPayment => "confirm payment for",
            Self::Cancel => "cancel",
            Self::Ship => "ship",
            Self::ConfirmDelivery => "confirm delivery of",
            Self::Complete => "complete",
            Self::OpenDispute => "dispute",
        }
    }
}

/// The transition table; `None` means the transition is not allowed
pub fn next_status(from: OrderStatus, action: OrderAction) -> Option<OrderStatus> {
    use OrderStatus::*;
    match (from, action) {
        (PendingPayment, OrderAction::ConfirmPayment) => Some(PaidPendingShipment),
        (PendingPayment, OrderAction::Cancel) => Some(Cancelled),
        (PaidPendingShipment, OrderAction::Ship) => Some(Shipped),
        (Shipped, OrderAction::ConfirmDelivery) => Some(Delivered),
        // Buyer may confirm completion straight from SHIPPED
        (Shipped | Delivered, OrderAction::Complete) => Some(Completed),
        (
            PendingPayment | PaidPendingShipment | Shipped | Delivered,
            OrderAction::OpenDispute,
        ) => Some(Disputed),
        _ => None,
    }
}

/// Validate a transition, or fail without touching the order
pub fn apply(from: OrderStatus, action: OrderAction) -> Result<OrderStatus, MarketError> {
    next_status(from, action).ok_or(MarketError::InvalidStateTransition {
        from,
        action: action.name(),
    })
}

//! CancelOrder command handler
//!
//! Cancels an unpaid order (payment failure or an elapsed reservation
//! window) and releases the listing back to AVAILABLE if this order still
//! holds the reservation.

use async_trait::async_trait;

use crate::market::command::{Command, CommandMeta, TxnContext};
use crate::market::error::MarketError;
use crate::market::events::{CancelReason, MarketEvent};
use crate::market::transitions::{self, OrderAction};
use shared::models::{ListingStatus, PaymentStatus};

/// CancelOrder action
#[derive(Debug, Clone)]
pub struct CancelOrderAction {
    pub order_id: String,
    pub reason: CancelReason,
}

#[async_trait]
impl Command for CancelOrderAction {
    async fn execute(
        &self,
        ctx: &mut TxnContext<'_>,
        meta: &CommandMeta,
    ) -> Result<Vec<MarketEvent>, MarketError> {
        // 1. Load order and authorize
        let mut order = ctx.order(&self.order_id)?;
        if meta.caller_id != order.buyer_id && !meta.support {
            return Err(MarketError::Unauthorized(
                "Only the buyer can cancel this order".to_string(),
            ));
        }

        // 2. Only PENDING_PAYMENT orders can be cancelled
        order.status = transitions::apply(order.status, OrderAction::Cancel)?;
        if self.reason == CancelReason::PaymentFailed {
            order.payment_status = PaymentStatus::Failed;
        }
        ctx.put_order(&order)?;

        // 3. Release the listing, unless a later reservation or sale
        //    already took it over
        let mut listing = ctx.listing(&order.listing_id)?;
        if listing.status == ListingStatus::Reserved
            && listing.reserved_by_order.as_deref() == Some(order.id.as_str())
        {
            listing.status = ListingStatus::Available;
            listing.reserved_until = None;
            listing.reserved_by_order = None;
            ctx.put_listing(&listing)?;
        }

        Ok(vec![MarketEvent::OrderCancelled {
            order_id: order.id,
            listing_id: listing.id,
            reason: self.reason,
        }])
    }
}

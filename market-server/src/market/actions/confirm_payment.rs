//! ConfirmPayment command handler
//!
//! Consumes the external payment collaborator's confirmation: moves the
//! order to PAID_PENDING_SHIPMENT and flips the listing to SOLD in the
//! same transaction.

use async_trait::async_trait;

use crate::market::command::{Command, CommandMeta, TxnContext};
use crate::market::error::MarketError;
use crate::market::events::MarketEvent;
use crate::market::transitions::{self, OrderAction};
use shared::models::{ListingStatus, PaymentStatus};

/// ConfirmPayment action
#[derive(Debug, Clone)]
pub struct ConfirmPaymentAction {
    pub order_id: String,
}

#[async_trait]
impl Command for ConfirmPaymentAction {
    async fn execute(
        &self,
        ctx: &mut TxnContext<'_>,
        meta: &CommandMeta,
    ) -> Result<Vec<MarketEvent>, MarketError> {
        // 1. Load order and authorize: the paying buyer or support
        let mut order = ctx.order(&self.order_id)?;
        if meta.caller_id != order.buyer_id && !meta.support {
            return Err(MarketError::Unauthorized(
                "Only the buyer can report payment for this order".to_string(),
            ));
        }

        // 2. Validate the transition before touching anything
        order.status = transitions::apply(order.status, OrderAction::ConfirmPayment)?;
        order.payment_status = PaymentStatus::Paid;
        ctx.put_order(&order)?;

        // 3. The sale is final: listing becomes SOLD in the same
        //    transaction as the order update
        let mut listing = ctx.listing(&order.listing_id)?;
        listing.status = ListingStatus::Sold;
        listing.reserved_until = None;
        listing.reserved_by_order = None;
        ctx.put_listing(&listing)?;

        Ok(vec![MarketEvent::PaymentConfirmed {
            order_id: order.id,
            listing_id: listing.id,
        }])
    }
}

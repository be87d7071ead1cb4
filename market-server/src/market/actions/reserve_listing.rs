//! ReserveListing command handler
//!
//! Converts a buyer's purchase intent into a reserved listing plus a
//! pending order, atomically. Two racing reservations on the same listing
//! serialize on the write transaction; the loser observes the winner's
//! reservation and fails with `AlreadyReserved`.

use async_trait::async_trait;

use crate::market::command::{Command, CommandMeta, TxnContext};
use crate::market::error::MarketError;
use crate::market::events::{CancelReason, MarketEvent};
use shared::models::{
    DeliveryMethod, ListingStatus, Order, OrderDraft, OrderStatus, PaymentStatus,
};

/// Fixed reservation window: 30 minutes
pub const RESERVATION_WINDOW_MS: i64 = 30 * 60 * 1000;

/// ReserveListing action
#[derive(Debug, Clone)]
pub struct ReserveListingAction {
    pub listing_id: String,
    /// Pre-generated id of the order to create
    pub order_id: String,
    pub draft: OrderDraft,
}

#[async_trait]
impl Command for ReserveListingAction {
    async fn execute(
        &self,
        ctx: &mut TxnContext<'_>,
        meta: &CommandMeta,
    ) -> Result<Vec<MarketEvent>, MarketError> {
        let mut events = Vec::new();

        // 1. Load the listing
        let mut listing = ctx.listing(&self.listing_id)?;

        // 2. Reject sold listings outright
        if listing.status == ListingStatus::Sold {
            return Err(MarketError::AlreadySold(self.listing_id.clone()));
        }

        // 3. A live reservation blocks the attempt; an expired one is
        //    lazily cancelled here, in the same transaction
        if listing.status == ListingStatus::Reserved {
            if listing.has_live_reservation(meta.timestamp) {
                return Err(MarketError::AlreadyReserved(self.listing_id.clone()));
            }
            if let Some(stale_order_id) = listing.reserved_by_order.take()
                && let Some(mut stale) = ctx.try_order(&stale_order_id)?
                && stale.status == OrderStatus::PendingPayment
            {
                stale.status = OrderStatus::Cancelled;
                ctx.put_order(&stale)?;
                events.push(MarketEvent::OrderCancelled {
                    order_id: stale.id,
                    listing_id: listing.id.clone(),
                    reason: CancelReason::ReservationExpired,
                });
            }
        }

        // 4. Validate the draft
        if meta.caller_id == listing.seller_id {
            return Err(MarketError::Validation(
                "Sellers cannot reserve their own listing".to_string(),
            ));
        }
        match self.draft.delivery_method {
            DeliveryMethod::Domicile if self.draft.shipping_address.is_none() => {
                return Err(MarketError::Validation(
                    "Home delivery requires a shipping address".to_string(),
                ));
            }
            DeliveryMethod::Pickup if self.draft.shipping_address.is_some() => {
                return Err(MarketError::Validation(
                    "Pickup orders must not carry a shipping address".to_string(),
                ));
            }
            _ => {}
        }

        // 5. Create the order with its display snapshot frozen from the
        //    listing
        let order = Order {
            id: self.order_id.clone(),
            listing_id: listing.id.clone(),
            seller_id: listing.seller_id.clone(),
            buyer_id: meta.caller_id.clone(),
            title: listing.title.clone(),
            image_url: listing.image_urls.first().cloned(),
            price_paid: listing.price,
            status: OrderStatus::PendingPayment,
            payment_status: PaymentStatus::Pending,
            delivery_method: self.draft.delivery_method,
            shipping_address: self.draft.shipping_address.clone(),
            tracking_number: None,
            created_at: meta.timestamp,
            shipped_at: None,
            delivered_at: None,
            buyer_confirmed_at: None,
            buyer_review_left: false,
        };
        ctx.put_order(&order)?;

        // 6. Reserve the listing for this order
        listing.status = ListingStatus::Reserved;
        listing.reserved_until = Some(meta.timestamp + RESERVATION_WINDOW_MS);
        listing.reserved_by_order = Some(order.id.clone());
        ctx.put_listing(&listing)?;

        events.push(MarketEvent::OrderReserved {
            order_id: order.id,
            listing_id: listing.id,
            buyer_id: meta.caller_id.clone(),
            seller_id: listing.seller_id,
        });
        Ok(events)
    }
}

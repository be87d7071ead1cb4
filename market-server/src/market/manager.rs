//! MarketManager - command execution and event broadcasting
//!
//! # Command Flow
//!
//! ```text
//! execute(command)
//!     ├─ 1. Begin write transaction (single writer)
//!     ├─ 2. Run command against TxnContext
//!     ├─ 3. Commit (abort on any command error)
//!     ├─ 4. Broadcast event(s), best-effort
//!     └─ 5. Return
//! ```
//!
//! The plain CRUD surface (publish, boost, reads) lives here too; only the
//! lifecycle mutations go through the command pattern.

use std::path::Path;

use tokio::sync::broadcast;
use uuid::Uuid;

use super::actions::{
    CancelOrderAction, CompleteOrderAction, ConfirmDeliveryAction, ConfirmPaymentAction,
    EscalateDisputeAction, OpenDisputeAction, ReserveListingAction, ShipOrderAction,
    SubmitReviewAction,
};
use super::command::{Command, CommandMeta, TxnContext};
use super::error::{MarketError, MarketResult};
use super::events::{CancelReason, MarketEvent};
use super::storage::{MarketStorage, StorageError};
use shared::models::{
    BoostType, Dispute, DisputeReason, Listing, ListingDraft, ListingStatus, Order, OrderDraft,
    SellerRating,
};

/// Event broadcast channel capacity
const EVENT_CHANNEL_CAPACITY: usize = 4096;

/// Marketplace engine: owns the document store and the event channel
pub struct MarketManager {
    storage: MarketStorage,
    event_tx: broadcast::Sender<MarketEvent>,
}

impl std::fmt::Debug for MarketManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketManager")
            .field("storage", &"<MarketStorage>")
            .field("event_tx", &"<broadcast::Sender>")
            .finish()
    }
}

impl MarketManager {
    /// Create a manager with the given database path
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let storage = MarketStorage::open(db_path)?;
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        tracing::info!("Marketplace engine started");
        Ok(Self { storage, event_tx })
    }

    /// Create a manager with existing storage (for testing)
    #[cfg(test)]
    pub fn with_storage(storage: MarketStorage) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { storage, event_tx }
    }

    /// Subscribe to post-commit events
    pub fn subscribe(&self) -> broadcast::Receiver<MarketEvent> {
        self.event_tx.subscribe()
    }

    /// Run one command inside one write transaction
    async fn run<C: Command>(
        &self,
        command: C,
        meta: &CommandMeta,
    ) -> MarketResult<Vec<MarketEvent>> {
        let txn = self.storage.begin_write()?;
        let mut ctx = TxnContext::new(&txn);
        // An error drops the transaction uncommitted: no partial state
        let events = command.execute(&mut ctx, meta).await?;
        txn.commit().map_err(StorageError::from)?;

        self.broadcast(&events);
        Ok(events)
    }

    /// Best-effort fan-out; a send failure never affects committed state
    fn broadcast(&self, events: &[MarketEvent]) {
        for event in events {
            tracing::debug!(kind = event.kind(), "event committed");
            let _ = self.event_tx.send(event.clone());
        }
    }

    // ========== Lifecycle commands ==========

    /// Atomically reserve a listing and create the pending order
    pub async fn reserve_listing(
        &self,
        listing_id: &str,
        draft: OrderDraft,
        meta: &CommandMeta,
    ) -> MarketResult<String> {
        let order_id = Uuid::new_v4().to_string();
        self.run(
            ReserveListingAction {
                listing_id: listing_id.to_string(),
                order_id: order_id.clone(),
                draft,
            },
            meta,
        )
        .await?;
        Ok(order_id)
    }

    /// Consume the payment collaborator's confirmation
    pub async fn confirm_payment(&self, order_id: &str, meta: &CommandMeta) -> MarketResult<()> {
        self.run(
            ConfirmPaymentAction {
                order_id: order_id.to_string(),
            },
            meta,
        )
        .await?;
        Ok(())
    }

    /// Cancel an unpaid order and release its reservation
    pub async fn cancel_order(
        &self,
        order_id: &str,
        reason: CancelReason,
        meta: &CommandMeta,
    ) -> MarketResult<()> {
        self.run(
            CancelOrderAction {
                order_id: order_id.to_string(),
                reason,
            },
            meta,
        )
        .await?;
        Ok(())
    }

    /// Seller marks the order shipped with a tracking number
    pub async fn ship_order(
        &self,
        order_id: &str,
        tracking_number: &str,
        meta: &CommandMeta,
    ) -> MarketResult<()> {
        self.run(
            ShipOrderAction {
                order_id: order_id.to_string(),
                tracking_number: tracking_number.to_string(),
            },
            meta,
        )
        .await?;
        Ok(())
    }

    /// Buyer confirms receipt
    pub async fn confirm_delivery(&self, order_id: &str, meta: &CommandMeta) -> MarketResult<()> {
        self.run(
            ConfirmDeliveryAction {
                order_id: order_id.to_string(),
            },
            meta,
        )
        .await?;
        Ok(())
    }

    /// Buyer confirms completion, releasing the payout signal
    pub async fn complete_order(&self, order_id: &str, meta: &CommandMeta) -> MarketResult<()> {
        self.run(
            CompleteOrderAction {
                order_id: order_id.to_string(),
            },
            meta,
        )
        .await?;
        Ok(())
    }

    /// Transactional tail of the dispute flow; evidence must already be
    /// uploaded (see `DisputeService`)
    pub async fn open_dispute(
        &self,
        order_id: &str,
        reason: DisputeReason,
        description: &str,
        evidence_urls: Vec<String>,
        meta: &CommandMeta,
    ) -> MarketResult<String> {
        let dispute_id = Uuid::new_v4().to_string();
        self.run(
            OpenDisputeAction {
                dispute_id: dispute_id.clone(),
                order_id: order_id.to_string(),
                reason,
                description: description.to_string(),
                evidence_urls,
            },
            meta,
        )
        .await?;
        Ok(dispute_id)
    }

    /// Escalate a dispute to human support (idempotent)
    pub async fn escalate_dispute(&self, dispute_id: &str, meta: &CommandMeta) -> MarketResult<()> {
        self.run(
            EscalateDisputeAction {
                dispute_id: dispute_id.to_string(),
            },
            meta,
        )
        .await?;
        Ok(())
    }

    /// Submit the buyer's review and update the seller aggregate
    pub async fn submit_review(
        &self,
        order_id: &str,
        rating: u8,
        comment: &str,
        meta: &CommandMeta,
    ) -> MarketResult<String> {
        let review_id = Uuid::new_v4().to_string();
        self.run(
            SubmitReviewAction {
                review_id: review_id.clone(),
                order_id: order_id.to_string(),
                rating,
                comment: comment.to_string(),
            },
            meta,
        )
        .await?;
        Ok(review_id)
    }

    // ========== Listing CRUD ==========

    /// Publish a new listing for the caller
    pub fn publish_listing(
        &self,
        draft: ListingDraft,
        meta: &CommandMeta,
    ) -> MarketResult<Listing> {
        if draft.title.trim().is_empty() {
            return Err(MarketError::Validation("Title must not be empty".to_string()));
        }
        if !draft.price.is_finite() || draft.price <= 0.0 {
            return Err(MarketError::Validation(
                "Price must be a positive amount".to_string(),
            ));
        }

        let listing = Listing {
            id: Uuid::new_v4().to_string(),
            seller_id: meta.caller_id.clone(),
            title: draft.title.trim().to_string(),
            description: draft.description,
            price: draft.price,
            condition: draft.condition,
            category: draft.category,
            postal_code: draft.postal_code,
            image_urls: draft.image_urls,
            status: ListingStatus::Available,
            reserved_until: None,
            reserved_by_order: None,
            is_boosted: false,
            boost_type: None,
            boost_ends: None,
            created_at: meta.timestamp,
        };

        let txn = self.storage.begin_write()?;
        TxnContext::new(&txn).put_listing(&listing)?;
        txn.commit().map_err(StorageError::from)?;

        self.broadcast(&[MarketEvent::ListingPublished {
            listing_id: listing.id.clone(),
            seller_id: listing.seller_id.clone(),
        }]);
        Ok(listing)
    }

    /// Purchase a visibility boost for an owned, unsold listing
    pub fn boost_listing(
        &self,
        listing_id: &str,
        boost_type: BoostType,
        duration_ms: i64,
        meta: &CommandMeta,
    ) -> MarketResult<Listing> {
        if duration_ms <= 0 {
            return Err(MarketError::Validation(
                "Boost duration must be positive".to_string(),
            ));
        }

        let txn = self.storage.begin_write()?;
        let ctx = TxnContext::new(&txn);
        let mut listing = ctx.listing(listing_id)?;
        if listing.seller_id != meta.caller_id {
            return Err(MarketError::Unauthorized(
                "Only the owner can boost a listing".to_string(),
            ));
        }
        if listing.status == ListingStatus::Sold {
            return Err(MarketError::Validation(
                "Sold listings cannot be boosted".to_string(),
            ));
        }

        listing.is_boosted = true;
        listing.boost_type = Some(boost_type);
        listing.boost_ends = Some(meta.timestamp + duration_ms);
        ctx.put_listing(&listing)?;
        txn.commit().map_err(StorageError::from)?;

        self.broadcast(&[MarketEvent::ListingBoosted {
            listing_id: listing.id.clone(),
            boost_type,
        }]);
        Ok(listing)
    }

    // ========== Reads ==========

    pub fn get_listing(&self, id: &str) -> MarketResult<Listing> {
        self.storage
            .get_listing(id)?
            .ok_or_else(|| MarketError::ListingNotFound(id.to_string()))
    }

    pub fn get_order(&self, id: &str) -> MarketResult<Order> {
        self.storage
            .get_order(id)?
            .ok_or_else(|| MarketError::OrderNotFound(id.to_string()))
    }

    pub fn get_dispute(&self, id: &str) -> MarketResult<Dispute> {
        self.storage
            .get_dispute(id)?
            .ok_or_else(|| MarketError::DisputeNotFound(id.to_string()))
    }

    pub fn seller_rating(&self, seller_id: &str) -> MarketResult<SellerRating> {
        Ok(self.storage.get_seller_rating(seller_id)?)
    }
}

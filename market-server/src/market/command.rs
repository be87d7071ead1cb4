//! Command execution context
//!
//! Every lifecycle operation is a [`Command`] executed by the manager
//! inside one redb write transaction. [`TxnContext`] is the command's view
//! of that transaction; [`CommandMeta`] carries the authenticated caller
//! and the request timestamp. Current time is injected through the
//! metadata and never read inside a command, so reservation-expiry logic
//! is deterministic under test.

use async_trait::async_trait;
use redb::{ReadableTable, WriteTransaction};
use shared::models::{Dispute, Listing, Order, Review, SellerRating};

use super::error::MarketError;
use super::events::MarketEvent;
use super::storage::{
    self, DISPUTES_TABLE, DISPUTE_BY_ORDER_TABLE, LISTINGS_TABLE, ORDERS_TABLE, REVIEWS_TABLE,
    REVIEW_BY_ORDER_TABLE, SELLER_RATINGS_TABLE,
};

/// Request metadata attached to every command
#[derive(Debug, Clone)]
pub struct CommandMeta {
    /// Authenticated caller id (from the identity boundary)
    pub caller_id: String,
    /// Whether the caller holds the support role
    pub support: bool,
    /// Request time, Unix millis
    pub timestamp: i64,
}

impl CommandMeta {
    /// Metadata for an ordinary marketplace user
    pub fn user(caller_id: impl Into<String>, timestamp: i64) -> Self {
        Self {
            caller_id: caller_id.into(),
            support: false,
            timestamp,
        }
    }

    /// Metadata for a support operator
    pub fn support(caller_id: impl Into<String>, timestamp: i64) -> Self {
        Self {
            caller_id: caller_id.into(),
            support: true,
            timestamp,
        }
    }
}

/// A command's view of the single write transaction it runs in
pub struct TxnContext<'a> {
    txn: &'a WriteTransaction,
}

impl<'a> TxnContext<'a> {
    pub fn new(txn: &'a WriteTransaction) -> Self {
        Self { txn }
    }

    // ========== Listings ==========

    pub fn listing(&self, id: &str) -> Result<Listing, MarketError> {
        storage::get_doc(self.txn, LISTINGS_TABLE, id)?
            .ok_or_else(|| MarketError::ListingNotFound(id.to_string()))
    }

    pub fn put_listing(&self, listing: &Listing) -> Result<(), MarketError> {
        storage::put_doc(self.txn, LISTINGS_TABLE, &listing.id, listing)?;
        Ok(())
    }

    // ========== Orders ==========

    pub fn order(&self, id: &str) -> Result<Order, MarketError> {
        storage::get_doc(self.txn, ORDERS_TABLE, id)?
            .ok_or_else(|| MarketError::OrderNotFound(id.to_string()))
    }

    pub fn try_order(&self, id: &str) -> Result<Option<Order>, MarketError> {
        Ok(storage::get_doc(self.txn, ORDERS_TABLE, id)?)
    }

    pub fn put_order(&self, order: &Order) -> Result<(), MarketError> {
        storage::put_doc(self.txn, ORDERS_TABLE, &order.id, order)?;
        Ok(())
    }

    // ========== Disputes ==========

    pub fn dispute(&self, id: &str) -> Result<Dispute, MarketError> {
        storage::get_doc(self.txn, DISPUTES_TABLE, id)?
            .ok_or_else(|| MarketError::DisputeNotFound(id.to_string()))
    }

    pub fn put_dispute(&self, dispute: &Dispute) -> Result<(), MarketError> {
        storage::put_doc(self.txn, DISPUTES_TABLE, &dispute.id, dispute)?;
        Ok(())
    }

    /// Look up the dispute already opened for an order, if any
    pub fn dispute_for_order(&self, order_id: &str) -> Result<Option<String>, MarketError> {
        let table = self
            .txn
            .open_table(DISPUTE_BY_ORDER_TABLE)
            .map_err(storage::StorageError::from)?;
        let found = table
            .get(order_id)
            .map_err(storage::StorageError::from)?
            .map(|guard| guard.value().to_string());
        Ok(found)
    }

    /// Record the one-dispute-per-order index entry
    pub fn index_dispute(&self, order_id: &str, dispute_id: &str) -> Result<(), MarketError> {
        let mut table = self
            .txn
            .open_table(DISPUTE_BY_ORDER_TABLE)
            .map_err(storage::StorageError::from)?;
        table
            .insert(order_id, dispute_id)
            .map_err(storage::StorageError::from)?;
        Ok(())
    }

    // ========== Reviews ==========

    pub fn put_review(&self, review: &Review) -> Result<(), MarketError> {
        storage::put_doc(self.txn, REVIEWS_TABLE, &review.id, review)?;
        Ok(())
    }

    /// Look up the review already left for an order, if any
    pub fn review_for_order(&self, order_id: &str) -> Result<Option<String>, MarketError> {
        let table = self
            .txn
            .open_table(REVIEW_BY_ORDER_TABLE)
            .map_err(storage::StorageError::from)?;
        let found = table
            .get(order_id)
            .map_err(storage::StorageError::from)?
            .map(|guard| guard.value().to_string());
        Ok(found)
    }

    /// Record the one-review-per-order index entry
    pub fn index_review(&self, order_id: &str, review_id: &str) -> Result<(), MarketError> {
        let mut table = self
            .txn
            .open_table(REVIEW_BY_ORDER_TABLE)
            .map_err(storage::StorageError::from)?;
        table
            .insert(order_id, review_id)
            .map_err(storage::StorageError::from)?;
        Ok(())
    }

    // ========== Seller rating aggregate ==========

    /// Current aggregate; sellers with no reviews get the zero aggregate
    pub fn seller_rating(&self, seller_id: &str) -> Result<SellerRating, MarketError> {
        Ok(storage::get_doc(self.txn, SELLER_RATINGS_TABLE, seller_id)?.unwrap_or_default())
    }

    pub fn put_seller_rating(
        &self,
        seller_id: &str,
        aggregate: &SellerRating,
    ) -> Result<(), MarketError> {
        storage::put_doc(self.txn, SELLER_RATINGS_TABLE, seller_id, aggregate)?;
        Ok(())
    }
}

/// A marketplace lifecycle command
///
/// `execute` reads and mutates documents through the context and returns
/// the events to broadcast once the transaction commits. Returning an
/// error aborts the transaction; no partial state survives.
#[async_trait]
pub trait Command {
    async fn execute(
        &self,
        ctx: &mut TxnContext<'_>,
        meta: &CommandMeta,
    ) -> Result<Vec<MarketEvent>, MarketError>;
}

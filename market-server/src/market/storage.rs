//! redb-based storage layer for marketplace documents
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `listings` | `listing_id` | `Listing` | Sellable items |
//! | `orders` | `order_id` | `Order` | One record per transaction attempt |
//! | `disputes` | `dispute_id` | `Dispute` | Buyer disputes |
//! | `reviews` | `review_id` | `Review` | Immutable reviews |
//! | `seller_ratings` | `seller_id` | `SellerRating` | Derived rating aggregate |
//! | `dispute_by_order` | `order_id` | `dispute_id` | One-dispute-per-order index |
//! | `review_by_order` | `order_id` | `review_id` | One-review-per-order index |
//!
//! # Isolation
//!
//! redb write transactions are single-writer: every lifecycle command runs
//! its read-check-write sequence inside exactly one write transaction, so
//! two racing reservations (or review submissions) serialize and the loser
//! observes the winner's committed state.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::models::{Dispute, Listing, Order, Review, SellerRating};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Documents, JSON-serialized
pub(crate) const LISTINGS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("listings");
pub(crate) const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");
pub(crate) const DISPUTES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("disputes");
pub(crate) const REVIEWS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("reviews");
pub(crate) const SELLER_RATINGS_TABLE: TableDefinition<&str, &[u8]> =
    TableDefinition::new("seller_ratings");

/// Uniqueness indexes: key = order_id, value = owning document id
pub(crate) const DISPUTE_BY_ORDER_TABLE: TableDefinition<&str, &str> =
    TableDefinition::new("dispute_by_order");
pub(crate) const REVIEW_BY_ORDER_TABLE: TableDefinition<&str, &str> =
    TableDefinition::new("review_by_order");

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Marketplace document store backed by redb
///
/// Commits are durable as soon as `commit()` returns; the database file is
/// always in a consistent state, so a crash mid-operation leaves no partial
/// record.
#[derive(Clone)]
pub struct MarketStorage {
    db: Arc<Database>,
}

impl MarketStorage {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        let storage = Self { db: Arc::new(db) };
        storage.init_tables()?;
        Ok(storage)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        let storage = Self { db: Arc::new(db) };
        storage.init_tables()?;
        Ok(storage)
    }

    fn init_tables(&self) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let _ = write_txn.open_table(LISTINGS_TABLE)?;
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(DISPUTES_TABLE)?;
            let _ = write_txn.open_table(REVIEWS_TABLE)?;
            let _ = write_txn.open_table(SELLER_RATINGS_TABLE)?;
            let _ = write_txn.open_table(DISPUTE_BY_ORDER_TABLE)?;
            let _ = write_txn.open_table(REVIEW_BY_ORDER_TABLE)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Begin the single-writer transaction every command runs inside
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    fn read_doc<T: DeserializeOwned>(
        &self,
        def: TableDefinition<&'static str, &'static [u8]>,
        id: &str,
    ) -> StorageResult<Option<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(def)?;
        match table.get(id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Read a listing outside any write transaction
    pub fn get_listing(&self, id: &str) -> StorageResult<Option<Listing>> {
        self.read_doc(LISTINGS_TABLE, id)
    }

    /// Read an order outside any write transaction
    pub fn get_order(&self, id: &str) -> StorageResult<Option<Order>> {
        self.read_doc(ORDERS_TABLE, id)
    }

    /// Read a dispute outside any write transaction
    pub fn get_dispute(&self, id: &str) -> StorageResult<Option<Dispute>> {
        self.read_doc(DISPUTES_TABLE, id)
    }

    /// Read a review outside any write transaction
    pub fn get_review(&self, id: &str) -> StorageResult<Option<Review>> {
        self.read_doc(REVIEWS_TABLE, id)
    }

    /// Read a seller's rating aggregate; sellers with no reviews yet get
    /// the zero aggregate
    pub fn get_seller_rating(&self, seller_id: &str) -> StorageResult<SellerRating> {
        Ok(self
            .read_doc(SELLER_RATINGS_TABLE, seller_id)?
            .unwrap_or_default())
    }
}

/// Serialize a document into a redb document table within a write transaction
pub(crate) fn put_doc<T: Serialize>(
    txn: &WriteTransaction,
    def: TableDefinition<&'static str, &'static [u8]>,
    id: &str,
    value: &T,
) -> StorageResult<()> {
    let bytes = serde_json::to_vec(value)?;
    let mut table = txn.open_table(def)?;
    table.insert(id, bytes.as_slice())?;
    Ok(())
}

/// Read a document from a redb document table within a write transaction
pub(crate) fn get_doc<T: DeserializeOwned>(
    txn: &WriteTransaction,
    def: TableDefinition<&'static str, &'static [u8]>,
    id: &str,
) -> StorageResult<Option<T>> {
    let table = txn.open_table(def)?;
    match table.get(id)? {
        Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
        None => Ok(None),
    }
}

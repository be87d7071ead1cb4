//! Engine error taxonomy
//!
//! Precondition failures are expected business outcomes and map to 4xx
//! responses; `Storage` is the only internal failure and maps to 500.

use super::storage::StorageError;
use shared::AppError;
use shared::models::OrderStatus;
use thiserror::Error;

/// Errors produced by marketplace commands
#[derive(Debug, Error)]
pub enum MarketError {
    #[error("Listing not found: {0}")]
    ListingNotFound(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Dispute not found: {0}")]
    DisputeNotFound(String),

    #[error("Listing already sold: {0}")]
    AlreadySold(String),

    #[error("Listing already reserved: {0}")]
    AlreadyReserved(String),

    #[error("Cannot {action} an order in {from:?} status")]
    InvalidStateTransition {
        from: OrderStatus,
        action: &'static str,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Order not disputable: {0}")]
    OrderNotDisputable(String),

    #[error("Evidence upload failed: {0}")]
    UploadFailed(String),

    #[error("Order already reviewed: {0}")]
    AlreadyReviewed(String),

    #[error("Invalid rating: {0} (must be 1-5)")]
    InvalidRating(u8),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type MarketResult<T> = Result<T, MarketError>;

impl From<MarketError> for AppError {
    fn from(err: MarketError) -> Self {
        match err {
            MarketError::ListingNotFound(_) => AppError::not_found("Listing"),
            MarketError::OrderNotFound(_) => AppError::not_found("Order"),
            MarketError::DisputeNotFound(_) => AppError::not_found("Dispute"),
            MarketError::AlreadySold(_) | MarketError::AlreadyReserved(_) => {
                AppError::conflict("This item is no longer available")
            }
            MarketError::InvalidStateTransition { .. } => {
                AppError::business_rule("Action unavailable")
            }
            MarketError::Unauthorized(message) => AppError::forbidden(message),
            MarketError::OrderNotDisputable(_) => {
                AppError::business_rule("This order can no longer be disputed")
            }
            MarketError::UploadFailed(_) => {
                AppError::internal("Evidence upload failed, please retry")
            }
            MarketError::AlreadyReviewed(_) => {
                AppError::conflict("You've already reviewed this order")
            }
            MarketError::InvalidRating(_) => {
                AppError::validation("Rating must be an integer between 1 and 5")
            }
            MarketError::Validation(message) => AppError::validation(message),
            MarketError::Storage(e) => AppError::storage(e.to_string()),
        }
    }
}

//! SubmitReview command handler
//!
//! Writes the review and folds it into the seller's rating aggregate in
//! one transaction. The `buyer_review_left` flag is checked and set inside
//! the same transaction, so a double-submit race cannot produce two
//! reviews or a skewed average.

use async_trait::async_trait;

use crate::market::command::{Command, CommandMeta, TxnContext};
use crate::market::error::MarketError;
use crate::market::events::MarketEvent;
use crate::market::money;
use shared::models::{Review, SellerRating};

/// SubmitReview action
#[derive(Debug, Clone)]
pub struct SubmitReviewAction {
    /// Pre-generated id of the review to create
    pub review_id: String,
    pub order_id: String,
    pub rating: u8,
    pub comment: String,
}

#[async_trait]
impl Command for SubmitReviewAction {
    async fn execute(
        &self,
        ctx: &mut TxnContext<'_>,
        meta: &CommandMeta,
    ) -> Result<Vec<MarketEvent>, MarketError> {
        // 1. Rating bounds first, before any reads
        if !(1..=5).contains(&self.rating) {
            return Err(MarketError::InvalidRating(self.rating));
        }

        // 2. Load order, authorize the buyer
        let mut order = ctx.order(&self.order_id)?;
        if meta.caller_id != order.buyer_id {
            return Err(MarketError::Unauthorized(
                "Only the buyer can review this order".to_string(),
            ));
        }

        // 3. One review per order; flag and index are both checked inside
        //    the transaction
        if order.buyer_review_left || ctx.review_for_order(&self.order_id)?.is_some() {
            return Err(MarketError::AlreadyReviewed(self.order_id.clone()));
        }

        // 4. Fold the rating into the seller aggregate
        let target = order.seller_id.clone();
        let current = ctx.seller_rating(&target)?;
        let aggregate = SellerRating {
            rating: money::updated_average(current.rating, current.review_count, self.rating),
            review_count: current.review_count + 1,
        };
        ctx.put_seller_rating(&target, &aggregate)?;

        // 5. Write review + index, mark the order reviewed
        let review = Review {
            id: self.review_id.clone(),
            order_id: order.id.clone(),
            source_user_id: order.buyer_id.clone(),
            target_user_id: target.clone(),
            rating: self.rating,
            comment: self.comment.clone(),
            created_at: meta.timestamp,
        };
        ctx.put_review(&review)?;
        ctx.index_review(&order.id, &review.id)?;
        order.buyer_review_left = true;
        ctx.put_order(&order)?;

        Ok(vec![MarketEvent::ReviewSubmitted {
            review_id: review.id,
            target_user_id: target,
            rating: aggregate.rating,
            review_count: aggregate.review_count,
        }])
    }
}

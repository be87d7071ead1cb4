//! OpenDispute command handler
//!
//! Transactional tail of the dispute flow: evidence has already been
//! uploaded by the dispute service, so this command only writes the
//! Dispute document, the one-dispute-per-order index and the order status,
//! all inside one transaction.

use async_trait::async_trait;

use crate::market::command::{Command, CommandMeta, TxnContext};
use crate::market::error::MarketError;
use crate::market::events::MarketEvent;
use crate::market::transitions::{self, OrderAction};
use shared::models::{Dispute, DisputeReason, DisputeStatus};

/// OpenDispute action
#[derive(Debug, Clone)]
pub struct OpenDisputeAction {
    /// Pre-generated id of the dispute to create
    pub dispute_id: String,
    pub order_id: String,
    pub reason: DisputeReason,
    pub description: String,
    /// Stable URLs of the already-uploaded evidence images
    pub evidence_urls: Vec<String>,
}

#[async_trait]
impl Command for OpenDisputeAction {
    async fn execute(
        &self,
        ctx: &mut TxnContext<'_>,
        meta: &CommandMeta,
    ) -> Result<Vec<MarketEvent>, MarketError> {
        // 1. Load order and authorize the buyer
        let mut order = ctx.order(&self.order_id)?;
        if meta.caller_id != order.buyer_id {
            return Err(MarketError::Unauthorized(
                "Only the buyer can dispute this order".to_string(),
            ));
        }

        // 2. One dispute per order; terminal orders are not disputable.
        //    Both conditions surface as OrderNotDisputable.
        if ctx.dispute_for_order(&self.order_id)?.is_some() {
            return Err(MarketError::OrderNotDisputable(
                "a dispute is already open for this order".to_string(),
            ));
        }
        order.status = transitions::next_status(order.status, OrderAction::OpenDispute)
            .ok_or_else(|| {
                MarketError::OrderNotDisputable(format!(
                    "order is {:?}",
                    order.status
                ))
            })?;

        // 3. Write dispute + index + frozen order together
        let dispute = Dispute {
            id: self.dispute_id.clone(),
            order_id: order.id.clone(),
            listing_id: order.listing_id.clone(),
            buyer_id: order.buyer_id.clone(),
            seller_id: order.seller_id.clone(),
            reason: self.reason,
            description: self.description.clone(),
            evidence_urls: self.evidence_urls.clone(),
            status: DisputeStatus::Open,
            created_at: meta.timestamp,
            escalated_at: None,
        };
        ctx.put_dispute(&dispute)?;
        ctx.index_dispute(&order.id, &dispute.id)?;
        ctx.put_order(&order)?;

        Ok(vec![MarketEvent::DisputeOpened {
            dispute_id: dispute.id,
            order_id: order.id,
            seller_id: order.seller_id,
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::actions::CompleteOrderAction;
    use crate::market::storage::MarketStorage;
    use crate::market::testutil::{NOW, reserve_fixture, shipped_fixture};
    use shared::models::OrderStatus;

    fn open(dispute_id: &str, order_id: &str) -> OpenDisputeAction {
        OpenDisputeAction {
            dispute_id: dispute_id.to_string(),
            order_id: order_id.to_string(),
            reason: DisputeReason::NotAsDescribed,
            description: "Frame is cracked".to_string(),
            evidence_urls: vec!["https://storage.example/ev1.jpg".to_string()],
        }
    }

    #[tokio::test]
    async fn test_open_dispute_freezes_order() {
        let storage = MarketStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let mut ctx = TxnContext::new(&txn);
        shipped_fixture(&mut ctx, "listing-1", "order-1", "buyer-1").await;

        let events = open("dispute-1", "order-1")
            .execute(&mut ctx, &CommandMeta::user("buyer-1", NOW + 500_000))
            .await
            .unwrap();

        assert!(matches!(events[0], MarketEvent::DisputeOpened { .. }));

        let order = ctx.order("order-1").unwrap();
        assert_eq!(order.status, OrderStatus::Disputed);

        let dispute = ctx.dispute("dispute-1").unwrap();
        assert_eq!(dispute.status, DisputeStatus::Open);
        assert_eq!(dispute.order_id, "order-1");
        assert_eq!(dispute.buyer_id, "buyer-1");
        assert_eq!(dispute.seller_id, "seller-1");
        assert_eq!(dispute.evidence_urls.len(), 1);
        assert_eq!(dispute.created_at, NOW + 500_000);
        assert_eq!(
            ctx.dispute_for_order("order-1").unwrap().as_deref(),
            Some("dispute-1")
        );
    }

    #[tokio::test]
    async fn test_second_dispute_rejected() {
        let storage = MarketStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let mut ctx = TxnContext::new(&txn);
        shipped_fixture(&mut ctx, "listing-1", "order-1", "buyer-1").await;

        let meta = CommandMeta::user("buyer-1", NOW + 500_000);
        open("dispute-1", "order-1")
            .execute(&mut ctx, &meta)
            .await
            .unwrap();

        let result = open("dispute-2", "order-1").execute(&mut ctx, &meta).await;
        assert!(matches!(result, Err(MarketError::OrderNotDisputable(_))));
    }

    #[tokio::test]
    async fn test_dispute_pending_payment_order_is_allowed() {
        let storage = MarketStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let mut ctx = TxnContext::new(&txn);
        reserve_fixture(&mut ctx, "listing-1", "order-1", "buyer-1").await;

        let result = open("dispute-1", "order-1")
            .execute(&mut ctx, &CommandMeta::user("buyer-1", NOW + 500_000))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_completed_order_not_disputable() {
        let storage = MarketStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let mut ctx = TxnContext::new(&txn);
        shipped_fixture(&mut ctx, "listing-1", "order-1", "buyer-1").await;

        CompleteOrderAction {
            order_id: "order-1".to_string(),
        }
        .execute(&mut ctx, &CommandMeta::user("buyer-1", NOW + 400_000))
        .await
        .unwrap();

        let result = open("dispute-1", "order-1")
            .execute(&mut ctx, &CommandMeta::user("buyer-1", NOW + 500_000))
            .await;
        assert!(matches!(result, Err(MarketError::OrderNotDisputable(_))));
    }

    #[tokio::test]
    async fn test_seller_cannot_open_dispute() {
        let storage = MarketStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let mut ctx = TxnContext::new(&txn);
        shipped_fixture(&mut ctx, "listing-1", "order-1", "buyer-1").await;

        let result = open("dispute-1", "order-1")
            .execute(&mut ctx, &CommandMeta::user("seller-1", NOW + 500_000))
            .await;
        assert!(matches!(result, Err(MarketError::Unauthorized(_))));
    }
}

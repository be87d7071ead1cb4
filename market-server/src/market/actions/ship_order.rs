//! ShipOrder command handler
//!
//! Seller marks a paid order as shipped; the tracking number is required
//! in the same update.

use async_trait::async_trait;

use crate::market::command::{Command, CommandMeta, TxnContext};
use crate::market::error::MarketError;
use crate::market::events::MarketEvent;
use crate::market::transitions::{self, OrderAction};

/// ShipOrder action
#[derive(Debug, Clone)]
pub struct ShipOrderAction {
    pub order_id: String,
    pub tracking_number: String,
}

#[async_trait]
impl Command for ShipOrderAction {
    async fn execute(
        &self,
        ctx: &mut TxnContext<'_>,
        meta: &CommandMeta,
    ) -> Result<Vec<MarketEvent>, MarketError> {
        let tracking = self.tracking_number.trim();
        if tracking.is_empty() {
            return Err(MarketError::Validation(
                "A tracking number is required to mark an order shipped".to_string(),
            ));
        }

        let mut order = ctx.order(&self.order_id)?;
        if meta.caller_id != order.seller_id {
            return Err(MarketError::Unauthorized(
                "Only the seller can ship this order".to_string(),
            ));
        }

        order.status = transitions::apply(order.status, OrderAction::Ship)?;
        order.tracking_number = Some(tracking.to_string());
        order.shipped_at = Some(meta.timestamp);
        ctx.put_order(&order)?;

        Ok(vec![MarketEvent::OrderShipped {
            order_id: order.id,
            buyer_id: order.buyer_id,
            tracking_number: tracking.to_string(),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::storage::MarketStorage;
    use crate::market::testutil::{NOW, paid_fixture, reserve_fixture};
    use shared::models::OrderStatus;

    fn ship(order_id: &str, tracking: &str) -> ShipOrderAction {
        ShipOrderAction {
            order_id: order_id.to_string(),
            tracking_number: tracking.to_string(),
        }
    }

    #[tokio::test]
    async fn test_ship_sets_tracking_and_timestamp() {
        let storage = MarketStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let mut ctx = TxnContext::new(&txn);
        paid_fixture(&mut ctx, "listing-1", "order-1", "buyer-1").await;

        let events = ship("order-1", "AB123")
            .execute(&mut ctx, &CommandMeta::user("seller-1", NOW + 3_600_000))
            .await
            .unwrap();

        assert!(matches!(
            &events[0],
            MarketEvent::OrderShipped { tracking_number, .. } if tracking_number == "AB123"
        ));

        let order = ctx.order("order-1").unwrap();
        assert_eq!(order.status, OrderStatus::Shipped);
        assert_eq!(order.tracking_number.as_deref(), Some("AB123"));
        assert_eq!(order.shipped_at, Some(NOW + 3_600_000));
    }

    #[tokio::test]
    async fn test_empty_tracking_rejected_without_mutation() {
        let storage = MarketStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let mut ctx = TxnContext::new(&txn);
        paid_fixture(&mut ctx, "listing-1", "order-1", "buyer-1").await;

        let result = ship("order-1", "   ")
            .execute(&mut ctx, &CommandMeta::user("seller-1", NOW + 3_600_000))
            .await;
        assert!(matches!(result, Err(MarketError::Validation(_))));

        let order = ctx.order("order-1").unwrap();
        assert_eq!(order.status, OrderStatus::PaidPendingShipment);
        assert!(order.tracking_number.is_none());
    }

    #[tokio::test]
    async fn test_ship_unpaid_order_fails() {
        let storage = MarketStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let mut ctx = TxnContext::new(&txn);
        reserve_fixture(&mut ctx, "listing-1", "order-1", "buyer-1").await;

        let result = ship("order-1", "AB123")
            .execute(&mut ctx, &CommandMeta::user("seller-1", NOW + 3_600_000))
            .await;
        assert!(matches!(
            result,
            Err(MarketError::InvalidStateTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_buyer_cannot_ship() {
        let storage = MarketStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let mut ctx = TxnContext::new(&txn);
        paid_fixture(&mut ctx, "listing-1", "order-1", "buyer-1").await;

        let result = ship("order-1", "AB123")
            .execute(&mut ctx, &CommandMeta::user("buyer-1", NOW + 3_600_000))
            .await;
        assert!(matches!(result, Err(MarketError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_tracking_is_trimmed() {
        let storage = MarketStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let mut ctx = TxnContext::new(&txn);
        paid_fixture(&mut ctx, "listing-1", "order-1", "buyer-1").await;

        ship("order-1", "  AB123 \n")
            .execute(&mut ctx, &CommandMeta::user("seller-1", NOW + 3_600_000))
            .await
            .unwrap();

        let order = ctx.order("order-1").unwrap();
        assert_eq!(order.tracking_number.as_deref(), Some("AB123"));
    }
}
